// ==========================================
// 工作包排期 API 集成测试
// ==========================================
// 目标: 验证汇总建包、排期写入 (告警不阻断)、override 审计、状态机转换
// ==========================================


use chrono::NaiveDate;
use install_logistics_aps::api::{ApiError, ScheduleOptions};
use install_logistics_aps::app::AppState;
use install_logistics_aps::domain::types::{DependencyType, ScheduleStatus};
use install_logistics_aps::engine::WarningKind;
use install_logistics_aps::repository::WorkPackageScheduleRepository;
use test_helpers::{create_test_db, insert_items_for_package, open_conn};

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

/// 建库并灌入两个工作包: WP_K (STEEL, 3件) / WP_F (PIPING, 2件)
fn setup_two_packages() -> (tempfile::NamedTempFile, String, AppState) {
    let (temp_file, db_path) = create_test_db().unwrap();
    {
        let conn = open_conn(&db_path).unwrap();
        insert_items_for_package(&conn, "P001", "WP_K", "STEEL", "K", 3).unwrap();
        insert_items_for_package(&conn, "P001", "WP_F", "PIPING", "F", 2).unwrap();
    }
    let state = AppState::new(db_path.clone()).unwrap();
    state
        .schedule_api
        .aggregate_work_packages("P001")
        .unwrap();
    (temp_file, db_path, state)
}

// ==========================================
// 汇总建包
// ==========================================

#[test]
fn test_aggregate_creates_then_patches() {
    let (_tmp, db_path, state) = setup_two_packages();

    // setup 里已跑过一次: 再跑一次应全部走更新分支
    let outcome = state.schedule_api.aggregate_work_packages("P001").unwrap();
    assert_eq!(outcome.created, 0);
    assert_eq!(outcome.updated, 2);
    assert_eq!(outcome.total, 2);

    let repo = WorkPackageScheduleRepository::new(&db_path).unwrap();
    let wp = repo.get("P001", "WP_K").unwrap();
    assert_eq!(wp.item_count, 3);
    assert!(wp.pwbs_categories.contains("STEEL"));
    assert_eq!(wp.schedule_status, ScheduleStatus::Unscheduled);

    // 新增物料后重跑: 派生字段被补丁，排期字段不动
    {
        let conn = open_conn(&db_path).unwrap();
        insert_items_for_package(&conn, "P001", "WP_K", "STEEL", "K_EXTRA_", 1).unwrap();
    }
    let outcome = state.schedule_api.aggregate_work_packages("P001").unwrap();
    assert_eq!(outcome.created, 0);
    assert_eq!(outcome.updated, 2);

    let wp = repo.get("P001", "WP_K").unwrap();
    assert_eq!(wp.item_count, 4);
}

#[test]
fn test_aggregate_rejects_empty_project() {
    let (_tmp, _db_path, state) = setup_two_packages();
    let err = state
        .schedule_api
        .aggregate_work_packages("  ")
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
}

// ==========================================
// 排期写入
// ==========================================

#[test]
fn test_schedule_rejects_invalid_range() {
    let (_tmp, _db_path, state) = setup_two_packages();
    let err = state
        .schedule_api
        .schedule_work_package(
            "P001",
            "WP_K",
            date("2026-03-10"),
            date("2026-03-10"),
            ScheduleOptions::default(),
        )
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidRange { .. }));
}

#[test]
fn test_schedule_rejects_missing_package() {
    let (_tmp, _db_path, state) = setup_two_packages();
    let err = state
        .schedule_api
        .schedule_work_package(
            "P001",
            "WP_MISSING",
            date("2026-03-01"),
            date("2026-03-10"),
            ScheduleOptions::default(),
        )
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[test]
fn test_schedule_warning_does_not_block_write() {
    let (_tmp, db_path, state) = setup_two_packages();
    state
        .dependency_api
        .set_default_dependency("STEEL", "PIPING", DependencyType::FinishToStart)
        .unwrap();

    // 前序 WP_K: 03-01 ~ 03-10
    let outcome = state
        .schedule_api
        .schedule_work_package(
            "P001",
            "WP_K",
            date("2026-03-01"),
            date("2026-03-10"),
            ScheduleOptions::default(),
        )
        .unwrap();
    assert!(outcome.validation.is_valid);

    // 后序 WP_F 从 03-05 开始: 早于前序结束 → 告警但照常写入
    let outcome = state
        .schedule_api
        .schedule_work_package(
            "P001",
            "WP_F",
            date("2026-03-05"),
            date("2026-03-15"),
            ScheduleOptions::default(),
        )
        .unwrap();
    assert!(!outcome.validation.is_valid);
    assert_eq!(outcome.validation.warnings.len(), 1);
    let warning = &outcome.validation.warnings[0];
    assert_eq!(warning.kind, WarningKind::FinishToStartViolation);
    assert_eq!(warning.predecessor_pl, "WP_K");

    let repo = WorkPackageScheduleRepository::new(&db_path).unwrap();
    let wp = repo.get("P001", "WP_F").unwrap();
    assert_eq!(wp.planned_start, Some(date("2026-03-05")));
    assert_eq!(wp.planned_end, Some(date("2026-03-15")));
    assert!(!wp.dependency_override);
}

#[test]
fn test_schedule_start_on_predecessor_end_is_clean() {
    let (_tmp, _db_path, state) = setup_two_packages();
    state
        .dependency_api
        .set_default_dependency("STEEL", "PIPING", DependencyType::FinishToStart)
        .unwrap();

    state
        .schedule_api
        .schedule_work_package(
            "P001",
            "WP_K",
            date("2026-03-01"),
            date("2026-03-10"),
            ScheduleOptions::default(),
        )
        .unwrap();

    // 开始日等于前序结束日: FINISH_TO_START 满足
    let outcome = state
        .schedule_api
        .schedule_work_package(
            "P001",
            "WP_F",
            date("2026-03-10"),
            date("2026-03-20"),
            ScheduleOptions::default(),
        )
        .unwrap();
    assert!(outcome.validation.is_valid);
    assert!(outcome.validation.warnings.is_empty());
}

#[test]
fn test_schedule_override_skips_validation_and_is_audited() {
    let (_tmp, db_path, state) = setup_two_packages();
    state
        .dependency_api
        .set_default_dependency("STEEL", "PIPING", DependencyType::FinishToStart)
        .unwrap();

    state
        .schedule_api
        .schedule_work_package(
            "P001",
            "WP_K",
            date("2026-03-01"),
            date("2026-03-10"),
            ScheduleOptions::default(),
        )
        .unwrap();

    // 违反顺序但显式忽略: 无告警，override 落库审计
    let outcome = state
        .schedule_api
        .schedule_work_package(
            "P001",
            "WP_F",
            date("2026-03-05"),
            date("2026-03-15"),
            ScheduleOptions {
                dependency_override: true,
                cascade: false,
            },
        )
        .unwrap();
    assert!(outcome.validation.is_valid);
    assert!(outcome.validation.warnings.is_empty());

    let repo = WorkPackageScheduleRepository::new(&db_path).unwrap();
    let wp = repo.get("P001", "WP_F").unwrap();
    assert!(wp.dependency_override);
}

#[test]
fn test_schedule_warns_on_unscheduled_predecessor() {
    let (_tmp, _db_path, state) = setup_two_packages();
    state
        .dependency_api
        .set_default_dependency("STEEL", "PIPING", DependencyType::FinishToStart)
        .unwrap();

    // WP_K 未排期，直接排 WP_F → 前序未排期告警
    let outcome = state
        .schedule_api
        .schedule_work_package(
            "P001",
            "WP_F",
            date("2026-03-05"),
            date("2026-03-15"),
            ScheduleOptions::default(),
        )
        .unwrap();
    assert!(!outcome.validation.is_valid);
    assert_eq!(
        outcome.validation.warnings[0].kind,
        WarningKind::PredecessorUnscheduled
    );
}

// ==========================================
// 状态机转换
// ==========================================

#[test]
fn test_status_transition_sets_actual_dates() {
    let (_tmp, db_path, state) = setup_two_packages();
    let repo = WorkPackageScheduleRepository::new(&db_path).unwrap();

    // 允许越级: UNSCHEDULED → IN_PROGRESS (现场先干后补排期)
    let transition = state
        .schedule_api
        .update_work_package_status("P001", "WP_K", ScheduleStatus::InProgress)
        .unwrap();
    assert_eq!(transition.previous_status, ScheduleStatus::Unscheduled);
    assert_eq!(transition.new_status, ScheduleStatus::InProgress);

    let wp = repo.get("P001", "WP_K").unwrap();
    assert!(wp.actual_start.is_some());
    assert!(wp.actual_end.is_none());
    let first_actual_start = wp.actual_start;

    // 完成: 置 actual_end, actual_start 保持
    state
        .schedule_api
        .update_work_package_status("P001", "WP_K", ScheduleStatus::Complete)
        .unwrap();
    let wp = repo.get("P001", "WP_K").unwrap();
    assert_eq!(wp.schedule_status, ScheduleStatus::Complete);
    assert_eq!(wp.actual_start, first_actual_start);
    assert!(wp.actual_end.is_some());
}

#[test]
fn test_complete_backfills_actual_start() {
    let (_tmp, db_path, state) = setup_two_packages();

    // 直接 UNSCHEDULED → COMPLETE: actual_start 被一并回填
    state
        .schedule_api
        .update_work_package_status("P001", "WP_F", ScheduleStatus::Complete)
        .unwrap();

    let repo = WorkPackageScheduleRepository::new(&db_path).unwrap();
    let wp = repo.get("P001", "WP_F").unwrap();
    assert!(wp.actual_start.is_some());
    assert!(wp.actual_end.is_some());
}

#[test]
fn test_invalid_transitions_rejected() {
    let (_tmp, _db_path, state) = setup_two_packages();

    // 同状态
    let err = state
        .schedule_api
        .update_work_package_status("P001", "WP_K", ScheduleStatus::Unscheduled)
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidStateTransition { .. }));

    // 链上回退
    state
        .schedule_api
        .update_work_package_status("P001", "WP_K", ScheduleStatus::Complete)
        .unwrap();
    let err = state
        .schedule_api
        .update_work_package_status("P001", "WP_K", ScheduleStatus::InProgress)
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidStateTransition { .. }));
}

#[test]
fn test_on_hold_round_trip() {
    let (_tmp, db_path, state) = setup_two_packages();
    let repo = WorkPackageScheduleRepository::new(&db_path).unwrap();

    state
        .schedule_api
        .update_work_package_status("P001", "WP_K", ScheduleStatus::InProgress)
        .unwrap();
    state
        .schedule_api
        .update_work_package_status("P001", "WP_K", ScheduleStatus::OnHold)
        .unwrap();
    assert_eq!(
        repo.get("P001", "WP_K").unwrap().schedule_status,
        ScheduleStatus::OnHold
    );

    // 暂停恢复: ON_HOLD → 任意状态
    state
        .schedule_api
        .update_work_package_status("P001", "WP_K", ScheduleStatus::InProgress)
        .unwrap();
    assert_eq!(
        repo.get("P001", "WP_K").unwrap().schedule_status,
        ScheduleStatus::InProgress
    );
}
