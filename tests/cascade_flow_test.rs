// ==========================================
// 下游级联端到端测试
// ==========================================
// 目标: 改期 → 级联提议 → 显式应用的完整链路
// 规则: 只向后推; 应用为整体平移，工期保持
// ==========================================


use chrono::NaiveDate;
use install_logistics_aps::api::{ApiError, ScheduleOptions};
use install_logistics_aps::app::AppState;
use install_logistics_aps::domain::types::DependencyType;
use install_logistics_aps::repository::WorkPackageScheduleRepository;
use test_helpers::{create_test_db, insert_items_for_package, open_conn};

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

/// 三个工作包: WP_K (STEEL) → WP_F (PIPING) → WP_I (INSULATION)
fn setup_chain() -> (tempfile::NamedTempFile, String, AppState) {
    let (temp_file, db_path) = create_test_db().unwrap();
    {
        let conn = open_conn(&db_path).unwrap();
        insert_items_for_package(&conn, "P001", "WP_K", "STEEL", "K", 3).unwrap();
        insert_items_for_package(&conn, "P001", "WP_F", "PIPING", "F", 2).unwrap();
        insert_items_for_package(&conn, "P001", "WP_I", "INSULATION", "I", 2).unwrap();
    }
    let state = AppState::new(db_path.clone()).unwrap();
    state.schedule_api.aggregate_work_packages("P001").unwrap();
    state
        .dependency_api
        .set_default_dependency("STEEL", "PIPING", DependencyType::FinishToStart)
        .unwrap();
    state
        .dependency_api
        .set_default_dependency("PIPING", "INSULATION", DependencyType::FinishToStart)
        .unwrap();
    (temp_file, db_path, state)
}

#[test]
fn test_cascade_proposal_then_apply_preserves_duration() {
    let (_tmp, db_path, state) = setup_chain();

    // 初始排期: WP_K 03-01~03-10, WP_F 03-10~03-20 (工期 10 天)
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
    state
        .schedule_api
        .schedule_work_package(
            "P001",
            "WP_F",
            date("2026-03-10"),
            date("2026-03-20"),
            ScheduleOptions::default(),
        )
        .unwrap();

    // WP_K 延期到 03-20 结束，请求级联提议
    let outcome = state
        .schedule_api
        .schedule_work_package(
            "P001",
            "WP_K",
            date("2026-03-05"),
            date("2026-03-20"),
            ScheduleOptions {
                dependency_override: false,
                cascade: true,
            },
        )
        .unwrap();

    // 只命中直接后序 WP_F (提议开始 = 新结束日); WP_I 不在 STEEL 边的后序里
    assert_eq!(outcome.downstream_proposals.len(), 1);
    let proposal = &outcome.downstream_proposals[0];
    assert_eq!(proposal.pl_number, "WP_F");
    assert_eq!(proposal.current_start, Some(date("2026-03-10")));
    assert_eq!(proposal.proposed_start, date("2026-03-20"));

    // 提议是建议性的: 未应用前 WP_F 保持原窗口
    let repo = WorkPackageScheduleRepository::new(&db_path).unwrap();
    let wp_f = repo.get("P001", "WP_F").unwrap();
    assert_eq!(wp_f.planned_start, Some(date("2026-03-10")));

    // 显式应用: 整体平移 10 天，工期不变
    let applied = state
        .schedule_api
        .apply_downstream_updates(&outcome.downstream_proposals)
        .unwrap();
    assert_eq!(applied.updated_count, 1);

    let wp_f = repo.get("P001", "WP_F").unwrap();
    assert_eq!(wp_f.planned_start, Some(date("2026-03-20")));
    assert_eq!(wp_f.planned_end, Some(date("2026-03-30")));
    assert_eq!(wp_f.planned_duration_days(), Some(10));
}

#[test]
fn test_cascade_skips_successor_already_later() {
    let (_tmp, _db_path, state) = setup_chain();

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
    // WP_F 已排在前序结束之后很远
    state
        .schedule_api
        .schedule_work_package(
            "P001",
            "WP_F",
            date("2026-04-01"),
            date("2026-04-10"),
            ScheduleOptions::default(),
        )
        .unwrap();

    // 前序小幅延期到 03-15: 仍早于 WP_F 当前开始 → 不提议
    let outcome = state
        .schedule_api
        .schedule_work_package(
            "P001",
            "WP_K",
            date("2026-03-01"),
            date("2026-03-15"),
            ScheduleOptions {
                dependency_override: false,
                cascade: true,
            },
        )
        .unwrap();
    assert!(outcome.downstream_proposals.is_empty());
}

#[test]
fn test_cascade_unscheduled_successor_gets_start_only() {
    let (_tmp, db_path, state) = setup_chain();

    // WP_F 未排期: 提议落开始日，不虚构结束日
    let outcome = state
        .schedule_api
        .schedule_work_package(
            "P001",
            "WP_K",
            date("2026-03-01"),
            date("2026-03-10"),
            ScheduleOptions {
                dependency_override: false,
                cascade: true,
            },
        )
        .unwrap();
    assert_eq!(outcome.downstream_proposals.len(), 1);
    let proposal = &outcome.downstream_proposals[0];
    assert_eq!(proposal.pl_number, "WP_F");
    assert_eq!(proposal.current_start, None);

    state
        .schedule_api
        .apply_downstream_updates(&outcome.downstream_proposals)
        .unwrap();

    let repo = WorkPackageScheduleRepository::new(&db_path).unwrap();
    let wp_f = repo.get("P001", "WP_F").unwrap();
    assert_eq!(wp_f.planned_start, Some(date("2026-03-10")));
    assert_eq!(wp_f.planned_end, None);
}

#[test]
fn test_apply_rejects_unknown_package_before_any_write() {
    let (_tmp, db_path, state) = setup_chain();

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
    state
        .schedule_api
        .schedule_work_package(
            "P001",
            "WP_F",
            date("2026-03-10"),
            date("2026-03-20"),
            ScheduleOptions::default(),
        )
        .unwrap();

    let outcome = state
        .schedule_api
        .schedule_work_package(
            "P001",
            "WP_K",
            date("2026-03-05"),
            date("2026-03-25"),
            ScheduleOptions {
                dependency_override: false,
                cascade: true,
            },
        )
        .unwrap();
    assert_eq!(outcome.downstream_proposals.len(), 1);

    // 掺入一条指向不存在工作包的提议: 整批拒绝，已有提议不落库
    let mut proposals = outcome.downstream_proposals.clone();
    let mut bogus = proposals[0].clone();
    bogus.pl_number = "WP_MISSING".to_string();
    proposals.push(bogus);

    let err = state
        .schedule_api
        .apply_downstream_updates(&proposals)
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));

    let repo = WorkPackageScheduleRepository::new(&db_path).unwrap();
    let wp_f = repo.get("P001", "WP_F").unwrap();
    assert_eq!(wp_f.planned_start, Some(date("2026-03-10")));
}
