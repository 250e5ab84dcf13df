// ==========================================
// 挣值分析 API 集成测试
// ==========================================
// 目标: 三级范围实时挣值、除零口径、SPI 排序、参数校验
// ==========================================


use chrono::NaiveDate;
use install_logistics_aps::api::{ApiError, ScheduleOptions};
use install_logistics_aps::app::AppState;
use test_helpers::{
    create_test_db, insert_installation, insert_items_for_package, insert_project, open_conn,
};

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

/// P001: WP_A (PIPING, 10件) 计划 03-01~03-20, 截止 03-15 装好 4 件
fn setup_project() -> (tempfile::NamedTempFile, String, AppState) {
    let (temp_file, db_path) = create_test_db().unwrap();
    {
        let conn = open_conn(&db_path).unwrap();
        insert_project(&conn, "P001", "ACTIVE").unwrap();
        insert_items_for_package(&conn, "P001", "WP_A", "PIPING", "A", 10).unwrap();
        for i in 1..=4 {
            insert_installation(
                &conn,
                &format!("A{:03}", i),
                "P001",
                Some("WP_A"),
                "INSTALLED",
                Some("2026-03-10 08:00:00"),
            )
            .unwrap();
        }
        // 1 件安装中
        insert_installation(&conn, "A005", "P001", Some("WP_A"), "IN_PROGRESS", None).unwrap();
    }
    let state = AppState::new(db_path.clone()).unwrap();
    state.schedule_api.aggregate_work_packages("P001").unwrap();
    state
        .schedule_api
        .schedule_work_package(
            "P001",
            "WP_A",
            date("2026-03-01"),
            date("2026-03-20"),
            ScheduleOptions::default(),
        )
        .unwrap();
    (temp_file, db_path, state)
}

#[test]
fn test_project_evm_behind_schedule() {
    let (_tmp, _db_path, state) = setup_project();

    let metrics = state
        .evm_api
        .calculate_project_evm("P001", Some(date("2026-03-15")))
        .unwrap();

    assert_eq!(metrics.bac, 10);
    assert_eq!(metrics.pv, 10); // 计划已全数启动
    assert_eq!(metrics.ev, 4);
    assert_eq!(metrics.sv, -6);
    assert!((metrics.spi - 0.4).abs() < 1e-9);
    assert!((metrics.percent_complete - 40.0).abs() < 1e-9);
    assert_eq!(metrics.items_remaining, 6);
    assert!((metrics.eac.unwrap() - 25.0).abs() < 1e-9);
    assert!((metrics.vac.unwrap() - (-15.0)).abs() < 1e-9);

    // 状态分布: 4 装好 / 1 安装中 / 5 未开始 (无记录视为未开始)
    assert_eq!(metrics.status_breakdown.installed, 4);
    assert_eq!(metrics.status_breakdown.in_progress, 1);
    assert_eq!(metrics.status_breakdown.not_started, 5);
}

#[test]
fn test_evm_before_planned_start_has_zero_pv() {
    let (_tmp, _db_path, state) = setup_project();

    // as_of 早于计划开始: PV=0, SPI=0, EAC/VAC 未定义
    let metrics = state
        .evm_api
        .calculate_project_evm("P001", Some(date("2026-02-20")))
        .unwrap();
    assert_eq!(metrics.pv, 0);
    assert_eq!(metrics.ev, 0);
    assert_eq!(metrics.spi, 0.0);
    assert!(metrics.eac.is_none());
    assert!(metrics.vac.is_none());
}

#[test]
fn test_installed_after_as_of_not_earned() {
    let (_tmp, _db_path, state) = setup_project();

    // 安装日 03-10: as_of 03-09 时尚未挣得, 03-10 当日 (含) 挣得
    let metrics = state
        .evm_api
        .calculate_project_evm("P001", Some(date("2026-03-09")))
        .unwrap();
    assert_eq!(metrics.ev, 0);

    let metrics = state
        .evm_api
        .calculate_project_evm("P001", Some(date("2026-03-10")))
        .unwrap();
    assert_eq!(metrics.ev, 4);
}

#[test]
fn test_pwbs_and_work_package_scopes() {
    let (_tmp, db_path, state) = setup_project();
    {
        let conn = open_conn(&db_path).unwrap();
        // 另一分类不混入 PIPING 范围
        insert_items_for_package(&conn, "P001", "WP_B", "STEEL", "B", 5).unwrap();
    }
    state.schedule_api.aggregate_work_packages("P001").unwrap();

    let pwbs = state
        .evm_api
        .calculate_pwbs_evm("P001", "PIPING", Some(date("2026-03-15")))
        .unwrap();
    assert_eq!(pwbs.bac, 10);
    assert_eq!(pwbs.scope_id.as_deref(), Some("PIPING"));

    let wp = state
        .evm_api
        .calculate_work_package_evm("P001", "WP_A", Some(date("2026-03-15")))
        .unwrap();
    assert_eq!(wp.bac, 10);
    assert_eq!(wp.ev, 4);

    // 未排期的 WP_B: PV=0
    let wp_b = state
        .evm_api
        .calculate_work_package_evm("P001", "WP_B", Some(date("2026-03-15")))
        .unwrap();
    assert_eq!(wp_b.bac, 5);
    assert_eq!(wp_b.pv, 0);
}

#[test]
fn test_all_pwbs_sorted_worst_first() {
    let (_tmp, db_path, state) = setup_project();
    {
        let conn = open_conn(&db_path).unwrap();
        // STEEL 全部装好: SPI=1.0, 应排在落后的 PIPING 之后
        insert_items_for_package(&conn, "P001", "WP_B", "STEEL", "B", 5).unwrap();
        for i in 1..=5 {
            insert_installation(
                &conn,
                &format!("B{:03}", i),
                "P001",
                Some("WP_B"),
                "INSTALLED",
                Some("2026-03-05 08:00:00"),
            )
            .unwrap();
        }
    }
    state.schedule_api.aggregate_work_packages("P001").unwrap();
    state
        .schedule_api
        .schedule_work_package(
            "P001",
            "WP_B",
            date("2026-03-01"),
            date("2026-03-10"),
            ScheduleOptions::default(),
        )
        .unwrap();

    let all = state
        .evm_api
        .calculate_all_pwbs("P001", Some(date("2026-03-15")))
        .unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].scope_id.as_deref(), Some("PIPING")); // SPI 0.4
    assert_eq!(all[1].scope_id.as_deref(), Some("STEEL")); // SPI 1.0
    assert!(all[0].spi <= all[1].spi);
}

#[test]
fn test_scope_id_required_for_narrow_scopes() {
    let (_tmp, _db_path, state) = setup_project();

    let err = state
        .evm_api
        .calculate_pwbs_evm("P001", "  ", None)
        .unwrap_err();
    assert!(matches!(err, ApiError::MissingScopeId { .. }));

    let err = state
        .evm_api
        .calculate_work_package_evm("P001", "", None)
        .unwrap_err();
    assert!(matches!(err, ApiError::MissingScopeId { .. }));
}

#[test]
fn test_unknown_project_rejected() {
    let (_tmp, _db_path, state) = setup_project();
    let err = state
        .evm_api
        .calculate_project_evm("P_MISSING", None)
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[test]
fn test_trend_rejects_non_positive_window() {
    let (_tmp, _db_path, state) = setup_project();
    let err = state
        .evm_api
        .get_evm_trend("P001", Some(0), None, None)
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
}
