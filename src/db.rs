// ==========================================
// 安装物流进度管理系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为，避免"部分模块外键开启/部分不开启"
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 集中建表语句，保证库/测试使用同一套 schema
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 初始化全部业务表（幂等，CREATE TABLE IF NOT EXISTS）
///
/// 表分两类：
/// - 排期子系统自有表: work_package_schedule / pwbs_dependency / evm_snapshot / config_kv
/// - 外部协作方表（本系统只读）: project / supply_item / installation_status /
///   case_tracking / inventory_item / shipment / case_shipment / picking_task
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL DEFAULT 'global',
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS project (
            project_number TEXT PRIMARY KEY,
            project_name TEXT NOT NULL DEFAULT '',
            status TEXT NOT NULL DEFAULT 'ACTIVE'
        );

        CREATE TABLE IF NOT EXISTS supply_item (
            item_id TEXT PRIMARY KEY,
            project_number TEXT NOT NULL,
            pl_number TEXT,
            pwbs TEXT,
            quantity REAL NOT NULL DEFAULT 0,
            weight_kg REAL NOT NULL DEFAULT 0,
            case_number TEXT,
            is_deleted INTEGER NOT NULL DEFAULT 0
        );
        CREATE INDEX IF NOT EXISTS idx_supply_item_project ON supply_item(project_number);
        CREATE INDEX IF NOT EXISTS idx_supply_item_pl ON supply_item(project_number, pl_number);
        CREATE INDEX IF NOT EXISTS idx_supply_item_pwbs ON supply_item(project_number, pwbs);

        CREATE TABLE IF NOT EXISTS installation_status (
            item_id TEXT PRIMARY KEY,
            project_number TEXT NOT NULL,
            pl_number TEXT,
            status TEXT NOT NULL DEFAULT 'NOT_STARTED',
            installed_at TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_installation_project ON installation_status(project_number);

        CREATE TABLE IF NOT EXISTS work_package_schedule (
            project_number TEXT NOT NULL,
            pl_number TEXT NOT NULL,
            pwbs_categories TEXT NOT NULL DEFAULT '[]',
            item_count INTEGER NOT NULL DEFAULT 0,
            total_quantity REAL NOT NULL DEFAULT 0,
            total_weight_kg REAL NOT NULL DEFAULT 0,
            planned_start TEXT,
            planned_end TEXT,
            actual_start TEXT,
            actual_end TEXT,
            schedule_status TEXT NOT NULL DEFAULT 'UNSCHEDULED',
            readiness_status TEXT NOT NULL DEFAULT 'BLOCKED',
            dependency_override INTEGER NOT NULL DEFAULT 0,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (project_number, pl_number)
        );

        CREATE TABLE IF NOT EXISTS pwbs_dependency (
            dependency_id TEXT PRIMARY KEY,
            from_pwbs TEXT NOT NULL,
            to_pwbs TEXT NOT NULL,
            dependency_type TEXT NOT NULL,
            is_default INTEGER NOT NULL,
            project_number TEXT NOT NULL DEFAULT '',
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE (from_pwbs, to_pwbs, is_default, project_number)
        );

        CREATE TABLE IF NOT EXISTS evm_snapshot (
            project_number TEXT NOT NULL,
            snapshot_date TEXT NOT NULL,
            scope TEXT NOT NULL,
            scope_id TEXT NOT NULL DEFAULT '',
            bac INTEGER NOT NULL,
            pv INTEGER NOT NULL,
            ev INTEGER NOT NULL,
            sv INTEGER NOT NULL,
            spi REAL NOT NULL,
            percent_complete REAL NOT NULL,
            items_remaining INTEGER NOT NULL,
            eac REAL,
            vac REAL,
            not_started_count INTEGER NOT NULL DEFAULT 0,
            in_progress_count INTEGER NOT NULL DEFAULT 0,
            installed_count INTEGER NOT NULL DEFAULT 0,
            issue_count INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (project_number, snapshot_date, scope, scope_id)
        );

        CREATE TABLE IF NOT EXISTS case_tracking (
            case_number TEXT PRIMARY KEY,
            project_number TEXT NOT NULL,
            inventory_status TEXT NOT NULL DEFAULT 'PENDING'
        );

        CREATE TABLE IF NOT EXISTS inventory_item (
            inventory_item_id TEXT PRIMARY KEY,
            case_number TEXT NOT NULL,
            item_id TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'EXPECTED'
        );
        CREATE INDEX IF NOT EXISTS idx_inventory_item_case ON inventory_item(case_number);

        CREATE TABLE IF NOT EXISTS shipment (
            shipment_id TEXT PRIMARY KEY,
            status TEXT NOT NULL DEFAULT 'AT_FACTORY',
            eta TEXT
        );

        CREATE TABLE IF NOT EXISTS case_shipment (
            case_number TEXT NOT NULL,
            shipment_id TEXT NOT NULL,
            PRIMARY KEY (case_number, shipment_id)
        );

        CREATE TABLE IF NOT EXISTS picking_task (
            task_id TEXT PRIMARY KEY,
            project_number TEXT NOT NULL,
            pl_number TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'OPEN',
            picked_count INTEGER NOT NULL DEFAULT 0
        );
        CREATE INDEX IF NOT EXISTS idx_picking_task_pl ON picking_task(project_number, pl_number);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    Ok(())
}
