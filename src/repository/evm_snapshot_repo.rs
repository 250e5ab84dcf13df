// ==========================================
// 安装物流进度管理系统 - 挣值快照数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 主键: (project_number, snapshot_date, scope, scope_id)
// upsert 语义: INSERT OR REPLACE，快照任务重跑覆盖不重复
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::evm::{EvmSnapshot, StatusBreakdown};
use crate::domain::types::EvmScope;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

// ==========================================
// EvmSnapshotRepository - 挣值快照仓储
// ==========================================
pub struct EvmSnapshotRepository {
    conn: Arc<Mutex<Connection>>,
}

impl EvmSnapshotRepository {
    /// 创建新的仓储实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 单条 upsert
    pub fn upsert(&self, snapshot: &EvmSnapshot) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        Self::upsert_with(&conn, snapshot)
    }

    /// 批量 upsert (事务内)
    ///
    /// # 返回
    /// - Ok(usize): 写入的记录数
    pub fn batch_upsert(&self, snapshots: &[EvmSnapshot]) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let mut count = 0;
        for snapshot in snapshots {
            Self::upsert_with(&tx, snapshot)?;
            count += 1;
        }

        tx.commit()?;
        Ok(count)
    }

    fn upsert_with(conn: &Connection, snapshot: &EvmSnapshot) -> RepositoryResult<()> {
        conn.execute(
            r#"
            INSERT OR REPLACE INTO evm_snapshot (
                project_number, snapshot_date, scope, scope_id,
                bac, pv, ev, sv, spi, percent_complete, items_remaining,
                eac, vac,
                not_started_count, in_progress_count, installed_count, issue_count,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)
            "#,
            params![
                snapshot.project_number,
                snapshot.snapshot_date.to_string(),
                snapshot.scope.to_string(),
                snapshot.scope_id,
                snapshot.bac,
                snapshot.pv,
                snapshot.ev,
                snapshot.sv,
                snapshot.spi,
                snapshot.percent_complete,
                snapshot.items_remaining,
                snapshot.eac,
                snapshot.vac,
                snapshot.status_breakdown.not_started,
                snapshot.status_breakdown.in_progress,
                snapshot.status_breakdown.installed,
                snapshot.status_breakdown.issue,
                snapshot.created_at.format(DATETIME_FMT).to_string(),
            ],
        )?;
        Ok(())
    }

    /// 按主键查询
    pub fn find_by_key(
        &self,
        project_number: &str,
        snapshot_date: NaiveDate,
        scope: EvmScope,
        scope_id: &str,
    ) -> RepositoryResult<Option<EvmSnapshot>> {
        let conn = self.get_conn()?;
        let result = conn
            .query_row(
                &format!(
                    r#"{} WHERE project_number = ?1 AND snapshot_date = ?2
                       AND scope = ?3 AND scope_id = ?4"#,
                    SELECT_BASE
                ),
                params![
                    project_number,
                    snapshot_date.to_string(),
                    scope.to_string(),
                    scope_id
                ],
                map_row,
            )
            .optional()?;
        Ok(result)
    }

    /// 查询趋势窗口 (日期升序)
    ///
    /// # 参数
    /// - from_date: 窗口起始日 (含)
    /// - scope/scope_id: None 时默认项目范围
    pub fn list_trend(
        &self,
        project_number: &str,
        from_date: NaiveDate,
        scope: EvmScope,
        scope_id: &str,
    ) -> RepositoryResult<Vec<EvmSnapshot>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"{} WHERE project_number = ?1 AND snapshot_date >= ?2
               AND scope = ?3 AND scope_id = ?4
               ORDER BY snapshot_date ASC"#,
            SELECT_BASE
        ))?;
        let rows = stmt.query_map(
            params![
                project_number,
                from_date.to_string(),
                scope.to_string(),
                scope_id
            ],
            map_row,
        )?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    /// 某项目某日快照条数 (幂等性测试用)
    pub fn count_for_day(
        &self,
        project_number: &str,
        snapshot_date: NaiveDate,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            r#"
            SELECT COUNT(*) FROM evm_snapshot
            WHERE project_number = ?1 AND snapshot_date = ?2
            "#,
            params![project_number, snapshot_date.to_string()],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

const SELECT_BASE: &str = r#"
    SELECT project_number, snapshot_date, scope, scope_id,
           bac, pv, ev, sv, spi, percent_complete, items_remaining,
           eac, vac,
           not_started_count, in_progress_count, installed_count, issue_count,
           created_at
    FROM evm_snapshot
"#;

fn map_row(row: &Row<'_>) -> rusqlite::Result<EvmSnapshot> {
    let date_raw: String = row.get(1)?;
    let scope_raw: String = row.get(2)?;
    let created_raw: String = row.get(17)?;

    Ok(EvmSnapshot {
        project_number: row.get(0)?,
        snapshot_date: NaiveDate::parse_from_str(&date_raw, "%Y-%m-%d").unwrap_or_default(),
        scope: EvmScope::parse(&scope_raw).unwrap_or(EvmScope::Project),
        scope_id: row.get(3)?,
        bac: row.get(4)?,
        pv: row.get(5)?,
        ev: row.get(6)?,
        sv: row.get(7)?,
        spi: row.get(8)?,
        percent_complete: row.get(9)?,
        items_remaining: row.get(10)?,
        eac: row.get(11)?,
        vac: row.get(12)?,
        status_breakdown: StatusBreakdown {
            not_started: row.get(13)?,
            in_progress: row.get(14)?,
            installed: row.get(15)?,
            issue: row.get(16)?,
        },
        created_at: NaiveDateTime::parse_from_str(&created_raw, DATETIME_FMT)
            .unwrap_or_else(|_| chrono::Utc::now().naive_utc()),
    })
}
