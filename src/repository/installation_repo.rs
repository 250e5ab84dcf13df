// ==========================================
// 安装物流进度管理系统 - 安装状态数据仓储 (只读)
// ==========================================
// 所有权: installation_status 由外部"安装登记"操作写入
// 本系统仅在挣值计算/状态分布统计中读取
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::supply_item::InstallationRecord;
use crate::domain::types::InstallState;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, Row};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

// ==========================================
// InstallationStatusRepository - 安装状态仓储
// ==========================================
pub struct InstallationStatusRepository {
    conn: Arc<Mutex<Connection>>,
}

impl InstallationStatusRepository {
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

    /// 查询项目下全部安装记录
    pub fn list_by_project(
        &self,
        project_number: &str,
    ) -> RepositoryResult<Vec<InstallationRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT item_id, project_number, pl_number, status, installed_at
            FROM installation_status
            WHERE project_number = ?1
            "#,
        )?;
        let rows = stmt.query_map(params![project_number], map_row)?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    /// 项目安装记录按 item_id 建索引 (挣值引擎输入)
    pub fn map_by_item(
        &self,
        project_number: &str,
    ) -> RepositoryResult<HashMap<String, InstallationRecord>> {
        let records = self.list_by_project(project_number)?;
        Ok(records
            .into_iter()
            .map(|r| (r.item_id.clone(), r))
            .collect())
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<InstallationRecord> {
    let status_raw: String = row.get(3)?;
    let installed_raw: Option<String> = row.get(4)?;

    Ok(InstallationRecord {
        item_id: row.get(0)?,
        project_number: row.get(1)?,
        pl_number: row.get(2)?,
        status: InstallState::parse(&status_raw).unwrap_or(InstallState::NotStarted),
        installed_at: installed_raw
            .and_then(|s| NaiveDateTime::parse_from_str(&s, DATETIME_FMT).ok()),
    })
}
