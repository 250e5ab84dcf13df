// ==========================================
// 安装物流进度管理系统 - 项目数据仓储 (只读)
// ==========================================
// 用途: 每日快照任务枚举项目; COMPLETE 项目跳过
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::logistics::Project;
use crate::domain::types::ProjectStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// ProjectRepository - 项目仓储
// ==========================================
pub struct ProjectRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProjectRepository {
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

    /// 查询单个项目
    pub fn find(&self, project_number: &str) -> RepositoryResult<Option<Project>> {
        let conn = self.get_conn()?;
        let result = conn
            .query_row(
                &format!("{} WHERE project_number = ?1", SELECT_BASE),
                params![project_number],
                map_row,
            )
            .optional()?;
        Ok(result)
    }

    /// 查询全部非 COMPLETE 项目 (快照任务入口)
    pub fn list_not_complete(&self) -> RepositoryResult<Vec<Project>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE status != 'COMPLETE' ORDER BY project_number",
            SELECT_BASE
        ))?;
        let rows = stmt.query_map([], map_row)?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }
}

const SELECT_BASE: &str =
    "SELECT project_number, project_name, status FROM project";

fn map_row(row: &Row<'_>) -> rusqlite::Result<Project> {
    let status_raw: String = row.get(2)?;
    Ok(Project {
        project_number: row.get(0)?,
        project_name: row.get(1)?,
        status: ProjectStatus::parse(&status_raw).unwrap_or(ProjectStatus::Active),
    })
}
