// ==========================================
// 安装物流进度管理系统 - PWBS 依赖数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑 (默认/覆写合并在引擎层)
// 唯一约束: (from_pwbs, to_pwbs, is_default, project_number)
// 默认边 project_number 存空串 (SQLite UNIQUE 对 NULL 不去重)
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::dependency::PwbsDependency;
use crate::domain::types::DependencyType;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

// ==========================================
// PwbsDependencyRepository - 依赖边仓储
// ==========================================
pub struct PwbsDependencyRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PwbsDependencyRepository {
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

    /// 设置默认依赖边 (存在则更新类型)
    pub fn set_default(
        &self,
        from_pwbs: &str,
        to_pwbs: &str,
        dependency_type: DependencyType,
    ) -> RepositoryResult<()> {
        self.upsert_edge(from_pwbs, to_pwbs, dependency_type, true, "")
    }

    /// 移除默认依赖边
    ///
    /// # 返回
    /// - true: 确有记录被删除
    pub fn remove_default(&self, from_pwbs: &str, to_pwbs: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            DELETE FROM pwbs_dependency
            WHERE from_pwbs = ?1 AND to_pwbs = ?2 AND is_default = 1
            "#,
            params![from_pwbs, to_pwbs],
        )?;
        Ok(affected > 0)
    }

    /// 设置项目覆写边 (存在则更新类型)
    pub fn set_project_override(
        &self,
        project_number: &str,
        from_pwbs: &str,
        to_pwbs: &str,
        dependency_type: DependencyType,
    ) -> RepositoryResult<()> {
        self.upsert_edge(from_pwbs, to_pwbs, dependency_type, false, project_number)
    }

    /// 移除项目覆写边
    pub fn remove_project_override(
        &self,
        project_number: &str,
        from_pwbs: &str,
        to_pwbs: &str,
    ) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            DELETE FROM pwbs_dependency
            WHERE from_pwbs = ?1 AND to_pwbs = ?2 AND is_default = 0 AND project_number = ?3
            "#,
            params![from_pwbs, to_pwbs, project_number],
        )?;
        Ok(affected > 0)
    }

    /// 查询全部默认边
    pub fn list_defaults(&self) -> RepositoryResult<Vec<PwbsDependency>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE is_default = 1 ORDER BY from_pwbs, to_pwbs",
            SELECT_BASE
        ))?;
        let rows = stmt.query_map([], map_row)?;
        collect(rows)
    }

    /// 查询某项目的全部覆写边
    pub fn list_project_overrides(
        &self,
        project_number: &str,
    ) -> RepositoryResult<Vec<PwbsDependency>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE is_default = 0 AND project_number = ?1 ORDER BY from_pwbs, to_pwbs",
            SELECT_BASE
        ))?;
        let rows = stmt.query_map(params![project_number], map_row)?;
        collect(rows)
    }

    /// ON CONFLICT 按唯一键更新类型，保证"每键至多一条"不变量
    fn upsert_edge(
        &self,
        from_pwbs: &str,
        to_pwbs: &str,
        dependency_type: DependencyType,
        is_default: bool,
        project_number: &str,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO pwbs_dependency (
                dependency_id, from_pwbs, to_pwbs, dependency_type,
                is_default, project_number, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, datetime('now'))
            ON CONFLICT (from_pwbs, to_pwbs, is_default, project_number)
            DO UPDATE SET dependency_type = excluded.dependency_type,
                          updated_at = datetime('now')
            "#,
            params![
                Uuid::new_v4().to_string(),
                from_pwbs,
                to_pwbs,
                dependency_type.to_string(),
                is_default as i32,
                project_number,
            ],
        )?;
        Ok(())
    }
}

const SELECT_BASE: &str = r#"
    SELECT dependency_id, from_pwbs, to_pwbs, dependency_type,
           is_default, project_number, updated_at
    FROM pwbs_dependency
"#;

fn collect(
    rows: rusqlite::MappedRows<'_, impl FnMut(&Row<'_>) -> rusqlite::Result<PwbsDependency>>,
) -> RepositoryResult<Vec<PwbsDependency>> {
    let mut result = Vec::new();
    for row in rows {
        result.push(row?);
    }
    Ok(result)
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<PwbsDependency> {
    let type_raw: String = row.get(3)?;
    let project_raw: String = row.get(5)?;
    let updated_raw: String = row.get(6)?;

    Ok(PwbsDependency {
        dependency_id: row.get(0)?,
        from_pwbs: row.get(1)?,
        to_pwbs: row.get(2)?,
        dependency_type: DependencyType::parse(&type_raw).unwrap_or(DependencyType::None),
        is_default: row.get::<_, i32>(4)? != 0,
        project_number: if project_raw.is_empty() {
            None
        } else {
            Some(project_raw)
        },
        updated_at: NaiveDateTime::parse_from_str(&updated_raw, DATETIME_FMT)
            .unwrap_or_else(|_| chrono::Utc::now().naive_utc()),
    })
}
