// ==========================================
// 安装物流进度管理系统 - 供货物料数据仓储 (只读)
// ==========================================
// 所有权: supply_item 表归外部协作方，本仓储只提供查询
// 约束: 所有查询过滤 is_deleted = 0
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::supply_item::SupplyItem;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// SupplyItemRepository - 供货物料仓储
// ==========================================
pub struct SupplyItemRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SupplyItemRepository {
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

    /// 查询项目下全部未删除物料
    pub fn list_by_project(&self, project_number: &str) -> RepositoryResult<Vec<SupplyItem>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE project_number = ?1 AND is_deleted = 0",
            SELECT_BASE
        ))?;
        let rows = stmt.query_map(params![project_number], map_row)?;
        collect(rows)
    }

    /// 查询某工作包下的物料
    pub fn list_by_work_package(
        &self,
        project_number: &str,
        pl_number: &str,
    ) -> RepositoryResult<Vec<SupplyItem>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE project_number = ?1 AND pl_number = ?2 AND is_deleted = 0",
            SELECT_BASE
        ))?;
        let rows = stmt.query_map(params![project_number, pl_number], map_row)?;
        collect(rows)
    }

    /// 查询某 PWBS 分类下的物料
    pub fn list_by_pwbs(
        &self,
        project_number: &str,
        pwbs: &str,
    ) -> RepositoryResult<Vec<SupplyItem>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE project_number = ?1 AND pwbs = ?2 AND is_deleted = 0",
            SELECT_BASE
        ))?;
        let rows = stmt.query_map(params![project_number, pwbs], map_row)?;
        collect(rows)
    }

    /// 项目下出现过的 PWBS 分类码 (去重, 升序)
    pub fn distinct_pwbs(&self, project_number: &str) -> RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT DISTINCT pwbs FROM supply_item
            WHERE project_number = ?1 AND is_deleted = 0 AND pwbs IS NOT NULL
            ORDER BY pwbs
            "#,
        )?;
        let rows = stmt.query_map(params![project_number], |row| row.get::<_, String>(0))?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }
}

const SELECT_BASE: &str = r#"
    SELECT item_id, project_number, pl_number, pwbs,
           quantity, weight_kg, case_number, is_deleted
    FROM supply_item
"#;

fn collect(
    rows: rusqlite::MappedRows<'_, impl FnMut(&Row<'_>) -> rusqlite::Result<SupplyItem>>,
) -> RepositoryResult<Vec<SupplyItem>> {
    let mut result = Vec::new();
    for row in rows {
        result.push(row?);
    }
    Ok(result)
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<SupplyItem> {
    Ok(SupplyItem {
        item_id: row.get(0)?,
        project_number: row.get(1)?,
        pl_number: row.get(2)?,
        pwbs: row.get(3)?,
        quantity: row.get(4)?,
        weight_kg: row.get(5)?,
        case_number: row.get(6)?,
        is_deleted: row.get::<_, i32>(7)? != 0,
    })
}
