// ==========================================
// 安装物流进度管理系统 - 工作包排期数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 主键: (project_number, pl_number)
// pwbs_categories 以 JSON 数组存储
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::types::{ReadinessStatus, ScheduleStatus};
use crate::domain::work_package::WorkPackageSchedule;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, Row};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

// ==========================================
// WorkPackageScheduleRepository - 工作包排期仓储
// ==========================================
pub struct WorkPackageScheduleRepository {
    conn: Arc<Mutex<Connection>>,
}

impl WorkPackageScheduleRepository {
    /// 创建新的仓储实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
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

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入或整行覆盖工作包记录 (INSERT OR REPLACE)
    pub fn upsert(&self, wp: &WorkPackageSchedule) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT OR REPLACE INTO work_package_schedule (
                project_number, pl_number, pwbs_categories,
                item_count, total_quantity, total_weight_kg,
                planned_start, planned_end, actual_start, actual_end,
                schedule_status, readiness_status, dependency_override, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
            params![
                wp.project_number,
                wp.pl_number,
                serde_json::to_string(&wp.pwbs_categories)?,
                wp.item_count,
                wp.total_quantity,
                wp.total_weight_kg,
                wp.planned_start.map(|d| d.to_string()),
                wp.planned_end.map(|d| d.to_string()),
                wp.actual_start.map(|t| t.format(DATETIME_FMT).to_string()),
                wp.actual_end.map(|t| t.format(DATETIME_FMT).to_string()),
                wp.schedule_status.to_string(),
                wp.readiness_status.to_string(),
                wp.dependency_override as i32,
                wp.updated_at.format(DATETIME_FMT).to_string(),
            ],
        )?;
        Ok(())
    }

    /// 按主键查询
    pub fn find(
        &self,
        project_number: &str,
        pl_number: &str,
    ) -> RepositoryResult<Option<WorkPackageSchedule>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE project_number = ?1 AND pl_number = ?2",
            SELECT_BASE
        ))?;
        let mut rows = stmt.query_map(params![project_number, pl_number], map_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// 按主键查询，不存在则报 NotFound
    pub fn get(
        &self,
        project_number: &str,
        pl_number: &str,
    ) -> RepositoryResult<WorkPackageSchedule> {
        self.find(project_number, pl_number)?
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "WorkPackageSchedule".to_string(),
                id: format!("{}/{}", project_number, pl_number),
            })
    }

    /// 查询项目下全部工作包 (按 PL 号排序)
    pub fn list_by_project(
        &self,
        project_number: &str,
    ) -> RepositoryResult<Vec<WorkPackageSchedule>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE project_number = ?1 ORDER BY pl_number",
            SELECT_BASE
        ))?;
        let rows = stmt.query_map(params![project_number], map_row)?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    /// 更新计划日期与依赖忽略标志 (排期入口)
    pub fn update_planned_dates(
        &self,
        project_number: &str,
        pl_number: &str,
        planned_start: NaiveDate,
        planned_end: NaiveDate,
        dependency_override: bool,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE work_package_schedule
            SET planned_start = ?3, planned_end = ?4,
                dependency_override = ?5, updated_at = datetime('now')
            WHERE project_number = ?1 AND pl_number = ?2
            "#,
            params![
                project_number,
                pl_number,
                planned_start.to_string(),
                planned_end.to_string(),
                dependency_override as i32,
            ],
        )?;
        ensure_found(affected, project_number, pl_number)
    }

    /// 平移计划窗口 (下游级联应用; 不碰 dependency_override)
    ///
    /// # 说明
    /// 后序原本无完整窗口时只落开始日 (planned_end 传 None)
    pub fn update_planned_window(
        &self,
        project_number: &str,
        pl_number: &str,
        planned_start: NaiveDate,
        planned_end: Option<NaiveDate>,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE work_package_schedule
            SET planned_start = ?3, planned_end = ?4, updated_at = datetime('now')
            WHERE project_number = ?1 AND pl_number = ?2
            "#,
            params![
                project_number,
                pl_number,
                planned_start.to_string(),
                planned_end.map(|d| d.to_string()),
            ],
        )?;
        ensure_found(affected, project_number, pl_number)
    }

    /// 更新状态机字段与实际日期
    pub fn update_status(
        &self,
        project_number: &str,
        pl_number: &str,
        status: ScheduleStatus,
        actual_start: Option<NaiveDateTime>,
        actual_end: Option<NaiveDateTime>,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE work_package_schedule
            SET schedule_status = ?3, actual_start = ?4, actual_end = ?5,
                updated_at = datetime('now')
            WHERE project_number = ?1 AND pl_number = ?2
            "#,
            params![
                project_number,
                pl_number,
                status.to_string(),
                actual_start.map(|t| t.format(DATETIME_FMT).to_string()),
                actual_end.map(|t| t.format(DATETIME_FMT).to_string()),
            ],
        )?;
        ensure_found(affected, project_number, pl_number)
    }

    /// 更新齐套状态
    pub fn update_readiness(
        &self,
        project_number: &str,
        pl_number: &str,
        readiness: ReadinessStatus,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE work_package_schedule
            SET readiness_status = ?3, updated_at = datetime('now')
            WHERE project_number = ?1 AND pl_number = ?2
            "#,
            params![project_number, pl_number, readiness.to_string()],
        )?;
        ensure_found(affected, project_number, pl_number)
    }

    /// 更新派生字段 (Aggregator 重算结果)
    pub fn update_rollup(
        &self,
        project_number: &str,
        pl_number: &str,
        pwbs_categories: &BTreeSet<String>,
        item_count: i64,
        total_quantity: f64,
        total_weight_kg: f64,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE work_package_schedule
            SET pwbs_categories = ?3, item_count = ?4,
                total_quantity = ?5, total_weight_kg = ?6,
                updated_at = datetime('now')
            WHERE project_number = ?1 AND pl_number = ?2
            "#,
            params![
                project_number,
                pl_number,
                serde_json::to_string(pwbs_categories)?,
                item_count,
                total_quantity,
                total_weight_kg,
            ],
        )?;
        ensure_found(affected, project_number, pl_number)
    }
}

const SELECT_BASE: &str = r#"
    SELECT
        project_number, pl_number, pwbs_categories,
        item_count, total_quantity, total_weight_kg,
        planned_start, planned_end, actual_start, actual_end,
        schedule_status, readiness_status, dependency_override, updated_at
    FROM work_package_schedule
"#;

fn ensure_found(affected: usize, project_number: &str, pl_number: &str) -> RepositoryResult<()> {
    if affected == 0 {
        return Err(RepositoryError::NotFound {
            entity: "WorkPackageSchedule".to_string(),
            id: format!("{}/{}", project_number, pl_number),
        });
    }
    Ok(())
}

/// 行映射
fn map_row(row: &Row<'_>) -> rusqlite::Result<WorkPackageSchedule> {
    let categories_json: String = row.get(2)?;
    let schedule_status_raw: String = row.get(10)?;
    let readiness_raw: String = row.get(11)?;

    Ok(WorkPackageSchedule {
        project_number: row.get(0)?,
        pl_number: row.get(1)?,
        pwbs_categories: serde_json::from_str::<BTreeSet<String>>(&categories_json)
            .unwrap_or_default(),
        item_count: row.get(3)?,
        total_quantity: row.get(4)?,
        total_weight_kg: row.get(5)?,
        planned_start: parse_date_opt(row.get::<_, Option<String>>(6)?),
        planned_end: parse_date_opt(row.get::<_, Option<String>>(7)?),
        actual_start: parse_datetime_opt(row.get::<_, Option<String>>(8)?),
        actual_end: parse_datetime_opt(row.get::<_, Option<String>>(9)?),
        schedule_status: ScheduleStatus::parse(&schedule_status_raw)
            .unwrap_or(ScheduleStatus::Unscheduled),
        readiness_status: ReadinessStatus::parse(&readiness_raw)
            .unwrap_or(ReadinessStatus::Blocked),
        dependency_override: row.get::<_, i32>(12)? != 0,
        updated_at: parse_datetime_opt(Some(row.get::<_, String>(13)?))
            .unwrap_or_else(|| chrono::Utc::now().naive_utc()),
    })
}

fn parse_date_opt(raw: Option<String>) -> Option<NaiveDate> {
    raw.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok())
}

fn parse_datetime_opt(raw: Option<String>) -> Option<NaiveDateTime> {
    raw.and_then(|s| NaiveDateTime::parse_from_str(&s, DATETIME_FMT).ok())
}
