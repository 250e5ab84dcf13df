// ==========================================
// 安装物流进度管理系统 - 物流协作方数据仓储 (只读)
// ==========================================
// 所有权: 箱件追踪/清点明细/运输单/拣配任务均归外部协作方
// 用途: 齐套评估 (ReadinessEngine) 的数据输入
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::logistics::{CaseTracking, InventoryItem, Shipment};
use crate::domain::types::{InventoryItemStatus, InventoryStatus, ShipmentStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// ==========================================
// CaseLogisticsRepository - 箱件物流仓储
// ==========================================
pub struct CaseLogisticsRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CaseLogisticsRepository {
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

    /// 项目下箱件清点状态索引 (case_number -> InventoryStatus)
    pub fn case_inventory_map(
        &self,
        project_number: &str,
    ) -> RepositoryResult<HashMap<String, InventoryStatus>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT case_number, inventory_status
            FROM case_tracking
            WHERE project_number = ?1
            "#,
        )?;
        let rows = stmt.query_map(params![project_number], |row| {
            Ok(CaseTracking {
                case_number: row.get(0)?,
                project_number: project_number.to_string(),
                inventory_status: InventoryStatus::parse(&row.get::<_, String>(1)?)
                    .unwrap_or(InventoryStatus::Pending),
            })
        })?;

        let mut map = HashMap::new();
        for row in rows {
            let case = row?;
            map.insert(case.case_number, case.inventory_status);
        }
        Ok(map)
    }

    /// 清点明细索引 ((case_number, item_id) -> InventoryItemStatus)
    pub fn inventory_item_map(
        &self,
        case_numbers: &[String],
    ) -> RepositoryResult<HashMap<(String, String), InventoryItemStatus>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT case_number, item_id, status
            FROM inventory_item
            WHERE case_number = ?1
            "#,
        )?;

        let mut map = HashMap::new();
        for case_number in case_numbers {
            let rows = stmt.query_map(params![case_number], |row| {
                Ok(InventoryItem {
                    inventory_item_id: String::new(),
                    case_number: row.get(0)?,
                    item_id: row.get(1)?,
                    status: InventoryItemStatus::parse(&row.get::<_, String>(2)?)
                        .unwrap_or(InventoryItemStatus::Expected),
                })
            })?;
            for row in rows {
                let item = row?;
                map.insert((item.case_number, item.item_id), item.status);
            }
        }
        Ok(map)
    }

    /// 查询箱件当前挂接的在途运输单 (已送达的不算)
    ///
    /// # 返回
    /// - Some(Shipment): 箱件在某个在途状态的运输单上
    /// - None: 未挂接运输单，或运输单已送达
    pub fn find_in_transit_shipment(
        &self,
        case_number: &str,
    ) -> RepositoryResult<Option<Shipment>> {
        let conn = self.get_conn()?;
        let result = conn
            .query_row(
                r#"
                SELECT s.shipment_id, s.status, s.eta
                FROM case_shipment cs
                JOIN shipment s ON s.shipment_id = cs.shipment_id
                WHERE cs.case_number = ?1
                  AND s.status IN ('AT_FACTORY', 'IN_TRANSIT', 'AT_PORT', 'CUSTOMS')
                LIMIT 1
                "#,
                params![case_number],
                |row| {
                    Ok(Shipment {
                        shipment_id: row.get(0)?,
                        status: ShipmentStatus::parse(&row.get::<_, String>(1)?)
                            .unwrap_or(ShipmentStatus::InTransit),
                        eta: row
                            .get::<_, Option<String>>(2)?
                            .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
                    })
                },
            )
            .optional()?;
        Ok(result)
    }

    /// 工作包已拣配件数 (拣配任务 picked_count 合计)
    pub fn picked_count(
        &self,
        project_number: &str,
        pl_number: &str,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            r#"
            SELECT COALESCE(SUM(picked_count), 0)
            FROM picking_task
            WHERE project_number = ?1 AND pl_number = ?2
            "#,
            params![project_number, pl_number],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
