// ==========================================
// 安装物流进度管理系统 - 齐套评估引擎
// ==========================================
// 职责: 交叉比对清点/运输/拣配数据，判定工作包物料齐套程度
// 红线: Engine 不拼 SQL, 输入由调用方预取; 结果必须带计数可解释
// 分级:
// - BLOCKED: 物料数 0，或 (在途+缺失)/总数 ≥ 阈值
// - READY:   全部已清点且缺失为 0
// - PARTIAL: 其余
// ==========================================

use crate::domain::logistics::Shipment;
use crate::domain::readiness::{BlockingCase, ReadinessResult};
use crate::domain::supply_item::SupplyItem;
use crate::domain::types::{InventoryItemStatus, InventoryStatus, ReadinessStatus};
use std::collections::{BTreeMap, HashMap};

/// 默认阻断阈值: 在途+缺失占比 ≥ 20% 判 BLOCKED
pub const DEFAULT_BLOCKED_RATIO_THRESHOLD: f64 = 0.20;

// ==========================================
// ReadinessInputs - 齐套评估输入 (调用方预取)
// ==========================================
pub struct ReadinessInputs<'a> {
    /// 工作包内全部未删除物料
    pub items: &'a [SupplyItem],
    /// 箱件清点状态索引 (case_number -> status)
    pub case_inventory: &'a HashMap<String, InventoryStatus>,
    /// 清点明细索引 ((case_number, item_id) -> status)
    pub inventory_items: &'a HashMap<(String, String), InventoryItemStatus>,
    /// 在途箱件索引 (case_number -> 在途运输单)
    pub in_transit_cases: &'a HashMap<String, Shipment>,
    /// 已拣配件数
    pub picked_count: i64,
}

// ==========================================
// ReadinessEngine - 齐套评估引擎
// ==========================================
pub struct ReadinessEngine {
    /// 阻断阈值 (可由配置覆盖)
    blocked_ratio_threshold: f64,
}

impl ReadinessEngine {
    pub fn new() -> Self {
        Self {
            blocked_ratio_threshold: DEFAULT_BLOCKED_RATIO_THRESHOLD,
        }
    }

    pub fn with_threshold(blocked_ratio_threshold: f64) -> Self {
        Self {
            blocked_ratio_threshold,
        }
    }

    /// 齐套分级
    ///
    /// # 规则
    /// - 物料有箱号且箱件清点状态为 COMPLETE/DISCREPANCY → 已清点;
    ///   其清点明细为 MISSING/DAMAGED → 计入缺失
    /// - 未清点物料的箱件在途 (AT_FACTORY/IN_TRANSIT/AT_PORT/CUSTOMS)
    ///   → 计入在途，并按箱去重记录阻断箱件 (带 ETA)
    /// - 零物料 → BLOCKED (无法评估)，计数全零
    pub fn classify(
        &self,
        project_number: &str,
        pl_number: &str,
        inputs: &ReadinessInputs<'_>,
    ) -> ReadinessResult {
        let total_items = inputs.items.len() as i64;

        let mut inventoried_items: i64 = 0;
        let mut in_transit_items: i64 = 0;
        let mut missing_items: i64 = 0;
        // 按箱去重: BTreeMap 保证输出稳定有序
        let mut blocking: BTreeMap<String, BlockingCase> = BTreeMap::new();

        for item in inputs.items {
            let Some(case_number) = &item.case_number else {
                // 无箱号物料: 既不可清点也无运输信息
                continue;
            };

            let inventoried = inputs
                .case_inventory
                .get(case_number)
                .map(|s| s.is_inventoried())
                .unwrap_or(false);

            if inventoried {
                inventoried_items += 1;
                let key = (case_number.clone(), item.item_id.clone());
                if let Some(status) = inputs.inventory_items.get(&key) {
                    if status.is_missing_or_damaged() {
                        missing_items += 1;
                    }
                }
            } else if let Some(shipment) = inputs.in_transit_cases.get(case_number) {
                in_transit_items += 1;
                blocking
                    .entry(case_number.clone())
                    .or_insert_with(|| BlockingCase {
                        case_number: case_number.clone(),
                        shipment_id: Some(shipment.shipment_id.clone()),
                        shipment_status: Some(shipment.status),
                        eta: shipment.eta,
                    });
            }
        }

        let status = if total_items == 0 {
            ReadinessStatus::Blocked
        } else {
            let gap_ratio = (in_transit_items + missing_items) as f64 / total_items as f64;
            if gap_ratio >= self.blocked_ratio_threshold {
                ReadinessStatus::Blocked
            } else if inventoried_items == total_items && missing_items == 0 {
                ReadinessStatus::Ready
            } else {
                ReadinessStatus::Partial
            }
        };

        ReadinessResult {
            project_number: project_number.to_string(),
            pl_number: pl_number.to_string(),
            status,
            total_items,
            inventoried_items,
            in_transit_items,
            missing_items,
            picked_items: if total_items == 0 { 0 } else { inputs.picked_count },
            blocking_cases: blocking.into_values().collect(),
        }
    }
}

impl Default for ReadinessEngine {
    fn default() -> Self {
        Self::new()
    }
}
