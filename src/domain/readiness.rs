// ==========================================
// 安装物流进度管理系统 - 齐套评估领域模型
// ==========================================
// 分级规则:
// - BLOCKED: 物料数为 0 (无法评估), 或 (在途+缺失)/总数 ≥ 阈值 (默认 0.20)
// - READY:   全部已清点且缺失为 0
// - PARTIAL: 其余情况
// ==========================================

use crate::domain::types::{ReadinessStatus, ShipmentStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// ReadinessResult - 齐套评估结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResult {
    pub project_number: String,
    pub pl_number: String,
    pub status: ReadinessStatus,

    // ===== 计数 =====
    pub total_items: i64,       // 包内物料总数
    pub inventoried_items: i64, // 已清点物料数
    pub in_transit_items: i64,  // 在途物料数
    pub missing_items: i64,     // 缺失/损坏物料数
    pub picked_items: i64,      // 已拣配物料数

    // ===== 阻断箱件 (按箱去重) =====
    pub blocking_cases: Vec<BlockingCase>,
}

// ==========================================
// BlockingCase - 阻断箱件信息
// ==========================================
// 在途箱件及其 ETA，用于向现场解释"还差什么、什么时候到"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockingCase {
    pub case_number: String,
    pub shipment_id: Option<String>,
    pub shipment_status: Option<ShipmentStatus>,
    pub eta: Option<NaiveDate>,
}
