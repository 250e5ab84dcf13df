// ==========================================
// 安装物流进度管理系统 - 物流协作方领域模型
// ==========================================
// 所有权: 箱件追踪/清点/运输/拣配均归外部协作方
// 本系统只读，用于齐套评估与快照枚举
// ==========================================

use crate::domain::types::{
    InventoryItemStatus, InventoryStatus, ProjectStatus, ShipmentStatus,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// Project - 项目
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub project_number: String,
    pub project_name: String,
    pub status: ProjectStatus,
}

// ==========================================
// CaseTracking - 箱件追踪
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseTracking {
    pub case_number: String,
    pub project_number: String,
    pub inventory_status: InventoryStatus,
}

// ==========================================
// InventoryItem - 物料清点明细
// ==========================================
// 清点时逐件登记; 与 supply_item 按 item_id 关联
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItem {
    pub inventory_item_id: String,
    pub case_number: String,
    pub item_id: String,
    pub status: InventoryItemStatus,
}

// ==========================================
// Shipment - 运输单
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shipment {
    pub shipment_id: String,
    pub status: ShipmentStatus,
    pub eta: Option<NaiveDate>,
}
