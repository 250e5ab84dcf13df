// ==========================================
// 安装物流进度管理系统 - 供货物料领域模型
// ==========================================
// 所有权: supply_item / installation_status 归外部协作方
// 本系统只读，不提供写路径
// ==========================================

use crate::domain::types::InstallState;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// SupplyItem - 供货物料
// ==========================================
// 身份不可变; 一个工作包下可有多条物料
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplyItem {
    pub item_id: String,            // 物料ID
    pub project_number: String,     // 所属项目号
    pub pl_number: Option<String>,  // 所属工作包 (PL号, 可空)
    pub pwbs: Option<String>,       // PWBS 分类码 (可空)
    pub quantity: f64,              // 数量
    pub weight_kg: f64,             // 重量 (kg)
    pub case_number: Option<String>, // 箱号 (可空)
    pub is_deleted: bool,           // 软删除标志
}

// ==========================================
// InstallationRecord - 安装状态记录
// ==========================================
// 外部"安装登记"操作写入，本系统在挣值计算中读取
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallationRecord {
    pub item_id: String,
    pub project_number: String,
    pub pl_number: Option<String>,
    pub status: InstallState,
    pub installed_at: Option<NaiveDateTime>, // status=INSTALLED 时填写
}
