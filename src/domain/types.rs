// ==========================================
// 安装物流进度管理系统 - 领域类型定义
// ==========================================
// 红线: 状态一律用封闭枚举，不用自由字符串
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 排期状态 (Schedule Status)
// ==========================================
// 状态机: UNSCHEDULED → SCHEDULED → IN_PROGRESS → COMPLETE
// ON_HOLD 可从任意状态进入，也可退回任意状态（侧标志语义）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleStatus {
    Unscheduled, // 未排期
    Scheduled,   // 已排期
    InProgress,  // 安装中
    Complete,    // 已完成
    OnHold,      // 暂停
}

impl ScheduleStatus {
    /// 链上顺序（ON_HOLD 不在主链上）
    fn chain_index(self) -> Option<u8> {
        match self {
            ScheduleStatus::Unscheduled => Some(0),
            ScheduleStatus::Scheduled => Some(1),
            ScheduleStatus::InProgress => Some(2),
            ScheduleStatus::Complete => Some(3),
            ScheduleStatus::OnHold => None,
        }
    }

    /// 状态转换合法性
    ///
    /// 规则:
    /// - 进入/退出 ON_HOLD 不受限制
    /// - 主链上只允许向前推进（可跳级）
    pub fn can_transition_to(self, to: ScheduleStatus) -> bool {
        if self == to {
            return false;
        }
        match (self.chain_index(), to.chain_index()) {
            (_, None) => true,       // 任意状态 → ON_HOLD
            (None, Some(_)) => true, // ON_HOLD → 任意状态
            (Some(from_idx), Some(to_idx)) => to_idx > from_idx,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "UNSCHEDULED" => Some(ScheduleStatus::Unscheduled),
            "SCHEDULED" => Some(ScheduleStatus::Scheduled),
            "IN_PROGRESS" => Some(ScheduleStatus::InProgress),
            "COMPLETE" => Some(ScheduleStatus::Complete),
            "ON_HOLD" => Some(ScheduleStatus::OnHold),
            _ => None,
        }
    }
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleStatus::Unscheduled => write!(f, "UNSCHEDULED"),
            ScheduleStatus::Scheduled => write!(f, "SCHEDULED"),
            ScheduleStatus::InProgress => write!(f, "IN_PROGRESS"),
            ScheduleStatus::Complete => write!(f, "COMPLETE"),
            ScheduleStatus::OnHold => write!(f, "ON_HOLD"),
        }
    }
}

// ==========================================
// 齐套状态 (Readiness Status)
// ==========================================
// 由 ReadinessEngine 计算，表示工作包物料到场程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReadinessStatus {
    Ready,   // 齐套: 全部清点入库且无缺损
    Partial, // 部分齐套
    Blocked, // 阻断: 缺口比例超阈值或无法评估
}

impl ReadinessStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "READY" => Some(ReadinessStatus::Ready),
            "PARTIAL" => Some(ReadinessStatus::Partial),
            "BLOCKED" => Some(ReadinessStatus::Blocked),
            _ => None,
        }
    }
}

impl fmt::Display for ReadinessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadinessStatus::Ready => write!(f, "READY"),
            ReadinessStatus::Partial => write!(f, "PARTIAL"),
            ReadinessStatus::Blocked => write!(f, "BLOCKED"),
        }
    }
}

// ==========================================
// 依赖类型 (Dependency Type)
// ==========================================
// FINISH_TO_START: 前序结束后后序才能开始
// START_TO_START: 前序开始后后序才能开始
// NONE: 显式抑制（项目覆写可用 NONE 关闭默认依赖）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DependencyType {
    FinishToStart,
    StartToStart,
    None,
}

impl DependencyType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "FINISH_TO_START" => Some(DependencyType::FinishToStart),
            "START_TO_START" => Some(DependencyType::StartToStart),
            "NONE" => Some(DependencyType::None),
            _ => None,
        }
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyType::FinishToStart => write!(f, "FINISH_TO_START"),
            DependencyType::StartToStart => write!(f, "START_TO_START"),
            DependencyType::None => write!(f, "NONE"),
        }
    }
}

// ==========================================
// 依赖来源 (Dependency Source)
// ==========================================
// 有效依赖必须可解释: 来自全局默认还是项目覆写
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DependencySource {
    Default,
    ProjectOverride,
}

impl fmt::Display for DependencySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencySource::Default => write!(f, "DEFAULT"),
            DependencySource::ProjectOverride => write!(f, "PROJECT_OVERRIDE"),
        }
    }
}

// ==========================================
// 挣值分析范围 (EVM Scope)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvmScope {
    Project,     // 整个项目
    Pwbs,        // 单个 PWBS 分类
    WorkPackage, // 单个工作包
}

impl EvmScope {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PROJECT" => Some(EvmScope::Project),
            "PWBS" => Some(EvmScope::Pwbs),
            "WORK_PACKAGE" => Some(EvmScope::WorkPackage),
            _ => None,
        }
    }
}

impl fmt::Display for EvmScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvmScope::Project => write!(f, "PROJECT"),
            EvmScope::Pwbs => write!(f, "PWBS"),
            EvmScope::WorkPackage => write!(f, "WORK_PACKAGE"),
        }
    }
}

// ==========================================
// 安装状态 (Install State)
// ==========================================
// 外部协作方写入，本系统只读
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstallState {
    NotStarted,
    InProgress,
    Installed,
    Issue,
}

impl InstallState {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "NOT_STARTED" => Some(InstallState::NotStarted),
            "IN_PROGRESS" => Some(InstallState::InProgress),
            "INSTALLED" => Some(InstallState::Installed),
            "ISSUE" => Some(InstallState::Issue),
            _ => None,
        }
    }
}

impl fmt::Display for InstallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallState::NotStarted => write!(f, "NOT_STARTED"),
            InstallState::InProgress => write!(f, "IN_PROGRESS"),
            InstallState::Installed => write!(f, "INSTALLED"),
            InstallState::Issue => write!(f, "ISSUE"),
        }
    }
}

// ==========================================
// 箱件清点状态 (Case Inventory Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InventoryStatus {
    Pending,     // 待清点
    InProgress,  // 清点中
    Complete,    // 清点完成
    Discrepancy, // 清点完成但有差异
}

impl InventoryStatus {
    /// 该状态下箱内物料视为"已清点"
    pub fn is_inventoried(self) -> bool {
        matches!(self, InventoryStatus::Complete | InventoryStatus::Discrepancy)
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(InventoryStatus::Pending),
            "IN_PROGRESS" => Some(InventoryStatus::InProgress),
            "COMPLETE" => Some(InventoryStatus::Complete),
            "DISCREPANCY" => Some(InventoryStatus::Discrepancy),
            _ => None,
        }
    }
}

impl fmt::Display for InventoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InventoryStatus::Pending => write!(f, "PENDING"),
            InventoryStatus::InProgress => write!(f, "IN_PROGRESS"),
            InventoryStatus::Complete => write!(f, "COMPLETE"),
            InventoryStatus::Discrepancy => write!(f, "DISCREPANCY"),
        }
    }
}

// ==========================================
// 物料清点明细状态 (Inventory Item Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InventoryItemStatus {
    Expected, // 预期在箱
    Received, // 实收
    Missing,  // 缺失
    Damaged,  // 损坏
}

impl InventoryItemStatus {
    /// 缺失/损坏的物料计入 missing_items
    pub fn is_missing_or_damaged(self) -> bool {
        matches!(self, InventoryItemStatus::Missing | InventoryItemStatus::Damaged)
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "EXPECTED" => Some(InventoryItemStatus::Expected),
            "RECEIVED" => Some(InventoryItemStatus::Received),
            "MISSING" => Some(InventoryItemStatus::Missing),
            "DAMAGED" => Some(InventoryItemStatus::Damaged),
            _ => None,
        }
    }
}

impl fmt::Display for InventoryItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InventoryItemStatus::Expected => write!(f, "EXPECTED"),
            InventoryItemStatus::Received => write!(f, "RECEIVED"),
            InventoryItemStatus::Missing => write!(f, "MISSING"),
            InventoryItemStatus::Damaged => write!(f, "DAMAGED"),
        }
    }
}

// ==========================================
// 运输状态 (Shipment Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipmentStatus {
    AtFactory, // 在厂
    InTransit, // 海/陆运输中
    AtPort,    // 到港
    Customs,   // 清关中
    Delivered, // 已送达现场
}

impl ShipmentStatus {
    /// 在途状态: 物料尚未到场
    pub fn is_in_transit(self) -> bool {
        matches!(
            self,
            ShipmentStatus::AtFactory
                | ShipmentStatus::InTransit
                | ShipmentStatus::AtPort
                | ShipmentStatus::Customs
        )
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "AT_FACTORY" => Some(ShipmentStatus::AtFactory),
            "IN_TRANSIT" => Some(ShipmentStatus::InTransit),
            "AT_PORT" => Some(ShipmentStatus::AtPort),
            "CUSTOMS" => Some(ShipmentStatus::Customs),
            "DELIVERED" => Some(ShipmentStatus::Delivered),
            _ => None,
        }
    }
}

impl fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShipmentStatus::AtFactory => write!(f, "AT_FACTORY"),
            ShipmentStatus::InTransit => write!(f, "IN_TRANSIT"),
            ShipmentStatus::AtPort => write!(f, "AT_PORT"),
            ShipmentStatus::Customs => write!(f, "CUSTOMS"),
            ShipmentStatus::Delivered => write!(f, "DELIVERED"),
        }
    }
}

// ==========================================
// 项目状态 (Project Status)
// ==========================================
// 每日快照任务跳过 COMPLETE 项目
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    Active,
    OnHold,
    Complete,
}

impl ProjectStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(ProjectStatus::Active),
            "ON_HOLD" => Some(ProjectStatus::OnHold),
            "COMPLETE" => Some(ProjectStatus::Complete),
            _ => None,
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectStatus::Active => write!(f, "ACTIVE"),
            ProjectStatus::OnHold => write!(f, "ON_HOLD"),
            ProjectStatus::Complete => write!(f, "COMPLETE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_status_forward_chain() {
        assert!(ScheduleStatus::Unscheduled.can_transition_to(ScheduleStatus::Scheduled));
        assert!(ScheduleStatus::Scheduled.can_transition_to(ScheduleStatus::InProgress));
        assert!(ScheduleStatus::InProgress.can_transition_to(ScheduleStatus::Complete));
        // 可跳级
        assert!(ScheduleStatus::Unscheduled.can_transition_to(ScheduleStatus::InProgress));
        // 不可回退
        assert!(!ScheduleStatus::Complete.can_transition_to(ScheduleStatus::InProgress));
        assert!(!ScheduleStatus::Scheduled.can_transition_to(ScheduleStatus::Unscheduled));
    }

    #[test]
    fn test_on_hold_is_side_flag() {
        assert!(ScheduleStatus::Unscheduled.can_transition_to(ScheduleStatus::OnHold));
        assert!(ScheduleStatus::Complete.can_transition_to(ScheduleStatus::OnHold));
        assert!(ScheduleStatus::OnHold.can_transition_to(ScheduleStatus::Unscheduled));
        assert!(ScheduleStatus::OnHold.can_transition_to(ScheduleStatus::InProgress));
    }

    #[test]
    fn test_parse_roundtrip() {
        for s in [
            ScheduleStatus::Unscheduled,
            ScheduleStatus::Scheduled,
            ScheduleStatus::InProgress,
            ScheduleStatus::Complete,
            ScheduleStatus::OnHold,
        ] {
            assert_eq!(ScheduleStatus::parse(&s.to_string()), Some(s));
        }
        assert_eq!(ScheduleStatus::parse("BOGUS"), None);
        assert_eq!(DependencyType::parse("FINISH_TO_START"), Some(DependencyType::FinishToStart));
        assert_eq!(EvmScope::parse("WORK_PACKAGE"), Some(EvmScope::WorkPackage));
    }

    #[test]
    fn test_in_transit_states() {
        assert!(ShipmentStatus::AtFactory.is_in_transit());
        assert!(ShipmentStatus::Customs.is_in_transit());
        assert!(!ShipmentStatus::Delivered.is_in_transit());
    }
}
