// ==========================================
// 安装物流进度管理系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、业务规则接口
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod dependency;
pub mod evm;
pub mod logistics;
pub mod readiness;
pub mod supply_item;
pub mod types;
pub mod work_package;

// 重导出核心类型
pub use dependency::{EffectiveDependency, PwbsDependency};
pub use evm::{EvmMetrics, EvmSnapshot, SnapshotFailure, SnapshotRunReport, StatusBreakdown};
pub use logistics::{CaseTracking, InventoryItem, Project, Shipment};
pub use readiness::{BlockingCase, ReadinessResult};
pub use supply_item::{InstallationRecord, SupplyItem};
pub use types::{
    DependencySource, DependencyType, EvmScope, InstallState, InventoryItemStatus,
    InventoryStatus, ProjectStatus, ReadinessStatus, ScheduleStatus, ShipmentStatus,
};
pub use work_package::{StatusTransition, WorkPackageSchedule};
