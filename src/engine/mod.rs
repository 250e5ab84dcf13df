// ==========================================
// 安装物流进度管理系统 - 引擎层
// ==========================================
// 职责: 实现业务规则引擎,不拼 SQL
// 红线: Engine 不拼 SQL, 所有规则必须输出 reason
// ==========================================

pub mod aggregator;
pub mod cascade_planner;
pub mod dependency_resolver;
pub mod evm;
pub mod readiness;
pub mod schedule_validator;

// 重导出核心引擎
pub use aggregator::{WorkPackageAggregator, WorkPackageRollup};
pub use cascade_planner::{CascadePlanner, CascadeProposal};
pub use dependency_resolver::DependencyResolver;
pub use evm::EvmEngine;
pub use readiness::{ReadinessEngine, ReadinessInputs, DEFAULT_BLOCKED_RATIO_THRESHOLD};
pub use schedule_validator::{
    ScheduleValidator, ValidationResult, ValidationWarning, WarningKind,
};
