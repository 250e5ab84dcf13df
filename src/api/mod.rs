// ==========================================
// 安装物流进度管理系统 - API 层
// ==========================================
// 职责: 业务接口; 预取数据喂引擎，落库引擎输出
// 架构: API 层 → Engine 层 (纯计算) + Repository 层 (数据访问)
// ==========================================

pub mod dependency_api;
pub mod error;
pub mod evm_api;
pub mod readiness_api;
pub mod schedule_api;

// 重导出核心 API
pub use dependency_api::DependencyApi;
pub use error::{ApiError, ApiResult};
pub use evm_api::EvmApi;
pub use readiness_api::ReadinessApi;
pub use schedule_api::{
    AggregationOutcome, AppliedDownstream, ScheduleApi, ScheduleOptions, ScheduleOutcome,
};
