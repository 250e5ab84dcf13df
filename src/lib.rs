// ==========================================
// 安装物流进度管理系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 多现场安装项目的排期与挣值决策支持
// 核心: PWBS 依赖解析 / 排期校验 / 下游级联 / 齐套评估 /
//       挣值分析 (EVM) / 每日快照 / 工作包汇总
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/schema）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    DependencySource, DependencyType, EvmScope, InstallState, InventoryItemStatus,
    InventoryStatus, ProjectStatus, ReadinessStatus, ScheduleStatus, ShipmentStatus,
};

// 领域实体
pub use domain::{
    BlockingCase, EffectiveDependency, EvmMetrics, EvmSnapshot, InstallationRecord,
    PwbsDependency, ReadinessResult, SnapshotRunReport, StatusBreakdown, StatusTransition,
    SupplyItem, WorkPackageSchedule,
};

// 引擎
pub use engine::{
    CascadePlanner, CascadeProposal, DependencyResolver, EvmEngine, ReadinessEngine,
    ScheduleValidator, ValidationResult, ValidationWarning, WarningKind, WorkPackageAggregator,
};

// API
pub use api::{
    AggregationOutcome, AppliedDownstream, DependencyApi, EvmApi, ReadinessApi, ScheduleApi,
    ScheduleOptions, ScheduleOutcome,
};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "安装物流进度管理系统";
