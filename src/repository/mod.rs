// ==========================================
// 安装物流进度管理系统 - 数据仓储层
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 红线: Repository 不含业务逻辑
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod dependency_repo;
pub mod error;
pub mod evm_snapshot_repo;
pub mod installation_repo;
pub mod logistics_repo;
pub mod project_repo;
pub mod supply_item_repo;
pub mod work_package_repo;

// 重导出核心仓储
pub use dependency_repo::PwbsDependencyRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use evm_snapshot_repo::EvmSnapshotRepository;
pub use installation_repo::InstallationStatusRepository;
pub use logistics_repo::CaseLogisticsRepository;
pub use project_repo::ProjectRepository;
pub use supply_item_repo::SupplyItemRepository;
pub use work_package_repo::WorkPackageScheduleRepository;
