// ==========================================
// 安装物流进度管理系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 说明: 所有仓储共享同一条 SQLite 连接 (统一 PRAGMA)
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{DependencyApi, EvmApi, ReadinessApi, ScheduleApi};
use crate::config::ConfigManager;
use crate::db;
use crate::repository::{
    CaseLogisticsRepository, EvmSnapshotRepository, InstallationStatusRepository,
    ProjectRepository, PwbsDependencyRepository, SupplyItemRepository,
    WorkPackageScheduleRepository,
};

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 依赖管理API
    pub dependency_api: Arc<DependencyApi>,

    /// 排期API
    pub schedule_api: Arc<ScheduleApi>,

    /// 齐套评估API
    pub readiness_api: Arc<ReadinessApi>,

    /// 挣值分析API (含每日快照任务入口)
    pub evm_api: Arc<EvmApi>,

    /// 配置管理器
    pub config: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开共享数据库连接并初始化 schema
    /// 2. 初始化所有Repository
    /// 3. 创建所有API实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = db::open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        db::init_schema(&conn).map_err(|e| format!("schema 初始化失败: {}", e))?;

        if let Ok(Some(version)) = db::read_schema_version(&conn) {
            if version != db::CURRENT_SCHEMA_VERSION {
                tracing::warn!(
                    found = version,
                    expected = db::CURRENT_SCHEMA_VERSION,
                    "schema_version 与代码期望不一致"
                );
            }
        }

        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let work_package_repo =
            Arc::new(WorkPackageScheduleRepository::from_connection(conn.clone()));
        let dependency_repo = Arc::new(PwbsDependencyRepository::from_connection(conn.clone()));
        let supply_item_repo = Arc::new(SupplyItemRepository::from_connection(conn.clone()));
        let installation_repo =
            Arc::new(InstallationStatusRepository::from_connection(conn.clone()));
        let logistics_repo = Arc::new(CaseLogisticsRepository::from_connection(conn.clone()));
        let snapshot_repo = Arc::new(EvmSnapshotRepository::from_connection(conn.clone()));
        let project_repo = Arc::new(ProjectRepository::from_connection(conn.clone()));
        let config = Arc::new(ConfigManager::from_connection(conn.clone()));

        // ==========================================
        // 创建API实例
        // ==========================================
        let dependency_api = Arc::new(DependencyApi::new(dependency_repo.clone()));
        let schedule_api = Arc::new(ScheduleApi::new(
            work_package_repo.clone(),
            dependency_repo.clone(),
            supply_item_repo.clone(),
        ));
        let readiness_api = Arc::new(ReadinessApi::new(
            work_package_repo.clone(),
            supply_item_repo.clone(),
            logistics_repo.clone(),
            config.clone(),
        ));
        let evm_api = Arc::new(EvmApi::new(
            supply_item_repo,
            installation_repo,
            work_package_repo,
            snapshot_repo,
            project_repo,
            config.clone(),
        ));

        tracing::info!("AppState初始化成功");

        Ok(Self {
            db_path,
            dependency_api,
            schedule_api,
            readiness_api,
            evm_api,
            config,
        })
    }
}

// ==========================================
// 默认数据库路径
// ==========================================

/// 获取默认数据库路径
///
/// # 返回
/// - 环境变量 INSTALL_LOGISTICS_APS_DB_PATH 优先 (便于调试/测试/CI)
/// - 其次用户数据目录/install-logistics-aps/install_logistics_aps.db
/// - 拿不到数据目录时回退当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("INSTALL_LOGISTICS_APS_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./install_logistics_aps.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("install-logistics-aps");
        std::fs::create_dir_all(&dir).ok();
        path = dir.join("install_logistics_aps.db");
    }

    path.to_string_lossy().to_string()
}
