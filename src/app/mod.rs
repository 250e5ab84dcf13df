// ==========================================
// 安装物流进度管理系统 - 应用层
// ==========================================
// 职责: 应用状态装配与入口辅助
// ==========================================

pub mod state;

pub use state::{get_default_db_path, AppState};
