// ==========================================
// 安装物流进度管理系统 - 服务主入口
// ==========================================
// 技术栈: Rust + SQLite + Tokio
// 系统定位: 决策支持系统
// ==========================================

use std::time::Duration;

use install_logistics_aps::app::{get_default_db_path, AppState};
use install_logistics_aps::{APP_NAME, VERSION};

#[tokio::main]
async fn main() {
    // 初始化日志系统
    install_logistics_aps::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} - 决策支持系统", APP_NAME);
    tracing::info!("系统版本: {}", VERSION);
    tracing::info!("==================================================");

    // 获取数据库路径
    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    // 创建AppState
    tracing::info!("正在初始化AppState...");
    let app_state = match AppState::new(db_path) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("无法初始化AppState: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("AppState初始化成功");

    // 每日 EVM 快照循环（间隔由配置 snapshot.interval_hours 控制）
    run_snapshot_loop(&app_state).await;
}

// ==========================================
// 快照调度循环
// ==========================================
// 启动时立即执行一次，之后按配置间隔重复。
// 单项目失败不终止循环，失败明细记录在运行报告中。
async fn run_snapshot_loop(app_state: &AppState) {
    loop {
        match app_state.evm_api.snapshot_daily_evm() {
            Ok(report) => {
                tracing::info!(
                    "EVM快照完成: 日期={} 项目数={} 写入={} 失败={}",
                    report.snapshot_date,
                    report.projects_processed,
                    report.snapshots_written,
                    report.failures.len()
                );
                for failure in &report.failures {
                    tracing::warn!(
                        "EVM快照失败项目: {} 原因: {}",
                        failure.project_number,
                        failure.reason
                    );
                }
            }
            Err(e) => {
                tracing::error!("EVM快照执行失败: {}", e);
            }
        }

        let interval_hours = match app_state.config.snapshot_interval_hours() {
            Ok(hours) => hours,
            Err(e) => {
                tracing::warn!("读取快照间隔配置失败, 使用24小时: {}", e);
                24
            }
        };

        tracing::info!("下一次EVM快照将在 {} 小时后执行", interval_hours);
        tokio::time::sleep(Duration::from_secs(interval_hours as u64 * 3600)).await;
    }
}
