// ==========================================
// 安装物流进度管理系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value, scope_id='global')
// ==========================================

use crate::db::open_sqlite_connection;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

// ==========================================
// 配置键全集
// ==========================================
pub mod config_keys {
    /// 齐套阻断阈值: (在途+缺失)/总数 ≥ 该值判 BLOCKED
    pub const READINESS_BLOCKED_RATIO_THRESHOLD: &str = "readiness.blocked_ratio_threshold";
    /// 挣值趋势查询默认窗口 (天)
    pub const EVM_TREND_DEFAULT_DAYS: &str = "evm.trend_default_days";
    /// 快照任务运行间隔 (小时)
    pub const SNAPSHOT_INTERVAL_HOURS: &str = "snapshot.interval_hours";
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    pub fn get_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let result = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(result)
    }

    /// 写入配置值 (upsert)
    pub fn set_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES ('global', ?1, ?2, datetime('now'))
            ON CONFLICT (scope_id, key)
            DO UPDATE SET value = excluded.value, updated_at = datetime('now')
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    // ==========================================
    // 类型化读取 (带默认值; 值非法时回退默认并告警)
    // ==========================================

    /// 齐套阻断阈值 (默认 0.20)
    pub fn readiness_blocked_ratio_threshold(&self) -> RepositoryResult<f64> {
        self.get_f64(
            config_keys::READINESS_BLOCKED_RATIO_THRESHOLD,
            crate::engine::DEFAULT_BLOCKED_RATIO_THRESHOLD,
        )
    }

    /// 趋势查询默认窗口天数 (默认 30)
    pub fn evm_trend_default_days(&self) -> RepositoryResult<i64> {
        self.get_i64(config_keys::EVM_TREND_DEFAULT_DAYS, 30)
    }

    /// 快照任务间隔小时数 (默认 24, 下限 1)
    pub fn snapshot_interval_hours(&self) -> RepositoryResult<i64> {
        let hours = self.get_i64(config_keys::SNAPSHOT_INTERVAL_HOURS, 24)?;
        if hours < 1 {
            tracing::warn!(hours, "快照间隔配置小于1小时，按1小时执行");
            return Ok(1);
        }
        Ok(hours)
    }

    fn get_f64(&self, key: &str, default: f64) -> RepositoryResult<f64> {
        match self.get_config_value(key)? {
            Some(raw) => match raw.parse::<f64>() {
                Ok(v) => Ok(v),
                Err(_) => {
                    tracing::warn!(key, raw, "配置值非法，回退默认");
                    Ok(default)
                }
            },
            None => Ok(default),
        }
    }

    fn get_i64(&self, key: &str, default: i64) -> RepositoryResult<i64> {
        match self.get_config_value(key)? {
            Some(raw) => match raw.parse::<i64>() {
                Ok(v) => Ok(v),
                Err(_) => {
                    tracing::warn!(key, raw, "配置值非法，回退默认");
                    Ok(default)
                }
            },
            None => Ok(default),
        }
    }
}
