// ==========================================
// 安装物流进度管理系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换Repository错误为用户可解释的错误
// 约定: NotFound/InvalidRange/MissingScopeId 同步抛出并中止写入，
//       校验告警只作为数据返回，永不作为错误抛出
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    /// 计划开始必须早于计划结束
    #[error("无效日期区间: start={start} end={end}")]
    InvalidRange { start: String, end: String },

    /// 非项目范围的挣值查询必须给 scope_id
    #[error("缺少范围ID: scope={scope}")]
    MissingScopeId { scope: String },

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("无效的状态转换: from={from} to={to}")]
    InvalidStateTransition { from: String, to: String },

    // ==========================================
    // 数据层错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(#[from] RepositoryError),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
