// ==========================================
// 安装物流进度管理系统 - 挣值分析领域模型
// ==========================================
// 指标口径 (以"物料件数"为价值单位):
// - BAC = 范围内物料总数
// - PV  = 计划开始日 ≤ as_of 的工作包物料数之和
// - EV  = as_of 当日(含)前已安装物料数
// - SV = EV-PV; SPI = EV/PV (PV>0, 否则 0)
// - EAC = BAC/SPI (SPI>0, 否则未定义); VAC = BAC-EAC
// 本层不做四舍五入，呈现层自行处理
// ==========================================

use crate::domain::types::EvmScope;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// StatusBreakdown - 安装状态分布
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBreakdown {
    pub not_started: i64,
    pub in_progress: i64,
    pub installed: i64,
    pub issue: i64,
}

// ==========================================
// EvmMetrics - 挣值指标 (单范围单日)
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvmMetrics {
    pub project_number: String,
    pub scope: EvmScope,
    pub scope_id: Option<String>, // PROJECT 范围为 None
    pub as_of_date: NaiveDate,

    // ===== 基础指标 =====
    pub bac: i64, // Budget at Completion
    pub pv: i64,  // Planned Value
    pub ev: i64,  // Earned Value

    // ===== 派生指标 =====
    pub sv: i64,               // Schedule Variance = EV - PV
    pub spi: f64,              // Schedule Performance Index (PV=0 时为 0)
    pub percent_complete: f64, // 100*EV/BAC (BAC=0 时为 0)
    pub items_remaining: i64,  // BAC - EV
    pub eac: Option<f64>,      // Estimate at Completion (SPI>0 时有定义)
    pub vac: Option<f64>,      // Variance at Completion (EAC 有定义时)

    // ===== 状态分布 =====
    pub status_breakdown: StatusBreakdown,
}

// ==========================================
// EvmSnapshot - 每日挣值快照
// ==========================================
// 主键: (project_number, snapshot_date, scope, scope_id)
// 仅由快照任务 upsert; 约定上不可变
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvmSnapshot {
    pub project_number: String,
    pub snapshot_date: NaiveDate, // 运行日 (UTC 零点归一)
    pub scope: EvmScope,
    pub scope_id: String, // PROJECT 范围存空串

    pub bac: i64,
    pub pv: i64,
    pub ev: i64,
    pub sv: i64,
    pub spi: f64,
    pub percent_complete: f64,
    pub items_remaining: i64,
    pub eac: Option<f64>,
    pub vac: Option<f64>,
    pub status_breakdown: StatusBreakdown,

    pub created_at: NaiveDateTime,
}

impl EvmSnapshot {
    /// 由实时指标落快照
    pub fn from_metrics(metrics: &EvmMetrics, snapshot_date: NaiveDate) -> Self {
        Self {
            project_number: metrics.project_number.clone(),
            snapshot_date,
            scope: metrics.scope,
            scope_id: metrics.scope_id.clone().unwrap_or_default(),
            bac: metrics.bac,
            pv: metrics.pv,
            ev: metrics.ev,
            sv: metrics.sv,
            spi: metrics.spi,
            percent_complete: metrics.percent_complete,
            items_remaining: metrics.items_remaining,
            eac: metrics.eac,
            vac: metrics.vac,
            status_breakdown: metrics.status_breakdown,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}

// ==========================================
// SnapshotRunReport - 快照批任务运行报告
// ==========================================
// 单项目失败被隔离并记录，不中断整批
// snapshot_date 为本次运行日，任务入口统一赋值
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotRunReport {
    pub snapshot_date: NaiveDate,
    pub projects_processed: usize,
    pub snapshots_written: usize,
    pub failures: Vec<SnapshotFailure>,
}

/// 单项目快照失败记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotFailure {
    pub project_number: String,
    pub reason: String,
}
