// ==========================================
// 安装物流进度管理系统 - 工作包排期领域模型
// ==========================================
// 主键: (project_number, pl_number)
// 派生字段由 WorkPackageAggregator 重算
// 排期字段由 ScheduleApi 写入
// ==========================================

use crate::domain::types::{ReadinessStatus, ScheduleStatus};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ==========================================
// WorkPackageSchedule - 工作包排期记录
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkPackageSchedule {
    pub project_number: String,  // 项目号
    pub pl_number: String,       // 工作包号 (PL号)

    // ===== 派生字段 (Aggregator 重算) =====
    pub pwbs_categories: BTreeSet<String>, // 包内物料涉及的 PWBS 分类
    pub item_count: i64,         // 物料条数
    pub total_quantity: f64,     // 数量合计
    pub total_weight_kg: f64,    // 重量合计 (kg)

    // ===== 排期字段 =====
    pub planned_start: Option<NaiveDate>, // 计划开始
    pub planned_end: Option<NaiveDate>,   // 计划结束
    pub actual_start: Option<NaiveDateTime>, // 实际开始
    pub actual_end: Option<NaiveDateTime>,   // 实际结束

    // ===== 状态字段 =====
    pub schedule_status: ScheduleStatus,   // 排期状态机
    pub readiness_status: ReadinessStatus, // 齐套状态
    pub dependency_override: bool, // 上次排期是否忽略依赖校验 (审计用)

    pub updated_at: NaiveDateTime,
}

impl WorkPackageSchedule {
    /// 新建未排期记录（Aggregator 首次发现该 PL 号时调用）
    pub fn new_unscheduled(project_number: &str, pl_number: &str) -> Self {
        Self {
            project_number: project_number.to_string(),
            pl_number: pl_number.to_string(),
            pwbs_categories: BTreeSet::new(),
            item_count: 0,
            total_quantity: 0.0,
            total_weight_kg: 0.0,
            planned_start: None,
            planned_end: None,
            actual_start: None,
            actual_end: None,
            schedule_status: ScheduleStatus::Unscheduled,
            readiness_status: ReadinessStatus::Blocked,
            dependency_override: false,
            updated_at: chrono::Utc::now().naive_utc(),
        }
    }

    /// 是否已有计划日期
    pub fn is_scheduled(&self) -> bool {
        self.planned_start.is_some() && self.planned_end.is_some()
    }

    /// 计划工期（天）; 未排期返回 None
    pub fn planned_duration_days(&self) -> Option<i64> {
        match (self.planned_start, self.planned_end) {
            (Some(s), Some(e)) => Some((e - s).num_days()),
            _ => None,
        }
    }
}

// ==========================================
// StatusTransition - 状态转换结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusTransition {
    pub previous_status: ScheduleStatus,
    pub new_status: ScheduleStatus,
}
