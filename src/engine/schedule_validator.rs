// ==========================================
// 安装物流进度管理系统 - 排期校验引擎
// ==========================================
// 职责: 对候选计划窗口做依赖顺序校验，产出非阻塞告警
// 红线: 告警只作为数据返回，永不阻断写入; 每条告警必须可解释
// 前置条件: planned_start < planned_end 由 API 层保证 (InvalidRange)
// ==========================================

use crate::domain::dependency::EffectiveDependency;
use crate::domain::types::DependencyType;
use crate::domain::work_package::WorkPackageSchedule;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// 告警类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningKind {
    PredecessorUnscheduled,   // 前序工作包尚未排期
    FinishToStartViolation,   // 开始早于前序计划结束
    StartToStartViolation,    // 开始早于前序计划开始
}

// ==========================================
// ValidationWarning - 单条校验告警
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub kind: WarningKind,
    pub from_pwbs: String,
    pub to_pwbs: String,
    pub dependency_type: DependencyType,
    pub predecessor_pl: String,
    pub detail: String, // 人读原因
}

// ==========================================
// ValidationResult - 校验结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            warnings: Vec::new(),
        }
    }
}

// ==========================================
// ScheduleValidator - 排期校验引擎
// ==========================================
pub struct ScheduleValidator {
    // 无状态引擎,不需要注入依赖
}

impl ScheduleValidator {
    pub fn new() -> Self {
        Self {}
    }

    /// 校验候选计划窗口
    ///
    /// # 参数
    /// - `wp`: 被排期的工作包
    /// - `candidate_start` / `candidate_end`: 候选计划窗口 (start < end 已由调用方校验)
    /// - `effective`: 项目有效依赖集
    /// - `all_packages`: 项目下全部工作包 (含 wp 本身，内部会跳过)
    pub fn validate(
        &self,
        wp: &WorkPackageSchedule,
        candidate_start: NaiveDate,
        _candidate_end: NaiveDate,
        effective: &[EffectiveDependency],
        all_packages: &[WorkPackageSchedule],
    ) -> ValidationResult {
        let mut warnings = Vec::new();

        for category in &wp.pwbs_categories {
            // 以该分类为后序的约束边
            let incoming = effective
                .iter()
                .filter(|e| e.to_pwbs == *category && e.is_constraining());

            for edge in incoming {
                // 同项目中含前序分类的其他工作包
                let predecessors = all_packages.iter().filter(|p| {
                    p.pl_number != wp.pl_number
                        && p.pwbs_categories.contains(&edge.from_pwbs)
                });

                for pred in predecessors {
                    match (pred.planned_start, pred.planned_end) {
                        (None, _) | (_, None) => {
                            warnings.push(ValidationWarning {
                                kind: WarningKind::PredecessorUnscheduled,
                                from_pwbs: edge.from_pwbs.clone(),
                                to_pwbs: edge.to_pwbs.clone(),
                                dependency_type: edge.dependency_type,
                                predecessor_pl: pred.pl_number.clone(),
                                detail: format!(
                                    "前序工作包 {} (分类 {}) 尚未排期",
                                    pred.pl_number, edge.from_pwbs
                                ),
                            });
                        }
                        (Some(pred_start), Some(pred_end)) => match edge.dependency_type {
                            DependencyType::FinishToStart if candidate_start < pred_end => {
                                warnings.push(ValidationWarning {
                                    kind: WarningKind::FinishToStartViolation,
                                    from_pwbs: edge.from_pwbs.clone(),
                                    to_pwbs: edge.to_pwbs.clone(),
                                    dependency_type: edge.dependency_type,
                                    predecessor_pl: pred.pl_number.clone(),
                                    detail: format!(
                                        "开始日 {} 早于前序工作包 {} 的计划结束 {}",
                                        candidate_start, pred.pl_number, pred_end
                                    ),
                                });
                            }
                            DependencyType::StartToStart if candidate_start < pred_start => {
                                warnings.push(ValidationWarning {
                                    kind: WarningKind::StartToStartViolation,
                                    from_pwbs: edge.from_pwbs.clone(),
                                    to_pwbs: edge.to_pwbs.clone(),
                                    dependency_type: edge.dependency_type,
                                    predecessor_pl: pred.pl_number.clone(),
                                    detail: format!(
                                        "开始日 {} 早于前序工作包 {} 的计划开始 {}",
                                        candidate_start, pred.pl_number, pred_start
                                    ),
                                });
                            }
                            _ => {}
                        },
                    }
                }
            }
        }

        ValidationResult {
            is_valid: warnings.is_empty(),
            warnings,
        }
    }
}

impl Default for ScheduleValidator {
    fn default() -> Self {
        Self::new()
    }
}
