// ==========================================
// 安装物流进度管理系统 - 工作包排期 API
// ==========================================
// 职责: 排期写入 (含依赖校验)、状态机转换、下游级联应用、工作包汇总
// 约定:
// - 校验告警永不阻断写入; dependency_override=true 跳过校验并落库审计
// - 级联提议只在显式请求时计算，应用是独立的显式步骤
// - NotFound/InvalidRange 中止写入，无部分状态变更
// ==========================================

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::types::ScheduleStatus;
use crate::domain::work_package::{StatusTransition, WorkPackageSchedule};
use crate::engine::{
    CascadePlanner, CascadeProposal, DependencyResolver, ScheduleValidator, ValidationResult,
    WorkPackageAggregator,
};
use crate::repository::{
    PwbsDependencyRepository, SupplyItemRepository, WorkPackageScheduleRepository,
};

// ==========================================
// 请求/响应结构
// ==========================================

/// 排期选项
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ScheduleOptions {
    /// true: 跳过依赖校验 (告警已被人工确认并忽略)，并落库审计
    pub dependency_override: bool,
    /// true: 同时计算下游级联提议 (不自动应用)
    pub cascade: bool,
}

/// 排期结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutcome {
    pub validation: ValidationResult,
    pub downstream_proposals: Vec<CascadeProposal>,
}

/// 级联应用结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedDownstream {
    pub updated_count: usize,
}

/// 汇总结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationOutcome {
    pub created: usize,
    pub updated: usize,
    pub total: usize,
}

// ==========================================
// ScheduleApi - 排期 API
// ==========================================
pub struct ScheduleApi {
    work_package_repo: Arc<WorkPackageScheduleRepository>,
    dependency_repo: Arc<PwbsDependencyRepository>,
    supply_item_repo: Arc<SupplyItemRepository>,
    resolver: DependencyResolver,
    validator: ScheduleValidator,
    planner: CascadePlanner,
    aggregator: WorkPackageAggregator,
}

impl ScheduleApi {
    pub fn new(
        work_package_repo: Arc<WorkPackageScheduleRepository>,
        dependency_repo: Arc<PwbsDependencyRepository>,
        supply_item_repo: Arc<SupplyItemRepository>,
    ) -> Self {
        Self {
            work_package_repo,
            dependency_repo,
            supply_item_repo,
            resolver: DependencyResolver::new(),
            validator: ScheduleValidator::new(),
            planner: CascadePlanner::new(),
            aggregator: WorkPackageAggregator::new(),
        }
    }

    // ==========================================
    // 排期写入
    // ==========================================

    /// 为工作包写入计划窗口
    ///
    /// # 流程
    /// 1. start < end 前置校验 (InvalidRange)
    /// 2. 工作包存在性校验 (NotFound)
    /// 3. 依赖顺序校验 → 告警 (dependency_override=true 时跳过)
    /// 4. 无论告警与否写入计划日期 + override 审计标志
    /// 5. cascade=true 时计算下游提议 (不应用)
    pub fn schedule_work_package(
        &self,
        project_number: &str,
        pl_number: &str,
        planned_start: NaiveDate,
        planned_end: NaiveDate,
        options: ScheduleOptions,
    ) -> ApiResult<ScheduleOutcome> {
        if planned_start >= planned_end {
            return Err(ApiError::InvalidRange {
                start: planned_start.to_string(),
                end: planned_end.to_string(),
            });
        }

        let wp = self.get_work_package(project_number, pl_number)?;
        let all_packages = self.work_package_repo.list_by_project(project_number)?;

        // 依赖校验 (override 时整体跳过)
        let validation = if options.dependency_override {
            ValidationResult::valid()
        } else {
            let effective = self.resolve_effective(project_number)?;
            self.validator
                .validate(&wp, planned_start, planned_end, &effective, &all_packages)
        };

        if !validation.is_valid {
            tracing::warn!(
                project_number,
                pl_number,
                warning_count = validation.warnings.len(),
                "排期存在依赖顺序告警 (不阻断写入)"
            );
        }

        // 告警不阻断: 照常写入
        self.work_package_repo.update_planned_dates(
            project_number,
            pl_number,
            planned_start,
            planned_end,
            options.dependency_override,
        )?;

        // 下游级联提议 (建议性, 永不自动应用)
        let downstream_proposals = if options.cascade {
            let effective = self.resolve_effective(project_number)?;
            let mut rescheduled = wp;
            rescheduled.planned_start = Some(planned_start);
            rescheduled.planned_end = Some(planned_end);
            self.planner
                .propose(&rescheduled, planned_end, &effective, &all_packages)
        } else {
            Vec::new()
        };

        tracing::info!(
            project_number,
            pl_number,
            %planned_start,
            %planned_end,
            override_flag = options.dependency_override,
            proposal_count = downstream_proposals.len(),
            "工作包排期已写入"
        );

        Ok(ScheduleOutcome {
            validation,
            downstream_proposals,
        })
    }

    // ==========================================
    // 状态机转换
    // ==========================================

    /// 显式状态转换
    ///
    /// # 副作用
    /// - 进入 IN_PROGRESS: actual_start 未设则置当前时刻
    /// - 进入 COMPLETE: 置 actual_end; actual_start 仍空则一并回填
    pub fn update_work_package_status(
        &self,
        project_number: &str,
        pl_number: &str,
        new_status: ScheduleStatus,
    ) -> ApiResult<StatusTransition> {
        let wp = self.get_work_package(project_number, pl_number)?;
        let previous_status = wp.schedule_status;

        if !previous_status.can_transition_to(new_status) {
            return Err(ApiError::InvalidStateTransition {
                from: previous_status.to_string(),
                to: new_status.to_string(),
            });
        }

        let now = chrono::Utc::now().naive_utc();
        let mut actual_start = wp.actual_start;
        let mut actual_end = wp.actual_end;
        match new_status {
            ScheduleStatus::InProgress => {
                if actual_start.is_none() {
                    actual_start = Some(now);
                }
            }
            ScheduleStatus::Complete => {
                actual_end = Some(now);
                // 保证完成的包必有非空开始
                if actual_start.is_none() {
                    actual_start = Some(now);
                }
            }
            _ => {}
        }

        self.work_package_repo.update_status(
            project_number,
            pl_number,
            new_status,
            actual_start,
            actual_end,
        )?;

        tracing::info!(
            project_number,
            pl_number,
            from = %previous_status,
            to = %new_status,
            "工作包状态转换"
        );

        Ok(StatusTransition {
            previous_status,
            new_status,
        })
    }

    // ==========================================
    // 级联应用
    // ==========================================

    /// 应用下游级联提议 (独立显式步骤)
    ///
    /// # 说明
    /// - 整体平移: 开始/结束同 delta，工期保持
    /// - 先整体校验所有后序存在，再写入，避免部分应用
    pub fn apply_downstream_updates(
        &self,
        proposals: &[CascadeProposal],
    ) -> ApiResult<AppliedDownstream> {
        // 存在性预校验
        for proposal in proposals {
            self.get_work_package(&proposal.project_number, &proposal.pl_number)?;
        }

        let mut updated_count = 0;
        for proposal in proposals {
            let (new_start, new_end) = self.planner.apply_shift(proposal);
            self.work_package_repo.update_planned_window(
                &proposal.project_number,
                &proposal.pl_number,
                new_start,
                new_end,
            )?;
            updated_count += 1;
        }

        tracing::info!(updated_count, "下游级联已应用");
        Ok(AppliedDownstream { updated_count })
    }

    // ==========================================
    // 工作包汇总
    // ==========================================

    /// 重建项目下全部工作包的派生字段
    ///
    /// # 说明
    /// 不存在的 PL 号创建记录 (UNSCHEDULED / BLOCKED)，已存在的只补丁派生字段
    pub fn aggregate_work_packages(
        &self,
        project_number: &str,
    ) -> ApiResult<AggregationOutcome> {
        if project_number.trim().is_empty() {
            return Err(ApiError::InvalidInput("项目号不能为空".to_string()));
        }

        let items = self.supply_item_repo.list_by_project(project_number)?;
        let rollups = self.aggregator.rollup(&items);

        let mut created = 0;
        let mut updated = 0;
        for rollup in &rollups {
            match self
                .work_package_repo
                .find(project_number, &rollup.pl_number)?
            {
                Some(_) => {
                    self.work_package_repo.update_rollup(
                        project_number,
                        &rollup.pl_number,
                        &rollup.pwbs_categories,
                        rollup.item_count,
                        rollup.total_quantity,
                        rollup.total_weight_kg,
                    )?;
                    updated += 1;
                }
                None => {
                    let mut wp =
                        WorkPackageSchedule::new_unscheduled(project_number, &rollup.pl_number);
                    wp.pwbs_categories = rollup.pwbs_categories.clone();
                    wp.item_count = rollup.item_count;
                    wp.total_quantity = rollup.total_quantity;
                    wp.total_weight_kg = rollup.total_weight_kg;
                    self.work_package_repo.upsert(&wp)?;
                    created += 1;
                }
            }
        }

        tracing::info!(project_number, created, updated, "工作包汇总完成");
        Ok(AggregationOutcome {
            created,
            updated,
            total: rollups.len(),
        })
    }

    // ==========================================
    // 内部辅助
    // ==========================================

    fn get_work_package(
        &self,
        project_number: &str,
        pl_number: &str,
    ) -> ApiResult<WorkPackageSchedule> {
        self.work_package_repo
            .find(project_number, pl_number)?
            .ok_or_else(|| {
                ApiError::NotFound(format!("工作包 {}/{} 不存在", project_number, pl_number))
            })
    }

    fn resolve_effective(
        &self,
        project_number: &str,
    ) -> ApiResult<Vec<crate::domain::dependency::EffectiveDependency>> {
        let defaults = self.dependency_repo.list_defaults()?;
        let overrides = self.dependency_repo.list_project_overrides(project_number)?;
        Ok(self.resolver.merge(&defaults, &overrides))
    }
}
