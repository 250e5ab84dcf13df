// ==========================================
// 安装物流进度管理系统 - 齐套评估 API
// ==========================================
// 职责: 预取物流数据喂给 ReadinessEngine，回写工作包齐套状态
// 约定: calculate_readiness 重算并落库；get_readiness 只读存量状态不重算
// ==========================================

use std::collections::HashMap;
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::logistics::Shipment;
use crate::domain::readiness::ReadinessResult;
use crate::domain::types::ReadinessStatus;
use crate::engine::{ReadinessEngine, ReadinessInputs};
use crate::repository::{
    CaseLogisticsRepository, SupplyItemRepository, WorkPackageScheduleRepository,
};

// ==========================================
// ReadinessApi - 齐套评估 API
// ==========================================
pub struct ReadinessApi {
    work_package_repo: Arc<WorkPackageScheduleRepository>,
    supply_item_repo: Arc<SupplyItemRepository>,
    logistics_repo: Arc<CaseLogisticsRepository>,
    config: Arc<ConfigManager>,
}

impl ReadinessApi {
    pub fn new(
        work_package_repo: Arc<WorkPackageScheduleRepository>,
        supply_item_repo: Arc<SupplyItemRepository>,
        logistics_repo: Arc<CaseLogisticsRepository>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            work_package_repo,
            supply_item_repo,
            logistics_repo,
            config,
        }
    }

    /// 重算工作包齐套状态并落库
    pub fn calculate_readiness(
        &self,
        project_number: &str,
        pl_number: &str,
    ) -> ApiResult<ReadinessResult> {
        // NotFound 先于任何写入
        self.work_package_repo
            .find(project_number, pl_number)?
            .ok_or_else(|| {
                ApiError::NotFound(format!("工作包 {}/{} 不存在", project_number, pl_number))
            })?;

        let result = self.compute(project_number, pl_number)?;

        self.work_package_repo
            .update_readiness(project_number, pl_number, result.status)?;

        tracing::info!(
            project_number,
            pl_number,
            status = %result.status,
            total = result.total_items,
            in_transit = result.in_transit_items,
            missing = result.missing_items,
            "齐套状态已重算"
        );
        Ok(result)
    }

    /// 只读查询存量齐套状态 (不重算)
    pub fn get_readiness(
        &self,
        project_number: &str,
        pl_number: &str,
    ) -> ApiResult<ReadinessStatus> {
        let wp = self
            .work_package_repo
            .find(project_number, pl_number)?
            .ok_or_else(|| {
                ApiError::NotFound(format!("工作包 {}/{} 不存在", project_number, pl_number))
            })?;
        Ok(wp.readiness_status)
    }

    /// 预取 + 引擎计算 (无副作用)
    fn compute(&self, project_number: &str, pl_number: &str) -> ApiResult<ReadinessResult> {
        let items = self
            .supply_item_repo
            .list_by_work_package(project_number, pl_number)?;

        let case_inventory = self.logistics_repo.case_inventory_map(project_number)?;

        // 包内物料涉及的箱号 (去重)
        let mut case_numbers: Vec<String> = items
            .iter()
            .filter_map(|i| i.case_number.clone())
            .collect();
        case_numbers.sort();
        case_numbers.dedup();

        let inventory_items = self.logistics_repo.inventory_item_map(&case_numbers)?;

        // 未清点箱件的在途运输单
        let mut in_transit_cases: HashMap<String, Shipment> = HashMap::new();
        for case_number in &case_numbers {
            let inventoried = case_inventory
                .get(case_number)
                .map(|s| s.is_inventoried())
                .unwrap_or(false);
            if inventoried {
                continue;
            }
            if let Some(shipment) = self.logistics_repo.find_in_transit_shipment(case_number)? {
                in_transit_cases.insert(case_number.clone(), shipment);
            }
        }

        let picked_count = self.logistics_repo.picked_count(project_number, pl_number)?;

        let threshold = self.config.readiness_blocked_ratio_threshold()?;
        let engine = ReadinessEngine::with_threshold(threshold);
        Ok(engine.classify(
            project_number,
            pl_number,
            &ReadinessInputs {
                items: &items,
                case_inventory: &case_inventory,
                inventory_items: &inventory_items,
                in_transit_cases: &in_transit_cases,
                picked_count,
            },
        ))
    }
}
