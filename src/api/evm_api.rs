// ==========================================
// 安装物流进度管理系统 - 挣值分析 API
// ==========================================
// 职责: 实时挣值查询、趋势查询、每日快照批任务
// 红线: 实时查询与快照任务共用 EvmEngine，口径永不漂移
// 约定: 快照任务单项目失败被隔离并记入报告，不中断整批
// ==========================================

use std::sync::Arc;

use chrono::NaiveDate;

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::evm::{EvmMetrics, EvmSnapshot, SnapshotFailure, SnapshotRunReport};
use crate::domain::types::EvmScope;
use crate::engine::EvmEngine;
use crate::repository::{
    EvmSnapshotRepository, InstallationStatusRepository, ProjectRepository,
    SupplyItemRepository, WorkPackageScheduleRepository,
};

// ==========================================
// EvmApi - 挣值分析 API
// ==========================================
pub struct EvmApi {
    supply_item_repo: Arc<SupplyItemRepository>,
    installation_repo: Arc<InstallationStatusRepository>,
    work_package_repo: Arc<WorkPackageScheduleRepository>,
    snapshot_repo: Arc<EvmSnapshotRepository>,
    project_repo: Arc<ProjectRepository>,
    config: Arc<ConfigManager>,
    engine: EvmEngine,
}

impl EvmApi {
    pub fn new(
        supply_item_repo: Arc<SupplyItemRepository>,
        installation_repo: Arc<InstallationStatusRepository>,
        work_package_repo: Arc<WorkPackageScheduleRepository>,
        snapshot_repo: Arc<EvmSnapshotRepository>,
        project_repo: Arc<ProjectRepository>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            supply_item_repo,
            installation_repo,
            work_package_repo,
            snapshot_repo,
            project_repo,
            config,
            engine: EvmEngine::new(),
        }
    }

    // ==========================================
    // 实时挣值查询
    // ==========================================

    /// 任意范围任意截止日的挣值指标
    ///
    /// # 参数
    /// - scope_id: scope=PROJECT 时忽略; 其余范围必填 (MissingScopeId)
    /// - as_of_date: None 时取今天 (UTC)
    pub fn calculate_evm(
        &self,
        project_number: &str,
        scope: EvmScope,
        scope_id: Option<&str>,
        as_of_date: Option<NaiveDate>,
    ) -> ApiResult<EvmMetrics> {
        if scope != EvmScope::Project && scope_id.map(|s| s.trim().is_empty()).unwrap_or(true) {
            return Err(ApiError::MissingScopeId {
                scope: scope.to_string(),
            });
        }

        self.project_repo.find(project_number)?.ok_or_else(|| {
            ApiError::NotFound(format!("项目 {} 不存在", project_number))
        })?;

        let as_of = as_of_date.unwrap_or_else(today_utc);

        let scope_items = match scope {
            EvmScope::Project => self.supply_item_repo.list_by_project(project_number)?,
            EvmScope::Pwbs => self
                .supply_item_repo
                .list_by_pwbs(project_number, scope_id.unwrap_or_default())?,
            EvmScope::WorkPackage => self
                .supply_item_repo
                .list_by_work_package(project_number, scope_id.unwrap_or_default())?,
        };
        let installations = self.installation_repo.map_by_item(project_number)?;
        let work_packages = self.work_package_repo.list_by_project(project_number)?;

        Ok(self.engine.calculate(
            project_number,
            scope,
            if scope == EvmScope::Project { None } else { scope_id },
            as_of,
            &scope_items,
            &installations,
            &work_packages,
        ))
    }

    /// 项目范围便捷入口
    pub fn calculate_project_evm(
        &self,
        project_number: &str,
        as_of_date: Option<NaiveDate>,
    ) -> ApiResult<EvmMetrics> {
        self.calculate_evm(project_number, EvmScope::Project, None, as_of_date)
    }

    /// PWBS 范围便捷入口
    pub fn calculate_pwbs_evm(
        &self,
        project_number: &str,
        pwbs: &str,
        as_of_date: Option<NaiveDate>,
    ) -> ApiResult<EvmMetrics> {
        self.calculate_evm(project_number, EvmScope::Pwbs, Some(pwbs), as_of_date)
    }

    /// 工作包范围便捷入口
    pub fn calculate_work_package_evm(
        &self,
        project_number: &str,
        pl_number: &str,
        as_of_date: Option<NaiveDate>,
    ) -> ApiResult<EvmMetrics> {
        self.calculate_evm(
            project_number,
            EvmScope::WorkPackage,
            Some(pl_number),
            as_of_date,
        )
    }

    /// 项目下全部 PWBS 分类的挣值，SPI 升序 (最差在前)
    pub fn calculate_all_pwbs(
        &self,
        project_number: &str,
        as_of_date: Option<NaiveDate>,
    ) -> ApiResult<Vec<EvmMetrics>> {
        let codes = self.supply_item_repo.distinct_pwbs(project_number)?;
        let mut metrics = Vec::with_capacity(codes.len());
        for code in &codes {
            metrics.push(self.calculate_pwbs_evm(project_number, code, as_of_date)?);
        }
        sort_by_spi_ascending(&mut metrics);
        Ok(metrics)
    }

    /// 项目下全部工作包的挣值，SPI 升序 (最差在前)
    pub fn calculate_all_work_packages(
        &self,
        project_number: &str,
        as_of_date: Option<NaiveDate>,
    ) -> ApiResult<Vec<EvmMetrics>> {
        let packages = self.work_package_repo.list_by_project(project_number)?;
        let mut metrics = Vec::with_capacity(packages.len());
        for wp in &packages {
            metrics.push(self.calculate_work_package_evm(
                project_number,
                &wp.pl_number,
                as_of_date,
            )?);
        }
        sort_by_spi_ascending(&mut metrics);
        Ok(metrics)
    }

    // ==========================================
    // 趋势查询
    // ==========================================

    /// 查询快照趋势窗口，日期升序
    ///
    /// # 参数
    /// - days: None 时取配置默认 (30)
    /// - scope/scope_id: None 时默认项目范围
    pub fn get_evm_trend(
        &self,
        project_number: &str,
        days: Option<i64>,
        scope: Option<EvmScope>,
        scope_id: Option<&str>,
    ) -> ApiResult<Vec<EvmSnapshot>> {
        let scope = scope.unwrap_or(EvmScope::Project);
        if scope != EvmScope::Project && scope_id.map(|s| s.trim().is_empty()).unwrap_or(true) {
            return Err(ApiError::MissingScopeId {
                scope: scope.to_string(),
            });
        }

        let days = match days {
            Some(d) if d > 0 => d,
            Some(d) => {
                return Err(ApiError::InvalidInput(format!("趋势窗口天数非法: {}", d)));
            }
            None => self.config.evm_trend_default_days()?,
        };

        let from_date = today_utc() - chrono::Duration::days(days);
        let snapshots = self.snapshot_repo.list_trend(
            project_number,
            from_date,
            scope,
            scope_id.unwrap_or_default(),
        )?;
        Ok(snapshots)
    }

    // ==========================================
    // 每日快照批任务
    // ==========================================

    /// 每日挣值快照 (外部定时触发)
    ///
    /// # 流程
    /// 对每个非 COMPLETE 项目: 项目范围一条 + 每个 PWBS 一条 + 每个工作包一条,
    /// 以 (project, date, scope, scope_id) 为键 upsert; 重跑同日覆盖不重复
    ///
    /// # 失败隔离
    /// 单项目失败记入报告并继续后续项目
    pub fn snapshot_daily_evm(&self) -> ApiResult<SnapshotRunReport> {
        let snapshot_date = today_utc();
        let projects = self.project_repo.list_not_complete()?;

        let mut report = SnapshotRunReport {
            snapshot_date,
            ..Default::default()
        };

        tracing::info!(%snapshot_date, project_count = projects.len(), "每日挣值快照开始");

        for project in &projects {
            match self.snapshot_project(&project.project_number, snapshot_date) {
                Ok(written) => {
                    report.projects_processed += 1;
                    report.snapshots_written += written;
                }
                Err(e) => {
                    tracing::error!(
                        project_number = %project.project_number,
                        error = %e,
                        "项目快照失败，跳过继续"
                    );
                    report.failures.push(SnapshotFailure {
                        project_number: project.project_number.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            projects = report.projects_processed,
            written = report.snapshots_written,
            failed = report.failures.len(),
            "每日挣值快照完成"
        );
        Ok(report)
    }

    /// 单项目三级快照: 项目 → PWBS → 工作包
    fn snapshot_project(
        &self,
        project_number: &str,
        snapshot_date: NaiveDate,
    ) -> ApiResult<usize> {
        let mut snapshots = Vec::new();

        let project_metrics = self.calculate_project_evm(project_number, Some(snapshot_date))?;
        snapshots.push(EvmSnapshot::from_metrics(&project_metrics, snapshot_date));

        for pwbs in self.supply_item_repo.distinct_pwbs(project_number)? {
            let metrics = self.calculate_pwbs_evm(project_number, &pwbs, Some(snapshot_date))?;
            snapshots.push(EvmSnapshot::from_metrics(&metrics, snapshot_date));
        }

        for wp in self.work_package_repo.list_by_project(project_number)? {
            let metrics = self.calculate_work_package_evm(
                project_number,
                &wp.pl_number,
                Some(snapshot_date),
            )?;
            snapshots.push(EvmSnapshot::from_metrics(&metrics, snapshot_date));
        }

        let written = self.snapshot_repo.batch_upsert(&snapshots)?;
        Ok(written)
    }
}

/// 运行日 (UTC 零点归一后的日期部分)
fn today_utc() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

/// SPI 升序，最差在前
fn sort_by_spi_ascending(metrics: &mut [EvmMetrics]) {
    metrics.sort_by(|a, b| {
        a.spi
            .partial_cmp(&b.spi)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}
