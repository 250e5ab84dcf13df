// ==========================================
// 安装物流进度管理系统 - 挣值分析引擎
// ==========================================
// 职责: 对任意范围 (项目/PWBS/工作包) 在任意 as_of 日计算挣值指标
// 红线: 实时查询与每日快照共用本引擎，保证口径永不漂移
// 数值口径:
// - SPI = EV/PV 仅当 PV>0，否则 0
// - percent_complete = 100*EV/BAC 仅当 BAC>0，否则 0
// - EAC = BAC/SPI 仅当 SPI>0，否则未定义; VAC 随 EAC
// - 本层不做四舍五入
// ==========================================

use crate::domain::evm::{EvmMetrics, StatusBreakdown};
use crate::domain::supply_item::{InstallationRecord, SupplyItem};
use crate::domain::types::{EvmScope, InstallState};
use crate::domain::work_package::WorkPackageSchedule;
use chrono::NaiveDate;
use std::collections::HashMap;

// ==========================================
// EvmEngine - 挣值分析引擎
// ==========================================
pub struct EvmEngine {
    // 无状态引擎,不需要注入依赖
    // Repository 操作由调用方处理
}

impl EvmEngine {
    pub fn new() -> Self {
        Self {}
    }

    /// 计算单范围单日挣值指标
    ///
    /// # 参数
    /// - `scope_items`: 已按范围过滤的未删除物料
    ///   (PWBS 范围 → 该分类物料; 工作包范围 → 该包物料; 项目范围 → 全部)
    /// - `installations`: 项目安装记录按 item_id 索引
    /// - `work_packages`: 项目下全部工作包 (PV 需要其计划开始日)
    /// - `as_of_date`: 截止日 (含当日)
    pub fn calculate(
        &self,
        project_number: &str,
        scope: EvmScope,
        scope_id: Option<&str>,
        as_of_date: NaiveDate,
        scope_items: &[SupplyItem],
        installations: &HashMap<String, InstallationRecord>,
        work_packages: &[WorkPackageSchedule],
    ) -> EvmMetrics {
        // BAC: 范围内物料总数
        let bac = scope_items.len() as i64;

        // 范围物料按工作包分组 (无 PL 号的物料不参与 PV)
        let mut items_per_pl: HashMap<&str, i64> = HashMap::new();
        for item in scope_items {
            if let Some(pl) = &item.pl_number {
                *items_per_pl.entry(pl.as_str()).or_insert(0) += 1;
            }
        }

        // PV: 计划开始日 ≤ as_of 的工作包贡献其范围内物料数
        // 未排期工作包贡献 0
        let pv: i64 = work_packages
            .iter()
            .filter(|wp| matches!(wp.planned_start, Some(start) if start <= as_of_date))
            .map(|wp| items_per_pl.get(wp.pl_number.as_str()).copied().unwrap_or(0))
            .sum();

        // EV + 状态分布: 截止 as_of 当日 (含) 已安装的物料
        let mut ev: i64 = 0;
        let mut breakdown = StatusBreakdown::default();
        for item in scope_items {
            match installations.get(&item.item_id) {
                Some(record) => {
                    match record.status {
                        InstallState::NotStarted => breakdown.not_started += 1,
                        InstallState::InProgress => breakdown.in_progress += 1,
                        InstallState::Installed => breakdown.installed += 1,
                        InstallState::Issue => breakdown.issue += 1,
                    }
                    if record.status == InstallState::Installed {
                        let installed_in_window = record
                            .installed_at
                            .map(|t| t.date() <= as_of_date)
                            .unwrap_or(false);
                        if installed_in_window {
                            ev += 1;
                        }
                    }
                }
                // 无安装记录视为未开始
                None => breakdown.not_started += 1,
            }
        }

        // 派生指标 (除零保护按口径)
        let sv = ev - pv;
        let spi = if pv > 0 { ev as f64 / pv as f64 } else { 0.0 };
        let percent_complete = if bac > 0 {
            100.0 * ev as f64 / bac as f64
        } else {
            0.0
        };
        let items_remaining = bac - ev;
        let eac = if spi > 0.0 { Some(bac as f64 / spi) } else { None };
        let vac = eac.map(|e| bac as f64 - e);

        EvmMetrics {
            project_number: project_number.to_string(),
            scope,
            scope_id: scope_id.map(|s| s.to_string()),
            as_of_date,
            bac,
            pv,
            ev,
            sv,
            spi,
            percent_complete,
            items_remaining,
            eac,
            vac,
            status_breakdown: breakdown,
        }
    }
}

impl Default for EvmEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn item(id: &str, pl: Option<&str>) -> SupplyItem {
        SupplyItem {
            item_id: id.to_string(),
            project_number: "P1".to_string(),
            pl_number: pl.map(|s| s.to_string()),
            pwbs: Some("K".to_string()),
            quantity: 1.0,
            weight_kg: 10.0,
            case_number: None,
            is_deleted: false,
        }
    }

    fn installed(id: &str, at: &str) -> (String, InstallationRecord) {
        (
            id.to_string(),
            InstallationRecord {
                item_id: id.to_string(),
                project_number: "P1".to_string(),
                pl_number: Some("WP1".to_string()),
                status: InstallState::Installed,
                installed_at: Some(
                    NaiveDateTime::parse_from_str(at, "%Y-%m-%d %H:%M:%S").unwrap(),
                ),
            },
        )
    }

    fn wp(pl: &str, start: Option<&str>) -> WorkPackageSchedule {
        let mut w = WorkPackageSchedule::new_unscheduled("P1", pl);
        w.planned_start = start.map(|s| s.parse().unwrap());
        w.planned_end = start.map(|s| s.parse::<NaiveDate>().unwrap() + chrono::Duration::days(10));
        w
    }

    #[test]
    fn test_scenario_one_package_day_zero() {
        // 10 件物料，计划开始=day0，as_of=day0，4 件已装
        let engine = EvmEngine::new();
        let items: Vec<_> = (1..=10)
            .map(|i| item(&format!("I{}", i), Some("WP1")))
            .collect();
        let installs: HashMap<_, _> = (1..=4)
            .map(|i| installed(&format!("I{}", i), "2026-03-01 08:00:00"))
            .collect();
        let packages = vec![wp("WP1", Some("2026-03-01"))];

        let m = engine.calculate(
            "P1",
            EvmScope::Project,
            None,
            "2026-03-01".parse().unwrap(),
            &items,
            &installs,
            &packages,
        );

        assert_eq!(m.bac, 10);
        assert_eq!(m.pv, 10);
        assert_eq!(m.ev, 4);
        assert_eq!(m.sv, -6);
        assert!((m.spi - 0.4).abs() < 1e-9);
        assert!((m.percent_complete - 40.0).abs() < 1e-9);
        assert_eq!(m.items_remaining, 6);
        assert!((m.eac.unwrap() - 25.0).abs() < 1e-9);
        assert!((m.vac.unwrap() - (-15.0)).abs() < 1e-9);
        assert_eq!(m.status_breakdown.installed, 4);
        assert_eq!(m.status_breakdown.not_started, 6);
    }

    #[test]
    fn test_pv_zero_means_spi_zero_and_no_eac() {
        // 工作包未排期 → PV=0 → SPI=0, EAC/VAC 未定义 (即便 EV>0)
        let engine = EvmEngine::new();
        let items = vec![item("I1", Some("WP1")), item("I2", Some("WP1"))];
        let installs: HashMap<_, _> =
            [installed("I1", "2026-03-01 08:00:00")].into_iter().collect();
        let packages = vec![wp("WP1", None)];

        let m = engine.calculate(
            "P1",
            EvmScope::Project,
            None,
            "2026-03-05".parse().unwrap(),
            &items,
            &installs,
            &packages,
        );

        assert_eq!(m.pv, 0);
        assert_eq!(m.ev, 1);
        assert_eq!(m.spi, 0.0);
        assert!(m.eac.is_none());
        assert!(m.vac.is_none());
        // BAC = EV + items_remaining 恒成立
        assert_eq!(m.bac, m.ev + m.items_remaining);
    }

    #[test]
    fn test_installed_after_as_of_not_earned() {
        let engine = EvmEngine::new();
        let items = vec![item("I1", Some("WP1"))];
        let installs: HashMap<_, _> =
            [installed("I1", "2026-03-10 08:00:00")].into_iter().collect();
        let packages = vec![wp("WP1", Some("2026-03-01"))];

        let m = engine.calculate(
            "P1",
            EvmScope::Project,
            None,
            "2026-03-05".parse().unwrap(),
            &items,
            &installs,
            &packages,
        );

        assert_eq!(m.ev, 0);
        // 状态分布按当前状态计，与 as_of 无关
        assert_eq!(m.status_breakdown.installed, 1);
    }

    #[test]
    fn test_empty_scope_all_guards() {
        let engine = EvmEngine::new();
        let m = engine.calculate(
            "P1",
            EvmScope::Pwbs,
            Some("K"),
            "2026-03-01".parse().unwrap(),
            &[],
            &HashMap::new(),
            &[],
        );
        assert_eq!(m.bac, 0);
        assert_eq!(m.percent_complete, 0.0);
        assert_eq!(m.spi, 0.0);
        assert!(m.eac.is_none());
        assert!(m.vac.is_none());
    }
}
