// ==========================================
// 安装物流进度管理系统 - 下游级联规划引擎
// ==========================================
// 职责: 前序工作包改期后，为后序工作包计算建议开始日
// 规则:
// - 仅 FINISH_TO_START 边参与级联; START_TO_START 只校验不级联
// - 级联只向后推，永不提前
// - 提议是建议性的: 计算无副作用，应用是独立的显式步骤
// - 应用时整体平移，工期保持不变
// ==========================================

use crate::domain::dependency::EffectiveDependency;
use crate::domain::types::DependencyType;
use crate::domain::work_package::WorkPackageSchedule;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// CascadeProposal - 级联提议
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CascadeProposal {
    pub project_number: String,
    pub pl_number: String, // 后序工作包
    pub current_start: Option<NaiveDate>,
    pub current_end: Option<NaiveDate>,
    pub proposed_start: NaiveDate,
}

// ==========================================
// CascadePlanner - 级联规划引擎
// ==========================================
pub struct CascadePlanner {
    // 无状态引擎,不需要注入依赖
}

impl CascadePlanner {
    pub fn new() -> Self {
        Self {}
    }

    /// 计算下游级联提议
    ///
    /// # 参数
    /// - `wp`: 刚改期的工作包
    /// - `new_end`: 其新的计划结束日
    /// - `effective`: 项目有效依赖集
    /// - `all_packages`: 项目下全部工作包
    ///
    /// # 返回
    /// 每个后序工作包至多一条提议 (多条边命中同一后序时保留最晚开始)，
    /// 按 PL 号升序
    pub fn propose(
        &self,
        wp: &WorkPackageSchedule,
        new_end: NaiveDate,
        effective: &[EffectiveDependency],
        all_packages: &[WorkPackageSchedule],
    ) -> Vec<CascadeProposal> {
        let mut proposals: BTreeMap<String, CascadeProposal> = BTreeMap::new();

        for category in &wp.pwbs_categories {
            let outgoing = effective.iter().filter(|e| {
                e.from_pwbs == *category && e.dependency_type == DependencyType::FinishToStart
            });

            for edge in outgoing {
                let successors = all_packages.iter().filter(|p| {
                    p.pl_number != wp.pl_number && p.pwbs_categories.contains(&edge.to_pwbs)
                });

                for successor in successors {
                    // 只向后推: 已有更晚 (或相同) 开始日的不提议
                    let pushes_later = match successor.planned_start {
                        Some(current) => new_end > current,
                        None => true,
                    };
                    if !pushes_later {
                        continue;
                    }

                    proposals
                        .entry(successor.pl_number.clone())
                        .and_modify(|p| {
                            if new_end > p.proposed_start {
                                p.proposed_start = new_end;
                            }
                        })
                        .or_insert_with(|| CascadeProposal {
                            project_number: successor.project_number.clone(),
                            pl_number: successor.pl_number.clone(),
                            current_start: successor.planned_start,
                            current_end: successor.planned_end,
                            proposed_start: new_end,
                        });
                }
            }
        }

        proposals.into_values().collect()
    }

    /// 计算提议应用后的新窗口 (平移，工期不变)
    ///
    /// # 返回
    /// - (new_start, Some(new_end)): 后序原有完整窗口，整体平移
    /// - (new_start, None): 后序原本无完整窗口，只落开始日
    pub fn apply_shift(
        &self,
        proposal: &CascadeProposal,
    ) -> (NaiveDate, Option<NaiveDate>) {
        match (proposal.current_start, proposal.current_end) {
            (Some(start), Some(end)) => {
                let delta = proposal.proposed_start - start;
                (proposal.proposed_start, Some(end + delta))
            }
            _ => (proposal.proposed_start, None),
        }
    }
}

impl Default for CascadePlanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::DependencySource;
    use std::collections::BTreeSet;

    fn wp(pl: &str, categories: &[&str], window: Option<(&str, &str)>) -> WorkPackageSchedule {
        let mut w = WorkPackageSchedule::new_unscheduled("P1", pl);
        w.pwbs_categories = categories.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>();
        if let Some((s, e)) = window {
            w.planned_start = Some(s.parse().unwrap());
            w.planned_end = Some(e.parse().unwrap());
        }
        w
    }

    fn fts(from: &str, to: &str) -> EffectiveDependency {
        EffectiveDependency {
            from_pwbs: from.to_string(),
            to_pwbs: to.to_string(),
            dependency_type: DependencyType::FinishToStart,
            source: DependencySource::Default,
        }
    }

    #[test]
    fn test_cascade_pushes_successor_and_preserves_duration() {
        let planner = CascadePlanner::new();
        let effective = vec![fts("K", "F")];
        let pred = wp("WP_K", &["K"], Some(("2026-03-01", "2026-03-10")));
        // 工期 10 天
        let succ = wp("WP_F", &["F"], Some(("2026-03-05", "2026-03-15")));
        let all = vec![pred.clone(), succ];

        let new_end: NaiveDate = "2026-03-20".parse().unwrap();
        let proposals = planner.propose(&pred, new_end, &effective, &all);
        assert_eq!(proposals.len(), 1);
        assert_eq!(proposals[0].pl_number, "WP_F");
        assert_eq!(proposals[0].proposed_start, new_end);

        let (start, end) = planner.apply_shift(&proposals[0]);
        assert_eq!(start, new_end);
        assert_eq!(end, Some("2026-03-30".parse().unwrap()));
        // 工期保持 10 天
        assert_eq!((end.unwrap() - start).num_days(), 10);
    }

    #[test]
    fn test_cascade_never_pulls_earlier() {
        let planner = CascadePlanner::new();
        let effective = vec![fts("K", "F")];
        let pred = wp("WP_K", &["K"], Some(("2026-03-01", "2026-03-10")));
        // 后序开始已晚于新结束日
        let succ = wp("WP_F", &["F"], Some(("2026-03-25", "2026-03-30")));
        let all = vec![pred.clone(), succ];

        let proposals = planner.propose(&pred, "2026-03-20".parse().unwrap(), &effective, &all);
        assert!(proposals.is_empty());
    }

    #[test]
    fn test_start_to_start_never_cascades() {
        let planner = CascadePlanner::new();
        let effective = vec![EffectiveDependency {
            dependency_type: DependencyType::StartToStart,
            ..fts("K", "F")
        }];
        let pred = wp("WP_K", &["K"], Some(("2026-03-01", "2026-03-10")));
        let succ = wp("WP_F", &["F"], Some(("2026-03-02", "2026-03-08")));
        let all = vec![pred.clone(), succ];

        let proposals = planner.propose(&pred, "2026-03-20".parse().unwrap(), &effective, &all);
        assert!(proposals.is_empty());
    }

    #[test]
    fn test_unscheduled_successor_gets_start_only() {
        let planner = CascadePlanner::new();
        let effective = vec![fts("K", "F")];
        let pred = wp("WP_K", &["K"], Some(("2026-03-01", "2026-03-10")));
        let succ = wp("WP_F", &["F"], None);
        let all = vec![pred.clone(), succ];

        let new_end: NaiveDate = "2026-03-12".parse().unwrap();
        let proposals = planner.propose(&pred, new_end, &effective, &all);
        assert_eq!(proposals.len(), 1);

        let (start, end) = planner.apply_shift(&proposals[0]);
        assert_eq!(start, new_end);
        assert_eq!(end, None);
    }

    #[test]
    fn test_multiple_edges_same_successor_dedup() {
        let planner = CascadePlanner::new();
        let effective = vec![fts("K", "F"), fts("M", "F")];
        let mut pred = wp("WP_KM", &["K", "M"], Some(("2026-03-01", "2026-03-10")));
        pred.pwbs_categories.insert("M".to_string());
        let succ = wp("WP_F", &["F"], Some(("2026-03-05", "2026-03-15")));
        let all = vec![pred.clone(), succ];

        let proposals = planner.propose(&pred, "2026-03-20".parse().unwrap(), &effective, &all);
        // 两条边命中同一后序，只保留一条提议
        assert_eq!(proposals.len(), 1);
    }
}
