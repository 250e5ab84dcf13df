// ==========================================
// 安装物流进度管理系统 - 工作包汇总引擎
// ==========================================
// 职责: 按 PL 号分组未删除物料，重算工作包派生字段
// 说明: 这是排期/齐套/挣值逻辑的数据前提，项目物料变动后须重跑
// ==========================================

use crate::domain::supply_item::SupplyItem;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ==========================================
// WorkPackageRollup - 工作包汇总结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkPackageRollup {
    pub pl_number: String,
    pub pwbs_categories: BTreeSet<String>,
    pub item_count: i64,
    pub total_quantity: f64,
    pub total_weight_kg: f64,
}

// ==========================================
// WorkPackageAggregator - 工作包汇总引擎
// ==========================================
pub struct WorkPackageAggregator {
    // 无状态引擎,不需要注入依赖
}

impl WorkPackageAggregator {
    pub fn new() -> Self {
        Self {}
    }

    /// 按 PL 号分组汇总
    ///
    /// # 说明
    /// - 已删除物料由调用方过滤 (仓储层统一 is_deleted=0)
    /// - 无 PL 号的物料不属于任何工作包，跳过
    /// - 输出按 PL 号升序
    pub fn rollup(&self, items: &[SupplyItem]) -> Vec<WorkPackageRollup> {
        let mut groups: BTreeMap<String, WorkPackageRollup> = BTreeMap::new();

        for item in items {
            let Some(pl_number) = &item.pl_number else {
                continue;
            };

            let entry = groups
                .entry(pl_number.clone())
                .or_insert_with(|| WorkPackageRollup {
                    pl_number: pl_number.clone(),
                    pwbs_categories: BTreeSet::new(),
                    item_count: 0,
                    total_quantity: 0.0,
                    total_weight_kg: 0.0,
                });

            entry.item_count += 1;
            entry.total_quantity += item.quantity;
            entry.total_weight_kg += item.weight_kg;
            if let Some(pwbs) = &item.pwbs {
                entry.pwbs_categories.insert(pwbs.clone());
            }
        }

        groups.into_values().collect()
    }
}

impl Default for WorkPackageAggregator {
    fn default() -> Self {
        Self::new()
    }
}
