// ==========================================
// 安装物流进度管理系统 - 依赖解析引擎
// ==========================================
// 职责: 合并全局默认依赖与项目覆写依赖为有效依赖集
// 规则: 覆写在 (from_pwbs, to_pwbs) 精确匹配时永远遮蔽默认
// 红线: 纯函数合并，不做隐式回退；每次查询重新解析，不缓存
// ==========================================

use crate::domain::dependency::{EffectiveDependency, PwbsDependency};
use crate::domain::types::DependencySource;
use std::collections::BTreeMap;

// ==========================================
// DependencyResolver - 依赖解析引擎
// ==========================================
pub struct DependencyResolver {
    // 无状态引擎,不需要注入依赖
    // Repository 操作由调用方处理
}

impl DependencyResolver {
    pub fn new() -> Self {
        Self {}
    }

    /// 合并默认边与覆写边
    ///
    /// # 参数
    /// - `defaults`: 全局默认边 (is_default=true)
    /// - `overrides`: 某项目的覆写边; 无项目上下文时传空切片
    ///
    /// # 返回
    /// 有效依赖集，按 (from_pwbs, to_pwbs) 升序；每个键至多一条，
    /// source 标明取自默认还是覆写
    pub fn merge(
        &self,
        defaults: &[PwbsDependency],
        overrides: &[PwbsDependency],
    ) -> Vec<EffectiveDependency> {
        // 显式两步构建: 先默认，后覆写整条替换
        let mut merged: BTreeMap<(String, String), EffectiveDependency> = BTreeMap::new();

        for dep in defaults {
            merged.insert(
                dep.edge_key(),
                EffectiveDependency {
                    from_pwbs: dep.from_pwbs.clone(),
                    to_pwbs: dep.to_pwbs.clone(),
                    dependency_type: dep.dependency_type,
                    source: DependencySource::Default,
                },
            );
        }

        for dep in overrides {
            merged.insert(
                dep.edge_key(),
                EffectiveDependency {
                    from_pwbs: dep.from_pwbs.clone(),
                    to_pwbs: dep.to_pwbs.clone(),
                    dependency_type: dep.dependency_type,
                    source: DependencySource::ProjectOverride,
                },
            );
        }

        merged.into_values().collect()
    }
}

impl Default for DependencyResolver {
    fn default() -> Self {
        Self::new()
    }
}
