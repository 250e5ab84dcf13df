// ==========================================
// 安装物流进度管理系统 - PWBS 依赖领域模型
// ==========================================
// 不变量: 同一 (from_pwbs, to_pwbs) 至多一条默认边 + 每项目至多一条覆写边
// 覆写在精确匹配时永远遮蔽默认，不做部分匹配
// ==========================================

use crate::domain::types::{DependencySource, DependencyType};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// PwbsDependency - PWBS 依赖边
// ==========================================
// is_default=true: 全局模板边，project_number 必为 None
// is_default=false: 项目覆写边，project_number 必为 Some
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PwbsDependency {
    pub dependency_id: String,
    pub from_pwbs: String,              // 前序分类
    pub to_pwbs: String,                // 后序分类
    pub dependency_type: DependencyType,
    pub is_default: bool,
    pub project_number: Option<String>,
    pub updated_at: NaiveDateTime,
}

impl PwbsDependency {
    /// 合并键: 覆写遮蔽默认按该键精确匹配
    pub fn edge_key(&self) -> (String, String) {
        (self.from_pwbs.clone(), self.to_pwbs.clone())
    }
}

// ==========================================
// EffectiveDependency - 有效依赖边
// ==========================================
// DependencyResolver 的输出; source 标明来源（可解释性）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveDependency {
    pub from_pwbs: String,
    pub to_pwbs: String,
    pub dependency_type: DependencyType,
    pub source: DependencySource,
}

impl EffectiveDependency {
    /// NONE 型边不参与校验/级联（仅作抑制标记）
    pub fn is_constraining(&self) -> bool {
        self.dependency_type != DependencyType::None
    }
}
