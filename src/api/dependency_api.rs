// ==========================================
// 安装物流进度管理系统 - 依赖管理 API
// ==========================================
// 职责: 默认/项目覆写依赖边的维护与有效依赖解析
// 约定: 有效依赖每次查询重新合并 (覆写随时可变，不缓存)
// ==========================================

use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::dependency::EffectiveDependency;
use crate::domain::types::DependencyType;
use crate::engine::DependencyResolver;
use crate::repository::PwbsDependencyRepository;

// ==========================================
// DependencyApi - 依赖管理 API
// ==========================================
pub struct DependencyApi {
    dependency_repo: Arc<PwbsDependencyRepository>,
    resolver: DependencyResolver,
}

impl DependencyApi {
    pub fn new(dependency_repo: Arc<PwbsDependencyRepository>) -> Self {
        Self {
            dependency_repo,
            resolver: DependencyResolver::new(),
        }
    }

    /// 解析有效依赖集
    ///
    /// # 参数
    /// - project_number: None 时只返回默认边
    pub fn resolve_dependencies(
        &self,
        project_number: Option<&str>,
    ) -> ApiResult<Vec<EffectiveDependency>> {
        let defaults = self.dependency_repo.list_defaults()?;
        let overrides = match project_number {
            Some(project) => self.dependency_repo.list_project_overrides(project)?,
            None => Vec::new(),
        };
        Ok(self.resolver.merge(&defaults, &overrides))
    }

    /// 设置默认依赖边 (存在则更新类型)
    pub fn set_default_dependency(
        &self,
        from_pwbs: &str,
        to_pwbs: &str,
        dependency_type: DependencyType,
    ) -> ApiResult<()> {
        Self::validate_edge(from_pwbs, to_pwbs)?;
        self.dependency_repo
            .set_default(from_pwbs, to_pwbs, dependency_type)?;
        tracing::info!(from_pwbs, to_pwbs, %dependency_type, "设置默认依赖边");
        Ok(())
    }

    /// 移除默认依赖边
    pub fn remove_default_dependency(&self, from_pwbs: &str, to_pwbs: &str) -> ApiResult<()> {
        Self::validate_edge(from_pwbs, to_pwbs)?;
        let removed = self.dependency_repo.remove_default(from_pwbs, to_pwbs)?;
        if !removed {
            return Err(ApiError::NotFound(format!(
                "默认依赖边 {} -> {} 不存在",
                from_pwbs, to_pwbs
            )));
        }
        Ok(())
    }

    /// 设置项目覆写边 (存在则更新类型; NONE 可用于抑制默认边)
    pub fn set_project_dependency(
        &self,
        project_number: &str,
        from_pwbs: &str,
        to_pwbs: &str,
        dependency_type: DependencyType,
    ) -> ApiResult<()> {
        Self::validate_project(project_number)?;
        Self::validate_edge(from_pwbs, to_pwbs)?;
        self.dependency_repo
            .set_project_override(project_number, from_pwbs, to_pwbs, dependency_type)?;
        tracing::info!(project_number, from_pwbs, to_pwbs, %dependency_type, "设置项目覆写边");
        Ok(())
    }

    /// 移除项目覆写边 (该键回落到默认边)
    pub fn remove_project_dependency(
        &self,
        project_number: &str,
        from_pwbs: &str,
        to_pwbs: &str,
    ) -> ApiResult<()> {
        Self::validate_project(project_number)?;
        Self::validate_edge(from_pwbs, to_pwbs)?;
        let removed =
            self.dependency_repo
                .remove_project_override(project_number, from_pwbs, to_pwbs)?;
        if !removed {
            return Err(ApiError::NotFound(format!(
                "项目 {} 覆写边 {} -> {} 不存在",
                project_number, from_pwbs, to_pwbs
            )));
        }
        Ok(())
    }

    fn validate_edge(from_pwbs: &str, to_pwbs: &str) -> ApiResult<()> {
        if from_pwbs.trim().is_empty() || to_pwbs.trim().is_empty() {
            return Err(ApiError::InvalidInput("PWBS 分类码不能为空".to_string()));
        }
        if from_pwbs == to_pwbs {
            return Err(ApiError::InvalidInput(format!(
                "依赖边不允许自环: {}",
                from_pwbs
            )));
        }
        Ok(())
    }

    fn validate_project(project_number: &str) -> ApiResult<()> {
        if project_number.trim().is_empty() {
            return Err(ApiError::InvalidInput("项目号不能为空".to_string()));
        }
        Ok(())
    }
}
