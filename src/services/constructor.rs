//! 构造器注入

use crate::errors::ContainerResult;
use crate::infrastructure::container::{CapabilityKey, Injectable, ResolveContext};
use crate::repo_info::RepoInfoProvider;
use std::sync::Arc;

/// 通过构造函数接收 [`RepoInfoProvider`] 的服务
///
/// 依赖在构造时必须提供，实例不存在未装配的状态。
#[derive(Clone)]
pub struct StarsService {
    client: Arc<dyn RepoInfoProvider>,
}

impl StarsService {
    pub fn new(client: Arc<dyn RepoInfoProvider>) -> Self {
        Self { client }
    }

    /// 返回仓库的星标数
    pub fn get_stars(&self, repo_name: &str) -> usize {
        self.client.repo(repo_name).stars
    }
}

impl Injectable for StarsService {
    fn dependencies() -> Vec<CapabilityKey> {
        vec![CapabilityKey::of::<dyn RepoInfoProvider>()]
    }

    fn construct(ctx: &ResolveContext<'_>) -> ContainerResult<Self> {
        Ok(Self::new(ctx.resolve::<dyn RepoInfoProvider>()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo_info::{RepoInfo, StubRepoInfoProvider};

    struct FixedProvider(usize);

    impl RepoInfoProvider for FixedProvider {
        fn repo(&self, name: &str) -> RepoInfo {
            RepoInfo {
                name: name.to_string(),
                stars: self.0,
            }
        }
    }

    #[test]
    fn test_classic_constructor_injection() {
        let client = Arc::new(StubRepoInfoProvider);
        let service = StarsService::new(client);
        assert_eq!(service.get_stars("throw"), 5);
    }

    #[test]
    fn test_swapped_implementation() {
        let service = StarsService::new(Arc::new(FixedProvider(1_000)));
        assert_eq!(service.get_stars("throw"), 1_000);
    }

    #[test]
    fn test_declares_provider_dependency() {
        assert_eq!(
            StarsService::dependencies(),
            vec![CapabilityKey::of::<dyn RepoInfoProvider>()]
        );
    }
}
