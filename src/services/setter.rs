//! Setter 注入

use crate::errors::{ContainerError, ContainerResult};
use crate::repo_info::RepoInfoProvider;
use parking_lot::RwLock;
use std::sync::Arc;

/// 通过 setter 接收 [`RepoInfoProvider`] 的服务
///
/// 可以在没有依赖的情况下构造，调用 setter 之前 `get_stars`
/// 返回 `UninitializedDependency`。容器不会自动调用 setter。
#[derive(Default)]
pub struct SetterStarsService {
    client: RwLock<Option<Arc<dyn RepoInfoProvider>>>,
}

impl SetterStarsService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_repo_info_provider(&self, client: Arc<dyn RepoInfoProvider>) {
        *self.client.write() = Some(client);
    }

    pub fn is_wired(&self) -> bool {
        self.client.read().is_some()
    }

    pub fn get_stars(&self, repo_name: &str) -> ContainerResult<usize> {
        let client = self
            .client
            .read()
            .clone()
            .ok_or(ContainerError::UninitializedDependency {
                consumer: std::any::type_name::<Self>(),
                dependency: std::any::type_name::<dyn RepoInfoProvider>(),
            })?;
        Ok(client.repo(repo_name).stars)
    }
}
