//! 接口注入

use crate::errors::{ContainerError, ContainerResult};
use crate::infrastructure::container::Accepts;
use crate::repo_info::RepoInfoProvider;
use parking_lot::RwLock;
use std::sync::Arc;

/// 实现 `Accepts<dyn RepoInfoProvider>`，由外部装配步骤推送依赖的服务
#[derive(Default)]
pub struct InterfaceStarsService {
    client: RwLock<Option<Arc<dyn RepoInfoProvider>>>,
}

impl InterfaceStarsService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_stars(&self, repo_name: &str) -> ContainerResult<usize> {
        let guard = self.client.read();
        let client = guard
            .as_ref()
            .ok_or(ContainerError::UninitializedDependency {
                consumer: std::any::type_name::<Self>(),
                dependency: std::any::type_name::<dyn RepoInfoProvider>(),
            })?;
        Ok(client.repo(repo_name).stars)
    }
}

impl Accepts<dyn RepoInfoProvider> for InterfaceStarsService {
    fn accept(&self, dependency: Arc<dyn RepoInfoProvider>) {
        *self.client.write() = Some(dependency);
    }
}
