//! 作用域
//!
//! 每个作用域持有自己的实例缓存，不同作用域之间互不共享。
//! 作用域被释放（`dispose` 或 drop）时，它缓存的作用域实例随之释放。

use super::registry::Instance;
use super::resolver::Resolver;
use super::CapabilityKey;
use crate::errors::ContainerResult;
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// 作用域ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(uuid::Uuid);

impl ScopeId {
    pub(crate) fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// 作用域句柄
pub struct Scope {
    id: ScopeId,
    resolver: Resolver,
    /// 作用域实例缓存，每个键一个 `OnceCell` 保证同一作用域内只创建一次
    instances: DashMap<CapabilityKey, Arc<OnceCell<Instance>>>,
    created_at: Instant,
}

impl Scope {
    pub(crate) fn new(resolver: Resolver) -> Self {
        let scope = Self {
            id: ScopeId::new(),
            resolver,
            instances: DashMap::new(),
            created_at: Instant::now(),
        };
        tracing::debug!(scope = %scope.id, "Scope created");
        scope
    }

    pub fn id(&self) -> ScopeId {
        self.id
    }

    pub fn elapsed(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// 在本作用域中解析服务
    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&self) -> ContainerResult<Arc<T>> {
        self.resolver.resolve_in::<T>(Some(self))
    }

    /// 当前已创建的作用域实例数量
    pub fn instance_count(&self) -> usize {
        self.instances
            .iter()
            .filter(|entry| entry.value().get().is_some())
            .count()
    }

    /// 释放作用域及其全部作用域实例
    pub fn dispose(self) {}

    pub(crate) fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub(crate) fn cell(&self, key: CapabilityKey) -> Arc<OnceCell<Instance>> {
        // 克隆后立即释放分片锁，工厂执行期间可能再次访问本作用域
        self.instances
            .entry(key)
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        tracing::debug!(
            scope = %self.id,
            instances = self.instance_count(),
            lifetime_ms = self.created_at.elapsed().as_millis() as u64,
            "Scope disposed"
        );
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("id", &self.id)
            .field("instances", &self.instance_count())
            .finish()
    }
}
