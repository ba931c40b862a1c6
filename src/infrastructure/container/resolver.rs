//! 服务解析器
//!
//! 解析器由冻结的注册表生成，是唯一有权实例化已注册能力的对象。
//!
//! 并发约定：
//! - 每个单例键一个 `OnceCell`，工厂最多执行一次；不同键的解析互不阻塞
//! - 工厂失败时不缓存任何实例，下一次解析会重新执行工厂
//! - 解析链通过 [`ResolveContext`] 逐层传递，键在自身祖先链中再次出现即判定为循环依赖

use super::in_flight::{CellId, InFlight};
use super::registry::{unregistered, Instance, Registration};
use super::scope::Scope;
use super::stats::{InnerStats, ResolverStats};
use super::{CapabilityKey, ServiceLifetime};
use crate::errors::{ContainerError, ContainerResult};
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::sync::Arc;

struct ResolverInner {
    registrations: HashMap<CapabilityKey, Registration>,
    /// 单例缓存，冻结时为每个单例键预先分配
    singletons: HashMap<CapabilityKey, OnceCell<Instance>>,
    in_flight: InFlight,
    stats: InnerStats,
}

/// 服务解析器
#[derive(Clone)]
pub struct Resolver {
    inner: Arc<ResolverInner>,
}

impl Resolver {
    pub(crate) fn from_registrations(registrations: HashMap<CapabilityKey, Registration>) -> Self {
        let singletons = registrations
            .values()
            .filter(|r| r.lifetime == ServiceLifetime::Singleton)
            .map(|r| (r.key, OnceCell::new()))
            .collect();

        Self {
            inner: Arc::new(ResolverInner {
                registrations,
                singletons,
                in_flight: InFlight::default(),
                stats: InnerStats::default(),
            }),
        }
    }

    /// 解析服务（无作用域）
    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&self) -> ContainerResult<Arc<T>> {
        ResolveContext::root(self, None).resolve::<T>()
    }

    /// 解析具名变体
    pub fn resolve_named<T: ?Sized + Send + Sync + 'static>(
        &self,
        name: &'static str,
    ) -> ContainerResult<Arc<T>> {
        ResolveContext::root(self, None).resolve_named::<T>(name)
    }

    /// 在可选作用域中解析服务；作用域服务缺少作用域时返回 `MissingScope`，
    /// 作用域来自其他解析器时返回 `ForeignScope`
    pub fn resolve_in<T: ?Sized + Send + Sync + 'static>(
        &self,
        scope: Option<&Scope>,
    ) -> ContainerResult<Arc<T>> {
        self.check_scope(scope)?;
        ResolveContext::root(self, scope).resolve::<T>()
    }

    /// 未注册时返回 `Ok(None)`，其余错误照常返回
    pub fn try_resolve<T: ?Sized + Send + Sync + 'static>(
        &self,
    ) -> ContainerResult<Option<Arc<T>>> {
        ResolveContext::root(self, None).try_resolve::<T>()
    }

    /// 按键解析，返回类型擦除的实例（内部为 `Arc<T>`）
    pub fn resolve_key(
        &self,
        key: CapabilityKey,
        scope: Option<&Scope>,
    ) -> ContainerResult<Arc<dyn std::any::Any + Send + Sync>> {
        self.check_scope(scope)?;
        self.resolve_instance(&ResolveContext::root(self, scope), key)
    }

    /// 创建新的作用域
    pub fn create_scope(&self) -> Scope {
        Scope::new(self.clone())
    }

    pub fn is_registered<T: ?Sized + 'static>(&self) -> bool {
        self.inner
            .registrations
            .contains_key(&CapabilityKey::of::<T>())
    }

    pub fn lifetime_of(&self, key: &CapabilityKey) -> Option<ServiceLifetime> {
        self.inner.registrations.get(key).map(|r| r.lifetime)
    }

    pub fn get_stats(&self) -> ResolverStats {
        self.inner.stats.snapshot(self.inner.registrations.len())
    }

    pub fn reset_stats(&self) {
        self.inner.stats.reset();
    }

    fn check_scope(&self, scope: Option<&Scope>) -> ContainerResult<()> {
        match scope {
            Some(scope) if !Arc::ptr_eq(&scope.resolver().inner, &self.inner) => {
                Err(ContainerError::ForeignScope { scope: scope.id() })
            }
            _ => Ok(()),
        }
    }

    fn resolve_instance(
        &self,
        ctx: &ResolveContext<'_>,
        key: CapabilityKey,
    ) -> ContainerResult<Instance> {
        let registration = self
            .inner
            .registrations
            .get(&key)
            .ok_or_else(|| unregistered(key, &self.inner.registrations))?;

        if ctx.contains(&key) {
            let mut chain = ctx.chain();
            chain.push(key);
            return Err(circular(chain));
        }

        tracing::trace!(
            capability = %key,
            lifetime = ?registration.lifetime,
            depth = ctx.depth(),
            "Resolving capability"
        );

        let instance = match registration.lifetime {
            ServiceLifetime::Transient => {
                let instance = self.create(&ctx.child(key, ctx.scope), registration)?;
                self.inner.stats.record_transient();
                instance
            }
            ServiceLifetime::Singleton => {
                let cell = self.inner.singletons.get(&key).ok_or(ContainerError::TypeMismatch {
                    key,
                    expected: "singleton cell",
                })?;
                // 单例不捕获作用域，避免把作用域实例提升为全局实例
                let child = ctx.child(key, None);
                let (instance, created) =
                    self.get_or_create(ctx, cell, CellId::singleton(key), &child, registration)?;
                self.inner.stats.record_singleton(created);
                instance
            }
            ServiceLifetime::Scoped => {
                let scope = ctx.scope.ok_or(ContainerError::MissingScope { key })?;
                let cell = scope.cell(key);
                let child = ctx.child(key, Some(scope));
                let (instance, created) = self.get_or_create(
                    ctx,
                    &cell,
                    CellId::scoped(scope.id(), key),
                    &child,
                    registration,
                )?;
                if created {
                    self.inner.stats.record_scoped_creation();
                }
                instance
            }
        };

        self.inner.stats.record_resolution();
        Ok(instance)
    }

    /// 取缓存格中的实例，必要时创建；返回值中的 `bool` 表示本次是否新建
    ///
    /// 阻塞等待其他线程初始化之前先检查等待图，跨线程的环直接报错。
    fn get_or_create(
        &self,
        ctx: &ResolveContext<'_>,
        cell: &OnceCell<Instance>,
        cell_id: CellId,
        child: &ResolveContext<'_>,
        registration: &Registration,
    ) -> ContainerResult<(Instance, bool)> {
        if let Some(instance) = cell.get() {
            return Ok((instance.clone(), false));
        }

        let _wait = self
            .inner
            .in_flight
            .begin_wait(cell_id)
            .map_err(|path| {
                // path 以当前线程已持有的能力结尾
                let mut chain = ctx.chain();
                chain.extend(path);
                if chain.len() < 2 {
                    chain.push(cell_id.key);
                }
                circular(chain)
            })?;

        let mut created = false;
        let instance = cell.get_or_try_init(|| {
            let _init = self.inner.in_flight.begin_init(cell_id);
            let instance = self.create(child, registration)?;
            created = true;
            Ok::<_, ContainerError>(instance)
        })?;
        Ok((instance.clone(), created))
    }

    fn create(
        &self,
        ctx: &ResolveContext<'_>,
        registration: &Registration,
    ) -> ContainerResult<Instance> {
        let instance = (registration.factory)(ctx)?;
        for activator in &registration.activators {
            activator(ctx, &instance)?;
        }
        Ok(instance)
    }
}

fn circular(chain: Vec<CapabilityKey>) -> ContainerError {
    let chain: Vec<String> = chain.iter().map(|k| k.to_string()).collect();
    tracing::debug!(chain = ?chain, "Circular dependency detected");
    ContainerError::CircularDependency { chain }
}

/// 解析上下文
///
/// 工厂通过它解析自身依赖，作用域与解析链会随之向下传递。
pub struct ResolveContext<'a> {
    resolver: &'a Resolver,
    scope: Option<&'a Scope>,
    current: Option<CapabilityKey>,
    parent: Option<&'a ResolveContext<'a>>,
}

impl<'a> ResolveContext<'a> {
    fn root(resolver: &'a Resolver, scope: Option<&'a Scope>) -> Self {
        Self {
            resolver,
            scope,
            current: None,
            parent: None,
        }
    }

    fn child(&'a self, key: CapabilityKey, scope: Option<&'a Scope>) -> ResolveContext<'a> {
        ResolveContext {
            resolver: self.resolver,
            scope,
            current: Some(key),
            parent: Some(self),
        }
    }

    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&self) -> ContainerResult<Arc<T>> {
        self.resolve_key(CapabilityKey::of::<T>())
    }

    pub fn resolve_named<T: ?Sized + Send + Sync + 'static>(
        &self,
        name: &'static str,
    ) -> ContainerResult<Arc<T>> {
        self.resolve_key(CapabilityKey::named::<T>(name))
    }

    pub fn try_resolve<T: ?Sized + Send + Sync + 'static>(
        &self,
    ) -> ContainerResult<Option<Arc<T>>> {
        match self.resolve::<T>() {
            Ok(service) => Ok(Some(service)),
            Err(ContainerError::UnregisteredCapability { key, .. })
                if key == CapabilityKey::of::<T>() =>
            {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub fn resolver(&self) -> &Resolver {
        self.resolver
    }

    pub fn scope(&self) -> Option<&Scope> {
        self.scope
    }

    /// 从根到当前的解析链
    pub fn chain(&self) -> Vec<CapabilityKey> {
        let mut chain = Vec::new();
        let mut frame = Some(self);
        while let Some(ctx) = frame {
            if let Some(key) = ctx.current {
                chain.push(key);
            }
            frame = ctx.parent;
        }
        chain.reverse();
        chain
    }

    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut frame = self.parent;
        while let Some(ctx) = frame {
            depth += 1;
            frame = ctx.parent;
        }
        depth
    }

    fn contains(&self, key: &CapabilityKey) -> bool {
        let mut frame = Some(self);
        while let Some(ctx) = frame {
            if ctx.current.as_ref() == Some(key) {
                return true;
            }
            frame = ctx.parent;
        }
        false
    }

    fn resolve_key<T: ?Sized + Send + Sync + 'static>(
        &self,
        key: CapabilityKey,
    ) -> ContainerResult<Arc<T>> {
        let instance = self.resolver.resolve_instance(self, key)?;
        instance
            .downcast_ref::<Arc<T>>()
            .cloned()
            .ok_or(ContainerError::TypeMismatch {
                key,
                expected: std::any::type_name::<T>(),
            })
    }
}
