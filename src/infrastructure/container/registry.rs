//! 服务注册表
//!
//! 注册表在启动阶段收集 `能力 -> (工厂, 生命周期)` 映射，`freeze` 之后
//! 不再接受任何注册，并生成唯一有权实例化这些能力的 [`Resolver`]。

use super::injection::{Accepts, Injectable};
use super::resolver::{ResolveContext, Resolver};
use super::{CapabilityKey, ServiceLifetime};
use crate::config::{ContainerConfig, DuplicatePolicy};
use crate::errors::{ContainerError, ContainerResult};
use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// 类型擦除的实例，内部保存 `Arc<T>`
pub(crate) type Instance = Arc<dyn Any + Send + Sync>;

/// 类型擦除的工厂
pub(crate) type Factory =
    Arc<dyn Fn(&ResolveContext<'_>) -> ContainerResult<Instance> + Send + Sync>;

/// 类型擦除的激活回调
pub(crate) type Activator =
    Arc<dyn Fn(&ResolveContext<'_>, &Instance) -> ContainerResult<()> + Send + Sync>;

/// 服务注册信息
#[derive(Clone)]
pub(crate) struct Registration {
    pub(crate) key: CapabilityKey,
    pub(crate) lifetime: ServiceLifetime,
    pub(crate) factory: Factory,
    /// 声明的依赖，仅用于冻结时校验
    pub(crate) dependencies: Vec<CapabilityKey>,
    pub(crate) activators: Vec<Activator>,
}

#[derive(Default)]
struct RegistryState {
    registrations: HashMap<CapabilityKey, Registration>,
    /// 激活回调与注册顺序无关，冻结时才挂到注册信息上
    activators: HashMap<CapabilityKey, Vec<Activator>>,
    frozen: bool,
}

/// 服务注册表
#[derive(Clone)]
pub struct Registry {
    state: Arc<RwLock<RegistryState>>,
    config: ContainerConfig,
}

impl Registry {
    /// 使用默认配置创建空注册表
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    pub fn with_config(config: ContainerConfig) -> Self {
        Self {
            state: Arc::new(RwLock::new(RegistryState::default())),
            config,
        }
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// 注册能力
    ///
    /// 工厂接收解析上下文，可以通过它递归解析自身的依赖。
    pub fn register<T, F>(&self, lifetime: ServiceLifetime, factory: F) -> ContainerResult<&Self>
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ResolveContext<'_>) -> ContainerResult<Arc<T>> + Send + Sync + 'static,
    {
        self.insert(CapabilityKey::of::<T>(), lifetime, erase(factory), Vec::new())
    }

    /// 以变体名称注册能力，同一接口可以有多个具名实现
    pub fn register_named<T, F>(
        &self,
        name: &'static str,
        lifetime: ServiceLifetime,
        factory: F,
    ) -> ContainerResult<&Self>
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ResolveContext<'_>) -> ContainerResult<Arc<T>> + Send + Sync + 'static,
    {
        self.insert(CapabilityKey::named::<T>(name), lifetime, erase(factory), Vec::new())
    }

    pub fn register_singleton<T, F>(&self, factory: F) -> ContainerResult<&Self>
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ResolveContext<'_>) -> ContainerResult<Arc<T>> + Send + Sync + 'static,
    {
        self.register(ServiceLifetime::Singleton, factory)
    }

    pub fn register_transient<T, F>(&self, factory: F) -> ContainerResult<&Self>
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ResolveContext<'_>) -> ContainerResult<Arc<T>> + Send + Sync + 'static,
    {
        self.register(ServiceLifetime::Transient, factory)
    }

    pub fn register_scoped<T, F>(&self, factory: F) -> ContainerResult<&Self>
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ResolveContext<'_>) -> ContainerResult<Arc<T>> + Send + Sync + 'static,
    {
        self.register(ServiceLifetime::Scoped, factory)
    }

    /// 注册现成的实例（单例）
    pub fn register_instance<T>(&self, instance: Arc<T>) -> ContainerResult<&Self>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.register(ServiceLifetime::Singleton, move |_| Ok(instance.clone()))
    }

    /// 注册构造器注入的类型，依赖声明参与冻结时校验
    pub fn register_constructor<T: Injectable>(
        &self,
        lifetime: ServiceLifetime,
    ) -> ContainerResult<&Self> {
        let factory = erase(|ctx: &ResolveContext<'_>| T::construct(ctx).map(Arc::new));
        self.insert(CapabilityKey::of::<T>(), lifetime, factory, T::dependencies())
    }

    /// 追加激活回调，每次新建 `T` 实例后、缓存或返回之前按注册顺序执行
    pub fn on_activated<T, F>(&self, callback: F) -> ContainerResult<&Self>
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ResolveContext<'_>, &Arc<T>) -> ContainerResult<()> + Send + Sync + 'static,
    {
        self.add_activator(CapabilityKey::of::<T>(), callback)
    }

    /// 为具名变体追加激活回调
    pub fn on_activated_named<T, F>(
        &self,
        name: &'static str,
        callback: F,
    ) -> ContainerResult<&Self>
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ResolveContext<'_>, &Arc<T>) -> ContainerResult<()> + Send + Sync + 'static,
    {
        self.add_activator(CapabilityKey::named::<T>(name), callback)
    }

    /// 接口注入：每次新建 `C` 时解析 `D` 并推送给它
    pub fn inject_on_activation<C, D>(&self) -> ContainerResult<&Self>
    where
        C: Accepts<D> + 'static,
        D: ?Sized + Send + Sync + 'static,
    {
        self.on_activated::<C, _>(|ctx, consumer| {
            consumer.accept(ctx.resolve::<D>()?);
            Ok(())
        })
    }

    pub fn is_registered<T: ?Sized + 'static>(&self) -> bool {
        self.state
            .read()
            .registrations
            .contains_key(&CapabilityKey::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.state.read().registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_frozen(&self) -> bool {
        self.state.read().frozen
    }

    pub fn registered_keys(&self) -> Vec<CapabilityKey> {
        self.state.read().registrations.keys().copied().collect()
    }

    /// 冻结注册表并生成解析器
    ///
    /// 冻结后任何注册以及再次冻结都会返回 `RegistryFrozen`。
    pub fn freeze(&self) -> ContainerResult<Resolver> {
        let mut state = self.state.write();
        if state.frozen {
            return Err(ContainerError::RegistryFrozen {
                operation: "freeze again".to_string(),
            });
        }

        let mut registrations = state.registrations.clone();
        for (key, activators) in &state.activators {
            let registration = registrations
                .get_mut(key)
                .ok_or_else(|| unregistered(*key, &state.registrations))?;
            registration.activators.extend(activators.iter().cloned());
        }

        if self.config.validate_on_freeze {
            validate_dependencies(&registrations)?;
        }

        state.frozen = true;
        tracing::debug!(
            registered = registrations.len(),
            validated = self.config.validate_on_freeze,
            "Registry frozen"
        );

        Ok(Resolver::from_registrations(registrations))
    }

    fn add_activator<T, F>(&self, key: CapabilityKey, callback: F) -> ContainerResult<&Self>
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ResolveContext<'_>, &Arc<T>) -> ContainerResult<()> + Send + Sync + 'static,
    {
        let activator: Activator = Arc::new(move |ctx: &ResolveContext<'_>, instance: &Instance| {
            let service = instance
                .downcast_ref::<Arc<T>>()
                .ok_or(ContainerError::TypeMismatch {
                    key,
                    expected: std::any::type_name::<T>(),
                })?;
            callback(ctx, service)
        });

        let mut state = self.state.write();
        if state.frozen {
            return Err(ContainerError::RegistryFrozen {
                operation: format!("add activation callback for '{}'", key),
            });
        }
        state.activators.entry(key).or_default().push(activator);
        Ok(self)
    }

    fn insert(
        &self,
        key: CapabilityKey,
        lifetime: ServiceLifetime,
        factory: Factory,
        dependencies: Vec<CapabilityKey>,
    ) -> ContainerResult<&Self> {
        let mut state = self.state.write();
        if state.frozen {
            return Err(ContainerError::RegistryFrozen {
                operation: format!("register '{}'", key),
            });
        }

        if state.registrations.contains_key(&key) {
            match self.config.duplicate_policy {
                DuplicatePolicy::Reject => {
                    return Err(ContainerError::DuplicateRegistration { key });
                }
                DuplicatePolicy::Overwrite => {
                    tracing::warn!(capability = %key, "Overwriting existing registration");
                }
            }
        }

        tracing::debug!(capability = %key, lifetime = ?lifetime, "Registering capability");
        state.registrations.insert(
            key,
            Registration {
                key,
                lifetime,
                factory,
                dependencies,
                activators: Vec::new(),
            },
        );
        Ok(self)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

fn erase<T, F>(factory: F) -> Factory
where
    T: ?Sized + Send + Sync + 'static,
    F: Fn(&ResolveContext<'_>) -> ContainerResult<Arc<T>> + Send + Sync + 'static,
{
    Arc::new(move |ctx: &ResolveContext<'_>| factory(ctx).map(|service| Arc::new(service) as Instance))
}

pub(crate) fn unregistered(
    key: CapabilityKey,
    registrations: &HashMap<CapabilityKey, Registration>,
) -> ContainerError {
    let mut available: Vec<String> = registrations.keys().map(|k| k.to_string()).collect();
    available.sort();
    ContainerError::UnregisteredCapability { key, available }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done,
}

/// 按声明的依赖做深度优先遍历，发现缺失依赖或环
fn validate_dependencies(
    registrations: &HashMap<CapabilityKey, Registration>,
) -> ContainerResult<()> {
    let mut marks: HashMap<CapabilityKey, Visit> = HashMap::new();
    let mut path: Vec<CapabilityKey> = Vec::new();

    // 排序保证错误信息稳定
    let mut roots: Vec<&CapabilityKey> = registrations.keys().collect();
    roots.sort_by_key(|k| k.to_string());

    for root in roots {
        visit(*root, registrations, &mut marks, &mut path)?;
    }
    Ok(())
}

fn visit(
    key: CapabilityKey,
    registrations: &HashMap<CapabilityKey, Registration>,
    marks: &mut HashMap<CapabilityKey, Visit>,
    path: &mut Vec<CapabilityKey>,
) -> ContainerResult<()> {
    match marks.get(&key) {
        Some(Visit::Done) => return Ok(()),
        Some(Visit::InProgress) => {
            let start = path.iter().position(|k| *k == key).unwrap_or(0);
            let mut chain: Vec<String> = path[start..].iter().map(|k| k.to_string()).collect();
            chain.push(key.to_string());
            return Err(ContainerError::CircularDependency { chain });
        }
        None => {}
    }

    let registration = registrations
        .get(&key)
        .ok_or_else(|| unregistered(key, registrations))?;

    marks.insert(key, Visit::InProgress);
    path.push(key);
    for dependency in &registration.dependencies {
        visit(*dependency, registrations, marks, path)?;
    }
    path.pop();
    marks.insert(key, Visit::Done);
    Ok(())
}
