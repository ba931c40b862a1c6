//! 依赖注入容器
//!
//! 注册表（`Registry`）在启动时收集能力与工厂，冻结后得到解析器（`Resolver`），
//! 解析器按声明的生命周期构建实例并递归解析依赖。

mod in_flight;
pub mod injection;
pub mod registry;
pub mod resolver;
pub mod scope;
pub mod stats;

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

pub use injection::{Accepts, Injectable, InjectionTargets};
pub use registry::Registry;
pub use resolver::{ResolveContext, Resolver};
pub use scope::{Scope, ScopeId};
pub use stats::ResolverStats;

/// 服务生命周期
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceLifetime {
    /// 单例 - 每个解析器只创建一次
    Singleton,
    /// 瞬态 - 每次解析都创建新实例
    Transient,
    /// 作用域 - 同一作用域内共享实例
    Scoped,
}

/// 能力标识
///
/// 由服务类型（可以是 `dyn Trait`）的 `TypeId` 和可选的变体名称组成。
/// 相同类型的无名键与各个具名键互不相同。
#[derive(Clone, Copy)]
pub struct CapabilityKey {
    type_id: TypeId,
    type_name: &'static str,
    name: Option<&'static str>,
}

impl CapabilityKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            name: None,
        }
    }

    pub fn named<T: ?Sized + 'static>(name: &'static str) -> Self {
        Self {
            name: Some(name),
            ..Self::of::<T>()
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn name(&self) -> Option<&'static str> {
        self.name
    }
}

impl PartialEq for CapabilityKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.name == other.name
    }
}

impl Eq for CapabilityKey {}

impl Hash for CapabilityKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
        self.name.hash(state);
    }
}

impl fmt::Display for CapabilityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name {
            Some(name) => write!(f, "{}[{}]", self.type_name, name),
            None => f.write_str(self.type_name),
        }
    }
}

impl fmt::Debug for CapabilityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CapabilityKey({})", self)
    }
}
