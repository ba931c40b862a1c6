//! 基础设施层
//!
//! 提供依赖注入容器：注册表、解析器、作用域与注入契约。

pub mod container;

pub use container::{
    Accepts, CapabilityKey, Injectable, InjectionTargets, Registry, ResolveContext, Resolver,
    ResolverStats, Scope, ScopeId, ServiceLifetime,
};
