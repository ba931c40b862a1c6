use crate::infrastructure::container::{CapabilityKey, ScopeId};
use thiserror::Error;

/// 容器操作结果
pub type ContainerResult<T> = Result<T, ContainerError>;

/// 依赖注入容器错误
///
/// 所有错误都是同步的本地错误，表示配置或编程错误，调用方不应重试。
#[derive(Debug, Error)]
pub enum ContainerError {
    /// 能力已注册且当前策略不允许覆盖
    #[error("Capability '{key}' is already registered")]
    DuplicateRegistration { key: CapabilityKey },

    /// 注册表已冻结，不能再注册或再次冻结
    #[error("Registry is frozen; cannot {operation}")]
    RegistryFrozen { operation: String },

    /// 能力未注册
    #[error("Capability '{key}' is not registered{}", format_available(.available))]
    UnregisteredCapability {
        key: CapabilityKey,
        available: Vec<String>,
    },

    /// 解析作用域服务时没有提供作用域
    #[error("Capability '{key}' is scoped but no scope is active")]
    MissingScope { key: CapabilityKey },

    /// 作用域由其他解析器创建
    #[error("Scope {scope} was created by a different resolver")]
    ForeignScope { scope: ScopeId },

    /// 循环依赖，`chain` 以重复出现的能力结尾
    #[error("Circular dependency detected: {}", .chain.join(" -> "))]
    CircularDependency { chain: Vec<String> },

    /// Setter/接口注入的依赖尚未设置
    #[error("Dependency '{dependency}' of '{consumer}' has not been injected")]
    UninitializedDependency {
        consumer: &'static str,
        dependency: &'static str,
    },

    /// 工厂或激活回调返回错误
    #[error("Failed to create '{key}': {reason}")]
    CreationFailed { key: CapabilityKey, reason: String },

    /// 缓存实例类型与请求类型不一致
    #[error("Type mismatch for '{key}': expected {expected}")]
    TypeMismatch {
        key: CapabilityKey,
        expected: &'static str,
    },
}

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse container configuration: {0}")]
    TomlParse(#[source] toml::de::Error),
    #[error("Invalid value '{value}' for environment variable {var}")]
    InvalidEnv { var: &'static str, value: String },
}

fn format_available(available: &[String]) -> String {
    if available.is_empty() {
        String::new()
    } else {
        format!(". Available capabilities: {}", available.join(", "))
    }
}

impl ContainerError {
    /// 由工厂内部的任意错误构造 `CreationFailed`
    pub fn creation_failed(key: CapabilityKey, reason: impl std::fmt::Display) -> Self {
        ContainerError::CreationFailed {
            key,
            reason: reason.to_string(),
        }
    }

    pub fn is_circular(&self) -> bool {
        matches!(self, ContainerError::CircularDependency { .. })
    }
}
