pub mod config;
pub mod errors;
pub mod infrastructure;
pub mod logging;
pub mod repo_info;
pub mod services;

// Re-export commonly used items for convenience
pub use config::{ContainerConfig, DuplicatePolicy};
pub use errors::{ConfigError, ContainerError, ContainerResult};
pub use infrastructure::container::{
    CapabilityKey, Registry, ResolveContext, Resolver, Scope, ServiceLifetime,
};
