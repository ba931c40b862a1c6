pub mod container_config;

// Re-export commonly used types
pub use container_config::{ContainerConfig, DuplicatePolicy, PartialContainerConfig};
