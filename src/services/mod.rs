//! 三种注入方式的消费者
//!
//! - [`StarsService`]：构造器注入
//! - [`SetterStarsService`]：Setter 注入
//! - [`InterfaceStarsService`]：接口注入

pub mod constructor;
pub mod interface;
pub mod setter;

pub use constructor::StarsService;
pub use interface::InterfaceStarsService;
pub use setter::SetterStarsService;

use crate::errors::ContainerResult;
use crate::infrastructure::container::{Registry, ServiceLifetime};
use crate::repo_info::{RepoInfoProvider, StubRepoInfoProvider};
use std::sync::Arc;

/// 具名变体：桩实现
pub const STUB_PROVIDER: &str = "stub";

/// 注册默认服务
///
/// - `dyn RepoInfoProvider`（瞬态，桩实现），同时注册为具名变体 [`STUB_PROVIDER`]
/// - [`StarsService`]（瞬态，构造器注入）
/// - [`InterfaceStarsService`]（瞬态，激活时接口注入）
pub fn register_default_services(registry: &Registry) -> ContainerResult<()> {
    registry
        .register_transient::<dyn RepoInfoProvider, _>(|_| Ok(stub_provider()))?
        .register_named::<dyn RepoInfoProvider, _>(
            STUB_PROVIDER,
            ServiceLifetime::Transient,
            |_| Ok(stub_provider()),
        )?
        .register_constructor::<StarsService>(ServiceLifetime::Transient)?
        .register_transient(|_| Ok(Arc::new(InterfaceStarsService::new())))?
        .inject_on_activation::<InterfaceStarsService, dyn RepoInfoProvider>()?;
    Ok(())
}

fn stub_provider() -> Arc<dyn RepoInfoProvider> {
    Arc::new(StubRepoInfoProvider)
}
