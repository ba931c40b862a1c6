//! 三种注入方式的端到端测试

use gitstars::infrastructure::container::{InjectionTargets, Registry, ServiceLifetime};
use gitstars::repo_info::{RepoInfoProvider, StubRepoInfoProvider};
use gitstars::services::{
    register_default_services, InterfaceStarsService, SetterStarsService, StarsService,
    STUB_PROVIDER,
};
use gitstars::{ContainerConfig, ContainerError, DuplicatePolicy};
use std::sync::Arc;

fn default_resolver() -> gitstars::Resolver {
    let registry = Registry::new();
    register_default_services(&registry).unwrap();
    registry.freeze().unwrap()
}

#[test]
fn test_constructor_injection_through_resolver() {
    let resolver = default_resolver();

    let service = resolver.resolve::<StarsService>().unwrap();
    assert_eq!(service.get_stars("throw"), 5);

    // 瞬态消费者，每次得到新实例
    let again = resolver.resolve::<StarsService>().unwrap();
    assert!(!Arc::ptr_eq(&service, &again));
}

#[test]
fn test_constructor_injection_classic_way() {
    let service = StarsService::new(Arc::new(StubRepoInfoProvider));
    assert_eq!(service.get_stars("throw"), 5);
}

#[test]
fn test_setter_injection_before_and_after_wiring() {
    let service = SetterStarsService::new();
    assert!(!service.is_wired());
    assert!(matches!(
        service.get_stars("throw"),
        Err(ContainerError::UninitializedDependency { .. })
    ));

    let resolver = default_resolver();
    service.set_repo_info_provider(resolver.resolve::<dyn RepoInfoProvider>().unwrap());
    assert!(service.is_wired());
    assert_eq!(service.get_stars("throw").unwrap(), 5);
}

#[test]
fn test_interface_injection_on_activation() {
    let resolver = default_resolver();

    let service = resolver.resolve::<InterfaceStarsService>().unwrap();
    assert_eq!(service.get_stars("throw").unwrap(), 5);
}

#[test]
fn test_interface_injection_through_targets() {
    let resolver = default_resolver();
    let first = Arc::new(InterfaceStarsService::new());
    let second = Arc::new(InterfaceStarsService::new());
    assert!(first.get_stars("throw").is_err());

    let mut targets = InjectionTargets::<dyn RepoInfoProvider>::new();
    targets.add(first.clone()).add(second.clone());
    assert_eq!(targets.wire_from(&resolver).unwrap(), 2);

    assert_eq!(first.get_stars("throw").unwrap(), 5);
    assert_eq!(second.get_stars("gitstars").unwrap(), 8);
}

#[test]
fn test_named_provider_variant() {
    let resolver = default_resolver();

    let stub = resolver
        .resolve_named::<dyn RepoInfoProvider>(STUB_PROVIDER)
        .unwrap();
    assert_eq!(stub.repo("throw").stars, 5);

    assert!(matches!(
        resolver.resolve_named::<dyn RepoInfoProvider>("remote"),
        Err(ContainerError::UnregisteredCapability { .. })
    ));
}

struct FixedProvider(usize);

impl RepoInfoProvider for FixedProvider {
    fn repo(&self, name: &str) -> gitstars::repo_info::RepoInfo {
        gitstars::repo_info::RepoInfo {
            name: name.to_string(),
            stars: self.0,
        }
    }
}

#[test]
fn test_provider_substitution_with_overwrite_policy() {
    let registry = Registry::with_config(ContainerConfig {
        duplicate_policy: DuplicatePolicy::Overwrite,
        ..ContainerConfig::default()
    });
    register_default_services(&registry).unwrap();
    registry
        .register::<dyn RepoInfoProvider, _>(ServiceLifetime::Singleton, |_| {
            Ok(Arc::new(FixedProvider(1000)) as Arc<dyn RepoInfoProvider>)
        })
        .unwrap();
    let resolver = registry.freeze().unwrap();

    // 消费者不变，换掉的只是能力的实现
    let service = resolver.resolve::<StarsService>().unwrap();
    assert_eq!(service.get_stars("throw"), 1000);
    let interface = resolver.resolve::<InterfaceStarsService>().unwrap();
    assert_eq!(interface.get_stars("throw").unwrap(), 1000);
}

#[test]
fn test_default_services_rejected_twice() {
    let registry = Registry::new();
    register_default_services(&registry).unwrap();
    assert!(matches!(
        register_default_services(&registry),
        Err(ContainerError::DuplicateRegistration { .. })
    ));
}
