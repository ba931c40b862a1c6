use gitstars::config::ContainerConfig;
use gitstars::infrastructure::container::{InjectionTargets, Registry};
use gitstars::logging::{init_logging, LoggingConfig, OperationTimer};
use gitstars::repo_info::{RepoInfoProvider, StubRepoInfoProvider};
use gitstars::services::{
    register_default_services, InterfaceStarsService, SetterStarsService, StarsService,
};
use std::sync::Arc;

const REPO: &str = "throw";

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default()).map_err(|e| anyhow::anyhow!(e))?;

    // IoC：注册、冻结、解析
    let timer = OperationTimer::new("ioc_resolution");
    let registry = Registry::with_config(ContainerConfig::from_env()?);
    register_default_services(&registry)?;
    let resolver = registry.freeze()?;

    let service = resolver.resolve::<StarsService>()?;
    println!(
        "{} has this many stars with service provider {}",
        REPO,
        service.get_stars(REPO)
    );
    timer.finish();

    // 经典 DI：手动构造依赖并通过构造函数传入
    let client: Arc<dyn RepoInfoProvider> = Arc::new(StubRepoInfoProvider);
    let stars = StarsService::new(client.clone()).get_stars(REPO);
    println!("{} has this many stars with classic way {}", REPO, stars);

    // Setter 注入
    let setter = SetterStarsService::new();
    if let Err(e) = setter.get_stars(REPO) {
        println!("setter injection before wiring: {}", e);
    }
    setter.set_repo_info_provider(client.clone());
    println!(
        "{} has this many stars with setter injection {}",
        REPO,
        setter.get_stars(REPO)?
    );

    // 接口注入：外部装配步骤推送依赖
    let consumer = Arc::new(InterfaceStarsService::new());
    let mut targets = InjectionTargets::<dyn RepoInfoProvider>::new();
    targets.add(consumer.clone());
    targets.wire_from(&resolver)?;
    println!(
        "{} has this many stars with interface injection {}",
        REPO,
        consumer.get_stars(REPO)?
    );

    tracing::info!(summary = %resolver.get_stats().performance_summary(), "Done");
    Ok(())
}
