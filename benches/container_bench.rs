//! 容器解析路径的性能基准测试

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gitstars::infrastructure::container::{Registry, ServiceLifetime};
use gitstars::services::{register_default_services, StarsService};
use std::sync::Arc;
use std::thread;

/// 测试用的简单服务
struct SimpleService {
    value: i32,
}

/// 依赖简单服务的服务
struct DependentService {
    inner: Arc<SimpleService>,
}

fn registry_with(lifetime: ServiceLifetime) -> Registry {
    let registry = Registry::new();
    registry
        .register(lifetime, |_| Ok(Arc::new(SimpleService { value: 42 })))
        .unwrap();
    registry
        .register(lifetime, |ctx| {
            Ok(Arc::new(DependentService {
                inner: ctx.resolve::<SimpleService>()?,
            }))
        })
        .unwrap();
    registry
}

/// 基准测试：不同生命周期的解析开销
fn bench_lifetime_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("lifetime_resolution");

    for (label, lifetime) in [
        ("singleton", ServiceLifetime::Singleton),
        ("transient", ServiceLifetime::Transient),
    ] {
        let resolver = registry_with(lifetime).freeze().unwrap();
        group.bench_function(label, |b| {
            b.iter(|| {
                let service = resolver.resolve::<DependentService>().unwrap();
                black_box(service.inner.value)
            })
        });
    }

    let resolver = registry_with(ServiceLifetime::Scoped).freeze().unwrap();
    group.bench_function("scoped", |b| {
        b.iter(|| {
            let scope = resolver.create_scope();
            let service = scope.resolve::<DependentService>().unwrap();
            black_box(service.inner.value)
        })
    });

    group.finish();
}

/// 基准测试：并发单例解析
fn bench_concurrent_singleton(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_singleton");

    for threads in [1usize, 4, 16].iter() {
        let resolver = registry_with(ServiceLifetime::Singleton).freeze().unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(threads), threads, |b, &threads| {
            b.iter(|| {
                thread::scope(|s| {
                    for _ in 0..threads {
                        s.spawn(|| {
                            for _ in 0..100 {
                                black_box(resolver.resolve::<SimpleService>().unwrap());
                            }
                        });
                    }
                })
            })
        });
    }

    group.finish();
}

/// 基准测试：注册并冻结默认服务
fn bench_register_and_freeze(c: &mut Criterion) {
    c.bench_function("register_and_freeze", |b| {
        b.iter(|| {
            let registry = Registry::new();
            register_default_services(&registry).unwrap();
            let resolver = registry.freeze().unwrap();
            black_box(resolver.resolve::<StarsService>().unwrap().get_stars("throw"))
        })
    });
}

criterion_group!(
    benches,
    bench_lifetime_resolution,
    bench_concurrent_singleton,
    bench_register_and_freeze
);
criterion_main!(benches);
