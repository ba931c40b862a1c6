//! 解析统计

use std::sync::atomic::{AtomicU64, Ordering};

/// 内部统计信息（原子计数器）
#[derive(Default)]
pub(crate) struct InnerStats {
    total_resolutions: AtomicU64,
    singleton_cache_hits: AtomicU64,
    singleton_cache_misses: AtomicU64,
    transient_creations: AtomicU64,
    scoped_creations: AtomicU64,
}

impl InnerStats {
    pub(crate) fn record_resolution(&self) {
        self.total_resolutions.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_singleton(&self, created: bool) {
        if created {
            self.singleton_cache_misses.fetch_add(1, Ordering::Relaxed);
        } else {
            self.singleton_cache_hits.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_transient(&self) {
        self.transient_creations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_scoped_creation(&self) {
        self.scoped_creations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, registered_services: usize) -> ResolverStats {
        ResolverStats {
            total_resolutions: self.total_resolutions.load(Ordering::Relaxed),
            singleton_cache_hits: self.singleton_cache_hits.load(Ordering::Relaxed),
            singleton_cache_misses: self.singleton_cache_misses.load(Ordering::Relaxed),
            transient_creations: self.transient_creations.load(Ordering::Relaxed),
            scoped_creations: self.scoped_creations.load(Ordering::Relaxed),
            registered_services,
        }
    }

    pub(crate) fn reset(&self) {
        self.total_resolutions.store(0, Ordering::Relaxed);
        self.singleton_cache_hits.store(0, Ordering::Relaxed);
        self.singleton_cache_misses.store(0, Ordering::Relaxed);
        self.transient_creations.store(0, Ordering::Relaxed);
        self.scoped_creations.store(0, Ordering::Relaxed);
    }
}

/// 解析器统计信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolverStats {
    /// 成功的解析次数（包括递归解析），失败的解析不计入
    pub total_resolutions: u64,
    /// 单例缓存命中次数
    pub singleton_cache_hits: u64,
    /// 单例缓存未命中次数，即单例实例成功创建的次数
    pub singleton_cache_misses: u64,
    /// 瞬态服务成功创建次数
    pub transient_creations: u64,
    /// 作用域服务成功创建次数
    pub scoped_creations: u64,
    /// 服务注册数量
    pub registered_services: usize,
}

impl ResolverStats {
    /// 单例缓存命中率（小数形式）
    pub fn hit_rate(&self) -> f64 {
        let total = self.singleton_cache_hits + self.singleton_cache_misses;
        if total == 0 {
            0.0
        } else {
            self.singleton_cache_hits as f64 / total as f64
        }
    }

    /// 单例缓存命中率（百分比）
    pub fn cache_hit_rate(&self) -> f64 {
        self.hit_rate() * 100.0
    }

    pub fn performance_summary(&self) -> String {
        format!(
            "Resolver Performance: {} total resolutions, {:.1}% cache hit rate, {} registered services, {} transient creations, {} scoped creations",
            self.total_resolutions,
            self.cache_hit_rate(),
            self.registered_services,
            self.transient_creations,
            self.scoped_creations
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate_empty() {
        let stats = ResolverStats::default();
        assert_eq!(stats.hit_rate(), 0.0);
        assert_eq!(stats.cache_hit_rate(), 0.0);
    }

    #[test]
    fn test_counters_and_reset() {
        let inner = InnerStats::default();
        inner.record_resolution();
        inner.record_resolution();
        inner.record_singleton(true);
        inner.record_singleton(false);
        inner.record_transient();

        let stats = inner.snapshot(3);
        assert_eq!(stats.total_resolutions, 2);
        assert_eq!(stats.singleton_cache_misses, 1);
        assert_eq!(stats.singleton_cache_hits, 1);
        assert_eq!(stats.transient_creations, 1);
        assert_eq!(stats.cache_hit_rate(), 50.0);
        assert!(stats
            .performance_summary()
            .contains("2 total resolutions, 50.0% cache hit rate, 3 registered services"));

        inner.reset();
        assert_eq!(inner.snapshot(3).total_resolutions, 0);
    }
}
