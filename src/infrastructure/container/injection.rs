//! 注入方式的消费端契约
//!
//! - 构造器注入：[`Injectable`]，依赖在构造时全部解析，不存在半初始化状态
//! - 接口注入：[`Accepts`]，由外部的装配步骤（[`InjectionTargets`] 或
//!   [`Registry::inject_on_activation`](super::Registry::inject_on_activation)）推送依赖
//!
//! Setter 注入不需要容器参与，容器也不会自动调用 setter。

use super::resolver::{ResolveContext, Resolver};
use super::CapabilityKey;
use crate::errors::ContainerResult;
use std::sync::Arc;

/// 构造器注入
pub trait Injectable: Send + Sync + Sized + 'static {
    /// 构造函数需要的能力，冻结时据此校验缺失依赖与环
    fn dependencies() -> Vec<CapabilityKey>;

    /// 解析全部依赖后构造实例
    fn construct(ctx: &ResolveContext<'_>) -> ContainerResult<Self>;
}

/// 接口注入：实现者声明"接受能力 `D`"
pub trait Accepts<D: ?Sized>: Send + Sync {
    fn accept(&self, dependency: Arc<D>);
}

/// 接口注入的装配目标集合
pub struct InjectionTargets<D: ?Sized> {
    targets: Vec<Arc<dyn Accepts<D>>>,
}

impl<D: ?Sized + Send + Sync + 'static> InjectionTargets<D> {
    pub fn new() -> Self {
        Self {
            targets: Vec::new(),
        }
    }

    pub fn add(&mut self, target: Arc<dyn Accepts<D>>) -> &mut Self {
        self.targets.push(target);
        self
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// 把同一个依赖推送给所有目标，返回装配数量
    pub fn wire(&self, dependency: Arc<D>) -> usize {
        for target in &self.targets {
            target.accept(dependency.clone());
        }
        tracing::debug!(
            dependency = std::any::type_name::<D>(),
            targets = self.targets.len(),
            "Interface injection wired"
        );
        self.targets.len()
    }

    /// 从解析器取得依赖后装配
    pub fn wire_from(&self, resolver: &Resolver) -> ContainerResult<usize> {
        let dependency = resolver.resolve::<D>()?;
        Ok(self.wire(dependency))
    }
}

impl<D: ?Sized + Send + Sync + 'static> Default for InjectionTargets<D> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Sink {
        received: Mutex<Vec<String>>,
    }

    impl Accepts<String> for Sink {
        fn accept(&self, dependency: Arc<String>) {
            self.received.lock().push((*dependency).clone());
        }
    }

    #[test]
    fn test_wire_pushes_into_every_target() {
        let first = Arc::new(Sink::default());
        let second = Arc::new(Sink::default());

        let mut targets = InjectionTargets::<String>::new();
        targets.add(first.clone()).add(second.clone());

        assert_eq!(targets.wire(Arc::new("token".to_string())), 2);
        assert_eq!(*first.received.lock(), vec!["token".to_string()]);
        assert_eq!(*second.received.lock(), vec!["token".to_string()]);
    }

    #[test]
    fn test_empty_targets() {
        let targets = InjectionTargets::<String>::default();
        assert!(targets.is_empty());
        assert_eq!(targets.wire(Arc::new(String::new())), 0);
    }
}
