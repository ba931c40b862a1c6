//! 跨线程的初始化等待图
//!
//! 解析链只记录当前线程的祖先，两个线程各自持有对方需要的 `OnceCell`
//! 时链上看不到环。这里记录 "缓存格 -> 正在初始化它的线程" 与
//! "线程 -> 它正在等待的缓存格" 两类边，阻塞前沿着等待边查找，
//! 回到当前线程即为跨线程循环依赖。

use super::scope::ScopeId;
use super::CapabilityKey;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::thread::{self, ThreadId};

/// 一个缓存格：单例为 `(None, key)`，作用域实例为 `(Some(scope), key)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct CellId {
    pub(crate) scope: Option<ScopeId>,
    pub(crate) key: CapabilityKey,
}

impl CellId {
    pub(crate) fn singleton(key: CapabilityKey) -> Self {
        Self { scope: None, key }
    }

    pub(crate) fn scoped(scope: ScopeId, key: CapabilityKey) -> Self {
        Self {
            scope: Some(scope),
            key,
        }
    }
}

#[derive(Default)]
struct WaitGraph {
    owners: HashMap<CellId, ThreadId>,
    waiting: HashMap<ThreadId, CellId>,
}

/// 正在初始化的缓存格
///
/// 锁只保护簿记，工厂执行期间不持有。
#[derive(Default)]
pub(crate) struct InFlight {
    graph: Mutex<WaitGraph>,
}

impl InFlight {
    /// 登记当前线程即将等待 `cell`
    ///
    /// 若 `cell` 的初始化者（传递地）在等待当前线程持有的缓存格，返回
    /// 从 `cell` 开始、回到当前线程持有的缓存格为止的能力序列。
    pub(crate) fn begin_wait(&self, cell: CellId) -> Result<WaitGuard<'_>, Vec<CapabilityKey>> {
        let me = thread::current().id();
        let mut graph = self.graph.lock();

        let mut path = Vec::new();
        let mut current = cell;
        // 每条等待边最多走一次
        for _ in 0..=graph.waiting.len() {
            path.push(current.key);
            match graph.owners.get(&current) {
                Some(owner) if *owner == me => return Err(path),
                Some(owner) => match graph.waiting.get(owner) {
                    Some(next) => current = *next,
                    None => break,
                },
                None => break,
            }
        }

        graph.waiting.insert(me, cell);
        Ok(WaitGuard {
            in_flight: self,
            thread: me,
            cell,
        })
    }

    /// 登记当前线程开始初始化 `cell`，此时它不再等待任何缓存格
    pub(crate) fn begin_init(&self, cell: CellId) -> InitGuard<'_> {
        let me = thread::current().id();
        let mut graph = self.graph.lock();
        graph.waiting.remove(&me);
        graph.owners.insert(cell, me);
        InitGuard {
            in_flight: self,
            cell,
        }
    }

    #[cfg(test)]
    fn is_idle(&self) -> bool {
        let graph = self.graph.lock();
        graph.owners.is_empty() && graph.waiting.is_empty()
    }
}

pub(crate) struct WaitGuard<'a> {
    in_flight: &'a InFlight,
    thread: ThreadId,
    cell: CellId,
}

impl Drop for WaitGuard<'_> {
    fn drop(&mut self) {
        let mut graph = self.in_flight.graph.lock();
        if graph.waiting.get(&self.thread) == Some(&self.cell) {
            graph.waiting.remove(&self.thread);
        }
    }
}

pub(crate) struct InitGuard<'a> {
    in_flight: &'a InFlight,
    cell: CellId,
}

impl Drop for InitGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.graph.lock().owners.remove(&self.cell);
    }
}
