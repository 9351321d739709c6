//! 序列号生成器
//!
//! 每个 (租户, 计数器) 一条记录，数据库内原子递增。
//! 进程内按 key 串行化，避免并发 UPSERT 触发事务冲突重试。

use std::sync::Arc;

use dashmap::DashMap;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::db::repository::{CounterRepository, RepoResult};

/// Counter used for bill numbers
pub const BILL_NUMBER_COUNTER: &str = "billNumber";

/// Per-key async locks
///
/// An entry lives while its lock is held or awaited; the last guard to drop
/// removes it.
#[derive(Debug, Default)]
pub struct KeyedLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

/// Held lock for one key of [`KeyedLocks`]
pub struct KeyedGuard<'a> {
    owner: &'a KeyedLocks,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for KeyedGuard<'_> {
    fn drop(&mut self) {
        // 先释放锁，再清理无人等待的条目
        self.guard.take();
        self.owner
            .locks
            .remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for `key`, waiting for the current holder
    pub async fn lock(&self, key: &str) -> KeyedGuard<'_> {
        let lock = self
            .locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = lock.lock_owned().await;
        KeyedGuard {
            owner: self,
            key: key.to_string(),
            guard: Some(guard),
        }
    }

    /// Number of live entries
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Sequence generator service
#[derive(Clone)]
pub struct SequenceService {
    counters: CounterRepository,
    locks: Arc<KeyedLocks>,
}

impl SequenceService {
    pub fn new(db: Surreal<Db>, locks: Arc<KeyedLocks>) -> Self {
        Self {
            counters: CounterRepository::new(db),
            locks,
        }
    }

    /// Next value of `(tenant_id, counter)`; 1 on first use
    pub async fn next_sequence(&self, tenant_id: &str, counter: &str) -> RepoResult<i64> {
        let _guard = self.locks.lock(&format!("seq:{tenant_id}:{counter}")).await;
        let value = self.counters.increment(tenant_id, counter).await?;
        tracing::debug!(tenant_id = %tenant_id, counter = %counter, value, "Sequence issued");
        Ok(value)
    }
}
