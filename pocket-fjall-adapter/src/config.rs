use fjall::{Config, PartitionCreateOptions};
use pocket::common::{atomic, Atomic, ReadExecutor, WriteExecutor};
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicU64, Ordering};
use std::sync::Arc;

const DEFAULT_PARTITION: &str = "pocket";
const DEFAULT_CACHE_SIZE: u64 = 16 * 1024 * 1024;

/// Settings for a [crate::FjallSubstrate].
///
/// Defaults:
/// - `db_path`: empty, must be set
/// - `partition_name`: `pocket`
/// - `sync_on_write`: `true`, every put and remove is followed by a full
///   journal sync
/// - `fsync_frequency`: `0`, no background fsync
/// - `cache_size`: 16 MiB
#[derive(Clone)]
pub struct FjallConfig {
    inner: Arc<FjallConfigInner>,
}

impl FjallConfig {
    #[inline]
    pub fn new() -> FjallConfig {
        FjallConfig {
            inner: Arc::new(FjallConfigInner::new()),
        }
    }

    pub(crate) fn keyspace_config(&self) -> Config {
        let mut config = Config::new(self.db_path()).cache_size(self.cache_size());
        if self.fsync_frequency() > 0 {
            config = config.fsync_ms(Some(self.fsync_frequency()));
        }
        config
    }

    #[inline]
    pub(crate) fn partition_config(&self) -> PartitionCreateOptions {
        PartitionCreateOptions::default()
    }

    #[inline]
    pub fn db_path(&self) -> String {
        self.inner.db_path.read_with(|it| it.clone())
    }

    #[inline]
    pub(crate) fn set_db_path(&self, db_path: &str) {
        self.inner.db_path.write_with(|it| *it = db_path.to_string());
    }

    #[inline]
    pub fn partition_name(&self) -> String {
        self.inner.partition_name.read_with(|it| it.clone())
    }

    #[inline]
    pub(crate) fn set_partition_name(&self, name: &str) {
        self.inner
            .partition_name
            .write_with(|it| *it = name.to_string());
    }

    #[inline]
    pub fn sync_on_write(&self) -> bool {
        self.inner.sync_on_write.load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn set_sync_on_write(&self, v: bool) {
        self.inner.sync_on_write.store(v, Ordering::Relaxed);
    }

    #[inline]
    pub fn fsync_frequency(&self) -> u16 {
        self.inner.fsync_frequency.load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn set_fsync_frequency(&self, ms: u16) {
        self.inner.fsync_frequency.store(ms, Ordering::Relaxed);
    }

    #[inline]
    pub fn cache_size(&self) -> u64 {
        self.inner.cache_size.load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn set_cache_size(&self, bytes: u64) {
        self.inner.cache_size.store(bytes, Ordering::Relaxed);
    }
}

impl Default for FjallConfig {
    fn default() -> Self {
        FjallConfig::new()
    }
}

struct FjallConfigInner {
    db_path: Atomic<String>,
    partition_name: Atomic<String>,
    sync_on_write: AtomicBool,
    fsync_frequency: AtomicU16,
    cache_size: AtomicU64,
}

impl FjallConfigInner {
    fn new() -> Self {
        FjallConfigInner {
            db_path: atomic(String::new()),
            partition_name: atomic(DEFAULT_PARTITION.to_string()),
            sync_on_write: AtomicBool::new(true),
            fsync_frequency: AtomicU16::new(0),
            cache_size: AtomicU64::new(DEFAULT_CACHE_SIZE),
        }
    }
}
