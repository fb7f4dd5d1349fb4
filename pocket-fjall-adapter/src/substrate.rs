use crate::config::FjallConfig;
use crate::error::FjallSubstrateError;
use fjall::{Keyspace, PartitionHandle, PersistMode};
use parking_lot::Mutex;
use pocket::errors::PocketResult;
use pocket::store::SubstrateProvider;
use std::ops::RangeFull;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A durable substrate backed by a fjall keyspace.
///
/// All entries live in one partition of the keyspace. Clones share the same
/// keyspace; the files are released when the last clone is dropped.
///
/// ```rust,ignore
/// let substrate = FjallSubstrate::with_config()
///     .db_path("/var/lib/pocket")
///     .build()?;
/// let db = Pocket::builder().substrate(substrate).open()?;
/// ```
#[derive(Clone)]
pub struct FjallSubstrate {
    inner: Arc<FjallSubstrateInner>,
}

impl FjallSubstrate {
    #[inline]
    pub fn with_config() -> FjallSubstrateBuilder {
        FjallSubstrateBuilder::new()
    }

    /// Opens or creates the keyspace described by `config`.
    pub fn open(config: FjallConfig) -> PocketResult<FjallSubstrate> {
        let inner = FjallSubstrateInner::open(config)?;
        Ok(FjallSubstrate {
            inner: Arc::new(inner),
        })
    }

    pub fn config(&self) -> FjallConfig {
        self.inner.config.clone()
    }
}

impl SubstrateProvider for FjallSubstrate {
    fn is_available(&self) -> bool {
        !self.inner.closed.load(Ordering::Relaxed)
    }

    fn get(&self, key: &str) -> PocketResult<Option<String>> {
        Ok(self.inner.get(key)?)
    }

    fn put(&self, key: &str, value: &str) -> PocketResult<()> {
        Ok(self.inner.put(key, value)?)
    }

    fn remove(&self, key: &str) -> PocketResult<()> {
        Ok(self.inner.remove(key)?)
    }

    fn keys(&self) -> PocketResult<Vec<String>> {
        Ok(self.inner.keys()?)
    }

    fn flush(&self) -> PocketResult<()> {
        Ok(self.inner.persist()?)
    }

    fn close(&self) -> PocketResult<()> {
        Ok(self.inner.close()?)
    }
}

struct FjallSubstrateInner {
    config: FjallConfig,
    keyspace: Keyspace,
    partition: PartitionHandle,
    write_lock: Mutex<()>,
    closed: AtomicBool,
}

impl FjallSubstrateInner {
    fn open(config: FjallConfig) -> Result<Self, FjallSubstrateError> {
        let path = config.db_path();
        let open_error = |source| FjallSubstrateError::Open {
            path: path.clone(),
            source,
        };

        let keyspace = Keyspace::open(config.keyspace_config()).map_err(open_error)?;
        let partition = keyspace
            .open_partition(&config.partition_name(), config.partition_config())
            .map_err(open_error)?;

        log::debug!("Opened fjall substrate at '{}'", path);
        Ok(FjallSubstrateInner {
            config,
            keyspace,
            partition,
            write_lock: Mutex::new(()),
            closed: AtomicBool::new(false),
        })
    }

    fn get(&self, key: &str) -> Result<Option<String>, FjallSubstrateError> {
        self.check_opened()?;
        match self.partition.get(key)? {
            Some(value) => Ok(Some(String::from_utf8(value.to_vec())?)),
            None => Ok(None),
        }
    }

    fn put(&self, key: &str, value: &str) -> Result<(), FjallSubstrateError> {
        self.check_opened()?;
        let _guard = self.write_lock.lock();
        self.partition.insert(key.as_bytes(), value.as_bytes())?;
        self.sync_if_needed()
    }

    fn remove(&self, key: &str) -> Result<(), FjallSubstrateError> {
        self.check_opened()?;
        let _guard = self.write_lock.lock();
        self.partition.remove(key.as_bytes())?;
        self.sync_if_needed()
    }

    fn keys(&self) -> Result<Vec<String>, FjallSubstrateError> {
        self.check_opened()?;
        let mut keys = Vec::new();
        for entry in self.partition.range::<Vec<u8>, RangeFull>(..) {
            let (key, _) = entry?;
            keys.push(String::from_utf8(key.to_vec())?);
        }
        Ok(keys)
    }

    fn persist(&self) -> Result<(), FjallSubstrateError> {
        if self.closed.load(Ordering::Relaxed) {
            return Ok(());
        }
        self.keyspace.persist(PersistMode::SyncAll)?;
        Ok(())
    }

    fn close(&self) -> Result<(), FjallSubstrateError> {
        self.persist()?;
        if !self.closed.swap(true, Ordering::Relaxed) {
            log::debug!("Closed fjall substrate at '{}'", self.config.db_path());
        }
        Ok(())
    }

    fn sync_if_needed(&self) -> Result<(), FjallSubstrateError> {
        if self.config.sync_on_write() {
            self.keyspace.persist(PersistMode::SyncAll)?;
        }
        Ok(())
    }

    fn check_opened(&self) -> Result<(), FjallSubstrateError> {
        if self.closed.load(Ordering::Relaxed) {
            return Err(FjallSubstrateError::Closed);
        }
        Ok(())
    }
}

/// Fluent construction of a [FjallSubstrate].
pub struct FjallSubstrateBuilder {
    config: FjallConfig,
}

impl FjallSubstrateBuilder {
    #[inline]
    pub fn new() -> FjallSubstrateBuilder {
        FjallSubstrateBuilder {
            config: FjallConfig::new(),
        }
    }

    #[inline]
    pub fn db_path(self, db_path: &str) -> Self {
        self.config.set_db_path(db_path);
        self
    }

    #[inline]
    pub fn partition_name(self, name: &str) -> Self {
        self.config.set_partition_name(name);
        self
    }

    /// Sync the journal after every write. On by default.
    #[inline]
    pub fn sync_on_write(self, sync_on_write: bool) -> Self {
        self.config.set_sync_on_write(sync_on_write);
        self
    }

    /// Background fsync interval in milliseconds, `0` to disable.
    #[inline]
    pub fn fsync_frequency(self, ms: u16) -> Self {
        self.config.set_fsync_frequency(ms);
        self
    }

    #[inline]
    pub fn cache_size(self, bytes: u64) -> Self {
        self.config.set_cache_size(bytes);
        self
    }

    pub fn build(self) -> PocketResult<FjallSubstrate> {
        FjallSubstrate::open(self.config)
    }
}

impl Default for FjallSubstrateBuilder {
    fn default() -> Self {
        FjallSubstrateBuilder::new()
    }
}
