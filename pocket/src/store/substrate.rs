use std::ops::Deref;
use std::sync::Arc;

use crate::errors::PocketResult;

/// The persistent key-value medium underneath a Pocket store.
///
/// Keys and values are plain strings. Implementations must be usable from
/// several handles at once but the engine never writes concurrently.
pub trait SubstrateProvider: Send + Sync {
    /// Returns false when the medium is absent or disabled. A store refuses
    /// to open over an unavailable substrate.
    fn is_available(&self) -> bool;

    fn get(&self, key: &str) -> PocketResult<Option<String>>;

    fn put(&self, key: &str, value: &str) -> PocketResult<()>;

    /// Removing an absent key is not an error.
    fn remove(&self, key: &str) -> PocketResult<()>;

    /// All keys currently held, in no guaranteed order.
    fn keys(&self) -> PocketResult<Vec<String>>;

    /// Makes previous writes durable.
    fn flush(&self) -> PocketResult<()> {
        Ok(())
    }

    /// Releases resources held on behalf of a store. Persisted data survives.
    fn close(&self) -> PocketResult<()>;
}

/// Shared handle over a [SubstrateProvider].
#[derive(Clone)]
pub struct Substrate {
    inner: Arc<dyn SubstrateProvider>,
}

impl Substrate {
    pub fn new<T: SubstrateProvider + 'static>(inner: T) -> Self {
        Substrate {
            inner: Arc::new(inner),
        }
    }

    /// Keys starting with `prefix`, sorted.
    pub fn keys_with_prefix(&self, prefix: &str) -> PocketResult<Vec<String>> {
        let mut keys: Vec<String> = self
            .inner
            .keys()?
            .into_iter()
            .filter(|key| key.starts_with(prefix))
            .collect();
        keys.sort();
        Ok(keys)
    }
}

impl std::fmt::Debug for Substrate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Substrate")
            .field("available", &self.inner.is_available())
            .finish()
    }
}

impl Deref for Substrate {
    type Target = Arc<dyn SubstrateProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
