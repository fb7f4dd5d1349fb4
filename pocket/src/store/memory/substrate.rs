use crossbeam_skiplist::SkipMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::errors::PocketResult;
use crate::store::SubstrateProvider;

/// A substrate kept entirely in process memory.
///
/// Clones share the same entries, so a second store opened over a clone
/// sees everything the first one committed. Entries live until the last
/// clone is dropped.
#[derive(Clone, Default)]
pub struct InMemorySubstrate {
    inner: Arc<InMemorySubstrateInner>,
}

#[derive(Default)]
struct InMemorySubstrateInner {
    entries: SkipMap<String, String>,
    disabled: AtomicBool,
}

impl InMemorySubstrate {
    pub fn new() -> Self {
        InMemorySubstrate::default()
    }

    /// Marks the medium as disabled; stores can no longer be opened over it.
    pub fn disable(&self) {
        self.inner.disabled.store(true, Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }
}

impl SubstrateProvider for InMemorySubstrate {
    fn is_available(&self) -> bool {
        !self.inner.disabled.load(Ordering::Relaxed)
    }

    fn get(&self, key: &str) -> PocketResult<Option<String>> {
        Ok(self.inner.entries.get(key).map(|entry| entry.value().clone()))
    }

    fn put(&self, key: &str, value: &str) -> PocketResult<()> {
        self.inner.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> PocketResult<()> {
        self.inner.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> PocketResult<Vec<String>> {
        Ok(self
            .inner
            .entries
            .iter()
            .map(|entry| entry.key().clone())
            .collect())
    }

    fn close(&self) -> PocketResult<()> {
        log::debug!("In-memory substrate released with {} entries", self.len());
        Ok(())
    }
}
