//! Configuration of a Pocket store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use crate::collection::CollectionOptions;
use crate::common::{atomic, Atomic, Cipher, ReadExecutor, WriteExecutor};
use crate::errors::{ErrorKind, PocketError, PocketResult};
use crate::store::{InMemorySubstrate, Substrate};

/// Settings shared by a store and its collections.
///
/// `PocketConfig` is a cheap handle; clones share settings. Settings can only
/// change before the store opens. Defaults:
///
/// - `auto_commit`: `true`
/// - substrate: a fresh [InMemorySubstrate]
/// - cipher: [crate::common::AesGcmCipher] with default Argon2 costs
///
/// Usually built through [crate::PocketBuilder] rather than directly.
#[derive(Clone)]
pub struct PocketConfig {
    inner: Arc<PocketConfigInner>,
}

impl Default for PocketConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PocketConfig {
    pub fn new() -> Self {
        PocketConfig {
            inner: Arc::new(PocketConfigInner::new()),
        }
    }

    pub fn auto_commit(&self) -> bool {
        self.inner.auto_commit.load(Ordering::Relaxed)
    }

    pub fn set_auto_commit(&self, auto_commit: bool) -> PocketResult<()> {
        self.inner.ensure_not_configured("Auto commit")?;
        self.inner.auto_commit.store(auto_commit, Ordering::Relaxed);
        Ok(())
    }

    /// Options given to every collection created by the store.
    pub fn collection_options(&self) -> CollectionOptions {
        CollectionOptions::new(self.auto_commit())
    }

    pub fn substrate(&self) -> PocketResult<Substrate> {
        match self.inner.substrate.get() {
            Some(substrate) => Ok(substrate.clone()),
            None => {
                log::error!("No substrate is configured");
                Err(PocketError::new(
                    "No substrate is configured",
                    ErrorKind::SubstrateUnavailable,
                ))
            }
        }
    }

    pub fn set_substrate(&self, substrate: Substrate) -> PocketResult<()> {
        self.inner.ensure_not_configured("Substrate")?;
        self.inner.substrate.set(substrate).map_err(|_| {
            log::error!("A substrate is already configured");
            PocketError::new(
                "A substrate is already configured",
                ErrorKind::InvalidOperation,
            )
        })
    }

    pub fn cipher(&self) -> Cipher {
        self.inner.cipher.read_with(|it| it.clone())
    }

    pub fn set_cipher(&self, cipher: Cipher) -> PocketResult<()> {
        self.inner.ensure_not_configured("Cipher")?;
        self.inner.cipher.write_with(|it| *it = cipher);
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        self.inner.configured.load(Ordering::Relaxed)
    }

    /// Fills in defaults and freezes the configuration.
    pub(crate) fn auto_configure(&self) -> PocketResult<()> {
        if self.inner.substrate.get().is_none() {
            log::debug!("No substrate configured, using an in-memory substrate");
            self.set_substrate(Substrate::new(InMemorySubstrate::new()))?;
        }
        self.inner.configured.store(true, Ordering::Relaxed);
        Ok(())
    }
}

struct PocketConfigInner {
    configured: AtomicBool,
    auto_commit: AtomicBool,
    substrate: OnceLock<Substrate>,
    cipher: Atomic<Cipher>,
}

impl PocketConfigInner {
    fn new() -> Self {
        PocketConfigInner {
            configured: AtomicBool::from(false),
            auto_commit: AtomicBool::from(true),
            substrate: OnceLock::new(),
            cipher: atomic(Cipher::default()),
        }
    }

    fn ensure_not_configured(&self, setting: &str) -> PocketResult<()> {
        if self.configured.load(Ordering::Relaxed) {
            log::error!("{} cannot be changed after the store is opened", setting);
            return Err(PocketError::new(
                &format!("{} cannot be changed after the store is opened", setting),
                ErrorKind::InvalidOperation,
            ));
        }
        Ok(())
    }
}
