use crate::common::{Cipher, CipherProvider};
use crate::errors::{PocketError, PocketResult};
use crate::pocket::Pocket;
use crate::pocket_config::PocketConfig;
use crate::store::{Substrate, SubstrateProvider};

/// Fluent builder for a [Pocket] store.
///
/// The first failing setter is remembered and returned by [PocketBuilder::open].
///
/// ```rust,ignore
/// let db = Pocket::builder()
///     .auto_commit(false)
///     .substrate(FjallSubstrate::new(FjallConfig::new("/tmp/pocket"))?)
///     .open()?;
/// ```
#[derive(Default)]
pub struct PocketBuilder {
    error: Option<PocketError>,
    config: PocketConfig,
}

impl PocketBuilder {
    pub fn new() -> Self {
        PocketBuilder {
            error: None,
            config: PocketConfig::new(),
        }
    }

    /// Whether collections commit after every write. Defaults to `true`.
    pub fn auto_commit(mut self, auto_commit: bool) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_auto_commit(auto_commit) {
                self.error = Some(e);
            }
        }
        self
    }

    /// The key-value medium to persist into. Defaults to memory.
    pub fn substrate<T: SubstrateProvider + 'static>(mut self, substrate: T) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_substrate(Substrate::new(substrate)) {
                self.error = Some(e);
            }
        }
        self
    }

    /// The cipher used by secure commits, `encrypt` and `decrypt`.
    pub fn cipher<T: CipherProvider + 'static>(mut self, cipher: T) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_cipher(Cipher::new(cipher)) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Opens the store.
    ///
    /// # Errors
    ///
    /// The first error captured by a setter, or
    /// [crate::errors::ErrorKind::SubstrateUnavailable] when the substrate
    /// reports itself unavailable.
    pub fn open(self) -> PocketResult<Pocket> {
        if let Some(error) = self.error {
            return Err(error);
        }
        self.config.auto_configure()?;
        Pocket::open(self.config)
    }
}
