use indexmap::IndexMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::collection::{CollectionRecord, PocketCollection};
use crate::common::{
    atomic, collection_name_of, default_key, is_default_key, secure_key, Atomic, Cipher,
    ReadExecutor, WriteExecutor, DEFAULT_PREFIX, SECURE_PREFIX,
};
use crate::errors::{ErrorKind, PocketError, PocketResult};
use crate::pocket_builder::PocketBuilder;
use crate::pocket_config::PocketConfig;
use crate::store::Substrate;

/// Where a store stands between its in-memory and persisted forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    /// No resident collection and no secure entry.
    Empty,
    /// At least one collection is resident in memory.
    Loaded,
    /// Nothing resident, but encrypted collections wait in the substrate.
    Locked,
}

/// An embedded document store.
///
/// `Pocket` keeps a registry of named [PocketCollection]s in memory and
/// persists them as JSON records in a key-value [Substrate]: plaintext under
/// `db.<name>` and encrypted under `db.secure.<name>`.
///
/// ## Lifecycle
///
/// - [Pocket::restore_store] loads every plaintext record.
/// - [Pocket::encrypt] replaces the plaintext records of the resident
///   collections with encrypted ones and unloads them.
/// - [Pocket::decrypt] turns every encrypted record back into plaintext,
///   both in the substrate and in memory. The data stays unencrypted at
///   rest until the next `encrypt`.
///
/// Bulk operations walk collections one at a time; a failure part way
/// leaves the collections already handled in their new state.
///
/// ```rust,ignore
/// let db = Pocket::builder().open()?;
/// let patients = db.get_collection("patients")?;
/// patients.insert(doc!{ "forename": "Foo", "surname": "Bar" })?;
///
/// db.encrypt("secret")?;
/// assert_eq!(db.state()?, StoreState::Locked);
///
/// db.decrypt("secret")?;
/// let patients = db.get_collection("patients")?;
/// assert_eq!(patients.size(), 1);
/// ```
#[derive(Clone)]
pub struct Pocket {
    inner: Arc<PocketInner>,
}

impl Pocket {
    pub fn builder() -> PocketBuilder {
        PocketBuilder::new()
    }

    pub(crate) fn open(config: PocketConfig) -> PocketResult<Self> {
        let inner = PocketInner::open(config)?;
        Ok(Pocket {
            inner: Arc::new(inner),
        })
    }

    /// Returns the named collection, creating an empty one if absent.
    ///
    /// # Errors
    ///
    /// [ErrorKind::InvalidOperation] for an empty name or one that starts
    /// with `secure.`, which would collide with the encrypted namespace.
    pub fn get_collection(&self, name: &str) -> PocketResult<PocketCollection> {
        self.inner.get_collection(name)
    }

    /// Same as [Pocket::get_collection].
    pub fn add_collection(&self, name: &str) -> PocketResult<PocketCollection> {
        self.inner.get_collection(name)
    }

    pub fn has_collection(&self, name: &str) -> bool {
        self.inner.has_collection(name)
    }

    /// Names of the resident collections in registration order.
    pub fn collection_names(&self) -> Vec<String> {
        self.inner.collection_names()
    }

    /// Destroys the named collection and deletes both of its persisted
    /// records. Removing an unknown collection is not an error.
    pub fn remove_collection(&self, name: &str) -> PocketResult<&Self> {
        self.inner.remove_collection(name)?;
        Ok(self)
    }

    /// Loads every plaintext record from the substrate, replacing resident
    /// collections of the same name.
    ///
    /// Documents keep the identifiers they were stored with.
    ///
    /// # Errors
    ///
    /// [ErrorKind::EncodingError] if a record is corrupt. Records loaded
    /// before the corrupt one stay loaded.
    pub fn restore_store(&self) -> PocketResult<&Self> {
        self.inner.restore_store()?;
        Ok(self)
    }

    /// Commits the store's collection with the same name as `collection`.
    pub fn commit(&self, collection: &PocketCollection) -> PocketResult<()> {
        self.inner.commit(collection)
    }

    /// Locks the store with `password`.
    ///
    /// For every resident collection in registration order the plaintext
    /// record is deleted and an encrypted one written. Then every resident
    /// collection is destroyed.
    pub fn encrypt(&self, password: &str) -> PocketResult<&Self> {
        self.inner.encrypt(password)?;
        Ok(self)
    }

    /// Unlocks every encrypted record with `password`.
    ///
    /// Each record is written back in plaintext, its encrypted form is
    /// deleted and the collection becomes resident.
    ///
    /// # Errors
    ///
    /// [ErrorKind::DecryptionFailure] for a wrong password or a corrupt
    /// payload. Collections unlocked before the failing one stay unlocked.
    pub fn decrypt(&self, password: &str) -> PocketResult<&Self> {
        self.inner.decrypt(password)?;
        Ok(self)
    }

    pub fn state(&self) -> PocketResult<StoreState> {
        self.inner.state()
    }

    /// Destroys every resident collection and releases the substrate.
    /// Later operations fail with [ErrorKind::StoreClosed].
    pub fn close(&self) -> PocketResult<()> {
        self.inner.close()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Relaxed)
    }

    pub fn config(&self) -> PocketConfig {
        self.inner.config.clone()
    }
}

impl std::fmt::Debug for Pocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pocket")
            .field("collections", &self.collection_names())
            .field("closed", &self.is_closed())
            .finish()
    }
}

struct PocketInner {
    config: PocketConfig,
    substrate: Substrate,
    cipher: Cipher,
    collections: Atomic<IndexMap<String, PocketCollection>>,
    closed: AtomicBool,
}

impl PocketInner {
    fn open(config: PocketConfig) -> PocketResult<Self> {
        let substrate = config.substrate()?;
        if !substrate.is_available() {
            log::error!("Substrate is not available, cannot open the store");
            return Err(PocketError::new(
                "Substrate is not available",
                ErrorKind::SubstrateUnavailable,
            ));
        }

        log::info!("Pocket store opened (auto commit: {})", config.auto_commit());
        Ok(PocketInner {
            cipher: config.cipher(),
            substrate,
            config,
            collections: atomic(IndexMap::new()),
            closed: AtomicBool::from(false),
        })
    }

    fn get_collection(&self, name: &str) -> PocketResult<PocketCollection> {
        self.ensure_open()?;
        validate_name(name)?;

        Ok(self.collections.write_with(|collections| {
            if let Some(existing) = collections.get(name) {
                if !existing.is_destroyed() {
                    return existing.clone();
                }
            }
            log::debug!("Creating collection '{}'", name);
            let collection = PocketCollection::new(
                name,
                self.config.collection_options(),
                self.substrate.clone(),
                self.cipher.clone(),
            );
            collections.insert(name.to_string(), collection.clone());
            collection
        }))
    }

    fn has_collection(&self, name: &str) -> bool {
        self.collections
            .read_with(|collections| collections.get(name).is_some_and(|c| !c.is_destroyed()))
    }

    fn collection_names(&self) -> Vec<String> {
        self.collections.read_with(|collections| {
            collections
                .iter()
                .filter(|(_, c)| !c.is_destroyed())
                .map(|(name, _)| name.clone())
                .collect()
        })
    }

    fn remove_collection(&self, name: &str) -> PocketResult<()> {
        self.ensure_open()?;
        if let Some(collection) = self.collections.write_with(|it| it.shift_remove(name)) {
            collection.destroy();
        }
        self.substrate.remove(&default_key(name))?;
        self.substrate.remove(&secure_key(name))?;
        log::debug!("Removed collection '{}'", name);
        Ok(())
    }

    fn restore_store(&self) -> PocketResult<()> {
        self.ensure_open()?;

        let mut restored = 0;
        for key in self.substrate.keys_with_prefix(DEFAULT_PREFIX)? {
            if !is_default_key(&key) {
                continue;
            }
            if let Some(text) = self.substrate.get(&key)? {
                let record = CollectionRecord::from_json(&text).map_err(|e| {
                    log::error!("Failed to restore '{}': {}", key, e);
                    PocketError::new_with_cause(
                        &format!("Failed to restore '{}'", key),
                        ErrorKind::EncodingError,
                        e,
                    )
                })?;
                if collection_name_of(&key) != Some(record.name.as_str()) {
                    log::warn!("Record under '{}' is named '{}'", key, record.name);
                }
                self.install(record);
                restored += 1;
            }
        }

        log::info!("Restored {} collections", restored);
        Ok(())
    }

    fn commit(&self, collection: &PocketCollection) -> PocketResult<()> {
        self.get_collection(collection.name())?.commit()?;
        Ok(())
    }

    fn encrypt(&self, password: &str) -> PocketResult<()> {
        self.ensure_open()?;
        let resident: Vec<PocketCollection> = self
            .collections
            .read_with(|collections| collections.values().cloned().collect());

        for collection in resident.iter() {
            if collection.is_destroyed() {
                log::warn!("Skipping destroyed collection '{}'", collection.name());
                continue;
            }
            self.substrate.remove(&default_key(collection.name()))?;
            collection.commit_secure(password)?;
        }
        self.substrate.flush()?;

        self.collections.write_with(|collections| {
            for collection in collections.values() {
                collection.destroy();
            }
            collections.clear();
        });
        log::info!("Encrypted {} collections", resident.len());
        Ok(())
    }

    fn decrypt(&self, password: &str) -> PocketResult<()> {
        self.ensure_open()?;

        let mut decrypted = 0;
        for key in self.substrate.keys_with_prefix(SECURE_PREFIX)? {
            if let Some(payload) = self.substrate.get(&key)? {
                let plaintext = self.cipher.decrypt(&payload, password).map_err(|e| {
                    log::error!("Failed to decrypt '{}': {}", key, e);
                    PocketError::new_with_cause(
                        &format!("Failed to decrypt '{}'", key),
                        ErrorKind::DecryptionFailure,
                        e,
                    )
                })?;
                let record = CollectionRecord::from_json(&plaintext)?;

                self.substrate.put(&default_key(&record.name), &plaintext)?;
                self.substrate.remove(&key)?;
                self.install(record);
                decrypted += 1;
            }
        }

        self.substrate.flush()?;
        log::info!("Decrypted {} collections", decrypted);
        Ok(())
    }

    fn state(&self) -> PocketResult<StoreState> {
        self.ensure_open()?;
        if !self.collection_names().is_empty() {
            return Ok(StoreState::Loaded);
        }
        if !self.substrate.keys_with_prefix(SECURE_PREFIX)?.is_empty() {
            return Ok(StoreState::Locked);
        }
        Ok(StoreState::Empty)
    }

    fn close(&self) -> PocketResult<()> {
        if self.closed.swap(true, Ordering::Relaxed) {
            return Ok(());
        }

        self.collections.write_with(|collections| {
            for collection in collections.values() {
                collection.destroy();
            }
            collections.clear();
        });
        self.substrate.flush()?;
        self.substrate.close()?;
        log::info!("Pocket store closed");
        Ok(())
    }

    /// Registers a collection built from `record`, destroying any resident
    /// collection it replaces.
    fn install(&self, record: CollectionRecord) {
        let collection =
            PocketCollection::from_record(record, self.substrate.clone(), self.cipher.clone());
        let previous = self.collections.write_with(|collections| {
            collections.insert(collection.name().to_string(), collection.clone())
        });
        if let Some(previous) = previous {
            previous.destroy();
        }
        log::debug!("Loaded collection '{}' ({} documents)", collection.name(), collection.size());
    }

    fn ensure_open(&self) -> PocketResult<()> {
        if self.closed.load(Ordering::Relaxed) {
            log::error!("Pocket store is closed");
            return Err(PocketError::new(
                "Pocket store is closed",
                ErrorKind::StoreClosed,
            ));
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> PocketResult<()> {
    if name.is_empty() {
        log::error!("Collection name cannot be empty");
        return Err(PocketError::new(
            "Collection name cannot be empty",
            ErrorKind::InvalidOperation,
        ));
    }

    let reserved = &SECURE_PREFIX[DEFAULT_PREFIX.len()..];
    if name.starts_with(reserved) {
        log::error!("Collection name '{}' uses the reserved prefix '{}'", name, reserved);
        return Err(PocketError::new(
            &format!("Collection name '{}' uses the reserved prefix '{}'", name, reserved),
            ErrorKind::InvalidOperation,
        ));
    }
    Ok(())
}
