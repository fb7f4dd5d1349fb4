use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::collection::{CollectionOptions, CollectionRecord, Document, IntoFields};
use crate::common::{
    atomic, default_key, secure_key, Atomic, Cipher, ReadExecutor, WriteExecutor,
};
use crate::errors::{ErrorKind, PocketError, PocketResult};
use crate::filter::IntoQuery;
use crate::store::Substrate;

/// A named, ordered set of documents.
///
/// `PocketCollection` is a handle; clones refer to the same collection. A
/// collection is obtained from [crate::Pocket::get_collection] and belongs to
/// that store.
///
/// Documents keep their insertion order and every read returns them in that
/// order. Reads hand out [Document] handles onto the live records.
///
/// When the collection's [CollectionOptions::auto_commit] is set, every
/// insert, update and remove ends with a plaintext [PocketCollection::commit].
///
/// ```rust,ignore
/// let patients = db.get_collection("patients")?;
/// patients.insert(doc!{ "forename": "Foo", "surname": "Bar", "age": 18 })?;
///
/// let adults = patients.find(doc!{ "age": { "$gte": 18 } })?;
/// patients.update(doc!{ "forename": "Foo" }, doc!{ "forename": "Foo", "age": 19 })?;
/// patients.remove(field("surname").eq("Bar"))?;
/// ```
#[derive(Clone)]
pub struct PocketCollection {
    inner: Arc<PocketCollectionInner>,
}

struct PocketCollectionInner {
    name: String,
    options: CollectionOptions,
    substrate: Substrate,
    cipher: Cipher,
    documents: Atomic<Vec<Document>>,
    destroyed: AtomicBool,
}

impl PocketCollection {
    pub(crate) fn new(
        name: &str,
        options: CollectionOptions,
        substrate: Substrate,
        cipher: Cipher,
    ) -> Self {
        PocketCollection::with_documents(name, options, substrate, cipher, Vec::new())
    }

    pub(crate) fn from_record(record: CollectionRecord, substrate: Substrate, cipher: Cipher) -> Self {
        PocketCollection::with_documents(
            &record.name,
            record.options,
            substrate,
            cipher,
            record.documents,
        )
    }

    fn with_documents(
        name: &str,
        options: CollectionOptions,
        substrate: Substrate,
        cipher: Cipher,
        documents: Vec<Document>,
    ) -> Self {
        PocketCollection {
            inner: Arc::new(PocketCollectionInner {
                name: name.to_string(),
                options,
                substrate,
                cipher,
                documents: atomic(documents),
                destroyed: AtomicBool::new(false),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn options(&self) -> CollectionOptions {
        self.inner.options
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.load(Ordering::Relaxed)
    }

    /// Number of documents. A destroyed collection is empty.
    pub fn size(&self) -> usize {
        self.inner.documents.read_with(|docs| docs.len())
    }

    /// Appends a document and returns the stored record.
    ///
    /// An identifier is generated when the input has no `_id`. Caller
    /// supplied identifiers are kept as given and are not checked for
    /// uniqueness.
    pub fn insert<T: IntoFields>(&self, document: T) -> PocketResult<Document> {
        self.ensure_alive()?;
        let document = Document::from_fields(document.into_fields()?)?;
        self.inner
            .documents
            .write_with(|docs| docs.push(document.clone()));

        log::debug!("Inserted {} into collection '{}'", document.id(), self.name());
        self.auto_commit()?;
        Ok(document)
    }

    /// Appends several documents with a single commit.
    ///
    /// Every input is converted before any is appended, so an invalid input
    /// leaves the collection unchanged.
    pub fn insert_many<T: IntoFields>(&self, documents: Vec<T>) -> PocketResult<Vec<Document>> {
        self.ensure_alive()?;
        let documents = documents
            .into_iter()
            .map(|doc| Document::from_fields(doc.into_fields()?))
            .collect::<PocketResult<Vec<_>>>()?;

        self.inner
            .documents
            .write_with(|docs| docs.extend(documents.iter().cloned()));

        log::debug!(
            "Inserted {} documents into collection '{}'",
            documents.len(),
            self.name()
        );
        self.auto_commit()?;
        Ok(documents)
    }

    /// Removes every document matching `query`.
    pub fn remove<Q: IntoQuery>(&self, query: Q) -> PocketResult<&Self> {
        self.ensure_alive()?;
        let query = query.into_query()?;
        let removed = self.inner.documents.write_with(|docs| {
            let matches = query.select(docs);
            docs.retain(|doc| !matches.iter().any(|m| m.ptr_eq(doc)));
            matches.len()
        });

        log::debug!("Removed {} documents from collection '{}'", removed, self.name());
        self.auto_commit()?;
        Ok(self)
    }

    /// Replaces every document matching `query` with a new record built
    /// from `document`, keeping its position.
    ///
    /// The matched records are discarded together with their identifiers:
    /// unless `document` carries an `_id`, each replacement receives a newly
    /// generated one.
    pub fn update<Q: IntoQuery, T: IntoFields>(&self, query: Q, document: T) -> PocketResult<&Self> {
        self.ensure_alive()?;
        let query = query.into_query()?;
        let template = document.into_fields()?;
        // surface a bad _id before anything is replaced
        Document::from_fields(template.clone())?;

        let updated = self.inner.documents.write_with(|docs| {
            let mut updated = 0;
            for slot in docs.iter_mut() {
                if query.matches(slot) {
                    *slot = Document::from_fields(template.clone())?;
                    updated += 1;
                }
            }
            Ok::<usize, PocketError>(updated)
        })?;

        log::debug!("Updated {} documents in collection '{}'", updated, self.name());
        self.auto_commit()?;
        Ok(self)
    }

    /// Documents matching `query`, in insertion order.
    ///
    /// # Errors
    ///
    /// [ErrorKind::UnsupportedOperator] or
    /// [ErrorKind::MalformedOperatorArgument] for an invalid query; no
    /// partial result is returned.
    pub fn find<Q: IntoQuery>(&self, query: Q) -> PocketResult<Vec<Document>> {
        self.ensure_alive()?;
        let query = query.into_query()?;
        Ok(self.inner.documents.read_with(|docs| query.select(docs)))
    }

    /// The first document matching `query`, if any.
    pub fn find_one<Q: IntoQuery>(&self, query: Q) -> PocketResult<Option<Document>> {
        self.ensure_alive()?;
        let query = query.into_query()?;
        Ok(self
            .inner
            .documents
            .read_with(|docs| docs.iter().find(|doc| query.matches(doc)).cloned()))
    }

    pub fn find_all(&self) -> PocketResult<Vec<Document>> {
        self.ensure_alive()?;
        Ok(self.inner.documents.read_with(|docs| docs.clone()))
    }

    /// Writes the whole collection, in plaintext, to the substrate.
    pub fn commit(&self) -> PocketResult<&Self> {
        self.ensure_alive()?;
        let text = self.to_record().to_json()?;
        self.inner.substrate.put(&default_key(self.name()), &text)?;
        log::debug!("Committed collection '{}' ({} documents)", self.name(), self.size());
        Ok(self)
    }

    /// Writes the whole collection, encrypted with `password`, to the
    /// substrate. The plaintext entry, if any, is left untouched.
    pub fn commit_secure(&self, password: &str) -> PocketResult<&Self> {
        self.ensure_alive()?;
        let text = self.to_record().to_json()?;
        let payload = self.inner.cipher.encrypt(&text, password).map_err(|e| {
            log::error!("Failed to encrypt collection '{}': {}", self.name(), e);
            PocketError::new_with_cause(
                &format!("Failed to encrypt collection '{}'", self.name()),
                ErrorKind::EncryptionFailure,
                e,
            )
        })?;
        self.inner.substrate.put(&secure_key(self.name()), &payload)?;
        log::debug!("Committed collection '{}' securely", self.name());
        Ok(self)
    }

    /// Releases the in-memory documents. Persisted entries are not touched.
    /// Any later operation fails with [ErrorKind::CollectionDestroyed].
    pub fn destroy(&self) {
        if !self.inner.destroyed.swap(true, Ordering::Relaxed) {
            self.inner.documents.write_with(|docs| docs.clear());
            log::debug!("Destroyed collection '{}'", self.name());
        }
    }

    pub(crate) fn to_record(&self) -> CollectionRecord {
        let documents = self.inner.documents.read_with(|docs| docs.clone());
        CollectionRecord::new(self.name(), documents, self.options())
    }

    fn auto_commit(&self) -> PocketResult<()> {
        if self.inner.options.auto_commit() {
            self.commit()?;
        }
        Ok(())
    }

    fn ensure_alive(&self) -> PocketResult<()> {
        if self.is_destroyed() {
            log::error!("Collection '{}' is destroyed and cannot be accessed", self.name());
            return Err(PocketError::new(
                &format!("Collection '{}' is destroyed and cannot be accessed", self.name()),
                ErrorKind::CollectionDestroyed,
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for PocketCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PocketCollection")
            .field("name", &self.inner.name)
            .field("size", &self.size())
            .field("options", &self.inner.options)
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}
