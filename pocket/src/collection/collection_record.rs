use serde::{Deserialize, Serialize};

use crate::collection::{CollectionOptions, Document};
use crate::common::POCKET_VERSION;
use crate::errors::{ErrorKind, PocketError, PocketResult};

/// The serialized form of a collection as stored in the substrate.
///
/// ```json
/// { "name": "patients", "documents": [ { "forename": "Foo", "_id": "..." } ],
///   "options": { "autoCommit": true }, "length": 1, "version": "1.0.1" }
/// ```
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CollectionRecord {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) documents: Vec<Document>,
    #[serde(default)]
    pub(crate) options: CollectionOptions,
    #[serde(default)]
    pub(crate) length: usize,
    #[serde(default)]
    pub(crate) version: String,
}

impl CollectionRecord {
    pub(crate) fn new(name: &str, documents: Vec<Document>, options: CollectionOptions) -> Self {
        CollectionRecord {
            name: name.to_string(),
            length: documents.len(),
            documents,
            options,
            version: POCKET_VERSION.to_string(),
        }
    }

    pub(crate) fn to_json(&self) -> PocketResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses a record. The stored `length` is ignored in favour of the
    /// actual document count.
    pub(crate) fn from_json(text: &str) -> PocketResult<Self> {
        let mut record: CollectionRecord = serde_json::from_str(text).map_err(|e| {
            log::error!("Corrupt collection record: {}", e);
            PocketError::new_with_cause(
                "Corrupt collection record",
                ErrorKind::EncodingError,
                PocketError::from(e),
            )
        })?;

        if record.length != record.documents.len() {
            log::warn!(
                "Collection record '{}' claims {} documents but holds {}",
                record.name,
                record.length,
                record.documents.len()
            );
        }
        record.length = record.documents.len();
        Ok(record)
    }
}
