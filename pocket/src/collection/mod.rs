//! Collections and documents.
//!
//! # Documents
//!
//! A [Document] is a schema-less map from field names to JSON values that
//! always carries an identifier under `_id`. Documents are shared handles:
//! the records returned by a query are the records held by the collection.
//!
//! ```rust,ignore
//! use pocket::collection::Document;
//! use pocket::doc;
//!
//! let document = Document::from_value(doc!{ "forename": "Foo", "age": 18 })?;
//! document.put("surname", "Bar")?;
//! assert!(document.id().is_generated());
//! ```
//!
//! # Collections
//!
//! A [PocketCollection] keeps documents in insertion order and supports
//! insert, update, remove and query. With auto-commit enabled every write is
//! followed by a full plaintext commit to the substrate.
//!
//! ```rust,ignore
//! let patients = db.get_collection("patients")?;
//! let stored = patients.insert(doc!{ "forename": "Foo" })?;
//! let found = patients.find_one(doc!{ "_id": (stored.id().as_str()) })?;
//! ```
//!
//! # Document IDs
//!
//! Identifiers are strings. When a document is built without `_id` a random
//! identifier in the UUID v4 layout is generated; see [DocumentId].

mod collection_options;
mod collection_record;
mod document;
mod document_id;
mod pocket_collection;

pub use collection_options::*;
pub(crate) use collection_record::*;
pub use document::*;
pub use document_id::*;
pub use pocket_collection::*;
