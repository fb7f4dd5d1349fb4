//! # Pocket - Embedded Document Store
//!
//! Pocket layers a MongoDB-like query and persistence model over a plain
//! string key-value substrate. Collections live in memory and are committed
//! as JSON records; a whole store can be locked with a password and
//! unlocked later.
//!
//! ## Key Features
//!
//! - **Schema-less documents** with a guaranteed `_id`
//! - **Queries** with `$eq`, `$ne`, `$or`, `$gt`, `$gte`, `$lt` and `$lte`
//! - **Auto commit** of a collection after every write, or manual commits
//! - **Encryption at rest** with AES-256-GCM keyed through Argon2id
//! - **Pluggable substrates**: in-memory here, fjall in `pocket_fjall_adapter`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pocket::{doc, Pocket};
//! use pocket::filter::field;
//!
//! let db = Pocket::builder().open()?;
//! let patients = db.get_collection("patients")?;
//!
//! patients.insert(doc!{ "forename": "Foo", "surname": "Bar", "age": 18 })?;
//! patients.insert(doc!{ "forename": "Baz", "surname": "Bar", "age": 16 })?;
//!
//! let adults = patients.find(doc!{ "age": { "$gt": 17 } })?;
//! let same = patients.find(field("age").gt(17))?;
//!
//! db.encrypt("secret")?;
//! db.decrypt("secret")?;
//! db.close()?;
//! ```
//!
//! ## Module Organization
//!
//! - [`collection`] - documents, identifiers and collections
//! - [`common`] - constants, lock helpers and the cipher
//! - [`errors`] - error type and result alias
//! - [`filter`] - query parsing and evaluation
//! - [`store`] - the key-value substrate
//! - [`pocket`] - the store itself
//! - [`pocket_builder`] / [`pocket_config`] - opening and configuring a store

pub mod collection;
pub mod common;
pub mod errors;
pub mod filter;
pub mod pocket;
pub mod pocket_builder;
pub mod pocket_config;
pub mod store;

pub use collection::{CollectionOptions, Document, DocumentId, PocketCollection};
pub use errors::{ErrorKind, PocketError, PocketResult};
pub use pocket::{Pocket, StoreState};
pub use pocket_builder::PocketBuilder;
pub use pocket_config::PocketConfig;

#[doc(hidden)]
pub use serde_json;
pub use serde_json::Value;
