//! Fjall substrate for Pocket.
//!
//! Persists Pocket collection records in a [fjall](https://docs.rs/fjall)
//! LSM-tree keyspace so that stores survive process restarts.
//!
//! ```rust,ignore
//! use pocket::Pocket;
//! use pocket_fjall_adapter::FjallSubstrate;
//!
//! let substrate = FjallSubstrate::with_config().db_path("/tmp/pocket").build()?;
//! let db = Pocket::builder().substrate(substrate).open()?;
//! db.restore_store()?;
//! ```

mod config;
mod error;
mod substrate;

pub use config::*;
pub use error::*;
pub use substrate::*;
