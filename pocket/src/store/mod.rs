//! The key-value substrate a Pocket store persists into.
//!
//! [Substrate] wraps any [SubstrateProvider]. The in-memory provider lives
//! here; durable providers live in adapter crates such as
//! `pocket_fjall_adapter`.

mod memory;
mod substrate;

pub use memory::*;
pub use substrate::*;
