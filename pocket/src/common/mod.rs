//! Shared constants, synchronisation helpers and the cipher seam.

mod constants;
mod security;
mod util;

pub use constants::*;
pub use security::*;
pub use util::*;
