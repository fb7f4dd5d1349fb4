mod type_utils;
mod key_utils;

pub use key_utils::*;
pub use type_utils::*;
