//! Integration tests for Pocket. Shared helpers live in [test_util].

pub mod test_util;
