use crate::common::{DEFAULT_PREFIX, SECURE_PREFIX};

/// Substrate key holding the plaintext record of a collection.
#[inline]
pub fn default_key(name: &str) -> String {
    format!("{}{}", DEFAULT_PREFIX, name)
}

/// Substrate key holding the encrypted record of a collection.
#[inline]
pub fn secure_key(name: &str) -> String {
    format!("{}{}", SECURE_PREFIX, name)
}

/// Returns true if `key` belongs to the secure namespace.
#[inline]
pub fn is_secure_key(key: &str) -> bool {
    key.starts_with(SECURE_PREFIX)
}

/// Returns true if `key` belongs to the plaintext namespace.
///
/// The secure prefix itself starts with the plaintext prefix, so secure keys
/// are excluded explicitly.
#[inline]
pub fn is_default_key(key: &str) -> bool {
    key.starts_with(DEFAULT_PREFIX) && !is_secure_key(key)
}

/// Extracts the collection name from a namespaced substrate key.
pub fn collection_name_of(key: &str) -> Option<&str> {
    if is_secure_key(key) {
        key.strip_prefix(SECURE_PREFIX)
    } else {
        key.strip_prefix(DEFAULT_PREFIX)
    }
}
