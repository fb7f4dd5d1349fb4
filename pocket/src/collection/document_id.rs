use rand::Rng;
use serde_json::Value;
use std::fmt::{Debug, Display};

use crate::errors::{ErrorKind, PocketError, PocketResult};

const ID_TEMPLATE: &[u8; 36] = b"xxxxxxxx-xxxx-4xxx-yxxx-xxxxxxxxxxxx";
const HEX: &[u8; 16] = b"0123456789abcdef";

/// The identifier stored in the `_id` field of every [crate::collection::Document].
///
/// Generated identifiers follow the random UUID layout
/// `xxxxxxxx-xxxx-4xxx-yxxx-xxxxxxxxxxxx`, where every `x` is a random hex
/// digit, `4` marks the generated format and `y` is one of `8`, `9`, `a`, `b`.
/// Generation draws from a fast non-cryptographic source and uniqueness is
/// never re-checked; collisions are merely improbable.
///
/// Caller supplied identifiers are kept verbatim and need not follow the
/// generated layout.
///
/// # Examples
///
/// ```rust,ignore
/// use pocket::collection::DocumentId;
///
/// let id = DocumentId::generate();
/// assert_eq!(id.as_str().len(), 36);
/// assert!(id.is_generated());
///
/// let custom = DocumentId::from("patient-394");
/// assert!(!custom.is_generated());
/// ```
#[derive(PartialEq, Eq, Ord, PartialOrd, Hash, Clone, serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct DocumentId {
    value: String,
}

impl DocumentId {
    /// Generates a new random identifier.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let token: String = ID_TEMPLATE
            .iter()
            .map(|c| match c {
                b'x' => HEX[rng.gen_range(0..16)] as char,
                b'y' => HEX[(rng.gen_range(0..16) & 0x3) | 0x8] as char,
                other => *other as char,
            })
            .collect();
        DocumentId { value: token }
    }

    /// Builds an identifier from a JSON value supplied by the caller.
    ///
    /// Strings are used verbatim; numbers and booleans are stored in their
    /// textual form. Any other value is rejected.
    pub fn from_value(value: &Value) -> PocketResult<Self> {
        match value {
            Value::String(s) if !s.is_empty() => Ok(DocumentId { value: s.clone() }),
            Value::Number(n) => Ok(DocumentId { value: n.to_string() }),
            Value::Bool(b) => Ok(DocumentId { value: b.to_string() }),
            other => {
                log::error!("Invalid document id {}", other);
                Err(PocketError::new(
                    &format!("Invalid document id {}, expected a non-empty string", other),
                    ErrorKind::InvalidId,
                ))
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Returns true if this identifier follows the generated layout.
    pub fn is_generated(&self) -> bool {
        let bytes = self.value.as_bytes();
        bytes.len() == ID_TEMPLATE.len()
            && bytes.iter().zip(ID_TEMPLATE.iter()).all(|(b, t)| match t {
                b'x' => HEX.contains(b),
                b'y' => matches!(b, b'8' | b'9' | b'a' | b'b'),
                other => b == other,
            })
    }
}

impl From<&str> for DocumentId {
    fn from(value: &str) -> Self {
        DocumentId { value: value.to_string() }
    }
}

impl From<String> for DocumentId {
    fn from(value: String) -> Self {
        DocumentId { value }
    }
}

impl From<DocumentId> for Value {
    fn from(id: DocumentId) -> Self {
        Value::String(id.value)
    }
}

impl Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl Debug for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DocumentId({})", self.value)
    }
}
