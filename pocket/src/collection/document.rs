use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt::{Debug, Display};
use std::sync::Arc;

use crate::collection::DocumentId;
use crate::common::{atomic, Atomic, ReadExecutor, WriteExecutor, DOC_ID};
use crate::errors::{ErrorKind, PocketError, PocketResult};

/// Represents a document in a Pocket collection.
///
/// A document is a schema-less record of key-value pairs where the key is a
/// [String] and the value is any JSON value. Every document carries an
/// identifier in the reserved `_id` field. A `Document` can only be built
/// through its factories, each of which assigns an identifier when the input
/// has none, so an identifier-less document never exists.
///
/// ## Shared records
///
/// `Document` is a handle. Cloning it clones the handle, and both clones see
/// the same record. Documents returned from
/// [crate::collection::PocketCollection::find] are handles onto the live
/// records of the collection: calling [Document::put] on them changes the
/// in-memory collection without going through the persistence path. Use
/// [Document::deep_copy] to obtain an independent record.
///
/// ```rust,ignore
/// let stored = patients.insert(doc!{ "forename": "Foo" })?;
/// let found = patients.find_one(doc!{ "_id": (stored.id().as_str()) })?.unwrap();
/// found.put("forename", "Baz")?;
/// assert_eq!(stored.get("forename"), Some(Value::from("Baz")));
/// ```
#[derive(Clone)]
pub struct Document {
    inner: Atomic<DocumentInner>,
}

#[derive(Clone, PartialEq)]
struct DocumentInner {
    id: DocumentId,
    fields: Map<String, Value>,
}

impl Document {
    /// Creates an empty document with a generated identifier.
    pub fn new() -> Self {
        Document::with_id(DocumentId::generate(), Map::new())
    }

    /// Creates a document with an explicit identifier.
    ///
    /// Any `_id` entry in `fields` is discarded in favour of `id`.
    pub fn with_id(id: DocumentId, mut fields: Map<String, Value>) -> Self {
        fields.remove(DOC_ID);
        Document {
            inner: atomic(DocumentInner { id, fields }),
        }
    }

    /// Creates a document from a field map.
    ///
    /// If the map has an `_id` entry it becomes the identifier, otherwise a
    /// new one is generated.
    ///
    /// # Errors
    ///
    /// Returns [ErrorKind::InvalidId] if `_id` is present but is not a
    /// non-empty string, number or boolean.
    pub fn from_fields(mut fields: Map<String, Value>) -> PocketResult<Self> {
        let id = match fields.remove(DOC_ID) {
            Some(value) => DocumentId::from_value(&value)?,
            None => DocumentId::generate(),
        };
        Ok(Document::with_id(id, fields))
    }

    /// Creates a document from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [ErrorKind::InvalidOperation] if `value` is not an object.
    pub fn from_value(value: Value) -> PocketResult<Self> {
        match value {
            Value::Object(fields) => Document::from_fields(fields),
            other => {
                log::error!("Document must be a JSON object, found {}", other);
                Err(PocketError::new(
                    "Document must be a JSON object",
                    ErrorKind::InvalidOperation,
                ))
            }
        }
    }

    /// Returns the identifier of this document.
    pub fn id(&self) -> DocumentId {
        self.inner.read_with(|it| it.id.clone())
    }

    /// Returns the value of a field, or `None` if the document lacks it.
    ///
    /// `_id` resolves to the identifier as a string.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.read_with(|it| {
            if key == DOC_ID {
                Some(Value::String(it.id.as_str().to_string()))
            } else {
                it.fields.get(key).cloned()
            }
        })
    }

    /// Evaluates `f` against a field without cloning its value.
    pub(crate) fn with_field<R>(&self, key: &str, f: impl FnOnce(Option<&Value>) -> R) -> R {
        self.inner.read_with(|it| {
            if key == DOC_ID {
                let id = Value::String(it.id.as_str().to_string());
                f(Some(&id))
            } else {
                f(it.fields.get(key))
            }
        })
    }

    /// Returns true if the document has the field. Always true for `_id`.
    pub fn contains_key(&self, key: &str) -> bool {
        key == DOC_ID || self.inner.read_with(|it| it.fields.contains_key(key))
    }

    /// Associates a value with a field, replacing any previous value.
    ///
    /// This mutates the shared record in place and does not persist it.
    ///
    /// # Errors
    ///
    /// Returns [ErrorKind::InvalidOperation] for an empty key or for `_id`,
    /// which cannot be reassigned.
    pub fn put(&self, key: &str, value: impl Into<Value>) -> PocketResult<()> {
        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(PocketError::new(
                "Document does not support empty key",
                ErrorKind::InvalidOperation,
            ));
        }

        if key == DOC_ID {
            log::error!("Document id cannot be reassigned");
            return Err(PocketError::new(
                "Document id cannot be reassigned",
                ErrorKind::InvalidOperation,
            ));
        }

        let value = value.into();
        self.inner.write_with(|it| {
            it.fields.insert(key.to_string(), value);
        });
        Ok(())
    }

    /// Removes a field and returns its previous value. `_id` is never removed.
    pub fn remove(&self, key: &str) -> Option<Value> {
        if key == DOC_ID {
            return None;
        }
        self.inner.write_with(|it| it.fields.remove(key))
    }

    /// Returns the field names, excluding `_id`, in insertion order.
    pub fn fields(&self) -> Vec<String> {
        self.inner.read_with(|it| it.fields.keys().cloned().collect())
    }

    /// Number of fields, excluding `_id`.
    pub fn size(&self) -> usize {
        self.inner.read_with(|it| it.fields.len())
    }

    /// Returns true if the document has no field besides `_id`.
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Returns the fields together with `_id`.
    pub fn to_fields(&self) -> Map<String, Value> {
        self.inner.read_with(|it| {
            let mut fields = it.fields.clone();
            fields.insert(DOC_ID.to_string(), Value::String(it.id.as_str().to_string()));
            fields
        })
    }

    /// Returns the document as a JSON object, `_id` included.
    pub fn to_value(&self) -> Value {
        Value::Object(self.to_fields())
    }

    /// Returns an independent copy of this record with the same identifier.
    pub fn deep_copy(&self) -> Document {
        Document {
            inner: atomic(self.inner.read_with(|it| it.clone())),
        }
    }

    /// Returns true if both handles point at the same record.
    pub fn ptr_eq(&self, other: &Document) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for Document {
    fn default() -> Self {
        Document::new()
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        let left = self.inner.read_with(|it| it.clone());
        other.inner.read_with(|it| left == *it)
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.inner.read_with(|it| {
            let mut map = serializer.serialize_map(Some(it.fields.len() + 1))?;
            for (key, value) in it.fields.iter() {
                map.serialize_entry(key, value)?;
            }
            map.serialize_entry(DOC_ID, it.id.as_str())?;
            map.end()
        })
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = Map::<String, Value>::deserialize(deserializer)?;
        Document::from_fields(fields).map_err(|e| D::Error::custom(e.message()))
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_value())
    }
}

impl Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Document({})", self.to_value())
    }
}

/// Conversion into the field map of a new document.
///
/// Implemented for JSON objects, field maps and existing documents, so that
/// collection writes accept whichever the caller has at hand.
pub trait IntoFields {
    fn into_fields(self) -> PocketResult<Map<String, Value>>;
}

impl IntoFields for Map<String, Value> {
    fn into_fields(self) -> PocketResult<Map<String, Value>> {
        Ok(self)
    }
}

impl IntoFields for Value {
    fn into_fields(self) -> PocketResult<Map<String, Value>> {
        match self {
            Value::Object(fields) => Ok(fields),
            other => {
                log::error!("Expected a JSON object, found {}", other);
                Err(PocketError::new(
                    "Expected a JSON object",
                    ErrorKind::InvalidOperation,
                ))
            }
        }
    }
}

impl IntoFields for Document {
    fn into_fields(self) -> PocketResult<Map<String, Value>> {
        Ok(self.to_fields())
    }
}

impl IntoFields for &Document {
    fn into_fields(self) -> PocketResult<Map<String, Value>> {
        Ok(self.to_fields())
    }
}

/// Builds a JSON object for use as document fields or as a query.
///
/// ```rust,ignore
/// let fields = doc!{ "forename": "Foo", "age": 18 };
/// let query = doc!{ "age": { "$gt": 17 } };
/// ```
#[macro_export]
macro_rules! doc {
    () => {
        $crate::serde_json::json!({})
    };
    ($($body:tt)+) => {
        $crate::serde_json::json!({ $($body)+ })
    };
}
