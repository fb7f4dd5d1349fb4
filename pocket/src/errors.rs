use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

use crate::common::{atomic, Atomic};

/// Error kinds for Pocket operations
///
/// Each kind names one category of failure so callers can branch on
/// `error.kind()` instead of parsing messages.
///
/// # Examples
///
/// ```rust,ignore
/// use pocket::errors::{PocketError, ErrorKind, PocketResult};
///
/// fn example() -> PocketResult<()> {
///     Err(PocketError::new("Unrecognised operator '$in'", ErrorKind::UnsupportedOperator))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    // Substrate Errors
    /// The persistent medium is absent or disabled
    SubstrateUnavailable,
    /// Error reported by a substrate backend
    BackendError,
    /// Generic IO error
    IOError,

    // Query Errors
    /// A query references an operator outside the supported table
    UnsupportedOperator,
    /// An operator was given an operand of the wrong shape
    MalformedOperatorArgument,

    // Security Errors
    /// Wrong password or corrupted ciphertext
    DecryptionFailure,
    /// The cipher could not produce a secure payload
    EncryptionFailure,

    // Document Errors
    /// The document identifier is not usable
    InvalidId,
    /// Error encoding or decoding persisted data
    EncodingError,

    // Lifecycle Errors
    /// The operation is not valid in the current context
    InvalidOperation,
    /// The collection has been destroyed
    CollectionDestroyed,
    /// The store has already been closed
    StoreClosed,

    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::SubstrateUnavailable => write!(f, "Substrate unavailable"),
            ErrorKind::BackendError => write!(f, "Backend error"),
            ErrorKind::IOError => write!(f, "IO error"),
            ErrorKind::UnsupportedOperator => write!(f, "Unsupported operator"),
            ErrorKind::MalformedOperatorArgument => write!(f, "Malformed operator argument"),
            ErrorKind::DecryptionFailure => write!(f, "Decryption failure"),
            ErrorKind::EncryptionFailure => write!(f, "Encryption failure"),
            ErrorKind::InvalidId => write!(f, "Invalid ID"),
            ErrorKind::EncodingError => write!(f, "Encoding error"),
            ErrorKind::InvalidOperation => write!(f, "Invalid operation"),
            ErrorKind::CollectionDestroyed => write!(f, "Collection destroyed"),
            ErrorKind::StoreClosed => write!(f, "Store closed"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Custom Pocket error type.
///
/// `PocketError` carries a message, an [ErrorKind], an optional cause and the
/// backtrace captured at construction.
///
/// # Examples
///
/// ```rust,ignore
/// use pocket::errors::{PocketError, ErrorKind};
///
/// let cause = PocketError::new("aead::Error", ErrorKind::InternalError);
/// let err = PocketError::new_with_cause(
///     "Failed to decrypt collection 'patients'",
///     ErrorKind::DecryptionFailure,
///     cause,
/// );
/// ```
#[derive(Clone)]
pub struct PocketError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<PocketError>>,
    backtrace: Atomic<Backtrace>,
}

impl PocketError {
    /// Creates a new `PocketError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        PocketError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: atomic(Backtrace::new()),
        }
    }

    /// Creates a new `PocketError` chained to the error that caused it.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: PocketError) -> Self {
        PocketError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: atomic(Backtrace::new()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&PocketError> {
        self.cause.as_deref()
    }
}

impl Display for PocketError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for PocketError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{}: {}\nCaused by: {:?}", self.error_kind, self.message, cause),
            None => write!(f, "{}: {}\n{:?}", self.error_kind, self.message, self.backtrace.read()),
        }
    }
}

impl Error for PocketError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for Pocket operations.
pub type PocketResult<T> = Result<T, PocketError>;

impl From<std::io::Error> for PocketError {
    fn from(err: std::io::Error) -> Self {
        PocketError::new(&format!("IO error: {}", err), ErrorKind::IOError)
    }
}

impl From<serde_json::Error> for PocketError {
    fn from(err: serde_json::Error) -> Self {
        PocketError::new(
            &format!("JSON encoding error: {}", err),
            ErrorKind::EncodingError,
        )
    }
}

impl From<base64::DecodeError> for PocketError {
    fn from(err: base64::DecodeError) -> Self {
        PocketError::new(
            &format!("Base64 decoding error: {}", err),
            ErrorKind::DecryptionFailure,
        )
    }
}

impl From<std::string::FromUtf8Error> for PocketError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        PocketError::new(
            &format!("UTF-8 encoding error: {}", err),
            ErrorKind::EncodingError,
        )
    }
}
