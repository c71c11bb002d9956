use backtrace::Backtrace;
use parking_lot::RwLock;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

/// Error kinds for LodeDB operations.
///
/// Only the facade raises errors to callers. The storage engine, index store and
/// query engine report missing data through `Option`/`bool` results and log
/// persistence failures instead of propagating them.
///
/// # Examples
///
/// ```rust
/// use lodedb::errors::{ErrorKind, LodeError, LodeResult};
///
/// fn example() -> LodeResult<()> {
///     Err(LodeError::new("Index not found", ErrorKind::IndexNotFound))
/// }
/// assert!(example().is_err());
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    // IO and storage
    /// Generic IO error
    IOError,
    /// The file was not found
    FileNotFound,
    /// Permission denied for file operation
    PermissionDenied,

    // Data encoding
    /// Error encoding or decoding JSON text
    EncodingError,
    /// Error mapping a Rust object to/from a document payload
    ObjectMappingError,

    // Validation
    /// Collection name is empty or cannot be used as a directory name
    InvalidCollectionName,
    /// Field path is empty or cannot be used as an index file name
    InvalidFieldName,
    /// Document id is empty or cannot be used as a file name
    InvalidId,

    // Indexing
    /// Index already exists for the collection and field
    IndexAlreadyExists,
    /// Index does not exist
    IndexNotFound,

    // Lifecycle
    /// Database has already been closed
    StoreAlreadyClosed,
    /// The operation is not valid in the current context
    InvalidOperation,

    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::IOError => write!(f, "IO error"),
            ErrorKind::FileNotFound => write!(f, "File not found"),
            ErrorKind::PermissionDenied => write!(f, "Permission denied"),
            ErrorKind::EncodingError => write!(f, "Encoding error"),
            ErrorKind::ObjectMappingError => write!(f, "Object mapping error"),
            ErrorKind::InvalidCollectionName => write!(f, "Invalid collection name"),
            ErrorKind::InvalidFieldName => write!(f, "Invalid field name"),
            ErrorKind::InvalidId => write!(f, "Invalid ID"),
            ErrorKind::IndexAlreadyExists => write!(f, "Index already exists"),
            ErrorKind::IndexNotFound => write!(f, "Index not found"),
            ErrorKind::StoreAlreadyClosed => write!(f, "Store already closed"),
            ErrorKind::InvalidOperation => write!(f, "Invalid operation"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Custom LodeDB error type.
///
/// `LodeError` carries a message, an [ErrorKind], an optional cause and the
/// backtrace captured where it was created.
#[derive(Clone)]
pub struct LodeError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<LodeError>>,
    backtrace: Arc<RwLock<Backtrace>>,
}

impl LodeError {
    /// Creates a new `LodeError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        LodeError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: Arc::new(RwLock::new(Backtrace::new())),
        }
    }

    /// Creates a new `LodeError` chained to the error that caused it.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: LodeError) -> Self {
        LodeError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: Arc::new(RwLock::new(Backtrace::new())),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&LodeError> {
        self.cause.as_deref()
    }
}

impl Display for LodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for LodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => write!(f, "{}\n{:?}", self.message, self.backtrace.read()),
        }
    }
}

impl Error for LodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for LodeDB operations.
pub type LodeResult<T> = Result<T, LodeError>;

impl From<std::io::Error> for LodeError {
    fn from(err: std::io::Error) -> Self {
        let error_kind = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied,
            _ => ErrorKind::IOError,
        };
        LodeError::new(&format!("IO error: {}", err), error_kind)
    }
}

impl From<serde_json::Error> for LodeError {
    fn from(err: serde_json::Error) -> Self {
        let error_kind = if err.is_io() {
            ErrorKind::IOError
        } else {
            ErrorKind::EncodingError
        };
        LodeError::new(&format!("JSON error: {}", err), error_kind)
    }
}

impl From<std::string::FromUtf8Error> for LodeError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        LodeError::new(
            &format!("UTF-8 encoding error: {}", err),
            ErrorKind::EncodingError,
        )
    }
}

impl From<String> for LodeError {
    fn from(msg: String) -> Self {
        LodeError::new(&msg, ErrorKind::InternalError)
    }
}

impl From<&str> for LodeError {
    fn from(msg: &str) -> Self {
        LodeError::new(msg, ErrorKind::InternalError)
    }
}
