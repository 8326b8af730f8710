//! Error types shared by the services and the HTTP layer
//!
//! Every service returns [`CoreResult`]. The [`CoreErrorKind`] decides how an
//! error is surfaced: the HTTP layer maps each kind to a status code and a
//! stable `code` string.
//!
//! # Error Categories
//!
//! - **NotFound**: a referenced drawing type, line type, component or version is missing
//! - **Validation**: malformed input such as an empty name or a zero count
//! - **Conflict**: a uniqueness rule was violated, nothing was written
//! - **InvalidMove**: a drag/drop could not be resolved into an index assignment
//! - **Unavailable**: the external inference server is unreachable or slow
//! - **Internal**: database or other unexpected failures
//!
//! ```rust
//! use taxonomy::errors::{CoreError, CoreErrorKind};
//!
//! let err = CoreError::not_found("LineType", "42");
//! assert_eq!(err.kind(), CoreErrorKind::NotFound);
//! assert_eq!(err.kind().code(), "NOT_FOUND");
//! ```

mod core_error;

pub use core_error::{CoreError, CoreErrorKind};

/// Result type alias for service operations
pub type CoreResult<T> = Result<T, CoreError>;
