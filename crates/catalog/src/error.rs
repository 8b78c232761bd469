//! Catalog Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction. Every variant is fatal for the generation that raised
//! it: no partial document is ever returned.

use derive_more::{Display, Error};

/// A generation error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for generation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of a generation failure.
///
/// ### Operational Errors
/// - [`ErrorKind::Template`]
/// - [`ErrorKind::UnknownArchitecture`]
/// - [`ErrorKind::Timestamp`]
///
/// ### Dependency Errors
/// - [`ErrorKind::Storage`]
/// - [`ErrorKind::Digest`]
///
/// ### Setup Errors
/// - [`ErrorKind::Pattern`]
/// - [`ErrorKind::Config`]
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// A name template failed to compile or render.
    #[display("issue with name generation from template")]
    Template,
    /// An architecture token is missing from the table and the policy
    /// rejects unknown tokens.
    #[display("unknown architecture: {_0}")]
    UnknownArchitecture(#[error(not(source))] String),
    /// A timestamp could not be formatted.
    #[display("failed to format timestamp")]
    Timestamp,
    /// Listing or opening files through the storage backend failed.
    #[display("storage operation failed")]
    Storage,
    /// Reading a file while hashing it failed.
    #[display("failed to compute file digests")]
    Digest,
    /// The artifact filename pattern could not be compiled.
    #[display("invalid artifact filename pattern")]
    Pattern,
    /// The configuration does not describe a usable generator.
    #[display("invalid generator configuration: {_0}")]
    Config(#[error(not(source))] String),
}
