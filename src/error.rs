//! Error Types
//!
//! Failures surfaced by construction and the file codec. Normal map
//! operations never fail.

use std::io;
use thiserror::Error;

/// Result alias for skipcache operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by skipcache
#[derive(Error, Debug)]
pub enum Error {
    /// Underlying file I/O failed while dumping or loading
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A configuration value is out of range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
