//! Error types for the `chained-hash` crate

use std::collections::TryReserveError;

/// Errors raised while building tables or loading key files
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Memory could not be reserved for a table, an entry key or an entry value.
    ///
    /// The operation that failed left the table exactly as it was.
    #[error("allocation failed")]
    AllocationFailure(#[from] TryReserveError),

    /// The key file could not be opened, mapped or read.
    #[error("unable to read key file")]
    Io(#[from] std::io::Error),

    /// The key file has more lines than a stored line number can address.
    #[error("key file has more than {max} lines", max = u32::MAX)]
    LineLimit,

    /// An environment variable held a value that could not be used.
    #[error("invalid value {value:?} for {name}")]
    Config {
        /// Variable name
        name: &'static str,
        /// Value as found in the environment
        value: String,
    },
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;
