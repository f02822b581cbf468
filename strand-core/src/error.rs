//! Error taxonomy shared by every strand container.

use thiserror::Error;

/// Result alias used throughout the strand crates.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors reported by strand operations.
///
/// The set is closed: callers are expected to branch on the
/// variant (or on [`Error::code`]) rather than inspect messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// A size, capacity or buffer precondition was violated.
    ///
    /// The payload names the violated precondition.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// A non-blocking operation found the container full (push) or empty
    /// (pop). Retry later.
    #[error("operation would block")]
    WouldBlock,

    /// A fail-fast allocation could not be satisfied.
    #[error("out of memory: failed to allocate {bytes} bytes")]
    OutOfMemory {
        /// Size of the allocation that failed.
        bytes: usize,
    },
}

impl Error {
    /// Returns the errno-style code for this error (`EINVAL`, `EAGAIN`,
    /// `ENOMEM` on Linux).
    #[inline]
    pub const fn code(&self) -> i32 {
        match self {
            Self::InvalidArgument(_) => 22,
            Self::WouldBlock => 11,
            Self::OutOfMemory { .. } => 12,
        }
    }

    /// Returns `true` for [`Error::WouldBlock`].
    #[inline]
    pub const fn is_would_block(&self) -> bool {
        matches!(self, Self::WouldBlock)
    }
}
