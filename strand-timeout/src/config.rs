//! Construction parameters for [`TimeoutList`](crate::TimeoutList).

use std::time::Duration;

use strand_core::{AllocPolicy, Error, Result};

/// Horizon, entry shape and allocation policy of a timeout list.
///
/// ```
/// use std::time::Duration;
/// use strand_timeout::TimeoutConfig;
///
/// let config = TimeoutConfig::new(250, 16);
/// assert_eq!(config.horizon(), Duration::from_millis(250));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeoutConfig {
    /// Maximum age in milliseconds an entry may reach and still be returned.
    pub horizon_ms: u64,
    /// Size in bytes of every entry.
    pub entry_size: usize,
    /// Policy for allocating entry copies.
    #[cfg_attr(feature = "serde", serde(default))]
    pub alloc_policy: AllocPolicy,
}

impl TimeoutConfig {
    /// Creates a config with the default [`AllocPolicy::Block`].
    pub const fn new(horizon_ms: u64, entry_size: usize) -> Self {
        Self {
            horizon_ms,
            entry_size,
            alloc_policy: AllocPolicy::Block,
        }
    }

    /// Sets the allocation policy.
    #[must_use]
    pub const fn alloc_policy(mut self, policy: AllocPolicy) -> Self {
        self.alloc_policy = policy;
        self
    }

    /// The horizon as a [`Duration`].
    pub const fn horizon(&self) -> Duration {
        Duration::from_millis(self.horizon_ms)
    }

    /// Checks the config without allocating.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `entry_size` is zero or exceeds
    /// `isize::MAX`.
    pub fn validate(&self) -> Result<()> {
        if self.entry_size == 0 {
            return Err(Error::InvalidArgument("entry size must be non-zero"));
        }
        if self.entry_size > isize::MAX as usize {
            return Err(Error::InvalidArgument("entry size exceeds isize::MAX"));
        }
        Ok(())
    }
}
