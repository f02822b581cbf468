//! Construction parameters for [`RingBuffer`](crate::RingBuffer).

use strand_core::{AllocPolicy, Error, Result};

/// Shape and allocation policy of a ring buffer.
///
/// ```
/// use strand_core::AllocPolicy;
/// use strand_ring::RingConfig;
///
/// let config = RingConfig::new(64, 1024).alloc_policy(AllocPolicy::FailFast);
/// assert_eq!(config.capacity(), 1023);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RingConfig {
    /// Size in bytes of every entry.
    pub entry_size: usize,
    /// Number of slots, one of which is always kept free.
    pub slot_count: usize,
    /// Policy for allocating owned backing storage.
    #[cfg_attr(feature = "serde", serde(default))]
    pub alloc_policy: AllocPolicy,
}

impl RingConfig {
    /// Creates a config with the default [`AllocPolicy::Block`].
    pub const fn new(entry_size: usize, slot_count: usize) -> Self {
        Self {
            entry_size,
            slot_count,
            alloc_policy: AllocPolicy::Block,
        }
    }

    /// Sets the allocation policy.
    #[must_use]
    pub const fn alloc_policy(mut self, policy: AllocPolicy) -> Self {
        self.alloc_policy = policy;
        self
    }

    /// Number of entries the buffer can hold at once.
    pub const fn capacity(&self) -> usize {
        self.slot_count.saturating_sub(1)
    }

    /// Bytes of backing storage this shape needs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the shape is invalid or its byte
    /// size overflows `usize`.
    pub fn storage_len(&self) -> Result<usize> {
        self.validate()?;
        self.entry_size
            .checked_mul(self.slot_count)
            .ok_or(Error::InvalidArgument("ring storage size overflows usize"))
    }

    /// Checks the shape without allocating.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `entry_size` is zero or
    /// `slot_count` is below two.
    pub fn validate(&self) -> Result<()> {
        if self.entry_size == 0 {
            return Err(Error::InvalidArgument("entry size must be non-zero"));
        }
        if self.slot_count <= 1 {
            return Err(Error::InvalidArgument("slot count must be at least 2"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_blocking_alloc() {
        assert_eq!(RingConfig::new(8, 4).alloc_policy, AllocPolicy::Block);
    }

    #[test]
    fn rejects_degenerate_shapes() {
        assert!(matches!(
            RingConfig::new(0, 4).validate(),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            RingConfig::new(8, 1).validate(),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            RingConfig::new(8, 0).validate(),
            Err(Error::InvalidArgument(_))
        ));
        assert!(RingConfig::new(1, 2).validate().is_ok());
    }

    #[test]
    fn storage_len_overflow() {
        assert!(matches!(
            RingConfig::new(usize::MAX, 2).storage_len(),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(RingConfig::new(16, 8).storage_len(), Ok(128));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializes_with_default_policy() {
        let config: RingConfig =
            serde_json::from_str(r#"{ "entry_size": 32, "slot_count": 16 }"#).unwrap();
        assert_eq!(config, RingConfig::new(32, 16));

        let config: RingConfig = serde_json::from_str(
            r#"{ "entry_size": 32, "slot_count": 16, "alloc_policy": "fail_fast" }"#,
        )
        .unwrap();
        assert_eq!(config.alloc_policy, AllocPolicy::FailFast);
    }
}
