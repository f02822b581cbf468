//! Sentinel-based index trait for zero-cost optional indices.
//!
//! Links store a reserved sentinel (e.g. `u32::MAX`) instead of
//! `Option<Idx>`, which keeps a [`Link`](crate::Link) at two plain integers.
//! The sentinel stands for the list's anchor: a link pointing at `NONE`
//! points past the head or the tail.

/// A copyable index type with a sentinel "none" value.
///
/// # Example
///
/// ```
/// use strand_list::Index;
///
/// let idx: u32 = 5;
/// let none: u32 = u32::NONE;
///
/// assert!(idx.is_some());
/// assert!(none.is_none());
/// ```
pub trait Index: Copy + Eq + core::fmt::Debug {
    /// Sentinel value representing "no index", i.e. the anchor.
    const NONE: Self;

    /// Returns `true` if this is the sentinel value.
    #[inline]
    fn is_none(self) -> bool {
        self == Self::NONE
    }

    /// Returns `true` if this is not the sentinel value.
    #[inline]
    fn is_some(self) -> bool {
        !self.is_none()
    }

    /// Converts the sentinel to `None` and anything else to `Some`.
    #[inline]
    fn into_option(self) -> Option<Self> {
        if self.is_none() { None } else { Some(self) }
    }

    /// Converts `None` to the sentinel.
    #[inline]
    fn from_option(opt: Option<Self>) -> Self {
        opt.unwrap_or(Self::NONE)
    }

    /// Returns the index as a `usize` for slot addressing.
    fn as_usize(self) -> usize;

    /// Creates an index from a slot position.
    fn from_usize(val: usize) -> Self;
}

macro_rules! impl_index_for_unsigned {
    ($($ty:ty),*) => {
        $(
            impl Index for $ty {
                const NONE: Self = <$ty>::MAX;

                #[inline]
                fn as_usize(self) -> usize {
                    self as usize
                }

                #[inline]
                fn from_usize(val: usize) -> Self {
                    val as Self
                }
            }
        )*
    };
}

impl_index_for_unsigned!(u8, u16, u32, u64, usize);
