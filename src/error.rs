use core::fmt;

/// Errors returned by [`SeededPrng`](crate::SeededPrng).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Output was requested before the generator was ever seeded.
    UninitializedState,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UninitializedState => write!(f, "generator read before it was seeded"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
