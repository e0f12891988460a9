//! The error returned by checked accesses.

use thiserror::Error;

use union_core::NPOS;

/// A checked access did not find the alternative it asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum BadAccess {
    /// The variant, or one of the visited variants, holds no alternative.
    #[error("bad variant access: the variant is valueless")]
    Valueless,

    /// A different alternative is active.
    #[error("bad variant access: alternative {requested} was requested, but alternative {active} is active")]
    WrongAlternative { requested: usize, active: usize },

    /// A runtime index does not name an alternative.
    #[error("bad variant access: index {index} is out of range for {size} alternatives")]
    OutOfRange { index: usize, size: usize },
}

impl BadAccess {
    /// Returns `true` if the access failed because nothing was active.
    #[inline]
    pub fn is_valueless(&self) -> bool {
        matches!(self, BadAccess::Valueless)
    }

    /// Checks that `requested` is the `active` index.
    #[inline]
    pub(crate) fn check(active: usize, requested: usize) -> Result<(), Self> {
        if active == requested {
            return Ok(());
        }

        let error = if active == NPOS {
            BadAccess::Valueless
        } else {
            BadAccess::WrongAlternative { requested, active }
        };

        Err(error.traced())
    }

    #[cold]
    pub(crate) fn traced(self) -> Self {
        tracing::trace!(error = %self, "rejected variant access");
        self
    }
}
