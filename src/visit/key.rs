use crate::error::BadAccess;

/// The active indices of `N` variants, combined into one number.
///
/// Operand `i` contributes `index_i * (size_0 * ... * size_{i-1})`, so every
/// combination maps to a distinct key below the product of all sizes, and each
/// sub-index can be recovered with a division and a remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DispatchKey<const N: usize> {
    index: usize,
    sizes: [usize; N],
}

impl<const N: usize> DispatchKey<N> {
    /// The number of distinct keys for operands of the given sizes.
    #[inline]
    pub fn states(sizes: [usize; N]) -> usize {
        sizes.iter().product()
    }

    /// Combines the active `indices` of operands with the given `sizes`.
    ///
    /// Fails with [`BadAccess::Valueless`] when an index is out of range for its
    /// operand, which is the case for every valueless operand.
    pub fn encode(indices: [usize; N], sizes: [usize; N]) -> Result<Self, BadAccess> {
        let mut index = 0;
        let mut stride = 1;

        for (&i, &size) in indices.iter().zip(sizes.iter()) {
            if i >= size {
                return Err(BadAccess::Valueless.traced());
            }
            index += i * stride;
            stride *= size;
        }

        Ok(DispatchKey { index, sizes })
    }

    /// Rebuilds a key from its combined value.
    pub fn decode(index: usize, sizes: [usize; N]) -> Option<Self> {
        if index < Self::states(sizes) {
            Some(DispatchKey { index, sizes })
        } else {
            None
        }
    }

    /// The combined value.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The active index of operand `operand`.
    pub fn subindex(&self, operand: usize) -> usize {
        let stride: usize = self.sizes[..operand].iter().product();
        (self.index / stride) % self.sizes[operand]
    }

    /// The active index of every operand.
    pub fn subindices(&self) -> [usize; N] {
        let mut out = [0; N];
        for (operand, slot) in out.iter_mut().enumerate() {
            *slot = self.subindex(operand);
        }
        out
    }
}
