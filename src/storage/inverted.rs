use std::mem::{ManuallyDrop, MaybeUninit};

use union_core::union::{Probe, Walk};
use union_core::wrapper::Tag;
use union_core::NPOS;

use super::{CloneSlot, Storage};

/// A union of `Tagged` slots, overlaid with a bare tag.
///
/// Every slot starts with its own index, so the live index is always the first
/// `W` of the storage. Without a live slot only `dummy` is written, holding
/// `W::NPOS`. Alternatives with trailing padding share it with nothing, but the
/// tag no longer needs its own field next to the union.
#[repr(C)]
pub union InvertedStorage<U: Probe<W>, W: Tag = u8> {
    dummy: W,
    value: ManuallyDrop<MaybeUninit<U>>,
}

impl<U: Probe<W>, W: Tag> InvertedStorage<U, W> {
    const FITS: () = assert!(
        U::LEN <= W::CAPACITY,
        "too many alternatives for the tag type"
    );

    #[inline]
    fn tag(&self) -> W {
        // Either `dummy` or the tag of the live slot, which share their bytes.
        unsafe { self.dummy }
    }

    /// Finds the live slot by probing the union level by level.
    ///
    /// Always agrees with [`Storage::index`], which reads the shared tag directly.
    pub fn probe_index(&self) -> usize {
        if self.tag() == W::NPOS {
            return NPOS;
        }

        unsafe { U::probe(self.union_ptr()) }.unwrap_or(NPOS)
    }
}

unsafe impl<U: Probe<W>, W: Tag> Storage for InvertedStorage<U, W> {
    type Union = U;

    #[inline]
    fn valueless() -> Self {
        let () = Self::FITS;

        InvertedStorage { dummy: W::NPOS }
    }

    #[inline]
    fn index(&self) -> usize {
        let index = self.tag().to_index();
        if index < U::LEN {
            index
        } else {
            NPOS
        }
    }

    #[inline]
    fn union_ptr(&self) -> *const U {
        (self as *const Self).cast()
    }

    #[inline]
    fn union_mut_ptr(&mut self) -> *mut U {
        (self as *mut Self).cast()
    }

    #[inline]
    unsafe fn commit(&mut self, index: usize) {
        // The slot wrote its own tag.
        debug_assert_eq!(self.index(), index);
        debug_assert_eq!(self.probe_index(), index);
    }

    #[inline]
    fn mark_valueless(&mut self) {
        self.dummy = W::NPOS;
    }
}

impl<U: Probe<W>, W: Tag> Drop for InvertedStorage<U, W> {
    #[inline]
    fn drop(&mut self) {
        self.reset()
    }
}

impl<U, W> Clone for InvertedStorage<U, W>
where
    U: Probe<W> + Walk<CloneSlot<U>>,
    W: Tag,
{
    fn clone(&self) -> Self {
        let mut out = Self::valueless();
        out.clone_from(self);
        out
    }

    fn clone_from(&mut self, source: &Self) {
        self.reset();

        let index = source.index();
        if index != NPOS {
            // The cloned slot carries the tag along.
            let value = unsafe { U::walk(source.union_ptr() as *mut U, index, CloneSlot::new()) };
            self.value = ManuallyDrop::new(value);
        }
    }
}
