//! Slots: the wrappers every alternative is stored in.
//!
//! A [`Bare`] slot is the alternative itself. A [`Tagged`] slot prefixes the
//! alternative with its own index, so a union made of nothing but tagged slots
//! always starts with the index of whichever slot is live.

use std::fmt;
use std::marker::PhantomData;
use std::ptr;

use crate::index::Selector;
use crate::NPOS;

/// An unsigned integer used to store an alternative index.
///
/// The maximum value of the integer is reserved as the valueless sentinel.
pub trait Tag: Copy + Eq + fmt::Debug + 'static {
    /// The valueless sentinel.
    const NPOS: Self;

    /// The number of indices this tag can represent.
    const CAPACITY: usize;

    /// Converts an index to a tag. Indices that don't fit map to [`Tag::NPOS`].
    fn from_index(index: usize) -> Self;

    /// Converts a tag back to an index. [`Tag::NPOS`] maps to [`NPOS`].
    fn to_index(self) -> usize;
}

macro_rules! impl_tag {
    ($($t:ty),*) => ($(
        impl Tag for $t {
            const NPOS: Self = <$t>::MAX;
            const CAPACITY: usize = <$t>::MAX as usize;

            #[inline]
            fn from_index(index: usize) -> Self {
                if index < Self::CAPACITY {
                    index as $t
                } else {
                    Self::NPOS
                }
            }

            #[inline]
            fn to_index(self) -> usize {
                if self == Self::NPOS {
                    NPOS
                } else {
                    self as usize
                }
            }
        }
    )*)
}

impl_tag!(u8, u16, u32);

/// A wrapper that stores exactly one alternative.
///
/// # Safety
/// `value_ptr` must project onto the wrapped value without reading through `this`,
/// so it can be used on memory that is not initialized yet.
pub unsafe trait Slot: Sized {
    /// The wrapped alternative.
    type Value;

    fn new(value: Self::Value) -> Self;

    fn into_value(self) -> Self::Value;

    /// Returns a pointer to the wrapped value.
    ///
    /// # Safety
    /// `this` must point into an allocation that is large enough for `Self`.
    unsafe fn value_ptr(this: *mut Self) -> *mut Self::Value;

    #[inline]
    fn value(&self) -> &Self::Value {
        unsafe { &*Self::value_ptr(self as *const Self as *mut Self) }
    }

    #[inline]
    fn value_mut(&mut self) -> &mut Self::Value {
        unsafe { &mut *Self::value_ptr(self) }
    }
}

/// A slot without any bookkeeping.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bare<T>(pub T);

unsafe impl <T> Slot for Bare<T> {
    type Value = T;

    #[inline]
    fn new(value: T) -> Self {
        Bare(value)
    }

    #[inline]
    fn into_value(self) -> T {
        self.0
    }

    #[inline]
    unsafe fn value_ptr(this: *mut Self) -> *mut T {
        ptr::addr_of_mut!((*this).0)
    }
}

/// A slot that stores the index `I` of its alternative in front of the value.
///
/// Every `Tagged` slot has its tag at offset zero, and a union of tagged slots
/// (all with the same `W`) shares that first field.
#[repr(C)]
pub struct Tagged<I, T, W = u8> {
    tag: W,
    value: T,
    index: PhantomData<I>,
}

impl <I: Selector, T, W: Tag> Tagged<I, T, W> {
    const FITS: () = assert!(
        I::VALUE < W::CAPACITY,
        "the alternative index does not fit in the tag type"
    );

    /// The index stored in this slot.
    #[inline]
    pub fn tag(&self) -> usize {
        self.tag.to_index()
    }
}

unsafe impl <I: Selector, T, W: Tag> Slot for Tagged<I, T, W> {
    type Value = T;

    #[inline]
    fn new(value: T) -> Self {
        let () = Self::FITS;

        Tagged {
            tag: W::from_index(I::VALUE),
            value,
            index: PhantomData,
        }
    }

    #[inline]
    fn into_value(self) -> T {
        self.value
    }

    #[inline]
    unsafe fn value_ptr(this: *mut Self) -> *mut T {
        ptr::addr_of_mut!((*this).value)
    }
}

impl <I, T: Clone, W: Copy> Clone for Tagged<I, T, W> {
    #[inline]
    fn clone(&self) -> Self {
        Tagged {
            tag: self.tag,
            value: self.value.clone(),
            index: PhantomData,
        }
    }
}

impl <I, T: fmt::Debug, W: fmt::Debug> fmt::Debug for Tagged<I, T, W> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Tagged")
            .field("tag", &self.tag)
            .field("value", &self.value)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{I0, I3};
    use std::mem;

    #[test]
    fn test_tag_roundtrip_sentinel() {
        assert_eq!(u8::from_index(3).to_index(), 3);
        assert_eq!(u8::from_index(255), u8::NPOS);
        assert_eq!(u8::NPOS.to_index(), NPOS);
        assert_eq!(u16::from_index(300).to_index(), 300);
        assert_eq!(u8::from_index(NPOS), u8::NPOS);
    }

    #[test]
    fn test_tagged_layout() {
        let slot = Tagged::<I3, u32, u8>::new(7);

        assert_eq!(slot.tag(), 3);
        assert_eq!(*slot.value(), 7);
        assert_eq!(unsafe { *(&slot as *const _ as *const u8) }, 3);
        assert_eq!(mem::size_of::<Tagged<I0, [u8; 7], u8>>(), 8);
    }

    #[test]
    fn test_bare() {
        let mut slot = Bare::new(String::from("abc"));
        slot.value_mut().push('d');

        assert_eq!(slot.into_value(), "abcd");
        assert_eq!(mem::size_of::<Bare<u64>>(), 8);
    }
}
