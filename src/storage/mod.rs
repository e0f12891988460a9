//! Storage layouts.
//!
//! A storage owns one generated union and knows which of its slots is live.
//! [`NormalStorage`] keeps the index in a tag next to the union;
//! [`InvertedStorage`] reads it from the slots themselves.

use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::mem::MaybeUninit;
use std::fmt;

use union_core::union::{RawUnion, SlotCall, SlotFn};
use union_core::wrapper::Slot;
use union_core::NPOS;

mod inverted;
mod normal;

pub use self::inverted::InvertedStorage;
pub use self::normal::NormalStorage;

/// Owns a union with at most one live slot.
///
/// # Safety
/// `index` must report the live slot, or [`NPOS`] when there is none, and the
/// union pointers must point to the union the index refers to.
pub unsafe trait Storage: Sized {
    type Union: RawUnion;

    /// A storage without a live slot.
    fn valueless() -> Self;

    /// The index of the live slot, or [`NPOS`].
    fn index(&self) -> usize;

    fn union_ptr(&self) -> *const Self::Union;

    fn union_mut_ptr(&mut self) -> *mut Self::Union;

    /// Declares the slot at `index` live.
    ///
    /// # Safety
    /// The storage must be valueless and the slot at `index` must have just been
    /// written through [`Storage::union_mut_ptr`].
    unsafe fn commit(&mut self, index: usize);

    /// Declares the storage valueless, without dropping anything.
    fn mark_valueless(&mut self);

    #[inline]
    fn is_valueless(&self) -> bool {
        self.index() == NPOS
    }

    /// Drops the live slot and leaves the storage valueless.
    ///
    /// The storage is marked valueless before the slot is dropped, so a panicking
    /// destructor leaves it valueless as well.
    fn reset(&mut self) {
        let index = self.index();
        if index == NPOS {
            return;
        }

        self.mark_valueless();
        if !<Self::Union as RawUnion>::TRIVIAL {
            unsafe { Self::Union::drop_slot(self.union_mut_ptr(), index) }
        }
    }
}

/// Clones a live slot into a fresh union.
pub struct CloneSlot<U>(PhantomData<fn() -> U>);

impl<U> CloneSlot<U> {
    #[inline]
    pub(crate) fn new() -> Self {
        CloneSlot(PhantomData)
    }
}

impl<U> SlotFn for CloneSlot<U> {
    type Output = MaybeUninit<U>;
}

impl<U, Sl: Slot + Clone> SlotCall<Sl> for CloneSlot<U> {
    #[inline]
    unsafe fn call(self, slot: *mut Sl) -> MaybeUninit<U> {
        let mut out = MaybeUninit::<U>::uninit();
        out.as_mut_ptr().cast::<Sl>().write((*slot).clone());
        out
    }
}

/// Writes a default value into a dead slot.
pub struct DefaultSlot;

impl SlotFn for DefaultSlot {
    type Output = ();
}

impl<Sl: Slot> SlotCall<Sl> for DefaultSlot
where
    Sl::Value: Default,
{
    #[inline]
    unsafe fn call(self, slot: *mut Sl) {
        slot.write(Sl::new(Default::default()))
    }
}

/// Compares a live slot with the slot at the same index of `rhs`.
pub struct EqSlot<U> {
    rhs: *const U,
}

impl<U> EqSlot<U> {
    #[inline]
    pub(crate) fn new(rhs: *const U) -> Self {
        EqSlot { rhs }
    }
}

impl<U> SlotFn for EqSlot<U> {
    type Output = bool;
}

impl<U, Sl: Slot> SlotCall<Sl> for EqSlot<U>
where
    Sl::Value: PartialEq,
{
    #[inline]
    unsafe fn call(self, slot: *mut Sl) -> bool {
        (*slot).value() == (*self.rhs.cast::<Sl>()).value()
    }
}

/// Requires total equality of every alternative; never called.
pub struct TotalEq;

impl SlotFn for TotalEq {
    type Output = ();
}

impl<Sl: Slot> SlotCall<Sl> for TotalEq
where
    Sl::Value: Eq,
{
    #[inline]
    unsafe fn call(self, _: *mut Sl) {}
}

/// Feeds a live slot's value to a hasher.
pub struct HashSlot<'a> {
    state: &'a mut dyn Hasher,
}

impl<'a> HashSlot<'a> {
    #[inline]
    pub(crate) fn new(state: &'a mut dyn Hasher) -> Self {
        HashSlot { state }
    }
}

impl<'a> SlotFn for HashSlot<'a> {
    type Output = ();
}

impl<'a, Sl: Slot> SlotCall<Sl> for HashSlot<'a>
where
    Sl::Value: Hash,
{
    #[inline]
    unsafe fn call(mut self, slot: *mut Sl) {
        (*slot).value().hash(&mut self.state)
    }
}

/// Formats a live slot's value as `Variant(index, value)`.
pub struct DebugSlot<'a, 'b> {
    f: &'a mut fmt::Formatter<'b>,
    index: usize,
}

impl<'a, 'b> DebugSlot<'a, 'b> {
    #[inline]
    pub(crate) fn new(f: &'a mut fmt::Formatter<'b>, index: usize) -> Self {
        DebugSlot { f, index }
    }
}

impl<'a, 'b> SlotFn for DebugSlot<'a, 'b> {
    type Output = fmt::Result;
}

impl<'a, 'b, Sl: Slot> SlotCall<Sl> for DebugSlot<'a, 'b>
where
    Sl::Value: fmt::Debug,
{
    unsafe fn call(self, slot: *mut Sl) -> fmt::Result {
        self.f
            .debug_tuple("Variant")
            .field(&self.index)
            .field((*slot).value())
            .finish()
    }
}
