//! Visitation.
//!
//! A visitor is a type with one [`Visit`] impl per alternative it accepts, all
//! sharing the [`Visitor::Output`] type. [`visit`] calls it with the active value
//! of one or more variants:
//!
//! ```
//! use unionvariant::{visit, List, Variant, Visit, Visitor};
//! use unionvariant::index::I1;
//!
//! struct Describe;
//!
//! impl Visitor for Describe {
//!     type Output = String;
//! }
//!
//! impl<'a> Visit<&'a u32> for Describe {
//!     fn visit(self, value: &'a u32) -> String {
//!         format!("number {}", value)
//!     }
//! }
//!
//! impl<'a> Visit<&'a String> for Describe {
//!     fn visit(self, value: &'a String) -> String {
//!         format!("text {:?}", value)
//!     }
//! }
//!
//! let v = Variant::<List![u32, String]>::with_index::<I1>("hi".to_string());
//! assert_eq!(visit(Describe, &v).unwrap(), "text \"hi\"");
//! ```
//!
//! A variant passed by reference is visited with `&T`, by mutable reference with
//! `&mut T` and by value with `T`. Several variants are passed as a tuple, and
//! the visitor receives a tuple of their values.
//!
//! The strategy is picked once per call from the number of combined states
//! ([`Visitable::STATES`]), and then used for every operand in turn: each operand
//! is dispatched on its own index. The combined [`DispatchKey`] only validates
//! the indices, so a valueless operand is caught before the visitor runs.

use std::marker::PhantomData;
use std::mem::ManuallyDrop;
use std::ptr;

use union_core::union::{Dispatch, RawUnion, SlotCall, SlotFn};
use union_core::wrapper::Slot;

use crate::error::BadAccess;
use crate::storage::Storage;
use crate::variant::BasicVariant;

mod key;
mod strategy;

pub use self::key::DispatchKey;
pub use self::strategy::Strategy;

/// Something that can be called with the active value of a variant.
pub trait Visitor {
    /// The result of every visit.
    type Output;
}

/// The part of a visitor that handles a `T`.
pub trait Visit<T>: Visitor {
    fn visit(self, value: T) -> Self::Output;
}

/// Calls a visitor with `&T`.
pub struct ByRef<'a, F> {
    visitor: F,
    marker: PhantomData<&'a ()>,
}

/// Calls a visitor with `&mut T`.
pub struct ByMut<'a, F> {
    visitor: F,
    marker: PhantomData<&'a mut ()>,
}

/// Calls a visitor with `T`, moving it out of its slot.
pub struct ByValue<F> {
    visitor: F,
}

impl<'a, F: Visitor> SlotFn for ByRef<'a, F> {
    type Output = F::Output;
}

impl<'a, F, Sl> SlotCall<Sl> for ByRef<'a, F>
where
    Sl: Slot,
    Sl::Value: 'a,
    F: Visit<&'a Sl::Value>,
{
    #[inline]
    unsafe fn call(self, slot: *mut Sl) -> F::Output {
        self.visitor.visit(&*Sl::value_ptr(slot))
    }
}

impl<'a, F: Visitor> SlotFn for ByMut<'a, F> {
    type Output = F::Output;
}

impl<'a, F, Sl> SlotCall<Sl> for ByMut<'a, F>
where
    Sl: Slot,
    Sl::Value: 'a,
    F: Visit<&'a mut Sl::Value>,
{
    #[inline]
    unsafe fn call(self, slot: *mut Sl) -> F::Output {
        self.visitor.visit(&mut *Sl::value_ptr(slot))
    }
}

impl<F: Visitor> SlotFn for ByValue<F> {
    type Output = F::Output;
}

impl<F, Sl> SlotCall<Sl> for ByValue<F>
where
    Sl: Slot,
    F: Visit<Sl::Value>,
{
    #[inline]
    unsafe fn call(self, slot: *mut Sl) -> F::Output {
        self.visitor.visit(ptr::read(Sl::value_ptr(slot)))
    }
}

/// A visit operand: a variant by reference, by mutable reference or by value.
pub trait Operand {
    type Union: RawUnion;

    /// The number of alternatives.
    const SIZE: usize = <Self::Union as RawUnion>::LEN;

    /// The active index, or `NPOS`.
    fn active(&self) -> usize;
}

/// An operand that can hand its active value to `F`.
///
/// # Safety
/// `reach` must call `visitor` exactly once, with the value of the slot at `index`.
pub unsafe trait Reach<F: Visitor>: Operand + Sized {
    /// # Safety
    /// `index` must be the active index of the operand.
    unsafe fn reach(self, strategy: Strategy, index: usize, visitor: F) -> F::Output;
}

impl<'a, S: Storage> Operand for &'a BasicVariant<S> {
    type Union = S::Union;

    #[inline]
    fn active(&self) -> usize {
        self.index()
    }
}

unsafe impl<'a, S, F> Reach<F> for &'a BasicVariant<S>
where
    S: Storage,
    S::Union: Dispatch<ByRef<'a, F>>,
    F: Visitor,
{
    #[inline]
    unsafe fn reach(self, strategy: Strategy, index: usize, visitor: F) -> F::Output {
        let adapter = ByRef {
            visitor,
            marker: PhantomData,
        };
        // Read-only: `ByRef` never writes through the pointer.
        strategy::dispatch(strategy, self.storage().union_ptr() as *mut S::Union, index, adapter)
    }
}

impl<'a, S: Storage> Operand for &'a mut BasicVariant<S> {
    type Union = S::Union;

    #[inline]
    fn active(&self) -> usize {
        self.index()
    }
}

unsafe impl<'a, S, F> Reach<F> for &'a mut BasicVariant<S>
where
    S: Storage,
    S::Union: Dispatch<ByMut<'a, F>>,
    F: Visitor,
{
    #[inline]
    unsafe fn reach(self, strategy: Strategy, index: usize, visitor: F) -> F::Output {
        let adapter = ByMut {
            visitor,
            marker: PhantomData,
        };
        strategy::dispatch(strategy, self.storage_mut().union_mut_ptr(), index, adapter)
    }
}

impl<S: Storage> Operand for BasicVariant<S> {
    type Union = S::Union;

    #[inline]
    fn active(&self) -> usize {
        self.index()
    }
}

unsafe impl<S, F> Reach<F> for BasicVariant<S>
where
    S: Storage,
    S::Union: Dispatch<ByValue<F>>,
    F: Visitor,
{
    #[inline]
    unsafe fn reach(self, strategy: Strategy, index: usize, visitor: F) -> F::Output {
        // The value moves into the visitor; what is left of the storage is never dropped.
        let mut this = ManuallyDrop::new(self);
        let adapter = ByValue { visitor };
        strategy::dispatch(strategy, this.storage_mut().union_mut_ptr(), index, adapter)
    }
}

/// Everything [`visit`] accepts: a single operand, or a tuple of up to three.
pub trait Visitable<F: Visitor>: Sized {
    /// The number of combinations of active alternatives.
    const STATES: usize;

    /// Visits the active values with `strategy`.
    fn apply(self, strategy: Strategy, visitor: F) -> Result<F::Output, BadAccess>;
}

macro_rules! visitable_operand {
    ($(impl<$($lt:lifetime),*> for $ty:ty;)*) => {$(
        impl<$($lt,)* S, F> Visitable<F> for $ty
        where
            S: Storage,
            F: Visitor,
            $ty: Reach<F>,
        {
            const STATES: usize = <S::Union as RawUnion>::LEN;

            #[inline]
            fn apply(self, strategy: Strategy, visitor: F) -> Result<F::Output, BadAccess> {
                let key = DispatchKey::encode([self.active()], [Self::STATES])?;
                Ok(unsafe { self.reach(strategy, key.index(), visitor) })
            }
        }
    )*};
}

visitable_operand! {
    impl<'a> for &'a BasicVariant<S>;
    impl<'a> for &'a mut BasicVariant<S>;
    impl<> for BasicVariant<S>;
}

impl<F: Visit<()>> Visitable<F> for () {
    const STATES: usize = 1;

    #[inline]
    fn apply(self, _: Strategy, visitor: F) -> Result<F::Output, BadAccess> {
        Ok(visitor.visit(()))
    }
}

/// Visits the first operand of a pair, then the second.
pub struct Then<F, B> {
    visitor: F,
    rest: B,
    index: usize,
    strategy: Strategy,
}

/// The first value of a pair, waiting for the second.
pub struct Bind<F, X> {
    visitor: F,
    first: X,
}

impl<F: Visitor, B> Visitor for Then<F, B> {
    type Output = F::Output;
}

impl<F, B, X> Visit<X> for Then<F, B>
where
    F: Visitor,
    B: Reach<Bind<F, X>>,
{
    #[inline]
    fn visit(self, first: X) -> F::Output {
        let bind = Bind {
            visitor: self.visitor,
            first,
        };
        // `index` and `strategy` were checked when the pair was keyed.
        unsafe { self.rest.reach(self.strategy, self.index, bind) }
    }
}

impl<F: Visitor, X> Visitor for Bind<F, X> {
    type Output = F::Output;
}

impl<F, X, Y> Visit<Y> for Bind<F, X>
where
    F: Visit<(X, Y)>,
{
    #[inline]
    fn visit(self, second: Y) -> F::Output {
        self.visitor.visit((self.first, second))
    }
}

impl<F, A, B> Visitable<F> for (A, B)
where
    F: Visitor,
    A: Reach<Then<F, B>>,
    B: Operand,
{
    const STATES: usize = A::SIZE * B::SIZE;

    fn apply(self, strategy: Strategy, visitor: F) -> Result<F::Output, BadAccess> {
        let (a, b) = self;
        let key = DispatchKey::encode([a.active(), b.active()], [A::SIZE, B::SIZE])?;
        let [first, second] = key.subindices();

        let then = Then {
            visitor,
            rest: b,
            index: second,
            strategy,
        };
        Ok(unsafe { a.reach(strategy, first, then) })
    }
}

/// Visits the first operand of a triple, then the other two.
pub struct Then3<F, B, C> {
    visitor: F,
    rest: (B, C),
    indices: [usize; 2],
    strategy: Strategy,
}

/// The first value of a triple, waiting for the third operand after the second.
pub struct Then3b<F, X, C> {
    visitor: F,
    first: X,
    rest: C,
    index: usize,
    strategy: Strategy,
}

/// The first two values of a triple, waiting for the third.
pub struct Bind3<F, X, Y> {
    visitor: F,
    first: X,
    second: Y,
}

impl<F: Visitor, B, C> Visitor for Then3<F, B, C> {
    type Output = F::Output;
}

impl<F, B, C, X> Visit<X> for Then3<F, B, C>
where
    F: Visitor,
    B: Reach<Then3b<F, X, C>>,
{
    #[inline]
    fn visit(self, first: X) -> F::Output {
        let (b, c) = self.rest;
        let then = Then3b {
            visitor: self.visitor,
            first,
            rest: c,
            index: self.indices[1],
            strategy: self.strategy,
        };
        unsafe { b.reach(self.strategy, self.indices[0], then) }
    }
}

impl<F: Visitor, X, C> Visitor for Then3b<F, X, C> {
    type Output = F::Output;
}

impl<F, X, C, Y> Visit<Y> for Then3b<F, X, C>
where
    F: Visitor,
    C: Reach<Bind3<F, X, Y>>,
{
    #[inline]
    fn visit(self, second: Y) -> F::Output {
        let bind = Bind3 {
            visitor: self.visitor,
            first: self.first,
            second,
        };
        unsafe { self.rest.reach(self.strategy, self.index, bind) }
    }
}

impl<F: Visitor, X, Y> Visitor for Bind3<F, X, Y> {
    type Output = F::Output;
}

impl<F, X, Y, Z> Visit<Z> for Bind3<F, X, Y>
where
    F: Visit<(X, Y, Z)>,
{
    #[inline]
    fn visit(self, third: Z) -> F::Output {
        self.visitor.visit((self.first, self.second, third))
    }
}

impl<F, A, B, C> Visitable<F> for (A, B, C)
where
    F: Visitor,
    A: Reach<Then3<F, B, C>>,
    B: Operand,
    C: Operand,
{
    const STATES: usize = A::SIZE * B::SIZE * C::SIZE;

    fn apply(self, strategy: Strategy, visitor: F) -> Result<F::Output, BadAccess> {
        let (a, b, c) = self;
        let key = DispatchKey::encode(
            [a.active(), b.active(), c.active()],
            [A::SIZE, B::SIZE, C::SIZE],
        )?;
        let [first, second, third] = key.subindices();

        let then = Then3 {
            visitor,
            rest: (b, c),
            indices: [second, third],
            strategy,
        };
        Ok(unsafe { a.reach(strategy, first, then) })
    }
}

/// Calls `visitor` with the active values of `variants`.
///
/// `variants` is a variant (by reference, mutable reference or value) or a tuple
/// of up to three of them. Fails with [`BadAccess::Valueless`], without calling
/// the visitor, if any of them is valueless.
#[inline]
pub fn visit<F, V>(visitor: F, variants: V) -> Result<F::Output, BadAccess>
where
    F: Visitor,
    V: Visitable<F>,
{
    visit_with(Strategy::for_states(V::STATES), visitor, variants)
}

/// [`visit`] with an explicit dispatch strategy.
#[inline]
pub fn visit_with<F, V>(strategy: Strategy, visitor: F, variants: V) -> Result<F::Output, BadAccess>
where
    F: Visitor,
    V: Visitable<F>,
{
    variants.apply(strategy, visitor)
}
