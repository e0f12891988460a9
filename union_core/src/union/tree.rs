//! The balanced tree generator.
//!
//! Slots are paired left to right into [`Node`]s; an odd slot at the end is
//! carried to the next round unpaired. The rounds repeat until a single root is
//! left, so a list of `N` slots is at most `ceil(log2(N))` nodes deep.

use std::mem::ManuallyDrop;

use super::{Accept, Dispatch, End, Find, Get, Left, Pair, Probe, RawUnion, Right, SlotFn, Walk};
use crate::index::{Add, False, Lt, Sub, True};
use crate::list::{Descriptor, TypeList};
use crate::wrapper::{Slot, Tag};

/// A tree node: a union of the two halves `A` and `B`.
///
/// The indices of `A` come first, those of `B` follow.
#[repr(C)]
pub union Node<A, B> {
    left: ManuallyDrop<A>,
    right: ManuallyDrop<B>,
}

#[inline]
fn left<A, B>(this: *mut Node<A, B>) -> *mut A {
    this.cast()
}

#[inline]
fn right<A, B>(this: *mut Node<A, B>) -> *mut B {
    this.cast()
}

/// Pairs adjacent elements of a list into nodes.
pub trait Pairs {
    type Output;
}

impl Pairs for () {
    type Output = ();
}

impl <A> Pairs for (A, ()) {
    type Output = (A, ());
}

impl <A, B, T: Pairs> Pairs for (A, (B, T)) {
    type Output = (Node<A, B>, T::Output);
}

/// A slot list that can be turned into a tree.
pub trait TreeList: TypeList {
    type Tree: RawUnion;
}

impl TreeList for () {
    type Tree = End;
}

impl <A: RawUnion> TreeList for (A, ()) {
    type Tree = A;
}

impl <A, B, T> TreeList for (A, (B, T))
where
    T: TypeList + Pairs,
    (Node<A, B>, T::Output): TreeList,
{
    type Tree = <(Node<A, B>, T::Output) as TreeList>::Tree;
}

unsafe impl <A, B> RawUnion for Node<A, B>
where
    A: RawUnion,
    B: RawUnion,
    A::Len: Add<B::Len>,
{
    type Len = <A::Len as Add<B::Len>>::Output;

    const TRIVIAL: bool = A::TRIVIAL && B::TRIVIAL;

    const DEPTH: usize = 1 + if A::DEPTH > B::DEPTH { A::DEPTH } else { B::DEPTH };

    #[inline]
    unsafe fn drop_slot(this: *mut Self, index: usize) {
        if index < A::LEN {
            A::drop_slot(left(this), index)
        } else {
            B::drop_slot(right(this), index - A::LEN)
        }
    }

    fn describe(out: &mut Vec<Descriptor>) {
        A::describe(out);
        B::describe(out);
    }
}

/// Picks the half of a node that holds index `I`; `Side` is `I < A::LEN`.
///
/// # Safety
/// See [`Get`].
pub unsafe trait Branch<I, Side>: RawUnion {
    type Slot: Slot;

    /// # Safety
    /// See [`Get::slot`].
    unsafe fn slot(this: *mut Self) -> *mut Self::Slot;
}

unsafe impl <A, B, I> Branch<I, True> for Node<A, B>
where
    Self: RawUnion,
    A: Get<I>,
{
    type Slot = A::Slot;

    #[inline]
    unsafe fn slot(this: *mut Self) -> *mut A::Slot {
        A::slot(left(this))
    }
}

unsafe impl <A, B, I> Branch<I, False> for Node<A, B>
where
    Self: RawUnion,
    A: RawUnion,
    I: Sub<A::Len>,
    B: Get<<I as Sub<A::Len>>::Output>,
{
    type Slot = <B as Get<<I as Sub<A::Len>>::Output>>::Slot;

    #[inline]
    unsafe fn slot(this: *mut Self) -> *mut Self::Slot {
        <B as Get<<I as Sub<A::Len>>::Output>>::slot(right(this))
    }
}

unsafe impl <A, B, I> Get<I> for Node<A, B>
where
    Self: RawUnion + Branch<I, <I as Lt<A::Len>>::Output>,
    A: RawUnion,
    I: Lt<A::Len>,
{
    type Slot = <Self as Branch<I, <I as Lt<A::Len>>::Output>>::Slot;

    #[inline]
    unsafe fn slot(this: *mut Self) -> *mut Self::Slot {
        <Self as Branch<I, <I as Lt<A::Len>>::Output>>::slot(this)
    }
}

unsafe impl <V, A, B, P> Find<V, Left<P>> for Node<A, B>
where
    Self: RawUnion,
    A: Find<V, P>,
{
    const INDEX: usize = A::INDEX;

    type Slot = A::Slot;

    #[inline]
    unsafe fn slot(this: *mut Self) -> *mut A::Slot {
        A::slot(left(this))
    }
}

unsafe impl <V, A, B, P> Find<V, Right<P>> for Node<A, B>
where
    Self: RawUnion,
    A: RawUnion,
    B: Find<V, P>,
{
    const INDEX: usize = A::LEN + B::INDEX;

    type Slot = B::Slot;

    #[inline]
    unsafe fn slot(this: *mut Self) -> *mut B::Slot {
        B::slot(right(this))
    }
}

unsafe impl <X, A, B, P> Accept<X, Left<P>> for Node<A, B>
where
    Self: RawUnion,
    A: Accept<X, P>,
{
    const INDEX: usize = A::INDEX;

    type Slot = A::Slot;

    #[inline]
    fn accept(value: X) -> A::Slot {
        A::accept(value)
    }

    #[inline]
    unsafe fn slot(this: *mut Self) -> *mut A::Slot {
        A::slot(left(this))
    }
}

unsafe impl <X, A, B, P> Accept<X, Right<P>> for Node<A, B>
where
    Self: RawUnion,
    A: RawUnion,
    B: Accept<X, P>,
{
    const INDEX: usize = A::LEN + B::INDEX;

    type Slot = B::Slot;

    #[inline]
    fn accept(value: X) -> B::Slot {
        B::accept(value)
    }

    #[inline]
    unsafe fn slot(this: *mut Self) -> *mut B::Slot {
        B::slot(right(this))
    }
}

unsafe impl <F, A, B> Walk<F> for Node<A, B>
where
    F: SlotFn,
    Self: RawUnion,
    A: Walk<F>,
    B: Walk<F>,
{
    #[inline]
    unsafe fn walk(this: *mut Self, index: usize, f: F) -> F::Output {
        if index < A::LEN {
            A::walk(left(this), index, f)
        } else {
            B::walk(right(this), index - A::LEN, f)
        }
    }
}

unsafe impl <F, A, B> Dispatch<F> for Node<A, B>
where
    F: SlotFn,
    Self: RawUnion,
    A: Dispatch<F>,
    B: Dispatch<F>,
{
    type Table = Pair<A::Table, B::Table>;

    const TABLE: Self::Table = Pair(A::TABLE, B::TABLE);

    #[inline]
    unsafe fn fold(this: *mut Self, base: usize, index: usize, f: F) -> Result<F::Output, F> {
        match A::fold(left(this), base, index, f) {
            Ok(output) => Ok(output),
            Err(f) => B::fold(right(this), base + A::LEN, index, f),
        }
    }
}

unsafe impl <W, A, B> Probe<W> for Node<A, B>
where
    W: Tag,
    Self: RawUnion,
    A: Probe<W>,
    B: Probe<W>,
{
    const FIRST: usize = A::FIRST;

    #[inline]
    unsafe fn peek(this: *const Self) -> W {
        A::peek(left(this as *mut Self))
    }

    #[inline]
    unsafe fn probe(this: *const Self) -> Option<usize> {
        let this = this as *mut Self;
        if Self::peek(this).to_index() < B::FIRST {
            A::probe(left(this))
        } else {
            B::probe(right(this))
        }
    }
}
