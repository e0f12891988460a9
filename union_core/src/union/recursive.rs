//! The chain generator.

use std::convert::Infallible;
use std::mem::ManuallyDrop;

use super::{
    Accept, Dispatch, Find, Get, Here, Leaf, Nil, Pair, Probe, RawUnion, SlotFn, There, Walk,
};
use crate::index::{S, Z};
use crate::list::{Descriptor, TypeList};
use crate::wrapper::Tag;
use crate::NPOS;

/// One link of a chain: the slot `H`, or a union of the remaining slots `T`.
#[repr(C)]
pub union Chain<H, T> {
    head: ManuallyDrop<H>,
    tail: ManuallyDrop<T>,
}

/// The end of a chain. Holds nothing and can't be constructed.
pub struct End(Infallible);

#[inline]
fn head<H, T>(this: *mut Chain<H, T>) -> *mut H {
    this.cast()
}

#[inline]
fn tail<H, T>(this: *mut Chain<H, T>) -> *mut T {
    this.cast()
}

/// A slot list that can be turned into a chain.
pub trait ChainList: TypeList {
    type Chain: RawUnion;
}

impl ChainList for () {
    type Chain = End;
}

impl <H: Leaf, T: ChainList> ChainList for (H, T) {
    type Chain = Chain<H, T::Chain>;
}

unsafe impl RawUnion for End {
    type Len = Z;

    const TRIVIAL: bool = true;

    const DEPTH: usize = 0;

    unsafe fn drop_slot(_: *mut Self, index: usize) {
        unreachable!("no slot at index {}", index)
    }

    #[inline]
    fn describe(_: &mut Vec<Descriptor>) {}
}

unsafe impl <H: Leaf, T: RawUnion> RawUnion for Chain<H, T> {
    type Len = S<T::Len>;

    const TRIVIAL: bool = H::TRIVIAL && T::TRIVIAL;

    const DEPTH: usize = 1 + T::DEPTH;

    #[inline]
    unsafe fn drop_slot(this: *mut Self, index: usize) {
        if index == 0 {
            H::drop_slot(head(this), 0)
        } else {
            T::drop_slot(tail(this), index - 1)
        }
    }

    fn describe(out: &mut Vec<Descriptor>) {
        H::describe(out);
        T::describe(out);
    }
}

unsafe impl <H: Leaf, T: RawUnion> Get<Z> for Chain<H, T> {
    type Slot = H;

    #[inline]
    unsafe fn slot(this: *mut Self) -> *mut H {
        head(this)
    }
}

unsafe impl <H: Leaf, T: Get<N>, N> Get<S<N>> for Chain<H, T> {
    type Slot = T::Slot;

    #[inline]
    unsafe fn slot(this: *mut Self) -> *mut T::Slot {
        T::slot(tail(this))
    }
}

unsafe impl <V, H, T> Find<V, Here> for Chain<H, T>
where
    H: Leaf + Find<V, Here>,
    T: RawUnion,
{
    const INDEX: usize = 0;

    type Slot = H::Slot;

    #[inline]
    unsafe fn slot(this: *mut Self) -> *mut H::Slot {
        <H as Find<V, Here>>::slot(head(this))
    }
}

unsafe impl <V, H, T, P> Find<V, There<P>> for Chain<H, T>
where
    H: Leaf,
    T: Find<V, P>,
{
    const INDEX: usize = 1 + T::INDEX;

    type Slot = T::Slot;

    #[inline]
    unsafe fn slot(this: *mut Self) -> *mut T::Slot {
        T::slot(tail(this))
    }
}

unsafe impl <A, H, T, K> Accept<A, Here<K>> for Chain<H, T>
where
    H: Leaf + Accept<A, K>,
    T: RawUnion,
{
    const INDEX: usize = 0;

    type Slot = H::Slot;

    #[inline]
    fn accept(value: A) -> H::Slot {
        H::accept(value)
    }

    #[inline]
    unsafe fn slot(this: *mut Self) -> *mut H::Slot {
        <H as Accept<A, K>>::slot(head(this))
    }
}

unsafe impl <A, H, T, P> Accept<A, There<P>> for Chain<H, T>
where
    H: Leaf,
    T: Accept<A, P>,
{
    const INDEX: usize = 1 + T::INDEX;

    type Slot = T::Slot;

    #[inline]
    fn accept(value: A) -> T::Slot {
        T::accept(value)
    }

    #[inline]
    unsafe fn slot(this: *mut Self) -> *mut T::Slot {
        T::slot(tail(this))
    }
}

unsafe impl <F: SlotFn> Walk<F> for End {
    unsafe fn walk(_: *mut Self, index: usize, _: F) -> F::Output {
        unreachable!("no slot at index {}", index)
    }
}

unsafe impl <F, H, T> Walk<F> for Chain<H, T>
where
    F: SlotFn,
    H: Leaf + Walk<F>,
    T: Walk<F>,
{
    #[inline]
    unsafe fn walk(this: *mut Self, index: usize, f: F) -> F::Output {
        if index == 0 {
            H::walk(head(this), 0, f)
        } else {
            T::walk(tail(this), index - 1, f)
        }
    }
}

unsafe impl <F: SlotFn> Dispatch<F> for End {
    type Table = Nil;

    const TABLE: Nil = Nil;

    #[inline]
    unsafe fn fold(_: *mut Self, _: usize, _: usize, f: F) -> Result<F::Output, F> {
        Err(f)
    }
}

unsafe impl <F, H, T> Dispatch<F> for Chain<H, T>
where
    F: SlotFn,
    H: Leaf + Dispatch<F>,
    T: Dispatch<F>,
{
    type Table = Pair<H::Table, T::Table>;

    const TABLE: Self::Table = Pair(H::TABLE, T::TABLE);

    #[inline]
    unsafe fn fold(this: *mut Self, base: usize, index: usize, f: F) -> Result<F::Output, F> {
        match H::fold(head(this), base, index, f) {
            Ok(output) => Ok(output),
            Err(f) => T::fold(tail(this), base + 1, index, f),
        }
    }
}

unsafe impl <W: Tag> Probe<W> for End {
    const FIRST: usize = NPOS;

    unsafe fn peek(_: *const Self) -> W {
        W::NPOS
    }

    #[inline]
    unsafe fn probe(_: *const Self) -> Option<usize> {
        None
    }
}

unsafe impl <W, H, T> Probe<W> for Chain<H, T>
where
    W: Tag,
    H: Leaf + Probe<W>,
    T: Probe<W>,
{
    const FIRST: usize = H::FIRST;

    #[inline]
    unsafe fn peek(this: *const Self) -> W {
        H::peek(head(this as *mut Self))
    }

    #[inline]
    unsafe fn probe(this: *const Self) -> Option<usize> {
        let this = this as *mut Self;
        H::probe(head(this)).or_else(|| T::probe(tail(this)))
    }
}
