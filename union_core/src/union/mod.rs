//! Generated unions.
//!
//! A list of slots is turned into one `#[repr(C)]` union by a generator:
//!
//! * [`Recursive`] builds a chain, `Chain<Slot0, Chain<Slot1, ... End>>`.
//! * [`Tree`] pairs slots up into a balanced binary tree of [`Node`]s.
//! * [`Auto`] picks the chain for short lists and the tree otherwise.
//!
//! Every slot of a generated union lives at offset zero. Everything in this module
//! is structural: finding a slot by index or by type, visiting the slot at a
//! runtime index, and reading the tag of a tagged union.

use std::marker::PhantomData;
use std::{mem, ptr};

use crate::index::{Bit, False, Lt, Selector, True, I42, S, Z};
use crate::list::{Descriptor, TypeList};
use crate::promote::Promote;
use crate::wrapper::{Bare, Slot, Tag, Tagged};

pub mod recursive;
pub mod tree;

pub use self::recursive::{Chain, ChainList, End};
pub use self::tree::{Branch, Node, Pairs, TreeList};

/// A union holding at most one live slot.
///
/// # Safety
/// Implementors must be `#[repr(C)]` (or a slot), so that every slot they contain
/// starts at the address of the union itself.
pub unsafe trait RawUnion: Sized {
    /// The number of slots, as a type-level index.
    type Len: Selector;

    const LEN: usize = <Self::Len as Selector>::VALUE;

    /// `true` when none of the slots needs to be dropped.
    const TRIVIAL: bool;

    /// The number of union levels above the deepest slot.
    const DEPTH: usize;

    /// Drops the value of the slot at `index`.
    ///
    /// # Safety
    /// The slot at `index` must be live. It is dead afterwards.
    unsafe fn drop_slot(this: *mut Self, index: usize);

    /// Pushes a descriptor for every slot's value, in index order.
    fn describe(out: &mut Vec<Descriptor>);
}

/// Marker for the two slot kinds. A slot is a union of exactly one member.
pub unsafe trait Leaf: Slot {}

unsafe impl <T> Leaf for Bare<T> {}

unsafe impl <I: Selector, T, W: Tag> Leaf for Tagged<I, T, W> {}

unsafe impl <L: Leaf> RawUnion for L {
    type Len = S<Z>;

    const TRIVIAL: bool = !mem::needs_drop::<L::Value>();

    const DEPTH: usize = 0;

    #[inline]
    unsafe fn drop_slot(this: *mut Self, index: usize) {
        debug_assert_eq!(index, 0);
        ptr::drop_in_place(L::value_ptr(this))
    }

    #[inline]
    fn describe(out: &mut Vec<Descriptor>) {
        out.push(Descriptor::of::<L::Value>());
    }
}

/// Positional access: `Get<I>` projects onto the slot at index `I`.
///
/// # Safety
/// `slot` must return a pointer to the slot at index `I` without reading the union.
pub unsafe trait Get<I>: RawUnion {
    type Slot: Slot;

    /// # Safety
    /// `this` must point to memory large enough for `Self`; it may be uninitialized.
    unsafe fn slot(this: *mut Self) -> *mut Self::Slot;
}

unsafe impl <L: Leaf> Get<Z> for L {
    type Slot = L;

    #[inline]
    unsafe fn slot(this: *mut Self) -> *mut L {
        this
    }
}

/// Path to a slot that is this union itself, or its head.
pub struct Here<K = ()>(PhantomData<K>);

/// Path into the tail of a chain.
pub struct There<P>(PhantomData<P>);

/// Path into the left half of a tree node.
pub struct Left<P>(PhantomData<P>);

/// Path into the right half of a tree node.
pub struct Right<P>(PhantomData<P>);

/// The slot holds the value as is.
pub struct Exact;

/// The value is converted with [`Promote`] first.
pub struct Promoted;

/// Access by type: `Find<T, P>` locates the only slot holding a `T`.
///
/// The path `P` is inferred. If `T` occurs more than once there is more than one
/// path and inference fails, which turns duplicate lookups into compile errors.
///
/// # Safety
/// `INDEX` must be the index of the slot `slot` projects onto.
pub unsafe trait Find<T, P>: RawUnion {
    const INDEX: usize;

    type Slot: Slot<Value = T>;

    /// # Safety
    /// See [`Get::slot`].
    unsafe fn slot(this: *mut Self) -> *mut Self::Slot;
}

unsafe impl <T, L: Leaf<Value = T>> Find<T, Here> for L {
    const INDEX: usize = 0;

    type Slot = L;

    #[inline]
    unsafe fn slot(this: *mut Self) -> *mut L {
        this
    }
}

/// Converting construction: `Accept<A, P>` selects the slot a value of type `A`
/// is stored in.
///
/// A slot accepts its own value type ([`Exact`]) and every type that promotes
/// into it ([`Promoted`]). The selection has to be unique; two candidates of any
/// kind make the path ambiguous.
///
/// # Safety
/// See [`Find`].
pub unsafe trait Accept<A, P>: RawUnion {
    const INDEX: usize;

    type Slot: Slot;

    fn accept(value: A) -> Self::Slot;

    /// # Safety
    /// See [`Get::slot`].
    unsafe fn slot(this: *mut Self) -> *mut Self::Slot;
}

unsafe impl <T, L: Leaf<Value = T>> Accept<T, Exact> for L {
    const INDEX: usize = 0;

    type Slot = L;

    #[inline]
    fn accept(value: T) -> L {
        L::new(value)
    }

    #[inline]
    unsafe fn slot(this: *mut Self) -> *mut L {
        this
    }
}

unsafe impl <A: Promote<T>, T, L: Leaf<Value = T>> Accept<A, Promoted> for L {
    const INDEX: usize = 0;

    type Slot = L;

    #[inline]
    fn accept(value: A) -> L {
        L::new(value.promote())
    }

    #[inline]
    unsafe fn slot(this: *mut Self) -> *mut L {
        this
    }
}

/// A callback invoked on one slot of a union.
pub trait SlotFn {
    type Output;
}

/// The part of a callback that handles slots of type `Sl`.
pub trait SlotCall<Sl: Slot>: SlotFn {
    /// # Safety
    /// `slot` must point to a slot the callback is allowed to use the way it does;
    /// callbacks that read need a live slot, callbacks that write need a dead one.
    unsafe fn call(self, slot: *mut Sl) -> Self::Output;
}

/// Structural descent: calls `f` on the slot at a runtime index.
///
/// Chains step through their links, trees compare against the left half's length.
///
/// # Safety
/// `walk` must call `f` exactly once, on the slot at `index`.
pub unsafe trait Walk<F: SlotFn>: RawUnion {
    /// # Safety
    /// `index < Self::LEN`, and `this` must satisfy whatever `F` requires of the slot.
    unsafe fn walk(this: *mut Self, index: usize, f: F) -> F::Output;
}

unsafe impl <L: Leaf, F: SlotCall<L>> Walk<F> for L {
    #[inline]
    unsafe fn walk(this: *mut Self, index: usize, f: F) -> F::Output {
        debug_assert_eq!(index, 0);
        f.call(this)
    }
}

/// One entry of a dispatch table.
pub type Entry<F> = unsafe fn(*mut u8, F) -> <F as SlotFn>::Output;

/// Two adjacent parts of a dispatch table.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct Pair<A, B>(pub A, pub B);

/// The empty dispatch table.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct Nil;

unsafe fn enter<Sl: Slot, F: SlotCall<Sl>>(base: *mut u8, f: F) -> F::Output {
    f.call(base.cast::<Sl>())
}

/// Flat dispatch on top of [`Walk`].
///
/// # Safety
/// `TABLE` must be `LEN` [`Entry`] values laid out back to back, in index order,
/// each calling `F` on its slot at the union's own address.
pub unsafe trait Dispatch<F: SlotFn>: Walk<F> {
    /// The table type, a nest of [`Pair`]s of entries.
    type Table: Copy;

    const TABLE: Self::Table;

    /// Tests the slots one after the other against `index`, numbering them from
    /// `base`. Gives `f` back untouched if no slot matches.
    ///
    /// # Safety
    /// Same as [`Walk::walk`] when a slot matches.
    unsafe fn fold(this: *mut Self, base: usize, index: usize, f: F) -> Result<F::Output, F>;
}

unsafe impl <L: Leaf, F: SlotCall<L>> Dispatch<F> for L {
    type Table = Entry<F>;

    const TABLE: Entry<F> = enter::<L, F>;

    #[inline]
    unsafe fn fold(this: *mut Self, base: usize, index: usize, f: F) -> Result<F::Output, F> {
        if index == base {
            Ok(f.call(this))
        } else {
            Err(f)
        }
    }
}

/// Reads the active index of a union made of [`Tagged`] slots.
///
/// # Safety
/// Every slot must be a `Tagged<_, _, W>`, and `FIRST` must be the lowest index
/// of the union.
pub unsafe trait Probe<W: Tag>: RawUnion {
    /// The lowest index held by this union.
    const FIRST: usize;

    /// Reads the tag all the slots share.
    ///
    /// # Safety
    /// The first bytes of `this` must hold an initialized tag.
    unsafe fn peek(this: *const Self) -> W;

    /// Finds the live slot by testing the tag of candidate slots, one union level
    /// at a time. Returns `None` when the tag names no slot of this union.
    ///
    /// # Safety
    /// See [`Probe::peek`].
    unsafe fn probe(this: *const Self) -> Option<usize>;
}

unsafe impl <I: Selector, T, W: Tag> Probe<W> for Tagged<I, T, W> {
    const FIRST: usize = I::VALUE;

    #[inline]
    unsafe fn peek(this: *const Self) -> W {
        // Only the tag is read; the value may be partially moved out.
        ptr::read(this.cast::<W>())
    }

    #[inline]
    unsafe fn probe(this: *const Self) -> Option<usize> {
        let tag = Self::peek(this).to_index();
        if tag == I::VALUE {
            Some(tag)
        } else {
            None
        }
    }
}

/// Turns a list of slots into a union.
pub trait Generate<G>: TypeList {
    type Union: RawUnion;
}

/// The union `G` generates for the slot list `L`.
pub type Generated<L, G> = <L as Generate<G>>::Union;

/// Generates a chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct Recursive;

/// Generates a balanced tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tree;

/// The threshold [`Auto`] uses unless told otherwise.
pub type DefaultThreshold = I42;

/// Generates a chain for lists shorter than `Th`, a tree otherwise.
pub struct Auto<Th = DefaultThreshold>(PhantomData<Th>);

impl <L: ChainList> Generate<Recursive> for L {
    type Union = L::Chain;
}

impl <L: TreeList> Generate<Tree> for L {
    type Union = L::Tree;
}

/// Picks a generator from a type-level boolean.
pub trait Pick<B: Bit> {
    type Union: RawUnion;
}

impl <L: ChainList> Pick<True> for L {
    type Union = L::Chain;
}

impl <L: TreeList> Pick<False> for L {
    type Union = L::Tree;
}

impl <L, Th> Generate<Auto<Th>> for L
where
    L: TypeList + Pick<<<L as TypeList>::Count as Lt<Th>>::Output>,
    L::Count: Lt<Th>,
{
    type Union = <L as Pick<<L::Count as Lt<Th>>::Output>>::Union;
}
