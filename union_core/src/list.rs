//! Type lists.
//!
//! A list of alternatives is spelled `(A, (B, (C, ())))`; the [`List!`] macro
//! writes that for you.

use std::any::{self, TypeId};
use std::mem;

use crate::index::{Selector, S, Z};
use crate::wrapper::{Bare, Tag, Tagged};

/// Builds a type list out of a comma separated sequence of types.
///
/// ```
/// use union_core::List;
///
/// type Numbers = List![u8, u16, u32];
/// let _: Numbers = (1u8, (2u16, (3u32, ())));
/// ```
#[macro_export]
macro_rules! List {
    () => { () };

    ($head:ty $(, $tail:ty)* $(,)?) => {
        ($head, $crate::List!($($tail),*))
    };
}

/// Returns the TypeId of `T`.
#[inline]
pub fn type_id<T: 'static + ?Sized>() -> TypeId {
    TypeId::of::<T>()
}

/// Static information about one alternative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Descriptor {
    pub name: &'static str,
    pub size: usize,
    pub align: usize,
    pub needs_drop: bool,
}

impl Descriptor {
    #[inline]
    pub fn of<T>() -> Self {
        Self {
            name: any::type_name::<T>(),
            size: mem::size_of::<T>(),
            align: mem::align_of::<T>(),
            needs_drop: mem::needs_drop::<T>(),
        }
    }
}

/// A list of types with a compile-time length.
pub trait TypeList {
    /// The length of the list, as a type-level index.
    type Count: Selector;

    const LEN: usize = <Self::Count as Selector>::VALUE;

    /// Pushes a [`Descriptor`] for every element, in order.
    fn describe(out: &mut Vec<Descriptor>);

    fn descriptors() -> Vec<Descriptor> {
        let mut out = Vec::with_capacity(Self::LEN);
        Self::describe(&mut out);
        out
    }
}

impl TypeList for () {
    type Count = Z;

    #[inline]
    fn describe(_: &mut Vec<Descriptor>) {}
}

impl <H, T: TypeList> TypeList for (H, T) {
    type Count = S<T::Count>;

    fn describe(out: &mut Vec<Descriptor>) {
        out.push(Descriptor::of::<H>());
        T::describe(out);
    }
}

/// Runtime lookups by type. Only available when every element is `'static`.
pub trait StaticList: TypeList {
    /// Calls `f` with the position and TypeId of every element, in order.
    fn each_type_id<F: FnMut(usize, TypeId)>(offset: usize, f: &mut F);

    /// Returns the position of the first element that is `T`.
    fn position_of<T: 'static + ?Sized>() -> Option<usize> {
        let mut found = None;
        Self::each_type_id(0, &mut |position, id| {
            if found.is_none() && id == type_id::<T>() {
                found = Some(position);
            }
        });
        found
    }

    /// Returns `true` if `T` is one of the elements.
    #[inline]
    fn contains<T: 'static + ?Sized>() -> bool {
        Self::position_of::<T>().is_some()
    }

    /// Counts how often `T` appears in the list.
    fn occurrences<T: 'static + ?Sized>() -> usize {
        let mut count = 0;
        Self::each_type_id(0, &mut |_, id| {
            if id == type_id::<T>() {
                count += 1;
            }
        });
        count
    }
}

impl StaticList for () {
    #[inline]
    fn each_type_id<F: FnMut(usize, TypeId)>(_: usize, _: &mut F) {}
}

impl <H: 'static, T: StaticList> StaticList for (H, T) {
    fn each_type_id<F: FnMut(usize, TypeId)>(offset: usize, f: &mut F) {
        f(offset, type_id::<H>());
        T::each_type_id(offset + 1, f);
    }
}

/// This trait can be used to 'select' an element of a list.
pub trait Select<I: Selector> {
    type Output;
}

impl <H, T> Select<Z> for (H, T) {
    type Output = H;
}

impl <H, T: Select<N>, N: Selector> Select<S<N>> for (H, T) {
    type Output = T::Output;
}

/// Maps every alternative `T` to `Bare<T>`.
pub trait IntoSlots: TypeList {
    type Bare: TypeList;
}

impl IntoSlots for () {
    type Bare = ();
}

impl <H, T: IntoSlots> IntoSlots for (H, T) {
    type Bare = (Bare<H>, T::Bare);
}

/// Maps the alternative at position `N + k` to `Tagged<N + k, T, W>`.
pub trait IntoTagged<N, W>: TypeList {
    type Tagged: TypeList;
}

impl <N, W> IntoTagged<N, W> for () {
    type Tagged = ();
}

impl <N, W, H, T> IntoTagged<N, W> for (H, T)
where
    W: Tag,
    T: IntoTagged<S<N>, W>,
{
    type Tagged = (Tagged<N, H, W>, T::Tagged);
}

/// The slot list of `L` with `W`-sized tags, numbered from zero.
pub type Tagging<L, W> = <L as IntoTagged<Z, W>>::Tagged;
