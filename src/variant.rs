//! The variant type.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::mem::ManuallyDrop;
use std::ptr;

use union_core::index::{Selector, Z};
use union_core::list::{Descriptor, IntoSlots, Tagging};
use union_core::union::{Accept, Auto, Find, Generated, Get, RawUnion, Walk};
use union_core::wrapper::Slot;
use union_core::NPOS;

use crate::error::BadAccess;
use crate::storage::{
    DebugSlot, DefaultSlot, EqSlot, HashSlot, InvertedStorage, NormalStorage, Storage, TotalEq,
};
use crate::visit::{self, Visitable, Visitor};

/// A value that is exactly one of a fixed list of alternatives.
///
/// The layout is decided by the storage `S`; use the [`Variant`] and
/// [`InvertedVariant`] aliases to build one from a list of alternatives.
///
/// A variant can end up holding nothing when constructing a new alternative
/// fails halfway, see [`BasicVariant::valueless_by_exception`].
pub struct BasicVariant<S: Storage> {
    storage: S,
}

/// A variant over the alternatives `L`, with a `T`-sized tag next to the union
/// generated by `G`.
///
/// ```
/// use unionvariant::{List, Variant};
/// use unionvariant::index::I1;
///
/// let mut v = Variant::<List![i32, String]>::new(5i32);
/// assert_eq!(v.index(), 0);
///
/// v.emplace::<I1>("five".to_string());
/// assert_eq!(v.get::<I1>().map(String::as_str), Ok("five"));
/// ```
pub type Variant<L, G = Auto, T = u8> = BasicVariant<NormalStorage<Generated<<L as IntoSlots>::Bare, G>, T>>;

/// A variant over the alternatives `L`, storing a `W`-sized tag in front of
/// every alternative instead of next to the union.
pub type InvertedVariant<L, G = Auto, W = u8> =
    BasicVariant<InvertedStorage<Generated<Tagging<L, W>, G>, W>>;

/// Compile-time facts about a variant type.
pub trait VariantInfo {
    type Union: RawUnion;

    /// The number of alternatives.
    const SIZE: usize = <Self::Union as RawUnion>::LEN;
}

impl<S: Storage> VariantInfo for BasicVariant<S> {
    type Union = S::Union;
}

/// The alternative at index `I` of the variant type `V`.
pub type Alternative<V, I> = <<<V as VariantInfo>::Union as Get<I>>::Slot as Slot>::Value;

/// The number of alternatives of the variant type `V`.
#[inline]
pub const fn variant_size<V: VariantInfo>() -> usize {
    V::SIZE
}

type SlotAt<S, I> = <<S as Storage>::Union as Get<I>>::Slot;

impl<S: Storage> BasicVariant<S> {
    /// The number of alternatives.
    pub const SIZE: usize = <S::Union as RawUnion>::LEN;

    /// `true` when no alternative needs to be dropped.
    pub const TRIVIALLY_DESTRUCTIBLE: bool = <S::Union as RawUnion>::TRIVIAL;

    #[inline]
    fn valueless() -> Self {
        BasicVariant {
            storage: S::valueless(),
        }
    }

    #[inline]
    pub(crate) fn storage(&self) -> &S {
        &self.storage
    }

    #[inline]
    pub(crate) fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Writes `slot` at index `I` of a valueless storage and publishes it.
    #[inline]
    fn place<I: Selector>(&mut self, slot: SlotAt<S, I>) -> &mut Alternative<Self, I>
    where
        S::Union: Get<I>,
    {
        unsafe {
            let target = <S::Union as Get<I>>::slot(self.storage.union_mut_ptr());
            target.write(slot);
            self.storage.commit(I::VALUE);
            &mut *<SlotAt<S, I> as Slot>::value_ptr(target)
        }
    }

    #[inline]
    fn value_ptr<I>(&self) -> *mut Alternative<Self, I>
    where
        S::Union: Get<I>,
    {
        unsafe {
            let slot = <S::Union as Get<I>>::slot(self.storage.union_ptr() as *mut S::Union);
            <SlotAt<S, I> as Slot>::value_ptr(slot)
        }
    }

    /// Constructs the alternative at index `I`.
    #[inline]
    pub fn with_index<I: Selector>(value: Alternative<Self, I>) -> Self
    where
        S::Union: Get<I>,
    {
        let mut this = Self::valueless();
        this.place::<I>(Slot::new(value));
        this
    }

    /// Constructs the alternative at index `I` from the result of `f`.
    #[inline]
    pub fn with_index_with<I, F>(f: F) -> Self
    where
        I: Selector,
        S::Union: Get<I>,
        F: FnOnce() -> Alternative<Self, I>,
    {
        let mut this = Self::valueless();
        this.place::<I>(Slot::new(f()));
        this
    }

    /// Constructs the alternative of type `T`.
    ///
    /// `T` has to appear exactly once among the alternatives:
    ///
    /// ```compile_fail
    /// use unionvariant::{List, Variant};
    ///
    /// let v = Variant::<List![u8, u8]>::new(1u8);
    /// ```
    #[inline]
    pub fn new<T, P>(value: T) -> Self
    where
        S::Union: Find<T, P>,
    {
        let mut this = Self::valueless();
        unsafe {
            let target = <S::Union as Find<T, P>>::slot(this.storage.union_mut_ptr());
            target.write(Slot::new(value));
            this.storage.commit(<S::Union as Find<T, P>>::INDEX);
        }
        this
    }

    /// Constructs the single alternative that accepts a value of type `A`.
    ///
    /// An alternative accepts its own type, and every type that widens into it
    /// without loss (see [`Promote`](union_core::promote::Promote)). Both count
    /// alike, so exactly one alternative may accept `A`:
    ///
    /// ```
    /// use unionvariant::{List, Variant};
    ///
    /// let v = Variant::<List![i8, i64]>::accept(300i16);
    /// assert_eq!(v.index(), 1);
    /// assert_eq!(v.get::<unionvariant::index::I1>(), Ok(&300));
    /// ```
    ///
    /// ```compile_fail
    /// use unionvariant::{List, Variant};
    ///
    /// // `f32` is accepted by both.
    /// let v = Variant::<List![f32, f64]>::accept(1.5f32);
    /// ```
    ///
    /// [`convert!`](crate::convert!) prefers an exact match, and works on concrete
    /// variant types only.
    #[inline]
    pub fn accept<A, P>(value: A) -> Self
    where
        S::Union: Accept<A, P>,
    {
        let mut this = Self::valueless();
        unsafe {
            let target = <S::Union as Accept<A, P>>::slot(this.storage.union_mut_ptr());
            target.write(<S::Union as Accept<A, P>>::accept(value));
            this.storage.commit(<S::Union as Accept<A, P>>::INDEX);
        }
        this
    }

    /// Constructs the default value of the alternative at a runtime `index`.
    pub fn with_default_at(index: usize) -> Result<Self, BadAccess>
    where
        S::Union: Walk<DefaultSlot>,
    {
        if index >= Self::SIZE {
            return Err(BadAccess::OutOfRange {
                index,
                size: Self::SIZE,
            }
            .traced());
        }

        let mut this = Self::valueless();
        unsafe {
            S::Union::walk(this.storage.union_mut_ptr(), index, DefaultSlot);
            this.storage.commit(index);
        }
        Ok(this)
    }

    /// The index of the active alternative, or [`NPOS`] when valueless.
    #[inline]
    pub fn index(&self) -> usize {
        self.storage.index()
    }

    /// Returns `true` when no alternative is active.
    ///
    /// This happens when the construction of a new alternative panics or fails
    /// after the old one was dropped, and lasts until a new alternative is
    /// constructed successfully.
    #[inline]
    pub fn valueless_by_exception(&self) -> bool {
        self.storage.is_valueless()
    }

    /// Returns `true` if the alternative of type `T` is active.
    #[inline]
    pub fn holds<T, P>(&self) -> bool
    where
        S::Union: Find<T, P>,
    {
        self.index() == <S::Union as Find<T, P>>::INDEX
    }

    /// The alternative at index `I`, if it is active.
    #[inline]
    pub fn get<I: Selector>(&self) -> Result<&Alternative<Self, I>, BadAccess>
    where
        S::Union: Get<I>,
    {
        BadAccess::check(self.index(), I::VALUE)?;
        Ok(unsafe { &*self.value_ptr::<I>() })
    }

    /// The alternative at index `I`, if it is active.
    #[inline]
    pub fn get_mut<I: Selector>(&mut self) -> Result<&mut Alternative<Self, I>, BadAccess>
    where
        S::Union: Get<I>,
    {
        BadAccess::check(self.index(), I::VALUE)?;
        Ok(unsafe { &mut *self.value_ptr::<I>() })
    }

    #[inline]
    pub fn get_if<I: Selector>(&self) -> Option<&Alternative<Self, I>>
    where
        S::Union: Get<I>,
    {
        self.get::<I>().ok()
    }

    #[inline]
    pub fn get_if_mut<I: Selector>(&mut self) -> Option<&mut Alternative<Self, I>>
    where
        S::Union: Get<I>,
    {
        self.get_mut::<I>().ok()
    }

    /// The alternative at index `I`, without checking that it is active.
    ///
    /// # Safety
    /// The alternative at index `I` must be active.
    #[inline]
    pub unsafe fn get_unchecked<I: Selector>(&self) -> &Alternative<Self, I>
    where
        S::Union: Get<I>,
    {
        debug_assert_eq!(self.index(), I::VALUE);
        &*self.value_ptr::<I>()
    }

    /// The alternative at index `I`, without checking that it is active.
    ///
    /// # Safety
    /// The alternative at index `I` must be active.
    #[inline]
    pub unsafe fn get_unchecked_mut<I: Selector>(&mut self) -> &mut Alternative<Self, I>
    where
        S::Union: Get<I>,
    {
        debug_assert_eq!(self.index(), I::VALUE);
        &mut *self.value_ptr::<I>()
    }

    /// The alternative of type `T`, if it is active.
    #[inline]
    pub fn get_type<T, P>(&self) -> Result<&T, BadAccess>
    where
        S::Union: Find<T, P>,
    {
        BadAccess::check(self.index(), <S::Union as Find<T, P>>::INDEX)?;
        unsafe {
            let slot = <S::Union as Find<T, P>>::slot(self.storage.union_ptr() as *mut S::Union);
            Ok(&*<<S::Union as Find<T, P>>::Slot as Slot>::value_ptr(slot))
        }
    }

    /// The alternative of type `T`, if it is active.
    #[inline]
    pub fn get_type_mut<T, P>(&mut self) -> Result<&mut T, BadAccess>
    where
        S::Union: Find<T, P>,
    {
        BadAccess::check(self.index(), <S::Union as Find<T, P>>::INDEX)?;
        unsafe {
            let slot = <S::Union as Find<T, P>>::slot(self.storage.union_mut_ptr());
            Ok(&mut *<<S::Union as Find<T, P>>::Slot as Slot>::value_ptr(slot))
        }
    }

    /// Moves the alternative at index `I` out, if it is active.
    pub fn into_alternative<I: Selector>(self) -> Result<Alternative<Self, I>, BadAccess>
    where
        S::Union: Get<I>,
    {
        BadAccess::check(self.index(), I::VALUE)?;

        let this = ManuallyDrop::new(self);
        Ok(unsafe { ptr::read(this.value_ptr::<I>()) })
    }

    /// Drops the active alternative and constructs `value` at index `I`.
    #[inline]
    pub fn emplace<I: Selector>(&mut self, value: Alternative<Self, I>) -> &mut Alternative<Self, I>
    where
        S::Union: Get<I>,
    {
        self.storage.reset();
        self.place::<I>(Slot::new(value))
    }

    /// Drops the active alternative and constructs the alternative at index `I`
    /// from the result of `f`.
    ///
    /// The old alternative is gone before `f` runs: if `f` panics, the variant is
    /// left valueless.
    #[inline]
    pub fn emplace_with<I, F>(&mut self, f: F) -> &mut Alternative<Self, I>
    where
        I: Selector,
        S::Union: Get<I>,
        F: FnOnce() -> Alternative<Self, I>,
    {
        self.storage.reset();
        self.place::<I>(Slot::new(f()))
    }

    /// Like [`emplace_with`](BasicVariant::emplace_with), for a constructor that
    /// can fail. On failure the variant is left valueless.
    pub fn try_emplace_with<I, E, F>(&mut self, f: F) -> Result<&mut Alternative<Self, I>, E>
    where
        I: Selector,
        S::Union: Get<I>,
        F: FnOnce() -> Result<Alternative<Self, I>, E>,
    {
        self.storage.reset();

        match f() {
            Ok(value) => Ok(self.place::<I>(Slot::new(value))),
            Err(error) => {
                tracing::debug!(index = I::VALUE, "constructor failed, variant left valueless");
                Err(error)
            }
        }
    }

    /// Drops the active alternative and constructs `value` as the alternative of
    /// type `T`.
    #[inline]
    pub fn emplace_type<T, P>(&mut self, value: T) -> &mut T
    where
        S::Union: Find<T, P>,
    {
        self.storage.reset();
        unsafe {
            let target = <S::Union as Find<T, P>>::slot(self.storage.union_mut_ptr());
            target.write(Slot::new(value));
            self.storage.commit(<S::Union as Find<T, P>>::INDEX);
            &mut *<<S::Union as Find<T, P>>::Slot as Slot>::value_ptr(target)
        }
    }

    /// Drops the active alternative, leaving the variant valueless.
    #[inline]
    pub fn reset(&mut self) {
        self.storage.reset()
    }

    /// Descriptors of all alternatives, in index order.
    pub fn alternatives() -> Vec<Descriptor> {
        let mut out = Vec::with_capacity(Self::SIZE);
        <S::Union as RawUnion>::describe(&mut out);
        out
    }

    /// Calls `visitor` with a reference to the active alternative.
    #[inline]
    pub fn visit<'a, F>(&'a self, visitor: F) -> Result<F::Output, BadAccess>
    where
        F: Visitor,
        &'a Self: Visitable<F>,
    {
        visit::visit(visitor, self)
    }

    /// Calls `visitor` with a mutable reference to the active alternative.
    #[inline]
    pub fn visit_mut<'a, F>(&'a mut self, visitor: F) -> Result<F::Output, BadAccess>
    where
        F: Visitor,
        &'a mut Self: Visitable<F>,
    {
        visit::visit(visitor, self)
    }

    /// Calls `visitor` with the active alternative, moved out of the variant.
    #[inline]
    pub fn into_visit<F>(self, visitor: F) -> Result<F::Output, BadAccess>
    where
        F: Visitor,
        Self: Visitable<F>,
    {
        visit::visit(visitor, self)
    }
}

/// Returns `true` if the alternative of type `T` is active in `variant`.
#[inline]
pub fn holds_alternative<T, P, S>(variant: &BasicVariant<S>) -> bool
where
    S: Storage,
    S::Union: Find<T, P>,
{
    variant.holds::<T, P>()
}

/// The alternative at index `I` of `variant`, if there is a variant and the
/// alternative is active.
#[inline]
pub fn get_if<I, S>(variant: Option<&BasicVariant<S>>) -> Option<&Alternative<BasicVariant<S>, I>>
where
    I: Selector,
    S: Storage,
    S::Union: Get<I>,
{
    variant.and_then(BasicVariant::get_if::<I>)
}

/// The exact-match tier of [`convert!`](crate::convert!).
#[doc(hidden)]
pub struct ByExact<P>(PhantomData<P>);

/// The accepting tier of [`convert!`](crate::convert!).
#[doc(hidden)]
pub struct ByAccept<P>(PhantomData<P>);

/// Resolves a converting construction of a `V` from an `A`.
///
/// `(&Converting::<V, A>::of(&value)).kind()` selects [`ExactKind`] when an
/// alternative is exactly `A`, because it is found without autoref, and
/// [`AcceptKind`] otherwise.
#[doc(hidden)]
pub struct Converting<V, A>(PhantomData<fn(A) -> V>);

impl<V, A> Converting<V, A> {
    #[inline]
    pub fn of(_: &A) -> Self {
        Converting(PhantomData)
    }
}

#[doc(hidden)]
pub trait ExactKind<P> {
    #[inline]
    fn kind(&self) -> ByExact<P> {
        ByExact(PhantomData)
    }
}

impl<S, A, P> ExactKind<P> for Converting<BasicVariant<S>, A>
where
    S: Storage,
    S::Union: Find<A, P>,
{
}

#[doc(hidden)]
pub trait AcceptKind<P> {
    #[inline]
    fn kind(&self) -> ByAccept<P> {
        ByAccept(PhantomData)
    }
}

impl<S, A, P> AcceptKind<P> for &Converting<BasicVariant<S>, A>
where
    S: Storage,
    S::Union: Accept<A, P>,
{
}

impl<P> ByExact<P> {
    #[inline]
    pub fn build<S, A>(self, value: A) -> BasicVariant<S>
    where
        S: Storage,
        S::Union: Find<A, P>,
    {
        BasicVariant::new::<A, P>(value)
    }
}

impl<P> ByAccept<P> {
    #[inline]
    pub fn build<S, A>(self, value: A) -> BasicVariant<S>
    where
        S: Storage,
        S::Union: Accept<A, P>,
    {
        BasicVariant::accept::<A, P>(value)
    }
}

impl<S: Storage + Clone> Clone for BasicVariant<S> {
    #[inline]
    fn clone(&self) -> Self {
        BasicVariant {
            storage: self.storage.clone(),
        }
    }

    /// Drops the active alternative of `self` before cloning the one of `source`.
    #[inline]
    fn clone_from(&mut self, source: &Self) {
        self.storage.clone_from(&source.storage)
    }
}

impl<S> Default for BasicVariant<S>
where
    S: Storage,
    S::Union: Get<Z>,
    Alternative<Self, Z>: Default,
{
    #[inline]
    fn default() -> Self {
        Self::with_index::<Z>(Default::default())
    }
}

impl<S> PartialEq for BasicVariant<S>
where
    S: Storage,
    S::Union: Walk<EqSlot<S::Union>>,
{
    fn eq(&self, other: &Self) -> bool {
        let index = self.index();
        if index != other.index() {
            return false;
        }
        if index == NPOS {
            return true;
        }

        let rhs = EqSlot::new(other.storage.union_ptr());
        unsafe { S::Union::walk(self.storage.union_ptr() as *mut S::Union, index, rhs) }
    }
}

impl<S> Eq for BasicVariant<S>
where
    S: Storage,
    S::Union: Walk<EqSlot<S::Union>> + Walk<TotalEq>,
{
}

impl<S> Hash for BasicVariant<S>
where
    S: Storage,
    S::Union: for<'a> Walk<HashSlot<'a>>,
{
    fn hash<H: Hasher>(&self, state: &mut H) {
        let index = self.index();
        index.hash(state);

        if index != NPOS {
            let slot = HashSlot::new(state);
            unsafe { S::Union::walk(self.storage.union_ptr() as *mut S::Union, index, slot) }
        }
    }
}

impl<S> fmt::Debug for BasicVariant<S>
where
    S: Storage,
    S::Union: for<'a, 'b> Walk<DebugSlot<'a, 'b>>,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let index = self.index();
        if index == NPOS {
            return f.write_str("Variant(<valueless>)");
        }

        let slot = DebugSlot::new(f, index);
        unsafe { S::Union::walk(self.storage.union_ptr() as *mut S::Union, index, slot) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visit::{visit, Visit};
    use union_core::index::{I0, I1, I2};
    use union_core::union::{Recursive, Tree};
    use union_core::List;

    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::collections::hash_map::DefaultHasher;
    use std::panic::{self, AssertUnwindSafe};
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Noisy {
        id: u32,
        log: Log,
    }

    impl Noisy {
        fn new(id: u32, log: &Log) -> Self {
            log.borrow_mut().push(format!("ctor {}", id));
            Noisy {
                id,
                log: log.clone(),
            }
        }
    }

    impl Clone for Noisy {
        fn clone(&self) -> Self {
            self.log.borrow_mut().push(format!("clone {}", self.id));
            Noisy {
                id: self.id,
                log: self.log.clone(),
            }
        }
    }

    impl Drop for Noisy {
        fn drop(&mut self) {
            self.log.borrow_mut().push(format!("drop {}", self.id));
        }
    }

    fn events(log: &Log) -> Vec<String> {
        log.borrow_mut().drain(..).collect()
    }

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut state = DefaultHasher::new();
        value.hash(&mut state);
        state.finish()
    }

    type Mixed = Variant<List![u8, String, Noisy]>;

    #[test]
    fn test_default_and_index() {
        let v = Variant::<List![u32, String]>::default();

        assert_eq!(v.index(), 0);
        assert_eq!(v.get::<I0>(), Ok(&0));
        assert!(!v.valueless_by_exception());
        assert_eq!(Variant::<List![u32, String]>::SIZE, 2);
        assert_eq!(variant_size::<Variant<List![u32, String, ()]>>(), 3);
    }

    #[test]
    fn test_checked_access() {
        let mut v = Variant::<List![u32, String]>::with_index::<I1>("abc".to_string());

        assert_eq!(
            v.get::<I0>(),
            Err(BadAccess::WrongAlternative {
                requested: 0,
                active: 1
            })
        );
        assert_eq!(v.get_if::<I0>(), None);
        v.get_mut::<I1>().unwrap().push('d');
        assert_eq!(v.get_type::<String, _>().map(String::as_str), Ok("abcd"));
        assert!(v.get_type_mut::<u32, _>().is_err());
        assert!(holds_alternative::<String, _, _>(&v));
        assert_eq!(unsafe { v.get_unchecked::<I1>() }, "abcd");

        assert_eq!(get_if::<I1, _>(Some(&v)).map(String::len), Some(4));
        assert_eq!(get_if::<I1, _>(None::<&Variant<List![u32, String]>>), None);
    }

    #[test]
    fn test_alternative_types() {
        type V = Variant<List![u32, String]>;

        let text: Alternative<V, I1> = String::from("typed");
        let v = V::with_index::<I1>(text);
        assert_eq!(v.into_alternative::<I1>(), Ok("typed".to_string()));

        let descriptors = V::alternatives();
        assert_eq!(descriptors.len(), 2);
        assert_eq!(descriptors[0].name, "u32");
        assert!(descriptors[1].needs_drop);
        assert!(!V::TRIVIALLY_DESTRUCTIBLE);
        assert!(Variant::<List![u32, char]>::TRIVIALLY_DESTRUCTIBLE);
    }

    #[test]
    fn test_converting_construction() {
        let v = crate::convert!(Variant<List![i8, i64]>, -3i16);
        assert_eq!(v.index(), 1);
        assert_eq!(v.get::<I1>(), Ok(&-3));

        let v = crate::convert!(Variant<List![u8, String]>, "text");
        assert_eq!(v.index(), 1);

        let v = crate::convert!(Variant<List![f32, u64]>, 1.5f32);
        assert_eq!(v.index(), 0);

        let v = crate::convert!(Variant<List![bool, Box<str>]>, "boxed");
        assert_eq!(v.get::<I1>().map(|s| &**s), Ok("boxed"));
    }

    #[test]
    fn test_exact_match_beats_widening() {
        let v = crate::convert!(Variant<List![f32, f64]>, 1.5f32);
        assert_eq!(v.index(), 0);
        assert_eq!(v.get::<I0>(), Ok(&1.5));

        let v = crate::convert!(Variant<List![i32, i64]>, 7i32);
        assert_eq!(v.index(), 0);

        let v = crate::convert!(InvertedVariant<List![i64, u16, i32], Tree>, 7i32);
        assert_eq!(v.index(), 2);

        let v = crate::convert!(Variant<List![f64, f32], Recursive>, 0.25f32);
        assert_eq!(v.get::<I1>(), Ok(&0.25));
    }

    #[test]
    fn test_accept_counts_every_candidate() {
        let v = Variant::<List![i8, i64]>::accept(-3i16);
        assert_eq!(v.get::<I1>(), Ok(&-3));

        let v = Variant::<List![f32, u64]>::accept(1.5f32);
        assert_eq!(v.index(), 0);
    }

    #[test]
    fn test_with_default_at() {
        let v = Variant::<List![u8, String, Vec<u8>]>::with_default_at(2).unwrap();
        assert_eq!(v.index(), 2);
        assert_eq!(v.get::<I2>(), Ok(&Vec::new()));

        let err = Variant::<List![u8, String]>::with_default_at(2).err();
        assert_eq!(err, Some(BadAccess::OutOfRange { index: 2, size: 2 }));
    }

    #[test]
    fn test_emplace_destroys_then_constructs() {
        let log = Log::default();
        let mut v = Mixed::with_index_with::<I2, _>(|| Noisy::new(1, &log));
        assert_eq!(events(&log), ["ctor 1"]);

        v.emplace_with::<I2, _>(|| Noisy::new(2, &log));
        assert_eq!(events(&log), ["drop 1", "ctor 2"]);

        v.emplace::<I0>(7);
        assert_eq!(events(&log), ["drop 2"]);

        *v.emplace_type("s".to_string()) += "t";
        assert_eq!(v.get::<I1>().map(String::as_str), Ok("st"));

        v.emplace::<I2>(Noisy::new(3, &log));
        drop(v);
        assert_eq!(events(&log), ["ctor 3", "drop 3"]);
    }

    #[test]
    fn test_panicking_emplace_leaves_valueless() {
        let log = Log::default();
        let mut v = Mixed::with_index::<I2>(Noisy::new(1, &log));

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            v.emplace_with::<I1, _>(|| panic!("constructor failed"));
        }));

        assert!(result.is_err());
        assert!(v.valueless_by_exception());
        assert_eq!(v.index(), NPOS);
        assert_eq!(v.get::<I2>().err(), Some(BadAccess::Valueless));
        assert_eq!(events(&log), ["ctor 1", "drop 1"]);

        v.emplace::<I0>(1);
        assert!(!v.valueless_by_exception());
    }

    #[test]
    fn test_failing_emplace_leaves_valueless() {
        let mut v = Variant::<List![u8, String]>::new(4u8);

        let result = v.try_emplace_with::<I1, _, _>(|| "x".parse::<u8>().map(|n| n.to_string()));
        assert!(result.is_err());
        assert!(v.valueless_by_exception());

        let ok = v.try_emplace_with::<I1, (), _>(|| Ok("back".to_string()));
        assert_eq!(ok.map(|s| s.len()), Ok(4));
        assert_eq!(v.index(), 1);
    }

    #[test]
    fn test_clone_and_clone_from() {
        let log = Log::default();
        let source = Mixed::with_index::<I2>(Noisy::new(1, &log));
        let mut target = Mixed::with_index::<I2>(Noisy::new(2, &log));
        events(&log);

        let copy = source.clone();
        assert_eq!(copy.index(), 2);
        assert_eq!(events(&log), ["clone 1"]);

        target.clone_from(&source);
        assert_eq!(events(&log), ["drop 2", "clone 1"]);

        let mut valueless = Mixed::new(0u8);
        valueless.reset();
        target.clone_from(&valueless);
        assert!(target.valueless_by_exception());
        assert_eq!(events(&log), ["drop 1"]);
    }

    #[test]
    fn test_equality() {
        type V = Variant<List![u8, String, u8]>;

        assert_eq!(V::with_index::<I0>(1), V::with_index::<I0>(1));
        assert_ne!(V::with_index::<I0>(1), V::with_index::<I0>(2));
        assert_ne!(V::with_index::<I0>(1), V::with_index::<I2>(1));

        let mut a = V::with_index::<I1>("a".to_string());
        let mut b = V::with_index::<I0>(0);
        a.reset();
        b.reset();
        assert_eq!(a, b);
        assert_ne!(a, V::with_index::<I0>(0));
    }

    #[test]
    fn test_hash_mixes_index() {
        type Units = Variant<List![(), ()]>;

        let first = Units::with_index::<I0>(());
        let second = Units::with_index::<I1>(());
        assert_ne!(hash_of(&first), hash_of(&second));
        assert_eq!(hash_of(&first), hash_of(&first.clone()));

        let mut gone = first.clone();
        gone.reset();
        assert_ne!(hash_of(&gone), hash_of(&first));
    }

    #[test]
    fn test_debug() {
        let mut v = Variant::<List![u8, &str]>::with_index::<I1>("x");
        assert_eq!(format!("{:?}", v), "Variant(1, \"x\")");

        v.reset();
        assert_eq!(format!("{:?}", v), "Variant(<valueless>)");
    }

    #[test]
    fn test_layouts_behave_alike() {
        let mut chain = Variant::<List![u16, String, [u8; 3]], Recursive>::new(9u16);
        let mut tree = Variant::<List![u16, String, [u8; 3]], Tree>::new(9u16);
        let mut inverted = InvertedVariant::<List![u16, String, [u8; 3]]>::new(9u16);

        chain.emplace::<I2>([1, 2, 3]);
        tree.emplace::<I2>([1, 2, 3]);
        inverted.emplace::<I2>([1, 2, 3]);

        assert_eq!(chain.get::<I2>(), Ok(&[1, 2, 3]));
        assert_eq!(tree.get::<I2>(), Ok(&[1, 2, 3]));
        assert_eq!(inverted.get::<I2>(), Ok(&[1, 2, 3]));
        assert_eq!(inverted.clone(), inverted);
        assert_eq!(format!("{:?}", inverted), "Variant(2, [1, 2, 3])");

        inverted.reset();
        assert!(inverted.valueless_by_exception());
    }

    struct Category;

    impl Visitor for Category {
        type Output = &'static str;
    }

    impl<'a> Visit<&'a String> for Category {
        fn visit(self, _: &'a String) -> &'static str {
            "shared"
        }
    }

    impl<'a> Visit<&'a mut String> for Category {
        fn visit(self, value: &'a mut String) -> &'static str {
            value.push('!');
            "unique"
        }
    }

    impl Visit<String> for Category {
        fn visit(self, _: String) -> &'static str {
            "owned"
        }
    }

    #[test]
    fn test_value_categories() {
        let mut v = Variant::<List![String]>::new("v".to_string());

        assert_eq!(v.visit(Category), Ok("shared"));
        assert_eq!(v.visit_mut(Category), Ok("unique"));
        assert_eq!(v.get::<I0>().map(String::as_str), Ok("v!"));
        assert_eq!(v.into_visit(Category), Ok("owned"));
    }

    #[test]
    fn test_owned_visit_drops_once() {
        struct Consume;

        impl Visitor for Consume {
            type Output = ();
        }

        impl Visit<Noisy> for Consume {
            fn visit(self, _: Noisy) {}
        }

        impl Visit<u8> for Consume {
            fn visit(self, _: u8) {}
        }

        let log = Log::default();
        let v = Variant::<List![u8, Noisy]>::with_index::<I1>(Noisy::new(5, &log));
        v.into_visit(Consume).unwrap();

        assert_eq!(events(&log), ["ctor 5", "drop 5"]);
    }

    struct Pairs;

    impl Visitor for Pairs {
        type Output = String;
    }

    impl<'a, 'b, X: fmt::Debug, Y: fmt::Debug> Visit<(&'a X, &'b Y)> for Pairs {
        fn visit(self, (x, y): (&'a X, &'b Y)) -> String {
            format!("{:?}/{:?}", x, y)
        }
    }

    #[test]
    fn test_visit_pairs() {
        type Three = Variant<List![u8, char, &'static str]>;
        type Two = Variant<List![bool, i32]>;

        let lefts = [
            Three::with_index::<I0>(1),
            Three::with_index::<I1>('c'),
            Three::with_index::<I2>("s"),
        ];
        let rights = [Two::with_index::<I0>(true), Two::with_index::<I1>(-2)];

        let mut seen = Vec::new();
        for left in &lefts {
            for right in &rights {
                seen.push(visit(Pairs, (left, right)).unwrap());
            }
        }

        assert_eq!(
            seen,
            ["1/true", "1/-2", "'c'/true", "'c'/-2", "\"s\"/true", "\"s\"/-2"]
        );

        let mut gone = rights[0].clone();
        gone.reset();
        assert_eq!(visit(Pairs, (&lefts[0], &gone)), Err(BadAccess::Valueless));
    }
}
