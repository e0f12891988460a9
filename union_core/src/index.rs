//! Type-level indices.
//!
//! An index is a Peano number: [`Z`] is zero and [`S<N>`] is the index right after `N`.
//! The aliases [`I0`] up to [`I64`] name the small ones.

use std::marker::PhantomData;

macro_rules! doc_comment {
    ($x:expr, $($tt:tt)*) => {
        #[doc = $x]
        $($tt)*
    };
}

/// This type is used to 'index' into a list of alternatives.
#[derive(Debug, Ord, PartialOrd, Eq, PartialEq, Hash, Default, Clone, Copy)]
pub struct Z;

/// The index following `N`.
pub struct S<N>(PhantomData<N>);

/// Helper trait to 'index' into a list of alternatives at compile time.
pub trait Selector {
    /// The runtime value of this index.
    const VALUE: usize;
}

impl Selector for Z {
    const VALUE: usize = 0;
}

impl <N: Selector> Selector for S<N> {
    const VALUE: usize = N::VALUE + 1;
}

/// Type-level `true`.
pub enum True {}

/// Type-level `false`.
pub enum False {}

/// A type-level boolean.
pub trait Bit {
    const VALUE: bool;
}

impl Bit for True {
    const VALUE: bool = true;
}

impl Bit for False {
    const VALUE: bool = false;
}

/// `<A as Lt<B>>::Output` is [`True`] when `A < B`.
pub trait Lt<Rhs> {
    type Output: Bit;
}

impl Lt<Z> for Z {
    type Output = False;
}

impl <N> Lt<S<N>> for Z {
    type Output = True;
}

impl <N> Lt<Z> for S<N> {
    type Output = False;
}

impl <N: Lt<M>, M> Lt<S<M>> for S<N> {
    type Output = N::Output;
}

/// `<A as Sub<B>>::Output` is `A - B`. Only defined when `B <= A`.
pub trait Sub<Rhs> {
    type Output: Selector;
}

impl <N: Selector> Sub<Z> for N {
    type Output = N;
}

impl <N: Sub<M>, M> Sub<S<M>> for S<N> {
    type Output = N::Output;
}

/// `<A as Add<B>>::Output` is `A + B`.
pub trait Add<Rhs> {
    type Output: Selector;
}

impl <R: Selector> Add<R> for Z {
    type Output = R;
}

impl <N: Add<R>, R> Add<R> for S<N> {
    type Output = S<N::Output>;
}

macro_rules! IndexAlias {
    ($prev:ident => ) => ();

    ($prev:ident => $name:ident $(, $names:ident)*) => (
        doc_comment!(
            concat!("The index `", stringify!($name), "`."),
            pub type $name = S<$prev>;
        );

        IndexAlias!($name => $($names),*);
    );
}

/// The index `I0`.
pub type I0 = Z;

IndexAlias!(
    I0 => I1, I2, I3, I4, I5, I6, I7, I8, I9, I10, I11, I12, I13, I14, I15, I16,
    I17, I18, I19, I20, I21, I22, I23, I24, I25, I26, I27, I28, I29, I30, I31, I32,
    I33, I34, I35, I36, I37, I38, I39, I40, I41, I42, I43, I44, I45, I46, I47, I48,
    I49, I50, I51, I52, I53, I54, I55, I56, I57, I58, I59, I60, I61, I62, I63, I64
);

/// The index `I128`.
pub type I128 = <I64 as Add<I64>>::Output;

/// The index `I256`.
pub type I256 = <I128 as Add<I128>>::Output;
