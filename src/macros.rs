//! Macros: the stamped `match` dispatchers and [`convert!`](crate::convert!).

/// Expands to an unsafe dispatcher over a dense `match` with one arm per literal.
///
/// Every arm hands its literal index to the union's structural descent, so the
/// compiler sees a constant index and can fold the descent away.
macro_rules! stamp_switch {
    ($(#[$attr:meta])* $name:ident => [$($case:literal)*]) => {
        $(#[$attr])*
        #[inline]
        pub(crate) unsafe fn $name<U, F>(this: *mut U, index: usize, f: F) -> F::Output
        where
            U: union_core::union::Dispatch<F>,
            F: union_core::union::SlotFn,
        {
            match index {
                $($case if $case < U::LEN => U::walk(this, $case, f),)*
                _ => unreachable!(
                    "dispatch key {} out of range for {} alternatives",
                    index,
                    U::LEN
                ),
            }
        }
    };
}

/// Constructs a variant of type `$variant` from `$value`, preferring an exact
/// match.
///
/// An alternative of exactly the value's type is picked when there is one, and
/// it has to be the only one. Otherwise the value goes to the single
/// alternative it widens into (see [`BasicVariant::accept`]).
///
/// ```
/// use unionvariant::{convert, List, Variant};
///
/// let v = convert!(Variant<List![f32, f64]>, 1.5f32);
/// assert_eq!(v.index(), 0);
///
/// let v = convert!(Variant<List![char, i64]>, 3i16);
/// assert_eq!(v.index(), 1);
/// ```
///
/// The same type twice is ambiguous:
///
/// ```compile_fail
/// use unionvariant::{convert, List, Variant};
///
/// let v = convert!(Variant<List![i32, i32]>, 1i32);
/// ```
///
/// So are two alternatives the value widens into:
///
/// ```compile_fail
/// use unionvariant::{convert, List, Variant};
///
/// let v = convert!(Variant<List![i64, i128]>, 1i32);
/// ```
///
/// Narrowing is never implicit:
///
/// ```compile_fail
/// use unionvariant::{convert, List, Variant};
///
/// let v = convert!(Variant<List![i8, i16]>, 1i64);
/// ```
///
/// A value no alternative accepts is rejected:
///
/// ```compile_fail
/// use unionvariant::{convert, List, Variant};
///
/// let v = convert!(Variant<List![i8, i32]>, 1.0f32);
/// ```
///
/// [`BasicVariant::accept`]: crate::BasicVariant::accept
#[macro_export]
macro_rules! convert {
    ($variant:ty, $value:expr $(,)?) => {{
        #[allow(unused_imports)]
        use $crate::variant::{AcceptKind as _, ExactKind as _};

        let value = $value;
        let converting = $crate::variant::Converting::<$variant, _>::of(&value);
        let variant: $variant = (&converting).kind().build(value);
        variant
    }};
}
