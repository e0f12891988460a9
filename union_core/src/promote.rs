//! Implicit, lossless conversions accepted by converting construction.
//!
//! `A: Promote<T>` means a value of type `A` may be stored as the alternative `T`
//! without naming `T`. The table only holds widening conversions that never lose
//! information, and it never relates a type to itself: exact matches are resolved
//! separately so a list like `(i8, (i64, ()))` picks `i64` for an `i16`.

/// A single implicit conversion from `Self` to `T`.
pub trait Promote<T> {
    fn promote(self) -> T;
}

macro_rules! promote {
    ($($from:ty => [$($to:ty),*];)*) => ($($(
        impl Promote<$to> for $from {
            #[inline]
            fn promote(self) -> $to {
                <$to>::from(self)
            }
        }
    )*)*)
}

promote! {
    i8 => [i16, i32, i64, i128, isize, f32, f64];
    i16 => [i32, i64, i128, isize, f32, f64];
    i32 => [i64, i128, f64];
    i64 => [i128];
    u8 => [u16, u32, u64, u128, usize, i16, i32, i64, i128, isize, f32, f64];
    u16 => [u32, u64, u128, usize, i32, i64, i128, f32, f64];
    u32 => [u64, u128, i64, i128, f64];
    u64 => [u128, i128];
    f32 => [f64];
    char => [u32, u64, u128];
}

impl <'a> Promote<String> for &'a str {
    #[inline]
    fn promote(self) -> String {
        String::from(self)
    }
}

impl <'a> Promote<Box<str>> for &'a str {
    #[inline]
    fn promote(self) -> Box<str> {
        Box::from(self)
    }
}
