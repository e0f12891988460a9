//! A discriminated union over a list of types, generated at compile time.
//!
//! A [`Variant`] holds exactly one value out of a list of alternatives, written
//! with the [`List!`] macro. Alternatives are addressed by index (`I0`, `I1`, ..)
//! or by type, and any number of variants up to three can be visited at once.
//!
//! ```
//! use unionvariant::{List, Variant};
//! use unionvariant::index::{I0, I1};
//!
//! type Number = Variant<List![i64, f64]>;
//!
//! let mut n = Number::new(3i64);
//! assert_eq!(n.get::<I0>(), Ok(&3));
//! assert!(n.get::<I1>().is_err());
//!
//! n.emplace::<I1>(0.5);
//! assert!(n.holds::<f64, _>());
//! ```
//!
//! [`convert!`] builds a variant from a value the way an implicit conversion
//! would: an alternative of exactly the value's type first, otherwise the single
//! alternative it widens into.
//!
//! The union behind a variant is either a chain (`Recursive`), a balanced tree
//! (`Tree`), or whichever of the two suits the list length (`Auto`, the default).
//! [`InvertedVariant`] stores the index inside every alternative instead of next
//! to the union, which can save the padding of a separate tag.

#[macro_use]
mod macros;

pub mod config;
pub mod error;
pub mod storage;
pub mod variant;
pub mod visit;

pub use union_core::{index, list, promote, union, wrapper, List, NPOS};

pub use crate::error::BadAccess;
pub use crate::variant::{
    get_if, holds_alternative, variant_size, Alternative, BasicVariant, InvertedVariant, Variant,
    VariantInfo,
};
pub use crate::visit::{visit, visit_with, DispatchKey, Strategy, Visit, Visitor};
