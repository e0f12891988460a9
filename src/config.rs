//! Compile-time configuration.
//!
//! Layout is chosen per type: `Variant<L, Recursive>`, `Variant<L, Tree>` or
//! `Variant<L, Auto<Th>>` pick the union generator, and [`InvertedVariant`] opts
//! into storing the tag inside the alternatives. The constants below are the
//! crate-wide defaults.
//!
//! [`InvertedVariant`]: crate::InvertedVariant

use union_core::index::Selector;

/// The list length from which [`Auto`](union_core::union::Auto) generates a tree.
pub type TreeThreshold = union_core::union::DefaultThreshold;

pub const TREE_THRESHOLD: usize = <TreeThreshold as Selector>::VALUE;

/// The largest number of visit states dispatched through a `match` or a fold;
/// above it visits go through a function pointer table.
pub const SWITCH_LIMIT: usize = 256;

/// Whether small visits use the stamped `match` rather than the fold.
pub const PREFER_SWITCH: bool = cfg!(feature = "macro-visit");
