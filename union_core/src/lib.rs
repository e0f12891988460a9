//! Type-level building blocks for generated discriminated unions.
//!
//! A list of alternatives is a nested tuple (see [`List!`]). Every alternative is
//! wrapped into a slot ([`wrapper::Bare`] or [`wrapper::Tagged`]), and a list of slots
//! is turned into a single `#[repr(C)]` union by one of the generators in [`union`].
//! Indices are type-level numbers from [`index`].

#![recursion_limit = "1024"]

pub mod index;
pub mod list;
pub mod promote;
pub mod union;
pub mod wrapper;

/// The index reported when no alternative is active.
pub const NPOS: usize = usize::MAX;
