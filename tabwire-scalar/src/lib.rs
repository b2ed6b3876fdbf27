#![deny(missing_docs)]

//! Values of a Tabwire table.
//!
//! A [`Row`] is a key plus one [`Cell`] per column. A cell holds a single typed value, a list or
//! set of [`CollectionValues`], or is [`Cell::Missing`].

pub use cell::*;
pub use collection::*;
pub use row::*;

mod cell;
mod collection;
mod display;
mod row;
