#![deny(missing_docs)]

//! The type system of Tabwire.
//!
//! This crate contains the registry of logical column types, the schema of a table, and the logic
//! for reading a schema straight out of a serialized table without touching its values.

pub use ltype::*;
pub use spec::*;

mod ltype;
mod serde;
mod spec;

pub mod flatbuffers {
    //! Flatbuffer representations of table schemas
    //!
    //! This module contains the code to extract a [`TableSpec`](crate::TableSpec) from a
    //! serialized table.

    pub use tabwire_flatbuffers::table::*;

    pub use super::serde::flatbuffers::*;
}
