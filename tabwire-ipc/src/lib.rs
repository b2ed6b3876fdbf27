//! Encoding and decoding of whole Tabwire tables.
//!
//! A [`TableEncoder`] drains a [`RowSource`] once, transposes its rows into typed columns and
//! writes them as a single flatbuffer. A [`TableDecoder`] verifies such a buffer, materializes
//! every column and hands the rows back to a [`RowSink`] in their original order.
//!
//! Each cell is either a value of its column's logical type or missing. Missing cells keep their
//! slot in the dense value vectors, filled by a per-type sentinel, and are flagged in a parallel
//! missing vector. Only the flags decide what is missing.

pub mod column;
mod decoder;
mod encoder;
mod infer;
mod missing;
mod options;
mod source;

pub use decoder::*;
pub use encoder::*;
pub use infer::*;
pub use missing::*;
pub use options::*;
pub use source::*;
