//! Tabwire turns keyed, row-oriented tables of typed and possibly missing cells into a single
//! columnar flatbuffer, and back.
//!
//! ```
//! use tabwire::dtype::{LogicalType, TableSpec};
//! use tabwire::scalar::{Cell, Row};
//! use tabwire::{InMemoryTable, decode, encode};
//!
//! let spec = TableSpec::builder()
//!     .column("id", LogicalType::Integer)
//!     .column("name", LogicalType::String)
//!     .build()?;
//! let table = InMemoryTable::new(
//!     spec,
//!     [
//!         Row::new("Row0", [Cell::from(1_i32), Cell::from("a")]),
//!         Row::new("Row1", [Cell::Missing, Cell::from("b")]),
//!     ],
//! );
//!
//! let bytes = encode(&table)?;
//! assert_eq!(decode(&bytes)?, table);
//! # Ok::<(), tabwire::error::TabwireError>(())
//! ```

use bytes::Bytes;
use log::LevelFilter;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
pub use tabwire_ipc::*;
pub use {
    tabwire_dtype as dtype, tabwire_error as error, tabwire_flatbuffers as flatbuffers,
    tabwire_mask as mask, tabwire_scalar as scalar,
};

use crate::dtype::TableSpec;
use crate::error::TabwireResult;

/// Encode an in-memory table with the default options.
pub fn encode(table: &InMemoryTable) -> TabwireResult<Bytes> {
    encode_table(table.rows_source())
}

/// Decode a whole buffer into an in-memory table with the default options.
pub fn decode(bytes: &[u8]) -> TabwireResult<InMemoryTable> {
    decode_in_memory(bytes)
}

/// Read only the schema of a serialized table, under the same verifier limits as [`decode`].
pub fn read_schema(bytes: &[u8]) -> TabwireResult<TableSpec> {
    TableDecoder::default().read_schema(bytes)
}

/// Install a terminal logger writing to stderr at `level`.
///
/// Optional. Without it, the `log` records of every Tabwire crate are discarded. Does nothing if
/// a logger is already installed.
pub fn init_logging(level: LevelFilter) {
    TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto).ok();
}
