use itertools::Itertools;
use tabwire_dtype::TableSpec;
use tabwire_dtype::flatbuffers::root_as_wire_table_with_opts;
use tabwire_error::{TabwireResult, tabwire_bail, tabwire_err};
use tabwire_flatbuffers::ReadFlatBuffer;
use tabwire_scalar::Row;

use crate::column::ColumnBuffer;
use crate::options::DecodeOptions;
use crate::source::{InMemoryTable, RowSink};

/// Turns a buffer produced by [`TableEncoder`](crate::TableEncoder) back into rows.
#[derive(Debug, Clone, Default)]
pub struct TableDecoder {
    options: DecodeOptions,
}

impl TableDecoder {
    pub fn new(options: DecodeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Extract the schema of `bytes` without reading any cell, verifying under this decoder's
    /// limits.
    pub fn read_schema(&self, bytes: &[u8]) -> TabwireResult<TableSpec> {
        TableSpec::read_flatbuffer_bytes_with_opts(bytes, &self.options.verifier_options())
    }

    /// Decode `bytes`, delivering every row to `sink` in table order.
    ///
    /// The whole buffer is verified and every column materialized before the first row reaches
    /// the sink, so a malformed buffer never yields a partial table. Cancellation is honored up to
    /// that point; once rows are being delivered the decode runs to completion. Returns the
    /// table's schema.
    pub fn decode(&self, bytes: &[u8], sink: &mut impl RowSink) -> TabwireResult<TableSpec> {
        let table = root_as_wire_table_with_opts(&self.options.verifier_options(), bytes)?;
        let spec = TableSpec::read_flatbuffer(&table)?;
        if spec.is_empty() {
            log::debug!("Decoded table without columns");
            return Ok(spec);
        }

        let row_keys = table
            .row_keys()
            .ok_or_else(|| tabwire_err!(MalformedBuffer: "Table has no row keys"))?;
        let columns = table
            .columns()
            .ok_or_else(|| tabwire_err!(MalformedBuffer: "Table has no columns"))?;

        let columns = spec
            .columns()
            .iter()
            .zip(columns.iter())
            .map(|(column_spec, column)| {
                self.options.check_cancelled()?;
                ColumnBuffer::read(column_spec.name(), column, row_keys.len())
            })
            .collect::<TabwireResult<Vec<_>>>()?;

        let row_count = if columns.iter().any(ColumnBuffer::is_empty) {
            0
        } else {
            match columns.iter().map(ColumnBuffer::len).all_equal_value() {
                Ok(len) => len,
                Err(Some((first, other))) => tabwire_bail!(
                    MalformedBuffer: "Columns have different lengths: {first} and {other}"
                ),
                Err(None) => 0,
            }
        };

        // Last cancellation point. Delivery is never interrupted.
        self.options.check_cancelled()?;
        let mut cells = columns
            .into_iter()
            .map(ColumnBuffer::into_cells)
            .collect::<Vec<_>>();
        for key in row_keys.iter().take(row_count) {
            let row = Row::new(
                key,
                cells
                    .iter_mut()
                    .map(|column| column.next().unwrap_or_default()),
            );
            sink.add_row(row)?;
        }

        log::debug!(
            "Decoded {row_count} rows of columns [{}] from {} bytes",
            spec.column_names().join(", "),
            bytes.len()
        );
        Ok(spec)
    }
}

/// Decode `bytes` with the default options into its schema and rows.
pub fn decode_table(bytes: &[u8]) -> TabwireResult<(TableSpec, Vec<Row>)> {
    let mut table = InMemoryTable::default();
    let spec = TableDecoder::default().decode(bytes, &mut table)?;
    table.set_spec(spec);
    Ok(table.into_parts())
}

/// Decode `bytes` with the default options into an [`InMemoryTable`].
pub fn decode_in_memory(bytes: &[u8]) -> TabwireResult<InMemoryTable> {
    let (spec, rows) = decode_table(bytes)?;
    Ok(InMemoryTable::new(spec, rows))
}
