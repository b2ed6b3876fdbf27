use bytes::Bytes;
use flatbuffers::{FlatBufferBuilder, WIPOffset};
use itertools::Itertools;
use tabwire_dtype::TableSpec;
use tabwire_dtype::flatbuffers as fb;
use tabwire_error::{ContextExt, TabwireResult, tabwire_bail};
use tabwire_flatbuffers::{FlatBufferRoot, WriteFlatBuffer, WriteFlatBufferExt};

use crate::column::{ColumnBuffer, ColumnBuilder};
use crate::options::EncodeOptions;
use crate::source::RowSource;

/// Turns a table of rows into a single columnar buffer.
#[derive(Debug, Clone, Default)]
pub struct TableEncoder {
    options: EncodeOptions,
}

impl TableEncoder {
    pub fn new(options: EncodeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EncodeOptions {
        &self.options
    }

    /// Drain `source` and serialize its rows.
    ///
    /// Rows are consumed exactly once. Every cell must be missing or of its column's logical type;
    /// the first cell that is not, or a row with the wrong number of cells, fails the whole
    /// encode with [`TypeMismatch`](tabwire_error::TabwireError::TypeMismatch).
    pub fn encode(&mut self, mut source: impl RowSource) -> TabwireResult<Bytes> {
        let spec = source.table_spec().clone();
        let capacity = source.remaining_rows().unwrap_or_default();

        let mut builders = spec
            .columns()
            .iter()
            .map(|column| ColumnBuilder::new(column, capacity))
            .collect::<Vec<_>>();
        let mut row_keys = Vec::with_capacity(capacity);

        while let Some(row) = source.next_row() {
            self.options.check_cancelled()?;
            let row = row?;
            if row.len() != spec.len() {
                tabwire_bail!(
                    TypeMismatch: "Row {} has {} cells but the table has {} columns",
                    row.key(),
                    row.len(),
                    spec.len()
                );
            }

            let (key, cells) = row.into_parts();
            for (builder, cell) in builders.iter_mut().zip(cells.iter()) {
                builder.push(cell).context(|| format!("Row {key}"))?;
            }
            row_keys.push(key);
        }
        self.options.check_cancelled()?;

        let table = EncodedTable {
            spec,
            row_keys,
            columns: builders.into_iter().map(ColumnBuilder::finish).collect(),
        };
        let bytes = table.write_flatbuffer_bytes_with_capacity(self.options.initial_capacity);
        log::debug!(
            "Encoded {} rows of columns [{}] into {} bytes",
            table.row_keys.len(),
            table.spec.column_names().join(", "),
            bytes.len()
        );
        Ok(bytes)
    }
}

/// Encode the rows of `source` with the default options.
pub fn encode_table(source: impl RowSource) -> TabwireResult<Bytes> {
    TableEncoder::default().encode(source)
}

/// A fully transposed table, ready to be written as the root of a buffer.
struct EncodedTable {
    spec: TableSpec,
    row_keys: Vec<String>,
    columns: Vec<ColumnBuffer>,
}

impl FlatBufferRoot for EncodedTable {}

impl WriteFlatBuffer for EncodedTable {
    type Target<'a> = fb::WireTable<'a>;

    fn write_flatbuffer<'fb>(
        &self,
        fbb: &mut FlatBufferBuilder<'fb>,
    ) -> WIPOffset<Self::Target<'fb>> {
        let columns = self
            .columns
            .iter()
            .map(|column| column.write(fbb))
            .collect::<Vec<_>>();
        let columns = fbb.create_vector(&columns);

        let col_names = self
            .spec
            .column_names()
            .map(|name| fbb.create_string(name))
            .collect::<Vec<_>>();
        let col_names = fbb.create_vector(&col_names);

        let row_keys = self
            .row_keys
            .iter()
            .map(|key| fbb.create_string(key))
            .collect::<Vec<_>>();
        let row_keys = fbb.create_vector(&row_keys);

        fb::WireTable::create(
            fbb,
            &fb::WireTableArgs {
                row_keys,
                col_names,
                columns,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use tabwire_dtype::LogicalType;
    use tabwire_scalar::{Cell, Row};

    use super::*;
    use crate::options::CancellationToken;
    use crate::source::VecRowSource;

    fn id_spec() -> TableSpec {
        TableSpec::builder()
            .column("id", LogicalType::Integer)
            .build()
            .unwrap()
    }

    #[test]
    fn encoding_is_deterministic() {
        let rows = vec![
            Row::new("r1", [Cell::from(1_i32)]),
            Row::new("r2", [Cell::Missing]),
        ];
        let first = encode_table(VecRowSource::new(id_spec(), rows.clone())).unwrap();
        let second = encode_table(VecRowSource::new(id_spec(), rows)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn rejects_rows_of_the_wrong_width() {
        let rows = vec![Row::new("r1", [Cell::from(1_i32), Cell::from(2_i32)])];
        let err = encode_table(VecRowSource::new(id_spec(), rows)).unwrap_err();
        assert!(err.is_type_mismatch());
    }

    #[test]
    fn mismatched_cell_names_its_row() {
        let rows = vec![
            Row::new("r1", [Cell::from(1_i32)]),
            Row::new("r2", [Cell::from("two")]),
        ];
        let err = encode_table(VecRowSource::new(id_spec(), rows)).unwrap_err();
        assert!(err.is_type_mismatch());
        assert!(err.to_string().contains("r2"), "{err}");
    }

    #[test]
    fn cancelled_before_first_row() {
        let token = CancellationToken::new();
        token.cancel();
        let mut encoder = TableEncoder::new(EncodeOptions::default().with_cancellation(token));
        let rows = vec![Row::new("r1", [Cell::from(1_i32)])];
        let err = encoder.encode(VecRowSource::new(id_spec(), rows)).unwrap_err();
        assert!(err.is_cancelled());
    }

    #[test]
    fn source_errors_propagate() {
        struct Failing(TableSpec);

        impl RowSource for Failing {
            fn table_spec(&self) -> &TableSpec {
                &self.0
            }

            fn next_row(&mut self) -> Option<TabwireResult<Row>> {
                Some(Err(tabwire_error::tabwire_err!("source failed")))
            }
        }

        let err = encode_table(Failing(id_spec())).unwrap_err();
        assert!(err.to_string().contains("source failed"));
    }
}
