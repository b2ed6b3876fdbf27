//! Producers and consumers of rows.

use std::vec::IntoIter;

use tabwire_dtype::TableSpec;
use tabwire_error::TabwireResult;
use tabwire_scalar::Row;

/// A lazy, single-pass producer of the rows of a table.
pub trait RowSource {
    /// The columns every row conforms to.
    fn table_spec(&self) -> &TableSpec;

    /// The next row, or `None` once the source is exhausted.
    fn next_row(&mut self) -> Option<TabwireResult<Row>>;

    /// The number of rows left, if known. Used only to size buffers.
    fn remaining_rows(&self) -> Option<usize> {
        None
    }
}

impl<S: RowSource + ?Sized> RowSource for &mut S {
    fn table_spec(&self) -> &TableSpec {
        (**self).table_spec()
    }

    fn next_row(&mut self) -> Option<TabwireResult<Row>> {
        (**self).next_row()
    }

    fn remaining_rows(&self) -> Option<usize> {
        (**self).remaining_rows()
    }
}

/// A consumer of decoded rows.
pub trait RowSink {
    /// Accept the next row. Rows arrive in table order.
    fn add_row(&mut self, row: Row) -> TabwireResult<()>;
}

impl RowSink for Vec<Row> {
    fn add_row(&mut self, row: Row) -> TabwireResult<()> {
        self.push(row);
        Ok(())
    }
}

/// Adapts a schema and any iterator of rows into a [`RowSource`].
pub struct VecRowSource<I> {
    spec: TableSpec,
    rows: I,
}

impl<I: Iterator<Item = Row>> VecRowSource<I> {
    /// Create a source yielding `rows` under `spec`.
    pub fn new(spec: TableSpec, rows: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            spec,
            rows: rows.into_iter(),
        }
    }
}

impl<I: Iterator<Item = Row>> RowSource for VecRowSource<I> {
    fn table_spec(&self) -> &TableSpec {
        &self.spec
    }

    fn next_row(&mut self) -> Option<TabwireResult<Row>> {
        self.rows.next().map(Ok)
    }

    fn remaining_rows(&self) -> Option<usize> {
        match self.rows.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(lower),
            _ => None,
        }
    }
}

/// A fully materialized table.
///
/// Collects decoded rows as a [`RowSink`] and replays them through [`InMemoryTable::rows_source`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InMemoryTable {
    spec: TableSpec,
    rows: Vec<Row>,
}

impl InMemoryTable {
    /// Create a table from a schema and its rows.
    pub fn new(spec: TableSpec, rows: impl IntoIterator<Item = Row>) -> Self {
        Self {
            spec,
            rows: rows.into_iter().collect(),
        }
    }

    /// Create an empty table with the given schema, ready to collect rows.
    pub fn with_spec(spec: TableSpec) -> Self {
        Self {
            spec,
            rows: Vec::new(),
        }
    }

    pub fn spec(&self) -> &TableSpec {
        &self.spec
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn set_spec(&mut self, spec: TableSpec) {
        self.spec = spec;
    }

    /// A source replaying clones of the rows.
    pub fn rows_source(&self) -> VecRowSource<IntoIter<Row>> {
        VecRowSource::new(self.spec.clone(), self.rows.clone())
    }

    pub fn into_parts(self) -> (TableSpec, Vec<Row>) {
        (self.spec, self.rows)
    }
}

impl RowSink for InMemoryTable {
    fn add_row(&mut self, row: Row) -> TabwireResult<()> {
        self.rows.push(row);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tabwire_dtype::LogicalType;
    use tabwire_scalar::Cell;

    use super::*;

    #[test]
    fn source_reports_remaining_rows() {
        let spec = TableSpec::builder()
            .column("id", LogicalType::Integer)
            .build()
            .unwrap();
        let table = InMemoryTable::new(
            spec.clone(),
            [
                Row::new("r1", [Cell::from(1_i32)]),
                Row::new("r2", [Cell::Missing]),
            ],
        );

        let mut source = table.rows_source();
        assert_eq!(source.table_spec(), &spec);
        assert_eq!(source.remaining_rows(), Some(2));
        assert_eq!(source.next_row().unwrap().unwrap().key(), "r1");
        assert_eq!(source.remaining_rows(), Some(1));
        assert_eq!(source.next_row().unwrap().unwrap().key(), "r2");
        assert!(source.next_row().is_none());
    }

    #[test]
    fn unsized_iterators_have_no_hint() {
        let rows = (0..3).map(|i| Row::new(i.to_string(), [])).filter(|_| true);
        let source = VecRowSource::new(TableSpec::empty(), rows);
        assert_eq!(source.remaining_rows(), None);
    }

    #[test]
    fn sink_collects_rows() {
        let mut table = InMemoryTable::default();
        table.add_row(Row::new("a", [])).unwrap();
        table.add_row(Row::new("b", [])).unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows()[1].key(), "b");
    }
}
