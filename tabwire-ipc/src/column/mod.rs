//! Column codecs.
//!
//! Every logical type is handled by one of two strategies: [`ScalarColumn`] for one value per
//! row and [`CollectionColumn`] for lists and sets. Both are generic over an [`ElementCodec`],
//! so the eighteen logical types reduce to six element codecs.

mod collection;
mod element;
mod scalar;

use std::fmt::{Debug, Formatter};

use flatbuffers::{FlatBufferBuilder, Follow, UnionWIPOffset, Vector, WIPOffset};
use tabwire_dtype::flatbuffers::{self as fb, read_column_spec};
use tabwire_dtype::{ColumnSpec, Shape};
use tabwire_error::{TabwireError, TabwireResult, tabwire_bail, tabwire_err};
use tabwire_mask::Mask;
use tabwire_scalar::Cell;

pub use element::*;

use crate::column::collection::{CellWire, CollectionBuffer, CollectionColumn};
use crate::column::scalar::{ScalarBuffer, ScalarColumn};
use crate::match_each_element_codec;

/// Accumulates the cells of one column during an encode pass.
pub(crate) trait ColumnAppender {
    /// Append a cell, returning `false` if it does not belong in this column.
    fn push(&mut self, cell: &Cell) -> bool;

    fn finish(self: Box<Self>) -> Box<dyn ColumnData>;
}

/// The materialized values and missing flags of one column.
pub(crate) trait ColumnData {
    fn len(&self) -> usize;

    fn missing(&self) -> &Mask;

    fn cell(&self, row: usize) -> Cell;

    fn write<'fbb>(
        &self,
        fbb: &mut FlatBufferBuilder<'fbb>,
        serializer: Option<WIPOffset<&'fbb str>>,
    ) -> WIPOffset<UnionWIPOffset>;

    fn into_cells(self: Box<Self>) -> Box<dyn Iterator<Item = Cell>>;
}

/// Builds one column of a table, row by row.
pub struct ColumnBuilder {
    spec: ColumnSpec,
    appender: Box<dyn ColumnAppender>,
    len: usize,
}

impl ColumnBuilder {
    /// Create a builder for the column described by `spec`, with room for `capacity` rows.
    pub fn new(spec: &ColumnSpec, capacity: usize) -> Self {
        let logical_type = spec.logical_type();
        let appender: Box<dyn ColumnAppender> =
            match_each_element_codec!(logical_type.element(), |E| {
                match logical_type.shape() {
                    Shape::Scalar => Box::new(ScalarColumn::<E>::with_capacity(capacity)),
                    shape => Box::new(CollectionColumn::<E>::with_capacity(shape, capacity)),
                }
            });

        Self {
            spec: spec.clone(),
            appender,
            len: 0,
        }
    }

    /// The column being built.
    pub fn spec(&self) -> &ColumnSpec {
        &self.spec
    }

    /// The number of cells appended so far.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no cells have been appended.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append the next cell of the column.
    ///
    /// A missing cell is accepted by every column. Any other cell must have exactly the column's
    /// logical type; values are never converted.
    pub fn push(&mut self, cell: &Cell) -> TabwireResult<()> {
        if !self.appender.push(cell) {
            tabwire_bail!(
                TypeMismatch: "Column {} of type {} cannot hold cell {}",
                self.spec.name(),
                self.spec.logical_type(),
                cell
            );
        }
        self.len += 1;
        Ok(())
    }

    /// Stop appending and hand over the column's values.
    pub fn finish(self) -> ColumnBuffer {
        ColumnBuffer {
            spec: self.spec,
            data: self.appender.finish(),
        }
    }
}

/// The values and missing flags of one column, ready to be written or turned back into cells.
pub struct ColumnBuffer {
    spec: ColumnSpec,
    data: Box<dyn ColumnData>,
}

impl Debug for ColumnBuffer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnBuffer")
            .field("spec", &self.spec)
            .field("len", &self.len())
            .field("missing", self.missing())
            .finish()
    }
}

impl ColumnBuffer {
    /// Materialize the serialized column called `name`.
    ///
    /// The column is classified exactly as the schema extractor classifies it. `row_count` is the
    /// number of row keys in the table; a column with more values than that is malformed.
    pub fn read(name: &str, column: fb::Column<'_>, row_count: usize) -> TabwireResult<Self> {
        let spec = read_column_spec(name, column)?;
        let logical_type = spec.logical_type();

        let data: Box<dyn ColumnData> = match_each_element_codec!(logical_type.element(), |E| {
            match logical_type.shape() {
                Shape::Scalar => {
                    // SAFETY: the verifier checked the payload as the table the tag selects,
                    // whose values are E's wire elements.
                    let table =
                        unsafe { column.column_as_unchecked::<<E as ElementCodec>::Wire<'_>>() }
                            .ok_or_else(|| no_payload(name))?;
                    Box::new(ScalarBuffer::<E>::read(table)?)
                }
                shape => {
                    // SAFETY: the verifier checked the payload as the table the tag selects,
                    // whose values are collection cells of E's wire elements.
                    let table = unsafe { column.column_as_unchecked::<CellWire<'_, E>>() }
                        .ok_or_else(|| no_payload(name))?;
                    Box::new(CollectionBuffer::<E>::read(shape, table)?)
                }
            }
        });

        if data.len() > row_count {
            tabwire_bail!(
                MalformedBuffer: "Column {name} has {} values but only {row_count} row keys",
                data.len()
            );
        }
        log::trace!("Read column {name} of type {logical_type} with {} rows", data.len());

        Ok(Self { spec, data })
    }

    /// The column this buffer holds.
    pub fn spec(&self) -> &ColumnSpec {
        &self.spec
    }

    /// The number of rows.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.data.len() == 0
    }

    /// The missing flags, one per row.
    pub fn missing(&self) -> &Mask {
        self.data.missing()
    }

    /// The cell of row `row`.
    ///
    /// ## Panics
    ///
    /// Panics if `row` is out of bounds.
    pub fn cell(&self, row: usize) -> Cell {
        self.data.cell(row)
    }

    /// Consume the buffer, yielding its cells in row order.
    pub fn into_cells(self) -> impl Iterator<Item = Cell> {
        self.data.into_cells()
    }

    /// Write the column as an entry of the root table.
    pub fn write<'fbb>(&self, fbb: &mut FlatBufferBuilder<'fbb>) -> WIPOffset<fb::Column<'fbb>> {
        let serializer = self.spec.serializer().map(|s| fbb.create_string(s));
        let payload = self.data.write(fbb, serializer);
        fb::Column::create(fbb, self.spec.logical_type().id(), payload)
    }
}

fn no_payload(name: &str) -> TabwireError {
    tabwire_err!(MalformedBuffer: "Column {name} has no payload")
}

pub(crate) fn read_vectors<'a, V: Follow<'a> + 'a>(
    table: &fb::ColumnTable<'a, V>,
) -> TabwireResult<(Vector<'a, V>, Vector<'a, bool>)> {
    let values = table
        .values()
        .ok_or_else(|| tabwire_err!(MalformedBuffer: "Column has no values vector"))?;
    let missing = table
        .missing()
        .ok_or_else(|| tabwire_err!(MalformedBuffer: "Column has no missing vector"))?;
    Ok((values, missing))
}

/// Read the missing vector of a column holding `len` values.
pub(crate) fn read_mask(missing: Vector<'_, bool>, len: usize) -> TabwireResult<Mask> {
    if missing.len() != len {
        tabwire_bail!(
            MalformedBuffer: "Column has {len} values but {} missing flags",
            missing.len()
        );
    }
    Ok(missing.iter().collect())
}

pub(crate) fn write_mask<'fbb>(
    fbb: &mut FlatBufferBuilder<'fbb>,
    mask: &Mask,
) -> WIPOffset<Vector<'fbb, bool>> {
    let flags = mask.iter_bools(|iter| iter.collect::<Vec<_>>());
    fbb.create_vector(&flags)
}

#[cfg(test)]
mod tests {
    use enum_iterator::all;
    use flatbuffers::root;
    use tabwire_dtype::LogicalType;

    use super::*;
    use crate::missing::missing_cell_value;

    /// Write a single column as the root of a buffer and read it back.
    fn round_trip(spec: &ColumnSpec, cells: &[Cell]) -> ColumnBuffer {
        let mut builder = ColumnBuilder::new(spec, cells.len());
        for cell in cells {
            builder.push(cell).unwrap();
        }
        let buffer = builder.finish();

        let mut fbb = FlatBufferBuilder::new();
        let column = buffer.write(&mut fbb);
        fbb.finish_minimal(column);
        let column = root::<fb::Column>(fbb.finished_data()).unwrap();
        ColumnBuffer::read(spec.name(), column, cells.len()).unwrap()
    }

    fn spec_for(logical_type: LogicalType) -> ColumnSpec {
        if logical_type.carries_serializer_name() {
            ColumnSpec::new_bytes("c", logical_type, "raw")
        } else {
            ColumnSpec::new("c", logical_type)
        }
    }

    #[test]
    fn every_type_round_trips_a_missing_cell() {
        for logical_type in all::<LogicalType>() {
            let spec = spec_for(logical_type);
            let present = missing_cell_value(logical_type);
            let column = round_trip(&spec, &[present.clone(), Cell::Missing]);

            assert_eq!(column.spec(), &spec);
            assert_eq!(column.len(), 2);
            assert_eq!(column.cell(0), present, "{logical_type}");
            assert_eq!(column.cell(1), Cell::Missing, "{logical_type}");
            assert_eq!(column.missing(), &Mask::from_iter([false, true]));
        }
    }

    #[test]
    fn sentinel_values_are_not_missing() {
        let spec = ColumnSpec::new("n", LogicalType::Integer);
        let column = round_trip(&spec, &[Cell::from(i32::MIN), Cell::Missing]);
        assert_eq!(
            column.into_cells().collect::<Vec<_>>(),
            vec![Cell::Integer32(i32::MIN), Cell::Missing]
        );
    }

    #[test]
    fn rejects_mismatched_cells() {
        let mut builder = ColumnBuilder::new(&ColumnSpec::new("id", LogicalType::Integer), 1);
        let err = builder.push(&Cell::from(1_i64)).unwrap_err();
        assert!(err.is_type_mismatch());
        assert!(builder.is_empty());

        let mut builder = ColumnBuilder::new(&ColumnSpec::new("tags", LogicalType::StringSet), 1);
        assert!(builder.push(&Cell::list(vec!["a"])).unwrap_err().is_type_mismatch());
        builder.push(&Cell::set(vec!["a"])).unwrap();
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn collections_keep_order_and_duplicates() {
        let spec = ColumnSpec::new("tags", LogicalType::StringList);
        let cells = [
            Cell::list(vec!["a", "b", "a"]),
            Cell::list(Vec::<String>::new()),
        ];
        let column = round_trip(&spec, &cells);
        assert_eq!(column.into_cells().collect::<Vec<_>>(), cells.to_vec());
    }

    #[test]
    fn column_longer_than_row_keys_is_malformed() {
        let spec = ColumnSpec::new("x", LogicalType::Double);
        let mut builder = ColumnBuilder::new(&spec, 2);
        builder.push(&Cell::from(1.0)).unwrap();
        builder.push(&Cell::from(2.0)).unwrap();

        let mut fbb = FlatBufferBuilder::new();
        let column = builder.finish().write(&mut fbb);
        fbb.finish_minimal(column);
        let column = root::<fb::Column>(fbb.finished_data()).unwrap();
        let err = ColumnBuffer::read("x", column, 1).unwrap_err();
        assert!(err.is_malformed());
        assert!(err.to_string().contains("only 1 row keys"), "{err}");
        assert_eq!(
            ColumnBuffer::read("x", column, 2).unwrap().missing(),
            &Mask::none_missing(2)
        );
    }
}
