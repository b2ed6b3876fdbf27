use flatbuffers::{FlatBufferBuilder, UnionWIPOffset, WIPOffset};
use tabwire_dtype::flatbuffers as fb;
use tabwire_error::TabwireResult;
use tabwire_mask::{Mask, MaskBuilder};
use tabwire_scalar::Cell;

use crate::column::{ColumnAppender, ColumnData, ElementCodec, read_mask, read_vectors, write_mask};

/// Collects one value per row for a scalar column.
pub(crate) struct ScalarColumn<E: ElementCodec> {
    values: Vec<E::Native>,
    missing: MaskBuilder,
}

impl<E: ElementCodec> ScalarColumn<E> {
    /// Create an empty column with room for `capacity` rows.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
            missing: MaskBuilder::with_capacity(capacity),
        }
    }
}

impl<E: ElementCodec> ColumnAppender for ScalarColumn<E> {
    fn push(&mut self, cell: &Cell) -> bool {
        if cell.is_missing() {
            self.values.push(E::sentinel());
            self.missing.append(true);
            return true;
        }
        match E::scalar_from_cell(cell) {
            Some(value) => {
                self.values.push(value);
                self.missing.append(false);
                true
            }
            None => false,
        }
    }

    fn finish(self: Box<Self>) -> Box<dyn ColumnData> {
        let Self { values, missing } = *self;
        Box::new(ScalarBuffer::<E> {
            values,
            missing: missing.finish(),
        })
    }
}

/// The dense values of a scalar column plus its missing flags.
pub(crate) struct ScalarBuffer<E: ElementCodec> {
    values: Vec<E::Native>,
    missing: Mask,
}

impl<E: ElementCodec> ScalarBuffer<E> {
    /// Materialize a serialized scalar column.
    pub fn read<'a>(table: fb::ColumnTable<'a, E::Wire<'a>>) -> TabwireResult<Self> {
        let (values, missing) = read_vectors::<E::Wire<'a>>(&table)?;
        let missing = read_mask(missing, values.len())?;

        let values = values
            .iter()
            .enumerate()
            .map(|(row, wire)| {
                if missing.is_missing(row) {
                    Ok(E::sentinel())
                } else {
                    E::read_element(wire)
                }
            })
            .collect::<TabwireResult<Vec<_>>>()?;

        Ok(Self { values, missing })
    }
}

impl<E: ElementCodec> ColumnData for ScalarBuffer<E> {
    fn len(&self) -> usize {
        self.values.len()
    }

    fn missing(&self) -> &Mask {
        &self.missing
    }

    fn cell(&self, row: usize) -> Cell {
        if self.missing.is_missing(row) {
            Cell::Missing
        } else {
            E::scalar_into_cell(self.values[row].clone())
        }
    }

    fn write<'fbb>(
        &self,
        fbb: &mut FlatBufferBuilder<'fbb>,
        serializer: Option<WIPOffset<&'fbb str>>,
    ) -> WIPOffset<UnionWIPOffset> {
        let values = E::write_vector(fbb, &self.values);
        let missing = write_mask(fbb, &self.missing);
        fb::ColumnTable::<E::Wire<'fbb>>::create(
            fbb,
            &fb::ColumnTableArgs {
                values,
                missing,
                serializer,
            },
        )
        .as_union_value()
    }

    fn into_cells(self: Box<Self>) -> Box<dyn Iterator<Item = Cell>> {
        let Self { values, missing } = *self;
        Box::new(
            values
                .into_iter()
                .enumerate()
                .map(move |(row, value)| {
                    if missing.is_missing(row) {
                        Cell::Missing
                    } else {
                        E::scalar_into_cell(value)
                    }
                }),
        )
    }
}
