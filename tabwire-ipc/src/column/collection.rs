use flatbuffers::{FlatBufferBuilder, ForwardsUOffset, UnionWIPOffset, WIPOffset};
use tabwire_dtype::Shape;
use tabwire_dtype::flatbuffers as fb;
use tabwire_error::{TabwireResult, tabwire_err};
use tabwire_mask::{Mask, MaskBuilder};
use tabwire_scalar::{Cell, CollectionValues};

use crate::column::{ColumnAppender, ColumnData, ElementCodec, read_mask, read_vectors, write_mask};

/// The wire element of a collection column whose collections hold `E` elements.
pub(crate) type CellWire<'a, E> =
    ForwardsUOffset<fb::CollectionCell<'a, <E as ElementCodec>::Wire<'a>>>;

/// Collects one list or set per row for a collection column.
///
/// Lists and sets share this strategy; only the shape of the cells it accepts differs.
pub(crate) struct CollectionColumn<E: ElementCodec> {
    shape: Shape,
    values: Vec<Vec<E::Native>>,
    missing: MaskBuilder,
}

impl<E: ElementCodec> CollectionColumn<E> {
    /// Create an empty column of lists or sets with room for `capacity` rows.
    pub fn with_capacity(shape: Shape, capacity: usize) -> Self {
        debug_assert!(shape.is_collection());
        Self {
            shape,
            values: Vec::with_capacity(capacity),
            missing: MaskBuilder::with_capacity(capacity),
        }
    }

    fn elements<'c>(&self, cell: &'c Cell) -> Option<&'c [E::Native]> {
        let values = match (self.shape, cell) {
            (Shape::List, Cell::List(values)) | (Shape::Set, Cell::Set(values)) => values,
            _ => return None,
        };
        E::collection_from_values(values)
    }
}

impl<E: ElementCodec> ColumnAppender for CollectionColumn<E> {
    fn push(&mut self, cell: &Cell) -> bool {
        if cell.is_missing() {
            self.values.push(vec![E::sentinel()]);
            self.missing.append(true);
            return true;
        }
        match self.elements(cell) {
            Some(elements) => {
                self.values.push(elements.to_vec());
                self.missing.append(false);
                true
            }
            None => false,
        }
    }

    fn finish(self: Box<Self>) -> Box<dyn ColumnData> {
        let Self {
            shape,
            values,
            missing,
        } = *self;
        Box::new(CollectionBuffer::<E> {
            shape,
            values,
            missing: missing.finish(),
        })
    }
}

/// The collections of a list or set column plus its missing flags.
pub(crate) struct CollectionBuffer<E: ElementCodec> {
    shape: Shape,
    values: Vec<Vec<E::Native>>,
    missing: Mask,
}

impl<E: ElementCodec> CollectionBuffer<E> {
    /// Materialize a serialized collection column.
    pub fn read<'a>(
        shape: Shape,
        table: fb::ColumnTable<'a, CellWire<'a, E>>,
    ) -> TabwireResult<Self> {
        let (cells, missing) = read_vectors::<CellWire<'a, E>>(&table)?;
        let missing = read_mask(missing, cells.len())?;

        let values = cells
            .iter()
            .enumerate()
            .map(|(row, cell)| {
                if missing.is_missing(row) {
                    return Ok(Vec::new());
                }
                cell.value()
                    .ok_or_else(|| {
                        tabwire_err!(MalformedBuffer: "Collection cell {row} has no value")
                    })?
                    .iter()
                    .map(E::read_element)
                    .collect::<TabwireResult<Vec<_>>>()
            })
            .collect::<TabwireResult<Vec<_>>>()?;

        Ok(Self {
            shape,
            values,
            missing,
        })
    }

    fn wrap(shape: Shape, elements: Vec<E::Native>) -> Cell {
        let values: CollectionValues = E::collection_into_values(elements);
        match shape {
            Shape::Set => Cell::Set(values),
            _ => Cell::List(values),
        }
    }
}

impl<E: ElementCodec> ColumnData for CollectionBuffer<E> {
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
            Self::wrap(self.shape, self.values[row].clone())
        }
    }

    fn write<'fbb>(
        &self,
        fbb: &mut FlatBufferBuilder<'fbb>,
        serializer: Option<WIPOffset<&'fbb str>>,
    ) -> WIPOffset<UnionWIPOffset> {
        let cells = self
            .values
            .iter()
            .map(|elements| {
                let value = E::write_vector(fbb, elements);
                fb::CollectionCell::create(fbb, value)
            })
            .collect::<Vec<_>>();
        let values = fbb.create_vector(&cells);
        let missing = write_mask(fbb, &self.missing);
        fb::ColumnTable::<CellWire<'fbb, E>>::create(
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
        let Self {
            shape,
            values,
            missing,
        } = *self;
        Box::new(
            values
                .into_iter()
                .enumerate()
                .map(move |(row, elements)| {
                    if missing.is_missing(row) {
                        Cell::Missing
                    } else {
                        Self::wrap(shape, elements)
                    }
                }),
        )
    }
}
