//! Deriving a schema from the values of a table.
//!
//! Hosts that hold untyped data frames have no declared column types. These functions pick the
//! narrowest logical type that holds every value of a column.

use std::sync::Arc;

use tabwire_dtype::{ColumnSpec, ElementType, LogicalType, Shape, TableSpec};
use tabwire_error::{TabwireResult, tabwire_bail, tabwire_err};
use tabwire_scalar::{Cell, CollectionValues, Row};

use crate::source::InMemoryTable;

/// Options for [`infer_table_spec`].
#[derive(Debug, Clone, Default)]
pub struct InferOptions {
    /// The serializer name given to inferred opaque-bytes columns. Empty if unset.
    pub bytes_serializer: Option<Arc<str>>,
}

impl InferOptions {
    pub fn with_bytes_serializer(mut self, serializer: impl Into<Arc<str>>) -> Self {
        self.bytes_serializer = Some(serializer.into());
        self
    }
}

/// The running type of one column.
#[derive(Debug, Default)]
struct ColumnInference {
    shape: Option<Shape>,
    element: Option<ElementType>,
    /// Whether every 64-bit integer seen so far fits in 32 bits.
    narrow_fits: bool,
}

impl ColumnInference {
    fn new() -> Self {
        Self {
            narrow_fits: true,
            ..Default::default()
        }
    }

    fn observe(&mut self, name: &str, cell: &Cell) -> TabwireResult<()> {
        let (shape, element, fits) = match cell {
            Cell::Missing => return Ok(()),
            Cell::Integer64(v) => (
                Shape::Scalar,
                ElementType::Integer64,
                i32::try_from(*v).is_ok(),
            ),
            Cell::List(values) => (Shape::List, values.element_type(), collection_fits(values)),
            Cell::Set(values) => (Shape::Set, values.element_type(), collection_fits(values)),
            _ => {
                let logical_type = cell
                    .logical_type()
                    .ok_or_else(|| tabwire_err!(AssertionFailed: "Present cell without a type"))?;
                (Shape::Scalar, logical_type.element(), true)
            }
        };

        if self.shape.is_some_and(|s| s != shape) {
            tabwire_bail!(
                TypeMismatch: "Column {name} mixes {} and {} values",
                self.logical_type_or_default(),
                cell
            );
        }
        self.element = Some(match (self.element, element) {
            (None, e) => e,
            (Some(current), e) if current == e => e,
            (Some(ElementType::Integer32), ElementType::Integer64)
            | (Some(ElementType::Integer64), ElementType::Integer32) => ElementType::Integer64,
            (Some(current), e) => tabwire_bail!(
                TypeMismatch: "Column {name} mixes {current} and {e} elements"
            ),
        });
        self.shape = Some(shape);
        self.narrow_fits &= fits;
        Ok(())
    }

    fn logical_type_or_default(&self) -> LogicalType {
        let element = match self.element {
            None => ElementType::Utf8,
            Some(ElementType::Integer64) if self.narrow_fits => ElementType::Integer32,
            Some(element) => element,
        };
        LogicalType::new(element, self.shape.unwrap_or(Shape::Scalar))
    }
}

fn collection_fits(values: &CollectionValues) -> bool {
    match values {
        CollectionValues::Integer64(v) => v.iter().all(|v| i32::try_from(*v).is_ok()),
        _ => true,
    }
}

/// Infer the logical type of every column of `rows`.
///
/// A column holding only missing cells becomes a string column. Integer columns are as narrow as
/// their values allow. Any other mix of element types or shapes is a
/// [`TypeMismatch`](tabwire_error::TabwireError::TypeMismatch).
pub fn infer_table_spec<N: Into<Arc<str>>>(
    names: impl IntoIterator<Item = N>,
    rows: &[Row],
    options: &InferOptions,
) -> TabwireResult<TableSpec> {
    let names = names.into_iter().map(Into::into).collect::<Vec<Arc<str>>>();
    let mut columns = names
        .iter()
        .map(|_| ColumnInference::new())
        .collect::<Vec<_>>();

    for row in rows {
        if row.len() != names.len() {
            tabwire_bail!(
                TypeMismatch: "Row {} has {} cells but the table has {} columns",
                row.key(),
                row.len(),
                names.len()
            );
        }
        for ((name, column), cell) in names.iter().zip(columns.iter_mut()).zip(row.cells()) {
            column.observe(name, cell)?;
        }
    }

    let serializer = options.bytes_serializer.clone().unwrap_or_else(|| Arc::from(""));
    let specs = names.into_iter().zip(columns).map(|(name, column)| {
        let logical_type = column.logical_type_or_default();
        log::trace!("Inferred column {name} as {logical_type}");
        if logical_type.carries_serializer_name() {
            ColumnSpec::new_bytes(name, logical_type, serializer.clone())
        } else {
            ColumnSpec::new(name, logical_type)
        }
    });
    TableSpec::try_new(specs)
}

/// Infer the schema of `rows` and convert integer cells to the inferred width.
///
/// Every conversion is lossless: 64-bit integers are narrowed only when the whole column fits in
/// 32 bits, and 32-bit integers are widened when it does not.
pub fn infer_table<N: Into<Arc<str>>>(
    names: impl IntoIterator<Item = N>,
    rows: Vec<Row>,
    options: &InferOptions,
) -> TabwireResult<InMemoryTable> {
    let spec = infer_table_spec(names, &rows, options)?;
    let rows = rows
        .into_iter()
        .map(|row| {
            let (key, cells) = row.into_parts();
            let cells = cells
                .into_iter()
                .zip(spec.column_types())
                .map(|(cell, logical_type)| conform_integer_width(cell, logical_type.element()))
                .collect::<TabwireResult<Vec<_>>>()?;
            Ok(Row::new(key, cells))
        })
        .collect::<TabwireResult<Vec<_>>>()?;
    Ok(InMemoryTable::new(spec, rows))
}

fn conform_integer_width(cell: Cell, element: ElementType) -> TabwireResult<Cell> {
    Ok(match (cell, element) {
        (Cell::Integer64(v), ElementType::Integer32) => Cell::Integer32(narrow(v)?),
        (Cell::Integer32(v), ElementType::Integer64) => Cell::Integer64(i64::from(v)),
        (Cell::List(values), element) => Cell::List(conform_collection(values, element)?),
        (Cell::Set(values), element) => Cell::Set(conform_collection(values, element)?),
        (cell, _) => cell,
    })
}

fn conform_collection(
    values: CollectionValues,
    element: ElementType,
) -> TabwireResult<CollectionValues> {
    Ok(match (values, element) {
        (CollectionValues::Integer64(v), ElementType::Integer32) => CollectionValues::Integer32(
            v.into_iter().map(narrow).collect::<TabwireResult<Vec<_>>>()?,
        ),
        (CollectionValues::Integer32(v), ElementType::Integer64) => {
            CollectionValues::Integer64(v.into_iter().map(i64::from).collect())
        }
        (values, _) => values,
    })
}

fn narrow(value: i64) -> TabwireResult<i32> {
    i32::try_from(value)
        .map_err(|_| tabwire_err!(AssertionFailed: "Integer {value} does not fit in 32 bits"))
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use rstest::rstest;

    use super::*;

    fn rows(cells: Vec<Cell>) -> Vec<Row> {
        cells
            .into_iter()
            .enumerate()
            .map(|(i, cell)| Row::new(format!("Row{i}"), [cell]))
            .collect()
    }

    fn infer_one(cells: Vec<Cell>) -> TabwireResult<LogicalType> {
        let spec = infer_table_spec(["c"], &rows(cells), &InferOptions::default())?;
        Ok(spec.columns()[0].logical_type())
    }

    #[rstest]
    #[case(vec![Cell::Missing, Cell::Missing], LogicalType::String)]
    #[case(vec![], LogicalType::String)]
    #[case(vec![Cell::from(1_i64), Cell::from(-5_i64)], LogicalType::Integer)]
    #[case(vec![Cell::from(1_i32), Cell::from(i64::MAX)], LogicalType::Long)]
    #[case(vec![Cell::from(1_i32), Cell::from(2_i64)], LogicalType::Integer)]
    #[case(vec![Cell::Missing, Cell::from(true)], LogicalType::Boolean)]
    #[case(vec![Cell::from(0.5)], LogicalType::Double)]
    #[case(vec![Cell::list(vec![1_i64]), Cell::list(vec![i64::MIN])], LogicalType::LongList)]
    #[case(vec![Cell::set(vec![1_i64, 2])], LogicalType::IntegerSet)]
    #[case(vec![Cell::list(vec!["a"]), Cell::Missing], LogicalType::StringList)]
    fn infers(#[case] cells: Vec<Cell>, #[case] expected: LogicalType) {
        assert_eq!(infer_one(cells).unwrap(), expected);
    }

    #[rstest]
    #[case(vec![Cell::from(1_i32), Cell::from("one")])]
    #[case(vec![Cell::from(1_i32), Cell::list(vec![1_i32])])]
    #[case(vec![Cell::list(vec![1_i32]), Cell::set(vec![1_i32])])]
    #[case(vec![Cell::from(1.0), Cell::from(1_i64)])]
    fn rejects_mixed_columns(#[case] cells: Vec<Cell>) {
        let err = infer_one(cells).unwrap_err();
        assert!(err.is_type_mismatch());
        assert!(err.to_string().contains("Column c"), "{err}");
    }

    #[test]
    fn bytes_columns_carry_the_configured_serializer() {
        let cells = vec![Cell::Bytes(Bytes::from_static(b"\x01"))];
        let spec = infer_table_spec(["b"], &rows(cells.clone()), &InferOptions::default()).unwrap();
        assert_eq!(spec.columns()[0].serializer().map(|s| s.as_ref()), Some(""));

        let options = InferOptions::default().with_bytes_serializer("png");
        let spec = infer_table_spec(["b"], &rows(cells), &options).unwrap();
        assert_eq!(spec.columns()[0].serializer().map(|s| s.as_ref()), Some("png"));
    }

    #[test]
    fn infer_table_converts_integer_widths() {
        let table = infer_table(
            ["narrow", "wide"],
            vec![
                Row::new("r0", [Cell::from(1_i64), Cell::list(vec![1_i32])]),
                Row::new("r1", [Cell::Missing, Cell::list(vec![i64::MAX])]),
            ],
            &InferOptions::default(),
        )
        .unwrap();

        assert_eq!(
            table.spec().column_types().collect::<Vec<_>>(),
            vec![LogicalType::Integer, LogicalType::LongList]
        );
        assert_eq!(
            table.rows()[0].cells(),
            &[Cell::from(1_i32), Cell::list(vec![1_i64])]
        );
        assert_eq!(
            table.rows()[1].cells(),
            &[Cell::Missing, Cell::list(vec![i64::MAX])]
        );
    }

    #[test]
    fn rows_must_match_the_column_count() {
        let rows = vec![Row::new("r0", [Cell::from(1_i32)])];
        let err = infer_table_spec(["a", "b"], &rows, &InferOptions::default()).unwrap_err();
        assert!(err.is_type_mismatch());
    }
}
