//! The values written in place of missing cells.
//!
//! A missing cell still occupies a slot in its column's dense value vector, so every element type
//! has a sentinel to fill it. The sentinel carries no meaning: readers consult the missing flags
//! and never the value.

use tabwire_dtype::{LogicalType, Shape};
use tabwire_scalar::Cell;

use crate::column::ElementCodec;
use crate::match_each_element_codec;

/// The sentinel of `logical_type`, as a present cell.
///
/// Collection types yield a one-element collection holding the element sentinel.
pub fn missing_cell_value(logical_type: LogicalType) -> Cell {
    match_each_element_codec!(logical_type.element(), |E| {
        match logical_type.shape() {
            Shape::Scalar => E::scalar_into_cell(E::sentinel()),
            Shape::List => Cell::List(E::collection_into_values(vec![E::sentinel()])),
            Shape::Set => Cell::Set(E::collection_into_values(vec![E::sentinel()])),
        }
    })
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use enum_iterator::all;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(LogicalType::Boolean, Cell::Boolean(false))]
    #[case(LogicalType::Integer, Cell::Integer32(i32::MIN))]
    #[case(LogicalType::Long, Cell::Integer64(i64::MIN))]
    #[case(LogicalType::Double, Cell::Float64(f64::NAN))]
    #[case(LogicalType::String, Cell::from("Missing Value"))]
    #[case(LogicalType::Bytes, Cell::Bytes(Bytes::from_static(&[0x80])))]
    #[case(LogicalType::IntegerList, Cell::list(vec![i32::MIN]))]
    #[case(LogicalType::StringSet, Cell::set(vec!["Missing Value"]))]
    fn sentinels(#[case] logical_type: LogicalType, #[case] expected: Cell) {
        assert_eq!(missing_cell_value(logical_type), expected);
    }

    #[test]
    fn sentinel_conforms_to_its_type() {
        for logical_type in all::<LogicalType>() {
            let cell = missing_cell_value(logical_type);
            assert!(!cell.is_missing());
            assert_eq!(cell.logical_type(), Some(logical_type));
        }
    }
}
