#![allow(clippy::unwrap_used)]

use std::sync::Once;

use bytes::Bytes;
use enum_iterator::all;
use log::LevelFilter;
use rstest::rstest;
use simplelog::{Config, TestLogger};
use tabwire_dtype::flatbuffers::column_types_from_bytes;
use tabwire_dtype::{ColumnSpec, LogicalType, TableSpec};
use tabwire_error::TabwireResult;
use tabwire_flatbuffers::ReadFlatBuffer;
use tabwire_ipc::{
    CancellationToken, DecodeOptions, EncodeOptions, InMemoryTable, InferOptions, RowSink,
    RowSource, TableDecoder, TableEncoder, VecRowSource, decode_table, encode_table, infer_table,
    missing_cell_value,
};
use tabwire_scalar::{Cell, Row};

static LOGGER: Once = Once::new();

fn init_logging() {
    LOGGER.call_once(|| {
        TestLogger::init(LevelFilter::Trace, Config::default()).ok();
    });
}

fn round_trip(table: &InMemoryTable) -> InMemoryTable {
    init_logging();
    let bytes = encode_table(table.rows_source()).unwrap();
    let (spec, rows) = decode_table(&bytes).unwrap();
    InMemoryTable::new(spec, rows)
}

fn people() -> InMemoryTable {
    let spec = TableSpec::builder()
        .column("id", LogicalType::Integer)
        .column("name", LogicalType::String)
        .build()
        .unwrap();
    InMemoryTable::new(
        spec,
        [
            Row::new("Row0", [Cell::from(1_i32), Cell::from("a")]),
            Row::new("Row1", [Cell::Missing, Cell::from("b")]),
        ],
    )
}

#[test]
fn missing_cells_survive() {
    let table = people();
    assert_eq!(round_trip(&table), table);
}

#[test]
fn lists_keep_order_and_duplicates() {
    let spec = TableSpec::builder()
        .column("tags", LogicalType::StringList)
        .build()
        .unwrap();
    let table = InMemoryTable::new(spec, [Row::new("Row0", [Cell::list(vec!["a", "b", "a"])])]);
    assert_eq!(round_trip(&table), table);
}

#[rstest]
#[case(LogicalType::Integer, Cell::from(i32::MIN))]
#[case(LogicalType::Long, Cell::from(i64::MIN))]
#[case(LogicalType::Double, Cell::from(f64::NAN))]
#[case(LogicalType::Boolean, Cell::from(false))]
#[case(LogicalType::String, Cell::from("Missing Value"))]
#[case(LogicalType::IntegerSet, Cell::set(vec![i32::MIN]))]
fn genuine_sentinel_values_are_not_missing(#[case] logical_type: LogicalType, #[case] cell: Cell) {
    let spec = TableSpec::try_new([ColumnSpec::new("v", logical_type)]).unwrap();
    let table = InMemoryTable::new(spec, [Row::new("Row0", [cell.clone()])]);

    let decoded = round_trip(&table);
    assert_eq!(decoded.rows()[0].cells(), &[cell]);
    assert!(!decoded.rows()[0].cells()[0].is_missing());
}

#[test]
fn every_logical_type_round_trips() {
    let columns = all::<LogicalType>()
        .map(|logical_type| {
            let name = logical_type.to_string();
            if logical_type.carries_serializer_name() {
                ColumnSpec::new_bytes(name, logical_type, "org.example.Blob")
            } else {
                ColumnSpec::new(name, logical_type)
            }
        })
        .collect::<Vec<_>>();
    let spec = TableSpec::try_new(columns).unwrap();

    let present = Row::new(
        "present",
        spec.column_types().map(missing_cell_value).collect::<Vec<_>>(),
    );
    let missing = Row::new("missing", spec.column_types().map(|_| Cell::Missing));
    let blobs = Row::new(
        "blobs",
        spec.column_types().map(|logical_type| match logical_type {
            LogicalType::Bytes => Cell::from(Bytes::from_static(b"\x00\xff")),
            LogicalType::BytesList => Cell::list(vec![Bytes::new(), Bytes::from_static(b"xyz")]),
            LogicalType::BytesSet => Cell::set(Vec::<Bytes>::new()),
            _ => Cell::Missing,
        }),
    );
    let table = InMemoryTable::new(spec, [present, missing, blobs]);

    assert_eq!(round_trip(&table), table);
}

#[test]
fn empty_table_keeps_its_schema() {
    let table = InMemoryTable::with_spec(people().spec().clone());
    let bytes = encode_table(table.rows_source()).unwrap();

    assert_eq!(TableSpec::read_flatbuffer_bytes(&bytes).unwrap(), *table.spec());
    let (spec, rows) = decode_table(&bytes).unwrap();
    assert_eq!(&spec, table.spec());
    assert!(rows.is_empty());
}

#[test]
fn table_without_columns_yields_no_rows() {
    let source = VecRowSource::new(
        TableSpec::empty(),
        [Row::new("Row0", []), Row::new("Row1", [])],
    );
    let bytes = encode_table(source).unwrap();
    let (spec, rows) = decode_table(&bytes).unwrap();
    assert!(spec.is_empty());
    assert!(rows.is_empty());
}

#[test]
fn schema_extraction_matches_decoder() {
    let spec = TableSpec::builder()
        .column("z", LogicalType::DoubleSet)
        .bytes_column("a", LogicalType::BytesList, "org.example.Image")
        .column("m", LogicalType::Boolean)
        .build()
        .unwrap();
    let table = InMemoryTable::new(
        spec.clone(),
        [Row::new(
            "Row0",
            [
                Cell::set(vec![1.5]),
                Cell::list(vec![Bytes::from_static(b"png")]),
                Cell::from(true),
            ],
        )],
    );
    let bytes = encode_table(table.rows_source()).unwrap();

    let extracted = TableSpec::read_flatbuffer_bytes(&bytes).unwrap();
    assert_eq!(extracted, spec);
    assert_eq!(
        extracted.column_names().map(|n| n.as_ref()).collect::<Vec<_>>(),
        vec!["z", "a", "m"]
    );
    assert_eq!(
        extracted.column_serializers().get("a").map(|s| s.as_ref()),
        Some("org.example.Image")
    );
    assert_eq!(decode_table(&bytes).unwrap().0, extracted);
}

#[test]
fn mismatched_cell_fails_without_coercion() {
    let spec = TableSpec::builder()
        .column("id", LogicalType::Integer)
        .build()
        .unwrap();
    let source = VecRowSource::new(spec, [Row::new("Row0", [Cell::from(1_i64)])]);
    assert!(encode_table(source).unwrap_err().is_type_mismatch());
}

#[test]
fn truncated_buffer_is_malformed() {
    let bytes = encode_table(people().rows_source()).unwrap();
    for len in [0, 4, bytes.len() / 2, bytes.len() - 1] {
        let err = decode_table(&bytes[..len]).unwrap_err();
        assert!(err.is_malformed(), "{len}: {err}");
    }
}

#[test]
fn cancellation_stops_both_passes() {
    let token = CancellationToken::new();
    let mut encoder = TableEncoder::new(EncodeOptions::default().with_cancellation(token.clone()));
    let bytes = encoder.encode(people().rows_source()).unwrap();

    token.cancel();
    assert!(
        encoder
            .encode(people().rows_source())
            .unwrap_err()
            .is_cancelled()
    );
    let decoder = TableDecoder::new(DecodeOptions::default().with_cancellation(token));
    let mut sink = InMemoryTable::default();
    assert!(decoder.decode(&bytes, &mut sink).unwrap_err().is_cancelled());
    assert_eq!(sink.row_count(), 0);
}

#[test]
fn encoder_is_reusable_and_deterministic() {
    let mut encoder = TableEncoder::new(EncodeOptions::default().with_initial_capacity(16));
    let first = encoder.encode(people().rows_source()).unwrap();
    let second = encoder.encode(people().rows_source()).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, encode_table(people().rows_source()).unwrap());
}

#[test]
fn streaming_source_without_size_hint() {
    struct Counter {
        spec: TableSpec,
        next: i64,
    }

    impl RowSource for Counter {
        fn table_spec(&self) -> &TableSpec {
            &self.spec
        }

        fn next_row(&mut self) -> Option<TabwireResult<Row>> {
            (self.next < 3).then(|| {
                self.next += 1;
                Ok(Row::new(format!("Row{}", self.next), [Cell::from(self.next)]))
            })
        }
    }

    let spec = TableSpec::builder()
        .column("n", LogicalType::Long)
        .build()
        .unwrap();
    let bytes = encode_table(Counter { spec, next: 0 }).unwrap();
    let (_, rows) = decode_table(&bytes).unwrap();
    assert_eq!(
        rows.iter().map(|r| r.cells()[0].as_i64().unwrap()).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
}

#[test]
fn inferred_tables_encode() {
    let table = infer_table(
        ["count", "label", "empty"],
        vec![
            Row::new("Row0", [Cell::from(10_i64), Cell::from("x"), Cell::Missing]),
            Row::new("Row1", [Cell::Missing, Cell::from("y"), Cell::Missing]),
        ],
        &InferOptions::default(),
    )
    .unwrap();
    assert_eq!(
        table.spec().column_types().collect::<Vec<_>>(),
        vec![LogicalType::Integer, LogicalType::String, LogicalType::String]
    );
    assert_eq!(round_trip(&table), table);
}

#[test]
fn schema_extraction_agrees_with_decoder_past_a_million_tables() {
    // One table per collection cell, one more than the flatbuffers default limit.
    const ROWS: i32 = 1_000_001;

    struct Lists {
        spec: TableSpec,
        next: i32,
    }

    impl RowSource for Lists {
        fn table_spec(&self) -> &TableSpec {
            &self.spec
        }

        fn next_row(&mut self) -> Option<TabwireResult<Row>> {
            (self.next < ROWS).then(|| {
                self.next += 1;
                Ok(Row::new(format!("Row{}", self.next), [Cell::list(vec![self.next])]))
            })
        }
    }

    #[derive(Default)]
    struct Count(usize);

    impl RowSink for Count {
        fn add_row(&mut self, _row: Row) -> TabwireResult<()> {
            self.0 += 1;
            Ok(())
        }
    }

    let spec = TableSpec::builder()
        .column("l", LogicalType::IntegerList)
        .build()
        .unwrap();
    let bytes = encode_table(Lists {
        spec: spec.clone(),
        next: 0,
    })
    .unwrap();

    let decoder = TableDecoder::default();
    let mut count = Count::default();
    assert_eq!(decoder.decode(&bytes, &mut count).unwrap(), spec);
    assert_eq!(count.0, 1_000_001);

    assert_eq!(TableSpec::read_flatbuffer_bytes(&bytes).unwrap(), spec);
    assert_eq!(decoder.read_schema(&bytes).unwrap(), spec);
    assert_eq!(
        column_types_from_bytes(&bytes).unwrap(),
        vec![LogicalType::IntegerList]
    );
}
