use std::collections::HashMap;
use std::sync::Arc;

use flatbuffers::{Follow, VerifierOptions};
use tabwire_error::{TabwireError, TabwireResult, tabwire_err};
use tabwire_flatbuffers::ReadFlatBuffer;
use tabwire_flatbuffers::table as fb;

use crate::{ColumnSpec, LogicalType, TableSpec};

impl ReadFlatBuffer for TableSpec {
    type Source<'a> = fb::WireTable<'a>;
    type Error = TabwireError;

    fn verifier_options() -> VerifierOptions {
        fb::wire_table_verifier_options()
    }

    /// Extract the schema of a serialized table.
    ///
    /// Only the column names, the union tags and the serializer names are read. Value and
    /// missing vectors are never followed.
    fn read_flatbuffer<'buf>(
        fb: &<Self::Source<'buf> as Follow<'buf>>::Inner,
    ) -> Result<Self, Self::Error> {
        let Some(names) = fb.col_names().filter(|names| !names.is_empty()) else {
            return Ok(TableSpec::empty());
        };
        let columns = fb.columns().ok_or_else(|| {
            tabwire_err!(MalformedBuffer: "Missing columns for {} column names", names.len())
        })?;
        if columns.len() != names.len() {
            return Err(tabwire_err!(
                MalformedBuffer: "Table has {} column names but {} columns",
                names.len(),
                columns.len()
            ));
        }

        let specs = names
            .iter()
            .zip(columns.iter())
            .map(|(name, column)| read_column_spec(name, column))
            .collect::<TabwireResult<Vec<_>>>()?;

        TableSpec::try_new(specs)
            .map_err(|err| tabwire_err!(MalformedBuffer: "Invalid table schema: {}", err))
    }
}

/// Classify a single serialized column.
///
/// Both the schema extractor and the table decoder go through this function, so the two can never
/// disagree on a column's type.
pub fn read_column_spec(name: &str, column: fb::Column<'_>) -> TabwireResult<ColumnSpec> {
    let logical_type = LogicalType::try_from_id(column.column_type())
        .map_err(|err| err.with_context(format!("Column {name}")))?;
    if column.column().is_none() {
        return Err(tabwire_err!(MalformedBuffer: "Column {name} has no payload"));
    }

    let serializer = if logical_type.carries_serializer_name() {
        let serializer = column.serializer().ok_or_else(|| {
            tabwire_err!(
                MalformedBuffer: "Column {name} of type {logical_type} has no serializer name"
            )
        })?;
        Some(Arc::from(serializer))
    } else {
        None
    };

    log::trace!("Read column {name} of type {logical_type}");
    Ok(ColumnSpec::from_parts(name, logical_type, serializer))
}

/// Read only the column names of a serialized table.
pub fn column_names_from_bytes(bytes: &[u8]) -> TabwireResult<Vec<Arc<str>>> {
    let table = fb::root_as_wire_table(bytes)?;
    Ok(table
        .col_names()
        .map(|names| names.iter().map(Arc::from).collect())
        .unwrap_or_default())
}

/// Read the logical type of every column of a serialized table, in declared order.
pub fn column_types_from_bytes(bytes: &[u8]) -> TabwireResult<Vec<LogicalType>> {
    Ok(TableSpec::read_flatbuffer_bytes(bytes)?
        .column_types()
        .collect())
}

/// Read the serializer name of every opaque-bytes column of a serialized table.
pub fn column_serializers_from_bytes(bytes: &[u8]) -> TabwireResult<HashMap<Arc<str>, Arc<str>>> {
    Ok(TableSpec::read_flatbuffer_bytes(bytes)?.column_serializers())
}
