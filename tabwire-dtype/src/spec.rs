use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use itertools::Itertools;
use tabwire_error::{TabwireError, TabwireResult, tabwire_bail};

use crate::LogicalType;

/// The declaration of a single column: its name, its logical type and, for opaque-bytes columns,
/// the name of the serializer that produced the bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnSpec {
    name: Arc<str>,
    logical_type: LogicalType,
    serializer: Option<Arc<str>>,
}

impl ColumnSpec {
    /// Create a column of a non-bytes type.
    pub fn new(name: impl Into<Arc<str>>, logical_type: LogicalType) -> Self {
        Self {
            name: name.into(),
            logical_type,
            serializer: None,
        }
    }

    /// Create a column of one of the opaque-bytes types.
    pub fn new_bytes(
        name: impl Into<Arc<str>>,
        logical_type: LogicalType,
        serializer: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            name: name.into(),
            logical_type,
            serializer: Some(serializer.into()),
        }
    }

    /// Create a column from raw parts, as read from a serialized table.
    pub fn from_parts(
        name: impl Into<Arc<str>>,
        logical_type: LogicalType,
        serializer: Option<Arc<str>>,
    ) -> Self {
        Self {
            name: name.into(),
            logical_type,
            serializer,
        }
    }

    /// The column name.
    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    /// The logical type of every cell in the column.
    pub fn logical_type(&self) -> LogicalType {
        self.logical_type
    }

    /// The serializer name, present exactly for opaque-bytes columns.
    pub fn serializer(&self) -> Option<&Arc<str>> {
        self.serializer.as_ref()
    }

    fn validate(&self) -> TabwireResult<()> {
        match (self.logical_type.carries_serializer_name(), &self.serializer) {
            (true, None) => {
                tabwire_bail!(
                    "Column {} of type {} requires a serializer name",
                    self.name,
                    self.logical_type
                )
            }
            (false, Some(serializer)) => {
                tabwire_bail!(
                    "Column {} of type {} cannot carry serializer {serializer}",
                    self.name,
                    self.logical_type
                )
            }
            _ => Ok(()),
        }
    }
}

impl Display for ColumnSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.logical_type)?;
        if let Some(serializer) = &self.serializer {
            write!(f, " ({serializer})")?;
        }
        Ok(())
    }
}

/// The ordered schema of a table.
///
/// A `TableSpec` is immutable and cheap to clone. Column names are unique, and a serializer name
/// is present on a column exactly when its type is one of the opaque-bytes types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "Vec<ColumnSpec>", into = "Vec<ColumnSpec>")
)]
pub struct TableSpec {
    columns: Arc<[ColumnSpec]>,
}

impl TableSpec {
    /// Create a validated schema from its columns.
    pub fn try_new(columns: impl IntoIterator<Item = ColumnSpec>) -> TabwireResult<Self> {
        let columns: Arc<[ColumnSpec]> = columns.into_iter().collect();

        if let Some(dup) = columns.iter().map(|c| c.name()).duplicates().next() {
            tabwire_bail!("Duplicate column name {dup}");
        }
        for column in columns.iter() {
            column.validate()?;
        }

        Ok(Self { columns })
    }

    /// A schema with no columns.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Start building a schema column by column.
    pub fn builder() -> TableSpecBuilder {
        TableSpecBuilder::default()
    }

    /// The number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the schema has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// All columns in declared order.
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// The column at position `idx`.
    pub fn column(&self, idx: usize) -> Option<&ColumnSpec> {
        self.columns.get(idx)
    }

    /// The position of the column called `name`.
    pub fn find_column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name.as_ref() == name)
    }

    /// The column names in declared order.
    pub fn column_names(&self) -> impl ExactSizeIterator<Item = &Arc<str>> + '_ {
        self.columns.iter().map(|c| &c.name)
    }

    /// The column types in declared order.
    pub fn column_types(&self) -> impl ExactSizeIterator<Item = LogicalType> + '_ {
        self.columns.iter().map(|c| c.logical_type)
    }

    /// The serializer name of every opaque-bytes column, keyed by column name.
    pub fn column_serializers(&self) -> HashMap<Arc<str>, Arc<str>> {
        self.columns
            .iter()
            .filter_map(|c| c.serializer.clone().map(|s| (c.name.clone(), s)))
            .collect()
    }
}

impl TryFrom<Vec<ColumnSpec>> for TableSpec {
    type Error = TabwireError;

    fn try_from(columns: Vec<ColumnSpec>) -> Result<Self, Self::Error> {
        Self::try_new(columns)
    }
}

impl From<TableSpec> for Vec<ColumnSpec> {
    fn from(value: TableSpec) -> Self {
        value.columns.to_vec()
    }
}

impl Display for TableSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}}}", self.columns.iter().format(", "))
    }
}

/// A fluent builder for [`TableSpec`].
#[derive(Debug, Default)]
pub struct TableSpecBuilder {
    columns: Vec<ColumnSpec>,
}

impl TableSpecBuilder {
    /// Append a column of a non-bytes type.
    pub fn column(mut self, name: impl Into<Arc<str>>, logical_type: LogicalType) -> Self {
        self.columns.push(ColumnSpec::new(name, logical_type));
        self
    }

    /// Append an opaque-bytes column along with the name of its serializer.
    pub fn bytes_column(
        mut self,
        name: impl Into<Arc<str>>,
        logical_type: LogicalType,
        serializer: impl Into<Arc<str>>,
    ) -> Self {
        self.columns
            .push(ColumnSpec::new_bytes(name, logical_type, serializer));
        self
    }

    /// Validate and build the schema.
    pub fn build(self) -> TabwireResult<TableSpec> {
        TableSpec::try_new(self.columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_preserves_order() {
        let spec = TableSpec::builder()
            .column("id", LogicalType::Integer)
            .column("name", LogicalType::String)
            .bytes_column("blob", LogicalType::BytesList, "png")
            .build()
            .unwrap();

        assert_eq!(spec.len(), 3);
        assert_eq!(
            spec.column_names().map(|n| n.as_ref()).collect::<Vec<_>>(),
            vec!["id", "name", "blob"]
        );
        assert_eq!(
            spec.column_types().collect::<Vec<_>>(),
            vec![LogicalType::Integer, LogicalType::String, LogicalType::BytesList]
        );
        assert_eq!(spec.find_column("name"), Some(1));
        assert_eq!(spec.find_column("nope"), None);
        assert_eq!(spec.to_string(), "{id: integer, name: string, blob: bytes_list (png)}");
    }

    #[test]
    fn serializers_only_for_bytes_columns() {
        let spec = TableSpec::builder()
            .column("id", LogicalType::Long)
            .bytes_column("img", LogicalType::Bytes, "png")
            .build()
            .unwrap();

        let serializers = spec.column_serializers();
        assert_eq!(serializers.len(), 1);
        assert_eq!(serializers.get("img").map(|s| s.as_ref()), Some("png"));
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = TableSpec::builder()
            .column("a", LogicalType::Integer)
            .column("a", LogicalType::Double)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("Duplicate column name a"));
    }

    #[test]
    fn serializer_presence_matches_type() {
        assert!(
            TableSpec::try_new([ColumnSpec::from_parts("b", LogicalType::BytesSet, None)]).is_err()
        );
        assert!(
            TableSpec::try_new([ColumnSpec::from_parts(
                "s",
                LogicalType::String,
                Some("png".into())
            )])
            .is_err()
        );
    }

    #[test]
    fn empty_spec() {
        let spec = TableSpec::empty();
        assert!(spec.is_empty());
        assert!(spec.column(0).is_none());
        assert!(spec.column_serializers().is_empty());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_round_trip_validates() {
        let spec = TableSpec::builder()
            .column("id", LogicalType::IntegerSet)
            .build()
            .unwrap();
        let json = serde_json::to_string(&spec).unwrap();
        assert_eq!(
            json,
            r#"[{"name":"id","logical_type":"integer_set","serializer":null}]"#
        );
        assert_eq!(serde_json::from_str::<TableSpec>(&json).unwrap(), spec);

        let column = r#"{"name":"a","logical_type":"long","serializer":null}"#;
        let dup = format!("[{column},{column}]");
        assert!(serde_json::from_str::<TableSpec>(&dup).is_err());
    }
}
