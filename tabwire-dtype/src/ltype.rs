use std::fmt::{Display, Formatter};
use std::str::FromStr;

use enum_iterator::Sequence;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use tabwire_error::{TabwireError, TabwireResult, tabwire_err};

/// The element type stored in a column, independent of its [`Shape`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Sequence)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ElementType {
    /// `true` or `false`
    Boolean,
    /// 32-bit signed integers
    Integer32,
    /// 64-bit signed integers
    Integer64,
    /// 64-bit IEEE 754 floats
    Float64,
    /// UTF-8 strings
    Utf8,
    /// Opaque byte blobs, interpreted by a named serializer outside of this codec
    Bytes,
}

impl ElementType {
    /// The type name used by [`LogicalType`]'s display form.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Integer32 => "integer",
            Self::Integer64 => "long",
            Self::Float64 => "double",
            Self::Utf8 => "string",
            Self::Bytes => "bytes",
        }
    }
}

impl Display for ElementType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether a column holds one value per row, or a collection of values per row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Sequence)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Shape {
    /// A single value per row
    Scalar,
    /// An ordered sequence per row, duplicates allowed
    List,
    /// An unordered sequence per row
    ///
    /// Sets are stored exactly as given. Deduplication is left to the caller.
    Set,
}

impl Shape {
    /// Whether each row holds a sequence of values.
    pub fn is_collection(&self) -> bool {
        !matches!(self, Shape::Scalar)
    }
}

/// The logical type of a column.
///
/// Every (element type, shape) pair is a distinct type with a stable numeric id, which is the
/// value written to the wire.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Sequence,
    IntoPrimitive,
    TryFromPrimitive,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum LogicalType {
    /// Scalar booleans
    Boolean = 1,
    /// Lists of booleans
    BooleanList,
    /// Sets of booleans
    BooleanSet,
    /// Scalar 32-bit integers
    Integer,
    /// Lists of 32-bit integers
    IntegerList,
    /// Sets of 32-bit integers
    IntegerSet,
    /// Scalar 64-bit integers
    Long,
    /// Lists of 64-bit integers
    LongList,
    /// Sets of 64-bit integers
    LongSet,
    /// Scalar doubles
    Double,
    /// Lists of doubles
    DoubleList,
    /// Sets of doubles
    DoubleSet,
    /// Scalar strings
    String,
    /// Lists of strings
    StringList,
    /// Sets of strings
    StringSet,
    /// Scalar byte blobs
    Bytes,
    /// Lists of byte blobs
    BytesList,
    /// Sets of byte blobs
    BytesSet,
}

impl LogicalType {
    /// Compose a logical type from its element type and shape.
    pub fn new(element: ElementType, shape: Shape) -> Self {
        use ElementType as E;
        use Shape as S;

        match (element, shape) {
            (E::Boolean, S::Scalar) => Self::Boolean,
            (E::Boolean, S::List) => Self::BooleanList,
            (E::Boolean, S::Set) => Self::BooleanSet,
            (E::Integer32, S::Scalar) => Self::Integer,
            (E::Integer32, S::List) => Self::IntegerList,
            (E::Integer32, S::Set) => Self::IntegerSet,
            (E::Integer64, S::Scalar) => Self::Long,
            (E::Integer64, S::List) => Self::LongList,
            (E::Integer64, S::Set) => Self::LongSet,
            (E::Float64, S::Scalar) => Self::Double,
            (E::Float64, S::List) => Self::DoubleList,
            (E::Float64, S::Set) => Self::DoubleSet,
            (E::Utf8, S::Scalar) => Self::String,
            (E::Utf8, S::List) => Self::StringList,
            (E::Utf8, S::Set) => Self::StringSet,
            (E::Bytes, S::Scalar) => Self::Bytes,
            (E::Bytes, S::List) => Self::BytesList,
            (E::Bytes, S::Set) => Self::BytesSet,
        }
    }

    /// Look up the type registered under `id`.
    pub fn try_from_id(id: u8) -> TabwireResult<Self> {
        Self::try_from(id).map_err(|_| tabwire_err!(UnknownType: id))
    }

    /// The stable id written to the wire for this type.
    #[inline]
    pub fn id(self) -> u8 {
        self.into()
    }

    /// The element type of each value in the column.
    pub fn element(self) -> ElementType {
        use LogicalType::*;

        match self {
            Boolean | BooleanList | BooleanSet => ElementType::Boolean,
            Integer | IntegerList | IntegerSet => ElementType::Integer32,
            Long | LongList | LongSet => ElementType::Integer64,
            Double | DoubleList | DoubleSet => ElementType::Float64,
            String | StringList | StringSet => ElementType::Utf8,
            Bytes | BytesList | BytesSet => ElementType::Bytes,
        }
    }

    /// Whether the column holds scalars, lists or sets.
    pub fn shape(self) -> Shape {
        use LogicalType::*;

        match self {
            Boolean | Integer | Long | Double | String | Bytes => Shape::Scalar,
            BooleanList | IntegerList | LongList | DoubleList | StringList | BytesList => {
                Shape::List
            }
            BooleanSet | IntegerSet | LongSet | DoubleSet | StringSet | BytesSet => Shape::Set,
        }
    }

    /// Whether columns of this type carry the name of the serializer for their opaque bytes.
    pub fn carries_serializer_name(self) -> bool {
        self.element() == ElementType::Bytes
    }
}

impl Display for LogicalType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.shape() {
            Shape::Scalar => write!(f, "{}", self.element()),
            Shape::List => write!(f, "{}_list", self.element()),
            Shape::Set => write!(f, "{}_set", self.element()),
        }
    }
}

impl FromStr for LogicalType {
    type Err = TabwireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (element, shape) = if let Some(element) = s.strip_suffix("_list") {
            (element, Shape::List)
        } else if let Some(element) = s.strip_suffix("_set") {
            (element, Shape::Set)
        } else {
            (s, Shape::Scalar)
        };

        let element = enum_iterator::all::<ElementType>()
            .find(|e| e.name() == element)
            .ok_or_else(|| tabwire_err!("Unknown logical type name {s}"))?;
        Ok(Self::new(element, shape))
    }
}
