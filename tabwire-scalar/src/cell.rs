use bytes::Bytes;
use tabwire_dtype::{LogicalType, Shape};

use crate::CollectionValues;

/// A single value of a table: one row of one column.
#[derive(Debug, Clone, Default)]
pub enum Cell {
    /// No value. Valid in a column of any type.
    #[default]
    Missing,
    /// A boolean
    Boolean(bool),
    /// A 32-bit integer
    Integer32(i32),
    /// A 64-bit integer
    Integer64(i64),
    /// A double
    Float64(f64),
    /// A string
    Utf8(String),
    /// An opaque byte blob
    Bytes(Bytes),
    /// An ordered collection, duplicates allowed
    List(CollectionValues),
    /// An unordered collection
    Set(CollectionValues),
}

impl Cell {
    /// Create a list cell.
    pub fn list(values: impl Into<CollectionValues>) -> Self {
        Self::List(values.into())
    }

    /// Create a set cell.
    pub fn set(values: impl Into<CollectionValues>) -> Self {
        Self::Set(values.into())
    }

    /// The logical type of the value, or `None` for a missing cell.
    pub fn logical_type(&self) -> Option<LogicalType> {
        Some(match self {
            Self::Missing => return None,
            Self::Boolean(_) => LogicalType::Boolean,
            Self::Integer32(_) => LogicalType::Integer,
            Self::Integer64(_) => LogicalType::Long,
            Self::Float64(_) => LogicalType::Double,
            Self::Utf8(_) => LogicalType::String,
            Self::Bytes(_) => LogicalType::Bytes,
            Self::List(values) => LogicalType::new(values.element_type(), Shape::List),
            Self::Set(values) => LogicalType::new(values.element_type(), Shape::Set),
        })
    }

    /// Whether the cell holds no value.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Whether the cell may be stored in a column of type `logical_type`.
    pub fn conforms_to(&self, logical_type: LogicalType) -> bool {
        self.logical_type().is_none_or(|t| t == logical_type)
    }

    /// The boolean value, if this is a boolean cell.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// The integer value, if this is a 32-bit integer cell.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::Integer32(v) => Some(*v),
            _ => None,
        }
    }

    /// The integer value, if this is a 64-bit integer cell.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer64(v) => Some(*v),
            _ => None,
        }
    }

    /// The float value, if this is a double cell.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// The string, if this is a string cell.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Utf8(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// The blob, if this is a bytes cell.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Bytes(v) => Some(v),
            _ => None,
        }
    }

    /// The elements, if this is a list cell.
    pub fn as_list(&self) -> Option<&CollectionValues> {
        match self {
            Self::List(v) => Some(v),
            _ => None,
        }
    }

    /// The elements, if this is a set cell.
    pub fn as_set(&self) -> Option<&CollectionValues> {
        match self {
            Self::Set(v) => Some(v),
            _ => None,
        }
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Missing, Self::Missing) => true,
            (Self::Boolean(l), Self::Boolean(r)) => l == r,
            (Self::Integer32(l), Self::Integer32(r)) => l == r,
            (Self::Integer64(l), Self::Integer64(r)) => l == r,
            (Self::Float64(l), Self::Float64(r)) => l.to_bits() == r.to_bits(),
            (Self::Utf8(l), Self::Utf8(r)) => l == r,
            (Self::Bytes(l), Self::Bytes(r)) => l == r,
            (Self::List(l), Self::List(r)) => l == r,
            (Self::Set(l), Self::Set(r)) => l == r,
            _ => false,
        }
    }
}

impl Eq for Cell {}

macro_rules! cell_from {
    ($T:ty, $variant:ident) => {
        impl From<$T> for Cell {
            fn from(value: $T) -> Self {
                Self::$variant(value)
            }
        }
    };
    ($T:ty, $variant:ident, into) => {
        impl From<$T> for Cell {
            fn from(value: $T) -> Self {
                Self::$variant(value.into())
            }
        }
    };
}

cell_from!(bool, Boolean);
cell_from!(i32, Integer32);
cell_from!(i64, Integer64);
cell_from!(f64, Float64);
cell_from!(String, Utf8);
cell_from!(&str, Utf8, into);
cell_from!(Bytes, Bytes);
cell_from!(Vec<u8>, Bytes, into);

impl<T> From<Option<T>> for Cell
where
    T: Into<Cell>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Missing, Into::into)
    }
}
