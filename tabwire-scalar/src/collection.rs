use bytes::Bytes;
use tabwire_dtype::ElementType;

/// The elements of a list or set cell.
///
/// All elements share one element type. Sets are stored in the order given; the codec does not
/// deduplicate them.
#[derive(Debug, Clone)]
pub enum CollectionValues {
    /// Booleans
    Boolean(Vec<bool>),
    /// 32-bit integers
    Integer32(Vec<i32>),
    /// 64-bit integers
    Integer64(Vec<i64>),
    /// Doubles
    Float64(Vec<f64>),
    /// Strings
    Utf8(Vec<String>),
    /// Opaque byte blobs
    Bytes(Vec<Bytes>),
}

impl CollectionValues {
    /// The element type shared by every element.
    pub fn element_type(&self) -> ElementType {
        match self {
            Self::Boolean(_) => ElementType::Boolean,
            Self::Integer32(_) => ElementType::Integer32,
            Self::Integer64(_) => ElementType::Integer64,
            Self::Float64(_) => ElementType::Float64,
            Self::Utf8(_) => ElementType::Utf8,
            Self::Bytes(_) => ElementType::Bytes,
        }
    }

    /// The number of elements.
    pub fn len(&self) -> usize {
        match self {
            Self::Boolean(v) => v.len(),
            Self::Integer32(v) => v.len(),
            Self::Integer64(v) => v.len(),
            Self::Float64(v) => v.len(),
            Self::Utf8(v) => v.len(),
            Self::Bytes(v) => v.len(),
        }
    }

    /// Whether the collection has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PartialEq for CollectionValues {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Boolean(l), Self::Boolean(r)) => l == r,
            (Self::Integer32(l), Self::Integer32(r)) => l == r,
            (Self::Integer64(l), Self::Integer64(r)) => l == r,
            (Self::Float64(l), Self::Float64(r)) => {
                l.len() == r.len() && l.iter().zip(r).all(|(l, r)| l.to_bits() == r.to_bits())
            }
            (Self::Utf8(l), Self::Utf8(r)) => l == r,
            (Self::Bytes(l), Self::Bytes(r)) => l == r,
            _ => false,
        }
    }
}

// Floats compare by bit pattern, which is reflexive.
impl Eq for CollectionValues {}

macro_rules! collection_from {
    ($T:ty, $variant:ident) => {
        impl From<Vec<$T>> for CollectionValues {
            fn from(value: Vec<$T>) -> Self {
                Self::$variant(value)
            }
        }
    };
}

collection_from!(bool, Boolean);
collection_from!(i32, Integer32);
collection_from!(i64, Integer64);
collection_from!(f64, Float64);
collection_from!(String, Utf8);
collection_from!(Bytes, Bytes);

impl From<Vec<&str>> for CollectionValues {
    fn from(value: Vec<&str>) -> Self {
        Self::Utf8(value.into_iter().map(String::from).collect())
    }
}
