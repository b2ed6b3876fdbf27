use bytes::Bytes;
use flatbuffers::{FlatBufferBuilder, Follow, ForwardsUOffset, Vector, WIPOffset};
use tabwire_dtype::ElementType;
use tabwire_dtype::flatbuffers as fb;
use tabwire_error::{TabwireResult, tabwire_err};
use tabwire_scalar::{Cell, CollectionValues};

/// The per-element-type half of a column codec.
///
/// An implementation knows how one element type is represented in memory, on the wire and in a
/// [`Cell`], and which sentinel fills the value slot of a missing cell. The scalar and collection
/// strategies are generic over it.
pub trait ElementCodec: 'static {
    /// The element type this codec handles.
    const ELEMENT: ElementType;

    /// The in-memory representation of one element.
    type Native: Clone + 'static;

    /// The element of a wire vector holding these values.
    type Wire<'a>: Follow<'a> + 'a;

    /// The value written in place of a missing element.
    fn sentinel() -> Self::Native;

    /// Write `values` as a single wire vector.
    fn write_vector<'fbb>(
        fbb: &mut FlatBufferBuilder<'fbb>,
        values: &[Self::Native],
    ) -> WIPOffset<Vector<'fbb, Self::Wire<'fbb>>>;

    /// Read one element back out of a wire vector.
    fn read_element<'a>(wire: <Self::Wire<'a> as Follow<'a>>::Inner) -> TabwireResult<Self::Native>;

    /// The value of a scalar cell of this element type.
    fn scalar_from_cell(cell: &Cell) -> Option<Self::Native>;

    /// Wrap a value in a scalar cell.
    fn scalar_into_cell(value: Self::Native) -> Cell;

    /// The elements of a collection of this element type.
    fn collection_from_values(values: &CollectionValues) -> Option<&[Self::Native]>;

    /// Wrap elements in a collection.
    fn collection_into_values(values: Vec<Self::Native>) -> CollectionValues;
}

macro_rules! primitive_codec {
    ($codec:ident, $T:ty, $element:ident, $variant:ident, $sentinel:expr) => {
        #[doc = concat!("The codec of `", stringify!($T), "` elements.")]
        pub struct $codec;

        impl ElementCodec for $codec {
            const ELEMENT: ElementType = ElementType::$element;

            type Native = $T;
            type Wire<'a> = $T;

            #[inline]
            fn sentinel() -> Self::Native {
                $sentinel
            }

            fn write_vector<'fbb>(
                fbb: &mut FlatBufferBuilder<'fbb>,
                values: &[Self::Native],
            ) -> WIPOffset<Vector<'fbb, Self::Wire<'fbb>>> {
                fbb.create_vector(values)
            }

            #[inline]
            fn read_element<'a>(
                wire: <Self::Wire<'a> as Follow<'a>>::Inner,
            ) -> TabwireResult<Self::Native> {
                Ok(wire)
            }

            fn scalar_from_cell(cell: &Cell) -> Option<Self::Native> {
                match cell {
                    Cell::$variant(v) => Some(*v),
                    _ => None,
                }
            }

            fn scalar_into_cell(value: Self::Native) -> Cell {
                Cell::$variant(value)
            }

            fn collection_from_values(values: &CollectionValues) -> Option<&[Self::Native]> {
                match values {
                    CollectionValues::$variant(v) => Some(v),
                    _ => None,
                }
            }

            fn collection_into_values(values: Vec<Self::Native>) -> CollectionValues {
                CollectionValues::$variant(values)
            }
        }
    };
}

primitive_codec!(BooleanCodec, bool, Boolean, Boolean, false);
primitive_codec!(Integer32Codec, i32, Integer32, Integer32, i32::MIN);
primitive_codec!(Integer64Codec, i64, Integer64, Integer64, i64::MIN);
primitive_codec!(Float64Codec, f64, Float64, Float64, f64::NAN);

/// The string written in place of a missing string.
pub const MISSING_STRING: &str = "Missing Value";

/// The blob written in place of a missing blob: a single `i8::MIN` byte.
pub const MISSING_BYTES: &[u8] = &[0x80];

/// The codec of UTF-8 string elements.
pub struct Utf8Codec;

impl ElementCodec for Utf8Codec {
    const ELEMENT: ElementType = ElementType::Utf8;

    type Native = String;
    type Wire<'a> = ForwardsUOffset<&'a str>;

    fn sentinel() -> Self::Native {
        MISSING_STRING.to_string()
    }

    fn write_vector<'fbb>(
        fbb: &mut FlatBufferBuilder<'fbb>,
        values: &[Self::Native],
    ) -> WIPOffset<Vector<'fbb, Self::Wire<'fbb>>> {
        let strings = values
            .iter()
            .map(|v| fbb.create_string(v))
            .collect::<Vec<_>>();
        fbb.create_vector(&strings)
    }

    fn read_element<'a>(
        wire: <Self::Wire<'a> as Follow<'a>>::Inner,
    ) -> TabwireResult<Self::Native> {
        Ok(wire.to_string())
    }

    fn scalar_from_cell(cell: &Cell) -> Option<Self::Native> {
        cell.as_str().map(str::to_string)
    }

    fn scalar_into_cell(value: Self::Native) -> Cell {
        Cell::Utf8(value)
    }

    fn collection_from_values(values: &CollectionValues) -> Option<&[Self::Native]> {
        match values {
            CollectionValues::Utf8(v) => Some(v),
            _ => None,
        }
    }

    fn collection_into_values(values: Vec<Self::Native>) -> CollectionValues {
        CollectionValues::Utf8(values)
    }
}

/// The codec of opaque byte blobs.
pub struct BytesCodec;

impl ElementCodec for BytesCodec {
    const ELEMENT: ElementType = ElementType::Bytes;

    type Native = Bytes;
    type Wire<'a> = ForwardsUOffset<fb::ByteCell<'a>>;

    fn sentinel() -> Self::Native {
        Bytes::from_static(MISSING_BYTES)
    }

    fn write_vector<'fbb>(
        fbb: &mut FlatBufferBuilder<'fbb>,
        values: &[Self::Native],
    ) -> WIPOffset<Vector<'fbb, Self::Wire<'fbb>>> {
        let cells = values
            .iter()
            .map(|v| {
                let value = fbb.create_vector(v.as_ref());
                fb::ByteCell::create(fbb, value)
            })
            .collect::<Vec<_>>();
        fbb.create_vector(&cells)
    }

    fn read_element<'a>(
        wire: <Self::Wire<'a> as Follow<'a>>::Inner,
    ) -> TabwireResult<Self::Native> {
        wire.value()
            .map(|v| Bytes::copy_from_slice(v.bytes()))
            .ok_or_else(|| tabwire_err!(MalformedBuffer: "Byte cell has no value"))
    }

    fn scalar_from_cell(cell: &Cell) -> Option<Self::Native> {
        cell.as_bytes().cloned()
    }

    fn scalar_into_cell(value: Self::Native) -> Cell {
        Cell::Bytes(value)
    }

    fn collection_from_values(values: &CollectionValues) -> Option<&[Self::Native]> {
        match values {
            CollectionValues::Bytes(v) => Some(v),
            _ => None,
        }
    }

    fn collection_into_values(values: Vec<Self::Native>) -> CollectionValues {
        CollectionValues::Bytes(values)
    }
}

/// Run `$body` with `$codec` bound to the [`ElementCodec`] of an [`ElementType`].
#[macro_export]
macro_rules! match_each_element_codec {
    ($self:expr, | $codec:ident | $body:block) => {{
        use tabwire_dtype::ElementType;
        use $crate::column::{
            BooleanCodec, BytesCodec, Float64Codec, Integer32Codec, Integer64Codec, Utf8Codec,
        };
        match $self {
            ElementType::Boolean => {
                type $codec = BooleanCodec;
                $body
            }
            ElementType::Integer32 => {
                type $codec = Integer32Codec;
                $body
            }
            ElementType::Integer64 => {
                type $codec = Integer64Codec;
                $body
            }
            ElementType::Float64 => {
                type $codec = Float64Codec;
                $body
            }
            ElementType::Utf8 => {
                type $codec = Utf8Codec;
                $body
            }
            ElementType::Bytes => {
                type $codec = BytesCodec;
                $body
            }
        }
    }};
}

#[cfg(test)]
mod tests {
    use enum_iterator::all;

    use super::*;

    #[test]
    fn codecs_cover_every_element_type() {
        for element in all::<ElementType>() {
            let codec_element = match_each_element_codec!(element, |E| { E::ELEMENT });
            assert_eq!(codec_element, element);
        }
    }

    #[test]
    fn sentinels() {
        assert!(!BooleanCodec::sentinel());
        assert_eq!(Integer32Codec::sentinel(), i32::MIN);
        assert_eq!(Integer64Codec::sentinel(), i64::MIN);
        assert!(Float64Codec::sentinel().is_nan());
        assert_eq!(Utf8Codec::sentinel(), "Missing Value");
        assert_eq!(BytesCodec::sentinel().as_ref(), &[i8::MIN.to_le_bytes()[0]]);
    }

    #[test]
    fn cells_round_trip_through_codecs() {
        let cell = Cell::from("abc");
        let value = Utf8Codec::scalar_from_cell(&cell).unwrap();
        assert_eq!(Utf8Codec::scalar_into_cell(value), cell);
        assert!(Integer32Codec::scalar_from_cell(&Cell::from(1_i64)).is_none());
        assert!(
            Integer64Codec::collection_from_values(&CollectionValues::from(vec![1_i32])).is_none()
        );
    }
}
