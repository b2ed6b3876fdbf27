//! A columnar, zero-copy serialized Tabwire table.
//!
//! See [table] for the flatbuffer specification.

#[allow(clippy::all)]
#[allow(clippy::derive_partial_eq_without_eq)]
#[allow(clippy::many_single_char_names)]
#[allow(clippy::unwrap_used)]
#[allow(dead_code)]
#[allow(missing_docs)]
#[allow(non_snake_case)]
#[allow(non_camel_case_types)]
#[allow(unused_imports)]
#[allow(unused_lifetimes)]
#[allow(unused_qualifications)]
/// A serialized table: row keys, column names and typed columns.
///
/// `table.fbs`:
/// ```flatbuffers
#[doc = include_str!("../flatbuffers/tabwire/table.fbs")]
/// ```
pub mod table;

use bytes::Bytes;
use flatbuffers::{
    FlatBufferBuilder, Follow, InvalidFlatbuffer, Verifiable, VerifierOptions, WIPOffset,
    root_with_opts,
};

/// Marker for types that serialize as the root of a flatbuffer.
pub trait FlatBufferRoot {}

/// Types that can be read back from a flatbuffer.
pub trait ReadFlatBuffer: Sized {
    type Source<'a>: Verifiable + Follow<'a>;
    type Error: From<InvalidFlatbuffer>;

    fn read_flatbuffer<'buf>(
        fb: &<Self::Source<'buf> as Follow<'buf>>::Inner,
    ) -> Result<Self, Self::Error>;

    /// The verifier limits used by [`ReadFlatBuffer::read_flatbuffer_bytes`].
    fn verifier_options() -> VerifierOptions {
        VerifierOptions::default()
    }

    fn read_flatbuffer_bytes<'buf>(bytes: &'buf [u8]) -> Result<Self, Self::Error>
    where
        <Self as ReadFlatBuffer>::Source<'buf>: 'buf,
    {
        Self::read_flatbuffer_bytes_with_opts(bytes, &Self::verifier_options())
    }

    /// Like [`ReadFlatBuffer::read_flatbuffer_bytes`], verifying with caller-supplied limits.
    fn read_flatbuffer_bytes_with_opts<'buf>(
        bytes: &'buf [u8],
        opts: &VerifierOptions,
    ) -> Result<Self, Self::Error>
    where
        <Self as ReadFlatBuffer>::Source<'buf>: 'buf,
    {
        let fb = root_with_opts::<Self::Source<'buf>>(opts, bytes)?;
        Self::read_flatbuffer(&fb)
    }
}

/// Types that can write themselves into a flatbuffer under construction.
pub trait WriteFlatBuffer {
    type Target<'a>;

    fn write_flatbuffer<'fb>(
        &self,
        fbb: &mut FlatBufferBuilder<'fb>,
    ) -> WIPOffset<Self::Target<'fb>>;
}

pub trait WriteFlatBufferExt: WriteFlatBuffer + FlatBufferRoot {
    /// Write the flatbuffer into a [`Bytes`], starting from a builder of the given capacity.
    fn write_flatbuffer_bytes_with_capacity(&self, capacity: usize) -> Bytes;
}

impl<F: WriteFlatBuffer + FlatBufferRoot> WriteFlatBufferExt for F {
    fn write_flatbuffer_bytes_with_capacity(&self, capacity: usize) -> Bytes {
        let mut fbb = FlatBufferBuilder::with_capacity(capacity);
        let root_offset = self.write_flatbuffer(&mut fbb);
        fbb.finish_minimal(root_offset);
        let (vec, start) = fbb.collapse();
        let end = vec.len();
        Bytes::from(vec).slice(start..end)
    }
}
