//! Rust bindings for `table.fbs`.
//!
//! The schema declares one table per column kind, but all of them share a single field layout.
//! Instead of one struct per schema table, the bindings expose [`ColumnTable`] and
//! [`CollectionCell`] parameterized by the element type stored in their vectors, plus aliases
//! naming each concrete table from the schema.

use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;

use flatbuffers::{
    FlatBufferBuilder, Follow, ForwardsUOffset, InvalidFlatbuffer, Table, UnionWIPOffset,
    VOffsetT, Vector, Verifiable, Verifier, VerifierOptions, WIPOffset,
};

/// Discriminants of the `TypedColumn` union.
///
/// A discriminant is also the logical type id of the column it tags.
pub mod typed_column {
    pub const NONE: u8 = 0;
    pub const BOOLEAN_COLUMN: u8 = 1;
    pub const BOOLEAN_LIST_COLUMN: u8 = 2;
    pub const BOOLEAN_SET_COLUMN: u8 = 3;
    pub const INT_COLUMN: u8 = 4;
    pub const INT_LIST_COLUMN: u8 = 5;
    pub const INT_SET_COLUMN: u8 = 6;
    pub const LONG_COLUMN: u8 = 7;
    pub const LONG_LIST_COLUMN: u8 = 8;
    pub const LONG_SET_COLUMN: u8 = 9;
    pub const DOUBLE_COLUMN: u8 = 10;
    pub const DOUBLE_LIST_COLUMN: u8 = 11;
    pub const DOUBLE_SET_COLUMN: u8 = 12;
    pub const STRING_COLUMN: u8 = 13;
    pub const STRING_LIST_COLUMN: u8 = 14;
    pub const STRING_SET_COLUMN: u8 = 15;
    pub const BYTE_COLUMN: u8 = 16;
    pub const BYTE_LIST_COLUMN: u8 = 17;
    pub const BYTE_SET_COLUMN: u8 = 18;

    pub const ENUM_MIN: u8 = 0;
    pub const ENUM_MAX: u8 = 18;

    /// The schema name of a union variant, if the discriminant is known.
    pub fn variant_name(tag: u8) -> Option<&'static str> {
        Some(match tag {
            NONE => "NONE",
            BOOLEAN_COLUMN => "BooleanColumn",
            BOOLEAN_LIST_COLUMN => "BooleanListColumn",
            BOOLEAN_SET_COLUMN => "BooleanSetColumn",
            INT_COLUMN => "IntColumn",
            INT_LIST_COLUMN => "IntListColumn",
            INT_SET_COLUMN => "IntSetColumn",
            LONG_COLUMN => "LongColumn",
            LONG_LIST_COLUMN => "LongListColumn",
            LONG_SET_COLUMN => "LongSetColumn",
            DOUBLE_COLUMN => "DoubleColumn",
            DOUBLE_LIST_COLUMN => "DoubleListColumn",
            DOUBLE_SET_COLUMN => "DoubleSetColumn",
            STRING_COLUMN => "StringColumn",
            STRING_LIST_COLUMN => "StringListColumn",
            STRING_SET_COLUMN => "StringSetColumn",
            BYTE_COLUMN => "ByteColumn",
            BYTE_LIST_COLUMN => "ByteListColumn",
            BYTE_SET_COLUMN => "ByteSetColumn",
            _ => return None,
        })
    }
}

/// An opaque byte blob, the element of every bytes column.
#[derive(Copy, Clone)]
pub struct ByteCell<'a> {
    pub _tab: Table<'a>,
}

impl<'a> Follow<'a> for ByteCell<'a> {
    type Inner = ByteCell<'a>;

    #[inline]
    unsafe fn follow(buf: &'a [u8], loc: usize) -> Self::Inner {
        Self {
            _tab: unsafe { Table::new(buf, loc) },
        }
    }
}

impl<'a> ByteCell<'a> {
    pub const VT_VALUE: VOffsetT = 4;

    #[inline]
    pub fn value(&self) -> Option<Vector<'a, u8>> {
        // SAFETY: created from a valid table for this object
        unsafe {
            self._tab
                .get::<ForwardsUOffset<Vector<'a, u8>>>(Self::VT_VALUE, None)
        }
    }

    pub fn create(
        fbb: &mut FlatBufferBuilder<'a>,
        value: WIPOffset<Vector<'a, u8>>,
    ) -> WIPOffset<ByteCell<'a>> {
        let start = fbb.start_table();
        fbb.push_slot_always::<WIPOffset<_>>(Self::VT_VALUE, value);
        let o = fbb.end_table(start);
        WIPOffset::new(o.value())
    }
}

impl Verifiable for ByteCell<'_> {
    #[inline]
    fn run_verifier(v: &mut Verifier, pos: usize) -> Result<(), InvalidFlatbuffer> {
        v.visit_table(pos)?
            .visit_field::<ForwardsUOffset<Vector<'_, u8>>>("value", Self::VT_VALUE, false)?
            .finish();
        Ok(())
    }
}

impl Debug for ByteCell<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteCell")
            .field("len", &self.value().map(|v| v.len()))
            .finish()
    }
}

/// One row of a collection column: a table holding the row's elements.
pub struct CollectionCell<'a, E> {
    pub _tab: Table<'a>,
    _element: PhantomData<E>,
}

impl<E> Clone for CollectionCell<'_, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for CollectionCell<'_, E> {}

impl<'a, E: 'a> Follow<'a> for CollectionCell<'a, E> {
    type Inner = CollectionCell<'a, E>;

    #[inline]
    unsafe fn follow(buf: &'a [u8], loc: usize) -> Self::Inner {
        Self {
            _tab: unsafe { Table::new(buf, loc) },
            _element: PhantomData,
        }
    }
}

impl<E> CollectionCell<'_, E> {
    pub const VT_VALUE: VOffsetT = 4;
}

impl<'a, E: Follow<'a> + 'a> CollectionCell<'a, E> {
    #[inline]
    pub fn value(&self) -> Option<Vector<'a, E>> {
        // SAFETY: created from a valid table for this object
        unsafe {
            self._tab
                .get::<ForwardsUOffset<Vector<'a, E>>>(Self::VT_VALUE, None)
        }
    }
}

impl<'a, E: 'a> CollectionCell<'a, E> {
    pub fn create(
        fbb: &mut FlatBufferBuilder<'a>,
        value: WIPOffset<Vector<'a, E>>,
    ) -> WIPOffset<CollectionCell<'a, E>> {
        let start = fbb.start_table();
        fbb.push_slot_always::<WIPOffset<_>>(Self::VT_VALUE, value);
        let o = fbb.end_table(start);
        WIPOffset::new(o.value())
    }
}

impl<'a, E: 'a> Verifiable for CollectionCell<'a, E>
where
    Vector<'a, E>: Verifiable,
{
    #[inline]
    fn run_verifier(v: &mut Verifier, pos: usize) -> Result<(), InvalidFlatbuffer> {
        v.visit_table(pos)?
            .visit_field::<ForwardsUOffset<Vector<'a, E>>>("value", Self::VT_VALUE, true)?
            .finish();
        Ok(())
    }
}

/// A column: one value per row, one missing flag per row, and an optional serializer name.
///
/// `V` is the vector element as stored on the wire, e.g. `i32` for an integer column, or
/// `ForwardsUOffset<StringCollectionCell>` for a string list column.
pub struct ColumnTable<'a, V> {
    pub _tab: Table<'a>,
    _values: PhantomData<V>,
}

impl<V> Clone for ColumnTable<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for ColumnTable<'_, V> {}

impl<'a, V: 'a> Follow<'a> for ColumnTable<'a, V> {
    type Inner = ColumnTable<'a, V>;

    #[inline]
    unsafe fn follow(buf: &'a [u8], loc: usize) -> Self::Inner {
        Self {
            _tab: unsafe { Table::new(buf, loc) },
            _values: PhantomData,
        }
    }
}

impl<V> ColumnTable<'_, V> {
    pub const VT_VALUES: VOffsetT = 4;
    pub const VT_MISSING: VOffsetT = 6;
    pub const VT_SERIALIZER: VOffsetT = 8;
}

impl<'a, V: Follow<'a> + 'a> ColumnTable<'a, V> {
    #[inline]
    pub fn values(&self) -> Option<Vector<'a, V>> {
        // SAFETY: created from a valid table for this object
        unsafe {
            self._tab
                .get::<ForwardsUOffset<Vector<'a, V>>>(Self::VT_VALUES, None)
        }
    }
}

impl<'a, V: 'a> ColumnTable<'a, V> {
    #[inline]
    pub fn missing(&self) -> Option<Vector<'a, bool>> {
        // SAFETY: created from a valid table for this object
        unsafe {
            self._tab
                .get::<ForwardsUOffset<Vector<'a, bool>>>(Self::VT_MISSING, None)
        }
    }

    #[inline]
    pub fn serializer(&self) -> Option<&'a str> {
        // SAFETY: created from a valid table for this object
        unsafe {
            self._tab
                .get::<ForwardsUOffset<&str>>(Self::VT_SERIALIZER, None)
        }
    }

    pub fn create(
        fbb: &mut FlatBufferBuilder<'a>,
        args: &ColumnTableArgs<'a, V>,
    ) -> WIPOffset<ColumnTable<'a, V>> {
        let start = fbb.start_table();
        if let Some(serializer) = args.serializer {
            fbb.push_slot_always::<WIPOffset<_>>(Self::VT_SERIALIZER, serializer);
        }
        fbb.push_slot_always::<WIPOffset<_>>(Self::VT_MISSING, args.missing);
        fbb.push_slot_always::<WIPOffset<_>>(Self::VT_VALUES, args.values);
        let o = fbb.end_table(start);
        WIPOffset::new(o.value())
    }
}

impl<'a, V: 'a> Verifiable for ColumnTable<'a, V>
where
    Vector<'a, V>: Verifiable,
{
    #[inline]
    fn run_verifier(v: &mut Verifier, pos: usize) -> Result<(), InvalidFlatbuffer> {
        v.visit_table(pos)?
            .visit_field::<ForwardsUOffset<Vector<'a, V>>>("values", Self::VT_VALUES, true)?
            .visit_field::<ForwardsUOffset<Vector<'_, bool>>>("missing", Self::VT_MISSING, true)?
            .visit_field::<ForwardsUOffset<&str>>("serializer", Self::VT_SERIALIZER, false)?
            .finish();
        Ok(())
    }
}

/// The offsets a [`ColumnTable`] is assembled from.
pub struct ColumnTableArgs<'a, V> {
    pub values: WIPOffset<Vector<'a, V>>,
    pub missing: WIPOffset<Vector<'a, bool>>,
    pub serializer: Option<WIPOffset<&'a str>>,
}

pub type BooleanColumn<'a> = ColumnTable<'a, bool>;
pub type IntColumn<'a> = ColumnTable<'a, i32>;
pub type LongColumn<'a> = ColumnTable<'a, i64>;
pub type DoubleColumn<'a> = ColumnTable<'a, f64>;
pub type StringColumn<'a> = ColumnTable<'a, ForwardsUOffset<&'a str>>;
pub type ByteColumn<'a> = ColumnTable<'a, ForwardsUOffset<ByteCell<'a>>>;

pub type BooleanCollectionCell<'a> = CollectionCell<'a, bool>;
pub type IntegerCollectionCell<'a> = CollectionCell<'a, i32>;
pub type LongCollectionCell<'a> = CollectionCell<'a, i64>;
pub type DoubleCollectionCell<'a> = CollectionCell<'a, f64>;
pub type StringCollectionCell<'a> = CollectionCell<'a, ForwardsUOffset<&'a str>>;
pub type ByteCollectionCell<'a> = CollectionCell<'a, ForwardsUOffset<ByteCell<'a>>>;

pub type BooleanCollectionColumn<'a> =
    ColumnTable<'a, ForwardsUOffset<BooleanCollectionCell<'a>>>;
pub type IntCollectionColumn<'a> = ColumnTable<'a, ForwardsUOffset<IntegerCollectionCell<'a>>>;
pub type LongCollectionColumn<'a> = ColumnTable<'a, ForwardsUOffset<LongCollectionCell<'a>>>;
pub type DoubleCollectionColumn<'a> = ColumnTable<'a, ForwardsUOffset<DoubleCollectionCell<'a>>>;
pub type StringCollectionColumn<'a> = ColumnTable<'a, ForwardsUOffset<StringCollectionCell<'a>>>;
pub type ByteCollectionColumn<'a> = ColumnTable<'a, ForwardsUOffset<ByteCollectionCell<'a>>>;

fn verify_typed_column(tag: u8, v: &mut Verifier, pos: usize) -> Result<(), InvalidFlatbuffer> {
    use typed_column::*;

    match tag {
        BOOLEAN_COLUMN => v.verify_union_variant::<ForwardsUOffset<BooleanColumn>>(
            "TypedColumn::BooleanColumn",
            pos,
        ),
        BOOLEAN_LIST_COLUMN | BOOLEAN_SET_COLUMN => v
            .verify_union_variant::<ForwardsUOffset<BooleanCollectionColumn>>(
                "TypedColumn::BooleanCollectionColumn",
                pos,
            ),
        INT_COLUMN => {
            v.verify_union_variant::<ForwardsUOffset<IntColumn>>("TypedColumn::IntColumn", pos)
        }
        INT_LIST_COLUMN | INT_SET_COLUMN => v
            .verify_union_variant::<ForwardsUOffset<IntCollectionColumn>>(
                "TypedColumn::IntCollectionColumn",
                pos,
            ),
        LONG_COLUMN => {
            v.verify_union_variant::<ForwardsUOffset<LongColumn>>("TypedColumn::LongColumn", pos)
        }
        LONG_LIST_COLUMN | LONG_SET_COLUMN => v
            .verify_union_variant::<ForwardsUOffset<LongCollectionColumn>>(
                "TypedColumn::LongCollectionColumn",
                pos,
            ),
        DOUBLE_COLUMN => v.verify_union_variant::<ForwardsUOffset<DoubleColumn>>(
            "TypedColumn::DoubleColumn",
            pos,
        ),
        DOUBLE_LIST_COLUMN | DOUBLE_SET_COLUMN => v
            .verify_union_variant::<ForwardsUOffset<DoubleCollectionColumn>>(
                "TypedColumn::DoubleCollectionColumn",
                pos,
            ),
        STRING_COLUMN => v.verify_union_variant::<ForwardsUOffset<StringColumn>>(
            "TypedColumn::StringColumn",
            pos,
        ),
        STRING_LIST_COLUMN | STRING_SET_COLUMN => v
            .verify_union_variant::<ForwardsUOffset<StringCollectionColumn>>(
                "TypedColumn::StringCollectionColumn",
                pos,
            ),
        BYTE_COLUMN => {
            v.verify_union_variant::<ForwardsUOffset<ByteColumn>>("TypedColumn::ByteColumn", pos)
        }
        BYTE_LIST_COLUMN | BYTE_SET_COLUMN => v
            .verify_union_variant::<ForwardsUOffset<ByteCollectionColumn>>(
                "TypedColumn::ByteCollectionColumn",
                pos,
            ),
        // Unknown discriminants are left for the reader to reject with a typed error.
        _ => Ok(()),
    }
}

/// A column entry of the root table: the `TypedColumn` union.
#[derive(Copy, Clone)]
pub struct Column<'a> {
    pub _tab: Table<'a>,
}

impl<'a> Follow<'a> for Column<'a> {
    type Inner = Column<'a>;

    #[inline]
    unsafe fn follow(buf: &'a [u8], loc: usize) -> Self::Inner {
        Self {
            _tab: unsafe { Table::new(buf, loc) },
        }
    }
}

impl<'a> Column<'a> {
    pub const VT_COLUMN_TYPE: VOffsetT = 4;
    pub const VT_COLUMN: VOffsetT = 6;

    /// The union discriminant, i.e. the logical type id of the column.
    #[inline]
    pub fn column_type(&self) -> u8 {
        // SAFETY: created from a valid table for this object
        unsafe {
            self._tab
                .get::<u8>(Self::VT_COLUMN_TYPE, Some(typed_column::NONE))
                .unwrap_or(typed_column::NONE)
        }
    }

    /// The untyped union payload.
    #[inline]
    pub fn column(&self) -> Option<Table<'a>> {
        // SAFETY: created from a valid table for this object
        unsafe { self._tab.get::<ForwardsUOffset<Table<'a>>>(Self::VT_COLUMN, None) }
    }

    /// The union payload viewed as a column with values of wire type `V`.
    ///
    /// # Safety
    ///
    /// `V` must be the value type of the table that [`Column::column_type`] selects, otherwise
    /// reads may interpret unverified bytes.
    #[inline]
    pub unsafe fn column_as_unchecked<V: 'a>(&self) -> Option<ColumnTable<'a, V>> {
        unsafe {
            self._tab
                .get::<ForwardsUOffset<ColumnTable<'a, V>>>(Self::VT_COLUMN, None)
        }
    }

    /// The serializer name stored in the union payload, if the variant is known and has one.
    ///
    /// Every column table keeps its serializer in the same slot, so the value type of the
    /// payload does not matter here.
    #[inline]
    pub fn serializer(&self) -> Option<&'a str> {
        let tag = self.column_type();
        if tag == typed_column::NONE || typed_column::variant_name(tag).is_none() {
            return None;
        }
        // SAFETY: every known variant was verified with an optional string in this slot
        self.column().and_then(|payload| unsafe {
            payload.get::<ForwardsUOffset<&str>>(ColumnTable::<()>::VT_SERIALIZER, None)
        })
    }

    pub fn create(
        fbb: &mut FlatBufferBuilder<'a>,
        column_type: u8,
        column: WIPOffset<UnionWIPOffset>,
    ) -> WIPOffset<Column<'a>> {
        let start = fbb.start_table();
        fbb.push_slot_always::<WIPOffset<_>>(Self::VT_COLUMN, column);
        fbb.push_slot::<u8>(Self::VT_COLUMN_TYPE, column_type, typed_column::NONE);
        let o = fbb.end_table(start);
        WIPOffset::new(o.value())
    }
}

impl Verifiable for Column<'_> {
    #[inline]
    fn run_verifier(v: &mut Verifier, pos: usize) -> Result<(), InvalidFlatbuffer> {
        v.visit_table(pos)?
            .visit_union::<u8, _>(
                "column_type",
                Self::VT_COLUMN_TYPE,
                "column",
                Self::VT_COLUMN,
                false,
                |tag, v, pos| verify_typed_column(tag, v, pos),
            )?
            .finish();
        Ok(())
    }
}

impl Debug for Column<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Column")
            .field(
                "column_type",
                &typed_column::variant_name(self.column_type()).unwrap_or("UNKNOWN"),
            )
            .finish()
    }
}

/// The root of a serialized table.
#[derive(Copy, Clone)]
pub struct WireTable<'a> {
    pub _tab: Table<'a>,
}

impl<'a> Follow<'a> for WireTable<'a> {
    type Inner = WireTable<'a>;

    #[inline]
    unsafe fn follow(buf: &'a [u8], loc: usize) -> Self::Inner {
        Self {
            _tab: unsafe { Table::new(buf, loc) },
        }
    }
}

impl<'a> WireTable<'a> {
    pub const VT_ROW_KEYS: VOffsetT = 4;
    pub const VT_COL_NAMES: VOffsetT = 6;
    pub const VT_COLUMNS: VOffsetT = 8;

    #[inline]
    pub fn row_keys(&self) -> Option<Vector<'a, ForwardsUOffset<&'a str>>> {
        // SAFETY: created from a valid table for this object
        unsafe {
            self._tab
                .get::<ForwardsUOffset<Vector<'a, ForwardsUOffset<&'a str>>>>(
                    Self::VT_ROW_KEYS,
                    None,
                )
        }
    }

    #[inline]
    pub fn col_names(&self) -> Option<Vector<'a, ForwardsUOffset<&'a str>>> {
        // SAFETY: created from a valid table for this object
        unsafe {
            self._tab
                .get::<ForwardsUOffset<Vector<'a, ForwardsUOffset<&'a str>>>>(
                    Self::VT_COL_NAMES,
                    None,
                )
        }
    }

    #[inline]
    pub fn columns(&self) -> Option<Vector<'a, ForwardsUOffset<Column<'a>>>> {
        // SAFETY: created from a valid table for this object
        unsafe {
            self._tab
                .get::<ForwardsUOffset<Vector<'a, ForwardsUOffset<Column<'a>>>>>(
                    Self::VT_COLUMNS,
                    None,
                )
        }
    }

    pub fn create(
        fbb: &mut FlatBufferBuilder<'a>,
        args: &WireTableArgs<'a>,
    ) -> WIPOffset<WireTable<'a>> {
        let start = fbb.start_table();
        fbb.push_slot_always::<WIPOffset<_>>(Self::VT_COLUMNS, args.columns);
        fbb.push_slot_always::<WIPOffset<_>>(Self::VT_COL_NAMES, args.col_names);
        fbb.push_slot_always::<WIPOffset<_>>(Self::VT_ROW_KEYS, args.row_keys);
        let o = fbb.end_table(start);
        WIPOffset::new(o.value())
    }
}

impl Verifiable for WireTable<'_> {
    #[inline]
    fn run_verifier(v: &mut Verifier, pos: usize) -> Result<(), InvalidFlatbuffer> {
        v.visit_table(pos)?
            .visit_field::<ForwardsUOffset<Vector<'_, ForwardsUOffset<&str>>>>(
                "row_keys",
                Self::VT_ROW_KEYS,
                false,
            )?
            .visit_field::<ForwardsUOffset<Vector<'_, ForwardsUOffset<&str>>>>(
                "col_names",
                Self::VT_COL_NAMES,
                false,
            )?
            .visit_field::<ForwardsUOffset<Vector<'_, ForwardsUOffset<Column>>>>(
                "columns",
                Self::VT_COLUMNS,
                false,
            )?
            .finish();
        Ok(())
    }
}

impl Debug for WireTable<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WireTable")
            .field("row_keys", &self.row_keys().map(|v| v.len()))
            .field("col_names", &self.col_names().map(|v| v.iter().collect::<Vec<_>>()))
            .field("columns", &self.columns().map(|v| v.iter().collect::<Vec<_>>()))
            .finish()
    }
}

/// The offsets a [`WireTable`] is assembled from.
pub struct WireTableArgs<'a> {
    pub row_keys: WIPOffset<Vector<'a, ForwardsUOffset<&'a str>>>,
    pub col_names: WIPOffset<Vector<'a, ForwardsUOffset<&'a str>>>,
    pub columns: WIPOffset<Vector<'a, ForwardsUOffset<Column<'a>>>>,
}

/// Verifies `buf` with the given limits and returns the root [`WireTable`].
#[inline]
pub fn root_as_wire_table_with_opts<'b>(
    opts: &VerifierOptions,
    buf: &'b [u8],
) -> Result<WireTable<'b>, InvalidFlatbuffer> {
    flatbuffers::root_with_opts::<WireTable<'b>>(opts, buf)
}

/// The verifier limits every reader of a [`WireTable`] starts from.
///
/// Each collection cell is its own table, so the table count and the apparent size grow with the
/// row count and are left unbounded. The nesting depth keeps the flatbuffers default.
pub fn wire_table_verifier_options() -> VerifierOptions {
    VerifierOptions {
        max_tables: usize::MAX,
        max_apparent_size: usize::MAX,
        ..Default::default()
    }
}

/// Verifies `buf` with [`wire_table_verifier_options`] and returns the root [`WireTable`].
#[inline]
pub fn root_as_wire_table(buf: &[u8]) -> Result<WireTable<'_>, InvalidFlatbuffer> {
    root_as_wire_table_with_opts(&wire_table_verifier_options(), buf)
}
