//! The missing flags of a column, one per row.
//!
//! Most columns have no missing cells at all, and a column of a table that was never filled in has
//! nothing but missing cells. [`Mask`] stores both of those as a row count and only keeps a bitmap
//! for columns that mix present and missing rows.
#![deny(missing_docs)]
mod builder;
mod eq;
mod iter_bools;

use std::sync::{Arc, OnceLock};

use arrow_buffer::BooleanBuffer;
pub use builder::*;

/// Which rows of a column hold a missing cell.
#[derive(Clone, Debug)]
pub enum Mask {
    /// No row of the column is missing.
    NoneMissing(usize),
    /// Every row of the column is missing.
    AllMissing(usize),
    /// Some rows are missing. A set bit marks a missing row.
    Mixed(Arc<MixedRows>),
}

/// The flags of a [`Mask`] that has both present and missing rows.
#[derive(Debug)]
pub struct MixedRows {
    flags: BooleanBuffer,
    missing_count: usize,
    // Built on first use.
    missing_rows: OnceLock<Vec<usize>>,
}

impl MixedRows {
    /// The flags, one per row.
    pub fn flags(&self) -> &BooleanBuffer {
        &self.flags
    }

    /// The positions of the missing rows in ascending order.
    pub fn missing_rows(&self) -> &[usize] {
        self.missing_rows
            .get_or_init(|| self.flags.set_indices().collect())
    }
}

impl Mask {
    /// A mask over `len` rows, none of them missing.
    pub fn none_missing(len: usize) -> Self {
        Self::NoneMissing(len)
    }

    /// A mask over `len` rows, all of them missing.
    pub fn all_missing(len: usize) -> Self {
        Self::AllMissing(len)
    }

    /// Wrap a bitmap of missing flags, collapsing it when every flag agrees.
    pub fn from_flags(flags: BooleanBuffer) -> Self {
        let len = flags.len();
        match flags.count_set_bits() {
            0 => Self::NoneMissing(len),
            n if n == len => Self::AllMissing(len),
            missing_count => Self::Mixed(Arc::new(MixedRows {
                flags,
                missing_count,
                missing_rows: OnceLock::new(),
            })),
        }
    }

    /// The number of rows covered, missing or not.
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Self::NoneMissing(len) | Self::AllMissing(len) => *len,
            Self::Mixed(rows) => rows.flags.len(),
        }
    }

    /// Whether the mask covers no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The number of missing rows.
    pub fn missing_count(&self) -> usize {
        match self {
            Self::NoneMissing(_) => 0,
            Self::AllMissing(len) => *len,
            Self::Mixed(rows) => rows.missing_count,
        }
    }

    /// The number of rows holding a value.
    pub fn present_count(&self) -> usize {
        self.len() - self.missing_count()
    }

    /// Whether `row` is missing.
    ///
    /// ## Panics
    ///
    /// Panics if a mixed mask is indexed out of bounds.
    #[inline]
    pub fn is_missing(&self, row: usize) -> bool {
        match self {
            Self::NoneMissing(_) => false,
            Self::AllMissing(_) => true,
            Self::Mixed(rows) => rows.flags.value(row),
        }
    }

    /// The flags of a mask that has both present and missing rows.
    pub fn mixed(&self) -> Option<&MixedRows> {
        match self {
            Self::Mixed(rows) => Some(rows),
            _ => None,
        }
    }

    /// The flags as a bitmap, allocating one for uniform masks.
    pub fn to_flags(&self) -> BooleanBuffer {
        match self {
            Self::NoneMissing(len) => BooleanBuffer::new_unset(*len),
            Self::AllMissing(len) => BooleanBuffer::new_set(*len),
            Self::Mixed(rows) => rows.flags.clone(),
        }
    }
}

impl From<BooleanBuffer> for Mask {
    fn from(flags: BooleanBuffer) -> Self {
        Self::from_flags(flags)
    }
}

impl FromIterator<bool> for Mask {
    fn from_iter<T: IntoIterator<Item = bool>>(iter: T) -> Self {
        Self::from_flags(BooleanBuffer::from_iter(iter))
    }
}
