use arrow_buffer::BooleanBufferBuilder;

use crate::Mask;

/// Collects the missing flags of a column one row at a time.
pub struct MaskBuilder {
    flags: BooleanBufferBuilder,
    missing_count: usize,
}

impl MaskBuilder {
    /// An empty builder with room for `capacity` rows.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            flags: BooleanBufferBuilder::new(capacity),
            missing_count: 0,
        }
    }

    /// Record the next row.
    #[inline]
    pub fn append(&mut self, missing: bool) {
        self.flags.append(missing);
        self.missing_count += usize::from(missing);
    }

    /// The number of rows recorded so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Whether no row has been recorded.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Finish the mask. Uniform columns drop their bitmap.
    pub fn finish(mut self) -> Mask {
        let len = self.flags.len();
        match self.missing_count {
            0 => Mask::none_missing(len),
            n if n == len => Mask::all_missing(len),
            _ => Mask::from_flags(self.flags.finish()),
        }
    }
}

impl Default for MaskBuilder {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

#[cfg(test)]
mod test {
    use crate::{Mask, MaskBuilder};

    #[test]
    fn builds_mixed_mask() {
        let mut builder = MaskBuilder::with_capacity(4);
        for missing in [false, true, true, false] {
            builder.append(missing);
        }
        assert_eq!(builder.len(), 4);

        let mask = builder.finish();
        assert_eq!(mask.missing_count(), 2);
        assert!(mask.is_missing(1));
        assert!(!mask.is_missing(3));
    }

    #[test]
    fn builds_uniform_masks() {
        let mut builder = MaskBuilder::default();
        (0..3).for_each(|_| builder.append(false));
        assert!(matches!(builder.finish(), Mask::NoneMissing(3)));

        let mut builder = MaskBuilder::default();
        (0..3).for_each(|_| builder.append(true));
        assert!(matches!(builder.finish(), Mask::AllMissing(3)));

        let builder = MaskBuilder::default();
        assert!(builder.is_empty());
        assert!(builder.finish().is_empty());
    }
}
