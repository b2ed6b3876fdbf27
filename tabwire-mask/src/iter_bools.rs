use std::iter;

use crate::Mask;

impl Mask {
    /// Run `f` over the missing flags of every row.
    ///
    /// Uniform masks yield their flags without materializing a bitmap.
    pub fn iter_bools<F, T>(&self, mut f: F) -> T
    where
        F: FnMut(&mut dyn Iterator<Item = bool>) -> T,
    {
        match self {
            Self::NoneMissing(len) => f(&mut iter::repeat_n(false, *len)),
            Self::AllMissing(len) => f(&mut iter::repeat_n(true, *len)),
            Self::Mixed(rows) => f(&mut rows.flags().iter()),
        }
    }
}

#[cfg(test)]
mod test {
    use itertools::Itertools;

    use crate::Mask;

    #[test]
    fn flags_of_every_shape() {
        assert_eq!(Mask::all_missing(2).iter_bools(|it| it.collect_vec()), [true, true]);
        assert_eq!(Mask::none_missing(1).iter_bools(|it| it.collect_vec()), [false]);
        assert_eq!(
            Mask::from_iter([false, true, false]).iter_bools(|it| it.collect_vec()),
            [false, true, false]
        );
    }
}
