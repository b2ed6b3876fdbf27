use crate::Mask;

impl PartialEq for Mask {
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() || self.missing_count() != other.missing_count() {
            return false;
        }
        match (self, other) {
            (Self::Mixed(lhs), Self::Mixed(rhs)) => lhs.flags() == rhs.flags(),
            // Equal counts over equal lengths leave only uniform masks.
            _ => true,
        }
    }
}

impl Eq for Mask {}
