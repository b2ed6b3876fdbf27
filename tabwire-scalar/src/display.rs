use std::fmt::{Display, Formatter};

use itertools::Itertools;

use crate::{Cell, CollectionValues, Row};

fn hex(bytes: &[u8]) -> impl Display + '_ {
    bytes.iter().map(|b| format!("{b:02x}")).format("")
}

impl Display for CollectionValues {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Boolean(v) => write!(f, "{}", v.iter().format(", ")),
            Self::Integer32(v) => write!(f, "{}", v.iter().format(", ")),
            Self::Integer64(v) => write!(f, "{}", v.iter().format(", ")),
            Self::Float64(v) => write!(f, "{}", v.iter().format(", ")),
            Self::Utf8(v) => write!(f, "{}", v.iter().map(|s| format!("\"{s}\"")).format(", ")),
            Self::Bytes(v) => {
                write!(f, "{}", v.iter().map(|b| format!("0x{}", hex(b))).format(", "))
            }
        }
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing => write!(f, "?"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Integer32(v) => write!(f, "{v}"),
            Self::Integer64(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Utf8(v) => write!(f, "\"{v}\""),
            Self::Bytes(v) => write!(f, "0x{}", hex(v)),
            Self::List(v) => write!(f, "[{v}]"),
            Self::Set(v) => write!(f, "{{{v}}}"),
        }
    }
}

impl Display for Row {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: ({})", self.key(), self.cells().iter().format(", "))
    }
}
