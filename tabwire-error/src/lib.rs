#![feature(error_generic_member_access)]
#![deny(missing_docs)]

//! This crate defines the error type shared by every Tabwire crate.
//!
//! All fallible operations return a [`TabwireResult`]. Errors are constructed with the
//! [`tabwire_err`] macro and early-returned with [`tabwire_bail`].

mod ext;

use std::backtrace::Backtrace;
use std::borrow::Cow;
use std::fmt::{Debug, Display, Formatter};
use std::ops::Deref;

pub use ext::*;

/// A string that can be used as an error message.
#[derive(Debug)]
pub struct ErrString(Cow<'static, str>);

#[allow(clippy::fallible_impl_from, clippy::panic)]
impl<T> From<T> for ErrString
where
    T: Into<Cow<'static, str>>,
{
    fn from(msg: T) -> Self {
        if std::env::var("TABWIRE_PANIC_ON_ERR").as_deref().unwrap_or("") == "1" {
            panic!("{}\nBacktrace:\n{}", msg.into(), Backtrace::capture());
        } else {
            Self(msg.into())
        }
    }
}

impl AsRef<str> for ErrString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for ErrString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for ErrString {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// The top-level error type for Tabwire.
#[derive(thiserror::Error)]
#[non_exhaustive]
pub enum TabwireError {
    /// An invalid argument was provided, such as a schema with duplicate column names.
    #[error("{0}\nBacktrace:\n{1}")]
    InvalidArgument(ErrString, Backtrace),
    /// A cell disagrees with the declared type of its column.
    #[error("type mismatch: {0}\nBacktrace:\n{1}")]
    TypeMismatch(ErrString, Backtrace),
    /// A serialized table is truncated or structurally inconsistent.
    #[error("malformed buffer: {0}\nBacktrace:\n{1}")]
    MalformedBuffer(ErrString, Backtrace),
    /// A serialized column carries a type id outside the registry.
    #[error("malformed buffer: unknown type id {0}\nBacktrace:\n{1}")]
    UnknownType(u8, Backtrace),
    /// An assertion failed.
    #[error("{0}\nBacktrace:\n{1}")]
    AssertionFailed(ErrString, Backtrace),
    /// The pass was cancelled by its caller.
    #[error("operation cancelled")]
    Cancelled,
    /// A wrapper for other errors, carrying additional context.
    #[error("{0}: {1}")]
    Context(ErrString, #[source] Box<TabwireError>),
    /// A buffer rejected by the FlatBuffers verifier.
    #[cfg(feature = "flatbuffers")]
    #[error("malformed buffer: {0}")]
    FlatBuffersError(#[from] flatbuffers::InvalidFlatbuffer),
}

impl TabwireError {
    /// Adds additional context to an error.
    pub fn with_context<T: Into<ErrString>>(self, msg: T) -> Self {
        TabwireError::Context(msg.into(), Box::new(self))
    }

    /// Whether the error describes an unreadable buffer rather than a caller mistake.
    ///
    /// Verifier failures and unknown type ids are both reported as malformed input.
    pub fn is_malformed(&self) -> bool {
        match self {
            TabwireError::MalformedBuffer(..) | TabwireError::UnknownType(..) => true,
            #[cfg(feature = "flatbuffers")]
            TabwireError::FlatBuffersError(..) => true,
            TabwireError::Context(_, inner) => inner.is_malformed(),
            _ => false,
        }
    }

    /// Whether the error is, or wraps, a [`TabwireError::TypeMismatch`].
    pub fn is_type_mismatch(&self) -> bool {
        match self {
            TabwireError::TypeMismatch(..) => true,
            TabwireError::Context(_, inner) => inner.is_type_mismatch(),
            _ => false,
        }
    }

    /// Whether the error is, or wraps, a [`TabwireError::Cancelled`].
    pub fn is_cancelled(&self) -> bool {
        match self {
            TabwireError::Cancelled => true,
            TabwireError::Context(_, inner) => inner.is_cancelled(),
            _ => false,
        }
    }
}

impl Debug for TabwireError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

/// A type alias for Results that return TabwireErrors as their error type.
pub type TabwireResult<T> = Result<T, TabwireError>;

/// A convenient macro for creating a TabwireError.
#[macro_export]
macro_rules! tabwire_err {
    (UnknownType: $id:expr) => {{
        use std::backtrace::Backtrace;
        $crate::TabwireError::UnknownType($id, Backtrace::capture())
    }};
    ($variant:ident: $fmt:literal $(, $arg:expr)* $(,)?) => {{
        use std::backtrace::Backtrace;
        $crate::TabwireError::$variant(format!($fmt, $($arg),*).into(), Backtrace::capture())
    }};
    ($variant:ident: $err:expr $(,)?) => {
        $crate::TabwireError::$variant($err)
    };
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::tabwire_err!(InvalidArgument: $fmt, $($arg),*)
    };
}

/// A convenient macro for returning a TabwireError.
#[macro_export]
macro_rules! tabwire_bail {
    ($($tt:tt)+) => {
        return Err($crate::tabwire_err!($($tt)+))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fails_with_mismatch() -> TabwireResult<()> {
        tabwire_bail!(TypeMismatch: "column {} expected {}", "id", "integer")
    }

    #[test]
    fn bail_builds_typed_variant() {
        let err = fails_with_mismatch().unwrap_err();
        assert!(err.is_type_mismatch());
        assert!(!err.is_malformed());
        assert!(err.to_string().starts_with("type mismatch: column id expected integer"));
    }

    #[test]
    fn unknown_type_is_malformed() {
        let err = tabwire_err!(UnknownType: 42);
        assert!(err.is_malformed());
        assert!(err.to_string().contains("unknown type id 42"));
    }

    #[test]
    fn context_preserves_classification() {
        let err = tabwire_err!(MalformedBuffer: "truncated").with_context("column 3");
        assert!(err.is_malformed());
        assert!(err.to_string().starts_with("column 3: malformed buffer: truncated"));

        let res: TabwireResult<()> = Err(TabwireError::Cancelled);
        let err = res.context(|| "row 7").unwrap_err();
        assert!(err.is_cancelled());
    }

    #[cfg(feature = "flatbuffers")]
    #[test]
    fn verifier_errors_are_malformed() {
        let err = TabwireError::from(flatbuffers::InvalidFlatbuffer::TooManyTables);
        assert!(err.is_malformed());
        assert!(err.to_string().starts_with("malformed buffer: "));
    }
}
