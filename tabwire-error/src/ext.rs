use crate::{ErrString, TabwireResult};

/// Attach context to the error side of a [`TabwireResult`].
pub trait ContextExt<T> {
    /// Wrap the error, if any, in a [`crate::TabwireError::Context`] built lazily from `msg`.
    fn context<M: Into<ErrString>>(self, msg: impl FnOnce() -> M) -> TabwireResult<T>;
}

impl<T> ContextExt<T> for TabwireResult<T> {
    fn context<M: Into<ErrString>>(self, msg: impl FnOnce() -> M) -> TabwireResult<T> {
        self.map_err(|e| e.with_context(msg()))
    }
}
