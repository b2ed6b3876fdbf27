use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use flatbuffers::VerifierOptions;
use tabwire_dtype::flatbuffers::wire_table_verifier_options;
use tabwire_error::{TabwireError, TabwireResult};

/// A flag shared between the caller of a pass and the pass itself.
///
/// Encoding checks the flag between rows and decoding between columns. Both stop with
/// [`TabwireError::Cancelled`] once it is set.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Create a token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of every pass holding a clone of this token.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub(crate) fn check(&self) -> TabwireResult<()> {
        if self.is_cancelled() {
            Err(TabwireError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Options for encoding a table.
#[derive(Debug, Clone)]
pub struct EncodeOptions {
    /// The initial capacity, in bytes, of the flatbuffer builder.
    pub initial_capacity: usize,
    /// Checked once per row.
    pub cancellation: Option<CancellationToken>,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            initial_capacity: 1024,
            cancellation: None,
        }
    }
}

impl EncodeOptions {
    /// Start the flatbuffer builder with `initial_capacity` bytes.
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    /// Stop encoding once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub(crate) fn check_cancelled(&self) -> TabwireResult<()> {
        self.cancellation
            .as_ref()
            .map_or(Ok(()), CancellationToken::check)
    }
}

/// Options for decoding a table.
///
/// The limits bound the work the flatbuffers verifier accepts before a buffer is read.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// The maximum nesting depth of tables.
    pub max_depth: usize,
    /// The maximum number of tables in one buffer.
    pub max_tables: usize,
    /// The maximum number of bytes the verifier may visit, counting repeated visits.
    pub max_apparent_size: usize,
    /// Checked once per column and once more before the first row is delivered.
    pub cancellation: Option<CancellationToken>,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        let defaults = wire_table_verifier_options();
        Self {
            max_depth: defaults.max_depth,
            max_tables: defaults.max_tables,
            max_apparent_size: defaults.max_apparent_size,
            cancellation: None,
        }
    }
}

impl DecodeOptions {
    /// Reject buffers nested deeper than `max_depth` tables.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Reject buffers with more than `max_tables` tables.
    pub fn with_max_tables(mut self, max_tables: usize) -> Self {
        self.max_tables = max_tables;
        self
    }

    /// Reject buffers whose verification would visit more than `max_apparent_size` bytes.
    pub fn with_max_apparent_size(mut self, max_apparent_size: usize) -> Self {
        self.max_apparent_size = max_apparent_size;
        self
    }

    /// Stop decoding once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub(crate) fn verifier_options(&self) -> VerifierOptions {
        VerifierOptions {
            max_depth: self.max_depth,
            max_tables: self.max_tables,
            max_apparent_size: self.max_apparent_size,
            ..Default::default()
        }
    }

    pub(crate) fn check_cancelled(&self) -> TabwireResult<()> {
        self.cancellation
            .as_ref()
            .map_or(Ok(()), CancellationToken::check)
    }
}
