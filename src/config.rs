//! Remux and batch configuration.
//!
//! [`RemuxOptions`] threads the progress callback and its reporting cadence
//! through a single session. [`BatchOptions`] adds the policies the
//! multi-file driver applies around each session: how output names are
//! derived, whether existing outputs may be replaced, and whether a source
//! is removed once its fixed copy is written.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use retime::{BatchOptions, ProgressCallback, ProgressInfo, RemuxOptions};
//!
//! struct LogProgress;
//! impl ProgressCallback for LogProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         println!("{} packets", info.packets_written);
//!     }
//! }
//!
//! let options = BatchOptions::new()
//!     .with_suffix("_fixed")
//!     .keep_source(true)
//!     .with_remux_options(
//!         RemuxOptions::new()
//!             .with_progress(Arc::new(LogProgress))
//!             .with_batch_size(500),
//!     );
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::progress::{NoOpProgress, ProgressCallback};

/// Suffix inserted between a source's stem and extension by default.
pub const DEFAULT_SUFFIX: &str = "_convert";

/// Configuration for a single remux session.
///
/// A default-constructed value reports no progress.
#[derive(Clone)]
pub struct RemuxOptions {
    /// Progress callback. Defaults to a no-op.
    pub(crate) progress: Arc<dyn ProgressCallback>,
    /// How often to fire the progress callback (every N written packets).
    pub(crate) batch_size: u64,
}

impl Debug for RemuxOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("RemuxOptions")
            .field("has_progress", &true)
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl Default for RemuxOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl RemuxOptions {
    /// Create options with default settings.
    ///
    /// Defaults: no progress callback, batch size 1.
    pub fn new() -> Self {
        Self {
            progress: Arc::new(NoOpProgress),
            batch_size: 1,
        }
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Set how often the progress callback fires.
    ///
    /// A value of 1 means every packet; 100 means every 100th packet.
    /// Clamped to a minimum of 1.
    #[must_use]
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// The configured reporting cadence.
    pub fn batch_size(&self) -> u64 {
        self.batch_size
    }
}

/// Configuration for processing many files.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub(crate) suffix: String,
    pub(crate) keep_source: bool,
    pub(crate) overwrite: bool,
    pub(crate) remux: RemuxOptions,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchOptions {
    /// Create options with default settings.
    ///
    /// Defaults: suffix [`DEFAULT_SUFFIX`], sources removed after a
    /// completed remux, existing outputs not overwritten.
    pub fn new() -> Self {
        Self {
            suffix: DEFAULT_SUFFIX.to_string(),
            keep_source: false,
            overwrite: false,
            remux: RemuxOptions::new(),
        }
    }

    /// Set the suffix appended to each source's stem.
    #[must_use]
    pub fn with_suffix(mut self, suffix: &str) -> Self {
        self.suffix = suffix.to_string();
        self
    }

    /// Keep sources even after their fixed copy was written.
    #[must_use]
    pub fn keep_source(mut self, keep: bool) -> Self {
        self.keep_source = keep;
        self
    }

    /// Allow replacing destination files that already exist.
    #[must_use]
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Set the options used for every session.
    #[must_use]
    pub fn with_remux_options(mut self, options: RemuxOptions) -> Self {
        self.remux = options;
        self
    }

    /// The configured output suffix.
    pub fn suffix(&self) -> &str {
        &self.suffix
    }
}
