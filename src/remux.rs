//! Timeline-normalizing remux.
//!
//! This module provides [`Remuxer`] and the [`remux`] shortcut for copying a
//! media file into a new container of the same layout while shifting every
//! stream so its timestamps begin at zero. Payloads are copied as-is; nothing
//! is decoded or re-encoded. The output format is inferred from the
//! destination file extension.
//!
//! # Example
//!
//! ```no_run
//! use retime::RemuxOutcome;
//!
//! match retime::remux("capture.ts", "capture_convert.ts")? {
//!     RemuxOutcome::Completed(stats) => println!("{} packets", stats.packets_written),
//!     RemuxOutcome::AlreadyNormalized { stream, .. } => {
//!         println!("stream {stream} already starts at zero")
//!     }
//! }
//! # Ok::<(), retime::RetimeError>(())
//! ```

use std::path::{Path, PathBuf};

use crate::backend::{FfmpegDestination, FfmpegSource};
use crate::config::RemuxOptions;
use crate::error::RetimeError;
use crate::session::{RemuxOutcome, RemuxSession};

/// Remux `source` into `destination` with default options.
///
/// # Errors
///
/// See [`Remuxer::run`].
pub fn remux<P1: AsRef<Path>, P2: AsRef<Path>>(
    source: P1,
    destination: P2,
) -> Result<RemuxOutcome, RetimeError> {
    Remuxer::new(source, destination).run()
}

/// Lossless, timeline-normalizing container copier.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
///
/// use retime::{ProgressCallback, ProgressInfo, RemuxOptions, Remuxer};
///
/// struct Dots;
/// impl ProgressCallback for Dots {
///     fn on_progress(&self, _info: &ProgressInfo) {
///         eprint!(".");
///     }
/// }
///
/// let outcome = Remuxer::new("input.mkv", "input_convert.mkv")
///     .with_options(RemuxOptions::new().with_progress(Arc::new(Dots)).with_batch_size(1_000))
///     .run()?;
/// # Ok::<(), retime::RetimeError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Remuxer {
    source_path: PathBuf,
    destination_path: PathBuf,
    options: RemuxOptions,
}

impl Remuxer {
    /// Create a remuxer from a source to a destination file.
    pub fn new<P1: AsRef<Path>, P2: AsRef<Path>>(source: P1, destination: P2) -> Self {
        Self {
            source_path: source.as_ref().to_path_buf(),
            destination_path: destination.as_ref().to_path_buf(),
            options: RemuxOptions::new(),
        }
    }

    /// Replace the session options.
    #[must_use]
    pub fn with_options(mut self, options: RemuxOptions) -> Self {
        self.options = options;
        self
    }

    /// The source path.
    pub fn source(&self) -> &Path {
        &self.source_path
    }

    /// The destination path.
    pub fn destination(&self) -> &Path {
        &self.destination_path
    }

    /// Execute the remux.
    ///
    /// Returns [`RemuxOutcome::AlreadyNormalized`] without writing anything
    /// when the source's first packet already starts at zero.
    ///
    /// # Errors
    ///
    /// Returns [`RetimeError::FileOpen`] if FFmpeg cannot be initialised,
    /// [`RetimeError::Io`] if the source cannot be opened or probed, the
    /// destination cannot be allocated, or any read or write fails,
    /// [`RetimeError::Mapping`] if stream parameters cannot be copied, and
    /// [`RetimeError::AllocFailed`] if a context cannot be allocated.
    pub fn run(&self) -> Result<RemuxOutcome, RetimeError> {
        ffmpeg_next::init().map_err(|error| RetimeError::FileOpen {
            path: self.source_path.clone(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        log::info!(
            "Remuxing {} -> {}",
            self.source_path.display(),
            self.destination_path.display()
        );

        let mut source = FfmpegSource::open(&self.source_path)?;
        source.probe()?;
        let destination = FfmpegDestination::allocate(&self.destination_path)?;

        RemuxSession::new(source, destination, &self.options)?.run()
    }
}
