//! Multi-file processing.
//!
//! [`process_file`] wraps one remux with the policies a command-line driver
//! needs: deriving the output name, refusing to clobber existing outputs,
//! removing the source once its fixed copy is complete, and cleaning up a
//! destination the session created but did not finish. Files are fully
//! independent, so [`process_all_parallel`] (feature `rayon`) can run them on
//! a thread pool with no shared state.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::BatchOptions;
use crate::error::RetimeError;
use crate::naming::derive_output_path;
use crate::remux::Remuxer;
use crate::session::{RemuxOutcome, RemuxStatus};

/// The result of processing one source file.
#[derive(Debug)]
pub struct FileReport {
    /// The source that was processed.
    pub source: PathBuf,
    /// The derived destination, if a name could be derived.
    pub destination: Option<PathBuf>,
    /// How the remux ended.
    pub result: Result<RemuxOutcome, RetimeError>,
    /// Whether the source was removed afterwards.
    pub source_removed: bool,
}

impl FileReport {
    /// Flat status of this file.
    pub fn status(&self) -> RemuxStatus {
        RemuxStatus::of(&self.result)
    }

    /// Whether this file failed.
    pub fn is_failure(&self) -> bool {
        self.status().is_failure()
    }
}

/// Remux one source according to `options`.
///
/// Never returns early with an error: every failure is captured in the
/// report so the caller can continue with the next file.
pub fn process_file(source: &Path, options: &BatchOptions) -> FileReport {
    let destination = match derive_output_path(source, &options.suffix) {
        Ok(path) => path,
        Err(error) => {
            log::warn!("Skipping {}: {error}", source.display());
            return FileReport {
                source: source.to_path_buf(),
                destination: None,
                result: Err(error),
                source_removed: false,
            };
        }
    };

    let existed_before = destination.exists();
    let result = if existed_before && !options.overwrite {
        Err(RetimeError::OutputExists {
            path: destination.clone(),
        })
    } else {
        Remuxer::new(source, &destination)
            .with_options(options.remux.clone())
            .run()
    };

    let completed = matches!(&result, Ok(outcome) if outcome.is_completed());
    if !completed && !existed_before && destination.exists() {
        match fs::remove_file(&destination) {
            Ok(()) => log::debug!("Removed partial output {}", destination.display()),
            Err(error) => log::warn!(
                "Could not remove partial output {}: {error}",
                destination.display()
            ),
        }
    }

    let mut source_removed = false;
    let mut result = result;
    // An empty source completes without ever opening the destination; keep
    // the source in that case.
    if completed && !options.keep_source && destination.exists() {
        match fs::remove_file(source) {
            Ok(()) => {
                source_removed = true;
                log::debug!("Removed source {}", source.display());
            }
            Err(error) => result = Err(RetimeError::FileSystem(error)),
        }
    }

    FileReport {
        source: source.to_path_buf(),
        destination: Some(destination),
        result,
        source_removed,
    }
}

/// Process `sources` one after another.
pub fn process_all<I, P>(sources: I, options: &BatchOptions) -> Vec<FileReport>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    sources
        .into_iter()
        .map(|source| process_file(source.as_ref(), options))
        .collect()
}

/// Process `sources` on the current rayon thread pool.
///
/// Reports are returned in input order.
#[cfg(feature = "rayon")]
pub fn process_all_parallel<P>(sources: &[P], options: &BatchOptions) -> Vec<FileReport>
where
    P: AsRef<Path> + Sync,
{
    use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

    sources
        .par_iter()
        .map(|source| process_file(source.as_ref(), options))
        .collect()
}
