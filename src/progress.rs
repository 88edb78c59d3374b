//! Progress reporting.
//!
//! This module provides [`ProgressCallback`] for monitoring a remux session
//! and [`ProgressInfo`] for detailed progress snapshots. Remuxing is a single
//! pass over a finite input, so there is no cancellation: callbacks observe
//! but cannot halt the session.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use retime::{ProgressCallback, ProgressInfo, RemuxOptions, Remuxer, RetimeError};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         println!("{} packets written in {:?}", info.packets_written, info.elapsed);
//!     }
//! }
//!
//! let options = RemuxOptions::new().with_progress(Arc::new(PrintProgress));
//! Remuxer::new("input.ts", "input_convert.ts")
//!     .with_options(options)
//!     .run()?;
//! # Ok::<(), RetimeError>(())
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

/// A snapshot of remux progress.
///
/// Delivered to [`ProgressCallback::on_progress`] at a cadence controlled
/// by [`RemuxOptions::with_batch_size`](crate::RemuxOptions::with_batch_size).
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// Packets handed to the destination so far.
    pub packets_written: u64,
    /// Payload bytes handed to the destination so far.
    pub bytes_written: u64,
    /// Stream of the most recently written packet.
    pub current_stream: Option<usize>,
    /// Rewritten presentation time of the most recently written packet.
    pub current_timestamp: Option<Duration>,
    /// Wall-clock time elapsed since the session started.
    pub elapsed: Duration,
}

/// Trait for receiving progress updates during a remux.
///
/// Implementations must be [`Send`] and [`Sync`] because batch remuxing may
/// run sessions on worker threads.
pub trait ProgressCallback: Send + Sync {
    /// Called at regular intervals while packets are written.
    fn on_progress(&self, info: &ProgressInfo);
}

/// A no-op implementation that discards all progress notifications.
///
/// This is the default when no callback is configured.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Internal helper that counts written packets and emits callbacks.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    batch_size: u64,
    start_time: Instant,
    packets_written: u64,
    bytes_written: u64,
    packets_since_last_report: u64,
    current_stream: Option<usize>,
    current_timestamp: Option<Duration>,
}

impl ProgressTracker {
    pub(crate) fn new(callback: Arc<dyn ProgressCallback>, batch_size: u64) -> Self {
        Self {
            callback,
            batch_size: batch_size.max(1),
            start_time: Instant::now(),
            packets_written: 0,
            bytes_written: 0,
            packets_since_last_report: 0,
            current_stream: None,
            current_timestamp: None,
        }
    }

    /// Record one written packet and fire the callback if the batch
    /// threshold is reached.
    pub(crate) fn advance(&mut self, stream: usize, bytes: usize, timestamp: Option<Duration>) {
        self.packets_written += 1;
        self.bytes_written += bytes as u64;
        self.packets_since_last_report += 1;
        self.current_stream = Some(stream);
        if timestamp.is_some() {
            self.current_timestamp = timestamp;
        }

        if self.packets_since_last_report >= self.batch_size {
            self.report();
            self.packets_since_last_report = 0;
        }
    }

    /// Unconditionally emit a final progress report.
    pub(crate) fn finish(&mut self) {
        self.report();
    }

    pub(crate) fn packets_written(&self) -> u64 {
        self.packets_written
    }

    fn report(&self) {
        let info = ProgressInfo {
            packets_written: self.packets_written,
            bytes_written: self.bytes_written,
            current_stream: self.current_stream,
            current_timestamp: self.current_timestamp,
            elapsed: self.start_time.elapsed(),
        };

        self.callback.on_progress(&info);
    }
}
