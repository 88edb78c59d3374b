//! The remux loop.
//!
//! A [`RemuxSession`] owns an opened source and an allocated destination.
//! Creating it aligns the destination's streams and allocates the baseline
//! table; [`run`](RemuxSession::run) then pulls every packet from the source,
//! normalizes its timestamps and writes it to the destination. The
//! destination is only opened, and its header only written, once the first
//! packet is ready, so a source that needs no fixing never produces a
//! destination file.
//!
//! Both containers are released when the session is dropped, whichever way
//! the loop ended.

use std::time::Duration;

use crate::config::RemuxOptions;
use crate::container::{Demuxer, Muxer};
use crate::error::{IoStage, RetimeError};
use crate::mapping::align;
use crate::progress::ProgressTracker;
use crate::stream::StreamDescriptor;
use crate::timeline::{AlreadyNormalized, Timeline};

/// Counters collected over one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemuxStats {
    /// Destination streams created by stream mapping.
    pub streams_created: usize,
    /// Packets read from the source, including empty and dropped ones.
    pub packets_read: u64,
    /// Packets written to the destination.
    pub packets_written: u64,
    /// Packets skipped because they were empty or had no destination stream.
    pub packets_dropped: u64,
    /// Whether the destination header was written.
    pub header_written: bool,
}

/// How a session that did not fail ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemuxOutcome {
    /// Every packet was rewritten and the trailer was written.
    Completed(RemuxStats),
    /// A stream already starts at zero; the session stopped early.
    ///
    /// The source needs no fixing and should be kept.
    AlreadyNormalized {
        /// The stream whose first timestamp was zero.
        stream: usize,
        /// Counters up to the point the session stopped.
        stats: RemuxStats,
    },
}

impl RemuxOutcome {
    /// The session counters.
    pub fn stats(&self) -> &RemuxStats {
        match self {
            RemuxOutcome::Completed(stats) => stats,
            RemuxOutcome::AlreadyNormalized { stats, .. } => stats,
        }
    }

    /// Whether the session ran to the end of the source.
    pub fn is_completed(&self) -> bool {
        matches!(self, RemuxOutcome::Completed(_))
    }
}

/// A flat status for one remux, suitable for exit codes and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemuxStatus {
    /// The destination was fully written.
    Completed,
    /// The source already starts at zero.
    AlreadyNormalized,
    /// Codec parameters could not be copied.
    MappingFailed,
    /// An open, probe, read or write failed, with the FFmpeg code if known.
    IoFailed(Option<i32>),
    /// A context or table allocation failed.
    AllocFailed,
}

impl RemuxStatus {
    /// Classify the result of a remux.
    pub fn of(result: &Result<RemuxOutcome, RetimeError>) -> Self {
        match result {
            Ok(RemuxOutcome::Completed(_)) => RemuxStatus::Completed,
            Ok(RemuxOutcome::AlreadyNormalized { .. }) => RemuxStatus::AlreadyNormalized,
            Err(RetimeError::Mapping { .. }) => RemuxStatus::MappingFailed,
            Err(RetimeError::AllocFailed { .. }) => RemuxStatus::AllocFailed,
            Err(error) => RemuxStatus::IoFailed(error.code()),
        }
    }

    /// Whether this status counts as a failure.
    pub fn is_failure(self) -> bool {
        !matches!(self, RemuxStatus::Completed | RemuxStatus::AlreadyNormalized)
    }
}

/// Why the packet loop stopped without an error.
enum LoopExit {
    EndOfStream,
    AlreadyNormalized(AlreadyNormalized),
}

/// One remux from a source to a destination.
pub struct RemuxSession<D, M>
where
    D: Demuxer,
    M: Muxer<Parameters = D::Parameters, Payload = D::Payload>,
{
    source: D,
    destination: M,
    source_streams: Vec<StreamDescriptor<D::Parameters>>,
    timeline: Timeline,
    header_written: bool,
    stats: RemuxStats,
    progress: ProgressTracker,
}

impl<D, M> RemuxSession<D, M>
where
    D: Demuxer,
    M: Muxer<Parameters = D::Parameters, Payload = D::Payload>,
{
    /// Align the destination's streams with the source and allocate one
    /// baseline per destination stream.
    ///
    /// # Errors
    ///
    /// Returns [`RetimeError::Mapping`] if a stream cannot be mapped, or
    /// [`RetimeError::AllocFailed`] if a stream or the baseline table cannot
    /// be allocated. Both containers are released before returning.
    pub fn new(source: D, mut destination: M, options: &RemuxOptions) -> Result<Self, RetimeError> {
        let source_streams = source.streams();
        let streams_created = align(&source_streams, &mut destination)?;
        let timeline = Timeline::new(destination.stream_count())?;

        log::debug!(
            "Session ready: {} source streams, {} destination streams",
            source_streams.len(),
            timeline.len()
        );

        Ok(Self {
            source,
            destination,
            source_streams,
            timeline,
            header_written: false,
            stats: RemuxStats {
                streams_created,
                ..RemuxStats::default()
            },
            progress: ProgressTracker::new(options.progress.clone(), options.batch_size),
        })
    }

    /// The per-stream baselines captured so far.
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Whether the destination header has been written.
    pub fn header_written(&self) -> bool {
        self.header_written
    }

    /// Copy every packet from the source to the destination.
    ///
    /// The trailer is written whenever the header was, however the loop
    /// ended. A trailer failure is reported only when the loop itself
    /// completed; otherwise it is logged and the original outcome returned.
    ///
    /// # Errors
    ///
    /// Returns [`RetimeError::Io`] on the first read or write failure.
    pub fn run(mut self) -> Result<RemuxOutcome, RetimeError> {
        let exit = self.pump();
        let trailer = self.finish();

        match exit {
            Ok(LoopExit::EndOfStream) => {
                trailer?;
                self.progress.finish();
                self.stats.packets_written = self.progress.packets_written();
                log::info!(
                    "Remux complete: {} packets written, {} dropped",
                    self.stats.packets_written,
                    self.stats.packets_dropped
                );
                Ok(RemuxOutcome::Completed(self.stats))
            }
            Ok(LoopExit::AlreadyNormalized(signal)) => {
                if let Err(error) = trailer {
                    log::warn!("Ignoring trailer failure after early stop: {error}");
                }
                self.stats.packets_written = self.progress.packets_written();
                log::info!("Nothing to fix: {signal}");
                Ok(RemuxOutcome::AlreadyNormalized {
                    stream: signal.stream,
                    stats: self.stats,
                })
            }
            Err(error) => {
                if let Err(trailer_error) = trailer {
                    log::warn!("Ignoring trailer failure after error: {trailer_error}");
                }
                Err(error)
            }
        }
    }

    fn pump(&mut self) -> Result<LoopExit, RetimeError> {
        while let Some(mut packet) = self.source.read_packet()? {
            self.stats.packets_read += 1;

            if packet.is_empty() || packet.stream_index >= self.timeline.len() {
                self.stats.packets_dropped += 1;
                continue;
            }
            let Some(source_stream) = self.source_streams.get(packet.stream_index) else {
                self.stats.packets_dropped += 1;
                continue;
            };
            let (kind, source_time_base) = (source_stream.kind, source_stream.time_base);

            if let Err(signal) = self.timeline.observe(&packet, kind) {
                return Ok(LoopExit::AlreadyNormalized(signal));
            }

            self.ensure_header()?;

            let Some(destination_time_base) = self.destination.stream_time_base(packet.stream_index)
            else {
                self.stats.packets_dropped += 1;
                continue;
            };
            self.timeline
                .rewrite(&mut packet, source_time_base, destination_time_base);

            let (stream, size) = (packet.stream_index, packet.size);
            let timestamp = packet
                .pts
                .and_then(|pts| Duration::try_from_secs_f64(destination_time_base.seconds(pts)).ok());

            self.destination.write_interleaved(packet)?;
            self.progress.advance(stream, size, timestamp);
        }

        Ok(LoopExit::EndOfStream)
    }

    fn ensure_header(&mut self) -> Result<(), RetimeError> {
        if self.header_written {
            return Ok(());
        }

        self.destination.open_for_write()?;
        self.destination.write_header()?;
        self.header_written = true;
        self.stats.header_written = true;
        log::debug!("Destination opened and header written");
        Ok(())
    }

    fn finish(&mut self) -> Result<(), RetimeError> {
        if !self.header_written {
            log::debug!("Header never written; skipping trailer");
            return Ok(());
        }

        self.destination.write_trailer().map_err(|error| match error {
            RetimeError::Io { code, reason, .. } => RetimeError::Io {
                stage: IoStage::WriteTrailer,
                code,
                reason,
            },
            other => other,
        })
    }
}
