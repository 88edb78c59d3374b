//! Dry-run timeline inspection.
//!
//! [`StartProbe`] reads the leading packets of a source and reports, per
//! stream, the first timestamps a remux would capture as its baseline. The
//! verdict uses the same rules as the remux session, so
//! [`StartReport::needs_fix`] predicts whether [`remux`](crate::remux) would
//! rewrite the file or stop with
//! [`RemuxOutcome::AlreadyNormalized`](crate::RemuxOutcome). Nothing is
//! written.

use std::path::Path;

use crate::backend::FfmpegSource;
use crate::container::Demuxer;
use crate::error::RetimeError;
use crate::stream::MediaKind;
use crate::timebase::TimeBase;
use crate::timeline::{StreamBaseline, Timeline};

/// Default number of packets read before giving up on silent streams.
pub const DEFAULT_PACKET_LIMIT: u64 = 10_000;

/// Start-of-timeline information for one stream.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamStart {
    /// Stream index.
    pub index: usize,
    /// The kind of media carried.
    pub kind: MediaKind,
    /// The stream's time base.
    pub time_base: TimeBase,
    /// Origins a remux would subtract, as far as they were observed.
    pub baseline: StreamBaseline,
}

impl StreamStart {
    /// First presentation time in seconds, if observed.
    pub fn start_seconds(&self) -> Option<f64> {
        self.baseline
            .pts_origin
            .map(|pts| self.time_base.seconds(pts))
    }
}

/// What a probe found.
#[derive(Debug, Clone, PartialEq)]
pub struct StartReport {
    /// One entry per source stream.
    pub streams: Vec<StreamStart>,
    /// Stream whose first timestamp was zero, if any.
    pub already_normalized: Option<usize>,
    /// Packets read before the probe stopped.
    pub packets_read: u64,
}

impl StartReport {
    /// Whether a remux would rewrite this source.
    ///
    /// False when a stream starts at zero, and also when no stream carried a
    /// timestamp at all: such a remux writes no packets and no file.
    pub fn needs_fix(&self) -> bool {
        self.already_normalized.is_none()
            && self.streams.iter().any(|stream| {
                stream.baseline.pts_origin.is_some() || stream.baseline.dts_origin.is_some()
            })
    }
}

/// Timeline probe.
pub struct StartProbe;

impl StartProbe {
    /// Open `path` and inspect its leading packets.
    ///
    /// # Errors
    ///
    /// Returns the same open, probe and read errors as a remux would.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use retime::StartProbe;
    ///
    /// let report = StartProbe::probe("capture.ts")?;
    /// for stream in &report.streams {
    ///     println!("#{} {} starts at {:?}s", stream.index, stream.kind, stream.start_seconds());
    /// }
    /// # Ok::<(), retime::RetimeError>(())
    /// ```
    pub fn probe<P: AsRef<Path>>(path: P) -> Result<StartReport, RetimeError> {
        ffmpeg_next::init().map_err(|error| RetimeError::FileOpen {
            path: path.as_ref().to_path_buf(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let mut source = FfmpegSource::open(path)?;
        source.probe()?;
        Self::inspect(&mut source, DEFAULT_PACKET_LIMIT)
    }

    /// Inspect an already opened source, reading at most `packet_limit`
    /// packets.
    ///
    /// Stops early once every stream has both origins, or as soon as a
    /// stream turns out to start at zero.
    pub fn inspect<D: Demuxer>(source: &mut D, packet_limit: u64) -> Result<StartReport, RetimeError> {
        let descriptors = source.streams();
        let mut timeline = Timeline::new(descriptors.len())?;
        let mut already_normalized = None;
        let mut packets_read = 0;

        while packets_read < packet_limit {
            let Some(packet) = source.read_packet()? else {
                break;
            };
            packets_read += 1;

            if packet.is_empty() {
                continue;
            }
            let Some(descriptor) = descriptors.get(packet.stream_index) else {
                continue;
            };

            if let Err(signal) = timeline.observe(&packet, descriptor.kind) {
                already_normalized = Some(signal.stream);
                break;
            }

            let complete = (0..timeline.len()).all(|index| {
                timeline
                    .baseline(index)
                    .is_some_and(|baseline| baseline.pts_origin.is_some() && baseline.dts_origin.is_some())
            });
            if complete {
                break;
            }
        }

        let streams = descriptors
            .iter()
            .map(|descriptor| StreamStart {
                index: descriptor.index,
                kind: descriptor.kind,
                time_base: descriptor.time_base,
                baseline: timeline
                    .baseline(descriptor.index)
                    .copied()
                    .unwrap_or_default(),
            })
            .collect();

        Ok(StartReport {
            streams,
            already_normalized,
            packets_read,
        })
    }
}
