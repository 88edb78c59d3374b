//! Timeline normalization.
//!
//! Every stream gets a [`StreamBaseline`]: the first presentation and
//! decoding timestamps observed for it. Each packet is shifted back by its
//! stream's baseline and rescaled into the destination time base, so the
//! output timeline of every stream starts at zero.
//!
//! A stream whose very first timestamp is already zero needs no fixing.
//! That case is reported through [`AlreadyNormalized`], which stops the whole
//! session without being an error.
//!
//! # Example
//!
//! ```
//! use retime::{MediaKind, Packet, TimeBase, Timeline};
//!
//! let mut timeline = Timeline::new(1)?;
//! let source = TimeBase::new(1, 90_000);
//! let destination = TimeBase::new(1, 1_000);
//!
//! let mut first = Packet {
//!     stream_index: 0,
//!     pts: Some(90_000),
//!     dts: Some(90_000),
//!     duration: 3_000,
//!     position: Some(4_096),
//!     size: 188,
//!     payload: (),
//! };
//! timeline.normalize(&mut first, MediaKind::Video, source, destination).unwrap();
//! assert_eq!(first.pts, Some(0));
//! assert_eq!(first.position, None);
//! # Ok::<(), retime::RetimeError>(())
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::error::RetimeError;
use crate::packet::Packet;
use crate::stream::MediaKind;
use crate::timebase::{Rounding, TimeBase, rescale, rescale_rounded};

/// Signal that a stream's first timestamp is already zero.
///
/// This is a terminal, non-error condition: the source needs no rewrite and
/// the session should stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlreadyNormalized {
    /// The stream whose first packet carried a zero timestamp.
    pub stream: usize,
}

impl Display for AlreadyNormalized {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        write!(formatter, "stream {} already starts at zero", self.stream)
    }
}

/// The origin captured for one destination stream.
///
/// Both origins start unset and, once set, never change for the rest of the
/// session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamBaseline {
    /// First observed presentation timestamp.
    pub pts_origin: Option<i64>,
    /// Origin subtracted from decoding timestamps.
    pub dts_origin: Option<i64>,
}

impl StreamBaseline {
    /// Capture any origin that is still unset from `packet`.
    ///
    /// A zero timestamp in a field whose origin is unset means the stream
    /// already starts at zero. For video streams the decoding origin is the
    /// packet's *presentation* timestamp; every other kind uses the decoding
    /// timestamp. Missing timestamps leave the origin unset.
    pub fn capture<P>(&mut self, packet: &Packet<P>, kind: MediaKind) -> Result<(), AlreadyNormalized> {
        let already_normalized = AlreadyNormalized {
            stream: packet.stream_index,
        };

        if self.pts_origin.is_none() {
            match packet.pts {
                Some(0) => return Err(already_normalized),
                Some(pts) => self.pts_origin = Some(pts),
                None => {}
            }
        }

        if self.dts_origin.is_none() {
            match packet.dts {
                Some(0) => return Err(already_normalized),
                Some(dts) => {
                    self.dts_origin = if kind == MediaKind::Video {
                        packet.pts
                    } else {
                        Some(dts)
                    };
                }
                None => {}
            }
        }

        Ok(())
    }

    /// Shift `packet` by this baseline and rescale it from `from` to `to`.
    ///
    /// Timestamps are rounded to nearest with `i64::MIN`/`i64::MAX` passed
    /// through. The duration is rescaled without sentinel handling, and the
    /// byte position is cleared because the output layout differs.
    pub fn apply<P>(&self, packet: &mut Packet<P>, from: TimeBase, to: TimeBase) {
        packet.pts = packet
            .pts
            .map(|pts| rescale_timestamp(shift(pts, self.pts_origin), from, to));
        packet.dts = packet
            .dts
            .map(|dts| rescale_timestamp(shift(dts, self.dts_origin), from, to));
        packet.duration = rescale(packet.duration, from, to);
        packet.position = None;
    }
}

fn shift(timestamp: i64, origin: Option<i64>) -> i64 {
    if timestamp == i64::MIN || timestamp == i64::MAX {
        return timestamp;
    }
    timestamp.saturating_sub(origin.unwrap_or(0))
}

fn rescale_timestamp(timestamp: i64, from: TimeBase, to: TimeBase) -> i64 {
    rescale_rounded(timestamp, from, to, Rounding::NearInfinity, true)
}

/// Baselines for every destination stream, indexed by stream index.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    baselines: Vec<StreamBaseline>,
}

impl Timeline {
    /// Create a table of `stream_count` unset baselines.
    ///
    /// # Errors
    ///
    /// Returns [`RetimeError::AllocFailed`] if the table cannot be allocated.
    pub fn new(stream_count: usize) -> Result<Self, RetimeError> {
        let mut baselines = Vec::new();
        baselines
            .try_reserve_exact(stream_count)
            .map_err(|_| RetimeError::AllocFailed {
                what: "baseline table",
            })?;
        baselines.resize(stream_count, StreamBaseline::default());
        Ok(Self { baselines })
    }

    /// Number of streams tracked.
    pub fn len(&self) -> usize {
        self.baselines.len()
    }

    /// Whether the table tracks no streams.
    pub fn is_empty(&self) -> bool {
        self.baselines.is_empty()
    }

    /// The baseline of stream `index`, if tracked.
    pub fn baseline(&self, index: usize) -> Option<&StreamBaseline> {
        self.baselines.get(index)
    }

    /// Capture the baseline of the packet's stream if it is not set yet.
    ///
    /// Packets for untracked streams are ignored.
    pub fn observe<P>(&mut self, packet: &Packet<P>, kind: MediaKind) -> Result<(), AlreadyNormalized> {
        match self.baselines.get_mut(packet.stream_index) {
            Some(baseline) => {
                let was_unset = baseline.pts_origin.is_none() || baseline.dts_origin.is_none();
                baseline.capture(packet, kind)?;
                if was_unset {
                    log::debug!(
                        "Stream {} baseline: pts origin {:?}, dts origin {:?}",
                        packet.stream_index,
                        baseline.pts_origin,
                        baseline.dts_origin
                    );
                }
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Rewrite the packet's timestamps using its stream's baseline.
    pub fn rewrite<P>(&self, packet: &mut Packet<P>, from: TimeBase, to: TimeBase) {
        if let Some(baseline) = self.baselines.get(packet.stream_index) {
            baseline.apply(packet, from, to);
        }
    }

    /// Capture the baseline if needed, then rewrite the packet.
    ///
    /// On [`AlreadyNormalized`] the packet is left unmodified.
    pub fn normalize<P>(
        &mut self,
        packet: &mut Packet<P>,
        kind: MediaKind,
        from: TimeBase,
        to: TimeBase,
    ) -> Result<(), AlreadyNormalized> {
        self.observe(packet, kind)?;
        self.rewrite(packet, from, to);
        Ok(())
    }
}
