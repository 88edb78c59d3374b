//! Stream descriptors.
//!
//! A [`StreamDescriptor`] is the engine's view of one elementary stream: its
//! position in the container, its media kind, its time base, and an opaque
//! handle to its codec parameters. The parameter type is chosen by the
//! container backend and is never inspected by the engine.

use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::timebase::TimeBase;

/// The kind of media carried by a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    /// Video frames.
    Video,
    /// Audio samples.
    Audio,
    /// Subtitles.
    Subtitle,
    /// Opaque data (timecode tracks, metadata streams).
    Data,
    /// Attachments such as embedded fonts.
    Attachment,
    /// Anything the backend could not classify.
    Unknown,
}

impl Display for MediaKind {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
            MediaKind::Subtitle => "subtitle",
            MediaKind::Data => "data",
            MediaKind::Attachment => "attachment",
            MediaKind::Unknown => "unknown",
        };
        formatter.write_str(name)
    }
}

/// One elementary stream of a source container.
#[derive(Debug, Clone)]
pub struct StreamDescriptor<P> {
    /// Position of the stream in its container.
    pub index: usize,
    /// The kind of media the stream carries.
    pub kind: MediaKind,
    /// Seconds per timestamp tick.
    pub time_base: TimeBase,
    /// Backend-specific codec parameters, copied verbatim into new
    /// destination streams.
    pub parameters: P,
}
