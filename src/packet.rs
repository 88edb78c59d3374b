//! The engine's view of one demuxed packet.
//!
//! A [`Packet`] lives for exactly one iteration of the remux loop: it is
//! produced by a [`Demuxer`](crate::Demuxer), rewritten in place by the
//! timeline, and handed by value to a [`Muxer`](crate::Muxer).

/// One packet of encoded data for a single stream.
///
/// Timestamps are expressed in the time base of the stream the packet
/// belongs to. `None` means the container did not provide a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet<P> {
    /// Index of the stream this packet belongs to.
    pub stream_index: usize,
    /// Presentation timestamp.
    pub pts: Option<i64>,
    /// Decoding timestamp.
    pub dts: Option<i64>,
    /// Duration in stream ticks (0 if unknown).
    pub duration: i64,
    /// Byte offset of the packet in the source container, if known.
    pub position: Option<i64>,
    /// Payload size in bytes.
    pub size: usize,
    /// Backend-specific payload, passed through untouched.
    pub payload: P,
}

impl<P> Packet<P> {
    /// Whether the packet carries no payload bytes.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}
