//! Container collaborator interfaces.
//!
//! The remux engine never touches a container format directly. It pulls
//! packets from a [`Demuxer`] and pushes them into a [`Muxer`]; everything
//! about binary layouts, codec parameter representation and file I/O lives
//! behind these two traits. [`FfmpegSource`](crate::FfmpegSource) and
//! [`FfmpegDestination`](crate::FfmpegDestination) are the FFmpeg-backed
//! implementations used by [`remux`](crate::remux).

use crate::error::RetimeError;
use crate::packet::Packet;
use crate::stream::StreamDescriptor;
use crate::timebase::TimeBase;

/// The reading side of a remux: an opened, probed source container.
pub trait Demuxer {
    /// Backend representation of one stream's codec parameters.
    type Parameters;
    /// Backend representation of a packet payload.
    type Payload;

    /// All streams of the source, ordered by index.
    fn streams(&self) -> Vec<StreamDescriptor<Self::Parameters>>;

    /// Read the next packet.
    ///
    /// Returns `Ok(None)` at end of stream.
    fn read_packet(&mut self) -> Result<Option<Packet<Self::Payload>>, RetimeError>;
}

/// The writing side of a remux: an allocated destination container.
///
/// A destination starts closed. Nothing is committed to storage until
/// [`open_for_write`](Muxer::open_for_write) and
/// [`write_header`](Muxer::write_header) have been called.
pub trait Muxer {
    /// Backend representation of one stream's codec parameters.
    type Parameters;
    /// Backend representation of a packet payload.
    type Payload;

    /// Number of streams currently defined in the destination.
    fn stream_count(&self) -> usize;

    /// Time base of a destination stream.
    ///
    /// Muxers may settle on a different time base when the header is
    /// written, so callers should query this after
    /// [`write_header`](Muxer::write_header).
    fn stream_time_base(&self, index: usize) -> Option<TimeBase>;

    /// Append an empty stream and return its index.
    fn new_stream(&mut self) -> Result<usize, RetimeError>;

    /// Copy codec parameters into the destination stream at `index`.
    fn copy_codec_parameters(
        &mut self,
        index: usize,
        parameters: &Self::Parameters,
    ) -> Result<(), RetimeError>;

    /// Clear the container-specific codec tag of the stream at `index`.
    fn clear_codec_tag(&mut self, index: usize);

    /// Open the destination's storage for writing.
    fn open_for_write(&mut self) -> Result<(), RetimeError>;

    /// Write the container header.
    fn write_header(&mut self) -> Result<(), RetimeError>;

    /// Write one packet, letting the muxer interleave by timestamp.
    fn write_interleaved(&mut self, packet: Packet<Self::Payload>) -> Result<(), RetimeError>;

    /// Flush interleaving buffers and write the container trailer.
    fn write_trailer(&mut self) -> Result<(), RetimeError>;
}
