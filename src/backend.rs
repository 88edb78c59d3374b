//! FFmpeg-backed source and destination containers.
//!
//! [`FfmpegSource`] and [`FfmpegDestination`] implement the
//! [`Demuxer`] and [`Muxer`] traits on top of `ffmpeg-next`, dropping to
//! `ffmpeg-sys-next` where the safe wrappers couple steps the remux loop
//! needs to keep apart (opening vs. probing a source, allocating vs. opening
//! a destination) or swallow an error code (codec parameter copies).
//!
//! Each type owns its FFmpeg context and releases it on drop, together with
//! the destination's I/O handle once it has been opened.

use std::{
    ffi::CString,
    path::{Path, PathBuf},
    ptr,
};

use ffmpeg_next::{
    Error as FfmpegError, Packet as FfmpegPacket, Rational,
    codec::{Id, Parameters},
    format::context::{Input, Output},
    media::Type,
};
use ffmpeg_sys_next::{AVFMT_NOFILE, AVFormatContext, AVIO_FLAG_WRITE};

use crate::container::{Demuxer, Muxer};
use crate::error::{IoStage, RetimeError};
use crate::packet::Packet;
use crate::stream::{MediaKind, StreamDescriptor};
use crate::timebase::TimeBase;

impl From<Rational> for TimeBase {
    fn from(rational: Rational) -> Self {
        TimeBase::new(rational.numerator(), rational.denominator())
    }
}

impl From<TimeBase> for Rational {
    fn from(time_base: TimeBase) -> Self {
        Rational::new(time_base.numerator(), time_base.denominator())
    }
}

impl From<Type> for MediaKind {
    fn from(medium: Type) -> Self {
        match medium {
            Type::Video => MediaKind::Video,
            Type::Audio => MediaKind::Audio,
            Type::Subtitle => MediaKind::Subtitle,
            Type::Data => MediaKind::Data,
            Type::Attachment => MediaKind::Attachment,
            Type::Unknown => MediaKind::Unknown,
        }
    }
}

fn path_to_cstring(path: &Path) -> Result<CString, RetimeError> {
    let text = path.to_str().ok_or_else(|| RetimeError::FileOpen {
        path: path.to_path_buf(),
        reason: "Path is not valid UTF-8".to_string(),
    })?;
    CString::new(text).map_err(|_| RetimeError::FileOpen {
        path: path.to_path_buf(),
        reason: "Path contains a null byte".to_string(),
    })
}

/// A source container opened through FFmpeg.
pub struct FfmpegSource {
    path: PathBuf,
    input: Input,
}

impl FfmpegSource {
    /// Open the container at `path` without probing its streams.
    ///
    /// # Errors
    ///
    /// Returns [`RetimeError::AllocFailed`] if the format context cannot be
    /// allocated and [`RetimeError::Io`] if FFmpeg cannot open the file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, RetimeError> {
        let path = path.as_ref().to_path_buf();
        let c_path = path_to_cstring(&path)?;

        // SAFETY: `avformat_open_input` takes ownership of the context we
        // allocate and frees it (nulling the pointer) on failure. On success
        // the context is handed to `Input`, which closes it on drop.
        let input = unsafe {
            let mut context: *mut AVFormatContext = ffmpeg_sys_next::avformat_alloc_context();
            if context.is_null() {
                return Err(RetimeError::AllocFailed {
                    what: "input format context",
                });
            }

            let result = ffmpeg_sys_next::avformat_open_input(
                &mut context,
                c_path.as_ptr(),
                ptr::null_mut(),
                ptr::null_mut(),
            );
            if result < 0 {
                return Err(RetimeError::ffmpeg(
                    IoStage::OpenSource,
                    FfmpegError::from(result),
                ));
            }

            Input::wrap(context)
        };

        log::debug!("Opened source {}", path.display());
        Ok(Self { path, input })
    }

    /// Read enough of the source to fill in every stream's parameters.
    ///
    /// # Errors
    ///
    /// Returns [`RetimeError::Io`] if FFmpeg cannot determine stream info.
    pub fn probe(&mut self) -> Result<(), RetimeError> {
        // SAFETY: the context is valid for the lifetime of `self.input`.
        let result = unsafe {
            ffmpeg_sys_next::avformat_find_stream_info(self.input.as_mut_ptr(), ptr::null_mut())
        };
        if result < 0 {
            return Err(RetimeError::ffmpeg(IoStage::Probe, FfmpegError::from(result)));
        }

        log::debug!(
            "Probed {}: {} streams ({})",
            self.path.display(),
            self.input.streams().count(),
            self.input.format().name()
        );
        Ok(())
    }

    /// The path this source was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Demuxer for FfmpegSource {
    type Parameters = Parameters;
    type Payload = FfmpegPacket;

    fn streams(&self) -> Vec<StreamDescriptor<Parameters>> {
        self.input
            .streams()
            .map(|stream| StreamDescriptor {
                index: stream.index(),
                kind: stream.parameters().medium().into(),
                time_base: stream.time_base().into(),
                parameters: stream.parameters(),
            })
            .collect()
    }

    fn read_packet(&mut self) -> Result<Option<Packet<FfmpegPacket>>, RetimeError> {
        let mut packet = FfmpegPacket::empty();
        match packet.read(&mut self.input) {
            Ok(()) => {
                let position = packet.position() as i64;
                Ok(Some(Packet {
                    stream_index: packet.stream(),
                    pts: packet.pts(),
                    dts: packet.dts(),
                    duration: packet.duration(),
                    position: (position >= 0).then_some(position),
                    size: packet.size(),
                    payload: packet,
                }))
            }
            Err(FfmpegError::Eof) => Ok(None),
            Err(error) => Err(RetimeError::ffmpeg(IoStage::ReadPacket, error)),
        }
    }
}

/// A destination container allocated through FFmpeg.
///
/// The output format is inferred from the file extension. The file itself
/// is not created until [`Muxer::open_for_write`] is called.
pub struct FfmpegDestination {
    path: PathBuf,
    c_path: CString,
    output: Output,
}

impl FfmpegDestination {
    /// Allocate a destination context for `path`.
    ///
    /// # Errors
    ///
    /// Returns [`RetimeError::Io`] if no output format matches the path.
    pub fn allocate<P: AsRef<Path>>(path: P) -> Result<Self, RetimeError> {
        let path = path.as_ref().to_path_buf();
        let c_path = path_to_cstring(&path)?;

        // SAFETY: on success FFmpeg hands us a fresh context that `Output`
        // takes ownership of; on failure nothing was allocated.
        let output = unsafe {
            let mut context: *mut AVFormatContext = ptr::null_mut();
            let result = ffmpeg_sys_next::avformat_alloc_output_context2(
                &mut context,
                ptr::null_mut(),
                ptr::null(),
                c_path.as_ptr(),
            );
            if result < 0 {
                return Err(RetimeError::ffmpeg(
                    IoStage::AllocateDestination,
                    FfmpegError::from(result),
                ));
            }
            if context.is_null() {
                return Err(RetimeError::AllocFailed {
                    what: "output format context",
                });
            }
            Output::wrap(context)
        };

        log::debug!(
            "Allocated destination {} ({})",
            path.display(),
            output.format().name()
        );
        Ok(Self {
            path,
            c_path,
            output,
        })
    }

    /// The path this destination writes to.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Muxer for FfmpegDestination {
    type Parameters = Parameters;
    type Payload = FfmpegPacket;

    fn stream_count(&self) -> usize {
        self.output.streams().count()
    }

    fn stream_time_base(&self, index: usize) -> Option<TimeBase> {
        self.output
            .stream(index)
            .map(|stream| stream.time_base().into())
    }

    fn new_stream(&mut self) -> Result<usize, RetimeError> {
        let stream = self
            .output
            .add_stream(ffmpeg_next::encoder::find(Id::None))
            .map_err(|_| RetimeError::AllocFailed {
                what: "destination stream",
            })?;
        Ok(stream.index())
    }

    fn copy_codec_parameters(
        &mut self,
        index: usize,
        parameters: &Parameters,
    ) -> Result<(), RetimeError> {
        let mut stream = self
            .output
            .stream_mut(index)
            .ok_or_else(|| RetimeError::Mapping {
                stream: index,
                reason: "destination stream does not exist".to_string(),
            })?;

        // SAFETY: both pointers refer to live codec parameters owned by
        // their respective format contexts.
        let result = unsafe {
            ffmpeg_sys_next::avcodec_parameters_copy(
                (*stream.as_mut_ptr()).codecpar,
                parameters.as_ptr(),
            )
        };
        if result < 0 {
            return Err(RetimeError::Mapping {
                stream: index,
                reason: FfmpegError::from(result).to_string(),
            });
        }
        Ok(())
    }

    fn clear_codec_tag(&mut self, index: usize) {
        if let Some(mut stream) = self.output.stream_mut(index) {
            // SAFETY: the stream's codec parameters are owned by the context.
            unsafe {
                (*(*stream.as_mut_ptr()).codecpar).codec_tag = 0;
            }
        }
    }

    fn open_for_write(&mut self) -> Result<(), RetimeError> {
        // SAFETY: the context is valid; `pb` is only set here and is closed
        // by `Output`'s destructor.
        let result = unsafe {
            let context = self.output.as_mut_ptr();
            if (*(*context).oformat).flags & AVFMT_NOFILE as i32 != 0 {
                return Ok(());
            }
            ffmpeg_sys_next::avio_open(
                &mut (*context).pb,
                self.c_path.as_ptr(),
                AVIO_FLAG_WRITE as i32,
            )
        };
        if result < 0 {
            return Err(RetimeError::ffmpeg(
                IoStage::OpenDestination,
                FfmpegError::from(result),
            ));
        }

        log::debug!("Opened {} for writing", self.path.display());
        Ok(())
    }

    fn write_header(&mut self) -> Result<(), RetimeError> {
        self.output
            .write_header()
            .map_err(|error| RetimeError::ffmpeg(IoStage::WriteHeader, error))
    }

    fn write_interleaved(&mut self, packet: Packet<FfmpegPacket>) -> Result<(), RetimeError> {
        let mut payload = packet.payload;
        payload.set_stream(packet.stream_index);
        payload.set_pts(packet.pts);
        payload.set_dts(packet.dts);
        payload.set_duration(packet.duration);
        payload.set_position(packet.position.map_or(-1, |position| position as isize));
        payload
            .write_interleaved(&mut self.output)
            .map_err(|error| RetimeError::ffmpeg(IoStage::WritePacket, error))
    }

    fn write_trailer(&mut self) -> Result<(), RetimeError> {
        self.output
            .write_trailer()
            .map_err(|error| RetimeError::ffmpeg(IoStage::WriteTrailer, error))
    }
}
