//! Error types for the `retime` crate.
//!
//! This module defines [`RetimeError`], the unified error type returned by all
//! fallible operations in the crate, and [`IoStage`], which names the step of
//! a remux session that an I/O failure happened in. Errors carry enough
//! context (paths, stream indices, FFmpeg error codes) to diagnose a failure
//! without additional logging at the call site.
//!
//! Note that a source whose timestamps already start at zero is **not** an
//! error: it is reported as [`RemuxOutcome::AlreadyNormalized`](crate::RemuxOutcome).

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    io::Error as IoError,
    path::PathBuf,
};

use thiserror::Error;

/// The step of a remux session in which an I/O failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IoStage {
    /// Opening the source container.
    OpenSource,
    /// Probing the source's stream information.
    Probe,
    /// Allocating the destination context from the target path.
    AllocateDestination,
    /// Opening the destination file for writing.
    OpenDestination,
    /// Writing the destination container header.
    WriteHeader,
    /// Reading a packet from the source.
    ReadPacket,
    /// Writing a packet to the destination.
    WritePacket,
    /// Writing the destination container trailer.
    WriteTrailer,
}

impl Display for IoStage {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        let text = match self {
            IoStage::OpenSource => "opening source",
            IoStage::Probe => "probing stream info",
            IoStage::AllocateDestination => "allocating destination",
            IoStage::OpenDestination => "opening destination",
            IoStage::WriteHeader => "writing header",
            IoStage::ReadPacket => "reading packet",
            IoStage::WritePacket => "writing packet",
            IoStage::WriteTrailer => "writing trailer",
        };
        formatter.write_str(text)
    }
}

/// The unified error type for all `retime` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RetimeError {
    /// The source media file could not be opened.
    #[error("Failed to open media file at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to the remuxer.
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// A context or table allocation failed.
    #[error("Failed to allocate {what}")]
    AllocFailed {
        /// What was being allocated.
        what: &'static str,
    },

    /// An open, probe, read, or write failed.
    #[error("I/O failure while {stage}: {reason}")]
    Io {
        /// The session step that failed.
        stage: IoStage,
        /// The underlying (negative) FFmpeg error code, if one exists.
        code: Option<i32>,
        /// Human-readable error text.
        reason: String,
    },

    /// Codec parameters could not be copied into a destination stream.
    #[error("Failed to map stream {stream}: {reason}")]
    Mapping {
        /// Source stream index whose parameters could not be copied.
        stream: usize,
        /// Underlying reason the copy failed.
        reason: String,
    },

    /// The source file name has no extension to derive an output name from.
    #[error("Cannot derive an output name for {path}: file has no extension")]
    MissingExtension {
        /// The offending source path.
        path: PathBuf,
    },

    /// The output suffix would not produce a distinct file next to the source.
    #[error("Invalid output suffix {suffix:?}: it must be non-empty and contain no path separator")]
    InvalidSuffix {
        /// The rejected suffix.
        suffix: String,
    },

    /// The destination already exists and overwriting was not allowed.
    #[error("Output already exists: {path} (use --overwrite to replace)")]
    OutputExists {
        /// The existing destination path.
        path: PathBuf,
    },

    /// A filesystem operation outside FFmpeg failed.
    #[error("File system error: {0}")]
    FileSystem(#[from] IoError),
}

impl RetimeError {
    /// Build an [`RetimeError::Io`] from an FFmpeg error at the given stage.
    pub(crate) fn ffmpeg(stage: IoStage, error: ffmpeg_next::Error) -> Self {
        RetimeError::Io {
            stage,
            code: Some(i32::from(error)),
            reason: error.to_string(),
        }
    }

    /// The underlying FFmpeg error code, when the failure came from FFmpeg.
    pub fn code(&self) -> Option<i32> {
        match self {
            RetimeError::Io { code, .. } => *code,
            _ => None,
        }
    }
}
