//! FFmpeg console log level.
//!
//! FFmpeg logs to stderr on its own, independently of the Rust
//! [`log`](https://crates.io/crates/log) facade this crate reports through.
//! During a remux the muxer is the usual source of noise (for example
//! "non monotonic DTS" or "timestamps are unset" warnings). This module lets
//! callers quiet it without importing `ffmpeg-next` themselves.
//!
//! # Example
//!
//! ```no_run
//! use retime::FfmpegLogLevel;
//!
//! retime::set_ffmpeg_log_level(FfmpegLogLevel::Error);
//! let outcome = retime::remux("input.ts", "input_convert.ts").unwrap();
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use ffmpeg_next::util::log::Level;

/// FFmpeg log verbosity, from silent to most verbose.
///
/// Mirrors FFmpeg's `AV_LOG_*` levels; messages below the selected severity
/// are suppressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FfmpegLogLevel {
    /// Nothing at all.
    Quiet,
    /// Only conditions that abort the process.
    Panic,
    /// Only unrecoverable errors.
    Fatal,
    /// Recoverable errors.
    Error,
    /// Warnings (FFmpeg's default).
    Warning,
    /// Informational messages.
    Info,
    /// Verbose informational messages.
    Verbose,
    /// Debugging messages.
    Debug,
    /// Everything.
    Trace,
}

const LEVELS: [(FfmpegLogLevel, Level, &str); 9] = [
    (FfmpegLogLevel::Quiet, Level::Quiet, "quiet"),
    (FfmpegLogLevel::Panic, Level::Panic, "panic"),
    (FfmpegLogLevel::Fatal, Level::Fatal, "fatal"),
    (FfmpegLogLevel::Error, Level::Error, "error"),
    (FfmpegLogLevel::Warning, Level::Warning, "warning"),
    (FfmpegLogLevel::Info, Level::Info, "info"),
    (FfmpegLogLevel::Verbose, Level::Verbose, "verbose"),
    (FfmpegLogLevel::Debug, Level::Debug, "debug"),
    (FfmpegLogLevel::Trace, Level::Trace, "trace"),
];

impl FfmpegLogLevel {
    fn entry(self) -> (FfmpegLogLevel, Level, &'static str) {
        LEVELS[self as usize]
    }
}

impl Display for FfmpegLogLevel {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        formatter.write_str(self.entry().2)
    }
}

impl FromStr for FfmpegLogLevel {
    type Err = String;

    /// Parse a level name, case-insensitively. `warn` is accepted for
    /// `warning`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let lowered = value.to_ascii_lowercase();
        let name = if lowered == "warn" { "warning" } else { lowered.as_str() };
        LEVELS
            .iter()
            .find(|(_, _, candidate)| *candidate == name)
            .map(|(level, _, _)| *level)
            .ok_or_else(|| format!("unsupported FFmpeg log level: {value}"))
    }
}

/// Set FFmpeg's console log level.
///
/// Does not affect output of the Rust `log` facade.
pub fn set_ffmpeg_log_level(level: FfmpegLogLevel) {
    ffmpeg_next::util::log::set_level(level.entry().1);
}

/// FFmpeg's current console log level.
///
/// Returns `None` if FFmpeg reports a level between the known constants.
pub fn get_ffmpeg_log_level() -> Option<FfmpegLogLevel> {
    let current = ffmpeg_next::util::log::get_level().ok()?;
    LEVELS
        .iter()
        .find(|(_, ffmpeg_level, _)| *ffmpeg_level == current)
        .map(|(level, _, _)| *level)
}
