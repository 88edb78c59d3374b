//! # retime
//!
//! Remux media files so every stream's timeline starts at zero.
//!
//! Recordings cut out of a longer broadcast or capture often keep the
//! timestamps of the original, so players show a start time of hours in, or
//! wait before the first frame. `retime` copies such a file into a new
//! container of the same format, shifting each stream back by its first
//! timestamp and rescaling it into the destination's time base. Payloads are
//! never decoded: this is the equivalent of an `ffmpeg -c copy` pass with
//! per-stream timestamp rebasing, powered by FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate.
//!
//! ## Quick Start
//!
//! ```no_run
//! use retime::RemuxOutcome;
//!
//! match retime::remux("capture.ts", "capture_convert.ts")? {
//!     RemuxOutcome::Completed(stats) => {
//!         println!("wrote {} packets", stats.packets_written);
//!     }
//!     RemuxOutcome::AlreadyNormalized { stream, .. } => {
//!         println!("stream {stream} already starts at zero; nothing to do");
//!     }
//! }
//! # Ok::<(), retime::RetimeError>(())
//! ```
//!
//! ## How it works
//!
//! - **Stream mapping** ([`align`]) gives the destination one stream per
//!   source stream, copying codec parameters and clearing codec tags.
//! - **Timeline normalization** ([`Timeline`]) captures each stream's first
//!   pts/dts as its baseline, then shifts and rescales every packet.
//! - **The remux loop** ([`RemuxSession`]) opens the destination and writes
//!   its header lazily, right before the first packet, and writes the
//!   trailer whenever a header was written.
//! - If a stream's first timestamp is already zero the session stops with
//!   [`RemuxOutcome::AlreadyNormalized`]; that is not an error.
//!
//! The engine only talks to containers through the [`Demuxer`] and
//! [`Muxer`] traits; [`FfmpegSource`] and [`FfmpegDestination`] are the
//! FFmpeg-backed implementations.
//!
//! ### Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `rayon` | `process_all_parallel()` remuxes independent files on rayon threads |
//! | `full` | Enables all of the above |
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod backend;
pub mod batch;
pub mod config;
pub mod container;
pub mod error;
pub mod ffmpeg;
pub mod mapping;
pub mod naming;
pub mod packet;
pub mod probe;
pub mod progress;
pub mod remux;
pub mod session;
pub mod stream;
pub mod timebase;
pub mod timeline;

pub use backend::{FfmpegDestination, FfmpegSource};
#[cfg(feature = "rayon")]
pub use batch::process_all_parallel;
pub use batch::{FileReport, process_all, process_file};
pub use config::{BatchOptions, DEFAULT_SUFFIX, RemuxOptions};
pub use container::{Demuxer, Muxer};
pub use error::{IoStage, RetimeError};
pub use ffmpeg::{FfmpegLogLevel, get_ffmpeg_log_level, set_ffmpeg_log_level};
pub use mapping::align;
pub use naming::{derive_output_path, validate_suffix};
pub use packet::Packet;
pub use probe::{StartProbe, StartReport, StreamStart};
pub use progress::{ProgressCallback, ProgressInfo};
pub use remux::{Remuxer, remux};
pub use session::{RemuxOutcome, RemuxSession, RemuxStats, RemuxStatus};
pub use stream::{MediaKind, StreamDescriptor};
pub use timebase::{NOPTS_VALUE, Rounding, TimeBase, rescale, rescale_rounded};
pub use timeline::{AlreadyNormalized, StreamBaseline, Timeline};
