//! Stream mapping.
//!
//! Before any packet is copied, the destination must define a stream for
//! every source stream. [`align`] creates the missing ones by copying codec
//! parameters from the source; streams the destination already has are left
//! untouched.

use crate::container::Muxer;
use crate::error::RetimeError;
use crate::stream::StreamDescriptor;

/// Ensure `destination` has at least as many streams as `sources`.
///
/// For each source stream whose index is not yet covered by the
/// destination, a new destination stream is created, the source's codec
/// parameters are copied into it and its codec tag is cleared so the
/// destination container can assign its own. Existing destination streams
/// are never removed or reordered, so calling this twice is the same as
/// calling it once.
///
/// Returns the number of streams created.
///
/// # Errors
///
/// Returns [`RetimeError::Mapping`] if the parameters of any stream cannot
/// be copied. The destination is then only partially mapped and must not be
/// written.
pub fn align<P, M>(sources: &[StreamDescriptor<P>], destination: &mut M) -> Result<usize, RetimeError>
where
    M: Muxer<Parameters = P>,
{
    let existing = destination.stream_count();
    if sources.len() <= existing {
        log::debug!(
            "Destination already has {existing} streams (source has {}); nothing to map",
            sources.len()
        );
        return Ok(0);
    }

    for source in &sources[existing..] {
        let index = destination.new_stream()?;
        destination
            .copy_codec_parameters(index, &source.parameters)
            .map_err(|error| RetimeError::Mapping {
                stream: source.index,
                reason: match error {
                    RetimeError::Mapping { reason, .. } => reason,
                    other => other.to_string(),
                },
            })?;
        destination.clear_codec_tag(index);

        log::debug!(
            "Mapped {} stream {} -> destination stream {index} (time base {})",
            source.kind,
            source.index,
            source.time_base
        );
    }

    Ok(sources.len() - existing)
}
