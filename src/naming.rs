//! Output path derivation.
//!
//! The fixed copy of `dir/name.ext` is written next to it as
//! `dir/name<suffix>.ext`, keeping the extension so the destination uses
//! the same container format as the source.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::RetimeError;

/// Derive the destination path for `source`.
///
/// The extension is everything after the last dot of the file name. A name
/// with no dot, or whose only dot is its first character, has no extension.
///
/// # Errors
///
/// Returns [`RetimeError::InvalidSuffix`] when `suffix` is empty or contains
/// a path separator, and [`RetimeError::MissingExtension`] when the file name
/// has no extension.
///
/// # Example
///
/// ```
/// use std::path::Path;
///
/// let output = retime::derive_output_path(Path::new("clips/cam1.ts"), "_convert")?;
/// assert_eq!(output, Path::new("clips/cam1_convert.ts"));
/// # Ok::<(), retime::RetimeError>(())
/// ```
pub fn derive_output_path(source: &Path, suffix: &str) -> Result<PathBuf, RetimeError> {
    validate_suffix(suffix)?;

    let missing = || RetimeError::MissingExtension {
        path: source.to_path_buf(),
    };

    let extension = source.extension().ok_or_else(missing)?;
    let stem = source.file_stem().ok_or_else(missing)?;

    let mut file_name = OsString::from(stem);
    file_name.push(suffix);
    file_name.push(".");
    file_name.push(extension);

    Ok(source.with_file_name(file_name))
}

/// Check that `suffix` keeps the destination distinct from its source and in
/// the same directory.
///
/// # Errors
///
/// Returns [`RetimeError::InvalidSuffix`] for an empty suffix or one
/// containing a path separator.
pub fn validate_suffix(suffix: &str) -> Result<(), RetimeError> {
    if suffix.is_empty() || suffix.chars().any(std::path::is_separator) {
        return Err(RetimeError::InvalidSuffix {
            suffix: suffix.to_string(),
        });
    }
    Ok(())
}
