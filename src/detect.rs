use crate::error::{GencodeError, Result};
use crate::header::{check_header, read_header};
use crate::source::open_path;
use std::path::{Path, PathBuf};

/// Supported compression formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
}

impl Compression {
    /// Returns true when the input is compressed.
    pub fn is_compressed(self) -> bool {
        !matches!(self, Compression::None)
    }
}

/// Detects the compression of a GTF path from its extension(s).
///
/// Handles nested extensions like `.gtf.gz`.
///
/// # Errors
///
/// Returns an error if the path does not end in `.gtf`, `.gtf.gz` or `.gtf.gzip`.
///
/// # Example
///
/// ```rust, ignore
/// use gencode_gtf::detect::{detect_compression, Compression};
/// use std::path::Path;
///
/// let compression = detect_compression(Path::new("gencode.v43.annotation.gtf.gz"))?;
/// assert_eq!(compression, Compression::Gzip);
/// ```
pub fn detect_compression(path: &Path) -> Result<Compression> {
    let unsupported = || GencodeError::UnsupportedExtension(path.display().to_string());
    let ext = extension_lowercase(path).ok_or_else(unsupported)?;

    match ext.as_str() {
        "gtf" => Ok(Compression::None),
        "gz" | "gzip" => match nested_extension(path).as_deref() {
            Some("gtf") => Ok(Compression::Gzip),
            _ => Err(unsupported()),
        },
        _ => Err(unsupported()),
    }
}

/// Returns true if `path` can be decoded as a GENCODE GTF.
///
/// The extension must be a GTF extension, the file must be readable and its
/// leading comment block must be a GENCODE header. An extension match alone
/// is not enough.
///
/// # Example
///
/// ```rust, ignore
/// use gencode_gtf::can_decode;
/// use std::path::Path;
///
/// if can_decode(Path::new("gencode.v43.annotation.gtf")) {
///     // decode it
/// }
/// ```
pub fn can_decode(path: &Path) -> bool {
    if detect_compression(path).is_err() {
        log::warn!("{}: not a GTF extension", path.display());
        return false;
    }

    let header = open_path(path).and_then(|mut source| Ok(read_header(&mut source)?));
    match header {
        Ok(header) => match check_header(&header) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("{}: {}", path.display(), err);
                false
            }
        },
        Err(err) => {
            log::warn!("{}: cannot read header: {}", path.display(), err);
            false
        }
    }
}

/// Extracts the lowercase extension from a path.
fn extension_lowercase(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Returns the inner extension for compressed files (e.g., `.gtf.gz` -> `gtf`).
fn nested_extension(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    extension_lowercase(&PathBuf::from(stem))
}
