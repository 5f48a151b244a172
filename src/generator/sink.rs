//! Output targets for serialized documents.
//!
//! The file extension picks the target: `.gz` gzip, `.zip` a single-entry
//! zip archive, `.bz2` bzip2, anything else a plain file. Codecs are only
//! available when the matching Cargo feature (`zlib`, `bzip2`) is enabled.

use crate::error::ErrorCode;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Zip,
    Bzip2,
}

impl Compression {
    pub fn from_path(path: &Utf8Path) -> Self {
        match path.extension() {
            Some("gz") => Compression::Gzip,
            Some("zip") => Compression::Zip,
            Some("bz2") => Compression::Bzip2,
            _ => Compression::None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Compression::None => "plain",
            Compression::Gzip => "gzip",
            Compression::Zip => "zip",
            Compression::Bzip2 => "bzip2",
        }
    }

    /// Whether this build can read and write the format.
    pub fn is_available(self) -> bool {
        match self {
            Compression::None => true,
            Compression::Gzip | Compression::Zip => has_zlib(),
            Compression::Bzip2 => has_bzip2(),
        }
    }
}

/// True when gzip and zip targets are compiled in.
pub fn has_zlib() -> bool {
    cfg!(feature = "zlib")
}

/// True when bzip2 targets are compiled in.
pub fn has_bzip2() -> bool {
    cfg!(feature = "bzip2")
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("{codec} compression is not available in this build (writing {path})")]
    Unsupported {
        codec: &'static str,
        path: Utf8PathBuf,
    },
    #[error("cannot create {path}")]
    Create {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot write {path}")]
    Write {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SinkError {
    /// The log code this failure is reported under.
    pub fn code(&self) -> ErrorCode {
        match self {
            SinkError::Unsupported { .. } => ErrorCode::CompressionUnsupported,
            SinkError::Create { .. } | SinkError::Write { .. } => ErrorCode::XmlFileUnwritable,
        }
    }
}

/// Name of the single entry inside a `.zip` target: the file name with the
/// `.zip` suffix removed.
pub fn zip_entry_name(path: &Utf8Path) -> String {
    path.file_name()
        .map(|name| name.strip_suffix(".zip").unwrap_or(name))
        .filter(|name| !name.is_empty())
        .unwrap_or("model.xml")
        .to_string()
}

/// Write `text` to `path`, compressed according to the extension.
///
/// The codec check happens before the file is created, so an unsupported
/// target leaves nothing behind.
#[instrument(skip(text), fields(bytes = text.len()))]
pub fn write_text(path: &Utf8Path, text: &str) -> Result<(), SinkError> {
    let compression = Compression::from_path(path);
    if !compression.is_available() {
        return Err(SinkError::Unsupported {
            codec: compression.name(),
            path: path.to_owned(),
        });
    }

    let file = File::create(path.as_std_path()).map_err(|source| SinkError::Create {
        path: path.to_owned(),
        source,
    })?;
    debug!(codec = compression.name(), "writing document");

    encode(file, path, compression, text.as_bytes()).map_err(|source| SinkError::Write {
        path: path.to_owned(),
        source,
    })
}

fn encode(file: File, path: &Utf8Path, compression: Compression, data: &[u8]) -> io::Result<()> {
    match compression {
        Compression::None => {
            let mut out = BufWriter::new(file);
            out.write_all(data)?;
            out.flush()
        }
        Compression::Gzip => write_gzip(file, data),
        Compression::Zip => write_zip(file, &zip_entry_name(path), data),
        Compression::Bzip2 => write_bzip2(file, data),
    }
}

#[cfg(feature = "zlib")]
fn write_gzip(file: File, data: &[u8]) -> io::Result<()> {
    let mut encoder =
        flate2::write::GzEncoder::new(BufWriter::new(file), flate2::Compression::default());
    encoder.write_all(data)?;
    encoder.finish()?.flush()
}

#[cfg(feature = "zlib")]
fn write_zip(file: File, entry: &str, data: &[u8]) -> io::Result<()> {
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::FileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);
    zip.start_file(entry, options).map_err(io::Error::other)?;
    zip.write_all(data)?;
    zip.finish().map_err(io::Error::other)?;
    Ok(())
}

#[cfg(feature = "bzip2")]
fn write_bzip2(file: File, data: &[u8]) -> io::Result<()> {
    let mut encoder = bzip2::write::BzEncoder::new(BufWriter::new(file), bzip2::Compression::default());
    encoder.write_all(data)?;
    encoder.finish()?.flush()
}

#[cfg(not(feature = "zlib"))]
fn write_gzip(_file: File, _data: &[u8]) -> io::Result<()> {
    Err(io::Error::new(io::ErrorKind::Unsupported, "gzip support not compiled in"))
}

#[cfg(not(feature = "zlib"))]
fn write_zip(_file: File, _entry: &str, _data: &[u8]) -> io::Result<()> {
    Err(io::Error::new(io::ErrorKind::Unsupported, "zip support not compiled in"))
}

#[cfg(not(feature = "bzip2"))]
fn write_bzip2(_file: File, _data: &[u8]) -> io::Result<()> {
    Err(io::Error::new(io::ErrorKind::Unsupported, "bzip2 support not compiled in"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_selects_codec() {
        assert_eq!(Compression::from_path(Utf8Path::new("a.xml.gz")), Compression::Gzip);
        assert_eq!(Compression::from_path(Utf8Path::new("a.xml.zip")), Compression::Zip);
        assert_eq!(Compression::from_path(Utf8Path::new("a.xml.bz2")), Compression::Bzip2);
        assert_eq!(Compression::from_path(Utf8Path::new("a.xml")), Compression::None);
        assert_eq!(Compression::from_path(Utf8Path::new("gz")), Compression::None);
    }

    #[test]
    fn zip_entry_drops_suffix() {
        assert_eq!(zip_entry_name(Utf8Path::new("/tmp/test.xml.zip")), "test.xml");
        assert_eq!(zip_entry_name(Utf8Path::new(".zip")), "model.xml");
    }

    #[test]
    fn missing_directory_is_unwritable() {
        let err = write_text(Utf8Path::new("/tmp/impossible/path/should/fail"), "x").unwrap_err();
        assert_eq!(err.code(), ErrorCode::XmlFileUnwritable);
    }
}
