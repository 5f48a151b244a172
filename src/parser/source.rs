//! Content sources for reading SBML text from the filesystem or from
//! compressed files.

use crate::generator::sink::{Compression, zip_entry_name};
use anyhow::{Context, Result, bail};
use camino::Utf8Path;
use std::io::Read;

/// Trait for abstracting where document text comes from.
pub trait ContentSource {
    /// Read the document at the given logical path and return its text.
    fn read_to_string(&mut self, path: &Utf8Path) -> Result<String>;
}

/// Reads files from the local filesystem, decompressing `.gz`, `.zip` and
/// `.bz2` files on the way.
pub struct FsSource;

impl ContentSource for FsSource {
    fn read_to_string(&mut self, path: &Utf8Path) -> Result<String> {
        let compression = Compression::from_path(path);
        if !compression.is_available() {
            bail!(
                "{} compression is not available in this build (reading {})",
                compression.name(),
                path
            );
        }
        match compression {
            Compression::None => std::fs::read_to_string(path.as_std_path())
                .with_context(|| format!("Failed to read {}", path)),
            Compression::Gzip => read_gzip(path),
            Compression::Bzip2 => read_bzip2(path),
            Compression::Zip => {
                let file = std::fs::File::open(path.as_std_path())
                    .with_context(|| format!("Failed to open {}", path))?;
                let mut zip = ZipSource::new(std::io::BufReader::new(file))?;
                zip.read_document(&zip_entry_name(path))
            }
        }
    }
}

fn open(path: &Utf8Path) -> Result<std::fs::File> {
    std::fs::File::open(path.as_std_path()).with_context(|| format!("Failed to open {}", path))
}

#[cfg(feature = "zlib")]
fn read_gzip(path: &Utf8Path) -> Result<String> {
    let mut text = String::new();
    flate2::read::GzDecoder::new(open(path)?)
        .read_to_string(&mut text)
        .with_context(|| format!("Failed to decompress {}", path))?;
    Ok(text)
}

#[cfg(feature = "bzip2")]
fn read_bzip2(path: &Utf8Path) -> Result<String> {
    let mut text = String::new();
    bzip2::read::BzDecoder::new(open(path)?)
        .read_to_string(&mut text)
        .with_context(|| format!("Failed to decompress {}", path))?;
    Ok(text)
}

#[cfg(not(feature = "zlib"))]
fn read_gzip(path: &Utf8Path) -> Result<String> {
    bail!("gzip support not compiled in (reading {})", path)
}

#[cfg(not(feature = "bzip2"))]
fn read_bzip2(path: &Utf8Path) -> Result<String> {
    bail!("bzip2 support not compiled in (reading {})", path)
}

/// Reads entries from a zip archive.
#[cfg(feature = "zlib")]
pub struct ZipSource<R: Read + std::io::Seek> {
    zip: zip::ZipArchive<R>,
}

#[cfg(feature = "zlib")]
impl<R: Read + std::io::Seek> ZipSource<R> {
    pub fn new(reader: R) -> Result<Self> {
        let zip = zip::ZipArchive::new(reader).context("Failed to open zip archive")?;
        Ok(Self { zip })
    }

    /// Read the entry named `preferred`, or the first entry when the archive
    /// has no entry of that name.
    pub fn read_document(&mut self, preferred: &str) -> Result<String> {
        if self.zip.is_empty() {
            bail!("Zip archive has no entries");
        }
        let name = if self.zip.file_names().any(|n| n == preferred) {
            preferred.to_string()
        } else {
            self.zip.by_index(0)?.name().to_string()
        };
        self.read_to_string(Utf8Path::new(&name))
    }
}

#[cfg(feature = "zlib")]
impl<R: Read + std::io::Seek> ContentSource for ZipSource<R> {
    fn read_to_string(&mut self, path: &Utf8Path) -> Result<String> {
        let p = path.as_str().trim_start_matches("./").trim_start_matches('/');
        let mut f = self
            .zip
            .by_name(p)
            .with_context(|| format!("File {} not found in zip", p))?;
        let mut s = String::new();
        f.read_to_string(&mut s)
            .with_context(|| format!("Failed to read {} from zip", p))?;
        Ok(s)
    }
}

/// Stand-in used when zip support is compiled out; never constructed
/// successfully.
#[cfg(not(feature = "zlib"))]
pub struct ZipSource<R> {
    _reader: R,
}

#[cfg(not(feature = "zlib"))]
impl<R: Read> ZipSource<R> {
    pub fn new(_reader: R) -> Result<Self> {
        bail!("zip support not compiled in")
    }

    pub fn read_document(&mut self, _preferred: &str) -> Result<String> {
        bail!("zip support not compiled in")
    }
}
