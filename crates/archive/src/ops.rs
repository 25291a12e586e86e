//! Archive Operations

use crate::Archive;
use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use std::io::{Cursor, Read};
use tracing::instrument;
use zip::ZipArchive;
use zip::result::ZipError;

/// Detect the archive format of `bytes` and read the entry called `name`.
///
/// Returns [`UnsupportedFormat`](ErrorKind::UnsupportedFormat) if the bytes
/// are not a recognised container.
pub fn read_entry(bytes: &[u8], name: &str) -> Result<Vec<u8>> {
    let format = Archive::from_magic_bytes(bytes).ok_or_raise(|| ErrorKind::UnsupportedFormat)?;
    format.read_entry(bytes, name)
}

impl Archive {
    /// Read the full contents of the entry called `name`.
    ///
    /// The whole archive is expected in memory; entries are decompressed
    /// into a new buffer. Returns [`EntryNotFound`](ErrorKind::EntryNotFound)
    /// if there is no such file entry (directories don't count).
    #[instrument(skip(bytes), fields(format = %self, archive_size = bytes.len(), entry_size))]
    pub fn read_entry(&self, bytes: &[u8], name: &str) -> Result<Vec<u8>> {
        let contents = match self {
            Archive::Zip => {
                let mut archive = ZipArchive::new(Cursor::new(bytes)).or_raise(|| ErrorKind::InvalidData)?;
                let mut entry = match archive.by_name(name) {
                    Ok(entry) if !entry.is_dir() => entry,
                    Ok(_) | Err(ZipError::FileNotFound) => exn::bail!(ErrorKind::EntryNotFound(name.to_string())),
                    Err(e) => return Err(e).or_raise(|| ErrorKind::InvalidData),
                };
                let mut contents = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or_default());
                entry.read_to_end(&mut contents).or_raise(|| ErrorKind::Io)?;
                contents
            },
        };
        tracing::Span::current().record("entry_size", contents.len());
        Ok(contents)
    }
}
