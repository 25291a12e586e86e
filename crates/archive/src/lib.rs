//! Named-entry access to downloaded artifact archives.
//!
//! CI artifacts arrive as opaque container bytes. This crate detects the
//! container format from its magic bytes ([`Archive::from_magic_bytes`]) and
//! reads a single entry out of it by name ([`Archive::read_entry`], or the
//! [`read_entry`] shortcut that does both).
//!
//! Zip is the only container the CI provider produces today.

mod construct;
pub mod error;
mod ops;

pub use crate::ops::read_entry;

/// A supported archive container format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Archive {
    /// PKWARE zip (.zip)
    Zip,
}

#[cfg(test)]
pub(crate) mod fixture {
    use std::io::Write;

    /// Build an in-memory zip with the given entries.
    pub fn zip(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut buffer = std::io::Cursor::new(Vec::new());
        {
            let mut zip = zip::ZipWriter::new(&mut buffer);
            let options =
                zip::write::SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
            for (name, content) in entries {
                zip.start_file(*name, options).unwrap();
                zip.write_all(content.as_bytes()).unwrap();
            }
            zip.finish().unwrap();
        }
        buffer.into_inner()
    }
}
