use crate::Archive;
use std::fmt::{Display, Formatter, Result as FmtResult};

// Local file header, and the end-of-central-directory record that starts an
// archive with no entries at all.
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];
const ZIP_EMPTY_MAGIC: [u8; 4] = [0x50, 0x4B, 0x05, 0x06];

impl Archive {
    /// Detect the container format from magic bytes.
    ///
    /// Returns `None` if no magic bytes match or if the input is too short
    /// to detect any format.
    #[must_use]
    pub fn from_magic_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&ZIP_MAGIC) || bytes.starts_with(&ZIP_EMPTY_MAGIC) {
            return Some(Archive::Zip);
        }
        None
    }

    /// Returns the short name (for displaying to user)
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Archive::Zip => "zip",
        }
    }
}

impl Display for Archive {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use crate::Archive;
    use rstest::rstest;

    #[rstest]
    #[case(&[0x50, 0x4B, 0x03, 0x04, 0x14, 0x00], Some(Archive::Zip))]
    #[case(&[0x50, 0x4B, 0x05, 0x06], Some(Archive::Zip))]
    #[case(b"SQLite format 3\0", None)]
    #[case(&[0x1F, 0x8B, 0x08, 0x00], None)]
    #[case(b"PK", None)]
    #[case(&[], None)]
    fn test_from_magic_bytes(#[case] bytes: &[u8], #[case] expected: Option<Archive>) {
        assert_eq!(Archive::from_magic_bytes(bytes), expected);
    }

    #[test]
    fn test_display() {
        assert_eq!(Archive::Zip.to_string(), "zip");
    }
}
