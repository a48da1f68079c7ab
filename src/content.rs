//! Text content extraction.
//!
//! Files are decoded by trying an ordered list of candidate encodings;
//! the first successful decode wins. Data that fails the binary sniff
//! is never decoded.

use std::path::{Path, PathBuf};

const SNIFF_SIZE: usize = 8192;
const ASCII_THRESHOLD: f64 = 0.85;

/// Candidate text encodings, tried in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// Strict UTF-8
    Utf8,
    /// UTF-16 with a byte-order mark (LE or BE)
    Utf16,
    /// ISO-8859-1, one byte per code point
    Latin1,
}

/// Default decode order. Latin-1 accepts any byte sequence, so it sits
/// last and is only reached by data that already passed the binary
/// sniff.
pub const DEFAULT_ENCODINGS: &[TextEncoding] =
    &[TextEncoding::Utf8, TextEncoding::Utf16, TextEncoding::Latin1];

impl TextEncoding {
    /// Attempts to decode `bytes` with this encoding.
    #[must_use]
    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            Self::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_owned),
            Self::Utf16 => decode_utf16_bom(bytes),
            Self::Latin1 => Some(bytes.iter().map(|&b| char::from(b)).collect()),
        }
    }

    /// Short name used in log lines.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Utf16 => "utf-16",
            Self::Latin1 => "latin-1",
        }
    }
}

fn decode_utf16_bom(bytes: &[u8]) -> Option<String> {
    let (le, body) = match bytes {
        [0xFF, 0xFE, rest @ ..] => (true, rest),
        [0xFE, 0xFF, rest @ ..] => (false, rest),
        _ => return None,
    };

    if body.len() % 2 != 0 {
        return None;
    }

    let units = body.chunks_exact(2).map(|pair| {
        if le {
            u16::from_le_bytes([pair[0], pair[1]])
        } else {
            u16::from_be_bytes([pair[0], pair[1]])
        }
    });

    char::decode_utf16(units).collect::<Result<String, _>>().ok()
}

/// Determines if data is likely binary by analyzing a sample.
///
/// # Algorithm
///
/// 1. Examines the first 8KB
/// 2. Checks for null bytes (binary indicator)
/// 3. Calculates the ratio of ASCII characters
///
/// Data with null bytes or a low ASCII ratio is considered binary.
/// UTF-16 text carries interleaved null bytes, so a byte-order mark is
/// checked before the null scan.
#[must_use]
pub(crate) fn looks_binary(bytes: &[u8]) -> bool {
    if bytes.is_empty() {
        return false;
    }

    if matches!(bytes, [0xFF, 0xFE, ..] | [0xFE, 0xFF, ..]) {
        return false;
    }

    let sample = &bytes[..bytes.len().min(SNIFF_SIZE)];

    if memchr::memchr(0, sample).is_some() {
        return true;
    }

    let ascii_count = sample.iter().filter(|&&b| b < 128).count();
    let ascii_ratio = ascii_count as f64 / sample.len() as f64;

    ascii_ratio < ASCII_THRESHOLD
}

/// Decodes raw file data as text.
///
/// Tries each candidate encoding in order and returns the decoded
/// content together with the encoding that matched. Returns `None` for
/// binary data or data no candidate can decode.
#[must_use]
pub(crate) fn decode_text(bytes: &[u8]) -> Option<(String, TextEncoding)> {
    if looks_binary(bytes) {
        return None;
    }

    DEFAULT_ENCODINGS
        .iter()
        .find_map(|&enc| enc.decode(bytes).map(|content| (content, enc)))
}

/// A file selected for consolidation, with its decoded content.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Absolute path to the file
    pub absolute_path: PathBuf,

    /// Path relative to the scan root
    pub relative_path: String,

    /// Decoded text content
    pub content: String,

    /// Encoding the content was decoded with
    pub encoding: TextEncoding,

    /// On-disk size in bytes
    pub size: u64,
}

impl SourceFile {
    /// Creates a new source file record.
    #[must_use]
    pub fn new(
        absolute_path: PathBuf,
        relative_path: String,
        content: String,
        encoding: TextEncoding,
        size: u64,
    ) -> Self {
        Self {
            absolute_path,
            relative_path,
            content,
            encoding,
            size,
        }
    }

    /// Returns true if the file decoded to empty content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Returns the number of content lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.content.lines().count()
    }
}

/// Checks if a path is hidden: its file name starts with the hidden
/// marker character.
#[must_use]
pub(crate) fn is_hidden_name(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf8() {
        let (content, enc) = decode_text("fn main() {}".as_bytes()).unwrap();
        assert_eq!(content, "fn main() {}");
        assert_eq!(enc, TextEncoding::Utf8);
    }

    #[test]
    fn test_decode_empty() {
        let (content, enc) = decode_text(b"").unwrap();
        assert_eq!(content, "");
        assert_eq!(enc, TextEncoding::Utf8);
    }

    #[test]
    fn test_decode_latin1_fallback() {
        // 0xE9 is 'é' in Latin-1 and invalid as standalone UTF-8
        let bytes = b"menu du jour: caf\xE9 au lait et th\xE9 vert";
        let (content, enc) = decode_text(bytes).unwrap();
        assert_eq!(content, "menu du jour: café au lait et thé vert");
        assert_eq!(enc, TextEncoding::Latin1);
    }

    #[test]
    fn test_decode_utf16_le() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "hi".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let (content, enc) = decode_text(&bytes).unwrap();
        assert_eq!(content, "hi");
        assert_eq!(enc, TextEncoding::Utf16);
    }

    #[test]
    fn test_decode_utf16_be() {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in "hi".encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        let (content, enc) = decode_text(&bytes).unwrap();
        assert_eq!(content, "hi");
        assert_eq!(enc, TextEncoding::Utf16);
    }

    #[test]
    fn test_binary_rejected() {
        assert!(looks_binary(&[0u8; 100]));
        assert!(decode_text(&[0u8; 100]).is_none());
    }

    #[test]
    fn test_text_not_binary() {
        assert!(!looks_binary(b"Hello, world!"));
        assert!(!looks_binary(b""));
    }

    #[test]
    fn test_high_bit_text_not_binary() {
        // Mostly ASCII with a few Latin-1 accents stays text
        assert!(!looks_binary(b"na\xEFve caf\xE9 resum\xE9 plain ascii tail"));
    }

    #[test]
    fn test_source_file_helpers() {
        let file = SourceFile::new(
            PathBuf::from("/tmp/a.py"),
            "a.py".to_string(),
            "x=1\ny=2".to_string(),
            TextEncoding::Utf8,
            7,
        );

        assert!(!file.is_empty());
        assert_eq!(file.line_count(), 2);
    }

    #[test]
    fn test_is_hidden_name() {
        assert!(is_hidden_name(Path::new("/tmp/.env")));
        assert!(is_hidden_name(Path::new(".hidden.py")));
        assert!(!is_hidden_name(Path::new("/tmp/visible.py")));
    }

    #[test]
    fn test_encoding_names() {
        assert_eq!(TextEncoding::Utf8.name(), "utf-8");
        assert_eq!(TextEncoding::Latin1.name(), "latin-1");
    }
}
