//! Plain text loading with encoding fallback

use crate::error::Result;
use std::path::Path;
use tracing::debug;

/// Decode bytes as UTF-8, falling back to Windows-1252.
///
/// The fallback covers Latin-1 content too and never fails, so any byte
/// sequence decodes to something readable.
pub(crate) fn decode_bytes(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            debug!("Input is not valid UTF-8, decoding as Windows-1252");
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

pub fn load(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(decode_bytes(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_passthrough() {
        assert_eq!(decode_bytes("grüße".as_bytes()), "grüße");
    }

    #[test]
    fn test_latin1_fallback() {
        // "café" in Latin-1 / Windows-1252
        let bytes = [0x63, 0x61, 0x66, 0xE9];
        assert_eq!(decode_bytes(&bytes), "café");
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin.txt");
        std::fs::write(&path, [0x63, 0x61, 0x66, 0xE9]).unwrap();
        assert_eq!(load(&path).unwrap(), "café");
    }
}
