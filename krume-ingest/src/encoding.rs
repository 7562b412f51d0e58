//! Best-effort decoding of source files with unreliable encodings

use log::debug;

/// Decode raw file bytes into text: strip a UTF-8 BOM, try UTF-8, fall back
/// to Latin-1 for the older point-of-sale dumps. Never fails; in the worst
/// case every byte becomes its Latin-1 code point.
pub fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF".as_slice()).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            debug!("input is not valid UTF-8, decoding as Latin-1");
            bytes.iter().map(|&b| b as char).collect()
        }
    }
}
