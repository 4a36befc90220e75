//! Binary content sniffing.
//!
//! Decides whether a payload should bypass templating. Only the first
//! [`SNIFF_LEN`] bytes are inspected: well-known magic numbers are binary,
//! byte-order marks are text, and otherwise any control byte that never occurs
//! in text marks the payload as binary.

use crate::constants::SNIFF_LEN;

/// Leading signatures of formats that are binary even when the header itself
/// is printable (`GIF89a`, `%PDF-`).
const BINARY_SIGNATURES: &[&[u8]] = &[
    b"GIF87a",
    b"GIF89a",
    b"\x89PNG\x0D\x0A\x1A\x0A",
    b"\xFF\xD8\xFF",
    b"%PDF-",
    b"%!PS-Adobe-",
    b"PK\x03\x04",
    b"\x1F\x8B\x08",
    b"7z\xBC\xAF\x27\x1C",
    b"Rar!\x1A\x07",
    b"OggS\x00",
    b"\x00asm",
    b"\x7FELF",
    b"BZh",
    b"wOFF",
    b"wOF2",
];

/// Byte-order marks announcing text in some Unicode encoding.
const TEXT_BOMS: &[&[u8]] = &[b"\xEF\xBB\xBF", b"\xFE\xFF", b"\xFF\xFE"];

/// Returns `true` if `data` looks like binary content.
///
/// Empty input is text.
pub fn is_binary(data: &[u8]) -> bool {
    if data.is_empty() {
        return false;
    }
    let sniff = &data[..data.len().min(SNIFF_LEN)];

    if TEXT_BOMS.iter().any(|bom| sniff.starts_with(bom)) {
        return false;
    }
    if BINARY_SIGNATURES.iter().any(|sig| sniff.starts_with(sig)) {
        return true;
    }
    if is_riff_container(sniff) {
        return true;
    }

    sniff.iter().any(|&b| is_binary_data_byte(b))
}

/// RIFF containers (WAV, AVI, WEBP) carry the format tag at offset 8.
fn is_riff_container(sniff: &[u8]) -> bool {
    sniff.len() >= 12 && sniff.starts_with(b"RIFF")
}

/// Control bytes that do not appear in text files.
fn is_binary_data_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}
