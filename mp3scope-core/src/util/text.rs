// Mp3scope
// Copyright (c) 2026 The Project Mp3scope Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `text` module provides total (never-failing) text decoders for tag payloads.
//!
//! Tag content in the wild is frequently mislabeled or truncated. Decoders here are lossy rather
//! than fallible so that a malformed payload degrades to replacement characters instead of an
//! error; callers always retain the original bytes alongside the decoded form.

/// Decode a ISO-8859-1 (aka Latin-1) buffer into a string. Every byte value is a valid
/// ISO-8859-1 character, so this decode is total.
pub fn decode_iso8859_1_lossy(buf: &[u8]) -> String {
    buf.iter().map(|&b| char::from(b)).collect()
}

/// Decode a UTF-16 little-endian buffer into a string. A trailing odd byte is dropped.
pub fn decode_utf16le_lossy(buf: &[u8]) -> String {
    let units: Vec<u16> =
        buf.chunks_exact(2).map(|pair| u16::from_le_bytes([pair[0], pair[1]])).collect();

    String::from_utf16_lossy(&units)
}

/// Trim trailing NUL and space bytes, the padding used by fixed-width ID3v1 fields.
pub fn trim_trailing_nul_and_space(buf: &[u8]) -> &[u8] {
    let end = buf.iter().rposition(|&b| b != 0x00 && b != 0x20).map_or(0, |i| i + 1);
    &buf[..end]
}

/// Trim trailing NUL bytes, the terminator padding used by ID3v2 text frames.
pub fn trim_trailing_nul(buf: &[u8]) -> &[u8] {
    let end = buf.iter().rposition(|&b| b != 0x00).map_or(0, |i| i + 1);
    &buf[..end]
}
