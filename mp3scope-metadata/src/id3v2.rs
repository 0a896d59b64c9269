// Mp3scope
// Copyright (c) 2026 The Project Mp3scope Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! An ID3v2 metadata container reader.
//!
//! The reader validates the container header, computes the terminating offset (the byte offset at
//! which MPEG frame data begins), and enumerates the tag frames inside the container. Everything
//! between the last enumerated tag and the terminating offset is recorded as raw padding so the
//! container can be reproduced byte-exactly.
//!
//! Per-tag payload sizes are read as plain big-endian integers, not as synchsafe integers. This
//! is nonconformant for ID3v2.4 but matches how ID3v2.3 tags are written in the wild, and it is
//! the convention existing structural artifacts were produced with. The container header size is
//! always synchsafe.

use std::cmp::min;
use std::collections::HashMap;

use lazy_static::lazy_static;
use log::{debug, warn};

use mp3scope_core::errors::{invalid_id3v2_error, Result};
use mp3scope_core::io::{BufReader, ReadBytes};
use mp3scope_core::options::AnalyzerOptions;
use mp3scope_core::util::text::{decode_utf16le_lossy, trim_trailing_nul};

/// The length in bytes of the ID3v2 container header, and of each tag frame header.
const ID3V2_HEADER_LEN: usize = 10;

/// Container flag names, in the order they are reported.
const CONTAINER_FLAG_NAMES: [&str; 4] =
    ["FooterPresent", "ExperimentalIndicator", "ExtendedHeader", "Unsynchronisation"];

/// Tag frame flag names, addressed by bits 0..=2 and 8..=10 of the 16-bit flag field.
const TAG_FLAG_NAMES: [&str; 6] = [
    "DiscardFrameOnTagAlter",
    "DiscardFrameOnFileAlter",
    "ReadOnly",
    "ZLIBCompression",
    "FrameEncrypted",
    "FrameContainsGroupInformation",
];

/// A human-readable interpretation of a textual tag payload.
#[derive(Clone, Debug, PartialEq)]
pub enum TagValue {
    Text(String),
    Number(i64),
}

#[derive(Copy, Clone)]
enum FrameKind {
    Text,
    Number,
}

lazy_static! {
    /// The curated set of tag frames that receive a human-readable interpretation.
    static ref TEXT_FRAMES: HashMap<&'static str, FrameKind> = {
        let mut m = HashMap::new();
        m.insert("TPE1", FrameKind::Text);
        m.insert("TPE2", FrameKind::Text);
        m.insert("TCOP", FrameKind::Text);
        m.insert("TPOS", FrameKind::Text);
        m.insert("TPUB", FrameKind::Text);
        m.insert("TCON", FrameKind::Text);
        m.insert("TCOM", FrameKind::Text);
        m.insert("TIT2", FrameKind::Text);
        m.insert("TALB", FrameKind::Text);
        m.insert("COMM", FrameKind::Text);
        m.insert("TRCK", FrameKind::Text);
        m.insert("TYER", FrameKind::Text);
        m.insert("TLEN", FrameKind::Number);
        m
    };
}

/// A single tag frame inside an ID3v2 container.
#[derive(Clone, Debug)]
pub struct Id3v2Tag {
    /// The four-character uppercase-alphanumeric tag ID.
    pub id: String,
    /// Absolute byte offset of the tag header.
    pub position: usize,
    /// The declared payload length in bytes.
    pub size: usize,
    /// The 16-bit tag flag field.
    pub flags: u16,
    /// The payload bytes.
    pub content: Vec<u8>,
    /// The verbatim tag bytes (header and payload), captured on request.
    pub raw: Option<Vec<u8>>,
}

impl Id3v2Tag {
    /// The names of the flags set on this tag.
    pub fn flag_names(&self) -> Vec<&'static str> {
        let bits = [0, 1, 2, 8, 9, 10];

        bits.iter()
            .enumerate()
            .filter(|(_, &bit)| self.flags >> bit & 1 != 0)
            .map(|(i, _)| TAG_FLAG_NAMES[i])
            .collect()
    }

    /// A lossy string rendition of the payload, always available alongside the raw bytes.
    pub fn content_lossy(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }

    /// A human-readable interpretation of the payload for the curated set of textual tags.
    /// Returns `None` for tags outside the set and for number tags that fail to parse.
    pub fn human_readable(&self) -> Option<TagValue> {
        let kind = TEXT_FRAMES.get(self.id.as_str())?;

        let text = decode_text_payload(&self.content);

        match kind {
            FrameKind::Text => Some(TagValue::Text(text)),
            FrameKind::Number => text.trim().parse::<i64>().ok().map(TagValue::Number),
        }
    }
}

/// A decoded ID3v2 container.
#[derive(Clone, Debug)]
pub struct Id3v2 {
    pub major_version: u8,
    pub revision: u8,
    /// The raw container flag byte.
    pub flags: u8,
    /// The terminating offset: total container length, including header and footer. MPEG frame
    /// data begins at this offset.
    pub offset: usize,
    /// The extended header length in bytes, 0 when absent.
    pub extended_len: usize,
    pub tags: Vec<Id3v2Tag>,
    /// The container header plus extended header bytes, captured on request.
    pub raw: Option<Vec<u8>>,
    /// Everything between the last enumerated tag and the terminating offset, captured on
    /// request.
    pub raw_padding: Option<Vec<u8>>,
}

impl Id3v2 {
    /// The advertised version string, e.g. `"2.3.0"`.
    pub fn version(&self) -> String {
        format!("2.{}.{}", self.major_version, self.revision)
    }

    #[inline(always)]
    pub fn has_footer(&self) -> bool {
        self.flags & 0x10 != 0
    }

    #[inline(always)]
    pub fn has_extended_header(&self) -> bool {
        self.flags & 0x40 != 0
    }

    /// The names of the container flags set, reported in declaration order.
    pub fn flag_names(&self) -> Vec<&'static str> {
        CONTAINER_FLAG_NAMES
            .iter()
            .enumerate()
            .filter(|(i, _)| self.flags >> (4 + i) & 1 != 0)
            .map(|(_, &name)| name)
            .collect()
    }
}

/// Read the ID3v2 container at the start of `buf`. Fails with `InvalidId3v2` when the signature,
/// the reserved flag bits, or the synchsafe size do not validate; callers degrade that failure to
/// "no container" and parse MPEG frames from offset 0.
pub fn read_id3v2(buf: &[u8], opts: &AnalyzerOptions) -> Result<Id3v2> {
    let mut reader = BufReader::new(buf);

    let marker = reader.read_triple_bytes()?;

    if marker != *b"ID3" {
        return invalid_id3v2_error("id3v2: not an ID3v2 container");
    }

    let major_version = reader.read_u8()?;
    let revision = reader.read_u8()?;
    let flags = reader.read_u8()?;

    // The low four flag bits are reserved and must be clear for the container to be valid.
    if flags & 0x0f != 0 {
        return invalid_id3v2_error("id3v2: reserved flag bits are set");
    }

    let size = read_syncsafe_u28(&mut reader)?;

    // The terminating offset covers the header, the size region, and the footer when present.
    let offset = size + if flags & 0x10 != 0 { 20 } else { 10 };

    let extended_len = if flags & 0x40 != 0 { reader.read_be_u32()? as usize } else { 0 };

    let tag_area_start = ID3V2_HEADER_LEN + extended_len;
    let tag_area_end = min(ID3V2_HEADER_LEN + size, buf.len());

    let mut tags = Vec::new();
    let mut pos = tag_area_start;

    while pos + ID3V2_HEADER_LEN <= tag_area_end {
        let id = &buf[pos..pos + 4];

        // The first ID that is not uppercase-alphanumeric terminates enumeration; the remainder
        // of the container is padding.
        if !id.iter().all(|&c| c.is_ascii_uppercase() || c.is_ascii_digit()) {
            break;
        }

        // The payload size is plain big-endian, deliberately not synchsafe. See the module docs.
        let payload_len = u32::from_be_bytes([
            buf[pos + 4],
            buf[pos + 5],
            buf[pos + 6],
            buf[pos + 7],
        ]) as usize;

        let tag_flags = u16::from_be_bytes([buf[pos + 8], buf[pos + 9]]);

        let end = pos + ID3V2_HEADER_LEN + payload_len;

        if end > tag_area_end {
            warn!("id3v2: tag '{}' overruns the container, treating as padding", String::from_utf8_lossy(id));
            break;
        }

        tags.push(Id3v2Tag {
            id: String::from_utf8_lossy(id).into_owned(),
            position: pos,
            size: payload_len,
            flags: tag_flags,
            content: buf[pos + ID3V2_HEADER_LEN..end].to_vec(),
            raw: if opts.capture_raw { Some(buf[pos..end].to_vec()) } else { None },
        });

        pos = end;
    }

    debug!("id3v2: version 2.{}.{}, {} tags, offset {}", major_version, revision, tags.len(), offset);

    let (raw, raw_padding) = if opts.capture_raw {
        let head = buf[..min(tag_area_start, buf.len())].to_vec();
        let pad_end = min(offset, buf.len());
        let padding = buf[min(pos, pad_end)..pad_end].to_vec();
        (Some(head), Some(padding))
    }
    else {
        (None, None)
    };

    Ok(Id3v2 { major_version, revision, flags, offset, extended_len, tags, raw, raw_padding })
}

/// Read a 28-bit synchsafe integer: four big-endian bytes carrying 7 bits each, high bit clear.
fn read_syncsafe_u28<B: ReadBytes>(reader: &mut B) -> Result<usize> {
    let mut value = 0usize;

    for _ in 0..4 {
        let byte = reader.read_u8()?;

        if byte & 0x80 != 0 {
            return invalid_id3v2_error("id3v2: size byte has the high bit set");
        }

        value = (value << 7) | byte as usize;
    }

    Ok(value)
}

/// Decode a textual tag payload: UTF-16LE after a `FF FE` byte-order-mark, UTF-8 with NUL
/// padding stripped otherwise.
fn decode_text_payload(content: &[u8]) -> String {
    match find_bom(content) {
        Some(at) => {
            let decoded = decode_utf16le_lossy(&content[at + 2..]);
            decoded.trim_matches('\0').to_string()
        }
        None => String::from_utf8_lossy(trim_nul(content)).into_owned(),
    }
}

fn find_bom(content: &[u8]) -> Option<usize> {
    content.windows(2).position(|pair| pair == [0xff, 0xfe])
}

fn trim_nul(buf: &[u8]) -> &[u8] {
    let buf = trim_trailing_nul(buf);
    let start = buf.iter().position(|&b| b != 0x00).unwrap_or(buf.len());
    &buf[start..]
}

#[cfg(test)]
mod tests {
    use super::{read_id3v2, TagValue};
    use mp3scope_core::options::AnalyzerOptions;

    fn capture() -> AnalyzerOptions {
        AnalyzerOptions { capture_raw: true, ..Default::default() }
    }

    fn build_container() -> Vec<u8> {
        // Header declaring 48 bytes of tag data.
        let mut buf = vec![0x49, 0x44, 0x33, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x30];
        // TIT2 tag, 6 byte payload: encoding byte + "Hello".
        buf.extend_from_slice(b"TIT2");
        buf.extend_from_slice(&[0x00, 0x00, 0x00, 0x06, 0x00, 0x00]);
        buf.extend_from_slice(b"\x00Hello");
        // Remainder of the declared area is NUL padding.
        buf.resize(10 + 0x30, 0x00);
        buf
    }

    #[test]
    fn verify_id3v2_header_only() {
        // A valid header followed by ten zero bytes: version 2.3.0, offset 20, no tags.
        let buf = [
            0x49, 0x44, 0x33, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x0a, //
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ];

        let id3v2 = read_id3v2(&buf, &AnalyzerOptions::default()).unwrap();

        assert_eq!(id3v2.version(), "2.3.0");
        assert_eq!(id3v2.offset, 20);
        assert!(id3v2.tags.is_empty());
        assert!(id3v2.flag_names().is_empty());
    }

    #[test]
    fn verify_id3v2_rejects_bad_signature() {
        let buf = [0x49, 0x44, 0x34, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x0a];
        assert!(read_id3v2(&buf, &AnalyzerOptions::default()).is_err());
    }

    #[test]
    fn verify_id3v2_rejects_reserved_flags() {
        let buf = [0x49, 0x44, 0x33, 0x03, 0x00, 0x01, 0x00, 0x00, 0x00, 0x0a];
        assert!(read_id3v2(&buf, &AnalyzerOptions::default()).is_err());
    }

    #[test]
    fn verify_id3v2_rejects_non_syncsafe_size() {
        let buf = [0x49, 0x44, 0x33, 0x03, 0x00, 0x00, 0x00, 0x00, 0x80, 0x0a];
        assert!(read_id3v2(&buf, &AnalyzerOptions::default()).is_err());
    }

    #[test]
    fn verify_id3v2_footer_extends_offset() {
        let buf = [0x49, 0x44, 0x33, 0x04, 0x00, 0x10, 0x00, 0x00, 0x00, 0x0a];
        let id3v2 = read_id3v2(&buf, &AnalyzerOptions::default()).unwrap();

        assert_eq!(id3v2.offset, 30);
        assert_eq!(id3v2.flag_names(), vec!["FooterPresent"]);
    }

    #[test]
    fn verify_id3v2_tag_enumeration() {
        let buf = build_container();
        let id3v2 = read_id3v2(&buf, &capture()).unwrap();

        assert_eq!(id3v2.offset, 10 + 0x30);
        assert_eq!(id3v2.tags.len(), 1);

        let tag = &id3v2.tags[0];
        assert_eq!(tag.id, "TIT2");
        assert_eq!(tag.position, 10);
        assert_eq!(tag.size, 6);
        assert_eq!(tag.human_readable(), Some(TagValue::Text("Hello".to_string())));

        // Raw capture must tile the whole container: header + tags + padding.
        let total = id3v2.raw.as_ref().unwrap().len()
            + id3v2.tags.iter().map(|t| t.raw.as_ref().unwrap().len()).sum::<usize>()
            + id3v2.raw_padding.as_ref().unwrap().len();
        assert_eq!(total, id3v2.offset);
    }

    #[test]
    fn verify_id3v2_utf16_and_number_tags() {
        let mut buf = vec![0x49, 0x44, 0x33, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x40];

        // TPE1 with a UTF-16LE payload: encoding byte, BOM, "Hi", terminator.
        buf.extend_from_slice(b"TPE1");
        buf.extend_from_slice(&[0x00, 0x00, 0x00, 0x09, 0x00, 0x00]);
        buf.extend_from_slice(&[0x01, 0xff, 0xfe, 0x48, 0x00, 0x69, 0x00, 0x00, 0x00]);

        // TLEN with a numeric payload.
        buf.extend_from_slice(b"TLEN");
        buf.extend_from_slice(&[0x00, 0x00, 0x00, 0x07, 0x00, 0x00]);
        buf.extend_from_slice(b"\x00212000");

        buf.resize(10 + 0x40, 0x00);

        let id3v2 = read_id3v2(&buf, &AnalyzerOptions::default()).unwrap();

        assert_eq!(id3v2.tags.len(), 2);
        assert_eq!(id3v2.tags[0].human_readable(), Some(TagValue::Text("Hi".to_string())));
        assert_eq!(id3v2.tags[1].human_readable(), Some(TagValue::Number(212000)));
    }
}
