// Mp3scope
// Copyright (c) 2026 The Project Mp3scope Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::cmp::min;

use log::{debug, info, warn};

use mp3scope_core::errors::{truncated_side_info_error, Result};
use mp3scope_core::options::AnalyzerOptions;

use crate::common::FrameHeader;
use crate::header::{parse_frame_header, MPEG_HEADER_LEN};
use crate::sideinfo::{read_side_info, SideInfo};
use crate::stego::{detect_frame_signatures, Signatures};

/// The encoder identified from the first bytes of a frame's main data.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Encoder {
    Xing,
    Lame,
}

impl Encoder {
    pub fn name(&self) -> &'static str {
        match self {
            Encoder::Xing => "Xing",
            Encoder::Lame => "LAME",
        }
    }
}

/// The CRC word between the frame header and the side information, captured verbatim when
/// present.
#[derive(Clone, Debug)]
pub struct CrcData {
    /// Absolute byte offset of the CRC word.
    pub position: usize,
    pub raw: [u8; 2],
}

/// The main-data region of a frame.
#[derive(Clone, Debug)]
pub struct MainData {
    /// Absolute byte offset of the region.
    pub position: usize,
    /// The declared region length. For a truncated trailing frame this exceeds the bytes
    /// actually present.
    pub length: usize,
    /// The region bytes present in the file, captured on request.
    pub raw: Option<Vec<u8>>,
    pub encoder: Option<Encoder>,
}

/// One fully parsed MPEG audio frame.
#[derive(Clone, Debug)]
pub struct FrameRecord {
    /// Absolute byte offset of the frame header.
    pub position: usize,
    /// The declared frame length in bytes.
    pub length: usize,
    /// Audio samples per channel encoded by the frame.
    pub samples: u32,
    pub header: FrameHeader,
    pub side_info: SideInfo,
    /// Absolute byte offset of the side information.
    pub side_info_position: usize,
    pub crc_data: Option<CrcData>,
    pub main_data: MainData,
    pub signatures: Signatures,
}

/// A contiguous unparseable stretch between MPEG frames.
#[derive(Clone, Debug)]
pub struct AwkwardRecord {
    /// Absolute byte offset of the stretch.
    pub position: usize,
    pub length: usize,
    /// Awkward bytes are always captured; they are part of the structural description.
    pub raw: Vec<u8>,
}

/// A record emitted by the frame walker.
#[derive(Clone, Debug)]
pub enum StreamRecord {
    Frame(Box<FrameRecord>),
    Awkward(AwkwardRecord),
}

impl StreamRecord {
    /// Absolute byte offset of the record.
    pub fn position(&self) -> usize {
        match self {
            StreamRecord::Frame(frame) => frame.position,
            StreamRecord::Awkward(awkward) => awkward.position,
        }
    }

    /// The declared record length in bytes.
    pub fn length(&self) -> usize {
        match self {
            StreamRecord::Frame(frame) => frame.length,
            StreamRecord::Awkward(awkward) => awkward.length,
        }
    }
}

/// Walk the MPEG frame region of `buf` starting at `start`, collecting one record per frame and
/// one per awkward stretch.
///
/// The walker is a three-state machine. While synced it decodes a header and side information at
/// the current offset and advances by the declared frame length. A header that fails to decode
/// drops it into resynchronization: the bytes up to the next `0xff` become an awkward record and
/// the walk resumes there. When no sync byte remains, or fewer than 4 bytes remain, the walk
/// terminates.
///
/// `progress` is invoked with the number of bytes consumed by each record.
pub fn walk<F>(
    buf: &[u8],
    start: usize,
    opts: &AnalyzerOptions,
    progress: &mut F,
) -> Vec<StreamRecord>
where
    F: FnMut(usize),
{
    let mut records = Vec::new();
    let mut offset = start;
    let mut n_frames = 0usize;

    while offset + MPEG_HEADER_LEN <= buf.len() {
        let frame = parse_frame_header(&buf[offset..])
            .and_then(|header| build_frame_record(buf, offset, header, n_frames, opts));

        match frame {
            Ok(frame) => {
                let length = frame.length;

                debug!("mpa: frame {} at {}, {} bytes", n_frames, offset, length);

                records.push(StreamRecord::Frame(Box::new(frame)));
                n_frames += 1;

                progress(min(length, buf.len() - offset));
                offset += length;
            }
            Err(err) => {
                debug!("mpa: lost sync at {} ({})", offset, err);

                // Search forward from the next byte for a sync candidate.
                match buf[offset + 1..].iter().position(|&b| b == 0xff) {
                    Some(found) => {
                        let length = found + 1;

                        info!("mpa: {} bytes of awkward data behind frame {}", length, n_frames);

                        records.push(StreamRecord::Awkward(AwkwardRecord {
                            position: offset,
                            length,
                            raw: buf[offset..offset + length].to_vec(),
                        }));

                        progress(length);
                        offset += length;
                    }
                    None => break,
                }
            }
        }
    }

    records
}

/// Assemble the full record of the frame whose header was decoded at `offset`.
fn build_frame_record(
    buf: &[u8],
    offset: usize,
    header: FrameHeader,
    frame_index: usize,
    opts: &AnalyzerOptions,
) -> Result<FrameRecord> {
    let frame_len = header.frame_size();

    let side_info_offset = header.side_info_offset(opts.legacy_side_info_offset);
    let side_info = read_side_info(&buf[min(offset + side_info_offset, buf.len())..], &header)?;
    let side_info_len = side_info.len();

    // The CRC word is only addressable as its own region under the corrected side information
    // placement; the legacy placement overlaps it.
    let crc_data = if !header.crc_absent && !opts.legacy_side_info_offset {
        if offset + 6 > buf.len() {
            return truncated_side_info_error("mpa: CRC word extends past the end of the data");
        }
        Some(CrcData { position: offset + 4, raw: [buf[offset + 4], buf[offset + 5]] })
    }
    else {
        None
    };

    // Under the legacy placement main data is declared relative to offset 4 regardless of where
    // the side information was actually read from.
    let main_data_position = if opts.legacy_side_info_offset {
        offset + 4 + side_info_len
    }
    else {
        offset + side_info_offset + side_info_len
    };

    let main_data_length = (offset + frame_len).saturating_sub(main_data_position);

    let truncated = offset + frame_len > buf.len();

    if truncated {
        warn!("mpa: frame {} declares {} bytes but the file ends early", frame_index, frame_len);
    }

    let main_data_end = min(offset + frame_len, buf.len());
    let available = &buf[min(main_data_position, main_data_end)..main_data_end];

    let encoder = match available.get(0..4) {
        Some(b"Xing") => Some(Encoder::Xing),
        Some(b"LAME") => Some(Encoder::Lame),
        Some(b"Info") => {
            info!("mpa: found main data info header");
            None
        }
        _ => None,
    };

    let signatures = detect_frame_signatures(&header, frame_index, truncated, available);

    let samples = header.samples_per_frame();

    Ok(FrameRecord {
        position: offset,
        length: frame_len,
        samples,
        side_info_position: offset + side_info_offset,
        side_info,
        crc_data,
        main_data: MainData {
            position: main_data_position,
            length: main_data_length,
            raw: if opts.capture_raw { Some(available.to_vec()) } else { None },
            encoder,
        },
        signatures,
        header,
    })
}

#[cfg(test)]
mod tests {
    use super::{walk, StreamRecord};
    use mp3scope_core::options::AnalyzerOptions;

    /// A 417-byte MPEG1 Layer 3 joint stereo frame with zeroed side information and the given
    /// main-data fill byte.
    fn build_frame(fill: u8) -> Vec<u8> {
        let mut frame = vec![0u8; 417];
        frame[0..4].copy_from_slice(&[0xff, 0xfb, 0x90, 0x64]);
        for byte in frame[36..].iter_mut() {
            *byte = fill;
        }
        frame
    }

    fn capture() -> AnalyzerOptions {
        AnalyzerOptions { capture_raw: true, ..Default::default() }
    }

    #[test]
    fn verify_walk_consecutive_frames() {
        let mut buf = build_frame(0xaa);
        buf.extend(build_frame(0xbb));

        let records = walk(&buf, 0, &capture(), &mut |_| ());

        assert_eq!(records.len(), 2);

        // Consecutive frames tile the buffer.
        match (&records[0], &records[1]) {
            (StreamRecord::Frame(a), StreamRecord::Frame(b)) => {
                assert_eq!(a.position + a.length, b.position);
                assert_eq!(a.length, 417);
                assert_eq!(a.samples, 1152);
                assert_eq!(a.side_info_position, 4);
                assert_eq!(a.side_info.len(), 32);
                assert_eq!(a.main_data.position, 36);
                assert_eq!(a.main_data.length, 417 - 4 - 32);
                assert_eq!(a.length, 4 + a.side_info.len() + a.main_data.length);
                assert_eq!(a.main_data.raw.as_ref().unwrap()[0], 0xaa);
                assert!(b.main_data.encoder.is_none());
            }
            _ => panic!("expected two frames"),
        }
    }

    #[test]
    fn verify_walk_awkward_bytes() {
        // Three spurious bytes between two frames.
        let mut buf = build_frame(0x00);
        buf.extend_from_slice(&[0x01, 0x02, 0x03]);
        buf.extend(build_frame(0x00));

        let records = walk(&buf, 0, &AnalyzerOptions::default(), &mut |_| ());

        assert_eq!(records.len(), 3);

        match &records[1] {
            StreamRecord::Awkward(awkward) => {
                assert_eq!(awkward.position, 417);
                assert_eq!(awkward.length, 3);
                assert_eq!(awkward.raw, vec![0x01, 0x02, 0x03]);
            }
            _ => panic!("expected an awkward record"),
        }

        match &records[2] {
            StreamRecord::Frame(frame) => assert_eq!(frame.position, 420),
            _ => panic!("expected a frame record"),
        }
    }

    #[test]
    fn verify_walk_terminates_without_sync() {
        // A frame followed by garbage with no sync byte.
        let mut buf = build_frame(0x00);
        buf.extend_from_slice(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x06]);

        let records = walk(&buf, 0, &AnalyzerOptions::default(), &mut |_| ());

        assert_eq!(records.len(), 1);
    }

    #[test]
    fn verify_walk_truncated_trailing_frame() {
        // The second frame is cut off 100 bytes short.
        let mut buf = build_frame(0x00);
        let second = build_frame(0x00);
        buf.extend_from_slice(&second[..317]);

        let records = walk(&buf, 0, &capture(), &mut |_| ());

        assert_eq!(records.len(), 2);

        match &records[1] {
            StreamRecord::Frame(frame) => {
                // Declared length is preserved, captured bytes are what the file holds.
                assert_eq!(frame.length, 417);
                assert_eq!(frame.main_data.length, 381);
                assert_eq!(frame.main_data.raw.as_ref().unwrap().len(), 317 - 36);
                assert_eq!(frame.signatures.names(), vec!["mp3stego_defective_payload_ending"]);
            }
            _ => panic!("expected a frame record"),
        }
    }

    #[test]
    fn verify_walk_xing_encoder_detection() {
        let mut buf = build_frame(0x00);
        buf[36..40].copy_from_slice(b"Xing");

        let records = walk(&buf, 0, &AnalyzerOptions::default(), &mut |_| ());

        match &records[0] {
            StreamRecord::Frame(frame) => {
                assert_eq!(frame.main_data.encoder.map(|e| e.name()), Some("Xing"));
                // Encoder detection does not depend on raw capture.
                assert!(frame.main_data.raw.is_none());
            }
            _ => panic!("expected a frame record"),
        }
    }

    #[test]
    fn verify_walk_progress_deltas() {
        let mut buf = build_frame(0x00);
        buf.extend_from_slice(&[0x01, 0x02]);
        buf.extend(build_frame(0x00));

        let mut total = 0usize;
        let records = walk(&buf, 0, &AnalyzerOptions::default(), &mut |delta| total += delta);

        assert_eq!(records.len(), 3);
        assert_eq!(total, buf.len());
    }

    #[test]
    fn verify_walk_layer2_frame() {
        // MPEG1 Layer 2, 160 kbit/s, 44100 Hz: 522 bytes, no side information.
        let mut buf = vec![0u8; 522];
        buf[0..4].copy_from_slice(&[0xff, 0xfd, 0x90, 0x64]);

        let records = walk(&buf, 0, &AnalyzerOptions::default(), &mut |_| ());

        match &records[0] {
            StreamRecord::Frame(frame) => {
                assert_eq!(frame.length, 522);
                assert_eq!(frame.samples, 1152);
                assert_eq!(frame.side_info.len(), 0);
                assert!(frame.side_info.granules.is_empty());
                assert_eq!(frame.main_data.position, 4);
                assert_eq!(frame.main_data.length, 518);
            }
            _ => panic!("expected a frame record"),
        }
    }

    #[test]
    fn verify_walk_legacy_side_info_offset() {
        let buf = {
            let mut buf = build_frame(0x00);
            // Tag the bytes at offsets 4..8 so the placements are distinguishable.
            buf[4] = 0x10;
            buf[5] = 0x11;
            buf[6] = 0x12;
            buf[7] = 0x13;
            buf
        };

        let legacy =
            AnalyzerOptions { legacy_side_info_offset: true, ..AnalyzerOptions::default() };

        let records = walk(&buf, 0, &legacy, &mut |_| ());

        match &records[0] {
            StreamRecord::Frame(frame) => {
                // The CRC is absent, so the legacy placement starts at offset 6...
                assert_eq!(frame.side_info_position, 6);
                assert_eq!(frame.side_info.raw[0], 0x12);
                // ...but main data is still declared relative to offset 4.
                assert_eq!(frame.main_data.position, 36);
                assert!(frame.crc_data.is_none());
            }
            _ => panic!("expected a frame record"),
        }
    }
}
