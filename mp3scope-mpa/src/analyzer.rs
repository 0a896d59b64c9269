// Mp3scope
// Copyright (c) 2026 The Project Mp3scope Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::cmp::min;

use log::{debug, info};

use mp3scope_core::errors::{invalid_header_error, Result};
use mp3scope_core::options::AnalyzerOptions;

use mp3scope_metadata::id3v1::{read_id3v1, Id3v1, ID3V1_TAG_LEN};
use mp3scope_metadata::id3v2::{read_id3v2, Id3v2};

use crate::walker::{walk, StreamRecord};

/// The result of one forward pass over an MP3 byte stream.
pub struct Analysis {
    /// The input length in bytes.
    pub size: usize,
    /// The leading ID3v2 container, when one validates.
    pub id3v2: Option<Id3v2>,
    /// The MPEG frame region: parsed frames and awkward stretches, in file order.
    pub records: Vec<StreamRecord>,
    /// The trailing ID3v1.1 tag, when one is present after the last record.
    pub id3v1: Option<Id3v1>,
    /// Absolute byte offset of the ID3v1.1 tag.
    pub id3v1_position: Option<usize>,
}

impl Analysis {
    /// The number of parsed MPEG frames, awkward stretches excluded.
    pub fn n_frames(&self) -> usize {
        self.records
            .iter()
            .filter(|r| matches!(r, StreamRecord::Frame(_)))
            .count()
    }
}

/// Analyze an MP3 byte stream in a single forward pass.
///
/// An invalid ID3v2 container degrades to "no container" and frame parsing starts at offset 0.
/// Failing to parse a single MPEG frame is fatal. `progress` receives the byte delta of every
/// consumed region.
pub fn analyze<F>(buf: &[u8], opts: &AnalyzerOptions, progress: &mut F) -> Result<Analysis>
where
    F: FnMut(usize),
{
    let id3v2 = match read_id3v2(buf, opts) {
        Ok(id3v2) => {
            info!("found {} bytes ID3v2 data", id3v2.offset);
            progress(min(id3v2.offset, buf.len()));
            Some(id3v2)
        }
        Err(err) => {
            debug!("no leading ID3v2 container ({})", err);
            None
        }
    };

    let start = id3v2.as_ref().map_or(0, |id3v2| id3v2.offset);

    let records = walk(buf, start, opts, progress);

    if !records.iter().any(|r| matches!(r, StreamRecord::Frame(_))) {
        return invalid_header_error(
            "mpa: could not parse any MPEG frames, sync word not found at the expected position",
        );
    }

    // The ID3v1 tag, if any, sits immediately after the final record.
    let tail = records.last().map(|r| r.position() + r.length());

    let (id3v1, id3v1_position) = match tail {
        Some(tail) if tail <= buf.len() => match read_id3v1(&buf[tail..], opts.capture_raw) {
            Some(id3v1) => {
                info!("found {} bytes ID3v1 data", ID3V1_TAG_LEN);
                progress(ID3V1_TAG_LEN);
                (Some(id3v1), Some(tail))
            }
            None => (None, None),
        },
        _ => (None, None),
    };

    Ok(Analysis { size: buf.len(), id3v2, records, id3v1, id3v1_position })
}

#[cfg(test)]
mod tests {
    use super::analyze;
    use crate::walker::StreamRecord;
    use mp3scope_core::options::AnalyzerOptions;

    fn build_frame() -> Vec<u8> {
        let mut frame = vec![0u8; 417];
        frame[0..4].copy_from_slice(&[0xff, 0xfb, 0x90, 0x64]);
        frame
    }

    fn build_id3v2() -> Vec<u8> {
        // Declares 10 bytes of tag data: total container length 20.
        let mut buf = vec![0x49, 0x44, 0x33, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x0a];
        buf.resize(20, 0x00);
        buf
    }

    fn build_id3v1() -> Vec<u8> {
        let mut tag = vec![0u8; 128];
        tag[0..3].copy_from_slice(b"TAG");
        tag[3..8].copy_from_slice(b"Hello");
        tag[127] = 0x11;
        tag
    }

    #[test]
    fn verify_analyze_all_regions() {
        let mut buf = build_id3v2();
        buf.extend(build_frame());
        buf.extend(build_frame());
        buf.extend(build_id3v1());

        let analysis = analyze(&buf, &AnalyzerOptions::default(), &mut |_| ()).unwrap();

        assert_eq!(analysis.size, buf.len());
        assert_eq!(analysis.id3v2.as_ref().unwrap().offset, 20);
        assert_eq!(analysis.n_frames(), 2);
        assert_eq!(analysis.records[0].position(), 20);
        assert_eq!(analysis.id3v1_position, Some(20 + 2 * 417));

        // All three regions tile the file exactly.
        let frame_total: usize = analysis.records.iter().map(|r| r.length()).sum();
        assert_eq!(20 + frame_total + 128, buf.len());
    }

    #[test]
    fn verify_analyze_degrades_invalid_id3v2() {
        // An invalid container (reserved flag bits set) degrades to none; the awkward bytes it
        // occupied are walked over and the frame behind it still parses.
        let mut buf = vec![0x49, 0x44, 0x33, 0x03, 0x00, 0x0f, 0x00, 0x00, 0x00, 0x0a];
        buf.extend(build_frame());

        let analysis = analyze(&buf, &AnalyzerOptions::default(), &mut |_| ()).unwrap();

        assert!(analysis.id3v2.is_none());
        assert_eq!(analysis.n_frames(), 1);
        assert_eq!(analysis.records.last().unwrap().position(), 10);
    }

    #[test]
    fn verify_analyze_fails_without_frames() {
        let buf = vec![0x00u8; 64];
        assert!(analyze(&buf, &AnalyzerOptions::default(), &mut |_| ()).is_err());
    }

    #[test]
    fn verify_analyze_progress_covers_file() {
        let mut buf = build_id3v2();
        buf.extend(build_frame());
        buf.extend(build_id3v1());

        let mut total = 0usize;
        analyze(&buf, &AnalyzerOptions::default(), &mut |delta| total += delta).unwrap();

        assert_eq!(total, buf.len());
    }

    #[test]
    fn verify_analyze_no_id3v1_with_trailing_garbage() {
        let mut buf = build_frame();
        // 128 bytes that are not a tag, with no sync byte.
        buf.extend(vec![0x55u8; 128]);

        let analysis = analyze(&buf, &AnalyzerOptions::default(), &mut |_| ()).unwrap();

        assert!(analysis.id3v1.is_none());

        let records: Vec<_> = analysis
            .records
            .iter()
            .filter(|r| matches!(r, StreamRecord::Awkward(_)))
            .collect();
        assert!(records.is_empty());
    }
}
