// Mp3scope
// Copyright (c) 2026 The Project Mp3scope Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Heuristic signatures of known MP3 steganography tools.

use std::collections::BTreeMap;

use bitflags::bitflags;
use log::info;

use crate::common::{Emphasis, FrameHeader};
use crate::walker::StreamRecord;

bitflags! {
    /// The set of per-frame stego-tool signatures. Each signature is independently settable.
    pub struct Signatures: u32 {
        /// The final frame declares more payload than the file holds; mp3stego truncates its
        /// cover files this way.
        const MP3STEGO_DEFECTIVE_PAYLOAD_ENDING = 0b0001;
        /// The first frame carries the private, copyright, and original bits together with
        /// CCIT J.17 emphasis, the constellation stegonaut writes.
        const STEGONAUT_HEADER = 0b0010;
        /// Main-data bytes 15..19 spell "XXXX", the placeholder mp3stegz leaves behind.
        const MP3STEGZ_TRACE = 0b0100;
    }
}

impl Signatures {
    /// The artifact names of the signatures set, in declaration order.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();

        if self.contains(Signatures::MP3STEGO_DEFECTIVE_PAYLOAD_ENDING) {
            names.push("mp3stego_defective_payload_ending");
        }
        if self.contains(Signatures::STEGONAUT_HEADER) {
            names.push("stegonaut_header");
        }
        if self.contains(Signatures::MP3STEGZ_TRACE) {
            names.push("mp3stegz_trace");
        }

        names
    }
}

/// The artifact name of the global constant-bit-rate signature.
pub const MP3STEGO_CONSTANT_BITRATE: &str = "mp3stego_constant_bitrate";

/// Evaluate the per-frame signature heuristics.
///
/// `frame_index` counts parsed frames only, `truncated` indicates that the frame declares more
/// bytes than the file holds, and `main_data` is the portion of the main-data region actually
/// present in the file.
pub fn detect_frame_signatures(
    header: &FrameHeader,
    frame_index: usize,
    truncated: bool,
    main_data: &[u8],
) -> Signatures {
    let mut signatures = Signatures::empty();

    if truncated {
        signatures |= Signatures::MP3STEGO_DEFECTIVE_PAYLOAD_ENDING;
        info!("potential stego-signature found: mp3stego");
    }

    if frame_index == 0
        && header.private
        && header.copyright
        && header.original
        && header.emphasis == Emphasis::CcitJ17
    {
        signatures |= Signatures::STEGONAUT_HEADER;
        info!("potential stego-signature found: stegonaut");
    }

    if main_data.len() >= 19 && &main_data[15..19] == b"XXXX" {
        signatures |= Signatures::MP3STEGZ_TRACE;
        info!("potential stego-signature found: mp3stegz");
    }

    signatures
}

/// Aggregate the per-frame signatures, plus the global constant-bit-rate heuristic, into a
/// tool-name keyed map of signature hit counts.
pub fn aggregate_signatures(records: &[StreamRecord]) -> BTreeMap<String, BTreeMap<String, u64>> {
    let mut aggregated: BTreeMap<String, BTreeMap<String, u64>> = BTreeMap::new();

    let bitrates: Vec<u32> = records
        .iter()
        .filter_map(|r| match r {
            StreamRecord::Frame(frame) => Some(frame.header.bitrate),
            StreamRecord::Awkward(_) => None,
        })
        .collect();

    // mp3stego produces constant-bit-rate output; flag the stream when every frame agrees.
    if !bitrates.is_empty() && bitrates.iter().min() == bitrates.iter().max() {
        aggregated
            .entry(tool_name(MP3STEGO_CONSTANT_BITRATE).to_string())
            .or_default()
            .insert(MP3STEGO_CONSTANT_BITRATE.to_string(), 1);
    }

    for record in records {
        if let StreamRecord::Frame(frame) = record {
            for signature in frame.signatures.names() {
                *aggregated
                    .entry(tool_name(signature).to_string())
                    .or_default()
                    .entry(signature.to_string())
                    .or_insert(0) += 1;
            }
        }
    }

    aggregated
}

/// The tool a signature belongs to: the prefix before the first underscore.
fn tool_name(signature: &str) -> &str {
    signature.split('_').next().unwrap_or(signature)
}
