// Mp3scope
// Copyright (c) 2026 The Project Mp3scope Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Structural analysis of MPEG audio streams for steganography forensics.
//!
//! This crate parses an MP3 byte stream into its three top-level regions (ID3v2 container, MPEG
//! audio frames, ID3v1.1 tag), describes every frame header, side-information block, and
//! main-data region, applies stego-tool signature heuristics, and emits a JSON structural
//! artifact. The [`rebuild`] module performs the reverse transformation: a bit-exact MP3 byte
//! stream reassembled from a previously emitted artifact.
//!
//! There is no PCM path. Huffman decoding, requantization, stereo decoding, and synthesis are
//! deliberately absent; the analyzer only records which Huffman tables each granule references.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

mod analyzer;
mod common;
mod header;
mod rebuild;
mod record;
mod report;
mod sideinfo;
mod stego;
mod walker;

pub use analyzer::{analyze, Analysis};
pub use common::{ChannelMode, Emphasis, FrameHeader, ModeExtension, MpegLayer, MpegVersion};
pub use header::{parse_frame_header, MPEG_HEADER_LEN};
pub use rebuild::rebuild;
pub use record::{
    AwkwardArtifact, FrameArtifact, GlobalHeaderInfo, Id3v1Artifact, Id3v2Artifact,
    RecordArtifact, Report, Structure,
};
pub use report::build_report;
pub use sideinfo::{read_side_info, Granule, GranuleChannel, SideInfo};
pub use stego::Signatures;
pub use walker::{walk, AwkwardRecord, CrcData, Encoder, FrameRecord, MainData, StreamRecord};
