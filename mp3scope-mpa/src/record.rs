// Mp3scope
// Copyright (c) 2026 The Project Mp3scope Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The typed model of the JSON structural artifact.
//!
//! Field names and nesting follow the external artifact schema: the reconstructor, and any other
//! consumer of previously emitted artifacts, depends on them. Decoded values are additive; the
//! `bitstring` and `raw` fields alone reproduce the input byte stream.

use std::collections::BTreeMap;

use serde::ser::Serializer;
use serde::Serialize;

use mp3scope_core::util::stats::{Categorical, Stats};

/// The top-level structural artifact.
#[derive(Debug, Serialize)]
pub struct Report {
    pub file: String,
    pub size: usize,
    pub frames: usize,
    pub encoder: Option<&'static str>,
    pub global_header_info: GlobalHeaderInfo,
    pub structure: Structure,
    pub stego_signatures: BTreeMap<String, BTreeMap<String, u64>>,
}

/// Aggregate statistics over every parsed frame header.
#[derive(Debug, Serialize)]
pub struct GlobalHeaderInfo {
    pub length: Stats,
    pub samples: Stats,
    pub version: Categorical,
    pub layer: Categorical,
    pub crc: Categorical,
    pub bitrate: Stats,
    pub samplerate: Stats,
    pub padding: Categorical,
    pub private: Categorical,
    pub mode: Categorical,
    #[serde(rename = "modeExt")]
    pub mode_ext: Categorical,
    pub copyright: Categorical,
    pub original: Categorical,
    pub emphasis: Categorical,
}

/// The three top-level regions of the file.
#[derive(Debug, Serialize)]
pub struct Structure {
    pub id3v2: Option<Id3v2Artifact>,
    pub mpeg_frame_data: Vec<RecordArtifact>,
    #[serde(rename = "id3v1.1")]
    pub id3v1: Option<Id3v1Artifact>,
}

#[derive(Debug, Serialize)]
pub struct Id3v2Artifact {
    pub length: usize,
    pub data: Id3v2Data,
    pub tags: Vec<TagArtifact>,
}

#[derive(Debug, Serialize)]
pub struct Id3v2Data {
    pub version: String,
    pub flags: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_padding: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TagArtifact {
    pub id: String,
    pub position: usize,
    pub payload: usize,
    pub length: usize,
    pub flags: Vec<&'static str>,
    pub data: TagData,
}

#[derive(Debug, Serialize)]
pub struct TagData {
    pub human_readable: Option<TagValueArtifact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

/// A human-readable tag payload: text, or an integer for duration-style tags.
#[derive(Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TagValueArtifact {
    Text(String),
    Number(i64),
}

#[derive(Debug, Serialize)]
pub struct Id3v1Artifact {
    pub position: usize,
    pub length: usize,
    pub data: Id3v1Data,
}

#[derive(Debug, Serialize)]
pub struct Id3v1Data {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub year: String,
    pub comment: String,
    pub track: Option<u8>,
    pub genre: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

/// One entry of the MPEG frame region: a parsed frame or an awkward stretch.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RecordArtifact {
    Frame(Box<FrameArtifact>),
    Awkward(AwkwardArtifact),
}

#[derive(Debug, Serialize)]
pub struct FrameArtifact {
    pub position: usize,
    pub length: usize,
    pub samples: u32,
    pub header: HeaderArtifact,
    pub side_info: SideInfoArtifact,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crc_data: Option<CrcArtifact>,
    pub main_data: MainDataArtifact,
    pub stego_signatures: BTreeMap<&'static str, bool>,
}

#[derive(Debug, Serialize)]
pub struct HeaderArtifact {
    pub bitstring: String,
    #[serde(serialize_with = "serialize_version_number")]
    pub version: f64,
    pub layer: u32,
    pub crc: u8,
    pub bitrate: u32,
    pub samplerate: u32,
    pub padding: u8,
    pub private: u8,
    pub mode: &'static str,
    #[serde(rename = "modeExt")]
    pub mode_ext: &'static str,
    pub copyright: u8,
    pub original: u8,
    pub emphasis: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SideInfoArtifact {
    pub bitstring: String,
    pub position: usize,
    pub length: usize,
    pub main_data_begin: u16,
    pub scfsi: Vec<String>,
    pub granule_info: Vec<GranuleArtifact>,
}

/// Per-granule side information, each field an array indexed by channel.
#[derive(Debug, Serialize)]
pub struct GranuleArtifact {
    pub part2_3_length: Vec<u16>,
    pub big_value: Vec<u16>,
    pub global_gain: Vec<u8>,
    pub scalefac_compress: Vec<u16>,
    pub slen1: Vec<u8>,
    pub slen2: Vec<u8>,
    pub window_switching_flag: Vec<bool>,
    pub block_type: Vec<u8>,
    pub mixed_block_flag: Vec<bool>,
    pub table_select: Vec<Vec<u8>>,
    pub subblock_gain: Vec<Option<[u8; 3]>>,
    pub region0_count: Vec<u8>,
    pub region1_count: Vec<u8>,
    pub pre_flag: Vec<bool>,
    pub scale_fac_scale: Vec<bool>,
    pub count1table_select: Vec<bool>,
}

#[derive(Debug, Serialize)]
pub struct CrcArtifact {
    pub position: usize,
    pub length: usize,
    pub raw: String,
}

#[derive(Debug, Serialize)]
pub struct MainDataArtifact {
    pub position: usize,
    pub length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    pub encoder: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct AwkwardArtifact {
    pub position: usize,
    pub length: usize,
    pub raw: String,
}

/// Serialize an MPEG version number as an integer when it is whole (1, 2) and as a float
/// otherwise (2.5), matching how artifacts have historically rendered it.
fn serialize_version_number<S: Serializer>(version: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if version.fract() == 0.0 {
        serializer.serialize_u64(*version as u64)
    }
    else {
        serializer.serialize_f64(*version)
    }
}
