// Mp3scope
// Copyright (c) 2026 The Project Mp3scope Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reconstruction of an MP3 byte stream from a structural artifact.
//!
//! The deserialization model here is deliberately lenient: it names only the fields
//! reconstruction concatenates, ignoring decoded values and statistics entirely. The stream is
//! rebuilt in file order: ID3v2 header raw, each tag raw, container padding, then per frame the
//! header bitstring, the CRC word when present, the side-information bitstring, and the raw main
//! data; awkward records contribute their raw bytes verbatim; the ID3v1 raw closes the stream.

use serde::Deserialize;

use mp3scope_core::errors::{Error, Result};
use mp3scope_core::util::raw::{decode_raw, parse_bitstring};

const NO_RAW_DATA: &str =
    "the artifact carries no raw data; it must be generated with raw capture (--data) enabled";

#[derive(Debug, Deserialize)]
struct RawArtifact {
    structure: RawStructure,
}

#[derive(Debug, Deserialize)]
struct RawStructure {
    id3v2: Option<RawId3v2>,
    mpeg_frame_data: Vec<RawRecord>,
    #[serde(rename = "id3v1.1")]
    id3v1: Option<RawId3v1>,
}

#[derive(Debug, Deserialize)]
struct RawId3v2 {
    data: RawContainerData,
    #[serde(default)]
    tags: Vec<RawTag>,
}

#[derive(Debug, Deserialize)]
struct RawContainerData {
    raw: Option<String>,
    raw_padding: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTag {
    data: RawTagData,
}

#[derive(Debug, Deserialize)]
struct RawTagData {
    raw: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawRecord {
    Frame {
        header: RawBitstring,
        side_info: RawBitstring,
        crc_data: Option<RawCrc>,
        main_data: RawMainData,
    },
    Awkward {
        raw: String,
    },
}

#[derive(Debug, Deserialize)]
struct RawBitstring {
    bitstring: String,
}

#[derive(Debug, Deserialize)]
struct RawCrc {
    raw: String,
}

#[derive(Debug, Deserialize)]
struct RawMainData {
    raw: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawId3v1 {
    data: RawTagData,
}

/// Rebuild the MP3 byte stream described by a JSON structural artifact.
///
/// Fails with `MalformedArtifact` when the JSON does not match the artifact schema and with
/// `MissingRawData` when a required raw field is absent, which happens for artifacts generated
/// without raw capture.
pub fn rebuild(artifact_json: &str) -> Result<Vec<u8>> {
    let artifact: RawArtifact = serde_json::from_str(artifact_json)
        .map_err(|err| Error::MalformedArtifact(err.to_string()))?;

    let mut stream = Vec::new();

    if let Some(id3v2) = &artifact.structure.id3v2 {
        let raw = require(&id3v2.data.raw)?;
        stream.extend(decode_raw(raw)?);

        for tag in &id3v2.tags {
            stream.extend(decode_raw(require(&tag.data.raw)?)?);
        }

        stream.extend(decode_raw(require(&id3v2.data.raw_padding)?)?);
    }

    for record in &artifact.structure.mpeg_frame_data {
        match record {
            RawRecord::Frame { header, side_info, crc_data, main_data } => {
                stream.extend(parse_bitstring(&header.bitstring)?);

                if let Some(crc) = crc_data {
                    stream.extend(decode_raw(&crc.raw)?);
                }

                stream.extend(parse_bitstring(&side_info.bitstring)?);
                stream.extend(decode_raw(require(&main_data.raw)?)?);
            }
            RawRecord::Awkward { raw } => {
                stream.extend(decode_raw(raw)?);
            }
        }
    }

    if let Some(id3v1) = &artifact.structure.id3v1 {
        stream.extend(decode_raw(require(&id3v1.data.raw)?)?);
    }

    Ok(stream)
}

fn require(raw: &Option<String>) -> Result<&str> {
    raw.as_deref().ok_or(Error::MissingRawData(NO_RAW_DATA))
}
