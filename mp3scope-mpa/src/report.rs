// Mp3scope
// Copyright (c) 2026 The Project Mp3scope Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::BTreeMap;

use mp3scope_core::options::AnalyzerOptions;
use mp3scope_core::util::raw::{encode_raw, format_bitstring, RawEncoding};
use mp3scope_core::util::stats::{Categorical, Stats};

use mp3scope_metadata::id3v1::{Id3v1, ID3V1_TAG_LEN};
use mp3scope_metadata::id3v2::{Id3v2, TagValue};

use crate::analyzer::Analysis;
use crate::record::*;
use crate::stego::aggregate_signatures;
use crate::walker::{FrameRecord, StreamRecord};

/// The seeded category lists of the global header report, in declaration order.
const VERSION_CATEGORIES: [&str; 3] = ["1", "2", "2.5"];
const LAYER_CATEGORIES: [&str; 3] = ["1", "2", "3"];
const BIT_CATEGORIES: [&str; 2] = ["0", "1"];
const MODE_CATEGORIES: [&str; 4] = ["Stereo", "JointStereo", "DualChannel", "Mono"];
const MODE_EXT_CATEGORIES: [&str; 5] =
    ["IntensityOffMSOff", "IntensityOnMSOff", "IntensityOffMSOn", "IntensityOnMSOn", "NONE"];
const EMPHASIS_CATEGORIES: [&str; 4] = ["NONE", "MS5015", "Reserved", "CCITJ17"];

/// Assemble the complete structural artifact from a finished analysis.
pub fn build_report(file_name: &str, analysis: &Analysis, opts: &AnalyzerOptions) -> Report {
    let encoding = if opts.hex_raw { RawEncoding::Hex } else { RawEncoding::Literal };

    let frames: Vec<&FrameRecord> = analysis
        .records
        .iter()
        .filter_map(|r| match r {
            StreamRecord::Frame(frame) => Some(frame.as_ref()),
            StreamRecord::Awkward(_) => None,
        })
        .collect();

    let encoder = frames.first().and_then(|f| f.main_data.encoder).map(|e| e.name());

    Report {
        file: file_name.to_string(),
        size: analysis.size,
        frames: frames.len(),
        encoder,
        global_header_info: build_global_header_info(&frames),
        structure: Structure {
            id3v2: analysis.id3v2.as_ref().map(|id3v2| build_id3v2(id3v2, encoding)),
            mpeg_frame_data: analysis
                .records
                .iter()
                .map(|record| build_record(record, encoding))
                .collect(),
            id3v1: analysis
                .id3v1
                .as_ref()
                .map(|id3v1| build_id3v1(id3v1, analysis.id3v1_position, encoding)),
        },
        stego_signatures: aggregate_signatures(&analysis.records),
    }
}

fn build_global_header_info(frames: &[&FrameRecord]) -> GlobalHeaderInfo {
    let lengths: Vec<u64> = frames.iter().map(|f| f.length as u64).collect();
    let samples: Vec<u64> = frames.iter().map(|f| u64::from(f.samples)).collect();
    let bitrates: Vec<u64> = frames.iter().map(|f| u64::from(f.header.bitrate)).collect();
    let samplerates: Vec<u64> = frames.iter().map(|f| u64::from(f.header.sample_rate)).collect();

    let mut version = Categorical::new(&VERSION_CATEGORIES);
    let mut layer = Categorical::new(&LAYER_CATEGORIES);
    let mut crc = Categorical::new(&BIT_CATEGORIES);
    let mut padding = Categorical::new(&BIT_CATEGORIES);
    let mut private = Categorical::new(&BIT_CATEGORIES);
    let mut mode = Categorical::new(&MODE_CATEGORIES);
    let mut mode_ext = Categorical::new(&MODE_EXT_CATEGORIES);
    let mut copyright = Categorical::new(&BIT_CATEGORIES);
    let mut original = Categorical::new(&BIT_CATEGORIES);
    let mut emphasis = Categorical::new(&EMPHASIS_CATEGORIES);

    for frame in frames {
        let header = &frame.header;

        version.observe(header.version.name());
        layer.observe(header.layer.name());
        crc.observe(bit_name(header.crc_absent));
        padding.observe(bit_name(header.padding));
        private.observe(bit_name(header.private));
        mode.observe(header.channel_mode.name());
        mode_ext.observe(header.mode_extension.name());
        copyright.observe(bit_name(header.copyright));
        original.observe(bit_name(header.original));
        emphasis.observe(header.emphasis.name());
    }

    GlobalHeaderInfo {
        length: Stats::from_values(&lengths),
        samples: Stats::from_values(&samples),
        version,
        layer,
        crc,
        bitrate: Stats::from_values(&bitrates),
        samplerate: Stats::from_values(&samplerates),
        padding,
        private,
        mode,
        mode_ext,
        copyright,
        original,
        emphasis,
    }
}

#[inline(always)]
fn bit_name(bit: bool) -> &'static str {
    if bit {
        "1"
    }
    else {
        "0"
    }
}

fn build_id3v2(id3v2: &Id3v2, encoding: RawEncoding) -> Id3v2Artifact {
    Id3v2Artifact {
        length: id3v2.offset,
        data: Id3v2Data {
            version: id3v2.version(),
            flags: id3v2.flag_names(),
            raw: id3v2.raw.as_ref().map(|raw| encode_raw(raw, encoding)),
            raw_padding: id3v2.raw_padding.as_ref().map(|raw| encode_raw(raw, encoding)),
        },
        tags: id3v2
            .tags
            .iter()
            .map(|tag| TagArtifact {
                id: tag.id.clone(),
                position: tag.position,
                payload: tag.position + 10,
                length: tag.size,
                flags: tag.flag_names(),
                data: TagData {
                    human_readable: tag.human_readable().map(|value| match value {
                        TagValue::Text(text) => TagValueArtifact::Text(text),
                        TagValue::Number(number) => TagValueArtifact::Number(number),
                    }),
                    content: tag.raw.as_ref().map(|_| tag.content_lossy()),
                    raw: tag.raw.as_ref().map(|raw| encode_raw(raw, encoding)),
                },
            })
            .collect(),
    }
}

fn build_id3v1(id3v1: &Id3v1, position: Option<usize>, encoding: RawEncoding) -> Id3v1Artifact {
    Id3v1Artifact {
        position: position.unwrap_or(0),
        length: ID3V1_TAG_LEN,
        data: Id3v1Data {
            title: id3v1.title.clone(),
            artist: id3v1.artist.clone(),
            album: id3v1.album.clone(),
            year: id3v1.year.clone(),
            comment: id3v1.comment.clone(),
            track: id3v1.track,
            genre: id3v1.genre,
            raw: id3v1.raw.as_ref().map(|raw| encode_raw(raw, encoding)),
        },
    }
}

fn build_record(record: &StreamRecord, encoding: RawEncoding) -> RecordArtifact {
    match record {
        StreamRecord::Frame(frame) => RecordArtifact::Frame(Box::new(build_frame(frame, encoding))),
        StreamRecord::Awkward(awkward) => RecordArtifact::Awkward(AwkwardArtifact {
            position: awkward.position,
            length: awkward.length,
            raw: encode_raw(&awkward.raw, encoding),
        }),
    }
}

fn build_frame(frame: &FrameRecord, encoding: RawEncoding) -> FrameArtifact {
    let header = &frame.header;
    let side_info = &frame.side_info;

    let n_channels = header.n_channels();

    let granule_info = side_info
        .granules
        .iter()
        .map(|granule| {
            let channels = &granule.channels[..n_channels];

            GranuleArtifact {
                part2_3_length: channels.iter().map(|ch| ch.part2_3_length).collect(),
                big_value: channels.iter().map(|ch| ch.big_value).collect(),
                global_gain: channels.iter().map(|ch| ch.global_gain).collect(),
                scalefac_compress: channels.iter().map(|ch| ch.scalefac_compress).collect(),
                slen1: channels.iter().map(|ch| ch.slen1).collect(),
                slen2: channels.iter().map(|ch| ch.slen2).collect(),
                window_switching_flag: channels.iter().map(|ch| ch.window_switching).collect(),
                block_type: channels.iter().map(|ch| ch.block_type).collect(),
                mixed_block_flag: channels.iter().map(|ch| ch.mixed_block_flag).collect(),
                table_select: channels
                    .iter()
                    .map(|ch| ch.table_select[..ch.n_table_select()].to_vec())
                    .collect(),
                subblock_gain: channels
                    .iter()
                    .map(|ch| if ch.window_switching { Some(ch.subblock_gain) } else { None })
                    .collect(),
                region0_count: channels.iter().map(|ch| ch.region0_count).collect(),
                region1_count: channels.iter().map(|ch| ch.region1_count).collect(),
                pre_flag: channels.iter().map(|ch| ch.pre_flag).collect(),
                scale_fac_scale: channels.iter().map(|ch| ch.scalefac_scale).collect(),
                count1table_select: channels.iter().map(|ch| ch.count1table_select).collect(),
            }
        })
        .collect();

    let scfsi = (0..n_channels)
        .map(|ch| {
            side_info.scfsi[ch].iter().map(|&band| if band { '1' } else { '0' }).collect()
        })
        .collect();

    FrameArtifact {
        position: frame.position,
        length: frame.length,
        samples: frame.samples,
        header: HeaderArtifact {
            bitstring: format_bitstring(&header.word),
            version: header.version.as_number(),
            layer: header.layer.as_number(),
            crc: u8::from(header.crc_absent),
            bitrate: header.bitrate,
            samplerate: header.sample_rate,
            padding: u8::from(header.padding),
            private: u8::from(header.private),
            mode: header.channel_mode.name(),
            mode_ext: header.mode_extension.name(),
            copyright: u8::from(header.copyright),
            original: u8::from(header.original),
            emphasis: header.emphasis.name(),
        },
        side_info: SideInfoArtifact {
            bitstring: side_info.bitstring(),
            position: frame.side_info_position,
            length: side_info.len(),
            main_data_begin: side_info.main_data_begin,
            scfsi,
            granule_info,
        },
        crc_data: frame.crc_data.as_ref().map(|crc| CrcArtifact {
            position: crc.position,
            length: crc.raw.len(),
            raw: encode_raw(&crc.raw, encoding),
        }),
        main_data: MainDataArtifact {
            position: frame.main_data.position,
            length: frame.main_data.length,
            raw: frame.main_data.raw.as_ref().map(|raw| encode_raw(raw, encoding)),
            encoder: frame.main_data.encoder.map(|e| e.name()),
        },
        stego_signatures: frame.signatures.names().into_iter().map(|name| (name, true)).collect(),
    }
}
