// Mp3scope
// Copyright (c) 2026 The Project Mp3scope Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use mp3scope_core::errors::{invalid_header_error, Result};
use mp3scope_core::io::BitReader;

use crate::common::*;

/// The length in bytes of a MPEG frame header word.
pub const MPEG_HEADER_LEN: usize = 4;

/// Bit-rate lookup table for MPEG version 1 layer 1, in kbit/s. Index 0 is the free bit-rate.
const BIT_RATES_MPEG1_L1: [u32; 15] =
    [0, 32, 64, 96, 128, 160, 192, 224, 256, 288, 320, 352, 384, 416, 448];

/// Bit-rate lookup table for MPEG version 1 layer 2, in kbit/s.
const BIT_RATES_MPEG1_L2: [u32; 15] =
    [0, 32, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 384];

/// Bit-rate lookup table for MPEG version 1 layer 3, in kbit/s.
const BIT_RATES_MPEG1_L3: [u32; 15] =
    [0, 32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320];

/// Bit-rate lookup table for MPEG version 2 & 2.5 audio layer 1, in kbit/s.
const BIT_RATES_MPEG2_L1: [u32; 15] =
    [0, 32, 48, 56, 64, 80, 96, 112, 128, 144, 160, 176, 192, 224, 256];

/// Bit-rate lookup table for MPEG version 2 & 2.5 audio layers 2 & 3, in kbit/s.
const BIT_RATES_MPEG2_L23: [u32; 15] =
    [0, 8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160];

/// Decode the 4-byte MPEG audio frame header at the start of `buf`.
///
/// The header is recognized only when the first 11 bits form the sync word. Reserved codes
/// (version `01`, layer `00`, bit-rate `1111`, sample-rate `11`) and the free bit-rate code
/// (`0000`, which would imply a zero-length frame) are rejected with `InvalidHeader`. The
/// verbatim header word is preserved on the returned record for round-trip reconstruction.
pub fn parse_frame_header(buf: &[u8]) -> Result<FrameHeader> {
    if buf.len() < MPEG_HEADER_LEN {
        return invalid_header_error("mpa: a frame header requires 4 bytes");
    }

    let mut bs = BitReader::new(&buf[..MPEG_HEADER_LEN]);

    // The MPEG audio header is structured as follows:
    //
    // 0b1111_1111 0b111v_vlly 0brrrr_hhpx 0bmmmm_coee
    // where:
    //     vv   = version, ll = layer      , y = crc
    //     rrrr = bitrate, hh = sample rate, p = padding , x  = private bit
    //     mmmm = mode   , c  = copyright  , o = original, ee = emphasis

    if bs.read_bits(11)? != 0x7ff {
        return invalid_header_error("mpa: sync word not found");
    }

    let version = match bs.read_bits(2)? {
        0b00 => MpegVersion::Mpeg2p5,
        0b10 => MpegVersion::Mpeg2,
        0b11 => MpegVersion::Mpeg1,
        _ => return invalid_header_error("mpa: reserved MPEG version"),
    };

    let layer = match bs.read_bits(2)? {
        0b01 => MpegLayer::Layer3,
        0b10 => MpegLayer::Layer2,
        0b11 => MpegLayer::Layer1,
        _ => return invalid_header_error("mpa: reserved MPEG layer"),
    };

    let crc_absent = bs.read_bool()?;

    let bitrate = match (bs.read_bits(4)?, version, layer) {
        // The free bit-rate provides no way to derive the frame length.
        (0b0000, _, _) => return invalid_header_error("mpa: free bit-rate is not supported"),
        (0b1111, _, _) => return invalid_header_error("mpa: invalid bit-rate"),
        (i, MpegVersion::Mpeg1, MpegLayer::Layer1) => BIT_RATES_MPEG1_L1[i as usize],
        (i, MpegVersion::Mpeg1, MpegLayer::Layer2) => BIT_RATES_MPEG1_L2[i as usize],
        (i, MpegVersion::Mpeg1, MpegLayer::Layer3) => BIT_RATES_MPEG1_L3[i as usize],
        (i, _, MpegLayer::Layer1) => BIT_RATES_MPEG2_L1[i as usize],
        (i, _, _) => BIT_RATES_MPEG2_L23[i as usize],
    };

    let sample_rate = match (bs.read_bits(2)?, version) {
        (0b00, MpegVersion::Mpeg1) => 44_100,
        (0b01, MpegVersion::Mpeg1) => 48_000,
        (0b10, MpegVersion::Mpeg1) => 32_000,
        (0b00, MpegVersion::Mpeg2) => 22_050,
        (0b01, MpegVersion::Mpeg2) => 24_000,
        (0b10, MpegVersion::Mpeg2) => 16_000,
        (0b00, MpegVersion::Mpeg2p5) => 11_025,
        (0b01, MpegVersion::Mpeg2p5) => 12_000,
        (0b10, MpegVersion::Mpeg2p5) => 8_000,
        _ => return invalid_header_error("mpa: invalid sample rate"),
    };

    let padding = bs.read_bool()?;
    let private = bs.read_bool()?;

    let channel_mode = match bs.read_bits(2)? {
        0b00 => ChannelMode::Stereo,
        0b01 => ChannelMode::JointStereo,
        0b10 => ChannelMode::DualChannel,
        0b11 => ChannelMode::Mono,
        _ => unreachable!(),
    };

    // The mode extension bits carry information only in Joint Stereo mode.
    let mode_extension = match (bs.read_bits(2)?, channel_mode) {
        (_, mode) if mode != ChannelMode::JointStereo => ModeExtension::None,
        (0b00, _) => ModeExtension::IntensityOffMsOff,
        (0b01, _) => ModeExtension::IntensityOnMsOff,
        (0b10, _) => ModeExtension::IntensityOffMsOn,
        (0b11, _) => ModeExtension::IntensityOnMsOn,
        _ => unreachable!(),
    };

    let copyright = bs.read_bool()?;
    let original = bs.read_bool()?;

    let emphasis = match bs.read_bits(2)? {
        0b00 => Emphasis::None,
        0b01 => Emphasis::Ms5015,
        0b10 => Emphasis::Reserved,
        0b11 => Emphasis::CcitJ17,
        _ => unreachable!(),
    };

    Ok(FrameHeader {
        word: [buf[0], buf[1], buf[2], buf[3]],
        version,
        layer,
        crc_absent,
        bitrate,
        sample_rate,
        padding,
        private,
        channel_mode,
        mode_extension,
        copyright,
        original,
        emphasis,
    })
}

#[cfg(test)]
mod tests {
    use super::parse_frame_header;
    use crate::common::{ChannelMode, Emphasis, ModeExtension, MpegLayer, MpegVersion};

    #[test]
    fn verify_parse_frame_header() {
        // MPEG1 Layer 3, no CRC, 128 kbit/s, 44100 Hz, joint stereo.
        let header = parse_frame_header(&[0xff, 0xfb, 0x90, 0x64]).unwrap();

        assert_eq!(header.version, MpegVersion::Mpeg1);
        assert_eq!(header.layer, MpegLayer::Layer3);
        assert!(header.crc_absent);
        assert_eq!(header.bitrate, 128);
        assert_eq!(header.sample_rate, 44_100);
        assert!(!header.padding);
        assert!(!header.private);
        assert_eq!(header.channel_mode, ChannelMode::JointStereo);
        assert_eq!(header.mode_extension, ModeExtension::IntensityOffMsOn);
        assert_eq!(header.emphasis, Emphasis::None);
        assert_eq!(header.samples_per_frame(), 1152);
        assert_eq!(header.frame_size(), 417);
        assert_eq!(header.word, [0xff, 0xfb, 0x90, 0x64]);
    }

    #[test]
    fn verify_padding_adds_one_byte() {
        let header = parse_frame_header(&[0xff, 0xfb, 0x92, 0x64]).unwrap();

        assert!(header.padding);
        assert_eq!(header.frame_size(), 418);
    }

    #[test]
    fn verify_reserved_codes_rejected() {
        // No sync word.
        assert!(parse_frame_header(&[0x00, 0xfb, 0x90, 0x64]).is_err());
        // Version code 01 is reserved.
        assert!(parse_frame_header(&[0xff, 0xeb, 0x90, 0x64]).is_err());
        // Layer code 00 is reserved.
        assert!(parse_frame_header(&[0xff, 0xf9, 0x90, 0x64]).is_err());
        // Bit-rate code 1111 is invalid.
        assert!(parse_frame_header(&[0xff, 0xfb, 0xf0, 0x64]).is_err());
        // Bit-rate code 0000 (free) is unsupported.
        assert!(parse_frame_header(&[0xff, 0xfb, 0x00, 0x64]).is_err());
        // Sample-rate code 11 is invalid.
        assert!(parse_frame_header(&[0xff, 0xfb, 0x9c, 0x64]).is_err());
        // Short input.
        assert!(parse_frame_header(&[0xff, 0xfb, 0x90]).is_err());
    }

    #[test]
    fn verify_mpeg2_header() {
        // MPEG2 Layer 3, 64 kbit/s, 22050 Hz, mono.
        let header = parse_frame_header(&[0xff, 0xf3, 0x80, 0xc4]).unwrap();

        assert_eq!(header.version, MpegVersion::Mpeg2);
        assert_eq!(header.layer, MpegLayer::Layer3);
        assert_eq!(header.bitrate, 64);
        assert_eq!(header.sample_rate, 22_050);
        assert_eq!(header.channel_mode, ChannelMode::Mono);
        assert_eq!(header.mode_extension, ModeExtension::None);
        assert_eq!(header.samples_per_frame(), 576);
        // 576 / 8 * 64000 / 22050 = 208 bytes.
        assert_eq!(header.frame_size(), 208);
        assert_eq!(header.n_granules(), 1);
    }
}
