// Mp3scope
// Copyright (c) 2026 The Project Mp3scope Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use mp3scope_core::errors::{truncated_side_info_error, Result};
use mp3scope_core::io::BitReader;
use mp3scope_core::util::raw::format_bitstring;

use crate::common::{ChannelMode, FrameHeader};

/// Pairs of scale factor bit lengths (slen1, slen2) for MPEG version 1, indexed by the 4-bit
/// scalefac_compress field. The first bands of a granule use scale factors of slen1 bits, the
/// remaining bands slen2 bits.
const SCALE_FACTOR_SLEN: [(u8, u8); 16] = [
    (0, 0),
    (0, 1),
    (0, 2),
    (0, 3),
    (3, 0),
    (1, 1),
    (1, 2),
    (1, 3),
    (2, 1),
    (2, 2),
    (2, 3),
    (3, 1),
    (3, 2),
    (3, 3),
    (4, 2),
    (4, 3),
];

/// The side information for a single channel in a granule.
///
/// Every field is recorded exactly as read from the bitstream. A reserved `block_type` or an
/// out-of-spec `big_value` is preserved verbatim; describing malformed frames is the point of a
/// structural analyzer.
#[derive(Clone, Debug, Default)]
pub struct GranuleChannel {
    pub part2_3_length: u16,
    pub big_value: u16,
    pub global_gain: u8,
    /// 4 bits for MPEG1, 9 bits for MPEG2/2.5.
    pub scalefac_compress: u16,
    /// Scale factor bit lengths derived from scalefac_compress. Defined for MPEG1 only; 0
    /// otherwise.
    pub slen1: u8,
    pub slen2: u8,
    pub window_switching: bool,
    /// Present only when window switching is in effect.
    pub block_type: u8,
    pub mixed_block_flag: bool,
    /// Huffman table selections: two regions with window switching, three without. The unused
    /// third selector remains 0.
    pub table_select: [u8; 3],
    /// Present only when window switching is in effect.
    pub subblock_gain: [u8; 3],
    pub region0_count: u8,
    pub region1_count: u8,
    /// Present in the MPEG1 bitstream only.
    pub pre_flag: bool,
    pub scalefac_scale: bool,
    pub count1table_select: bool,
}

impl GranuleChannel {
    /// The number of Huffman table selections actually present in the bitstream.
    #[inline(always)]
    pub fn n_table_select(&self) -> usize {
        if self.window_switching {
            2
        }
        else {
            3
        }
    }
}

/// The side information for one granule.
#[derive(Clone, Debug, Default)]
pub struct Granule {
    pub channels: [GranuleChannel; 2],
}

/// The decoded Layer III side information of one frame.
#[derive(Clone, Debug)]
pub struct SideInfo {
    pub main_data_begin: u16,
    /// The private bits following main_data_begin, recorded verbatim.
    pub private_bits: u8,
    /// Scale factor selection information: 4 bands per channel, MPEG1 only.
    pub scfsi: [[bool; 4]; 2],
    /// One granule for MPEG2/2.5, two for MPEG1.
    pub granules: Vec<Granule>,
    /// The verbatim side information bytes.
    pub raw: Vec<u8>,
}

impl SideInfo {
    /// The side information length in bytes.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// The raw bytes rendered as a space-separated bitstring.
    pub fn bitstring(&self) -> String {
        format_bitstring(&self.raw)
    }
}

/// Reads the side information of a Layer III frame from the start of `buf`.
///
/// The required length depends on the MPEG version and channel mode (17 or 32 bytes for MPEG1,
/// 9 or 17 for MPEG2/2.5). Fails with `TruncatedSideInfo` when `buf` is shorter than that.
pub fn read_side_info(buf: &[u8], header: &FrameHeader) -> Result<SideInfo> {
    let side_info_len = header.side_info_len();

    // Layers I and II carry no side information.
    if side_info_len == 0 {
        return Ok(SideInfo {
            main_data_begin: 0,
            private_bits: 0,
            scfsi: [[false; 4]; 2],
            granules: Vec::new(),
            raw: Vec::new(),
        });
    }

    if buf.len() < side_info_len {
        return truncated_side_info_error("mpa: side information extends past the end of the data");
    }

    let data = &buf[..side_info_len];
    let mut bs = BitReader::new(data);

    let mut side_info = SideInfo {
        main_data_begin: 0,
        private_bits: 0,
        scfsi: [[false; 4]; 2],
        granules: Vec::with_capacity(header.n_granules()),
        raw: data.to_vec(),
    };

    // For MPEG version 1...
    if header.is_mpeg1() {
        // First 9 bits is main_data_begin.
        side_info.main_data_begin = bs.read_bits(9)? as u16;

        // Next 3 (>1 channel) or 5 (1 channel) bits are private.
        side_info.private_bits = match header.channel_mode {
            ChannelMode::Mono => bs.read_bits(5)?,
            _ => bs.read_bits(3)?,
        } as u8;

        // Next 4 bits per channel are the SCFSI bits.
        for ch in 0..header.n_channels() {
            for band in 0..4 {
                side_info.scfsi[ch][band] = bs.read_bool()?;
            }
        }
    }
    // For MPEG version 2...
    else {
        // First 8 bits is main_data_begin.
        side_info.main_data_begin = bs.read_bits(8)? as u16;

        // Next 1 (1 channel) or 2 (>1 channel) bits are private.
        side_info.private_bits = match header.channel_mode {
            ChannelMode::Mono => bs.read_bits(1)?,
            _ => bs.read_bits(2)?,
        } as u8;
    }

    for _ in 0..header.n_granules() {
        let mut granule = Granule::default();

        for ch in 0..header.n_channels() {
            granule.channels[ch] = read_granule_channel(&mut bs, header)?;
        }

        side_info.granules.push(granule);
    }

    Ok(side_info)
}

/// Reads the side information for a single channel in a granule.
fn read_granule_channel(bs: &mut BitReader<'_>, header: &FrameHeader) -> Result<GranuleChannel> {
    let mut channel = GranuleChannel {
        part2_3_length: bs.read_bits(12)? as u16,
        big_value: bs.read_bits(9)? as u16,
        global_gain: bs.read_bits(8)? as u8,
        ..Default::default()
    };

    channel.scalefac_compress =
        if header.is_mpeg1() { bs.read_bits(4) } else { bs.read_bits(9) }? as u16;

    // For MPEG1, scalefac_compress indexes the scale factor bit length pair. The MPEG2
    // scalefac_compress is a 9-bit value with partition semantics outside the scope of a
    // structural description.
    if header.is_mpeg1() {
        let (slen1, slen2) = SCALE_FACTOR_SLEN[channel.scalefac_compress as usize];
        channel.slen1 = slen1;
        channel.slen2 = slen2;
    }

    channel.window_switching = bs.read_bool()?;

    if channel.window_switching {
        channel.block_type = bs.read_bits(2)? as u8;
        channel.mixed_block_flag = bs.read_bool()?;

        // With window switching there are only two regions, and therefore two table selectors,
        // but three subblock gains.
        for i in 0..2 {
            channel.table_select[i] = bs.read_bits(5)? as u8;
        }

        for i in 0..3 {
            channel.subblock_gain[i] = bs.read_bits(3)? as u8;
        }
    }
    else {
        for i in 0..3 {
            channel.table_select[i] = bs.read_bits(5)? as u8;
        }

        channel.region0_count = bs.read_bits(4)? as u8;
        channel.region1_count = bs.read_bits(3)? as u8;
    }

    // For MPEG2, preflag is determined implicitly when decoding scale factors and is not stored
    // in the side information.
    channel.pre_flag = if header.is_mpeg1() { bs.read_bool()? } else { false };

    channel.scalefac_scale = bs.read_bool()?;
    channel.count1table_select = bs.read_bool()?;

    Ok(channel)
}

#[cfg(test)]
mod tests {
    use super::read_side_info;
    use crate::header::parse_frame_header;

    /// Writer used to compose side information fixtures bit by bit.
    struct BitWriter {
        bytes: Vec<u8>,
        used: u32,
    }

    impl BitWriter {
        fn new() -> Self {
            BitWriter { bytes: Vec::new(), used: 0 }
        }

        fn push(&mut self, value: u32, width: u32) {
            for i in (0..width).rev() {
                if self.used % 8 == 0 {
                    self.bytes.push(0);
                }
                let bit = (value >> i) & 1;
                let byte = self.bytes.last_mut().unwrap();
                *byte |= (bit as u8) << (7 - (self.used % 8));
                self.used += 1;
            }
        }

        fn finish(self, len: usize) -> Vec<u8> {
            let mut bytes = self.bytes;
            bytes.resize(len, 0);
            bytes
        }
    }

    fn push_long_block_channel(w: &mut BitWriter, mpeg1: bool) {
        w.push(1234, 12); // part2_3_length
        w.push(288, 9); // big_value
        w.push(210, 8); // global_gain
        if mpeg1 {
            w.push(9, 4); // scalefac_compress
        }
        else {
            w.push(300, 9);
        }
        w.push(0, 1); // window_switching off
        w.push(1, 5); // table_select[0]
        w.push(2, 5); // table_select[1]
        w.push(3, 5); // table_select[2]
        w.push(5, 4); // region0_count
        w.push(3, 3); // region1_count
        if mpeg1 {
            w.push(1, 1); // pre_flag
        }
        w.push(1, 1); // scalefac_scale
        w.push(0, 1); // count1table_select
    }

    #[test]
    fn verify_read_side_info_mpeg1_mono() {
        // MPEG1 Layer 3, 44100 Hz, mono.
        let header = parse_frame_header(&[0xff, 0xfb, 0x90, 0xc4]).unwrap();
        assert_eq!(header.side_info_len(), 17);

        let mut w = BitWriter::new();
        w.push(511, 9); // main_data_begin
        w.push(0b10101, 5); // private bits
        w.push(0b1010, 4); // scfsi
        push_long_block_channel(&mut w, true); // granule 0
        push_long_block_channel(&mut w, true); // granule 1

        let data = w.finish(17);
        let side_info = read_side_info(&data, &header).unwrap();

        assert_eq!(side_info.main_data_begin, 511);
        assert_eq!(side_info.private_bits, 0b10101);
        assert_eq!(side_info.scfsi[0], [true, false, true, false]);
        assert_eq!(side_info.granules.len(), 2);
        assert_eq!(side_info.len(), 17);

        let ch = &side_info.granules[0].channels[0];
        assert_eq!(ch.part2_3_length, 1234);
        assert_eq!(ch.big_value, 288);
        assert_eq!(ch.global_gain, 210);
        assert_eq!(ch.scalefac_compress, 9);
        assert_eq!((ch.slen1, ch.slen2), (2, 2));
        assert!(!ch.window_switching);
        assert_eq!(ch.table_select, [1, 2, 3]);
        assert_eq!(ch.region0_count, 5);
        assert_eq!(ch.region1_count, 3);
        assert!(ch.pre_flag);
        assert!(ch.scalefac_scale);
        assert!(!ch.count1table_select);
    }

    #[test]
    fn verify_read_side_info_window_switching() {
        let header = parse_frame_header(&[0xff, 0xfb, 0x90, 0xc4]).unwrap();

        let mut w = BitWriter::new();
        w.push(0, 9); // main_data_begin
        w.push(0, 5); // private bits
        w.push(0, 4); // scfsi

        for _ in 0..2 {
            w.push(100, 12); // part2_3_length
            w.push(50, 9); // big_value
            w.push(128, 8); // global_gain
            w.push(3, 4); // scalefac_compress
            w.push(1, 1); // window_switching on
            w.push(2, 2); // block_type (short)
            w.push(1, 1); // mixed_block_flag
            w.push(7, 5); // table_select[0]
            w.push(8, 5); // table_select[1]
            w.push(1, 3); // subblock_gain[0]
            w.push(2, 3); // subblock_gain[1]
            w.push(3, 3); // subblock_gain[2]
            w.push(0, 1); // pre_flag
            w.push(0, 1); // scalefac_scale
            w.push(1, 1); // count1table_select
        }

        let data = w.finish(17);
        let side_info = read_side_info(&data, &header).unwrap();

        let ch = &side_info.granules[1].channels[0];
        assert!(ch.window_switching);
        assert_eq!(ch.block_type, 2);
        assert!(ch.mixed_block_flag);
        assert_eq!(ch.n_table_select(), 2);
        assert_eq!(ch.table_select, [7, 8, 0]);
        assert_eq!(ch.subblock_gain, [1, 2, 3]);
        assert_eq!(ch.region0_count, 0);
        assert_eq!(ch.region1_count, 0);
        assert!(ch.count1table_select);
    }

    #[test]
    fn verify_read_side_info_mpeg2_mono() {
        // MPEG2 Layer 3, 22050 Hz, mono: 9 bytes of side information, one granule.
        let header = parse_frame_header(&[0xff, 0xf3, 0x80, 0xc4]).unwrap();
        assert_eq!(header.side_info_len(), 9);

        let mut w = BitWriter::new();
        w.push(200, 8); // main_data_begin
        w.push(1, 1); // private bit
        push_long_block_channel(&mut w, false);

        let data = w.finish(9);
        let side_info = read_side_info(&data, &header).unwrap();

        assert_eq!(side_info.main_data_begin, 200);
        assert_eq!(side_info.granules.len(), 1);

        let ch = &side_info.granules[0].channels[0];
        assert_eq!(ch.scalefac_compress, 300);
        assert_eq!((ch.slen1, ch.slen2), (0, 0));
        assert!(!ch.pre_flag);
        assert!(ch.scalefac_scale);
    }

    #[test]
    fn verify_read_side_info_truncated() {
        let header = parse_frame_header(&[0xff, 0xfb, 0x90, 0x64]).unwrap();
        assert_eq!(header.side_info_len(), 32);

        assert!(read_side_info(&[0u8; 31], &header).is_err());
        assert!(read_side_info(&[0u8; 32], &header).is_ok());
    }

    #[test]
    fn verify_side_info_bitstring_round_trip() {
        let header = parse_frame_header(&[0xff, 0xfb, 0x90, 0x64]).unwrap();
        let data: Vec<u8> = (0u8..32).collect();

        let side_info = read_side_info(&data, &header).unwrap();
        let bitstring = side_info.bitstring();

        assert_eq!(mp3scope_core::util::raw::parse_bitstring(&bitstring).unwrap(), data);
    }
}
