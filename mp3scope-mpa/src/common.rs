// Mp3scope
// Copyright (c) 2026 The Project Mp3scope Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/// The MPEG audio version.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MpegVersion {
    /// Version 2.5
    Mpeg2p5,
    /// Version 2
    Mpeg2,
    /// Version 1
    Mpeg1,
}

impl MpegVersion {
    /// The version as the number reported by the artifact: 1, 2, or 2.5.
    pub fn as_number(&self) -> f64 {
        match self {
            MpegVersion::Mpeg1 => 1.0,
            MpegVersion::Mpeg2 => 2.0,
            MpegVersion::Mpeg2p5 => 2.5,
        }
    }

    /// The version rendered the way categorical reports key it.
    pub fn name(&self) -> &'static str {
        match self {
            MpegVersion::Mpeg1 => "1",
            MpegVersion::Mpeg2 => "2",
            MpegVersion::Mpeg2p5 => "2.5",
        }
    }
}

/// The MPEG audio layer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MpegLayer {
    /// Layer 1
    Layer1,
    /// Layer 2
    Layer2,
    /// Layer 3
    Layer3,
}

impl MpegLayer {
    pub fn as_number(&self) -> u32 {
        match self {
            MpegLayer::Layer1 => 1,
            MpegLayer::Layer2 => 2,
            MpegLayer::Layer3 => 3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MpegLayer::Layer1 => "1",
            MpegLayer::Layer2 => "2",
            MpegLayer::Layer3 => "3",
        }
    }
}

/// The channel mode.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChannelMode {
    /// Stereo channels.
    Stereo,
    /// Joint Stereo encoded channels (decodes to Stereo).
    JointStereo,
    /// Two independent audio channels.
    DualChannel,
    /// Single mono audio channel.
    Mono,
}

impl ChannelMode {
    /// Gets the number of channels.
    #[inline(always)]
    pub fn count(&self) -> usize {
        match self {
            ChannelMode::Mono => 1,
            _ => 2,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ChannelMode::Stereo => "Stereo",
            ChannelMode::JointStereo => "JointStereo",
            ChannelMode::DualChannel => "DualChannel",
            ChannelMode::Mono => "Mono",
        }
    }
}

/// For the Joint Stereo channel mode, the mode extension describes the stereo encoding features
/// in effect. For every other channel mode the field carries no information and is `None`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ModeExtension {
    IntensityOffMsOff,
    IntensityOnMsOff,
    IntensityOffMsOn,
    IntensityOnMsOn,
    None,
}

impl ModeExtension {
    pub fn name(&self) -> &'static str {
        match self {
            ModeExtension::IntensityOffMsOff => "IntensityOffMSOff",
            ModeExtension::IntensityOnMsOff => "IntensityOnMSOff",
            ModeExtension::IntensityOffMsOn => "IntensityOffMSOn",
            ModeExtension::IntensityOnMsOn => "IntensityOnMSOn",
            ModeExtension::None => "NONE",
        }
    }
}

/// The emphasis applied during encoding.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Emphasis {
    /// No emphasis.
    None,
    /// 50/15us.
    Ms5015,
    /// Reserved code.
    Reserved,
    /// CCIT J.17.
    CcitJ17,
}

impl Emphasis {
    pub fn name(&self) -> &'static str {
        match self {
            Emphasis::None => "NONE",
            Emphasis::Ms5015 => "MS5015",
            Emphasis::Reserved => "Reserved",
            Emphasis::CcitJ17 => "CCITJ17",
        }
    }
}

/// A MPEG 1, 2, or 2.5 audio frame header.
#[derive(Clone, Debug)]
pub struct FrameHeader {
    /// The verbatim 4-byte header word.
    pub word: [u8; 4],
    pub version: MpegVersion,
    pub layer: MpegLayer,
    /// The raw protection bit: set when no CRC follows the header.
    pub crc_absent: bool,
    /// The bit rate in kbit/s.
    pub bitrate: u32,
    /// The sampling rate in Hz.
    pub sample_rate: u32,
    pub padding: bool,
    pub private: bool,
    pub channel_mode: ChannelMode,
    pub mode_extension: ModeExtension,
    pub copyright: bool,
    pub original: bool,
    pub emphasis: Emphasis,
}

impl FrameHeader {
    /// Returns true if this a MPEG1 frame, false otherwise.
    #[inline(always)]
    pub fn is_mpeg1(&self) -> bool {
        self.version == MpegVersion::Mpeg1
    }

    /// Returns the number of granules in the frame.
    #[inline(always)]
    pub fn n_granules(&self) -> usize {
        match self.version {
            MpegVersion::Mpeg1 => 2,
            _ => 1,
        }
    }

    /// Returns the number of channels.
    #[inline(always)]
    pub fn n_channels(&self) -> usize {
        self.channel_mode.count()
    }

    /// Returns the number of audio samples in the frame per channel.
    pub fn samples_per_frame(&self) -> u32 {
        match self.layer {
            MpegLayer::Layer1 => 384,
            MpegLayer::Layer2 => 1152,
            MpegLayer::Layer3 if self.is_mpeg1() => 1152,
            MpegLayer::Layer3 => 576,
        }
    }

    /// The total frame length in bytes, header included:
    /// `samples_per_frame / 8 * bitrate / sample_rate`, plus one byte when padded.
    pub fn frame_size(&self) -> usize {
        let bits_per_sample_block = u64::from(self.samples_per_frame() / 8);
        let size = bits_per_sample_block * u64::from(self.bitrate) * 1000 / u64::from(self.sample_rate);

        size as usize + usize::from(self.padding)
    }

    /// Get the side information length. Only Layer III frames carry side information.
    #[inline(always)]
    pub fn side_info_len(&self) -> usize {
        match (self.layer, self.version, self.channel_mode) {
            (MpegLayer::Layer3, MpegVersion::Mpeg1, ChannelMode::Mono) => 17,
            (MpegLayer::Layer3, MpegVersion::Mpeg1, _) => 32,
            (MpegLayer::Layer3, _, ChannelMode::Mono) => 9,
            (MpegLayer::Layer3, _, _) => 17,
            _ => 0,
        }
    }

    /// The length in bytes of the CRC word following the header, 0 when absent.
    #[inline(always)]
    pub fn crc_len(&self) -> usize {
        if self.crc_absent {
            0
        }
        else {
            2
        }
    }

    /// The offset of the side information from the start of the frame. The corrected mapping
    /// places it immediately after the CRC word: offset 4 when the CRC is absent, 6 when present.
    /// The legacy mapping is the inverse, matching historical analyzers.
    #[inline(always)]
    pub fn side_info_offset(&self, legacy: bool) -> usize {
        let after_crc = 4 + self.crc_len();

        if legacy {
            10 - after_crc
        }
        else {
            after_crc
        }
    }
}
