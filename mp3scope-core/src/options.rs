// Mp3scope
// Copyright (c) 2026 The Project Mp3scope Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/// `AnalyzerOptions` is a common set of options that all parsers and the report emitter use.
#[derive(Copy, Clone, Debug)]
pub struct AnalyzerOptions {
    /// Capture the raw bytes of every frame, tag, and container region. Raw capture is required
    /// for an artifact to be reconstructable.
    pub capture_raw: bool,

    /// Encode captured raw bytes as lowercase hexadecimal instead of a byte-literal string.
    pub hex_raw: bool,

    /// Place the side information at frame offset 6 when the CRC is absent and offset 4 when it
    /// is present, mirroring the placement used by historical analyzers. The default is the
    /// corrected mapping: offset 4 without a CRC, offset 6 with one.
    pub legacy_side_info_offset: bool,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        AnalyzerOptions { capture_raw: false, hex_raw: false, legacy_side_info_offset: false }
    }
}
