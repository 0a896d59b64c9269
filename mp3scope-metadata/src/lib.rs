// Mp3scope
// Copyright (c) 2026 The Project Mp3scope Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! This crate implements readers for the two metadata containers that bracket an MP3 stream: the
//! leading ID3v2 container and the trailing 128-byte ID3v1.1 tag.
//!
//! Both readers describe structure rather than merely extracting tags: every tag frame records
//! its absolute position and, when capture is enabled, its raw bytes, so that a structural
//! artifact can reproduce the container bit-exactly.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod id3v1;
pub mod id3v2;
