// Mp3scope
// Copyright (c) 2026 The Project Mp3scope Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `errors` module defines the common error type.

use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::result;

/// `Error` provides an enumeration of all possible errors reported by mp3scope.
#[derive(Debug)]
pub enum Error {
    /// An IO error occurred while reading or writing a stream or an artifact.
    IoError(io::Error),
    /// A MPEG audio frame header failed to validate or decode.
    InvalidHeader(&'static str),
    /// A Layer III side-information block was shorter than its layout requires.
    TruncatedSideInfo(&'static str),
    /// An ID3v2 container failed to validate.
    InvalidId3v2(&'static str),
    /// A read was attempted past the end of a buffer or bitstream.
    OutOfRange(&'static str),
    /// A structural artifact lacks the raw bytes required for reconstruction.
    MissingRawData(&'static str),
    /// A structural artifact could not be parsed.
    MalformedArtifact(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::IoError(ref err) => {
                write!(f, "io error: {}", err)
            }
            Error::InvalidHeader(msg) => {
                write!(f, "invalid frame header: {}", msg)
            }
            Error::TruncatedSideInfo(msg) => {
                write!(f, "truncated side information: {}", msg)
            }
            Error::InvalidId3v2(msg) => {
                write!(f, "invalid ID3v2 container: {}", msg)
            }
            Error::OutOfRange(msg) => {
                write!(f, "out of range: {}", msg)
            }
            Error::MissingRawData(msg) => {
                write!(f, "missing raw data: {}", msg)
            }
            Error::MalformedArtifact(ref msg) => {
                write!(f, "malformed artifact: {}", msg)
            }
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match *self {
            Error::IoError(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::IoError(err)
    }
}

pub type Result<T> = result::Result<T, Error>;

/// Convenience function to create an invalid header error.
pub fn invalid_header_error<T>(desc: &'static str) -> Result<T> {
    Err(Error::InvalidHeader(desc))
}

/// Convenience function to create a truncated side information error.
pub fn truncated_side_info_error<T>(desc: &'static str) -> Result<T> {
    Err(Error::TruncatedSideInfo(desc))
}

/// Convenience function to create an invalid ID3v2 error.
pub fn invalid_id3v2_error<T>(desc: &'static str) -> Result<T> {
    Err(Error::InvalidId3v2(desc))
}

/// Convenience function to create an out-of-range error.
pub fn out_of_range_error<T>(desc: &'static str) -> Result<T> {
    Err(Error::OutOfRange(desc))
}

/// Convenience function to create a missing raw data error.
pub fn missing_raw_data_error<T>(desc: &'static str) -> Result<T> {
    Err(Error::MissingRawData(desc))
}

/// Convenience function to create a malformed artifact error.
pub fn malformed_artifact_error<T>(desc: String) -> Result<T> {
    Err(Error::MalformedArtifact(desc))
}
