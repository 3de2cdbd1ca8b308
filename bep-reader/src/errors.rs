// Copyright (c) The bep-reader Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced while reading build event logs.

use std::io;
use thiserror::Error;

/// A fatal error that occurred while reading a build event log.
///
/// Any of these aborts the whole read: an event log that cannot be fully
/// decoded yields no derived views at all, since downstream consumers
/// reconcile whole-build state and a partial picture is worse than none.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EventReadError {
    /// An I/O error occurred while reading from the underlying source.
    #[error("error reading event log at offset {offset}")]
    Read {
        /// Byte offset at which the read failed.
        offset: u64,
        /// The underlying error.
        #[source]
        error: io::Error,
    },

    /// The log ended in the middle of a frame's length prefix.
    #[error("event log ended mid-length-prefix at offset {offset}")]
    TruncatedLengthPrefix {
        /// Byte offset of the start of the truncated prefix.
        offset: u64,
    },

    /// A length prefix was not a valid varint.
    #[error("length prefix at offset {offset} is not a valid varint")]
    MalformedLengthPrefix {
        /// Byte offset of the start of the malformed prefix.
        offset: u64,
    },

    /// The log ended before a frame's declared length was reached.
    #[error(
        "event log ended mid-frame at offset {offset}: expected {expected} bytes, got {actual}"
    )]
    TruncatedFrame {
        /// Byte offset of the start of the truncated frame.
        offset: u64,
        /// Number of bytes the length prefix declared.
        expected: u64,
        /// Number of bytes actually available.
        actual: u64,
    },

    /// A frame's bytes did not decode as a build event.
    #[error("malformed build event in frame at offset {offset}")]
    MalformedEvent {
        /// Byte offset of the start of the malformed frame.
        offset: u64,
        /// The underlying decode error.
        #[source]
        error: prost::DecodeError,
    },
}

/// An error resolving a file reference from an event to a local path.
///
/// Unlike [`EventReadError`], these are recovered from: the readers log the
/// offending entry and skip it, and decoding continues.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FileUriError {
    /// The reference does not carry the local-file scheme marker.
    #[error("file reference `{uri}` does not use the file scheme")]
    UnsupportedScheme {
        /// The offending reference.
        uri: String,
    },

    /// The reference carries the scheme marker but does not resolve to an
    /// absolute local path (e.g. it names a remote host).
    #[error("file reference `{uri}` does not resolve to an absolute local path")]
    NotALocalPath {
        /// The offending reference.
        uri: String,
    },

    /// The reference resolves to a path that is not valid UTF-8.
    #[error("file reference `{uri}` resolves to a non-UTF-8 path")]
    NonUtf8Path {
        /// The offending reference.
        uri: String,
    },
}
