// Copyright (c) The bep-reader Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Reader for the binary event logs emitted by Bazel-compatible build tools.
//!
//! A build tool run with event logging enabled appends one length-delimited
//! protobuf record per event to its log. This crate decodes that log in a
//! single forward pass and derives two views from it:
//!
//! - [`read_output_paths`]: the distinct output files referenced by the
//!   build, in first-occurrence order, restricted by a caller-supplied
//!   filter;
//! - [`read_test_results`]: per-target test outcomes — status, rule kind
//!   (correlated from separate configuration/completion events), and the
//!   test XML files produced by each run.
//!
//! Both functions are pure over the supplied byte source and tolerate the
//! anomalies real logs contain: duplicate file references, unresolvable file
//! URIs in either of the two historical encodings, and status codes from
//! newer protocol revisions. Only framing errors — a log that cannot be split
//! into complete frames — abort a read; see [`EventReadError`].
//!
//! Lower-level access to the decoded events themselves is available through
//! [`EventStream`] and the wire model in [`proto`].

mod errors;
mod outputs;
pub mod proto;
mod stream;
#[cfg(test)]
mod test_helpers;
mod test_results;
mod uri;

pub use errors::*;
pub use outputs::*;
pub use stream::*;
pub use test_results::*;
pub use uri::*;
