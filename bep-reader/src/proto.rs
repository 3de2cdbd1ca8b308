// Copyright (c) The bep-reader Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire model for the build tool's event log.
//!
//! These are hand-written [`prost`] definitions covering the subset of the
//! build event protocol this crate consumes: the four event identities it
//! dispatches on and their payloads. Everything else a build tool may emit is
//! decoded into default/empty fields and ignored by the readers.

use prost::{Enumeration, Message, Oneof};

/// A single event in a build tool's event log.
///
/// Events are length-delimited on the wire; see
/// [`EventStream`](crate::EventStream) for the framing.
#[derive(Clone, PartialEq, Message)]
pub struct BuildEvent {
    /// The identity of this event.
    #[prost(message, optional, tag = "1")]
    pub id: Option<BuildEventId>,
    /// The payload. For well-formed events its shape matches the identity.
    #[prost(oneof = "Payload", tags = "3, 4, 5, 6")]
    pub payload: Option<Payload>,
}

impl BuildEvent {
    /// Returns the target label carried by this event's identity, if the
    /// identity is one of the label-keyed variants.
    pub fn label(&self) -> Option<&str> {
        match self.id.as_ref()?.id.as_ref()? {
            EventId::TargetConfigured(id) => Some(&id.label),
            EventId::TargetCompleted(id) => Some(&id.label),
            EventId::TestResult(id) => Some(&id.label),
            EventId::NamedSet(_) => None,
        }
    }
}

/// The identity of a [`BuildEvent`].
#[derive(Clone, PartialEq, Message)]
pub struct BuildEventId {
    /// The identity discriminator.
    #[prost(oneof = "EventId", tags = "1, 2, 3, 4")]
    pub id: Option<EventId>,
}

/// Identity discriminator for a [`BuildEvent`].
#[derive(Clone, PartialEq, Oneof)]
pub enum EventId {
    /// A target was configured.
    #[prost(message, tag = "1")]
    TargetConfigured(TargetConfiguredId),
    /// A target finished building.
    #[prost(message, tag = "2")]
    TargetCompleted(TargetCompletedId),
    /// A test run for a target finished.
    #[prost(message, tag = "3")]
    TestResult(TestResultId),
    /// A named set of output files was declared.
    #[prost(message, tag = "4")]
    NamedSet(NamedSetOfFilesId),
}

/// Identity of a target-configured event.
#[derive(Clone, PartialEq, Message)]
pub struct TargetConfiguredId {
    /// The label of the configured target.
    #[prost(string, tag = "1")]
    pub label: String,
}

/// Identity of a target-completed event.
#[derive(Clone, PartialEq, Message)]
pub struct TargetCompletedId {
    /// The label of the completed target.
    #[prost(string, tag = "1")]
    pub label: String,
}

/// Identity of a test-result event.
#[derive(Clone, PartialEq, Message)]
pub struct TestResultId {
    /// The label of the tested target.
    #[prost(string, tag = "1")]
    pub label: String,
}

/// Identity of a named-file-set event.
#[derive(Clone, PartialEq, Message)]
pub struct NamedSetOfFilesId {
    /// Opaque identifier for the file set, unique within one stream.
    #[prost(string, tag = "1")]
    pub id: String,
}

/// Payload of a [`BuildEvent`].
#[derive(Clone, PartialEq, Oneof)]
pub enum Payload {
    /// Payload of a target-configured event.
    #[prost(message, tag = "3")]
    Configured(TargetConfigured),
    /// Payload of a target-completed event.
    #[prost(message, tag = "4")]
    Completed(TargetComplete),
    /// Payload of a test-result event.
    #[prost(message, tag = "5")]
    TestResult(TestResult),
    /// Payload of a named-file-set event.
    #[prost(message, tag = "6")]
    NamedSetOfFiles(NamedSetOfFiles),
}

/// Payload of a target-configured event.
#[derive(Clone, PartialEq, Message)]
pub struct TargetConfigured {
    /// Human-readable rule kind of the target, e.g. `sh_test rule`.
    #[prost(string, tag = "1")]
    pub target_kind: String,
}

/// Payload of a target-completed event.
#[derive(Clone, PartialEq, Message)]
pub struct TargetComplete {
    /// Human-readable rule kind of the target, e.g. `sh_test rule`.
    #[prost(string, tag = "1")]
    pub target_kind: String,
}

/// Payload of a test-result event.
#[derive(Clone, PartialEq, Message)]
pub struct TestResult {
    /// Result status of the run. Decoded as a raw `i32` so that codes from
    /// newer protocol revisions survive until status mapping.
    #[prost(enumeration = "TestStatus", tag = "1")]
    pub status: i32,
    /// URIs of the files produced by the run (result XML, logs, ...).
    #[prost(string, repeated, tag = "2")]
    pub output_uris: Vec<String>,
}

/// Payload of a named-file-set event.
#[derive(Clone, PartialEq, Message)]
pub struct NamedSetOfFiles {
    /// URIs of the files in the set.
    #[prost(string, repeated, tag = "1")]
    pub file_uris: Vec<String>,
}

/// Result status of a test run, as encoded on the wire.
///
/// Codes not listed here belong to protocol revisions newer than this crate;
/// [`TestStatus::from_wire`](crate::TestStatus::from_wire) maps them to
/// [`TestStatus::Unrecognized`](crate::TestStatus::Unrecognized).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Enumeration)]
#[repr(i32)]
pub enum TestStatus {
    /// The test did not report a status.
    NoStatus = 0,
    /// The test passed.
    Passed = 1,
    /// The test passed after one or more failing attempts.
    Flaky = 2,
    /// The test timed out.
    Timeout = 3,
    /// The test failed.
    Failed = 4,
    /// The test did not run to completion.
    Incomplete = 5,
    /// A remote execution failure prevented the test from running.
    RemoteFailure = 6,
    /// The test could not be built.
    FailedToBuild = 7,
    /// The tool stopped before the test was run.
    ToolHaltedBeforeTesting = 8,
}
