// Copyright (c) The bep-reader Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared constructors for event-log tests.

use crate::proto::{
    BuildEvent, BuildEventId, EventId, NamedSetOfFiles, NamedSetOfFilesId, Payload,
    TargetComplete, TargetCompletedId, TargetConfigured, TargetConfiguredId, TestResult,
    TestResultId,
};
use prost::Message;

pub(crate) fn configured_event(label: &str, kind: &str) -> BuildEvent {
    BuildEvent {
        id: Some(BuildEventId {
            id: Some(EventId::TargetConfigured(TargetConfiguredId {
                label: label.to_owned(),
            })),
        }),
        payload: Some(Payload::Configured(TargetConfigured {
            target_kind: kind.to_owned(),
        })),
    }
}

pub(crate) fn completed_event(label: &str, kind: &str) -> BuildEvent {
    BuildEvent {
        id: Some(BuildEventId {
            id: Some(EventId::TargetCompleted(TargetCompletedId {
                label: label.to_owned(),
            })),
        }),
        payload: Some(Payload::Completed(TargetComplete {
            target_kind: kind.to_owned(),
        })),
    }
}

pub(crate) fn test_result_event(label: &str, status: i32, output_uris: &[&str]) -> BuildEvent {
    BuildEvent {
        id: Some(BuildEventId {
            id: Some(EventId::TestResult(TestResultId {
                label: label.to_owned(),
            })),
        }),
        payload: Some(Payload::TestResult(TestResult {
            status,
            output_uris: output_uris.iter().map(|uri| (*uri).to_owned()).collect(),
        })),
    }
}

pub(crate) fn file_set_event(file_uris: &[&str]) -> BuildEvent {
    BuildEvent {
        id: Some(BuildEventId {
            id: Some(EventId::NamedSet(NamedSetOfFilesId { id: "0".to_owned() })),
        }),
        payload: Some(Payload::NamedSetOfFiles(NamedSetOfFiles {
            file_uris: file_uris.iter().map(|uri| (*uri).to_owned()).collect(),
        })),
    }
}

/// Encodes events the way the build tool writes its log: varint length
/// prefix, then the protobuf body.
pub(crate) fn encode_events(events: &[BuildEvent]) -> Vec<u8> {
    let mut buf = Vec::new();
    for event in events {
        event
            .encode_length_delimited(&mut buf)
            .expect("Vec<u8> never runs out of capacity");
    }
    buf
}
