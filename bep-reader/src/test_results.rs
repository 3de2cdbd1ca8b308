// Copyright (c) The bep-reader Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-target test results derived from build event logs.
//!
//! A test-result event does not itself say what kind of target produced it;
//! that comes from the target-configured and target-completed events for the
//! same label. [`read_test_results`] correlates the two in a single forward
//! pass: the kind recorded for an outcome is whatever the log said *before*
//! the test-result event was reached, or nothing. No buffering or replay is
//! done, so a kind-bearing event that arrives after a result does not amend
//! outcomes already built.

use crate::{
    errors::EventReadError,
    proto::{self, Payload},
    stream::EventStream,
    uri::resolve_file_uri,
};
use camino::Utf8PathBuf;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, io::Read};
use tracing::warn;

/// The one file extension recognized as a test result file.
const RESULT_FILE_EXTENSION: &str = "xml";

/// Status of a single test target run.
///
/// Mirrors the wire statuses one-to-one, plus [`Unrecognized`] for codes
/// introduced by protocol revisions newer than this crate.
///
/// [`Unrecognized`]: TestStatus::Unrecognized
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestStatus {
    /// The test did not report a status.
    NoStatus,
    /// The test passed.
    Passed,
    /// The test passed after one or more failing attempts.
    Flaky,
    /// The test timed out.
    Timeout,
    /// The test failed.
    Failed,
    /// The test did not run to completion.
    Incomplete,
    /// A remote execution failure prevented the test from running.
    RemoteFailure,
    /// The test could not be built.
    FailedToBuild,
    /// The tool stopped before the test was run.
    ToolHaltedBeforeTesting,
    /// The wire status code is from a newer protocol revision.
    Unrecognized,
}

impl TestStatus {
    /// Maps a wire status code to a `TestStatus`.
    ///
    /// Total: every known wire code maps to its own status, and codes this
    /// crate does not know map to [`TestStatus::Unrecognized`] rather than
    /// failing, so a log from a newer build tool degrades instead of
    /// aborting.
    pub fn from_wire(code: i32) -> Self {
        match proto::TestStatus::try_from(code) {
            Ok(proto::TestStatus::NoStatus) => TestStatus::NoStatus,
            Ok(proto::TestStatus::Passed) => TestStatus::Passed,
            Ok(proto::TestStatus::Flaky) => TestStatus::Flaky,
            Ok(proto::TestStatus::Timeout) => TestStatus::Timeout,
            Ok(proto::TestStatus::Failed) => TestStatus::Failed,
            Ok(proto::TestStatus::Incomplete) => TestStatus::Incomplete,
            Ok(proto::TestStatus::RemoteFailure) => TestStatus::RemoteFailure,
            Ok(proto::TestStatus::FailedToBuild) => TestStatus::FailedToBuild,
            Ok(proto::TestStatus::ToolHaltedBeforeTesting) => TestStatus::ToolHaltedBeforeTesting,
            Err(_) => TestStatus::Unrecognized,
        }
    }

    /// Returns true if this status reports a passing run.
    pub fn is_success(self) -> bool {
        matches!(self, TestStatus::Passed | TestStatus::Flaky)
    }
}

/// The outcome of a single test target run.
///
/// One outcome is built per test-result event. A sharded or re-attempted
/// target produces several outcomes under the same label, one per event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestOutcome {
    /// The label of the test target.
    pub label: String,
    /// The rule kind of the target, e.g. `sh_test rule`, if a kind-bearing
    /// event for this label preceded the result in the log.
    pub kind: Option<String>,
    /// The status reported for this run.
    pub status: TestStatus,
    /// The result files (test XML) produced by this run, in log order.
    pub result_files: Vec<Utf8PathBuf>,
}

/// Test outcomes for one build invocation, indexed by target label.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TestResults {
    outcomes: IndexMap<String, Vec<TestOutcome>>,
}

impl TestResults {
    /// Returns the outcomes observed for a label, in log order.
    ///
    /// Returns an empty slice for labels with no test-result events.
    pub fn outcomes_for(&self, label: &str) -> &[TestOutcome] {
        self.outcomes.get(label).map_or(&[], Vec::as_slice)
    }

    /// Iterates over the labels with at least one outcome, in first-seen
    /// order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.outcomes.keys().map(String::as_str)
    }

    /// Iterates over all outcomes, grouped by label in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &TestOutcome> {
        self.outcomes.values().flatten()
    }

    /// Returns the total number of outcomes across all labels.
    pub fn len(&self) -> usize {
        self.outcomes.values().map(Vec::len).sum()
    }

    /// Returns true if no test-result events were observed.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    fn push(&mut self, outcome: TestOutcome) {
        self.outcomes
            .entry(outcome.label.clone())
            .or_default()
            .push(outcome);
    }
}

/// Running label → rule kind map fed by kind-bearing events.
///
/// Configured and completed events are expected to agree on the kind; this
/// does not enforce it, the last write wins.
#[derive(Debug, Default)]
struct TargetKindIndex {
    kinds: HashMap<String, String>,
}

impl TargetKindIndex {
    fn observe(&mut self, label: &str, kind: &str) {
        // proto3 encodes an absent kind as "", which carries no information.
        if kind.is_empty() {
            return;
        }
        self.kinds.insert(label.to_owned(), kind.to_owned());
    }

    fn lookup(&self, label: &str) -> Option<&str> {
        self.kinds.get(label).map(String::as_str)
    }
}

/// Reads per-target test outcomes from an event log.
///
/// Builds one [`TestOutcome`] per test-result event, correlated with the rule
/// kind observed for the same label so far (see the module docs for the
/// ordering caveat). Of the event's listed outputs, only files with the
/// recognized result extension are kept; unresolvable references are logged
/// and skipped. Framing errors abort the read and return no results at all.
pub fn read_test_results<R: Read>(reader: R) -> Result<TestResults, EventReadError> {
    let mut kinds = TargetKindIndex::default();
    let mut results = TestResults::default();

    for event in EventStream::new(reader) {
        let event = event?;
        let label = event.label().map(str::to_owned);
        match event.payload {
            Some(Payload::Configured(configured)) => {
                if let Some(label) = label {
                    kinds.observe(&label, &configured.target_kind);
                }
            }
            Some(Payload::Completed(completed)) => {
                if let Some(label) = label {
                    kinds.observe(&label, &completed.target_kind);
                }
            }
            Some(Payload::TestResult(test_result)) => {
                let Some(label) = label else {
                    warn!("skipping test-result event with no labeled identity");
                    continue;
                };
                results.push(build_outcome(label, &test_result, &kinds));
            }
            Some(Payload::NamedSetOfFiles(_)) | None => {}
        }
    }
    Ok(results)
}

fn build_outcome(
    label: String,
    test_result: &proto::TestResult,
    kinds: &TargetKindIndex,
) -> TestOutcome {
    let mut result_files = Vec::new();
    for uri in &test_result.output_uris {
        match resolve_file_uri(uri) {
            Ok(path) => {
                if path.extension() == Some(RESULT_FILE_EXTENSION) {
                    result_files.push(path);
                }
            }
            Err(error) => {
                warn!("skipping unresolvable test output: {error}");
            }
        }
    }

    TestOutcome {
        kind: kinds.lookup(&label).map(str::to_owned),
        status: TestStatus::from_wire(test_result.status),
        label,
        result_files,
    }
}
