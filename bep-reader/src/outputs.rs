// Copyright (c) The bep-reader Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collection of output artifacts from build event logs.

use crate::{
    errors::EventReadError,
    proto::{NamedSetOfFiles, Payload},
    stream::EventStream,
    uri::resolve_file_uri,
};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexSet;
use std::io::Read;
use tracing::warn;

/// Reads the output files referenced by the named-file-set events of an event
/// log.
///
/// `filter` decides whether a resolved path is included; it is called once per
/// file entry encountered, duplicates included. The returned paths are
/// deduplicated, in first-occurrence order across the whole log.
///
/// File references that resolve to no local path are logged and skipped.
/// Framing errors abort the read and return no paths at all.
pub fn read_output_paths<R, F>(reader: R, mut filter: F) -> Result<Vec<Utf8PathBuf>, EventReadError>
where
    R: Read,
    F: FnMut(&Utf8Path) -> bool,
{
    let mut collector = OutputCollector::default();
    for event in EventStream::new(reader) {
        if let Some(Payload::NamedSetOfFiles(file_set)) = event?.payload {
            collector.add_file_set(&file_set, &mut filter);
        }
    }
    Ok(collector.into_paths())
}

/// Accumulates distinct output paths in first-seen order.
#[derive(Debug, Default)]
struct OutputCollector {
    paths: IndexSet<Utf8PathBuf>,
}

impl OutputCollector {
    fn add_file_set(
        &mut self,
        file_set: &NamedSetOfFiles,
        filter: &mut impl FnMut(&Utf8Path) -> bool,
    ) {
        for uri in &file_set.file_uris {
            let path = match resolve_file_uri(uri) {
                Ok(path) => path,
                Err(error) => {
                    warn!("skipping unresolvable file reference: {error}");
                    continue;
                }
            };
            if filter(&path) {
                self.paths.insert(path);
            }
        }
    }

    fn into_paths(self) -> Vec<Utf8PathBuf> {
        self.paths.into_iter().collect()
    }
}
