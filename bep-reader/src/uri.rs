// Copyright (c) The bep-reader Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resolution of file references found in build events.

use crate::errors::FileUriError;
use camino::Utf8PathBuf;
use url::Url;

/// Scheme marker shared by both historical file reference encodings.
const FILE_SCHEME_PREFIX: &str = "file://";

/// Resolves a file reference from a build event to a canonical local path.
///
/// Build tools have emitted file references in two forms over time, and logs
/// in both forms are still around:
///
/// 1. a conforming file URI with percent-encoded path segments, e.g.
///    `file:///tmp/out%20dir/test.xml`;
/// 2. the `file://` marker glued directly onto the raw absolute path with no
///    encoding at all, e.g. `file:///tmp/out dir/test.xml`.
///
/// The conforming form is tried first; if the reference does not parse as a
/// URI with a local path, the raw form is assumed. References in neither form
/// are errors, which callers recover from by skipping the single entry.
pub fn resolve_file_uri(uri: &str) -> Result<Utf8PathBuf, FileUriError> {
    let Some(rest) = uri.strip_prefix(FILE_SCHEME_PREFIX) else {
        return Err(FileUriError::UnsupportedScheme {
            uri: uri.to_owned(),
        });
    };

    if let Ok(parsed) = Url::parse(uri) {
        if let Ok(path) = parsed.to_file_path() {
            return Utf8PathBuf::from_path_buf(path).map_err(|_| FileUriError::NonUtf8Path {
                uri: uri.to_owned(),
            });
        }
    }

    // Legacy form: whatever follows the marker is the path, verbatim.
    if rest.starts_with('/') {
        return Ok(Utf8PathBuf::from(rest));
    }
    Err(FileUriError::NotALocalPath {
        uri: uri.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("file:///a/File.py", "/a/File.py"; "plain absolute path")]
    #[test_case("file:///usr/bin/run", "/usr/bin/run"; "no extension")]
    #[test_case(
        "file:///tmp/out%20dir/test.xml",
        "/tmp/out dir/test.xml";
        "percent encoded segment"
    )]
    #[test_case(
        "file:///tmp/out dir/test.xml",
        "/tmp/out dir/test.xml";
        "legacy unencoded space"
    )]
    #[test_case(
        "file:///tmp/100%done/test.xml",
        "/tmp/100%done/test.xml";
        "stray percent stays verbatim"
    )]
    fn resolves(uri: &str, expected: &str) {
        assert_eq!(
            resolve_file_uri(uri).expect("reference resolves"),
            Utf8PathBuf::from(expected)
        );
    }

    #[test]
    fn rejects_other_schemes() {
        assert_eq!(
            resolve_file_uri("http://example.com/a.xml"),
            Err(FileUriError::UnsupportedScheme {
                uri: "http://example.com/a.xml".to_owned()
            })
        );
    }

    #[test]
    fn rejects_bare_paths() {
        assert!(matches!(
            resolve_file_uri("/tmp/test.xml"),
            Err(FileUriError::UnsupportedScheme { .. })
        ));
    }

    #[test]
    fn rejects_remote_hosts() {
        assert!(matches!(
            resolve_file_uri("file://build-host/tmp/test.xml"),
            Err(FileUriError::NotALocalPath { .. })
        ));
    }

}
