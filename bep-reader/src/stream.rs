// Copyright (c) The bep-reader Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Frame decoding for build event logs.
//!
//! An event log is a sequence of frames, each a LEB128 varint byte length
//! followed by that many bytes of protobuf-encoded [`BuildEvent`]. The
//! [`EventStream`] iterator decodes frames one at a time, so logs larger than
//! memory are fine as long as individual events fit.

use crate::{errors::EventReadError, proto::BuildEvent};
use prost::Message;
use std::io::{self, Read};

/// Shift bound for varint decoding; a length prefix that needs this much is
/// malformed (LEB128 never exceeds ten bytes for a 64-bit value).
const MAX_VARINT_SHIFT: u32 = 64;

/// An iterator over the events of a length-delimited build event log.
///
/// Yields each complete frame as a decoded [`BuildEvent`], then `None` when
/// the source is exhausted exactly at a frame boundary. A source that ends
/// mid-frame, or a frame that does not decode, yields a single fatal
/// [`EventReadError`], after which the iterator is fused. The stream is not
/// seekable; to read a log again, construct a new `EventStream` over a fresh
/// reader.
#[derive(Debug)]
pub struct EventStream<R> {
    reader: R,
    /// Byte offset of the next unread byte, for error reporting.
    offset: u64,
    done: bool,
}

impl<R: Read> EventStream<R> {
    /// Creates a new event stream over a byte source.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            offset: 0,
            done: false,
        }
    }

    fn read_frame(&mut self) -> Result<Option<BuildEvent>, EventReadError> {
        let frame_offset = self.offset;
        let Some(len) = self.read_length_prefix()? else {
            return Ok(None);
        };

        // Bound the read by the declared length rather than pre-allocating it:
        // a corrupt prefix must not translate into a huge allocation.
        let mut buf = Vec::new();
        let body_offset = self.offset;
        let actual = (&mut self.reader)
            .take(len)
            .read_to_end(&mut buf)
            .map_err(|error| EventReadError::Read {
                offset: body_offset,
                error,
            })? as u64;
        self.offset += actual;
        if actual < len {
            return Err(EventReadError::TruncatedFrame {
                offset: frame_offset,
                expected: len,
                actual,
            });
        }

        let event =
            BuildEvent::decode(buf.as_slice()).map_err(|error| EventReadError::MalformedEvent {
                offset: frame_offset,
                error,
            })?;
        Ok(Some(event))
    }

    /// Reads the varint length prefix of the next frame.
    ///
    /// Returns `Ok(None)` if the source is exhausted before the first byte,
    /// which is the clean end of the log.
    fn read_length_prefix(&mut self) -> Result<Option<u64>, EventReadError> {
        let prefix_offset = self.offset;
        let mut value = 0u64;
        let mut shift = 0u32;
        loop {
            let mut byte = [0u8; 1];
            loop {
                match self.reader.read(&mut byte) {
                    Ok(0) if shift == 0 => return Ok(None),
                    Ok(0) => {
                        return Err(EventReadError::TruncatedLengthPrefix {
                            offset: prefix_offset,
                        });
                    }
                    Ok(_) => break,
                    Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                    Err(error) => {
                        return Err(EventReadError::Read {
                            offset: self.offset,
                            error,
                        });
                    }
                }
            }
            self.offset += 1;
            value |= u64::from(byte[0] & 0x7f) << shift;
            if byte[0] & 0x80 == 0 {
                return Ok(Some(value));
            }
            shift += 7;
            if shift >= MAX_VARINT_SHIFT {
                return Err(EventReadError::MalformedLengthPrefix {
                    offset: prefix_offset,
                });
            }
        }
    }
}

impl<R: Read> Iterator for EventStream<R> {
    type Item = Result<BuildEvent, EventReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_frame() {
            Ok(Some(event)) => Some(Ok(event)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(error) => {
                self.done = true;
                Some(Err(error))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        proto,
        test_helpers::{configured_event, encode_events, file_set_event, test_result_event},
    };
    use proptest::prelude::*;
    use std::io::Cursor;

    fn collect_events(bytes: &[u8]) -> Vec<Result<BuildEvent, EventReadError>> {
        EventStream::new(Cursor::new(bytes.to_vec())).collect()
    }

    #[test]
    fn empty_log_yields_nothing() {
        assert_eq!(collect_events(&[]).len(), 0);
    }

    #[test]
    fn events_decode_in_order() {
        let events = vec![
            configured_event("//x:t", "sh_test rule"),
            file_set_event(&["file:///a/b"]),
            test_result_event("//x:t", proto::TestStatus::Passed as i32, &[]),
        ];
        let bytes = encode_events(&events);

        let decoded: Vec<_> = collect_events(&bytes)
            .into_iter()
            .map(|event| event.expect("stream is well-formed"))
            .collect();
        assert_eq!(decoded, events);
    }

    #[test]
    fn empty_frame_decodes_to_default_event() {
        // A zero length prefix is a valid frame holding an empty message.
        let decoded = collect_events(&[0x00]);
        assert_eq!(decoded.len(), 1);
        assert_eq!(
            decoded[0].as_ref().expect("valid frame"),
            &BuildEvent::default()
        );
    }

    #[test]
    fn truncated_frame_is_fatal() {
        let mut bytes = encode_events(&[configured_event("//x:t", "sh_test rule")]);
        bytes.truncate(bytes.len() - 1);

        let decoded = collect_events(&bytes);
        assert_eq!(decoded.len(), 1, "no events past the truncation point");
        assert!(matches!(
            decoded[0],
            Err(EventReadError::TruncatedFrame {
                offset: 0,
                expected,
                actual,
            }) if actual == expected - 1
        ));
    }

    #[test]
    fn truncated_length_prefix_is_fatal() {
        // A continuation bit with no following byte.
        let decoded = collect_events(&[0x80]);
        assert_eq!(decoded.len(), 1);
        assert!(matches!(
            decoded[0],
            Err(EventReadError::TruncatedLengthPrefix { offset: 0 })
        ));
    }

    #[test]
    fn overlong_length_prefix_is_fatal() {
        let decoded = collect_events(&[0xff; 12]);
        assert_eq!(decoded.len(), 1);
        assert!(matches!(
            decoded[0],
            Err(EventReadError::MalformedLengthPrefix { offset: 0 })
        ));
    }

    #[test]
    fn malformed_frame_body_is_fatal() {
        // Length 1, then a field header whose varint value is missing.
        let decoded = collect_events(&[0x01, 0x08]);
        assert_eq!(decoded.len(), 1);
        assert!(matches!(
            decoded[0],
            Err(EventReadError::MalformedEvent { offset: 0, .. })
        ));
    }

    #[test]
    fn error_offset_points_at_failing_frame() {
        let mut bytes = encode_events(&[configured_event("//x:t", "sh_test rule")]);
        let first_frame_len = bytes.len() as u64;
        bytes.push(0x80);

        let decoded = collect_events(&bytes);
        assert_eq!(decoded.len(), 2);
        assert!(decoded[0].is_ok());
        assert!(matches!(
            decoded[1],
            Err(EventReadError::TruncatedLengthPrefix { offset }) if offset == first_frame_len
        ));
    }

    #[test]
    fn stream_is_fused_after_error() {
        let mut stream = EventStream::new(Cursor::new(vec![0x80u8]));
        assert!(matches!(stream.next(), Some(Err(_))));
        assert!(stream.next().is_none());
        assert!(stream.next().is_none());
    }

    fn arb_event() -> impl Strategy<Value = BuildEvent> {
        let arb_uris = proptest::collection::vec(any::<String>(), 0..4);
        prop_oneof![
            (any::<String>(), any::<String>())
                .prop_map(|(label, kind)| configured_event(&label, &kind)),
            (any::<String>(), any::<i32>(), arb_uris.clone()).prop_map(|(label, status, uris)| {
                let uris: Vec<&str> = uris.iter().map(String::as_str).collect();
                test_result_event(&label, status, &uris)
            }),
            arb_uris.prop_map(|uris| {
                let uris: Vec<&str> = uris.iter().map(String::as_str).collect();
                file_set_event(&uris)
            }),
            Just(BuildEvent::default()),
        ]
    }

    proptest! {
        #[test]
        fn roundtrip(events in proptest::collection::vec(arb_event(), 0..8)) {
            let bytes = encode_events(&events);
            let decoded: Result<Vec<_>, _> =
                EventStream::new(Cursor::new(bytes)).collect();
            prop_assert_eq!(decoded.expect("roundtrip is well-formed"), events);
        }
    }
}
