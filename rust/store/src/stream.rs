// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Length-delimited entity streams.
//!
//! A stream is a sequence of [`BrepEntity`] messages, each prefixed by its
//! encoded length as a protobuf varint. The stream ends cleanly only when
//! the input is exhausted exactly at a record boundary.

use std::path::Path;

use prost::Message;

use crate::error::{Error, Result};
use crate::ingest::IngestReport;
use crate::proto::BrepEntity;
use crate::store::BrepStore;

/// Default per-record size limit (64 MiB).
pub const DEFAULT_MAX_RECORD_LEN: usize = 64 * 1024 * 1024;

/// Decoder settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    /// Largest accepted record body, in bytes.
    pub max_record_len: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            max_record_len: DEFAULT_MAX_RECORD_LEN,
        }
    }
}

/// Decodes every record of a length-delimited stream.
///
/// Fails with [`Error::TruncatedStream`] if a length prefix or record body
/// is cut short or a body does not decode, and with
/// [`Error::RecordTooLarge`] if a prefix exceeds the configured limit.
pub fn decode_entities(bytes: &[u8], config: &StreamConfig) -> Result<Vec<BrepEntity>> {
    let mut records = Vec::new();
    let mut rest = bytes;

    while !rest.is_empty() {
        let offset = bytes.len() - rest.len();
        let truncated = |records: usize| Error::TruncatedStream { offset, records };

        let len = prost::encoding::decode_varint(&mut rest)
            .map_err(|_| truncated(records.len()))?;
        if len > config.max_record_len as u64 {
            return Err(Error::RecordTooLarge {
                offset,
                len: usize::try_from(len).unwrap_or(usize::MAX),
                limit: config.max_record_len,
            });
        }
        let len = len as usize;
        if rest.len() < len {
            return Err(truncated(records.len()));
        }

        let (body, tail) = rest.split_at(len);
        let record = BrepEntity::decode(body).map_err(|_| truncated(records.len()))?;
        records.push(record);
        rest = tail;
    }

    tracing::debug!(bytes = bytes.len(), records = records.len(), "Decoded entity stream");
    Ok(records)
}

/// Encodes records as a length-delimited stream.
pub fn encode_entities(records: &[BrepEntity]) -> Result<Vec<u8>> {
    let capacity = records
        .iter()
        .map(|r| {
            let len = r.encoded_len();
            prost::length_delimiter_len(len) + len
        })
        .sum();
    let mut buf = Vec::with_capacity(capacity);
    for record in records {
        record.encode_length_delimited(&mut buf)?;
    }
    Ok(buf)
}

/// Writes records to `path` as a length-delimited stream.
pub fn write_entities(path: impl AsRef<Path>, records: &[BrepEntity]) -> Result<()> {
    let path = path.as_ref();
    let bytes = encode_entities(records)?;
    std::fs::write(path, bytes).map_err(|source| Error::ResourceUnavailable {
        path: path.to_path_buf(),
        source,
    })
}

impl BrepStore {
    /// Loads and ingests an entity stream file with the default limits.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<IngestReport> {
        self.load_file_with(path, &StreamConfig::default())
    }

    /// Loads and ingests an entity stream file.
    ///
    /// The whole file is decoded before anything is ingested. If reading or
    /// decoding fails the store is reset, is not ready, and the error is
    /// returned.
    pub fn load_file_with(
        &mut self,
        path: impl AsRef<Path>,
        config: &StreamConfig,
    ) -> Result<IngestReport> {
        let path = path.as_ref();
        let decoded = std::fs::read(path)
            .map_err(|source| Error::ResourceUnavailable {
                path: path.to_path_buf(),
                source,
            })
            .and_then(|bytes| decode_entities(&bytes, config));

        match decoded {
            Ok(records) => Ok(self.build_from_entities(&records)),
            Err(err) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "Failed to load entity stream"
                );
                self.reset();
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::{Part, Vertex};

    fn sample() -> Vec<BrepEntity> {
        vec![
            Part {
                id: 1,
                bodies: vec![2, 3],
            }
            .into(),
            Vertex { id: 4, point: None }.into(),
        ]
    }

    #[test]
    fn decodes_what_it_encodes() {
        let bytes = encode_entities(&sample()).unwrap();
        let decoded = decode_entities(&bytes, &StreamConfig::default()).unwrap();
        assert_eq!(decoded, sample());
    }

    #[test]
    fn empty_input_is_an_empty_stream() {
        let decoded = decode_entities(&[], &StreamConfig::default()).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn truncated_body_reports_offset() {
        let bytes = encode_entities(&sample()).unwrap();
        let first_len = bytes[0] as usize + 1;
        let cut = &bytes[..bytes.len() - 1];
        let err = decode_entities(cut, &StreamConfig::default()).unwrap_err();
        match err {
            Error::TruncatedStream { offset, records } => {
                assert_eq!(offset, first_len);
                assert_eq!(records, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn truncated_length_prefix() {
        // A varint continuation bit with nothing after it.
        let err = decode_entities(&[0x80], &StreamConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::TruncatedStream {
                offset: 0,
                records: 0
            }
        ));
    }

    #[test]
    fn oversized_record_is_rejected() {
        let bytes = encode_entities(&sample()).unwrap();
        let config = StreamConfig { max_record_len: 2 };
        let err = decode_entities(&bytes, &config).unwrap_err();
        assert!(matches!(err, Error::RecordTooLarge { offset: 0, limit: 2, .. }));
        assert!(err.is_resource_error());
    }

    #[test]
    fn undecodable_body_is_truncation() {
        // Length 2, then a field header announcing a 5 byte payload.
        let err = decode_entities(&[0x02, 0x0a, 0x05], &StreamConfig::default()).unwrap_err();
        assert!(matches!(err, Error::TruncatedStream { offset: 0, .. }));
    }

    #[test]
    fn default_limit_is_64_mib() {
        assert_eq!(StreamConfig::default().max_record_len, 64 << 20);
    }
}
