// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for loading and ingesting entity streams.

use std::path::PathBuf;

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading or ingesting a BRep entity stream.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input file could not be opened or read.
    #[error("cannot read {}: {source}", path.display())]
    ResourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Decoding stopped before the end of the input.
    #[error("entity stream truncated at byte {offset} after {records} records")]
    TruncatedStream { offset: usize, records: usize },

    /// A length prefix announced a record larger than the configured limit.
    #[error("record at byte {offset} is {len} bytes, limit is {limit}")]
    RecordTooLarge {
        offset: usize,
        len: usize,
        limit: usize,
    },

    /// A decoded record carries none of the six known entity kinds.
    #[error("record {index} has no recognized entity kind")]
    UnrecognizedRecordKind { index: usize },

    /// A record needs more generated loop or shell handles than remain
    /// above the largest record id.
    #[error("record {index} needs generated handles beyond i64::MAX")]
    GeneratedIdsExhausted { index: usize },

    /// Entity records could not be encoded.
    #[error("encode error: {0}")]
    Encode(#[from] prost::EncodeError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Returns `true` for errors that abort a whole load rather than a
    /// single record.
    pub fn is_resource_error(&self) -> bool {
        matches!(
            self,
            Error::ResourceUnavailable { .. }
                | Error::TruncatedStream { .. }
                | Error::RecordTooLarge { .. }
        )
    }
}
