// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Driver configuration loaded from environment variables.

use std::path::PathBuf;

use brep_lite_store::StreamConfig;

/// Driver configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Entity stream to load.
    pub file: Option<PathBuf>,
    /// Maximum size of a single record in MB.
    pub max_record_mb: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            file: std::env::var_os("BREP_FILE").map(PathBuf::from),
            max_record_mb: std::env::var("BREP_MAX_RECORD_MB")
                .unwrap_or_else(|_| "64".into())
                .parse()
                .unwrap_or(64),
        }
    }

    /// Applies command-line arguments; the first one names the input file.
    pub fn with_args(mut self, mut args: impl Iterator<Item = String>) -> Self {
        if let Some(file) = args.next() {
            self.file = Some(PathBuf::from(file));
        }
        self
    }

    pub fn stream_config(&self) -> StreamConfig {
        StreamConfig {
            max_record_len: self.max_record_mb.saturating_mul(1024 * 1024),
        }
    }
}
