/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::env;
use std::path::PathBuf;

use crate::config::Builder;
use crate::error::Error;
use crate::{types::ConcurrencySetting, Config};

/// Environment variable overriding the source directory
pub(crate) const SOURCE_DIR_ENV: &str = "S3_SYNC_SOURCE_DIR";

/// Environment variable overriding the number of concurrent transfers
pub(crate) const CONCURRENCY_ENV: &str = "S3_SYNC_CONCURRENCY";

/// Load sync [`Config`] from the environment.
#[derive(Default, Debug)]
pub struct ConfigLoader {
    builder: Builder,
    source: Option<PathBuf>,
    concurrency: Option<ConcurrencySetting>,
}

impl ConfigLoader {
    /// The local directory whose contents are synced.
    ///
    /// Takes precedence over `S3_SYNC_SOURCE_DIR`.
    pub fn source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Name of the upload configuration file, relative to the source directory.
    pub fn upload_config_file(mut self, name: impl Into<String>) -> Self {
        self.builder = self.builder.upload_config_file(name);
        self
    }

    /// Set the concurrency level this component is allowed to use.
    ///
    /// Takes precedence over `S3_SYNC_CONCURRENCY`.
    pub fn concurrency(mut self, concurrency: ConcurrencySetting) -> Self {
        self.concurrency = Some(concurrency);
        self
    }

    /// Whether to follow symbolic links when traversing the source directory.
    pub fn follow_symlinks(mut self, follow_symlinks: bool) -> Self {
        self.builder = self.builder.follow_symlinks(follow_symlinks);
        self
    }

    /// Load the default configuration
    ///
    /// If fields have been overridden during builder construction, the override values will be
    /// used. Otherwise, the environment and then the default values for each field are used.
    pub async fn load(self) -> Result<Config, Error> {
        let shared_config = aws_config::from_env().load().await;
        let s3_client = aws_sdk_s3::Client::new(&shared_config);

        let mut builder = self.builder.client(s3_client);
        if let Some(source) = self.source.or_else(|| env::var_os(SOURCE_DIR_ENV).map(PathBuf::from)) {
            builder = builder.source(source);
        }
        if let Some(concurrency) = self.concurrency.or_else(concurrency_from_env) {
            builder = builder.concurrency(concurrency);
        }
        builder.build()
    }
}

fn concurrency_from_env() -> Option<ConcurrencySetting> {
    let value = env::var(CONCURRENCY_ENV).ok()?;
    match value.trim().parse::<usize>() {
        Ok(n) => Some(ConcurrencySetting::Explicit(n)),
        Err(err) => {
            tracing::warn!("ignoring {CONCURRENCY_ENV}={value:?}: {err}");
            None
        }
    }
}
