/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::path::{Path, PathBuf};

use crate::error::{self, Error};
use crate::types::ConcurrencySetting;
use crate::{DEFAULT_CONCURRENCY, S3_UPLOAD_CONFIG_FILE};

pub(crate) mod loader;

/// Configuration for a [`Handler`](crate::handler::Handler)
#[derive(Debug, Clone)]
pub struct Config {
    client: aws_sdk_s3::Client,
    source: PathBuf,
    upload_config_file: String,
    concurrency: ConcurrencySetting,
    follow_symlinks: bool,
}

impl Config {
    /// Create a new `Config` builder
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// The Amazon S3 client instance that will be used to send requests to S3.
    pub fn client(&self) -> &aws_sdk_s3::Client {
        &self.client
    }

    /// The local directory whose contents are synced.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Name of the upload configuration file, relative to [`source`](Self::source).
    ///
    /// This file is never uploaded itself.
    pub fn upload_config_file(&self) -> &str {
        &self.upload_config_file
    }

    /// Returns the concurrency setting to use for sync operations.
    pub fn concurrency(&self) -> &ConcurrencySetting {
        &self.concurrency
    }

    /// Whether symbolic links are followed when traversing [`source`](Self::source).
    pub fn follow_symlinks(&self) -> bool {
        self.follow_symlinks
    }

    /// Get the concrete number of workers to use based on the concurrency setting.
    pub(crate) fn num_workers(&self) -> usize {
        match self.concurrency {
            ConcurrencySetting::Explicit(concurrency) => concurrency.max(1),
            ConcurrencySetting::Auto => DEFAULT_CONCURRENCY,
        }
    }
}

/// Fluent style builder for [Config]
#[derive(Debug, Clone, Default)]
pub struct Builder {
    client: Option<aws_sdk_s3::Client>,
    source: Option<PathBuf>,
    upload_config_file: Option<String>,
    concurrency: ConcurrencySetting,
    follow_symlinks: bool,
}

impl Builder {
    /// Set an explicit S3 client to use.
    /// Required.
    pub fn client(mut self, client: aws_sdk_s3::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// The local directory whose contents are synced.
    ///
    /// Default is the current working directory, which for Lambda is the task root.
    pub fn source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Name of the upload configuration file, relative to the source directory.
    ///
    /// Default is `.s3uploadconfig.json`.
    pub fn upload_config_file(mut self, name: impl Into<String>) -> Self {
        self.upload_config_file = Some(name.into());
        self
    }

    /// Set the concurrency level this component is allowed to use.
    ///
    /// This sets the maximum number of concurrent in-flight requests.
    /// Default is [ConcurrencySetting::Auto].
    pub fn concurrency(mut self, concurrency: ConcurrencySetting) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Whether to follow symbolic links when traversing the source directory.
    /// Defaults to false.
    pub fn follow_symlinks(mut self, follow_symlinks: bool) -> Self {
        self.follow_symlinks = follow_symlinks;
        self
    }

    /// Consumes the builder and constructs a [`Config`](crate::config::Config)
    pub fn build(self) -> Result<Config, Error> {
        let client = self
            .client
            .ok_or_else(|| error::invalid_input("an S3 client is required"))?;

        Ok(Config {
            client,
            source: self.source.unwrap_or_else(|| PathBuf::from(".")),
            upload_config_file: self
                .upload_config_file
                .unwrap_or_else(|| S3_UPLOAD_CONFIG_FILE.to_owned()),
            concurrency: self.concurrency,
            follow_symlinks: self.follow_symlinks,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use crate::error::ErrorKind;
    use crate::types::ConcurrencySetting;

    use super::Config;

    fn client() -> aws_sdk_s3::Client {
        let conf = aws_sdk_s3::Config::builder()
            .behavior_version_latest()
            .region(aws_sdk_s3::config::Region::new("us-east-1"))
            .build();
        aws_sdk_s3::Client::from_conf(conf)
    }

    #[test]
    fn test_defaults() {
        let config = Config::builder().client(client()).build().unwrap();
        assert_eq!(Path::new("."), config.source());
        assert_eq!(".s3uploadconfig.json", config.upload_config_file());
        assert_eq!(8, config.num_workers());
        assert!(!config.follow_symlinks());
    }

    #[test]
    fn test_explicit_concurrency_is_at_least_one() {
        let config = Config::builder()
            .client(client())
            .concurrency(ConcurrencySetting::Explicit(0))
            .build()
            .unwrap();
        assert_eq!(1, config.num_workers());
    }

    #[test]
    fn test_client_required() {
        let err = Config::builder().build().unwrap_err();
        assert_eq!(&ErrorKind::InputInvalid, err.kind());
    }
}
