/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::sync::Arc;

use crate::error::{self, Error};
use crate::fs::FileLister;
use crate::store::ObjectStore;
use crate::upload_config::UploadConfig;
use crate::{DEFAULT_CONCURRENCY, S3_UPLOAD_CONFIG_FILE};

/// Everything a sync operation works with.
#[derive(Debug, Clone)]
pub struct SyncContext {
    pub(crate) bucket: String,
    pub(crate) prefix: Option<String>,
    pub(crate) files: Arc<dyn FileLister>,
    pub(crate) store: Arc<dyn ObjectStore>,
    pub(crate) upload_config: Option<Arc<UploadConfig>>,
    pub(crate) upload_config_file: String,
    pub(crate) concurrency: usize,
}

impl SyncContext {
    /// Create a new `SyncContext` builder
    pub fn builder() -> SyncContextBuilder {
        SyncContextBuilder::default()
    }

    /// The destination bucket
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// The key prefix prepended verbatim to every uploaded object key
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// The parsed upload configuration, if the tree has one
    pub fn upload_config(&self) -> Option<&UploadConfig> {
        self.upload_config.as_deref()
    }

    /// Name of the upload configuration file, never uploaded itself
    pub fn upload_config_file(&self) -> &str {
        &self.upload_config_file
    }

    /// Maximum number of concurrent object requests
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// The object key for a file at `relative_path` in the local tree
    pub(crate) fn object_key(&self, relative_path: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}{relative_path}"),
            None => relative_path.to_owned(),
        }
    }
}

/// A builder for [`SyncContext`]
#[derive(Debug, Clone, Default)]
pub struct SyncContextBuilder {
    bucket: Option<String>,
    prefix: Option<String>,
    files: Option<Arc<dyn FileLister>>,
    store: Option<Arc<dyn ObjectStore>>,
    upload_config: Option<Arc<UploadConfig>>,
    upload_config_file: Option<String>,
    concurrency: Option<usize>,
}

impl SyncContextBuilder {
    /// The destination bucket. Required.
    pub fn bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = Some(bucket.into());
        self
    }

    /// The key prefix prepended verbatim to object keys.
    ///
    /// No separator is inserted: prefix `site` and file `index.html` give `siteindex.html`.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// The key prefix prepended verbatim to object keys.
    pub fn set_prefix(mut self, prefix: Option<String>) -> Self {
        self.prefix = prefix;
        self
    }

    /// The local tree to upload from. Required.
    pub fn files(mut self, files: Arc<dyn FileLister>) -> Self {
        self.files = Some(files);
        self
    }

    /// The object store to sync into. Required.
    pub fn store(mut self, store: Arc<dyn ObjectStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// The upload configuration resolving per-object parameters.
    pub fn upload_config(mut self, upload_config: Arc<UploadConfig>) -> Self {
        self.upload_config = Some(upload_config);
        self
    }

    /// The upload configuration resolving per-object parameters.
    pub fn set_upload_config(mut self, upload_config: Option<Arc<UploadConfig>>) -> Self {
        self.upload_config = upload_config;
        self
    }

    /// Name of the upload configuration file excluded from uploads.
    ///
    /// Default is `.s3uploadconfig.json`.
    pub fn upload_config_file(mut self, name: impl Into<String>) -> Self {
        self.upload_config_file = Some(name.into());
        self
    }

    /// Maximum number of concurrent object requests. Default is 8.
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = Some(concurrency);
        self
    }

    /// Consume the builder and construct a [`SyncContext`]
    pub fn build(self) -> Result<SyncContext, Error> {
        let bucket = self
            .bucket
            .filter(|b| !b.is_empty())
            .ok_or_else(|| error::invalid_input("bucket is required"))?;
        let files = self
            .files
            .ok_or_else(|| error::invalid_input("a file lister is required"))?;
        let store = self
            .store
            .ok_or_else(|| error::invalid_input("an object store is required"))?;

        Ok(SyncContext {
            bucket,
            prefix: self.prefix,
            files,
            store,
            upload_config: self.upload_config,
            upload_config_file: self
                .upload_config_file
                .unwrap_or_else(|| S3_UPLOAD_CONFIG_FILE.to_owned()),
            concurrency: self.concurrency.unwrap_or(DEFAULT_CONCURRENCY).max(1),
        })
    }
}
