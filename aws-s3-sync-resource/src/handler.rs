/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::cfn::{
    self, CfnResponse, CloudFormationEvent, BUCKET_NAME, BYTES_TRANSFERRED, OBJECTS_DELETED,
    OBJECTS_UPLOADED,
};
use crate::error::{self, Error, ErrorKind};
use crate::fs::{FileLister, LocalFs};
use crate::operation::{RequestType, SyncContext, SyncOutput};
use crate::store::{ObjectStore, S3ObjectStore};
use crate::upload_config::UploadConfig;
use crate::Config;

/// Handles CloudFormation custom resource requests by syncing the configured source tree.
#[derive(Debug, Clone)]
pub struct Handler {
    config: Config,
    files: Arc<dyn FileLister>,
    store: Arc<dyn ObjectStore>,
    http: reqwest::Client,
}

impl Handler {
    /// Creates a new handler with the provided config. The local tree is read from
    /// [`Config::source`] and objects are written with [`Config::client`].
    pub fn new(config: Config) -> Handler {
        let files = LocalFs::new(config.source()).follow_symlinks(config.follow_symlinks());
        let store = S3ObjectStore::new(config.client().clone());
        Handler {
            files: Arc::new(files),
            store: Arc::new(store),
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Replace the local tree this handler reads from
    pub fn with_file_lister(mut self, files: Arc<dyn FileLister>) -> Handler {
        self.files = files;
        self
    }

    /// Replace the object store this handler writes to
    pub fn with_object_store(mut self, store: Arc<dyn ObjectStore>) -> Handler {
        self.store = store;
        self
    }

    /// Replace the HTTP client used to send responses to CloudFormation
    pub fn with_http_client(mut self, http: reqwest::Client) -> Handler {
        self.http = http;
        self
    }

    /// Returns a reference to the handler configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Handle `event` and send the outcome to its `ResponseURL`.
    ///
    /// Every failure of the sync itself is reported to CloudFormation as a `FAILED` response.
    /// An error is only returned when the response could not be delivered.
    #[tracing::instrument(skip_all, fields(request_id = %event.request_id))]
    pub async fn respond(&self, event: CloudFormationEvent) -> Result<CfnResponse, Error> {
        let response = self.handle(&event).await;
        match &response.reason {
            Some(reason) => tracing::warn!("{} failed: {reason}", event.request_type),
            None => tracing::info!("{} succeeded", event.request_type),
        }

        cfn::send_response(&self.http, &event.response_url, &response).await?;
        Ok(response)
    }

    /// Handle `event` and return the response for CloudFormation without sending it.
    pub async fn handle(&self, event: &CloudFormationEvent) -> CfnResponse {
        tracing::info!(
            "received {} request for {} (content version {})",
            event.request_type,
            event.logical_resource_id,
            event.content_version().unwrap_or("none")
        );

        let Some(bucket) = event.bucket_name() else {
            return CfnResponse::failed(event, format!("{BUCKET_NAME} must be specified."));
        };

        let request_type = match event.request_type.parse::<RequestType>() {
            Ok(request_type) => request_type,
            Err(_) => {
                return CfnResponse::failed(
                    event,
                    format!("Unknown request type {}", event.request_type),
                )
            }
        };

        // delete never uploads, the upload config is not read
        let upload_config = if request_type == RequestType::Delete {
            None
        } else {
            match self.load_upload_config().await {
                Ok(upload_config) => upload_config,
                Err(err) => {
                    return CfnResponse::failed(
                        event,
                        format!(
                            "Unable to read or parse {}: {}",
                            self.config.upload_config_file(),
                            cause(&err)
                        ),
                    )
                }
            }
        };

        let ctx = SyncContext::builder()
            .bucket(bucket)
            .set_prefix(event.object_prefix().map(str::to_owned))
            .files(self.files.clone())
            .store(self.store.clone())
            .set_upload_config(upload_config)
            .upload_config_file(self.config.upload_config_file())
            .concurrency(self.config.num_workers())
            .build();

        let result = match ctx {
            Ok(ctx) => request_type.orchestrate(ctx).await,
            Err(err) => Err(err),
        };

        match result {
            Ok(output) => {
                tracing::info!(
                    "uploaded {} objects ({} bytes), deleted {} objects",
                    output.objects_uploaded(),
                    output.total_bytes_transferred(),
                    output.objects_deleted()
                );
                CfnResponse::success(event).with_data(response_data(&output))
            }
            Err(err) => CfnResponse::failed(event, failure_reason(request_type, bucket, &err)),
        }
    }

    async fn load_upload_config(&self) -> Result<Option<Arc<UploadConfig>>, Error> {
        let name = self.config.upload_config_file();
        if !self.files.exists(name).await {
            tracing::debug!("no {name} found, uploading with default parameters");
            return Ok(None);
        }

        let contents = self.files.read_file(name).await?;
        let contents = String::from_utf8(contents.to_vec()).map_err(error::invalid_config)?;
        let upload_config = UploadConfig::parse(&contents)?;
        tracing::debug!("loaded {} patterns from {name}", upload_config.len());
        Ok(Some(Arc::new(upload_config)))
    }
}

/// `Fn::GetAtt` attributes of a successful sync
fn response_data(output: &SyncOutput) -> HashMap<String, Value> {
    HashMap::from([
        (OBJECTS_UPLOADED.to_owned(), Value::from(output.objects_uploaded())),
        (OBJECTS_DELETED.to_owned(), Value::from(output.objects_deleted())),
        (
            BYTES_TRANSFERRED.to_owned(),
            Value::from(output.total_bytes_transferred()),
        ),
    ])
}

fn failure_reason(request_type: RequestType, bucket: &str, err: &Error) -> String {
    match (err.kind(), request_type) {
        (ErrorKind::BucketNotEmpty, _) => "Bucket must be empty".to_owned(),
        (ErrorKind::ListFailed, RequestType::Delete) => {
            format!("Unable to list objects in {bucket}. ({})", cause(err))
        }
        (ErrorKind::ListFailed, _) => {
            format!("Unable to list objects in bucket. ({})", cause(err))
        }
        (ErrorKind::DeleteFailed, _) => {
            format!("Unable to delete objects in {bucket}. ({})", cause(err))
        }
        (ErrorKind::UploadFailed, _) => format!("Unable to upload files to S3. ({})", cause(err)),
        _ => format!("Failure when handling event. ({})", cause(err)),
    }
}

/// The messages of the underlying causes of `err`, outermost first.
fn cause(err: &Error) -> String {
    let mut next = std::error::Error::source(err);
    if next.is_none() {
        return err.to_string();
    }

    let mut messages = Vec::new();
    while let Some(source) = next {
        messages.push(source.to_string());
        next = source.source();
    }
    messages.join(": ")
}
