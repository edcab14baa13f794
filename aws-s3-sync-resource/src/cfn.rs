/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::collections::HashMap;

use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, ErrorKind};

/// Resource property naming the destination bucket
pub const BUCKET_NAME: &str = "BucketName";

/// Resource property naming the key prefix objects are uploaded under
pub const OBJECT_PREFIX: &str = "ObjectPrefix";

/// Resource property that only exists to force an update when the content changes
pub const CONTENT_VERSION: &str = "ContentVersion";

/// Response attribute with the number of objects uploaded
pub const OBJECTS_UPLOADED: &str = "ObjectsUploaded";

/// Response attribute with the number of objects deleted
pub const OBJECTS_DELETED: &str = "ObjectsDeleted";

/// Response attribute with the number of bytes uploaded
pub const BYTES_TRANSFERRED: &str = "BytesTransferred";

/// A CloudFormation custom resource request.
///
/// `RequestType` is kept as a string so unknown request types can still be answered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CloudFormationEvent {
    /// `Create`, `Update` or `Delete`
    pub request_type: String,

    /// Pre-signed URL the response must be sent to
    #[serde(rename = "ResponseURL")]
    pub response_url: String,

    /// ARN of the stack
    pub stack_id: String,

    /// Unique id of this request
    pub request_id: String,

    /// Template name of the custom resource
    pub logical_resource_id: String,

    /// The custom resource type, e.g. `Custom::S3Sync`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,

    /// Present on `Update` and `Delete`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_resource_id: Option<String>,

    /// Properties from the template
    #[serde(default)]
    pub resource_properties: HashMap<String, Value>,

    /// Properties before the update, present on `Update`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_resource_properties: Option<HashMap<String, Value>>,
}

impl CloudFormationEvent {
    /// The `BucketName` property, `None` when absent or empty
    pub fn bucket_name(&self) -> Option<&str> {
        self.property(BUCKET_NAME)
    }

    /// The `ObjectPrefix` property, `None` when absent or empty
    pub fn object_prefix(&self) -> Option<&str> {
        self.property(OBJECT_PREFIX)
    }

    /// The `ContentVersion` property, `None` when absent or empty
    pub fn content_version(&self) -> Option<&str> {
        self.property(CONTENT_VERSION)
    }

    /// The physical id of the resource this event describes
    pub fn physical_id(&self) -> String {
        format!(
            "Bucket:{} ObjectPrefix: {}",
            self.bucket_name().unwrap_or_default(),
            self.object_prefix().unwrap_or_default()
        )
    }

    fn property(&self, name: &str) -> Option<&str> {
        self.resource_properties
            .get(name)
            .and_then(Value::as_str)
            .filter(|v| !v.is_empty())
    }
}

/// Outcome reported to CloudFormation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResponseStatus {
    /// The request succeeded
    Success,
    /// The request failed, `Reason` says why
    Failed,
}

/// The response body for a CloudFormation custom resource request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CfnResponse {
    /// Whether the request succeeded
    pub status: ResponseStatus,

    /// Why the request failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Physical id of the resource
    pub physical_resource_id: String,

    /// Copied from the request
    pub stack_id: String,

    /// Copied from the request
    pub request_id: String,

    /// Copied from the request
    pub logical_resource_id: String,

    /// Attributes exposed through `Fn::GetAtt`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<HashMap<String, Value>>,
}

impl CfnResponse {
    /// A successful response to `event`
    pub fn success(event: &CloudFormationEvent) -> Self {
        Self::new(event, ResponseStatus::Success, None)
    }

    /// A failed response to `event`
    pub fn failed(event: &CloudFormationEvent, reason: impl Into<String>) -> Self {
        Self::new(event, ResponseStatus::Failed, Some(reason.into()))
    }

    fn new(event: &CloudFormationEvent, status: ResponseStatus, reason: Option<String>) -> Self {
        CfnResponse {
            status,
            reason,
            physical_resource_id: event.physical_id(),
            stack_id: event.stack_id.clone(),
            request_id: event.request_id.clone(),
            logical_resource_id: event.logical_resource_id.clone(),
            data: None,
        }
    }

    /// Attach `Fn::GetAtt` attributes
    pub fn with_data(mut self, data: HashMap<String, Value>) -> Self {
        self.data = Some(data);
        self
    }
}

/// Send `response` to the pre-signed `response_url`.
///
/// The URL is signed for an empty `content-type`, so the header is sent empty.
pub async fn send_response(
    client: &reqwest::Client,
    response_url: &str,
    response: &CfnResponse,
) -> Result<(), Error> {
    let body = serde_json::to_vec(response).map_err(|err| Error::new(ErrorKind::ResponseFailed, err))?;
    tracing::debug!("sending response to CloudFormation: {}", String::from_utf8_lossy(&body));

    let resp = client
        .put(response_url)
        .header(CONTENT_TYPE, "")
        .body(body)
        .send()
        .await?;

    tracing::info!("CloudFormation response status: {}", resp.status());
    resp.error_for_status()?;
    Ok(())
}
