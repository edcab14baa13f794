/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::collections::HashMap;

use aws_sdk_s3::operation::put_object::builders::PutObjectFluentBuilder;
use serde::Serialize;

/// The concurrency settings to use for a sync operation.
#[derive(Debug, Clone, Default)]
pub enum ConcurrencySetting {
    /// Automatically configure an optimal concurrency setting based on the execution environment.
    #[default]
    Auto,

    /// Explicitly configured concurrency setting.
    Explicit(usize),
}

/// The subset of `PutObject` parameters resolved for a single object from the upload
/// configuration.
///
/// Fields no matching pattern contributed are `None` and are omitted entirely when
/// serialized, so an empty set serializes to `{}`.
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UploadParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) metadata: Option<HashMap<String, String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) content_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) content_disposition: Option<String>,
}

impl UploadParams {
    /// User-defined object metadata
    pub fn metadata(&self) -> Option<&HashMap<String, String>> {
        self.metadata.as_ref()
    }

    /// `Content-Type` of the object
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// `Content-Disposition` of the object
    pub fn content_disposition(&self) -> Option<&str> {
        self.content_disposition.as_deref()
    }

    /// True when no parameter is set and the S3 defaults apply
    pub fn is_empty(&self) -> bool {
        self.metadata.is_none() && self.content_type.is_none() && self.content_disposition.is_none()
    }

    /// Copy the resolved parameters onto a `PutObject` request.
    ///
    /// Only fields that are set are copied; unset fields keep whatever the request already had.
    pub(crate) fn apply_to_put_object(self, mut req: PutObjectFluentBuilder) -> PutObjectFluentBuilder {
        if let Some(metadata) = self.metadata {
            req = req.set_metadata(Some(metadata));
        }
        if let Some(content_type) = self.content_type {
            req = req.content_type(content_type);
        }
        if let Some(content_disposition) = self.content_disposition {
            req = req.content_disposition(content_disposition);
        }
        req
    }
}
