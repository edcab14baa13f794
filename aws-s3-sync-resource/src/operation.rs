/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use crate::error::{self, Error};

mod context;
pub use context::{SyncContext, SyncContextBuilder};

mod output;
pub use output::SyncOutput;

mod create;
mod delete;
mod update;
mod worker;

/// The CloudFormation request types a sync resource handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestType {
    /// Upload the tree into an empty destination
    Create,
    /// Replace everything under the destination prefix with the tree
    Update,
    /// Remove everything under the destination prefix
    Delete,
}

impl RequestType {
    /// Execute the sync operation for this request type
    pub async fn orchestrate(self, ctx: SyncContext) -> Result<SyncOutput, Error> {
        let state = Arc::new(SyncState::new(ctx));
        match self {
            RequestType::Create => create::orchestrate(state.clone()).await?,
            RequestType::Update => update::orchestrate(state.clone()).await?,
            RequestType::Delete => delete::orchestrate(state.clone()).await?,
        }
        Ok(SyncOutput::from(state.as_ref()))
    }

    /// The request type as it appears in CloudFormation events
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::Create => "Create",
            RequestType::Update => "Update",
            RequestType::Delete => "Delete",
        }
    }
}

impl FromStr for RequestType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Create" => Ok(RequestType::Create),
            "Update" => Ok(RequestType::Update),
            "Delete" => Ok(RequestType::Delete),
            other => Err(error::invalid_input(format!("Unknown request type {other}"))),
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sync operation state shared by all tasks of one operation
#[derive(Debug)]
pub(crate) struct SyncState {
    ctx: SyncContext,
    objects_uploaded: AtomicU64,
    objects_deleted: AtomicU64,
    total_bytes_transferred: AtomicU64,
}

impl SyncState {
    fn new(ctx: SyncContext) -> Self {
        Self {
            ctx,
            objects_uploaded: AtomicU64::default(),
            objects_deleted: AtomicU64::default(),
            total_bytes_transferred: AtomicU64::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;

    use super::RequestType;

    #[test]
    fn test_request_type_from_str() {
        assert_eq!(RequestType::Create, "Create".parse().unwrap());
        assert_eq!(RequestType::Update, "Update".parse().unwrap());
        assert_eq!(RequestType::Delete, "Delete".parse().unwrap());

        let err = "create".parse::<RequestType>().unwrap_err();
        assert_eq!(&ErrorKind::InputInvalid, err.kind());
        assert_eq!(
            "Unknown request type create",
            std::error::Error::source(&err).unwrap().to_string()
        );
    }

    #[test]
    fn test_request_type_display() {
        assert_eq!("Update", RequestType::Update.to_string());
    }
}
