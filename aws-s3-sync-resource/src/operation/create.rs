/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::sync::Arc;

use super::{worker, SyncState};
use crate::error::{self, Error, ErrorKind};

/// Upload the tree into a destination prefix that must be empty.
#[tracing::instrument(skip_all, level = "debug", name = "sync-create")]
pub(super) async fn orchestrate(state: Arc<SyncState>) -> Result<(), Error> {
    let ctx = &state.ctx;
    let prefix = ctx.prefix.as_deref();

    let is_empty = ctx
        .store
        .is_empty(&ctx.bucket, prefix)
        .await
        .map_err(error::from_kind(ErrorKind::ListFailed))?;
    if !is_empty {
        return Err(error::bucket_not_empty(&ctx.bucket, prefix));
    }

    worker::upload_all(state.clone())
        .await
        .map_err(error::from_kind(ErrorKind::UploadFailed))
}
