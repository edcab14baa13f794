/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::sync::Arc;

use super::{worker, SyncState};
use crate::error::{self, Error, ErrorKind};

/// Replace everything under the destination prefix with the tree.
#[tracing::instrument(skip_all, level = "debug", name = "sync-update")]
pub(super) async fn orchestrate(state: Arc<SyncState>) -> Result<(), Error> {
    let ctx = &state.ctx;

    let keys = ctx
        .store
        .list_objects(&ctx.bucket, ctx.prefix.as_deref())
        .await
        .map_err(error::from_kind(ErrorKind::ListFailed))?;
    tracing::debug!("removing {} existing objects", keys.len());

    worker::delete_all(state.clone(), keys)
        .await
        .map_err(error::from_kind(ErrorKind::DeleteFailed))?;

    worker::upload_all(state.clone())
        .await
        .map_err(error::from_kind(ErrorKind::UploadFailed))
}
