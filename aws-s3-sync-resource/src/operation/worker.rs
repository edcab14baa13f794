/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::sync::atomic::Ordering;
use std::sync::Arc;

use async_channel::{Receiver, Sender};
use tokio::task::JoinSet;
use tracing::Instrument;

use super::SyncState;
use crate::error::Error;

#[derive(Debug)]
pub(super) struct UploadObjectJob {
    relative_path: String,
    key: String,
}

/// Upload every file of the local tree, except the upload configuration file.
pub(super) async fn upload_all(state: Arc<SyncState>) -> Result<(), Error> {
    let concurrency = state.ctx.concurrency;

    // spawn all work into the same JoinSet such that when the set is dropped all tasks are cancelled.
    let mut tasks = JoinSet::new();
    let (work_tx, work_rx) = async_channel::bounded(concurrency);

    tasks.spawn(list_directory_contents(state.clone(), work_tx));

    for i in 0..concurrency {
        let worker = upload_objects(state.clone(), work_rx.clone())
            .instrument(tracing::debug_span!("object-uploader", worker = i));
        tasks.spawn(worker);
    }

    join_all(tasks).await
}

/// Delete every key in `keys`.
pub(super) async fn delete_all(state: Arc<SyncState>, keys: Vec<String>) -> Result<(), Error> {
    if keys.is_empty() {
        return Ok(());
    }
    let concurrency = state.ctx.concurrency.min(keys.len());

    let mut tasks = JoinSet::new();
    let (work_tx, work_rx) = async_channel::bounded(concurrency);

    tasks.spawn(async move {
        for key in keys {
            if work_tx.send(key).await.is_err() {
                tracing::debug!("all deleters are gone, no more keys will be sent");
                break;
            }
        }
        Ok(())
    });

    for i in 0..concurrency {
        let worker = delete_objects(state.clone(), work_rx.clone())
            .instrument(tracing::debug_span!("object-deleter", worker = i));
        tasks.spawn(worker);
    }

    join_all(tasks).await
}

/// Wait for all tasks, returning the first error. Remaining tasks are cancelled on error.
async fn join_all(mut tasks: JoinSet<Result<(), Error>>) -> Result<(), Error> {
    while let Some(join_result) = tasks.join_next().await {
        if let Err(err) = join_result? {
            tracing::debug!("cancelling remaining tasks after failure: {err}");
            tasks.abort_all();
            return Err(err);
        }
    }
    Ok(())
}

async fn list_directory_contents(
    state: Arc<SyncState>,
    work_tx: Sender<UploadObjectJob>,
) -> Result<(), Error> {
    let ctx = &state.ctx;
    for relative_path in ctx.files.list_files().await? {
        if relative_path == ctx.upload_config_file {
            tracing::debug!("skipping upload configuration file {relative_path}");
            continue;
        }

        let key = ctx.object_key(&relative_path);
        let job = UploadObjectJob { relative_path, key };
        if work_tx.send(job).await.is_err() {
            tracing::debug!("all uploaders are gone, no more files will be sent");
            break;
        }
    }
    Ok(())
}

async fn upload_objects(
    state: Arc<SyncState>,
    work_rx: Receiver<UploadObjectJob>,
) -> Result<(), Error> {
    let ctx = &state.ctx;
    while let Ok(job) = work_rx.recv().await {
        let body = ctx.files.read_file(&job.relative_path).await?;
        let bytes_transferred = body.len() as u64;
        let params = ctx
            .upload_config
            .as_ref()
            .map(|config| config.params_for_key(&job.relative_path))
            .unwrap_or_default();

        tracing::info!(
            "uploading {} to s3://{}/{}",
            job.relative_path,
            ctx.bucket,
            job.key
        );
        ctx.store
            .put_object(&ctx.bucket, &job.key, body, params)
            .await?;

        state.objects_uploaded.fetch_add(1, Ordering::SeqCst);
        state
            .total_bytes_transferred
            .fetch_add(bytes_transferred, Ordering::SeqCst);
        tracing::debug!("worker finished uploading object {:?}", job.key);
    }

    tracing::trace!("req channel closed, worker finished");
    Ok(())
}

async fn delete_objects(state: Arc<SyncState>, work_rx: Receiver<String>) -> Result<(), Error> {
    let ctx = &state.ctx;
    while let Ok(key) = work_rx.recv().await {
        tracing::debug!("deleting s3://{}/{key}", ctx.bucket);
        ctx.store.delete_object(&ctx.bucket, &key).await?;
        state.objects_deleted.fetch_add(1, Ordering::SeqCst);
    }

    tracing::trace!("req channel closed, worker finished");
    Ok(())
}
