/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Lambda entry point for the S3 sync custom resource.

use aws_s3_sync_resource::cfn::{CfnResponse, CloudFormationEvent};
use aws_s3_sync_resource::Handler;
use aws_smithy_types::error::display::DisplayErrorContext;
use lambda_runtime::{service_fn, LambdaEvent};
use tracing_subscriber::EnvFilter;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

async fn handle_event(
    handler: &Handler,
    event: LambdaEvent<CloudFormationEvent>,
) -> Result<CfnResponse, BoxError> {
    tracing::debug!("invoked with request id {}", event.context.request_id);
    handler.respond(event.payload).await.map_err(|err| {
        tracing::error!("unable to deliver response: {}", DisplayErrorContext(&err));
        err.into()
    })
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // CloudWatch timestamps every line
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .without_time()
        .init();

    let config = aws_s3_sync_resource::from_env().load().await?;
    tracing::info!("syncing from {}", config.source().display());
    let handler = Handler::new(config);
    let handler = &handler;

    lambda_runtime::run(service_fn(move |event| async move {
        handle_event(handler, event).await
    }))
    .await
}
