/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

/* Automatically managed default lints */
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
/* End of automatically managed default lints */

//! CloudFormation custom resource that keeps an Amazon S3 prefix in sync with a local
//! directory tree.
//!
//! On `Create` the destination prefix must be empty and every local file is uploaded. On
//! `Update` everything under the prefix is deleted and the tree is uploaded again. On
//! `Delete` everything under the prefix is removed.
//!
//! Per-object upload parameters (metadata, content type, content disposition) come from an
//! optional `.s3uploadconfig.json` at the root of the tree, which maps glob patterns to
//! parameters. See [`upload_config::UploadConfig`].
//!
//! # Examples
//!
//! Resolve upload parameters for a key:
//!
//! ```
//! use aws_s3_sync_resource::upload_config::UploadConfig;
//!
//! let config = UploadConfig::parse(r#"{ "*.md": { "contentType": "text/markdown" } }"#).unwrap();
//! let params = config.params_for_key("README.md");
//! assert_eq!(Some("text/markdown"), params.content_type());
//! ```
//!
//! Handle a CloudFormation event:
//!
//! ```no_run
//! # async fn example(
//! #     event: aws_s3_sync_resource::cfn::CloudFormationEvent,
//! # ) -> Result<(), aws_s3_sync_resource::error::Error> {
//! let config = aws_s3_sync_resource::from_env().load().await?;
//! let handler = aws_s3_sync_resource::Handler::new(config);
//! let response = handler.respond(event).await?;
//! println!("{:?}", response.status);
//! # Ok(())
//! # }
//! ```

#![warn(
    missing_debug_implementations,
    missing_docs,
    rustdoc::missing_crate_level_docs,
    unreachable_pub,
    rust_2018_idioms
)]

/// Default number of concurrent object transfers
pub(crate) const DEFAULT_CONCURRENCY: usize = 8;

/// Name of the upload configuration file at the root of the synced tree
pub const S3_UPLOAD_CONFIG_FILE: &str = ".s3uploadconfig.json";

/// Error types emitted by `aws-s3-sync-resource`
pub mod error;

/// Common types used by `aws-s3-sync-resource`
pub mod types;

/// Glob pattern based upload configuration
pub mod upload_config;

/// Sync resource configuration
pub mod config;

/// Local file tree access
pub mod fs;

/// Object store access
pub mod store;

/// Sync operations (create, update, delete)
pub mod operation;

/// CloudFormation custom resource protocol types
pub mod cfn;

/// Custom resource request handler
pub mod handler;

pub use self::config::Config;
pub use self::handler::Handler;
use self::config::loader::ConfigLoader;

/// Create a config loader
pub fn from_env() -> ConfigLoader {
    ConfigLoader::default()
}
