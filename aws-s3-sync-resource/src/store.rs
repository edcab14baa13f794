/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::fmt;

use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;

use crate::error::Error;
use crate::types::UploadParams;

mod list_objects;
use list_objects::ListObjectsPaginator;

/// The object store operations a sync needs.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync + fmt::Debug {
    /// Every key under `prefix` (all keys in the bucket when `prefix` is `None`).
    async fn list_objects(&self, bucket: &str, prefix: Option<&str>) -> Result<Vec<String>, Error>;

    /// Whether no object exists under `prefix`.
    async fn is_empty(&self, bucket: &str, prefix: Option<&str>) -> Result<bool, Error>;

    /// Delete a single object.
    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), Error>;

    /// Store `body` at `key` with the given parameters.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        params: UploadParams,
    ) -> Result<(), Error>;
}

/// [`ObjectStore`] backed by Amazon S3
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    /// Create a store that sends requests with `client`
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl ObjectStore for S3ObjectStore {
    async fn list_objects(&self, bucket: &str, prefix: Option<&str>) -> Result<Vec<String>, Error> {
        let mut paginator = ListObjectsPaginator::new(&self.client, bucket, prefix);
        let mut keys = Vec::new();
        while let Some(page) = paginator.next_page().await {
            let page = page?;
            keys.extend(page.contents().iter().filter_map(|obj| obj.key.clone()));
        }
        tracing::debug!("listed {} objects in s3://{bucket}/{}", keys.len(), prefix.unwrap_or_default());
        Ok(keys)
    }

    async fn is_empty(&self, bucket: &str, prefix: Option<&str>) -> Result<bool, Error> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .set_prefix(prefix.map(str::to_owned))
            .max_keys(1)
            .send()
            .await?;

        Ok(output.key_count().unwrap_or_default() == 0 && output.contents().is_empty())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), Error> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await?;
        Ok(())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        params: UploadParams,
    ) -> Result<(), Error> {
        let req = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body));

        params.apply_to_put_object(req).send().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use aws_sdk_s3::operation::{
        delete_object::{DeleteObjectError, DeleteObjectOutput},
        list_objects_v2::ListObjectsV2Output,
        put_object::PutObjectOutput,
    };
    use aws_sdk_s3::types::Object;
    use aws_smithy_mocks_experimental::{mock, mock_client, RuleMode};
    use aws_smithy_types::error::ErrorMetadata;
    use bytes::Bytes;

    use crate::error::ErrorKind;
    use crate::types::UploadParams;

    use super::{ObjectStore, S3ObjectStore};

    fn page(keys: &[&str], next_token: Option<&str>) -> ListObjectsV2Output {
        let contents = keys.iter().map(|k| Object::builder().key(*k).build()).collect();
        ListObjectsV2Output::builder()
            .set_contents(Some(contents))
            .key_count(keys.len() as i32)
            .is_truncated(next_token.is_some())
            .set_next_continuation_token(next_token.map(str::to_owned))
            .build()
    }

    #[tokio::test]
    async fn test_list_objects_follows_continuation_tokens() {
        let first = mock!(aws_sdk_s3::Client::list_objects_v2)
            .match_requests(|r| {
                r.bucket() == Some("test-bucket")
                    && r.prefix() == Some("site/")
                    && r.continuation_token().is_none()
            })
            .then_output(|| page(&["site/a", "site/b"], Some("token-1")));
        let second = mock!(aws_sdk_s3::Client::list_objects_v2)
            .match_requests(|r| r.continuation_token() == Some("token-1"))
            .then_output(|| page(&["site/c"], None));

        let client = mock_client!(aws_sdk_s3, RuleMode::Sequential, &[&first, &second]);
        let store = S3ObjectStore::new(client);

        let keys = store.list_objects("test-bucket", Some("site/")).await.unwrap();
        assert_eq!(vec!["site/a", "site/b", "site/c"], keys);
    }

    #[tokio::test]
    async fn test_is_empty() {
        let empty = mock!(aws_sdk_s3::Client::list_objects_v2)
            .match_requests(|r| r.max_keys() == Some(1))
            .then_output(|| page(&[], None));
        let not_empty = mock!(aws_sdk_s3::Client::list_objects_v2)
            .match_requests(|r| r.max_keys() == Some(1))
            .then_output(|| page(&["key"], Some("more")));

        let client = mock_client!(aws_sdk_s3, RuleMode::Sequential, &[&empty, &not_empty]);
        let store = S3ObjectStore::new(client);

        assert!(store.is_empty("test-bucket", None).await.unwrap());
        assert!(!store.is_empty("test-bucket", None).await.unwrap());
    }

    #[tokio::test]
    async fn test_put_object_applies_params() {
        let put_object = mock!(aws_sdk_s3::Client::put_object)
            .match_requests(|r| {
                r.key() == Some("site/index.html")
                    && r.content_type() == Some("text/html")
                    && r.content_disposition().is_none()
                    && r.metadata().and_then(|m| m.get("team")).map(String::as_str) == Some("web")
            })
            .then_output(|| PutObjectOutput::builder().build());

        let client = mock_client!(aws_sdk_s3, RuleMode::Sequential, &[&put_object]);
        let store = S3ObjectStore::new(client);

        let params = UploadParams {
            metadata: Some(HashMap::from([("team".to_owned(), "web".to_owned())])),
            content_type: Some("text/html".to_owned()),
            content_disposition: None,
        };
        store
            .put_object("test-bucket", "site/index.html", Bytes::from_static(b"<html/>"), params)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_object_error() {
        let delete_ok = mock!(aws_sdk_s3::Client::delete_object)
            .match_requests(|r| r.key() == Some("ok"))
            .then_output(|| DeleteObjectOutput::builder().build());
        let delete_denied = mock!(aws_sdk_s3::Client::delete_object)
            .match_requests(|r| r.key() == Some("denied"))
            .then_error(|| {
                DeleteObjectError::generic(ErrorMetadata::builder().code("AccessDenied").build())
            });

        let client = mock_client!(aws_sdk_s3, RuleMode::MatchAny, &[&delete_ok, &delete_denied]);
        let store = S3ObjectStore::new(client);

        store.delete_object("test-bucket", "ok").await.unwrap();
        let err = store.delete_object("test-bucket", "denied").await.unwrap_err();
        assert_eq!(&ErrorKind::RuntimeError, err.kind());
    }
}
