/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::sync::Mutex;

use aws_s3_sync_resource::error::{Error, ErrorKind};
use aws_s3_sync_resource::store::ObjectStore;
use aws_s3_sync_resource::types::UploadParams;
use bytes::Bytes;
use tempfile::{tempdir, TempDir};

/// Create a directory structure containing `files`, given as (relative path, contents)
/// pairs. Parent directories are created as needed.
pub fn create_test_dir(files: &[(&str, &str)]) -> TempDir {
    let temp_dir = tempdir().unwrap();

    for (path, contents) in files {
        let full_path = temp_dir.path().join(path);
        let parent = full_path.parent().unwrap();

        // Create the parent directories if they don't exist
        fs::create_dir_all(parent).unwrap();
        fs::write(&full_path, contents).unwrap();
    }

    temp_dir
}

/// An object stored in an [`InMemoryStore`]
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub body: Bytes,
    pub params: UploadParams,
}

/// Which request an [`InMemoryStore`] should fail
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FailOn {
    /// Every listing, including emptiness checks
    List,
    /// Deleting this key
    Delete(String),
    /// Uploading this key
    Put(String),
}

/// [`ObjectStore`] keeping a single bucket in memory
#[derive(Debug)]
pub struct InMemoryStore {
    bucket: String,
    objects: Mutex<BTreeMap<String, StoredObject>>,
    failures: Mutex<HashSet<FailOn>>,
    deleted: Mutex<Vec<String>>,
}

impl InMemoryStore {
    pub fn new(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_owned(),
            objects: Mutex::default(),
            failures: Mutex::default(),
            deleted: Mutex::default(),
        }
    }

    /// Seed the bucket with objects that have default parameters
    pub fn with_objects(self, keys: &[&str]) -> Self {
        {
            let mut objects = self.objects.lock().unwrap();
            for key in keys {
                objects.insert(
                    key.to_string(),
                    StoredObject {
                        body: Bytes::from_static(b"existing"),
                        params: UploadParams::default(),
                    },
                );
            }
        }
        self
    }

    pub fn fail_on(self, failure: FailOn) -> Self {
        self.failures.lock().unwrap().insert(failure);
        self
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    pub fn get(&self, key: &str) -> Option<StoredObject> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    /// Keys deleted so far, in the order they were deleted
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    fn check(&self, bucket: &str, failure: FailOn) -> Result<(), Error> {
        if bucket != self.bucket {
            return Err(Error::new(
                ErrorKind::NotFound,
                format!("NoSuchBucket: {bucket}"),
            ));
        }
        if self.failures.lock().unwrap().contains(&failure) {
            return Err(Error::new(
                ErrorKind::RuntimeError,
                format!("AccessDenied: {failure:?}"),
            ));
        }
        Ok(())
    }

    fn keys_under(&self, prefix: Option<&str>) -> Vec<String> {
        let prefix = prefix.unwrap_or_default();
        self.objects
            .lock()
            .unwrap()
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect()
    }
}

#[async_trait::async_trait]
impl ObjectStore for InMemoryStore {
    async fn list_objects(&self, bucket: &str, prefix: Option<&str>) -> Result<Vec<String>, Error> {
        self.check(bucket, FailOn::List)?;
        Ok(self.keys_under(prefix))
    }

    async fn is_empty(&self, bucket: &str, prefix: Option<&str>) -> Result<bool, Error> {
        self.check(bucket, FailOn::List)?;
        Ok(self.keys_under(prefix).is_empty())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), Error> {
        self.check(bucket, FailOn::Delete(key.to_owned()))?;
        self.objects.lock().unwrap().remove(key);
        self.deleted.lock().unwrap().push(key.to_owned());
        Ok(())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        params: UploadParams,
    ) -> Result<(), Error> {
        self.check(bucket, FailOn::Put(key.to_owned()))?;
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_owned(), StoredObject { body, params });
        Ok(())
    }
}
