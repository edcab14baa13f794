/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::sync::Arc;

use aws_s3_sync_resource::error::ErrorKind;
use aws_s3_sync_resource::fs::LocalFs;
use aws_s3_sync_resource::operation::{RequestType, SyncContext, SyncContextBuilder};
use aws_s3_sync_resource::upload_config::UploadConfig;
use aws_smithy_runtime::test_util::capture_test_logs::capture_test_logs;
use test_common::{create_test_dir, FailOn, InMemoryStore};

const BUCKET: &str = "site-bucket";
const UPLOAD_CONFIG: &str = r#"{
    "*.html": { "contentType": "text/html", "metadata": { "cache": "short" } },
    "assets/**": { "metadata": { "cache": "long" } },
    "assets/*.css": { "contentType": "text/css" }
}"#;

fn site() -> tempfile::TempDir {
    create_test_dir(&[
        ("index.html", "<html>home</html>"),
        ("about.html", "<html>about</html>"),
        ("assets/site.css", "body {}"),
        ("assets/img/logo.svg", "<svg/>"),
        (".well-known/security.txt", "contact: security@example.com"),
        (".s3uploadconfig.json", UPLOAD_CONFIG),
    ])
}

fn context(dir: &tempfile::TempDir, store: &Arc<InMemoryStore>) -> SyncContextBuilder {
    SyncContext::builder()
        .bucket(BUCKET)
        .files(Arc::new(LocalFs::new(dir.path())))
        .store(store.clone())
        .upload_config(Arc::new(UploadConfig::parse(UPLOAD_CONFIG).unwrap()))
        .concurrency(2)
}

#[tokio::test]
async fn test_create_uploads_every_file_but_the_config() {
    let (_guard, rx) = capture_test_logs();
    let dir = site();
    let store = Arc::new(InMemoryStore::new(BUCKET));

    let ctx = context(&dir, &store).prefix("www/").build().unwrap();
    let output = RequestType::Create.orchestrate(ctx).await.unwrap();

    assert_eq!(5, output.objects_uploaded());
    assert_eq!(0, output.objects_deleted());
    assert_eq!(
        vec![
            "www/.well-known/security.txt",
            "www/about.html",
            "www/assets/img/logo.svg",
            "www/assets/site.css",
            "www/index.html",
        ],
        store.keys()
    );

    let index = store.get("www/index.html").unwrap();
    assert_eq!(&b"<html>home</html>"[..], &index.body[..]);
    assert_eq!(Some("text/html"), index.params.content_type());
    assert_eq!("short", index.params.metadata().unwrap()["cache"]);

    let css = store.get("www/assets/site.css").unwrap();
    assert_eq!(Some("text/css"), css.params.content_type());
    assert_eq!("long", css.params.metadata().unwrap()["cache"]);

    let logo = store.get("www/assets/img/logo.svg").unwrap();
    assert_eq!(None, logo.params.content_type());
    assert_eq!("long", logo.params.metadata().unwrap()["cache"]);

    let security = store.get("www/.well-known/security.txt").unwrap();
    assert!(security.params.is_empty());

    let total: u64 = [
        "<html>home</html>",
        "<html>about</html>",
        "body {}",
        "<svg/>",
        "contact: security@example.com",
    ]
    .iter()
    .map(|s| s.len() as u64)
    .sum();
    assert_eq!(total, output.total_bytes_transferred());

    assert!(rx.contents().contains("uploading index.html to s3://site-bucket/www/index.html"));
}

#[tokio::test]
async fn test_create_prefix_is_concatenated_verbatim() {
    let dir = create_test_dir(&[("index.html", "x")]);
    let store = Arc::new(InMemoryStore::new(BUCKET));

    let ctx = context(&dir, &store).prefix("v2").build().unwrap();
    RequestType::Create.orchestrate(ctx).await.unwrap();

    assert_eq!(vec!["v2index.html"], store.keys());
}

#[tokio::test]
async fn test_create_without_upload_config_uses_defaults() {
    let dir = site();
    let store = Arc::new(InMemoryStore::new(BUCKET));

    let ctx = context(&dir, &store)
        .set_upload_config(None)
        .build()
        .unwrap();
    RequestType::Create.orchestrate(ctx).await.unwrap();

    assert_eq!(5, store.keys().len());
    assert!(store.keys().iter().all(|k| store.get(k).unwrap().params.is_empty()));
    assert!(store.get(".s3uploadconfig.json").is_none());
}

#[tokio::test]
async fn test_create_requires_empty_prefix() {
    let dir = site();
    let store = Arc::new(InMemoryStore::new(BUCKET).with_objects(&["www/old.html"]));

    let ctx = context(&dir, &store).prefix("www/").build().unwrap();
    let err = RequestType::Create.orchestrate(ctx).await.unwrap_err();

    assert_eq!(&ErrorKind::BucketNotEmpty, err.kind());
    assert_eq!(vec!["www/old.html"], store.keys());
}

#[tokio::test]
async fn test_create_ignores_objects_outside_prefix() {
    let dir = create_test_dir(&[("index.html", "x")]);
    let store = Arc::new(InMemoryStore::new(BUCKET).with_objects(&["other/index.html"]));

    let ctx = context(&dir, &store).prefix("www/").build().unwrap();
    RequestType::Create.orchestrate(ctx).await.unwrap();

    assert_eq!(vec!["other/index.html", "www/index.html"], store.keys());
}

#[tokio::test]
async fn test_create_list_failure() {
    let dir = site();
    let store = Arc::new(InMemoryStore::new(BUCKET).fail_on(FailOn::List));

    let ctx = context(&dir, &store).build().unwrap();
    let err = RequestType::Create.orchestrate(ctx).await.unwrap_err();

    assert_eq!(&ErrorKind::ListFailed, err.kind());
    assert!(store.keys().is_empty());
}

#[tokio::test]
async fn test_create_upload_failure() {
    let dir = site();
    let store =
        Arc::new(InMemoryStore::new(BUCKET).fail_on(FailOn::Put("assets/site.css".to_owned())));

    let ctx = context(&dir, &store).build().unwrap();
    let err = RequestType::Create.orchestrate(ctx).await.unwrap_err();

    assert_eq!(&ErrorKind::UploadFailed, err.kind());
    assert!(store.get("assets/site.css").is_none());
}

#[tokio::test]
async fn test_create_missing_source_directory() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(InMemoryStore::new(BUCKET));

    let ctx = SyncContext::builder()
        .bucket(BUCKET)
        .files(Arc::new(LocalFs::new(dir.path().join("missing"))))
        .store(store.clone())
        .build()
        .unwrap();
    let err = RequestType::Create.orchestrate(ctx).await.unwrap_err();

    assert_eq!(&ErrorKind::UploadFailed, err.kind());
}

#[tokio::test]
async fn test_update_replaces_prefix_contents() {
    let dir = site();
    let store = Arc::new(
        InMemoryStore::new(BUCKET).with_objects(&["www/stale.html", "www/index.html", "keep.txt"]),
    );

    let ctx = context(&dir, &store).prefix("www/").build().unwrap();
    let output = RequestType::Update.orchestrate(ctx).await.unwrap();

    assert_eq!(2, output.objects_deleted());
    assert_eq!(5, output.objects_uploaded());

    let mut deleted = store.deleted();
    deleted.sort();
    assert_eq!(vec!["www/index.html", "www/stale.html"], deleted);

    let keys = store.keys();
    assert!(keys.contains(&"keep.txt".to_owned()));
    assert!(!keys.contains(&"www/stale.html".to_owned()));
    assert!(!keys.contains(&"www/.s3uploadconfig.json".to_owned()));

    // the re-uploaded object carries the configured parameters
    let index = store.get("www/index.html").unwrap();
    assert_eq!(Some("text/html"), index.params.content_type());
}

#[tokio::test]
async fn test_update_delete_failure_stops_before_upload() {
    let dir = site();
    let store = Arc::new(
        InMemoryStore::new(BUCKET)
            .with_objects(&["www/stale.html"])
            .fail_on(FailOn::Delete("www/stale.html".to_owned())),
    );

    let ctx = context(&dir, &store).prefix("www/").build().unwrap();
    let err = RequestType::Update.orchestrate(ctx).await.unwrap_err();

    assert_eq!(&ErrorKind::DeleteFailed, err.kind());
    assert_eq!(vec!["www/stale.html"], store.keys());
}

#[tokio::test]
async fn test_delete_removes_everything_under_prefix() {
    let dir = site();
    let keys: Vec<String> = (0..25).map(|i| format!("www/page-{i}.html")).collect();
    let key_refs: Vec<&str> = keys.iter().map(String::as_str).collect();
    let store = Arc::new(
        InMemoryStore::new(BUCKET)
            .with_objects(&key_refs)
            .with_objects(&["elsewhere/keep.html"]),
    );

    let ctx = context(&dir, &store).prefix("www/").build().unwrap();
    let output = RequestType::Delete.orchestrate(ctx).await.unwrap();

    assert_eq!(25, output.objects_deleted());
    assert_eq!(0, output.objects_uploaded());
    assert_eq!(vec!["elsewhere/keep.html"], store.keys());
}

#[tokio::test]
async fn test_delete_empty_prefix_is_a_no_op() {
    let dir = site();
    let store = Arc::new(InMemoryStore::new(BUCKET));

    let ctx = context(&dir, &store).prefix("www/").build().unwrap();
    let output = RequestType::Delete.orchestrate(ctx).await.unwrap();

    assert_eq!(0, output.objects_deleted());
    assert!(store.keys().is_empty());
}

#[tokio::test]
async fn test_delete_list_failure() {
    let dir = site();
    let store = Arc::new(InMemoryStore::new(BUCKET).fail_on(FailOn::List));

    let ctx = context(&dir, &store).build().unwrap();
    let err = RequestType::Delete.orchestrate(ctx).await.unwrap_err();
    assert_eq!(&ErrorKind::ListFailed, err.kind());
}

#[test]
fn test_context_requires_bucket() {
    let dir = site();
    let store = Arc::new(InMemoryStore::new(BUCKET));

    let err = SyncContext::builder()
        .bucket("")
        .files(Arc::new(LocalFs::new(dir.path())))
        .store(store)
        .build()
        .unwrap_err();
    assert_eq!(&ErrorKind::InputInvalid, err.kind());
}
