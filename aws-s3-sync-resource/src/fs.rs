/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::fmt;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use bytes::Bytes;
use walkdir::WalkDir;

use crate::error::{self, Error};

/// Read access to the local tree being synced.
///
/// Paths are relative to the root of the tree and always use `/` as separator.
#[async_trait::async_trait]
pub trait FileLister: Send + Sync + fmt::Debug {
    /// All regular files in the tree, recursively, in a stable order.
    async fn list_files(&self) -> Result<Vec<String>, Error>;

    /// The contents of the file at `path`.
    async fn read_file(&self, path: &str) -> Result<Bytes, Error>;

    /// Whether a regular file exists at `path`.
    async fn exists(&self, path: &str) -> bool;
}

/// [`FileLister`] over a directory on the local file system
#[derive(Debug, Clone)]
pub struct LocalFs {
    root: PathBuf,
    follow_symlinks: bool,
}

impl LocalFs {
    /// Create a lister rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            follow_symlinks: false,
        }
    }

    /// Whether to follow symbolic links. Symlinks are skipped otherwise.
    pub fn follow_symlinks(mut self, follow_symlinks: bool) -> Self {
        self.follow_symlinks = follow_symlinks;
        self
    }

    /// The root of the tree
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

#[async_trait::async_trait]
impl FileLister for LocalFs {
    async fn list_files(&self) -> Result<Vec<String>, Error> {
        validate_root_is_dir(&self.root).await?;

        let root = self.root.clone();
        let follow_symlinks = self.follow_symlinks;
        let handle = tokio::task::spawn_blocking(move || walk(&root, follow_symlinks));
        handle.await?
    }

    async fn read_file(&self, path: &str) -> Result<Bytes, Error> {
        let contents = tokio::fs::read(self.resolve(path)).await?;
        Ok(Bytes::from(contents))
    }

    async fn exists(&self, path: &str) -> bool {
        tokio::fs::metadata(self.resolve(path))
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false)
    }
}

async fn validate_root_is_dir(root: &Path) -> Result<(), Error> {
    let meta = tokio::fs::metadata(root).await?;
    if meta.is_dir() {
        Ok(())
    } else {
        Err(Error::new(
            error::ErrorKind::IOError,
            format!("{} is not a directory", root.display()),
        ))
    }
}

fn walk(root: &Path, follow_symlinks: bool) -> Result<Vec<String>, Error> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(follow_symlinks) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry.path().strip_prefix(root).map_err(|_| {
            error::invalid_input(format!(
                "{} is not under {}",
                entry.path().display(),
                root.display()
            ))
        })?;
        let relative = relative.to_str().ok_or_else(|| {
            error::invalid_input(format!("{} is not valid UTF-8", relative.display()))
        })?;
        files.push(normalize_separators(relative));
    }

    files.sort();
    tracing::debug!("found {} files under {}", files.len(), root.display());
    Ok(files)
}

fn normalize_separators(path: &str) -> String {
    if MAIN_SEPARATOR == '/' {
        path.to_owned()
    } else {
        path.replace(MAIN_SEPARATOR, "/")
    }
}
