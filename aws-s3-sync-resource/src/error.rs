/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::fmt;

/// A boxed error that is `Send` and `Sync`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

use aws_sdk_s3::error::ProvideErrorMetadata;

/// Errors returned by this library
///
/// NOTE: Use [`aws_smithy_types::error::display::DisplayErrorContext`] or similar to display
/// the entire error cause/source chain.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    source: BoxError,
}

/// General categories of sync errors.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Request input validation issues
    InputInvalid,

    /// The upload configuration could not be parsed
    ConfigInvalid,

    /// I/O errors
    IOError,

    /// Some kind of internal runtime issue (e.g. task failure, poisoned mutex, etc)
    RuntimeError,

    /// Resource not found (e.g. bucket)
    NotFound,

    /// The destination prefix already contains objects
    BucketNotEmpty,

    /// Listing the objects under the destination prefix failed
    ListFailed,

    /// Deleting an object failed
    DeleteFailed,

    /// Uploading a file failed
    UploadFailed,

    /// Sending the CloudFormation response failed
    ResponseFailed,
}

impl Error {
    /// Creates a new sync [`Error`] from a known kind of error as well as an arbitrary error
    /// source.
    pub fn new<E>(kind: ErrorKind, err: E) -> Error
    where
        E: Into<BoxError>,
    {
        Error {
            kind,
            source: err.into(),
        }
    }

    /// Returns the corresponding [`ErrorKind`] for this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Re-categorize this error, keeping its source.
    pub(crate) fn with_kind(self, kind: ErrorKind) -> Error {
        Error {
            kind,
            source: self.source,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::InputInvalid => write!(f, "invalid input"),
            // config errors are transparent over their cause
            ErrorKind::ConfigInvalid => write!(f, "{}", self.source),
            ErrorKind::IOError => write!(f, "I/O error"),
            ErrorKind::RuntimeError => write!(f, "runtime error"),
            ErrorKind::NotFound => write!(f, "resource not found"),
            ErrorKind::BucketNotEmpty => write!(f, "bucket must be empty"),
            ErrorKind::ListFailed => write!(f, "failed to list objects"),
            ErrorKind::DeleteFailed => write!(f, "failed to delete object"),
            ErrorKind::UploadFailed => write!(f, "failed to upload object"),
            ErrorKind::ResponseFailed => write!(f, "failed to send CloudFormation response"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ErrorKind::ConfigInvalid => self.source.source(),
            _ => Some(self.source.as_ref()),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::new(ErrorKind::IOError, value)
    }
}

impl From<walkdir::Error> for Error {
    fn from(value: walkdir::Error) -> Self {
        Self::new(ErrorKind::IOError, value)
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(value: tokio::task::JoinError) -> Self {
        Self::new(ErrorKind::RuntimeError, value)
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        Self::new(ErrorKind::ResponseFailed, value)
    }
}

impl<E, R> From<aws_sdk_s3::error::SdkError<E, R>> for Error
where
    E: std::error::Error + ProvideErrorMetadata + Send + Sync + 'static,
    R: Send + Sync + fmt::Debug + 'static,
{
    fn from(value: aws_sdk_s3::error::SdkError<E, R>) -> Self {
        let kind = match value.code() {
            Some("NotFound" | "NoSuchKey" | "NoSuchBucket") => ErrorKind::NotFound,
            _ => ErrorKind::RuntimeError,
        };

        Error::new(kind, value)
    }
}

pub(crate) fn invalid_input<E>(err: E) -> Error
where
    E: Into<BoxError>,
{
    Error::new(ErrorKind::InputInvalid, err)
}

pub(crate) fn invalid_config<E>(err: E) -> Error
where
    E: Into<BoxError>,
{
    Error::new(ErrorKind::ConfigInvalid, err)
}

pub(crate) fn bucket_not_empty(bucket: &str, prefix: Option<&str>) -> Error {
    Error::new(
        ErrorKind::BucketNotEmpty,
        format!(
            "s3://{bucket}/{} already contains objects",
            prefix.unwrap_or_default()
        ),
    )
}

pub(crate) fn from_kind<E>(kind: ErrorKind) -> impl FnOnce(E) -> Error
where
    E: Into<Error>,
{
    |err| {
        let err: Error = err.into();
        err.with_kind(kind)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::{invalid_config, Error, ErrorKind};

    #[test]
    fn test_config_errors_are_transparent() {
        let err = invalid_config("Invalid config: []");
        assert_eq!("Invalid config: []", err.to_string());
        assert!(err.source().is_none());
    }

    #[test]
    fn test_from_kind_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let err = super::from_kind::<std::io::Error>(ErrorKind::UploadFailed)(io);
        assert_eq!(&ErrorKind::UploadFailed, err.kind());
        assert_eq!("disk on fire", err.source().unwrap().to_string());
    }

    #[test]
    fn test_display_kind() {
        let err = Error::new(ErrorKind::BucketNotEmpty, "x");
        assert_eq!("bucket must be empty", err.to_string());
    }
}
