/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::sync::atomic::Ordering;

use super::SyncState;

/// Summary of a completed sync operation
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncOutput {
    /// Number of objects uploaded
    pub objects_uploaded: u64,

    /// Number of objects deleted
    pub objects_deleted: u64,

    /// Total number of bytes uploaded
    pub total_bytes_transferred: u64,
}

impl SyncOutput {
    /// Number of objects uploaded
    pub fn objects_uploaded(&self) -> u64 {
        self.objects_uploaded
    }

    /// Number of objects deleted
    pub fn objects_deleted(&self) -> u64 {
        self.objects_deleted
    }

    /// Total number of bytes uploaded
    pub fn total_bytes_transferred(&self) -> u64 {
        self.total_bytes_transferred
    }
}

impl From<&SyncState> for SyncOutput {
    fn from(state: &SyncState) -> Self {
        SyncOutput {
            objects_uploaded: state.objects_uploaded.load(Ordering::SeqCst),
            objects_deleted: state.objects_deleted.load(Ordering::SeqCst),
            total_bytes_transferred: state.total_bytes_transferred.load(Ordering::SeqCst),
        }
    }
}
