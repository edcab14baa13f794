/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::mem;

use aws_sdk_s3::{
    error::SdkError,
    operation::list_objects_v2::{ListObjectsV2Error, ListObjectsV2Output},
};
use aws_smithy_runtime_api::http::Response;

/// Paginator for `ListObjectsV2` that follows continuation tokens until the listing
/// is exhausted.
#[derive(Debug)]
pub(super) struct ListObjectsPaginator<'a> {
    client: &'a aws_sdk_s3::Client,
    bucket: &'a str,
    prefix: Option<&'a str>,
    state: State,
}

#[derive(Debug, PartialEq)]
enum State {
    Paginating { next_token: Option<String> },
    Done,
}

impl State {
    fn next_state(self, output: &ListObjectsV2Output) -> State {
        let is_truncated =
            output.is_truncated().unwrap_or(false) && output.next_continuation_token().is_some();

        match self {
            State::Paginating { .. } if is_truncated => State::Paginating {
                next_token: output.next_continuation_token.to_owned(),
            },
            State::Paginating { .. } | State::Done => State::Done,
        }
    }
}

impl<'a> ListObjectsPaginator<'a> {
    pub(super) fn new(
        client: &'a aws_sdk_s3::Client,
        bucket: &'a str,
        prefix: Option<&'a str>,
    ) -> Self {
        Self {
            client,
            bucket,
            prefix,
            state: State::Paginating { next_token: None },
        }
    }

    pub(super) async fn next_page(
        &mut self,
    ) -> Option<Result<ListObjectsV2Output, SdkError<ListObjectsV2Error, Response>>> {
        let next_token = match &self.state {
            State::Done => return None,
            State::Paginating { next_token } => next_token.clone(),
        };

        let list_result = self
            .client
            .list_objects_v2()
            .bucket(self.bucket)
            .set_prefix(self.prefix.map(str::to_owned))
            .set_continuation_token(next_token)
            .send()
            .await;

        match list_result {
            Ok(output) => {
                let prev_state = mem::replace(&mut self.state, State::Done);
                self.state = prev_state.next_state(&output);
                Some(Ok(output))
            }
            Err(err) => {
                self.state = State::Done;
                Some(Err(err))
            }
        }
    }
}
