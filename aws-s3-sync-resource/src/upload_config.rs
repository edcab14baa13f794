/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::str::FromStr;

use serde_json::Value;

use crate::error::{self, Error};
use crate::types::UploadParams;

mod object_config;
mod pattern;

use object_config::ObjectConfig;
use pattern::KeyPattern;

#[derive(Debug, Clone)]
struct PatternRule {
    pattern: KeyPattern,
    config: ObjectConfig,
}

/// Parsed upload configuration.
///
/// The configuration is a JSON object mapping glob patterns to the `PutObject` parameters
/// that apply to every key matching the pattern:
///
/// ```json
/// {
///     "*.txt": {
///         "metadata": { "my-key": "value" },
///         "contentType": "text/plain"
///     },
///     "src/**/*.png": {
///         "contentType": "image/png",
///         "contentDisposition": "attachment; filename=\"download.png\""
///     }
/// }
/// ```
///
/// Patterns are kept in declaration order. When several patterns match the same key their
/// parameters are merged in that order: metadata entries accumulate (a later pattern wins
/// for the same metadata key) and `contentType`/`contentDisposition` from the last
/// matching pattern that sets them win. Pattern specificity plays no role.
///
/// An `UploadConfig` is immutable once parsed and can be shared freely between tasks.
#[derive(Debug, Clone, Default)]
pub struct UploadConfig {
    rules: Vec<PatternRule>,
}

impl UploadConfig {
    /// Parse the contents of an upload configuration file.
    ///
    /// Fails with the JSON parser's diagnostic when `contents` is not valid JSON, and with
    /// `Invalid config: <contents>` when it is valid JSON but not an object.
    pub fn parse(contents: &str) -> Result<UploadConfig, Error> {
        let value: Value = serde_json::from_str(contents).map_err(error::invalid_config)?;

        let Value::Object(entries) = value else {
            return Err(error::invalid_config(format!("Invalid config: {contents}")));
        };

        let rules = entries
            .iter()
            .map(|(glob, config)| PatternRule {
                pattern: KeyPattern::new(glob),
                config: ObjectConfig::from_value(config),
            })
            .collect();

        Ok(UploadConfig { rules })
    }

    /// Number of patterns in the configuration
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True when the configuration declares no patterns
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Resolve the upload parameters for `key`.
    ///
    /// Keys no pattern matches resolve to empty parameters.
    pub fn params_for_key(&self, key: &str) -> UploadParams {
        self.rules
            .iter()
            .filter(|rule| rule.pattern.matches(key))
            .fold(ObjectConfig::default(), |mut merged, rule| {
                merged.merge(&rule.config);
                merged
            })
            .into_params()
    }
}

impl FromStr for UploadConfig {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UploadConfig::parse(s)
    }
}
