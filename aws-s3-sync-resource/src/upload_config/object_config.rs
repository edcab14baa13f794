/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::collections::HashMap;

use serde_json::Value;

use crate::types::UploadParams;

const METADATA: &str = "metadata";
const CONTENT_TYPE: &str = "contentType";
const CONTENT_DISPOSITION: &str = "contentDisposition";

/// Upload parameters declared for a single pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ObjectConfig {
    metadata: Option<HashMap<String, String>>,
    content_type: Option<String>,
    content_disposition: Option<String>,
}

impl ObjectConfig {
    /// Pick the recognised fields out of a pattern's JSON value.
    ///
    /// Unknown keys, `null`s and values of the wrong JSON type contribute nothing.
    pub(crate) fn from_value(value: &Value) -> Self {
        let Some(fields) = value.as_object() else {
            return ObjectConfig::default();
        };

        let metadata = fields.get(METADATA).and_then(Value::as_object).map(|entries| {
            entries
                .iter()
                .filter_map(|(key, value)| value.as_str().map(|v| (key.to_owned(), v.to_owned())))
                .collect()
        });

        ObjectConfig {
            metadata,
            content_type: string_field(fields, CONTENT_TYPE),
            content_disposition: string_field(fields, CONTENT_DISPOSITION),
        }
    }

    /// Merge the parameters of a later declared pattern into `self`.
    ///
    /// `metadata` is merged key by key and `later` wins when both define the same key.
    /// `content_type` and `content_disposition` are replaced whole whenever `later` sets
    /// them. Fields `later` leaves unset are kept as they are.
    pub(crate) fn merge(&mut self, later: &ObjectConfig) {
        if let Some(metadata) = &later.metadata {
            let merged = self.metadata.get_or_insert_with(HashMap::new);
            for (key, value) in metadata {
                merged.insert(key.clone(), value.clone());
            }
        }
        if let Some(content_type) = &later.content_type {
            self.content_type = Some(content_type.clone());
        }
        if let Some(content_disposition) = &later.content_disposition {
            self.content_disposition = Some(content_disposition.clone());
        }
    }

    /// Empty scalar values are dropped: an empty string resets the field to the S3 default.
    pub(crate) fn into_params(self) -> UploadParams {
        UploadParams {
            metadata: self.metadata,
            content_type: self.content_type.filter(|v| !v.is_empty()),
            content_disposition: self.content_disposition.filter(|v| !v.is_empty()),
        }
    }
}

fn string_field(fields: &serde_json::Map<String, Value>, name: &str) -> Option<String> {
    fields.get(name).and_then(Value::as_str).map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::ObjectConfig;

    #[test]
    fn test_from_value_ignores_unknown_and_mistyped_fields() {
        let config = ObjectConfig::from_value(&json!({
            "metadata": { "key": "value", "count": 3 },
            "contentType": {},
            "contentDisposition": null,
            "cacheControl": "max-age=600",
        }));

        let params = config.into_params();
        assert_eq!(1, params.metadata().unwrap().len());
        assert_eq!("value", params.metadata().unwrap()["key"]);
        assert_eq!(None, params.content_type());
        assert_eq!(None, params.content_disposition());
    }

    #[test]
    fn test_from_value_non_object() {
        assert_eq!(ObjectConfig::default(), ObjectConfig::from_value(&json!("text/plain")));
        assert_eq!(ObjectConfig::default(), ObjectConfig::from_value(&json!(null)));
        assert_eq!(ObjectConfig::default(), ObjectConfig::from_value(&json!([1, 2])));
    }

    #[test]
    fn test_merge_metadata_is_key_wise() {
        let mut acc = ObjectConfig::from_value(&json!({
            "metadata": { "a": "1", "b": "1" },
            "contentType": "text/plain",
        }));
        acc.merge(&ObjectConfig::from_value(&json!({
            "metadata": { "b": "2", "c": "2" },
        })));

        let params = acc.into_params();
        let metadata = params.metadata().unwrap();
        assert_eq!(3, metadata.len());
        assert_eq!("1", metadata["a"]);
        assert_eq!("2", metadata["b"]);
        assert_eq!("2", metadata["c"]);
        assert_eq!(Some("text/plain"), params.content_type());
    }

    #[test]
    fn test_merge_scalars_last_wins() {
        let mut acc = ObjectConfig::from_value(&json!({
            "contentType": "text/plain",
            "contentDisposition": "inline",
        }));
        acc.merge(&ObjectConfig::from_value(&json!({
            "contentType": "text/markdown",
            "contentDisposition": null,
        })));

        let params = acc.into_params();
        assert_eq!(Some("text/markdown"), params.content_type());
        assert_eq!(Some("inline"), params.content_disposition());
    }

    #[test]
    fn test_empty_scalar_resets_field() {
        let mut acc = ObjectConfig::from_value(&json!({ "contentType": "text/plain" }));
        acc.merge(&ObjectConfig::from_value(&json!({ "contentType": "" })));
        assert!(acc.into_params().is_empty());
    }

    #[test]
    fn test_empty_metadata_is_kept() {
        let params = ObjectConfig::from_value(&json!({ "metadata": {} })).into_params();
        assert!(params.metadata().unwrap().is_empty());
        assert!(!params.is_empty());
    }
}
