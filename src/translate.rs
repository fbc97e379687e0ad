// This file is part of the terraform-provider-azurerm project
//
// Copyright (C) ANEO, 2024-2024. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License")
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Shared pieces of the expand (state -> API model) and flatten
//! (API model -> state) conversions.

use base64::Engine;
use thiserror::Error;
use tf_provider::value::Value;
use tf_provider::AttributePath;

use crate::utils::DisplayJoinable;

#[derive(Debug, Error, Clone)]
pub enum TranslateError {
    /// No member of a closed variant group is set.
    #[error("{block} must contain at least one type of {kind}: {candidates}")]
    MissingVariant {
        block: &'static str,
        kind: &'static str,
        candidates: String,
        path: AttributePath,
    },

    /// Several members of a closed variant group are set.
    #[error("more than one type of {kind} in the same {block} is not allowed: {set}")]
    ConflictingVariants {
        block: &'static str,
        kind: &'static str,
        set: String,
        path: AttributePath,
    },

    /// A field could not be decoded into the representation the API expects.
    #[error("decoding `{field}`: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
        path: AttributePath,
    },

    /// The API returned a variant this provider cannot represent.
    #[error("converting {from} to {to}")]
    UnsupportedVariant { from: &'static str, to: &'static str },
}

impl TranslateError {
    /// Attribute the error should be reported on.
    pub fn path(&self) -> AttributePath {
        match self {
            TranslateError::MissingVariant { path, .. }
            | TranslateError::ConflictingVariants { path, .. }
            | TranslateError::InvalidField { path, .. } => path.clone(),
            TranslateError::UnsupportedVariant { .. } => AttributePath::default(),
        }
    }
}

/// One member of a variant group: its attribute name and whether it is set.
pub(crate) type Candidate = (&'static str, bool);

/// A variant group member whose value may still be unknown (`None`).
pub(crate) type Member = (&'static str, Option<bool>);

/// Whether `value` counts as set; `None` while it is unknown.
pub(crate) fn is_set<T>(value: &Value<T>, set: impl FnOnce(&T) -> bool) -> Option<bool> {
    match value {
        Value::Value(value) => Some(set(value)),
        Value::Null => Some(false),
        Value::Unknown => None,
    }
}

/// Candidates of a group whose members are all known.
pub(crate) fn known(members: &[Member]) -> Option<Vec<Candidate>> {
    members
        .iter()
        .map(|(name, set)| set.map(|set| (*name, set)))
        .collect()
}

/// Candidates of a group, unknown members counting as unset.
pub(crate) fn assume_known(members: &[Member]) -> Vec<Candidate> {
    members
        .iter()
        .map(|(name, set)| (*name, set.unwrap_or(false)))
        .collect()
}

/// Return the name of the only set candidate of a closed variant group.
///
/// `required` makes an empty group an error; otherwise `Ok(None)` is returned.
pub(crate) fn single_variant(
    block: &'static str,
    kind: &'static str,
    candidates: &[Candidate],
    required: bool,
    path: &AttributePath,
) -> Result<Option<&'static str>, TranslateError> {
    let set: Vec<&'static str> = candidates
        .iter()
        .filter_map(|(name, is_set)| is_set.then_some(*name))
        .collect();

    match set.as_slice() {
        [] if required => Err(TranslateError::MissingVariant {
            block,
            kind,
            candidates: candidates.iter().map(|(name, _)| name).join_with(", ").to_string(),
            path: path.clone(),
        }),
        [] => Ok(None),
        [name] => Ok(Some(*name)),
        _ => Err(TranslateError::ConflictingVariants {
            block,
            kind,
            set: set.iter().join_with(", ").to_string(),
            path: path.clone(),
        }),
    }
}

/// Encode a configuration string the way the API carries byte arrays.
pub(crate) fn encode_bytes(value: &str) -> String {
    base64::engine::general_purpose::STANDARD.encode(value.as_bytes())
}

/// Inverse of [`encode_bytes`].
pub(crate) fn decode_bytes(
    field: &'static str,
    value: &str,
    path: &AttributePath,
) -> Result<String, TranslateError> {
    let invalid = |message: String| TranslateError::InvalidField {
        field,
        message,
        path: path.clone(),
    };
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(value)
        .map_err(|err| invalid(err.to_string()))?;
    String::from_utf8(bytes).map_err(|err| invalid(err.to_string()))
}

/// Hexadecimal configuration string to the base64 the API carries.
pub(crate) fn hex_to_base64(
    field: &'static str,
    value: &str,
    path: &AttributePath,
) -> Result<String, TranslateError> {
    let bytes = hex::decode(value).map_err(|err| TranslateError::InvalidField {
        field,
        message: err.to_string(),
        path: path.clone(),
    })?;
    Ok(base64::engine::general_purpose::STANDARD.encode(bytes))
}

/// Inverse of [`hex_to_base64`], lowercase.
pub(crate) fn base64_to_hex(
    field: &'static str,
    value: &str,
    path: &AttributePath,
) -> Result<String, TranslateError> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(value)
        .map_err(|err| TranslateError::InvalidField {
            field,
            message: err.to_string(),
            path: path.clone(),
        })?;
    Ok(hex::encode(bytes))
}
