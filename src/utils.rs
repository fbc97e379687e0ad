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

use std::borrow::Cow;
use std::cell::RefCell;
use std::fmt::Display;

use async_trait::async_trait;

use tf_provider::schema::{Attribute, AttributeConstraint, AttributeType, Description, Schema};
use tf_provider::value::{Value, ValueNumber, ValueString};
use tf_provider::{AttributePath, Diagnostics};

use crate::client::ApiError;
use crate::ids::IdError;
use crate::translate::TranslateError;

pub(crate) trait WithSchema {
    fn schema() -> Schema;
}

#[async_trait]
pub(crate) trait WithValidate {
    async fn validate(&self, diags: &mut Diagnostics, attr_path: AttributePath);
}

pub(crate) trait WithNormalize {
    fn normalize(&mut self, diags: &mut Diagnostics);
}

/// Build an attribute schema entry.
pub(crate) fn attribute(
    attr_type: AttributeType,
    constraint: AttributeConstraint,
    description: &str,
) -> Attribute {
    Attribute {
        attr_type,
        description: Description::plain(description),
        constraint,
        sensitive: false,
        deprecated: false,
    }
}

pub(crate) fn sensitive(mut attribute: Attribute) -> Attribute {
    attribute.sensitive = true;
    attribute
}

pub(crate) fn value_string<'a>(value: impl Into<String>) -> ValueString<'a> {
    Value::Value(Cow::Owned(value.into()))
}

pub(crate) fn optional_string<'a>(value: Option<impl Into<String>>) -> ValueString<'a> {
    value.map_or(Value::Null, value_string)
}

pub(crate) fn optional_number(value: Option<i64>) -> ValueNumber {
    value.map_or(Value::Null, Value::Value)
}

/// Known, non-empty string content.
pub(crate) fn string_content(value: &ValueString) -> Option<String> {
    value
        .as_deref_option()
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

pub(crate) fn bool_content(value: &Value<bool>) -> Option<bool> {
    value.as_ref_option().copied()
}

pub(crate) fn number_content(value: &ValueNumber) -> Option<i64> {
    value.as_ref_option().copied()
}

/// Report a failed Resource Manager call, like `retrieving Named Value <id>: <err>`.
pub(crate) fn report_api_error(
    diags: &mut Diagnostics,
    action: &str,
    id: &impl Display,
    err: &ApiError,
) {
    diags.root_error(format!("Failed {action}"), format!("{action} {id}: {err}"));
}

pub(crate) fn report_id_error(diags: &mut Diagnostics, err: &IdError) {
    let summary = match err.segment() {
        Some(segment) => format!("Invalid resource ID: bad `{segment}` element"),
        None => "Invalid resource ID".to_owned(),
    };
    diags.error(summary, err.to_string(), AttributePath::new("id"));
}

pub(crate) fn report_translate_error(diags: &mut Diagnostics, err: &TranslateError) {
    diags.error("Invalid configuration", err.to_string(), err.path());
}

/// Paths of the force-new attributes that changed.
pub(crate) fn force_new(changes: &[(&'static str, bool)]) -> Vec<AttributePath> {
    changes
        .iter()
        .filter(|(_, changed)| *changed)
        .map(|(name, _)| AttributePath::new(*name))
        .collect()
}

/// The object to create already exists remotely.
pub(crate) fn requires_import(diags: &mut Diagnostics, resource_type: &str, id: &impl Display) {
    diags.root_error(
        "Resource already exists",
        format!(
            "A resource with the ID \"{id}\" already exists - to be managed via Terraform this resource needs to be imported into the State. Please see the resource documentation for \"{resource_type}\" for more information."
        ),
    );
}

pub struct DisplayJoiner<'a, T, I>
where
    T: Iterator<Item = I>,
    I: std::fmt::Display,
{
    iter: RefCell<T>,
    sep: &'a str,
}

pub trait DisplayJoinable {
    type Joiner<'a>;
    fn join_with(self, sep: &str) -> Self::Joiner<'_>;
}

impl<T, I> DisplayJoinable for T
where
    T: Iterator<Item = I>,
    I: std::fmt::Display,
{
    type Joiner<'a> = DisplayJoiner<'a, T, I>;

    fn join_with(self, sep: &str) -> Self::Joiner<'_> {
        DisplayJoiner {
            iter: RefCell::new(self),
            sep,
        }
    }
}

impl<'a, T, I> std::fmt::Display for DisplayJoiner<'a, T, I>
where
    T: Iterator<Item = I>,
    I: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut sep = "";
        let mut iter = self.iter.try_borrow_mut().or(Err(std::fmt::Error))?;
        for elt in iter.by_ref() {
            f.write_str(sep)?;
            f.write_fmt(format_args!("{elt}"))?;
            sep = self.sep;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_with_separator() {
        assert_eq!(["a", "b", "c"].iter().join_with(", ").to_string(), "a, b, c");
        assert_eq!(std::iter::empty::<&str>().join_with("/").to_string(), "");
    }

    #[test]
    fn string_content_skips_empty_and_unknown() {
        assert_eq!(string_content(&value_string("x")), Some("x".to_owned()));
        assert_eq!(string_content(&value_string("")), None);
        assert_eq!(string_content(&Value::Unknown), None);
        assert_eq!(string_content(&Value::Null), None);
    }

    #[test]
    fn optional_values() {
        assert_eq!(optional_string(None::<String>), Value::Null);
        assert_eq!(optional_number(Some(3)), Value::Value(3));
    }
}
