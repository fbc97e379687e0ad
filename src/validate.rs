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

//! Validation functions for schema values.
//!
//! Every validator takes the known string content of an attribute and returns
//! the reason it is rejected. Null and unknown values are never checked.

use base64::Engine;
use lazy_static::lazy_static;
use regex::Regex;
use tf_provider::value::ValueString;
use tf_provider::{AttributePath, Diagnostics};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

pub(crate) type Validator = fn(&str) -> Result<(), String>;

lazy_static! {
    static ref RESOURCE_GROUP_NAME: Regex = Regex::new(r"^[-\w._()]{0,89}[-\w_()]$").unwrap();
    static ref MEDIA_SERVICES_ACCOUNT_NAME: Regex = Regex::new(r"^[-a-z0-9]{3,24}$").unwrap();
    static ref CONTENT_KEY_POLICY_NAME: Regex = Regex::new(r"^[-a-zA-Z0-9(_)]{1,128}$").unwrap();
    static ref API_MANAGEMENT_NAME: Regex =
        Regex::new(r"^[a-zA-Z](?:[a-zA-Z0-9-]{0,48}[a-zA-Z0-9])?$").unwrap();
    static ref NAMED_VALUE_NAME: Regex = Regex::new(r"^[A-Za-z0-9-._]{1,256}$").unwrap();
    static ref PRODUCT_ID: Regex = Regex::new(r"^[^*#&+:<>?]{1,256}$").unwrap();
    static ref UUID: Regex = Regex::new(
        r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$"
    )
    .unwrap();
}

fn matches(regex: &Regex, value: &str, what: &str) -> Result<(), String> {
    if regex.is_match(value) {
        Ok(())
    } else {
        Err(format!("{value:?} is not a valid {what}"))
    }
}

pub(crate) fn resource_group_name(value: &str) -> Result<(), String> {
    matches(&RESOURCE_GROUP_NAME, value, "resource group name")
}

pub(crate) fn media_services_account_name(value: &str) -> Result<(), String> {
    matches(
        &MEDIA_SERVICES_ACCOUNT_NAME,
        value,
        "media services account name, expected 3 to 24 lowercase letters, digits or dashes",
    )
}

pub(crate) fn content_key_policy_name(value: &str) -> Result<(), String> {
    matches(&CONTENT_KEY_POLICY_NAME, value, "content key policy name")
}

pub(crate) fn api_management_name(value: &str) -> Result<(), String> {
    matches(&API_MANAGEMENT_NAME, value, "API Management service name")
}

pub(crate) fn named_value_name(value: &str) -> Result<(), String> {
    matches(&NAMED_VALUE_NAME, value, "named value name")
}

pub(crate) fn product_id(value: &str) -> Result<(), String> {
    matches(&PRODUCT_ID, value, "product id")
}

pub(crate) fn uuid(value: &str) -> Result<(), String> {
    matches(&UUID, value, "UUID")
}

pub(crate) fn not_empty(value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err("must not be empty".to_owned())
    } else {
        Ok(())
    }
}

pub(crate) fn https_url(value: &str) -> Result<(), String> {
    match value.strip_prefix("https://") {
        Some(host) if !host.is_empty() && !host.starts_with('/') => Ok(()),
        _ => Err(format!("{value:?} is not an https URL")),
    }
}

pub(crate) fn base64(value: &str) -> Result<(), String> {
    base64::engine::general_purpose::STANDARD
        .decode(value)
        .map(|_| ())
        .map_err(|err| format!("not a base64 string: {err}"))
}

pub(crate) fn hex(value: &str) -> Result<(), String> {
    hex::decode(value)
        .map(|_| ())
        .map_err(|err| format!("not a hexadecimal string: {err}"))
}

pub(crate) fn rfc3339(value: &str) -> Result<(), String> {
    OffsetDateTime::parse(value, &Rfc3339)
        .map(|_| ())
        .map_err(|err| format!("{value:?} is not an RFC3339 date: {err}"))
}

/// Report `validator`'s rejection of a known value on `attr_path`.
pub(crate) fn check(
    diags: &mut Diagnostics,
    attr_path: AttributePath,
    value: &ValueString,
    validator: Validator,
) {
    if let Some(content) = value.as_deref_option() {
        if let Err(detail) = validator(content) {
            diags.error("Invalid attribute value", detail, attr_path);
        }
    }
}

/// Report a number outside of `min..=max`.
pub(crate) fn check_range(
    diags: &mut Diagnostics,
    attr_path: AttributePath,
    value: &tf_provider::value::ValueNumber,
    min: i64,
    max: i64,
) {
    if let Some(&number) = value.as_ref_option() {
        if !(min..=max).contains(&number) {
            diags.error(
                "Invalid attribute value",
                format!("expected a value between {min} and {max}, got {number}"),
                attr_path,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use tf_provider::value::Value;

    use super::*;

    #[test]
    fn names() {
        assert!(media_services_account_name("account1").is_ok());
        assert!(media_services_account_name("Account1").is_err());
        assert!(media_services_account_name("ab").is_err());
        assert!(content_key_policy_name("policy_(1)").is_ok());
        assert!(content_key_policy_name("policy/1").is_err());
        assert!(api_management_name("svc-1").is_ok());
        assert!(api_management_name("1svc").is_err());
        assert!(api_management_name("svc-").is_err());
        assert!(named_value_name("my.named_value-1").is_ok());
        assert!(named_value_name("with space").is_err());
        assert!(product_id("starter").is_ok());
        assert!(product_id("star*").is_err());
        assert!(resource_group_name("rg1").is_ok());
        assert!(resource_group_name("rg.").is_err());
    }

    #[test]
    fn formats() {
        assert!(uuid("12345678-1234-9876-4563-123456789012").is_ok());
        assert!(uuid("12345678-1234-9876-4563").is_err());
        assert!(https_url("https://management.azure.com").is_ok());
        assert!(https_url("http://management.azure.com").is_err());
        assert!(https_url("https://").is_err());
        assert!(base64("AQAB").is_ok());
        assert!(base64("AQ!B").is_err());
        assert!(hex("bfe0f1f1c4b1").is_ok());
        assert!(hex("xyz").is_err());
        assert!(rfc3339("2017-10-16T18:22:53Z").is_ok());
        assert!(rfc3339("2017-10-16").is_err());
        assert!(not_empty(" ").is_err());
    }

    #[test]
    fn check_reports_known_values_only() {
        let mut diags = Diagnostics::default();
        check(&mut diags, AttributePath::new("name"), &Value::Unknown, uuid);
        check(&mut diags, AttributePath::new("name"), &Value::Null, uuid);
        assert!(diags.errors.is_empty());

        check(
            &mut diags,
            AttributePath::new("name"),
            &Value::Value(Cow::Borrowed("nope")),
            uuid,
        );
        assert_eq!(diags.errors.len(), 1);
    }

    #[test]
    fn range() {
        let mut diags = Diagnostics::default();
        check_range(&mut diags, AttributePath::new("n"), &Value::Value(3), 1, 5);
        assert!(diags.errors.is_empty());
        check_range(&mut diags, AttributePath::new("n"), &Value::Value(0), 1, 5);
        assert_eq!(diags.errors.len(), 1);
    }
}
