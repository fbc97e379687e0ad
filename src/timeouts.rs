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

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tf_provider::schema::{AttributeConstraint, AttributeType, Block, Description, NestedBlock};
use tf_provider::value::{Value, ValueString};
use tf_provider::{AttributePath, Diagnostics};

use crate::client::ApiError;
use crate::utils::attribute;

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

impl Operation {
    fn name(self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }

    fn default_duration(self) -> Duration {
        match self {
            Operation::Read => Duration::from_secs(5 * MINUTE),
            _ => Duration::from_secs(30 * MINUTE),
        }
    }
}

/// The optional `timeouts` block of a resource.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutsState<'a> {
    #[serde(borrow = "'a")]
    pub create: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub read: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub update: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub delete: ValueString<'a>,
}

impl<'a> TimeoutsState<'a> {
    pub fn block() -> NestedBlock {
        let attributes: HashMap<String, _> = [
            Operation::Create,
            Operation::Read,
            Operation::Update,
            Operation::Delete,
        ]
        .into_iter()
        .map(|operation| {
            (
                operation.name().to_owned(),
                attribute(
                    AttributeType::String,
                    AttributeConstraint::Optional,
                    &format!(
                        "Time allowed for the {} operation, like `1h30m` (default: {}m)",
                        operation.name(),
                        operation.default_duration().as_secs() / MINUTE
                    ),
                ),
            )
        })
        .collect();

        NestedBlock::Optional(Block {
            attributes,
            description: Description::plain("Per operation deadlines"),
            ..Default::default()
        })
    }

    fn get(&self, operation: Operation) -> &ValueString<'a> {
        match operation {
            Operation::Create => &self.create,
            Operation::Read => &self.read,
            Operation::Update => &self.update,
            Operation::Delete => &self.delete,
        }
    }
}

/// Deadline of `operation`, falling back to the default when unset.
pub fn timeout(timeouts: &Value<TimeoutsState>, operation: Operation) -> Result<Duration> {
    match timeouts.as_ref_option().and_then(|t| t.get(operation).as_deref_option()) {
        Some(text) => parse_duration(text)
            .with_context(|| format!("invalid `{}` timeout {text:?}", operation.name())),
        None => Ok(operation.default_duration()),
    }
}

/// Like [`timeout`], reporting an invalid duration into `diags`.
pub fn resolve(
    diags: &mut Diagnostics,
    timeouts: &Value<TimeoutsState>,
    operation: Operation,
) -> Option<Duration> {
    match timeout(timeouts, operation) {
        Ok(duration) => Some(duration),
        Err(err) => {
            diags.error(
                "Invalid timeout",
                format!("{err:#}"),
                AttributePath::new("timeouts")
                    .index(0)
                    .attribute(operation.name()),
            );
            None
        }
    }
}

pub fn validate(diags: &mut Diagnostics, timeouts: &Value<TimeoutsState>) {
    for operation in [
        Operation::Create,
        Operation::Read,
        Operation::Update,
        Operation::Delete,
    ] {
        resolve(diags, timeouts, operation);
    }
}

/// Parse durations like `1h30m`, `45m` or `90s`.
pub fn parse_duration(input: &str) -> Result<Duration> {
    if input.is_empty() {
        return Err(anyhow!("empty duration"));
    }

    let mut secs: u64 = 0;
    let mut digits = String::new();
    for c in input.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let unit = match c {
            'h' => HOUR,
            'm' => MINUTE,
            's' => 1,
            _ => return Err(anyhow!("unknown unit {c:?}")),
        };
        let amount: u64 = digits
            .parse()
            .with_context(|| format!("missing amount before {c:?}"))?;
        secs = amount
            .checked_mul(unit)
            .and_then(|amount| secs.checked_add(amount))
            .ok_or_else(|| anyhow!("duration too large"))?;
        digits.clear();
    }
    if !digits.is_empty() {
        return Err(anyhow!("missing unit after {digits:?}"));
    }

    Ok(Duration::from_secs(secs))
}

/// Run `future`, failing with [`ApiError::DeadlineExceeded`] once `duration` elapsed.
pub async fn with_timeout<F, T>(duration: Duration, future: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ApiError>>,
{
    tokio::time::timeout(duration, future)
        .await
        .map_err(|_| ApiError::DeadlineExceeded(duration))?
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use super::*;

    #[test]
    fn parse_units() {
        assert_eq!(parse_duration("1h30m").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_duration("45m").unwrap(), Duration::from_secs(2700));
        assert_eq!(parse_duration("2h3m4s").unwrap(), Duration::from_secs(7384));
        assert_eq!(parse_duration("90s").unwrap(), Duration::from_secs(90));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("30").is_err());
        assert!(parse_duration("h").is_err());
        assert!(parse_duration("1d").is_err());
        assert!(parse_duration("5124095576030432h").is_err());
        assert!(parse_duration("18446744073709551615s1s").is_err());
    }

    #[test]
    fn defaults_and_overrides() {
        assert_eq!(
            timeout(&Value::Null, Operation::Read).unwrap(),
            Duration::from_secs(300)
        );
        assert_eq!(
            timeout(&Value::Null, Operation::Delete).unwrap(),
            Duration::from_secs(1800)
        );

        let timeouts = Value::Value(TimeoutsState {
            create: Value::Value(Cow::Borrowed("1h")),
            ..Default::default()
        });
        assert_eq!(
            timeout(&timeouts, Operation::Create).unwrap(),
            Duration::from_secs(3600)
        );
        assert_eq!(
            timeout(&timeouts, Operation::Update).unwrap(),
            Duration::from_secs(1800)
        );
    }

    #[test]
    fn invalid_timeout_is_reported() {
        let mut diags = Diagnostics::default();
        validate(
            &mut diags,
            &Value::Value(TimeoutsState {
                read: Value::Value(Cow::Borrowed("soon")),
                create: Value::Value(Cow::Borrowed("5124095576030432h")),
                ..Default::default()
            }),
        );
        assert_eq!(diags.errors.len(), 2);
    }

    #[tokio::test]
    async fn deadline_exceeded() {
        let result: Result<(), ApiError> = with_timeout(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(ApiError::DeadlineExceeded(_))));
    }
}
