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

//! Typed Azure Resource Manager identifiers.
//!
//! Every ID is a `key/value` path such as
//! `/subscriptions/{sub}/resourceGroups/{rg}/providers/{Namespace}/{type}/{name}`.
//! Parsing walks the path positionally: literal keys must match exactly
//! (case-sensitive), every value must be non-empty, and nothing may be left
//! over once the known segments are consumed.

use thiserror::Error;

use crate::utils::DisplayJoinable;

pub use api_management::{ApiManagementId, ApiManagementNamedValueId, ApiManagementProductId};
pub use media::{ContentKeyPolicyId, MediaServicesAccountId};

/// Errors that can occur when parsing a resource ID.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdError {
    /// A required segment is absent, mismatched, or has an empty value.
    #[error("parsing {kind} ID {input:?}: ID was missing the `{segment}` element")]
    MalformedId {
        kind: &'static str,
        input: String,
        segment: String,
    },

    /// Segments remain after every known segment has been extracted.
    #[error("parsing {kind} ID {input:?}: ID contained more segments than required: {remaining:?}")]
    UnconsumedSegments {
        kind: &'static str,
        input: String,
        remaining: Vec<String>,
    },
}

impl IdError {
    /// The segment reported by a `MalformedId` error.
    pub fn segment(&self) -> Option<&str> {
        match self {
            IdError::MalformedId { segment, .. } => Some(segment),
            IdError::UnconsumedSegments { .. } => None,
        }
    }
}

/// Positional reader over the components of an ID path.
pub(crate) struct SegmentParser<'a> {
    kind: &'static str,
    input: &'a str,
    components: std::iter::Peekable<std::str::Split<'a, char>>,
}

impl<'a> SegmentParser<'a> {
    pub(crate) fn new(kind: &'static str, input: &'a str) -> Self {
        let path = input.strip_prefix('/').unwrap_or(input);
        let path = path.strip_suffix('/').unwrap_or(path);
        Self {
            kind,
            input,
            components: path.split('/').peekable(),
        }
    }

    fn malformed(&self, segment: impl Into<String>) -> IdError {
        IdError::MalformedId {
            kind: self.kind,
            input: self.input.to_owned(),
            segment: segment.into(),
        }
    }

    /// Consume `key/{value}` and return the value.
    pub(crate) fn variable(&mut self, key: &'static str) -> Result<String, IdError> {
        if self.components.next() != Some(key) {
            return Err(self.malformed(key));
        }
        match self.components.next() {
            Some(value) if !value.is_empty() => Ok(value.to_owned()),
            _ => Err(self.malformed(key)),
        }
    }

    /// Consume `key/value` where both parts are fixed.
    pub(crate) fn literal(&mut self, key: &'static str, value: &'static str) -> Result<(), IdError> {
        if self.components.next() != Some(key) || self.components.next() != Some(value) {
            return Err(self.malformed(format!("{key}/{value}")));
        }
        Ok(())
    }

    pub(crate) fn finish(mut self) -> Result<(), IdError> {
        if self.components.peek().is_none() {
            return Ok(());
        }
        Err(IdError::UnconsumedSegments {
            kind: self.kind,
            input: self.input.to_owned(),
            remaining: self.components.map(str::to_owned).collect(),
        })
    }
}

/// Write `/k1/v1/k2/v2...` for the given segments.
pub(crate) fn format_segments(segments: &[&str]) -> String {
    format!("/{}", segments.iter().join_with("/"))
}

/// Define a typed ID scoped to a resource group and a provider namespace.
///
/// ```ignore
/// define_resource_id! {
///     ApiManagementId, "API Management Service", "Microsoft.ApiManagement" {
///         "service" => service_name,
///     }
/// }
/// ```
///
/// The generated type has `new`, `id`, `parse`, `Display` and `FromStr`.
macro_rules! define_resource_id {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal, $namespace:literal {
            $($key:literal => $field:ident),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name {
            pub subscription_id: String,
            pub resource_group: String,
            $(pub $field: String,)+
        }

        impl $name {
            pub const KIND: &'static str = $kind;
            pub const NAMESPACE: &'static str = $namespace;

            pub fn new(
                subscription_id: impl Into<String>,
                resource_group: impl Into<String>,
                $($field: impl Into<String>,)+
            ) -> Self {
                Self {
                    subscription_id: subscription_id.into(),
                    resource_group: resource_group.into(),
                    $($field: $field.into(),)+
                }
            }

            /// Canonical ARM path of this resource.
            pub fn id(&self) -> String {
                $crate::ids::format_segments(&[
                    "subscriptions",
                    self.subscription_id.as_str(),
                    "resourceGroups",
                    self.resource_group.as_str(),
                    "providers",
                    Self::NAMESPACE,
                    $($key, self.$field.as_str(),)+
                ])
            }

            pub fn parse(input: &str) -> Result<Self, $crate::ids::IdError> {
                let mut parser = $crate::ids::SegmentParser::new(Self::KIND, input);
                let subscription_id = parser.variable("subscriptions")?;
                let resource_group = parser.variable("resourceGroups")?;
                parser.literal("providers", Self::NAMESPACE)?;
                $(let $field = parser.variable($key)?;)+
                parser.finish()?;

                Ok(Self {
                    subscription_id,
                    resource_group,
                    $($field,)+
                })
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.id())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::ids::IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }
    };
}

pub(crate) use define_resource_id;

mod api_management;
mod media;

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_all(input: &str) -> Result<Vec<String>, IdError> {
        let mut parser = SegmentParser::new("Test", input);
        let subscription_id = parser.variable("subscriptions")?;
        let resource_group = parser.variable("resourceGroups")?;
        parser.finish()?;
        Ok(vec![subscription_id, resource_group])
    }

    #[test]
    fn format_joins_segments() {
        assert_eq!(
            format_segments(&["subscriptions", "sub", "resourceGroups", "group1"]),
            "/subscriptions/sub/resourceGroups/group1"
        );
    }

    #[test]
    fn trailing_slash_is_tolerated() {
        assert_eq!(
            parse_all("/subscriptions/sub/resourceGroups/group1/").unwrap(),
            vec!["sub", "group1"]
        );
    }

    #[test]
    fn missing_subscription() {
        let err = parse_all("/resourceGroups/group1").unwrap_err();
        assert_eq!(err.segment(), Some("subscriptions"));
        assert!(err
            .to_string()
            .contains("ID was missing the `subscriptions` element"));
    }

    #[test]
    fn empty_value() {
        let err = parse_all("/subscriptions/sub/resourceGroups/").unwrap_err();
        assert_eq!(err.segment(), Some("resourceGroups"));
        let err = parse_all("/subscriptions//resourceGroups/group1").unwrap_err();
        assert_eq!(err.segment(), Some("subscriptions"));
    }

    #[test]
    fn leftover_segments() {
        let err = parse_all("/subscriptions/sub/resourceGroups/rg/providers/Foo").unwrap_err();
        assert_eq!(
            err,
            IdError::UnconsumedSegments {
                kind: "Test",
                input: "/subscriptions/sub/resourceGroups/rg/providers/Foo".to_owned(),
                remaining: vec!["providers".to_owned(), "Foo".to_owned()],
            }
        );
    }

    #[test]
    fn empty_input() {
        let err = parse_all("").unwrap_err();
        assert_eq!(err.segment(), Some("subscriptions"));
    }
}
