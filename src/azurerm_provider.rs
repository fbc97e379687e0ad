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
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use tf_provider::schema::{AttributeConstraint, AttributeType, Block, Description, Schema};
use tf_provider::value::{ValueEmpty, ValueString};
use tf_provider::{map, AttributePath, Diagnostics, Provider};

use crate::api_management::{
    ApiManagementDataSource, ApiManagementNamedValueResource, ApiManagementProductResource,
};
use crate::client::arm::{ArmTransport, DEFAULT_ENDPOINT};
use crate::client::{ClientHandle, Clients};
use crate::media::ContentKeyPolicyResource;
use crate::utils::{attribute, sensitive, string_content};
use crate::validate;

const SUBSCRIPTION_ID_ENV: &str = "ARM_SUBSCRIPTION_ID";
const ACCESS_TOKEN_ENV: &str = "ARM_ACCESS_TOKEN";
const ENDPOINT_ENV: &str = "ARM_RESOURCE_MANAGER_ENDPOINT";

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig<'a> {
    #[serde(borrow = "'a")]
    pub subscription_id: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub access_token: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub resource_manager_endpoint: ValueString<'a>,
}

/// Configured value, or the environment variable `env` when unset.
fn setting(value: &ValueString, env: &str) -> Option<String> {
    string_content(value).or_else(|| std::env::var(env).ok().filter(|v| !v.is_empty()))
}

#[derive(Debug, Default, Clone)]
pub struct AzurermProvider {
    clients: ClientHandle,
}

#[async_trait]
impl Provider for AzurermProvider {
    type Config<'a> = ProviderConfig<'a>;
    type MetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(Schema {
            version: 1,
            block: Block {
                attributes: map! {
                    "subscription_id" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Optional,
                        "Subscription to manage resources in (env: ARM_SUBSCRIPTION_ID)",
                    ),
                    "access_token" => sensitive(attribute(
                        AttributeType::String,
                        AttributeConstraint::Optional,
                        "Bearer token for the Resource Manager API (env: ARM_ACCESS_TOKEN)",
                    )),
                    "resource_manager_endpoint" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Optional,
                        "Resource Manager endpoint (env: ARM_RESOURCE_MANAGER_ENDPOINT)",
                    ),
                },
                description: Description::plain("Azure Resource Manager"),
                ..Default::default()
            },
        })
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::Config<'a>) -> Option<()> {
        validate::check(
            diags,
            AttributePath::new("subscription_id"),
            &config.subscription_id,
            validate::uuid,
        );
        validate::check(
            diags,
            AttributePath::new("resource_manager_endpoint"),
            &config.resource_manager_endpoint,
            validate::https_url,
        );

        if diags.errors.is_empty() {
            Some(())
        } else {
            None
        }
    }

    async fn configure<'a>(
        &self,
        diags: &mut Diagnostics,
        terraform_version: String,
        config: Self::Config<'a>,
    ) -> Option<()> {
        let Some(subscription_id) = setting(&config.subscription_id, SUBSCRIPTION_ID_ENV) else {
            diags.error_short(
                "`subscription_id` is required, either in the provider block or through ARM_SUBSCRIPTION_ID",
                AttributePath::new("subscription_id"),
            );
            return None;
        };
        let Some(token) = setting(&config.access_token, ACCESS_TOKEN_ENV) else {
            diags.error_short(
                "`access_token` is required, either in the provider block or through ARM_ACCESS_TOKEN",
                AttributePath::new("access_token"),
            );
            return None;
        };
        let endpoint = setting(&config.resource_manager_endpoint, ENDPOINT_ENV)
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_owned());

        let transport = match ArmTransport::new(endpoint.as_str(), token) {
            Ok(transport) => transport,
            Err(err) => {
                diags.root_error("Failed to build the Resource Manager client", err.to_string());
                return None;
            }
        };

        info!(
            terraform_version = %terraform_version,
            subscription_id = %subscription_id,
            endpoint = %endpoint,
            "Configuring azurerm provider"
        );

        if self
            .clients
            .set(Clients::new(subscription_id, Arc::new(transport)))
            .is_err()
        {
            diags.root_warning(
                "Provider already configured",
                "The first configuration is kept.",
            );
        }
        Some(())
    }

    fn get_resources(
        &self,
        _diags: &mut Diagnostics,
    ) -> Option<HashMap<String, Box<dyn tf_provider::DynamicResource>>> {
        Some(map! {
            "api_management_named_value" => ApiManagementNamedValueResource::new(self.clients.clone()),
            "api_management_product"     => ApiManagementProductResource::new(self.clients.clone()),
            "media_content_key_policy"   => ContentKeyPolicyResource::new(self.clients.clone()),
        })
    }

    fn get_data_sources(
        &self,
        _diags: &mut Diagnostics,
    ) -> Option<HashMap<String, Box<dyn tf_provider::DynamicDataSource>>> {
        Some(map! {
            "api_management" => ApiManagementDataSource::new(self.clients.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use tf_provider::value::Value;

    use super::*;

    #[tokio::test]
    async fn validate_rejects_bad_settings() {
        let provider = AzurermProvider::default();
        let mut diags = Diagnostics::default();
        let config = ProviderConfig {
            subscription_id: Value::Value(Cow::Borrowed("not-a-uuid")),
            resource_manager_endpoint: Value::Value(Cow::Borrowed("http://localhost")),
            ..Default::default()
        };
        assert!(Provider::validate(&provider, &mut diags, config).await.is_none());
        assert_eq!(diags.errors.len(), 2);
    }

    #[tokio::test]
    async fn validate_accepts_unknown_settings() {
        let provider = AzurermProvider::default();
        let mut diags = Diagnostics::default();
        let config = ProviderConfig {
            subscription_id: Value::Unknown,
            ..Default::default()
        };
        assert!(Provider::validate(&provider, &mut diags, config).await.is_some());
    }

    #[tokio::test]
    async fn configure_sets_the_clients() {
        let provider = AzurermProvider::default();
        let mut diags = Diagnostics::default();
        let config = ProviderConfig {
            subscription_id: Value::Value(Cow::Borrowed("12345678-1234-9876-4563-123456789012")),
            access_token: Value::Value(Cow::Borrowed("token")),
            resource_manager_endpoint: Value::Value(Cow::Borrowed("https://localhost")),
        };
        assert!(provider
            .configure(&mut diags, "1.6.0".to_owned(), config)
            .await
            .is_some());

        let clients = provider.clients.get(&mut diags).unwrap();
        assert_eq!(clients.subscription_id, "12345678-1234-9876-4563-123456789012");
        assert!(diags.errors.is_empty());
    }

    #[test]
    fn unconfigured_clients_are_reported() {
        let mut diags = Diagnostics::default();
        assert!(ClientHandle::default().get(&mut diags).is_none());
        assert_eq!(diags.errors.len(), 1);
    }
}
