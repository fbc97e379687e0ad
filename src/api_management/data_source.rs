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

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use tf_provider::schema::{AttributeConstraint, AttributeType, Block, Description, Schema};
use tf_provider::value::{Value, ValueEmpty, ValueList, ValueMap, ValueString};
use tf_provider::{map, AttributePath, DataSource, Diagnostics};

use crate::client::api_management::ApiManagementService;
use crate::client::ClientHandle;
use crate::ids::ApiManagementId;
use crate::timeouts::{self, with_timeout, Operation, TimeoutsState};
use crate::utils::{attribute, optional_string, report_api_error, value_string, WithSchema};
use crate::validate::{self, check};

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiManagementDataSourceState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub name: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub resource_group_name: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub location: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub sku_name: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub publisher_name: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub publisher_email: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub notification_sender_email: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub gateway_url: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub gateway_regional_url: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub portal_url: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub developer_portal_url: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub management_api_url: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub scm_url: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub public_ip_addresses: ValueList<ValueString<'a>>,
    #[serde(borrow = "'a")]
    pub private_ip_addresses: ValueList<ValueString<'a>>,
    #[serde(borrow = "'a")]
    pub tags: ValueMap<'a, ValueString<'a>>,
    #[serde(borrow = "'a")]
    pub timeouts: Value<TimeoutsState<'a>>,
}

impl<'a> WithSchema for ApiManagementDataSourceState<'a> {
    fn schema() -> Schema {
        let computed = |description: &str| {
            attribute(
                AttributeType::String,
                AttributeConstraint::Computed,
                description,
            )
        };
        let addresses = |description: &str| {
            attribute(
                AttributeType::List(Box::new(AttributeType::String)),
                AttributeConstraint::Computed,
                description,
            )
        };

        Schema {
            version: 1,
            block: Block {
                attributes: map! {
                    "id" => computed("Resource ID of the service"),
                    "name" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Required,
                        "Name of the API Management service",
                    ),
                    "resource_group_name" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Required,
                        "Resource group of the API Management service",
                    ),
                    "location" => computed("Azure region of the service"),
                    "sku_name" => computed("SKU of the service, like `Developer_1`"),
                    "publisher_name" => computed("Publisher name"),
                    "publisher_email" => computed("Publisher email"),
                    "notification_sender_email" => computed("Sender of the notification emails"),
                    "gateway_url" => computed("URL of the API gateway"),
                    "gateway_regional_url" => computed("Regional URL of the API gateway"),
                    "portal_url" => computed("URL of the publisher portal"),
                    "developer_portal_url" => computed("URL of the developer portal"),
                    "management_api_url" => computed("URL of the management API"),
                    "scm_url" => computed("URL of the SCM endpoint"),
                    "public_ip_addresses" => addresses("Public IP addresses of the service"),
                    "private_ip_addresses" => addresses("Private IP addresses of the service"),
                    "tags" => attribute(
                        AttributeType::Map(Box::new(AttributeType::String)),
                        AttributeConstraint::Computed,
                        "Tags of the service",
                    ),
                },
                blocks: map! {
                    "timeouts" => TimeoutsState::block(),
                },
                description: Description::plain("Look up an existing API Management service"),
                ..Default::default()
            },
        }
    }
}

fn flatten_addresses<'a>(addresses: Option<Vec<String>>) -> ValueList<ValueString<'a>> {
    Value::Value(
        addresses
            .unwrap_or_default()
            .into_iter()
            .map(value_string)
            .collect(),
    )
}

fn flatten<'a>(
    id: &ApiManagementId,
    service: ApiManagementService,
    config: ApiManagementDataSourceState<'a>,
) -> ApiManagementDataSourceState<'a> {
    let properties = service.properties.unwrap_or_default();

    ApiManagementDataSourceState {
        id: value_string(id.id()),
        location: optional_string(service.location),
        sku_name: optional_string(
            service
                .sku
                .map(|sku| format!("{}_{}", sku.name, sku.capacity)),
        ),
        publisher_name: optional_string(properties.publisher_name),
        publisher_email: optional_string(properties.publisher_email),
        notification_sender_email: optional_string(properties.notification_sender_email),
        gateway_url: optional_string(properties.gateway_url),
        gateway_regional_url: optional_string(properties.gateway_regional_url),
        portal_url: optional_string(properties.portal_url),
        developer_portal_url: optional_string(properties.developer_portal_url),
        management_api_url: optional_string(properties.management_api_url),
        scm_url: optional_string(properties.scm_url),
        public_ip_addresses: flatten_addresses(properties.public_ip_addresses),
        private_ip_addresses: flatten_addresses(properties.private_ip_addresses),
        tags: Value::Value(
            service
                .tags
                .unwrap_or_default()
                .into_iter()
                .map(|(key, value)| (Cow::Owned(key), value_string(value)))
                .collect(),
        ),
        ..config
    }
}

#[derive(Debug, Default, Clone)]
pub struct ApiManagementDataSource {
    clients: ClientHandle,
}

impl ApiManagementDataSource {
    pub fn new(clients: ClientHandle) -> Self {
        Self { clients }
    }
}

#[async_trait]
impl DataSource for ApiManagementDataSource {
    type State<'a> = ApiManagementDataSourceState<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(ApiManagementDataSourceState::schema())
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::State<'a>) -> Option<()> {
        check(
            diags,
            AttributePath::new("name"),
            &config.name,
            validate::api_management_name,
        );
        check(
            diags,
            AttributePath::new("resource_group_name"),
            &config.resource_group_name,
            validate::resource_group_name,
        );
        timeouts::validate(diags, &config.timeouts);

        if diags.errors.is_empty() {
            Some(())
        } else {
            None
        }
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        config: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::State<'a>> {
        let clients = self.clients.get(diags)?;
        let id = ApiManagementId::new(
            clients.subscription_id.as_str(),
            config.resource_group_name.as_str(),
            config.name.as_str(),
        );
        let timeout = timeouts::resolve(diags, &config.timeouts, Operation::Read)?;

        match with_timeout(timeout, clients.api_management.get_service(&id)).await {
            Ok(service) => Some(flatten(&id, service, config)),
            Err(err) if err.is_not_found() => {
                diags.root_error(
                    "API Management Service was not found",
                    format!("{id} was not found"),
                );
                None
            }
            Err(err) => {
                report_api_error(diags, "retrieving API Management Service", &id, &err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::client::memory::clients;

    const ID: &str = "/subscriptions/sub/resourceGroups/rg1/providers/Microsoft.ApiManagement/service/svc1";

    fn config() -> ApiManagementDataSourceState<'static> {
        ApiManagementDataSourceState {
            name: value_string("svc1"),
            resource_group_name: value_string("rg1"),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn read_service() {
        let (clients, transport) = clients();
        transport.insert(
            ID,
            json!({
                "id": ID,
                "name": "svc1",
                "location": "westeurope",
                "sku": {"name": "Developer", "capacity": 1},
                "tags": {"env": "test"},
                "properties": {
                    "publisherName": "Contoso",
                    "publisherEmail": "api@contoso.com",
                    "gatewayUrl": "https://svc1.azure-api.net",
                    "publicIPAddresses": ["20.1.2.3"]
                }
            }),
        );
        let data_source = ApiManagementDataSource::new(ClientHandle::configured(clients));
        let mut diags = Diagnostics::default();

        let state = data_source
            .read(&mut diags, config(), Default::default())
            .await
            .unwrap();
        assert_eq!(state.id.as_str(), ID);
        assert_eq!(state.sku_name.as_str(), "Developer_1");
        assert_eq!(state.gateway_url.as_str(), "https://svc1.azure-api.net");
        assert_eq!(state.portal_url, Value::Null);
        assert_eq!(
            state.public_ip_addresses,
            Value::Value(vec![value_string("20.1.2.3")])
        );
        assert_eq!(state.private_ip_addresses, Value::Value(vec![]));
        assert_eq!(
            state.tags.as_ref_option().and_then(|tags| tags.get("env")),
            Some(&value_string("test"))
        );
    }

    #[tokio::test]
    async fn missing_service_is_an_error() {
        let (clients, _) = clients();
        let data_source = ApiManagementDataSource::new(ClientHandle::configured(clients));
        let mut diags = Diagnostics::default();

        assert!(data_source
            .read(&mut diags, config(), Default::default())
            .await
            .is_none());
        assert_eq!(diags.errors.len(), 1);
    }
}
