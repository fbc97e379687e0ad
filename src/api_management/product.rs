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

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use tf_provider::schema::{AttributeConstraint, AttributeType, Block, Description, Schema};
use tf_provider::value::{Value, ValueEmpty, ValueNumber, ValueString};
use tf_provider::{map, AttributePath, Diagnostics, Resource};

use crate::client::api_management::{Product, ProductProperties, ProductState};
use crate::client::ClientHandle;
use crate::ids::ApiManagementProductId;
use crate::timeouts::{self, with_timeout, Operation, TimeoutsState};
use crate::utils::{
    attribute, bool_content, force_new, number_content, optional_number, optional_string,
    report_api_error, report_id_error, requires_import, string_content, value_string,
    WithNormalize, WithSchema, WithValidate,
};
use crate::validate::{self, check, check_range};

use super::flatten_flag;

const RESOURCE_TYPE: &str = "azurerm_api_management_product";

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductResourceState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub product_id: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub api_management_name: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub resource_group_name: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub display_name: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub description: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub terms: ValueString<'a>,
    pub subscription_required: Value<bool>,
    pub approval_required: Value<bool>,
    pub subscriptions_limit: ValueNumber,
    pub published: Value<bool>,
    #[serde(borrow = "'a")]
    pub timeouts: Value<TimeoutsState<'a>>,
}

impl<'a> ProductResourceState<'a> {
    fn resource_id(&self, subscription_id: &str) -> ApiManagementProductId {
        ApiManagementProductId::new(
            subscription_id,
            self.resource_group_name.as_str(),
            self.api_management_name.as_str(),
            self.product_id.as_str(),
        )
    }
}

impl<'a> WithSchema for ProductResourceState<'a> {
    fn schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                attributes: map! {
                    "id" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Computed,
                        "Resource ID of the product",
                    ),
                    "product_id" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Required,
                        "Identifier of the product (force new)",
                    ),
                    "api_management_name" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Required,
                        "Name of the API Management service (force new)",
                    ),
                    "resource_group_name" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Required,
                        "Resource group of the API Management service (force new)",
                    ),
                    "display_name" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Required,
                        "Display name of the product",
                    ),
                    "description" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Optional,
                        "Description of the product",
                    ),
                    "terms" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Optional,
                        "Terms of use presented to developers subscribing to the product",
                    ),
                    "subscription_required" => attribute(
                        AttributeType::Bool,
                        AttributeConstraint::Required,
                        "Whether a subscription is required to access the APIs of the product",
                    ),
                    "approval_required" => attribute(
                        AttributeType::Bool,
                        AttributeConstraint::Optional,
                        "Whether subscriptions must be approved by an administrator",
                    ),
                    "subscriptions_limit" => attribute(
                        AttributeType::Number,
                        AttributeConstraint::Optional,
                        "Maximum number of subscriptions a user can have to the product",
                    ),
                    "published" => attribute(
                        AttributeType::Bool,
                        AttributeConstraint::Required,
                        "Whether the product is published",
                    ),
                },
                blocks: map! {
                    "timeouts" => TimeoutsState::block(),
                },
                description: Description::plain("Product of an API Management service"),
                ..Default::default()
            },
        }
    }
}

#[async_trait]
impl<'a> WithValidate for ProductResourceState<'a> {
    async fn validate(&self, diags: &mut Diagnostics, attr_path: AttributePath) {
        let checks: [(&str, &ValueString, validate::Validator); 4] = [
            ("product_id", &self.product_id, validate::product_id),
            ("api_management_name", &self.api_management_name, validate::api_management_name),
            ("resource_group_name", &self.resource_group_name, validate::resource_group_name),
            ("display_name", &self.display_name, validate::not_empty),
        ];
        for (name, value, validator) in checks {
            check(diags, attr_path.clone().attribute(name), value, validator);
        }
        check_range(
            diags,
            attr_path.clone().attribute("subscriptions_limit"),
            &self.subscriptions_limit,
            0,
            i64::MAX,
        );

        if self.subscription_required == Value::Value(false) {
            if self.approval_required == Value::Value(true) {
                diags.error_short(
                    "`approval_required` can only be set when `subscription_required` is true",
                    attr_path.clone().attribute("approval_required"),
                );
            }
            if self.subscriptions_limit.as_ref_option().is_some() {
                diags.error_short(
                    "`subscriptions_limit` can only be set when `subscription_required` is true",
                    attr_path.clone().attribute("subscriptions_limit"),
                );
            }
        }
        timeouts::validate(diags, &self.timeouts);
    }
}

impl<'a> WithNormalize for ProductResourceState<'a> {
    fn normalize(&mut self, _diags: &mut Diagnostics) {
        if self.id.is_null() {
            self.id = Value::Unknown;
        }
    }
}

fn expand(state: &ProductResourceState) -> Product {
    let subscription_required = bool_content(&state.subscription_required);
    let subscribed = subscription_required == Some(true);

    Product {
        properties: Some(ProductProperties {
            display_name: state.display_name.as_str().to_owned(),
            description: string_content(&state.description),
            terms: string_content(&state.terms),
            subscription_required,
            approval_required: bool_content(&state.approval_required).filter(|_| subscribed),
            subscriptions_limit: number_content(&state.subscriptions_limit).filter(|_| subscribed),
            state: Some(if state.published == Value::Value(true) {
                ProductState::Published
            } else {
                ProductState::NotPublished
            }),
        }),
        ..Default::default()
    }
}

fn flatten<'a>(
    id: &ApiManagementProductId,
    model: &Product,
    prior: &ProductResourceState<'a>,
) -> ProductResourceState<'a> {
    let properties = model.properties.clone().unwrap_or_default();

    ProductResourceState {
        id: value_string(id.id()),
        product_id: value_string(id.product_id.as_str()),
        api_management_name: value_string(id.service_name.as_str()),
        resource_group_name: value_string(id.resource_group.as_str()),
        display_name: value_string(properties.display_name),
        description: optional_string(properties.description),
        terms: optional_string(properties.terms),
        subscription_required: Value::Value(properties.subscription_required.unwrap_or(false)),
        approval_required: flatten_flag(&prior.approval_required, properties.approval_required),
        subscriptions_limit: optional_number(properties.subscriptions_limit),
        published: Value::Value(properties.state == Some(ProductState::Published)),
        timeouts: prior.timeouts.clone(),
    }
}

#[derive(Debug, Default, Clone)]
pub struct ApiManagementProductResource {
    clients: ClientHandle,
}

impl ApiManagementProductResource {
    pub fn new(clients: ClientHandle) -> Self {
        Self { clients }
    }
}

#[async_trait]
impl Resource for ApiManagementProductResource {
    type State<'a> = Value<ProductResourceState<'a>>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(ProductResourceState::schema())
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::State<'a>) -> Option<()> {
        if let Value::Value(config) = &config {
            config.validate(diags, AttributePath::default()).await;
        }

        if diags.errors.is_empty() {
            Some(())
        } else {
            None
        }
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        state: Self::State<'a>,
        private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let Value::Value(prior) = &state else {
            return Some((state, private_state));
        };
        let clients = self.clients.get(diags)?;
        let id = match ApiManagementProductId::parse(prior.id.as_str()) {
            Ok(id) => id,
            Err(err) => {
                report_id_error(diags, &err);
                return None;
            }
        };
        let timeout = timeouts::resolve(diags, &prior.timeouts, Operation::Read)?;

        match with_timeout(timeout, clients.api_management.get_product(&id)).await {
            Ok(model) => Some((Value::Value(flatten(&id, &model, prior)), private_state)),
            Err(err) if err.is_not_found() => {
                warn!(id = %id, "API Management Product was not found, removing from state");
                Some((Value::Null, private_state))
            }
            Err(err) => {
                report_api_error(diags, "retrieving API Management Product", &id, &err);
                None
            }
        }
    }

    async fn plan_create<'a>(
        &self,
        diags: &mut Diagnostics,
        proposed_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let mut state = proposed_state;
        if let Value::Value(state) = &mut state {
            state.normalize(diags);
        }
        Some((state, Default::default()))
    }

    async fn plan_update<'a>(
        &self,
        _diags: &mut Diagnostics,
        prior_state: Self::State<'a>,
        proposed_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        prior_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(
        Self::State<'a>,
        Self::PrivateState<'a>,
        Vec<AttributePath>,
    )> {
        let trigger_replace = match (&prior_state, &proposed_state) {
            (Value::Value(prior), Value::Value(proposed)) => force_new(&[
                ("product_id", prior.product_id != proposed.product_id),
                (
                    "api_management_name",
                    prior.api_management_name != proposed.api_management_name,
                ),
                (
                    "resource_group_name",
                    prior.resource_group_name != proposed.resource_group_name,
                ),
            ]),
            _ => Vec::new(),
        };
        Some((proposed_state, prior_private_state, trigger_replace))
    }

    async fn plan_destroy<'a>(
        &self,
        _diags: &mut Diagnostics,
        _prior_state: Self::State<'a>,
        prior_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::PrivateState<'a>> {
        Some(prior_private_state)
    }

    async fn create<'a>(
        &self,
        diags: &mut Diagnostics,
        planned_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let clients = self.clients.get(diags)?;
        let Value::Value(planned) = &planned_state else {
            diags.error_short(
                "Planned state of a new product must be known",
                AttributePath::default(),
            );
            return None;
        };
        let id = planned.resource_id(&clients.subscription_id);
        let timeout = timeouts::resolve(diags, &planned.timeouts, Operation::Create)?;
        let parameters = expand(planned);
        let api = &clients.api_management;

        info!(id = %id, service = %id.service_id(), "Creating API Management Product");
        let result = with_timeout(timeout, async {
            match api.get_product(&id).await {
                Ok(_) => return Ok(None),
                Err(err) if err.is_not_found() => (),
                Err(err) => return Err(err),
            }
            api.create_or_update_product(&id, &parameters).await?;
            api.get_product(&id).await.map(Some)
        })
        .await;

        match result {
            Ok(Some(model)) => Some((Value::Value(flatten(&id, &model, planned)), private_state)),
            Ok(None) => {
                requires_import(diags, RESOURCE_TYPE, &id);
                None
            }
            Err(err) => {
                report_api_error(diags, "creating API Management Product", &id, &err);
                None
            }
        }
    }

    async fn update<'a>(
        &self,
        diags: &mut Diagnostics,
        _prior_state: Self::State<'a>,
        planned_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let clients = self.clients.get(diags)?;
        let Value::Value(planned) = &planned_state else {
            diags.error_short(
                "Planned state of an updated product must be known",
                AttributePath::default(),
            );
            return None;
        };
        let id = match ApiManagementProductId::parse(planned.id.as_str()) {
            Ok(id) => id,
            Err(err) => {
                report_id_error(diags, &err);
                return None;
            }
        };
        let timeout = timeouts::resolve(diags, &planned.timeouts, Operation::Update)?;
        let parameters = expand(planned);
        let api = &clients.api_management;

        let result = with_timeout(timeout, async {
            api.create_or_update_product(&id, &parameters).await?;
            api.get_product(&id).await
        })
        .await;

        match result {
            Ok(model) => Some((Value::Value(flatten(&id, &model, planned)), private_state)),
            Err(err) => {
                report_api_error(diags, "updating API Management Product", &id, &err);
                None
            }
        }
    }

    async fn destroy<'a>(
        &self,
        diags: &mut Diagnostics,
        state: Self::State<'a>,
        _planned_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<()> {
        let Value::Value(state) = &state else {
            return Some(());
        };
        let clients = self.clients.get(diags)?;
        let id = match ApiManagementProductId::parse(state.id.as_str()) {
            Ok(id) => id,
            Err(err) => {
                report_id_error(diags, &err);
                return None;
            }
        };
        let timeout = timeouts::resolve(diags, &state.timeouts, Operation::Delete)?;

        match with_timeout(timeout, clients.api_management.delete_product(&id)).await {
            Ok(()) => {
                info!(id = %id, "Deleted API Management Product");
                Some(())
            }
            Err(err) if err.is_not_found() => Some(()),
            Err(err) => {
                report_api_error(diags, "deleting API Management Product", &id, &err);
                None
            }
        }
    }

    async fn import<'a>(
        &self,
        diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let id = match ApiManagementProductId::parse(&id) {
            Ok(id) => id,
            Err(err) => {
                report_id_error(diags, &err);
                return None;
            }
        };
        let state = ProductResourceState {
            id: value_string(id.id()),
            product_id: value_string(id.product_id),
            api_management_name: value_string(id.service_name),
            resource_group_name: value_string(id.resource_group),
            ..Default::default()
        };
        Some((Value::Value(state), Default::default()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::client::memory::clients;
    use crate::client::Method;

    const ID: &str = "/subscriptions/sub/resourceGroups/rg1/providers/Microsoft.ApiManagement/service/svc1/products/starter";

    fn planned() -> ProductResourceState<'static> {
        ProductResourceState {
            id: Value::Unknown,
            product_id: value_string("starter"),
            api_management_name: value_string("svc1"),
            resource_group_name: value_string("rg1"),
            display_name: value_string("Starter"),
            description: value_string("Entry level"),
            terms: Value::Null,
            subscription_required: Value::Value(true),
            approval_required: Value::Value(true),
            subscriptions_limit: Value::Value(2),
            published: Value::Value(true),
            timeouts: Value::Null,
        }
    }

    #[test]
    fn expand_flatten_inverse() {
        let mut state = planned();
        state.id = value_string(ID);
        let id = ApiManagementProductId::parse(ID).unwrap();
        assert_eq!(flatten(&id, &expand(&state), &state), state);
    }

    #[test]
    fn expand_without_subscription() {
        let state = ProductResourceState {
            display_name: value_string("Open"),
            subscription_required: Value::Value(false),
            published: Value::Value(false),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(expand(&state)).unwrap(),
            json!({"properties": {
                "displayName": "Open",
                "subscriptionRequired": false,
                "state": "notPublished"
            }})
        );
    }

    #[tokio::test]
    async fn approval_requires_subscription() {
        let resource = ApiManagementProductResource::default();
        let mut diags = Diagnostics::default();
        let mut config = planned();
        config.subscription_required = Value::Value(false);
        assert!(resource
            .validate(&mut diags, Value::Value(config))
            .await
            .is_none());
        assert_eq!(diags.errors.len(), 2);
    }

    #[tokio::test]
    async fn create_read_destroy() {
        let (clients, transport) = clients();
        let resource = ApiManagementProductResource::new(ClientHandle::configured(clients));
        let mut diags = Diagnostics::default();

        let (state, _) = resource
            .create(
                &mut diags,
                Value::Value(planned()),
                Value::Null,
                Default::default(),
                Default::default(),
            )
            .await
            .unwrap();
        let mut expected = planned();
        expected.id = value_string(ID);
        assert_eq!(state, Value::Value(expected));

        let (read, _) = resource
            .read(&mut diags, state.clone(), Default::default(), Default::default())
            .await
            .unwrap();
        assert_eq!(read, state);

        // an imported product reads back the same state
        let (imported, _) = resource.import(&mut diags, ID.to_owned()).await.unwrap();
        assert_eq!(
            imported.as_ref_option().unwrap().product_id.as_str(),
            "starter"
        );
        let (read, _) = resource
            .read(&mut diags, imported, Default::default(), Default::default())
            .await
            .unwrap();
        assert_eq!(read, state);

        resource
            .destroy(&mut diags, state.clone(), Default::default(), Default::default())
            .await
            .unwrap();
        assert!(transport.object(ID).is_none());

        let (read, _) = resource
            .read(&mut diags, state.clone(), Default::default(), Default::default())
            .await
            .unwrap();
        assert!(read.is_null());
        resource
            .destroy(&mut diags, state, Default::default(), Default::default())
            .await
            .unwrap();
        assert!(diags.errors.is_empty());

        assert!(resource
            .import(&mut diags, "/subscriptions/sub/resourceGroups/rg1".to_owned())
            .await
            .is_none());
    }

    #[tokio::test]
    async fn create_then_drift() {
        let (clients, transport) = clients();
        let resource = ApiManagementProductResource::new(ClientHandle::configured(clients));
        let mut diags = Diagnostics::default();

        let (state, _) = resource
            .create(
                &mut diags,
                Value::Value(planned()),
                Value::Null,
                Default::default(),
                Default::default(),
            )
            .await
            .unwrap();
        assert_eq!(transport.count(Method::Put), 1);

        let mut object = transport.object(ID).unwrap();
        object["properties"]["state"] = json!("notPublished");
        transport.insert(ID, object);

        let (read, _) = resource
            .read(&mut diags, state, Default::default(), Default::default())
            .await
            .unwrap();
        assert_eq!(read.as_ref_option().unwrap().published, Value::Value(false));
        assert!(diags.errors.is_empty());
    }
}
