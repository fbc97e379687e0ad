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
use tf_provider::value::{Value, ValueEmpty, ValueList, ValueString};
use tf_provider::{map, AttributePath, Diagnostics, Resource};

use crate::client::api_management::{NamedValue, NamedValueProperties};
use crate::client::ClientHandle;
use crate::ids::ApiManagementNamedValueId;
use crate::timeouts::{self, with_timeout, Operation, TimeoutsState};
use crate::utils::{
    attribute, bool_content, force_new, report_api_error, report_id_error, requires_import,
    sensitive, string_content, value_string, WithNormalize, WithSchema, WithValidate,
};
use crate::validate::{self, check};

use super::flatten_flag;

const RESOURCE_TYPE: &str = "azurerm_api_management_named_value";

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedValueState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub name: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub resource_group_name: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub api_management_name: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub display_name: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub value: ValueString<'a>,
    pub secret: Value<bool>,
    #[serde(borrow = "'a")]
    pub tags: ValueList<ValueString<'a>>,
    #[serde(borrow = "'a")]
    pub timeouts: Value<TimeoutsState<'a>>,
}

impl<'a> NamedValueState<'a> {
    fn resource_id(&self, subscription_id: &str) -> ApiManagementNamedValueId {
        ApiManagementNamedValueId::new(
            subscription_id,
            self.resource_group_name.as_str(),
            self.api_management_name.as_str(),
            self.name.as_str(),
        )
    }
}

impl<'a> WithSchema for NamedValueState<'a> {
    fn schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                attributes: map! {
                    "id" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Computed,
                        "Resource ID of the named value",
                    ),
                    "name" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Required,
                        "Name of the named value (force new)",
                    ),
                    "resource_group_name" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Required,
                        "Resource group of the API Management service (force new)",
                    ),
                    "api_management_name" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Required,
                        "Name of the API Management service (force new)",
                    ),
                    "display_name" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Required,
                        "Display name, referenced from policies",
                    ),
                    "value" => sensitive(attribute(
                        AttributeType::String,
                        AttributeConstraint::Required,
                        "Value of the named value",
                    )),
                    "secret" => attribute(
                        AttributeType::Bool,
                        AttributeConstraint::Optional,
                        "Whether the value is a secret. Secret values are never returned by the API",
                    ),
                    "tags" => attribute(
                        AttributeType::List(Box::new(AttributeType::String)),
                        AttributeConstraint::Optional,
                        "Tags attached to the named value",
                    ),
                },
                blocks: map! {
                    "timeouts" => TimeoutsState::block(),
                },
                description: Description::plain("Named value of an API Management service"),
                ..Default::default()
            },
        }
    }
}

#[async_trait]
impl<'a> WithValidate for NamedValueState<'a> {
    async fn validate(&self, diags: &mut Diagnostics, attr_path: AttributePath) {
        let checks: [(&str, &ValueString, validate::Validator); 5] = [
            ("name", &self.name, validate::named_value_name),
            ("resource_group_name", &self.resource_group_name, validate::resource_group_name),
            ("api_management_name", &self.api_management_name, validate::api_management_name),
            ("display_name", &self.display_name, validate::named_value_name),
            ("value", &self.value, validate::not_empty),
        ];
        for (name, value, validator) in checks {
            check(diags, attr_path.clone().attribute(name), value, validator);
        }
        timeouts::validate(diags, &self.timeouts);
    }
}

impl<'a> WithNormalize for NamedValueState<'a> {
    fn normalize(&mut self, _diags: &mut Diagnostics) {
        if self.id.is_null() {
            self.id = Value::Unknown;
        }
    }
}

fn expand(state: &NamedValueState) -> NamedValue {
    NamedValue {
        properties: Some(NamedValueProperties {
            display_name: state.display_name.as_str().to_owned(),
            value: string_content(&state.value),
            secret: bool_content(&state.secret),
            tags: state.tags.as_ref_option().map(|tags| {
                tags.iter()
                    .filter_map(|tag| tag.as_deref_option().map(str::to_owned))
                    .collect()
            }),
        }),
        ..Default::default()
    }
}

/// Secret values are not returned by the API: the prior value is kept.
fn flatten<'a>(
    id: &ApiManagementNamedValueId,
    model: &NamedValue,
    prior: &NamedValueState<'a>,
) -> NamedValueState<'a> {
    let properties = model.properties.clone().unwrap_or_default();
    let value = match properties.value {
        Some(value) => value_string(value),
        None if properties.secret == Some(true) => prior.value.clone(),
        None => Value::Null,
    };

    NamedValueState {
        id: value_string(id.id()),
        name: value_string(id.name.as_str()),
        resource_group_name: value_string(id.resource_group.as_str()),
        api_management_name: value_string(id.service_name.as_str()),
        display_name: value_string(properties.display_name),
        value,
        secret: flatten_flag(&prior.secret, properties.secret),
        tags: properties
            .tags
            .map_or(Value::Null, |tags| Value::Value(tags.into_iter().map(value_string).collect())),
        timeouts: prior.timeouts.clone(),
    }
}

#[derive(Debug, Default, Clone)]
pub struct ApiManagementNamedValueResource {
    clients: ClientHandle,
}

impl ApiManagementNamedValueResource {
    pub fn new(clients: ClientHandle) -> Self {
        Self { clients }
    }
}

#[async_trait]
impl Resource for ApiManagementNamedValueResource {
    type State<'a> = Value<NamedValueState<'a>>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(NamedValueState::schema())
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
        let id = match ApiManagementNamedValueId::parse(prior.id.as_str()) {
            Ok(id) => id,
            Err(err) => {
                report_id_error(diags, &err);
                return None;
            }
        };
        let timeout = timeouts::resolve(diags, &prior.timeouts, Operation::Read)?;

        match with_timeout(timeout, clients.api_management.get_named_value(&id)).await {
            Ok(model) => Some((Value::Value(flatten(&id, &model, prior)), private_state)),
            Err(err) if err.is_not_found() => {
                warn!(id = %id, "API Management Named Value was not found, removing from state");
                Some((Value::Null, private_state))
            }
            Err(err) => {
                report_api_error(diags, "retrieving API Management Named Value", &id, &err);
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
                ("name", prior.name != proposed.name),
                (
                    "resource_group_name",
                    prior.resource_group_name != proposed.resource_group_name,
                ),
                (
                    "api_management_name",
                    prior.api_management_name != proposed.api_management_name,
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
                "Planned state of a new named value must be known",
                AttributePath::default(),
            );
            return None;
        };
        let id = planned.resource_id(&clients.subscription_id);
        let timeout = timeouts::resolve(diags, &planned.timeouts, Operation::Create)?;
        let parameters = expand(planned);
        let api = &clients.api_management;

        let _guard = clients.locks.lock(&id.id()).await;
        info!(id = %id, service = %id.service_id(), "Creating API Management Named Value");
        let result = with_timeout(timeout, async {
            match api.get_named_value(&id).await {
                Ok(_) => return Ok(None),
                Err(err) if err.is_not_found() => (),
                Err(err) => return Err(err),
            }
            api.create_or_update_named_value(&id, &parameters).await?;
            api.get_named_value(&id).await.map(Some)
        })
        .await;

        match result {
            Ok(Some(model)) => Some((Value::Value(flatten(&id, &model, planned)), private_state)),
            Ok(None) => {
                requires_import(diags, RESOURCE_TYPE, &id);
                None
            }
            Err(err) => {
                report_api_error(diags, "creating API Management Named Value", &id, &err);
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
                "Planned state of an updated named value must be known",
                AttributePath::default(),
            );
            return None;
        };
        let id = match ApiManagementNamedValueId::parse(planned.id.as_str()) {
            Ok(id) => id,
            Err(err) => {
                report_id_error(diags, &err);
                return None;
            }
        };
        let timeout = timeouts::resolve(diags, &planned.timeouts, Operation::Update)?;
        let parameters = expand(planned);
        let api = &clients.api_management;

        let _guard = clients.locks.lock(&id.id()).await;
        let result = with_timeout(timeout, async {
            api.create_or_update_named_value(&id, &parameters).await?;
            api.get_named_value(&id).await
        })
        .await;

        match result {
            Ok(model) => Some((Value::Value(flatten(&id, &model, planned)), private_state)),
            Err(err) => {
                report_api_error(diags, "updating API Management Named Value", &id, &err);
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
        let id = match ApiManagementNamedValueId::parse(state.id.as_str()) {
            Ok(id) => id,
            Err(err) => {
                report_id_error(diags, &err);
                return None;
            }
        };
        let timeout = timeouts::resolve(diags, &state.timeouts, Operation::Delete)?;

        let _guard = clients.locks.lock(&id.id()).await;
        match with_timeout(timeout, clients.api_management.delete_named_value(&id)).await {
            Ok(()) => {
                info!(id = %id, "Deleted API Management Named Value");
                Some(())
            }
            Err(err) if err.is_not_found() => {
                info!(id = %id, "API Management Named Value was already deleted");
                Some(())
            }
            Err(err) => {
                report_api_error(diags, "deleting API Management Named Value", &id, &err);
                None
            }
        }
    }

    async fn import<'a>(
        &self,
        diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let id = match ApiManagementNamedValueId::parse(&id) {
            Ok(id) => id,
            Err(err) => {
                report_id_error(diags, &err);
                return None;
            }
        };
        let state = NamedValueState {
            id: value_string(id.id()),
            name: value_string(id.name),
            resource_group_name: value_string(id.resource_group),
            api_management_name: value_string(id.service_name),
            ..Default::default()
        };
        Some((Value::Value(state), Default::default()))
    }
}
