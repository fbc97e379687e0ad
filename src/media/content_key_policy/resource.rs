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
use tracing::{info, warn};

use tf_provider::schema::Schema;
use tf_provider::value::{Value, ValueEmpty};
use tf_provider::{AttributePath, Diagnostics, Resource};

use crate::client::media::ContentKeyPolicyProperties;
use crate::client::ClientHandle;
use crate::ids::ContentKeyPolicyId;
use crate::timeouts::{self, with_timeout, Operation};
use crate::utils::{
    force_new, report_api_error, report_id_error, report_translate_error, requires_import,
    value_string, WithNormalize, WithSchema, WithValidate,
};

use super::expand::expand_policy;
use super::flatten::flatten_policy;
use super::state::ContentKeyPolicyState;

const RESOURCE_TYPE: &str = "azurerm_media_content_key_policy";

/// Converts the remote policy, reporting a policy this provider cannot represent.
fn flatten<'a>(
    diags: &mut Diagnostics,
    id: &ContentKeyPolicyId,
    properties: &ContentKeyPolicyProperties,
    prior: &ContentKeyPolicyState<'a>,
) -> Option<ContentKeyPolicyState<'a>> {
    match flatten_policy(id, properties, prior) {
        Ok(state) => Some(state),
        Err(err) => {
            diags.root_error(
                "Failed reading Content Key Policy",
                format!("flattening {id}: {err}"),
            );
            None
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct ContentKeyPolicyResource {
    clients: ClientHandle,
}

impl ContentKeyPolicyResource {
    pub fn new(clients: ClientHandle) -> Self {
        Self { clients }
    }
}

#[async_trait]
impl Resource for ContentKeyPolicyResource {
    type State<'a> = Value<ContentKeyPolicyState<'a>>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(ContentKeyPolicyState::schema())
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
        let id = match ContentKeyPolicyId::parse(prior.id.as_str()) {
            Ok(id) => id,
            Err(err) => {
                report_id_error(diags, &err);
                return None;
            }
        };
        let timeout = timeouts::resolve(diags, &prior.timeouts, Operation::Read)?;

        let properties = clients.media.get_policy_properties_with_secrets(&id);
        match with_timeout(timeout, properties).await {
            Ok(properties) => {
                let state = flatten(diags, &id, &properties, prior)?;
                Some((Value::Value(state), private_state))
            }
            Err(err) if err.is_not_found() => {
                warn!(id = %id, "Content Key Policy was not found, removing from state");
                Some((Value::Null, private_state))
            }
            Err(err) => {
                report_api_error(diags, "retrieving Content Key Policy", &id, &err);
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
        diags: &mut Diagnostics,
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
        let mut proposed_state = proposed_state;
        let trigger_replace = match (&prior_state, &mut proposed_state) {
            (Value::Value(prior), Value::Value(proposed)) => {
                proposed.normalize(diags);
                force_new(&[
                    ("name", prior.name != proposed.name),
                    (
                        "resource_group_name",
                        prior.resource_group_name != proposed.resource_group_name,
                    ),
                    (
                        "media_services_account_name",
                        prior.media_services_account_name != proposed.media_services_account_name,
                    ),
                ])
            }
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
                "Planned state of a new content key policy must be known",
                AttributePath::default(),
            );
            return None;
        };
        let id = planned.resource_id(&clients.subscription_id);
        let timeout = timeouts::resolve(diags, &planned.timeouts, Operation::Create)?;
        let parameters = match expand_policy(planned) {
            Ok(parameters) => parameters,
            Err(err) => {
                report_translate_error(diags, &err);
                return None;
            }
        };
        let api = &clients.media;

        let _guard = clients.locks.lock(&id.id()).await;
        info!(id = %id, account = %id.account_id(), "Creating Content Key Policy");
        let result = with_timeout(timeout, async {
            match api.get_content_key_policy(&id).await {
                Ok(_) => return Ok(None),
                Err(err) if err.is_not_found() => (),
                Err(err) => return Err(err),
            }
            api.create_or_update_content_key_policy(&id, &parameters)
                .await?;
            api.get_policy_properties_with_secrets(&id).await.map(Some)
        })
        .await;

        match result {
            Ok(Some(properties)) => {
                let state = flatten(diags, &id, &properties, planned)?;
                Some((Value::Value(state), private_state))
            }
            Ok(None) => {
                requires_import(diags, RESOURCE_TYPE, &id);
                None
            }
            Err(err) => {
                report_api_error(diags, "creating Content Key Policy", &id, &err);
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
                "Planned state of an updated content key policy must be known",
                AttributePath::default(),
            );
            return None;
        };
        let id = match ContentKeyPolicyId::parse(planned.id.as_str()) {
            Ok(id) => id,
            Err(err) => {
                report_id_error(diags, &err);
                return None;
            }
        };
        let timeout = timeouts::resolve(diags, &planned.timeouts, Operation::Update)?;
        let parameters = match expand_policy(planned) {
            Ok(parameters) => parameters,
            Err(err) => {
                report_translate_error(diags, &err);
                return None;
            }
        };
        let api = &clients.media;

        let _guard = clients.locks.lock(&id.id()).await;
        let result = with_timeout(timeout, async {
            api.create_or_update_content_key_policy(&id, &parameters)
                .await?;
            api.get_policy_properties_with_secrets(&id).await
        })
        .await;

        match result {
            Ok(properties) => {
                let state = flatten(diags, &id, &properties, planned)?;
                Some((Value::Value(state), private_state))
            }
            Err(err) => {
                report_api_error(diags, "updating Content Key Policy", &id, &err);
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
        let id = match ContentKeyPolicyId::parse(state.id.as_str()) {
            Ok(id) => id,
            Err(err) => {
                report_id_error(diags, &err);
                return None;
            }
        };
        let timeout = timeouts::resolve(diags, &state.timeouts, Operation::Delete)?;

        let _guard = clients.locks.lock(&id.id()).await;
        match with_timeout(timeout, clients.media.delete_content_key_policy(&id)).await {
            Ok(()) => {
                info!(id = %id, "Deleted Content Key Policy");
                Some(())
            }
            Err(err) if err.is_not_found() => {
                info!(id = %id, "Content Key Policy was already deleted");
                Some(())
            }
            Err(err) => {
                report_api_error(diags, "deleting Content Key Policy", &id, &err);
                None
            }
        }
    }

    async fn import<'a>(
        &self,
        diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let id = match ContentKeyPolicyId::parse(&id) {
            Ok(id) => id,
            Err(err) => {
                report_id_error(diags, &err);
                return None;
            }
        };
        let state = ContentKeyPolicyState {
            id: value_string(id.id()),
            name: value_string(id.name),
            resource_group_name: value_string(id.resource_group),
            media_services_account_name: value_string(id.account_name),
            ..Default::default()
        };
        Some((Value::Value(state), Default::default()))
    }
}
