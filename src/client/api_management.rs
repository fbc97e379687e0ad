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

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ids::{ApiManagementId, ApiManagementNamedValueId, ApiManagementProductId};

use super::{ApiError, Transport};

pub const API_VERSION: &str = "2021-08-01";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiManagementService {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<ServiceSku>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<ServiceProperties>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSku {
    pub name: String,
    pub capacity: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_sender_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_regional_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portal_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub developer_portal_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub management_api_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scm_url: Option<String>,
    #[serde(rename = "publicIPAddresses", skip_serializing_if = "Option::is_none")]
    pub public_ip_addresses: Option<Vec<String>>,
    #[serde(rename = "privateIPAddresses", skip_serializing_if = "Option::is_none")]
    pub private_ip_addresses: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<NamedValueProperties>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedValueProperties {
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<ProductProperties>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProductState {
    #[default]
    NotPublished,
    Published,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductProperties {
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terms: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscriptions_limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<ProductState>,
}

/// Service, named value and product operations of `Microsoft.ApiManagement`.
#[derive(Clone)]
pub struct ApiManagementClient {
    transport: Arc<dyn Transport>,
}

impl ApiManagementClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub async fn get_service(&self, id: &ApiManagementId) -> Result<ApiManagementService, ApiError> {
        super::get(self.transport.as_ref(), id.id(), API_VERSION).await
    }

    pub async fn get_named_value(
        &self,
        id: &ApiManagementNamedValueId,
    ) -> Result<NamedValue, ApiError> {
        super::get(self.transport.as_ref(), id.id(), API_VERSION).await
    }

    pub async fn create_or_update_named_value(
        &self,
        id: &ApiManagementNamedValueId,
        parameters: &NamedValue,
    ) -> Result<NamedValue, ApiError> {
        super::put(self.transport.as_ref(), id.id(), API_VERSION, parameters).await
    }

    pub async fn delete_named_value(&self, id: &ApiManagementNamedValueId) -> Result<(), ApiError> {
        super::delete(self.transport.as_ref(), id.id(), API_VERSION).await
    }

    pub async fn get_product(&self, id: &ApiManagementProductId) -> Result<Product, ApiError> {
        super::get(self.transport.as_ref(), id.id(), API_VERSION).await
    }

    pub async fn create_or_update_product(
        &self,
        id: &ApiManagementProductId,
        parameters: &Product,
    ) -> Result<Product, ApiError> {
        super::put(self.transport.as_ref(), id.id(), API_VERSION, parameters).await
    }

    pub async fn delete_product(&self, id: &ApiManagementProductId) -> Result<(), ApiError> {
        super::delete(self.transport.as_ref(), id.id(), API_VERSION).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn service_decodes_ip_addresses() {
        let service: ApiManagementService = serde_json::from_value(json!({
            "name": "svc1",
            "location": "westeurope",
            "sku": {"name": "Developer", "capacity": 1},
            "properties": {
                "publisherName": "Contoso",
                "gatewayUrl": "https://svc1.azure-api.net",
                "publicIPAddresses": ["20.1.2.3"]
            }
        }))
        .unwrap();
        let properties = service.properties.unwrap();
        assert_eq!(properties.public_ip_addresses, Some(vec!["20.1.2.3".to_owned()]));
        assert_eq!(properties.private_ip_addresses, None);
        assert_eq!(service.sku.unwrap().capacity, 1);
    }

    #[test]
    fn product_state_encoding() {
        let properties = ProductProperties {
            display_name: "Starter".to_owned(),
            state: Some(ProductState::NotPublished),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(properties).unwrap(),
            json!({"displayName": "Starter", "state": "notPublished"})
        );
    }
}
