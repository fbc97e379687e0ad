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

use super::define_resource_id;

define_resource_id! {
    /// An API Management Service.
    ApiManagementId, "API Management Service", "Microsoft.ApiManagement" {
        "service" => service_name,
    }
}

define_resource_id! {
    /// A Named Value inside an API Management Service.
    ApiManagementNamedValueId, "API Management Named Value", "Microsoft.ApiManagement" {
        "service" => service_name,
        "namedValues" => name,
    }
}

define_resource_id! {
    /// A Product inside an API Management Service.
    ApiManagementProductId, "API Management Product", "Microsoft.ApiManagement" {
        "service" => service_name,
        "products" => product_id,
    }
}

impl ApiManagementNamedValueId {
    pub fn service_id(&self) -> ApiManagementId {
        ApiManagementId::new(
            &self.subscription_id,
            &self.resource_group,
            &self.service_name,
        )
    }
}

impl ApiManagementProductId {
    pub fn service_id(&self) -> ApiManagementId {
        ApiManagementId::new(
            &self.subscription_id,
            &self.resource_group,
            &self.service_name,
        )
    }
}
