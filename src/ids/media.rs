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
    /// A Media Services account.
    MediaServicesAccountId, "Media Services Account", "Microsoft.Media" {
        "mediaservices" => account_name,
    }
}

define_resource_id! {
    /// A Content Key Policy of a Media Services account.
    ContentKeyPolicyId, "Content Key Policy", "Microsoft.Media" {
        "mediaservices" => account_name,
        "contentKeyPolicies" => name,
    }
}

impl ContentKeyPolicyId {
    pub fn account_id(&self) -> MediaServicesAccountId {
        MediaServicesAccountId::new(
            &self.subscription_id,
            &self.resource_group,
            &self.account_name,
        )
    }
}
