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

//! `Microsoft.Media` content key policies.
//!
//! Polymorphic members are tagged by `@odata.type` on the wire and map to
//! internally tagged enums here.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ids::ContentKeyPolicyId;

use super::{ApiError, Transport};

pub const API_VERSION: &str = "2021-11-01";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentKeyPolicy {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<ContentKeyPolicyProperties>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentKeyPolicyProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub options: Vec<ContentKeyPolicyOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentKeyPolicyOption {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_option_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub configuration: ContentKeyPolicyConfiguration,
    pub restriction: ContentKeyPolicyRestriction,
}

/// How the key is delivered to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@odata.type")]
pub enum ContentKeyPolicyConfiguration {
    #[serde(rename = "#Microsoft.Media.ContentKeyPolicyClearKeyConfiguration")]
    ClearKey,
    #[serde(
        rename = "#Microsoft.Media.ContentKeyPolicyWidevineConfiguration",
        rename_all = "camelCase"
    )]
    Widevine { widevine_template: String },
    #[serde(rename = "#Microsoft.Media.ContentKeyPolicyFairPlayConfiguration")]
    FairPlay(FairPlayConfiguration),
    #[serde(rename = "#Microsoft.Media.ContentKeyPolicyPlayReadyConfiguration")]
    PlayReady(PlayReadyConfiguration),
    /// Any type this provider does not model.
    #[serde(rename = "#Microsoft.Media.ContentKeyPolicyUnknownConfiguration", other)]
    Unknown,
}

impl ContentKeyPolicyConfiguration {
    pub fn type_name(&self) -> &'static str {
        match self {
            ContentKeyPolicyConfiguration::ClearKey => "ContentKeyPolicyClearKeyConfiguration",
            ContentKeyPolicyConfiguration::Widevine { .. } => {
                "ContentKeyPolicyWidevineConfiguration"
            }
            ContentKeyPolicyConfiguration::FairPlay(_) => "ContentKeyPolicyFairPlayConfiguration",
            ContentKeyPolicyConfiguration::PlayReady(_) => {
                "ContentKeyPolicyPlayReadyConfiguration"
            }
            ContentKeyPolicyConfiguration::Unknown => "ContentKeyPolicyUnknownConfiguration",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FairPlayConfiguration {
    /// Application secret key, base64 encoded bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ask: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fair_play_pfx_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fair_play_pfx: Option<String>,
    pub rental_and_lease_key_type: String,
    pub rental_duration: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offline_rental_configuration: Option<OfflineRentalConfiguration>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfflineRentalConfiguration {
    pub playback_duration_seconds: i64,
    pub storage_duration_seconds: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayReadyConfiguration {
    pub licenses: Vec<PlayReadyLicense>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_custom_data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayReadyLicense {
    pub allow_test_devices: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub begin_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative_begin_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative_expiration_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grace_period: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub play_right: Option<PlayReadyPlayRight>,
    pub license_type: String,
    pub content_key_location: PlayReadyContentKeyLocation,
    pub content_type: String,
}

/// Where the PlayReady client finds the content key identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@odata.type")]
pub enum PlayReadyContentKeyLocation {
    #[serde(rename = "#Microsoft.Media.ContentKeyPolicyPlayReadyContentEncryptionKeyFromHeader")]
    FromHeader,
    #[serde(
        rename = "#Microsoft.Media.ContentKeyPolicyPlayReadyContentEncryptionKeyFromKeyIdentifier",
        rename_all = "camelCase"
    )]
    FromKeyIdentifier { key_id: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayReadyPlayRight {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_play_expiration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scms_restriction: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agc_and_color_stripe_restriction: Option<i64>,
    pub digital_video_only_content_restriction: bool,
    pub image_constraint_for_analog_component_video_restriction: bool,
    pub image_constraint_for_analog_computer_monitor_restriction: bool,
    pub allow_passing_video_content_to_unknown_output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uncompressed_digital_video_opl: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uncompressed_digital_audio_opl: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analog_video_opl: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compressed_digital_audio_opl: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compressed_digital_video_opl: Option<i64>,
}

/// Who may obtain the key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@odata.type")]
pub enum ContentKeyPolicyRestriction {
    #[serde(rename = "#Microsoft.Media.ContentKeyPolicyOpenRestriction")]
    Open,
    #[serde(rename = "#Microsoft.Media.ContentKeyPolicyTokenRestriction")]
    Token(TokenRestriction),
    /// Any type this provider does not model.
    #[serde(rename = "#Microsoft.Media.ContentKeyPolicyUnknownRestriction", other)]
    Unknown,
}

impl ContentKeyPolicyRestriction {
    pub fn type_name(&self) -> &'static str {
        match self {
            ContentKeyPolicyRestriction::Open => "ContentKeyPolicyOpenRestriction",
            ContentKeyPolicyRestriction::Token(_) => "ContentKeyPolicyTokenRestriction",
            ContentKeyPolicyRestriction::Unknown => "ContentKeyPolicyUnknownRestriction",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRestriction {
    pub issuer: String,
    pub audience: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_verification_key: Option<TokenKey>,
    #[serde(default)]
    pub alternate_verification_keys: Vec<TokenKey>,
    #[serde(default)]
    pub required_claims: Vec<TokenClaim>,
    pub restriction_token_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_id_connect_discovery_document: Option<String>,
}

/// Key used to verify tokens. Byte fields are base64 encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "@odata.type")]
pub enum TokenKey {
    #[serde(
        rename = "#Microsoft.Media.ContentKeyPolicySymmetricTokenKey",
        rename_all = "camelCase"
    )]
    Symmetric {
        #[serde(default)]
        key_value: String,
    },
    #[serde(rename = "#Microsoft.Media.ContentKeyPolicyRsaTokenKey")]
    Rsa {
        #[serde(default)]
        exponent: String,
        #[serde(default)]
        modulus: String,
    },
    #[serde(
        rename = "#Microsoft.Media.ContentKeyPolicyX509CertificateTokenKey",
        rename_all = "camelCase"
    )]
    X509Certificate {
        #[serde(default)]
        raw_body: String,
    },
    #[serde(rename = "#Microsoft.Media.ContentKeyPolicyUnknownTokenKey", other)]
    Unknown,
}

impl TokenKey {
    pub fn type_name(&self) -> &'static str {
        match self {
            TokenKey::Symmetric { .. } => "ContentKeyPolicySymmetricTokenKey",
            TokenKey::Rsa { .. } => "ContentKeyPolicyRsaTokenKey",
            TokenKey::X509Certificate { .. } => "ContentKeyPolicyX509CertificateTokenKey",
            TokenKey::Unknown => "ContentKeyPolicyUnknownTokenKey",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenClaim {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claim_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claim_value: Option<String>,
}

#[derive(Clone)]
pub struct MediaClient {
    transport: Arc<dyn Transport>,
}

impl MediaClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub async fn get_content_key_policy(
        &self,
        id: &ContentKeyPolicyId,
    ) -> Result<ContentKeyPolicy, ApiError> {
        super::get(self.transport.as_ref(), id.id(), API_VERSION).await
    }

    /// Same as the policy properties of a GET, with the secret fields filled in.
    pub async fn get_policy_properties_with_secrets(
        &self,
        id: &ContentKeyPolicyId,
    ) -> Result<ContentKeyPolicyProperties, ApiError> {
        super::post(
            self.transport.as_ref(),
            format!("{}/getPolicyPropertiesWithSecrets", id.id()),
            API_VERSION,
        )
        .await
    }

    pub async fn create_or_update_content_key_policy(
        &self,
        id: &ContentKeyPolicyId,
        parameters: &ContentKeyPolicy,
    ) -> Result<ContentKeyPolicy, ApiError> {
        super::put(self.transport.as_ref(), id.id(), API_VERSION, parameters).await
    }

    pub async fn delete_content_key_policy(&self, id: &ContentKeyPolicyId) -> Result<(), ApiError> {
        super::delete(self.transport.as_ref(), id.id(), API_VERSION).await
    }
}
