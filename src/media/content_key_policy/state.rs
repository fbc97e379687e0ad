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

use serde::{Deserialize, Serialize};

use tf_provider::schema::{
    Attribute, AttributeConstraint, AttributeType, Block, Description, NestedBlock, Schema,
};
use tf_provider::value::{Value, ValueList, ValueNumber, ValueString};
use tf_provider::{map, Diagnostics};

use crate::ids::ContentKeyPolicyId;
use crate::timeouts::TimeoutsState;
use crate::utils::{attribute, sensitive, WithNormalize, WithSchema};

fn string(constraint: AttributeConstraint, description: &str) -> Attribute {
    attribute(AttributeType::String, constraint, description)
}

fn number(constraint: AttributeConstraint, description: &str) -> Attribute {
    attribute(AttributeType::Number, constraint, description)
}

fn flag(constraint: AttributeConstraint, description: &str) -> Attribute {
    attribute(AttributeType::Bool, constraint, description)
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentKeyPolicyState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub name: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub resource_group_name: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub media_services_account_name: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub description: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub policy_option: ValueList<Value<PolicyOptionState<'a>>>,
    #[serde(borrow = "'a")]
    pub timeouts: Value<TimeoutsState<'a>>,
}

impl<'a> ContentKeyPolicyState<'a> {
    pub fn resource_id(&self, subscription_id: &str) -> ContentKeyPolicyId {
        ContentKeyPolicyId::new(
            subscription_id,
            self.resource_group_name.as_str(),
            self.media_services_account_name.as_str(),
            self.name.as_str(),
        )
    }
}

/// One `policy_option` block: exactly one configuration and one restriction.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyOptionState<'a> {
    #[serde(borrow = "'a")]
    pub name: ValueString<'a>,
    pub clear_key_configuration_enabled: Value<bool>,
    #[serde(borrow = "'a")]
    pub widevine_configuration_template: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub fairplay_configuration: Value<FairPlayState<'a>>,
    #[serde(borrow = "'a")]
    pub playready_configuration_license: ValueList<Value<PlayReadyLicenseState<'a>>>,
    #[serde(borrow = "'a")]
    pub playready_response_custom_data: ValueString<'a>,
    pub open_restriction_enabled: Value<bool>,
    #[serde(borrow = "'a")]
    pub token_restriction: Value<TokenRestrictionState<'a>>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FairPlayState<'a> {
    /// Application secret key, hexadecimal.
    #[serde(borrow = "'a")]
    pub ask: ValueString<'a>,
    /// Base64 encoded PKCS 12 certificate.
    #[serde(borrow = "'a")]
    pub pfx: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub pfx_password: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub rental_and_lease_key_type: ValueString<'a>,
    pub rental_duration_seconds: ValueNumber,
    pub offline_rental_configuration: Value<OfflineRentalState>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfflineRentalState {
    pub playback_duration_seconds: ValueNumber,
    pub storage_duration_seconds: ValueNumber,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayReadyLicenseState<'a> {
    pub allow_test_devices: Value<bool>,
    #[serde(borrow = "'a")]
    pub begin_date: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub expiration_date: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub relative_begin_date: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub relative_expiration_date: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub grace_period: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub security_level: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub license_type: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub content_type: ValueString<'a>,
    pub content_key_location_from_header_enabled: Value<bool>,
    #[serde(borrow = "'a")]
    pub content_key_location_from_key_id: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub play_right: Value<PlayRightState<'a>>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayRightState<'a> {
    #[serde(borrow = "'a")]
    pub first_play_expiration: ValueString<'a>,
    pub scms_restriction: ValueNumber,
    pub agc_and_color_stripe_restriction: ValueNumber,
    pub digital_video_only_content_restriction: Value<bool>,
    pub image_constraint_for_analog_component_video_restriction: Value<bool>,
    pub image_constraint_for_analog_computer_monitor_restriction: Value<bool>,
    #[serde(borrow = "'a")]
    pub allow_passing_video_content_to_unknown_output: ValueString<'a>,
    pub uncompressed_digital_video_opl: ValueNumber,
    pub uncompressed_digital_audio_opl: ValueNumber,
    pub analog_video_opl: ValueNumber,
    pub compressed_digital_audio_opl: ValueNumber,
    pub compressed_digital_video_opl: ValueNumber,
}

/// Token restriction with its verification keys.
///
/// The primary key is given inline with the `primary_` attributes, at most
/// one kind of them; every `alternate_key` block holds exactly one key.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRestrictionState<'a> {
    #[serde(borrow = "'a")]
    pub issuer: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub audience: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub token_type: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub open_id_connect_discovery_document: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub primary_symmetric_token_key: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub primary_rsa_token_key_exponent: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub primary_rsa_token_key_modulus: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub primary_x509_token_key_raw: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub alternate_key: ValueList<Value<TokenKeyState<'a>>>,
    #[serde(borrow = "'a")]
    pub required_claim: ValueList<Value<RequiredClaimState<'a>>>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenKeyState<'a> {
    #[serde(borrow = "'a")]
    pub symmetric_token_key: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub rsa_token_key_exponent: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub rsa_token_key_modulus: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub x509_token_key_raw: ValueString<'a>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredClaimState<'a> {
    #[serde(borrow = "'a", rename = "type")]
    pub claim_type: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub value: ValueString<'a>,
}

impl<'a> WithSchema for ContentKeyPolicyState<'a> {
    fn schema() -> Schema {
        use AttributeConstraint::{Computed, Optional, Required};

        Schema {
            version: 1,
            block: Block {
                attributes: map! {
                    "id" => string(Computed, "Resource ID of the content key policy"),
                    "name" => string(Required, "Name of the content key policy (force new)"),
                    "resource_group_name" => string(
                        Required,
                        "Resource group of the Media Services account (force new)",
                    ),
                    "media_services_account_name" => string(
                        Required,
                        "Name of the Media Services account (force new)",
                    ),
                    "description" => string(Optional, "Description of the policy"),
                },
                blocks: map! {
                    "policy_option" => PolicyOptionState::block(),
                    "timeouts" => TimeoutsState::block(),
                },
                description: Description::plain("Content key policy of a Media Services account"),
                ..Default::default()
            },
        }
    }
}

impl<'a> PolicyOptionState<'a> {
    fn block() -> NestedBlock {
        use AttributeConstraint::{Optional, Required};

        NestedBlock::List(Block {
            attributes: map! {
                "name" => string(Required, "Name of the policy option"),
                "clear_key_configuration_enabled" => flag(
                    Optional,
                    "Deliver the key in clear, to be used with AES-128 envelope encryption",
                ),
                "widevine_configuration_template" => string(
                    Optional,
                    "Widevine template, as a JSON document",
                ),
                "playready_response_custom_data" => string(
                    Optional,
                    "Custom data returned to the PlayReady client",
                ),
                "open_restriction_enabled" => flag(
                    Optional,
                    "Deliver the key without any token",
                ),
            },
            blocks: map! {
                "fairplay_configuration" => FairPlayState::block(),
                "playready_configuration_license" => PlayReadyLicenseState::block(),
                "token_restriction" => TokenRestrictionState::block(),
            },
            description: Description::plain(
                "Key delivery option: one configuration and one restriction",
            ),
            ..Default::default()
        })
    }
}

impl<'a> FairPlayState<'a> {
    fn block() -> NestedBlock {
        use AttributeConstraint::{Optional, Required};

        NestedBlock::Optional(Block {
            attributes: map! {
                "ask" => sensitive(string(Optional, "Application secret key, 32 hexadecimal characters")),
                "pfx" => sensitive(string(Optional, "Base64 encoded FairPlay certificate (PKCS 12)")),
                "pfx_password" => sensitive(string(Optional, "Password of the FairPlay certificate")),
                "rental_and_lease_key_type" => string(
                    Required,
                    "One of `DualExpiry`, `PersistentLimited`, `PersistentUnlimited` or `Undefined`",
                ),
                "rental_duration_seconds" => number(Required, "Rental duration, in seconds"),
            },
            blocks: map! {
                "offline_rental_configuration" => OfflineRentalState::block(),
            },
            description: Description::plain("FairPlay key delivery"),
            ..Default::default()
        })
    }
}

impl OfflineRentalState {
    fn block() -> NestedBlock {
        use AttributeConstraint::Required;

        NestedBlock::Optional(Block {
            attributes: map! {
                "playback_duration_seconds" => number(Required, "Playback duration, in seconds"),
                "storage_duration_seconds" => number(Required, "Storage duration, in seconds"),
            },
            description: Description::plain("Offline rental policy"),
            ..Default::default()
        })
    }
}

impl<'a> PlayReadyLicenseState<'a> {
    fn block() -> NestedBlock {
        use AttributeConstraint::{Optional, OptionalComputed, Required};

        NestedBlock::List(Block {
            attributes: map! {
                "allow_test_devices" => flag(
                    OptionalComputed,
                    "Whether test devices may use the license (default: false)",
                ),
                "begin_date" => string(Optional, "RFC 3339 date the license becomes valid"),
                "expiration_date" => string(Optional, "RFC 3339 date the license expires"),
                "relative_begin_date" => string(Optional, "Delay before the license becomes valid, like `PT1H`"),
                "relative_expiration_date" => string(Optional, "Validity of the license, like `P1D`"),
                "grace_period" => string(Optional, "Grace period of the license, like `PT1H`"),
                "security_level" => string(Optional, "One of `SL150`, `SL2000` or `SL3000`"),
                "license_type" => string(Required, "One of `NonPersistent` or `Persistent`"),
                "content_type" => string(
                    Required,
                    "One of `Ultraviolet`, `UltraVioletDownload`, `UltraVioletStreaming` or `Unspecified`",
                ),
                "content_key_location_from_header_enabled" => flag(
                    Optional,
                    "The content key identifier is in the PlayReady header",
                ),
                "content_key_location_from_key_id" => string(
                    Optional,
                    "Content key identifier, a UUID",
                ),
            },
            blocks: map! {
                "play_right" => PlayRightState::block(),
            },
            description: Description::plain("PlayReady license template"),
            ..Default::default()
        })
    }
}

impl<'a> PlayRightState<'a> {
    fn block() -> NestedBlock {
        use AttributeConstraint::{Optional, OptionalComputed, Required};

        NestedBlock::Optional(Block {
            attributes: map! {
                "first_play_expiration" => string(Optional, "Validity after the first play, like `PT1H`"),
                "scms_restriction" => number(Optional, "Serial copy management restriction, 0 to 3"),
                "agc_and_color_stripe_restriction" => number(
                    Optional,
                    "Automatic gain control and color stripe restriction, 0 to 3",
                ),
                "digital_video_only_content_restriction" => flag(OptionalComputed, "Restrict to digital video outputs"),
                "image_constraint_for_analog_component_video_restriction" => flag(
                    OptionalComputed,
                    "Constrain the resolution on analog component outputs",
                ),
                "image_constraint_for_analog_computer_monitor_restriction" => flag(
                    OptionalComputed,
                    "Constrain the resolution on analog computer monitor outputs",
                ),
                "allow_passing_video_content_to_unknown_output" => string(
                    Required,
                    "One of `Allowed`, `AllowedWithVideoConstriction` or `NotAllowed`",
                ),
                "uncompressed_digital_video_opl" => number(Optional, "Output protection level, 100, 250, 270 or 300"),
                "uncompressed_digital_audio_opl" => number(Optional, "Output protection level, 100, 150, 250 or 300"),
                "analog_video_opl" => number(Optional, "Output protection level, 100, 150 or 200"),
                "compressed_digital_audio_opl" => number(Optional, "Output protection level, 100, 150, 200, 250 or 300"),
                "compressed_digital_video_opl" => number(Optional, "Output protection level, 400 or 500"),
            },
            description: Description::plain("Rights of the PlayReady license"),
            ..Default::default()
        })
    }
}

impl<'a> TokenRestrictionState<'a> {
    fn block() -> NestedBlock {
        use AttributeConstraint::{Optional, Required};

        NestedBlock::Optional(Block {
            attributes: map! {
                "issuer" => string(Required, "Expected token issuer"),
                "audience" => string(Required, "Expected token audience"),
                "token_type" => string(Required, "One of `Jwt` or `Swt`"),
                "open_id_connect_discovery_document" => string(
                    Optional,
                    "OpenID connect discovery document URL",
                ),
                "primary_symmetric_token_key" => sensitive(string(
                    Optional,
                    "Base64 encoded symmetric key",
                )),
                "primary_rsa_token_key_exponent" => sensitive(string(Optional, "RSA key exponent")),
                "primary_rsa_token_key_modulus" => sensitive(string(Optional, "RSA key modulus")),
                "primary_x509_token_key_raw" => sensitive(string(
                    Optional,
                    "PEM or DER encoded X509 certificate",
                )),
            },
            blocks: map! {
                "alternate_key" => TokenKeyState::block(),
                "required_claim" => RequiredClaimState::block(),
            },
            description: Description::plain("Deliver the key to holders of a valid token"),
            ..Default::default()
        })
    }
}

impl<'a> TokenKeyState<'a> {
    fn block() -> NestedBlock {
        use AttributeConstraint::Optional;

        NestedBlock::List(Block {
            attributes: map! {
                "symmetric_token_key" => sensitive(string(Optional, "Base64 encoded symmetric key")),
                "rsa_token_key_exponent" => sensitive(string(Optional, "RSA key exponent")),
                "rsa_token_key_modulus" => sensitive(string(Optional, "RSA key modulus")),
                "x509_token_key_raw" => sensitive(string(Optional, "PEM or DER encoded X509 certificate")),
            },
            description: Description::plain("Alternate verification key, exactly one kind"),
            ..Default::default()
        })
    }
}

impl<'a> RequiredClaimState<'a> {
    fn block() -> NestedBlock {
        use AttributeConstraint::Optional;

        NestedBlock::List(Block {
            attributes: map! {
                "type" => string(Optional, "Claim type"),
                "value" => string(Optional, "Claim value"),
            },
            description: Description::plain("Claim the token must carry"),
            ..Default::default()
        })
    }
}

fn default_flag(value: &mut Value<bool>) {
    if value.is_null() {
        *value = Value::Value(false);
    }
}

/// Plans the identifier and the `false` defaults the API always returns.
impl<'a> WithNormalize for ContentKeyPolicyState<'a> {
    fn normalize(&mut self, _diags: &mut Diagnostics) {
        if self.id.is_null() {
            self.id = Value::Unknown;
        }

        let Some(options) = self.policy_option.as_mut_option() else {
            return;
        };
        for option in options.iter_mut().filter_map(Value::as_mut_option) {
            let Some(licenses) = option.playready_configuration_license.as_mut_option() else {
                continue;
            };
            for license in licenses.iter_mut().filter_map(Value::as_mut_option) {
                default_flag(&mut license.allow_test_devices);
                if let Some(play_right) = license.play_right.as_mut_option() {
                    default_flag(&mut play_right.digital_video_only_content_restriction);
                    default_flag(&mut play_right.image_constraint_for_analog_component_video_restriction);
                    default_flag(&mut play_right.image_constraint_for_analog_computer_monitor_restriction);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::value_string;

    #[test]
    fn normalize_fills_defaults() {
        let mut state = ContentKeyPolicyState {
            policy_option: Value::Value(vec![Value::Value(PolicyOptionState {
                playready_configuration_license: Value::Value(vec![Value::Value(
                    PlayReadyLicenseState {
                        allow_test_devices: Value::Null,
                        play_right: Value::Value(PlayRightState {
                            digital_video_only_content_restriction: Value::Value(true),
                            ..Default::default()
                        }),
                        ..Default::default()
                    },
                )]),
                ..Default::default()
            })]),
            ..Default::default()
        };
        state.normalize(&mut Diagnostics::default());

        assert_eq!(state.id, Value::Unknown);
        let option = &state.policy_option.as_ref_option().unwrap()[0];
        let license = &option.as_ref_option().unwrap().playready_configuration_license;
        let license = license.as_ref_option().unwrap()[0].as_ref_option().unwrap();
        assert_eq!(license.allow_test_devices, Value::Value(false));
        let play_right = license.play_right.as_ref_option().unwrap();
        assert_eq!(play_right.digital_video_only_content_restriction, Value::Value(true));
        assert_eq!(
            play_right.image_constraint_for_analog_computer_monitor_restriction,
            Value::Value(false)
        );
    }

    #[test]
    fn resource_id_from_state() {
        let state = ContentKeyPolicyState {
            name: value_string("policy1"),
            resource_group_name: value_string("rg1"),
            media_services_account_name: value_string("account1"),
            ..Default::default()
        };
        assert_eq!(
            state.resource_id("sub").id(),
            "/subscriptions/sub/resourceGroups/rg1/providers/Microsoft.Media/mediaservices/account1/contentKeyPolicies/policy1"
        );
    }
}
