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

//! API model to state.

use tf_provider::value::{Value, ValueList};
use tf_provider::AttributePath;

use crate::client::media::{
    ContentKeyPolicyConfiguration, ContentKeyPolicyOption, ContentKeyPolicyProperties,
    ContentKeyPolicyRestriction, FairPlayConfiguration, OfflineRentalConfiguration,
    PlayReadyContentKeyLocation, PlayReadyLicense, PlayReadyPlayRight, TokenClaim, TokenKey,
    TokenRestriction,
};
use crate::ids::ContentKeyPolicyId;
use crate::translate::{base64_to_hex, decode_bytes, TranslateError};
use crate::utils::{optional_number, optional_string, value_string};

use super::expand::item_path;
use super::state::{
    ContentKeyPolicyState, FairPlayState, OfflineRentalState, PlayReadyLicenseState,
    PlayRightState, PolicyOptionState, RequiredClaimState, TokenKeyState, TokenRestrictionState,
};

fn flag(value: bool) -> Value<bool> {
    if value {
        Value::Value(true)
    } else {
        Value::Null
    }
}

fn list<T>(items: Vec<T>) -> ValueList<Value<T>> {
    Value::Value(items.into_iter().map(Value::Value).collect())
}

pub(super) fn flatten_policy<'a>(
    id: &ContentKeyPolicyId,
    properties: &ContentKeyPolicyProperties,
    prior: &ContentKeyPolicyState<'a>,
) -> Result<ContentKeyPolicyState<'a>, TranslateError> {
    Ok(ContentKeyPolicyState {
        id: value_string(id.id()),
        name: value_string(id.name.as_str()),
        resource_group_name: value_string(id.resource_group.as_str()),
        media_services_account_name: value_string(id.account_name.as_str()),
        description: optional_string(properties.description.clone()),
        policy_option: flatten_options(&properties.options)?,
        timeouts: prior.timeouts.clone(),
    })
}

pub(super) fn flatten_options<'a>(
    options: &[ContentKeyPolicyOption],
) -> Result<ValueList<Value<PolicyOptionState<'a>>>, TranslateError> {
    options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            flatten_option(option, &item_path(&AttributePath::default(), "policy_option", i))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(list)
}

fn flatten_option<'a>(
    option: &ContentKeyPolicyOption,
    path: &AttributePath,
) -> Result<PolicyOptionState<'a>, TranslateError> {
    let mut state = PolicyOptionState {
        name: optional_string(option.name.clone()),
        playready_configuration_license: Value::Value(vec![]),
        ..Default::default()
    };

    match &option.configuration {
        ContentKeyPolicyConfiguration::ClearKey => {
            state.clear_key_configuration_enabled = flag(true);
        }
        ContentKeyPolicyConfiguration::Widevine { widevine_template } => {
            state.widevine_configuration_template = value_string(widevine_template.as_str());
        }
        ContentKeyPolicyConfiguration::FairPlay(fairplay) => {
            state.fairplay_configuration = flatten_fairplay(
                Some(fairplay),
                &path.clone().attribute("fairplay_configuration").index(0),
            )?;
        }
        ContentKeyPolicyConfiguration::PlayReady(playready) => {
            state.playready_configuration_license = flatten_licenses(Some(playready.licenses.as_slice()));
            state.playready_response_custom_data =
                optional_string(playready.response_custom_data.clone());
        }
        unknown @ ContentKeyPolicyConfiguration::Unknown => {
            return Err(TranslateError::UnsupportedVariant {
                from: unknown.type_name(),
                to: "policy_option configuration",
            });
        }
    }

    match &option.restriction {
        ContentKeyPolicyRestriction::Open => state.open_restriction_enabled = flag(true),
        ContentKeyPolicyRestriction::Token(token) => {
            state.token_restriction = flatten_token_restriction(
                Some(token),
                &path.clone().attribute("token_restriction").index(0),
            )?;
        }
        unknown @ ContentKeyPolicyRestriction::Unknown => {
            return Err(TranslateError::UnsupportedVariant {
                from: unknown.type_name(),
                to: "policy_option restriction",
            });
        }
    }

    Ok(state)
}

/// The application secret key comes back as base64, the state holds lowercase hex.
pub(super) fn flatten_fairplay<'a>(
    fairplay: Option<&FairPlayConfiguration>,
    path: &AttributePath,
) -> Result<Value<FairPlayState<'a>>, TranslateError> {
    let Some(fairplay) = fairplay else {
        return Ok(Value::Null);
    };
    let ask = fairplay
        .ask
        .as_deref()
        .map(|ask| base64_to_hex("ask", ask, &path.clone().attribute("ask")))
        .transpose()?;

    Ok(Value::Value(FairPlayState {
        ask: optional_string(ask),
        pfx: optional_string(fairplay.fair_play_pfx.clone()),
        pfx_password: optional_string(fairplay.fair_play_pfx_password.clone()),
        rental_and_lease_key_type: value_string(fairplay.rental_and_lease_key_type.as_str()),
        rental_duration_seconds: Value::Value(fairplay.rental_duration),
        offline_rental_configuration: flatten_offline_rental(
            fairplay.offline_rental_configuration.as_ref(),
        ),
    }))
}

fn flatten_offline_rental(offline: Option<&OfflineRentalConfiguration>) -> Value<OfflineRentalState> {
    offline.map_or(Value::Null, |offline| {
        Value::Value(OfflineRentalState {
            playback_duration_seconds: Value::Value(offline.playback_duration_seconds),
            storage_duration_seconds: Value::Value(offline.storage_duration_seconds),
        })
    })
}

pub(super) fn flatten_licenses<'a>(
    licenses: Option<&[PlayReadyLicense]>,
) -> ValueList<Value<PlayReadyLicenseState<'a>>> {
    list(licenses.into_iter().flatten().map(flatten_license).collect())
}

fn flatten_license<'a>(license: &PlayReadyLicense) -> PlayReadyLicenseState<'a> {
    let mut state = PlayReadyLicenseState {
        allow_test_devices: Value::Value(license.allow_test_devices),
        begin_date: optional_string(license.begin_date.clone()),
        expiration_date: optional_string(license.expiration_date.clone()),
        relative_begin_date: optional_string(license.relative_begin_date.clone()),
        relative_expiration_date: optional_string(license.relative_expiration_date.clone()),
        grace_period: optional_string(license.grace_period.clone()),
        security_level: optional_string(license.security_level.clone()),
        license_type: value_string(license.license_type.as_str()),
        content_type: value_string(license.content_type.as_str()),
        play_right: flatten_play_right(license.play_right.as_ref()),
        ..Default::default()
    };
    match &license.content_key_location {
        PlayReadyContentKeyLocation::FromHeader => {
            state.content_key_location_from_header_enabled = flag(true);
        }
        PlayReadyContentKeyLocation::FromKeyIdentifier { key_id } => {
            state.content_key_location_from_key_id = value_string(key_id.as_str());
        }
    }
    state
}

pub(super) fn flatten_play_right<'a>(
    play_right: Option<&PlayReadyPlayRight>,
) -> Value<PlayRightState<'a>> {
    let Some(play_right) = play_right else {
        return Value::Null;
    };

    Value::Value(PlayRightState {
        first_play_expiration: optional_string(play_right.first_play_expiration.clone()),
        scms_restriction: optional_number(play_right.scms_restriction),
        agc_and_color_stripe_restriction: optional_number(
            play_right.agc_and_color_stripe_restriction,
        ),
        digital_video_only_content_restriction: Value::Value(
            play_right.digital_video_only_content_restriction,
        ),
        image_constraint_for_analog_component_video_restriction: Value::Value(
            play_right.image_constraint_for_analog_component_video_restriction,
        ),
        image_constraint_for_analog_computer_monitor_restriction: Value::Value(
            play_right.image_constraint_for_analog_computer_monitor_restriction,
        ),
        allow_passing_video_content_to_unknown_output: value_string(
            play_right.allow_passing_video_content_to_unknown_output.as_str(),
        ),
        uncompressed_digital_video_opl: optional_number(play_right.uncompressed_digital_video_opl),
        uncompressed_digital_audio_opl: optional_number(play_right.uncompressed_digital_audio_opl),
        analog_video_opl: optional_number(play_right.analog_video_opl),
        compressed_digital_audio_opl: optional_number(play_right.compressed_digital_audio_opl),
        compressed_digital_video_opl: optional_number(play_right.compressed_digital_video_opl),
    })
}

pub(super) fn flatten_token_restriction<'a>(
    token: Option<&TokenRestriction>,
    path: &AttributePath,
) -> Result<Value<TokenRestrictionState<'a>>, TranslateError> {
    let Some(token) = token else {
        return Ok(Value::Null);
    };

    let mut state = TokenRestrictionState {
        issuer: value_string(token.issuer.as_str()),
        audience: value_string(token.audience.as_str()),
        token_type: value_string(token.restriction_token_type.as_str()),
        open_id_connect_discovery_document: optional_string(
            token.open_id_connect_discovery_document.clone(),
        ),
        required_claim: flatten_claims(&token.required_claims),
        ..Default::default()
    };

    if let Some(primary) = &token.primary_verification_key {
        let key = flatten_token_key(primary, path)?;
        state.primary_symmetric_token_key = key.symmetric_token_key;
        state.primary_rsa_token_key_exponent = key.rsa_token_key_exponent;
        state.primary_rsa_token_key_modulus = key.rsa_token_key_modulus;
        state.primary_x509_token_key_raw = key.x509_token_key_raw;
    }
    state.alternate_key = token
        .alternate_verification_keys
        .iter()
        .enumerate()
        .map(|(i, key)| flatten_token_key(key, &item_path(path, "alternate_key", i)))
        .collect::<Result<Vec<_>, _>>()
        .map(list)?;

    Ok(Value::Value(state))
}

fn flatten_token_key<'a>(
    key: &TokenKey,
    path: &AttributePath,
) -> Result<TokenKeyState<'a>, TranslateError> {
    Ok(match key {
        TokenKey::Symmetric { key_value } => TokenKeyState {
            symmetric_token_key: value_string(key_value.as_str()),
            ..Default::default()
        },
        TokenKey::Rsa { exponent, modulus } => TokenKeyState {
            rsa_token_key_exponent: value_string(decode_bytes(
                "rsa_token_key_exponent",
                exponent,
                path,
            )?),
            rsa_token_key_modulus: value_string(decode_bytes(
                "rsa_token_key_modulus",
                modulus,
                path,
            )?),
            ..Default::default()
        },
        TokenKey::X509Certificate { raw_body } => TokenKeyState {
            x509_token_key_raw: value_string(decode_bytes("x509_token_key_raw", raw_body, path)?),
            ..Default::default()
        },
        unknown @ TokenKey::Unknown => {
            return Err(TranslateError::UnsupportedVariant {
                from: unknown.type_name(),
                to: "token_restriction key",
            })
        }
    })
}

fn flatten_claims<'a>(claims: &[TokenClaim]) -> ValueList<Value<RequiredClaimState<'a>>> {
    list(
        claims
            .iter()
            .map(|claim| RequiredClaimState {
                claim_type: optional_string(claim.claim_type.clone()),
                value: optional_string(claim.claim_value.clone()),
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::super::expand::expand_policy;
    use super::*;

    const ID: &str = "/subscriptions/sub/resourceGroups/rg1/providers/Microsoft.Media/mediaservices/account1/contentKeyPolicies/policy1";

    fn option<'a>(configure: impl FnOnce(&mut PolicyOptionState<'a>)) -> Value<PolicyOptionState<'a>> {
        let mut option = PolicyOptionState {
            name: value_string("option"),
            playready_configuration_license: Value::Value(vec![]),
            ..Default::default()
        };
        configure(&mut option);
        Value::Value(option)
    }

    fn token<'a>() -> TokenRestrictionState<'a> {
        TokenRestrictionState {
            issuer: value_string("urn:issuer"),
            audience: value_string("urn:audience"),
            token_type: value_string("Jwt"),
            primary_rsa_token_key_exponent: value_string("AQAB"),
            primary_rsa_token_key_modulus: value_string("yp0EWl9TwoVSXTKIJqxxKvd0iqf0"),
            alternate_key: Value::Value(vec![
                Value::Value(TokenKeyState {
                    symmetric_token_key: value_string("AAAAAAAAAAAAAAAAAAAAAA=="),
                    ..Default::default()
                }),
                Value::Value(TokenKeyState {
                    x509_token_key_raw: value_string("-----BEGIN CERTIFICATE-----"),
                    ..Default::default()
                }),
            ]),
            required_claim: Value::Value(vec![Value::Value(RequiredClaimState {
                claim_type: value_string("urn:microsoft:azure:mediaservices:contentkeyidentifier"),
                value: Value::Null,
            })]),
            ..Default::default()
        }
    }

    /// A state in the shape flatten produces: absent repeated blocks are empty
    /// lists and unset flags are null.
    fn state<'a>() -> ContentKeyPolicyState<'a> {
        ContentKeyPolicyState {
            id: value_string(ID),
            name: value_string("policy1"),
            resource_group_name: value_string("rg1"),
            media_services_account_name: value_string("account1"),
            description: value_string("My Policy Description"),
            policy_option: Value::Value(vec![
                option(|o| {
                    o.clear_key_configuration_enabled = Value::Value(true);
                    o.token_restriction = Value::Value(token());
                }),
                option(|o| {
                    o.widevine_configuration_template = value_string(r#"{"allowed_track_types":"SD_HD"}"#);
                    o.open_restriction_enabled = Value::Value(true);
                }),
                option(|o| {
                    o.fairplay_configuration = Value::Value(FairPlayState {
                        ask: value_string("bb566284cc124a21c435a92cd3c108c4"),
                        pfx: value_string("TElJQ0VOU0U="),
                        pfx_password: value_string("password"),
                        rental_and_lease_key_type: value_string("PersistentUnlimited"),
                        rental_duration_seconds: Value::Value(2249),
                        offline_rental_configuration: Value::Value(OfflineRentalState {
                            playback_duration_seconds: Value::Value(60),
                            storage_duration_seconds: Value::Value(120),
                        }),
                    });
                    o.open_restriction_enabled = Value::Value(true);
                }),
                option(|o| {
                    o.playready_configuration_license = Value::Value(vec![Value::Value(
                        PlayReadyLicenseState {
                            allow_test_devices: Value::Value(true),
                            begin_date: value_string("2017-10-16T18:22:53Z"),
                            security_level: value_string("SL150"),
                            license_type: value_string("Persistent"),
                            content_type: value_string("UltraVioletDownload"),
                            content_key_location_from_key_id: value_string(
                                "9a8b1b2b-3c7a-4a1b-9c5d-6e8f0a1b2c3d",
                            ),
                            play_right: Value::Value(PlayRightState {
                                scms_restriction: Value::Value(2),
                                digital_video_only_content_restriction: Value::Value(false),
                                image_constraint_for_analog_component_video_restriction: Value::Value(false),
                                image_constraint_for_analog_computer_monitor_restriction: Value::Value(true),
                                allow_passing_video_content_to_unknown_output: value_string("NotAllowed"),
                                uncompressed_digital_video_opl: Value::Value(100),
                                ..Default::default()
                            }),
                            ..Default::default()
                        },
                    )]);
                    o.playready_response_custom_data = value_string("custom data");
                    o.open_restriction_enabled = Value::Value(true);
                }),
            ]),
            timeouts: Value::Null,
        }
    }

    #[test]
    fn expand_flatten_inverse() {
        let state = state();
        let id = ContentKeyPolicyId::parse(ID).unwrap();
        let model = expand_policy(&state).unwrap();
        let properties = model.properties.unwrap();

        assert_eq!(flatten_policy(&id, &properties, &state).unwrap(), state);
    }

    #[test]
    fn absent_models_flatten_to_empty() {
        let path = AttributePath::default();
        assert_eq!(flatten_fairplay(None, &path).unwrap(), Value::Null);
        assert_eq!(flatten_token_restriction(None, &path).unwrap(), Value::Null);
        assert_eq!(flatten_play_right(None), Value::Null);
        assert_eq!(flatten_licenses(None), Value::Value(vec![]));
        assert_eq!(flatten_options(&[]).unwrap(), Value::Value(vec![]));
    }

    #[test]
    fn ask_comes_back_as_lowercase_hex() {
        let fairplay = FairPlayConfiguration {
            ask: Some("u1ZihMwSSiHENaks08EIxA==".to_owned()),
            ..Default::default()
        };
        let flattened = flatten_fairplay(Some(&fairplay), &AttributePath::default()).unwrap();
        assert_eq!(
            flattened.as_ref_option().map(|f| f.ask.as_str()),
            Some("bb566284cc124a21c435a92cd3c108c4")
        );
    }

    #[test]
    fn unknown_variants_are_rejected() {
        let option = ContentKeyPolicyOption {
            policy_option_id: None,
            name: Some("option".to_owned()),
            configuration: ContentKeyPolicyConfiguration::Unknown,
            restriction: ContentKeyPolicyRestriction::Open,
        };
        let err = flatten_options(&[option]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "converting ContentKeyPolicyUnknownConfiguration to policy_option configuration"
        );

        let option = ContentKeyPolicyOption {
            policy_option_id: None,
            name: None,
            configuration: ContentKeyPolicyConfiguration::ClearKey,
            restriction: ContentKeyPolicyRestriction::Unknown,
        };
        assert!(matches!(
            flatten_options(&[option]),
            Err(TranslateError::UnsupportedVariant {
                from: "ContentKeyPolicyUnknownRestriction",
                ..
            })
        ));
    }

    #[test]
    fn invalid_rsa_bytes() {
        let token = TokenRestriction {
            primary_verification_key: Some(TokenKey::Rsa {
                exponent: "%%%".to_owned(),
                modulus: String::new(),
            }),
            ..Default::default()
        };
        assert!(matches!(
            flatten_token_restriction(Some(&token), &AttributePath::default()),
            Err(TranslateError::InvalidField {
                field: "rsa_token_key_exponent",
                ..
            })
        ));
    }
}
