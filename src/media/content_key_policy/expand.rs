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

//! State to API model.

use tf_provider::value::{Value, ValueList, ValueString};
use tf_provider::AttributePath;

use crate::client::media::{
    ContentKeyPolicy, ContentKeyPolicyConfiguration, ContentKeyPolicyOption,
    ContentKeyPolicyProperties, ContentKeyPolicyRestriction, FairPlayConfiguration,
    OfflineRentalConfiguration, PlayReadyConfiguration, PlayReadyContentKeyLocation,
    PlayReadyLicense, PlayReadyPlayRight, TokenClaim, TokenKey, TokenRestriction,
};
use crate::translate::{
    assume_known, encode_bytes, hex_to_base64, is_set, single_variant, Member, TranslateError,
};
use crate::utils::{bool_content, number_content, string_content};

use super::state::{
    ContentKeyPolicyState, FairPlayState, OfflineRentalState, PlayReadyLicenseState,
    PlayRightState, PolicyOptionState, RequiredClaimState, TokenKeyState, TokenRestrictionState,
};

fn non_empty(value: &ValueString) -> Option<bool> {
    is_set(value, |s| !s.is_empty())
}

fn enabled(value: &Value<bool>) -> Option<bool> {
    is_set(value, |b| *b)
}

/// Known items of a repeated block, with their index.
pub(super) fn items<'s, T>(list: &'s ValueList<Value<T>>) -> impl Iterator<Item = (usize, &'s T)> {
    list.iter()
        .flatten()
        .enumerate()
        .filter_map(|(i, item)| Some((i, item.as_ref_option()?)))
}

pub(super) fn item_path(path: &AttributePath, block: &'static str, index: usize) -> AttributePath {
    path.clone().attribute(block).index(index as i64)
}

pub(super) fn configuration_members(option: &PolicyOptionState) -> [Member; 4] {
    [
        (
            "clear_key_configuration_enabled",
            enabled(&option.clear_key_configuration_enabled),
        ),
        (
            "widevine_configuration_template",
            non_empty(&option.widevine_configuration_template),
        ),
        (
            "fairplay_configuration",
            is_set(&option.fairplay_configuration, |_| true),
        ),
        (
            "playready_configuration_license",
            is_set(&option.playready_configuration_license, |licenses| {
                !licenses.is_empty()
            }),
        ),
    ]
}

pub(super) fn restriction_members(option: &PolicyOptionState) -> [Member; 2] {
    [
        (
            "open_restriction_enabled",
            enabled(&option.open_restriction_enabled),
        ),
        (
            "token_restriction",
            is_set(&option.token_restriction, |_| true),
        ),
    ]
}

pub(super) fn content_key_location_members(license: &PlayReadyLicenseState) -> [Member; 2] {
    [
        (
            "content_key_location_from_header_enabled",
            enabled(&license.content_key_location_from_header_enabled),
        ),
        (
            "content_key_location_from_key_id",
            non_empty(&license.content_key_location_from_key_id),
        ),
    ]
}

/// The four attributes of one token key, whatever their prefix.
pub(super) struct KeyFields<'k, 'a> {
    names: [&'static str; 3],
    pub symmetric: &'k ValueString<'a>,
    pub exponent: &'k ValueString<'a>,
    pub modulus: &'k ValueString<'a>,
    pub x509: &'k ValueString<'a>,
}

impl<'k, 'a> KeyFields<'k, 'a> {
    pub fn primary(token: &'k TokenRestrictionState<'a>) -> Self {
        Self {
            names: [
                "primary_symmetric_token_key",
                "primary_rsa_token_key_exponent",
                "primary_x509_token_key_raw",
            ],
            symmetric: &token.primary_symmetric_token_key,
            exponent: &token.primary_rsa_token_key_exponent,
            modulus: &token.primary_rsa_token_key_modulus,
            x509: &token.primary_x509_token_key_raw,
        }
    }

    pub fn alternate(key: &'k TokenKeyState<'a>) -> Self {
        Self {
            names: [
                "symmetric_token_key",
                "rsa_token_key_exponent",
                "x509_token_key_raw",
            ],
            symmetric: &key.symmetric_token_key,
            exponent: &key.rsa_token_key_exponent,
            modulus: &key.rsa_token_key_modulus,
            x509: &key.x509_token_key_raw,
        }
    }

    /// An RSA key counts as set as soon as one of its halves is.
    pub fn members(&self) -> [Member; 3] {
        let rsa = match (non_empty(self.exponent), non_empty(self.modulus)) {
            (Some(exponent), Some(modulus)) => Some(exponent || modulus),
            _ => None,
        };
        let [symmetric, rsa_name, x509] = self.names;
        [
            (symmetric, non_empty(self.symmetric)),
            (rsa_name, rsa),
            (x509, non_empty(self.x509)),
        ]
    }
}

pub(super) fn expand_policy(state: &ContentKeyPolicyState) -> Result<ContentKeyPolicy, TranslateError> {
    Ok(ContentKeyPolicy {
        properties: Some(ContentKeyPolicyProperties {
            description: string_content(&state.description),
            options: expand_options(&state.policy_option)?,
            ..Default::default()
        }),
        ..Default::default()
    })
}

pub(super) fn expand_options(
    options: &ValueList<Value<PolicyOptionState>>,
) -> Result<Vec<ContentKeyPolicyOption>, TranslateError> {
    items(options)
        .map(|(i, option)| {
            expand_option(option, &item_path(&AttributePath::default(), "policy_option", i))
        })
        .collect()
}

fn expand_option(
    option: &PolicyOptionState,
    path: &AttributePath,
) -> Result<ContentKeyPolicyOption, TranslateError> {
    Ok(ContentKeyPolicyOption {
        policy_option_id: None,
        name: string_content(&option.name),
        configuration: expand_configuration(option, path)?,
        restriction: expand_restriction(option, path)?,
    })
}

fn expand_configuration(
    option: &PolicyOptionState,
    path: &AttributePath,
) -> Result<ContentKeyPolicyConfiguration, TranslateError> {
    single_variant(
        "policy_option",
        "configuration",
        &assume_known(&configuration_members(option)),
        true,
        path,
    )?;

    if bool_content(&option.clear_key_configuration_enabled) == Some(true) {
        return Ok(ContentKeyPolicyConfiguration::ClearKey);
    }
    if let Some(widevine_template) = string_content(&option.widevine_configuration_template) {
        return Ok(ContentKeyPolicyConfiguration::Widevine { widevine_template });
    }
    let fairplay_path = path.clone().attribute("fairplay_configuration").index(0);
    if let Some(fairplay) = expand_fairplay(&option.fairplay_configuration, &fairplay_path)? {
        return Ok(ContentKeyPolicyConfiguration::FairPlay(fairplay));
    }
    Ok(ContentKeyPolicyConfiguration::PlayReady(PlayReadyConfiguration {
        licenses: expand_licenses(&option.playready_configuration_license, path)?,
        response_custom_data: string_content(&option.playready_response_custom_data),
    }))
}

pub(super) fn expand_fairplay(
    fairplay: &Value<FairPlayState>,
    path: &AttributePath,
) -> Result<Option<FairPlayConfiguration>, TranslateError> {
    let Some(fairplay) = fairplay.as_ref_option() else {
        return Ok(None);
    };
    let ask = string_content(&fairplay.ask)
        .map(|ask| hex_to_base64("ask", &ask, &path.clone().attribute("ask")))
        .transpose()?;

    Ok(Some(FairPlayConfiguration {
        ask,
        fair_play_pfx_password: string_content(&fairplay.pfx_password),
        fair_play_pfx: string_content(&fairplay.pfx),
        rental_and_lease_key_type: fairplay.rental_and_lease_key_type.as_str().to_owned(),
        rental_duration: number_content(&fairplay.rental_duration_seconds).unwrap_or_default(),
        offline_rental_configuration: expand_offline_rental(&fairplay.offline_rental_configuration),
    }))
}

fn expand_offline_rental(
    offline: &Value<OfflineRentalState>,
) -> Option<OfflineRentalConfiguration> {
    offline
        .as_ref_option()
        .map(|offline| OfflineRentalConfiguration {
            playback_duration_seconds: number_content(&offline.playback_duration_seconds)
                .unwrap_or_default(),
            storage_duration_seconds: number_content(&offline.storage_duration_seconds)
                .unwrap_or_default(),
        })
}

pub(super) fn expand_licenses(
    licenses: &ValueList<Value<PlayReadyLicenseState>>,
    path: &AttributePath,
) -> Result<Vec<PlayReadyLicense>, TranslateError> {
    items(licenses)
        .map(|(i, license)| {
            expand_license(
                license,
                &item_path(path, "playready_configuration_license", i),
            )
        })
        .collect()
}

fn expand_license(
    license: &PlayReadyLicenseState,
    path: &AttributePath,
) -> Result<PlayReadyLicense, TranslateError> {
    single_variant(
        "playready_configuration_license",
        "content key location",
        &assume_known(&content_key_location_members(license)),
        true,
        path,
    )?;
    let content_key_location = match string_content(&license.content_key_location_from_key_id) {
        Some(key_id) => PlayReadyContentKeyLocation::FromKeyIdentifier { key_id },
        None => PlayReadyContentKeyLocation::FromHeader,
    };

    Ok(PlayReadyLicense {
        allow_test_devices: bool_content(&license.allow_test_devices).unwrap_or(false),
        security_level: string_content(&license.security_level),
        begin_date: string_content(&license.begin_date),
        expiration_date: string_content(&license.expiration_date),
        relative_begin_date: string_content(&license.relative_begin_date),
        relative_expiration_date: string_content(&license.relative_expiration_date),
        grace_period: string_content(&license.grace_period),
        play_right: expand_play_right(&license.play_right),
        license_type: license.license_type.as_str().to_owned(),
        content_key_location,
        content_type: license.content_type.as_str().to_owned(),
    })
}

pub(super) fn expand_play_right(play_right: &Value<PlayRightState>) -> Option<PlayReadyPlayRight> {
    let play_right = play_right.as_ref_option()?;
    let flag = |value: &Value<bool>| bool_content(value).unwrap_or(false);

    Some(PlayReadyPlayRight {
        first_play_expiration: string_content(&play_right.first_play_expiration),
        scms_restriction: number_content(&play_right.scms_restriction),
        agc_and_color_stripe_restriction: number_content(
            &play_right.agc_and_color_stripe_restriction,
        ),
        digital_video_only_content_restriction: flag(
            &play_right.digital_video_only_content_restriction,
        ),
        image_constraint_for_analog_component_video_restriction: flag(
            &play_right.image_constraint_for_analog_component_video_restriction,
        ),
        image_constraint_for_analog_computer_monitor_restriction: flag(
            &play_right.image_constraint_for_analog_computer_monitor_restriction,
        ),
        allow_passing_video_content_to_unknown_output: play_right
            .allow_passing_video_content_to_unknown_output
            .as_str()
            .to_owned(),
        uncompressed_digital_video_opl: number_content(&play_right.uncompressed_digital_video_opl),
        uncompressed_digital_audio_opl: number_content(&play_right.uncompressed_digital_audio_opl),
        analog_video_opl: number_content(&play_right.analog_video_opl),
        compressed_digital_audio_opl: number_content(&play_right.compressed_digital_audio_opl),
        compressed_digital_video_opl: number_content(&play_right.compressed_digital_video_opl),
    })
}

fn expand_restriction(
    option: &PolicyOptionState,
    path: &AttributePath,
) -> Result<ContentKeyPolicyRestriction, TranslateError> {
    single_variant(
        "policy_option",
        "restriction",
        &assume_known(&restriction_members(option)),
        true,
        path,
    )?;

    let token_path = path.clone().attribute("token_restriction").index(0);
    Ok(match expand_token_restriction(&option.token_restriction, &token_path)? {
        Some(token) => ContentKeyPolicyRestriction::Token(token),
        None => ContentKeyPolicyRestriction::Open,
    })
}

pub(super) fn expand_token_restriction(
    token: &Value<TokenRestrictionState>,
    path: &AttributePath,
) -> Result<Option<TokenRestriction>, TranslateError> {
    let Some(token) = token.as_ref_option() else {
        return Ok(None);
    };
    let alternate_verification_keys = items(&token.alternate_key)
        .map(|(i, key)| {
            expand_token_key(
                &KeyFields::alternate(key),
                "alternate_key",
                true,
                &item_path(path, "alternate_key", i),
            )
        })
        .filter_map(Result::transpose)
        .collect::<Result<_, _>>()?;

    Ok(Some(TokenRestriction {
        issuer: token.issuer.as_str().to_owned(),
        audience: token.audience.as_str().to_owned(),
        primary_verification_key: expand_token_key(
            &KeyFields::primary(token),
            "token_restriction",
            false,
            path,
        )?,
        alternate_verification_keys,
        required_claims: expand_claims(&token.required_claim),
        restriction_token_type: token.token_type.as_str().to_owned(),
        open_id_connect_discovery_document: string_content(
            &token.open_id_connect_discovery_document,
        ),
    }))
}

fn expand_token_key(
    fields: &KeyFields,
    block: &'static str,
    required: bool,
    path: &AttributePath,
) -> Result<Option<TokenKey>, TranslateError> {
    let members = fields.members();
    if single_variant(block, "token key", &assume_known(&members), required, path)?.is_none() {
        return Ok(None);
    }

    // symmetric keys are already base64, the others are carried as bytes
    Ok(Some(if let Some(key_value) = string_content(fields.symmetric) {
        TokenKey::Symmetric { key_value }
    } else if let Some(raw) = string_content(fields.x509) {
        TokenKey::X509Certificate {
            raw_body: encode_bytes(&raw),
        }
    } else {
        TokenKey::Rsa {
            exponent: encode_bytes(fields.exponent.as_str()),
            modulus: encode_bytes(fields.modulus.as_str()),
        }
    }))
}

fn expand_claims(claims: &ValueList<Value<RequiredClaimState>>) -> Vec<TokenClaim> {
    items(claims)
        .map(|(_, claim)| TokenClaim {
            claim_type: string_content(&claim.claim_type),
            claim_value: string_content(&claim.value),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::utils::value_string;

    fn option(configure: impl FnOnce(&mut PolicyOptionState<'static>)) -> PolicyOptionState<'static> {
        let mut option = PolicyOptionState {
            name: value_string("option1"),
            open_restriction_enabled: Value::Value(true),
            playready_configuration_license: Value::Value(vec![]),
            ..Default::default()
        };
        configure(&mut option);
        option
    }

    fn policy(option: PolicyOptionState<'static>) -> ContentKeyPolicyState<'static> {
        ContentKeyPolicyState {
            policy_option: Value::Value(vec![Value::Value(option)]),
            ..Default::default()
        }
    }

    #[test]
    fn absent_blocks_expand_to_none() {
        let path = AttributePath::default();
        assert_eq!(expand_fairplay(&Value::Null, &path).unwrap(), None);
        assert_eq!(expand_token_restriction(&Value::Null, &path).unwrap(), None);
        assert_eq!(expand_play_right(&Value::Null), None);
        assert_eq!(expand_licenses(&Value::Null, &path).unwrap(), vec![]);
        assert_eq!(expand_options(&Value::Value(vec![])).unwrap(), vec![]);
    }

    #[test]
    fn clear_key_with_open_restriction() {
        let state = policy(option(|o| o.clear_key_configuration_enabled = Value::Value(true)));
        assert_eq!(
            serde_json::to_value(expand_policy(&state).unwrap()).unwrap(),
            json!({
                "properties": {
                    "options": [{
                        "name": "option1",
                        "configuration": {"@odata.type": "#Microsoft.Media.ContentKeyPolicyClearKeyConfiguration"},
                        "restriction": {"@odata.type": "#Microsoft.Media.ContentKeyPolicyOpenRestriction"}
                    }]
                }
            })
        );
    }

    #[test]
    fn configuration_is_required() {
        let err = expand_policy(&policy(option(|_| ()))).unwrap_err();
        assert_eq!(
            err.to_string(),
            "policy_option must contain at least one type of configuration: clear_key_configuration_enabled, widevine_configuration_template, fairplay_configuration, playready_configuration_license"
        );
        assert!(matches!(err, TranslateError::MissingVariant { .. }));
    }

    #[test]
    fn configurations_are_exclusive() {
        let state = policy(option(|o| {
            o.clear_key_configuration_enabled = Value::Value(true);
            o.widevine_configuration_template = value_string("{}");
        }));
        let err = expand_policy(&state).unwrap_err();
        assert_eq!(
            err.to_string(),
            "more than one type of configuration in the same policy_option is not allowed: clear_key_configuration_enabled, widevine_configuration_template"
        );
    }

    #[test]
    fn disabled_flag_is_not_a_variant() {
        let state = policy(option(|o| {
            o.clear_key_configuration_enabled = Value::Value(false);
            o.widevine_configuration_template = value_string("{}");
        }));
        let options = expand_policy(&state).unwrap().properties.unwrap().options;
        assert_eq!(
            options[0].configuration,
            ContentKeyPolicyConfiguration::Widevine {
                widevine_template: "{}".to_owned()
            }
        );
    }

    #[test]
    fn restrictions_are_exclusive() {
        let state = policy(option(|o| {
            o.clear_key_configuration_enabled = Value::Value(true);
            o.token_restriction = Value::Value(TokenRestrictionState::default());
        }));
        assert!(matches!(
            expand_policy(&state),
            Err(TranslateError::ConflictingVariants { kind: "restriction", .. })
        ));
    }

    #[test]
    fn fairplay_ask_is_base64() {
        let fairplay = FairPlayState {
            ask: value_string("bfe0f1f1c4b1"),
            rental_and_lease_key_type: value_string("PersistentUnlimited"),
            rental_duration_seconds: Value::Value(2249),
            ..Default::default()
        };
        let expanded = expand_fairplay(&Value::Value(fairplay), &AttributePath::default())
            .unwrap()
            .unwrap();
        assert_eq!(expanded.ask.as_deref(), Some("v+Dx8cSx"));
        assert_eq!(expanded.rental_duration, 2249);
        assert_eq!(expanded.offline_rental_configuration, None);

        let invalid = FairPlayState {
            ask: value_string("not hex"),
            ..Default::default()
        };
        assert!(matches!(
            expand_fairplay(&Value::Value(invalid), &AttributePath::default()),
            Err(TranslateError::InvalidField { field: "ask", .. })
        ));
    }

    #[test]
    fn token_keys() {
        let token = TokenRestrictionState {
            issuer: value_string("urn:issuer"),
            audience: value_string("urn:audience"),
            token_type: value_string("Jwt"),
            primary_rsa_token_key_exponent: value_string("AQAB"),
            primary_rsa_token_key_modulus: value_string("AQAB"),
            alternate_key: Value::Value(vec![
                Value::Value(TokenKeyState {
                    symmetric_token_key: value_string("AAAAAAAAAAAAAAAAAAAAAA=="),
                    ..Default::default()
                }),
                Value::Value(TokenKeyState {
                    x509_token_key_raw: value_string("cert"),
                    ..Default::default()
                }),
            ]),
            required_claim: Value::Value(vec![Value::Value(RequiredClaimState {
                claim_type: value_string("urn:microsoft:azure:mediaservices:contentkeyidentifier"),
                value: Value::Null,
            })]),
            ..Default::default()
        };
        let expanded = expand_token_restriction(&Value::Value(token), &AttributePath::default())
            .unwrap()
            .unwrap();

        assert_eq!(
            expanded.primary_verification_key,
            Some(TokenKey::Rsa {
                exponent: "QVFBQg==".to_owned(),
                modulus: "QVFBQg==".to_owned(),
            })
        );
        assert_eq!(
            expanded.alternate_verification_keys,
            vec![
                TokenKey::Symmetric {
                    key_value: "AAAAAAAAAAAAAAAAAAAAAA==".to_owned()
                },
                TokenKey::X509Certificate {
                    raw_body: "Y2VydA==".to_owned()
                },
            ]
        );
        assert_eq!(expanded.required_claims.len(), 1);
        assert_eq!(expanded.required_claims[0].claim_value, None);
    }

    #[test]
    fn alternate_key_needs_exactly_one_kind() {
        let empty = TokenRestrictionState {
            alternate_key: Value::Value(vec![Value::Value(TokenKeyState::default())]),
            ..Default::default()
        };
        assert!(matches!(
            expand_token_restriction(&Value::Value(empty), &AttributePath::default()),
            Err(TranslateError::MissingVariant { block: "alternate_key", .. })
        ));

        let both = TokenRestrictionState {
            primary_symmetric_token_key: value_string("AAAA"),
            primary_x509_token_key_raw: value_string("cert"),
            ..Default::default()
        };
        assert!(matches!(
            expand_token_restriction(&Value::Value(both), &AttributePath::default()),
            Err(TranslateError::ConflictingVariants { block: "token_restriction", .. })
        ));
    }

    #[test]
    fn license_content_key_location() {
        let license = |header: bool, key_id: &'static str| PlayReadyLicenseState {
            license_type: value_string("Persistent"),
            content_type: value_string("Unspecified"),
            content_key_location_from_header_enabled: Value::Value(header),
            content_key_location_from_key_id: value_string(key_id),
            ..Default::default()
        };
        let path = AttributePath::default();

        let from_key = expand_licenses(
            &Value::Value(vec![Value::Value(license(false, "c1a6e3a3-2bd2-4a1b-8f58-1d6e5a7a8f3e"))]),
            &path,
        )
        .unwrap();
        assert_eq!(
            from_key[0].content_key_location,
            PlayReadyContentKeyLocation::FromKeyIdentifier {
                key_id: "c1a6e3a3-2bd2-4a1b-8f58-1d6e5a7a8f3e".to_owned()
            }
        );
        assert!(!from_key[0].allow_test_devices);

        let from_header =
            expand_licenses(&Value::Value(vec![Value::Value(license(true, ""))]), &path).unwrap();
        assert_eq!(
            from_header[0].content_key_location,
            PlayReadyContentKeyLocation::FromHeader
        );

        assert!(expand_licenses(&Value::Value(vec![Value::Value(license(false, ""))]), &path).is_err());
    }
}
