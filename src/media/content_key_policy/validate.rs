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

use tf_provider::value::{Value, ValueString};
use tf_provider::{AttributePath, Diagnostics};

use crate::timeouts;
use crate::translate::{known, single_variant, Member};
use crate::utils::{report_translate_error, WithValidate};
use crate::validate::{self, check, check_range};

use super::expand::{
    configuration_members, content_key_location_members, item_path, items, restriction_members,
    KeyFields,
};
use super::state::{
    ContentKeyPolicyState, FairPlayState, PlayReadyLicenseState, PolicyOptionState,
    TokenRestrictionState,
};

/// Check a variant group once all of its members are known.
fn check_variant(
    diags: &mut Diagnostics,
    block: &'static str,
    kind: &'static str,
    members: &[Member],
    required: bool,
    path: &AttributePath,
) {
    let Some(candidates) = known(members) else {
        return;
    };
    if let Err(err) = single_variant(block, kind, &candidates, required, path) {
        report_translate_error(diags, &err);
    }
}

fn check_all(diags: &mut Diagnostics, path: &AttributePath, checks: &[(&'static str, &ValueString, validate::Validator)]) {
    for (name, value, validator) in checks {
        check(diags, path.clone().attribute(*name), value, *validator);
    }
}

#[async_trait]
impl<'a> WithValidate for ContentKeyPolicyState<'a> {
    async fn validate(&self, diags: &mut Diagnostics, attr_path: AttributePath) {
        check_all(
            diags,
            &attr_path,
            &[
                ("name", &self.name, validate::content_key_policy_name),
                ("resource_group_name", &self.resource_group_name, validate::resource_group_name),
                (
                    "media_services_account_name",
                    &self.media_services_account_name,
                    validate::media_services_account_name,
                ),
            ],
        );

        if let Value::Value(options) = &self.policy_option {
            if options.is_empty() {
                diags.error_short(
                    "At least one policy_option block is required",
                    attr_path.clone().attribute("policy_option"),
                );
            }
        }
        for (i, option) in items(&self.policy_option) {
            validate_option(diags, option, &item_path(&attr_path, "policy_option", i));
        }

        timeouts::validate(diags, &self.timeouts);
    }
}

fn validate_option(diags: &mut Diagnostics, option: &PolicyOptionState, path: &AttributePath) {
    check(diags, path.clone().attribute("name"), &option.name, validate::not_empty);
    check_variant(
        diags,
        "policy_option",
        "configuration",
        &configuration_members(option),
        true,
        path,
    );
    check_variant(
        diags,
        "policy_option",
        "restriction",
        &restriction_members(option),
        true,
        path,
    );

    if let Some(fairplay) = option.fairplay_configuration.as_ref_option() {
        validate_fairplay(
            diags,
            fairplay,
            &path.clone().attribute("fairplay_configuration").index(0),
        );
    }
    for (i, license) in items(&option.playready_configuration_license) {
        validate_license(
            diags,
            license,
            &item_path(path, "playready_configuration_license", i),
        );
    }
    if let Some(token) = option.token_restriction.as_ref_option() {
        validate_token(
            diags,
            token,
            &path.clone().attribute("token_restriction").index(0),
        );
    }
}

fn validate_fairplay(diags: &mut Diagnostics, fairplay: &FairPlayState, path: &AttributePath) {
    check_all(
        diags,
        path,
        &[
            ("ask", &fairplay.ask, validate::hex),
            ("pfx", &fairplay.pfx, validate::base64),
        ],
    );
    check_range(
        diags,
        path.clone().attribute("rental_duration_seconds"),
        &fairplay.rental_duration_seconds,
        0,
        i64::from(u32::MAX),
    );
}

fn validate_license(diags: &mut Diagnostics, license: &PlayReadyLicenseState, path: &AttributePath) {
    check_variant(
        diags,
        "playready_configuration_license",
        "content key location",
        &content_key_location_members(license),
        true,
        path,
    );
    check_all(
        diags,
        path,
        &[
            ("begin_date", &license.begin_date, validate::rfc3339),
            ("expiration_date", &license.expiration_date, validate::rfc3339),
            (
                "content_key_location_from_key_id",
                &license.content_key_location_from_key_id,
                validate::uuid,
            ),
        ],
    );

    if let Some(play_right) = license.play_right.as_ref_option() {
        let path = path.clone().attribute("play_right").index(0);
        for (name, value) in [
            ("scms_restriction", &play_right.scms_restriction),
            (
                "agc_and_color_stripe_restriction",
                &play_right.agc_and_color_stripe_restriction,
            ),
        ] {
            check_range(diags, path.clone().attribute(name), value, 0, 3);
        }
    }
}

fn validate_token(diags: &mut Diagnostics, token: &TokenRestrictionState, path: &AttributePath) {
    check_all(
        diags,
        path,
        &[
            ("issuer", &token.issuer, validate::not_empty),
            ("audience", &token.audience, validate::not_empty),
            (
                "open_id_connect_discovery_document",
                &token.open_id_connect_discovery_document,
                validate::https_url,
            ),
            (
                "primary_symmetric_token_key",
                &token.primary_symmetric_token_key,
                validate::base64,
            ),
        ],
    );
    check_variant(
        diags,
        "token_restriction",
        "token key",
        &KeyFields::primary(token).members(),
        false,
        path,
    );

    for (i, key) in items(&token.alternate_key) {
        let key_path = item_path(path, "alternate_key", i);
        check_variant(
            diags,
            "alternate_key",
            "token key",
            &KeyFields::alternate(key).members(),
            true,
            &key_path,
        );
        check(
            diags,
            key_path.attribute("symmetric_token_key"),
            &key.symmetric_token_key,
            validate::base64,
        );
    }
}
