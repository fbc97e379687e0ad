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

//! API Management resources and data sources.

mod data_source;
mod named_value;
mod product;

pub use data_source::ApiManagementDataSource;
pub use named_value::ApiManagementNamedValueResource;
pub use product::ApiManagementProductResource;

use tf_provider::value::Value;

/// Optional flag whose `false` default is left out of the state when unset.
fn flatten_flag(prior: &Value<bool>, remote: Option<bool>) -> Value<bool> {
    match (prior, remote) {
        (_, Some(true)) => Value::Value(true),
        (Value::Value(false), _) => Value::Value(false),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_defaults_stay_null() {
        assert_eq!(flatten_flag(&Value::Null, Some(false)), Value::Null);
        assert_eq!(flatten_flag(&Value::Null, None), Value::Null);
        assert_eq!(
            flatten_flag(&Value::Value(false), Some(false)),
            Value::Value(false)
        );
        assert_eq!(flatten_flag(&Value::Null, Some(true)), Value::Value(true));
    }
}
