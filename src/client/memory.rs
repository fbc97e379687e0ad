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

//! In-memory stand-in for the Resource Manager API.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use super::{ApiError, Clients, Method, Request, Transport};

const WITH_SECRETS: &str = "/getPolicyPropertiesWithSecrets";

#[derive(Debug, Default)]
pub struct MemoryTransport {
    objects: Mutex<BTreeMap<String, Value>>,
    requests: Mutex<Vec<(Method, String)>>,
}

impl MemoryTransport {
    pub fn insert(&self, path: &str, object: Value) {
        self.objects.lock().unwrap().insert(path.to_owned(), object);
    }

    pub fn object(&self, path: &str) -> Option<Value> {
        self.objects.lock().unwrap().get(path).cloned()
    }

    pub fn requests(&self) -> Vec<(Method, String)> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests with `method` sent so far.
    pub fn count(&self, method: Method) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| *m == method)
            .count()
    }
}

fn not_found(path: &str) -> ApiError {
    ApiError::Status {
        status: 404,
        code: Some("ResourceNotFound".to_owned()),
        message: format!("{path} was not found"),
    }
}

/// Secret named values are returned without their value, FairPlay
/// configurations without their keys.
fn hide_secrets(mut object: Value) -> Value {
    if let Some(properties) = object.get_mut("properties").and_then(Value::as_object_mut) {
        if properties.get("secret") == Some(&Value::Bool(true)) {
            properties.remove("value");
        }
        if let Some(options) = properties.get_mut("options").and_then(Value::as_array_mut) {
            for configuration in options
                .iter_mut()
                .filter_map(|option| option.get_mut("configuration"))
                .filter_map(Value::as_object_mut)
            {
                for secret in ["ask", "fairPlayPfx", "fairPlayPfxPassword"] {
                    configuration.remove(secret);
                }
            }
        }
    }
    object
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send(&self, request: Request) -> Result<Option<Value>, ApiError> {
        self.requests
            .lock()
            .unwrap()
            .push((request.method, request.path.clone()));

        let mut objects = self.objects.lock().unwrap();
        match request.method {
            Method::Get => objects
                .get(&request.path)
                .cloned()
                .map(|object| Some(hide_secrets(object)))
                .ok_or_else(|| not_found(&request.path)),
            Method::Post => {
                let path = request
                    .path
                    .strip_suffix(WITH_SECRETS)
                    .ok_or_else(|| not_found(&request.path))?;
                objects
                    .get(path)
                    .and_then(|object| object.get("properties").cloned())
                    .map(Some)
                    .ok_or_else(|| not_found(path))
            }
            Method::Put => {
                let mut object = request.body.unwrap_or_else(|| Value::Object(Default::default()));
                if let Some(fields) = object.as_object_mut() {
                    let name = request.path.rsplit('/').next().unwrap_or_default();
                    fields.insert("id".to_owned(), Value::String(request.path.clone()));
                    fields.insert("name".to_owned(), Value::String(name.to_owned()));
                }
                objects.insert(request.path, object.clone());
                Ok(Some(hide_secrets(object)))
            }
            Method::Delete => objects
                .remove(&request.path)
                .map(|_| None)
                .ok_or_else(|| not_found(&request.path)),
        }
    }
}

/// Client bundle backed by a fresh in-memory transport.
pub fn clients() -> (Clients, Arc<MemoryTransport>) {
    let transport = Arc::new(MemoryTransport::default());
    (Clients::new("sub", transport.clone()), transport)
}
