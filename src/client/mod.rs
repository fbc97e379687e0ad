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

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tf_provider::Diagnostics;
use thiserror::Error;

use crate::locks::LockRegistry;

pub mod api_management;
pub mod arm;
pub mod media;
#[cfg(test)]
pub mod memory;

pub use api_management::ApiManagementClient;
pub use media::MediaClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Put,
    Post,
    Delete,
}

/// A request against the Resource Manager API, relative to the endpoint.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub api_version: &'static str,
    pub body: Option<serde_json::Value>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// The API answered with a non-success status code.
    #[error("unexpected status {status} with code {}: {message}", .code.as_deref().unwrap_or("Unknown"))]
    Status {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("sending request: {0}")]
    Http(#[from] reqwest::Error),

    #[error("decoding response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("response body was empty")]
    EmptyBody,

    /// A long running operation reached a terminal, unsuccessful status.
    #[error("long running operation finished with status {status}: {message}")]
    OperationFailed { status: String, message: String },

    #[error("context deadline exceeded after {0:?}")]
    DeadlineExceeded(Duration),

    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The remote object does not exist (any more).
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Carries requests to the Resource Manager API.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Send a request, waiting for long running operations to finish.
    ///
    /// Returns `Ok(None)` when the final response has no body.
    async fn send(&self, request: Request) -> Result<Option<serde_json::Value>, ApiError>;
}

fn decode<T: DeserializeOwned>(body: Option<serde_json::Value>) -> Result<T, ApiError> {
    Ok(serde_json::from_value(body.ok_or(ApiError::EmptyBody)?)?)
}

pub(crate) async fn get<T: DeserializeOwned>(
    transport: &dyn Transport,
    path: String,
    api_version: &'static str,
) -> Result<T, ApiError> {
    decode(
        transport
            .send(Request {
                method: Method::Get,
                path,
                api_version,
                body: None,
            })
            .await?,
    )
}

pub(crate) async fn put<B: Serialize, T: DeserializeOwned>(
    transport: &dyn Transport,
    path: String,
    api_version: &'static str,
    body: &B,
) -> Result<T, ApiError> {
    decode(
        transport
            .send(Request {
                method: Method::Put,
                path,
                api_version,
                body: Some(serde_json::to_value(body)?),
            })
            .await?,
    )
}

pub(crate) async fn post<T: DeserializeOwned>(
    transport: &dyn Transport,
    path: String,
    api_version: &'static str,
) -> Result<T, ApiError> {
    decode(
        transport
            .send(Request {
                method: Method::Post,
                path,
                api_version,
                body: None,
            })
            .await?,
    )
}

pub(crate) async fn delete(
    transport: &dyn Transport,
    path: String,
    api_version: &'static str,
) -> Result<(), ApiError> {
    transport
        .send(Request {
            method: Method::Delete,
            path,
            api_version,
            body: None,
        })
        .await?;
    Ok(())
}

/// Everything a resource needs to talk to Azure.
#[derive(Clone)]
pub struct Clients {
    pub subscription_id: String,
    pub api_management: ApiManagementClient,
    pub media: MediaClient,
    pub locks: LockRegistry,
}

impl Clients {
    pub fn new(subscription_id: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            api_management: ApiManagementClient::new(transport.clone()),
            media: MediaClient::new(transport),
            locks: LockRegistry::default(),
        }
    }
}

impl std::fmt::Debug for Clients {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Clients")
            .field("subscription_id", &self.subscription_id)
            .finish_non_exhaustive()
    }
}

/// Clients shared between the provider and its resources, set once by `configure`.
#[derive(Debug, Clone, Default)]
pub struct ClientHandle(Arc<OnceLock<Clients>>);

impl ClientHandle {
    #[cfg(test)]
    pub fn configured(clients: Clients) -> Self {
        let handle = Self::default();
        let _ = handle.0.set(clients);
        handle
    }

    /// Returns the rejected bundle when the handle was already configured.
    pub fn set(&self, clients: Clients) -> Result<(), Clients> {
        self.0.set(clients)
    }

    pub fn get(&self, diags: &mut Diagnostics) -> Option<&Clients> {
        let clients = self.0.get();
        if clients.is_none() {
            diags.root_error(
                "Provider not configured",
                "The azurerm provider must be configured before its resources are used.",
            );
        }
        clients
    }
}
