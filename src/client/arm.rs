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

//! Resource Manager transport over HTTPS.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, LOCATION, RETRY_AFTER};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{ApiError, Method, Request, Transport};

pub const DEFAULT_ENDPOINT: &str = "https://management.azure.com";

const ASYNC_OPERATION: &str = "Azure-AsyncOperation";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OperationStatus {
    status: Option<String>,
    error: Option<ErrorDetail>,
}

/// Talks to the Resource Manager endpoint with a bearer token.
#[derive(Debug, Clone)]
pub struct ArmTransport {
    client: reqwest::Client,
    endpoint: String,
    token: String,
    poll_interval: Duration,
}

impl ArmTransport {
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> Result<Self, ApiError> {
        let endpoint: String = endpoint.into();
        let token: String = token.into();
        if token.is_empty() {
            return Err(ApiError::InvalidConfig(
                "an access token is required".to_owned(),
            ));
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!(
                "terraform-provider-azurerm/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_owned(),
            token,
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    /// Delay between two polls of a long running operation when the API gives no hint.
    #[cfg(test)]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    fn url(&self, path: &str, api_version: &str) -> String {
        format!("{}{}?api-version={}", self.endpoint, path, api_version)
    }

    async fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response, ApiError> {
        let method = match method {
            Method::Get => reqwest::Method::GET,
            Method::Put => reqwest::Method::PUT,
            Method::Post => reqwest::Method::POST,
            Method::Delete => reqwest::Method::DELETE,
        };
        debug!(method = %method, url = %url, "Sending ARM request");

        let mut builder = self.client.request(method, url).bearer_auth(&self.token);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = builder.send().await?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(error_from_response(response).await)
        }
    }

    /// Poll a long running operation until it reaches a terminal status.
    async fn wait_for_operation(&self, url: &str) -> Result<Option<serde_json::Value>, ApiError> {
        loop {
            let response = self.execute(Method::Get, url, None).await?;
            let delay = retry_after(response.headers()).unwrap_or(self.poll_interval);

            if response.status() == StatusCode::ACCEPTED {
                tokio::time::sleep(delay).await;
                continue;
            }

            let body = read_body(response).await?;
            let status = body
                .as_ref()
                .and_then(|body| OperationStatus::deserialize(body).ok());

            match status {
                Some(OperationStatus {
                    status: Some(status),
                    error,
                }) => match status.as_str() {
                    "Succeeded" => return Ok(None),
                    "Failed" | "Canceled" => {
                        let message = error
                            .and_then(|error| error.message)
                            .unwrap_or_default();
                        warn!(url = %url, status = %status, "Long running operation failed");
                        return Err(ApiError::OperationFailed { status, message });
                    }
                    _ => tokio::time::sleep(delay).await,
                },
                // `Location` polling: the final response is the result itself
                _ => return Ok(body),
            }
        }
    }
}

#[async_trait]
impl Transport for ArmTransport {
    async fn send(&self, request: Request) -> Result<Option<serde_json::Value>, ApiError> {
        let url = self.url(&request.path, request.api_version);
        let response = self
            .execute(request.method, &url, request.body.as_ref())
            .await?;

        let status = response.status();
        let operation = operation_url(response.headers());
        let body = read_body(response).await?;

        let Some(operation) = operation else {
            return Ok(body);
        };
        if status != StatusCode::CREATED && status != StatusCode::ACCEPTED {
            return Ok(body);
        }

        debug!(url = %url, operation = %operation, "Waiting for long running operation");
        let result = self.wait_for_operation(&operation).await?;

        match request.method {
            Method::Put => {
                let response = self.execute(Method::Get, &url, None).await?;
                read_body(response).await
            }
            Method::Delete => Ok(None),
            Method::Get | Method::Post => Ok(result.or(body)),
        }
    }
}

fn operation_url(headers: &HeaderMap) -> Option<String> {
    headers
        .get(ASYNC_OPERATION)
        .or_else(|| headers.get(LOCATION))
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok())
        .map(Duration::from_secs)
}

async fn read_body(response: reqwest::Response) -> Result<Option<serde_json::Value>, ApiError> {
    let bytes = response.bytes().await?;
    if bytes.is_empty() {
        Ok(None)
    } else {
        Ok(Some(serde_json::from_slice(&bytes)?))
    }
}

async fn error_from_response(response: reqwest::Response) -> ApiError {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();

    match serde_json::from_str::<ErrorResponse>(&text)
        .ok()
        .and_then(|response| response.error)
    {
        Some(detail) => ApiError::Status {
            status,
            code: detail.code,
            message: detail.message.unwrap_or_default(),
        },
        None => ApiError::Status {
            status,
            code: None,
            message: text,
        },
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const POLICY: &str = "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Media/mediaservices/account1/contentKeyPolicies/policy1";

    fn transport(server: &MockServer) -> ArmTransport {
        ArmTransport::new(server.uri(), "token")
            .unwrap()
            .with_poll_interval(Duration::from_millis(10))
    }

    fn get(path: &str) -> Request {
        Request {
            method: Method::Get,
            path: path.to_owned(),
            api_version: "2021-11-01",
            body: None,
        }
    }

    #[test]
    fn token_is_required() {
        assert!(matches!(
            ArmTransport::new(DEFAULT_ENDPOINT, ""),
            Err(ApiError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn get_sends_token_and_api_version() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(POLICY))
            .and(query_param("api-version", "2021-11-01"))
            .and(header("authorization", "Bearer token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "policy1"})))
            .expect(1)
            .mount(&server)
            .await;

        let body = transport(&server).send(get(POLICY)).await.unwrap();
        assert_eq!(body, Some(json!({"name": "policy1"})));
    }

    #[tokio::test]
    async fn not_found_is_reported_with_code() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(POLICY))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"code": "ResourceNotFound", "message": "policy1 was not found"}
            })))
            .mount(&server)
            .await;

        let err = transport(&server).send(get(POLICY)).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "unexpected status 404 with code ResourceNotFound: policy1 was not found"
        );
    }

    #[tokio::test]
    async fn put_waits_for_async_operation() {
        let server = MockServer::start().await;
        let operation = format!("{}/operations/op1", server.uri());

        Mock::given(method("PUT"))
            .and(path(POLICY))
            .respond_with(
                ResponseTemplate::new(201)
                    .insert_header(ASYNC_OPERATION, operation.as_str())
                    .set_body_json(json!({"name": "policy1"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/operations/op1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "Succeeded"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(POLICY))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"name": "policy1", "properties": {"policyId": "p"}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let body = transport(&server)
            .send(Request {
                method: Method::Put,
                path: POLICY.to_owned(),
                api_version: "2021-11-01",
                body: Some(json!({"properties": {}})),
            })
            .await
            .unwrap();
        assert_eq!(
            body,
            Some(json!({"name": "policy1", "properties": {"policyId": "p"}}))
        );
    }

    #[tokio::test]
    async fn failed_operation_is_an_error() {
        let server = MockServer::start().await;
        let operation = format!("{}/operations/op2", server.uri());

        Mock::given(method("DELETE"))
            .and(path(POLICY))
            .respond_with(ResponseTemplate::new(202).insert_header(ASYNC_OPERATION, operation.as_str()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/operations/op2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "Failed",
                "error": {"code": "Conflict", "message": "policy in use"}
            })))
            .mount(&server)
            .await;

        let err = transport(&server)
            .send(Request {
                method: Method::Delete,
                path: POLICY.to_owned(),
                api_version: "2021-11-01",
                body: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ApiError::OperationFailed { ref status, ref message } if status == "Failed" && message == "policy in use"
        ));
    }

    #[tokio::test]
    async fn empty_delete_response() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(POLICY))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let body = transport(&server)
            .send(Request {
                method: Method::Delete,
                path: POLICY.to_owned(),
                api_version: "2021-11-01",
                body: None,
            })
            .await
            .unwrap();
        assert_eq!(body, None);
    }
}
