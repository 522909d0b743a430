//! Backend seam and its HTTP implementation.
//!
//! Client-side (hydrate): real HTTP calls via `gloo-net`.
//! Server-side (SSR) and native tests: `HttpBackend` reports every call as a
//! network failure since these endpoints are only meaningful in the browser.
//!
//! ERROR HANDLING
//! ==============
//! Every call returns `Result<_, ApiError>`. Non-2xx replies become
//! `Rejected` carrying the body's `message` when present, so the controller
//! can pick between collaborator text and its own fallback.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::types::{
    ApiError, DeviceLookupRequest, DeviceLookupResponse, LoginRequest, LoginResponse, RegisterRequest,
    RegisterResponse,
};
use crate::config::FormConfig;

pub const LOGIN_PATH: &str = "/api/login";
pub const REGISTER_PATH: &str = "/api/register";
pub const DEVICE_PATH: &str = "/api/device";

#[cfg(not(feature = "hydrate"))]
const NOT_AVAILABLE: &str = "not available on server";

/// The account backend as seen by the form controller.
#[async_trait(?Send)]
pub trait Backend {
    /// `POST /api/login`.
    ///
    /// # Errors
    ///
    /// `Rejected` on a non-success status, `Network`/`Decode` otherwise.
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError>;

    /// `POST /api/register`.
    ///
    /// # Errors
    ///
    /// `Rejected` on a non-success status, `Network` when the call fails.
    async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse, ApiError>;

    /// `POST /api/device`.
    ///
    /// # Errors
    ///
    /// `Rejected` on a non-success status, `Network`/`Decode` otherwise.
    async fn lookup_device(&self, request: &DeviceLookupRequest) -> Result<DeviceLookupResponse, ApiError>;
}

/// `Backend` over `fetch`.
#[derive(Clone, Debug)]
pub struct HttpBackend {
    api_base: String,
}

impl HttpBackend {
    pub fn new(config: &FormConfig) -> Self {
        Self { api_base: config.api_base.clone() }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_base)
    }

    /// POST `body` as JSON and return the raw success body.
    async fn send_json<B: Serialize>(&self, path: &str, body: &B) -> Result<String, ApiError> {
        let url = self.url(path);
        log::debug!("POST {url}");
        #[cfg(feature = "hydrate")]
        {
            let resp = gloo_net::http::Request::post(&url)
                .json(body)
                .map_err(|e| ApiError::Network(e.to_string()))?
                .send()
                .await
                .map_err(|e| ApiError::Network(e.to_string()))?;
            if !resp.ok() {
                let status = resp.status();
                let text = resp.text().await.unwrap_or_default();
                return Err(rejected(status, &text));
            }
            resp.text().await.map_err(|e| ApiError::Network(e.to_string()))
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = body;
            Err(ApiError::Network(NOT_AVAILABLE.to_owned()))
        }
    }
}

#[async_trait(?Send)]
impl Backend for HttpBackend {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let text = self.send_json(LOGIN_PATH, request).await?;
        decode_body(&text)
    }

    async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse, ApiError> {
        let text = self.send_json(REGISTER_PATH, request).await?;
        Ok(decode_body(&text).unwrap_or_default())
    }

    async fn lookup_device(&self, request: &DeviceLookupRequest) -> Result<DeviceLookupResponse, ApiError> {
        let text = self.send_json(DEVICE_PATH, request).await?;
        decode_body(&text)
    }
}

/// Build a `Rejected` error from a failed reply.
#[cfg(any(test, feature = "hydrate"))]
fn rejected(status: u16, body: &str) -> ApiError {
    ApiError::Rejected { status, message: super::types::rejection_message(body) }
}

/// Decode a success body; an empty body decodes as `{}`.
fn decode_body<R: DeserializeOwned>(text: &str) -> Result<R, ApiError> {
    let text = if text.trim().is_empty() { "{}" } else { text };
    serde_json::from_str(text).map_err(|e| ApiError::Decode(e.to_string()))
}
