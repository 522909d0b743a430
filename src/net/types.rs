//! Request/response DTOs for the account endpoints.
//!
//! DESIGN
//! ======
//! Request bodies mirror the backend's JSON field names exactly. Response
//! types are lenient: optional fields default, and `device_owner` accepts the
//! boolean or the owner-name string the backend may send.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Deserializer, Serialize};

/// Body of `POST /api/login`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful `POST /api/login` reply.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Opaque session token persisted under `auth_token`.
    pub token: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Body of `POST /api/register`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub serial_number: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub device_name: String,
}

/// Successful `POST /api/register` reply. Nothing here is required.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of `POST /api/device`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceLookupRequest {
    pub serial_number: String,
}

/// `POST /api/device` reply.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceLookupResponse {
    /// True when the serial already belongs to an account.
    #[serde(default, deserialize_with = "deserialize_owner_flag")]
    pub device_owner: bool,
}

/// Error body shape shared by all endpoints (`{status, message}`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

/// Failure of a backend call.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Well-formed reply with a non-success status.
    #[error("request rejected with status {status}")]
    Rejected { status: u16, message: Option<String> },
    /// The request could not be sent or completed.
    #[error("network error: {0}")]
    Network(String),
    /// A success reply whose body could not be decoded.
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Collaborator-provided text for rejections, else `fallback`.
    ///
    /// Transport and decode failures always map to `network`.
    pub fn user_message(&self, fallback: &str, network: &str) -> String {
        match self {
            Self::Rejected { message: Some(message), .. } if !message.trim().is_empty() => message.clone(),
            Self::Rejected { .. } => fallback.to_owned(),
            Self::Network(_) | Self::Decode(_) => network.to_owned(),
        }
    }
}

/// Extract `message` from a rejection body, ignoring bodies that are not JSON.
pub fn rejection_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
}

fn deserialize_owner_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Bool(flag) => flag,
        serde_json::Value::String(owner) => !owner.trim().is_empty(),
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        serde_json::Value::Null | serde_json::Value::Array(_) | serde_json::Value::Object(_) => false,
    })
}
