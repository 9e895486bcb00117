//! Request and response bodies of the identity endpoints.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use store::RoleName;

use super::WireUser;

/// Registration form payload for `POST /api/register`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistrationData {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub password: String,
    /// Role the account is created with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<RoleName>,
}

/// `{access_token, user}` returned by login and registration.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub user: WireUser,
}

/// `{user}` returned by `GET /api/verify-token`.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyResponse {
    pub user: WireUser,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct MyRolesResponse {
    #[serde(default)]
    pub user_roles: Vec<String>,
    #[serde(default)]
    pub active_role: Option<String>,
}

/// Roles the backend says the current user holds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MyRoles {
    pub roles: BTreeSet<RoleName>,
    pub active_role: Option<RoleName>,
}

impl From<MyRolesResponse> for MyRoles {
    fn from(raw: MyRolesResponse) -> Self {
        Self {
            roles: raw
                .user_roles
                .iter()
                .filter_map(|r| r.parse().ok())
                .collect(),
            active_role: raw.active_role.and_then(|r| r.parse().ok()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct SwitchRoleRequest {
    pub role: RoleName,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct AddRoleRequest<'a> {
    pub new_role: RoleName,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SwitchRoleResponse {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub active_role: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<Value>,
}

fn default_success() -> bool {
    true
}

/// Extract a human-readable message from an error body.
///
/// Understands `{"detail": "..."}`, validation lists
/// `{"detail": [{"msg": "..."}, ...]}` and `{"message": "..."}`. Only when the
/// body carries none of these is a generic message built from the status.
pub fn error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| message_from_value(&value))
        .unwrap_or_else(|| format!("Request failed with status {status}"))
}

fn message_from_value(value: &Value) -> Option<String> {
    let from_detail = value.get("detail").and_then(detail_text);
    from_detail.or_else(|| {
        value
            .get("message")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
    })
}

pub(crate) fn detail_text(detail: &Value) -> Option<String> {
    match detail {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str).or(item.as_str()))
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}
