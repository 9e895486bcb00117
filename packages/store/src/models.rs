//! # Domain models for users and roles
//!
//! Defines the canonical user shape shared by every crate in the workspace.
//! The backend returns users as snake_case JSON; the same shape is what
//! [`crate::SessionStore`] writes to durable storage, so one `serde` mapping
//! serves both directions.
//!
//! ## Types
//!
//! | Type | Represents |
//! |------|-----------|
//! | [`RoleName`] | One of the fixed roles a user can hold. Knows its profile page (`tutor` → `tutor-profile.html`). |
//! | [`UserRecord`] | A normalized user profile. `roles` holds every role the user has; `role` is the legacy single-role field older backends still send. |
//!
//! ## Normalization
//!
//! [`UserRecord::normalize`] is the single place where `roles` is derived from
//! `role`: when the backend sends only the legacy field, `roles` becomes the
//! one-element set `{role}`. Deserialization is lenient about role strings it
//! does not know (they are dropped with a warning) so that a new backend role
//! never makes an otherwise valid user unreadable.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// A role a user can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleName {
    Student,
    Tutor,
    Parent,
    Advertiser,
    Admin,
    User,
}

impl RoleName {
    pub const ALL: [RoleName; 6] = [
        RoleName::Student,
        RoleName::Tutor,
        RoleName::Parent,
        RoleName::Advertiser,
        RoleName::Admin,
        RoleName::User,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoleName::Student => "student",
            RoleName::Tutor => "tutor",
            RoleName::Parent => "parent",
            RoleName::Advertiser => "advertiser",
            RoleName::Admin => "admin",
            RoleName::User => "user",
        }
    }

    /// Human-readable label for menus and notifications.
    pub fn label(&self) -> &'static str {
        match self {
            RoleName::Student => "Student",
            RoleName::Tutor => "Tutor",
            RoleName::Parent => "Parent",
            RoleName::Advertiser => "Advertiser",
            RoleName::Admin => "Admin",
            RoleName::User => "User",
        }
    }

    /// The profile page file name for this role, e.g. `"tutor-profile.html"`.
    pub fn profile_page(&self) -> String {
        format!("{}{}", self.as_str(), PROFILE_SUFFIX)
    }

    /// Derive the role a profile page is meant for from a URL path.
    ///
    /// Only the last path segment counts, and it must be exactly
    /// `{role}-profile.html` (query and fragment are ignored).
    pub fn from_profile_path(path: &str) -> Option<RoleName> {
        Self::from_path_with_suffix(path, PROFILE_SUFFIX)
    }

    /// Like [`from_profile_path`](Self::from_profile_path) with a configurable
    /// page suffix.
    pub fn from_path_with_suffix(path: &str, suffix: &str) -> Option<RoleName> {
        let path = path.split(&['?', '#'][..]).next().unwrap_or_default();
        let page = path.rsplit('/').next().unwrap_or_default();
        let role = page.strip_suffix(suffix)?;
        role.parse().ok()
    }
}

/// Suffix shared by every role's profile page.
pub const PROFILE_SUFFIX: &str = "-profile.html";

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role: {}", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for RoleName {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().to_ascii_lowercase();
        RoleName::ALL
            .into_iter()
            .find(|role| role.as_str() == trimmed)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// Normalized user profile.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// Legacy single-role field.
    #[serde(default, deserialize_with = "lenient_role")]
    pub role: Option<RoleName>,
    #[serde(default, deserialize_with = "lenient_roles")]
    pub roles: BTreeSet<RoleName>,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub email_verified: bool,
}

fn default_true() -> bool {
    true
}

impl UserRecord {
    /// Fill `roles` from the legacy `role` field when the backend sent none.
    pub fn normalize(mut self) -> Self {
        if self.roles.is_empty() {
            if let Some(role) = self.role {
                self.roles.insert(role);
            }
        }
        self
    }

    pub fn has_role(&self, role: RoleName) -> bool {
        self.roles.contains(&role)
    }

    /// The role to treat as active when nothing else says otherwise.
    pub fn default_role(&self) -> Option<RoleName> {
        self.role
            .filter(|r| self.roles.is_empty() || self.roles.contains(r))
            .or_else(|| self.roles.iter().next().copied())
    }

    /// Full name, falling back to the email address.
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let name = name.trim();
        if name.is_empty() {
            self.email.clone().unwrap_or_default()
        } else {
            name.to_string()
        }
    }
}

fn lenient_role<'de, D>(deserializer: D) -> Result<Option<RoleName>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| parse_or_warn(&s)))
}

fn lenient_roles<'de, D>(deserializer: D) -> Result<BTreeSet<RoleName>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<String>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .iter()
        .filter_map(|s| parse_or_warn(s))
        .collect())
}

fn parse_or_warn(raw: &str) -> Option<RoleName> {
    if raw.trim().is_empty() {
        return None;
    }
    match raw.parse() {
        Ok(role) => Some(role),
        Err(e) => {
            tracing::warn!(role = raw, "ignoring {e}");
            None
        }
    }
}
