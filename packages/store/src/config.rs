//! # Client configuration — `astegni.toml`
//!
//! Defines the TOML configuration the web client is built with (filename:
//! [`AstegniConfig::filename`] = `"astegni.toml"`). It names the backend, the
//! storage schema the session lives under, and the URL conventions the page
//! controllers rely on.
//!
//! ## Structure
//!
//! ```toml
//! [api]
//! base_url = ""                       # empty = same origin
//!
//! [storage]
//! token_key = "token"
//! legacy_token_keys = ["access_token"]
//! user_key = "currentUser"
//! legacy_user_keys = ["user"]
//! active_role_key = "userRole"
//! schema_version_key = "astegni_storage_version"
//! switch_flag_key = "role_switch_in_progress"
//! mirror_legacy_token = true          # keep older page scripts working
//!
//! [navigation]
//! panel_param = "panel"
//! default_panel = "dashboard"
//! landing_page = "/index.html"
//! login_page = "/login"
//! profile_suffix = "-profile.html"
//! ```
//!
//! ## Types
//!
//! | Struct | Purpose |
//! |--------|---------|
//! | [`AstegniConfig`] | Top-level config with TOML (de)serialisation and the canonical filename. |
//! | [`ApiConfig`] | Backend location. |
//! | [`StorageConfig`] | Canonical and legacy storage key names, migration and mirroring switches. |
//! | [`NavigationConfig`] | Query parameter and page names used by panels and the role guard. |
//!
//! All structs implement `Default` with production values so that a missing
//! or empty config file is equivalent to the default configuration.

use serde::{Deserialize, Serialize};

/// Top-level configuration stored in `astegni.toml`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AstegniConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub navigation: NavigationConfig,
}

/// Backend API configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Prefix for every endpoint. Empty string means same origin.
    #[serde(default)]
    pub base_url: String,
}

/// Storage schema for the persisted session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub token_key: String,
    /// Older page scripts read the token under these names.
    pub legacy_token_keys: Vec<String>,
    pub user_key: String,
    pub legacy_user_keys: Vec<String>,
    pub active_role_key: String,
    pub schema_version_key: String,
    /// Tab-scoped key marking a role switch that is navigating to its page.
    pub switch_flag_key: String,
    /// Also write the token under every legacy key on persist.
    pub mirror_legacy_token: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            token_key: "token".to_string(),
            legacy_token_keys: vec!["access_token".to_string()],
            user_key: "currentUser".to_string(),
            legacy_user_keys: vec!["user".to_string()],
            active_role_key: "userRole".to_string(),
            schema_version_key: "astegni_storage_version".to_string(),
            switch_flag_key: "role_switch_in_progress".to_string(),
            mirror_legacy_token: true,
        }
    }
}

impl StorageConfig {
    /// Every key the session may occupy, canonical first.
    pub fn all_session_keys(&self) -> Vec<&str> {
        let mut keys = vec![
            self.token_key.as_str(),
            self.user_key.as_str(),
            self.active_role_key.as_str(),
        ];
        keys.extend(self.legacy_token_keys.iter().map(String::as_str));
        keys.extend(self.legacy_user_keys.iter().map(String::as_str));
        keys
    }
}

/// Page and URL conventions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    pub panel_param: String,
    pub default_panel: String,
    pub landing_page: String,
    pub login_page: String,
    pub profile_suffix: String,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            panel_param: "panel".to_string(),
            default_panel: "dashboard".to_string(),
            landing_page: "/index.html".to_string(),
            login_page: "/login".to_string(),
            profile_suffix: crate::models::PROFILE_SUFFIX.to_string(),
        }
    }
}

impl NavigationConfig {
    /// Site-absolute URL of `role`'s profile page, e.g. `"/tutor-profile.html"`.
    pub fn profile_url(&self, role: crate::models::RoleName) -> String {
        format!("/{}{}", role.as_str(), self.profile_suffix)
    }

    /// The role a profile page path is meant for.
    pub fn expected_role(&self, path: &str) -> Option<crate::models::RoleName> {
        crate::models::RoleName::from_path_with_suffix(path, &self.profile_suffix)
    }
}

impl AstegniConfig {
    /// Builder method to set the API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api.base_url = base_url.into();
        self
    }

    /// The well-known filename for the config file.
    pub fn filename() -> &'static str {
        "astegni.toml"
    }

    /// Parse from TOML string.
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Serialize to TOML string.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
