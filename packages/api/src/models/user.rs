//! # User as the backend sends it
//!
//! The backend embeds a user object in the login, registration and
//! verification responses. It is the canonical [`UserRecord`] shape plus an
//! optional `active_role`, which the client keeps separately in the session
//! rather than on the record.
//!
//! [`WireUser::into_parts`] is where the gateway normalizes the record (legacy
//! `role` → `roles`) before anything else sees it.

use serde::Deserialize;
use store::{RoleName, UserRecord};

/// User object embedded in backend responses.
#[derive(Debug, Clone, Deserialize)]
pub struct WireUser {
    #[serde(flatten)]
    pub record: UserRecord,
    #[serde(default)]
    pub active_role: Option<String>,
}

impl WireUser {
    /// Split into the normalized record and the active role, if the backend
    /// sent a recognisable one.
    pub fn into_parts(self) -> (UserRecord, Option<RoleName>) {
        let active_role = self.active_role.and_then(|raw| match raw.parse() {
            Ok(role) => Some(role),
            Err(e) => {
                tracing::warn!(role = raw.as_str(), "ignoring active role: {e}");
                None
            }
        });
        (self.record.normalize(), active_role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_parts_normalizes_roles() {
        let wire: WireUser = serde_json::from_str(
            r#"{"id": 1, "first_name": "A", "last_name": "B", "role": "tutor"}"#,
        )
        .unwrap();
        let (user, active) = wire.into_parts();

        assert!(user.has_role(RoleName::Tutor));
        assert_eq!(user.roles.len(), 1);
        assert_eq!(active, None);
    }

    #[test]
    fn test_active_role_is_parsed() {
        let wire: WireUser = serde_json::from_str(
            r#"{"id": 2, "roles": ["student", "parent"], "active_role": "parent"}"#,
        )
        .unwrap();
        let (user, active) = wire.into_parts();

        assert_eq!(user.roles.len(), 2);
        assert_eq!(active, Some(RoleName::Parent));
    }
}
