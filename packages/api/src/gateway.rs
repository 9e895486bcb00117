//! # AuthGateway — identity operations against the backend
//!
//! [`AuthGateway`] performs login, registration, token verification and role
//! switching over an [`HttpTransport`], and hands every user it receives to
//! [`SessionStore`] only after normalizing it ([`WireUser::into_parts`]).
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Success body |
//! |--------|----------|------|--------------|
//! | [`login`](AuthGateway::login) | `POST /api/login` | — | `{access_token, user}` |
//! | [`register`](AuthGateway::register) | `POST /api/register` | — | `{access_token, user}` |
//! | [`verify_token`](AuthGateway::verify_token) | `GET /api/verify-token` | bearer | `{user}` |
//! | [`my_roles`](AuthGateway::my_roles) | `GET /api/my-roles` | bearer | `{user_roles, active_role}` |
//! | [`switch_role`](AuthGateway::switch_role) | `POST /api/switch-role` | bearer | `{success, active_role}` |
//! | [`add_role`](AuthGateway::add_role) | `POST /api/add-role` | bearer | `{user_roles, active_role}` |
//!
//! ## Failure semantics
//!
//! Failures are returned, never thrown across the boundary:
//!
//! - network failure → [`AuthError::Unreachable`]
//! - non-2xx → [`AuthError::Rejected`] carrying the server's `detail` text
//!   (401 on bearer endpoints → [`AuthError::Unauthorized`])
//! - unexpected body → [`AuthError::Malformed`]
//!
//! [`verify_token`](AuthGateway::verify_token) collapses all of these to
//! `false` and leaves storage untouched: deciding to clear the session is the
//! caller's job.

use serde_json::Value;
use store::{KeyValueStore, RoleName, SessionStore, UserRecord};

use crate::error::{AuthError, TransportError};
use crate::models::{
    detail_text, AddRoleRequest, MyRoles, MyRolesResponse, RegistrationData, SwitchRoleRequest,
    SwitchRoleResponse, TokenResponse, VerifyResponse,
};
use crate::transport::{ApiRequest, HttpTransport, Method, RawResponse};

pub const LOGIN_ENDPOINT: &str = "/api/login";
pub const REGISTER_ENDPOINT: &str = "/api/register";
pub const VERIFY_TOKEN_ENDPOINT: &str = "/api/verify-token";
pub const MY_ROLES_ENDPOINT: &str = "/api/my-roles";
pub const SWITCH_ROLE_ENDPOINT: &str = "/api/switch-role";
pub const ADD_ROLE_ENDPOINT: &str = "/api/add-role";

/// Backend client for identity operations.
#[derive(Clone)]
pub struct AuthGateway<T, S> {
    transport: T,
    session: SessionStore<S>,
    base_url: String,
}

impl<T: HttpTransport, S: KeyValueStore> AuthGateway<T, S> {
    pub fn new(transport: T, session: SessionStore<S>, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            session,
            base_url: base_url.into(),
        }
    }

    pub fn session(&self) -> &SessionStore<S> {
        &self.session
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), endpoint)
    }

    /// Send a request to `endpoint`.
    ///
    /// With `authenticated` set, the current token (if any) is attached as a
    /// bearer credential. `body` is sent as JSON. Network failures are
    /// returned as-is; HTTP error statuses are ordinary responses.
    pub async fn api_call(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<Value>,
        authenticated: bool,
    ) -> Result<RawResponse, TransportError> {
        let bearer = if authenticated {
            let token = self.session.token();
            if token.is_none() {
                tracing::debug!(endpoint, "authenticated call without a token");
            }
            token
        } else {
            None
        };
        let body = body.map(|b| serde_json::to_string(&b)).transpose()?;

        tracing::debug!(%method, endpoint, "api call");
        self.transport
            .send(ApiRequest {
                method,
                url: self.url(endpoint),
                bearer,
                body,
            })
            .await
    }

    /// Log in with email and password; on success the session is persisted.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserRecord, AuthError> {
        let body = serde_json::json!({ "email": email, "password": password });
        let response = self
            .api_call(LOGIN_ENDPOINT, Method::POST, Some(body), false)
            .await
            .map_err(network_failure)?;
        self.accept_token_response(response)
    }

    /// Create an account; same contract as [`login`](Self::login).
    pub async fn register(&self, data: &RegistrationData) -> Result<UserRecord, AuthError> {
        let body = serde_json::to_value(data).map_err(|e| AuthError::Malformed(e.to_string()))?;
        let response = self
            .api_call(REGISTER_ENDPOINT, Method::POST, Some(body), false)
            .await
            .map_err(network_failure)?;
        self.accept_token_response(response)
    }

    fn accept_token_response(&self, response: RawResponse) -> Result<UserRecord, AuthError> {
        if !response.is_success() {
            let message = response.error_message();
            tracing::info!(status = response.status, "authentication rejected: {message}");
            return Err(AuthError::Rejected(message));
        }
        let parsed: TokenResponse = response
            .json()
            .map_err(|e| AuthError::Malformed(e.to_string()))?;
        let (user, active_role) = parsed.user.into_parts();
        if user.roles.is_empty() {
            return Err(AuthError::Malformed("user has no roles".to_string()));
        }

        let active_role = active_role.or_else(|| user.default_role());
        self.session.persist(&parsed.access_token, user.clone())?;
        if let Err(e) = self.session.set_active_role(active_role) {
            tracing::warn!("failed to store active role: {e}");
        }
        tracing::info!(user_id = user.id, ?active_role, "logged in");
        Ok(user)
    }

    /// Check the current token with the backend.
    ///
    /// On success the stored user is replaced with the fresh one. Any failure
    /// returns `false`; the session is left for the caller to clear.
    pub async fn verify_token(&self) -> bool {
        let Some(token) = self.session.token() else {
            return false;
        };
        let response = match self
            .api_call(VERIFY_TOKEN_ENDPOINT, Method::GET, None, true)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("token verification failed: {e}");
                return false;
            }
        };
        if !response.is_success() {
            tracing::info!(status = response.status, "token rejected");
            return false;
        }
        let parsed: VerifyResponse = match response.json() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("malformed verification response: {e}");
                return false;
            }
        };

        let (user, active_role) = parsed.user.into_parts();
        if user.roles.is_empty() {
            tracing::warn!(user_id = user.id, "verified user has no roles");
            return false;
        }
        if let Err(e) = self.session.persist(&token, user) {
            tracing::warn!("failed to store verified user: {e}");
            return false;
        }
        if let Some(role) = active_role {
            if let Err(e) = self.session.set_active_role(Some(role)) {
                tracing::warn!("failed to store active role: {e}");
            }
        }
        true
    }

    /// Roles the backend says the current user holds.
    pub async fn my_roles(&self) -> Result<MyRoles, AuthError> {
        let response = self
            .api_call(MY_ROLES_ENDPOINT, Method::GET, None, true)
            .await
            .map_err(network_failure)?;
        check_bearer_status(&response)?;
        response
            .json::<MyRolesResponse>()
            .map(MyRoles::from)
            .map_err(|e| AuthError::Malformed(e.to_string()))
    }

    /// Ask the backend to make `role` the active role. Returns the role the
    /// backend reports as active. The session is not touched.
    pub async fn switch_role(&self, role: RoleName) -> Result<RoleName, AuthError> {
        let body = serde_json::to_value(SwitchRoleRequest { role })
            .map_err(|e| AuthError::Malformed(e.to_string()))?;
        let response = self
            .api_call(SWITCH_ROLE_ENDPOINT, Method::POST, Some(body), true)
            .await
            .map_err(network_failure)?;
        check_bearer_status(&response)?;

        let parsed: SwitchRoleResponse = response
            .json()
            .map_err(|e| AuthError::Malformed(e.to_string()))?;
        if !parsed.success {
            let message = parsed
                .detail
                .as_ref()
                .and_then(detail_text)
                .or(parsed.message)
                .unwrap_or_else(|| format!("Could not switch to {}", role.label()));
            return Err(AuthError::Rejected(message));
        }
        Ok(parsed
            .active_role
            .and_then(|r| r.parse().ok())
            .unwrap_or(role))
    }

    /// Add `role` to the current account, confirming with the account
    /// password. The stored user's roles are updated on success.
    pub async fn add_role(&self, role: RoleName, password: &str) -> Result<MyRoles, AuthError> {
        let body = serde_json::to_value(AddRoleRequest {
            new_role: role,
            password,
        })
        .map_err(|e| AuthError::Malformed(e.to_string()))?;
        let response = self
            .api_call(ADD_ROLE_ENDPOINT, Method::POST, Some(body), true)
            .await
            .map_err(network_failure)?;
        check_bearer_status(&response)?;

        let mut roles = response
            .json::<MyRolesResponse>()
            .map(MyRoles::from)
            .map_err(|e| AuthError::Malformed(e.to_string()))?;
        if roles.roles.is_empty() {
            roles.roles = self.session.user().map(|u| u.roles).unwrap_or_default();
            roles.roles.insert(role);
        }
        self.session.update_roles(roles.roles.clone())?;
        tracing::info!(%role, "role added");
        Ok(roles)
    }

    /// Forget the session locally.
    pub fn logout(&self) {
        self.session.clear();
        tracing::info!("logged out");
    }
}

fn network_failure(e: TransportError) -> AuthError {
    tracing::warn!("backend unreachable: {e}");
    AuthError::Unreachable
}

fn check_bearer_status(response: &RawResponse) -> Result<(), AuthError> {
    match response.status {
        401 => Err(AuthError::Unauthorized),
        _ if !response.is_success() => Err(AuthError::Rejected(response.error_message())),
        _ => Ok(()),
    }
}
