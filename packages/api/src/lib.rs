//! # API crate — client side of the Astegni identity backend
//!
//! Everything the frontend needs to talk to the backend about who the user is:
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`gateway`] | [`AuthGateway`]: login, registration, token verification, role switching |
//! | [`transport`] | The [`HttpTransport`] seam and its `reqwest` implementation |
//! | [`models`] | Request and response bodies of the identity endpoints |
//! | [`error`] | [`AuthError`] and [`TransportError`] |
//! | `testing` | [`ScriptedTransport`](testing::ScriptedTransport) (`test-util` feature) |
//!
//! Session state itself lives in the `store` crate; the gateway only writes it
//! through [`store::SessionStore`].

pub mod error;
pub mod gateway;
pub mod models;
pub mod transport;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use error::{AuthError, TransportError};
pub use gateway::AuthGateway;
pub use models::{MyRoles, RegistrationData, WireUser};
pub use transport::{ApiRequest, HttpTransport, Method, RawResponse, ReqwestTransport};
