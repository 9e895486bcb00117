//! Wire models for the identity endpoints.

mod responses;
mod user;

pub use responses::{error_message, MyRoles, RegistrationData, TokenResponse, VerifyResponse};
pub(crate) use responses::{
    detail_text, AddRoleRequest, MyRolesResponse, SwitchRoleRequest, SwitchRoleResponse,
};
pub use user::WireUser;
