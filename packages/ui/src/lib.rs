//! This crate contains the page controllers and shared UI for the workspace.
//!
//! The controllers ([`RoleSwitcher`], [`PanelNavigator`], [`ModalController`])
//! are plain Rust behind small host traits, so they are tested without a
//! browser. The components in [`views`] bind them to Dioxus.

pub mod host;
pub use host::{BrowserHost, HistoryMode, PageHost};

pub mod modal;
pub use modal::{AutoClose, ModalController, ModalOptions, ModalSurface};

pub mod panels;
pub use panels::{PanelNavigator, PanelSurface};

pub mod role_switcher;
pub use role_switcher::{GuardState, RoleSwitcher, SwitchOutcome, ADD_ROLE_MODAL_ID};

pub mod services;
pub use services::{DurableStore, Services};

mod session;
pub use session::{
    refresh_session, use_services, use_session, LogoutButton, SessionProvider, SessionState,
};

mod navbar;
pub use navbar::Navbar;

pub mod views;

mod dom;
mod timer;

#[cfg(test)]
mod testing;
