//! Login page view.

use dioxus::prelude::*;
use ui::views::LoginForm;
use ui::{use_services, use_session};

/// Login page component.
#[component]
pub fn Login() -> Element {
    let services = use_services();
    let session = use_session();
    let state = session();

    // Already signed in: go to the active role's page
    if !state.loading && state.user.is_some() {
        if let Some(role) = state.active_role {
            services
                .host
                .navigate(&services.config.navigation.profile_url(role));
        }
    }

    rsx! {
        div {
            class: "login-container",
            style: "display: flex; flex-direction: column; align-items: center; justify-content: center; min-height: 100vh; padding: 2rem;",

            h1 { style: "margin-bottom: 0.5rem; font-weight: 700; font-size: 1.75rem;", "Astegni" }
            p { style: "margin-bottom: 2rem; color: #787774;", "Sign in to continue" }

            LoginForm {}
        }
    }
}
