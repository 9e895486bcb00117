use dioxus::prelude::*;
use ui::{use_services, use_session};

use crate::Route;

/// Public landing page.
#[component]
pub fn Landing() -> Element {
    let services = use_services();
    let session = use_session();
    let state = session();

    let profile = state
        .active_role
        .filter(|_| state.user.is_some())
        .map(|role| services.config.navigation.profile_url(role));

    rsx! {
        div {
            class: "landing",
            style: "display: flex; flex-direction: column; align-items: center; justify-content: center; min-height: 100vh; padding: 2rem;",

            h1 { style: "margin-bottom: 0.5rem; font-weight: 700; font-size: 1.75rem;", "Astegni" }
            p { style: "margin-bottom: 2rem; color: #787774;", "Find tutors, manage your classes, all in one place." }

            if state.loading {
                p { "Loading..." }
            } else if let Some(href) = profile {
                a { href: "{href}", "Go to your profile" }
            } else {
                Link { to: Route::Login {}, "Sign in" }
            }
        }
    }
}
