//! Email/password login form.

use dioxus::prelude::*;

use crate::session::{refresh_session, use_services, use_session};

/// Login form. On success the user lands on their active role's profile page;
/// on failure the server's message is shown as-is.
#[component]
pub fn LoginForm() -> Element {
    let services = use_services();
    let session = use_session();
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut error = use_signal(|| Option::<String>::None);
    let mut loading = use_signal(|| false);

    let handle_login = move |evt: FormEvent| {
        evt.prevent_default();
        let services = services.clone();
        spawn(async move {
            error.set(None);

            let e = email().trim().to_string();
            let p = password();

            if e.is_empty() || !e.contains('@') {
                error.set(Some("Please enter a valid email".to_string()));
                return;
            }
            if p.is_empty() {
                error.set(Some("Password is required".to_string()));
                return;
            }

            loading.set(true);
            match services.gateway.login(&e, &p).await {
                Ok(_) => {
                    refresh_session(&services, session);
                    let navigation = &services.config.navigation;
                    let target = services
                        .session()
                        .active_role()
                        .map(|role| navigation.profile_url(role))
                        .unwrap_or_else(|| navigation.landing_page.clone());
                    services.host.navigate(&target);
                }
                Err(err) => {
                    error.set(Some(err.to_string()));
                }
            }
            loading.set(false);
        });
    };

    rsx! {
        form {
            class: "login-form",
            onsubmit: handle_login,

            label { r#for: "login-email", "Email" }
            input {
                id: "login-email",
                r#type: "email",
                placeholder: "you@example.com",
                value: email(),
                oninput: move |evt| email.set(evt.value()),
            }

            label { r#for: "login-password", "Password" }
            input {
                id: "login-password",
                r#type: "password",
                value: password(),
                oninput: move |evt| password.set(evt.value()),
            }

            if let Some(message) = error() {
                p { class: "form-error", "{message}" }
            }

            button {
                r#type: "submit",
                class: "login-btn",
                disabled: loading(),
                if loading() { "Signing in..." } else { "Sign in" }
            }
        }
    }
}
