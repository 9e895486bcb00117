//! Session context and hooks for the UI.

use dioxus::prelude::*;
use store::{AstegniConfig, RoleName, UserRecord};

use crate::services::Services;

/// Session state as components see it.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub user: Option<UserRecord>,
    pub active_role: Option<RoleName>,
    /// The persisted session is still being restored and verified.
    pub loading: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            user: None,
            active_role: None,
            loading: true,
        }
    }
}

impl SessionState {
    fn snapshot(services: &Services, loading: bool) -> Self {
        let session = services.session();
        Self {
            user: session.user(),
            active_role: session.active_role(),
            loading,
        }
    }
}

/// Get the current session state.
/// Returns a signal that updates on login, logout, role switches and changes
/// made in other tabs.
pub fn use_session() -> Signal<SessionState> {
    use_context::<Signal<SessionState>>()
}

/// Get the identity services created by [`SessionProvider`].
pub fn use_services() -> Services {
    use_context::<Services>()
}

/// Re-read the session into the context signal after a change made through
/// [`Services`] outside the provider (login, logout).
pub fn refresh_session(services: &Services, mut state: Signal<SessionState>) {
    state.set(SessionState::snapshot(services, false));
}

/// Provider component that owns the identity services and session state.
/// Wrap your app with this component.
///
/// On mount the persisted session is restored and verified with the backend;
/// a session the backend rejects is cleared.
#[component]
pub fn SessionProvider(config: AstegniConfig, children: Element) -> Element {
    let services = use_hook(|| Services::create(config));
    use_context_provider(|| services.clone());

    let session_state = use_signal(SessionState::default);
    use_context_provider(|| session_state);

    use_hook(|| {
        services.roles.on_role_changed(move |role| {
            let mut state = session_state;
            state.write().active_role = Some(role);
        });
    });

    let restore = services.clone();
    let _ = use_resource(move || {
        let services = restore.clone();
        let mut session_state = session_state;
        async move {
            let session = services.session();
            if session.restore_session() {
                if services.gateway.verify_token().await {
                    tracing::info!("session verified");
                } else {
                    tracing::warn!("stored session is no longer valid, clearing it");
                    session.clear();
                }
            }
            session_state.set(SessionState::snapshot(&services, false));
        }
    });

    #[cfg(all(target_arch = "wasm32", feature = "web"))]
    {
        let listening = services.clone();
        let _listener = use_hook(move || {
            std::rc::Rc::new(crate::dom::WindowListener::storage(move |key| {
                if listening.session().reconcile_external_change(key.as_deref()) {
                    refresh_session(&listening, session_state);
                }
            }))
        });
    }

    let disposing = services.clone();
    use_drop(move || disposing.dispose());

    rsx! {
        {children}
    }
}

/// Button that ends the session and returns to the login page.
#[component]
pub fn LogoutButton(#[props(default = "".to_string())] class: String) -> Element {
    let services = use_services();
    let session_state = use_session();

    let onclick = move |_| {
        services.gateway.logout();
        refresh_session(&services, session_state);
        services.host.navigate(&services.config.navigation.login_page);
    };

    rsx! {
        button {
            class: "{class}",
            onclick: onclick,
            "Log out"
        }
    }
}
