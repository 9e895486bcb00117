use dioxus::prelude::*;

use crate::role_switcher::GuardState;
use crate::session::{use_services, use_session};

/// Renders its children only once the role check for `path` allows the page.
///
/// The check waits until the session has been restored and then runs once;
/// later session changes (a role switch, logging out) do not re-run it. Key
/// the guard by page so that navigating between profile pages runs a fresh
/// check.
#[component]
pub fn RoleGuard(path: String, children: Element) -> Element {
    let services = use_services();
    let session = use_session();
    let loading = use_memo(move || session.read().loading);

    let checking = services.clone();
    let checked_path = path.clone();
    let guard = use_resource(move || {
        let services = checking.clone();
        let path = checked_path.clone();
        let loading = loading();
        async move {
            if loading {
                return GuardState::Checking;
            }
            services.roles.check_page(&path).await
        }
    });

    use_drop(move || services.roles.reset(&path));

    let state = guard.cloned().unwrap_or(GuardState::Unchecked);
    match state {
        GuardState::Allowed => rsx! {
            {children}
        },
        GuardState::Redirecting(_) => rsx! {
            div { class: "role-guard", "Redirecting..." }
        },
        GuardState::Unchecked | GuardState::Checking => rsx! {
            div { class: "role-guard", "Checking your access..." }
        },
    }
}
