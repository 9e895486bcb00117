use dioxus::prelude::*;

use crate::session::{use_services, use_session};
use crate::views::use_modals;

/// Drop-down listing the user's roles. Choosing another role switches to it;
/// the last entry opens the add-role dialog.
#[component]
pub fn RoleSwitcherMenu() -> Element {
    let services = use_services();
    let session = use_session();
    let modals = use_modals();
    let mut expanded = use_signal(|| false);

    let state = session();
    let Some(user) = state.user else {
        return rsx! {};
    };
    let active = state.active_role;
    let label = active.map(|r| r.label()).unwrap_or("Select role");
    let adding = services.clone();

    rsx! {
        div {
            class: "role-switcher",
            button {
                class: "role-switcher-toggle",
                onclick: move |_| expanded.toggle(),
                "{label}"
            }
            if expanded() {
                ul {
                    class: "role-switcher-menu",
                    for role in user.roles.iter().copied() {
                        li {
                            key: "{role}",
                            class: if Some(role) == active { "role-option active" } else { "role-option" },
                            onclick: {
                                let services = services.clone();
                                move |_| {
                                    expanded.set(false);
                                    if Some(role) == active {
                                        return;
                                    }
                                    let services = services.clone();
                                    spawn(async move {
                                        if let Err(e) = services.roles.switch_to_role(role).await {
                                            tracing::warn!(%role, "role switch from menu failed: {e}");
                                        }
                                    });
                                }
                            },
                            "{role.label()}"
                        }
                    }
                    li {
                        class: "role-option add-role",
                        onclick: move |_| {
                            expanded.set(false);
                            adding.roles.open_add_role_modal(modals.controller(), None);
                        },
                        "+ Add role"
                    }
                }
            }
        }
    }
}
