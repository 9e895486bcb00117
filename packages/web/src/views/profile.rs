use dioxus::prelude::*;
use ui::views::{AddRoleDialog, Panel, PanelLink, PanelProvider, RoleGuard};
use ui::{use_services, Navbar};

/// Panels every profile page hosts, in sidebar order.
const PROFILE_PANELS: [(&str, &str); 4] = [
    ("dashboard", "Dashboard"),
    ("schedule", "Schedule"),
    ("documents", "Documents"),
    ("settings", "Settings"),
];

/// `{role}-profile.html`: the signed-in home of one role.
#[component]
pub fn ProfilePage(page: String) -> Element {
    let services = use_services();
    let path = format!("/{page}");

    let Some(role) = services.config.navigation.expected_role(&path) else {
        return rsx! {
            div { class: "role-guard", "Page not found: {page}" }
        };
    };
    let panels: Vec<String> = PROFILE_PANELS.iter().map(|(name, _)| name.to_string()).collect();

    rsx! {
        RoleGuard {
            key: "{page}",
            path: path.clone(),
            Navbar {}
            PanelProvider {
                panels: panels,
                on_change: move |panel: String| tracing::debug!(panel = panel.as_str(), "profile panel shown"),
                div {
                    class: "profile-layout",
                    aside {
                        class: "profile-sidebar",
                        for (name, label) in PROFILE_PANELS {
                            PanelLink { key: "{name}", panel: name, "{label}" }
                        }
                    }
                    main {
                        class: "profile-main",
                        Panel {
                            name: "dashboard",
                            h1 { "{role.label()} dashboard" }
                        }
                        Panel {
                            name: "schedule",
                            h2 { "Schedule" }
                        }
                        Panel {
                            name: "documents",
                            h2 { "Documents" }
                        }
                        Panel {
                            name: "settings",
                            h2 { "Settings" }
                            SettingsPanel {}
                        }
                    }
                }
            }
            AddRoleDialog {}
        }
    }
}

#[component]
fn SettingsPanel() -> Element {
    let services = use_services();
    let modals = ui::views::use_modals();

    rsx! {
        button {
            onclick: move |_| {
                services.roles.open_add_role_modal(modals.controller(), None);
            },
            "Add another role"
        }
    }
}
