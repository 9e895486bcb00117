use dioxus::prelude::*;

use crate::session::{use_session, LogoutButton};
use crate::views::RoleSwitcherMenu;

/// Top bar of every signed-in page: user name, role menu and logout.
#[component]
pub fn Navbar(children: Element) -> Element {
    let session = use_session();
    let state = session();

    rsx! {
        nav {
            class: "navbar",
            a { class: "navbar-brand", href: "/", "Astegni" }
            {children}
            if let Some(user) = state.user {
                span { class: "navbar-user", "{user.display_name()}" }
                RoleSwitcherMenu {}
                LogoutButton { class: "navbar-logout" }
            }
        }
    }
}
