use dioxus::prelude::*;
use store::RoleName;

use crate::role_switcher::ADD_ROLE_MODAL_ID;
use crate::session::{refresh_session, use_services, use_session};
use crate::views::{use_modals, Modal};

/// Dialog for adding a role to the account, confirmed with the password.
#[component]
pub fn AddRoleDialog() -> Element {
    let services = use_services();
    let session = use_session();
    let modals = use_modals();
    let mut selected = use_signal(|| Option::<RoleName>::None);
    let mut password = use_signal(String::new);
    let mut error = use_signal(|| Option::<String>::None);
    let mut saving = use_signal(|| false);

    let held = session().user.map(|u| u.roles).unwrap_or_default();
    let choices: Vec<RoleName> = RoleName::ALL
        .into_iter()
        .filter(|r| *r != RoleName::User && !held.contains(r))
        .collect();
    let choice = selected()
        .or(services.roles.preselected_role())
        .filter(|r| choices.contains(r))
        .or(choices.first().copied());

    let submitting = services.clone();
    let closing = modals.clone();
    let handle_submit = move |evt: FormEvent| {
        evt.prevent_default();
        let Some(role) = choice else {
            return;
        };
        let services = submitting.clone();
        let modals = closing.clone();
        spawn(async move {
            error.set(None);
            if password().is_empty() {
                error.set(Some("Please confirm your password".to_string()));
                return;
            }
            saving.set(true);
            match services.gateway.add_role(role, &password()).await {
                Ok(_) => {
                    refresh_session(&services, session);
                    password.set(String::new());
                    selected.set(None);
                    modals.close(Some(ADD_ROLE_MODAL_ID));
                }
                Err(e) => error.set(Some(e.to_string())),
            }
            saving.set(false);
        });
    };

    rsx! {
        Modal {
            id: ADD_ROLE_MODAL_ID,
            form {
                class: "p-6 add-role-form",
                onsubmit: handle_submit,
                h2 { class: "m-0 mb-5 text-lg font-semibold", "Add a role" }

                if choices.is_empty() {
                    p { "Your account already has every available role." }
                } else {
                    div {
                        class: "mb-4",
                        label { r#for: "add-role-select", "Role" }
                        select {
                            id: "add-role-select",
                            value: choice.map(|r| r.as_str()).unwrap_or_default(),
                            onchange: move |evt| selected.set(evt.value().parse().ok()),
                            for role in choices.iter().copied() {
                                option {
                                    key: "{role}",
                                    value: "{role}",
                                    "{role.label()}"
                                }
                            }
                        }
                    }
                    div {
                        class: "mb-4",
                        label { r#for: "add-role-password", "Confirm your password" }
                        input {
                            id: "add-role-password",
                            r#type: "password",
                            value: password(),
                            oninput: move |evt| password.set(evt.value()),
                        }
                    }
                    if let Some(message) = error() {
                        p { class: "form-error", "{message}" }
                    }
                    button {
                        r#type: "submit",
                        disabled: saving(),
                        if saving() { "Adding..." } else { "Add role" }
                    }
                }
                button {
                    r#type: "button",
                    onclick: move |_| {
                        modals.close(Some(ADD_ROLE_MODAL_ID));
                    },
                    "Cancel"
                }
            }
        }
    }
}
