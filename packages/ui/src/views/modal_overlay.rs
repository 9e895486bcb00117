use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use dioxus::prelude::*;

use crate::dom;
use crate::modal::{ModalController, ModalOptions, ModalSurface};
use crate::timer;

/// Modal state shared through context by [`ModalProvider`].
#[derive(Clone)]
pub struct ModalContext {
    controller: Rc<ModalController>,
    shown: Signal<BTreeSet<String>>,
    mounted: Rc<RefCell<BTreeSet<String>>>,
}

impl ModalContext {
    pub fn controller(&self) -> &ModalController {
        &self.controller
    }

    /// Open modal `id`, scheduling its auto-close if one was requested.
    /// Returns whether the modal is open afterwards.
    pub fn open(&self, id: &str, options: ModalOptions) -> bool {
        if let Some(ticket) = self.controller.open(id, options) {
            let controller = self.controller.clone();
            spawn(async move {
                timer::sleep(ticket.after).await;
                controller.expire(&ticket);
            });
        }
        self.controller.is_open(id)
    }

    pub fn close(&self, id: Option<&str>) -> bool {
        self.controller.close(id)
    }

    /// Whether modal `id` is currently shown. Subscribes the caller.
    pub fn is_shown(&self, id: &str) -> bool {
        self.shown.read().contains(id)
    }

    fn register(&self, id: &str) {
        self.mounted.borrow_mut().insert(id.to_string());
    }

    fn unregister(&self, id: &str) {
        self.controller.close(Some(id));
        self.mounted.borrow_mut().remove(id);
    }
}

/// Modals as the controller sees them: mounted [`Modal`] components, shown
/// or hidden through a signal.
struct SignalModals {
    shown: Signal<BTreeSet<String>>,
    mounted: Rc<RefCell<BTreeSet<String>>>,
}

impl ModalSurface for SignalModals {
    fn exists(&self, id: &str) -> bool {
        self.mounted.borrow().contains(id)
    }

    fn show(&self, id: &str) {
        let mut shown = self.shown;
        shown.write().insert(id.to_string());
    }

    fn hide(&self, id: &str) {
        let mut shown = self.shown;
        shown.write().remove(id);
    }

    fn reset_forms(&self, id: &str) {
        dom::reset_forms_in(id);
    }

    fn set_scroll_locked(&self, locked: bool) {
        dom::set_body_scroll_locked(locked);
    }
}

/// Get the modal context provided by [`ModalProvider`].
pub fn use_modals() -> ModalContext {
    use_context::<ModalContext>()
}

/// Provider component for [`Modal`]s. One per page.
#[component]
pub fn ModalProvider(children: Element) -> Element {
    let shown = use_signal(BTreeSet::new);
    let context = use_hook(|| {
        let mounted = Rc::new(RefCell::new(BTreeSet::new()));
        let surface = SignalModals {
            shown,
            mounted: mounted.clone(),
        };
        ModalContext {
            controller: Rc::new(ModalController::new(Rc::new(surface))),
            shown,
            mounted,
        }
    });
    use_context_provider(|| context.clone());

    rsx! {
        {children}
    }
}

/// A full-screen overlay that centers its children in a modal card.
///
/// Hidden until opened through [`ModalContext::open`]. Clicking the dimmed
/// backdrop (not the card) or pressing Escape closes it; the overlay takes
/// focus when shown so Escape reaches it.
#[component]
pub fn Modal(
    id: String,
    #[props(default = "".to_string())] class: String,
    children: Element,
) -> Element {
    let modals = use_modals();

    let registering = modals.clone();
    let registered_id = id.clone();
    use_hook(move || registering.register(&registered_id));
    let unregistering = modals.clone();
    let unregistered_id = id.clone();
    use_drop(move || unregistering.unregister(&unregistered_id));

    let mut overlay = use_signal(|| Option::<Rc<MountedData>>::None);
    let focusing = modals.clone();
    let focus_id = id.clone();
    use_effect(move || {
        if focusing.is_shown(&focus_id) {
            if let Some(node) = overlay() {
                spawn(async move {
                    let _ = node.set_focus(true).await;
                });
            }
        }
    });

    let open = modals.is_shown(&id);
    let backdrop = modals.clone();
    let backdrop_id = id.clone();

    rsx! {
        div {
            id: "{id}",
            class: if open { "modal-backdrop open" } else { "modal-backdrop" },
            hidden: !open,
            role: "dialog",
            tabindex: "-1",
            style: "z-index: 2000",
            onmounted: move |evt: MountedEvent| overlay.set(Some(evt.data())),
            onclick: move |_| {
                backdrop.controller().handle_backdrop_click(&backdrop_id, true);
            },
            onkeydown: move |evt: KeyboardEvent| {
                if evt.key() == Key::Escape {
                    modals.controller().handle_escape();
                }
            },
            div {
                class: "modal-card {class}",
                onclick: move |evt: Event<MouseData>| evt.stop_propagation(),
                {children}
            }
        }
    }
}
