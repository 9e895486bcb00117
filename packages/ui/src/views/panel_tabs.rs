use std::collections::BTreeSet;
use std::rc::Rc;

use dioxus::prelude::*;

use crate::panels::{PanelNavigator, PanelSurface};
use crate::session::use_services;

/// Panel state shared through context by [`PanelProvider`].
#[derive(Clone)]
pub struct PanelContext {
    navigator: Rc<PanelNavigator>,
    visible: Signal<BTreeSet<String>>,
    highlighted: Signal<BTreeSet<String>>,
}

impl PanelContext {
    pub fn navigator(&self) -> &PanelNavigator {
        &self.navigator
    }

    pub fn switch(&self, name: &str) -> bool {
        self.navigator.switch_panel(name)
    }

    pub fn is_visible(&self, name: &str) -> bool {
        self.visible.read().contains(name)
    }

    pub fn is_highlighted(&self, name: &str) -> bool {
        self.highlighted.read().contains(name)
    }
}

struct SignalPanels {
    names: Vec<String>,
    visible: Signal<BTreeSet<String>>,
    highlighted: Signal<BTreeSet<String>>,
}

fn toggle(mut set: Signal<BTreeSet<String>>, name: &str, on: bool) {
    if on {
        set.write().insert(name.to_string());
    } else {
        set.write().remove(name);
    }
}

impl PanelSurface for SignalPanels {
    fn panel_names(&self) -> Vec<String> {
        self.names.clone()
    }

    fn link_targets(&self) -> Vec<String> {
        self.names.clone()
    }

    fn set_panel_visible(&self, name: &str, visible: bool) {
        toggle(self.visible, name, visible);
    }

    fn set_link_highlighted(&self, name: &str, highlighted: bool) {
        toggle(self.highlighted, name, highlighted);
    }
}

/// Get the panel context provided by [`PanelProvider`].
pub fn use_panels() -> PanelContext {
    use_context::<PanelContext>()
}

/// Hosts the [`Panel`]s of one page and keeps the `panel` query parameter in
/// sync with the visible one.
#[component]
pub fn PanelProvider(
    panels: Vec<String>,
    on_change: Option<EventHandler<String>>,
    children: Element,
) -> Element {
    let services = use_services();
    let visible = use_signal(BTreeSet::new);
    let highlighted = use_signal(BTreeSet::new);

    let context = use_hook(|| {
        let surface = SignalPanels {
            names: panels,
            visible,
            highlighted,
        };
        let navigator = PanelNavigator::new(
            Rc::new(surface),
            services.host.clone(),
            &services.config.navigation,
        );
        if let Some(handler) = on_change {
            navigator.subscribe(move |name| handler.call(name.to_string()));
        }
        PanelContext {
            navigator: Rc::new(navigator),
            visible,
            highlighted,
        }
    });
    use_context_provider(|| context.clone());

    let initializing = context.navigator.clone();
    use_effect(move || initializing.initialize());

    #[cfg(all(target_arch = "wasm32", feature = "web"))]
    {
        let restoring = context.navigator.clone();
        let _listener = use_hook(move || {
            Rc::new(crate::dom::WindowListener::new("popstate", move |_| {
                restoring.restore_from_url();
            }))
        });
    }

    rsx! {
        {children}
    }
}

/// A page section shown while it is the active panel.
#[component]
pub fn Panel(name: String, children: Element) -> Element {
    let panels = use_panels();
    let visible = panels.is_visible(&name);

    rsx! {
        section {
            id: "{name}-panel",
            class: if visible { "panel-content active" } else { "panel-content" },
            hidden: !visible,
            {children}
        }
    }
}

/// Sidebar entry that switches to `panel`.
#[component]
pub fn PanelLink(panel: String, children: Element) -> Element {
    let panels = use_panels();
    let active = panels.is_highlighted(&panel);

    rsx! {
        button {
            class: if active { "sidebar-link active" } else { "sidebar-link" },
            onclick: move |_| {
                panels.switch(&panel);
            },
            {children}
        }
    }
}
