//! # PanelNavigator — one visible section per page, mirrored in the URL
//!
//! A profile page is split into panels (dashboard, schedule, documents, ...)
//! of which exactly one is visible. [`PanelNavigator`] owns that choice: it
//! builds the panel registry once from a [`PanelSurface`], shows the panel
//! named by the `panel` query parameter, and on every switch hides the old
//! panel, shows the new one, highlights its sidebar link, writes the query
//! parameter (pushing history so *back* returns to the previous panel) and
//! notifies subscribers.
//!
//! Unknown panel names are logged and ignored. The navigator never errors.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use store::NavigationConfig;

use crate::host::{HistoryMode, PageHost};

/// The page elements a navigator drives.
pub trait PanelSurface {
    /// Names of every panel container on the page, in document order.
    fn panel_names(&self) -> Vec<String>;

    /// Panel names that have a sidebar link pointing at them.
    fn link_targets(&self) -> Vec<String>;

    fn set_panel_visible(&self, name: &str, visible: bool);

    fn set_link_highlighted(&self, name: &str, highlighted: bool);
}

type PanelListener = Rc<dyn Fn(&str)>;

#[derive(Default)]
struct PanelState {
    registry: Vec<String>,
    links: BTreeSet<String>,
    active: Option<String>,
}

/// Switches between the panels of one page.
pub struct PanelNavigator {
    surface: Rc<dyn PanelSurface>,
    host: Rc<dyn PageHost>,
    param: String,
    default_panel: String,
    state: RefCell<PanelState>,
    listeners: RefCell<Vec<PanelListener>>,
}

impl PanelNavigator {
    pub fn new(
        surface: Rc<dyn PanelSurface>,
        host: Rc<dyn PageHost>,
        navigation: &NavigationConfig,
    ) -> Self {
        Self {
            surface,
            host,
            param: navigation.panel_param.clone(),
            default_panel: navigation.default_panel.clone(),
            state: RefCell::new(PanelState::default()),
            listeners: RefCell::new(Vec::new()),
        }
    }

    /// Build the registry and show the initial panel.
    ///
    /// The initial panel is the one named in the URL if it exists, else the
    /// default panel, else the first panel on the page. The URL is rewritten
    /// in place so the page's own history entry names the panel.
    pub fn initialize(&self) {
        let registry = self.surface.panel_names();
        let links: BTreeSet<String> = self.surface.link_targets().into_iter().collect();
        tracing::debug!(panels = registry.len(), links = links.len(), "panel registry built");

        let requested = self.host.query_param(&self.param);
        if let Some(name) = requested.as_deref() {
            if !registry.iter().any(|p| p == name) {
                tracing::warn!(panel = name, "URL names an unknown panel");
            }
        }
        let initial = requested
            .filter(|name| registry.contains(name))
            .or_else(|| registry.contains(&self.default_panel).then(|| self.default_panel.clone()))
            .or_else(|| registry.first().cloned());

        for name in &registry {
            self.surface.set_panel_visible(name, false);
        }
        for name in &links {
            self.surface.set_link_highlighted(name, false);
        }
        *self.state.borrow_mut() = PanelState {
            registry,
            links,
            active: None,
        };

        match initial {
            Some(name) => self.activate(&name, Some(HistoryMode::Replace)),
            None => tracing::warn!("page has no panels"),
        }
    }

    /// Show panel `name`. Returns `false` (and changes nothing) for unknown
    /// names.
    pub fn switch_panel(&self, name: &str) -> bool {
        if !self.has_panel(name) {
            tracing::warn!(panel = name, "unknown panel");
            return false;
        }
        if self.active_panel().as_deref() == Some(name) {
            return true;
        }
        self.activate(name, Some(HistoryMode::Push));
        true
    }

    /// Follow the URL after back/forward navigation, without writing history.
    ///
    /// Returns `true` if the visible panel changed.
    pub fn restore_from_url(&self) -> bool {
        let target = self
            .host
            .query_param(&self.param)
            .unwrap_or_else(|| self.default_panel.clone());
        if !self.has_panel(&target) || self.active_panel().as_deref() == Some(target.as_str()) {
            return false;
        }
        self.activate(&target, None);
        true
    }

    pub fn active_panel(&self) -> Option<String> {
        self.state.borrow().active.clone()
    }

    pub fn has_panel(&self, name: &str) -> bool {
        self.state.borrow().registry.iter().any(|p| p == name)
    }

    pub fn panels(&self) -> Vec<String> {
        self.state.borrow().registry.clone()
    }

    /// Call `listener` with the panel name after every panel change.
    pub fn subscribe(&self, listener: impl Fn(&str) + 'static) {
        self.listeners.borrow_mut().push(Rc::new(listener));
    }

    fn activate(&self, name: &str, history: Option<HistoryMode>) {
        let (previous, has_link) = {
            let mut state = self.state.borrow_mut();
            let previous = state.active.replace(name.to_string());
            (previous, state.links.contains(name))
        };

        if let Some(prev) = previous.as_deref() {
            self.surface.set_panel_visible(prev, false);
            self.surface.set_link_highlighted(prev, false);
        }
        self.surface.set_panel_visible(name, true);
        if has_link {
            self.surface.set_link_highlighted(name, true);
        }
        if let Some(mode) = history {
            self.host.set_query_param(&self.param, name, mode);
        }
        tracing::debug!(panel = name, previous = previous.as_deref(), "panel switched");

        let listeners = self.listeners.borrow().clone();
        for listener in listeners {
            listener(name);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::testing::{FakePanels, RecordingHost};

    const PANELS: [&str; 4] = ["dashboard", "schedule", "documents", "settings"];

    fn navigator(host: RecordingHost) -> (Rc<FakePanels>, Rc<RecordingHost>, PanelNavigator) {
        let surface = Rc::new(FakePanels::new(&PANELS));
        let host = Rc::new(host);
        let nav = PanelNavigator::new(surface.clone(), host.clone(), &NavigationConfig::default());
        nav.initialize();
        (surface, host, nav)
    }

    #[test]
    fn test_initialize_defaults_to_dashboard() {
        let (surface, host, nav) = navigator(RecordingHost::at("/tutor-profile.html"));

        assert_eq!(nav.active_panel().as_deref(), Some("dashboard"));
        assert_eq!(surface.visible(), vec!["dashboard"]);
        assert_eq!(surface.highlighted(), vec!["dashboard"]);
        assert_eq!(
            host.history.borrow().as_slice(),
            &[("panel=dashboard".to_string(), HistoryMode::Replace)]
        );
    }

    #[test]
    fn test_initialize_reads_query_param() {
        let (surface, _, nav) =
            navigator(RecordingHost::at("/tutor-profile.html").with_query("panel", "schedule"));
        assert_eq!(nav.active_panel().as_deref(), Some("schedule"));
        assert_eq!(surface.visible(), vec!["schedule"]);

        let (_, _, nav) =
            navigator(RecordingHost::at("/tutor-profile.html").with_query("panel", "billing"));
        assert_eq!(nav.active_panel().as_deref(), Some("dashboard"));
    }

    #[test]
    fn test_switch_keeps_exactly_one_panel_visible() {
        let (surface, host, nav) = navigator(RecordingHost::default());

        for name in ["schedule", "documents", "dashboard", "settings", "documents"] {
            assert!(nav.switch_panel(name));
            assert_eq!(surface.visible(), vec![name]);
            assert_eq!(surface.highlighted(), vec![name]);
            assert_eq!(nav.active_panel().as_deref(), Some(name));
            assert_eq!(host.query_param("panel").as_deref(), Some(name));
        }
        let pushes = host
            .history
            .borrow()
            .iter()
            .filter(|(_, mode)| *mode == HistoryMode::Push)
            .count();
        assert_eq!(pushes, 5);
    }

    #[test]
    fn test_unknown_panel_is_ignored() {
        let (surface, host, nav) = navigator(RecordingHost::default());
        nav.switch_panel("documents");
        let history_len = host.history.borrow().len();

        assert!(!nav.switch_panel("billing"));

        assert_eq!(nav.active_panel().as_deref(), Some("documents"));
        assert_eq!(surface.visible(), vec!["documents"]);
        assert_eq!(host.history.borrow().len(), history_len);
    }

    #[test]
    fn test_subscribers_hear_switches() {
        let (_, _, nav) = navigator(RecordingHost::default());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        nav.subscribe(move |name| sink.borrow_mut().push(name.to_string()));

        nav.switch_panel("schedule");
        nav.switch_panel("billing");
        nav.switch_panel("schedule");
        nav.switch_panel("settings");

        assert_eq!(*seen.borrow(), vec!["schedule", "settings"]);
    }

    #[test]
    fn test_restore_from_url_does_not_push() {
        let (surface, host, nav) = navigator(RecordingHost::default());
        nav.switch_panel("schedule");
        host.query
            .borrow_mut()
            .insert("panel".to_string(), "dashboard".to_string());
        let history_len = host.history.borrow().len();

        assert!(nav.restore_from_url());
        assert_eq!(nav.active_panel().as_deref(), Some("dashboard"));
        assert_eq!(surface.visible(), vec!["dashboard"]);
        assert_eq!(host.history.borrow().len(), history_len);
        assert!(!nav.restore_from_url());
    }

    #[test]
    fn test_links_are_optional() {
        let surface = Rc::new(FakePanels {
            links: vec!["dashboard".to_string()],
            ..FakePanels::new(&PANELS)
        });
        let nav = PanelNavigator::new(
            surface.clone(),
            Rc::new(RecordingHost::default()),
            &NavigationConfig::default(),
        );
        nav.initialize();

        nav.switch_panel("settings");
        assert!(surface.highlighted().is_empty());
        assert_eq!(nav.panels().len(), 4);
    }
}
