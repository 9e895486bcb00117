//! In-memory page doubles for controller tests.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use crate::host::{HistoryMode, PageHost};
use crate::modal::ModalSurface;
use crate::panels::PanelSurface;

/// Records every side effect instead of performing it.
#[derive(Default)]
pub struct RecordingHost {
    pub path: RefCell<String>,
    pub query: RefCell<BTreeMap<String, String>>,
    pub history: RefCell<Vec<(String, HistoryMode)>>,
    pub navigations: RefCell<Vec<String>>,
    pub alerts: RefCell<Vec<String>>,
}

impl RecordingHost {
    pub fn at(path: &str) -> Self {
        let host = Self::default();
        *host.path.borrow_mut() = path.to_string();
        host
    }

    pub fn with_query(self, name: &str, value: &str) -> Self {
        self.query
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
        self
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.borrow().clone()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.borrow().clone()
    }
}

impl PageHost for RecordingHost {
    fn current_path(&self) -> String {
        self.path.borrow().clone()
    }

    fn query_param(&self, name: &str) -> Option<String> {
        self.query.borrow().get(name).cloned()
    }

    fn set_query_param(&self, name: &str, value: &str, mode: HistoryMode) {
        self.query
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
        self.history
            .borrow_mut()
            .push((format!("{name}={value}"), mode));
    }

    fn navigate(&self, url: &str) {
        self.navigations.borrow_mut().push(url.to_string());
    }

    fn alert(&self, message: &str) {
        self.alerts.borrow_mut().push(message.to_string());
    }
}

/// A page with a fixed set of panels and sidebar links.
#[derive(Default)]
pub struct FakePanels {
    pub panels: Vec<String>,
    pub links: Vec<String>,
    pub visible: RefCell<BTreeSet<String>>,
    pub highlighted: RefCell<BTreeSet<String>>,
}

impl FakePanels {
    pub fn new(panels: &[&str]) -> Self {
        Self {
            panels: panels.iter().map(|p| p.to_string()).collect(),
            links: panels.iter().map(|p| p.to_string()).collect(),
            // Markup may render several panels visible before initialization.
            visible: RefCell::new(panels.iter().map(|p| p.to_string()).collect()),
            ..Default::default()
        }
    }

    pub fn visible(&self) -> Vec<String> {
        self.visible.borrow().iter().cloned().collect()
    }

    pub fn highlighted(&self) -> Vec<String> {
        self.highlighted.borrow().iter().cloned().collect()
    }
}

impl PanelSurface for FakePanels {
    fn panel_names(&self) -> Vec<String> {
        self.panels.clone()
    }

    fn link_targets(&self) -> Vec<String> {
        self.links.clone()
    }

    fn set_panel_visible(&self, name: &str, visible: bool) {
        let mut set = self.visible.borrow_mut();
        if visible {
            set.insert(name.to_string());
        } else {
            set.remove(name);
        }
    }

    fn set_link_highlighted(&self, name: &str, highlighted: bool) {
        let mut set = self.highlighted.borrow_mut();
        if highlighted {
            set.insert(name.to_string());
        } else {
            set.remove(name);
        }
    }
}

/// A page with a fixed set of modal elements.
#[derive(Default)]
pub struct FakeModals {
    pub ids: BTreeSet<String>,
    pub shown: RefCell<BTreeSet<String>>,
    pub hides: RefCell<Vec<String>>,
    pub resets: RefCell<Vec<String>>,
    pub scroll_locked: RefCell<bool>,
}

impl FakeModals {
    pub fn new(ids: &[&str]) -> Self {
        Self {
            ids: ids.iter().map(|id| id.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn shown(&self) -> Vec<String> {
        self.shown.borrow().iter().cloned().collect()
    }

    pub fn scroll_locked(&self) -> bool {
        *self.scroll_locked.borrow()
    }
}

impl ModalSurface for FakeModals {
    fn exists(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    fn show(&self, id: &str) {
        self.shown.borrow_mut().insert(id.to_string());
    }

    fn hide(&self, id: &str) {
        self.shown.borrow_mut().remove(id);
        self.hides.borrow_mut().push(id.to_string());
    }

    fn reset_forms(&self, id: &str) {
        self.resets.borrow_mut().push(id.to_string());
    }

    fn set_scroll_locked(&self, locked: bool) {
        *self.scroll_locked.borrow_mut() = locked;
    }
}
