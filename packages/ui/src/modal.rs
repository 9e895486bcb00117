//! # ModalController — open/close/stack lifecycle for dialogs
//!
//! Open modals form a stack: opening pushes (reopening an open modal moves it
//! to the top), closing without an id pops the most recent one, Escape closes
//! the top, and a click on a modal's own backdrop closes that modal. While any
//! modal that asked for it is open, page scrolling is locked.
//!
//! Operations on ids the page doesn't have are logged and ignored: modal
//! markup is often mounted asynchronously, so callers cannot always know.
//!
//! ## Auto-close
//!
//! The controller has no timers. [`open`](ModalController::open) returns an
//! [`AutoClose`] ticket when `auto_close` is set; whoever owns a timer sleeps
//! for [`AutoClose::after`] and then calls [`expire`](ModalController::expire).
//! A ticket from an earlier opening of the same modal is stale and ignored.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// The modal elements a controller drives.
pub trait ModalSurface {
    fn exists(&self, id: &str) -> bool;
    fn show(&self, id: &str);
    fn hide(&self, id: &str);
    /// Clear any form fields inside the modal.
    fn reset_forms(&self, id: &str);
    fn set_scroll_locked(&self, locked: bool);
}

/// Options for [`ModalController::open`].
#[derive(Clone)]
pub struct ModalOptions {
    /// Close every other open modal first.
    pub exclusive: bool,
    pub lock_scroll: bool,
    pub auto_close: Option<Duration>,
    pub on_open: Option<Rc<dyn Fn(&str)>>,
}

impl Default for ModalOptions {
    fn default() -> Self {
        Self {
            exclusive: false,
            lock_scroll: true,
            auto_close: None,
            on_open: None,
        }
    }
}

impl fmt::Debug for ModalOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalOptions")
            .field("exclusive", &self.exclusive)
            .field("lock_scroll", &self.lock_scroll)
            .field("auto_close", &self.auto_close)
            .field("on_open", &self.on_open.is_some())
            .finish()
    }
}

impl ModalOptions {
    pub fn exclusive(mut self) -> Self {
        self.exclusive = true;
        self
    }

    pub fn without_scroll_lock(mut self) -> Self {
        self.lock_scroll = false;
        self
    }

    pub fn auto_close(mut self, after: Duration) -> Self {
        self.auto_close = Some(after);
        self
    }

    pub fn on_open(mut self, callback: impl Fn(&str) + 'static) -> Self {
        self.on_open = Some(Rc::new(callback));
        self
    }
}

/// A pending auto-close for one particular opening of a modal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AutoClose {
    pub id: String,
    pub after: Duration,
    opening: u64,
}

struct OpenModal {
    id: String,
    opening: u64,
    lock_scroll: bool,
}

#[derive(Default)]
struct ModalStack {
    open: Vec<OpenModal>,
    openings: u64,
    scroll_locked: bool,
}

/// Tracks and drives the open modals of one page.
pub struct ModalController {
    surface: Rc<dyn ModalSurface>,
    stack: RefCell<ModalStack>,
}

impl ModalController {
    pub fn new(surface: Rc<dyn ModalSurface>) -> Self {
        Self {
            surface,
            stack: RefCell::new(ModalStack::default()),
        }
    }

    /// Show modal `id` on top of the stack.
    pub fn open(&self, id: &str, options: ModalOptions) -> Option<AutoClose> {
        if !self.surface.exists(id) {
            tracing::error!(modal = id, "cannot open unknown modal");
            return None;
        }

        if options.exclusive {
            for other in self.open_modals().into_iter().rev() {
                if other != id {
                    self.close(Some(&other));
                }
            }
        }

        let opening = {
            let mut stack = self.stack.borrow_mut();
            stack.open.retain(|m| m.id != id);
            stack.openings += 1;
            let opening = stack.openings;
            stack.open.push(OpenModal {
                id: id.to_string(),
                opening,
                lock_scroll: options.lock_scroll,
            });
            opening
        };
        self.surface.show(id);
        self.sync_scroll_lock();
        tracing::debug!(modal = id, exclusive = options.exclusive, "modal opened");

        if let Some(on_open) = &options.on_open {
            on_open(id);
        }
        options.auto_close.map(|after| AutoClose {
            id: id.to_string(),
            after,
            opening,
        })
    }

    /// Close modal `id`, or the most recently opened one when `None`.
    /// Returns whether a modal was closed.
    pub fn close(&self, id: Option<&str>) -> bool {
        let target = match id {
            Some(id) => {
                if !self.surface.exists(id) {
                    tracing::error!(modal = id, "cannot close unknown modal");
                    return false;
                }
                id.to_string()
            }
            None => match self.top() {
                Some(top) => top,
                None => return false,
            },
        };

        let removed = {
            let mut stack = self.stack.borrow_mut();
            let before = stack.open.len();
            stack.open.retain(|m| m.id != target);
            stack.open.len() != before
        };
        if !removed {
            tracing::debug!(modal = target.as_str(), "modal is not open");
            return false;
        }

        self.surface.hide(&target);
        self.surface.reset_forms(&target);
        self.sync_scroll_lock();
        tracing::debug!(modal = target.as_str(), "modal closed");
        true
    }

    /// Close every open modal, most recent first.
    pub fn close_all(&self) {
        for id in self.open_modals().into_iter().rev() {
            self.close(Some(&id));
        }
    }

    pub fn handle_escape(&self) -> bool {
        self.close(None)
    }

    /// A click landed on modal `id`'s overlay. Only clicks on the backdrop
    /// itself, not on the dialog content, close it.
    pub fn handle_backdrop_click(&self, id: &str, target_is_backdrop: bool) -> bool {
        target_is_backdrop && self.close(Some(id))
    }

    /// Close the modal a ticket was issued for, if it is still the same
    /// opening.
    pub fn expire(&self, ticket: &AutoClose) -> bool {
        let current = self
            .stack
            .borrow()
            .open
            .iter()
            .any(|m| m.id == ticket.id && m.opening == ticket.opening);
        current && self.close(Some(&ticket.id))
    }

    pub fn is_open(&self, id: &str) -> bool {
        self.stack.borrow().open.iter().any(|m| m.id == id)
    }

    /// Open modal ids in stacking order, bottom first.
    pub fn open_modals(&self) -> Vec<String> {
        self.stack.borrow().open.iter().map(|m| m.id.clone()).collect()
    }

    pub fn top(&self) -> Option<String> {
        self.stack.borrow().open.last().map(|m| m.id.clone())
    }

    fn sync_scroll_lock(&self) {
        let changed = {
            let mut stack = self.stack.borrow_mut();
            let wanted = stack.open.iter().any(|m| m.lock_scroll);
            let changed = wanted != stack.scroll_locked;
            stack.scroll_locked = wanted;
            changed.then_some(wanted)
        };
        if let Some(locked) = changed {
            self.surface.set_scroll_locked(locked);
        }
    }
}
