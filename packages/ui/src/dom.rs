//! Direct DOM effects used by the Dioxus bindings.
//!
//! Each helper is a logged no-op outside the browser.

/// Suppress or restore page scrolling behind open modals.
pub fn set_body_scroll_locked(locked: bool) {
    #[cfg(all(target_arch = "wasm32", feature = "web"))]
    {
        let body = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.body());
        if let Some(body) = body {
            let style = body.style();
            let result = if locked {
                style.set_property("overflow", "hidden")
            } else {
                style.remove_property("overflow").map(|_| ())
            };
            if result.is_err() {
                tracing::warn!(locked, "failed to change body scroll");
            }
        }
    }
    #[cfg(not(all(target_arch = "wasm32", feature = "web")))]
    tracing::debug!(locked, "body scroll lock");
}

/// Reset every form inside the element with `id`.
pub fn reset_forms_in(id: &str) {
    #[cfg(all(target_arch = "wasm32", feature = "web"))]
    {
        use wasm_bindgen::JsCast;

        let root = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id));
        let Some(root) = root else {
            return;
        };
        let Ok(forms) = root.query_selector_all("form") else {
            return;
        };
        for i in 0..forms.length() {
            if let Some(form) = forms
                .item(i)
                .and_then(|node| node.dyn_into::<web_sys::HtmlFormElement>().ok())
            {
                form.reset();
            }
        }
    }
    #[cfg(not(all(target_arch = "wasm32", feature = "web")))]
    tracing::debug!(id, "form reset");
}

/// A window event listener that is removed again when dropped.
#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub struct WindowListener {
    event: &'static str,
    closure: wasm_bindgen::closure::Closure<dyn FnMut(web_sys::Event)>,
}

#[cfg(all(target_arch = "wasm32", feature = "web"))]
impl WindowListener {
    pub fn new(event: &'static str, handler: impl FnMut(web_sys::Event) + 'static) -> Option<Self> {
        use wasm_bindgen::JsCast;

        let closure = wasm_bindgen::closure::Closure::<dyn FnMut(web_sys::Event)>::new(handler);
        web_sys::window()?
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .ok()?;
        Some(Self { event, closure })
    }

    /// `storage` events: `handler` receives the changed key, `None` when the
    /// other tab cleared the storage area.
    pub fn storage(mut handler: impl FnMut(Option<String>) + 'static) -> Option<Self> {
        use wasm_bindgen::JsCast;

        Self::new("storage", move |event| {
            if let Ok(event) = event.dyn_into::<web_sys::StorageEvent>() {
                handler(event.key());
            }
        })
    }
}

#[cfg(all(target_arch = "wasm32", feature = "web"))]
impl Drop for WindowListener {
    fn drop(&mut self) {
        use wasm_bindgen::JsCast;

        if let Some(window) = web_sys::window() {
            let _ = window.remove_event_listener_with_callback(
                self.event,
                self.closure.as_ref().unchecked_ref(),
            );
        }
    }
}
