//! # PageHost — the page-level side effects controllers may cause
//!
//! Controllers never touch `window` directly. Everything they need from the
//! page (where am I, what does the query string say, go somewhere else, tell
//! the user) goes through [`PageHost`], so the same controller code runs in
//! the browser ([`BrowserHost`]) and in unit tests.

/// How a query parameter change is recorded in session history.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HistoryMode {
    /// New history entry; the back button returns to the previous value.
    Push,
    /// Overwrite the current entry.
    Replace,
}

/// Side effects on the current page.
pub trait PageHost {
    /// Path component of the current URL, e.g. `"/tutor-profile.html"`.
    fn current_path(&self) -> String;

    fn query_param(&self, name: &str) -> Option<String>;

    /// Rewrite one query parameter without reloading the page.
    fn set_query_param(&self, name: &str, value: &str, mode: HistoryMode);

    /// Leave the page for `url`.
    fn navigate(&self, url: &str);

    /// Blocking notification the user must acknowledge.
    fn alert(&self, message: &str);
}

/// The real browser window. On native targets every effect is only logged.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserHost;

#[cfg(all(target_arch = "wasm32", feature = "web"))]
impl PageHost for BrowserHost {
    fn current_path(&self) -> String {
        web_sys::window()
            .and_then(|w| w.location().pathname().ok())
            .unwrap_or_else(|| "/".to_string())
    }

    fn query_param(&self, name: &str) -> Option<String> {
        let search = web_sys::window()?.location().search().ok()?;
        web_sys::UrlSearchParams::new_with_str(&search)
            .ok()?
            .get(name)
    }

    fn set_query_param(&self, name: &str, value: &str, mode: HistoryMode) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Ok(href) = window.location().href() else {
            return;
        };
        let Ok(url) = web_sys::Url::new(&href) else {
            tracing::warn!(href, "cannot parse page URL");
            return;
        };
        url.search_params().set(name, value);

        let Ok(history) = window.history() else {
            return;
        };
        let href = url.href();
        let state = wasm_bindgen::JsValue::NULL;
        let result = match mode {
            HistoryMode::Push => history.push_state_with_url(&state, "", Some(&href)),
            HistoryMode::Replace => history.replace_state_with_url(&state, "", Some(&href)),
        };
        if result.is_err() {
            tracing::warn!(href, "failed to update page URL");
        }
    }

    fn navigate(&self, url: &str) {
        tracing::info!(url, "navigating");
        if let Some(window) = web_sys::window() {
            if window.location().set_href(url).is_err() {
                tracing::error!(url, "navigation failed");
            }
        }
    }

    fn alert(&self, message: &str) {
        if let Some(window) = web_sys::window() {
            let _ = window.alert_with_message(message);
        }
    }
}

#[cfg(not(all(target_arch = "wasm32", feature = "web")))]
impl PageHost for BrowserHost {
    fn current_path(&self) -> String {
        "/".to_string()
    }

    fn query_param(&self, _name: &str) -> Option<String> {
        None
    }

    fn set_query_param(&self, name: &str, value: &str, mode: HistoryMode) {
        tracing::debug!(name, value, ?mode, "query parameter update (no browser)");
    }

    fn navigate(&self, url: &str) {
        tracing::info!(url, "navigation requested (no browser)");
    }

    fn alert(&self, message: &str) {
        tracing::warn!("alert: {message}");
    }
}
