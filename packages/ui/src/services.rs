//! # Services — the per-page object graph
//!
//! [`Services`] bundles everything a page needs to talk about identity: the
//! configuration, the [`AuthGateway`] (and through it the [`SessionStore`]),
//! the [`RoleSwitcher`] and the [`PageHost`]. It is created once by
//! [`SessionProvider`](crate::SessionProvider) and handed to components
//! through Dioxus context ([`use_services`](crate::use_services)).
//!
//! | Platform | Durable session storage | Switch flag storage |
//! |----------|-------------------------|---------------------|
//! | Browser (`wasm32` + `web`) | `localStorage` | `sessionStorage` |
//! | Native | Files under the user's data directory | Memory |

use std::rc::Rc;

use api::{AuthGateway, HttpTransport, ReqwestTransport};
use store::{AstegniConfig, KeyValueStore, SessionStore};

use crate::host::{BrowserHost, PageHost};
use crate::role_switcher::RoleSwitcher;

#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub type DurableStore = store::BrowserStorage;
#[cfg(not(all(target_arch = "wasm32", feature = "web")))]
pub type DurableStore = store::FileStore;

/// Identity services of one page.
pub struct Services<T = ReqwestTransport, S = DurableStore> {
    pub config: Rc<AstegniConfig>,
    pub gateway: AuthGateway<T, S>,
    pub roles: Rc<RoleSwitcher<T, S>>,
    pub host: Rc<dyn PageHost>,
}

impl<T: Clone, S: Clone> Clone for Services<T, S> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            gateway: self.gateway.clone(),
            roles: self.roles.clone(),
            host: self.host.clone(),
        }
    }
}

impl Services {
    /// Build the services for the current platform.
    pub fn create(config: AstegniConfig) -> Self {
        let config = resolve_base_url(config);
        Self::from_parts(
            config,
            durable_store(),
            flag_store(),
            ReqwestTransport::new(),
            Rc::new(BrowserHost),
        )
    }
}

impl<T: HttpTransport + Clone, S: KeyValueStore + Clone> Services<T, S> {
    /// Wire the services over explicit backends. Legacy storage keys are
    /// migrated before anything reads the session.
    pub fn from_parts(
        config: AstegniConfig,
        durable: S,
        flags: Rc<dyn KeyValueStore>,
        transport: T,
        host: Rc<dyn PageHost>,
    ) -> Self {
        let session = SessionStore::new(durable, config.storage.clone());
        session.migrate_legacy_keys();

        let gateway = AuthGateway::new(transport, session, config.api.base_url.clone());
        let roles = RoleSwitcher::new(
            gateway.clone(),
            flags,
            host.clone(),
            config.navigation.clone(),
        );
        tracing::debug!(base_url = config.api.base_url.as_str(), "services created");

        Self {
            config: Rc::new(config),
            gateway,
            roles: Rc::new(roles),
            host,
        }
    }

    pub fn session(&self) -> &SessionStore<S> {
        self.gateway.session()
    }

    /// Detach listeners before the page goes away.
    pub fn dispose(&self) {
        self.roles.clear_listeners();
        tracing::debug!("services disposed");
    }
}

/// An empty base URL means "same origin", which `reqwest` needs spelled out.
fn resolve_base_url(config: AstegniConfig) -> AstegniConfig {
    #[cfg(all(target_arch = "wasm32", feature = "web"))]
    {
        if config.api.base_url.is_empty() {
            if let Some(origin) = web_sys::window().and_then(|w| w.location().origin().ok()) {
                return config.with_base_url(origin);
            }
        }
    }
    config
}

#[cfg(all(target_arch = "wasm32", feature = "web"))]
fn durable_store() -> DurableStore {
    store::BrowserStorage::local()
}

#[cfg(not(all(target_arch = "wasm32", feature = "web")))]
fn durable_store() -> DurableStore {
    let base = dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("astegni");
    store::FileStore::new(base)
}

#[cfg(all(target_arch = "wasm32", feature = "web"))]
fn flag_store() -> Rc<dyn KeyValueStore> {
    Rc::new(store::BrowserStorage::session())
}

#[cfg(not(all(target_arch = "wasm32", feature = "web")))]
fn flag_store() -> Rc<dyn KeyValueStore> {
    Rc::new(store::MemoryStore::new())
}
