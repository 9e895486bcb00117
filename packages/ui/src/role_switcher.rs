//! # RoleSwitcher — the right profile page for the active role
//!
//! Profile pages are named after the role they serve (`tutor-profile.html`).
//! Before such a page renders, [`check_page`](RoleSwitcher::check_page) asks
//! the backend which roles the user holds and which one is active:
//!
//! ```text
//! Unchecked ──► Checking ──┬─► Allowed       expected role held and active
//!                          │                 (or the check itself failed)
//!                          └─► Redirecting   A: role not held → landing page
//!                                            B: another role active → its page
//! ```
//!
//! The check fails open: if `/api/my-roles` cannot be reached the page is
//! allowed and a warning is logged. An expired token is not a network
//! problem, so a 401 clears the session and sends the user to log in.
//!
//! [`switch_to_role`](RoleSwitcher::switch_to_role) changes the active role
//! and navigates to its page. A switch already in flight makes further calls
//! no-ops. Before navigating it leaves a tab-scoped flag naming the new role,
//! which the next page's check consumes instead of asking the backend again.
//!
//! A page whose check has reached a terminal state is settled: checking the
//! same path again returns that state with no request and no side effects,
//! until [`reset`](RoleSwitcher::reset) forgets it. A successful switch
//! settles the page it leaves as `Redirecting` to the new role's page.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use api::{AuthError, AuthGateway, HttpTransport};
use store::{KeyValueStore, NavigationConfig, RoleName};

use crate::host::PageHost;
use crate::modal::{ModalController, ModalOptions};

/// Id of the role-creation dialog.
pub const ADD_ROLE_MODAL_ID: &str = "add-role-modal";

/// Progress of the role check for the current page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardState {
    Unchecked,
    Checking,
    Allowed,
    /// Navigation to the contained URL has been requested.
    Redirecting(String),
}

impl GuardState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, GuardState::Allowed | GuardState::Redirecting(_))
    }
}

/// Result of a role switch request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// The backend accepted; navigation to the role's page was requested.
    Switched(RoleName),
    /// Another switch was still in flight. Nothing was sent.
    AlreadyInProgress,
}

type RoleListener = Rc<dyn Fn(RoleName)>;

/// Clears the in-flight flag when a switch ends, including when the caller
/// drops the switch future before it completes.
struct SwitchInFlight<'a>(&'a Cell<bool>);

impl Drop for SwitchInFlight<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Guards profile pages and mediates switching between held roles.
pub struct RoleSwitcher<T, S> {
    gateway: AuthGateway<T, S>,
    flags: Rc<dyn KeyValueStore>,
    host: Rc<dyn PageHost>,
    navigation: NavigationConfig,
    state: RefCell<GuardState>,
    /// Path the current state was reached for.
    checked: RefCell<Option<String>>,
    switching: Cell<bool>,
    preselected: Cell<Option<RoleName>>,
    listeners: RefCell<Vec<RoleListener>>,
}

impl<T: HttpTransport, S: KeyValueStore> RoleSwitcher<T, S> {
    /// `flags` must be tab-scoped storage (`sessionStorage` in the browser).
    pub fn new(
        gateway: AuthGateway<T, S>,
        flags: Rc<dyn KeyValueStore>,
        host: Rc<dyn PageHost>,
        navigation: NavigationConfig,
    ) -> Self {
        Self {
            gateway,
            flags,
            host,
            navigation,
            state: RefCell::new(GuardState::Unchecked),
            checked: RefCell::new(None),
            switching: Cell::new(false),
            preselected: Cell::new(None),
            listeners: RefCell::new(Vec::new()),
        }
    }

    pub fn state(&self) -> GuardState {
        self.state.borrow().clone()
    }

    pub fn is_switching(&self) -> bool {
        self.switching.get()
    }

    pub fn preselected_role(&self) -> Option<RoleName> {
        self.preselected.get()
    }

    /// Call `listener` with the new active role after every successful switch.
    pub fn on_role_changed(&self, listener: impl Fn(RoleName) + 'static) {
        self.listeners.borrow_mut().push(Rc::new(listener));
    }

    pub fn clear_listeners(&self) {
        self.listeners.borrow_mut().clear();
    }

    /// Forget the settled result for `path`, so the next check of it runs
    /// again. Results for other paths are kept.
    pub fn reset(&self, path: &str) {
        if self.checked.borrow().as_deref() == Some(path) {
            *self.checked.borrow_mut() = None;
            self.set_state(GuardState::Unchecked);
        }
    }

    /// Run the role check for the page at `path` to a terminal state.
    pub async fn check_page(&self, path: &str) -> GuardState {
        if let Some(settled) = self.settled(path) {
            tracing::debug!(path, ?settled, "page already checked");
            return settled;
        }
        *self.checked.borrow_mut() = Some(path.to_string());

        let Some(expected) = self.navigation.expected_role(path) else {
            return self.finish(GuardState::Allowed);
        };
        self.set_state(GuardState::Checking);

        let session = self.gateway.session();
        if !session.is_authenticated() {
            tracing::info!(%expected, "profile page without a session");
            self.host.alert("Please log in to access this page.");
            return self.redirect(self.navigation.login_page.clone());
        }

        if let Some(flagged) = self.take_switch_flag() {
            if flagged == expected {
                tracing::debug!(%expected, "trusting role switch flag");
                return self.finish(GuardState::Allowed);
            }
            tracing::debug!(%flagged, %expected, "discarding stale role switch flag");
        }

        let roles = match self.gateway.my_roles().await {
            Ok(roles) => roles,
            Err(AuthError::Unauthorized) => {
                session.clear();
                self.host
                    .alert("Your session has expired. Please log in again.");
                return self.redirect(self.navigation.login_page.clone());
            }
            Err(e) => {
                tracing::warn!(%expected, "role check failed, allowing page: {e}");
                return self.finish(GuardState::Allowed);
            }
        };

        if !roles.roles.is_empty() {
            if let Err(e) = session.update_roles(roles.roles.clone()) {
                tracing::warn!("failed to store roles: {e}");
            }
        }
        if let Some(active) = roles.active_role {
            if let Err(e) = session.set_active_role(Some(active)) {
                tracing::warn!("failed to store active role: {e}");
            }
        }

        let held = session.user().map(|u| u.roles).unwrap_or_default();
        let active = session.active_role();

        if !held.contains(&expected) {
            tracing::info!(%expected, "role not held");
            self.host.alert(&format!(
                "Your {} role is not active on this account. It may have been deactivated.",
                expected.label()
            ));
            return self.redirect(self.navigation.landing_page.clone());
        }
        match active {
            Some(active) if active == expected => self.finish(GuardState::Allowed),
            Some(active) => {
                tracing::info!(%expected, %active, "page belongs to another role");
                self.redirect(self.navigation.profile_url(active))
            }
            None => self.redirect(self.navigation.landing_page.clone()),
        }
    }

    /// Make `role` the active role and go to its profile page.
    pub async fn switch_to_role(&self, role: RoleName) -> Result<SwitchOutcome, AuthError> {
        if self.switching.replace(true) {
            tracing::debug!(%role, "role switch already in progress");
            return Ok(SwitchOutcome::AlreadyInProgress);
        }
        let _switching = SwitchInFlight(&self.switching);

        match self.gateway.switch_role(role).await {
            Ok(active) => {
                if let Err(e) = self.gateway.session().set_active_role(Some(active)) {
                    tracing::warn!("failed to store active role: {e}");
                }
                self.set_switch_flag(active);
                tracing::info!(%active, "switched role");

                let target = self.navigation.profile_url(active);
                *self.checked.borrow_mut() = Some(self.host.current_path());
                self.set_state(GuardState::Redirecting(target.clone()));

                let listeners = self.listeners.borrow().clone();
                for listener in listeners {
                    listener(active);
                }
                self.host.navigate(&target);
                Ok(SwitchOutcome::Switched(active))
            }
            Err(e) => {
                self.clear_switch_flag();
                tracing::warn!(%role, "role switch failed: {e}");
                self.host.alert(&e.to_string());
                Err(e)
            }
        }
    }

    /// Show the role-creation dialog, optionally pre-filled with `preselected`.
    /// Returns whether the dialog is now open.
    pub fn open_add_role_modal(
        &self,
        modals: &ModalController,
        preselected: Option<RoleName>,
    ) -> bool {
        self.preselected.set(preselected);
        modals.open(ADD_ROLE_MODAL_ID, ModalOptions::default().exclusive());
        modals.is_open(ADD_ROLE_MODAL_ID)
    }

    fn settled(&self, path: &str) -> Option<GuardState> {
        if self.checked.borrow().as_deref() != Some(path) {
            return None;
        }
        let state = self.state();
        state.is_terminal().then_some(state)
    }

    fn set_state(&self, state: GuardState) {
        *self.state.borrow_mut() = state;
    }

    fn finish(&self, state: GuardState) -> GuardState {
        self.set_state(state.clone());
        state
    }

    fn redirect(&self, url: String) -> GuardState {
        self.host.navigate(&url);
        self.finish(GuardState::Redirecting(url))
    }

    fn flag_key(&self) -> &str {
        &self.gateway.session().keys().switch_flag_key
    }

    fn take_switch_flag(&self) -> Option<RoleName> {
        let raw = self.flags.get(self.flag_key())?;
        self.clear_switch_flag();
        raw.parse().ok()
    }

    fn set_switch_flag(&self, role: RoleName) {
        if let Err(e) = self.flags.set(self.flag_key(), role.as_str()) {
            tracing::warn!("failed to set role switch flag: {e}");
        }
    }

    fn clear_switch_flag(&self) {
        if let Err(e) = self.flags.remove(self.flag_key()) {
            tracing::warn!("failed to clear role switch flag: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use api::testing::ScriptedTransport;
    use serde_json::json;
    use store::{MemoryStore, SessionStore, StorageConfig, UserRecord};

    use super::*;
    use crate::modal::ModalController;
    use crate::testing::{FakeModals, RecordingHost};

    struct Fixture {
        transport: ScriptedTransport,
        flags: MemoryStore,
        host: Rc<RecordingHost>,
        session: SessionStore<MemoryStore>,
        switcher: RoleSwitcher<ScriptedTransport, MemoryStore>,
    }

    fn fixture(roles: &[RoleName], active: Option<RoleName>) -> Fixture {
        let transport = ScriptedTransport::new();
        let session = SessionStore::new(MemoryStore::new(), StorageConfig::default());
        if !roles.is_empty() {
            let user = UserRecord {
                id: 7,
                roles: roles.iter().copied().collect(),
                ..Default::default()
            };
            session.persist("T", user).unwrap();
            session.set_active_role(active).unwrap();
        }
        let gateway = AuthGateway::new(transport.clone(), session.clone(), "");
        let flags = MemoryStore::new();
        let host = Rc::new(RecordingHost::default());
        let switcher = RoleSwitcher::new(
            gateway,
            Rc::new(flags.clone()),
            host.clone(),
            NavigationConfig::default(),
        );
        Fixture {
            transport,
            flags,
            host,
            session,
            switcher,
        }
    }

    #[tokio::test]
    async fn test_non_profile_page_is_allowed() {
        let f = fixture(&[], None);
        assert_eq!(f.switcher.state(), GuardState::Unchecked);
        assert_eq!(f.switcher.check_page("/find-tutors.html").await, GuardState::Allowed);
        assert_eq!(f.transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_matching_role_is_allowed() {
        let f = fixture(&[RoleName::Tutor], Some(RoleName::Tutor));
        f.transport
            .reply(200, json!({"user_roles": ["tutor"], "active_role": "tutor"}));

        let state = f.switcher.check_page("/tutor-profile.html").await;

        assert_eq!(state, GuardState::Allowed);
        assert_eq!(f.switcher.state(), GuardState::Allowed);
        assert!(f.host.navigations().is_empty());
        assert_eq!(f.transport.requests()[0].url, "/api/my-roles");
    }

    #[tokio::test]
    async fn test_other_active_role_redirects_to_its_page() {
        let f = fixture(&[RoleName::Student, RoleName::Tutor], Some(RoleName::Student));
        f.transport.reply(
            200,
            json!({"user_roles": ["student", "tutor"], "active_role": "student"}),
        );

        let state = f.switcher.check_page("/tutor-profile.html").await;

        assert_eq!(
            state,
            GuardState::Redirecting("/student-profile.html".to_string())
        );
        assert_eq!(f.host.navigations(), vec!["/student-profile.html"]);
        assert!(f.host.alerts().is_empty());
    }

    #[tokio::test]
    async fn test_role_not_held_alerts_and_goes_to_landing() {
        let f = fixture(&[RoleName::Student], Some(RoleName::Student));
        f.transport
            .reply(200, json!({"user_roles": ["student"], "active_role": "student"}));

        let state = f.switcher.check_page("/parent-profile.html").await;

        assert_eq!(state, GuardState::Redirecting("/index.html".to_string()));
        assert_eq!(f.host.navigations(), vec!["/index.html"]);
        assert_eq!(f.host.alerts().len(), 1);
        assert!(f.host.alerts()[0].contains("Parent"));
    }

    #[tokio::test]
    async fn test_network_failure_fails_open() {
        let f = fixture(&[RoleName::Tutor], Some(RoleName::Student));
        f.transport.fail();

        let state = f.switcher.check_page("/tutor-profile.html").await;

        assert_eq!(state, GuardState::Allowed);
        assert!(f.host.navigations().is_empty());
        assert!(f.session.is_authenticated());
    }

    #[tokio::test]
    async fn test_expired_token_clears_session() {
        let f = fixture(&[RoleName::Tutor], Some(RoleName::Tutor));
        f.transport.reply(401, json!({"detail": "Could not validate credentials"}));

        let state = f.switcher.check_page("/tutor-profile.html").await;

        assert_eq!(state, GuardState::Redirecting("/login".to_string()));
        assert!(!f.session.is_authenticated());
        assert_eq!(f.host.alerts().len(), 1);
    }

    #[tokio::test]
    async fn test_no_session_redirects_to_login() {
        let f = fixture(&[], None);
        let state = f.switcher.check_page("/tutor-profile.html").await;

        assert_eq!(state, GuardState::Redirecting("/login".to_string()));
        assert_eq!(f.transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_check_writes_back_fresh_roles() {
        let f = fixture(&[RoleName::Student], Some(RoleName::Student));
        f.transport.reply(
            200,
            json!({"user_roles": ["student", "tutor"], "active_role": "tutor"}),
        );

        let state = f.switcher.check_page("/tutor-profile.html").await;

        assert_eq!(state, GuardState::Allowed);
        assert_eq!(f.session.active_role(), Some(RoleName::Tutor));
        assert_eq!(
            f.session.user().unwrap().roles,
            BTreeSet::from([RoleName::Student, RoleName::Tutor])
        );
    }

    #[tokio::test]
    async fn test_concurrent_switch_sends_once() {
        let f = fixture(&[RoleName::Student, RoleName::Tutor], Some(RoleName::Student));
        f.transport
            .reply(200, json!({"success": true, "active_role": "tutor"}));

        let (first, second) = tokio::join!(
            f.switcher.switch_to_role(RoleName::Tutor),
            f.switcher.switch_to_role(RoleName::Tutor)
        );

        assert_eq!(first.unwrap(), SwitchOutcome::Switched(RoleName::Tutor));
        assert_eq!(second.unwrap(), SwitchOutcome::AlreadyInProgress);
        assert_eq!(f.transport.request_count(), 1);
        assert_eq!(f.host.navigations(), vec!["/tutor-profile.html"]);
        assert!(!f.switcher.is_switching());
    }

    #[tokio::test]
    async fn test_switch_flag_skips_next_check() {
        let f = fixture(&[RoleName::Student, RoleName::Tutor], Some(RoleName::Student));
        let heard = Rc::new(Cell::new(None));
        let sink = heard.clone();
        f.switcher.on_role_changed(move |role| sink.set(Some(role)));
        f.transport
            .reply(200, json!({"success": true, "active_role": "tutor"}));

        f.switcher.switch_to_role(RoleName::Tutor).await.unwrap();

        assert_eq!(heard.get(), Some(RoleName::Tutor));
        assert_eq!(f.session.active_role(), Some(RoleName::Tutor));
        assert_eq!(f.flags.get("role_switch_in_progress").as_deref(), Some("tutor"));

        let state = f.switcher.check_page("/tutor-profile.html").await;
        assert_eq!(state, GuardState::Allowed);
        assert_eq!(f.transport.request_count(), 1);
        assert!(f.flags.get("role_switch_in_progress").is_none());
    }

    #[tokio::test]
    async fn test_switch_settles_the_page_it_leaves() {
        let f = fixture(&[RoleName::Student, RoleName::Tutor], Some(RoleName::Student));
        *f.host.path.borrow_mut() = "/student-profile.html".to_string();
        f.transport
            .reply(200, json!({"success": true, "active_role": "tutor"}));

        f.switcher.switch_to_role(RoleName::Tutor).await.unwrap();
        assert_eq!(
            f.switcher.state(),
            GuardState::Redirecting("/tutor-profile.html".to_string())
        );

        // The page being left re-runs its check after the role change.
        let again = f.switcher.check_page("/student-profile.html").await;
        assert_eq!(again, GuardState::Redirecting("/tutor-profile.html".to_string()));
        assert_eq!(f.flags.get("role_switch_in_progress").as_deref(), Some("tutor"));

        let next = f.switcher.check_page("/tutor-profile.html").await;
        assert_eq!(next, GuardState::Allowed);
        assert_eq!(f.host.navigations(), vec!["/tutor-profile.html"]);
        assert_eq!(f.transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_settled_page_is_not_checked_again() {
        let f = fixture(&[RoleName::Tutor], Some(RoleName::Tutor));
        f.transport
            .reply(200, json!({"user_roles": ["tutor"], "active_role": "tutor"}));
        assert_eq!(f.switcher.check_page("/tutor-profile.html").await, GuardState::Allowed);

        f.session.clear();
        assert_eq!(f.switcher.check_page("/tutor-profile.html").await, GuardState::Allowed);
        assert_eq!(f.transport.request_count(), 1);
        assert!(f.host.alerts().is_empty());

        f.switcher.reset("/student-profile.html");
        assert_eq!(f.switcher.state(), GuardState::Allowed);
        f.switcher.reset("/tutor-profile.html");
        assert_eq!(f.switcher.state(), GuardState::Unchecked);
        assert_eq!(
            f.switcher.check_page("/tutor-profile.html").await,
            GuardState::Redirecting("/login".to_string())
        );
    }

    #[tokio::test]
    async fn test_dropped_switch_releases_guard() {
        let f = fixture(&[RoleName::Student, RoleName::Tutor], Some(RoleName::Student));
        f.transport
            .reply(200, json!({"success": true, "active_role": "tutor"}));

        tokio::select! {
            biased;
            _ = f.switcher.switch_to_role(RoleName::Tutor) => panic!("switch finished early"),
            _ = std::future::ready(()) => {}
        }
        assert!(!f.switcher.is_switching());

        let outcome = f.switcher.switch_to_role(RoleName::Tutor).await.unwrap();
        assert_eq!(outcome, SwitchOutcome::Switched(RoleName::Tutor));
        assert_eq!(f.transport.request_count(), 2);
    }

    #[tokio::test]
    async fn test_failed_switch_alerts_server_message() {
        let f = fixture(&[RoleName::Student], Some(RoleName::Student));
        f.transport
            .reply(403, json!({"detail": "You do not have the tutor role"}));

        let err = f.switcher.switch_to_role(RoleName::Tutor).await.unwrap_err();

        assert!(matches!(err, AuthError::Rejected(_)));
        assert_eq!(f.host.alerts(), vec!["You do not have the tutor role"]);
        assert!(f.host.navigations().is_empty());
        assert!(f.flags.is_empty());
        assert_eq!(f.session.active_role(), Some(RoleName::Student));
        assert!(!f.switcher.is_switching());
    }

    #[test]
    fn test_open_add_role_modal_is_exclusive() {
        let f = fixture(&[RoleName::Student], Some(RoleName::Student));
        let modals = ModalController::new(Rc::new(FakeModals::new(&[
            "share-modal",
            ADD_ROLE_MODAL_ID,
        ])));
        modals.open("share-modal", ModalOptions::default());

        assert!(f.switcher.open_add_role_modal(&modals, Some(RoleName::Parent)));

        assert_eq!(modals.open_modals(), vec![ADD_ROLE_MODAL_ID]);
        assert_eq!(f.switcher.preselected_role(), Some(RoleName::Parent));
    }
}
