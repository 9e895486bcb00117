mod modal_overlay;
pub use modal_overlay::{use_modals, Modal, ModalContext, ModalProvider};

mod panel_tabs;
pub use panel_tabs::{use_panels, Panel, PanelContext, PanelLink, PanelProvider};

mod role_guard;
pub use role_guard::RoleGuard;

mod role_menu;
pub use role_menu::RoleSwitcherMenu;

mod add_role_dialog;
pub use add_role_dialog::AddRoleDialog;

mod login_form;
pub use login_form::LoginForm;
