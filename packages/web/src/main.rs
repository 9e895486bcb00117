use dioxus::prelude::*;

use store::AstegniConfig;
use ui::views::ModalProvider;
use ui::SessionProvider;
use views::{Landing, Login, ProfilePage};

mod views;

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[route("/")]
    Landing {},
    #[route("/index.html", Landing)]
    LandingIndex {},
    #[route("/login")]
    Login {},
    #[route("/:page")]
    ProfilePage { page: String },
}

const MAIN_CSS: Asset = asset!("/assets/main.css");
const CONFIG_TOML: &str = include_str!("../astegni.toml");

fn load_config() -> AstegniConfig {
    AstegniConfig::from_toml(CONFIG_TOML).unwrap_or_else(|e| {
        tracing::warn!("invalid {}, using defaults: {e}", AstegniConfig::filename());
        AstegniConfig::default()
    })
}

fn main() {
    if let Err(e) = dioxus::logger::init(tracing::Level::INFO) {
        eprintln!("failed to initialize logger: {e}");
    }
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    rsx! {
        document::Link { rel: "stylesheet", href: MAIN_CSS }

        SessionProvider {
            config: load_config(),
            ModalProvider {
                Router::<Route> {}
            }
        }
    }
}
