use api::BackendConfig;
use dioxus::prelude::*;
use store::Destination;

use ui::{AuthProvider, NoticeProvider};
use views::{AppShell, CompleteProfile, Home, MyServices, Profile, SignIn};

mod views;

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[layout(AppShell)]
        #[route("/")]
        Home {},
        #[route("/signin")]
        SignIn {},
        #[route("/complete-profile")]
        CompleteProfile {},
        #[route("/profile")]
        Profile {},
        #[route("/my-services")]
        MyServices {},
}

impl From<Destination> for Route {
    fn from(destination: Destination) -> Self {
        match destination {
            Destination::Home => Route::Home {},
            Destination::SignIn => Route::SignIn {},
            Destination::CompleteProfile => Route::CompleteProfile {},
            Destination::Profile => Route::Profile {},
            Destination::MyServices => Route::MyServices {},
        }
    }
}

const MAIN_CSS: Asset = asset!("/assets/main.css");

fn main() {
    if let Err(e) = dioxus::logger::init(tracing::Level::INFO) {
        eprintln!("Failed to initialise logging: {e}");
    }
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    let config = use_hook(|| {
        BackendConfig::load().map_err(|e| {
            tracing::error!("Invalid configuration: {e}");
            e.to_string()
        })
    });

    rsx! {
        // Global app resources
        document::Link { rel: "stylesheet", href: MAIN_CSS }

        {match config {
            Ok(config) => rsx! {
                NoticeProvider {
                    AuthProvider {
                        config,
                        Router::<Route> {}
                    }
                }
            },
            Err(message) => rsx! {
                ConfigErrorScreen { message }
            },
        }}
    }
}

/// Shown instead of the app when the backend is not configured.
#[component]
fn ConfigErrorScreen(message: String) -> Element {
    rsx! {
        div {
            class: "config-error",
            h1 { "LocalHelp cannot start" }
            p { "The backend is not configured: {message}" }
            p {
                "Set "
                code { "LOCALHELP_SUPABASE_URL" }
                " and "
                code { "LOCALHELP_SUPABASE_ANON_KEY" }
                " in the environment, a "
                code { ".env" }
                " file or "
                code { "localhelp.toml" }
                ", then restart."
            }
        }
    }
}
