use dioxus::prelude::*;
use ui::{use_auth, ListingBrowser};

use crate::Route;

#[component]
pub fn Home() -> Element {
    let auth = use_auth();
    let signed_in = auth().principal.is_some();

    rsx! {
        section {
            class: "hero",
            h1 { "Find help close to home" }
            p {
                "Tutoring, cleaning, tech support and more, offered by people in your community."
            }
            if signed_in {
                Link { to: Route::MyServices {}, class: "btn btn-primary", "Offer a service" }
            } else {
                Link { to: Route::SignIn {}, class: "btn btn-primary", "Join LocalHelp" }
            }
        }

        section {
            class: "browse",
            h2 { "Available services" }
            ListingBrowser {}
        }
    }
}
