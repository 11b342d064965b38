use dioxus::prelude::*;
use store::GuardOutcome;
use ui::use_auth;

use crate::Route;

/// Renders `children` only for a signed-in user. While the first session
/// check is pending a placeholder is shown; signed-out users are sent to
/// the sign-in page without leaving a history entry behind.
#[component]
pub fn Protected(children: Element) -> Element {
    let auth = use_auth();
    let nav = use_navigator();

    use_effect(move || {
        if let GuardOutcome::Redirect { to, replace } = auth().guard().outcome() {
            if replace {
                nav.replace(Route::from(to));
            } else {
                nav.push(Route::from(to));
            }
        }
    });

    match auth().guard().outcome() {
        GuardOutcome::Placeholder => rsx! {
            div { class: "page-loading", "Loading..." }
        },
        GuardOutcome::Redirect { .. } => rsx! {},
        GuardOutcome::Render => children,
    }
}
