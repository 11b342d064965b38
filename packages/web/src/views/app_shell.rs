//! Layout around every page: navigation, notices, and the post-sign-in
//! profile check.

use std::rc::Rc;

use dioxus::prelude::*;
use dioxus::router::Navigator;
use store::{check_profile, navigation_after, AuthEntry, AuthTransitions, Principal};
use ui::{
    notify, use_auth, use_notices, use_session, AppSession, Navbar, NoticeLevel, NoticePanel,
    Notices, SignOutButton,
};

use crate::Route;

#[component]
pub fn AppShell() -> Element {
    let auth = use_auth();
    let session = use_session();
    let nav = use_navigator();
    let notices = use_notices();
    let mut transitions = use_signal(AuthTransitions::new);
    // Set while the last profile check failed; holds the entry to retry with.
    let mut failed_check = use_signal(|| None::<AuthEntry>);

    use_effect({
        let session = session.clone();
        move || {
            let state = auth();
            let entry = transitions.write().observe(&state);
            match (entry, state.principal) {
                (Some(entry @ (AuthEntry::SignedIn | AuthEntry::Restored)), Some(principal)) => {
                    spawn_profile_check(session.clone(), principal, entry, nav, failed_check, notices);
                }
                (Some(AuthEntry::SignedOut), _) => failed_check.set(None),
                _ => {}
            }
        }
    });

    let retry = {
        let session = session.clone();
        move |_: MouseEvent| {
            let (Some(entry), Some(principal)) = (failed_check(), session.principal()) else {
                return;
            };
            spawn_profile_check(session.clone(), principal, entry, nav, failed_check, notices);
        }
    };

    let signed_in = auth().principal.is_some();

    rsx! {
        Navbar {
            brand: rsx! {
                Link { to: Route::Home {}, "LocalHelp" }
            },
            Link { to: Route::Home {}, "Browse" }
            if signed_in {
                Link { to: Route::MyServices {}, "My services" }
                Link { to: Route::Profile {}, "Profile" }
                SignOutButton {
                    class: "btn btn-ghost",
                    on_signed_out: move |_| {
                        nav.replace(Route::SignIn {});
                    },
                }
            } else {
                Link { to: Route::SignIn {}, class: "btn btn-primary", "Sign in" }
            }
        }

        if failed_check().is_some() {
            div {
                class: "retry-banner",
                span { "We couldn't check your profile." }
                button { class: "btn btn-secondary", onclick: retry, "Retry" }
                Link { to: Route::Home {}, "Continue to home" }
            }
        }

        main {
            class: "page",
            Outlet::<Route> {}
        }

        NoticePanel {}
    }
}

/// Check the principal's profile and navigate where the result says. A
/// failure raises a notice and arms the retry banner.
fn spawn_profile_check(
    session: Rc<AppSession>,
    principal: Principal,
    entry: AuthEntry,
    nav: Navigator,
    mut failed_check: Signal<Option<AuthEntry>>,
    mut notices: Signal<Notices>,
) {
    spawn(async move {
        let result = check_profile(session.backend(), &principal).await;

        // The user may have signed out or switched accounts meanwhile.
        if session.principal().map(|p| p.id) != Some(principal.id) {
            return;
        }

        match result {
            Ok(destination) => {
                failed_check.set(None);
                if let Some(destination) = navigation_after(entry, destination) {
                    tracing::info!("Navigating to {} after {entry:?}", destination.path());
                    nav.replace(Route::from(destination));
                }
            }
            Err(e) => {
                notify(
                    &mut notices,
                    NoticeLevel::Error,
                    "Could not check your profile",
                    &e.to_string(),
                );
                failed_check.set(Some(entry));
            }
        }
    });
}
