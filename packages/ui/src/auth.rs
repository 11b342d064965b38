//! Authentication context and hooks for the UI.
//!
//! [`AuthProvider`] owns the one [`Session`] of the app. It mirrors the
//! session's state into a `Signal<SessionState>` so components re-render on
//! sign-in and sign-out, and runs three tasks for its lifetime: the initial
//! session fetch, the auth-event listener, and the token refresh loop.

use std::rc::Rc;
use std::time::Duration;

use api::{BackendConfig, SupabaseClient};
use dioxus::prelude::*;
use store::{Session, SessionState};

use crate::notice::{notify, use_notices, NoticeLevel};
use crate::timer::sleep;

/// The session type shared through context.
pub type AppSession = Session<SupabaseClient>;

/// How often the refresh loop wakes up.
const REFRESH_INTERVAL: Duration = Duration::from_secs(30);
/// Renew tokens expiring within this many seconds.
const REFRESH_MARGIN_SECS: i64 = 60;

/// Get the current session state.
/// Returns a signal that updates when the user signs in or out.
pub fn use_auth() -> Signal<SessionState> {
    use_context::<Signal<SessionState>>()
}

/// Get the shared session, for sign-in/out and backend calls.
pub fn use_session() -> Rc<AppSession> {
    use_context::<Rc<AppSession>>()
}

/// Provider component that manages authentication state.
/// Wrap your app with this component to enable authentication.
#[component]
pub fn AuthProvider(config: BackendConfig, children: Element) -> Element {
    let session = use_hook(|| Rc::new(Session::new(SupabaseClient::new(config.clone()))));
    let mut auth_state = use_signal(SessionState::default);

    use_hook({
        let session = session.clone();
        move || {
            // Take both receivers before the initial fetch is issued.
            let mut changes = session.watch();
            let events = session.subscribe();

            spawn(async move {
                while changes.changed().await.is_ok() {
                    let next = changes.borrow_and_update().clone();
                    auth_state.set(next);
                }
            });

            let listener = session.clone();
            spawn(async move { listener.listen(events).await });

            let initial = session.clone();
            spawn(async move { initial.init().await });

            // Periodic token renewal
            let refresher = session;
            spawn(async move {
                loop {
                    sleep(REFRESH_INTERVAL).await;
                    if auth_state.peek().principal.is_none() {
                        continue;
                    }
                    if let Err(e) = refresher
                        .refresh_if_expiring(api::now_unix(), REFRESH_MARGIN_SECS)
                        .await
                    {
                        tracing::warn!("Token refresh failed: {e}");
                    }
                }
            });
        }
    });

    use_drop({
        let session = session.clone();
        move || session.teardown()
    });

    use_context_provider(|| auth_state);
    use_context_provider(|| session.clone());

    rsx! {
        {children}
    }
}

/// Button to sign out the current user.
#[component]
pub fn SignOutButton(
    #[props(default = "Sign out".to_string())] label: String,
    #[props(default = "".to_string())] class: String,
    on_signed_out: Option<EventHandler<()>>,
) -> Element {
    let session = use_session();
    let mut notices = use_notices();
    let mut busy = use_signal(|| false);

    let onclick = move |_| {
        let session = session.clone();
        async move {
            busy.set(true);
            match session.sign_out().await {
                Ok(()) => {
                    if let Some(handler) = on_signed_out {
                        handler.call(());
                    }
                }
                Err(e) => {
                    tracing::error!("Sign-out failed: {e}");
                    notify(
                        &mut notices,
                        NoticeLevel::Error,
                        "Sign-out failed",
                        &e.to_string(),
                    );
                }
            }
            busy.set(false);
        }
    };

    rsx! {
        button {
            class: "{class}",
            disabled: busy(),
            onclick: onclick,
            "{label}"
        }
    }
}
