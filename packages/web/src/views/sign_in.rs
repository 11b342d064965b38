//! Sign-in page with a sign-up tab.
//!
//! Successful sign-ins are not navigated from here: the session event moves
//! the app into the authenticated state and the shell's profile check picks
//! the destination.

use dioxus::prelude::*;
use store::{SessionError, SignUpOutcome};
use ui::components::{Button, ButtonVariant, Input, Label};
use ui::{notify, use_auth, use_notices, use_session, NoticeLevel};

use crate::Route;

/// GoTrue's default minimum password length.
const MIN_PASSWORD_LEN: usize = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tab {
    SignIn,
    SignUp,
}

fn check_credentials(email: &str, password: &str) -> Result<(), &'static str> {
    if email.is_empty() || !email.contains('@') {
        return Err("Please enter a valid email");
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err("Password must be at least 6 characters");
    }
    Ok(())
}

fn describe(error: &SessionError) -> String {
    match error {
        SessionError::Authentication(inner) => inner.to_string(),
        other => format!("Something went wrong: {other}"),
    }
}

#[component]
pub fn SignIn() -> Element {
    let auth = use_auth();
    let session = use_session();
    let mut notices = use_notices();

    let mut tab = use_signal(|| Tab::SignIn);
    let mut full_name = use_signal(String::new);
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut error = use_signal(|| Option::<String>::None);
    let mut pending_email = use_signal(|| Option::<String>::None);
    let mut loading = use_signal(|| false);

    if let Some(principal) = auth().principal {
        return rsx! {
            div {
                class: "auth-card",
                h1 { "You're signed in" }
                p { "Signed in as {principal.email}." }
                Link { to: Route::Home {}, class: "btn btn-primary", "Browse services" }
            }
        };
    }

    let handle_submit = move |evt: FormEvent| {
        evt.prevent_default();
        let session = session.clone();
        spawn(async move {
            error.set(None);
            let e = email().trim().to_string();
            let p = password();
            if let Err(msg) = check_credentials(&e, &p) {
                error.set(Some(msg.to_string()));
                return;
            }

            loading.set(true);
            match tab() {
                Tab::SignIn => match session.sign_in(&e, &p).await {
                    Ok(principal) => {
                        tracing::info!("Signed in {}", principal.id);
                        password.set(String::new());
                    }
                    Err(err) => {
                        if !matches!(err, SessionError::Authentication(_)) {
                            tracing::error!("Sign-in failed: {err}");
                        }
                        let message = describe(&err);
                        notify(&mut notices, NoticeLevel::Error, "Sign-in failed", &message);
                        error.set(Some(message));
                    }
                },
                Tab::SignUp => {
                    let name = full_name().trim().to_string();
                    let name = (!name.is_empty()).then_some(name);
                    match session.sign_up(&e, &p, name.as_deref()).await {
                        Ok(SignUpOutcome::PendingVerification { email: address }) => {
                            notify(
                                &mut notices,
                                NoticeLevel::Success,
                                "Account created",
                                "Check your email to verify your account.",
                            );
                            pending_email.set(Some(address));
                            password.set(String::new());
                            tab.set(Tab::SignIn);
                        }
                        Ok(SignUpOutcome::SignedIn(principal)) => {
                            tracing::info!("Signed up {}", principal.id);
                            notify(&mut notices, NoticeLevel::Success, "Welcome to LocalHelp", "");
                        }
                        Err(err) => {
                            if !matches!(err, SessionError::Authentication(_)) {
                                tracing::error!("Sign-up failed: {err}");
                            }
                            let message = describe(&err);
                            notify(&mut notices, NoticeLevel::Error, "Sign-up failed", &message);
                            error.set(Some(message));
                        }
                    }
                }
            }
            loading.set(false);
        });
    };

    let tab_class = move |t: Tab| if tab() == t { "tab active" } else { "tab" };

    rsx! {
        div {
            class: "auth-card",
            h1 { "Welcome to LocalHelp" }
            p { class: "muted", "Sign in to your account or create a new one" }

            div {
                class: "tabs",
                button {
                    class: tab_class(Tab::SignIn),
                    onclick: move |_| {
                        error.set(None);
                        tab.set(Tab::SignIn);
                    },
                    "Sign in"
                }
                button {
                    class: tab_class(Tab::SignUp),
                    onclick: move |_| {
                        error.set(None);
                        tab.set(Tab::SignUp);
                    },
                    "Sign up"
                }
            }

            if let Some(address) = pending_email() {
                div {
                    class: "verification-notice",
                    "We sent a confirmation link to {address}. Verify your email, then sign in."
                }
            }

            form {
                onsubmit: handle_submit,
                class: "form-stack",

                if let Some(err) = error() {
                    div { class: "form-error", "{err}" }
                }

                if tab() == Tab::SignUp {
                    div {
                        class: "field",
                        Label { html_for: "full-name", "Full name" }
                        Input {
                            id: "full-name",
                            placeholder: "Your name",
                            value: full_name(),
                            oninput: move |evt: FormEvent| full_name.set(evt.value()),
                        }
                    }
                }

                div {
                    class: "field",
                    Label { html_for: "email", "Email" }
                    Input {
                        id: "email",
                        r#type: "email",
                        placeholder: "you@example.com",
                        value: email(),
                        oninput: move |evt: FormEvent| email.set(evt.value()),
                    }
                }

                div {
                    class: "field",
                    Label { html_for: "password", "Password" }
                    Input {
                        id: "password",
                        r#type: "password",
                        value: password(),
                        oninput: move |evt: FormEvent| password.set(evt.value()),
                    }
                }

                Button {
                    variant: ButtonVariant::Primary,
                    r#type: "submit",
                    disabled: loading(),
                    {match (tab(), loading()) {
                        (Tab::SignIn, false) => "Sign in",
                        (Tab::SignIn, true) => "Signing in...",
                        (Tab::SignUp, false) => "Create account",
                        (Tab::SignUp, true) => "Creating account...",
                    }}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_credentials() {
        assert!(check_credentials("a@b.com", "pw123456").is_ok());
        assert!(check_credentials("", "pw123456").is_err());
        assert!(check_credentials("not-an-email", "pw123456").is_err());
        assert!(check_credentials("a@b.com", "short").is_err());
    }
}
