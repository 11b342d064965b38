use dioxus::prelude::*;
use store::{Profile as ProfileRow, ProfileUpdate, SessionError};
use ui::components::{Button, ButtonVariant, Input, Label, Textarea};
use ui::{notify, use_auth, use_notices, use_session, NoticeLevel};

use super::guard::Protected;
use crate::Route;

#[component]
pub fn Profile() -> Element {
    rsx! {
        Protected {
            ProfilePage {}
        }
    }
}

/// Editable copy of the profile fields shown on this page.
#[derive(Clone, Debug, Default, PartialEq)]
struct ProfileDraft {
    full_name: String,
    phone: String,
    location: String,
    bio: String,
}

impl ProfileDraft {
    fn from_profile(profile: Option<&ProfileRow>) -> Self {
        let Some(p) = profile else {
            return Self::default();
        };
        Self {
            full_name: p.full_name.clone().unwrap_or_default(),
            phone: p.phone.clone().unwrap_or_default(),
            location: p.location.clone().unwrap_or_default(),
            bio: p.bio.clone().unwrap_or_default(),
        }
    }

    fn to_update(&self) -> ProfileUpdate {
        ProfileUpdate {
            full_name: Some(self.full_name.trim().to_string()),
            phone: Some(self.phone.trim().to_string()),
            location: Some(self.location.trim().to_string()),
            bio: Some(self.bio.trim().to_string()),
            ..ProfileUpdate::default()
        }
    }
}

#[component]
fn ProfilePage() -> Element {
    let auth = use_auth();
    let session = use_session();
    let mut notices = use_notices();

    let mut profile = use_resource({
        let session = session.clone();
        move || {
            let session = session.clone();
            async move { session.fetch_profile().await }
        }
    });
    let mut editing = use_signal(|| false);
    let mut draft = use_signal(ProfileDraft::default);
    let mut saving = use_signal(|| false);

    let email = auth().principal.map(|p| p.email).unwrap_or_default();

    let loaded: Option<ProfileRow> = match profile() {
        None => {
            return rsx! {
                div { class: "page-loading", "Loading profile..." }
            }
        }
        Some(Err(e)) => {
            tracing::error!("Failed to load profile: {e}");
            return rsx! {
                div {
                    class: "listing-status error",
                    p { "Your profile could not be loaded." }
                    Button {
                        variant: ButtonVariant::Secondary,
                        onclick: move |_| profile.restart(),
                        "Try again"
                    }
                }
            };
        }
        Some(Ok(loaded)) => loaded,
    };

    let start_editing = {
        let loaded = loaded.clone();
        move |_: MouseEvent| {
            draft.set(ProfileDraft::from_profile(loaded.as_ref()));
            editing.set(true);
        }
    };

    let save = move |evt: FormEvent| {
        evt.prevent_default();
        if saving() {
            return;
        }
        let session = session.clone();
        spawn(async move {
            saving.set(true);
            let update = draft().to_update();
            match session.update_profile(&update).await {
                Ok(()) => {
                    notify(&mut notices, NoticeLevel::Success, "Profile updated", "");
                    editing.set(false);
                    profile.restart();
                }
                Err(e) => {
                    if e != SessionError::NotSignedIn {
                        tracing::error!("Failed to update profile: {e}");
                    }
                    notify(
                        &mut notices,
                        NoticeLevel::Error,
                        "Could not update your profile",
                        "Please try again.",
                    );
                }
            }
            saving.set(false);
        });
    };

    let shown = ProfileDraft::from_profile(loaded.as_ref());
    let display_name = loaded
        .as_ref()
        .map(|p| p.display_name(&email).to_string())
        .unwrap_or_else(|| email.clone());
    let incomplete = !loaded.as_ref().is_some_and(|p| p.is_complete());

    rsx! {
        div {
            class: "profile-card",
            div {
                class: "profile-header",
                h1 { "{display_name}" }
                span { class: "muted", "{email}" }
            }

            if incomplete {
                div {
                    class: "retry-banner",
                    span { "Your profile is missing contact details." }
                    Link { to: Route::CompleteProfile {}, "Complete it now" }
                }
            }

            if editing() {
                form {
                    onsubmit: save,
                    class: "form-stack",
                    div {
                        class: "field",
                        Label { html_for: "full-name", "Full name" }
                        Input {
                            id: "full-name",
                            value: draft().full_name,
                            oninput: move |evt: FormEvent| draft.write().full_name = evt.value(),
                        }
                    }
                    div {
                        class: "field",
                        Label { html_for: "phone", "Phone number" }
                        Input {
                            id: "phone",
                            r#type: "tel",
                            value: draft().phone,
                            oninput: move |evt: FormEvent| draft.write().phone = evt.value(),
                        }
                    }
                    div {
                        class: "field",
                        Label { html_for: "location", "Location" }
                        Input {
                            id: "location",
                            value: draft().location,
                            oninput: move |evt: FormEvent| draft.write().location = evt.value(),
                        }
                    }
                    div {
                        class: "field",
                        Label { html_for: "bio", "Bio" }
                        Textarea {
                            id: "bio",
                            placeholder: "Tell people a little about yourself",
                            value: draft().bio,
                            oninput: move |evt: FormEvent| draft.write().bio = evt.value(),
                        }
                    }
                    div {
                        class: "form-actions",
                        Button {
                            variant: ButtonVariant::Secondary,
                            onclick: move |_| editing.set(false),
                            "Cancel"
                        }
                        Button {
                            variant: ButtonVariant::Primary,
                            r#type: "submit",
                            disabled: saving(),
                            if saving() { "Saving..." } else { "Save changes" }
                        }
                    }
                }
            } else {
                dl {
                    class: "profile-facts",
                    dt { "Phone" }
                    dd { {or_not_set(&shown.phone)} }
                    dt { "Location" }
                    dd { {or_not_set(&shown.location)} }
                    dt { "Bio" }
                    dd { {or_not_set(&shown.bio)} }
                }
                Button {
                    variant: ButtonVariant::Primary,
                    onclick: start_editing,
                    "Edit profile"
                }
            }
        }
    }
}

fn or_not_set(value: &str) -> String {
    if value.trim().is_empty() {
        "Not set".to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_roundtrip_through_update() {
        let row = ProfileRow {
            user_id: "u1".to_string(),
            full_name: Some("Ada".to_string()),
            phone: Some("555-0100".to_string()),
            ..ProfileRow::default()
        };
        let draft = ProfileDraft::from_profile(Some(&row));
        assert_eq!(draft.location, "");

        let update = draft.to_update();
        assert_eq!(update.full_name.as_deref(), Some("Ada"));
        assert_eq!(update.phone.as_deref(), Some("555-0100"));
        assert_eq!(update.user_type, None);
    }
}
