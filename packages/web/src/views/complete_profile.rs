use dioxus::prelude::*;
use store::form::ProfileStep;
use store::{ProfileCompletion, StepForm, UserRole};
use ui::components::{Button, ButtonVariant, FieldError, Input, Label};
use ui::{notify, use_notices, use_session, NoticeLevel};

use super::guard::Protected;
use super::wizard::StepHeader;
use crate::Route;

#[component]
pub fn CompleteProfile() -> Element {
    rsx! {
        Protected {
            ProfileWizard {}
        }
    }
}

#[component]
fn ProfileWizard() -> Element {
    let session = use_session();
    let nav = use_navigator();
    let mut notices = use_notices();
    let mut form = use_signal(StepForm::<ProfileCompletion>::default);

    let handle_submit = move |evt: FormEvent| {
        evt.prevent_default();
        if !form.read().is_last() {
            // Enter on an earlier step advances instead of submitting.
            if let Err(e) = form.write().next() {
                tracing::debug!("Step rejected: {e}");
            }
            return;
        }
        let session = session.clone();
        spawn(async move {
            let prepared = form
                .write()
                .begin_submit()
                .map(|data| (data.to_update(), data.destination()));
            let (update, destination) = match prepared {
                Ok(prepared) => prepared,
                Err(e) => {
                    tracing::debug!("Profile form not submitted: {e}");
                    return;
                }
            };

            let result = session.update_profile(&update).await;
            form.write().finish_submit();
            match result {
                Ok(()) => {
                    notify(&mut notices, NoticeLevel::Success, "Profile saved", "");
                    nav.replace(Route::from(destination));
                }
                Err(e) => {
                    tracing::error!("Failed to save profile: {e}");
                    notify(
                        &mut notices,
                        NoticeLevel::Error,
                        "Could not save your profile",
                        "Please try again.",
                    );
                }
            }
        });
    };

    let current = form.read().clone();
    let errors = current.errors().clone();
    let data = current.data().clone();
    let title = match current.step() {
        ProfileStep::Contact => "How can people reach you?",
        ProfileStep::Role => "What would you like to do?",
    };

    rsx! {
        div {
            class: "auth-card",
            h1 { "Complete your profile" }
            StepHeader {
                step: current.step_number(),
                count: current.step_count(),
                title: title.to_string(),
            }

            form {
                onsubmit: handle_submit,
                class: "form-stack",

                {match current.step() {
                    ProfileStep::Contact => rsx! {
                        div {
                            class: "field",
                            Label { html_for: "phone", "Phone number" }
                            Input {
                                id: "phone",
                                r#type: "tel",
                                placeholder: "Enter your phone number",
                                value: data.phone.clone(),
                                oninput: move |evt: FormEvent| form.write().data_mut().phone = evt.value(),
                            }
                            FieldError { message: errors.get("phone").copied() }
                        }
                        div {
                            class: "field",
                            Label { html_for: "location", "Location" }
                            Input {
                                id: "location",
                                placeholder: "Enter your location",
                                value: data.location.clone(),
                                oninput: move |evt: FormEvent| form.write().data_mut().location = evt.value(),
                            }
                            FieldError { message: errors.get("location").copied() }
                        }
                    },
                    ProfileStep::Role => rsx! {
                        fieldset {
                            class: "choice-group",
                            RoleChoice {
                                role: UserRole::Hire,
                                label: "I'm looking to hire someone",
                                selected: data.role == UserRole::Hire,
                                on_pick: move |role| form.write().data_mut().role = role,
                            }
                            RoleChoice {
                                role: UserRole::Offer,
                                label: "I want to offer a service",
                                selected: data.role == UserRole::Offer,
                                on_pick: move |role| form.write().data_mut().role = role,
                            }
                        }
                    },
                }}

                div {
                    class: "form-actions",
                    if !current.is_first() {
                        Button {
                            variant: ButtonVariant::Secondary,
                            onclick: move |_| {
                                form.write().back();
                            },
                            "Back"
                        }
                    }
                    if current.is_last() {
                        Button {
                            variant: ButtonVariant::Primary,
                            r#type: "submit",
                            disabled: !current.can_submit(),
                            if current.is_submitting() { "Saving..." } else { "Complete profile" }
                        }
                    } else {
                        Button {
                            variant: ButtonVariant::Primary,
                            onclick: move |_| {
                                if let Err(e) = form.write().next() {
                                    tracing::debug!("Step rejected: {e}");
                                }
                            },
                            "Next"
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn RoleChoice(
    role: UserRole,
    label: &'static str,
    selected: bool,
    on_pick: EventHandler<UserRole>,
) -> Element {
    let id = role.as_str();
    rsx! {
        label {
            class: if selected { "choice selected" } else { "choice" },
            r#for: "{id}",
            input {
                id: "{id}",
                r#type: "radio",
                name: "role",
                value: "{id}",
                checked: selected,
                onchange: move |_| on_pick.call(role),
            }
            " {label}"
        }
    }
}
