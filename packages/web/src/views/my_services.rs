//! The signed-in user's own listings plus the wizard for posting a new one.

use dioxus::prelude::*;
use store::filter::category_name;
use store::form::ServiceStep;
use store::{BackendError, Category, DataBackend, Listing, ServiceSubmission, StepForm};
use ui::components::{Button, ButtonVariant, FieldError, Input, Label, Textarea};
use ui::{notify, use_notices, use_session, NoticeLevel};

use super::guard::Protected;
use super::wizard::StepHeader;

#[component]
pub fn MyServices() -> Element {
    rsx! {
        Protected {
            MyServicesPage {}
        }
    }
}

fn owned_by<'a>(listings: &'a [Listing], provider_id: &str) -> Vec<&'a Listing> {
    let mut own: Vec<&Listing> = listings
        .iter()
        .filter(|l| l.provider_id == provider_id)
        .collect();
    own.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    own
}

#[component]
fn MyServicesPage() -> Element {
    let session = use_session();
    let mut composing = use_signal(|| false);

    let mut catalog = use_resource({
        let session = session.clone();
        move || {
            let session = session.clone();
            async move {
                let backend = session.backend();
                let listings = backend.fetch_listings().await?;
                let categories = backend.fetch_categories().await?;
                Ok::<_, BackendError>((listings, categories))
            }
        }
    });

    let provider_id = session.principal().map(|p| p.id).unwrap_or_default();

    let (listings, categories) = match catalog() {
        None => {
            return rsx! {
                div { class: "page-loading", "Loading your services..." }
            }
        }
        Some(Err(e)) => {
            tracing::error!("Failed to load services: {e}");
            return rsx! {
                div {
                    class: "listing-status error",
                    p { "Your services could not be loaded." }
                    Button {
                        variant: ButtonVariant::Secondary,
                        onclick: move |_| catalog.restart(),
                        "Try again"
                    }
                }
            };
        }
        Some(Ok(loaded)) => loaded,
    };

    let own = owned_by(&listings, &provider_id);

    rsx! {
        div {
            class: "page-header",
            h1 { "My services" }
            if !composing() {
                Button {
                    variant: ButtonVariant::Primary,
                    onclick: move |_| composing.set(true),
                    "Offer a new service"
                }
            }
        }

        if composing() {
            ServiceWizard {
                categories: categories.clone(),
                on_created: move |_| {
                    composing.set(false);
                    catalog.restart();
                },
                on_cancel: move |_| composing.set(false),
            }
        }

        if own.is_empty() {
            p { class: "muted", "You haven't posted any services yet." }
        } else {
            ul {
                class: "my-listings",
                for listing in own {
                    li {
                        key: "{listing.id}",
                        class: "my-listing",
                        div {
                            h3 { "{listing.title}" }
                            span { class: "muted", {category_name(&categories, &listing.category_id)} }
                        }
                        span {
                            class: if listing.is_active() { "status active" } else { "status inactive" },
                            if listing.is_active() { "Active" } else { "Inactive" }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn ServiceWizard(
    categories: Vec<Category>,
    on_created: EventHandler<Listing>,
    on_cancel: EventHandler<()>,
) -> Element {
    let session = use_session();
    let mut notices = use_notices();
    let mut form = use_signal(StepForm::<ServiceSubmission>::default);

    let handle_submit = move |evt: FormEvent| {
        evt.prevent_default();
        if !form.read().is_last() {
            if let Err(e) = form.write().next() {
                tracing::debug!("Step rejected: {e}");
            }
            return;
        }
        let session = session.clone();
        spawn(async move {
            let Some(principal) = session.principal() else {
                notify(&mut notices, NoticeLevel::Error, "Please sign in again", "");
                return;
            };
            let prepared = form
                .write()
                .begin_submit()
                .map(|data| data.to_new_listing(&principal.id));
            let listing = match prepared {
                Ok(listing) => listing,
                Err(e) => {
                    tracing::debug!("Service form not submitted: {e}");
                    return;
                }
            };

            let result = session.backend().create_listing(&listing).await;
            form.write().finish_submit();
            match result {
                Ok(created) => {
                    tracing::info!("Created listing {}", created.id);
                    notify(
                        &mut notices,
                        NoticeLevel::Success,
                        "Service posted",
                        "Your service is now visible to others.",
                    );
                    form.set(StepForm::default());
                    on_created.call(created);
                }
                Err(e) => {
                    tracing::error!("Failed to create listing: {e}");
                    notify(
                        &mut notices,
                        NoticeLevel::Error,
                        "Could not post your service",
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
        ServiceStep::Details => "Describe your service",
        ServiceStep::Review => "Review and post",
    };

    rsx! {
        div {
            class: "wizard-card",
            StepHeader {
                step: current.step_number(),
                count: current.step_count(),
                title: title.to_string(),
            }

            form {
                onsubmit: handle_submit,
                class: "form-stack",

                {match current.step() {
                    ServiceStep::Details => rsx! {
                        div {
                            class: "field",
                            Label { html_for: "title", "Title" }
                            Input {
                                id: "title",
                                placeholder: "e.g. Math tutoring for high schoolers",
                                value: data.title.clone(),
                                oninput: move |evt: FormEvent| form.write().data_mut().title = evt.value(),
                            }
                            FieldError { message: errors.get("title").copied() }
                        }
                        div {
                            class: "field",
                            Label { html_for: "description", "Description" }
                            Textarea {
                                id: "description",
                                placeholder: "What do you offer?",
                                value: data.description.clone(),
                                oninput: move |evt: FormEvent| form.write().data_mut().description = evt.value(),
                            }
                            FieldError { message: errors.get("description").copied() }
                        }
                        div {
                            class: "field",
                            Label { html_for: "category", "Category" }
                            select {
                                id: "category",
                                class: "field-input",
                                value: "{data.category_id}",
                                onchange: move |evt: FormEvent| form.write().data_mut().category_id = evt.value(),
                                option { value: "", "Select a category" }
                                for category in categories.iter() {
                                    option {
                                        key: "{category.id}",
                                        value: "{category.id}",
                                        selected: category.id == data.category_id,
                                        "{category.name}"
                                    }
                                }
                            }
                            FieldError { message: errors.get("category").copied() }
                        }
                        div {
                            class: "field",
                            Label { html_for: "location", "Location" }
                            Input {
                                id: "location",
                                placeholder: "Where do you offer it?",
                                value: data.location.clone(),
                                oninput: move |evt: FormEvent| form.write().data_mut().location = evt.value(),
                            }
                            FieldError { message: errors.get("location").copied() }
                        }
                        div {
                            class: "field",
                            Label { html_for: "availability", "Availability" }
                            Input {
                                id: "availability",
                                placeholder: "e.g. Weekday evenings",
                                value: data.availability.clone(),
                                oninput: move |evt: FormEvent| form.write().data_mut().availability = evt.value(),
                            }
                            FieldError { message: errors.get("availability").copied() }
                        }
                    },
                    ServiceStep::Review => rsx! {
                        dl {
                            class: "profile-facts",
                            dt { "Title" }
                            dd { "{data.title}" }
                            dt { "Category" }
                            dd { {category_name(&categories, &data.category_id)} }
                            dt { "Location" }
                            dd { "{data.location}" }
                            dt { "Availability" }
                            dd { "{data.availability}" }
                        }
                        p {
                            class: "muted",
                            "People interested in your service will see the contact details from your profile."
                        }
                        div {
                            class: "field",
                            label {
                                class: "choice",
                                r#for: "terms",
                                input {
                                    id: "terms",
                                    r#type: "checkbox",
                                    checked: data.terms_accepted,
                                    onchange: move |evt: FormEvent| {
                                        form.write().data_mut().terms_accepted = evt.checked();
                                    },
                                }
                                " I agree to the terms of service"
                            }
                            FieldError { message: errors.get("terms").copied() }
                        }
                    },
                }}

                div {
                    class: "form-actions",
                    if current.is_first() {
                        Button {
                            variant: ButtonVariant::Ghost,
                            onclick: move |_| on_cancel.call(()),
                            "Cancel"
                        }
                    } else {
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
                            if current.is_submitting() { "Posting..." } else { "Post service" }
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

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use store::ListingStatus;

    fn listing(id: &str, provider: &str, day: u32) -> Listing {
        Listing {
            id: id.to_string(),
            title: format!("Listing {id}"),
            description: String::new(),
            category_id: "c1".to_string(),
            location: String::new(),
            availability: String::new(),
            provider_id: provider.to_string(),
            status: ListingStatus::Active,
            created_at: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
            images: Vec::new(),
        }
    }

    #[test]
    fn test_owned_by_filters_and_sorts_newest_first() {
        let all = vec![
            listing("a", "me", 1),
            listing("b", "someone-else", 2),
            listing("c", "me", 3),
        ];
        let own: Vec<&str> = owned_by(&all, "me").iter().map(|l| l.id.as_str()).collect();
        assert_eq!(own, vec!["c", "a"]);
        assert!(owned_by(&all, "nobody").is_empty());
    }
}
