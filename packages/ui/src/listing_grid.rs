//! Browsable grid of service listings with a search and filter bar.
//!
//! Listings and categories are fetched once per mount; filtering happens in
//! memory through [`store::filter_listings`] on every keystroke.

use dioxus::prelude::*;
use store::filter::{category_name, locations};
use store::{filter_listings, BackendError, Category, DataBackend, Listing, ListingQuery, Selector};

use crate::auth::use_session;
use crate::components::{Button, ButtonVariant, Input};
use crate::icons::{FaClock, FaLocationDot, FaMagnifyingGlass};
use crate::listing_detail::ListingDetail;
use crate::notice::{notify, use_notices, NoticeLevel};
use crate::Icon;

const LISTINGS_CSS: Asset = asset!("/assets/styling/listings.css");

#[component]
pub fn ListingBrowser() -> Element {
    let session = use_session();
    let notices = use_notices();

    let mut catalog = use_resource(move || {
        let session = session.clone();
        let mut notices = notices;
        async move {
            let backend = session.backend();
            let loaded: Result<(Vec<Listing>, Vec<Category>), BackendError> = async {
                let listings = backend.fetch_listings().await?;
                let categories = backend.fetch_categories().await?;
                Ok((listings, categories))
            }
            .await;
            if let Err(e) = &loaded {
                tracing::error!("Failed to load services: {e}");
                notify(&mut notices, NoticeLevel::Error, "Could not load services", &e.to_string());
            }
            loaded
        }
    });

    let mut search = use_signal(String::new);
    let mut category = use_signal(Selector::default);
    let mut location = use_signal(Selector::default);
    let mut selected = use_signal(|| None::<Listing>);

    let (listings, categories) = match catalog() {
        None => {
            return rsx! {
                document::Stylesheet { href: LISTINGS_CSS }
                div { class: "listing-status", "Loading services..." }
            }
        }
        Some(Err(_)) => {
            return rsx! {
                document::Stylesheet { href: LISTINGS_CSS }
                div {
                    class: "listing-status error",
                    p { "Services could not be loaded." }
                    Button {
                        variant: ButtonVariant::Secondary,
                        onclick: move |_| catalog.restart(),
                        "Try again"
                    }
                }
            }
        }
        Some(Ok(loaded)) => loaded,
    };

    let query = ListingQuery::default()
        .search(search())
        .category(category())
        .location(location());
    let visible: Vec<Listing> = filter_listings(&listings, &categories, &query)
        .into_iter()
        .cloned()
        .collect();
    let all_locations = locations(&listings);

    rsx! {
        document::Stylesheet { href: LISTINGS_CSS }

        div {
            class: "filter-bar",
            div {
                class: "filter-search",
                Icon { icon: FaMagnifyingGlass, width: 14, height: 14 }
                Input {
                    id: "listing-search",
                    placeholder: "Search services...",
                    value: search(),
                    oninput: move |evt: FormEvent| search.set(evt.value()),
                }
            }
            select {
                class: "field-input",
                value: category().as_value().to_string(),
                onchange: move |evt| category.set(Selector::parse(&evt.value())),
                option { value: "all", "All categories" }
                for c in categories.iter() {
                    option { key: "{c.id}", value: "{c.name}", "{c.name}" }
                }
            }
            select {
                class: "field-input",
                value: location().as_value().to_string(),
                onchange: move |evt| location.set(Selector::parse(&evt.value())),
                option { value: "all", "All locations" }
                for loc in all_locations.iter() {
                    option { key: "{loc}", value: "{loc}", "{loc}" }
                }
            }
        }

        if visible.is_empty() {
            div { class: "listing-status", "No services match your filters." }
        } else {
            div {
                class: "listing-grid",
                for listing in visible {
                    ListingCard {
                        key: "{listing.id}",
                        category: category_name(&categories, &listing.category_id).to_string(),
                        listing: listing.clone(),
                        on_select: move |l: Listing| selected.set(Some(l)),
                    }
                }
            }
        }

        if let Some(listing) = selected() {
            ListingDetail {
                category: category_name(&categories, &listing.category_id).to_string(),
                listing: listing.clone(),
                on_close: move |_| selected.set(None),
            }
        }
    }
}

#[component]
fn ListingCard(listing: Listing, category: String, on_select: EventHandler<Listing>) -> Element {
    let clicked = listing.clone();
    rsx! {
        div {
            class: "listing-card",
            onclick: move |_| on_select.call(clicked.clone()),
            span { class: "listing-category", "{category}" }
            h3 { class: "listing-title", "{listing.title}" }
            p { class: "listing-description", "{listing.description}" }
            div {
                class: "listing-meta",
                span {
                    Icon { icon: FaLocationDot, width: 12, height: 12 }
                    " {listing.location}"
                }
                span {
                    Icon { icon: FaClock, width: 12, height: 12 }
                    " {listing.availability}"
                }
            }
        }
    }
}
