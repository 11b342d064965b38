use dioxus::prelude::*;
use store::Listing;

use crate::components::{Button, ButtonVariant};
use crate::icons::{FaCalendar, FaClock, FaLocationDot, FaXmark};
use crate::Icon;

/// Full view of one listing, shown over the grid.
#[component]
pub fn ListingDetail(listing: Listing, category: String, on_close: EventHandler<()>) -> Element {
    let posted = listing.created_at.format("%B %-d, %Y").to_string();

    rsx! {
        div {
            class: "listing-detail-backdrop",
            onclick: move |_| on_close.call(()),
            div {
                class: "listing-detail",
                onclick: move |evt| evt.stop_propagation(),
                div {
                    class: "listing-detail-header",
                    span { class: "listing-category", "{category}" }
                    button {
                        class: "listing-detail-close",
                        title: "Close",
                        onclick: move |_| on_close.call(()),
                        Icon { icon: FaXmark, width: 14, height: 14 }
                    }
                }
                h2 { "{listing.title}" }
                p { class: "listing-detail-description", "{listing.description}" }
                ul {
                    class: "listing-detail-facts",
                    li {
                        Icon { icon: FaLocationDot, width: 12, height: 12 }
                        " {listing.location}"
                    }
                    li {
                        Icon { icon: FaClock, width: 12, height: 12 }
                        " {listing.availability}"
                    }
                    li {
                        Icon { icon: FaCalendar, width: 12, height: 12 }
                        " Posted {posted}"
                    }
                }
                if !listing.images.is_empty() {
                    div {
                        class: "listing-detail-images",
                        for src in listing.images.iter() {
                            img { key: "{src}", src: "{src}", alt: "{listing.title}" }
                        }
                    }
                }
                Button {
                    variant: ButtonVariant::Secondary,
                    onclick: move |_| on_close.call(()),
                    "Close"
                }
            }
        }
    }
}
