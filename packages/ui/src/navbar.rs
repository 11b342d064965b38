use dioxus::prelude::*;

use crate::icons::FaHandshake;
use crate::Icon;

const NAVBAR_CSS: Asset = asset!("/assets/styling/navbar.css");

/// Top bar with the brand on the left; `children` are the links on the right.
#[component]
pub fn Navbar(brand: Element, children: Element) -> Element {
    rsx! {
        document::Stylesheet { href: NAVBAR_CSS }
        nav {
            class: "navbar",
            div {
                class: "navbar-brand",
                Icon { icon: FaHandshake, width: 20, height: 20 }
                {brand}
            }
            div {
                class: "navbar-links",
                {children}
            }
        }
    }
}
