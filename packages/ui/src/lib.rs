//! This crate contains all shared UI for the workspace.

pub mod components;

// Re-export icon library
pub use dioxus_free_icons::Icon;
pub mod icons {
    pub use dioxus_free_icons::icons::fa_solid_icons::*;
}

mod timer;

mod navbar;
pub use navbar::Navbar;

mod auth;
pub use auth::{use_auth, use_session, AppSession, AuthProvider, SignOutButton};

pub mod notice;
pub use notice::{notify, use_notices, NoticeLevel, Notices};

mod notice_panel;
pub use notice_panel::{NoticePanel, NoticeProvider};

mod listing_detail;
pub use listing_detail::ListingDetail;

mod listing_grid;
pub use listing_grid::ListingBrowser;
