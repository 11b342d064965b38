//! # Listing filter: search, category and location over an in-memory list
//!
//! [`filter_listings`] keeps the listings that satisfy every predicate:
//!
//! - **status**: only [`ListingStatus::Active`](crate::models::ListingStatus::Active)
//!   rows, even though the backend's row-level policy already hides the rest;
//! - **search**: case-insensitive substring of the title or the description
//!   (an empty search matches everything);
//! - **category**: [`Selector::All`] or a category name or id;
//! - **location**: [`Selector::All`] or an exact match.
//!
//! The output preserves input order.

use crate::models::{Category, Listing};

/// Label used when a listing points at an unknown category.
pub const UNKNOWN_CATEGORY: &str = "Unknown Category";

/// A dropdown choice: everything, or one specific value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selector {
    #[default]
    All,
    Only(String),
}

impl Selector {
    /// Parse a dropdown value; `"all"` and the empty string select everything.
    pub fn parse(value: &str) -> Self {
        match value {
            "" | "all" => Selector::All,
            other => Selector::Only(other.to_string()),
        }
    }

    pub fn as_value(&self) -> &str {
        match self {
            Selector::All => "all",
            Selector::Only(v) => v,
        }
    }
}

/// What the user typed and picked above the listing grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingQuery {
    pub search: String,
    pub category: Selector,
    pub location: Selector,
}

impl ListingQuery {
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn category(mut self, category: Selector) -> Self {
        self.category = category;
        self
    }

    pub fn location(mut self, location: Selector) -> Self {
        self.location = location;
        self
    }
}

/// Keep the active listings matching `query`, in input order.
pub fn filter_listings<'a>(
    listings: &'a [Listing],
    categories: &[Category],
    query: &ListingQuery,
) -> Vec<&'a Listing> {
    let needle = query.search.to_lowercase();
    let category_id = match &query.category {
        Selector::All => None,
        Selector::Only(selected) => Some(
            categories
                .iter()
                .find(|c| &c.name == selected)
                .map(|c| c.id.as_str())
                .unwrap_or(selected.as_str()),
        ),
    };

    listings
        .iter()
        .filter(|l| l.is_active())
        .filter(|l| {
            l.title.to_lowercase().contains(&needle)
                || l.description.to_lowercase().contains(&needle)
        })
        .filter(|l| category_id.is_none_or(|id| l.category_id == id))
        .filter(|l| match &query.location {
            Selector::All => true,
            Selector::Only(location) => &l.location == location,
        })
        .collect()
}

/// Distinct listing locations in first-seen order.
pub fn locations(listings: &[Listing]) -> Vec<String> {
    let mut seen = Vec::<String>::new();
    for listing in listings {
        if !listing.location.is_empty() && !seen.contains(&listing.location) {
            seen.push(listing.location.clone());
        }
    }
    seen
}

/// Display name of the category with `id`.
pub fn category_name<'a>(categories: &'a [Category], id: &str) -> &'a str {
    categories
        .iter()
        .find(|c| c.id == id)
        .map(|c| c.name.as_str())
        .unwrap_or(UNKNOWN_CATEGORY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ListingStatus;
    use chrono::{DateTime, Utc};

    fn listing(id: &str, title: &str, description: &str, category: &str, location: &str) -> Listing {
        Listing {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            category_id: category.to_string(),
            location: location.to_string(),
            availability: "Weekends".to_string(),
            provider_id: "provider-1".to_string(),
            status: ListingStatus::Active,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            images: Vec::new(),
        }
    }

    fn categories() -> Vec<Category> {
        vec![
            Category {
                id: "cat-tutoring".to_string(),
                name: "Tutoring".to_string(),
                icon: None,
                description: None,
            },
            Category {
                id: "cat-cleaning".to_string(),
                name: "Cleaning".to_string(),
                icon: None,
                description: None,
            },
        ]
    }

    fn fixture() -> Vec<Listing> {
        let mut hidden = listing("4", "Math homework help", "", "cat-tutoring", "Springfield");
        hidden.status = ListingStatus::Inactive;
        vec![
            listing("1", "MATH tutoring", "Algebra for teens", "cat-tutoring", "Springfield"),
            listing("2", "House cleaning", "Weekly deep clean", "cat-cleaning", "Shelbyville"),
            hidden,
            listing("3", "Piano lessons", "Music theory and math of rhythm", "cat-tutoring", "Shelbyville"),
            listing("5", "Window washing", "", "cat-cleaning", "Springfield"),
        ]
    }

    fn ids(found: &[&Listing]) -> Vec<String> {
        found.iter().map(|l| l.id.clone()).collect()
    }

    #[test]
    fn test_empty_query_returns_active_subset_in_order() {
        let listings = fixture();
        let found = filter_listings(&listings, &categories(), &ListingQuery::default());
        assert_eq!(ids(&found), vec!["1", "2", "3", "5"]);
    }

    #[test]
    fn test_search_is_case_insensitive_on_title_and_description() {
        let listings = fixture();
        let query = ListingQuery::default().search("math");
        let found = filter_listings(&listings, &categories(), &query);
        assert_eq!(ids(&found), vec!["1", "3"]);
        for l in found {
            let hay = format!("{} {}", l.title, l.description).to_lowercase();
            assert!(hay.contains("math"));
        }
    }

    #[test]
    fn test_category_by_name_or_id() {
        let listings = fixture();
        let by_name = ListingQuery::default().category(Selector::parse("Cleaning"));
        assert_eq!(ids(&filter_listings(&listings, &categories(), &by_name)), vec!["2", "5"]);

        let by_id = ListingQuery::default().category(Selector::parse("cat-cleaning"));
        assert_eq!(ids(&filter_listings(&listings, &categories(), &by_id)), vec!["2", "5"]);

        let unknown = ListingQuery::default().category(Selector::parse("Gardening"));
        assert!(filter_listings(&listings, &categories(), &unknown).is_empty());
    }

    #[test]
    fn test_predicates_are_conjunctive() {
        let listings = fixture();
        let query = ListingQuery::default()
            .search("math")
            .category(Selector::parse("Tutoring"))
            .location(Selector::parse("Shelbyville"));
        assert_eq!(ids(&filter_listings(&listings, &categories(), &query)), vec!["3"]);
    }

    #[test]
    fn test_location_is_exact() {
        let listings = fixture();
        let query = ListingQuery::default().location(Selector::parse("springfield"));
        assert!(filter_listings(&listings, &categories(), &query).is_empty());
    }

    #[test]
    fn test_selector_parse() {
        assert_eq!(Selector::parse("all"), Selector::All);
        assert_eq!(Selector::parse(""), Selector::All);
        assert_eq!(Selector::parse("Tutoring").as_value(), "Tutoring");
    }

    #[test]
    fn test_locations_distinct_first_seen() {
        assert_eq!(locations(&fixture()), vec!["Springfield", "Shelbyville"]);
    }

    #[test]
    fn test_category_name_fallback() {
        let cats = categories();
        assert_eq!(category_name(&cats, "cat-cleaning"), "Cleaning");
        assert_eq!(category_name(&cats, "missing"), UNKNOWN_CATEGORY);
    }
}
