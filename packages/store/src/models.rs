//! # Domain models for principals, profiles, listings and categories
//!
//! These types mirror the rows the backend hands out and are
//! `Serialize + Deserialize` so the `api` crate can decode them straight from
//! PostgREST/GoTrue responses. The client only ever holds short-lived copies;
//! the backend owns every record.
//!
//! ## Types
//!
//! | Type | Represents |
//! |------|-----------|
//! | [`Principal`] | The authenticated identity: id, email and the opaque [`AccessToken`]. |
//! | [`Profile`] | A `user_profiles` row keyed by the principal id. Complete iff phone and location are set. |
//! | [`ProfileUpdate`] | Partial profile update; `None` fields are not sent. |
//! | [`UserRole`] | `hire` (seeking help) or `offer` (offering a service). |
//! | [`Listing`] | A `services` row. Only [`ListingStatus::Active`] rows are browsable. |
//! | [`NewListing`] | Insert payload produced by the service submission form. |
//! | [`Category`] | A `categories` row used to label and filter listings. |

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Opaque session token issued by the auth service.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// The authenticated identity associated with a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    pub email: String,
    pub token: AccessToken,
}

impl Principal {
    pub fn new(id: impl Into<String>, email: impl Into<String>, token: AccessToken) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            token,
        }
    }
}

/// What the user wants to do on the platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Looking to hire someone.
    #[default]
    Hire,
    /// Wants to offer a service.
    Offer,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Hire => "hire",
            UserRole::Offer => "offer",
        }
    }
}

/// Supplementary data a user provides beyond the principal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default, rename = "phone_number")]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub user_type: Option<UserRole>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl Profile {
    /// A profile is complete once both phone and location hold something
    /// other than whitespace.
    pub fn is_complete(&self) -> bool {
        filled(&self.phone) && filled(&self.location)
    }

    /// Display name, falling back to the given email.
    pub fn display_name<'a>(&'a self, email: &'a str) -> &'a str {
        match self.full_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => email,
        }
    }
}

fn filled(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|v| !v.trim().is_empty())
}

/// Partial profile update keyed by the principal id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(rename = "phone_number", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_type: Option<UserRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the set fields onto an existing profile.
    pub fn apply_to(&self, profile: &mut Profile) {
        if let Some(v) = &self.full_name {
            profile.full_name = Some(v.clone());
        }
        if let Some(v) = &self.phone {
            profile.phone = Some(v.clone());
        }
        if let Some(v) = &self.location {
            profile.location = Some(v.clone());
        }
        if let Some(v) = self.user_type {
            profile.user_type = Some(v);
        }
        if let Some(v) = &self.bio {
            profile.bio = Some(v.clone());
        }
        if let Some(v) = &self.avatar_url {
            profile.avatar_url = Some(v.clone());
        }
    }
}

/// Visibility of a listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    #[default]
    Active,
    Inactive,
}

/// A posted service offering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    pub category_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub availability: String,
    pub provider_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: ListingStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,
}

impl Listing {
    pub fn is_active(&self) -> bool {
        self.status == ListingStatus::Active
    }
}

/// PostgREST sends every selected column, with `null` for unset ones.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Insert payload for a new listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewListing {
    pub title: String,
    pub description: String,
    pub category_id: String,
    pub location: String,
    pub availability: String,
    pub provider_id: String,
    pub status: ListingStatus,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Label used to group and filter listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}
