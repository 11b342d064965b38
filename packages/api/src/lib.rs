//! # API crate: the LocalHelp client for its hosted backend
//!
//! LocalHelp keeps no server of its own. Accounts, sessions and every row
//! (profiles, service listings, categories) live in a Supabase project; this
//! crate talks to it over HTTP and plugs into the `store` crate's
//! [`AuthBackend`](store::AuthBackend) and [`DataBackend`](store::DataBackend)
//! traits.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`auth`] | GoTrue wire types, persisted sessions ([`StoredSession`], [`SessionStorage`]), [`now_unix`] |
//! | [`client`] | [`SupabaseClient`]: auth and row operations, session broadcast |
//! | [`config`] | [`BackendConfig`]: endpoint URL and anon key from file, environment or build |
//! | `error` | [`ApiError`] and its mapping onto [`store::BackendError`] |
//! | `rest` | PostgREST tables, filters and headers |
//!
//! The same code runs in the browser (wasm32, `localStorage`) and natively
//! (data directory file), selected with `cfg(target_arch = "wasm32")`.

pub mod auth;
pub mod client;
pub mod config;
mod error;
mod rest;

pub use auth::{now_unix, SessionStorage, StoredSession};
pub use client::SupabaseClient;
pub use config::{BackendConfig, ConfigError};
pub use error::ApiError;
