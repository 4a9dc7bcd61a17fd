pub mod client;
pub mod auth;
pub mod api;

pub use client::PlexClient;
pub use api::PlexHttpClient;
