//! Twitter/X implementation of the [`SocialApi`](crate::api::SocialApi) seam.
//!
//! `client` wraps the signed HTTP calls and pagination parameters, `types` holds the
//! v1.1 wire models and their [`RawPost`](crate::api::RawPost) /
//! [`RawProfile`](crate::api::RawProfile) views.
pub mod client;
pub mod types;

pub use client::TwitterApi;
