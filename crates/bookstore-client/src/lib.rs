#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]

//! Typed HTTP client for the bookstore REST API.
//!
//! Attaches the session's bearer credential to every authorized call and
//! classifies failures into [`bookstore_access::ApiError`]. The client also
//! serves as the identity source for page loads.

pub mod client;

pub use client::{ApiClient, ClientConfig, HEADER_REQUEST_ID, classify_response};
