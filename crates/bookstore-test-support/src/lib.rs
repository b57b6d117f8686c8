#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Shared test helpers used across bookstore test suites.
//! Layout: fixtures.rs (canned profiles, books and orders plus their JSON forms).

pub mod fixtures;

pub use fixtures::{book, book_json, order_info, order_json, profile, profile_json};
