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
#![allow(clippy::redundant_pub_crate)]

//! Command-line client for the bookstore service.
//!
//! Each subcommand plays the part of one page: it resolves who is signed in,
//! decides which affordances to show, then renders or submits.
//!
//! Layout:
//! - `cli.rs`: argument parsing and command dispatch
//! - `commands/`: page handlers grouped by resource
//! - `client.rs`: shared context, errors, and argument parsers
//! - `output.rs`: renderers and formatting helpers
//! - `main.rs`: thin entrypoint delegating to `run()`

pub(crate) mod cli;
pub(crate) mod client;
pub(crate) mod commands;
pub(crate) mod output;

pub use cli::run;
