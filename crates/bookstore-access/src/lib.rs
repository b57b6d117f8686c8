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

//! Role-gated view control for bookstore clients.
//!
//! Every page load resolves who the caller is, then derives which affordances
//! to render from that identity and the kind of page being shown.
//!
//! # Design
//! - The stored credential only says whether to ask the backend; the profile
//!   returned by `/api/users/me/` is the sole source of a role.
//! - Identity is recomputed on every page load and never cached.
//! - Any resolution failure degrades to [`Identity::Anonymous`].
//! - Hiding an affordance is cosmetic; the backend still authorizes every call.
//!
//! Layout:
//! - `session.rs` / `storage.rs`: credential handling and persistence
//! - `identity.rs`: identity resolution
//! - `visibility.rs`: capability table per role and page kind
//! - `guard.rs` / `routes.rs`: page guards and post-mutation redirects
//! - `controller.rs`: per-page orchestration
//! - `error.rs`: backend failure taxonomy

pub mod controller;
pub mod error;
pub mod guard;
pub mod identity;
pub mod routes;
pub mod session;
pub mod storage;
pub mod visibility;

pub use controller::{PageView, ViewController};
pub use error::{ApiError, GENERIC_FAILURE};
pub use guard::{Denial, DenialReason, guard};
pub use identity::{Identity, IdentitySource, resolve_identity};
pub use routes::{Mutation, Route, redirect_after};
pub use session::{Credential, Session};
pub use storage::{
    CREDENTIAL_KEY, CredentialStore, FileCredentialStore, MemoryCredentialStore, StoreError,
};
pub use visibility::{
    Capability, CapabilitySet, ResourceContext, compute_visibility, manages_books, manages_users,
};
