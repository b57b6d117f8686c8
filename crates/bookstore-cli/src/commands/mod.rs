//! Page handlers grouped by resource.

pub(crate) mod auth;
pub(crate) mod books;
pub(crate) mod orders;
pub(crate) mod users;
