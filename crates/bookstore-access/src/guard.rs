//! Page guards evaluated before anything privileged is rendered.

use std::fmt::{self, Display, Formatter};

use crate::identity::Identity;
use crate::routes::Route;
use crate::visibility::{Capability, ResourceContext, compute_visibility};

/// Why a page was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DenialReason {
    /// The page needs a signed-in user.
    LoginRequired,
    /// The signed-in role may not open the page.
    AccessDenied,
}

/// Refusal to render a page, with the destination to send the user to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Denial {
    /// Why the page was refused.
    pub reason: DenialReason,
    /// Where to go instead.
    pub redirect: Route,
}

impl Denial {
    /// The page needs a signed-in user; go to the login form.
    #[must_use]
    pub const fn login_required() -> Self {
        Self {
            reason: DenialReason::LoginRequired,
            redirect: Route::Login,
        }
    }

    /// The role may not open the page; go home.
    #[must_use]
    pub const fn access_denied() -> Self {
        Self {
            reason: DenialReason::AccessDenied,
            redirect: Route::Home,
        }
    }

    /// Message to show alongside the redirect.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self.reason {
            DenialReason::LoginRequired => "Please log in to view this page.",
            DenialReason::AccessDenied => "Access denied.",
        }
    }
}

impl Display for Denial {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{} Redirecting to {}", self.message(), self.redirect)
    }
}

/// Decide whether `identity` may open a page of kind `context`.
///
/// # Errors
///
/// Returns a [`Denial`] for pages the identity may not open. Privileged forms
/// are refused outright rather than rendered without controls.
pub fn guard(identity: &Identity, context: ResourceContext) -> Result<(), Denial> {
    let required = match context {
        ResourceContext::BookEditor => Capability::BookEditor,
        ResourceContext::UserList | ResourceContext::UserDetail | ResourceContext::UserEditor => {
            Capability::ManageUsers
        }
        ResourceContext::OrderList
        | ResourceContext::OrderDetail
        | ResourceContext::OrderMutation => {
            return if identity.is_identified() {
                Ok(())
            } else {
                Err(Denial::login_required())
            };
        }
        ResourceContext::GlobalNav | ResourceContext::BookList | ResourceContext::BookDetail => {
            return Ok(());
        }
    };

    if compute_visibility(identity, context).contains(required) {
        Ok(())
    } else {
        Err(Denial::access_denied())
    }
}
