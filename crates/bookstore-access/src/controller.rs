//! One-shot resolve-then-render controller for a single page load.

use std::future::Future;

use futures_util::future::join;

use crate::guard::{Denial, guard};
use crate::identity::{Identity, IdentitySource, resolve_identity};
use crate::session::Session;
use crate::visibility::{CapabilitySet, ResourceContext, compute_visibility};

/// Identity and capabilities computed for a page, plus whatever it loaded.
#[derive(Clone, Debug, PartialEq)]
pub struct PageView<T> {
    /// Resolved identity.
    pub identity: Identity,
    /// Affordances to render.
    pub capabilities: CapabilitySet,
    /// Page payload, usually a `Result` the page turns into content or a placeholder.
    pub resource: T,
}

/// Combines the page-load session with an identity source.
pub struct ViewController<'a, S: ?Sized> {
    session: Session,
    source: &'a S,
}

impl<'a, S> ViewController<'a, S>
where
    S: IdentitySource + ?Sized,
{
    /// Controller for one page load.
    #[must_use]
    pub const fn new(session: Session, source: &'a S) -> Self {
        Self { session, source }
    }

    /// Session the page was opened with.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Resolve who is looking at the page.
    pub async fn identity(&self) -> Identity {
        resolve_identity(&self.session, self.source).await
    }

    /// Resolve identity and check the page guard before anything is rendered.
    ///
    /// # Errors
    ///
    /// Returns a [`Denial`] when the identity may not open `context`.
    pub async fn enter(&self, context: ResourceContext) -> Result<PageView<()>, Denial> {
        let identity = self.identity().await;
        Self::finish(identity, context, ())
    }

    /// Resolve identity while `fetch` runs, then compute visibility once both finish.
    ///
    /// # Errors
    ///
    /// Returns a [`Denial`] when the identity may not open `context`; the
    /// fetched payload is discarded in that case.
    pub async fn load<F, T>(&self, context: ResourceContext, fetch: F) -> Result<PageView<T>, Denial>
    where
        F: Future<Output = T>,
    {
        let (identity, resource) = join(self.identity(), fetch).await;
        Self::finish(identity, context, resource)
    }

    fn finish<T>(
        identity: Identity,
        context: ResourceContext,
        resource: T,
    ) -> Result<PageView<T>, Denial> {
        if let Err(denial) = guard(&identity, context) {
            tracing::info!(?context, redirect = %denial.redirect, "page denied");
            return Err(denial);
        }
        let capabilities = compute_visibility(&identity, context);
        Ok(PageView {
            identity,
            capabilities,
            resource,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::guard::DenialReason;
    use crate::identity::tests::StubSource;
    use crate::routes::Route;
    use crate::visibility::Capability;
    use bookstore_api_models::Role;
    use bookstore_test_support::{book, profile};
    use std::sync::atomic::{AtomicBool, Ordering};

    fn signed_in() -> Session {
        Session::from_stored(Some("token".into()))
    }

    #[tokio::test]
    async fn anonymous_book_list_has_no_add_button() {
        let source = StubSource::new(Ok(profile(Role::Admin)));
        let controller = ViewController::new(Session::anonymous(), &source);
        let page = controller
            .load(ResourceContext::BookList, async { vec![book(1), book(2)] })
            .await
            .expect("catalog is public");
        assert_eq!(page.identity, Identity::Anonymous);
        assert!(!page.capabilities.contains(Capability::AddBook));
        assert_eq!(page.resource.len(), 2);
        assert_eq!(source.calls(), 0);

        let nav = controller
            .enter(ResourceContext::GlobalNav)
            .await
            .expect("nav is public");
        assert!(nav.capabilities.contains(Capability::LoginLink));
    }

    #[tokio::test]
    async fn user_book_detail_offers_place_order() {
        let source = StubSource::new(Ok(profile(Role::User)));
        let controller = ViewController::new(signed_in(), &source);
        let page = controller
            .load(ResourceContext::BookDetail, async {
                Ok::<_, ApiError>(book(5))
            })
            .await
            .expect("book detail is public");
        assert!(page.capabilities.contains(Capability::PlaceOrder));
        assert!(!page.capabilities.contains(Capability::EditBook));
        assert_eq!(page.resource.map(|b| b.id), Ok(5));
    }

    #[tokio::test]
    async fn user_is_denied_book_editor_before_form() {
        let source = StubSource::new(Ok(profile(Role::User)));
        let controller = ViewController::new(signed_in(), &source);
        let denial = controller
            .enter(ResourceContext::BookEditor)
            .await
            .expect_err("users cannot open the editor");
        assert_eq!(denial.reason, DenialReason::AccessDenied);
        assert_eq!(denial.redirect, Route::Home);
    }

    #[tokio::test]
    async fn rejected_credential_renders_anonymous_page() {
        let source = StubSource::new(Err(ApiError::from_status(401, None)));
        let controller = ViewController::new(signed_in(), &source);
        let page = controller
            .enter(ResourceContext::GlobalNav)
            .await
            .expect("nav is public");
        assert_eq!(page.identity, Identity::Anonymous);
        assert!(page.capabilities.contains(Capability::LoginLink));
    }

    #[tokio::test]
    async fn load_runs_fetch_even_when_page_is_denied() {
        let source = StubSource::new(Ok(profile(Role::Moderator)));
        let controller = ViewController::new(signed_in(), &source);
        let fetched = AtomicBool::new(false);
        let denial = controller
            .load(ResourceContext::UserList, async {
                fetched.store(true, Ordering::SeqCst);
            })
            .await
            .expect_err("moderators cannot manage users");
        assert!(fetched.load(Ordering::SeqCst));
        assert_eq!(denial.reason, DenialReason::AccessDenied);
    }

    #[tokio::test]
    async fn order_list_shows_owner_for_privileged_roles_only() {
        for (role, shows_owner) in [
            (Role::Admin, true),
            (Role::Moderator, true),
            (Role::User, false),
        ] {
            let source = StubSource::new(Ok(profile(role)));
            let controller = ViewController::new(signed_in(), &source);
            let page = controller
                .enter(ResourceContext::OrderList)
                .await
                .expect("signed-in users see orders");
            assert_eq!(
                page.capabilities.contains(Capability::OrderOwner),
                shows_owner,
                "{role:?}"
            );
        }
    }
}
