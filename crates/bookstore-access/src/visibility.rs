//! Capability tables: which affordances a given identity gets on a given page.
//!
//! # Design
//! - Role checks are set-membership predicates, never equality chains.
//! - Book management is shared by moderators and admins; user management is admin-only.
//! - The result is a pure function of `(identity, context)`.

use std::collections::BTreeSet;

use bookstore_api_models::Role;
use serde::Serialize;

use crate::identity::Identity;

/// Kind of page being rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceContext {
    /// Navigation bar present on every page.
    GlobalNav,
    /// Catalog listing.
    BookList,
    /// Single book page.
    BookDetail,
    /// Add/edit book form.
    BookEditor,
    /// Order listing.
    OrderList,
    /// Single order page.
    OrderDetail,
    /// Editing or deleting an order.
    OrderMutation,
    /// Account listing.
    UserList,
    /// Single account page.
    UserDetail,
    /// Account edit form.
    UserEditor,
}

impl ResourceContext {
    /// Every context, for exhaustive iteration.
    #[must_use]
    pub const fn all() -> [Self; 10] {
        [
            Self::GlobalNav,
            Self::BookList,
            Self::BookDetail,
            Self::BookEditor,
            Self::OrderList,
            Self::OrderDetail,
            Self::OrderMutation,
            Self::UserList,
            Self::UserDetail,
            Self::UserEditor,
        ]
    }
}

/// A single UI affordance or permitted action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// "login" navigation link.
    LoginLink,
    /// "logout" navigation link.
    LogoutLink,
    /// "users" administration link.
    UsersLink,
    /// "add book" button on the catalog.
    AddBook,
    /// "place order" button on a book page.
    PlaceOrder,
    /// "edit" button on a book page.
    EditBook,
    /// "delete" button on a book page.
    DeleteBook,
    /// Access to the add/edit book form.
    BookEditor,
    /// Order listings are limited to the caller's own orders.
    OwnOrders,
    /// Order listings include every order.
    AllOrders,
    /// The order owner ("user") field is shown.
    OrderOwner,
    /// Own orders may be edited or deleted; ownership is checked by the backend.
    MutateOwnOrders,
    /// Any order may be edited or deleted.
    MutateAnyOrder,
    /// Access to account listing, detail and edit pages.
    ManageUsers,
}

impl Capability {
    /// Capabilities that confer privilege beyond anonymous browsing.
    #[must_use]
    pub const fn is_privileged(self) -> bool {
        !matches!(self, Self::LoginLink | Self::OwnOrders)
    }

    /// Short label used when listing affordances.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::LoginLink => "login",
            Self::LogoutLink => "logout",
            Self::UsersLink => "users",
            Self::AddBook => "add book",
            Self::PlaceOrder => "place order",
            Self::EditBook => "edit",
            Self::DeleteBook => "delete",
            Self::BookEditor => "book editor",
            Self::OwnOrders => "own orders",
            Self::AllOrders => "all orders",
            Self::OrderOwner => "order owner",
            Self::MutateOwnOrders => "edit/delete own orders",
            Self::MutateAnyOrder => "edit/delete any order",
            Self::ManageUsers => "manage users",
        }
    }
}

/// Ordered set of capabilities granted for one page.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CapabilitySet(BTreeSet<Capability>);

impl CapabilitySet {
    /// Empty set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(BTreeSet::new())
    }

    /// Whether `capability` is granted.
    #[must_use]
    pub fn contains(&self, capability: Capability) -> bool {
        self.0.contains(&capability)
    }

    /// Whether nothing is granted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of granted capabilities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Granted capabilities in a stable order.
    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.0.iter().copied()
    }

    /// Union with another set.
    #[must_use]
    pub fn union(mut self, other: Self) -> Self {
        self.0.extend(other.0);
        self
    }
}

impl<const N: usize> From<[Capability; N]> for CapabilitySet {
    fn from(items: [Capability; N]) -> Self {
        Self(items.into_iter().collect())
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Roles allowed to manage the catalog and see every order.
#[must_use]
pub const fn manages_books(role: Role) -> bool {
    matches!(role, Role::Admin | Role::Moderator)
}

/// Roles allowed to manage accounts.
#[must_use]
pub const fn manages_users(role: Role) -> bool {
    matches!(role, Role::Admin)
}

/// Compute the capabilities `identity` is granted in `context`.
#[must_use]
pub fn compute_visibility(identity: &Identity, context: ResourceContext) -> CapabilitySet {
    use Capability as C;

    let role = identity.role();
    match context {
        ResourceContext::GlobalNav => match role {
            None => [C::LoginLink].into(),
            Some(role) if manages_users(role) => [C::LogoutLink, C::UsersLink].into(),
            Some(_) => [C::LogoutLink].into(),
        },
        ResourceContext::BookList => match role {
            Some(role) if manages_books(role) => [C::AddBook].into(),
            _ => CapabilitySet::empty(),
        },
        ResourceContext::BookDetail => match role {
            None => CapabilitySet::empty(),
            Some(role) if manages_books(role) => [C::EditBook, C::DeleteBook].into(),
            Some(_) => [C::PlaceOrder].into(),
        },
        ResourceContext::BookEditor => match role {
            Some(role) if manages_books(role) => [C::BookEditor].into(),
            _ => CapabilitySet::empty(),
        },
        ResourceContext::OrderList => order_view(role),
        ResourceContext::OrderMutation => order_mutation(role),
        ResourceContext::OrderDetail => order_view(role).union(order_mutation(role)),
        ResourceContext::UserList | ResourceContext::UserDetail | ResourceContext::UserEditor => {
            match role {
                Some(role) if manages_users(role) => [C::ManageUsers].into(),
                _ => CapabilitySet::empty(),
            }
        }
    }
}

fn order_view(role: Option<Role>) -> CapabilitySet {
    match role {
        Some(role) if manages_books(role) => {
            [Capability::AllOrders, Capability::OrderOwner].into()
        }
        // Anonymous callers are scoped like users; the backend answers 401.
        _ => [Capability::OwnOrders].into(),
    }
}

fn order_mutation(role: Option<Role>) -> CapabilitySet {
    match role {
        None => CapabilitySet::empty(),
        Some(role) if manages_books(role) => [Capability::MutateAnyOrder].into(),
        Some(_) => [Capability::MutateOwnOrders].into(),
    }
}
