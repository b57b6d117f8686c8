//! Page destinations and where each successful mutation lands.

use std::fmt::{self, Display, Formatter};

/// Navigable page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    /// Landing page.
    Home,
    /// Login form.
    Login,
    /// Book catalog.
    Catalog,
    /// Single book.
    Book {
        /// Book identifier.
        id: i64,
    },
    /// Order listing.
    Orders,
    /// Single order.
    Order {
        /// Order identifier.
        id: i64,
    },
    /// Account listing.
    Users,
    /// Single account.
    User {
        /// Account identifier.
        id: i64,
    },
}

impl Route {
    /// Path of the page, relative to the site root.
    #[must_use]
    pub fn path(self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Login => "/login".to_string(),
            Self::Catalog => "/books".to_string(),
            Self::Book { id } => format!("/books/{id}"),
            Self::Orders => "/orders".to_string(),
            Self::Order { id } => format!("/orders/{id}"),
            Self::Users => "/users".to_string(),
            Self::User { id } => format!("/users/{id}"),
        }
    }
}

impl Display for Route {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.path())
    }
}

/// State-changing action a page can submit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mutation {
    /// Exchange username/password for a credential.
    Login,
    /// Create an account.
    Register,
    /// Drop the stored credential.
    Logout,
    /// Create a book.
    AddBook,
    /// Update a book.
    EditBook {
        /// Book identifier.
        id: i64,
    },
    /// Remove a book.
    DeleteBook,
    /// Create an order.
    PlaceOrder,
    /// Update an order.
    EditOrder,
    /// Remove an order.
    DeleteOrder,
    /// Update an account.
    EditUser {
        /// Account identifier.
        id: i64,
    },
    /// Remove an account.
    DeleteUser,
}

/// Page to show after `mutation` succeeds.
#[must_use]
pub const fn redirect_after(mutation: Mutation) -> Route {
    match mutation {
        Mutation::Register | Mutation::Logout => Route::Home,
        Mutation::Login | Mutation::AddBook | Mutation::DeleteBook => Route::Catalog,
        Mutation::EditBook { id } => Route::Book { id },
        Mutation::PlaceOrder | Mutation::EditOrder | Mutation::DeleteOrder => Route::Orders,
        Mutation::EditUser { id } => Route::User { id },
        Mutation::DeleteUser => Route::Users,
    }
}
