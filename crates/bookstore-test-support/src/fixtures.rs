//! Canned backend entities.

use bookstore_api_models::{Book, OrderInfo, Role, UserProfile};
use chrono::NaiveDate;
use serde_json::{Value, json};

/// Profile with a stable id and username per role.
#[must_use]
pub fn profile(role: Role) -> UserProfile {
    let (id, username) = match role {
        Role::Admin => (1, "admin"),
        Role::Moderator => (2, "moderator"),
        Role::User => (3, "reader"),
    };
    UserProfile {
        id,
        username: username.to_string(),
        role,
    }
}

/// Wire form of [`profile`], as `/api/users/me/` returns it.
#[must_use]
pub fn profile_json(role: Role) -> Value {
    let profile = profile(role);
    json!({
        "id": profile.id,
        "username": profile.username,
        "role": role.as_str(),
    })
}

/// Book whose fields derive from `id`.
#[must_use]
pub fn book(id: i64) -> Book {
    Book {
        id,
        title: format!("Book {id}"),
        author: format!("Author {id}"),
        price: 10.0 + f64::from(u8::try_from(id % 100).unwrap_or(0)),
        description: format!("Description of book {id}"),
    }
}

/// Wire form of [`book`].
#[must_use]
pub fn book_json(id: i64) -> Value {
    let book = book(id);
    json!({
        "id": book.id,
        "title": book.title,
        "author": book.author,
        "price": book.price,
        "description": book.description,
    })
}

/// Order owned by `owner` containing `book_ids`.
#[must_use]
pub fn order_info(id: i64, owner: &str, book_ids: &[i64]) -> OrderInfo {
    let books: Vec<Book> = book_ids.iter().copied().map(book).collect();
    let total_price = books.iter().map(|book| book.price).sum();
    OrderInfo {
        id,
        created_at: NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|date| date.and_hms_opt(12, 30, 0)),
        user: Some(owner.to_string()),
        books,
        total_price,
    }
}

/// Wire form of [`order_info`].
#[must_use]
pub fn order_json(id: i64, owner: &str, book_ids: &[i64]) -> Value {
    let order = order_info(id, owner, book_ids);
    json!({
        "id": order.id,
        "createdAt": "2024-03-01 12:30:00",
        "user": owner,
        "books": book_ids.iter().copied().map(book_json).collect::<Vec<_>>(),
        "totalPrice": order.total_price,
    })
}
