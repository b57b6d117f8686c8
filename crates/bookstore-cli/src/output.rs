//! Output renderers and formatting helpers for CLI pages.
//!
//! Renderers only emit the affordances present in the page's capability set;
//! read failures become an inline placeholder instead of failing the page.

use anyhow::anyhow;
use bookstore_access::{ApiError, Capability, CapabilitySet, Identity, PageView};
use bookstore_api_models::{Book, OrderInfo, UserProfile};
use serde::Serialize;
use serde_json::{Value, json};

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

/// Page whose payload may have failed to load.
pub(crate) type LoadedPage<T> = PageView<Result<T, ApiError>>;

pub(crate) fn render_nav(page: &PageView<()>, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_json(&json!({
            "user": page.identity.profile(),
            "capabilities": page.capabilities,
        })),
        OutputFormat::Table => {
            let mut links = vec!["books (bookstore books list)".to_string()];
            if page.identity.is_identified() {
                links.push("orders (bookstore orders list)".to_string());
            }
            for (capability, command) in [
                (Capability::UsersLink, "bookstore users list"),
                (Capability::LoginLink, "bookstore login"),
                (Capability::LogoutLink, "bookstore logout"),
            ] {
                if page.capabilities.contains(capability) {
                    links.push(affordance(capability, command));
                }
            }
            let mut lines = vec![signed_in_as(&page.identity)];
            lines.extend(links.into_iter().map(|link| format!("  {link}")));
            Ok(lines.join("\n"))
        }
    }
}

pub(crate) fn render_identity(identity: &Identity, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_json(&json!({ "user": identity.profile() })),
        OutputFormat::Table => Ok(match identity.profile() {
            Some(profile) => format!(
                "id: {}\nusername: {}\nrole: {}",
                profile.id, profile.username, profile.role
            ),
            None => "anonymous".to_string(),
        }),
    }
}

pub(crate) fn render_book_list(page: &LoadedPage<Vec<Book>>, format: OutputFormat) -> CliResult<String> {
    if matches!(format, OutputFormat::Json) {
        return page_json(page, "books");
    }
    let mut lines = Vec::new();
    match &page.resource {
        Ok(books) if books.is_empty() => lines.push("No books found.".to_string()),
        Ok(books) => {
            lines.push(format!("{:>5} {:<32} {:<24} {:>9}", "ID", "TITLE", "AUTHOR", "PRICE"));
            for book in books {
                lines.push(format!(
                    "{:>5} {:<32} {:<24} {:>9}",
                    book.id,
                    truncate(&book.title, 32),
                    truncate(&book.author, 24),
                    format_price(book.price)
                ));
            }
        }
        Err(err) => lines.push(placeholder(err, "Books")),
    }
    if page.capabilities.contains(Capability::AddBook) {
        lines.push(String::new());
        lines.push(format!(
            "{}: bookstore books add --title .. --author .. --price .. --description ..",
            Capability::AddBook.label()
        ));
    }
    Ok(lines.join("\n"))
}

pub(crate) fn render_book_detail(page: &LoadedPage<Book>, format: OutputFormat) -> CliResult<String> {
    if matches!(format, OutputFormat::Json) {
        return page_json(page, "book");
    }
    let book = match &page.resource {
        Ok(book) => book,
        Err(err) => return Ok(placeholder(err, "Book")),
    };
    let mut lines = vec![
        format!("id: {}", book.id),
        format!("title: {}", book.title),
        format!("author: {}", book.author),
        format!("price: {}", format_price(book.price)),
        format!("description: {}", book.description),
    ];
    let caps = &page.capabilities;
    let actions: Vec<String> = [
        (Capability::PlaceOrder, format!("bookstore orders place {}", book.id)),
        (Capability::EditBook, format!("bookstore books edit {}", book.id)),
        (Capability::DeleteBook, format!("bookstore books delete {}", book.id)),
    ]
    .into_iter()
    .filter(|(capability, _)| caps.contains(*capability))
    .map(|(capability, command)| affordance(capability, &command))
    .collect();
    if !actions.is_empty() {
        lines.push(format!("actions: {}", actions.join(", ")));
    }
    Ok(lines.join("\n"))
}

pub(crate) fn render_order_list(
    page: &LoadedPage<Vec<OrderInfo>>,
    format: OutputFormat,
) -> CliResult<String> {
    if matches!(format, OutputFormat::Json) {
        return page_json(&redact_owners(page), "orders");
    }
    let orders = match &page.resource {
        Ok(orders) if orders.is_empty() => return Ok("No orders yet.".to_string()),
        Ok(orders) => orders,
        Err(err) => return Ok(placeholder(err, "Orders")),
    };
    let show_owner = page.capabilities.contains(Capability::OrderOwner);
    let mut lines = Vec::with_capacity(orders.len() + 1);
    if show_owner {
        lines.push(format!(
            "{:>5} {:<16} {:<16} {:>6} {:>10}",
            "ID", "CREATED", "USER", "BOOKS", "TOTAL"
        ));
    } else {
        lines.push(format!("{:>5} {:<16} {:>6} {:>10}", "ID", "CREATED", "BOOKS", "TOTAL"));
    }
    for order in orders {
        let created = format_created(order);
        let total = format_price(order.total_price);
        if show_owner {
            lines.push(format!(
                "{:>5} {:<16} {:<16} {:>6} {:>10}",
                order.id,
                created,
                truncate(order.user.as_deref().unwrap_or("-"), 16),
                order.books.len(),
                total
            ));
        } else {
            lines.push(format!(
                "{:>5} {:<16} {:>6} {:>10}",
                order.id,
                created,
                order.books.len(),
                total
            ));
        }
    }
    Ok(lines.join("\n"))
}

pub(crate) fn render_order_detail(
    page: &LoadedPage<OrderInfo>,
    format: OutputFormat,
) -> CliResult<String> {
    if matches!(format, OutputFormat::Json) {
        return page_json(&redact_owner(page), "order");
    }
    let order = match &page.resource {
        Ok(order) => order,
        Err(err) => return Ok(placeholder(err, "Order")),
    };
    let caps = &page.capabilities;
    let mut lines = vec![
        format!("order: {}", order.id),
        format!("created: {}", format_created(order)),
    ];
    if caps.contains(Capability::OrderOwner) {
        lines.push(format!("user: {}", order.user.as_deref().unwrap_or("-")));
    }
    lines.push("books:".to_string());
    for book in &order.books {
        lines.push(format!(
            "  {:>5} {} by {} ({})",
            book.id,
            book.title,
            book.author,
            format_price(book.price)
        ));
    }
    lines.push(format!("total: {}", format_price(order.total_price)));
    if may_mutate(caps, &page.identity, order) {
        lines.push(format!(
            "actions: edit (bookstore orders edit {id} <book-id>..), delete (bookstore orders delete {id})",
            id = order.id
        ));
    }
    Ok(lines.join("\n"))
}

pub(crate) fn render_user_list(
    page: &LoadedPage<Vec<UserProfile>>,
    format: OutputFormat,
) -> CliResult<String> {
    if matches!(format, OutputFormat::Json) {
        return page_json(page, "users");
    }
    let users = match &page.resource {
        Ok(users) => users,
        Err(err) => return Ok(placeholder(err, "Users")),
    };
    let mut lines = vec![format!("{:>5} {:<24} {:<10}", "ID", "USERNAME", "ROLE")];
    for user in users {
        lines.push(format!(
            "{:>5} {:<24} {:<10}",
            user.id,
            truncate(&user.username, 24),
            user.role
        ));
    }
    Ok(lines.join("\n"))
}

pub(crate) fn render_user_detail(
    page: &LoadedPage<UserProfile>,
    format: OutputFormat,
) -> CliResult<String> {
    if matches!(format, OutputFormat::Json) {
        return page_json(page, "user");
    }
    match &page.resource {
        Ok(user) => {
            let mut lines = vec![
                format!("id: {}", user.id),
                format!("username: {}", user.username),
                format!("role: {}", user.role),
            ];
            if page.capabilities.contains(Capability::ManageUsers) {
                lines.push(format!(
                    "actions: edit (bookstore users edit {id} --role ..), delete (bookstore users delete {id})",
                    id = user.id
                ));
            }
            Ok(lines.join("\n"))
        }
        Err(err) => Ok(placeholder(err, "User")),
    }
}

/// Inline stand-in for a resource that failed to load.
#[must_use]
pub(crate) fn placeholder(err: &ApiError, what: &str) -> String {
    if err.is_not_found() {
        format!("{what} not found.")
    } else {
        format!("{what} unavailable: {}", err.user_message())
    }
}

fn affordance(capability: Capability, command: &str) -> String {
    format!("{} ({command})", capability.label())
}

#[must_use]
pub(crate) fn format_price(price: f64) -> String {
    format!("{price:.2}")
}

fn format_created(order: &OrderInfo) -> String {
    order.created_at.map_or_else(
        || "-".to_string(),
        |created| created.format("%Y-%m-%d %H:%M").to_string(),
    )
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn signed_in_as(identity: &Identity) -> String {
    identity.profile().map_or_else(
        || "not signed in".to_string(),
        |profile| format!("signed in as {} ({})", profile.username, profile.role),
    )
}

fn may_mutate(caps: &CapabilitySet, identity: &Identity, order: &OrderInfo) -> bool {
    if caps.contains(Capability::MutateAnyOrder) {
        return true;
    }
    caps.contains(Capability::MutateOwnOrders)
        && identity
            .profile()
            .is_some_and(|profile| order.user.as_deref() == Some(profile.username.as_str()))
}

fn redact_owners(page: &LoadedPage<Vec<OrderInfo>>) -> LoadedPage<Vec<OrderInfo>> {
    let mut page = page.clone();
    if !page.capabilities.contains(Capability::OrderOwner) {
        if let Ok(orders) = &mut page.resource {
            for order in orders {
                order.user = None;
            }
        }
    }
    page
}

fn redact_owner(page: &LoadedPage<OrderInfo>) -> LoadedPage<OrderInfo> {
    let mut page = page.clone();
    if !page.capabilities.contains(Capability::OrderOwner) {
        if let Ok(order) = &mut page.resource {
            order.user = None;
        }
    }
    page
}

fn page_json<T: Serialize>(page: &LoadedPage<T>, key: &str) -> CliResult<String> {
    let payload = match &page.resource {
        Ok(value) => serde_json::to_value(value)
            .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?,
        Err(err) => json!({ "error": placeholder(err, key) }),
    };
    let mut body = serde_json::Map::new();
    body.insert(
        "user".to_string(),
        serde_json::to_value(page.identity.profile())
            .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?,
    );
    body.insert(
        "capabilities".to_string(),
        serde_json::to_value(&page.capabilities)
            .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?,
    );
    body.insert(key.to_string(), payload);
    to_json(&Value::Object(body))
}

fn to_json(value: &Value) -> CliResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))
}
