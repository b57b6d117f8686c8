use bookstore_access::{Mutation, ResourceContext, redirect_after};
use bookstore_api_models::{BookInput, BookPatch};

use crate::cli::{BookAddArgs, BookEditArgs, BookListArgs, IdArgs};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{render_book_detail, render_book_list};

pub(crate) async fn handle_book_list(ctx: &AppContext, args: BookListArgs) -> CliResult<String> {
    let title = args
        .title
        .map(|title| title.trim().to_string())
        .filter(|title| !title.is_empty());
    let fetch = async {
        match &title {
            Some(title) => ctx.api.find_books_by_title(title).await,
            None => ctx.api.list_books().await,
        }
    };
    let page = ctx.controller().load(ResourceContext::BookList, fetch).await?;
    render_book_list(&page, ctx.output)
}

pub(crate) async fn handle_book_show(ctx: &AppContext, args: IdArgs) -> CliResult<String> {
    let page = ctx
        .controller()
        .load(ResourceContext::BookDetail, ctx.api.get_book(args.id))
        .await?;
    render_book_detail(&page, ctx.output)
}

pub(crate) async fn handle_book_add(ctx: &AppContext, args: BookAddArgs) -> CliResult<String> {
    ctx.controller().enter(ResourceContext::BookEditor).await?;

    let input = BookInput {
        title: args.title.trim().to_string(),
        author: args.author.trim().to_string(),
        price: args.price,
        description: args.description.trim().to_string(),
    };
    input.validate()?;
    let book = ctx.api.create_book(&input).await?;
    tracing::info!(book_id = book.id, "book added");
    Ok(format!(
        "Book {} added. Redirecting to {}",
        book.id,
        redirect_after(Mutation::AddBook)
    ))
}

pub(crate) async fn handle_book_edit(ctx: &AppContext, args: BookEditArgs) -> CliResult<String> {
    ctx.controller().enter(ResourceContext::BookEditor).await?;

    let id = args.id;
    let patch = BookPatch {
        title: trimmed(args.title),
        author: trimmed(args.author),
        price: args.price,
        description: trimmed(args.description),
    };
    if patch.is_empty() {
        return Err(CliError::validation(
            "nothing to change (pass --title, --author, --price or --description)",
        ));
    }
    patch.validate()?;
    match patch.into_full() {
        Ok(full) => ctx.api.replace_book(id, &full).await?,
        Err(partial) => ctx.api.patch_book(id, &partial).await?,
    };
    tracing::info!(book_id = id, "book updated");
    Ok(format!(
        "Book {id} updated. Redirecting to {}",
        redirect_after(Mutation::EditBook { id })
    ))
}

pub(crate) async fn handle_book_delete(ctx: &AppContext, args: IdArgs) -> CliResult<String> {
    ctx.controller().enter(ResourceContext::BookEditor).await?;

    ctx.api.delete_book(args.id).await?;
    tracing::info!(book_id = args.id, "book deleted");
    Ok(format!(
        "Book {} deleted. Redirecting to {}",
        args.id,
        redirect_after(Mutation::DeleteBook)
    ))
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|text| text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookstore_access::{DenialReason, Route};
    use bookstore_api_models::Role;
    use bookstore_test_support::{book_json, profile_json};
    use httpmock::prelude::*;
    use serde_json::json;

    use crate::client::tests::context_with;

    fn signed_in_as(server: &MockServer, role: Role) {
        server.mock(move |when, then| {
            when.method(GET).path("/api/users/me/");
            then.status(200).json_body(profile_json(role));
        });
    }

    #[tokio::test]
    async fn anonymous_catalog_has_no_add_button() {
        let server = MockServer::start_async().await;
        let books = server.mock(|when, then| {
            when.method(GET).path("/api/books/");
            then.status(200).json_body(json!([book_json(1), book_json(2)]));
        });
        let ctx = context_with(&server, None);

        let text = handle_book_list(&ctx, BookListArgs::default())
            .await
            .expect("catalog");
        assert!(text.contains("Book 1"));
        assert!(text.contains("Book 2"));
        assert!(!text.contains("add book"));
        books.assert();
    }

    #[tokio::test]
    async fn moderator_catalog_offers_add_button() {
        let server = MockServer::start_async().await;
        signed_in_as(&server, Role::Moderator);
        server.mock(|when, then| {
            when.method(GET).path("/api/books/");
            then.status(200).json_body(json!([book_json(1)]));
        });
        let ctx = context_with(&server, Some("mod-token"));

        let text = handle_book_list(&ctx, BookListArgs::default())
            .await
            .expect("catalog");
        assert!(text.contains("add book"));
    }

    #[tokio::test]
    async fn title_filter_without_matches_renders_empty_catalog() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/books/by-title/")
                .query_param("title", "Dune");
            then.status(404).json_body(json!({"error": "Книги не найдены"}));
        });
        let ctx = context_with(&server, None);

        let text = handle_book_list(
            &ctx,
            BookListArgs {
                title: Some(" Dune ".into()),
            },
        )
        .await
        .expect("catalog");
        assert_eq!(text, "No books found.");
    }

    #[tokio::test]
    async fn unavailable_catalog_degrades_to_placeholder() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/books/");
            then.status(500);
        });
        let ctx = context_with(&server, None);

        let text = handle_book_list(&ctx, BookListArgs::default())
            .await
            .expect("page still renders");
        assert!(text.starts_with("Books unavailable:"));
    }

    #[tokio::test]
    async fn user_book_page_offers_order_not_edit() {
        let server = MockServer::start_async().await;
        signed_in_as(&server, Role::User);
        server.mock(|when, then| {
            when.method(GET).path("/api/books/5/");
            then.status(200).json_body(book_json(5));
        });
        let ctx = context_with(&server, Some("user-token"));

        let text = handle_book_show(&ctx, IdArgs { id: 5 })
            .await
            .expect("book page");
        assert!(text.contains("place order (bookstore orders place 5)"));
        assert!(!text.contains("books edit"));
    }

    #[tokio::test]
    async fn user_is_denied_book_editor_before_any_request() {
        let server = MockServer::start_async().await;
        signed_in_as(&server, Role::User);
        let create = server.mock(|when, then| {
            when.method(POST).path("/api/books/");
            then.status(201).json_body(book_json(9));
        });
        let ctx = context_with(&server, Some("user-token"));

        let err = handle_book_add(
            &ctx,
            BookAddArgs {
                title: "T".into(),
                author: "A".into(),
                price: 10.0,
                description: "D".into(),
            },
        )
        .await
        .expect_err("denied");
        let CliError::Denied(denial) = err else {
            panic!("expected denial");
        };
        assert_eq!(denial.reason, DenialReason::AccessDenied);
        assert_eq!(denial.redirect, Route::Home);
        create.assert_calls(0);
    }

    #[tokio::test]
    async fn moderator_adds_book_and_returns_to_catalog() {
        let server = MockServer::start_async().await;
        signed_in_as(&server, Role::Moderator);
        let create = server.mock(|when, then| {
            when.method(POST)
                .path("/api/books/")
                .header("authorization", "Bearer mod-token")
                .json_body(json!({
                    "title": "Dune",
                    "author": "Herbert",
                    "price": 15.0,
                    "description": "Desert planet"
                }));
            then.status(200).json_body(json!({
                "id": 9,
                "title": "Dune",
                "author": "Herbert",
                "price": 15.0,
                "description": "Desert planet"
            }));
        });
        let ctx = context_with(&server, Some("mod-token"));

        let text = handle_book_add(
            &ctx,
            BookAddArgs {
                title: " Dune ".into(),
                author: "Herbert".into(),
                price: 15.0,
                description: "Desert planet".into(),
            },
        )
        .await
        .expect("added");
        assert_eq!(text, "Book 9 added. Redirecting to /books");
        create.assert();
    }

    #[tokio::test]
    async fn invalid_price_is_rejected_before_submit() {
        let server = MockServer::start_async().await;
        signed_in_as(&server, Role::Admin);
        let ctx = context_with(&server, Some("admin-token"));

        let err = handle_book_add(
            &ctx,
            BookAddArgs {
                title: "T".into(),
                author: "A".into(),
                price: 0.5,
                description: "D".into(),
            },
        )
        .await
        .expect_err("price too low");
        assert_eq!(err.exit_code(), 2);
        assert!(err.display_message().contains("price"));
    }

    #[tokio::test]
    async fn partial_edit_uses_patch() {
        let server = MockServer::start_async().await;
        signed_in_as(&server, Role::Moderator);
        let patch = server.mock(|when, then| {
            when.method(PATCH)
                .path("/api/books/4/")
                .json_body(json!({"price": 12.5}));
            then.status(200).json_body(book_json(4));
        });
        let ctx = context_with(&server, Some("mod-token"));

        let text = handle_book_edit(
            &ctx,
            BookEditArgs {
                id: 4,
                price: Some(12.5),
                ..BookEditArgs::default()
            },
        )
        .await
        .expect("patched");
        assert_eq!(text, "Book 4 updated. Redirecting to /books/4");
        patch.assert();
    }

    #[tokio::test]
    async fn full_edit_uses_put() {
        let server = MockServer::start_async().await;
        signed_in_as(&server, Role::Admin);
        let put = server.mock(|when, then| {
            when.method(PUT).path("/api/books/4/").json_body(json!({
                "title": "New",
                "author": "Someone",
                "price": 20.0,
                "description": "Rewritten"
            }));
            then.status(200).json_body(book_json(4));
        });
        let ctx = context_with(&server, Some("admin-token"));

        handle_book_edit(
            &ctx,
            BookEditArgs {
                id: 4,
                title: Some("New".into()),
                author: Some("Someone".into()),
                price: Some(20.0),
                description: Some("Rewritten".into()),
            },
        )
        .await
        .expect("replaced");
        put.assert();
    }

    #[tokio::test]
    async fn empty_edit_is_a_validation_error() {
        let server = MockServer::start_async().await;
        signed_in_as(&server, Role::Admin);
        let ctx = context_with(&server, Some("admin-token"));

        let err = handle_book_edit(
            &ctx,
            BookEditArgs {
                id: 4,
                ..BookEditArgs::default()
            },
        )
        .await
        .expect_err("nothing to change");
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn moderator_delete_redirects_to_catalog() {
        let server = MockServer::start_async().await;
        signed_in_as(&server, Role::Moderator);
        let delete = server.mock(|when, then| {
            when.method(DELETE).path("/api/books/3/");
            then.status(204);
        });
        let ctx = context_with(&server, Some("mod-token"));

        let text = handle_book_delete(&ctx, IdArgs { id: 3 })
            .await
            .expect("deleted");
        assert_eq!(text, "Book 3 deleted. Redirecting to /books");
        delete.assert();
    }

    #[tokio::test]
    async fn failed_delete_surfaces_backend_message() {
        let server = MockServer::start_async().await;
        signed_in_as(&server, Role::Admin);
        server.mock(|when, then| {
            when.method(DELETE).path("/api/books/3/");
            then.status(404);
        });
        let ctx = context_with(&server, Some("admin-token"));

        let err = handle_book_delete(&ctx, IdArgs { id: 3 })
            .await
            .expect_err("missing");
        assert_eq!(err.display_message(), "Not found.");
    }
}
