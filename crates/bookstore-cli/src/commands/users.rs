use bookstore_access::{Mutation, ResourceContext, redirect_after};
use bookstore_api_models::UserUpdate;

use crate::cli::{IdArgs, UserEditArgs};
use crate::client::{AppContext, CliResult};
use crate::output::{render_user_detail, render_user_list};

pub(crate) async fn handle_user_list(ctx: &AppContext) -> CliResult<String> {
    let page = ctx
        .controller()
        .load(ResourceContext::UserList, ctx.api.list_users())
        .await?;
    render_user_list(&page, ctx.output)
}

pub(crate) async fn handle_user_show(ctx: &AppContext, args: IdArgs) -> CliResult<String> {
    let page = ctx
        .controller()
        .load(ResourceContext::UserDetail, ctx.api.get_user(args.id))
        .await?;
    render_user_detail(&page, ctx.output)
}

pub(crate) async fn handle_user_edit(ctx: &AppContext, args: UserEditArgs) -> CliResult<String> {
    ctx.controller().enter(ResourceContext::UserEditor).await?;

    let update = UserUpdate {
        username: args.username.map(|name| name.trim().to_string()),
        role: args.role,
    };
    update.validate()?;
    let user = ctx.api.update_user(args.id, &update).await?;
    tracing::info!(user_id = user.id, role = %user.role, "account updated");
    Ok(format!(
        "User {} updated. Redirecting to {}",
        user.username,
        redirect_after(Mutation::EditUser { id: args.id })
    ))
}

pub(crate) async fn handle_user_delete(ctx: &AppContext, args: IdArgs) -> CliResult<String> {
    ctx.controller().enter(ResourceContext::UserEditor).await?;

    ctx.api.delete_user(args.id).await?;
    tracing::info!(user_id = args.id, "account deleted");
    Ok(format!(
        "User {} deleted. Redirecting to {}",
        args.id,
        redirect_after(Mutation::DeleteUser)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookstore_access::{DenialReason, Route};
    use bookstore_api_models::Role;
    use bookstore_test_support::profile_json;
    use httpmock::prelude::*;
    use serde_json::json;

    use crate::client::CliError;
    use crate::client::tests::context_with;

    fn signed_in_as(server: &MockServer, role: Role) {
        server.mock(move |when, then| {
            when.method(GET).path("/api/users/me/");
            then.status(200).json_body(profile_json(role));
        });
    }

    #[tokio::test]
    async fn admin_lists_accounts() {
        let server = MockServer::start_async().await;
        signed_in_as(&server, Role::Admin);
        server.mock(|when, then| {
            when.method(GET).path("/api/users/");
            then.status(200).json_body(json!([
                profile_json(Role::Admin),
                profile_json(Role::User)
            ]));
        });
        let ctx = context_with(&server, Some("admin-token"));

        let text = handle_user_list(&ctx).await.expect("users");
        assert!(text.contains("admin"));
        assert!(text.contains("reader"));
        assert!(text.contains("USER"));
    }

    #[tokio::test]
    async fn moderator_is_sent_home_from_user_pages() {
        let server = MockServer::start_async().await;
        signed_in_as(&server, Role::Moderator);
        server.mock(|when, then| {
            when.method(GET).path("/api/users/");
            then.status(403);
        });
        let ctx = context_with(&server, Some("mod-token"));

        let err = handle_user_list(&ctx).await.expect_err("admin only");
        let CliError::Denied(denial) = err else {
            panic!("expected denial");
        };
        assert_eq!(denial.reason, DenialReason::AccessDenied);
        assert_eq!(denial.redirect, Route::Home);
    }

    #[tokio::test]
    async fn missing_account_renders_placeholder() {
        let server = MockServer::start_async().await;
        signed_in_as(&server, Role::Admin);
        server.mock(|when, then| {
            when.method(GET).path("/api/users/42/");
            then.status(404)
                .json_body(json!({"error": "Пользователь не найден"}));
        });
        let ctx = context_with(&server, Some("admin-token"));

        let text = handle_user_show(&ctx, IdArgs { id: 42 })
            .await
            .expect("page renders");
        assert_eq!(text, "User not found.");
    }

    #[tokio::test]
    async fn admin_promotes_user() {
        let server = MockServer::start_async().await;
        signed_in_as(&server, Role::Admin);
        let patch = server.mock(|when, then| {
            when.method(PATCH)
                .path("/api/users/3/")
                .json_body(json!({"role": "MODERATOR"}));
            then.status(200)
                .json_body(json!({"id": 3, "username": "reader", "role": "MODERATOR"}));
        });
        let ctx = context_with(&server, Some("admin-token"));

        let text = handle_user_edit(
            &ctx,
            UserEditArgs {
                id: 3,
                role: Some(Role::Moderator),
                ..UserEditArgs::default()
            },
        )
        .await
        .expect("updated");
        assert_eq!(text, "User reader updated. Redirecting to /users/3");
        patch.assert();
    }

    #[tokio::test]
    async fn empty_user_edit_is_rejected() {
        let server = MockServer::start_async().await;
        signed_in_as(&server, Role::Admin);
        let ctx = context_with(&server, Some("admin-token"));

        let err = handle_user_edit(
            &ctx,
            UserEditArgs {
                id: 3,
                ..UserEditArgs::default()
            },
        )
        .await
        .expect_err("nothing to change");
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn user_cannot_delete_accounts() {
        let server = MockServer::start_async().await;
        signed_in_as(&server, Role::User);
        let delete = server.mock(|when, then| {
            when.method(DELETE).path("/api/users/1/");
            then.status(204);
        });
        let ctx = context_with(&server, Some("user-token"));

        let err = handle_user_delete(&ctx, IdArgs { id: 1 })
            .await
            .expect_err("admin only");
        assert_eq!(err.exit_code(), 2);
        delete.assert_calls(0);
    }

    #[tokio::test]
    async fn admin_deletes_account() {
        let server = MockServer::start_async().await;
        signed_in_as(&server, Role::Admin);
        let delete = server.mock(|when, then| {
            when.method(DELETE).path("/api/users/3/");
            then.status(204);
        });
        let ctx = context_with(&server, Some("admin-token"));

        let text = handle_user_delete(&ctx, IdArgs { id: 3 })
            .await
            .expect("deleted");
        assert_eq!(text, "User 3 deleted. Redirecting to /users");
        delete.assert();
    }
}
