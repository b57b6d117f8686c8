use std::io::{self, Write as _};

use anyhow::anyhow;
use bookstore_access::{Credential, Mutation, ResourceContext, redirect_after};
use bookstore_api_models::{Credentials, TokenResponse};

use crate::cli::CredentialArgs;
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{render_identity, render_nav};

pub(crate) async fn handle_login(ctx: &AppContext, args: CredentialArgs) -> CliResult<String> {
    let credentials = collect_credentials(args)?;
    let token = ctx.api.login(&credentials).await?;
    remember(ctx, &token)?;
    tracing::info!(username = %credentials.username, "signed in");
    Ok(format!(
        "Signed in as {}. Redirecting to {}",
        credentials.username,
        redirect_after(Mutation::Login)
    ))
}

pub(crate) async fn handle_register(ctx: &AppContext, args: CredentialArgs) -> CliResult<String> {
    let credentials = collect_credentials(args)?;
    let token = ctx.api.register(&credentials).await?;
    remember(ctx, &token)?;
    tracing::info!(username = %credentials.username, "account registered");
    Ok(format!(
        "Account {} created. Redirecting to {}",
        credentials.username,
        redirect_after(Mutation::Register)
    ))
}

pub(crate) fn handle_logout(ctx: &AppContext) -> CliResult<String> {
    ctx.store.clear()?;
    Ok(format!(
        "Signed out. Redirecting to {}",
        redirect_after(Mutation::Logout)
    ))
}

pub(crate) async fn handle_whoami(ctx: &AppContext) -> CliResult<String> {
    let identity = ctx.controller().identity().await;
    render_identity(&identity, ctx.output)
}

pub(crate) async fn handle_nav(ctx: &AppContext) -> CliResult<String> {
    let page = ctx.controller().enter(ResourceContext::GlobalNav).await?;
    render_nav(&page, ctx.output)
}

fn remember(ctx: &AppContext, token: &TokenResponse) -> CliResult<()> {
    let credential = Credential::new(token.token.clone())
        .ok_or_else(|| CliError::failure(anyhow!("backend returned an empty token")))?;
    ctx.store.save(&credential)?;
    Ok(())
}

fn collect_credentials(args: CredentialArgs) -> CliResult<Credentials> {
    let username = match args.username {
        Some(username) => username,
        None => prompt_line("Username: ")?,
    };
    let password = match args.password {
        Some(password) => password,
        None => rpassword::prompt_password("Password: ")
            .map_err(|err| CliError::failure(anyhow!("failed to read password: {err}")))?,
    };
    let credentials = Credentials {
        username: username.trim().to_string(),
        password,
    };
    credentials.validate()?;
    Ok(credentials)
}

fn prompt_line(label: &str) -> CliResult<String> {
    let mut stderr = io::stderr();
    write!(stderr, "{label}")
        .and_then(|()| stderr.flush())
        .map_err(|err| CliError::failure(anyhow!("failed to write prompt: {err}")))?;
    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .map_err(|err| CliError::failure(anyhow!("failed to read input: {err}")))?;
    Ok(line.trim().to_string())
}
