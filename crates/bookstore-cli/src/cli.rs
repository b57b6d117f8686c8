//! Argument parsing and command dispatch.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bookstore_access::FileCredentialStore;
use bookstore_api_models::Role;
use bookstore_client::ClientConfig;
use bookstore_telemetry::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, init_logging};
use clap::{Args, Parser, Subcommand, ValueEnum};
use url::Url;

use crate::client::{AppContext, CliResult, default_credentials_path, parse_role, parse_url};
use crate::commands::{auth, books, orders, users};

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";

/// Parses CLI arguments, renders the requested page, and returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    install_logging(&cli);

    let command = command_label(&cli.command);
    let ctx = match build_context(&cli) {
        Ok(ctx) => ctx,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            return err.exit_code();
        }
    };
    tracing::debug!(command, request_id = ctx.api.request_id(), "dispatching");

    match dispatch(cli.command, &ctx).await {
        Ok(text) => {
            if !text.is_empty() {
                println!("{text}");
            }
            0
        }
        Err(err) => {
            let code = err.exit_code();
            tracing::info!(command, exit_code = code, "command refused or failed");
            eprintln!("error: {}", err.display_message());
            code
        }
    }
}

fn install_logging(cli: &Cli) {
    let config = LoggingConfig {
        level: &cli.log_level,
        format: cli.log_format.into(),
        build_sha: option_env!("BOOKSTORE_BUILD_SHA").unwrap_or("dev"),
    };
    if let Err(err) = init_logging(&config) {
        eprintln!("warning: {err}");
    }
}

fn build_context(cli: &Cli) -> CliResult<AppContext> {
    let config = ClientConfig::new(cli.api_url.clone())
        .with_timeout(Duration::from_secs(cli.timeout));
    let path = cli
        .credentials_file
        .clone()
        .unwrap_or_else(default_credentials_path);
    AppContext::new(&config, Arc::new(FileCredentialStore::new(path)), cli.output)
}

pub(crate) async fn dispatch(command: Command, ctx: &AppContext) -> CliResult<String> {
    match command {
        Command::Login(args) => auth::handle_login(ctx, args).await,
        Command::Register(args) => auth::handle_register(ctx, args).await,
        Command::Logout => auth::handle_logout(ctx),
        Command::Whoami => auth::handle_whoami(ctx).await,
        Command::Nav => auth::handle_nav(ctx).await,
        Command::Books(command) => match command {
            BookCommand::List(args) => books::handle_book_list(ctx, args).await,
            BookCommand::Show(args) => books::handle_book_show(ctx, args).await,
            BookCommand::Add(args) => books::handle_book_add(ctx, args).await,
            BookCommand::Edit(args) => books::handle_book_edit(ctx, args).await,
            BookCommand::Delete(args) => books::handle_book_delete(ctx, args).await,
        },
        Command::Orders(command) => match command {
            OrderCommand::List => orders::handle_order_list(ctx).await,
            OrderCommand::Mine => orders::handle_order_mine(ctx).await,
            OrderCommand::Show(args) => orders::handle_order_show(ctx, args).await,
            OrderCommand::Place(args) => orders::handle_order_place(ctx, args).await,
            OrderCommand::Edit(args) => orders::handle_order_edit(ctx, args).await,
            OrderCommand::Delete(args) => orders::handle_order_delete(ctx, args).await,
        },
        Command::Users(command) => match command {
            UserCommand::List => users::handle_user_list(ctx).await,
            UserCommand::Show(args) => users::handle_user_show(ctx, args).await,
            UserCommand::Edit(args) => users::handle_user_edit(ctx, args).await,
            UserCommand::Delete(args) => users::handle_user_delete(ctx, args).await,
        },
    }
}

const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Login(_) => "login",
        Command::Register(_) => "register",
        Command::Logout => "logout",
        Command::Whoami => "whoami",
        Command::Nav => "nav",
        Command::Books(_) => "books",
        Command::Orders(_) => "orders",
        Command::Users(_) => "users",
    }
}

#[derive(Parser)]
#[command(name = "bookstore", about = "Command-line client for the bookstore service")]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        env = "BOOKSTORE_API_URL",
        value_parser = parse_url,
        default_value = DEFAULT_API_URL
    )]
    pub(crate) api_url: Url,
    #[arg(
        long,
        global = true,
        env = "BOOKSTORE_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    pub(crate) timeout: u64,
    #[arg(
        long,
        global = true,
        env = "BOOKSTORE_CREDENTIALS_FILE",
        help = "Where the login token is kept [default: $HOME/.bookstore/credentials.json]"
    )]
    pub(crate) credentials_file: Option<PathBuf>,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for pages that render structured data"
    )]
    pub(crate) output: OutputFormat,
    #[arg(long, global = true, env = "BOOKSTORE_LOG", default_value = DEFAULT_LOG_LEVEL)]
    pub(crate) log_level: String,
    #[arg(long, global = true, value_enum, default_value_t = LogFormatArg::Pretty)]
    pub(crate) log_format: LogFormatArg,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Sign in and store the returned token.
    Login(CredentialArgs),
    /// Create an account and sign in.
    Register(CredentialArgs),
    /// Forget the stored token.
    Logout,
    /// Show who the stored token belongs to.
    Whoami,
    /// Show the navigation links available to you.
    Nav,
    #[command(subcommand)]
    Books(BookCommand),
    #[command(subcommand)]
    Orders(OrderCommand),
    #[command(subcommand)]
    Users(UserCommand),
}

#[derive(Subcommand)]
pub(crate) enum BookCommand {
    List(BookListArgs),
    Show(IdArgs),
    Add(BookAddArgs),
    Edit(BookEditArgs),
    Delete(IdArgs),
}

#[derive(Subcommand)]
pub(crate) enum OrderCommand {
    /// Orders visible to you (every order for staff).
    List,
    /// Only your own orders.
    Mine,
    Show(IdArgs),
    Place(OrderPlaceArgs),
    Edit(OrderEditArgs),
    Delete(IdArgs),
}

#[derive(Subcommand)]
pub(crate) enum UserCommand {
    List,
    Show(IdArgs),
    Edit(UserEditArgs),
    Delete(IdArgs),
}

#[derive(Args, Default)]
pub(crate) struct CredentialArgs {
    #[arg(long)]
    pub(crate) username: Option<String>,
    #[arg(long, env = "BOOKSTORE_PASSWORD", hide_env_values = true)]
    pub(crate) password: Option<String>,
}

#[derive(Args)]
pub(crate) struct IdArgs {
    pub(crate) id: i64,
}

#[derive(Args, Default)]
pub(crate) struct BookListArgs {
    /// Only books whose title contains this text.
    #[arg(long)]
    pub(crate) title: Option<String>,
}

#[derive(Args)]
pub(crate) struct BookAddArgs {
    #[arg(long)]
    pub(crate) title: String,
    #[arg(long)]
    pub(crate) author: String,
    #[arg(long)]
    pub(crate) price: f64,
    #[arg(long)]
    pub(crate) description: String,
}

/// Supplying every field replaces the book; otherwise only the given fields change.
#[derive(Args, Default)]
pub(crate) struct BookEditArgs {
    pub(crate) id: i64,
    #[arg(long)]
    pub(crate) title: Option<String>,
    #[arg(long)]
    pub(crate) author: Option<String>,
    #[arg(long)]
    pub(crate) price: Option<f64>,
    #[arg(long)]
    pub(crate) description: Option<String>,
}

#[derive(Args)]
pub(crate) struct OrderPlaceArgs {
    #[arg(required = true, num_args = 1..)]
    pub(crate) book_ids: Vec<i64>,
}

#[derive(Args)]
pub(crate) struct OrderEditArgs {
    pub(crate) id: i64,
    #[arg(required = true, num_args = 1..)]
    pub(crate) book_ids: Vec<i64>,
}

#[derive(Args, Default)]
pub(crate) struct UserEditArgs {
    pub(crate) id: i64,
    #[arg(long)]
    pub(crate) username: Option<String>,
    #[arg(long, value_parser = parse_role)]
    pub(crate) role: Option<Role>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub(crate) enum LogFormatArg {
    Pretty,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Pretty => Self::Pretty,
            LogFormatArg::Json => Self::Json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_flags_and_book_edit() {
        let cli = Cli::try_parse_from([
            "bookstore",
            "--api-url",
            "http://books.test:9000",
            "--output",
            "json",
            "books",
            "edit",
            "4",
            "--price",
            "12.5",
        ])
        .expect("parse");
        assert_eq!(cli.api_url.as_str(), "http://books.test:9000/");
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(command_label(&cli.command), "books");
        let Command::Books(BookCommand::Edit(args)) = cli.command else {
            panic!("expected books edit");
        };
        assert_eq!(args.id, 4);
        assert_eq!(args.price, Some(12.5));
        assert!(args.title.is_none());
    }

    #[test]
    fn order_place_requires_book_ids() {
        assert!(Cli::try_parse_from(["bookstore", "orders", "place"]).is_err());
        let cli = Cli::try_parse_from(["bookstore", "orders", "place", "5", "7"]).expect("parse");
        let Command::Orders(OrderCommand::Place(args)) = cli.command else {
            panic!("expected orders place");
        };
        assert_eq!(args.book_ids, vec![5, 7]);
    }

    #[test]
    fn user_edit_parses_role_case_insensitively() {
        let cli = Cli::try_parse_from(["bookstore", "users", "edit", "2", "--role", "moderator"])
            .expect("parse");
        let Command::Users(UserCommand::Edit(args)) = cli.command else {
            panic!("expected users edit");
        };
        assert_eq!(args.role, Some(Role::Moderator));
        assert!(
            Cli::try_parse_from(["bookstore", "users", "edit", "2", "--role", "owner"]).is_err()
        );
    }

    #[test]
    fn log_format_maps_to_telemetry() {
        assert_eq!(LogFormat::from(LogFormatArg::Json), LogFormat::Json);
        assert_eq!(LogFormat::from(LogFormatArg::Pretty), LogFormat::Pretty);
    }
}
