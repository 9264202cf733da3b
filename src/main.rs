//! Scholar CLI binary entry point.

use clap::Parser;
use scholar_client::cli::{AuthCommands, Cli, Commands, NoticesCommands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Auth(auth_args) => match auth_args.command {
            AuthCommands::Login(args) => scholar_client::cli::auth::handle_login(&args).await,
            AuthCommands::Status => scholar_client::cli::auth::handle_status().await,
            AuthCommands::Logout => scholar_client::cli::auth::handle_logout().await,
        },
        Commands::Get(args) => scholar_client::cli::api::handle_get(&args).await,
        Commands::Notices(notice_args) => match notice_args.command {
            NoticesCommands::List(args) => scholar_client::cli::api::handle_notice_list(&args).await,
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
