//! CLI entry point for the scholar client.

pub mod api;
pub mod auth;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::auth::{FileCredentialStore, Session};
use crate::client::{AuthenticatedHttpClient, LoginRedirect};
use crate::config::ClientConfig;
use crate::error::ClientError;

/// Scholarship platform CLI
#[derive(Parser, Debug)]
#[command(name = "scholar", version, about = "Scholarship platform API client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Authentication management
    Auth(AuthArgs),
    /// GET an API path and print the response body
    Get(GetArgs),
    /// Browse notices
    Notices(NoticesArgs),
}

/// Arguments for the `auth` subcommand group.
#[derive(Parser, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommands,
}

/// Auth subcommands for login, status, and logout.
#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Sign in with username and password
    Login(LoginArgs),
    /// Show authentication status
    Status,
    /// Remove stored credentials
    Logout,
}

/// Arguments for `scholar auth login`.
#[derive(Parser, Debug)]
pub struct LoginArgs {
    pub username: String,

    /// Password (read from stdin when omitted)
    #[arg(short, long)]
    pub password: Option<String>,

    /// Keep credentials across sessions
    #[arg(long)]
    pub remember: bool,
}

/// Arguments for `scholar get`.
#[derive(Parser, Debug)]
pub struct GetArgs {
    /// API path relative to the base URL, e.g. /scholarships/42/
    pub path: String,
}

#[derive(Parser, Debug)]
pub struct NoticesArgs {
    #[command(subcommand)]
    pub command: NoticesCommands,
}

#[derive(Subcommand, Debug)]
pub enum NoticesCommands {
    /// List notices, pinned first
    List(NoticeListArgs),
}

#[derive(Parser, Debug)]
pub struct NoticeListArgs {
    #[arg(short, long)]
    pub search: Option<String>,

    #[arg(long, default_value_t = 1)]
    pub page: u32,

    #[arg(long)]
    pub page_size: Option<u32>,
}

/// Tells the terminal user to sign in again.
#[derive(Debug, Default)]
pub struct CliRedirect;

impl LoginRedirect for CliRedirect {
    fn redirect(&self, login_url: &str) {
        eprintln!("Session expired. Run `scholar auth login <username>` to sign in again ({login_url}).");
    }
}

/// Client backed by the on-disk credential store, configured from the environment.
pub fn build_client() -> Result<AuthenticatedHttpClient, ClientError> {
    let config = ClientConfig::from_env()?;
    let store = FileCredentialStore::new(config.credential_dir().clone());
    let session = Session::new(Arc::new(store));
    AuthenticatedHttpClient::builder(config, session)
        .redirect(Arc::new(CliRedirect))
        .build()
}
