//! CLI auth command handlers for login, status, and logout.

use std::io::Write;

use crate::auth::AuthService;
use crate::error::ClientError;

use super::{build_client, LoginArgs};

/// Handle `scholar auth login <username>`.
pub async fn handle_login(args: &LoginArgs) -> Result<(), Box<dyn std::error::Error>> {
    let service = AuthService::new(build_client()?);

    let password = match &args.password {
        Some(password) => password.clone(),
        None => {
            print!("Password: ");
            std::io::stdout().flush()?;
            let mut line = String::new();
            std::io::stdin().read_line(&mut line)?;
            line.trim_end_matches(['\r', '\n']).to_string()
        }
    };
    if password.is_empty() {
        return Err("no password provided".into());
    }

    service.login(&args.username, &password, args.remember).await?;
    println!("Logged in as {}", args.username);
    Ok(())
}

/// Handle `scholar auth status`.
pub async fn handle_status() -> Result<(), Box<dyn std::error::Error>> {
    let service = AuthService::new(build_client()?);
    println!("{}", status_line(&service).await?);
    Ok(())
}

/// Describe the signed-in user.
///
/// Goes through the authenticated pipeline, so an expired access token is
/// refreshed rather than discarded.
pub async fn status_line(service: &AuthService) -> Result<String, ClientError> {
    let Some(user) = service.current_user().await? else {
        return Ok("Not logged in".to_string());
    };
    let role = if user.is_staff { " (staff)" } else { "" };
    let expiry = service
        .client()
        .session()
        .access_token()?
        .and_then(|token| token.expires_at().ok())
        .map(|at| format!(", access token valid until {}", at.to_rfc3339()))
        .unwrap_or_default();
    Ok(format!("Logged in as {}{role}{expiry}", user.username))
}

/// Handle `scholar auth logout`.
pub async fn handle_logout() -> Result<(), Box<dyn std::error::Error>> {
    let service = AuthService::new(build_client()?);
    service.logout()?;
    println!("Logged out");
    Ok(())
}
