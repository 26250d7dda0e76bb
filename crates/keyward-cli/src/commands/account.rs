//! Account commands: signup, login, me, logout, status.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use keyward_client::{AuthClient, ClientError, Profile};

use crate::output::Output;

/// Arguments for `signup`
#[derive(Debug, Args)]
pub struct SignupArgs {
    /// Display name
    #[arg(long)]
    pub name: String,
    /// Email address
    #[arg(long)]
    pub email: String,
    /// Password (prompted if omitted)
    #[arg(long)]
    pub password: Option<String>,
}

/// Arguments for `login`
#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Email address
    #[arg(long)]
    pub email: String,
    /// Password (prompted if omitted)
    #[arg(long)]
    pub password: Option<String>,
}

/// Profile display row
#[derive(Debug, Serialize, Tabled)]
struct ProfileRow {
    /// Principal ID
    id: String,
    /// Name
    name: String,
    /// Email
    email: String,
    /// Role
    role: String,
}

impl From<Profile> for ProfileRow {
    fn from(p: Profile) -> Self {
        Self {
            id: p.id,
            name: p.name,
            email: p.email,
            role: p.role,
        }
    }
}

fn password_or_prompt(password: &Option<String>, confirm: bool) -> Result<String, ClientError> {
    if let Some(password) = password {
        return Ok(password.clone());
    }

    let mut prompt = dialoguer::Password::new().with_prompt("Password");
    if confirm {
        prompt = prompt.with_confirmation("Confirm password", "Passwords do not match");
    }
    prompt
        .interact()
        .map_err(|e| ClientError::Io(std::io::Error::other(e.to_string())))
}

/// `keyward signup`
pub async fn signup(client: &AuthClient, args: &SignupArgs, out: Output) -> Result<(), ClientError> {
    let password = password_or_prompt(&args.password, true)?;
    let registered = client.signup(&args.name, &args.email, &password).await?;

    out.notice("Account created; run `keyward login` to start a session");
    out.record(&ProfileRow {
        id: registered.id,
        name: registered.name,
        email: registered.email,
        role: "user".to_string(),
    });
    Ok(())
}

/// `keyward login`
pub async fn login(client: &AuthClient, args: &LoginArgs, out: Output) -> Result<(), ClientError> {
    let password = password_or_prompt(&args.password, false)?;
    let profile = client.login(&args.email, &password).await?;

    out.notice(&format!("Logged in as {}", profile.email));
    out.record(&ProfileRow::from(profile));
    Ok(())
}

/// `keyward me`
pub async fn me(client: &AuthClient, out: Output) -> Result<(), ClientError> {
    let profile = client.me().await?;
    out.record(&ProfileRow::from(profile));
    Ok(())
}

/// `keyward logout`
pub async fn logout(client: &AuthClient, out: Output) -> Result<(), ClientError> {
    match client.logout().await {
        Ok(()) => out.notice("Logged out"),
        Err(ClientError::NotAuthenticated) => out.warn("No active session"),
        Err(e) => {
            out.warn(&format!("Server logout failed: {e}"));
            out.notice("Local session cleared");
        }
    }
    Ok(())
}

/// `keyward status`
pub fn status(client: &AuthClient, out: Output) -> Result<(), ClientError> {
    let Some(snapshot) = client.status() else {
        out.warn("Not logged in");
        return Ok(());
    };

    out.notice("Logged in");
    out.field("Updated", &snapshot.updated_at.to_rfc3339());
    if let Some(path) = client.session_path() {
        out.field("Session", &path.display().to_string());
    }
    out.record(&ProfileRow::from(snapshot.user));
    Ok(())
}
