//! CLI command definitions and dispatch.

pub mod account;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use keyward_client::{AuthClient, ClientConfig, ClientError, config::default_session_file};

use crate::output::{Output, OutputFormat};

/// Keyward: access/refresh credential client
#[derive(Debug, Parser)]
#[command(name = "keyward", version, about, long_about = None)]
pub struct Cli {
    /// Server base URL
    #[arg(long, env = "KEYWARD_SERVER", default_value = "http://localhost:3001")]
    pub server: String,

    /// Session file (defaults to the user config directory)
    #[arg(long, env = "KEYWARD_SESSION_FILE")]
    pub session_file: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create an account
    Signup(account::SignupArgs),
    /// Log in and store the session locally
    Login(account::LoginArgs),
    /// Show the logged-in profile (refreshes the credential if needed)
    Me,
    /// Log out and clear the local session
    Logout,
    /// Show whether a local session exists
    Status,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), ClientError> {
        let client = AuthClient::new(&self.client_config())?;
        let out = Output::new(self.format);

        match &self.command {
            Commands::Signup(args) => account::signup(&client, args, out).await,
            Commands::Login(args) => account::login(&client, args, out).await,
            Commands::Me => account::me(&client, out).await,
            Commands::Logout => account::logout(&client, out).await,
            Commands::Status => account::status(&client, out),
        }
    }

    fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.server.clone(),
            session_file: self.session_file.clone().or_else(default_session_file),
            request_timeout: Duration::from_secs(self.timeout),
            ..ClientConfig::default()
        }
    }
}

/// Human-readable description of a client error.
pub fn describe_error(err: &ClientError) -> String {
    match err {
        ClientError::RefreshFailed(_) => {
            "Your session has expired. Please run `keyward login` again.".to_string()
        }
        ClientError::NotAuthenticated => "Not logged in. Run `keyward login` first.".to_string(),
        ClientError::Api { code, message, .. } => format!("{message} ({code})"),
        other => other.to_string(),
    }
}
