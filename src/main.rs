//! Command-line client for the AquaGreen Monitoring backend.
//!
//! Thin wrapper over the library's actions: every subcommand builds the
//! shared state, restores any persisted session from the OS credential
//! store, runs one action, and prints the response as JSON.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;

use aquagreen_client::api::types::{LoginRequest, RegisterRequest};
use aquagreen_client::storage::KeychainStorage;
use aquagreen_client::{actions, AppState};

#[derive(Parser, Debug)]
#[command(name = "aquagreen", about = "Client for the AquaGreen Monitoring backend")]
struct Args {
    /// Backend base URL (overrides AQUAGREEN_API_URL).
    #[arg(long)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account and start a session.
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Log in and persist the session.
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Mint a new access token from the stored refresh token.
    Refresh,
    /// Clear the stored session.
    Logout,
    /// Show the authenticated user's profile.
    Profile,
    /// List uploaded Excel files.
    Files,
    /// Show one file's details.
    File { id: u64 },
    /// Upload an Excel file.
    Upload {
        #[arg(long)]
        title: String,
        path: PathBuf,
    },
    /// Trigger server-side processing of an uploaded file.
    Process { id: u64 },
    /// Fetch processed rows for a file.
    Data { id: u64 },
    /// Request a password reset e-mail.
    ResetRequest { email: String },
    /// Confirm a password reset with the uid and token from the e-mail.
    ResetConfirm {
        uid: String,
        token: String,
        #[arg(long)]
        new_password: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    env_logger::init();

    let args = Args::parse();

    let base_url = args
        .api_url
        .or_else(|| std::env::var("AQUAGREEN_API_URL").ok())
        .unwrap_or_else(|| "http://localhost:8000/api".to_string());

    let state = AppState::new(&base_url, Arc::new(KeychainStorage::new()));
    if let Err(e) = state.restore().await {
        log::warn!("Could not restore stored session: {}", e);
    }

    match run(&state, args.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(state: &AppState, command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Register {
            username,
            email,
            password,
        } => {
            let auth = actions::register(
                state,
                RegisterRequest {
                    username,
                    email,
                    password,
                    // The CLI has no OTP flow; ask for immediate tokens.
                    verify_email: Some(false),
                },
            )
            .await?;
            println!("Registered and logged in as {}", auth.user.username);
        }
        Command::Login { username, password } => {
            let auth = actions::login(state, LoginRequest { username, password }).await?;
            println!("Logged in as {}", auth.user.username);
        }
        Command::Refresh => {
            actions::refresh_session(state).await?;
            println!("Access token refreshed");
        }
        Command::Logout => {
            actions::logout(state).await;
            println!("Logged out");
        }
        Command::Profile => print_json(&actions::fetch_profile(state).await?)?,
        Command::Files => print_json(&actions::fetch_files(state).await?)?,
        Command::File { id } => print_json(&actions::fetch_file(state, id).await?)?,
        Command::Upload { title, path } => {
            let contents = tokio::fs::read(&path).await?;
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("upload.xlsx")
                .to_string();
            print_json(&actions::upload_file(state, &title, &file_name, contents).await?)?;
        }
        Command::Process { id } => print_json(&actions::process_file(state, id).await?)?,
        Command::Data { id } => print_json(&actions::fetch_processed_data(state, id).await?)?,
        Command::ResetRequest { email } => {
            print_json(&actions::request_password_reset(state, &email).await?)?
        }
        Command::ResetConfirm {
            uid,
            token,
            new_password,
        } => print_json(&actions::confirm_password_reset(state, &uid, &token, &new_password).await?)?,
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
