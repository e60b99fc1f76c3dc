use std::sync::Arc;

use anyhow::{Context, Result};
use dotenv::dotenv;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{parse_command, usage, Command};
use directory_cell::Directory;
use security_cell::AuditLog;
use session_cell::{permitted_operations, OperationOutcome, Session, SessionDispatcher};
use shared_config::AppConfig;
use shared_database::{FileSnapshotStore, SnapshotStore};
use shared_models::Admin;
use shared_utils::{password_digest, Clock, SystemClock};

#[tokio::main]
async fn main() -> Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting hospital scheduling console");

    // Load configuration
    let config = AppConfig::from_env();
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store = Arc::new(FileSnapshotStore::from_config(&config));

    let snapshot = store
        .load_snapshot()
        .await
        .with_context(|| format!("loading data from {}", config.data_dir.display()))?;

    let mut directory = Directory::from_snapshot(snapshot);
    let admin = Admin::new(
        &config.admin_id,
        &config.admin_name,
        password_digest(&config.admin_password),
    );
    if let Err(e) = directory.add_admin(admin) {
        warn!("Built-in admin not seeded: {}", e);
    }
    let directory = directory.into_shared();

    let audit = Arc::new(AuditLog::to_file(&config.audit_log_path, clock.clone()));
    let dispatcher = SessionDispatcher::new(directory.clone(), audit, clock, store.clone());

    run(&dispatcher).await?;

    let snapshot = directory.read().await.snapshot();
    store
        .save_snapshot(&snapshot)
        .await
        .with_context(|| format!("saving data to {}", config.data_dir.display()))?;

    info!("Console closed");
    Ok(())
}

/// Reads commands until `quit` or end of input. Each outcome is printed as
/// one JSON line on stdout.
async fn run(dispatcher: &SessionDispatcher) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut session: Option<Session> = None;

    while let Some(line) = lines.next_line().await.context("reading console input")? {
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                print_json(json!({ "error": message }));
                continue;
            }
        };

        match command {
            Command::Quit => break,
            Command::Help => print_json(help(session.as_ref())),
            Command::Login { user_id, password } => {
                if let Some(previous) = session.take() {
                    dispatcher.logout(previous).await;
                }
                match dispatcher.login(&user_id, &password).await {
                    Ok(opened) => {
                        print_json(json!(OperationOutcome::LoggedIn { session: opened.clone() }));
                        session = Some(opened);
                    }
                    Err(e) => print_json(json!({ "error": e.to_string() })),
                }
            }
            Command::Logout => match session.take() {
                Some(current) => print_json(json!(dispatcher.logout(current).await)),
                None => print_json(json!({ "error": "not logged in" })),
            },
            Command::Run(operation) => match session.as_ref() {
                Some(current) => match dispatcher.dispatch(current, operation).await {
                    Ok(outcome) => print_json(json!(outcome)),
                    Err(e) => print_json(json!({ "error": e.to_string() })),
                },
                None => print_json(json!({ "error": "log in first" })),
            },
        }
    }

    if let Some(current) = session.take() {
        dispatcher.logout(current).await;
    }
    Ok(())
}

fn help(session: Option<&Session>) -> serde_json::Value {
    let mut commands = vec!["login <user-id> <password>", "logout", "help", "quit"];
    if let Some(session) = session {
        commands.extend(permitted_operations(session.role()).iter().map(|kind| usage(*kind)));
    }
    json!({ "commands": commands })
}

fn print_json(value: serde_json::Value) {
    println!("{}", value);
}
