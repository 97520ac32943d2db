//! Command execution handlers

use anyhow::Result;
use clap::CommandFactory;
use feedscope_core::{Auth, FeedChoice, FeedscopeError, Subscription};
use reqwest::{StatusCode, Url};
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::client::{ApiResponse, FeedbinClient, ResponseBody};
use crate::format::{format_info, format_json, format_subscriptions, format_success, ListFormat};

use super::commands::*;
use super::session::Session;

/// Run one parsed command
pub async fn dispatch(command: Commands, session: &mut Session<'_>) -> Result<()> {
    match command {
        Commands::Auth { command } => handle_auth(command, session).await,
        Commands::Subscriptions { command } => handle_subscriptions(command, session).await,
        Commands::Config { command } => handle_config(command, session),
        Commands::Completion { shell } => generate_completion(shell, session),
    }
}

/// Translate a non-success status into the error reported to the user.
///
/// `id` is the subscription the request was about, if any.
fn status_error(status: StatusCode, id: Option<u64>) -> FeedscopeError {
    match (status, id) {
        (StatusCode::UNAUTHORIZED, _) => FeedscopeError::AuthenticationFailed,
        (StatusCode::FORBIDDEN, Some(id)) => FeedscopeError::Forbidden(id),
        (StatusCode::NOT_FOUND, Some(id)) => {
            FeedscopeError::NotFound(format!("Subscription {} not found", id))
        }
        (other, _) => FeedscopeError::UnexpectedStatus(other.as_u16()),
    }
}

fn expect_status(response: &ApiResponse, expected: StatusCode, id: Option<u64>) -> Result<()> {
    if response.status == expected {
        Ok(())
    } else {
        Err(status_error(response.status, id).into())
    }
}

/// Handle auth commands
pub async fn handle_auth(command: AuthCommands, session: &mut Session<'_>) -> Result<()> {
    match command {
        AuthCommands::Login { email, password } => {
            let password = match password {
                Some(password) => password,
                None => session.ui().password("Enter your Feedbin password")?,
            };

            let client = session.client(Auth::new(email.as_str(), password.as_str()))?;
            let response = client.check_authentication().await?;
            expect_status(&response, StatusCode::OK, None)?;
            session.print(&format_success("Authentication successful!"))?;

            session.store().save(&email, &password)?;
            let saved_to = format!("Credentials saved to {}", session.store().path().display());
            session.print(&format_info(&saved_to))?;
        }
        AuthCommands::Status => {
            let client = session.client(session.credentials()?)?;
            session.print(&format_info(&format!(
                "Credentials for {} found in config file.",
                client.email()
            )))?;
            session.note("Verifying credentials with Feedbin API...")?;

            let response = client.check_authentication().await?;
            expect_status(&response, StatusCode::OK, None)?;
            session.print(&format_success("Authentication successful!"))?;
        }
        AuthCommands::Whoami => {
            let stored = session.store().credentials()?;
            match stored {
                Some(auth) => session.print(&auth.email)?,
                None => {
                    session.print("No credentials stored.")?;
                    session.print("Run `feedscope auth login` to store your Feedbin credentials.")?;
                }
            }
        }
        AuthCommands::Remove => {
            session.store().remove()?;
            session.print(&format_success("Authentication credentials removed"))?;
        }
    }

    Ok(())
}

/// Handle subscription commands
pub async fn handle_subscriptions(
    command: SubscriptionCommands,
    session: &mut Session<'_>,
) -> Result<()> {
    match command {
        SubscriptionCommands::List {
            extended,
            jsonl,
            limit,
        } => {
            let client = session.client(session.credentials()?)?;
            let subscriptions = collect_subscriptions(&client, extended, limit).await?;

            let format = ListFormat::from_flags(jsonl, extended);
            if let Some(output) = format_subscriptions(&subscriptions, format)? {
                session.print(&output)?;
            }
        }
        SubscriptionCommands::Get { id, extended } => {
            let client = session.client(session.credentials()?)?;
            let response = client.get_subscription(id, extended).await?;
            expect_status(&response, StatusCode::OK, Some(id))?;

            let subscription: Subscription = response.json()?;
            session.print(&format_json(&subscription)?)?;
        }
        SubscriptionCommands::Create { feed_url } => {
            let client = session.client(session.credentials()?)?;
            create_subscription(&client, &feed_url, session).await?;
        }
        SubscriptionCommands::Update { id, title } => {
            let auth = session.credentials()?;
            let title = match title {
                Some(title) => title,
                None => session.ui().input("New title")?,
            };
            let title = title.trim();
            if title.is_empty() {
                return Err(
                    FeedscopeError::InvalidInput("title must not be empty".to_string()).into(),
                );
            }

            let response = session.client(auth)?.update_subscription(id, title).await?;
            expect_status(&response, StatusCode::OK, Some(id))?;

            let subscription: Subscription = response.json()?;
            session.print(&format_json(&subscription)?)?;
        }
        SubscriptionCommands::Delete { id, yes } => {
            let auth = session.credentials()?;
            if !yes
                && !session
                    .ui()
                    .confirm(&format!("Delete subscription {}?", id))?
            {
                return Err(FeedscopeError::Aborted.into());
            }

            let response = session.client(auth)?.delete_subscription(id).await?;
            match response.status {
                StatusCode::NO_CONTENT | StatusCode::OK => {}
                other => return Err(status_error(other, Some(id)).into()),
            }
            session.print(&format_success(&format!("Deleted subscription {}", id)))?;
        }
    }

    Ok(())
}

/// Fetch subscriptions page by page, following `rel="next"` links until
/// none remain or `limit` items have been collected.
///
/// A link back to a page already fetched, or an empty page, also ends the
/// walk.
async fn collect_subscriptions(
    client: &FeedbinClient,
    extended: bool,
    limit: Option<usize>,
) -> Result<Vec<Subscription>> {
    let mut subscriptions = Vec::new();
    if limit == Some(0) {
        return Ok(subscriptions);
    }

    let mut response = client.list_subscriptions(extended).await?;
    let mut visited = HashSet::new();
    let mut page = 1;

    loop {
        visited.insert(response.url.to_string());
        expect_status(&response, StatusCode::OK, None)?;
        if page == 1 {
            if let Some(total) = response.record_count() {
                debug!("Server reports {} subscriptions", total);
            }
        }

        let batch: Vec<Subscription> = response.json()?;
        debug!("Page {}: {} subscriptions", page, batch.len());
        if batch.is_empty() {
            break;
        }
        subscriptions.extend(batch);

        if let Some(limit) = limit {
            if subscriptions.len() >= limit {
                subscriptions.truncate(limit);
                break;
            }
        }

        let Some(next) = response.next_link() else {
            break;
        };
        let next = Url::parse(&next).map(String::from).unwrap_or(next);
        if visited.contains(&next) {
            warn!("Pagination link {} was already fetched, stopping", next);
            break;
        }
        page += 1;
        response = client.get_page(&next).await?;
    }

    Ok(subscriptions)
}

async fn create_subscription(
    client: &FeedbinClient,
    feed_url: &str,
    session: &mut Session<'_>,
) -> Result<()> {
    let response = client.create_subscription(feed_url).await?;

    match response.status {
        StatusCode::CREATED => {
            let subscription: Subscription = response.json()?;
            session.print(&format_json(&subscription)?)?;
        }
        StatusCode::FOUND => {
            session.note("Subscription already exists.")?;
            let subscription: Subscription = match (&response.body, response.location()) {
                (ResponseBody::Raw(_), Some(location)) => {
                    let existing = client.get_page(location).await?;
                    expect_status(&existing, StatusCode::OK, None)?;
                    existing.json()?
                }
                _ => response.json()?,
            };
            session.print(&format_json(&subscription)?)?;
        }
        StatusCode::MULTIPLE_CHOICES => {
            let choices: Vec<FeedChoice> = response.json()?;
            session.print(&format_json(&choices)?)?;
            return Err(FeedscopeError::Ambiguous(choices.len()).into());
        }
        StatusCode::NOT_FOUND => {
            return Err(FeedscopeError::NotFound(format!("No feed found at {}", feed_url)).into());
        }
        other => return Err(status_error(other, None).into()),
    }

    Ok(())
}

/// Handle config commands
pub fn handle_config(command: ConfigCommands, session: &mut Session<'_>) -> Result<()> {
    match command {
        ConfigCommands::Location => {
            let location = format!(
                "Configuration directory: {}",
                session.settings().config_dir().display()
            );
            session.print(&location)?;
        }
    }

    Ok(())
}

/// Generate shell completion script
pub fn generate_completion(shell: clap_complete::Shell, session: &mut Session<'_>) -> Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "feedscope", session.out());
    Ok(())
}
