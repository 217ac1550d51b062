use std::env;

use chrono::{Datelike, Utc};
use colored::Colorize;
use log::{error, info, warn};
use rooranking_core::{
    AuthError, DatabaseError, Festival, HttpStorage, MemoryDatabase, PgDatabase,
};
use rooranking_server::{logging, run_server};
use thiserror::Error;

/// Where the storage provider is expected when ROO_STORAGE_URL is not set
const DEFAULT_STORAGE_URL: &str = "http://localhost:9071";

#[derive(Debug, Error)]
enum InitError {
    #[error("Could not initialize database: {0}")]
    Database(#[from] DatabaseError),
    #[error("Could not seed initial data: {0}")]
    Seed(#[from] AuthError),
}

impl InitError {
    fn hint(&self) -> String {
        match self {
            InitError::Database(_) => {
                "This is a database error. Make sure the Postgres instance behind ROO_DATABASE_URL is running and reachable, then try again.".to_string()
            }
            InitError::Seed(_) => {
                "Check the ROO_ADMIN_USERNAME and ROO_ADMIN_PASSWORD variables. The password needs at least 6 characters.".to_string()
            }
        }
    }
}

#[tokio::main]
async fn main() {
    logging::init_logger();

    match init().await {
        Ok(festival) => run_server(festival).await,
        Err(error) => {
            error!(
                "{} Read the error below to troubleshoot the issue.",
                "Roo Ranking failed to start!".bold().red()
            );
            error!("{}", error);
            error!("{}", format!("Hint: {}", error.hint()).dimmed().italic());
        }
    }
}

async fn init() -> Result<Festival, InitError> {
    let storage_url =
        env::var("ROO_STORAGE_URL").unwrap_or_else(|_| DEFAULT_STORAGE_URL.to_string());
    let storage = HttpStorage::new(storage_url);

    let festival = match env::var("ROO_DATABASE_URL") {
        Ok(url) => {
            info!("Connecting to database...");
            Festival::new(PgDatabase::new(&url).await?, storage)
        }
        Err(_) => {
            warn!("ROO_DATABASE_URL is not set, state will not survive a restart.");
            Festival::new(MemoryDatabase::new(), storage)
        }
    };

    seed_admin(&festival).await?;

    Ok(festival)
}

/// Creates the admin account on first run, when one is configured
async fn seed_admin(festival: &Festival) -> Result<(), InitError> {
    let (Ok(username), Ok(password)) = (
        env::var("ROO_ADMIN_USERNAME"),
        env::var("ROO_ADMIN_PASSWORD"),
    ) else {
        return Ok(());
    };

    if festival.seed(username, password, Utc::now().year()).await? {
        info!("Seeded the admin account.");
    }

    Ok(())
}
