pub mod models;
pub mod test_utils;

use common::config;
use sea_orm::{Database, DatabaseConnection, DbErr};

/// Opens a connection to the configured database.
///
/// `DATABASE_PATH` may be a full DSN or a plain SQLite file path; see
/// [`config::database_url`]. Failing to prepare the file's directory is
/// reported as a connection error.
pub async fn connect() -> Result<DatabaseConnection, DbErr> {
    let path_or_url = config::database_path();
    let url = config::database_url(&path_or_url).map_err(|e| {
        DbErr::Custom(format!("Failed to prepare database at {path_or_url}: {e}"))
    })?;

    log::debug!("connecting to {url}");
    Database::connect(&url).await
}
