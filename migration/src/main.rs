use common::config::{AppConfig, database_url, is_dsn};
use common::logger::init_logger;
use std::{env, fs, path::Path, process};

mod runner;

#[tokio::main]
async fn main() {
    let config = AppConfig::global().clone();
    if let Err(e) = init_logger(&config.log_level, &config.log_file, config.log_to_stdout) {
        eprintln!("Failed to initialise logger: {e}");
    }

    let db_path = config.database_path;
    println!("{} ({}): {}", config.project_name, config.env, db_path);
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        Some("clean") => {
            remove_db_file(&db_path);
        }
        Some("fresh") => {
            remove_db_file(&db_path);
            migrate(&db_path).await;
        }
        _ => {
            migrate(&db_path).await;
        }
    }
}

async fn migrate(db_path: &str) {
    match database_url(db_path) {
        Ok(url) => runner::run_all_migrations(&url).await,
        Err(e) => {
            eprintln!("Failed to prepare database at {db_path}: {e}");
            process::exit(1);
        }
    }
}

fn remove_db_file(path: &str) {
    if is_dsn(path) {
        println!("DATABASE_PATH is a connection URL, nothing to delete: {path}");
        return;
    }

    let db_path = Path::new(path);
    if !db_path.exists() {
        println!("DB file does not exist: {}", db_path.display());
        return;
    }
    if let Err(e) = fs::remove_file(db_path) {
        eprintln!("Failed to delete DB {}: {e}", db_path.display());
        process::exit(1);
    }
    println!("Deleted DB: {}", db_path.display());
}
