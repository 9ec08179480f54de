use std::env;

use log::*;
use market_wallet_engine::SqliteDatabase;
use once_cell::sync::Lazy;
use sqlx::{migrate, migrate::MigrateDatabase, Sqlite};

static TEST_ENV: Lazy<()> = Lazy::new(|| {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
});

/// Creates a fresh, fully migrated wallet database on a random temp-file path and returns a
/// handle to it.
pub async fn prepare_test_db() -> (SqliteDatabase, String) {
    Lazy::force(&TEST_ENV);
    let url = random_db_path();
    create_database(&url).await;
    let db = SqliteDatabase::new_with_url(&url, 8).await.expect("Error creating connection to database");
    migrate!("./src/db/sqlite/migrations").run(db.pool()).await.expect("Error running DB migrations");
    info!("🚀️ Test database ready at {url}");
    (db, url)
}

fn random_db_path() -> String {
    format!("sqlite://{}/wallet_test_{}.db", env::temp_dir().display(), rand::random::<u64>())
}

async fn create_database(url: &str) {
    if let Err(e) = Sqlite::drop_database(url).await {
        warn!("Error dropping database {url}: {e:?}");
    }
    Sqlite::create_database(url).await.expect("Error creating database");
}
