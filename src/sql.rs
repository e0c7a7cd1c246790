use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};

use crate::config::DatabaseConfig;

// no ON DELETE CASCADE anywhere, dependents are removed by hand
pub const TABLE_SCHEMA: &[&str] = &[
	r#"
CREATE TABLE IF NOT EXISTS users (
	id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
	name VARCHAR(128) NOT NULL,
	email VARCHAR(128) NOT NULL UNIQUE,
	password VARCHAR(128) NOT NULL
)"#,
	r#"
CREATE TABLE IF NOT EXISTS recipes (
	id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
	title VARCHAR(100) NOT NULL,
	date_posted DATETIME NOT NULL,
	content TEXT NOT NULL,
	user_id INTEGER NOT NULL,
	FOREIGN KEY(user_id) REFERENCES users(id)
)"#,
	r#"
CREATE TABLE IF NOT EXISTS comments (
	id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
	content TEXT NOT NULL,
	date_posted DATETIME NOT NULL,
	user_id INTEGER NOT NULL,
	recipe_id INTEGER NOT NULL,
	FOREIGN KEY(user_id) REFERENCES users(id),
	FOREIGN KEY(recipe_id) REFERENCES recipes(id)
)"#,
	r#"
CREATE TABLE IF NOT EXISTS grades (
	id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
	score INTEGER NOT NULL,
	user_id INTEGER NOT NULL,
	recipe_id INTEGER NOT NULL,
	FOREIGN KEY(user_id) REFERENCES users(id),
	FOREIGN KEY(recipe_id) REFERENCES recipes(id)
)"#,
	r#"
CREATE TABLE IF NOT EXISTS sessions (
	token TEXT NOT NULL PRIMARY KEY,
	user_id INTEGER NOT NULL,
	created_at DATETIME NOT NULL,
	expires_at DATETIME NOT NULL,
	FOREIGN KEY(user_id) REFERENCES users(id)
)"#,
	"CREATE INDEX IF NOT EXISTS recipes_date_posted ON recipes(date_posted)",
	"CREATE INDEX IF NOT EXISTS comments_recipe ON comments(recipe_id, date_posted)",
	"CREATE INDEX IF NOT EXISTS grades_recipe ON grades(recipe_id)",
];

// dependents first
const DROP_SCHEMA: &[&str] = &[
	"DROP TABLE IF EXISTS sessions",
	"DROP TABLE IF EXISTS grades",
	"DROP TABLE IF EXISTS comments",
	"DROP TABLE IF EXISTS recipes",
	"DROP TABLE IF EXISTS users",
];

pub async fn connect(config: &DatabaseConfig) -> Result<Pool<Sqlite>, sqlx::Error> {
	let options = SqliteConnectOptions::from_str(&config.url)?
		.create_if_missing(true)
		.foreign_keys(true);

	SqlitePoolOptions::new()
		.max_connections(config.max_connections)
		.acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
		.connect_with(options)
		.await
}

/// Single-connection in-memory database, every connection of a
/// `sqlite::memory:` pool would otherwise see its own empty database.
pub async fn connect_in_memory() -> Result<Pool<Sqlite>, sqlx::Error> {
	let options = SqliteConnectOptions::from_str("sqlite::memory:")?
		.foreign_keys(true);

	SqlitePoolOptions::new()
		.max_connections(1)
		.min_connections(1)
		.idle_timeout(None)
		.max_lifetime(None)
		.connect_with(options)
		.await
}

pub async fn create_schema(db: &Pool<Sqlite>) -> Result<(), sqlx::Error> {
	let mut tx = db.begin().await?;
	for stmt in TABLE_SCHEMA {
		sqlx::query(stmt).execute(&mut *tx).await?;
	}
	tx.commit().await
}

pub async fn reset_schema(db: &Pool<Sqlite>) -> Result<(), sqlx::Error> {
	let mut tx = db.begin().await?;
	for stmt in DROP_SCHEMA {
		sqlx::query(stmt).execute(&mut *tx).await?;
	}
	for stmt in TABLE_SCHEMA {
		sqlx::query(stmt).execute(&mut *tx).await?;
	}
	tx.commit().await
}
