//! Recipe Book: share recipes, comment on them and grade them.

pub mod config;
pub mod error;
pub mod forms;
pub mod logging;
pub mod password;
pub mod queries;
pub mod routes;
pub mod seed;
pub mod session;
pub mod sql;
pub mod types;
pub mod views;

use std::sync::Arc;

use sqlx::{Pool, Sqlite};

pub type SharedState = Arc<ServerState>;

pub struct ServerState {
	pub db: Pool<Sqlite>,
	pub config: config::Config,
}

pub fn new_shared_state(db: Pool<Sqlite>, config: config::Config) -> SharedState {
	Arc::new(ServerState { db, config })
}
