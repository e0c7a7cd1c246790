//! Configuration management
//!
//! Everything is read from the environment (after loading `.env` if present)
//! with defaults that work for local development.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::logging::LogFormat;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://recipebook.db?mode=rwc";
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_DATABASE_ACQUIRE_TIMEOUT_SECS: u64 = 3;
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";
pub const DEFAULT_SERVER_PORT: u16 = 8080;
pub const DEFAULT_STATIC_DIR: &str = "static";

/// Lifetime of a session created without "remember me".
pub const DEFAULT_SESSION_DAYS: i64 = 31;

/// Lifetime of a "remember me" session.
pub const DEFAULT_REMEMBER_DAYS: i64 = 365;

/// Upper bound for either session lifetime.
pub const MAX_SESSION_DAYS: i64 = 3650;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
	pub server: ServerConfig,
	pub database: DatabaseConfig,
	pub session: SessionConfig,
	pub log_format: LogFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
	pub host: String,
	pub port: u16,
	pub static_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
	pub url: String,
	pub max_connections: u32,
	pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
	pub session_days: i64,
	pub remember_days: i64,
}

impl Default for Config {
	fn default() -> Self {
		Config {
			server: ServerConfig {
				host: DEFAULT_SERVER_HOST.to_string(),
				port: DEFAULT_SERVER_PORT,
				static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
			},
			database: DatabaseConfig {
				url: DEFAULT_DATABASE_URL.to_string(),
				max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
				acquire_timeout_secs: DEFAULT_DATABASE_ACQUIRE_TIMEOUT_SECS,
			},
			session: SessionConfig {
				session_days: DEFAULT_SESSION_DAYS,
				remember_days: DEFAULT_REMEMBER_DAYS,
			},
			log_format: LogFormat::default(),
		}
	}
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
	std::env::var(key)
		.ok()
		.and_then(|s| s.parse().ok())
		.unwrap_or(default)
}

impl Config {
	/// Load configuration from environment and defaults
	pub fn load() -> anyhow::Result<Self> {
		dotenvy::dotenv().ok();
		let defaults = Config::default();

		let config = Config {
			server: ServerConfig {
				host: std::env::var("RECIPEBOOK_HOST").unwrap_or(defaults.server.host),
				port: env_or("RECIPEBOOK_PORT", defaults.server.port),
				static_dir: std::env::var("RECIPEBOOK_STATIC_DIR")
					.map(PathBuf::from)
					.unwrap_or(defaults.server.static_dir),
			},
			database: DatabaseConfig {
				url: std::env::var("DATABASE_URL").unwrap_or(defaults.database.url),
				max_connections: env_or("DATABASE_MAX_CONNECTIONS", defaults.database.max_connections),
				acquire_timeout_secs: env_or("DATABASE_ACQUIRE_TIMEOUT", defaults.database.acquire_timeout_secs),
			},
			session: SessionConfig {
				session_days: env_or("SESSION_DAYS", defaults.session.session_days),
				remember_days: env_or("REMEMBER_DAYS", defaults.session.remember_days),
			},
			log_format: env_or("LOG_FORMAT", defaults.log_format),
		};

		config.validate()?;
		Ok(config)
	}

	pub fn validate(&self) -> anyhow::Result<()> {
		if self.server.port == 0 {
			anyhow::bail!("Server port must be greater than 0");
		}
		if self.database.url.is_empty() {
			anyhow::bail!("Database URL cannot be empty");
		}
		if self.database.max_connections == 0 {
			anyhow::bail!("Database max_connections must be greater than 0");
		}
		if self.session.session_days <= 0 || self.session.remember_days <= 0 {
			anyhow::bail!(
				"Session lifetimes must be positive (session_days={}, remember_days={})",
				self.session.session_days,
				self.session.remember_days
			);
		}
		if self.session.session_days > MAX_SESSION_DAYS || self.session.remember_days > MAX_SESSION_DAYS {
			anyhow::bail!(
				"Session lifetimes must be at most {} days (session_days={}, remember_days={})",
				MAX_SESSION_DAYS,
				self.session.session_days,
				self.session.remember_days
			);
		}
		Ok(())
	}

	pub fn bind_addr(&self) -> String {
		format!("{}:{}", self.server.host, self.server.port)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_are_valid() {
		let config = Config::default();
		assert!(config.validate().is_ok());
		assert_eq!(config.bind_addr(), "0.0.0.0:8080");
	}

	#[test]
	fn rejects_zero_port() {
		let mut config = Config::default();
		config.server.port = 0;
		assert!(config.validate().is_err());
	}

	#[test]
	fn rejects_non_positive_session_lifetime() {
		let mut config = Config::default();
		config.session.remember_days = 0;
		let err = config.validate().unwrap_err();
		assert!(err.to_string().contains("remember_days=0"));
	}

	#[test]
	fn rejects_oversized_session_lifetime() {
		let mut config = Config::default();
		config.session.remember_days = 100_000_000;
		let err = config.validate().unwrap_err();
		assert!(err.to_string().contains("at most 3650 days"));

		config.session.remember_days = MAX_SESSION_DAYS;
		assert!(config.validate().is_ok());
	}

	#[test]
	fn rejects_empty_pool() {
		let mut config = Config::default();
		config.database.max_connections = 0;
		assert!(config.validate().is_err());
	}
}
