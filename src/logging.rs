//! Logging initialization
//!
//! Use the `tracing` macros (`debug!`, `info!`, `warn!`, `error!`) with
//! structured fields, never `println!`:
//!
//! ```rust,ignore
//! info!(user_id = user.id, "user logged in");
//! error!(error = ?err, recipe_id = id, "failed to delete recipe");
//! ```
//!
//! The filter comes from `RUST_LOG` and falls back to [`DEFAULT_FILTER`].

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const DEFAULT_FILTER: &str = "recipebook=info,tower_http=info,sqlx=warn";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	/// Human-readable lines
	#[default]
	Text,
	/// One JSON object per line
	Json,
}

impl std::str::FromStr for LogFormat {
	type Err = anyhow::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"text" | "pretty" => Ok(LogFormat::Text),
			"json" => Ok(LogFormat::Json),
			_ => Err(anyhow::anyhow!("Invalid log format: {}", s)),
		}
	}
}

pub fn init_logging(format: LogFormat) -> anyhow::Result<()> {
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

	let registry = tracing_subscriber::registry().with(filter);
	let res = match format {
		LogFormat::Text => registry.with(fmt::layer().with_target(true)).try_init(),
		LogFormat::Json => registry.with(fmt::layer().json().with_current_span(true)).try_init(),
	};
	res.map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::str::FromStr;

	#[test]
	fn parses_formats() {
		assert_eq!(LogFormat::from_str("JSON").unwrap(), LogFormat::Json);
		assert_eq!(LogFormat::from_str("text").unwrap(), LogFormat::Text);
		assert!(LogFormat::from_str("xml").is_err());
	}
}
