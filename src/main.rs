// recipe book

use anyhow::Context;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::signal;
use tracing::info;

use recipebook::config::Config;
use recipebook::logging::init_logging;
use recipebook::{new_shared_state, routes, seed, sql};

#[derive(Parser, Debug)]
#[command(name = "recipebook", version, about = "Share recipes, comment on them and grade them")]
struct Cli {
	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug, Default)]
enum Command {
	/// Run the web server
	#[default]
	Serve,
	/// Drop all tables and fill them with demonstration data
	Initdb,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();
	let config = Config::load().context("loading configuration")?;
	init_logging(config.log_format)?;

	let db = sql::connect(&config.database)
		.await
		.with_context(|| format!("can't connect to database {}", config.database.url))?;

	match cli.command.unwrap_or_default() {
		Command::Serve => serve(db, config).await,
		Command::Initdb => {
			let mut rng = StdRng::from_entropy();
			seed::initdb(&db, &mut rng).await.context("seeding database")?;
			Ok(())
		}
	}
}

async fn serve(db: sqlx::Pool<sqlx::Sqlite>, config: Config) -> anyhow::Result<()> {
	sql::create_schema(&db).await.context("creating schema")?;

	let addr = config.bind_addr();
	let app = routes::router(new_shared_state(db, config));

	let listener = tokio::net::TcpListener::bind(&addr)
		.await
		.with_context(|| format!("can't bind {addr}"))?;
	info!(%addr, "listening");

	axum::serve(listener, app)
		.with_graceful_shutdown(shutdown_signal())
		.await?;
	info!("server shut down");
	Ok(())
}

async fn shutdown_signal() {
	if let Err(e) = signal::ctrl_c().await {
		tracing::error!(error = ?e, "failed to listen for ctrl-c");
		std::future::pending::<()>().await;
	}
	info!("shutdown requested");
}
