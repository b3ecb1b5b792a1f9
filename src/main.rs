//! fluent-orm - Main entry point.
//!
//! Connects with the URL from `--url` / `ORM_DATABASE_URL` and either runs one
//! SQL statement against a MySQL pool or reads one key from Redis, printing
//! the result as JSON.

use clap::Parser;
use fluent_orm::config::Config;
use fluent_orm::db::{Orm, Registry};
use fluent_orm::models::Backend;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber.with(fmt::layer().json()).init();
    } else {
        subscriber
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .init();
    }
}

async fn run(config: &Config, orm: &Orm) -> Result<(), Box<dyn std::error::Error>> {
    match orm.config().backend {
        Backend::MySql => {
            let Some(sql) = config.execute.as_deref() else {
                return Err("a MySQL URL needs --execute <SQL>".into());
            };
            let registry = Registry::new();
            orm.authenticate(&registry, &config.name).await?;
            let session = registry.require(&config.name).await?.logs(config.logs);

            let output = session.query(sql).exec().await?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Backend::Redis => {
            let Some(key) = config.get.as_deref() else {
                return Err("a Redis URL needs --get <KEY>".into());
            };
            let kv = orm.connect_kv().await?;
            let value = kv.get(key).await?;
            println!("{}", serde_json::json!({ "key": key, "value": value }));
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse configuration from command line and environment
    let config = Config::parse();

    // Initialize logging
    init_tracing(&config);

    let orm = Orm::from_url(&config.url)?;
    info!(
        target_url = %orm.config().masked(),
        name = %config.name,
        "Starting fluent-orm v{}",
        env!("CARGO_PKG_VERSION")
    );

    if let Err(e) = run(&config, &orm).await {
        error!(error = %e, "Command failed");
        if let Some(db_err) = e.downcast_ref::<fluent_orm::DbError>() {
            if let Some(hint) = db_err.suggestion() {
                eprintln!("Hint: {hint}");
            }
        }
        return Err(e);
    }

    Ok(())
}
