use tracing::info;

use agora_api::activity::{self, MAX_FEED_LIMIT};
use agora_api::state::AppStateInner;
use agora_server::config::Config;
use agora_types::api::ActivityQuery;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agora=debug,agora_activity=debug,agora_api=debug".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    info!(
        "Rendering feed in {} (lookup timeout {}ms)",
        config.time_zone,
        config.lookup_timeout.as_millis()
    );

    let db = agora_db::Database::open(&config.db_path, config.lookup_timeout)?;
    let state = AppStateInner::new(db, config.time_zone);

    activity::backfill(&state).await?;

    let lines = activity::list_activity(
        &state,
        ActivityQuery {
            limit: config.feed_limit.min(MAX_FEED_LIMIT),
            oldest_first: false,
        },
    )
    .await?;

    for line in &lines {
        println!("{}", line);
    }
    info!("Printed {} feed lines", lines.len());

    Ok(())
}
