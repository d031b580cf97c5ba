use anyhow::Context;
use examhall_store::{StoreConfig, bootstrap, db};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;

    info!("starting examhall bootstrap");
    let config = StoreConfig::load().context("failed to load store config")?;

    let db = db::init_pool_and_migrate(&config)
        .await
        .context("failed to connect and migrate database")?;

    if !config.seed {
        warn!("seeding disabled, schema migrated only");
        return Ok(());
    }

    match bootstrap(&db).await {
        Ok(records) => info!(records, "database ready"),
        Err(err) if err.is_primary_key_conflict() => {
            warn!(error = %err, "database already seeded");
            return Err(err).context("seed dataset already present");
        }
        Err(err) => return Err(err).context("failed to load seed dataset"),
    }

    Ok(())
}

fn init_tracing() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    Ok(())
}
