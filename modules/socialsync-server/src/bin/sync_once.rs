// Unattended batch entry point. Unlike the web trigger, hard failures
// are not caught here: the process exits non-zero and the scheduler's
// logs carry the error.

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use socialsync_common::Config;
use socialsync_server::SyncContext;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("socialsync=info".parse()?))
        .init();

    dotenvy::dotenv().ok();

    let config = Config::from_env();
    config.log_redacted();

    let ctx = SyncContext::init(config).await?;
    let status = ctx.run_sync().await?;

    info!("{status}");
    Ok(())
}
