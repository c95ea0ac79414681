mod telemetry;

use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Seed the environment from `.env` when present.
    let dotenv = dotenvy::dotenv();

    telemetry::init()?;

    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded environment file"),
        Err(err) if err.not_found() => info!("no .env file; using process environment"),
        Err(err) => return Err(err.into()),
    }

    if let Err(err) = api::start().await {
        error!(error = %err, "server terminated with error");
        return Err(err.into());
    }

    Ok(())
}
