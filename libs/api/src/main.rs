use std::net::{Ipv4Addr, SocketAddr};

use anyhow::Context;
use api::{init_config, serve};
use repository::Repository;
use tokio::net::TcpListener;
use toml::map::Map;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let secrets = util::load_env("Secrets.dev.toml").unwrap_or_else(|e| {
        warn!(task = "load secrets", err = e.to_string());
        Map::new()
    });

    let db_url = util::secret(&secrets, "DB_URL")
        .context("DB_URL was not found in the environment or secrets")?;
    let config_name = util::secret(&secrets, "CONFIG")
        .unwrap_or_else(|| "Config.toml".to_string());
    let config = init_config(&util::load_config(&config_name)?)?;

    let repository = Repository::new(&db_url)?;
    let router = serve(repository, &config).await?;

    let address = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.server.port));
    let listener = TcpListener::bind(&address).await?;
    info!(task = "listen", address = address.to_string());

    Ok(axum::serve(listener, router).await?)
}
