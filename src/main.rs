use repository::Repository;
use shuttle_runtime::{Error, SecretStore, Secrets};
use tracing_subscriber::EnvFilter;

#[shuttle_runtime::main]
async fn main(
    #[Secrets] secret_store: SecretStore,
) -> shuttle_axum::ShuttleAxum {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let Some(db_url) = secret_store.get("DB_URL") else {
        return Err(Error::BuildPanic("DB_URL was not found".to_string()));
    };
    let config_name = secret_store
        .get("CONFIG")
        .unwrap_or_else(|| "Config.toml".to_string());

    let config = util::load_config(&config_name)
        .and_then(|config| api::init_config(&config))
        .map_err(|e| Error::BuildPanic(e.to_string()))?;

    let repository = Repository::new(&db_url)
        .map_err(|e| Error::BuildPanic(e.to_string()))?;

    let router = api::serve(repository, &config)
        .await
        .map_err(|e| Error::BuildPanic(e.to_string()))?;

    Ok(router.into())
}
