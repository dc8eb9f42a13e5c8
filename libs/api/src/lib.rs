use std::sync::Arc;

use anyhow::Context as _;
use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};
use repository::Repository;
use toml::{map::Map, Value};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::auth::{HeaderIdentity, IdentityProvider};

pub mod auth;
pub mod healthz;
pub mod home;
pub mod not_found;
pub mod post;
mod response;
#[cfg(test)]
mod test_util;
pub mod user;
mod view;

pub use response::{ApiResponse, IntoApiResponse};

#[derive(Debug)]
pub enum ApiError {
    AuthError(String),
    NotFound(String),
    /// The store answered with a non-success status.
    UpstreamStatus {
        status_code: StatusCode,
        error_code: String,
    },
    /// The store could not be reached or answered garbage.
    UpstreamError {
        error_code: String,
    },
    ServerError(String),
}

#[derive(Clone, Debug)]
pub struct ApiState {
    repo: Repository,
    identity: Arc<dyn IdentityProvider>,
}

impl ApiState {
    pub fn new(repo: Repository, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { repo, identity }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub server: Server,
    pub identity: Identity,
}

#[derive(Clone, Debug)]
pub struct Server {
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct Identity {
    /// Request header an upstream auth proxy fills with the user id.
    pub header: String,
    /// Author used when the header is absent. Meant for local development.
    pub default_uid: Option<String>,
}

pub async fn serve(
    repository: Repository,
    config: &Config,
) -> anyhow::Result<Router> {
    info!(task = "start api serving");

    let identity = HeaderIdentity::new(
        &config.identity.header,
        config.identity.default_uid.clone(),
    )?;

    Ok(router(ApiState::new(repository, Arc::new(identity))))
}

pub fn router(state: ApiState) -> Router {
    // posts
    let post_router = Router::new()
        .route("/", get(post::get_posts))
        .route(
            "/create",
            get(post::get_create_form).post(post::create_post),
        )
        .route("/:id", get(post::get_post))
        .route("/:id/delete", post(post::delete_post))
        .route(
            "/:id/update",
            get(post::get_update_form).post(post::update_post),
        )
        .fallback(not_found::get_404)
        .with_state(state.clone());

    // users
    let user_router = Router::new()
        .route("/", get(user::get_users))
        .route(
            "/create",
            get(user::get_create_form).post(user::create_user),
        )
        .route("/:id", get(user::get_user))
        .route("/:id/delete", post(user::delete_user))
        .route(
            "/:id/update",
            get(user::get_update_form).post(user::update_user),
        )
        .fallback(not_found::get_404)
        .with_state(state);

    Router::new()
        .route("/", get(home::get_home))
        .route("/healthz", get(healthz::get_health))
        .nest("/posts", post_router)
        .nest("/users", user_router)
        .layer(TraceLayer::new_for_http())
        .fallback(not_found::get_404)
}

pub fn init_config(config: &Map<String, Value>) -> anyhow::Result<Config> {
    let server = config.get("server").context("failed to get server config")?;

    let port = server
        .get("port")
        .context("failed to load port config")?
        .as_integer()
        .context("failed to parse port config")?;
    let port = u16::try_from(port).context("port config is out of range")?;

    let identity = config
        .get("identity")
        .context("failed to get identity config")?;

    let header = identity
        .get("header")
        .context("failed to load header config")?
        .as_str()
        .context("failed to parse header config")?
        .to_string();

    let default_uid = match identity.get("default_uid") {
        Some(value) => Some(
            value
                .as_str()
                .context("failed to parse default_uid config")?
                .to_string(),
        ),
        None => None,
    };

    Ok(Config {
        server: Server { port },
        identity: Identity {
            header,
            default_uid,
        },
    })
}
