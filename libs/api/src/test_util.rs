use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request},
    response::Response,
    Router,
};
use repository::{testing::FakeStore, Repository};

use crate::{auth::HeaderIdentity, router, ApiState};

/// The full router against `store`, identifying authors by `x-user-id`.
pub(crate) fn app(store: &FakeStore, default_uid: Option<&str>) -> Router {
    let repo = Repository::new(&store.base_url).unwrap();
    let identity =
        HeaderIdentity::new("x-user-id", default_uid.map(str::to_string))
            .unwrap();

    router(ApiState::new(repo, Arc::new(identity)))
}

pub(crate) fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub(crate) fn form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub(crate) async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub(crate) fn location(response: &Response) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}
