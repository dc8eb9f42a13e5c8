use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE},
    RequestBuilder, Url,
};
use serde::Serialize;
use tracing::debug;

use crate::{
    response::{IntoResponse, Response},
    RepositoryError,
};

#[derive(Clone, Debug)]
pub(crate) struct Client {
    base_url: Url,
    http: reqwest::Client,
}

impl Client {
    pub fn new(db_url: &str) -> Response<Self> {
        let base_url = Url::parse(db_url).map_err(|e| {
            RepositoryError::InvalidBaseUrl {
                url: db_url.to_string(),
                message: e.to_string(),
            }
        })?;

        if base_url.cannot_be_a_base()
            || !matches!(base_url.scheme(), "http" | "https")
        {
            return Err(RepositoryError::InvalidBaseUrl {
                url: db_url.to_string(),
                message: "expected an http(s) base url".to_string(),
            });
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::ClientBuilder::new()
            .default_headers(headers)
            .user_agent("Postboard-Rust-App")
            .build()
            .into_response("failed to build http client")?;

        Ok(Self { base_url, http })
    }

    /// `{base}/{collection}.json`
    pub fn collection_url(&self, collection: &str) -> Response<Url> {
        self.url(&[&format!("{collection}.json")])
    }

    /// `{base}/{collection}/{id}.json`
    pub fn item_url(&self, collection: &str, id: &str) -> Response<Url> {
        validate_id(id)?;
        self.url(&[collection, &format!("{id}.json")])
    }

    fn url(&self, segments: &[&str]) -> Response<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| RepositoryError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                message: "cannot append path segments".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    pub async fn get(&self, url: Url) -> Response<String> {
        self.send(self.http.get(url)).await
    }

    pub async fn post<T: Serialize + ?Sized>(
        &self,
        url: Url,
        body: &T,
    ) -> Response<String> {
        let request = self.http.post(url);
        self.send(with_json(request, body)?).await
    }

    pub async fn put<T: Serialize + ?Sized>(
        &self,
        url: Url,
        body: &T,
    ) -> Response<String> {
        let request = self.http.put(url);
        self.send(with_json(request, body)?).await
    }

    pub async fn delete(&self, url: Url) -> Response<String> {
        self.send(self.http.delete(url)).await
    }

    async fn send(&self, request: RequestBuilder) -> Response<String> {
        let response = request.send().await.into_response("failed to send")?;

        let status = response.status();
        debug!(url = %response.url(), status = status.as_u16());

        let text = response.text().await.into_response("failed to get text")?;

        if !status.is_success() {
            return Err(RepositoryError::FailedStatusCode {
                status_code: status,
                message: text,
            });
        }

        Ok(text)
    }
}

fn with_json<T: Serialize + ?Sized>(
    request: RequestBuilder,
    body: &T,
) -> Response<RequestBuilder> {
    let body =
        serde_json::to_string(body).into_response("failed to serialize body")?;

    Ok(request
        .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
        .body(body))
}

/// Keys the store cannot address as a single path segment.
fn validate_id(id: &str) -> Response<()> {
    let forbidden = |c: char| {
        matches!(c, '/' | '.' | '#' | '$' | '[' | ']') || c.is_control()
    };

    if id.trim().is_empty() || id.chars().any(forbidden) {
        return Err(RepositoryError::InvalidId { id: id.to_string() });
    }

    Ok(())
}
