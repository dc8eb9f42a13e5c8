use client::Client;
use post::PostRepository;
use reqwest::StatusCode;
use user::UserRepository;

mod client;
mod document;
pub mod post;
mod response;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod user;

/// Data access for the remote JSON document store.
///
/// Every record lives under `{db_url}/{collection}/{id}.json`. Cloning is
/// cheap and shares the underlying connection pool.
#[derive(Clone, Debug)]
pub struct Repository {
    pub post: PostRepository,
    pub user: UserRepository,
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("in reqwest crate from failed transport: {}: {}", message, source)]
    ReqwestError {
        message: String,
        source: reqwest::Error,
    },

    #[error("store responded with status {}: {}", status_code, message)]
    FailedStatusCode {
        status_code: StatusCode,
        message: String,
    },

    #[error("in serde_json crate from undecodable body: {}: {}", message, source)]
    SerdeJsonError {
        message: String,
        source: serde_json::Error,
    },

    #[error("invalid record id: {:?}", id)]
    InvalidId { id: String },

    #[error("invalid database url {:?}: {}", url, message)]
    InvalidBaseUrl { url: String, message: String },
}

impl RepositoryError {
    /// Status returned by the store, when the failure came from one.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            RepositoryError::FailedStatusCode { status_code, .. } => {
                Some(*status_code)
            }
            _ => None,
        }
    }
}

impl Repository {
    pub fn new(db_url: &str) -> Result<Self, RepositoryError> {
        let client = Client::new(db_url)?;

        Ok(Self {
            post: PostRepository::new(client.clone()),
            user: UserRepository::new(client),
        })
    }
}

#[cfg(test)]
mod test {
    use crate::{Repository, RepositoryError};

    #[test]
    fn test_new_rejects_invalid_url() {
        let result = Repository::new("not a url");

        assert!(matches!(
            result,
            Err(RepositoryError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn test_new_rejects_non_http_url() {
        let result = Repository::new("mailto:someone@example.com");

        assert!(matches!(
            result,
            Err(RepositoryError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn test_new_accepts_trailing_slash() {
        assert!(Repository::new("https://example.firebaseio.com/").is_ok());
    }
}
