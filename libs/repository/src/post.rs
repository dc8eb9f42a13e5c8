use chrono::Utc;
use entity::prelude::*;
use tracing::info;

use crate::{
    client::Client,
    document::{
        parse_collection, parse_push_response, parse_record, PostDocument,
    },
    response::Response,
};

const COLLECTION: &str = "posts";

#[derive(Clone, Debug)]
pub struct PostRepository {
    client: Client,
}

impl PostRepository {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }
}

impl PostRepository {
    #[tracing::instrument(skip(self))]
    pub async fn find_all(&self) -> Response<Vec<PostEntity>> {
        let url = self.client.collection_url(COLLECTION)?;
        let text = self.client.get(url).await?;

        Ok(parse_collection::<PostDocument>(COLLECTION, &text)
            .into_iter()
            .map(|(id, document)| document.into_entity(id))
            .collect())
    }

    #[tracing::instrument(skip(self))]
    pub async fn find_by_id(&self, id: &str) -> Response<Option<PostEntity>> {
        let url = self.client.item_url(COLLECTION, id)?;
        let text = self.client.get(url).await?;

        let document = parse_record::<PostDocument>(&text)?;

        Ok(document.map(|document| document.into_entity(id.to_string())))
    }

    /// Posts whose `uid` equals `uid`. Filtered locally after a full list.
    #[tracing::instrument(skip(self))]
    pub async fn find_by_uid(&self, uid: &str) -> Response<Vec<PostEntity>> {
        let posts = self.find_all().await?;

        Ok(posts
            .into_iter()
            .filter(|post| post.is_authored_by(uid))
            .collect())
    }

    /// Stores `post` under a new store-generated key and returns that key
    /// when the store reports it. `post.id` is ignored and `created_at` is
    /// stamped with the current time when unset.
    #[tracing::instrument(skip(self, post), fields(uid = post.uid.as_str()))]
    pub async fn create(&self, post: PostEntity) -> Response<Option<String>> {
        let post = PostEntity {
            created_at: post.created_at.or_else(|| Some(Utc::now())),
            ..post
        };

        let url = self.client.collection_url(COLLECTION)?;
        let text = self
            .client
            .post(url, &PostDocument::from(&post))
            .await?;

        let id = parse_push_response(&text);
        info!(task = "create post", id = id.as_deref().unwrap_or_default());

        Ok(id)
    }

    /// Overwrites every field of the record at `post.id`.
    #[tracing::instrument(skip(self, post), fields(id = post.id.as_str()))]
    pub async fn replace(&self, post: PostEntity) -> Response<()> {
        let url = self.client.item_url(COLLECTION, &post.id)?;
        self.client.put(url, &PostDocument::from(&post)).await?;

        info!(task = "replace post", id = post.id.as_str());

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Response<()> {
        let url = self.client.item_url(COLLECTION, id)?;
        self.client.delete(url).await?;

        info!(task = "delete post", id);

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use entity::prelude::*;
    use reqwest::StatusCode;
    use serde_json::json;

    use crate::{testing::FakeStore, Repository, RepositoryError};

    fn post(caption: &str, image: &str, uid: &str) -> PostEntity {
        PostEntity {
            caption: caption.to_string(),
            image: image.to_string(),
            uid: uid.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_find_all_on_empty_store() {
        // Arrange
        let store = FakeStore::start().await;
        let repo = Repository::new(&store.base_url).unwrap();

        // Act
        let posts = repo.post.find_all().await.unwrap();

        // Assert
        assert!(posts.is_empty());
    }

    #[tokio::test]
    async fn test_create_then_find_by_id() {
        // Arrange
        let store = FakeStore::start().await;
        let repo = Repository::new(&store.base_url).unwrap();

        // Act
        let id = repo
            .post
            .create(post("Sunset", "https://x/y.jpg", "u1"))
            .await
            .unwrap()
            .unwrap();
        let found = repo.post.find_by_id(&id).await.unwrap().unwrap();

        // Assert
        assert_eq!(found.id, id);
        assert_eq!(found.caption, "Sunset");
        assert_eq!(found.image, "https://x/y.jpg");
        assert_eq!(found.uid, "u1");
        assert!(found.created_at.is_some());
    }

    #[tokio::test]
    async fn test_create_sends_wire_fields() {
        let store = FakeStore::start().await;
        let repo = Repository::new(&store.base_url).unwrap();

        let id = repo
            .post
            .create(post("Sunset", "https://x/y.jpg", "u1"))
            .await
            .unwrap()
            .unwrap();

        let stored = store.get("posts", &id).await.unwrap();
        let object = stored.as_object().unwrap();
        let mut keys: Vec<_> = object.keys().map(String::as_str).collect();
        keys.sort();
        assert_eq!(keys, vec!["caption", "createdAt", "image", "uid"]);
        assert!(object["createdAt"].as_str().unwrap().ends_with('Z'));
    }

    #[tokio::test]
    async fn test_create_with_empty_caption() {
        let store = FakeStore::start().await;
        let repo = Repository::new(&store.base_url).unwrap();

        let id = repo.post.create(post("", "", "u1")).await.unwrap().unwrap();
        let found = repo.post.find_by_id(&id).await.unwrap().unwrap();

        assert_eq!(found.caption, "");
    }

    #[tokio::test]
    async fn test_delete_then_find_by_id() {
        // Arrange
        let store = FakeStore::start().await;
        let repo = Repository::new(&store.base_url).unwrap();
        let id = repo
            .post
            .create(post("Sunset", "https://x/y.jpg", "u1"))
            .await
            .unwrap()
            .unwrap();

        // Act
        repo.post.delete(&id).await.unwrap();

        // Assert
        assert_eq!(repo.post.find_by_id(&id).await.unwrap(), None);
        assert!(repo.post.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_then_get_every_id() {
        // Arrange
        let store = FakeStore::start().await;
        let repo = Repository::new(&store.base_url).unwrap();
        for caption in ["a", "b", "c"] {
            repo.post.create(post(caption, "", "u1")).await.unwrap();
        }
        store.insert("posts", "legacy", json!({"caption": "old"})).await;

        // Act
        let posts = repo.post.find_all().await.unwrap();

        // Assert
        assert_eq!(posts.len(), 4);
        for listed in posts {
            let found = repo.post.find_by_id(&listed.id).await.unwrap();
            assert_eq!(found, Some(listed));
        }
    }

    #[tokio::test]
    async fn test_replace_overwrites_fields() {
        // Arrange
        let store = FakeStore::start().await;
        let repo = Repository::new(&store.base_url).unwrap();
        let id = repo
            .post
            .create(post("Sunset", "https://x/y.jpg", "u1"))
            .await
            .unwrap()
            .unwrap();
        let mut existing = repo.post.find_by_id(&id).await.unwrap().unwrap();

        // Act
        existing.caption = "Sunrise".to_string();
        repo.post.replace(existing.clone()).await.unwrap();

        // Assert
        let found = repo.post.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(found, existing);
    }

    #[tokio::test]
    async fn test_find_by_uid() {
        let store = FakeStore::start().await;
        let repo = Repository::new(&store.base_url).unwrap();
        repo.post.create(post("mine", "", "u1")).await.unwrap();
        repo.post.create(post("theirs", "", "u2")).await.unwrap();

        let posts = repo.post.find_by_uid("u1").await.unwrap();

        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].caption, "mine");
    }

    #[tokio::test]
    async fn test_wrong_typed_fields_read_as_absent() {
        // Arrange
        let store = FakeStore::start().await;
        let repo = Repository::new(&store.base_url).unwrap();
        store
            .insert(
                "posts",
                "-Na",
                json!({"caption": "Sunset", "createdAt": 1714555800000_i64, "uid": 7}),
            )
            .await;

        // Act
        let listed = repo.post.find_all().await.unwrap();
        let found = repo.post.find_by_id("-Na").await.unwrap().unwrap();

        // Assert
        assert_eq!(listed, vec![found.clone()]);
        assert_eq!(found.caption, "Sunset");
        assert_eq!(found.uid, "");
        assert_eq!(
            found.created_at.map(|at| at.timestamp_millis()),
            Some(1714555800000)
        );
    }

    #[tokio::test]
    async fn test_failed_status_is_reported() {
        // Arrange
        let store = FakeStore::start().await;
        let repo = Repository::new(&store.base_url).unwrap();
        store.fail_with(StatusCode::UNAUTHORIZED).await;

        // Act
        let result = repo.post.create(post("Sunset", "", "u1")).await;

        // Assert
        let err = result.unwrap_err();
        assert_eq!(err.status_code(), Some(StatusCode::UNAUTHORIZED));
        assert!(matches!(err, RepositoryError::FailedStatusCode { .. }));
    }

    #[tokio::test]
    async fn test_transport_failure_is_reported() {
        let store = FakeStore::start().await;
        let base_url = store.base_url.clone();
        store.stop().await;
        let repo = Repository::new(&base_url).unwrap();

        let result = repo.post.find_all().await;

        assert!(matches!(result, Err(RepositoryError::ReqwestError { .. })));
    }

    #[tokio::test]
    async fn test_invalid_id_issues_no_request() {
        let store = FakeStore::start().await;
        let repo = Repository::new(&store.base_url).unwrap();

        let result = repo.post.delete("../users").await;

        assert!(matches!(result, Err(RepositoryError::InvalidId { .. })));
        assert_eq!(store.request_count().await, 0);
    }
}
