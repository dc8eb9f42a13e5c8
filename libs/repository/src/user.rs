use entity::prelude::*;
use tracing::info;

use crate::{
    client::Client,
    document::{
        parse_collection, parse_push_response, parse_record, UserDocument,
    },
    response::Response,
};

const COLLECTION: &str = "users";

#[derive(Clone, Debug)]
pub struct UserRepository {
    client: Client,
}

impl UserRepository {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }
}

impl UserRepository {
    #[tracing::instrument(skip(self))]
    pub async fn find_all(&self) -> Response<Vec<UserEntity>> {
        let url = self.client.collection_url(COLLECTION)?;
        let text = self.client.get(url).await?;

        Ok(parse_collection::<UserDocument>(COLLECTION, &text)
            .into_iter()
            .map(|(id, document)| document.into_entity(id))
            .collect())
    }

    #[tracing::instrument(skip(self))]
    pub async fn find_by_id(&self, id: &str) -> Response<Option<UserEntity>> {
        let url = self.client.item_url(COLLECTION, id)?;
        let text = self.client.get(url).await?;

        let document = parse_record::<UserDocument>(&text)?;

        Ok(document.map(|document| document.into_entity(id.to_string())))
    }

    #[tracing::instrument(skip(self, user))]
    pub async fn create(&self, user: UserEntity) -> Response<Option<String>> {
        let url = self.client.collection_url(COLLECTION)?;
        let text = self
            .client
            .post(url, &UserDocument::from(&user))
            .await?;

        let id = parse_push_response(&text);
        info!(task = "create user", id = id.as_deref().unwrap_or_default());

        Ok(id)
    }

    /// Writes `user` at `user.id`, creating the record if absent. Used both
    /// for edits and for users whose id is fixed by an external provider.
    #[tracing::instrument(skip(self, user), fields(id = user.id.as_str()))]
    pub async fn replace(&self, user: UserEntity) -> Response<()> {
        let url = self.client.item_url(COLLECTION, &user.id)?;
        self.client.put(url, &UserDocument::from(&user)).await?;

        info!(task = "replace user", id = user.id.as_str());

        Ok(())
    }

    /// Removes the user only. Posts referencing it are left in place.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Response<()> {
        let url = self.client.item_url(COLLECTION, id)?;
        self.client.delete(url).await?;

        info!(task = "delete user", id);

        Ok(())
    }
}
