use chrono::{DateTime, Utc};

#[derive(Debug, Default, PartialEq, Clone)]
pub struct Post {
    pub id: String,
    pub caption: String,
    pub image: String,
    /// Author's user id. Not checked against the users collection.
    pub uid: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl Post {
    pub fn is_authored_by(&self, uid: &str) -> bool {
        !uid.is_empty() && self.uid == uid
    }
}
