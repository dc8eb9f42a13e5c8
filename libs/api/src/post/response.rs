use entity::prelude::*;
use serde::Serialize;

use crate::view::{image_or, DEFAULT_AVATAR};

#[derive(Serialize, Debug, Default)]
pub struct PostCard {
    pub id: String,
    pub caption: String,
    pub image: String,
    pub created_at: String,
    pub author: AuthorResp,
}

#[derive(Serialize, Debug, Default)]
pub struct AuthorResp {
    pub uid: String,
    pub name: String,
    pub title: String,
    pub avatar: String,
    pub alt: String,
}

impl PostCard {
    pub fn new(post: PostEntity, author: Option<&UserEntity>) -> Self {
        Self {
            created_at: post
                .created_at
                .map(|at| at.format("%Y-%m-%d %H:%M UTC").to_string())
                .unwrap_or_default(),
            author: AuthorResp::new(post.uid, author),
            id: post.id,
            caption: post.caption,
            image: post.image,
        }
    }
}

impl AuthorResp {
    fn new(uid: String, user: Option<&UserEntity>) -> Self {
        let Some(user) = user else {
            return Self {
                uid,
                avatar: DEFAULT_AVATAR.to_string(),
                alt: "Default avatar".to_string(),
                ..Default::default()
            };
        };

        Self {
            uid,
            name: user.name.clone(),
            title: user.title.clone(),
            avatar: image_or(&user.image, DEFAULT_AVATAR).to_string(),
            alt: if user.name.is_empty() {
                "User".to_string()
            } else {
                user.name.clone()
            },
        }
    }
}
