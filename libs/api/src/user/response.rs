use entity::prelude::*;
use serde::Serialize;

use crate::view::DEFAULT_AVATAR;

#[derive(Serialize, Debug, Default)]
pub struct UserResp {
    pub id: String,
    pub name: String,
    pub title: String,
    pub image: String,
    pub avatar: String,
}

impl From<UserEntity> for UserResp {
    fn from(value: UserEntity) -> Self {
        Self {
            avatar: if value.has_image() {
                value.image.clone()
            } else {
                DEFAULT_AVATAR.to_string()
            },
            id: value.id,
            name: value.name,
            title: value.title,
            image: value.image,
        }
    }
}
