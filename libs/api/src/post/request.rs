use serde::{Deserialize, Serialize};

/// Fields submitted by the post form. Nothing is validated: blank fields
/// are stored as empty strings.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct PostForm {
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub image: String,
}
