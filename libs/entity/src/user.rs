#[derive(Debug, Default, PartialEq, Clone)]
pub struct User {
    pub id: String,
    pub name: String,
    pub title: String,
    pub image: String,
}

impl User {
    pub fn has_image(&self) -> bool {
        !self.image.trim().is_empty()
    }
}
