use axum::response::Html;

use crate::{response::ApiResponse, view};

pub(super) async fn get_home() -> ApiResponse<Html<String>> {
    view::render("home.html", &view::context("home"))
}
