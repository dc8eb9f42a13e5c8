use std::collections::{BTreeSet, HashMap};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use entity::prelude::*;
use futures::future::join_all;
use repository::Repository;
use tracing::warn;

pub mod request;
pub mod response;

use crate::{
    auth::Author,
    response::{missing_on_invalid_id, ApiResponse, IntoApiResponse},
    view::{self, image_or, IMAGE_PLACEHOLDER},
    ApiError, ApiState,
};

use self::{request::PostForm, response::PostCard};

/// List all posts
pub async fn get_posts(
    State(state): State<ApiState>,
) -> ApiResponse<Html<String>> {
    let posts = state.repo.post.find_all().await.into_response("502-001")?;

    let cards = into_cards(&state.repo, posts).await;

    let mut context = view::context("posts");
    context.insert("posts", &cards);

    view::render("posts/list.html", &context)
}

/// Show a post, or a not-found page when the id is unknown
pub async fn get_post(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResponse<Response> {
    let post = missing_on_invalid_id(state.repo.post.find_by_id(&id).await)
        .into_response("502-002")?;

    let Some(post) = post else {
        let mut context = view::context("posts");
        context.insert(
            "card",
            &PostCard {
                id,
                ..Default::default()
            },
        );
        context.insert("found", &false);

        let html = view::render("posts/detail.html", &context)?;
        return Ok((StatusCode::NOT_FOUND, html).into_response());
    };

    let author = find_author(&state.repo, &post.uid).await;

    let mut context = view::context("posts");
    context.insert("card", &PostCard::new(post, author.as_ref()));
    context.insert("found", &true);

    Ok(view::render("posts/detail.html", &context)?.into_response())
}

pub async fn get_create_form() -> ApiResponse<Html<String>> {
    render_form("create-post", "Create New Post", "/posts/create", None)
}

/// Create a post authored by the requesting user
pub async fn create_post(
    State(state): State<ApiState>,
    author: Author,
    Form(form): Form<PostForm>,
) -> ApiResponse<Redirect> {
    let post = PostEntity {
        caption: form.caption,
        image: form.image,
        uid: author.uid,
        ..Default::default()
    };

    state.repo.post.create(post).await.into_response("502-003")?;

    Ok(Redirect::to("/posts"))
}

/// Delete a post; no confirmation and nothing else is touched
pub async fn delete_post(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResponse<Redirect> {
    state.repo.post.delete(&id).await.into_response("502-005")?;

    Ok(Redirect::to("/posts"))
}

pub async fn get_update_form(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResponse<Html<String>> {
    let post = find_existing(&state.repo, &id, "502-002").await?;

    render_form(
        "posts",
        "Update Post",
        &format!("/posts/{}/update", urlencoding::encode(&id)),
        Some(PostForm {
            caption: post.caption,
            image: post.image,
        }),
    )
}

/// Replace caption and image, keeping author and creation time
pub async fn update_post(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Form(form): Form<PostForm>,
) -> ApiResponse<Redirect> {
    let existing = find_existing(&state.repo, &id, "502-004").await?;

    let post = PostEntity {
        caption: form.caption,
        image: form.image,
        ..existing
    };

    state.repo.post.replace(post).await.into_response("502-004")?;

    Ok(Redirect::to(&format!("/posts/{}", urlencoding::encode(&id))))
}

async fn find_existing(
    repo: &Repository,
    id: &str,
    error_code: &str,
) -> ApiResponse<PostEntity> {
    missing_on_invalid_id(repo.post.find_by_id(id).await)
        .into_response(error_code)?
        .ok_or_else(|| {
            ApiError::NotFound(format!("There is no post with id {id:?}."))
        })
}

fn render_form(
    nav: &str,
    heading: &str,
    action: &str,
    form: Option<PostForm>,
) -> ApiResponse<Html<String>> {
    let form = form.unwrap_or_default();

    let mut context = view::context(nav);
    context.insert("heading", heading);
    context.insert("action", action);
    context.insert("preview", image_or(&form.image, IMAGE_PLACEHOLDER));
    context.insert(
        "submit",
        if form.caption.is_empty() {
            "Create"
        } else {
            "Update"
        },
    );
    context.insert("form", &form);

    view::render("posts/form.html", &context)
}

/// Cards for `posts`, each with its author looked up once per distinct uid.
pub(crate) async fn into_cards(
    repo: &Repository,
    posts: Vec<PostEntity>,
) -> Vec<PostCard> {
    let authors = find_authors(repo, &posts).await;

    posts
        .into_iter()
        .map(|post| {
            let author = authors.get(&post.uid).and_then(Option::as_ref);
            PostCard::new(post, author)
        })
        .collect()
}

async fn find_authors(
    repo: &Repository,
    posts: &[PostEntity],
) -> HashMap<String, Option<UserEntity>> {
    let uids: BTreeSet<&str> = posts
        .iter()
        .map(|post| post.uid.as_str())
        .filter(|uid| !uid.is_empty())
        .collect();

    let lookups = uids.into_iter().map(|uid| async move {
        (uid.to_string(), find_author(repo, uid).await)
    });

    join_all(lookups).await.into_iter().collect()
}

/// A failed lookup only costs the avatar, so it is logged and dropped.
async fn find_author(repo: &Repository, uid: &str) -> Option<UserEntity> {
    if uid.is_empty() {
        return None;
    }

    match repo.user.find_by_id(uid).await {
        Ok(user) => user,
        Err(e) => {
            warn!(task = "find author", uid, err = e.to_string());
            None
        }
    }
}
