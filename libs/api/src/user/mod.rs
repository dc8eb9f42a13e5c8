use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use entity::prelude::*;
use repository::Repository;

pub mod request;
pub mod response;

use crate::{
    post::response::PostCard,
    response::{missing_on_invalid_id, ApiResponse, IntoApiResponse},
    view::{self, image_or, IMAGE_PLACEHOLDER},
    ApiError, ApiState,
};

use self::{request::UserForm, response::UserResp};

/// List all users
pub async fn get_users(
    State(state): State<ApiState>,
) -> ApiResponse<Html<String>> {
    let users = state.repo.user.find_all().await.into_response("502-006")?;

    let users: Vec<UserResp> = users.into_iter().map(UserResp::from).collect();

    let mut context = view::context("users");
    context.insert("users", &users);

    view::render("users/list.html", &context)
}

/// Show a user with their posts. An unknown id still renders the page,
/// with empty fields and a 404 status.
pub async fn get_user(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResponse<Response> {
    let user = missing_on_invalid_id(state.repo.user.find_by_id(&id).await)
        .into_response("502-007")?;

    let Some(user) = user else {
        let mut context = view::context("users");
        context.insert(
            "user",
            &UserResp {
                id,
                ..Default::default()
            },
        );
        context.insert("posts", &Vec::<PostCard>::new());
        context.insert("found", &false);

        let html = view::render("users/detail.html", &context)?;
        return Ok((StatusCode::NOT_FOUND, html).into_response());
    };

    let posts = state
        .repo
        .post
        .find_by_uid(&user.id)
        .await
        .into_response("502-001")?;
    let cards: Vec<PostCard> = posts
        .into_iter()
        .map(|post| PostCard::new(post, Some(&user)))
        .collect();

    let mut context = view::context("users");
    context.insert("user", &UserResp::from(user));
    context.insert("posts", &cards);
    context.insert("found", &true);

    Ok(view::render("users/detail.html", &context)?.into_response())
}

pub async fn get_create_form() -> ApiResponse<Html<String>> {
    render_form("create-user", "Create New User", "/users/create", None)
}

pub async fn create_user(
    State(state): State<ApiState>,
    Form(form): Form<UserForm>,
) -> ApiResponse<Redirect> {
    let user = UserEntity {
        name: form.name,
        title: form.title,
        image: form.image,
        ..Default::default()
    };

    state.repo.user.create(user).await.into_response("502-008")?;

    Ok(Redirect::to("/users"))
}

/// Delete a user. Their posts stay and fall back to the default avatar.
pub async fn delete_user(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResponse<Redirect> {
    state.repo.user.delete(&id).await.into_response("502-010")?;

    Ok(Redirect::to("/users"))
}

pub async fn get_update_form(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResponse<Html<String>> {
    let user = find_existing(&state.repo, &id, "502-007").await?;

    render_form(
        "users",
        "Update User",
        &format!("/users/{}/update", urlencoding::encode(&id)),
        Some(UserForm {
            name: user.name,
            title: user.title,
            image: user.image,
        }),
    )
}

pub async fn update_user(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Form(form): Form<UserForm>,
) -> ApiResponse<Redirect> {
    let existing = find_existing(&state.repo, &id, "502-009").await?;

    let user = UserEntity {
        name: form.name,
        title: form.title,
        image: form.image,
        ..existing
    };

    state.repo.user.replace(user).await.into_response("502-009")?;

    Ok(Redirect::to(&format!("/users/{}", urlencoding::encode(&id))))
}

async fn find_existing(
    repo: &Repository,
    id: &str,
    error_code: &str,
) -> ApiResponse<UserEntity> {
    missing_on_invalid_id(repo.user.find_by_id(id).await)
        .into_response(error_code)?
        .ok_or_else(|| {
            ApiError::NotFound(format!("There is no user with id {id:?}."))
        })
}

fn render_form(
    nav: &str,
    heading: &str,
    action: &str,
    form: Option<UserForm>,
) -> ApiResponse<Html<String>> {
    let editing = form.is_some();
    let form = form.unwrap_or_default();

    let mut context = view::context(nav);
    context.insert("heading", heading);
    context.insert("action", action);
    context.insert("preview", image_or(&form.image, IMAGE_PLACEHOLDER));
    context.insert("submit", if editing { "Update" } else { "Create" });
    context.insert("form", &form);

    view::render("users/form.html", &context)
}

#[cfg(test)]
mod test {
    use axum::http::StatusCode;
    use repository::testing::FakeStore;
    use serde_json::json;
    use tower::ServiceExt;

    use crate::test_util::{app, body_text, form, get, location};

    #[tokio::test]
    async fn test_get_users() {
        // Arrange
        let store = FakeStore::start().await;
        store.insert("users", "u1", json!({"name": "Ada"})).await;
        store.insert("users", "u2", json!({"name": "Grace"})).await;

        // Act
        let response = app(&store, None).oneshot(get("/users")).await.unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("Ada"));
        assert!(body.contains("Grace"));
        assert!(body.contains("href=\"/users/u1\""));
    }

    #[tokio::test]
    async fn test_get_users_with_empty_store() {
        let store = FakeStore::start().await;

        let response = app(&store, None).oneshot(get("/users")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("No users yet"));
    }

    #[tokio::test]
    async fn test_get_missing_user_renders_empty_page() {
        let store = FakeStore::start().await;

        let response =
            app(&store, None).oneshot(get("/users/nobody")).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_text(response).await;
        assert!(body.contains("User not found."));
        assert!(body.contains("<h3></h3>"));
        assert!(!body.contains("<img"));
    }

    #[tokio::test]
    async fn test_get_user_lists_their_posts() {
        // Arrange
        let store = FakeStore::start().await;
        store
            .insert("users", "u1", json!({"name": "Ada", "title": "Engineer"}))
            .await;
        store
            .insert("posts", "p1", json!({"caption": "Mine", "uid": "u1"}))
            .await;
        store
            .insert("posts", "p2", json!({"caption": "Theirs", "uid": "u2"}))
            .await;

        // Act
        let response =
            app(&store, None).oneshot(get("/users/u1")).await.unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("<h3>Ada</h3>"));
        assert!(body.contains("Mine"));
        assert!(!body.contains("Theirs"));
    }

    #[tokio::test]
    async fn test_create_user() {
        let store = FakeStore::start().await;

        let response = app(&store, None)
            .oneshot(form("/users/create", "name=Ada&title=Engineer"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/users");
        let stored = store.get("users", "-N00000000").await.unwrap();
        assert_eq!(
            stored,
            json!({"name": "Ada", "title": "Engineer", "image": ""})
        );
    }

    #[tokio::test]
    async fn test_update_user() {
        // Arrange
        let store = FakeStore::start().await;
        store
            .insert("users", "u1", json!({"name": "Ada", "title": "Engineer"}))
            .await;

        // Act
        let response = app(&store, None)
            .oneshot(form("/users/u1/update", "name=Ada+L&title=Countess"))
            .await
            .unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/users/u1");
        let stored = store.get("users", "u1").await.unwrap();
        assert_eq!(stored["name"], "Ada L");
        assert_eq!(stored["title"], "Countess");
    }

    #[tokio::test]
    async fn test_delete_user_keeps_posts() {
        let store = FakeStore::start().await;
        store.insert("users", "u1", json!({"name": "Ada"})).await;
        store
            .insert("posts", "p1", json!({"caption": "Mine", "uid": "u1"}))
            .await;

        let response = app(&store, None)
            .oneshot(form("/users/u1/delete", ""))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(store.get("users", "u1").await, None);
        assert!(store.get("posts", "p1").await.is_some());
    }

    #[tokio::test]
    async fn test_delete_failure_blocks_redirect() {
        let store = FakeStore::start().await;
        store.fail_with(StatusCode::SERVICE_UNAVAILABLE).await;

        let response = app(&store, None)
            .oneshot(form("/users/u1/delete", ""))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(body_text(response).await.contains("503 Service Unavailable"));
    }
}
