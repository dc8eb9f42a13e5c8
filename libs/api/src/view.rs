use axum::response::Html;
use once_cell::sync::OnceCell;
use tera::{Context, Tera};
use tracing::error;

use crate::{response::ApiResponse, ApiError};

/// Shown in the form preview while the image field is empty.
pub(crate) const IMAGE_PLACEHOLDER: &str =
    "https://placehold.co/600x400.webp?text=Paste+image+URL";

/// Avatar for authors without an image or that no longer exist.
pub(crate) const DEFAULT_AVATAR: &str =
    "https://placehold.co/80x80.webp?text=User";

const TEMPLATES: [(&str, &str); 10] = [
    ("base.html", include_str!("../templates/base.html")),
    ("home.html", include_str!("../templates/home.html")),
    ("error.html", include_str!("../templates/error.html")),
    ("post_card.html", include_str!("../templates/post_card.html")),
    ("posts/list.html", include_str!("../templates/posts/list.html")),
    ("posts/detail.html", include_str!("../templates/posts/detail.html")),
    ("posts/form.html", include_str!("../templates/posts/form.html")),
    ("users/list.html", include_str!("../templates/users/list.html")),
    ("users/detail.html", include_str!("../templates/users/detail.html")),
    ("users/form.html", include_str!("../templates/users/form.html")),
];

static TERA: OnceCell<Tera> = OnceCell::new();

fn tera() -> &'static Tera {
    TERA.get_or_init(|| {
        let mut tera = Tera::default();
        if let Err(e) = tera.add_raw_templates(TEMPLATES) {
            error!(task = "load templates", err = ?e);
        }
        tera
    })
}

/// Context with the navigation entry to highlight.
pub(crate) fn context(nav: &str) -> Context {
    let mut context = Context::new();
    context.insert("nav", nav);
    context
}

pub(crate) fn render(name: &str, context: &Context) -> ApiResponse<Html<String>> {
    render_raw(name, context).map(Html).map_err(|e| {
        ApiError::ServerError(format!("failed to render {name}: {e}"))
    })
}

/// Like [`render`] but without the [`ApiError`] wrapping, for rendering
/// the error page itself.
pub(crate) fn render_raw(
    name: &str,
    context: &Context,
) -> Result<String, tera::Error> {
    tera().render(name, context).inspect_err(|e| {
        error!(task = "render", template = name, err = ?e);
    })
}

/// Either an image URL or `fallback` when it is blank.
pub(crate) fn image_or<'a>(image: &'a str, fallback: &'a str) -> &'a str {
    if image.trim().is_empty() {
        fallback
    } else {
        image
    }
}
