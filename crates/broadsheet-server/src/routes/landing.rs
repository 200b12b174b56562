use axum::{
    extract::Path,
    http::header,
    response::{Html, IntoResponse},
};
use include_dir::{include_dir, Dir};

use crate::error::AppError;

static STATIC_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/static");

/// `GET /` — the submission form.
pub async fn index() -> Result<Html<&'static str>, AppError> {
    STATIC_DIR
        .get_file("index.html")
        .and_then(|f| f.contents_utf8())
        .map(Html)
        .ok_or_else(|| AppError::NotFound("index.html".to_string()))
}

/// `GET /static/{*path}` — assets bundled with the form.
pub async fn asset(Path(path): Path<String>) -> Result<impl IntoResponse, AppError> {
    let file = STATIC_DIR
        .get_file(&path)
        .ok_or_else(|| AppError::NotFound(path.clone()))?;
    Ok(([(header::CONTENT_TYPE, content_type(&path))], file.contents()))
}

fn content_type(path: &str) -> &'static str {
    match path.rsplit('.').next() {
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "application/javascript",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}
