/// Landing page handler
use actix_web::{web, HttpResponse};

use crate::error::Result;
use crate::AppState;

/// Serve the landing page.
///
/// The view bump is queued before the page is read and is never awaited.
pub async fn index(state: web::Data<AppState>) -> Result<HttpResponse> {
    state.view_counter.bump();

    let page = tokio::fs::read(&state.config.app.index_path).await?;

    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(page))
}
