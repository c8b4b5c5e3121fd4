/// Image retrieval handler
use actix_web::{http::header, web, HttpResponse};

use crate::db::PostId;
use crate::error::{AppError, Result};
use crate::imaging;
use crate::AppState;

/// Return the stored bytes of a post's image.
///
/// The content type follows the stored file name's extension; unknown
/// extensions are served without one.
pub async fn get_image(state: web::Data<AppState>, id: web::Path<i64>) -> Result<HttpResponse> {
    let id = PostId(id.into_inner());

    let stored = state
        .store
        .get_post_image(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("post {}", id)))?;

    let mut response = HttpResponse::Ok();
    if let Some(content_type) = imaging::content_type_for(&stored.file_name) {
        response.insert_header((header::CONTENT_TYPE, content_type));
    }

    Ok(response.body(stored.image))
}
