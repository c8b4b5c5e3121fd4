/// Post handlers - listing and multipart upload
use actix_multipart::{Field, Multipart};
use actix_web::http::header::{self, ContentDisposition};
use actix_web::{web, HttpRequest, HttpResponse};
use bytes::{Bytes, BytesMut};
use futures::StreamExt;

use crate::error::{AppError, Result};
use crate::models::PostResponse;
use crate::upload::{check_declared_length, check_file_size, UploadCandidate, UploadLimits};
use crate::AppState;

/// Titles longer than this are refused outright
const MAX_TITLE_BYTES: usize = 64 * 1024;

/// List all posts, newest first
pub async fn list_posts(state: web::Data<AppState>) -> Result<HttpResponse> {
    let posts: Vec<PostResponse> = state
        .store
        .list_posts()
        .await?
        .into_iter()
        .map(PostResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(posts))
}

/// Upload a post from a multipart form with `title` and `image` fields.
///
/// Responds with the new post id as a bare JSON value.
pub async fn create_post(
    req: HttpRequest,
    state: web::Data<AppState>,
    mut payload: Multipart,
) -> Result<HttpResponse> {
    let limits = state.ingestor.limits();

    // Cheap pre-filter before any of the body is read
    let declared_length = declared_content_length(&req);
    check_declared_length(declared_length, limits)?;

    let mut title = String::new();
    let mut image: Option<(String, Bytes)> = None;

    while let Some(field) = payload.next().await {
        let mut field =
            field.map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {}", e)))?;

        let disposition = field_disposition(&field);
        let name = disposition
            .as_ref()
            .and_then(|cd| cd.get_name())
            .unwrap_or_default();

        match name {
            "title" => title = read_title(&mut field).await?,
            "image" if image.is_none() => {
                let file_name = disposition
                    .as_ref()
                    .and_then(|cd| cd.get_filename())
                    .unwrap_or_default()
                    .to_string();
                let bytes = read_file(&mut field, limits).await?;
                image = Some((file_name, bytes));
            }
            _ => drain(&mut field).await?,
        }
    }

    let (file_name, raw_bytes) =
        image.ok_or_else(|| AppError::BadRequest("missing image field".to_string()))?;

    let candidate =
        UploadCandidate::new(title, file_name, raw_bytes).with_declared_length(declared_length);
    let id = state.ingestor.ingest(candidate).await?;

    Ok(HttpResponse::Ok().json(id))
}

fn declared_content_length(req: &HttpRequest) -> Option<u64> {
    req.headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

fn field_disposition(field: &Field) -> Option<ContentDisposition> {
    field
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|v| ContentDisposition::from_raw(v).ok())
}

async fn read_title(field: &mut Field) -> Result<String> {
    let mut buf = BytesMut::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| AppError::BadRequest(format!("Title read error: {}", e)))?;
        if buf.len() + chunk.len() > MAX_TITLE_BYTES {
            return Err(AppError::BadRequest(format!(
                "title must be at most {} bytes",
                MAX_TITLE_BYTES
            )));
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Buffer the file part, stopping as soon as it reaches the file size cap.
async fn read_file(field: &mut Field, limits: &UploadLimits) -> Result<Bytes> {
    let mut buf = BytesMut::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| AppError::BadRequest(format!("Image read error: {}", e)))?;
        check_file_size((buf.len() + chunk.len()) as u64, limits)?;
        buf.extend_from_slice(&chunk);
    }
    Ok(buf.freeze())
}

async fn drain(field: &mut Field) -> Result<()> {
    while let Some(chunk) = field.next().await {
        chunk.map_err(|e| AppError::BadRequest(format!("Multipart error: {}", e)))?;
    }
    Ok(())
}
