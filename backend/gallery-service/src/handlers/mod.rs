/// HTTP handlers for gallery endpoints
///
/// - `GET /`: landing page, bumps the view counter
/// - `GET /export`: CSV of post titles and file names
/// - `GET /images/{id}`: raw image bytes
/// - `GET /api/info`: post and view totals
/// - `GET|POST /api/posts/`: list posts, upload a post
use actix_web::{web, HttpResponse};

pub mod export;
pub mod images;
pub mod index;
pub mod info;
pub mod posts;

pub use export::export_csv;
pub use images::get_image;
pub use index::index;
pub use info::get_info;
pub use posts::{create_post, list_posts};

/// Register every route on `cfg`
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route(
            "/health",
            web::get().to(|| async { HttpResponse::Ok().json(serde_json::json!({"status": "ok"})) }),
        )
        .route("/export", web::get().to(export_csv))
        .route("/images/{id:[1-9][0-9]*}", web::get().to(get_image))
        .service(
            web::scope("/api")
                .route("/info", web::get().to(get_info))
                .route("/posts/", web::get().to(list_posts))
                .route("/posts/", web::post().to(create_post)),
        );
}
