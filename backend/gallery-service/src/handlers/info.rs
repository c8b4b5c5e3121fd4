use actix_web::{web, HttpResponse};

use crate::error::Result;
use crate::models::InfoResponse;
use crate::AppState;

/// Post count and page views; views are zero until the first bump lands.
pub async fn get_info(state: web::Data<AppState>) -> Result<HttpResponse> {
    let posts = state.store.count_posts().await?;
    let views = state.store.read_view_counter().await?.unwrap_or(0);

    Ok(HttpResponse::Ok().json(InfoResponse { posts, views }))
}
