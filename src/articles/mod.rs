pub(crate) mod dto;
pub mod handlers;
pub mod preview;
pub mod repo;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::home))
        .route("/search", get(handlers::search_articles))
        .route("/articles", post(handlers::create_article))
        .route(
            "/articles/:id",
            get(handlers::article_detail)
                .post(handlers::post_comment)
                .put(handlers::update_article)
                .delete(handlers::delete_article),
        )
}
