use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    articles::dto::ArticleSummary,
    articles::repo as articles_repo,
    auth::jwt::AuthUser,
    categories::repo::{self, Category},
    error::{ApiError, ValidationErrors},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CategoryInput {
    pub name: String,
}

impl CategoryInput {
    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::default();
        if self.name.trim().is_empty() {
            errors.add("name", "This field is required");
        }
        errors
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryArticles {
    pub category: Category,
    pub articles: Vec<ArticleSummary>,
}

#[instrument(skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, ApiError> {
    let categories = repo::list_all(&state.db).await?;
    Ok(Json(categories))
}

#[instrument(skip(state, payload))]
pub async fn create_category(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CategoryInput>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    payload.validate().into_result()?;
    let category = repo::create(&state.db, payload.name.trim()).await?;
    info!(category_id = %category.id, %user_id, "category created");
    Ok((StatusCode::CREATED, Json(category)))
}

/// GET /categories/:id/articles: 404 when the category id is unknown,
/// otherwise every article carrying it.
#[instrument(skip(state))]
pub async fn articles_by_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CategoryArticles>, ApiError> {
    let category = repo::find(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Category not found"))?;
    let articles = articles_repo::list_by_category(&state.db, id).await?;
    Ok(Json(CategoryArticles {
        category,
        articles: articles.into_iter().map(Into::into).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_name_is_required() {
        let blank = CategoryInput { name: "  ".into() };
        assert!(!blank.validate().is_empty());
        let ok = CategoryInput { name: "Politics".into() };
        assert!(ok.validate().is_empty());
    }
}
