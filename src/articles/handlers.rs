use axum::{
    extract::{Path, Query, State},
    http::{header::LOCATION, HeaderMap, StatusCode},
    Json,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    articles::{
        dto::{
            ArticleDetails, ArticleInput, ArticleSavedResponse, ArticleSummary,
            CommentCreatedResponse, CommentInput, MessageResponse, SearchParams, SearchResults,
        },
        preview::resolve_preview,
        repo,
    },
    auth::jwt::AuthUser,
    error::{ApiError, ValidationErrors},
    state::AppState,
};

fn detail_location(id: Uuid) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Ok(value) = format!("/articles/{id}").parse() {
        headers.insert(LOCATION, value);
    }
    headers
}

/// Unknown category ids fail validation before anything is written.
async fn check_categories(state: &AppState, ids: &[Uuid]) -> Result<(), ApiError> {
    let missing = repo::missing_categories(&state.db, ids).await?;
    if missing.is_empty() {
        return Ok(());
    }
    let mut errors = ValidationErrors::default();
    for id in missing {
        errors.add("categories", format!("Unknown category: {id}"));
    }
    errors.into_result()
}

/// GET /: every article, storage order, no pagination.
#[instrument(skip(state))]
pub async fn home(
    State(state): State<AppState>,
) -> Result<Json<Vec<ArticleSummary>>, ApiError> {
    let articles = repo::list_all(&state.db).await?;
    Ok(Json(articles.into_iter().map(Into::into).collect()))
}

/// GET /articles/:id returns the article, its categories and its comments.
#[instrument(skip(state))]
pub async fn article_detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ArticleDetails>, ApiError> {
    let article = repo::find(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Article not found"))?;
    let categories = repo::categories_of(&state.db, id).await?;
    let comments = repo::comments_of(&state.db, id).await?;

    Ok(Json(ArticleDetails {
        id: article.id,
        title: article.title,
        content: article.content,
        preview: article.preview,
        author_id: article.author_id,
        author: article.author,
        categories,
        created_at: article.created_at,
        updated_at: article.updated_at,
        comments: comments.into_iter().map(Into::into).collect(),
    }))
}

/// POST /articles/:id attaches a comment to the article as the
/// authenticated user. Location points back at the detail route, so a
/// client following it refreshes without resubmitting.
#[instrument(skip(state, payload))]
pub async fn post_comment(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CommentInput>,
) -> Result<(StatusCode, HeaderMap, Json<CommentCreatedResponse>), ApiError> {
    repo::find(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Article not found"))?;

    payload.validate().into_result()?;

    let comment = repo::insert_comment(&state.db, id, user_id, &payload.content).await?;
    info!(article_id = %id, comment_id = %comment.id, %user_id, "comment added");

    Ok((
        StatusCode::CREATED,
        detail_location(id),
        Json(CommentCreatedResponse {
            message: "Your comment has been added!".into(),
            comment: comment.into(),
        }),
    ))
}

/// POST /articles creates an article authored by the authenticated user.
#[instrument(skip(state, payload))]
pub async fn create_article(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<ArticleInput>,
) -> Result<(StatusCode, HeaderMap, Json<ArticleSavedResponse>), ApiError> {
    payload.validate().into_result()?;
    check_categories(&state, &payload.categories).await?;

    let preview = resolve_preview(payload.preview.as_deref(), None, &payload.content);
    let id = repo::create(
        &state.db,
        user_id,
        &payload.title,
        &payload.content,
        &preview,
        &payload.categories,
    )
    .await?;
    info!(article_id = %id, %user_id, "article created");

    Ok((
        StatusCode::CREATED,
        detail_location(id),
        Json(ArticleSavedResponse {
            id,
            preview,
            message: "Your article has been created!".into(),
        }),
    ))
}

/// PUT /articles/:id, author-only edit. Authorship stays with the original
/// author; see DESIGN.md for the divergence from the source flow.
#[instrument(skip(state, payload))]
pub async fn update_article(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ArticleInput>,
) -> Result<(HeaderMap, Json<ArticleSavedResponse>), ApiError> {
    let article = repo::find(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Article not found"))?;

    if article.author_id != user_id {
        warn!(article_id = %id, %user_id, "edit denied: not the author");
        return Err(ApiError::Forbidden(
            "You do not have permission to edit this".into(),
        ));
    }

    payload.validate().into_result()?;
    check_categories(&state, &payload.categories).await?;

    let preview = resolve_preview(
        payload.preview.as_deref(),
        Some(&article.preview),
        &payload.content,
    );
    repo::update(
        &state.db,
        id,
        &payload.title,
        &payload.content,
        &preview,
        &payload.categories,
    )
    .await?;
    info!(article_id = %id, %user_id, "article updated");

    Ok((
        detail_location(id),
        Json(ArticleSavedResponse {
            id,
            preview,
            message: "Your article has been updated!".into(),
        }),
    ))
}

/// DELETE /articles/:id, author-only; a non-author gets 403 and nothing
/// is removed.
#[instrument(skip(state))]
pub async fn delete_article(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    let article = repo::find(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Article not found"))?;

    if article.author_id != user_id {
        warn!(article_id = %id, %user_id, "delete denied: not the author");
        return Err(ApiError::Forbidden(
            "You do not have permission to delete this".into(),
        ));
    }

    repo::delete(&state.db, id).await?;
    info!(article_id = %id, %user_id, "article deleted");

    Ok(Json(MessageResponse {
        message: "Your article has been deleted!".into(),
    }))
}

/// GET /search: no query means no results, by contract.
#[instrument(skip(state))]
pub async fn search_articles(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResults>, ApiError> {
    let articles = match params.q.as_deref().map(str::trim) {
        Some(q) if !q.is_empty() => repo::search(&state.db, q).await?,
        _ => Vec::new(),
    };
    Ok(Json(SearchResults {
        query: params.q,
        articles: articles.into_iter().map(Into::into).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    // The no-query branch never reaches the pool, so the fake state's lazy
    // connection is enough.

    #[tokio::test]
    async fn search_without_query_returns_no_articles() {
        let Json(results) = search_articles(
            State(AppState::fake()),
            Query(SearchParams { q: None }),
        )
        .await
        .expect("search should succeed");
        assert!(results.articles.is_empty());
        assert_eq!(results.query, None);
    }

    #[tokio::test]
    async fn search_with_blank_query_returns_no_articles() {
        let Json(results) = search_articles(
            State(AppState::fake()),
            Query(SearchParams {
                q: Some("   ".into()),
            }),
        )
        .await
        .expect("search should succeed");
        assert!(results.articles.is_empty());
        assert_eq!(results.query.as_deref(), Some("   "));
    }
}
