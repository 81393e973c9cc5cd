use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::articles::repo::{ArticleRow, CommentRow};
use crate::categories::repo::Category;
use crate::error::ValidationErrors;

pub const TITLE_MAX_LEN: usize = 200;

/// Payload for article create/edit. `categories` is the full membership set;
/// `preview`, when present and non-empty, overrides the generated one.
#[derive(Debug, Deserialize)]
pub struct ArticleInput {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub categories: Vec<Uuid>,
    #[serde(default)]
    pub preview: Option<String>,
}

impl ArticleInput {
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::default();
        if self.title.trim().is_empty() {
            errors.add("title", "This field is required");
        } else if self.title.chars().count() > TITLE_MAX_LEN {
            errors.add(
                "title",
                format!("Ensure this value has at most {TITLE_MAX_LEN} characters"),
            );
        }
        if self.content.trim().is_empty() {
            errors.add("content", "This field is required");
        }
        errors
    }
}

#[derive(Debug, Deserialize)]
pub struct CommentInput {
    pub content: String,
}

impl CommentInput {
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::default();
        if self.content.trim().is_empty() {
            errors.add("content", "This field is required");
        }
        errors
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

// --- responses ---

#[derive(Debug, Serialize)]
pub struct ArticleSummary {
    pub id: Uuid,
    pub title: String,
    pub preview: String,
    pub author_id: Uuid,
    pub author: String,
    pub created_at: OffsetDateTime,
}

impl From<ArticleRow> for ArticleSummary {
    fn from(a: ArticleRow) -> Self {
        Self {
            id: a.id,
            title: a.title,
            preview: a.preview,
            author_id: a.author_id,
            author: a.author,
            created_at: a.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentView {
    pub id: Uuid,
    pub content: String,
    pub author_id: Uuid,
    pub author: String,
    pub created_at: OffsetDateTime,
}

impl From<CommentRow> for CommentView {
    fn from(c: CommentRow) -> Self {
        Self {
            id: c.id,
            content: c.content,
            author_id: c.author_id,
            author: c.author,
            created_at: c.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ArticleDetails {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub preview: String,
    pub author_id: Uuid,
    pub author: String,
    pub categories: Vec<Category>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub comments: Vec<CommentView>,
}

/// Create/edit/delete responses carry the flash-style notification the
/// original flows showed after their redirects.
#[derive(Debug, Serialize)]
pub struct ArticleSavedResponse {
    pub id: Uuid,
    pub preview: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct CommentCreatedResponse {
    pub message: String,
    pub comment: CommentView,
}

#[derive(Debug, Serialize)]
pub struct SearchResults {
    pub query: Option<String>,
    pub articles: Vec<ArticleSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(title: &str, content: &str) -> ArticleInput {
        ArticleInput {
            title: title.into(),
            content: content.into(),
            categories: Vec::new(),
            preview: None,
        }
    }

    #[test]
    fn article_input_accepts_title_and_content() {
        assert!(input("Hello World", "some body").validate().is_empty());
    }

    #[test]
    fn article_input_requires_title_and_content() {
        let errors = input("  ", "").validate();
        assert!(!errors.messages_for("title").is_empty());
        assert!(!errors.messages_for("content").is_empty());
    }

    #[test]
    fn article_title_is_capped_at_200_chars() {
        let errors = input(&"x".repeat(201), "body").validate();
        assert!(!errors.messages_for("title").is_empty());
        assert!(input(&"x".repeat(200), "body").validate().is_empty());
    }

    #[test]
    fn comment_input_requires_content() {
        let blank = CommentInput { content: " \n".into() };
        assert!(!blank.validate().messages_for("content").is_empty());
        let ok = CommentInput { content: "nice read".into() };
        assert!(ok.validate().is_empty());
    }
}
