use anyhow::Context;
use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::categories::repo::Category;

const ARTICLE_SELECT: &str = r#"
    SELECT a.id, a.title, a.content, a.preview, a.author_id,
           u.username AS author, a.created_at, a.updated_at
    FROM articles a
    JOIN users u ON u.id = a.author_id
"#;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ArticleRow {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub preview: String,
    pub author_id: Uuid,
    pub author: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CommentRow {
    pub id: Uuid,
    pub content: String,
    pub author_id: Uuid,
    pub author: String,
    pub article_id: Uuid,
    pub created_at: OffsetDateTime,
}

pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<ArticleRow>> {
    let rows = sqlx::query_as::<_, ArticleRow>(&format!("{ARTICLE_SELECT} ORDER BY a.created_at"))
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn find(db: &PgPool, id: Uuid) -> anyhow::Result<Option<ArticleRow>> {
    let row = sqlx::query_as::<_, ArticleRow>(&format!("{ARTICLE_SELECT} WHERE a.id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn categories_of(db: &PgPool, article_id: Uuid) -> anyhow::Result<Vec<Category>> {
    let rows = sqlx::query_as::<_, Category>(
        r#"
        SELECT c.id, c.name
        FROM categories c
        JOIN article_categories ac ON ac.category_id = c.id
        WHERE ac.article_id = $1
        ORDER BY c.name
        "#,
    )
    .bind(article_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn comments_of(db: &PgPool, article_id: Uuid) -> anyhow::Result<Vec<CommentRow>> {
    let rows = sqlx::query_as::<_, CommentRow>(
        r#"
        SELECT co.id, co.content, co.author_id, u.username AS author,
               co.article_id, co.created_at
        FROM comments co
        JOIN users u ON u.id = co.author_id
        WHERE co.article_id = $1
        ORDER BY co.created_at
        "#,
    )
    .bind(article_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn insert_comment(
    db: &PgPool,
    article_id: Uuid,
    author_id: Uuid,
    content: &str,
) -> anyhow::Result<CommentRow> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO comments (content, author_id, article_id)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(content)
    .bind(author_id)
    .bind(article_id)
    .fetch_one(db)
    .await
    .context("insert comment")?;

    let row = sqlx::query_as::<_, CommentRow>(
        r#"
        SELECT co.id, co.content, co.author_id, u.username AS author,
               co.article_id, co.created_at
        FROM comments co
        JOIN users u ON u.id = co.author_id
        WHERE co.id = $1
        "#,
    )
    .bind(id)
    .fetch_one(db)
    .await?;
    Ok(row)
}

/// Category ids from `ids` that do not exist. Non-empty means the payload
/// referenced unknown categories.
pub async fn missing_categories(db: &PgPool, ids: &[Uuid]) -> anyhow::Result<Vec<Uuid>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let known: Vec<(Uuid,)> =
        sqlx::query_as("SELECT id FROM categories WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(db)
            .await?;
    let known: Vec<Uuid> = known.into_iter().map(|(id,)| id).collect();
    Ok(ids
        .iter()
        .copied()
        .filter(|id| !known.contains(id))
        .collect())
}

/// Membership is a set; collapse repeats so the join insert cannot trip
/// over its own primary key.
fn dedup_ids(ids: &[Uuid]) -> Vec<Uuid> {
    let mut out: Vec<Uuid> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(id) {
            out.push(*id);
        }
    }
    out
}

/// Rewrites the article's category membership inside the caller's transaction.
async fn set_categories(
    tx: &mut Transaction<'_, Postgres>,
    article_id: Uuid,
    category_ids: &[Uuid],
) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM article_categories WHERE article_id = $1")
        .bind(article_id)
        .execute(&mut **tx)
        .await
        .context("clear category membership")?;

    let category_ids = dedup_ids(category_ids);
    if !category_ids.is_empty() {
        sqlx::query(
            r#"
            INSERT INTO article_categories (article_id, category_id)
            SELECT $1, unnest($2::uuid[])
            "#,
        )
        .bind(article_id)
        .bind(category_ids)
        .execute(&mut **tx)
        .await
        .context("insert category membership")?;
    }
    Ok(())
}

/// Inserts the article and its category join rows in one transaction.
pub async fn create(
    db: &PgPool,
    author_id: Uuid,
    title: &str,
    content: &str,
    preview: &str,
    category_ids: &[Uuid],
) -> anyhow::Result<Uuid> {
    let mut tx = db.begin().await?;

    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO articles (title, content, preview, author_id)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(title)
    .bind(content)
    .bind(preview)
    .bind(author_id)
    .fetch_one(&mut *tx)
    .await
    .context("insert article")?;

    set_categories(&mut tx, id, category_ids).await?;

    tx.commit().await?;
    Ok(id)
}

/// Overwrites the article and its category membership in one transaction.
/// Authorship is never touched here.
pub async fn update(
    db: &PgPool,
    id: Uuid,
    title: &str,
    content: &str,
    preview: &str,
    category_ids: &[Uuid],
) -> anyhow::Result<()> {
    let mut tx = db.begin().await?;

    sqlx::query(
        r#"
        UPDATE articles
        SET title = $2, content = $3, preview = $4, updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(title)
    .bind(content)
    .bind(preview)
    .execute(&mut *tx)
    .await
    .context("update article")?;

    set_categories(&mut tx, id, category_ids).await?;

    tx.commit().await?;
    Ok(())
}

/// Comments go with the article through the FK cascade.
pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM articles WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn list_by_category(db: &PgPool, category_id: Uuid) -> anyhow::Result<Vec<ArticleRow>> {
    let rows = sqlx::query_as::<_, ArticleRow>(&format!(
        r#"
        {ARTICLE_SELECT}
        JOIN article_categories ac ON ac.article_id = a.id
        WHERE ac.category_id = $1
        ORDER BY a.created_at
        "#
    ))
    .bind(category_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Case-insensitive substring match over title OR content. The caller decides
/// what an absent query means; this always searches.
pub async fn search(db: &PgPool, query: &str) -> anyhow::Result<Vec<ArticleRow>> {
    let pattern = format!("%{}%", escape_like(query));
    let rows = sqlx::query_as::<_, ArticleRow>(&format!(
        r#"
        {ARTICLE_SELECT}
        WHERE a.title ILIKE $1 OR a.content ILIKE $1
        ORDER BY a.created_at
        "#
    ))
    .bind(pattern)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// LIKE wildcards in user queries must match literally.
fn escape_like(q: &str) -> String {
    q.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_like_passes_plain_text_through() {
        assert_eq!(escape_like("hello world"), "hello world");
    }

    #[test]
    fn escape_like_neutralizes_wildcards() {
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("snake_case"), "snake\\_case");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn dedup_ids_collapses_repeated_categories() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(dedup_ids(&[a, a]), vec![a]);
        assert_eq!(dedup_ids(&[a, b, a, b]), vec![a, b]);
    }

    #[test]
    fn dedup_ids_keeps_distinct_sets_in_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        assert_eq!(dedup_ids(&[a, b, c]), vec![a, b, c]);
        assert!(dedup_ids(&[]).is_empty());
    }
}
