use sqlx::SqliteExecutor;

use crate::{Result, placeholders};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostDetail {
    pub id: i64,
    pub content: String,
    pub created_at: String,
    pub product_id: i64,
    pub account_id: i64,
    pub account_name: String,
    pub account_img_url: Option<String>,
    pub like_count: i64,
    pub comment_count: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentDetail {
    pub id: i64,
    pub content: String,
    pub created_at: String,
    pub post_id: i64,
    pub account_id: i64,
    pub account_name: String,
    pub account_img_url: Option<String>,
    pub comment_like_count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostOrder {
    Newest,
    MostComments,
    MostLikes,
}

impl PostOrder {
    fn clause(self) -> &'static str {
        match self {
            Self::Newest => "p.id DESC",
            Self::MostComments => "comment_count DESC, p.id DESC",
            Self::MostLikes => "like_count DESC, p.id DESC",
        }
    }
}

const POST_SELECT: &str = "SELECT p.id, p.content, p.created_at, p.product_id, p.account_id, \
         a.name AS account_name, a.img_url AS account_img_url, \
         (SELECT COUNT(*) FROM post_likes pl WHERE pl.post_id = p.id) AS like_count, \
         (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comment_count \
     FROM posts p JOIN accounts a ON a.id = p.account_id";

const COMMENT_SELECT: &str = "SELECT c.id, c.content, c.created_at, c.post_id, c.account_id, \
         a.name AS account_name, a.img_url AS account_img_url, \
         (SELECT COUNT(*) FROM comment_likes cl WHERE cl.comment_id = c.id) AS comment_like_count \
     FROM comments c JOIN accounts a ON a.id = c.account_id";

pub async fn count_by_product<'e, E: SqliteExecutor<'e>>(executor: E, product_id: i64) -> Result<i64> {
    Ok(sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE product_id = ?")
        .bind(product_id)
        .fetch_one(executor)
        .await?)
}

pub async fn by_product<'e, E: SqliteExecutor<'e>>(
    executor: E,
    product_id: i64,
    order: PostOrder,
    limit: i64,
    offset: i64,
) -> Result<Vec<PostDetail>> {
    let sql = format!(
        "{POST_SELECT} WHERE p.product_id = ? ORDER BY {} LIMIT ? OFFSET ?",
        order.clause()
    );
    Ok(sqlx::query_as(&sql)
        .bind(product_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(executor)
        .await?)
}

pub async fn find<'e, E: SqliteExecutor<'e>>(executor: E, id: i64) -> Result<Option<PostDetail>> {
    let sql = format!("{POST_SELECT} WHERE p.id = ?");
    Ok(sqlx::query_as(&sql).bind(id).fetch_optional(executor).await?)
}

pub async fn insert<'e, E: SqliteExecutor<'e>>(
    executor: E,
    account_id: i64,
    product_id: i64,
    content: &str,
) -> Result<i64> {
    let result = sqlx::query("INSERT INTO posts (content, product_id, account_id) VALUES (?, ?, ?)")
        .bind(content)
        .bind(product_id)
        .bind(account_id)
        .execute(executor)
        .await?;
    Ok(result.last_insert_rowid())
}

/// Comments of every post in `post_ids`, newest first, in one statement.
pub async fn comments_for_posts<'e, E: SqliteExecutor<'e>>(
    executor: E,
    post_ids: &[i64],
) -> Result<Vec<CommentDetail>> {
    if post_ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "{COMMENT_SELECT} WHERE c.post_id IN ({}) ORDER BY c.id DESC",
        placeholders(post_ids.len())
    );
    let mut query = sqlx::query_as(&sql);
    for id in post_ids {
        query = query.bind(id);
    }
    Ok(query.fetch_all(executor).await?)
}

pub async fn find_comment<'e, E: SqliteExecutor<'e>>(
    executor: E,
    id: i64,
) -> Result<Option<CommentDetail>> {
    let sql = format!("{COMMENT_SELECT} WHERE c.id = ?");
    Ok(sqlx::query_as(&sql).bind(id).fetch_optional(executor).await?)
}

pub async fn insert_comment<'e, E: SqliteExecutor<'e>>(
    executor: E,
    account_id: i64,
    post_id: i64,
    content: &str,
) -> Result<i64> {
    let result =
        sqlx::query("INSERT INTO comments (content, post_id, account_id) VALUES (?, ?, ?)")
            .bind(content)
            .bind(post_id)
            .bind(account_id)
            .execute(executor)
            .await?;
    Ok(result.last_insert_rowid())
}

pub async fn insert_like<'e, E: SqliteExecutor<'e>>(
    executor: E,
    account_id: i64,
    post_id: i64,
) -> Result<()> {
    sqlx::query("INSERT INTO post_likes (post_id, account_id) VALUES (?, ?)")
        .bind(post_id)
        .bind(account_id)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn count_likes<'e, E: SqliteExecutor<'e>>(executor: E, post_id: i64) -> Result<i64> {
    Ok(sqlx::query_scalar("SELECT COUNT(*) FROM post_likes WHERE post_id = ?")
        .bind(post_id)
        .fetch_one(executor)
        .await?)
}

pub async fn insert_comment_like<'e, E: SqliteExecutor<'e>>(
    executor: E,
    account_id: i64,
    comment_id: i64,
) -> Result<()> {
    sqlx::query("INSERT INTO comment_likes (comment_id, account_id) VALUES (?, ?)")
        .bind(comment_id)
        .bind(account_id)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn count_comment_likes<'e, E: SqliteExecutor<'e>>(executor: E, comment_id: i64) -> Result<i64> {
    Ok(
        sqlx::query_scalar("SELECT COUNT(*) FROM comment_likes WHERE comment_id = ?")
            .bind(comment_id)
            .fetch_one(executor)
            .await?,
    )
}
