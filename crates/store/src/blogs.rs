use sqlx::SqliteExecutor;

use crate::{Result, placeholders};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BlogDetail {
    pub id: i64,
    pub content: String,
    pub created_at: String,
    pub img_url: Option<String>,
    pub account_id: i64,
    pub account_name: String,
    pub account_img_url: Option<String>,
    pub blog_like_count: i64,
    pub blog_comment_count: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BlogCommentDetail {
    pub id: i64,
    pub content: String,
    pub created_at: String,
    pub blog_id: i64,
    pub account_id: i64,
    pub account_name: String,
    pub account_img_url: Option<String>,
    pub blog_comment_like_count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlogOrder {
    Newest,
    MostComments,
    MostLikes,
}

impl BlogOrder {
    fn clause(self) -> &'static str {
        match self {
            Self::Newest => "b.id DESC",
            Self::MostComments => "blog_comment_count DESC, b.id DESC",
            Self::MostLikes => "blog_like_count DESC, b.id DESC",
        }
    }
}

const BLOG_SELECT: &str = "SELECT b.id, b.content, b.created_at, b.img_url, b.account_id, \
         a.name AS account_name, a.img_url AS account_img_url, \
         (SELECT COUNT(*) FROM blog_likes bl WHERE bl.blog_id = b.id) AS blog_like_count, \
         (SELECT COUNT(*) FROM blog_comments bc WHERE bc.blog_id = b.id) AS blog_comment_count \
     FROM blogs b JOIN accounts a ON a.id = b.account_id";

const BLOG_COMMENT_SELECT: &str = "SELECT bc.id, bc.content, bc.created_at, bc.blog_id, \
         bc.account_id, a.name AS account_name, a.img_url AS account_img_url, \
         (SELECT COUNT(*) FROM blog_comment_likes bcl WHERE bcl.blog_comment_id = bc.id) \
             AS blog_comment_like_count \
     FROM blog_comments bc JOIN accounts a ON a.id = bc.account_id";

pub async fn count<'e, E: SqliteExecutor<'e>>(executor: E) -> Result<i64> {
    Ok(sqlx::query_scalar("SELECT COUNT(*) FROM blogs")
        .fetch_one(executor)
        .await?)
}

pub async fn list<'e, E: SqliteExecutor<'e>>(
    executor: E,
    order: BlogOrder,
    limit: i64,
    offset: i64,
) -> Result<Vec<BlogDetail>> {
    let sql = format!("{BLOG_SELECT} ORDER BY {} LIMIT ? OFFSET ?", order.clause());
    Ok(sqlx::query_as(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(executor)
        .await?)
}

pub async fn find<'e, E: SqliteExecutor<'e>>(executor: E, id: i64) -> Result<Option<BlogDetail>> {
    let sql = format!("{BLOG_SELECT} WHERE b.id = ?");
    Ok(sqlx::query_as(&sql).bind(id).fetch_optional(executor).await?)
}

pub async fn insert<'e, E: SqliteExecutor<'e>>(executor: E, account_id: i64, content: &str) -> Result<i64> {
    let result = sqlx::query("INSERT INTO blogs (content, account_id) VALUES (?, ?)")
        .bind(content)
        .bind(account_id)
        .execute(executor)
        .await?;
    Ok(result.last_insert_rowid())
}

pub async fn set_image<'e, E: SqliteExecutor<'e>>(executor: E, id: i64, img_url: &str) -> Result<()> {
    sqlx::query("UPDATE blogs SET img_url = ? WHERE id = ?")
        .bind(img_url)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Comments of every blog in `blog_ids`, newest first, in one statement.
pub async fn comments_for_blogs<'e, E: SqliteExecutor<'e>>(
    executor: E,
    blog_ids: &[i64],
) -> Result<Vec<BlogCommentDetail>> {
    if blog_ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "{BLOG_COMMENT_SELECT} WHERE bc.blog_id IN ({}) ORDER BY bc.id DESC",
        placeholders(blog_ids.len())
    );
    let mut query = sqlx::query_as(&sql);
    for id in blog_ids {
        query = query.bind(id);
    }
    Ok(query.fetch_all(executor).await?)
}

pub async fn find_comment<'e, E: SqliteExecutor<'e>>(
    executor: E,
    id: i64,
) -> Result<Option<BlogCommentDetail>> {
    let sql = format!("{BLOG_COMMENT_SELECT} WHERE bc.id = ?");
    Ok(sqlx::query_as(&sql).bind(id).fetch_optional(executor).await?)
}

pub async fn insert_comment<'e, E: SqliteExecutor<'e>>(
    executor: E,
    account_id: i64,
    blog_id: i64,
    content: &str,
) -> Result<i64> {
    let result =
        sqlx::query("INSERT INTO blog_comments (content, blog_id, account_id) VALUES (?, ?, ?)")
            .bind(content)
            .bind(blog_id)
            .bind(account_id)
            .execute(executor)
            .await?;
    Ok(result.last_insert_rowid())
}

pub async fn insert_like<'e, E: SqliteExecutor<'e>>(
    executor: E,
    account_id: i64,
    blog_id: i64,
) -> Result<()> {
    sqlx::query("INSERT INTO blog_likes (blog_id, account_id) VALUES (?, ?)")
        .bind(blog_id)
        .bind(account_id)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn count_likes<'e, E: SqliteExecutor<'e>>(executor: E, blog_id: i64) -> Result<i64> {
    Ok(sqlx::query_scalar("SELECT COUNT(*) FROM blog_likes WHERE blog_id = ?")
        .bind(blog_id)
        .fetch_one(executor)
        .await?)
}

pub async fn insert_comment_like<'e, E: SqliteExecutor<'e>>(
    executor: E,
    account_id: i64,
    blog_comment_id: i64,
) -> Result<()> {
    sqlx::query("INSERT INTO blog_comment_likes (blog_comment_id, account_id) VALUES (?, ?)")
        .bind(blog_comment_id)
        .bind(account_id)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn count_comment_likes<'e, E: SqliteExecutor<'e>>(
    executor: E,
    blog_comment_id: i64,
) -> Result<i64> {
    Ok(sqlx::query_scalar(
        "SELECT COUNT(*) FROM blog_comment_likes WHERE blog_comment_id = ?",
    )
    .bind(blog_comment_id)
    .fetch_one(executor)
    .await?)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use {super::*, crate::testing};

    #[tokio::test]
    async fn blogs_sort_by_engagement() {
        let db = testing::db().await;
        let author = testing::account(&db, "writer").await;
        let plain = insert(db.pool(), author, "plain").await.unwrap();
        let liked = insert(db.pool(), author, "liked").await.unwrap();
        let discussed = insert(db.pool(), author, "discussed").await.unwrap();
        insert_like(db.pool(), author, liked).await.unwrap();
        insert_comment(db.pool(), author, discussed, "hi").await.unwrap();
        set_image(db.pool(), plain, "http://img/p.png").await.unwrap();

        let ids = |rows: Vec<BlogDetail>| rows.into_iter().map(|b| b.id).collect::<Vec<_>>();
        assert_eq!(
            ids(list(db.pool(), BlogOrder::MostLikes, 10, 0).await.unwrap()),
            [liked, discussed, plain]
        );
        assert_eq!(
            ids(list(db.pool(), BlogOrder::MostComments, 10, 0).await.unwrap()),
            [discussed, liked, plain]
        );
        assert_eq!(count(db.pool()).await.unwrap(), 3);
        assert_eq!(
            find(db.pool(), plain).await.unwrap().unwrap().img_url.as_deref(),
            Some("http://img/p.png")
        );
        assert_eq!(count_likes(db.pool(), liked).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn bulk_blog_comments() {
        let db = testing::db().await;
        let author = testing::account(&db, "writer").await;
        let b1 = insert(db.pool(), author, "b1").await.unwrap();
        let b2 = insert(db.pool(), author, "b2").await.unwrap();
        let c = insert_comment(db.pool(), author, b2, "x").await.unwrap();
        insert_comment_like(db.pool(), author, c).await.unwrap();

        let rows = comments_for_blogs(db.pool(), &[b1, b2]).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].blog_id, b2);
        assert_eq!(rows[0].blog_comment_like_count, 1);
    }
}
