use {
    agora_store::{blogs, posts},
    async_graphql::{ComplexObject, Context, InputObject, Result, SimpleObject},
};

use crate::{context::Scope, error::resolve, scalars::Id};

// ── Posts ───────────────────────────────────────────────────────────────────

/// A post on a product page, with author and engagement counts.
#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Post {
    pub id: Id,
    pub content: String,
    pub created_at: String,
    pub product_id: Id,
    pub account_id: Id,
    pub account_name: String,
    pub account_img_url: Option<String>,
    pub like_count: i64,
    pub comment_count: i64,
}

#[ComplexObject]
impl Post {
    /// Comments on this post, newest first.
    async fn comments(&self, ctx: &Context<'_>) -> Result<Vec<Comment>> {
        let scope = Scope::of(ctx)?;
        resolve(async move {
            let rows = scope.request.loaders.comments.load(self.id.0).await?;
            Ok(rows.iter().cloned().map(Comment::from).collect())
        })
        .await
    }
}

impl From<posts::PostDetail> for Post {
    fn from(row: posts::PostDetail) -> Self {
        Self {
            id: row.id.into(),
            content: row.content,
            created_at: row.created_at,
            product_id: row.product_id.into(),
            account_id: row.account_id.into(),
            account_name: row.account_name,
            account_img_url: row.account_img_url,
            like_count: row.like_count,
            comment_count: row.comment_count,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct Comment {
    pub id: Id,
    pub content: String,
    pub created_at: String,
    pub post_id: Id,
    pub account_id: Id,
    pub account_name: String,
    pub account_img_url: Option<String>,
    pub comment_like_count: i64,
}

impl From<posts::CommentDetail> for Comment {
    fn from(row: posts::CommentDetail) -> Self {
        Self {
            id: row.id.into(),
            content: row.content,
            created_at: row.created_at,
            post_id: row.post_id.into(),
            account_id: row.account_id.into(),
            account_name: row.account_name,
            account_img_url: row.account_img_url,
            comment_like_count: row.comment_like_count,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct PostData {
    pub posts: Vec<Post>,
    pub has_more: bool,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct NewPostData {
    pub post: Post,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct NewCommentData {
    pub comment: Comment,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct NewPostLikeData {
    pub post_like: i64,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct NewCommentLikeData {
    pub comment_like: i64,
}

#[derive(Debug, InputObject)]
pub struct PostInput {
    pub content: String,
    pub account_id: Id,
    pub product_id: Id,
}

#[derive(Debug, InputObject)]
pub struct CommentInput {
    pub content: String,
    pub account_id: Id,
    pub post_id: Id,
}

#[derive(Debug, InputObject)]
pub struct PostLikeInput {
    pub account_id: Id,
    pub post_id: Id,
}

#[derive(Debug, InputObject)]
pub struct CommentLikeInput {
    pub account_id: Id,
    pub comment_id: Id,
}

// ── Blogs ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Blog {
    pub id: Id,
    pub content: String,
    pub created_at: String,
    pub img_url: Option<String>,
    pub account_id: Id,
    pub account_name: String,
    pub account_img_url: Option<String>,
    pub blog_like_count: i64,
    pub blog_comment_count: i64,
}

#[ComplexObject]
impl Blog {
    /// Comments on this blog, newest first.
    async fn blog_comments(&self, ctx: &Context<'_>) -> Result<Vec<BlogComment>> {
        let scope = Scope::of(ctx)?;
        resolve(async move {
            let rows = scope.request.loaders.blog_comments.load(self.id.0).await?;
            Ok(rows.iter().cloned().map(BlogComment::from).collect())
        })
        .await
    }
}

impl From<blogs::BlogDetail> for Blog {
    fn from(row: blogs::BlogDetail) -> Self {
        Self {
            id: row.id.into(),
            content: row.content,
            created_at: row.created_at,
            img_url: row.img_url,
            account_id: row.account_id.into(),
            account_name: row.account_name,
            account_img_url: row.account_img_url,
            blog_like_count: row.blog_like_count,
            blog_comment_count: row.blog_comment_count,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct BlogComment {
    pub id: Id,
    pub content: String,
    pub created_at: String,
    pub blog_id: Id,
    pub account_id: Id,
    pub account_name: String,
    pub account_img_url: Option<String>,
    pub blog_comment_like_count: i64,
}

impl From<blogs::BlogCommentDetail> for BlogComment {
    fn from(row: blogs::BlogCommentDetail) -> Self {
        Self {
            id: row.id.into(),
            content: row.content,
            created_at: row.created_at,
            blog_id: row.blog_id.into(),
            account_id: row.account_id.into(),
            account_name: row.account_name,
            account_img_url: row.account_img_url,
            blog_comment_like_count: row.blog_comment_like_count,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct BlogData {
    pub blogs: Vec<Blog>,
    pub has_more: bool,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct NewBlogData {
    pub blog: Blog,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct NewBlogCommentData {
    pub blog_comment: BlogComment,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct NewBlogLikeData {
    pub blog_like: i64,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct NewBlogCommentLikeData {
    pub blog_comment_like: i64,
}

#[derive(Debug, InputObject)]
pub struct BlogInput {
    pub content: String,
    pub account_id: Id,
}

#[derive(Debug, InputObject)]
pub struct BlogCommentInput {
    pub content: String,
    pub account_id: Id,
    pub blog_id: Id,
}

#[derive(Debug, InputObject)]
pub struct BlogLikeInput {
    pub account_id: Id,
    pub blog_id: Id,
}

#[derive(Debug, InputObject)]
pub struct BlogCommentLikeInput {
    pub account_id: Id,
    pub blog_comment_id: Id,
}
