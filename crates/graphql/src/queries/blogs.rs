use {
    agora_common::{Page, PageRequest},
    agora_store::blogs::{self, BlogOrder},
    async_graphql::{Context, Object, Result},
    sqlx::SqlitePool,
};

use crate::{
    context::Scope,
    error::{ApiResult, resolve},
    queries::page,
    types::{Blog, BlogData},
};

#[derive(Default)]
pub struct BlogQuery;

async fn blog_page(pool: &SqlitePool, order: BlogOrder, request: PageRequest) -> ApiResult<BlogData> {
    let rows = blogs::list(pool, order, request.fetch_limit(), request.offset()).await?;
    let page = Page::from_overfetch(rows, request).map(Blog::from);
    Ok(BlogData {
        blogs: page.items,
        has_more: page.has_more,
    })
}

#[Object]
impl BlogQuery {
    async fn get_num_of_blogs(&self, ctx: &Context<'_>) -> Result<i64> {
        let scope = Scope::of(ctx)?;
        resolve(async move { Ok(blogs::count(scope.pool()).await?) }).await
    }

    /// Newest blogs first.
    async fn get_all_blogs(
        &self,
        ctx: &Context<'_>,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<BlogData> {
        let scope = Scope::of(ctx)?;
        let request = page(limit, scope.app.limits.blogs, offset);
        resolve(blog_page(scope.pool(), BlogOrder::Newest, request)).await
    }

    async fn get_most_comments_blog(
        &self,
        ctx: &Context<'_>,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<BlogData> {
        let scope = Scope::of(ctx)?;
        let request = page(limit, scope.app.limits.blogs, offset);
        resolve(blog_page(scope.pool(), BlogOrder::MostComments, request)).await
    }

    async fn get_most_like_blog(
        &self,
        ctx: &Context<'_>,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<BlogData> {
        let scope = Scope::of(ctx)?;
        let request = page(limit, scope.app.limits.blogs, offset);
        resolve(blog_page(scope.pool(), BlogOrder::MostLikes, request)).await
    }
}
