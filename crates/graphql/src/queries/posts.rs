use {
    agora_common::{Page, PageRequest},
    agora_store::posts::{self, PostOrder},
    async_graphql::{Context, Object, Result},
    sqlx::SqlitePool,
};

use crate::{
    context::Scope,
    error::{ApiResult, resolve},
    queries::page,
    scalars::Id,
    types::{Post, PostData},
};

#[derive(Default)]
pub struct PostQuery;

async fn post_page(
    pool: &SqlitePool,
    product_id: i64,
    order: PostOrder,
    request: PageRequest,
) -> ApiResult<PostData> {
    let rows = posts::by_product(
        pool,
        product_id,
        order,
        request.fetch_limit(),
        request.offset(),
    )
    .await?;
    let page = Page::from_overfetch(rows, request).map(Post::from);
    Ok(PostData {
        posts: page.items,
        has_more: page.has_more,
    })
}

#[Object]
impl PostQuery {
    async fn get_num_of_posts_by_product_id(
        &self,
        ctx: &Context<'_>,
        product_id: Id,
    ) -> Result<i64> {
        let scope = Scope::of(ctx)?;
        resolve(async move { Ok(posts::count_by_product(scope.pool(), product_id.get()).await?) })
            .await
    }

    /// Newest posts first.
    async fn get_posts_by_product_id(
        &self,
        ctx: &Context<'_>,
        product_id: Id,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<PostData> {
        let scope = Scope::of(ctx)?;
        let request = page(limit, scope.app.limits.posts, offset);
        resolve(post_page(scope.pool(), product_id.get(), PostOrder::Newest, request)).await
    }

    async fn get_most_comments_posts_by_product_id(
        &self,
        ctx: &Context<'_>,
        product_id: Id,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<PostData> {
        let scope = Scope::of(ctx)?;
        let request = page(limit, scope.app.limits.posts, offset);
        resolve(post_page(
            scope.pool(),
            product_id.get(),
            PostOrder::MostComments,
            request,
        ))
        .await
    }

    async fn get_most_like_posts_by_product_id(
        &self,
        ctx: &Context<'_>,
        product_id: Id,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<PostData> {
        let scope = Scope::of(ctx)?;
        let request = page(limit, scope.app.limits.posts, offset);
        resolve(post_page(scope.pool(), product_id.get(), PostOrder::MostLikes, request)).await
    }
}
