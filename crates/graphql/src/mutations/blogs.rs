use {
    agora_store::blogs,
    async_graphql::{Context, Object, Result, Upload},
    futures::FutureExt,
};

use crate::{
    context::Scope,
    error::{ApiError, resolve},
    gate::OwnershipClaim,
    types::{
        BlogCommentInput, BlogCommentLikeInput, BlogInput, BlogLikeInput, NewBlogCommentData,
        NewBlogCommentLikeData, NewBlogData, NewBlogLikeData,
    },
    uploads::FileUpload,
};

#[derive(Default)]
pub struct BlogMutation;

#[Object]
impl BlogMutation {
    /// Publish a blog entry with an optional cover image.
    async fn create_blog(
        &self,
        ctx: &Context<'_>,
        blog_input: BlogInput,
        user_img: Option<Upload>,
    ) -> Result<NewBlogData> {
        let scope = Scope::of(ctx)?;
        let image = user_img
            .as_ref()
            .map(|upload| FileUpload::read(ctx, upload))
            .transpose();
        resolve(async move {
            let image = image?;
            let BlogInput {
                content,
                account_id,
            } = blog_input;
            let storage = scope.app.services.storage.clone();
            let claim = OwnershipClaim::new(&scope.request.credential, account_id);
            let id = scope
                .app
                .gate()
                .run(claim, move |conn, account| {
                    async move {
                        let id = blogs::insert(&mut *conn, account.get(), &content).await?;
                        if let Some(image) = image {
                            let url = image.store(storage.as_ref(), "blog", id).await?;
                            blogs::set_image(&mut *conn, id, &url).await?;
                        }
                        Ok(id)
                    }
                    .boxed()
                })
                .await?;
            let blog = blogs::find(scope.pool(), id)
                .await?
                .ok_or_else(|| ApiError::internal("created blog vanished"))?;
            Ok(NewBlogData { blog: blog.into() })
        })
        .await
    }

    async fn create_blog_comment(
        &self,
        ctx: &Context<'_>,
        blog_comment_input: BlogCommentInput,
    ) -> Result<NewBlogCommentData> {
        let scope = Scope::of(ctx)?;
        resolve(async move {
            let BlogCommentInput {
                content,
                account_id,
                blog_id,
            } = blog_comment_input;
            let claim = OwnershipClaim::new(&scope.request.credential, account_id);
            let id = scope
                .app
                .gate()
                .run(claim, move |conn, account| {
                    async move {
                        Ok(
                            blogs::insert_comment(&mut *conn, account.get(), blog_id.get(), &content)
                                .await?,
                        )
                    }
                    .boxed()
                })
                .await?;
            let blog_comment = blogs::find_comment(scope.pool(), id)
                .await?
                .ok_or_else(|| ApiError::internal("created comment vanished"))?;
            Ok(NewBlogCommentData {
                blog_comment: blog_comment.into(),
            })
        })
        .await
    }

    async fn create_blog_like(
        &self,
        ctx: &Context<'_>,
        blog_like_input: BlogLikeInput,
    ) -> Result<NewBlogLikeData> {
        let scope = Scope::of(ctx)?;
        resolve(async move {
            let blog_id = blog_like_input.blog_id.get();
            let claim = OwnershipClaim::new(&scope.request.credential, blog_like_input.account_id);
            let blog_like = scope
                .app
                .gate()
                .run(claim, move |conn, account| {
                    async move {
                        blogs::insert_like(&mut *conn, account.get(), blog_id).await?;
                        Ok(blogs::count_likes(&mut *conn, blog_id).await?)
                    }
                    .boxed()
                })
                .await?;
            Ok(NewBlogLikeData { blog_like })
        })
        .await
    }

    async fn create_blog_comment_like(
        &self,
        ctx: &Context<'_>,
        blog_comment_like_input: BlogCommentLikeInput,
    ) -> Result<NewBlogCommentLikeData> {
        let scope = Scope::of(ctx)?;
        resolve(async move {
            let comment_id = blog_comment_like_input.blog_comment_id.get();
            let claim =
                OwnershipClaim::new(&scope.request.credential, blog_comment_like_input.account_id);
            let blog_comment_like = scope
                .app
                .gate()
                .run(claim, move |conn, account| {
                    async move {
                        blogs::insert_comment_like(&mut *conn, account.get(), comment_id).await?;
                        Ok(blogs::count_comment_likes(&mut *conn, comment_id).await?)
                    }
                    .boxed()
                })
                .await?;
            Ok(NewBlogCommentLikeData { blog_comment_like })
        })
        .await
    }
}
