use {
    agora_store::posts,
    async_graphql::{Context, Object, Result},
    futures::FutureExt,
};

use crate::{
    context::Scope,
    error::{ApiError, resolve},
    gate::OwnershipClaim,
    types::{
        CommentInput, CommentLikeInput, NewCommentData, NewCommentLikeData, NewPostData,
        NewPostLikeData, PostInput, PostLikeInput,
    },
};

#[derive(Default)]
pub struct PostMutation;

#[Object]
impl PostMutation {
    async fn create_post(&self, ctx: &Context<'_>, post_input: PostInput) -> Result<NewPostData> {
        let scope = Scope::of(ctx)?;
        resolve(async move {
            let PostInput {
                content,
                account_id,
                product_id,
            } = post_input;
            let claim = OwnershipClaim::new(&scope.request.credential, account_id);
            let id = scope
                .app
                .gate()
                .run(claim, move |conn, account| {
                    async move {
                        Ok(posts::insert(&mut *conn, account.get(), product_id.get(), &content)
                            .await?)
                    }
                    .boxed()
                })
                .await?;
            let post = posts::find(scope.pool(), id)
                .await?
                .ok_or_else(|| ApiError::internal("created post vanished"))?;
            Ok(NewPostData { post: post.into() })
        })
        .await
    }

    async fn create_comment(
        &self,
        ctx: &Context<'_>,
        comment_input: CommentInput,
    ) -> Result<NewCommentData> {
        let scope = Scope::of(ctx)?;
        resolve(async move {
            let CommentInput {
                content,
                account_id,
                post_id,
            } = comment_input;
            let claim = OwnershipClaim::new(&scope.request.credential, account_id);
            let id = scope
                .app
                .gate()
                .run(claim, move |conn, account| {
                    async move {
                        Ok(
                            posts::insert_comment(&mut *conn, account.get(), post_id.get(), &content)
                                .await?,
                        )
                    }
                    .boxed()
                })
                .await?;
            let comment = posts::find_comment(scope.pool(), id)
                .await?
                .ok_or_else(|| ApiError::internal("created comment vanished"))?;
            Ok(NewCommentData {
                comment: comment.into(),
            })
        })
        .await
    }

    /// Like a post and return its new like count.
    async fn create_post_like(
        &self,
        ctx: &Context<'_>,
        post_like_input: PostLikeInput,
    ) -> Result<NewPostLikeData> {
        let scope = Scope::of(ctx)?;
        resolve(async move {
            let post_id = post_like_input.post_id.get();
            let claim = OwnershipClaim::new(&scope.request.credential, post_like_input.account_id);
            let post_like = scope
                .app
                .gate()
                .run(claim, move |conn, account| {
                    async move {
                        posts::insert_like(&mut *conn, account.get(), post_id).await?;
                        Ok(posts::count_likes(&mut *conn, post_id).await?)
                    }
                    .boxed()
                })
                .await?;
            Ok(NewPostLikeData { post_like })
        })
        .await
    }

    /// Like a comment and return its new like count.
    async fn create_comment_like(
        &self,
        ctx: &Context<'_>,
        comment_like_input: CommentLikeInput,
    ) -> Result<NewCommentLikeData> {
        let scope = Scope::of(ctx)?;
        resolve(async move {
            let comment_id = comment_like_input.comment_id.get();
            let claim =
                OwnershipClaim::new(&scope.request.credential, comment_like_input.account_id);
            let comment_like = scope
                .app
                .gate()
                .run(claim, move |conn, account| {
                    async move {
                        posts::insert_comment_like(&mut *conn, account.get(), comment_id).await?;
                        Ok(posts::count_comment_likes(&mut *conn, comment_id).await?)
                    }
                    .boxed()
                })
                .await?;
            Ok(NewCommentLikeData { comment_like })
        })
        .await
    }
}
