use {
    agora_store::favorites,
    async_graphql::{Context, Object, Result},
    futures::FutureExt,
};

use crate::{context::Scope, error::resolve, gate::OwnershipClaim, scalars::Id};

#[derive(Default)]
pub struct FavoriteMutation;

#[Object]
impl FavoriteMutation {
    async fn create_favorite_product(
        &self,
        ctx: &Context<'_>,
        product_id: Id,
        account_id: Id,
    ) -> Result<bool> {
        let scope = Scope::of(ctx)?;
        resolve(async move {
            let claim = OwnershipClaim::new(&scope.request.credential, account_id);
            scope
                .app
                .gate()
                .run(claim, move |conn, account| {
                    async move {
                        favorites::insert(&mut *conn, account.get(), product_id.get()).await?;
                        Ok(true)
                    }
                    .boxed()
                })
                .await
        })
        .await
    }

    /// True when exactly one saved product was removed.
    async fn delete_favorite_product(
        &self,
        ctx: &Context<'_>,
        product_id: Id,
        account_id: Id,
    ) -> Result<bool> {
        let scope = Scope::of(ctx)?;
        resolve(async move {
            let claim = OwnershipClaim::new(&scope.request.credential, account_id);
            scope
                .app
                .gate()
                .run(claim, move |conn, account| {
                    async move {
                        let removed =
                            favorites::delete(&mut *conn, account.get(), product_id.get()).await?;
                        Ok(removed == 1)
                    }
                    .boxed()
                })
                .await
        })
        .await
    }
}
