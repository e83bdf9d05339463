use {
    agora_store::favorites,
    async_graphql::{Context, Object, Result},
};

use crate::{
    context::Scope,
    error::{ApiError, resolve},
    gate::OwnershipClaim,
    scalars::Id,
    types::FavoriteData,
};

#[derive(Default)]
pub struct FavoriteQuery;

#[Object]
impl FavoriteQuery {
    /// The caller's saved products. Callers without a token get an error;
    /// callers asking about another account get an empty list.
    async fn get_favorite_by_account_id(
        &self,
        ctx: &Context<'_>,
        account_id: Id,
    ) -> Result<FavoriteData> {
        let scope = Scope::of(ctx)?;
        resolve(async move {
            if scope.request.credential.is_missing() {
                return Err(ApiError::unauthenticated());
            }
            let Ok(owner) = OwnershipClaim::new(&scope.request.credential, account_id).authorize()
            else {
                return Ok(FavoriteData::default());
            };
            let rows = favorites::by_account(scope.pool(), owner.get()).await?;
            Ok(FavoriteData {
                favorites: rows.into_iter().map(Into::into).collect(),
            })
        })
        .await
    }

    /// Null unless the caller owns `account_id`.
    async fn get_number_of_favorite_by_account_id(
        &self,
        ctx: &Context<'_>,
        account_id: Id,
    ) -> Result<Option<i64>> {
        let scope = Scope::of(ctx)?;
        resolve(async move {
            let Ok(owner) = OwnershipClaim::new(&scope.request.credential, account_id).authorize()
            else {
                return Ok(None);
            };
            Ok(Some(
                favorites::count_by_account(scope.pool(), owner.get()).await?,
            ))
        })
        .await
    }
}
