use {
    agora_common::Page,
    agora_store::accounts,
    async_graphql::{Context, Object, Result},
};

use crate::{
    context::Scope,
    error::resolve,
    queries::page,
    scalars::Id,
    types::{Account, AccountBrief, AccountData, AccountDetail, NumOfPostAndBlog},
};

#[derive(Default)]
pub struct AccountQuery;

#[Object]
impl AccountQuery {
    async fn hello(&self) -> &'static str {
        "hello"
    }

    /// Every account, oldest first.
    async fn get_all_account(&self, ctx: &Context<'_>) -> Result<Vec<Account>> {
        let scope = Scope::of(ctx)?;
        resolve(async move {
            let rows = accounts::list_all(scope.pool()).await?;
            Ok(rows.into_iter().map(Account::from).collect())
        })
        .await
    }

    /// The account behind the presented access token, with that token.
    async fn me(&self, ctx: &Context<'_>) -> Result<AccountDetail> {
        let scope = Scope::of(ctx)?;
        resolve(async move {
            let Some(identity) = scope.request.credential.identity() else {
                return Ok(AccountDetail::empty());
            };
            let Ok(id) = identity.account_id.parse::<i64>() else {
                return Ok(AccountDetail::empty());
            };
            Ok(match accounts::find_by_id(scope.pool(), id).await? {
                Some(account) => AccountDetail {
                    account: Some(account.into()),
                    access_token: Some(identity.access_token.clone()),
                },
                None => AccountDetail::empty(),
            })
        })
        .await
    }

    /// Another account's public profile; only visible to signed-in callers.
    async fn other_user(&self, ctx: &Context<'_>, account_id: Id) -> Result<AccountDetail> {
        let scope = Scope::of(ctx)?;
        resolve(async move {
            if scope.request.credential.identity().is_none() {
                return Ok(AccountDetail::empty());
            }
            let account = accounts::find_by_id(scope.pool(), account_id.get()).await?;
            Ok(AccountDetail {
                account: account.map(Account::from),
                access_token: None,
            })
        })
        .await
    }

    async fn get_num_of_post_and_blog(
        &self,
        ctx: &Context<'_>,
        account_id: Id,
    ) -> Result<NumOfPostAndBlog> {
        let scope = Scope::of(ctx)?;
        resolve(async move {
            let (total_post, total_blog) =
                accounts::count_posts_and_blogs(scope.pool(), account_id.get()).await?;
            Ok(NumOfPostAndBlog {
                total_post,
                total_blog,
            })
        })
        .await
    }

    /// Newest accounts first.
    async fn get_recent_account(
        &self,
        ctx: &Context<'_>,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<AccountData> {
        let scope = Scope::of(ctx)?;
        let request = page(limit, scope.app.limits.recent_accounts, offset);
        resolve(async move {
            let rows =
                accounts::list_recent(scope.pool(), request.fetch_limit(), request.offset()).await?;
            let page = Page::from_overfetch(rows, request).map(AccountBrief::from);
            Ok(AccountData {
                accounts: page.items,
                has_more: page.has_more,
            })
        })
        .await
    }
}
