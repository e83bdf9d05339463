use {
    agora_auth::{hash_password, verify_password},
    agora_store::accounts::{self, AccountChanges},
    async_graphql::{Context, Object, Result, Upload},
    futures::FutureExt,
    tracing::info,
};

use crate::{
    context::Scope,
    error::{ApiError, ApiResult, resolve},
    gate::{OwnershipClaim, transaction},
    scalars::Id,
    types::{AccountDetail, ProviderInput, UserInput, UserRegisterInput, UserUpdateData},
    uploads::FileUpload,
};

#[derive(Default)]
pub struct AccountMutation;

/// Issue a token pair for `account`, queue the refresh cookie and return
/// the account with its access token.
fn sign_in(scope: &Scope<'_>, account: accounts::Account) -> ApiResult<AccountDetail> {
    let pair = scope.app.tokens.issue(account.id)?;
    scope
        .request
        .set_cookie(scope.app.refresh_cookie.set(&pair.refresh_token));
    info!(account_id = account.id, "signed in");
    Ok(AccountDetail {
        account: Some(account.into()),
        access_token: Some(pair.access_token),
    })
}

async fn password_matches(password: String, hash: String) -> ApiResult<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| ApiError::internal(format!("password check failed: {e}")))
}

#[Object]
impl AccountMutation {
    /// Create a local account and sign it in.
    async fn register(
        &self,
        ctx: &Context<'_>,
        user_register: UserRegisterInput,
    ) -> Result<AccountDetail> {
        let scope = Scope::of(ctx)?;
        resolve(async move {
            let UserRegisterInput {
                name,
                password,
                email,
            } = user_register;
            if accounts::find_local_by_name(scope.pool(), &name)
                .await?
                .is_some()
            {
                return Err(ApiError::bad_input("Username already exists"));
            }
            let hash = tokio::task::spawn_blocking(move || hash_password(&password))
                .await
                .map_err(|e| ApiError::internal(format!("password hashing failed: {e}")))??;

            let id = transaction(scope.pool(), move |conn| {
                async move { Ok(accounts::insert_local(&mut *conn, &name, &email, &hash).await?) }
                    .boxed()
            })
            .await?;

            let account = accounts::find_by_id(scope.pool(), id)
                .await?
                .ok_or_else(|| ApiError::internal("registered account vanished"))?;
            sign_in(&scope, account)
        })
        .await
    }

    /// Sign in with a local name and password. Both fields are null when the
    /// credentials do not match.
    async fn login(&self, ctx: &Context<'_>, user_input: Option<UserInput>) -> Result<AccountDetail> {
        let scope = Scope::of(ctx)?;
        resolve(async move {
            let Some(UserInput { name, password }) = user_input else {
                return Ok(AccountDetail::empty());
            };
            let Some(account) = accounts::find_local_by_name(scope.pool(), &name).await? else {
                return Ok(AccountDetail::empty());
            };
            if !password_matches(password, account.password.clone()).await? {
                return Ok(AccountDetail::empty());
            }
            sign_in(&scope, account)
        })
        .await
    }

    /// Sign in an account created through an external identity provider.
    async fn provider_login(
        &self,
        ctx: &Context<'_>,
        provider_input: ProviderInput,
    ) -> Result<AccountDetail> {
        let scope = Scope::of(ctx)?;
        resolve(async move {
            let found = accounts::find_by_provider(
                scope.pool(),
                &provider_input.provider,
                &provider_input.provider_id,
            )
            .await?;
            match found {
                Some(account) => sign_in(&scope, account),
                None => Ok(AccountDetail::empty()),
            }
        })
        .await
    }

    async fn logout(&self, ctx: &Context<'_>) -> Result<bool> {
        let scope = Scope::of(ctx)?;
        scope.request.set_cookie(scope.app.refresh_cookie.clear());
        Ok(true)
    }

    /// Change profile fields of the caller's account, optionally replacing
    /// the avatar.
    async fn update_user(
        &self,
        ctx: &Context<'_>,
        account_id: Id,
        user_update_data: Option<UserUpdateData>,
        user_img: Option<Upload>,
    ) -> Result<AccountDetail> {
        let scope = Scope::of(ctx)?;
        let image = user_img
            .as_ref()
            .map(|upload| FileUpload::read(ctx, upload))
            .transpose();
        resolve(async move {
            let image = image?;
            let mut changes = AccountChanges::from(user_update_data.unwrap_or_default());
            let storage = scope.app.services.storage.clone();
            let claim = OwnershipClaim::new(&scope.request.credential, account_id);

            let updated = scope
                .app
                .gate()
                .run(claim, move |conn, account| {
                    async move {
                        if let Some(image) = image {
                            changes.img_url =
                                Some(image.store(storage.as_ref(), "user", account.get()).await?);
                        }
                        if changes.is_empty() {
                            return Ok(None);
                        }
                        accounts::update(&mut *conn, account.get(), &changes).await?;
                        Ok(Some(account))
                    }
                    .boxed()
                })
                .await?;

            let Some(account) = updated else {
                return Ok(AccountDetail::empty());
            };
            let account = accounts::find_by_id(scope.pool(), account.get()).await?;
            Ok(AccountDetail {
                account: account.map(Into::into),
                access_token: None,
            })
        })
        .await
    }
}
