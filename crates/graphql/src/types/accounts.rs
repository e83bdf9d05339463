use {
    agora_store::accounts,
    async_graphql::{InputObject, SimpleObject},
};

use crate::scalars::Id;

/// An account as clients see it. The password hash never leaves the store.
#[derive(Debug, Clone, SimpleObject)]
pub struct Account {
    pub id: Id,
    pub name: String,
    pub email: Option<String>,
    pub img_url: Option<String>,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub provider: String,
    pub provider_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<accounts::Account> for Account {
    fn from(row: accounts::Account) -> Self {
        Self {
            id: row.id.into(),
            name: row.name,
            email: row.email,
            img_url: row.img_url,
            description: row.description,
            phone: row.phone,
            address: row.address,
            provider: row.provider,
            provider_id: row.provider_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct AccountBrief {
    pub id: Id,
    pub name: String,
    pub img_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<accounts::AccountBrief> for AccountBrief {
    fn from(row: accounts::AccountBrief) -> Self {
        Self {
            id: row.id.into(),
            name: row.name,
            img_url: row.img_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Result of sign-in style operations. Both fields are null when the
/// credentials did not match.
#[derive(Debug, Clone, Default, SimpleObject)]
pub struct AccountDetail {
    pub account: Option<Account>,
    pub access_token: Option<String>,
}

impl AccountDetail {
    pub fn empty() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct AccountData {
    pub accounts: Vec<AccountBrief>,
    pub has_more: bool,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct NumOfPostAndBlog {
    pub total_post: i64,
    pub total_blog: i64,
}

#[derive(Debug, InputObject)]
pub struct UserInput {
    pub name: String,
    pub password: String,
}

#[derive(Debug, InputObject)]
pub struct UserRegisterInput {
    pub name: String,
    pub password: String,
    pub email: String,
}

#[derive(Debug, InputObject)]
pub struct ProviderInput {
    pub provider: String,
    pub provider_id: String,
}

/// Profile fields to change; null fields keep their stored value.
#[derive(Debug, Default, InputObject)]
pub struct UserUpdateData {
    pub name: Option<String>,
    pub email: Option<String>,
    pub img_url: Option<String>,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl From<UserUpdateData> for accounts::AccountChanges {
    fn from(data: UserUpdateData) -> Self {
        Self {
            name: data.name,
            email: data.email,
            img_url: data.img_url,
            description: data.description,
            phone: data.phone,
            address: data.address,
        }
    }
}
