use sqlx::SqliteExecutor;

use crate::Result;

pub const LOCAL_PROVIDER: &str = "local";

/// Full account row. `password` holds the argon2 hash and never leaves the server.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub password: String,
    pub img_url: Option<String>,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub provider: String,
    pub provider_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AccountBrief {
    pub id: i64,
    pub name: String,
    pub img_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Profile fields an owner may change. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct AccountChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub img_url: Option<String>,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl AccountChanges {
    fn columns(&self) -> Vec<(&'static str, &str)> {
        [
            ("name", &self.name),
            ("email", &self.email),
            ("img_url", &self.img_url),
            ("description", &self.description),
            ("phone", &self.phone),
            ("address", &self.address),
        ]
        .into_iter()
        .filter_map(|(column, value)| value.as_deref().map(|v| (column, v)))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.columns().is_empty()
    }
}

pub async fn find_by_id<'e, E: SqliteExecutor<'e>>(executor: E, id: i64) -> Result<Option<Account>> {
    Ok(sqlx::query_as("SELECT * FROM accounts WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await?)
}

pub async fn find_local_by_name<'e, E: SqliteExecutor<'e>>(
    executor: E,
    name: &str,
) -> Result<Option<Account>> {
    Ok(
        sqlx::query_as("SELECT * FROM accounts WHERE name = ? AND provider = ?")
            .bind(name)
            .bind(LOCAL_PROVIDER)
            .fetch_optional(executor)
            .await?,
    )
}

pub async fn find_by_provider<'e, E: SqliteExecutor<'e>>(
    executor: E,
    provider: &str,
    provider_id: &str,
) -> Result<Option<Account>> {
    Ok(
        sqlx::query_as("SELECT * FROM accounts WHERE provider = ? AND provider_id = ?")
            .bind(provider)
            .bind(provider_id)
            .fetch_optional(executor)
            .await?,
    )
}

/// Insert a password account and return its id.
pub async fn insert_local<'e, E: SqliteExecutor<'e>>(
    executor: E,
    name: &str,
    email: &str,
    password_hash: &str,
) -> Result<i64> {
    let result = sqlx::query("INSERT INTO accounts (name, email, password) VALUES (?, ?, ?)")
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .execute(executor)
        .await?;
    Ok(result.last_insert_rowid())
}

/// An account created on first sign-in through an external identity provider.
#[derive(Debug, Clone)]
pub struct NewProviderAccount<'a> {
    pub name: &'a str,
    pub email: Option<&'a str>,
    pub img_url: Option<&'a str>,
    pub provider: &'a str,
    pub provider_id: &'a str,
    pub password_hash: &'a str,
}

pub async fn insert_provider<'e, E: SqliteExecutor<'e>>(
    executor: E,
    account: &NewProviderAccount<'_>,
) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO accounts (name, email, img_url, provider, provider_id, password) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(account.name)
    .bind(account.email)
    .bind(account.img_url)
    .bind(account.provider)
    .bind(account.provider_id)
    .bind(account.password_hash)
    .execute(executor)
    .await?;
    Ok(result.last_insert_rowid())
}

/// Apply the non-empty fields of `changes`. Returns `false` when there was nothing to set.
pub async fn update<'e, E: SqliteExecutor<'e>>(
    executor: E,
    id: i64,
    changes: &AccountChanges,
) -> Result<bool> {
    let columns = changes.columns();
    if columns.is_empty() {
        return Ok(false);
    }
    let assignments: Vec<String> = columns.iter().map(|(c, _)| format!("{c} = ?")).collect();
    let sql = format!(
        "UPDATE accounts SET {}, updated_at = datetime('now') WHERE id = ?",
        assignments.join(", ")
    );
    let mut query = sqlx::query(&sql);
    for (_, value) in &columns {
        query = query.bind(*value);
    }
    query.bind(id).execute(executor).await?;
    Ok(true)
}

pub async fn list_all<'e, E: SqliteExecutor<'e>>(executor: E) -> Result<Vec<Account>> {
    Ok(sqlx::query_as("SELECT * FROM accounts ORDER BY id")
        .fetch_all(executor)
        .await?)
}

/// Newest accounts first; `limit` is passed through, callers over-fetch by one.
pub async fn list_recent<'e, E: SqliteExecutor<'e>>(
    executor: E,
    limit: i64,
    offset: i64,
) -> Result<Vec<AccountBrief>> {
    Ok(sqlx::query_as(
        "SELECT id, name, img_url, created_at, updated_at FROM accounts \
         ORDER BY id DESC LIMIT ? OFFSET ?",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(executor)
    .await?)
}

/// `(posts, blogs)` written by an account.
pub async fn count_posts_and_blogs<'e, E: SqliteExecutor<'e>>(
    executor: E,
    account_id: i64,
) -> Result<(i64, i64)> {
    Ok(sqlx::query_as(
        "SELECT (SELECT COUNT(*) FROM posts WHERE account_id = ?1), \
                (SELECT COUNT(*) FROM blogs WHERE account_id = ?1)",
    )
    .bind(account_id)
    .fetch_one(executor)
    .await?)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use {super::*, crate::testing};

    #[tokio::test]
    async fn local_accounts_are_found_by_name() {
        let db = testing::db().await;
        let id = insert_local(db.pool(), "ana", "ana@example.com", "h")
            .await
            .unwrap();
        let found = find_local_by_name(db.pool(), "ana").await.unwrap().unwrap();
        assert_eq!(found.id, id);
        assert_eq!(found.provider, LOCAL_PROVIDER);
        assert!(find_local_by_name(db.pool(), "bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_local_name_is_rejected() {
        let db = testing::db().await;
        insert_local(db.pool(), "ana", "a@x", "h").await.unwrap();
        assert!(insert_local(db.pool(), "ana", "b@x", "h").await.is_err());
    }

    #[tokio::test]
    async fn provider_accounts_do_not_collide_with_local_names() {
        let db = testing::db().await;
        insert_local(db.pool(), "ana", "a@x", "h").await.unwrap();
        let id = insert_provider(db.pool(), &NewProviderAccount {
            name: "ana",
            email: None,
            img_url: None,
            provider: "google",
            provider_id: "g-1",
            password_hash: "h",
        })
        .await
        .unwrap();
        let found = find_by_provider(db.pool(), "google", "g-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, id);
    }

    #[tokio::test]
    async fn update_touches_only_given_fields() {
        let db = testing::db().await;
        let id = testing::account(&db, "ana").await;

        assert!(!update(db.pool(), id, &AccountChanges::default()).await.unwrap());

        let changes = AccountChanges {
            phone: Some("555".into()),
            ..AccountChanges::default()
        };
        assert!(update(db.pool(), id, &changes).await.unwrap());
        let account = find_by_id(db.pool(), id).await.unwrap().unwrap();
        assert_eq!(account.phone.as_deref(), Some("555"));
        assert_eq!(account.email.as_deref(), Some("ana@example.com"));
    }

    #[tokio::test]
    async fn recent_accounts_newest_first() {
        let db = testing::db().await;
        for name in ["a", "b", "c"] {
            testing::account(&db, name).await;
        }
        let rows = list_recent(db.pool(), 2, 0).await.unwrap();
        let names: Vec<_> = rows.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["c", "b"]);
        assert_eq!(count_posts_and_blogs(db.pool(), rows[0].id).await.unwrap(), (0, 0));
    }
}
