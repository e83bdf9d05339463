//! Ownership-gated mutations.
//!
//! A mutation acting on behalf of an account runs only when the access
//! credential of the request belongs to that account, and its writes
//! commit or roll back as one unit.
//!
//! ```text
//! authorize ── fail ──▶ rejected (no database access)
//!     │
//!   begin ─▶ body ─ ok ─▶ commit ─▶ caller re-reads through the pool
//!                 └ err ─▶ rollback ─▶ original error
//! ```

use std::fmt;

use {
    agora_auth::Credential,
    agora_common::RecordId,
    futures::future::BoxFuture,
    sqlx::{SqliteConnection, SqlitePool},
    tracing::{debug, warn},
};

use crate::error::{ApiError, ApiResult};

/// The authenticated caller paired with the account a mutation acts as.
#[derive(Debug, Clone)]
pub struct OwnershipClaim<'a> {
    credential: &'a Credential,
    acting_as: String,
}

impl<'a> OwnershipClaim<'a> {
    /// `acting_as` may be any id spelling; both sides compare as strings.
    pub fn new(credential: &'a Credential, acting_as: impl fmt::Display) -> Self {
        Self {
            credential,
            acting_as: acting_as.to_string(),
        }
    }

    /// Check the claim and return the account id the caller acts as.
    pub fn authorize(&self) -> ApiResult<RecordId> {
        let identity = self
            .credential
            .identity()
            .ok_or_else(ApiError::unauthenticated)?;
        let acting_as = self.acting_as.trim();
        if identity.account_id.trim() != acting_as {
            debug!(
                caller = %identity.account_id,
                acting_as,
                "ownership claim rejected"
            );
            return Err(ApiError::forbidden());
        }
        RecordId::parse(acting_as).map_err(|_| ApiError::forbidden())
    }
}

/// Runs authorized mutation bodies inside one transaction.
#[derive(Debug, Clone)]
pub struct OwnershipGate {
    pool: SqlitePool,
}

impl OwnershipGate {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Authorize `claim`, then run `body` on a dedicated connection inside a
    /// transaction.
    ///
    /// The body receives the authorized account id. Any error from the body
    /// rolls back every write it made and is returned unchanged.
    pub async fn run<T, F>(&self, claim: OwnershipClaim<'_>, body: F) -> ApiResult<T>
    where
        T: Send,
        F: for<'c> FnOnce(&'c mut SqliteConnection, RecordId) -> BoxFuture<'c, ApiResult<T>>,
    {
        let account_id = claim.authorize()?;
        transaction(&self.pool, move |conn| body(conn, account_id))
            .await
            .inspect_err(|e| debug!(%account_id, code = e.code(), "gated mutation failed"))
    }
}

/// Run `body` inside one transaction on a connection checked out of `pool`.
///
/// Commits when the body succeeds. Otherwise rolls back and returns the
/// body's error unchanged.
pub async fn transaction<T, F>(pool: &SqlitePool, body: F) -> ApiResult<T>
where
    T: Send,
    F: for<'c> FnOnce(&'c mut SqliteConnection) -> BoxFuture<'c, ApiResult<T>>,
{
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| ApiError::Transaction(e.into()))?;

    match body(&mut *tx).await {
        Ok(value) => {
            tx.commit()
                .await
                .map_err(|e| ApiError::Transaction(e.into()))?;
            Ok(value)
        },
        Err(e) => {
            if let Err(rollback) = tx.rollback().await {
                warn!(error = %rollback, "rollback failed");
            }
            warn!(error = %e, "transaction rolled back");
            Err(e)
        },
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use {
        super::*,
        agora_auth::{AuthIdentity, TokenIssuer},
        agora_store::{
            Database, accounts, catalog,
            orders::{self, NewLine},
            posts,
        },
        futures::FutureExt,
        secrecy::Secret,
        std::time::Duration,
    };

    fn signed_in(account_id: &str) -> Credential {
        Credential::Valid(AuthIdentity {
            account_id: account_id.into(),
            access_token: "token".into(),
        })
    }

    async fn seeded() -> (Database, i64, i64) {
        let db = Database::connect_in_memory().await.unwrap();
        let buyer = accounts::insert_local(db.pool(), "buyer", "b@example.com", "h")
            .await
            .unwrap();
        let product = catalog::insert_product(db.pool(), &catalog::NewProduct {
            name: "Lamp",
            price: 12.5,
            description: "",
            img_url: "http://img/lamp.png",
            is_on_sale: false,
            created_by: buyer,
        })
        .await
        .unwrap();
        (db, buyer, product)
    }

    async fn count(db: &Database, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    #[test]
    fn numeric_and_string_ids_match() {
        let credential = signed_in("3");
        let id = OwnershipClaim::new(&credential, 3).authorize().unwrap();
        assert_eq!(id, RecordId::new(3));
        assert!(OwnershipClaim::new(&credential, "3").authorize().is_ok());
    }

    #[test]
    fn missing_credential_is_unauthenticated() {
        let err = OwnershipClaim::new(&Credential::Missing, 3)
            .authorize()
            .expect_err("no credential");
        assert_eq!(err.code(), "UNAUTHENTICATED");
        let err = OwnershipClaim::new(&Credential::Invalid, 3)
            .authorize()
            .expect_err("bad credential");
        assert_eq!(err.code(), "UNAUTHENTICATED");
    }

    #[test]
    fn verified_token_round_trips_through_claim() {
        let issuer = TokenIssuer::new(
            &Secret::new("a".into()),
            &Secret::new("r".into()),
            Duration::from_secs(60),
            Duration::from_secs(60),
        );
        let pair = issuer.issue(RecordId::new(3)).unwrap();
        let header = format!("Bearer {}", pair.access_token);
        let credential = Credential::from_authorization(Some(&header), &issuer);
        assert!(OwnershipClaim::new(&credential, 3).authorize().is_ok());
    }

    #[tokio::test]
    async fn mismatched_identity_writes_nothing() {
        let (db, buyer, product) = seeded().await;
        let gate = OwnershipGate::new(db.pool().clone());
        let credential = signed_in("4");

        let err = gate
            .run(OwnershipClaim::new(&credential, buyer), move |conn, account| {
                async move {
                    posts::insert(&mut *conn, account.get(), product, "hello").await?;
                    Ok(())
                }
                .boxed()
            })
            .await
            .expect_err("acting for another account");

        assert_eq!(err.code(), "FORBIDDEN");
        assert_eq!(count(&db, "posts").await, 0);
    }

    #[tokio::test]
    async fn matching_identity_commits() {
        let (db, buyer, product) = seeded().await;
        let gate = OwnershipGate::new(db.pool().clone());
        let credential = signed_in(&buyer.to_string());

        let post_id = gate
            .run(OwnershipClaim::new(&credential, buyer), move |conn, account| {
                async move { Ok(posts::insert(&mut *conn, account.get(), product, "hi").await?) }
                    .boxed()
            })
            .await
            .unwrap();

        let post = posts::find(db.pool(), post_id).await.unwrap().unwrap();
        assert_eq!(post.content, "hi");
    }

    #[tokio::test]
    async fn failing_line_items_roll_back_the_order() {
        let (db, buyer, product) = seeded().await;
        let gate = OwnershipGate::new(db.pool().clone());
        let credential = signed_in(&buyer.to_string());

        let err = gate
            .run(OwnershipClaim::new(&credential, buyer), move |conn, account| {
                async move {
                    let order_id = orders::insert_order(&mut *conn, account.get(), "cs_1").await?;
                    // Quantity 0 violates the line-item check constraint.
                    orders::insert_lines(conn, order_id, &[NewLine {
                        product_id: product,
                        quantity: 0,
                    }])
                    .await?;
                    Ok(order_id)
                }
                .boxed()
            })
            .await
            .expect_err("line insert fails");

        assert_eq!(err.code(), "INTERNAL");
        assert_eq!(count(&db, "orders").await, 0);
        assert_eq!(count(&db, "order_products").await, 0);
    }
}
