use sqlx::SqliteExecutor;

use crate::Result;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FavoriteDetail {
    pub id: i64,
    pub account_id: i64,
    pub product_id: i64,
    pub added_at: String,
    pub product_name: String,
    pub product_price: f64,
    pub product_img_url: String,
    pub product_is_on_sale: bool,
    pub product_avg_rating: Option<f64>,
    pub product_is_available: bool,
}

pub async fn by_account<'e, E: SqliteExecutor<'e>>(
    executor: E,
    account_id: i64,
) -> Result<Vec<FavoriteDetail>> {
    Ok(sqlx::query_as(
        "SELECT f.id, f.account_id, f.product_id, f.added_at, \
                pb.name AS product_name, pb.price AS product_price, \
                pb.img_url AS product_img_url, pb.is_on_sale AS product_is_on_sale, \
                pb.avg_rating AS product_avg_rating, pb.is_available AS product_is_available \
         FROM favorites f JOIN product_briefs pb ON pb.id = f.product_id \
         WHERE f.account_id = ? ORDER BY f.id DESC",
    )
    .bind(account_id)
    .fetch_all(executor)
    .await?)
}

pub async fn count_by_account<'e, E: SqliteExecutor<'e>>(executor: E, account_id: i64) -> Result<i64> {
    Ok(sqlx::query_scalar("SELECT COUNT(*) FROM favorites WHERE account_id = ?")
        .bind(account_id)
        .fetch_one(executor)
        .await?)
}

pub async fn insert<'e, E: SqliteExecutor<'e>>(
    executor: E,
    account_id: i64,
    product_id: i64,
) -> Result<()> {
    sqlx::query("INSERT INTO favorites (account_id, product_id) VALUES (?, ?)")
        .bind(account_id)
        .bind(product_id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Number of rows removed.
pub async fn delete<'e, E: SqliteExecutor<'e>>(
    executor: E,
    account_id: i64,
    product_id: i64,
) -> Result<u64> {
    let result = sqlx::query("DELETE FROM favorites WHERE account_id = ? AND product_id = ?")
        .bind(account_id)
        .bind(product_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use {super::*, crate::testing};

    #[tokio::test]
    async fn favorites_round_trip() {
        let db = testing::db().await;
        let account = testing::account(&db, "fan").await;
        let a = testing::product(&db, account, "A", 3.5).await;
        let b = testing::product(&db, account, "B", 4.0).await;
        insert(db.pool(), account, a).await.unwrap();
        insert(db.pool(), account, b).await.unwrap();
        assert!(insert(db.pool(), account, b).await.is_err());

        let favs = by_account(db.pool(), account).await.unwrap();
        assert_eq!(favs.iter().map(|f| f.product_id).collect::<Vec<_>>(), [b, a]);
        assert_eq!(favs[1].product_price, 3.5);
        assert!(favs[0].product_is_available);
        assert_eq!(count_by_account(db.pool(), account).await.unwrap(), 2);

        assert_eq!(delete(db.pool(), account, a).await.unwrap(), 1);
        assert_eq!(delete(db.pool(), account, a).await.unwrap(), 0);
    }
}
