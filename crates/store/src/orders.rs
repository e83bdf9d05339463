use std::{fmt, str::FromStr};

use sqlx::SqliteExecutor;

use crate::{Error, Result, placeholders};

/// Payment state of an order line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payment {
    Incomplete,
    Succeeded,
    Failed,
}

impl Payment {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Incomplete => "Incomplete",
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
        }
    }
}

impl fmt::Display for Payment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Payment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Incomplete" => Ok(Self::Incomplete),
            "Succeeded" => Ok(Self::Succeeded),
            "Failed" => Ok(Self::Failed),
            other => Err(Error::invalid_enum("payment", other)),
        }
    }
}

/// Fulfilment state of an order line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStatus {
    Pending,
    Cancel,
    InProgress,
    Delivered,
    Return,
}

impl LineStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Cancel => "Cancel",
            Self::InProgress => "In Progress",
            Self::Delivered => "Delivered",
            Self::Return => "Return",
        }
    }
}

impl fmt::Display for LineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LineStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Cancel" => Ok(Self::Cancel),
            "In Progress" => Ok(Self::InProgress),
            "Delivered" => Ok(Self::Delivered),
            "Return" => Ok(Self::Return),
            other => Err(Error::invalid_enum("status", other)),
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Order {
    pub id: i64,
    pub session_id: String,
    pub account_id: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderProductDetail {
    pub id: i64,
    pub quantity: i64,
    pub payment: String,
    pub status: String,
    pub order_id: i64,
    pub product_id: i64,
    pub ordered_at: String,
    pub updated_at: String,
    pub product_name: String,
    pub product_price: f64,
    pub product_img_url: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RecentOrder {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub product_price: f64,
    pub product_img_url: String,
    pub payment: String,
    pub status: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct SiteTotals {
    pub total_user: i64,
    pub total_product: i64,
    pub total_order: i64,
    pub total_blog: i64,
}

/// One line of a new order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewLine {
    pub product_id: i64,
    pub quantity: i64,
}

pub async fn count_by_account<'e, E: SqliteExecutor<'e>>(executor: E, account_id: i64) -> Result<i64> {
    Ok(sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE account_id = ?")
        .bind(account_id)
        .fetch_one(executor)
        .await?)
}

pub async fn by_account<'e, E: SqliteExecutor<'e>>(
    executor: E,
    account_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<Order>> {
    Ok(sqlx::query_as(
        "SELECT * FROM orders WHERE account_id = ? ORDER BY id DESC LIMIT ? OFFSET ?",
    )
    .bind(account_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(executor)
    .await?)
}

pub async fn find_by_session<'e, E: SqliteExecutor<'e>>(
    executor: E,
    session_id: &str,
) -> Result<Option<Order>> {
    Ok(sqlx::query_as("SELECT * FROM orders WHERE session_id = ?")
        .bind(session_id)
        .fetch_optional(executor)
        .await?)
}

pub async fn insert_order<'e, E: SqliteExecutor<'e>>(
    executor: E,
    account_id: i64,
    session_id: &str,
) -> Result<i64> {
    let result = sqlx::query("INSERT INTO orders (account_id, session_id) VALUES (?, ?)")
        .bind(account_id)
        .bind(session_id)
        .execute(executor)
        .await?;
    Ok(result.last_insert_rowid())
}

pub async fn insert_lines(
    conn: &mut sqlx::SqliteConnection,
    order_id: i64,
    lines: &[NewLine],
) -> Result<()> {
    for line in lines {
        sqlx::query("INSERT INTO order_products (quantity, product_id, order_id) VALUES (?, ?, ?)")
            .bind(line.quantity)
            .bind(line.product_id)
            .bind(order_id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

/// Set payment (when given) and status on every line of an order.
pub async fn mark_lines<'e, E: SqliteExecutor<'e>>(
    executor: E,
    order_id: i64,
    payment: Option<Payment>,
    status: LineStatus,
) -> Result<u64> {
    let result = sqlx::query(
        "UPDATE order_products \
         SET payment = COALESCE(?, payment), status = ?, updated_at = datetime('now') \
         WHERE order_id = ?",
    )
    .bind(payment.map(Payment::as_str))
    .bind(status.as_str())
    .bind(order_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

/// Lines of every order in `order_ids`, in insertion order, in one statement.
pub async fn lines_for_orders<'e, E: SqliteExecutor<'e>>(
    executor: E,
    order_ids: &[i64],
) -> Result<Vec<OrderProductDetail>> {
    if order_ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT op.id, op.quantity, op.payment, op.status, op.order_id, op.product_id, \
                op.ordered_at, op.updated_at, p.name AS product_name, \
                p.price AS product_price, p.img_url AS product_img_url \
         FROM order_products op JOIN products p ON p.id = op.product_id \
         WHERE op.order_id IN ({}) ORDER BY op.id",
        placeholders(order_ids.len())
    );
    let mut query = sqlx::query_as(&sql);
    for id in order_ids {
        query = query.bind(id);
    }
    Ok(query.fetch_all(executor).await?)
}

pub async fn recent_lines<'e, E: SqliteExecutor<'e>>(
    executor: E,
    limit: i64,
    offset: i64,
) -> Result<Vec<RecentOrder>> {
    Ok(sqlx::query_as(
        "SELECT op.id, p.id AS product_id, p.name AS product_name, p.price AS product_price, \
                p.img_url AS product_img_url, op.payment, op.status \
         FROM order_products op JOIN products p ON p.id = op.product_id \
         ORDER BY op.id DESC LIMIT ? OFFSET ?",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(executor)
    .await?)
}

/// Site-wide totals; orders count only paid lines.
pub async fn site_totals<'e, E: SqliteExecutor<'e>>(executor: E) -> Result<SiteTotals> {
    Ok(sqlx::query_as(
        "SELECT (SELECT COUNT(*) FROM accounts) AS total_user, \
                (SELECT COUNT(*) FROM products) AS total_product, \
                (SELECT COUNT(*) FROM order_products WHERE payment = 'Succeeded') AS total_order, \
                (SELECT COUNT(*) FROM blogs) AS total_blog",
    )
    .fetch_one(executor)
    .await?)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use {super::*, crate::testing};

    #[test]
    fn enum_text_matches_stored_values() {
        assert_eq!(LineStatus::InProgress.as_str(), "In Progress");
        assert_eq!("In Progress".parse::<LineStatus>().unwrap(), LineStatus::InProgress);
        assert_eq!("Failed".parse::<Payment>().unwrap(), Payment::Failed);
        assert!("Paid".parse::<Payment>().is_err());
    }

    #[tokio::test]
    async fn order_lifecycle() {
        let db = testing::db().await;
        let buyer = testing::account(&db, "buyer").await;
        let lamp = testing::product(&db, buyer, "Lamp", 10.0).await;
        let rug = testing::product(&db, buyer, "Rug", 5.0).await;

        let mut conn = db.pool().acquire().await.unwrap();
        let order = insert_order(&mut *conn, buyer, "cs_1").await.unwrap();
        insert_lines(&mut conn, order, &[
            NewLine { product_id: lamp, quantity: 2 },
            NewLine { product_id: rug, quantity: 1 },
        ])
        .await
        .unwrap();
        drop(conn);

        let lines = lines_for_orders(db.pool(), &[order]).await.unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].status, "Pending");
        assert_eq!(lines[0].payment, "Incomplete");
        assert_eq!(lines[0].product_name, "Lamp");

        let updated = mark_lines(db.pool(), order, Some(Payment::Succeeded), LineStatus::InProgress)
            .await
            .unwrap();
        assert_eq!(updated, 2);
        let totals = site_totals(db.pool()).await.unwrap();
        assert_eq!(totals.total_order, 2);
        assert_eq!(totals.total_user, 1);

        mark_lines(db.pool(), order, None, LineStatus::Cancel).await.unwrap();
        let recent = recent_lines(db.pool(), 5, 0).await.unwrap();
        assert_eq!(recent[0].product_name, "Rug");
        assert_eq!(recent[0].status, "Cancel");
        assert_eq!(recent[0].payment, "Succeeded");

        assert_eq!(find_by_session(db.pool(), "cs_1").await.unwrap().unwrap().id, order);
        assert_eq!(count_by_account(db.pool(), buyer).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn zero_quantity_line_is_rejected() {
        let db = testing::db().await;
        let buyer = testing::account(&db, "buyer").await;
        let lamp = testing::product(&db, buyer, "Lamp", 10.0).await;
        let mut conn = db.pool().acquire().await.unwrap();
        let order = insert_order(&mut *conn, buyer, "cs_2").await.unwrap();
        let err = insert_lines(&mut conn, order, &[NewLine {
            product_id: lamp,
            quantity: 0,
        }])
        .await;
        assert!(err.is_err());
    }
}
