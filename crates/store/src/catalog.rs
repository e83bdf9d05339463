use sqlx::SqliteExecutor;

use crate::{Result, placeholders};

/// Separator between image URLs (and description paragraphs) in one column.
pub const LIST_SEPARATOR: &str = "<br/>";

/// Category excluded from "similar products" unless it is the only one.
pub const CATCH_ALL_CATEGORY: &str = "others";

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub img_url: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryDetail {
    pub id: i64,
    pub name: String,
    pub img_url: Option<String>,
    pub number_of_product: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductBrief {
    pub id: i64,
    pub name: String,
    pub img_url: String,
    pub price: f64,
    pub is_on_sale: bool,
    pub is_available: bool,
    pub avg_rating: Option<f64>,
    pub rating_times: i64,
    pub total_order_count: i64,
}

impl ProductBrief {
    pub fn first_image(&self) -> Option<&str> {
        self.img_url
            .split(LIST_SEPARATOR)
            .map(str::trim)
            .find(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Product {
    #[sqlx(flatten)]
    pub brief: ProductBrief,
    pub description: String,
    pub created_by: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductWithAccount {
    #[sqlx(flatten)]
    pub product: Product,
    pub account_name: String,
    pub account_img_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProductCounts {
    pub all: i64,
    pub on_sale: i64,
}

/// Orderings for the catalog listings. Each ends on `id` so pages are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
    OnSale,
    Popular,
    TopRated,
    All,
}

impl Listing {
    fn filter(self) -> &'static str {
        match self {
            Self::OnSale => "is_available = 1 AND is_on_sale = 1",
            Self::Popular | Self::TopRated | Self::All => "is_available = 1",
        }
    }

    fn order(self) -> &'static str {
        match self {
            Self::OnSale | Self::TopRated => "avg_rating DESC, rating_times DESC, id DESC",
            Self::Popular => {
                "total_order_count DESC, avg_rating DESC, rating_times DESC, id DESC"
            },
            Self::All => "id ASC",
        }
    }
}

const BRIEF_COLUMNS: &str = "pb.id, pb.name, pb.img_url, pb.price, pb.is_on_sale, \
     pb.is_available, pb.avg_rating, pb.rating_times, pb.total_order_count";

const PRODUCT_COLUMNS: &str = "pb.id, pb.name, pb.img_url, pb.price, pb.is_on_sale, \
     pb.is_available, pb.avg_rating, pb.rating_times, pb.total_order_count, \
     pb.description, pb.created_by, pb.created_at, pb.updated_at";

pub struct NewProduct<'a> {
    pub name: &'a str,
    pub price: f64,
    pub description: &'a str,
    pub img_url: &'a str,
    pub is_on_sale: bool,
    pub created_by: i64,
}

/// Mutable product fields; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub description: Option<String>,
    pub is_on_sale: Option<bool>,
    pub img_url: Option<String>,
}

// ── Categories ──────────────────────────────────────────────────────────────

pub async fn list_categories<'e, E: SqliteExecutor<'e>>(executor: E) -> Result<Vec<CategoryDetail>> {
    Ok(sqlx::query_as(
        "SELECT c.id, c.name, c.img_url, COUNT(cp.product_id) AS number_of_product \
         FROM categories c LEFT JOIN category_products cp ON cp.category_id = c.id \
         GROUP BY c.id ORDER BY c.id",
    )
    .fetch_all(executor)
    .await?)
}

pub async fn categories_of<'e, E: SqliteExecutor<'e>>(
    executor: E,
    product_id: i64,
) -> Result<Vec<Category>> {
    Ok(sqlx::query_as(
        "SELECT c.id, c.name, c.img_url FROM categories c \
         JOIN category_products cp ON cp.category_id = c.id \
         WHERE cp.product_id = ? ORDER BY c.id",
    )
    .bind(product_id)
    .fetch_all(executor)
    .await?)
}

pub async fn link_categories(
    conn: &mut sqlx::SqliteConnection,
    product_id: i64,
    category_ids: &[i64],
) -> Result<()> {
    for category_id in category_ids {
        sqlx::query("INSERT OR IGNORE INTO category_products (category_id, product_id) VALUES (?, ?)")
            .bind(category_id)
            .bind(product_id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

pub async fn replace_categories(
    conn: &mut sqlx::SqliteConnection,
    product_id: i64,
    category_ids: &[i64],
) -> Result<()> {
    sqlx::query("DELETE FROM category_products WHERE product_id = ?")
        .bind(product_id)
        .execute(&mut *conn)
        .await?;
    link_categories(conn, product_id, category_ids).await
}

// ── Products ────────────────────────────────────────────────────────────────

pub async fn count_available<'e, E: SqliteExecutor<'e>>(executor: E) -> Result<ProductCounts> {
    let (all, on_sale): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(SUM(is_on_sale), 0) FROM products WHERE is_available = 1",
    )
    .fetch_one(executor)
    .await?;
    Ok(ProductCounts { all, on_sale })
}

pub async fn list<'e, E: SqliteExecutor<'e>>(
    executor: E,
    listing: Listing,
    limit: i64,
    offset: i64,
) -> Result<Vec<ProductBrief>> {
    let sql = format!(
        "SELECT {BRIEF_COLUMNS} FROM product_briefs pb WHERE {} ORDER BY {} LIMIT ? OFFSET ?",
        listing.filter(),
        listing.order()
    );
    Ok(sqlx::query_as(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(executor)
        .await?)
}

/// Products in the given id set, in id order. Unknown ids are skipped.
pub async fn by_ids<'e, E: SqliteExecutor<'e>>(executor: E, ids: &[i64]) -> Result<Vec<ProductBrief>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT {BRIEF_COLUMNS} FROM product_briefs pb WHERE pb.id IN ({}) ORDER BY pb.id",
        placeholders(ids.len())
    );
    let mut query = sqlx::query_as(&sql);
    for id in ids {
        query = query.bind(id);
    }
    Ok(query.fetch_all(executor).await?)
}

pub async fn by_category<'e, E: SqliteExecutor<'e>>(
    executor: E,
    category_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<ProductBrief>> {
    let sql = format!(
        "SELECT {BRIEF_COLUMNS} FROM product_briefs pb \
         JOIN category_products cp ON cp.product_id = pb.id \
         WHERE cp.category_id = ? AND pb.is_available = 1 \
         ORDER BY pb.avg_rating DESC, pb.rating_times DESC, pb.total_order_count DESC, pb.id DESC \
         LIMIT ? OFFSET ?"
    );
    Ok(sqlx::query_as(&sql)
        .bind(category_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(executor)
        .await?)
}

pub async fn count_by_creator<'e, E: SqliteExecutor<'e>>(executor: E, account_id: i64) -> Result<i64> {
    Ok(
        sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE created_by = ?")
            .bind(account_id)
            .fetch_one(executor)
            .await?,
    )
}

/// Every product of a creator, available or not, best sellers first.
pub async fn by_creator<'e, E: SqliteExecutor<'e>>(
    executor: E,
    account_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<ProductBrief>> {
    let sql = format!(
        "SELECT {BRIEF_COLUMNS} FROM product_briefs pb WHERE pb.created_by = ? \
         ORDER BY pb.total_order_count DESC, pb.id DESC LIMIT ? OFFSET ?"
    );
    Ok(sqlx::query_as(&sql)
        .bind(account_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(executor)
        .await?)
}

pub async fn find<'e, E: SqliteExecutor<'e>>(executor: E, id: i64) -> Result<Option<Product>> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM product_briefs pb WHERE pb.id = ?");
    Ok(sqlx::query_as(&sql).bind(id).fetch_optional(executor).await?)
}

pub async fn find_with_account<'e, E: SqliteExecutor<'e>>(
    executor: E,
    id: i64,
) -> Result<Option<ProductWithAccount>> {
    let sql = format!(
        "SELECT {PRODUCT_COLUMNS}, a.name AS account_name, a.img_url AS account_img_url \
         FROM product_briefs pb JOIN accounts a ON a.id = pb.created_by WHERE pb.id = ?"
    );
    Ok(sqlx::query_as(&sql).bind(id).fetch_optional(executor).await?)
}

pub async fn creator_of<'e, E: SqliteExecutor<'e>>(executor: E, id: i64) -> Result<Option<i64>> {
    Ok(sqlx::query_scalar("SELECT created_by FROM products WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await?)
}

/// Products sharing any of `categories` with `product_id`, excluding it.
///
/// The catch-all category only counts when it is the product's sole category.
pub async fn similar<'e, E: SqliteExecutor<'e>>(
    executor: E,
    product_id: i64,
    categories: &[Category],
    limit: i64,
) -> Result<Vec<ProductBrief>> {
    let mut ids: Vec<i64> = categories
        .iter()
        .filter(|c| c.name != CATCH_ALL_CATEGORY)
        .map(|c| c.id)
        .collect();
    if ids.is_empty() {
        ids = categories.iter().map(|c| c.id).collect();
    }
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT {BRIEF_COLUMNS} FROM product_briefs pb \
         WHERE pb.id <> ? AND pb.id IN ( \
             SELECT product_id FROM category_products WHERE category_id IN ({})) \
         ORDER BY pb.avg_rating DESC, pb.rating_times DESC, pb.total_order_count DESC, pb.id DESC \
         LIMIT ?",
        placeholders(ids.len())
    );
    let mut query = sqlx::query_as(&sql).bind(product_id);
    for id in &ids {
        query = query.bind(id);
    }
    Ok(query.bind(limit).fetch_all(executor).await?)
}

/// Available products among `ids`; used to validate an order.
pub async fn available_by_ids<'e, E: SqliteExecutor<'e>>(
    executor: E,
    ids: &[i64],
) -> Result<Vec<ProductBrief>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT {BRIEF_COLUMNS} FROM product_briefs pb \
         WHERE pb.is_available = 1 AND pb.id IN ({}) ORDER BY pb.id",
        placeholders(ids.len())
    );
    let mut query = sqlx::query_as(&sql);
    for id in ids {
        query = query.bind(id);
    }
    Ok(query.fetch_all(executor).await?)
}

pub async fn insert_product<'e, E: SqliteExecutor<'e>>(
    executor: E,
    product: &NewProduct<'_>,
) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO products (name, price, description, img_url, is_on_sale, created_by) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(product.name)
    .bind(product.price)
    .bind(product.description)
    .bind(product.img_url)
    .bind(product.is_on_sale)
    .bind(product.created_by)
    .execute(executor)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn set_images<'e, E: SqliteExecutor<'e>>(executor: E, id: i64, img_url: &str) -> Result<()> {
    sqlx::query("UPDATE products SET img_url = ?, updated_at = datetime('now') WHERE id = ?")
        .bind(img_url)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Returns `false` when `changes` is empty.
pub async fn update_product<'e, E: SqliteExecutor<'e>>(
    executor: E,
    id: i64,
    changes: &ProductChanges,
) -> Result<bool> {
    if changes.description.is_none() && changes.is_on_sale.is_none() && changes.img_url.is_none() {
        return Ok(false);
    }
    sqlx::query(
        "UPDATE products SET \
             description = COALESCE(?, description), \
             is_on_sale = COALESCE(?, is_on_sale), \
             img_url = COALESCE(?, img_url), \
             updated_at = datetime('now') \
         WHERE id = ?",
    )
    .bind(changes.description.as_deref())
    .bind(changes.is_on_sale)
    .bind(changes.img_url.as_deref())
    .bind(id)
    .execute(executor)
    .await?;
    Ok(true)
}

pub async fn set_available<'e, E: SqliteExecutor<'e>>(
    executor: E,
    id: i64,
    is_available: bool,
) -> Result<()> {
    sqlx::query("UPDATE products SET is_available = ?, updated_at = datetime('now') WHERE id = ?")
        .bind(is_available)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn insert_rate<'e, E: SqliteExecutor<'e>>(
    executor: E,
    account_id: i64,
    product_id: i64,
    score: i32,
) -> Result<()> {
    sqlx::query("INSERT INTO rates (score, product_id, account_id) VALUES (?, ?, ?)")
        .bind(score)
        .bind(product_id)
        .bind(account_id)
        .execute(executor)
        .await?;
    Ok(())
}

/// `(avg_rating, rating_times)` for a product.
pub async fn rating_of<'e, E: SqliteExecutor<'e>>(
    executor: E,
    product_id: i64,
) -> Result<(Option<f64>, i64)> {
    Ok(
        sqlx::query_as("SELECT AVG(score), COUNT(*) FROM rates WHERE product_id = ?")
            .bind(product_id)
            .fetch_one(executor)
            .await?,
    )
}
