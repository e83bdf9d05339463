use {agora_store::favorites, async_graphql::SimpleObject};

use crate::scalars::Id;

/// A saved product with the fields a wishlist renders.
#[derive(Debug, Clone, SimpleObject)]
pub struct FavoriteDetail {
    pub id: Id,
    pub account_id: Id,
    pub product_id: Id,
    pub added_at: String,
    pub product_name: String,
    pub product_price: f64,
    pub product_img_url: String,
    pub product_is_on_sale: bool,
    pub product_avg_rating: Option<f64>,
    pub product_is_available: bool,
}

impl From<favorites::FavoriteDetail> for FavoriteDetail {
    fn from(row: favorites::FavoriteDetail) -> Self {
        Self {
            id: row.id.into(),
            account_id: row.account_id.into(),
            product_id: row.product_id.into(),
            added_at: row.added_at,
            product_name: row.product_name,
            product_price: row.product_price,
            product_img_url: row.product_img_url,
            product_is_on_sale: row.product_is_on_sale,
            product_avg_rating: row.product_avg_rating,
            product_is_available: row.product_is_available,
        }
    }
}

#[derive(Debug, Clone, Default, SimpleObject)]
pub struct FavoriteData {
    pub favorites: Vec<FavoriteDetail>,
}
