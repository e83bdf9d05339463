use {
    agora_store::catalog,
    async_graphql::{InputObject, SimpleObject},
};

use crate::scalars::Id;

#[derive(Debug, Clone, SimpleObject)]
pub struct Category {
    pub id: Id,
    pub name: String,
    pub img_url: Option<String>,
}

impl From<catalog::Category> for Category {
    fn from(row: catalog::Category) -> Self {
        Self {
            id: row.id.into(),
            name: row.name,
            img_url: row.img_url,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct CategoryDetail {
    pub id: Id,
    pub name: String,
    pub img_url: Option<String>,
    pub number_of_product: i64,
}

impl From<catalog::CategoryDetail> for CategoryDetail {
    fn from(row: catalog::CategoryDetail) -> Self {
        Self {
            id: row.id.into(),
            name: row.name,
            img_url: row.img_url,
            number_of_product: row.number_of_product,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct CategoryData {
    pub categories: Vec<CategoryDetail>,
}

/// Listing view of a product with its rating and sales aggregates.
///
/// `imgUrl` holds every image URL joined by `<br/>`.
#[derive(Debug, Clone, SimpleObject)]
pub struct ProductBrief {
    pub id: Id,
    pub name: String,
    pub img_url: String,
    pub price: f64,
    pub is_on_sale: bool,
    pub is_available: bool,
    /// Null until the product has been rated.
    pub avg_rating: Option<f64>,
    pub rating_times: i64,
    pub total_order_count: i64,
}

impl From<catalog::ProductBrief> for ProductBrief {
    fn from(row: catalog::ProductBrief) -> Self {
        Self {
            id: row.id.into(),
            name: row.name,
            img_url: row.img_url,
            price: row.price,
            is_on_sale: row.is_on_sale,
            is_available: row.is_available,
            avg_rating: row.avg_rating,
            rating_times: row.rating_times,
            total_order_count: row.total_order_count,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct Product {
    #[graphql(flatten)]
    pub brief: ProductBrief,
    /// Paragraphs joined by `<br/>`.
    pub description: String,
    pub created_by: Id,
    pub created_at: String,
    pub updated_at: String,
}

impl From<catalog::Product> for Product {
    fn from(row: catalog::Product) -> Self {
        Self {
            brief: row.brief.into(),
            description: row.description,
            created_by: row.created_by.into(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct ProductDetail {
    #[graphql(flatten)]
    pub product: Product,
    pub account_id: Id,
    pub account_name: String,
    pub account_img_url: Option<String>,
    pub categories: Vec<Category>,
    pub similar_products: Vec<ProductBrief>,
}

#[derive(Debug, Clone, Default, SimpleObject)]
pub struct ProductData {
    pub products: Vec<ProductBrief>,
    pub has_more: Option<bool>,
    pub total: Option<i64>,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct NumberOfProductAllTypes {
    pub all: i64,
    pub on_sale: i64,
    pub popular: i64,
    pub top_rated: i64,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct RateProduct {
    pub avg_rating: f64,
    pub rating_times: i64,
}

#[derive(Debug, InputObject)]
pub struct ProductInput {
    pub title: String,
    pub price: f64,
    pub created_by: Id,
    pub descriptions: Vec<String>,
    pub is_on_sale: bool,
    pub categories: Vec<Id>,
}

#[derive(Debug, Default, InputObject)]
pub struct ProductUpdateInput {
    pub descriptions: Option<Vec<String>>,
    pub is_on_sale: Option<bool>,
    pub categories: Option<Vec<Id>>,
    /// Full image list; entries equal to `TBD` are replaced by the uploaded
    /// files, in order.
    pub imgs_url: Option<Vec<String>>,
}

#[derive(Debug, InputObject)]
pub struct RateInput {
    pub account_id: Id,
    pub product_id: Id,
    #[graphql(validator(minimum = 1, maximum = 5))]
    pub score: i32,
}
