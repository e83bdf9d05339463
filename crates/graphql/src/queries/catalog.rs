use {
    agora_common::{Page, PageRequest},
    agora_store::catalog::{self, Listing},
    async_graphql::{Context, Object, Result},
    sqlx::SqlitePool,
};

use crate::{
    context::Scope,
    error::{ApiResult, resolve},
    queries::page,
    scalars::Id,
    types::{CategoryData, NumberOfProductAllTypes, ProductBrief, ProductData, ProductDetail},
};

#[derive(Default)]
pub struct CatalogQuery;

async fn listing_page(
    pool: &SqlitePool,
    listing: Listing,
    request: PageRequest,
) -> ApiResult<ProductData> {
    let rows = catalog::list(pool, listing, request.fetch_limit(), request.offset()).await?;
    let page = Page::from_overfetch(rows, request).map(ProductBrief::from);
    Ok(ProductData {
        products: page.items,
        has_more: Some(page.has_more),
        total: None,
    })
}

/// Showcase listings stop at `total` rows even when more products exist.
async fn showcase_page(
    pool: &SqlitePool,
    listing: Listing,
    request: PageRequest,
    total: Option<u32>,
) -> ApiResult<ProductData> {
    let Some(clamped) = request.clamp_to(total) else {
        return Ok(ProductData {
            has_more: Some(false),
            ..ProductData::default()
        });
    };
    let mut data = listing_page(pool, listing, clamped).await?;
    if let Some(total) = total {
        let reached = u64::from(clamped.offset) + u64::from(clamped.limit) >= u64::from(total);
        if reached {
            data.has_more = Some(false);
        }
    }
    Ok(data)
}

#[Object]
impl CatalogQuery {
    /// Categories with the number of products linked to each.
    async fn get_all_category(&self, ctx: &Context<'_>) -> Result<CategoryData> {
        let scope = Scope::of(ctx)?;
        resolve(async move {
            let rows = catalog::list_categories(scope.pool()).await?;
            Ok(CategoryData {
                categories: rows.into_iter().map(Into::into).collect(),
            })
        })
        .await
    }

    async fn get_number_of_product_all_types(
        &self,
        ctx: &Context<'_>,
    ) -> Result<NumberOfProductAllTypes> {
        let scope = Scope::of(ctx)?;
        resolve(async move {
            let counts = catalog::count_available(scope.pool()).await?;
            let showcase = counts.all.min(i64::from(scope.app.limits.showcase_products));
            Ok(NumberOfProductAllTypes {
                all: counts.all,
                on_sale: counts.on_sale,
                popular: showcase,
                top_rated: showcase,
            })
        })
        .await
    }

    async fn get_on_sale_products(
        &self,
        ctx: &Context<'_>,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<ProductData> {
        let scope = Scope::of(ctx)?;
        let request = page(limit, scope.app.limits.on_sale_products, offset);
        resolve(listing_page(scope.pool(), Listing::OnSale, request)).await
    }

    /// Best sellers. `total` caps how far paging may reach.
    async fn get_popular_products(
        &self,
        ctx: &Context<'_>,
        limit: Option<u32>,
        offset: Option<u32>,
        total: Option<u32>,
    ) -> Result<ProductData> {
        let scope = Scope::of(ctx)?;
        let request = page(limit, scope.app.limits.popular_products, offset);
        resolve(showcase_page(scope.pool(), Listing::Popular, request, total)).await
    }

    /// Highest rated first. `total` caps how far paging may reach.
    async fn get_top_rated_products(
        &self,
        ctx: &Context<'_>,
        limit: Option<u32>,
        offset: Option<u32>,
        total: Option<u32>,
    ) -> Result<ProductData> {
        let scope = Scope::of(ctx)?;
        let request = page(limit, scope.app.limits.top_rated_products, offset);
        resolve(showcase_page(scope.pool(), Listing::TopRated, request, total)).await
    }

    async fn get_all_products(
        &self,
        ctx: &Context<'_>,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<ProductData> {
        let scope = Scope::of(ctx)?;
        let request = page(limit, scope.app.limits.all_products, offset);
        resolve(listing_page(scope.pool(), Listing::All, request)).await
    }

    async fn get_products_by_ids(&self, ctx: &Context<'_>, ids: Vec<Id>) -> Result<ProductData> {
        let scope = Scope::of(ctx)?;
        resolve(async move {
            let ids: Vec<i64> = ids.iter().map(|id| id.get()).collect();
            let rows = catalog::by_ids(scope.pool(), &ids).await?;
            Ok(ProductData {
                products: rows.into_iter().map(Into::into).collect(),
                ..ProductData::default()
            })
        })
        .await
    }

    async fn get_product_by_category_id(
        &self,
        ctx: &Context<'_>,
        category_id: Id,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<ProductData> {
        let scope = Scope::of(ctx)?;
        let request = page(limit, scope.app.limits.category_products, offset);
        resolve(async move {
            let rows = catalog::by_category(
                scope.pool(),
                category_id.get(),
                request.fetch_limit(),
                request.offset(),
            )
            .await?;
            let page = Page::from_overfetch(rows, request).map(ProductBrief::from);
            Ok(ProductData {
                products: page.items,
                has_more: Some(page.has_more),
                total: None,
            })
        })
        .await
    }

    /// Products listed by one account, with the overall count.
    async fn get_product_by_created_by(
        &self,
        ctx: &Context<'_>,
        account_id: Id,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<ProductData> {
        let scope = Scope::of(ctx)?;
        let request = page(limit, scope.app.limits.personal_products, offset);
        resolve(async move {
            let total = catalog::count_by_creator(scope.pool(), account_id.get()).await?;
            if total == 0 {
                return Ok(ProductData {
                    has_more: Some(false),
                    total: Some(0),
                    ..ProductData::default()
                });
            }
            let rows = catalog::by_creator(
                scope.pool(),
                account_id.get(),
                request.fetch_limit(),
                request.offset(),
            )
            .await?;
            let page = Page::from_overfetch(rows, request).map(ProductBrief::from);
            Ok(ProductData {
                products: page.items,
                has_more: Some(page.has_more),
                total: Some(total),
            })
        })
        .await
    }

    /// A product with its creator, categories and similar products. Null
    /// when the product does not exist.
    async fn get_product_detail(
        &self,
        ctx: &Context<'_>,
        product_id: Id,
    ) -> Result<Option<ProductDetail>> {
        let scope = Scope::of(ctx)?;
        resolve(async move {
            let pool = scope.pool();
            let Some(row) = catalog::find_with_account(pool, product_id.get()).await? else {
                return Ok(None);
            };
            let categories = catalog::categories_of(pool, product_id.get()).await?;
            let similar = catalog::similar(
                pool,
                product_id.get(),
                &categories,
                i64::from(scope.app.limits.similar_products),
            )
            .await?;
            Ok(Some(ProductDetail {
                account_id: row.product.created_by.into(),
                account_name: row.account_name,
                account_img_url: row.account_img_url,
                product: row.product.into(),
                categories: categories.into_iter().map(Into::into).collect(),
                similar_products: similar.into_iter().map(Into::into).collect(),
            }))
        })
        .await
    }
}
