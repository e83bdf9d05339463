use {
    agora_store::catalog::{self, LIST_SEPARATOR, NewProduct, ProductChanges},
    async_graphql::{Context, Object, Result, Upload},
    futures::FutureExt,
    sqlx::SqliteConnection,
    tracing::info,
};

use crate::{
    context::Scope,
    error::{ApiError, ApiResult, resolve},
    gate::OwnershipClaim,
    scalars::Id,
    types::{Product, ProductInput, ProductUpdateInput, RateInput, RateProduct},
    uploads::FileUpload,
};

/// Placeholder in `imgsUrl` marking a slot filled by the next upload.
const PENDING_IMAGE: &str = "TBD";

#[derive(Default)]
pub struct CatalogMutation;

/// Fail unless `account_id` created `product_id`.
async fn ensure_creator(conn: &mut SqliteConnection, product_id: i64, account_id: i64) -> ApiResult<()> {
    match catalog::creator_of(conn, product_id).await? {
        None => Err(ApiError::not_found("Product not found")),
        Some(creator) if creator != account_id => Err(ApiError::forbidden()),
        Some(_) => Ok(()),
    }
}

async fn read_product(scope: &Scope<'_>, product_id: i64) -> ApiResult<Option<Product>> {
    Ok(catalog::find(scope.pool(), product_id).await?.map(Into::into))
}

/// Fill every `TBD` slot with the next uploaded URL, in order.
fn fill_pending(slots: &mut [String], uploaded: Vec<String>) {
    let mut uploaded = uploaded.into_iter();
    for slot in slots.iter_mut().filter(|s| s.as_str() == PENDING_IMAGE) {
        if let Some(url) = uploaded.next() {
            *slot = url;
        }
    }
}

#[Object]
impl CatalogMutation {
    /// List a new product with up to five images.
    #[allow(clippy::too_many_arguments)]
    async fn create_product(
        &self,
        ctx: &Context<'_>,
        product_input: ProductInput,
        file_1: Option<Upload>,
        file_2: Option<Upload>,
        file_3: Option<Upload>,
        file_4: Option<Upload>,
        file_5: Option<Upload>,
    ) -> Result<Option<Product>> {
        let scope = Scope::of(ctx)?;
        let files = FileUpload::read_all(ctx, [&file_1, &file_2, &file_3, &file_4, &file_5]);
        resolve(async move {
            let files = files?;
            let ProductInput {
                title,
                price,
                created_by,
                descriptions,
                is_on_sale,
                categories,
            } = product_input;
            let storage = scope.app.services.storage.clone();
            let claim = OwnershipClaim::new(&scope.request.credential, created_by);

            let product_id = scope
                .app
                .gate()
                .run(claim, move |conn, account| {
                    async move {
                        if categories.is_empty() {
                            return Err(ApiError::bad_input(
                                "You should select at least one category.",
                            ));
                        }
                        if files.is_empty() {
                            return Err(ApiError::bad_input(
                                "Each product should have at least 1 image.",
                            ));
                        }
                        let description = descriptions.join(LIST_SEPARATOR);
                        let id = catalog::insert_product(&mut *conn, &NewProduct {
                            name: &title,
                            price,
                            description: &description,
                            img_url: "",
                            is_on_sale,
                            created_by: account.get(),
                        })
                        .await?;

                        let mut urls = Vec::with_capacity(files.len());
                        for file in files {
                            urls.push(file.store(storage.as_ref(), "product", id).await?);
                        }
                        catalog::set_images(&mut *conn, id, &urls.join(LIST_SEPARATOR)).await?;

                        let category_ids: Vec<i64> = categories.iter().map(|c| c.get()).collect();
                        catalog::link_categories(conn, id, &category_ids).await?;
                        Ok(id)
                    }
                    .boxed()
                })
                .await?;

            info!(product_id, "product created");
            read_product(&scope, product_id).await
        })
        .await
    }

    /// Edit a product the caller created. Entries of `imgsUrl` equal to
    /// `TBD` are replaced by the uploaded files in order.
    #[allow(clippy::too_many_arguments)]
    async fn update_product(
        &self,
        ctx: &Context<'_>,
        account_id: Id,
        product_id: Id,
        product_update_input: ProductUpdateInput,
        file_1: Option<Upload>,
        file_2: Option<Upload>,
        file_3: Option<Upload>,
        file_4: Option<Upload>,
        file_5: Option<Upload>,
    ) -> Result<Option<Product>> {
        let scope = Scope::of(ctx)?;
        let files = FileUpload::read_all(ctx, [&file_1, &file_2, &file_3, &file_4, &file_5]);
        resolve(async move {
            let files = files?;
            let ProductUpdateInput {
                descriptions,
                is_on_sale,
                categories,
                imgs_url,
            } = product_update_input;
            let product_id = product_id.get();
            let storage = scope.app.services.storage.clone();
            let claim = OwnershipClaim::new(&scope.request.credential, account_id);

            scope
                .app
                .gate()
                .run(claim, move |conn, account| {
                    async move {
                        ensure_creator(&mut *conn, product_id, account.get()).await?;

                        let mut slots = imgs_url.unwrap_or_default();
                        let pending = slots.iter().filter(|s| s.as_str() == PENDING_IMAGE).count();
                        if pending != files.len() {
                            return Err(ApiError::bad_input(
                                "Length of 'imgs_url' doesn't match number of file to be uploaded",
                            ));
                        }
                        let mut uploaded = Vec::with_capacity(files.len());
                        for file in files {
                            uploaded.push(file.store(storage.as_ref(), "product", product_id).await?);
                        }
                        fill_pending(&mut slots, uploaded);

                        let changes = ProductChanges {
                            description: descriptions.map(|d| d.join(LIST_SEPARATOR)),
                            is_on_sale,
                            img_url: (!slots.is_empty()).then(|| slots.join(LIST_SEPARATOR)),
                        };
                        catalog::update_product(&mut *conn, product_id, &changes).await?;

                        if let Some(categories) = categories {
                            let ids: Vec<i64> = categories.iter().map(|c| c.get()).collect();
                            catalog::replace_categories(conn, product_id, &ids).await?;
                        }
                        Ok(())
                    }
                    .boxed()
                })
                .await?;

            read_product(&scope, product_id).await
        })
        .await
    }

    /// Hide a product from listings or make it available again.
    async fn freeze_or_un_freeze_product(
        &self,
        ctx: &Context<'_>,
        account_id: Id,
        product_id: Id,
        is_available: bool,
    ) -> Result<Option<Product>> {
        let scope = Scope::of(ctx)?;
        resolve(async move {
            let product_id = product_id.get();
            let claim = OwnershipClaim::new(&scope.request.credential, account_id);
            scope
                .app
                .gate()
                .run(claim, move |conn, account| {
                    async move {
                        ensure_creator(&mut *conn, product_id, account.get()).await?;
                        catalog::set_available(&mut *conn, product_id, is_available).await?;
                        Ok(())
                    }
                    .boxed()
                })
                .await?;
            read_product(&scope, product_id).await
        })
        .await
    }

    /// Record a 1 to 5 score and return the product's new rating.
    async fn rate_product(&self, ctx: &Context<'_>, rate_input: RateInput) -> Result<RateProduct> {
        let scope = Scope::of(ctx)?;
        resolve(async move {
            let RateInput {
                account_id,
                product_id,
                score,
            } = rate_input;
            let product_id = product_id.get();
            let claim = OwnershipClaim::new(&scope.request.credential, account_id);
            let (avg_rating, rating_times) = scope
                .app
                .gate()
                .run(claim, move |conn, account| {
                    async move {
                        catalog::insert_rate(&mut *conn, account.get(), product_id, score).await?;
                        Ok(catalog::rating_of(&mut *conn, product_id).await?)
                    }
                    .boxed()
                })
                .await?;
            Ok(RateProduct {
                avg_rating: avg_rating.unwrap_or_default(),
                rating_times,
            })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_slots_fill_in_order() {
        let mut slots = vec![
            "http://img/a.png".to_string(),
            "TBD".to_string(),
            "http://img/b.png".to_string(),
            "TBD".to_string(),
        ];
        fill_pending(&mut slots, vec!["new-1".into(), "new-2".into()]);
        assert_eq!(slots, [
            "http://img/a.png",
            "new-1",
            "http://img/b.png",
            "new-2"
        ]);
    }
}
