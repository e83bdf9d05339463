use {
    agora_common::Page,
    agora_store::orders,
    async_graphql::{Context, Object, Result},
};

use crate::{
    context::Scope,
    error::resolve,
    queries::page,
    scalars::Id,
    types::{NumOfUserProductOrderBlog, Order, OrderData, RecentOrder, RecentOrderData},
};

#[derive(Default)]
pub struct OrderQuery;

#[Object]
impl OrderQuery {
    /// An account's orders, newest first. Line items resolve in one batch
    /// per request.
    async fn get_orders_by_account_id(
        &self,
        ctx: &Context<'_>,
        account_id: Id,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<OrderData> {
        let scope = Scope::of(ctx)?;
        let request = page(limit, scope.app.limits.personal_orders, offset);
        resolve(async move {
            let total = orders::count_by_account(scope.pool(), account_id.get()).await?;
            if total == 0 {
                return Ok(OrderData {
                    orders: Vec::new(),
                    has_more: false,
                    total,
                });
            }
            let rows = orders::by_account(
                scope.pool(),
                account_id.get(),
                request.fetch_limit(),
                request.offset(),
            )
            .await?;
            let page = Page::from_overfetch(rows, request).map(Order::from);
            Ok(OrderData {
                orders: page.items,
                has_more: page.has_more,
                total,
            })
        })
        .await
    }

    async fn get_recent_order_products(
        &self,
        ctx: &Context<'_>,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<RecentOrderData> {
        let scope = Scope::of(ctx)?;
        let request = page(limit, scope.app.limits.recent_orders, offset);
        resolve(async move {
            let rows =
                orders::recent_lines(scope.pool(), request.fetch_limit(), request.offset()).await?;
            let page = Page::from_overfetch(rows, request);
            Ok(RecentOrderData {
                recent_order: page
                    .items
                    .into_iter()
                    .map(RecentOrder::try_from)
                    .collect::<agora_store::Result<_>>()?,
                has_more: page.has_more,
            })
        })
        .await
    }

    async fn get_num_of_user_product_order_blog(
        &self,
        ctx: &Context<'_>,
    ) -> Result<NumOfUserProductOrderBlog> {
        let scope = Scope::of(ctx)?;
        resolve(async move { Ok(orders::site_totals(scope.pool()).await?.into()) }).await
    }
}
