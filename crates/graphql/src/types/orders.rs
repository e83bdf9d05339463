use {
    agora_store::orders,
    async_graphql::{ComplexObject, Context, Enum, InputObject, Result, SimpleObject},
};

use crate::{context::Scope, error::resolve, scalars::Id};

/// Payment state of an order line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
pub enum Payment {
    Incomplete,
    Succeeded,
    Failed,
}

impl From<orders::Payment> for Payment {
    fn from(p: orders::Payment) -> Self {
        match p {
            orders::Payment::Incomplete => Self::Incomplete,
            orders::Payment::Succeeded => Self::Succeeded,
            orders::Payment::Failed => Self::Failed,
        }
    }
}

impl From<Payment> for orders::Payment {
    fn from(p: Payment) -> Self {
        match p {
            Payment::Incomplete => Self::Incomplete,
            Payment::Succeeded => Self::Succeeded,
            Payment::Failed => Self::Failed,
        }
    }
}

/// Fulfilment state of an order line. `IN_PROGRESS` is stored as
/// `In Progress`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
pub enum Status {
    Pending,
    Cancel,
    InProgress,
    Delivered,
    Return,
}

impl From<orders::LineStatus> for Status {
    fn from(s: orders::LineStatus) -> Self {
        match s {
            orders::LineStatus::Pending => Self::Pending,
            orders::LineStatus::Cancel => Self::Cancel,
            orders::LineStatus::InProgress => Self::InProgress,
            orders::LineStatus::Delivered => Self::Delivered,
            orders::LineStatus::Return => Self::Return,
        }
    }
}

fn payment(raw: &str) -> agora_store::Result<Payment> {
    raw.parse::<orders::Payment>().map(Payment::from)
}

fn status(raw: &str) -> agora_store::Result<Status> {
    raw.parse::<orders::LineStatus>().map(Status::from)
}

/// A line item joined with the product it refers to.
#[derive(Debug, Clone, SimpleObject)]
pub struct OrderProduct {
    pub id: Id,
    pub quantity: i64,
    pub payment: Payment,
    pub status: Status,
    pub order_id: Id,
    pub product_id: Id,
    pub ordered_at: String,
    pub updated_at: String,
    pub product_name: String,
    pub product_price: f64,
    pub product_img_url: String,
}

impl TryFrom<&orders::OrderProductDetail> for OrderProduct {
    type Error = agora_store::Error;

    fn try_from(row: &orders::OrderProductDetail) -> agora_store::Result<Self> {
        Ok(Self {
            id: row.id.into(),
            quantity: row.quantity,
            payment: payment(&row.payment)?,
            status: status(&row.status)?,
            order_id: row.order_id.into(),
            product_id: row.product_id.into(),
            ordered_at: row.ordered_at.clone(),
            updated_at: row.updated_at.clone(),
            product_name: row.product_name.clone(),
            product_price: row.product_price,
            product_img_url: row.product_img_url.clone(),
        })
    }
}

#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Order {
    pub id: Id,
    pub session_id: String,
    pub account_id: Id,
    pub created_at: String,
    pub updated_at: String,
}

#[ComplexObject]
impl Order {
    /// Line items in the order they were placed.
    async fn products(&self, ctx: &Context<'_>) -> Result<Vec<OrderProduct>> {
        let scope = Scope::of(ctx)?;
        resolve(async move {
            let rows = scope.request.loaders.order_products.load(self.id.0).await?;
            Ok(rows
                .iter()
                .map(OrderProduct::try_from)
                .collect::<agora_store::Result<Vec<_>>>()?)
        })
        .await
    }
}

impl From<orders::Order> for Order {
    fn from(row: orders::Order) -> Self {
        Self {
            id: row.id.into(),
            session_id: row.session_id,
            account_id: row.account_id.into(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct RecentOrder {
    pub id: Id,
    pub product_id: Id,
    pub product_name: String,
    pub product_price: f64,
    pub product_img_url: String,
    pub payment: Payment,
    pub status: Status,
}

impl TryFrom<orders::RecentOrder> for RecentOrder {
    type Error = agora_store::Error;

    fn try_from(row: orders::RecentOrder) -> agora_store::Result<Self> {
        Ok(Self {
            id: row.id.into(),
            product_id: row.product_id.into(),
            payment: payment(&row.payment)?,
            status: status(&row.status)?,
            product_name: row.product_name,
            product_price: row.product_price,
            product_img_url: row.product_img_url,
        })
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct OrderData {
    pub orders: Vec<Order>,
    pub has_more: bool,
    pub total: i64,
}

/// Outcome of the checkout mutations; which fields are set depends on the
/// step.
#[derive(Debug, Clone, Default, SimpleObject)]
pub struct OrderResult {
    pub order: Option<Order>,
    pub session_id: Option<String>,
    /// Amount charged, in the smallest currency unit.
    pub amount_total: Option<i64>,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct RecentOrderData {
    pub recent_order: Vec<RecentOrder>,
    pub has_more: bool,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct NumOfUserProductOrderBlog {
    pub total_user: i64,
    pub total_product: i64,
    pub total_order: i64,
    pub total_blog: i64,
}

impl From<orders::SiteTotals> for NumOfUserProductOrderBlog {
    fn from(t: orders::SiteTotals) -> Self {
        Self {
            total_user: t.total_user,
            total_product: t.total_product,
            total_order: t.total_order,
            total_blog: t.total_blog,
        }
    }
}

#[derive(Debug, Clone, InputObject)]
pub struct OrderProductInput {
    pub product_id: Id,
    pub quantity: i64,
}

#[derive(Debug, Clone, InputObject)]
pub struct OrderInput {
    pub account_id: Id,
    pub products: Vec<OrderProductInput>,
}
