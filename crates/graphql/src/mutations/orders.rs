use std::collections::HashMap;

use {
    agora_service_traits::{CheckoutLineItem, CheckoutRequest, ServiceError},
    agora_store::{
        catalog,
        orders::{self, LineStatus, NewLine},
    },
    async_graphql::{Context, Object, Result},
    futures::FutureExt,
    tracing::info,
};

use crate::{
    context::Scope,
    error::{ApiError, resolve},
    gate::OwnershipClaim,
    scalars::Id,
    types::{OrderInput, OrderResult, Payment},
};

const CHECKOUT_SESSION_PLACEHOLDER: &str = "{CHECKOUT_SESSION_ID}";

#[derive(Default)]
pub struct OrderMutation;

/// Price in major units to the processor's minor units.
fn unit_amount(price: f64) -> i64 {
    (price * 100.0).round() as i64
}

fn session_missing() -> ApiError {
    ApiError::bad_input("Checkout session doesn't exist.")
}

#[Object]
impl OrderMutation {
    /// Open a checkout session for the given products and record the order
    /// as pending payment.
    async fn create_order(&self, ctx: &Context<'_>, order_input: OrderInput) -> Result<OrderResult> {
        let scope = Scope::of(ctx)?;
        resolve(async move {
            let OrderInput {
                account_id,
                products,
            } = order_input;
            let payments = scope.app.services.payments.clone();
            let currency = scope.app.currency.clone();
            let success_url = format!(
                "{}?session_id={CHECKOUT_SESSION_PLACEHOLDER}",
                scope.app.frontend.checkout_success_url
            );
            let cancel_url = format!(
                "{}?cancel_session_id={CHECKOUT_SESSION_PLACEHOLDER}",
                scope.app.frontend.cart_url
            );
            let claim = OwnershipClaim::new(&scope.request.credential, account_id);

            let session_id = scope
                .app
                .gate()
                .run(claim, move |conn, account| {
                    async move {
                        if products.is_empty() {
                            return Err(ApiError::bad_input("Products are not provided."));
                        }
                        let lines: Vec<NewLine> = products
                            .iter()
                            .map(|p| NewLine {
                                product_id: p.product_id.get(),
                                quantity: p.quantity,
                            })
                            .collect();
                        let quantities: HashMap<i64, i64> =
                            lines.iter().map(|l| (l.product_id, l.quantity)).collect();
                        let ids: Vec<i64> = quantities.keys().copied().collect();

                        let found = catalog::available_by_ids(&mut *conn, &ids).await?;
                        if found.len() != lines.len() {
                            return Err(ApiError::bad_input(
                                "At least one of the products are unavailable or not existed.",
                            ));
                        }

                        let line_items = found
                            .iter()
                            .map(|p| CheckoutLineItem {
                                name: p.name.clone(),
                                unit_amount: unit_amount(p.price),
                                quantity: quantities.get(&p.id).copied().unwrap_or(1),
                                image: p.first_image().map(str::to_owned),
                            })
                            .collect();
                        let session = payments
                            .create_checkout_session(CheckoutRequest {
                                line_items,
                                success_url,
                                cancel_url,
                                currency,
                                metadata: vec![("account_id".into(), account.to_string())],
                            })
                            .await?;

                        let order_id = orders::insert_order(&mut *conn, account.get(), &session.id)
                            .await?;
                        orders::insert_lines(conn, order_id, &lines).await?;
                        info!(order_id, session_id = %session.id, "order created");
                        Ok(session.id)
                    }
                    .boxed()
                })
                .await?;

            Ok(OrderResult {
                session_id: Some(session_id),
                ..OrderResult::default()
            })
        })
        .await
    }

    /// Mark an order paid once the processor reports the session as paid.
    async fn confirm_order(
        &self,
        ctx: &Context<'_>,
        account_id: Id,
        session_id: String,
    ) -> Result<OrderResult> {
        let scope = Scope::of(ctx)?;
        resolve(async move {
            let payments = scope.app.services.payments.clone();
            let claim = OwnershipClaim::new(&scope.request.credential, account_id);
            scope
                .app
                .gate()
                .run(claim, move |conn, account| {
                    async move {
                        let order = orders::find_by_session(&mut *conn, &session_id)
                            .await?
                            .filter(|o| o.account_id == account.get())
                            .ok_or_else(session_missing)?;
                        let session = payments.retrieve_session(&session_id).await?;
                        if !session.is_paid() {
                            return Err(ApiError::Upstream(ServiceError::message(
                                "The payment wasn't successful, please call support",
                            )));
                        }
                        orders::mark_lines(
                            &mut *conn,
                            order.id,
                            Some(orders::Payment::Succeeded),
                            LineStatus::InProgress,
                        )
                        .await?;
                        info!(order_id = order.id, "order paid");
                        Ok(OrderResult {
                            order: None,
                            session_id: Some(session.id),
                            amount_total: session.amount_total,
                        })
                    }
                    .boxed()
                })
                .await
        })
        .await
    }

    /// Cancel every line of an order. False when the session is unknown.
    async fn cancel_order(
        &self,
        ctx: &Context<'_>,
        account_id: Id,
        session_id: String,
        #[graphql(default_with = "Payment::Incomplete")] payment: Payment,
    ) -> Result<bool> {
        let scope = Scope::of(ctx)?;
        resolve(async move {
            let claim = OwnershipClaim::new(&scope.request.credential, account_id);
            scope
                .app
                .gate()
                .run(claim, move |conn, account| {
                    async move {
                        let payment = match payment {
                            Payment::Incomplete => None,
                            Payment::Failed => Some(orders::Payment::Failed),
                            Payment::Succeeded => {
                                return Err(ApiError::bad_input(
                                    "The value of 'payment' should be 'Incomplete' or 'Failed'.",
                                ));
                            },
                        };
                        let Some(order) = orders::find_by_session(&mut *conn, &session_id)
                            .await?
                            .filter(|o| o.account_id == account.get())
                        else {
                            return Ok(false);
                        };
                        orders::mark_lines(&mut *conn, order.id, payment, LineStatus::Cancel).await?;
                        Ok(true)
                    }
                    .boxed()
                })
                .await
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_amount_rounds_to_cents() {
        assert_eq!(unit_amount(12.5), 1250);
        assert_eq!(unit_amount(19.99), 1999);
    }
}
