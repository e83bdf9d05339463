//! Integration tests for the agora-graphql crate.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use {
    agora_auth::{Credential, RefreshCookie, TokenIssuer},
    agora_config::{FrontendConfig, LimitsConfig},
    agora_graphql::{AgoraSchema, GqlContext, build_schema, execute},
    agora_service_traits::{
        CheckoutRequest, CheckoutSession, NoopObjectStorage, PaymentService, ServiceError,
        ServiceResult, Services, SessionStatus,
    },
    agora_store::{Database, accounts, catalog, posts},
    async_trait::async_trait,
    secrecy::Secret,
    serde_json::{Value, json},
};

// ── Mock payments ───────────────────────────────────────────────────────────

#[derive(Default)]
struct MockPayments {
    requests: Mutex<Vec<CheckoutRequest>>,
    fail_checkout: bool,
    paid: bool,
}

impl MockPayments {
    fn checkouts(&self) -> Vec<CheckoutRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentService for MockPayments {
    async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> ServiceResult<CheckoutSession> {
        if self.fail_checkout {
            return Err(ServiceError::upstream("stripe", "card network unavailable"));
        }
        let mut requests = self.requests.lock().unwrap();
        requests.push(request);
        Ok(CheckoutSession {
            id: format!("cs_test_{}", requests.len()),
            url: None,
        })
    }

    async fn retrieve_session(&self, session_id: &str) -> ServiceResult<SessionStatus> {
        Ok(SessionStatus {
            id: session_id.to_string(),
            payment_status: if self.paid { "paid" } else { "unpaid" }.into(),
            amount_total: Some(2500),
        })
    }
}

// ── Harness ─────────────────────────────────────────────────────────────────

struct Harness {
    schema: AgoraSchema,
    app: Arc<GqlContext>,
    payments: Arc<MockPayments>,
}

impl Harness {
    async fn new() -> Self {
        Self::with_payments(MockPayments::default()).await
    }

    async fn with_payments(payments: MockPayments) -> Self {
        let db = Database::connect_in_memory().await.unwrap();
        let payments = Arc::new(payments);
        let app = Arc::new(GqlContext {
            db,
            services: Services {
                payments: payments.clone(),
                storage: Arc::new(NoopObjectStorage),
            },
            tokens: TokenIssuer::new(
                &Secret::new("access-secret".into()),
                &Secret::new("refresh-secret".into()),
                Duration::from_secs(900),
                Duration::from_secs(3600),
            ),
            refresh_cookie: RefreshCookie::new("jid", 3600, false),
            limits: LimitsConfig::default(),
            frontend: FrontendConfig::default(),
            currency: "usd".into(),
        });
        Self {
            schema: build_schema(app.clone()),
            app,
            payments,
        }
    }

    fn pool(&self) -> &sqlx::SqlitePool {
        self.app.db.pool()
    }

    fn bearer(&self, account_id: i64) -> Credential {
        let pair = self.app.tokens.issue(account_id).unwrap();
        Credential::from_authorization(
            Some(&format!("Bearer {}", pair.access_token)),
            &self.app.tokens,
        )
    }

    /// Run a request and return `(body, cookies)`.
    async fn run(&self, credential: Credential, query: &str) -> (Value, Vec<String>) {
        let (response, request_ctx) = execute(&self.schema, &self.app, credential, query).await;
        (
            serde_json::to_value(&response).unwrap(),
            request_ctx.take_cookies(),
        )
    }

    async fn anonymous(&self, query: &str) -> Value {
        self.run(Credential::Missing, query).await.0
    }

    async fn as_account(&self, account_id: i64, query: &str) -> Value {
        self.run(self.bearer(account_id), query).await.0
    }

    async fn account(&self, name: &str) -> i64 {
        accounts::insert_local(self.pool(), name, &format!("{name}@example.com"), "x")
            .await
            .unwrap()
    }

    async fn product(&self, owner: i64, name: &str, price: f64) -> i64 {
        catalog::insert_product(self.pool(), &catalog::NewProduct {
            name,
            price,
            description: "",
            img_url: "http://img/front.png<br/>http://img/back.png",
            is_on_sale: false,
            created_by: owner,
        })
        .await
        .unwrap()
    }

    async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(self.pool())
            .await
            .unwrap()
    }
}

fn error_code(body: &Value) -> &str {
    body["errors"][0]["extensions"]["code"]
        .as_str()
        .unwrap_or_else(|| panic!("expected an error, got {body}"))
}

fn assert_ok(body: &Value) {
    assert!(body.get("errors").is_none(), "unexpected errors: {body}");
}

// ── Queries ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn hello_answers() {
    let h = Harness::new().await;
    let body = h.anonymous("{ hello }").await;
    assert_eq!(body["data"]["hello"], "hello");
}

#[tokio::test]
async fn post_comments_resolve_per_post_in_one_request() {
    let h = Harness::new().await;
    let alice = h.account("alice").await;
    let product = h.product(alice, "Lamp", 12.5).await;
    let quiet = posts::insert(h.pool(), alice, product, "no replies").await.unwrap();
    let busy = posts::insert(h.pool(), alice, product, "two replies").await.unwrap();
    posts::insert_comment(h.pool(), alice, busy, "first").await.unwrap();
    posts::insert_comment(h.pool(), alice, busy, "second").await.unwrap();

    let body = h
        .anonymous(&format!(
            "{{ getPostsByProductId(productId: {product}) {{ hasMore posts {{ id content comments {{ content postId }} }} }} }}"
        ))
        .await;
    assert_ok(&body);

    let posts = body["data"]["getPostsByProductId"]["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 2);
    // Newest first.
    assert_eq!(posts[0]["id"], json!(busy));
    assert_eq!(posts[1]["id"], json!(quiet));
    let busy_comments = posts[0]["comments"].as_array().unwrap();
    assert_eq!(busy_comments.len(), 2);
    assert_eq!(busy_comments[0]["content"], "second");
    assert!(busy_comments.iter().all(|c| c["postId"] == json!(busy)));
    assert_eq!(posts[1]["comments"], json!([]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn comments_for_a_page_of_posts_come_from_one_query() {
    let h = Harness::new().await;
    let alice = h.account("alice").await;
    let product = h.product(alice, "Lamp", 12.5).await;
    for i in 0..40 {
        let post = posts::insert(h.pool(), alice, product, &format!("post {i}"))
            .await
            .unwrap();
        if i % 3 == 0 {
            posts::insert_comment(h.pool(), alice, post, "reply").await.unwrap();
        }
    }

    let query = format!(
        "{{ getPostsByProductId(productId: {product}, limit: 40) {{ posts {{ id comments {{ postId }} }} }} }}"
    );
    let (response, request_ctx) = execute(&h.schema, &h.app, Credential::Missing, query).await;
    let body = serde_json::to_value(&response).unwrap();
    assert_ok(&body);

    let posts = body["data"]["getPostsByProductId"]["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 40);
    let commented = posts
        .iter()
        .filter(|p| p["comments"].as_array().is_some_and(|c| c.len() == 1))
        .count();
    assert_eq!(commented, 14);
    assert_eq!(request_ctx.loaders.comments.batches(), 1);
    assert_eq!(request_ctx.loaders.batches(), 1);
}

#[tokio::test]
async fn listings_report_has_more() {
    let h = Harness::new().await;
    let alice = h.account("alice").await;
    for i in 0..3 {
        h.product(alice, &format!("Item {i}"), 5.0).await;
    }

    let body = h
        .anonymous("{ getAllProducts(limit: 2) { hasMore products { name } } }")
        .await;
    assert_eq!(body["data"]["getAllProducts"]["hasMore"], true);
    assert_eq!(
        body["data"]["getAllProducts"]["products"]
            .as_array()
            .unwrap()
            .len(),
        2
    );

    let body = h
        .anonymous("{ getAllProducts(limit: 2, offset: 2) { hasMore products { name } } }")
        .await;
    assert_eq!(body["data"]["getAllProducts"]["hasMore"], false);
}

#[tokio::test]
async fn popular_listing_stops_at_total() {
    let h = Harness::new().await;
    let alice = h.account("alice").await;
    for i in 0..4 {
        h.product(alice, &format!("Item {i}"), 5.0).await;
    }

    let body = h
        .anonymous("{ getPopularProducts(limit: 2, offset: 2, total: 3) { hasMore products { id } } }")
        .await;
    let data = &body["data"]["getPopularProducts"];
    assert_eq!(data["products"].as_array().unwrap().len(), 1);
    assert_eq!(data["hasMore"], false);

    let body = h
        .anonymous("{ getPopularProducts(limit: 2, offset: 3, total: 3) { products { id } } }")
        .await;
    assert_eq!(body["data"]["getPopularProducts"]["products"], json!([]));
}

#[tokio::test]
async fn favorites_require_a_token_and_hide_other_accounts() {
    let h = Harness::new().await;
    let alice = h.account("alice").await;
    let bob = h.account("bob").await;
    let product = h.product(alice, "Lamp", 12.5).await;
    agora_store::favorites::insert(h.pool(), alice, product).await.unwrap();

    let query = format!("{{ getFavoriteByAccountId(accountId: {alice}) {{ favorites {{ productName }} }} }}");
    let body = h.anonymous(&query).await;
    assert_eq!(error_code(&body), "UNAUTHENTICATED");

    let body = h.as_account(bob, &query).await;
    assert_eq!(body["data"]["getFavoriteByAccountId"]["favorites"], json!([]));

    let body = h.as_account(alice, &query).await;
    assert_eq!(
        body["data"]["getFavoriteByAccountId"]["favorites"][0]["productName"],
        "Lamp"
    );

    let count = format!("{{ getNumberOfFavoriteByAccountId(accountId: \"{alice}\") }}");
    assert_eq!(
        h.as_account(bob, &count).await["data"]["getNumberOfFavoriteByAccountId"],
        Value::Null
    );
    assert_eq!(
        h.as_account(alice, &count).await["data"]["getNumberOfFavoriteByAccountId"],
        1
    );
}

// ── Accounts ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_signs_in_and_me_reads_back() {
    let h = Harness::new().await;
    let (body, cookies) = h
        .run(
            Credential::Missing,
            r#"mutation { register(userRegister: {name: "carol", password: "pw-123", email: "c@example.com"}) { accessToken account { id name } } }"#,
        )
        .await;
    assert_ok(&body);
    let detail = &body["data"]["register"];
    assert_eq!(detail["account"]["name"], "carol");
    assert_eq!(cookies.len(), 1);
    assert!(cookies[0].starts_with("jid="));

    let token = detail["accessToken"].as_str().unwrap();
    let credential =
        Credential::from_authorization(Some(&format!("Bearer {token}")), &h.app.tokens);
    let (body, _) = h.run(credential, "{ me { account { name } accessToken } }").await;
    assert_eq!(body["data"]["me"]["account"]["name"], "carol");
    assert_eq!(body["data"]["me"]["accessToken"], token);

    let (body, _) = h
        .run(
            Credential::Missing,
            r#"mutation { register(userRegister: {name: "carol", password: "other", email: "d@example.com"}) { accessToken } }"#,
        )
        .await;
    assert_eq!(error_code(&body), "BAD_USER_INPUT");
    assert_eq!(h.count("accounts").await, 1);
}

#[tokio::test]
async fn login_with_wrong_password_is_empty() {
    let h = Harness::new().await;
    let hash = agora_auth::hash_password("right").unwrap();
    accounts::insert_local(h.pool(), "dave", "d@example.com", &hash)
        .await
        .unwrap();

    let (body, cookies) = h
        .run(
            Credential::Missing,
            r#"mutation { login(userInput: {name: "dave", password: "wrong"}) { accessToken account { id } } }"#,
        )
        .await;
    assert_eq!(body["data"]["login"], json!({"accessToken": null, "account": null}));
    assert!(cookies.is_empty());

    let (body, cookies) = h
        .run(
            Credential::Missing,
            r#"mutation { login(userInput: {name: "dave", password: "right"}) { accessToken } }"#,
        )
        .await;
    assert!(body["data"]["login"]["accessToken"].is_string());
    assert_eq!(cookies.len(), 1);
}

#[tokio::test]
async fn other_user_needs_a_valid_token() {
    let h = Harness::new().await;
    let alice = h.account("alice").await;
    let query = format!("{{ otherUser(accountId: {alice}) {{ account {{ name }} }} }}");

    assert_eq!(h.anonymous(&query).await["data"]["otherUser"]["account"], Value::Null);
    assert_eq!(
        h.as_account(alice, &query).await["data"]["otherUser"]["account"]["name"],
        "alice"
    );
}

// ── Ownership gate ──────────────────────────────────────────────────────────

#[tokio::test]
async fn create_post_for_another_account_is_forbidden() {
    let h = Harness::new().await;
    let alice = h.account("alice").await;
    let bob = h.account("bob").await;
    let product = h.product(alice, "Lamp", 12.5).await;

    let mutation = format!(
        r#"mutation {{ createPost(postInput: {{content: "hi", accountId: {alice}, productId: {product}}}) {{ post {{ id }} }} }}"#
    );
    let body = h.as_account(bob, &mutation).await;
    assert_eq!(error_code(&body), "FORBIDDEN");
    assert_eq!(body["errors"][0]["message"], "Unauthorized");

    let body = h.anonymous(&mutation).await;
    assert_eq!(error_code(&body), "UNAUTHENTICATED");

    assert_eq!(h.count("posts").await, 0);
}

#[tokio::test]
async fn create_post_accepts_string_account_id() {
    let h = Harness::new().await;
    let alice = h.account("alice").await;
    let product = h.product(alice, "Lamp", 12.5).await;

    let body = h
        .as_account(
            alice,
            &format!(
                r#"mutation {{ createPost(postInput: {{content: "hi", accountId: "{alice}", productId: {product}}}) {{ post {{ content accountName likeCount comments {{ id }} }} }} }}"#
            ),
        )
        .await;
    assert_ok(&body);
    let post = &body["data"]["createPost"]["post"];
    assert_eq!(post["content"], "hi");
    assert_eq!(post["accountName"], "alice");
    assert_eq!(post["likeCount"], 0);
    assert_eq!(post["comments"], json!([]));
}

#[tokio::test]
async fn likes_return_recounted_total() {
    let h = Harness::new().await;
    let alice = h.account("alice").await;
    let bob = h.account("bob").await;
    let product = h.product(alice, "Lamp", 12.5).await;
    let post = posts::insert(h.pool(), alice, product, "hello").await.unwrap();
    posts::insert_like(h.pool(), alice, post).await.unwrap();

    let body = h
        .as_account(
            bob,
            &format!(
                "mutation {{ createPostLike(postLikeInput: {{accountId: {bob}, postId: {post}}}) {{ postLike }} }}"
            ),
        )
        .await;
    assert_eq!(body["data"]["createPostLike"]["postLike"], 2);
}

#[tokio::test]
async fn rating_out_of_range_is_rejected() {
    let h = Harness::new().await;
    let alice = h.account("alice").await;
    let product = h.product(alice, "Lamp", 12.5).await;

    let body = h
        .as_account(
            alice,
            &format!(
                "mutation {{ rateProduct(rateInput: {{accountId: {alice}, productId: {product}, score: 6}}) {{ avgRating }} }}"
            ),
        )
        .await;
    assert!(body.get("errors").is_some());
    assert_eq!(h.count("rates").await, 0);

    let body = h
        .as_account(
            alice,
            &format!(
                "mutation {{ rateProduct(rateInput: {{accountId: {alice}, productId: {product}, score: 4}}) {{ avgRating ratingTimes }} }}"
            ),
        )
        .await;
    assert_eq!(body["data"]["rateProduct"], json!({"avgRating": 4.0, "ratingTimes": 1}));
}

#[tokio::test]
async fn freezing_someone_elses_product_is_forbidden() {
    let h = Harness::new().await;
    let alice = h.account("alice").await;
    let bob = h.account("bob").await;
    let product = h.product(alice, "Lamp", 12.5).await;

    let body = h
        .as_account(
            bob,
            &format!(
                "mutation {{ freezeOrUnFreezeProduct(accountId: {bob}, productId: {product}, isAvailable: false) {{ isAvailable }} }}"
            ),
        )
        .await;
    assert_eq!(error_code(&body), "FORBIDDEN");

    let body = h
        .as_account(
            alice,
            &format!(
                "mutation {{ freezeOrUnFreezeProduct(accountId: {alice}, productId: {product}, isAvailable: false) {{ isAvailable }} }}"
            ),
        )
        .await;
    assert_eq!(body["data"]["freezeOrUnFreezeProduct"]["isAvailable"], false);
}

#[tokio::test]
async fn create_product_requires_an_image() {
    let h = Harness::new().await;
    let alice = h.account("alice").await;
    sqlx::query("INSERT INTO categories (name) VALUES ('lamps')")
        .execute(h.pool())
        .await
        .unwrap();

    let body = h
        .as_account(
            alice,
            &format!(
                r#"mutation {{ createProduct(productInput: {{title: "Lamp", price: 3.5, createdBy: {alice}, descriptions: ["bright"], isOnSale: false, categories: [1]}}) {{ id }} }}"#
            ),
        )
        .await;
    assert_eq!(error_code(&body), "BAD_USER_INPUT");
    assert_eq!(
        body["errors"][0]["message"],
        "Each product should have at least 1 image."
    );
    assert_eq!(h.count("products").await, 0);
}

#[tokio::test]
async fn favorites_toggle() {
    let h = Harness::new().await;
    let alice = h.account("alice").await;
    let product = h.product(alice, "Lamp", 12.5).await;

    let add = format!("mutation {{ createFavoriteProduct(productId: {product}, accountId: {alice}) }}");
    let remove = format!("mutation {{ deleteFavoriteProduct(productId: {product}, accountId: {alice}) }}");

    assert_eq!(h.as_account(alice, &add).await["data"]["createFavoriteProduct"], true);
    assert_eq!(h.as_account(alice, &remove).await["data"]["deleteFavoriteProduct"], true);
    assert_eq!(h.as_account(alice, &remove).await["data"]["deleteFavoriteProduct"], false);
}

// ── Orders ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_order_opens_checkout_and_records_lines() {
    let h = Harness::new().await;
    let alice = h.account("alice").await;
    let lamp = h.product(alice, "Lamp", 12.5).await;
    let desk = h.product(alice, "Desk", 80.0).await;

    let body = h
        .as_account(
            alice,
            &format!(
                "mutation {{ createOrder(orderInput: {{accountId: {alice}, products: [{{productId: {desk}, quantity: 1}}, {{productId: {lamp}, quantity: 3}}]}}) {{ sessionId }} }}"
            ),
        )
        .await;
    assert_ok(&body);
    assert_eq!(body["data"]["createOrder"]["sessionId"], "cs_test_1");

    let checkouts = h.payments.checkouts();
    assert_eq!(checkouts.len(), 1);
    let checkout = &checkouts[0];
    assert!(checkout.success_url.ends_with("?session_id={CHECKOUT_SESSION_ID}"));
    assert!(checkout.cancel_url.contains("cancel_session_id={CHECKOUT_SESSION_ID}"));
    let lamp_line = checkout
        .line_items
        .iter()
        .find(|l| l.name == "Lamp")
        .unwrap();
    assert_eq!(lamp_line.unit_amount, 1250);
    assert_eq!(lamp_line.quantity, 3);
    assert_eq!(lamp_line.image.as_deref(), Some("http://img/front.png"));
    assert_eq!(checkout.metadata, vec![("account_id".to_string(), alice.to_string())]);

    let body = h
        .anonymous(&format!(
            "{{ getOrdersByAccountId(accountId: {alice}) {{ total hasMore orders {{ sessionId products {{ productName quantity payment status }} }} }} }}"
        ))
        .await;
    assert_ok(&body);
    let data = &body["data"]["getOrdersByAccountId"];
    assert_eq!(data["total"], 1);
    let lines = data["orders"][0]["products"].as_array().unwrap();
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|l| l["payment"] == "INCOMPLETE" && l["status"] == "PENDING"));
}

#[tokio::test]
async fn create_order_with_unavailable_product_writes_nothing() {
    let h = Harness::new().await;
    let alice = h.account("alice").await;
    let lamp = h.product(alice, "Lamp", 12.5).await;
    catalog::set_available(h.pool(), lamp, false).await.unwrap();

    let body = h
        .as_account(
            alice,
            &format!(
                "mutation {{ createOrder(orderInput: {{accountId: {alice}, products: [{{productId: {lamp}, quantity: 1}}]}}) {{ sessionId }} }}"
            ),
        )
        .await;
    assert_eq!(error_code(&body), "BAD_USER_INPUT");
    assert!(h.payments.checkouts().is_empty());
    assert_eq!(h.count("orders").await, 0);
}

#[tokio::test]
async fn checkout_failure_surfaces_upstream_and_writes_nothing() {
    let h = Harness::with_payments(MockPayments {
        fail_checkout: true,
        ..MockPayments::default()
    })
    .await;
    let alice = h.account("alice").await;
    let lamp = h.product(alice, "Lamp", 12.5).await;

    let body = h
        .as_account(
            alice,
            &format!(
                "mutation {{ createOrder(orderInput: {{accountId: {alice}, products: [{{productId: {lamp}, quantity: 1}}]}}) {{ sessionId }} }}"
            ),
        )
        .await;
    assert_eq!(error_code(&body), "UPSTREAM_FAILURE");
    assert_eq!(h.count("orders").await, 0);
}

#[tokio::test]
async fn confirm_order_marks_lines_paid() {
    let h = Harness::with_payments(MockPayments {
        paid: true,
        ..MockPayments::default()
    })
    .await;
    let alice = h.account("alice").await;
    let lamp = h.product(alice, "Lamp", 12.5).await;
    h.as_account(
        alice,
        &format!(
            "mutation {{ createOrder(orderInput: {{accountId: {alice}, products: [{{productId: {lamp}, quantity: 2}}]}}) {{ sessionId }} }}"
        ),
    )
    .await;

    let body = h
        .as_account(
            alice,
            &format!(r#"mutation {{ confirmOrder(accountId: {alice}, sessionId: "cs_test_1") {{ sessionId amountTotal }} }}"#),
        )
        .await;
    assert_eq!(
        body["data"]["confirmOrder"],
        json!({"sessionId": "cs_test_1", "amountTotal": 2500})
    );

    let body = h
        .anonymous(&format!(
            "{{ getOrdersByAccountId(accountId: {alice}) {{ orders {{ products {{ payment status }} }} }} }}"
        ))
        .await;
    assert_eq!(
        body["data"]["getOrdersByAccountId"]["orders"][0]["products"][0],
        json!({"payment": "SUCCEEDED", "status": "IN_PROGRESS"})
    );

    let body = h.anonymous("{ getNumOfUserProductOrderBlog { totalOrder totalUser } }").await;
    assert_eq!(
        body["data"]["getNumOfUserProductOrderBlog"],
        json!({"totalOrder": 1, "totalUser": 1})
    );
}

#[tokio::test]
async fn confirm_unknown_session_is_bad_input() {
    let h = Harness::new().await;
    let alice = h.account("alice").await;

    let body = h
        .as_account(
            alice,
            &format!(r#"mutation {{ confirmOrder(accountId: {alice}, sessionId: "cs_missing") {{ sessionId }} }}"#),
        )
        .await;
    assert_eq!(error_code(&body), "BAD_USER_INPUT");
    assert_eq!(body["errors"][0]["message"], "Checkout session doesn't exist.");
}

#[tokio::test]
async fn cancel_order_validates_payment_and_marks_lines() {
    let h = Harness::new().await;
    let alice = h.account("alice").await;
    let lamp = h.product(alice, "Lamp", 12.5).await;
    h.as_account(
        alice,
        &format!(
            "mutation {{ createOrder(orderInput: {{accountId: {alice}, products: [{{productId: {lamp}, quantity: 1}}]}}) {{ sessionId }} }}"
        ),
    )
    .await;

    let body = h
        .as_account(
            alice,
            &format!(r#"mutation {{ cancelOrder(accountId: {alice}, sessionId: "cs_test_1", payment: SUCCEEDED) }}"#),
        )
        .await;
    assert_eq!(error_code(&body), "BAD_USER_INPUT");

    let body = h
        .as_account(
            alice,
            &format!(r#"mutation {{ cancelOrder(accountId: {alice}, sessionId: "cs_unknown") }}"#),
        )
        .await;
    assert_eq!(body["data"]["cancelOrder"], false);

    let body = h
        .as_account(
            alice,
            &format!(r#"mutation {{ cancelOrder(accountId: {alice}, sessionId: "cs_test_1", payment: FAILED) }}"#),
        )
        .await;
    assert_eq!(body["data"]["cancelOrder"], true);

    let (payment, status): (String, String) =
        sqlx::query_as("SELECT payment, status FROM order_products")
            .fetch_one(h.pool())
            .await
            .unwrap();
    assert_eq!((payment.as_str(), status.as_str()), ("Failed", "Cancel"));
}
