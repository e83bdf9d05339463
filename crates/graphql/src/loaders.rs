//! The concrete loaders built for every request.

use {
    agora_common::RecordId,
    agora_store::{
        blogs::{self, BlogCommentDetail},
        orders::{self, OrderProductDetail},
        posts::{self, CommentDetail},
    },
    async_trait::async_trait,
    sqlx::SqlitePool,
};

use crate::loader::{BatchLoader, BulkFetch};

fn raw(keys: &[RecordId]) -> Vec<i64> {
    keys.iter().map(|k| k.get()).collect()
}

/// Post id → comments, newest first.
pub struct CommentFetch {
    pool: SqlitePool,
}

#[async_trait]
impl BulkFetch for CommentFetch {
    type Error = agora_store::Error;
    type Key = RecordId;
    type Row = CommentDetail;

    async fn fetch(&self, keys: &[RecordId]) -> agora_store::Result<Vec<CommentDetail>> {
        posts::comments_for_posts(&self.pool, &raw(keys)).await
    }

    fn owner(row: &CommentDetail) -> RecordId {
        RecordId::new(row.post_id)
    }
}

/// Blog id → blog comments, newest first.
pub struct BlogCommentFetch {
    pool: SqlitePool,
}

#[async_trait]
impl BulkFetch for BlogCommentFetch {
    type Error = agora_store::Error;
    type Key = RecordId;
    type Row = BlogCommentDetail;

    async fn fetch(&self, keys: &[RecordId]) -> agora_store::Result<Vec<BlogCommentDetail>> {
        blogs::comments_for_blogs(&self.pool, &raw(keys)).await
    }

    fn owner(row: &BlogCommentDetail) -> RecordId {
        RecordId::new(row.blog_id)
    }
}

/// Order id → line items with product info.
pub struct OrderProductFetch {
    pool: SqlitePool,
}

#[async_trait]
impl BulkFetch for OrderProductFetch {
    type Error = agora_store::Error;
    type Key = RecordId;
    type Row = OrderProductDetail;

    async fn fetch(&self, keys: &[RecordId]) -> agora_store::Result<Vec<OrderProductDetail>> {
        orders::lines_for_orders(&self.pool, &raw(keys)).await
    }

    fn owner(row: &OrderProductDetail) -> RecordId {
        RecordId::new(row.order_id)
    }
}

/// One loader per parent type, owned by a single request.
#[derive(Debug, Clone)]
pub struct Loaders {
    pub comments: BatchLoader<CommentFetch>,
    pub blog_comments: BatchLoader<BlogCommentFetch>,
    pub order_products: BatchLoader<OrderProductFetch>,
}

impl Loaders {
    pub fn new(pool: &SqlitePool) -> Self {
        Self {
            comments: BatchLoader::new(CommentFetch { pool: pool.clone() }),
            blog_comments: BatchLoader::new(BlogCommentFetch { pool: pool.clone() }),
            order_products: BatchLoader::new(OrderProductFetch { pool: pool.clone() }),
        }
    }

    /// Bulk fetches issued across all loaders of this request.
    pub fn batches(&self) -> usize {
        self.comments.batches() + self.blog_comments.batches() + self.order_products.batches()
    }
}
