//! Offset pagination with a look-ahead row.
//!
//! Listings fetch `limit + 1` rows; the extra row only signals that another
//! page exists and is dropped before the page is returned.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u32,
    pub offset: u32,
}

impl PageRequest {
    #[must_use]
    pub fn new(limit: u32, offset: u32) -> Self {
        Self { limit, offset }
    }

    /// Row count to request from the store.
    #[must_use]
    pub fn fetch_limit(&self) -> i64 {
        i64::from(self.limit) + 1
    }

    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.offset)
    }

    /// Shrink the window so it never reaches past `total` rows.
    ///
    /// Returns `None` when the offset already sits at or beyond `total`.
    #[must_use]
    pub fn clamp_to(self, total: Option<u32>) -> Option<Self> {
        match total {
            None => Some(self),
            Some(total) if self.offset >= total => None,
            Some(total) => Some(Self {
                limit: self.limit.min(total - self.offset),
                offset: self.offset,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Build a page from rows fetched with [`PageRequest::fetch_limit`].
    #[must_use]
    pub fn from_overfetch(mut rows: Vec<T>, request: PageRequest) -> Self {
        let limit = request.limit as usize;
        let has_more = rows.len() > limit;
        rows.truncate(limit);
        Self {
            items: rows,
            has_more,
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            has_more: false,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            has_more: self.has_more,
        }
    }
}
