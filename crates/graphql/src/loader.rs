//! Request-scoped batch loading of child rows.
//!
//! Resolving a list of parents field by field would otherwise issue one
//! child query per parent. A [`BatchLoader`] collects every key registered
//! while the current resolution pass runs, then issues a single bulk fetch
//! for the distinct keys and hands each caller the rows that belong to it.
//!
//! The batch boundary is an explicit queue-and-drain step run on the
//! caller's own task: a load that queued a new key yields to the scheduler
//! until a full pass registers no further keys, then drains the queue. The
//! resolvers of sibling list items are polled by the same task, so they all
//! register before any of them drains. Whichever caller drains first takes
//! the whole queue; the others wait for its result.

use std::{
    collections::HashMap,
    fmt,
    hash::Hash,
    mem,
    sync::{Arc, Mutex, MutexGuard},
};

use {
    async_trait::async_trait,
    futures::{
        FutureExt,
        channel::oneshot,
        future::{BoxFuture, Shared},
    },
    tracing::{debug, trace, warn},
};

/// Upper bound on scheduler yields before a batch is drained regardless.
const MAX_SETTLE_YIELDS: usize = 8;

/// The bulk query behind a loader: many parent keys in, one flat row set out.
#[async_trait]
pub trait BulkFetch: Send + Sync + 'static {
    type Key: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static;
    type Row: Send + Sync + 'static;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch the children of every key in `keys` with one statement.
    async fn fetch(&self, keys: &[Self::Key]) -> Result<Vec<Self::Row>, Self::Error>;

    /// The parent key a row belongs to (its foreign-key column).
    fn owner(row: &Self::Row) -> Self::Key;
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError<E: std::error::Error + 'static> {
    /// The bulk fetch failed; every key of the batch sees the same error.
    #[error("batch fetch failed: {0}")]
    Fetch(#[source] Arc<E>),

    #[error("batch was dropped before it completed")]
    Dropped,
}

impl<E: std::error::Error + 'static> Clone for LoadError<E> {
    fn clone(&self) -> Self {
        match self {
            Self::Fetch(e) => Self::Fetch(Arc::clone(e)),
            Self::Dropped => Self::Dropped,
        }
    }
}

pub type LoadResult<F> =
    Result<Arc<[<F as BulkFetch>::Row]>, LoadError<<F as BulkFetch>::Error>>;

type Pending<F> = Shared<BoxFuture<'static, LoadResult<F>>>;

struct Entry<F: BulkFetch> {
    /// Generation of the batch the key was queued in.
    batch: u64,
    pending: Pending<F>,
}

struct State<F: BulkFetch> {
    cache: HashMap<F::Key, Entry<F>>,
    queue: Vec<(F::Key, oneshot::Sender<LoadResult<F>>)>,
    /// Generation of the batch currently accepting keys.
    batch: u64,
    dispatched: usize,
}

struct Inner<F: BulkFetch> {
    fetcher: F,
    state: Mutex<State<F>>,
}

/// Deduplicating, batching loader for one parent entity type.
///
/// Build one per inbound request. Results stay cached for the lifetime of
/// the loader, so a key is fetched at most once.
pub struct BatchLoader<F: BulkFetch> {
    inner: Arc<Inner<F>>,
}

impl<F: BulkFetch> Clone for BatchLoader<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F: BulkFetch> fmt::Debug for BatchLoader<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("BatchLoader")
            .field("cached", &state.cache.len())
            .field("queued", &state.queue.len())
            .field("dispatched", &state.dispatched)
            .finish()
    }
}

impl<F: BulkFetch> BatchLoader<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            inner: Arc::new(Inner {
                fetcher,
                state: Mutex::new(State {
                    cache: HashMap::new(),
                    queue: Vec::new(),
                    batch: 0,
                    dispatched: 0,
                }),
            }),
        }
    }

    /// Rows belonging to `key`, in the bulk query's order.
    ///
    /// Every call for the same key shares one result; a key without rows
    /// resolves to an empty slice.
    pub async fn load(&self, key: F::Key) -> LoadResult<F> {
        let (pending, queued_in) = self.register(key);
        if let Some(batch) = queued_in {
            self.inner.settle_and_drain(batch).await;
        }
        pending.await
    }

    /// Number of bulk fetches issued so far.
    pub fn batches(&self) -> usize {
        self.inner.lock().dispatched
    }

    /// Queue `key` unless it is known. Also returns the batch generation when
    /// the key is still waiting to be drained.
    fn register(&self, key: F::Key) -> (Pending<F>, Option<u64>) {
        let mut state = self.inner.lock();
        let current = state.batch;
        if let Some(entry) = state.cache.get(&key) {
            trace!(?key, "loader cache hit");
            return (entry.pending.clone(), (entry.batch == current).then_some(current));
        }

        let (tx, rx) = oneshot::channel();
        let pending = rx
            .map(|received| received.unwrap_or(Err(LoadError::Dropped)))
            .boxed()
            .shared();
        state.cache.insert(key.clone(), Entry {
            batch: current,
            pending: pending.clone(),
        });
        state.queue.push((key, tx));
        (pending, Some(current))
    }
}

impl<F: BulkFetch> Inner<F> {
    fn lock(&self) -> MutexGuard<'_, State<F>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn queued(&self) -> usize {
        self.lock().queue.len()
    }

    async fn settle_and_drain(&self, batch: u64) {
        let mut seen = self.queued();
        for _ in 0..MAX_SETTLE_YIELDS {
            tokio::task::yield_now().await;
            let now = self.queued();
            if now == seen {
                break;
            }
            seen = now;
        }
        self.drain(batch).await;
    }

    /// Fetch and answer batch `batch`; a no-op when another caller took it.
    async fn drain(&self, batch: u64) {
        let queue = {
            let mut state = self.lock();
            if state.batch != batch || state.queue.is_empty() {
                return;
            }
            state.batch += 1;
            state.dispatched += 1;
            mem::take(&mut state.queue)
        };

        let keys: Vec<F::Key> = queue.iter().map(|(key, _)| key.clone()).collect();
        debug!(keys = keys.len(), batch, "dispatching batch");

        match self.fetcher.fetch(&keys).await {
            Ok(rows) => {
                let mut index = partition(&keys, rows, F::owner);
                for (key, tx) in queue {
                    let rows = index.remove(&key).unwrap_or_default();
                    let _ = tx.send(Ok(rows.into()));
                }
            },
            Err(e) => {
                warn!(error = %e, keys = keys.len(), "batch fetch failed");
                let e = Arc::new(e);
                for (_, tx) in queue {
                    let _ = tx.send(Err(LoadError::Fetch(Arc::clone(&e))));
                }
            },
        }
    }
}

/// Split one bulk result into per-key lists.
///
/// Every key in `keys` gets an entry, empty when no row matched. Rows keep
/// their relative order. Rows owned by a key that was not requested are
/// discarded.
fn partition<K, R>(keys: &[K], rows: Vec<R>, owner: impl Fn(&R) -> K) -> HashMap<K, Vec<R>>
where
    K: Clone + Eq + Hash + fmt::Debug,
{
    let mut index: HashMap<K, Vec<R>> = keys.iter().map(|k| (k.clone(), Vec::new())).collect();
    for row in rows {
        let key = owner(&row);
        match index.get_mut(&key) {
            Some(list) => list.push(row),
            None => trace!(?key, "dropping row for unrequested key"),
        }
    }
    index
}
