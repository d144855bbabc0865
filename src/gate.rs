//! Request deduplication and generation stamping in front of a listing source.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::{debug, warn};

use crate::error::{FetchError, FetchTarget};
use crate::filters::{FilterSignature, FilterValues};
use crate::models::ListingsPage;
use crate::sources::traits::ListingSource;
use crate::sources::types::ListingQuery;

pub type Generation = u64;

pub type FetchResult = Result<Arc<ListingsPage>, FetchError>;

type SharedFetch = Shared<BoxFuture<'static, FetchResult>>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FetchKey {
    page: u32,
    signature: FilterSignature,
}

/// A page request that may still be in flight.
///
/// Clones share the same underlying call; awaiting any of them never issues a
/// second request.
#[derive(Clone)]
pub struct PendingFetch {
    key: FetchKey,
    generation: Generation,
    future: SharedFetch,
}

impl PendingFetch {
    pub fn page(&self) -> u32 {
        self.key.page
    }

    pub fn signature(&self) -> &FilterSignature {
        &self.key.signature
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Wait for the source to answer
    pub async fn wait(&self) -> FetchResult {
        self.future.clone().await
    }

    /// Whether two handles refer to the same underlying request
    pub fn same_request(&self, other: &PendingFetch) -> bool {
        self.generation == other.generation && self.future.ptr_eq(&other.future)
    }
}

impl fmt::Debug for PendingFetch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingFetch")
            .field("page", &self.key.page)
            .field("signature", &self.key.signature)
            .field("generation", &self.generation)
            .finish()
    }
}

/// How an arrived response relates to the gate's current generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrival {
    Current,
    Stale { stamped: Generation, current: Generation },
}

pub struct FetchGate {
    source: Arc<dyn ListingSource>,
    page_size: u32,
    generation: Generation,
    in_flight: HashMap<FetchKey, PendingFetch>,
}

impl FetchGate {
    pub fn new(source: Arc<dyn ListingSource>, page_size: u32) -> Self {
        Self {
            source,
            page_size,
            generation: 0,
            in_flight: HashMap::new(),
        }
    }

    pub fn source(&self) -> &Arc<dyn ListingSource> {
        &self.source
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_in_flight(&self, page: u32, signature: &FilterSignature) -> bool {
        self.in_flight.contains_key(&FetchKey {
            page,
            signature: signature.clone(),
        })
    }

    /// Request `page` under `filters`, joining an identical request already in flight
    pub fn request(&mut self, page: u32, filters: &FilterValues) -> PendingFetch {
        let key = FetchKey {
            page,
            signature: filters.signature(),
        };

        if let Some(pending) = self.in_flight.get(&key) {
            debug!(
                "Joining in-flight request for page {} ({}) at generation {}",
                page, key.signature, pending.generation
            );
            return pending.clone();
        }

        let source = Arc::clone(&self.source);
        let query = ListingQuery::new(page, self.page_size, filters.clone());
        let future = async move {
            source
                .fetch_listings(&query)
                .await
                .map(Arc::new)
                .map_err(|err| FetchError::new(FetchTarget::Page(query.page), &err))
        }
        .boxed()
        .shared();

        debug!(
            "Requesting page {} ({}) at generation {}",
            page, key.signature, self.generation
        );

        let pending = PendingFetch {
            key: key.clone(),
            generation: self.generation,
            future,
        };
        self.in_flight.insert(key, pending.clone());
        pending
    }

    /// Supersede every request issued so far
    pub fn invalidate(&mut self) -> Generation {
        self.generation += 1;
        if !self.in_flight.is_empty() {
            debug!(
                "Abandoning {} in-flight request(s) at generation {}",
                self.in_flight.len(),
                self.generation
            );
        }
        self.in_flight.clear();
        self.generation
    }

    /// Release the in-flight slot of an arrived request and classify it.
    ///
    /// Failures are not remembered, so the next identical request goes out again.
    pub fn settle(&mut self, pending: &PendingFetch) -> Arrival {
        if let Some(held) = self.in_flight.get(&pending.key) {
            if held.generation == pending.generation {
                self.in_flight.remove(&pending.key);
            }
        }

        if pending.generation == self.generation {
            Arrival::Current
        } else {
            warn!(
                "Dropping response for page {} from generation {} (current is {})",
                pending.key.page, pending.generation, self.generation
            );
            Arrival::Stale {
                stamped: pending.generation,
                current: self.generation,
            }
        }
    }
}
