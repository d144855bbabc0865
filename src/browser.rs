//! Orchestrates filters, page cache and fetch gate for one listing view.
//!
//! Every handler runs to completion on `&mut self`; the only thing that happens
//! concurrently is the network, and its answers come back through
//! [`ListingBrowser::complete`].

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cache::{Absorbed, PageCache, Step, VisibleMode};
use crate::config::BrowserConfig;
use crate::error::{FetchError, FetchTarget, Result};
use crate::filters::{FilterSignature, FilterState};
use crate::gate::{Arrival, FetchGate, FetchResult, Generation, PendingFetch};
use crate::models::{Listing, ListingsPage, MapMarker};
use crate::query::{self, NavigationIntent};
use crate::scroll::{Direction, LoadSignal};
use crate::sources::traits::ListingSource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserState {
    Idle,
    Loading {
        page: u32,
        signature: FilterSignature,
        generation: Generation,
    },
}

/// Outputs of a filter edit
#[derive(Debug, Default)]
pub struct FilterChange {
    /// Route the router should move to; `None` when only a panel was toggled
    pub navigation: Option<NavigationIntent>,
    /// First page of the new result set
    pub fetch: Option<PendingFetch>,
}

impl FilterChange {
    pub fn is_refetch(&self) -> bool {
        self.fetch.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    Busy,
    AtBoundary,
}

/// What the browser did with a load signal
#[derive(Debug)]
pub enum LoadDecision {
    Fetch(PendingFetch),
    /// The page was already held and is now current
    Moved(u32),
    Ignored(IgnoreReason),
}

/// What happened when a response arrived
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Applied { page: u32, listings: usize },
    /// The filters match nothing
    Empty,
    /// Superseded by a filter change and dropped
    Stale,
    Failed(FetchError),
}

pub struct ListingBrowser {
    config: BrowserConfig,
    filters: FilterState,
    cache: PageCache,
    gate: FetchGate,
    state: BrowserState,
    neighborhoods: Option<Vec<String>>,
    first_page: u32,
}

impl ListingBrowser {
    /// Browser for the filters and page found in the initial route query
    pub fn new(
        source: Arc<dyn ListingSource>,
        config: BrowserConfig,
        initial_query: &str,
    ) -> Result<Self> {
        config.validate()?;
        let route = query::parse(initial_query)?;
        let filters = FilterState::new(route.values);

        info!(
            "Browsing {} with {} active filter(s)",
            source.source_name(),
            filters.active_count()
        );

        Ok(Self {
            cache: PageCache::new(filters.signature()),
            gate: FetchGate::new(source, config.page_size),
            state: BrowserState::Idle,
            neighborhoods: None,
            first_page: route.page.unwrap_or(1),
            filters,
            config,
        })
    }

    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn state(&self) -> &BrowserState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, BrowserState::Loading { .. })
    }

    pub fn cache(&self) -> &PageCache {
        &self.cache
    }

    pub fn generation(&self) -> Generation {
        self.gate.generation()
    }

    /// Load the page the browser was opened on
    pub fn start(&mut self) -> PendingFetch {
        self.begin_loading(self.first_page)
    }

    fn begin_loading(&mut self, page: u32) -> PendingFetch {
        let pending = self.gate.request(page, self.filters.values());
        self.state = BrowserState::Loading {
            page,
            signature: pending.signature().clone(),
            generation: pending.generation(),
        };
        pending
    }

    /// Apply a filter transition.
    ///
    /// A change of filter values drops every cached page and in-flight request
    /// and starts over at page 1; toggling panels touches nothing else.
    pub fn edit_filters<F>(&mut self, edit: F) -> FilterChange
    where
        F: FnOnce(&FilterState) -> FilterState,
    {
        let next = edit(&self.filters);
        let signature = next.signature();
        let changed = signature != *self.cache.signature();
        let rerouted = query::serialize(next.values()) != query::serialize(self.filters.values());
        self.filters = next;

        let navigation = rerouted.then(|| self.route());
        if !changed {
            return FilterChange {
                navigation,
                fetch: None,
            };
        }

        info!("Filters changed to {}", signature);
        self.gate.invalidate();
        self.cache.reset(signature);
        self.first_page = 1;

        FilterChange {
            navigation,
            fetch: Some(self.begin_loading(1)),
        }
    }

    pub fn reset_filters(&mut self) -> FilterChange {
        self.edit_filters(FilterState::reset_all)
    }

    pub fn on_load_signal(&mut self, signal: LoadSignal) -> LoadDecision {
        if self.is_loading() {
            debug!("Ignoring {:?} load signal while loading", signal.direction);
            return LoadDecision::Ignored(IgnoreReason::Busy);
        }

        // nothing held yet: the first page failed, so try it again
        if self.cache.current_page().is_none() {
            return LoadDecision::Fetch(self.begin_loading(self.first_page));
        }

        let target = match signal.direction {
            Direction::Next => self.cache.next_page(),
            Direction::Previous => self.cache.prev_page(),
        };
        let Some(target) = target else {
            return LoadDecision::Ignored(IgnoreReason::AtBoundary);
        };

        if self.cache.contains(target) {
            if let Step::Moved(page) = self.step(signal.direction) {
                return LoadDecision::Moved(page);
            }
        }

        LoadDecision::Fetch(self.begin_loading(target))
    }

    fn step(&mut self, direction: Direction) -> Step {
        match direction {
            Direction::Next => self.cache.advance(),
            Direction::Previous => self.cache.retreat(),
        }
    }

    /// Take in the answer to `pending`
    pub fn complete(&mut self, pending: &PendingFetch, result: FetchResult) -> Completion {
        if let Arrival::Stale { .. } = self.gate.settle(pending) {
            return Completion::Stale;
        }

        if matches!(self.state, BrowserState::Loading { page, generation, .. }
            if page == pending.page() && generation == pending.generation())
        {
            self.state = BrowserState::Idle;
        }

        let body = match result {
            Ok(body) => body,
            Err(err) => {
                warn!("{}", err);
                return Completion::Failed(err);
            }
        };

        let number = pending.page();
        if body.page_number != number {
            warn!(
                "Asked for page {} but the source answered with page {}",
                number, body.page_number
            );
        }

        let previous = self.cache.current_page();
        let (mut page, total_pages) = ListingsPage::clone(&body).into_page();
        page.number = number;
        let count = page.listings.len();

        match self.cache.absorb(page, total_pages, pending.signature()) {
            Absorbed::SignatureMismatch => return Completion::Stale,
            absorbed => debug!("Page {} absorbed: {:?}", number, absorbed),
        }

        match previous {
            Some(current) if number == current + 1 => {
                self.cache.advance();
            }
            Some(current) if number + 1 == current => {
                self.cache.retreat();
            }
            _ => {}
        }

        if total_pages == 0 || (count == 0 && total_pages <= 1) {
            info!("No listings match {}", pending.signature());
            Completion::Empty
        } else {
            Completion::Applied {
                page: number,
                listings: count,
            }
        }
    }

    /// Wait for `pending` and take in its answer
    pub async fn resolve(&mut self, pending: PendingFetch) -> Completion {
        let result = pending.wait().await;
        self.complete(&pending, result)
    }

    /// Neighborhood names for the filter panel, fetched once per session
    pub async fn load_neighborhoods(&mut self) -> std::result::Result<&[String], FetchError> {
        if self.neighborhoods.is_none() {
            let names = self
                .gate
                .source()
                .fetch_neighborhoods()
                .await
                .map_err(|err| FetchError::new(FetchTarget::Neighborhoods, &err))?;
            debug!("Loaded {} neighborhoods", names.len());
            self.neighborhoods = Some(names);
        }
        Ok(self.neighborhoods.as_deref().unwrap_or_default())
    }

    pub fn neighborhoods(&self) -> Option<&[String]> {
        self.neighborhoods.as_deref()
    }

    pub fn visible_listings(&self, mode: VisibleMode) -> Vec<&Listing> {
        self.cache.visible_listings(mode)
    }

    /// Markers for the listings of the current page
    pub fn map_markers(&self) -> Vec<MapMarker> {
        self.cache
            .visible_listings(VisibleMode::SinglePage)
            .into_iter()
            .map(MapMarker::from)
            .collect()
    }

    /// Whether a sentinel should be rendered for `direction`
    pub fn has_more(&self, direction: Direction) -> bool {
        match direction {
            Direction::Next => self.cache.next_page().is_some(),
            Direction::Previous => self.cache.prev_page().is_some(),
        }
    }

    /// Canonical route of the current filters
    pub fn route(&self) -> NavigationIntent {
        query::route(&self.config.routes, self.filters.values())
    }

    /// Route a next-page sentinel links to
    pub fn next_page_route(&self) -> Option<NavigationIntent> {
        let next = self.cache.next_page()?;
        Some(query::page_route(&self.config.routes, self.filters.values(), next))
    }
}
