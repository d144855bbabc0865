use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use async_trait::async_trait;
use listing_browser::cache::Absorbed;
use listing_browser::models::{Address, Engagement, Listing, ListingsPage, Page};
use listing_browser::sources::{InMemoryListingSource, ListingQuery, ListingSource};
use listing_browser::{
    Bounds, BrowserConfig, BrowserState, Completion, Direction, FetchGate, FilterValue,
    FilterValues, LoadDecision, ListingBrowser, LoadSignal, PageCache, ScrollSample,
    ScrollTrigger, VisibleMode,
};

fn listing(id: u64, rooms: u32) -> Listing {
    Listing {
        id,
        address: Address {
            street: format!("Rua Nascimento Silva, {}", id),
            neighborhood: if id % 2 == 0 { "Ipanema" } else { "Leblon" }.to_string(),
            city: "Rio de Janeiro".to_string(),
            lat: -22.98,
            lng: -43.21,
        },
        images: vec![format!("{}.jpg", id)],
        price: 600_000 + id * 10_000,
        area: 50 + rooms * 20,
        rooms,
        engagement: Engagement::default(),
        inserted_at: None,
    }
}

/// 35 three-room listings followed by 10 two-room ones
fn catalogue() -> InMemoryListingSource {
    let listings = (1..=35)
        .map(|id| listing(id, 3))
        .chain((36..=45).map(|id| listing(id, 2)))
        .collect();
    InMemoryListingSource::new(listings)
}

/// Counts calls and fails the listing requests at the given call indices
struct CountingSource {
    inner: InMemoryListingSource,
    failing_calls: Vec<usize>,
    listing_calls: AtomicUsize,
    neighborhood_calls: AtomicUsize,
}

impl CountingSource {
    fn new(failing_calls: &[usize]) -> Self {
        Self {
            inner: catalogue(),
            failing_calls: failing_calls.to_vec(),
            listing_calls: AtomicUsize::new(0),
            neighborhood_calls: AtomicUsize::new(0),
        }
    }

    fn listing_calls(&self) -> usize {
        self.listing_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ListingSource for CountingSource {
    async fn fetch_listings(&self, query: &ListingQuery) -> Result<ListingsPage> {
        let call = self.listing_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_calls.contains(&call) {
            anyhow::bail!("listing service unavailable");
        }
        self.inner.fetch_listings(query).await
    }

    async fn fetch_neighborhoods(&self) -> Result<Vec<String>> {
        self.neighborhood_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch_neighborhoods().await
    }

    fn source_name(&self) -> &'static str {
        "counting"
    }
}

fn browser_over(source: Arc<dyn ListingSource>, query: &str) -> ListingBrowser {
    ListingBrowser::new(source, BrowserConfig::default(), query).unwrap()
}

fn next() -> LoadSignal {
    LoadSignal {
        direction: Direction::Next,
    }
}

fn ids(listings: Vec<&Listing>) -> Vec<u64> {
    listings.into_iter().map(|l| l.id).collect()
}

async fn scroll_to_next(browser: &mut ListingBrowser) -> Completion {
    match browser.on_load_signal(next()) {
        LoadDecision::Fetch(pending) => browser.resolve(pending).await,
        other => panic!("expected a fetch, got {:?}", other),
    }
}

#[tokio::test]
async fn rooms_filter_then_scroll_to_second_page() {
    let mut browser = browser_over(Arc::new(catalogue()), "");

    let change = browser.edit_filters(|f| f.set_value(FilterValue::Rooms(Some(3))));
    assert_eq!(change.navigation.unwrap().query.as_deref(), Some("quartos=3"));

    let first = change.fetch.unwrap();
    assert_eq!(
        browser.resolve(first).await,
        Completion::Applied { page: 1, listings: 10 }
    );
    assert_eq!(browser.cache().total_pages(), 4);

    let mut trigger = ScrollTrigger::default();
    let signal = trigger
        .on_scroll(ScrollSample::new(Some(4_000.0), 2_500.0), Instant::now())
        .expect("sentinel within threshold");

    let pending = match browser.on_load_signal(signal) {
        LoadDecision::Fetch(pending) => pending,
        other => panic!("expected a fetch, got {:?}", other),
    };
    assert_eq!(pending.page(), 2);
    browser.resolve(pending).await;

    assert_eq!(browser.cache().current_page(), Some(2));
    let visible = ids(browser.visible_listings(VisibleMode::SinglePage));
    assert_eq!(visible, (11..=20).collect::<Vec<u64>>());
    assert!(!visible.contains(&1));
    assert_eq!(browser.map_markers().len(), 10);
}

#[tokio::test]
async fn price_edit_discards_late_page_three() {
    let mut browser = browser_over(Arc::new(catalogue()), "quartos=3");
    let first = browser.start();
    browser.resolve(first).await;
    scroll_to_next(&mut browser).await;

    let page_three = match browser.on_load_signal(next()) {
        LoadDecision::Fetch(pending) => pending,
        other => panic!("expected a fetch, got {:?}", other),
    };
    assert_eq!(page_three.page(), 3);

    let change = browser.edit_filters(|f| {
        f.set_value(FilterValue::Price(Bounds::new(Some(700_000), None)))
    });
    let new_signature = browser.filters().signature();
    assert!(browser.generation() > page_three.generation());

    // the old response arrives after the filter change
    assert_eq!(browser.resolve(page_three).await, Completion::Stale);
    assert!(browser.cache().is_empty());
    assert_eq!(browser.cache().signature(), &new_signature);
    assert!(browser.is_loading());

    let fetch = change.fetch.unwrap();
    browser.resolve(fetch).await;
    assert_eq!(browser.cache().held_range(), Some((1, 1)));
    assert_eq!(browser.cache().current_page(), Some(1));
    assert!(browser
        .visible_listings(VisibleMode::SinglePage)
        .iter()
        .all(|l| l.price >= 700_000 && l.rooms == 3));
}

#[tokio::test]
async fn duplicate_requests_reach_the_source_once() {
    let source = Arc::new(CountingSource::new(&[]));
    let mut gate = FetchGate::new(source.clone(), 10);
    let filters = FilterValues {
        rooms: Some(3),
        ..FilterValues::default()
    };

    let a = gate.request(1, &filters);
    let b = gate.request(1, &filters);
    let (ra, rb) = futures::join!(a.wait(), b.wait());
    assert_eq!(ra.unwrap(), rb.unwrap());
    assert_eq!(source.listing_calls(), 1);
}

#[tokio::test]
async fn failed_first_page_is_retried_by_scrolling() {
    let source = Arc::new(CountingSource::new(&[0]));
    let mut browser = browser_over(source.clone(), "");

    let first = browser.start();
    assert!(matches!(browser.resolve(first).await, Completion::Failed(_)));
    assert_eq!(*browser.state(), BrowserState::Idle);
    assert!(browser.cache().is_empty());

    assert!(matches!(
        scroll_to_next(&mut browser).await,
        Completion::Applied { page: 1, .. }
    ));
    assert_eq!(source.listing_calls(), 2);
}

#[tokio::test]
async fn failed_page_leaves_cache_intact_and_is_fetched_fresh() {
    let source = Arc::new(CountingSource::new(&[1]));
    let mut browser = browser_over(source.clone(), "");
    let first = browser.start();
    browser.resolve(first).await;

    assert!(matches!(
        scroll_to_next(&mut browser).await,
        Completion::Failed(_)
    ));
    assert_eq!(browser.cache().current_page(), Some(1));
    assert_eq!(browser.cache().held_range(), Some((1, 1)));
    assert_eq!(*browser.state(), BrowserState::Idle);

    // a later scroll asks again instead of replaying the failure
    assert!(matches!(
        scroll_to_next(&mut browser).await,
        Completion::Applied { page: 2, .. }
    ));
    assert_eq!(source.listing_calls(), 3);
    assert_eq!(browser.cache().current_page(), Some(2));
}

#[tokio::test]
async fn neighborhoods_are_fetched_once_per_session() {
    let source = Arc::new(CountingSource::new(&[]));
    let mut browser = browser_over(source.clone(), "");

    let names = browser.load_neighborhoods().await.unwrap().to_vec();
    assert_eq!(names, vec!["Ipanema", "Leblon"]);
    browser.load_neighborhoods().await.unwrap();
    assert_eq!(source.neighborhood_calls.load(Ordering::SeqCst), 1);
    assert_eq!(browser.neighborhoods().map(<[String]>::len), Some(2));
}

#[tokio::test]
async fn scrolling_back_to_a_held_page_does_not_fetch() {
    let source = Arc::new(CountingSource::new(&[]));
    let mut browser = browser_over(source.clone(), "quartos=3&page=2");

    let first = browser.start();
    assert_eq!(first.page(), 2);
    browser.resolve(first).await;

    let previous = LoadSignal {
        direction: Direction::Previous,
    };
    let pending = match browser.on_load_signal(previous) {
        LoadDecision::Fetch(pending) => pending,
        other => panic!("expected a fetch, got {:?}", other),
    };
    assert_eq!(pending.page(), 1);
    browser.resolve(pending).await;
    assert_eq!(browser.cache().current_page(), Some(1));

    assert!(matches!(browser.on_load_signal(next()), LoadDecision::Moved(2)));
    assert_eq!(source.listing_calls(), 2);
    assert_eq!(
        ids(browser.visible_listings(VisibleMode::Accumulated)),
        (1..=20).collect::<Vec<u64>>()
    );
}

#[test]
fn pages_of_one_generation_may_arrive_out_of_order() {
    let signature = FilterValues::default().signature();
    let mut cache = PageCache::new(signature.clone());
    let page = |number: u32, ids: std::ops::RangeInclusive<u64>| Page {
        number,
        listings: ids.map(|id| listing(id, 3)).collect(),
    };

    assert_eq!(cache.absorb(page(3, 21..=30), 4, &signature), Absorbed::Inserted);
    assert_eq!(cache.absorb(page(2, 11..=20), 4, &signature), Absorbed::Inserted);
    assert_eq!(cache.held_range(), Some((2, 3)));
    assert_eq!(cache.current_page(), Some(3));
}
