//! Paginated, filter-driven listing browser.
//!
//! [`ListingBrowser`] keeps a [`FilterState`] in step with its canonical query,
//! loads result pages through a [`FetchGate`] as the user scrolls, and exposes a
//! consistent set of visible listings to the list and the map.

pub mod browser;
pub mod cache;
pub mod config;
pub mod error;
pub mod filters;
pub mod gate;
pub mod models;
pub mod query;
pub mod scroll;
pub mod sources;

pub use browser::{BrowserState, Completion, FilterChange, IgnoreReason, ListingBrowser, LoadDecision};
pub use cache::{PageCache, VisibleMode};
pub use config::BrowserConfig;
pub use error::{BrowserError, FetchError};
pub use filters::{Bounds, FilterState, FilterValue, FilterValues, MobileGroup, Param};
pub use gate::{FetchGate, PendingFetch};
pub use scroll::{Direction, LoadSignal, ScrollSample, ScrollTrigger};
