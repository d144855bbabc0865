//! Fetched pages for the current filter signature.

use std::collections::{BTreeMap, HashSet};

use crate::filters::FilterSignature;
use crate::models::{Listing, Page};

/// Which listings count as visible
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibleMode {
    /// Only the current page; what the map shows
    SinglePage,
    /// Held pages from the lowest through the current one, each listing once
    Accumulated,
}

/// Result of offering a page to the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Absorbed {
    Inserted,
    Replaced,
    /// Same page with the same content was already held
    Unchanged,
    /// Page belongs to another signature and was ignored
    SignatureMismatch,
}

/// Result of moving the current page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Moved(u32),
    AtBoundary,
}

#[derive(Debug, Clone, Default)]
pub struct PageCache {
    signature: FilterSignature,
    pages: BTreeMap<u32, Page>,
    current_page: Option<u32>,
    total_pages: u32,
}

impl PageCache {
    pub fn new(signature: FilterSignature) -> Self {
        Self {
            signature,
            ..Self::default()
        }
    }

    pub fn signature(&self) -> &FilterSignature {
        &self.signature
    }

    pub fn current_page(&self) -> Option<u32> {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn contains(&self, page: u32) -> bool {
        self.pages.contains_key(&page)
    }

    /// Lowest and highest page numbers held
    pub fn held_range(&self) -> Option<(u32, u32)> {
        let low = *self.pages.keys().next()?;
        let high = *self.pages.keys().next_back()?;
        Some((low, high))
    }

    pub fn next_page(&self) -> Option<u32> {
        let current = self.current_page?;
        (current < self.total_pages).then_some(current + 1)
    }

    pub fn prev_page(&self) -> Option<u32> {
        let current = self.current_page?;
        (current > 1 && current - 1 <= self.total_pages).then_some(current - 1)
    }

    /// Drop every page and adopt a new signature
    pub fn reset(&mut self, signature: FilterSignature) {
        *self = Self::new(signature);
    }

    pub fn absorb(&mut self, page: Page, total_pages: u32, signature: &FilterSignature) -> Absorbed {
        if *signature != self.signature {
            return Absorbed::SignatureMismatch;
        }

        self.total_pages = total_pages;
        if self.current_page.is_none() {
            self.current_page = Some(page.number);
        }

        let same_content = self
            .pages
            .get(&page.number)
            .map(|held| held.listings == page.listings);

        match same_content {
            Some(true) => Absorbed::Unchanged,
            Some(false) => {
                self.pages.insert(page.number, page);
                Absorbed::Replaced
            }
            None => {
                self.pages.insert(page.number, page);
                Absorbed::Inserted
            }
        }
    }

    pub fn advance(&mut self) -> Step {
        match self.next_page() {
            Some(next) => {
                self.current_page = Some(next);
                Step::Moved(next)
            }
            None => Step::AtBoundary,
        }
    }

    pub fn retreat(&mut self) -> Step {
        match self.prev_page() {
            Some(prev) => {
                self.current_page = Some(prev);
                Step::Moved(prev)
            }
            None => Step::AtBoundary,
        }
    }

    pub fn visible_listings(&self, mode: VisibleMode) -> Vec<&Listing> {
        let Some(current) = self.current_page else {
            return Vec::new();
        };

        match mode {
            VisibleMode::SinglePage => self
                .pages
                .get(&current)
                .map(|page| page.listings.iter().collect())
                .unwrap_or_default(),
            VisibleMode::Accumulated => {
                let mut seen = HashSet::new();
                self.pages
                    .range(..=current)
                    .flat_map(|(_, page)| page.listings.iter())
                    .filter(|listing| seen.insert(listing.id))
                    .collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Address, Engagement};

    fn listing(id: u64) -> Listing {
        Listing {
            id,
            address: Address {
                street: format!("Rua {}", id),
                neighborhood: "Botafogo".to_string(),
                city: "Rio de Janeiro".to_string(),
                lat: -22.95,
                lng: -43.18,
            },
            images: vec![],
            price: 800_000,
            area: 70,
            rooms: 2,
            engagement: Engagement::default(),
            inserted_at: None,
        }
    }

    fn page(number: u32, ids: &[u64]) -> Page {
        Page {
            number,
            listings: ids.iter().copied().map(listing).collect(),
        }
    }

    fn sig(s: &str) -> FilterSignature {
        crate::filters::FilterValues {
            neighborhoods: vec![s.to_string()],
            ..Default::default()
        }
        .signature()
    }

    fn ids(listings: Vec<&Listing>) -> Vec<u64> {
        listings.into_iter().map(|l| l.id).collect()
    }

    #[test]
    fn absorb_under_other_signature_is_ignored() {
        let mut cache = PageCache::new(sig("a"));
        cache.reset(sig("b"));
        assert_eq!(cache.absorb(page(1, &[1, 2]), 3, &sig("a")), Absorbed::SignatureMismatch);
        assert!(cache.is_empty());
        assert_eq!(cache.current_page(), None);
        assert_eq!(cache.total_pages(), 0);
    }

    #[test]
    fn absorbing_twice_changes_nothing() {
        let mut cache = PageCache::new(sig("a"));
        assert_eq!(cache.absorb(page(1, &[1, 2]), 3, &sig("a")), Absorbed::Inserted);
        let before = (cache.current_page(), cache.total_pages(), cache.held_range());
        assert_eq!(cache.absorb(page(1, &[1, 2]), 3, &sig("a")), Absorbed::Unchanged);
        assert_eq!(before, (cache.current_page(), cache.total_pages(), cache.held_range()));
        assert_eq!(ids(cache.visible_listings(VisibleMode::SinglePage)), vec![1, 2]);
    }

    #[test]
    fn changed_content_replaces_page() {
        let mut cache = PageCache::new(sig("a"));
        cache.absorb(page(1, &[1, 2]), 3, &sig("a"));
        assert_eq!(cache.absorb(page(1, &[1, 9]), 3, &sig("a")), Absorbed::Replaced);
        assert_eq!(ids(cache.visible_listings(VisibleMode::SinglePage)), vec![1, 9]);
    }

    #[test]
    fn advance_and_retreat_clamp_at_bounds() {
        let mut cache = PageCache::new(sig("a"));
        assert_eq!(cache.advance(), Step::AtBoundary);

        cache.absorb(page(1, &[1]), 2, &sig("a"));
        assert_eq!(cache.retreat(), Step::AtBoundary);
        assert_eq!(cache.advance(), Step::Moved(2));
        assert_eq!(cache.advance(), Step::AtBoundary);
        assert_eq!(cache.current_page(), Some(2));
        assert_eq!(cache.retreat(), Step::Moved(1));
    }

    #[test]
    fn reported_page_count_is_kept_as_given() {
        let mut cache = PageCache::new(sig("a"));
        cache.absorb(page(3, &[]), 0, &sig("a"));
        assert_eq!(cache.total_pages(), 0);
        assert_eq!(cache.current_page(), Some(3));
        assert_eq!(cache.prev_page(), None);
        assert_eq!(cache.next_page(), None);
        assert_eq!(cache.retreat(), Step::AtBoundary);
    }

    #[test]
    fn single_page_mode_shows_only_current_page() {
        let mut cache = PageCache::new(sig("a"));
        cache.absorb(page(1, &[1, 2]), 4, &sig("a"));
        cache.absorb(page(2, &[3, 4]), 4, &sig("a"));
        assert_eq!(ids(cache.visible_listings(VisibleMode::SinglePage)), vec![1, 2]);

        cache.advance();
        assert_eq!(ids(cache.visible_listings(VisibleMode::SinglePage)), vec![3, 4]);
        assert_eq!(cache.held_range(), Some((1, 2)));
    }

    #[test]
    fn accumulated_mode_skips_repeated_listings() {
        let mut cache = PageCache::new(sig("a"));
        cache.absorb(page(1, &[1, 2, 3]), 3, &sig("a"));
        cache.absorb(page(2, &[3, 4]), 3, &sig("a"));
        cache.absorb(page(3, &[5]), 3, &sig("a"));
        cache.advance();

        assert_eq!(ids(cache.visible_listings(VisibleMode::Accumulated)), vec![1, 2, 3, 4]);
    }

    #[test]
    fn reset_discards_everything() {
        let mut cache = PageCache::new(sig("a"));
        cache.absorb(page(1, &[1]), 2, &sig("a"));
        cache.reset(sig("b"));
        assert!(cache.is_empty());
        assert_eq!(cache.signature(), &sig("b"));
        assert_eq!(cache.current_page(), None);
        assert!(cache.visible_listings(VisibleMode::Accumulated).is_empty());
    }
}
