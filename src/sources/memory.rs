use crate::filters::{Bounds, FilterValues};
use crate::models::{Address, Engagement, Listing, ListingsPage};
use crate::sources::traits::ListingSource;
use crate::sources::types::ListingQuery;
use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info};

const NEIGHBORHOODS: [(&str, f64, f64); 12] = [
    ("Botafogo", -22.9519, -43.1864),
    ("Copacabana", -22.9711, -43.1822),
    ("Flamengo", -22.9329, -43.1747),
    ("Gávea", -22.9794, -43.2297),
    ("Humaitá", -22.9560, -43.1999),
    ("Ipanema", -22.9838, -43.2096),
    ("Jardim Botânico", -22.9668, -43.2245),
    ("Lagoa", -22.9711, -43.2105),
    ("Laranjeiras", -22.9352, -43.1867),
    ("Leblon", -22.9847, -43.2233),
    ("Leme", -22.9633, -43.1707),
    ("Urca", -22.9503, -43.1669),
];

const STREETS: [&str; 6] = [
    "Rua Voluntários da Pátria",
    "Avenida Atlântica",
    "Rua Barata Ribeiro",
    "Rua Visconde de Pirajá",
    "Rua Jardim Botânico",
    "Rua das Laranjeiras",
];

/// Listing source serving a fixed catalogue from memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryListingSource {
    listings: Vec<Listing>,
}

impl InMemoryListingSource {
    pub fn new(listings: Vec<Listing>) -> Self {
        Self { listings }
    }

    /// Catalogue of typical Zona Sul apartments
    pub fn seeded() -> Self {
        info!("📋 Generating seeded catalogue of Zona Sul listings");

        let listings = (1..=48u64)
            .map(|id| {
                let (neighborhood, lat, lng) = NEIGHBORHOODS[(id as usize * 7) % NEIGHBORHOODS.len()];
                let rooms = (id % 4 + 1) as u32;
                let area = 35 + rooms * 22 + (id % 9) as u32 * 3;
                let offset = (id % 5) as f64 * 0.0017;

                Listing {
                    id,
                    address: Address {
                        street: format!("{}, {}", STREETS[id as usize % STREETS.len()], 100 + id * 13),
                        neighborhood: neighborhood.to_string(),
                        city: "Rio de Janeiro".to_string(),
                        lat: lat + offset,
                        lng: lng - offset,
                    },
                    images: vec![format!("listings/{}/main.jpg", id)],
                    price: 450_000 + u64::from(area) * 11_500 + (id % 7) * 35_000,
                    area,
                    rooms,
                    engagement: Engagement {
                        listing_visualisation_count: (id * 37 % 400) as u32,
                        listing_favorite_count: (id * 11 % 40) as u32,
                        interest_count: (id * 5 % 12) as u32,
                        tour_visualisation_count: (id * 17 % 90) as u32,
                        in_person_visit_count: (id % 6) as u32,
                    },
                    inserted_at: None,
                }
            })
            .collect();

        Self::new(listings)
    }

    fn matching<'a>(&'a self, filters: &'a FilterValues) -> impl Iterator<Item = &'a Listing> + 'a {
        self.listings.iter().filter(move |listing| matches(listing, filters))
    }
}

fn within(bounds: &Bounds, value: u64) -> bool {
    bounds.min.map_or(true, |min| value >= min) && bounds.max.map_or(true, |max| value <= max)
}

fn matches(listing: &Listing, filters: &FilterValues) -> bool {
    within(&filters.price, listing.price)
        && within(&filters.area, u64::from(listing.area))
        && filters.rooms.map_or(true, |rooms| listing.rooms == rooms)
        && (filters.neighborhoods.is_empty()
            || filters
                .neighborhoods
                .iter()
                .any(|name| *name == listing.address.neighborhood))
}

#[async_trait]
impl ListingSource for InMemoryListingSource {
    async fn fetch_listings(&self, query: &ListingQuery) -> Result<ListingsPage> {
        anyhow::ensure!(query.page >= 1, "page numbers start at 1, got {}", query.page);
        anyhow::ensure!(query.page_size >= 1, "page size must be positive");

        let matched: Vec<&Listing> = self.matching(&query.filters).collect();
        let page_size = query.page_size as usize;
        let total_pages = matched.len().div_ceil(page_size) as u32;
        let listings = matched
            .into_iter()
            .skip((query.page as usize - 1) * page_size)
            .take(page_size)
            .cloned()
            .collect::<Vec<_>>();

        debug!(
            "Serving page {}/{} with {} listings from memory",
            query.page,
            total_pages,
            listings.len()
        );

        Ok(ListingsPage {
            page_number: query.page,
            total_pages,
            listings,
        })
    }

    async fn fetch_neighborhoods(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self
            .listings
            .iter()
            .map(|listing| listing.address.neighborhood.clone())
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    fn source_name(&self) -> &'static str {
        "In-memory catalogue"
    }
}
