use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Street address and coordinates of a listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Address {
    pub street: String,
    pub neighborhood: String,
    pub city: String,
    pub lat: f64,
    pub lng: f64,
}

/// Engagement counters shown on the listing statistics panel
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Engagement {
    #[serde(default)]
    pub listing_visualisation_count: u32,
    #[serde(default)]
    pub listing_favorite_count: u32,
    #[serde(default)]
    pub interest_count: u32,
    #[serde(default)]
    pub tour_visualisation_count: u32,
    #[serde(default)]
    pub in_person_visit_count: u32,
}

/// Core listing record, immutable once fetched
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Listing {
    pub id: u64,
    pub address: Address,
    #[serde(default)]
    pub images: Vec<String>,
    pub price: u64,
    pub area: u32,
    pub rooms: u32,
    #[serde(flatten)]
    pub engagement: Engagement,
    #[serde(default)]
    pub inserted_at: Option<DateTime<Utc>>,
}

/// One fetched batch of listings
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub number: u32,
    pub listings: Vec<Listing>,
}

/// Response body of the listing service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListingsPage {
    pub page_number: u32,
    pub total_pages: u32,
    pub listings: Vec<Listing>,
}

impl ListingsPage {
    /// Split the response into the cached page and its reported page count
    pub fn into_page(self) -> (Page, u32) {
        (
            Page {
                number: self.page_number,
                listings: self.listings,
            },
            self.total_pages,
        )
    }
}

/// Response body of the neighborhood service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeighborhoodsResponse {
    pub neighborhoods: Vec<String>,
}

/// Marker handed to the map collaborator
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapMarker {
    pub listing_id: u64,
    pub lat: f64,
    pub lng: f64,
}

impl From<&Listing> for MapMarker {
    fn from(listing: &Listing) -> Self {
        Self {
            listing_id: listing.id,
            lat: listing.address.lat,
            lng: listing.address.lng,
        }
    }
}
