pub mod http;
pub mod memory;
pub mod traits;
pub mod types;

pub use http::HttpListingSource;
pub use memory::InMemoryListingSource;
pub use traits::ListingSource;
pub use types::ListingQuery;
