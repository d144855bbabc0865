//! Canonical query string for a set of filter values, and its parser.

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::error::{BrowserError, Result};
use crate::filters::{Bounds, FilterValues};

pub const PRICE_MIN: &str = "preco_minimo";
pub const PRICE_MAX: &str = "preco_maximo";
pub const AREA_MIN: &str = "area_minima";
pub const AREA_MAX: &str = "area_maxima";
pub const ROOMS: &str = "quartos";
pub const NEIGHBORHOODS: &str = "bairros";
pub const PAGE: &str = "page";

pub const NEIGHBORHOOD_DELIMITER: &str = "|";

/// Ordered `(key, value)` pairs for the active filters.
///
/// Order is always price, area, rooms, neighborhoods.
pub fn query_pairs(values: &FilterValues) -> Vec<(&'static str, String)> {
    let mut pairs = Vec::new();
    push_bounds(&mut pairs, &values.price, PRICE_MIN, PRICE_MAX);
    push_bounds(&mut pairs, &values.area, AREA_MIN, AREA_MAX);
    if let Some(rooms) = values.rooms {
        pairs.push((ROOMS, rooms.to_string()));
    }
    if !values.neighborhoods.is_empty() {
        pairs.push((NEIGHBORHOODS, values.neighborhoods.join(NEIGHBORHOOD_DELIMITER)));
    }
    pairs
}

fn push_bounds(
    pairs: &mut Vec<(&'static str, String)>,
    bounds: &Bounds,
    min_key: &'static str,
    max_key: &'static str,
) {
    if let Some(min) = bounds.min {
        pairs.push((min_key, min.to_string()));
    }
    if let Some(max) = bounds.max {
        pairs.push((max_key, max.to_string()));
    }
}

/// Canonical query string, or `None` when no filter is active
pub fn serialize(values: &FilterValues) -> Option<String> {
    let pairs = query_pairs(values);
    if pairs.is_empty() {
        return None;
    }
    Some(encode_pairs(&pairs))
}

fn encode_pairs(pairs: &[(&'static str, String)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{}={}", key, encode_value(key, value)))
        .collect::<Vec<_>>()
        .join("&")
}

// The neighborhood delimiter stays literal; each name is encoded on its own.
fn encode_value(key: &str, value: &str) -> String {
    if key == NEIGHBORHOODS {
        value
            .split(NEIGHBORHOOD_DELIMITER)
            .map(|name| form_urlencoded::byte_serialize(name.as_bytes()).collect::<String>())
            .collect::<Vec<_>>()
            .join(NEIGHBORHOOD_DELIMITER)
    } else {
        form_urlencoded::byte_serialize(value.as_bytes()).collect()
    }
}

/// Filter values and page number read back from a route query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteQuery {
    pub values: FilterValues,
    pub page: Option<u32>,
}

/// Parse a route query such as `?quartos=3&bairros=Leblon|Urca&page=2`.
///
/// Unknown keys and empty values are ignored.
pub fn parse(query: &str) -> Result<RouteQuery> {
    let query = query.trim_start_matches('?');
    let mut parsed = RouteQuery::default();

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match &*key {
            PRICE_MIN => parsed.values.price.min = Some(number(PRICE_MIN, value)?),
            PRICE_MAX => parsed.values.price.max = Some(number(PRICE_MAX, value)?),
            AREA_MIN => parsed.values.area.min = Some(number(AREA_MIN, value)?),
            AREA_MAX => parsed.values.area.max = Some(number(AREA_MAX, value)?),
            ROOMS => parsed.values.rooms = Some(number(ROOMS, value)?),
            NEIGHBORHOODS => {
                for name in value.split(NEIGHBORHOOD_DELIMITER) {
                    let name = name.trim();
                    if !name.is_empty() && !parsed.values.neighborhoods.iter().any(|n| n == name) {
                        parsed.values.neighborhoods.push(name.to_string());
                    }
                }
            }
            PAGE => {
                let page: u32 = number(PAGE, value)?;
                if page == 0 {
                    return Err(invalid(PAGE, value));
                }
                parsed.page = Some(page);
            }
            _ => {}
        }
    }

    Ok(parsed)
}

fn number<T: std::str::FromStr>(param: &'static str, value: &str) -> Result<T> {
    value.parse().map_err(|_| invalid(param, value))
}

fn invalid(param: &'static str, value: &str) -> BrowserError {
    BrowserError::Validation {
        param,
        value: value.to_string(),
    }
}

/// Internal page path paired with the public path it is displayed under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutePair {
    pub page_path: String,
    pub display_path: String,
}

impl Default for RoutePair {
    fn default() -> Self {
        Self {
            page_path: "/listings".to_string(),
            display_path: "/imoveis".to_string(),
        }
    }
}

/// Where the browser asks the router to go; navigation itself happens elsewhere
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationIntent {
    pub page_path: String,
    pub display_path: String,
    pub query: Option<String>,
}

impl NavigationIntent {
    /// Public URL: the display path, query-qualified when filters are active
    pub fn href(&self) -> String {
        match &self.query {
            Some(query) => format!("{}?{}", self.display_path, query),
            None => self.display_path.clone(),
        }
    }
}

pub fn route(routes: &RoutePair, values: &FilterValues) -> NavigationIntent {
    NavigationIntent {
        page_path: routes.page_path.clone(),
        display_path: routes.display_path.clone(),
        query: serialize(values),
    }
}

/// Route of a specific result page, as linked from a pagination sentinel
pub fn page_route(routes: &RoutePair, values: &FilterValues, page: u32) -> NavigationIntent {
    let mut pairs = query_pairs(values);
    pairs.push((PAGE, page.to_string()));
    NavigationIntent {
        page_path: routes.page_path.clone(),
        display_path: routes.display_path.clone(),
        query: Some(encode_pairs(&pairs)),
    }
}
