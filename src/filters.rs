//! Filter selections and the panel that is currently open.
//!
//! Every transition borrows the current state and returns a new one; the
//! browser swaps the whole value in after each edit.

use serde::{Deserialize, Serialize};

use crate::query;

/// One named filter control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Param {
    Price,
    Area,
    Rooms,
    Neighborhoods,
}

impl Param {
    pub const ALL: [Param; 4] = [Param::Price, Param::Area, Param::Rooms, Param::Neighborhoods];
}

/// Filter groups offered by the mobile filter bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MobileGroup {
    Price,
    Neighborhoods,
    /// Area and rooms, opened and closed together
    Other,
}

/// The filter panel that is open, if any.
///
/// A single value rather than one flag per param, so two unrelated panels can
/// never be open together. `AreaAndRooms` is the mobile "other" group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Panel {
    #[default]
    Closed,
    Price,
    Area,
    Rooms,
    Neighborhoods,
    AreaAndRooms,
}

impl Panel {
    pub fn shows(self, param: Param) -> bool {
        matches!(
            (self, param),
            (Panel::Price, Param::Price)
                | (Panel::Area, Param::Area)
                | (Panel::Rooms, Param::Rooms)
                | (Panel::Neighborhoods, Param::Neighborhoods)
                | (Panel::AreaAndRooms, Param::Area)
                | (Panel::AreaAndRooms, Param::Rooms)
        )
    }
}

impl From<Param> for Panel {
    fn from(param: Param) -> Self {
        match param {
            Param::Price => Panel::Price,
            Param::Area => Panel::Area,
            Param::Rooms => Panel::Rooms,
            Param::Neighborhoods => Panel::Neighborhoods,
        }
    }
}

impl From<MobileGroup> for Panel {
    fn from(group: MobileGroup) -> Self {
        match group {
            MobileGroup::Price => Panel::Price,
            MobileGroup::Neighborhoods => Panel::Neighborhoods,
            MobileGroup::Other => Panel::AreaAndRooms,
        }
    }
}

/// Optional lower and upper bound of a numeric filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Option<u64>,
    pub max: Option<u64>,
}

impl Bounds {
    pub fn new(min: Option<u64>, max: Option<u64>) -> Self {
        Self { min, max }
    }

    pub fn is_set(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }
}

/// New value for one param
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Price(Bounds),
    Area(Bounds),
    Rooms(Option<u32>),
    Neighborhoods(Vec<String>),
}

impl FilterValue {
    pub fn param(&self) -> Param {
        match self {
            FilterValue::Price(_) => Param::Price,
            FilterValue::Area(_) => Param::Area,
            FilterValue::Rooms(_) => Param::Rooms,
            FilterValue::Neighborhoods(_) => Param::Neighborhoods,
        }
    }
}

/// Value fields of the filter state, without any visibility
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterValues {
    pub price: Bounds,
    pub area: Bounds,
    pub rooms: Option<u32>,
    /// Selected neighborhoods in the order they were picked
    pub neighborhoods: Vec<String>,
}

impl FilterValues {
    pub fn is_active(&self, param: Param) -> bool {
        match param {
            Param::Price => self.price.is_set(),
            Param::Area => self.area.is_set(),
            Param::Rooms => self.rooms.is_some(),
            Param::Neighborhoods => !self.neighborhoods.is_empty(),
        }
    }

    pub fn active_count(&self) -> usize {
        Param::ALL.iter().filter(|p| self.is_active(**p)).count()
    }

    pub fn signature(&self) -> FilterSignature {
        let mut canonical = self.clone();
        canonical.neighborhoods.sort();
        FilterSignature(query::serialize(&canonical).unwrap_or_default())
    }

    fn with(&self, value: FilterValue) -> Self {
        let mut next = self.clone();
        match value {
            FilterValue::Price(bounds) => next.price = bounds,
            FilterValue::Area(bounds) => next.area = bounds,
            FilterValue::Rooms(rooms) => next.rooms = rooms,
            FilterValue::Neighborhoods(names) => next.neighborhoods = dedup_in_order(names),
        }
        next
    }
}

// Names are stored trimmed, matching what a parsed route yields.
fn dedup_in_order(names: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let name = name.trim();
        if !name.is_empty() && !seen.iter().any(|held| held == name) {
            seen.push(name.to_string());
        }
    }
    seen
}

/// Key identifying a combination of filter values.
///
/// Independent of the order in which fields were edited and of the order
/// neighborhoods were picked in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FilterSignature(String);

impl FilterSignature {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FilterSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            write!(f, "<unfiltered>")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    values: FilterValues,
    panel: Panel,
    mobile_open: bool,
}

impl FilterState {
    pub fn new(values: FilterValues) -> Self {
        Self {
            values,
            ..Self::default()
        }
    }

    pub fn values(&self) -> &FilterValues {
        &self.values
    }

    pub fn panel(&self) -> Panel {
        self.panel
    }

    pub fn is_visible(&self, param: Param) -> bool {
        self.panel.shows(param)
    }

    pub fn is_mobile_open(&self) -> bool {
        self.mobile_open
    }

    pub fn active_count(&self) -> usize {
        self.values.active_count()
    }

    pub fn signature(&self) -> FilterSignature {
        self.values.signature()
    }

    #[must_use]
    pub fn set_value(&self, value: FilterValue) -> Self {
        Self {
            values: self.values.with(value),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn clear_value(&self, param: Param) -> Self {
        let empty = match param {
            Param::Price => FilterValue::Price(Bounds::default()),
            Param::Area => FilterValue::Area(Bounds::default()),
            Param::Rooms => FilterValue::Rooms(None),
            Param::Neighborhoods => FilterValue::Neighborhoods(Vec::new()),
        };
        self.set_value(empty)
    }

    /// Add a neighborhood to the selection, or drop it if already picked
    #[must_use]
    pub fn toggle_neighborhood(&self, name: &str) -> Self {
        let name = name.trim();
        let mut names = self.values.neighborhoods.clone();
        match names.iter().position(|n| n == name) {
            Some(idx) => {
                names.remove(idx);
            }
            None => names.push(name.to_string()),
        }
        self.set_value(FilterValue::Neighborhoods(names))
    }

    /// Close every panel, then open `param` if it was closed before
    #[must_use]
    pub fn toggle_visibility(&self, param: Param) -> Self {
        let was_open = self.panel.shows(param);
        Self {
            values: self.values.clone(),
            panel: if was_open { Panel::Closed } else { param.into() },
            mobile_open: false,
        }
    }

    #[must_use]
    pub fn toggle_mobile_group(&self, group: MobileGroup) -> Self {
        let target = Panel::from(group);
        let was_open = self.panel == target;
        Self {
            values: self.values.clone(),
            panel: if was_open { Panel::Closed } else { target },
            mobile_open: !was_open,
        }
    }

    #[must_use]
    pub fn reset_all(&self) -> Self {
        Self::default()
    }
}
