// ── Filter state container ──
//
// Holds the current filter selection for the list views and notifies an
// optional listener after every transition. Selecting a facility always
// clears the zone in the same transition: a listener can never observe a
// new facility paired with a stale zone.

use std::fmt;

use parkwatch_api::ListQuery;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// One filter field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum FilterKey {
    Facility,
    Zone,
    Status,
    Severity,
    Acknowledged,
    Search,
    SortBy,
    Order,
}

/// Current filter selection. Every field is free text; empty means unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default)]
    pub facility: String,
    #[serde(default)]
    pub zone: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub acknowledged: String,
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub sort_by: String,
    #[serde(default)]
    pub order: String,
}

impl FilterState {
    pub fn get(&self, key: FilterKey) -> &str {
        match key {
            FilterKey::Facility => &self.facility,
            FilterKey::Zone => &self.zone,
            FilterKey::Status => &self.status,
            FilterKey::Severity => &self.severity,
            FilterKey::Acknowledged => &self.acknowledged,
            FilterKey::Search => &self.search,
            FilterKey::SortBy => &self.sort_by,
            FilterKey::Order => &self.order,
        }
    }

    fn field_mut(&mut self, key: FilterKey) -> &mut String {
        match key {
            FilterKey::Facility => &mut self.facility,
            FilterKey::Zone => &mut self.zone,
            FilterKey::Status => &mut self.status,
            FilterKey::Severity => &mut self.severity,
            FilterKey::Acknowledged => &mut self.acknowledged,
            FilterKey::Search => &mut self.search,
            FilterKey::SortBy => &mut self.sort_by,
            FilterKey::Order => &mut self.order,
        }
    }

    /// Number of non-empty fields. Seeded defaults count too.
    pub fn active_count(&self) -> usize {
        FilterKey::iter().filter(|k| !self.get(*k).is_empty()).count()
    }

    /// Request parameters for the list endpoints.
    pub fn to_query(&self) -> ListQuery {
        FilterKey::iter().fold(ListQuery::new(), |q, key| {
            q.set(&key.to_string(), self.get(key))
        })
    }
}

type Listener = Box<dyn FnMut(&FilterState) + Send>;

/// Owner of a [`FilterState`] plus the construction-time defaults.
pub struct FilterStore {
    initial: FilterState,
    current: FilterState,
    listener: Option<Listener>,
}

impl fmt::Debug for FilterStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterStore")
            .field("initial", &self.initial)
            .field("current", &self.current)
            .field("listener", &self.listener.is_some())
            .finish()
    }
}

impl Default for FilterStore {
    fn default() -> Self {
        Self::new(FilterState::default())
    }
}

impl FilterStore {
    /// `initial` is both the starting state and what [`reset`](Self::reset)
    /// restores.
    pub fn new(initial: FilterState) -> Self {
        Self {
            current: initial.clone(),
            initial,
            listener: None,
        }
    }

    /// Register the change listener, replacing any previous one.
    pub fn on_change(&mut self, listener: impl FnMut(&FilterState) + Send + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn current(&self) -> &FilterState {
        &self.current
    }

    pub fn initial(&self) -> &FilterState {
        &self.initial
    }

    /// Set one field. Setting the facility also clears the zone.
    pub fn update(&mut self, key: FilterKey, value: impl Into<String>) {
        *self.current.field_mut(key) = value.into();
        if key == FilterKey::Facility {
            self.current.zone.clear();
        }
        self.notify();
    }

    /// Restore the construction-time filter.
    pub fn reset(&mut self) {
        self.current = self.initial.clone();
        self.notify();
    }

    pub fn active_count(&self) -> usize {
        self.current.active_count()
    }

    pub fn to_query(&self) -> ListQuery {
        self.current.to_query()
    }

    fn notify(&mut self) {
        if let Some(listener) = self.listener.as_mut() {
            listener(&self.current);
        }
    }
}
