//! Shared filter state driving cross-chart filtering
//!
//! Three independent dimensions (country, year, language), each set by a
//! chart interaction and cleared by its filter chip. Mutation goes through
//! a reducer so every view sees a consistent immutable snapshot. No
//! cross-dimension validation happens here; an inconsistent combination
//! simply yields empty derived datasets downstream.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::events::{events::FilterChanged, EventBus};

/// The (country, year, language) selection tuple.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub country: Option<String>,
    pub year: Option<i32>,
    pub language: Option<String>,
}

impl FilterState {
    pub fn is_empty(&self) -> bool {
        self.country.is_none() && self.year.is_none() && self.language.is_none()
    }
}

/// A single filter mutation. Each action touches exactly one dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterAction {
    SelectCountry(String),
    SelectYear(i32),
    SelectLanguage(String),
    ClearCountry,
    ClearYear,
    ClearLanguage,
    ClearAll,
}

/// Pure reducer: applies one action to a snapshot, returning the next state.
pub fn reduce(state: &FilterState, action: &FilterAction) -> FilterState {
    let mut next = state.clone();
    match action {
        FilterAction::SelectCountry(country) => next.country = Some(country.clone()),
        FilterAction::SelectYear(year) => next.year = Some(*year),
        FilterAction::SelectLanguage(language) => next.language = Some(language.clone()),
        FilterAction::ClearCountry => next.country = None,
        FilterAction::ClearYear => next.year = None,
        FilterAction::ClearLanguage => next.language = None,
        FilterAction::ClearAll => next = FilterState::default(),
    }
    next
}

/// Owns the current filter state and hands out snapshots.
///
/// Mutated only from the UI thread; the lock exists so views holding an
/// `Arc<FilterStore>` can read without threading mutable references through
/// the whole view tree.
pub struct FilterStore {
    state: RwLock<FilterState>,
    event_bus: Arc<EventBus>,
}

impl FilterStore {
    pub fn new(event_bus: Arc<EventBus>) -> Self {
        Self {
            state: RwLock::new(FilterState::default()),
            event_bus,
        }
    }

    /// Current state, cloned. Cheap: three small options.
    pub fn snapshot(&self) -> FilterState {
        self.state.read().clone()
    }

    /// Apply an action through the reducer and publish the change.
    pub fn dispatch(&self, action: FilterAction) {
        let next = {
            let mut state = self.state.write();
            let next = reduce(&state, &action);
            if next == *state {
                return;
            }
            *state = next.clone();
            next
        };
        tracing::debug!("filter changed via {:?}: {:?}", action, next);
        self.event_bus.publish(FilterChanged { filters: next });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reducer_sets_and_clears_each_dimension() {
        let empty = FilterState::default();

        let with_country = reduce(&empty, &FilterAction::SelectCountry("France".into()));
        assert_eq!(with_country.country.as_deref(), Some("France"));
        assert_eq!(with_country.year, None);
        assert_eq!(with_country.language, None);

        let with_year = reduce(&with_country, &FilterAction::SelectYear(2020));
        assert_eq!(with_year.year, Some(2020));
        assert_eq!(with_year.country.as_deref(), Some("France"));

        let with_lang = reduce(&with_year, &FilterAction::SelectLanguage("Go".into()));
        assert_eq!(with_lang.language.as_deref(), Some("Go"));

        // Clearing one dimension leaves the others untouched.
        let cleared_year = reduce(&with_lang, &FilterAction::ClearYear);
        assert_eq!(cleared_year.year, None);
        assert_eq!(cleared_year.country.as_deref(), Some("France"));
        assert_eq!(cleared_year.language.as_deref(), Some("Go"));
    }

    #[test]
    fn all_eight_combinations_reachable() {
        let actions = [
            FilterAction::SelectCountry("X".into()),
            FilterAction::SelectYear(2021),
            FilterAction::SelectLanguage("Rust".into()),
        ];
        // Apply every subset of the three select actions.
        for mask in 0..8u8 {
            let mut state = FilterState::default();
            for (i, action) in actions.iter().enumerate() {
                if mask & (1 << i) != 0 {
                    state = reduce(&state, action);
                }
            }
            assert_eq!(state.country.is_some(), mask & 1 != 0);
            assert_eq!(state.year.is_some(), mask & 2 != 0);
            assert_eq!(state.language.is_some(), mask & 4 != 0);
        }
    }

    #[test]
    fn clear_all_resets_every_dimension() {
        let mut state = FilterState::default();
        state = reduce(&state, &FilterAction::SelectCountry("X".into()));
        state = reduce(&state, &FilterAction::SelectYear(2021));
        state = reduce(&state, &FilterAction::SelectLanguage("Rust".into()));
        assert!(reduce(&state, &FilterAction::ClearAll).is_empty());
    }

    #[test]
    fn select_overwrites_existing_value() {
        let state = reduce(
            &FilterState::default(),
            &FilterAction::SelectLanguage("Go".into()),
        );
        let state = reduce(&state, &FilterAction::SelectLanguage("Rust".into()));
        assert_eq!(state.language.as_deref(), Some("Rust"));
    }

    #[test]
    fn store_dispatch_updates_snapshot() {
        let store = FilterStore::new(Arc::new(EventBus::new()));
        assert!(store.snapshot().is_empty());

        store.dispatch(FilterAction::SelectCountry("Japan".into()));
        assert_eq!(store.snapshot().country.as_deref(), Some("Japan"));

        store.dispatch(FilterAction::ClearCountry);
        assert!(store.snapshot().is_empty());
    }
}
