//! Suggestion state and its reducer.

use crate::query::is_eligible;

/// Observable state of one search box.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SuggestionState {
    /// Text currently in the search box.
    pub search_value: String,
    /// Suggestions shown for the last successful query.
    pub suggestions: Vec<String>,
    /// A suggestion query is in flight.
    pub fetching: bool,
    /// The suggestion panel is open.
    pub open: bool,
    /// The current value has been submitted as a search.
    pub submitted: bool,
}

/// Named mutations of [`SuggestionState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionAction {
    /// Replace the search box text.
    SetSearchValue(String),
    /// Replace the suggestion list.
    SetSuggestions(Vec<String>),
    /// Mark a query as in flight or settled.
    SetFetching(bool),
    /// Open or close the suggestion panel.
    SetOpen(bool),
    /// Mark the current value as submitted or editable.
    SetSubmitted(bool),
}

impl SuggestionState {
    /// Apply `action` and return the resulting state.
    #[must_use]
    pub fn reduce(mut self, action: SuggestionAction) -> Self {
        self.apply(action);
        self
    }

    /// Apply `action` in place.
    pub fn apply(&mut self, action: SuggestionAction) {
        match action {
            SuggestionAction::SetSearchValue(value) => self.search_value = value,
            SuggestionAction::SetSuggestions(list) => self.suggestions = list,
            SuggestionAction::SetFetching(fetching) => self.fetching = fetching,
            SuggestionAction::SetOpen(open) => self.open = open,
            SuggestionAction::SetSubmitted(submitted) => self.submitted = submitted,
        }
    }

    /// Whether the panel should render: open, not submitted, and holding at
    /// least one suggestion.
    #[must_use]
    pub fn panel_visible(&self) -> bool {
        self.open && !self.submitted && !self.suggestions.is_empty()
    }

    /// Whether the current value may be submitted.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        is_eligible(&self.search_value)
    }
}
