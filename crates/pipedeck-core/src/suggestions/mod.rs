//! Search-box suggestions: a pure state reducer and the session that drives
//! it from keystrokes, debounced queries, and submissions.

mod session;
mod state;

pub use session::SuggestionSession;
pub use state::{SuggestionAction, SuggestionState};
