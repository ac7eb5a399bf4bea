#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]

//! Resilient multi-instance fetch layer for the Pipedeck front end.
//!
//! Layout:
//! - `registry.rs`: instance lists and immutable registry cursors
//! - `gateway.rs`: fetch-with-failover and typed operations
//! - `backend/`: HTTP and fixture implementations of the mirror API
//! - `debounce.rs`: last-call-wins input debouncing
//! - `query.rs`: search text eligibility and transport encoding
//! - `suggestions/`: suggestion state machine and search session runtime
//! - `trending.rs`: trending list loader with region tracking
//! - `watch.rs`: watch-page target parsing and stream metadata loading
//! - `router.rs`: navigation handoff types

pub mod backend;
pub mod debounce;
pub mod error;
pub mod gateway;
pub mod query;
pub mod registry;
pub mod router;
pub mod suggestions;
pub mod trending;
pub mod watch;

pub use backend::{Backend, FixtureBackend, HttpBackend, backend_from_config};
pub use debounce::Debouncer;
pub use error::{FetchError, FetchResult};
pub use gateway::{FetchGateway, fetch_with_failover};
pub use query::{MIN_QUERY_CHARS, Query, is_eligible};
pub use registry::{InstanceList, RegistryState};
pub use router::{Router, SearchRoute};
pub use suggestions::{SuggestionAction, SuggestionSession, SuggestionState};
pub use trending::{HighlightSink, TrendingLoader, TrendingState};
pub use watch::{StreamLoader, WatchTarget};

pub use pipedeck_models::{Instance, Stream, SuggestionsResponse, TrendingVideo};
