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

//! File- and environment-backed configuration for the Pipedeck client.
//!
//! Layout: `model.rs` (typed client configuration), `defaults.rs` (built-in
//! values and the default mirror list), `loader.rs` (layered loading),
//! `validate.rs` (validation/normalization helpers), `error.rs`.

pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ENV_PREFIX, apply_env, load, load_from_path};
pub use model::{ClientConfig, LogFormatSetting};
pub use validate::{normalize_region, validate_config};
