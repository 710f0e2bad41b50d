//! Pokedex - PokeAPI catalog browser core
//!
//! This library holds the client-side data layer of the Pokedex browser:
//! a typed gateway over the public PokeAPI, the reactive catalog store
//! that the presentation layer subscribes to, and the per-record detail
//! aggregation.
//!
//! ## Architecture
//!
//! - **Gateway**: `PokemonGateway` trait + reqwest `HttpGateway`
//! - **Store**: `CatalogStore`, a watch-channel state container with
//!   pagination, type filter, search, favorites and theme
//! - **Detail**: record -> species -> evolution chain, all-or-nothing
//! - **Format / Evolution**: pure display helpers and tree flattening
//!
//! ## Usage
//!
//! ```bash
//! cargo run -- list --page 2 --type fire
//! ```

// Wire types and configuration
pub mod config;
pub mod types;

// Network access
pub mod gateway;

// Pure helpers (no I/O)
pub mod evolution;
pub mod filter;
pub mod format;

// Persisted favorites/theme (SQLite worker)
pub mod preferences;

// State container and its input helpers
pub mod debounce;
pub mod store;

// Single-record view assembly
pub mod detail;

// Re-export commonly used types
pub use config::{Command, Config};
pub use detail::{load_details, load_favorites, DetailError, PokemonDetails};
pub use gateway::{HttpGateway, PokemonGateway};
pub use preferences::{PersistedPreferences, Preferences};
pub use store::{CatalogState, CatalogStore};
pub use types::{Pokemon, PokemonKey, PokemonType};
