//! Catalog state container.
//!
//! All state lives behind a [`watch`] channel: every action applies its
//! whole update inside one `send_modify`, so subscribers only ever see
//! complete transitions. Actions never return list/search failures; they
//! record a user-facing message in [`CatalogState::error`] instead.
//!
//! Overlapping `fetch_page` (or `search`) calls are resolved by generation
//! tokens per action kind: only the most recently dispatched call of a kind
//! may write its result, older responses are dropped on arrival.

use anyhow::{anyhow, Result};
use futures::future::try_join_all;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

use crate::filter;
use crate::gateway::PokemonGateway;
use crate::preferences::{PersistedPreferences, Preferences};
use crate::types::{Pokemon, PokemonKey, PokemonType};

pub const PAGE_SIZE: u32 = 20;

pub const LIST_ERROR: &str = "Failed to fetch Pokemon list";
pub const SEARCH_ERROR: &str = "Failed to search Pokemon";

/// Snapshot of everything the presentation layer reads.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogState {
    pub pokemon_list: Vec<Pokemon>,
    /// Type-filtered subset of `pokemon_list`, or search results while a
    /// search is active.
    pub filtered: Vec<Pokemon>,
    pub favorites: BTreeSet<u32>,
    pub loading: bool,
    pub error: Option<String>,
    pub current_page: u32,
    pub total_pages: u32,
    pub selected_type: Option<PokemonType>,
    pub search_query: String,
    pub dark_mode: bool,
}

impl Default for CatalogState {
    fn default() -> Self {
        Self {
            pokemon_list: Vec::new(),
            filtered: Vec::new(),
            favorites: BTreeSet::new(),
            loading: false,
            error: None,
            current_page: 1,
            total_pages: 0,
            selected_type: None,
            search_query: String::new(),
            dark_mode: false,
        }
    }
}

impl CatalogState {
    /// Fresh state with only the persisted fields carried over.
    pub fn restored(prefs: PersistedPreferences) -> Self {
        Self {
            favorites: prefs.favorites,
            dark_mode: prefs.dark_mode,
            ..Self::default()
        }
    }

    pub fn persisted(&self) -> PersistedPreferences {
        PersistedPreferences {
            favorites: self.favorites.clone(),
            dark_mode: self.dark_mode,
        }
    }

    pub fn is_favorite(&self, id: u32) -> bool {
        self.favorites.contains(&id)
    }

    /// Target of the Next control; `None` on the last known page.
    pub fn next_page(&self) -> Option<u32> {
        if self.total_pages != 0 && self.current_page >= self.total_pages {
            return None;
        }
        self.current_page.checked_add(1)
    }

    /// Target of the Previous control; `None` on the first page.
    pub fn prev_page(&self) -> Option<u32> {
        (self.current_page > 1).then(|| self.current_page - 1)
    }
}

pub fn details_error(key: &PokemonKey) -> String {
    format!("Failed to fetch details for Pokemon {key}")
}

pub struct CatalogStore {
    gateway: Arc<dyn PokemonGateway>,
    preferences: Preferences,
    state: watch::Sender<CatalogState>,
    page_generation: AtomicU64,
    search_generation: AtomicU64,
}

impl CatalogStore {
    /// Build the store, merging persisted favorites/theme into defaults.
    pub async fn open(gateway: Arc<dyn PokemonGateway>, preferences: Preferences) -> Self {
        let persisted = preferences.load().await.unwrap_or_default();
        log::info!(
            "[store] Restored {} favorites, dark mode {}",
            persisted.favorites.len(),
            persisted.dark_mode
        );
        let (state, _) = watch::channel(CatalogState::restored(persisted));

        Self {
            gateway,
            preferences,
            state,
            page_generation: AtomicU64::new(0),
            search_generation: AtomicU64::new(0),
        }
    }

    pub fn gateway(&self) -> &Arc<dyn PokemonGateway> {
        &self.gateway
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn subscribe(&self) -> watch::Receiver<CatalogState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> CatalogState {
        self.state.borrow().clone()
    }

    pub fn search_query(&self) -> String {
        self.state.borrow().search_query.clone()
    }

    pub fn is_favorite(&self, id: u32) -> bool {
        self.state.borrow().is_favorite(id)
    }

    pub fn favorites(&self) -> BTreeSet<u32> {
        self.state.borrow().favorites.clone()
    }

    /// Load page `page` (1-based) and resolve every entry to a full record.
    /// Any single failure fails the whole page and keeps the previous list.
    pub async fn fetch_page(&self, page: u32) {
        let page = page.max(1);
        let generation = self.page_generation.fetch_add(1, Ordering::SeqCst) + 1;

        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });

        let result = self.load_page(page).await;
        if let Err(e) = &result {
            log::error!("[store] Error in fetch_page({page}): {e:#}");
        }

        self.state.send_if_modified(|s| {
            if self.page_generation.load(Ordering::SeqCst) != generation {
                log::debug!("[store] Discarding stale page {page} response");
                return false;
            }
            match result {
                Ok((list, count)) => {
                    s.filtered = list.clone();
                    s.pokemon_list = list;
                    s.current_page = page;
                    s.total_pages = count.div_ceil(PAGE_SIZE);
                    s.loading = false;
                }
                Err(_) => {
                    s.error = Some(LIST_ERROR.to_string());
                    s.loading = false;
                }
            }
            true
        });
    }

    async fn load_page(&self, page: u32) -> Result<(Vec<Pokemon>, u32)> {
        let offset = (page - 1)
            .checked_mul(PAGE_SIZE)
            .ok_or_else(|| anyhow!("page {page} is out of range"))?;
        let listing = self.gateway.list(offset, PAGE_SIZE).await?;

        let keys: Vec<PokemonKey> = listing
            .results
            .into_iter()
            .map(|entry| PokemonKey::Name(entry.name))
            .collect();
        let details = try_join_all(keys.iter().map(|key| self.gateway.pokemon(key))).await?;

        Ok((details, listing.count))
    }

    /// Single record lookup. Records the details error string and still
    /// hands the failure back to the caller.
    pub async fn fetch_details(&self, key: impl Into<PokemonKey>) -> Result<Pokemon> {
        let key = key.into();
        match self.gateway.pokemon(&key).await {
            Ok(pokemon) => Ok(pokemon),
            Err(e) => {
                log::error!("[store] Error in fetch_details({key}): {e:#}");
                let message = details_error(&key);
                self.state.send_modify(|s| s.error = Some(message));
                Err(e)
            }
        }
    }

    /// Project the held list by type. Never touches the network.
    pub fn filter_by_type(&self, ty: Option<PokemonType>) {
        self.state.send_modify(|s| {
            s.filtered = filter::by_type(&s.pokemon_list, ty);
            s.selected_type = ty;
        });
    }

    /// Blank queries restore the held list without a network call; anything
    /// else replaces the projection with up to 10 gateway matches.
    pub async fn search(&self, query: &str) {
        let generation = self.search_generation.fetch_add(1, Ordering::SeqCst) + 1;

        if filter::is_blank(query) {
            self.state.send_modify(|s| {
                s.search_query = query.to_string();
                s.error = None;
                s.filtered = s.pokemon_list.clone();
                s.loading = false;
            });
            return;
        }

        self.state.send_modify(|s| {
            s.loading = true;
            s.search_query = query.to_string();
            s.error = None;
        });

        let result = self.gateway.search(query).await;
        if let Err(e) = &result {
            log::error!("[store] Error in search('{query}'): {e:#}");
        }

        self.state.send_if_modified(|s| {
            if self.search_generation.load(Ordering::SeqCst) != generation {
                log::debug!("[store] Discarding stale search response for '{query}'");
                return false;
            }
            match result {
                Ok(results) => s.filtered = results,
                Err(_) => s.error = Some(SEARCH_ERROR.to_string()),
            }
            s.loading = false;
            true
        });
    }

    /// Flip membership of `id`; returns whether it is now a favorite.
    pub fn toggle_favorite(&self, id: u32) -> bool {
        let mut now_favorite = false;
        self.state.send_modify(|s| {
            now_favorite = s.favorites.insert(id);
            if !now_favorite {
                s.favorites.remove(&id);
            }
            self.preferences.save(s.persisted());
        });
        now_favorite
    }

    /// Returns the new dark mode flag.
    pub fn toggle_dark_mode(&self) -> bool {
        let mut dark = false;
        self.state.send_modify(|s| {
            s.dark_mode = !s.dark_mode;
            dark = s.dark_mode;
            self.preferences.save(s.persisted());
        });
        dark
    }

    /// Forget favorites and theme, both in memory and on disk.
    pub async fn clear_preferences(&self) {
        self.state.send_modify(|s| {
            s.favorites.clear();
            s.dark_mode = false;
        });
        self.preferences.clear().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(current_page: u32, total_pages: u32) -> CatalogState {
        CatalogState {
            current_page,
            total_pages,
            ..CatalogState::default()
        }
    }

    #[test]
    fn next_page_stops_at_last_page() {
        assert_eq!(at(1, 66).next_page(), Some(2));
        assert_eq!(at(65, 66).next_page(), Some(66));
        assert_eq!(at(66, 66).next_page(), None);
        // nothing loaded yet
        assert_eq!(at(1, 0).next_page(), Some(2));
        assert_eq!(at(u32::MAX, 0).next_page(), None);
    }

    #[test]
    fn prev_page_stops_at_first_page() {
        assert_eq!(at(1, 3).prev_page(), None);
        assert_eq!(at(3, 3).prev_page(), Some(2));
    }
}
