//! Typed access to the PokeAPI.
//!
//! No caching and no retries: every call is exactly one GET (or, for
//! [`PokemonGateway::search`], one list scan plus one GET per match) and any
//! transport or decode failure goes straight back to the caller.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use futures::future::try_join_all;
use serde::de::DeserializeOwned;

use crate::types::{EvolutionChain, Pokemon, PokemonKey, PokemonListResponse, PokemonSpecies};

pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2";

/// Number of list entries scanned by [`PokemonGateway::search`].
pub const SEARCH_SCAN_LIMIT: u32 = 1000;
/// Maximum number of matches resolved to full records by a search.
pub const SEARCH_RESULT_LIMIT: usize = 10;

#[async_trait]
pub trait PokemonGateway: Send + Sync {
    /// `GET {base}/pokemon?offset=&limit=`
    async fn list(&self, offset: u32, limit: u32) -> Result<PokemonListResponse>;
    /// `GET {base}/pokemon/{key}`
    async fn pokemon(&self, key: &PokemonKey) -> Result<Pokemon>;
    /// `GET {base}/pokemon-species/{key}`
    async fn species(&self, key: &PokemonKey) -> Result<PokemonSpecies>;
    /// `GET {url}` where `url` is the absolute chain URL from a species record.
    async fn evolution_chain(&self, url: &str) -> Result<EvolutionChain>;

    /// Case-insensitive substring search over the first
    /// [`SEARCH_SCAN_LIMIT`] names, resolving at most [`SEARCH_RESULT_LIMIT`]
    /// matches concurrently. Fails if any single detail fetch fails.
    async fn search(&self, query: &str) -> Result<Vec<Pokemon>> {
        let all = self.list(0, SEARCH_SCAN_LIMIT).await?;
        let keys: Vec<PokemonKey> = all
            .results
            .into_iter()
            .filter(|entry| crate::filter::name_matches(&entry.name, query))
            .take(SEARCH_RESULT_LIMIT)
            .map(|entry| PokemonKey::Name(entry.name))
            .collect();

        log::debug!("[gateway] search '{}' matched {} names", query, keys.len());

        try_join_all(keys.iter().map(|key| self.pokemon(key))).await
    }
}

/// reqwest-backed gateway against a fixed base URL.
#[derive(Clone)]
pub struct HttpGateway {
    base_url: String,
    client: reqwest::Client,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(8)
            .tcp_nodelay(true)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn list_url(&self, offset: u32, limit: u32) -> String {
        format!("{}/pokemon?offset={}&limit={}", self.base_url, offset, limit)
    }

    fn pokemon_url(&self, key: &PokemonKey) -> String {
        format!(
            "{}/pokemon/{}",
            self.base_url,
            urlencoding::encode(&key.normalized())
        )
    }

    fn species_url(&self, key: &PokemonKey) -> String {
        format!(
            "{}/pokemon-species/{}",
            self.base_url,
            urlencoding::encode(&key.normalized())
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        log::debug!("[gateway] GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to fetch from PokeAPI: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(anyhow!("PokeAPI error ({}) for {}", status, url));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| anyhow!("Failed to parse PokeAPI response from {}: {}", url, e))
    }
}

#[async_trait]
impl PokemonGateway for HttpGateway {
    async fn list(&self, offset: u32, limit: u32) -> Result<PokemonListResponse> {
        let url = self.list_url(offset, limit);
        let page: PokemonListResponse = self.get_json(&url).await.map_err(|e| {
            log::error!("[gateway] Error fetching Pokemon list: {e:#}");
            e
        })?;
        log::info!(
            "[gateway] Listed {} entries at offset {} (total {})",
            page.results.len(),
            offset,
            page.count
        );
        Ok(page)
    }

    async fn pokemon(&self, key: &PokemonKey) -> Result<Pokemon> {
        self.get_json(&self.pokemon_url(key)).await.map_err(|e| {
            log::error!("[gateway] Error fetching Pokemon {key}: {e:#}");
            e
        })
    }

    async fn species(&self, key: &PokemonKey) -> Result<PokemonSpecies> {
        self.get_json(&self.species_url(key)).await.map_err(|e| {
            log::error!("[gateway] Error fetching Pokemon species {key}: {e:#}");
            e
        })
    }

    async fn evolution_chain(&self, url: &str) -> Result<EvolutionChain> {
        self.get_json(url).await.map_err(|e| {
            log::error!("[gateway] Error fetching evolution chain: {e:#}");
            e
        })
    }
}
