//! Shared test fixtures: an in-memory PokeAPI stand-in.

#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pokedex::gateway::PokemonGateway;
use pokedex::preferences::Preferences;
use pokedex::store::CatalogStore;
use pokedex::types::{
    ApiResource, ChainLink, EvolutionChain, EvolutionDetail, NamedResource, Pokemon,
    PokemonKey, PokemonListResponse, PokemonSpecies, PokemonTypeSlot,
};

pub const BASE: &str = "https://pokeapi.test/api/v2";

pub fn resource(kind: &str, name: &str, id: u32) -> NamedResource {
    NamedResource {
        name: name.to_string(),
        url: format!("{BASE}/{kind}/{id}/"),
    }
}

pub fn mon(id: u32, name: &str, types: &[&str]) -> Pokemon {
    Pokemon {
        id,
        name: name.to_string(),
        height: 10,
        weight: 100,
        types: types
            .iter()
            .enumerate()
            .map(|(i, t)| PokemonTypeSlot {
                slot: i as u8 + 1,
                kind: resource("type", t, 1),
            })
            .collect(),
        stats: vec![],
        abilities: vec![],
        sprites: Default::default(),
    }
}

/// Named starters first, then generic filler up to `size` entries.
pub fn catalog(size: u32) -> Vec<Pokemon> {
    let named: [(&str, &[&str]); 9] = [
        ("bulbasaur", &["grass", "poison"]),
        ("ivysaur", &["grass", "poison"]),
        ("venusaur", &["grass", "poison"]),
        ("charmander", &["fire"]),
        ("charmeleon", &["fire"]),
        ("charizard", &["fire", "flying"]),
        ("squirtle", &["water"]),
        ("wartortle", &["water"]),
        ("blastoise", &["water"]),
    ];

    (1..=size)
        .map(|id| match named.get(id as usize - 1) {
            Some((name, types)) => mon(id, name, types),
            None => mon(id, &format!("filler-{id}"), &["normal"]),
        })
        .collect()
}

pub fn species(id: u32, name: &str, chain_id: Option<u32>) -> PokemonSpecies {
    PokemonSpecies {
        id,
        name: name.to_string(),
        flavor_text_entries: vec![],
        is_legendary: false,
        is_mythical: false,
        habitat: None,
        generation: resource("generation", "generation-i", 1),
        evolution_chain: chain_id.map(|c| ApiResource {
            url: format!("{BASE}/evolution-chain/{c}/"),
        }),
    }
}

pub fn chain_node(name: &str, id: u32, min_level: Option<u32>, children: Vec<ChainLink>) -> ChainLink {
    ChainLink {
        species: resource("pokemon-species", name, id),
        evolution_details: min_level
            .map(|lvl| {
                vec![EvolutionDetail {
                    min_level: Some(lvl),
                    item: None,
                    trigger: resource("evolution-trigger", "level-up", 1),
                }]
            })
            .unwrap_or_default(),
        evolves_to: children,
        is_baby: false,
    }
}

#[derive(Default)]
pub struct MockGateway {
    pub records: Vec<Pokemon>,
    pub species: HashMap<String, PokemonSpecies>,
    pub chains: HashMap<String, EvolutionChain>,
    /// Overrides the `count` reported by `list`.
    pub remote_count: Option<u32>,

    failing: Mutex<HashSet<String>>,
    fail_list: Mutex<bool>,
    list_delays: Mutex<HashMap<u32, Duration>>,
    pokemon_delays: Mutex<HashMap<String, Duration>>,

    pub list_calls: AtomicUsize,
    pub pokemon_calls: AtomicUsize,
    pub species_calls: AtomicUsize,
    pub chain_calls: AtomicUsize,
}

impl MockGateway {
    pub fn new(records: Vec<Pokemon>) -> Self {
        Self {
            records,
            ..Default::default()
        }
    }

    pub fn with_species(mut self, species: PokemonSpecies) -> Self {
        self.species.insert(species.name.clone(), species);
        self
    }

    pub fn with_chain(mut self, chain: EvolutionChain) -> Self {
        self.chains
            .insert(format!("{BASE}/evolution-chain/{}/", chain.id), chain);
        self
    }

    /// Make `/pokemon/{key}` (and species lookups for it) fail.
    pub fn fail_key(&self, key: &str) {
        self.failing.lock().unwrap().insert(key.to_lowercase());
    }

    pub fn heal_key(&self, key: &str) {
        self.failing.lock().unwrap().remove(&key.to_lowercase());
    }

    pub fn fail_list(&self, fail: bool) {
        *self.fail_list.lock().unwrap() = fail;
    }

    pub fn delay_list(&self, offset: u32, delay: Duration) {
        self.list_delays.lock().unwrap().insert(offset, delay);
    }

    pub fn delay_pokemon(&self, name: &str, delay: Duration) {
        self.pokemon_delays
            .lock()
            .unwrap()
            .insert(name.to_string(), delay);
    }

    pub fn calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
            + self.pokemon_calls.load(Ordering::SeqCst)
            + self.species_calls.load(Ordering::SeqCst)
            + self.chain_calls.load(Ordering::SeqCst)
    }

    fn find(&self, key: &PokemonKey) -> Option<&Pokemon> {
        let wanted = key.normalized();
        self.records
            .iter()
            .find(|p| p.name == wanted || p.id.to_string() == wanted)
    }

    fn is_failing(&self, key: &PokemonKey) -> bool {
        let failing = self.failing.lock().unwrap();
        if failing.contains(&key.normalized()) {
            return true;
        }
        // Failing by name also fails lookups by id, and vice versa.
        self.find(key)
            .map(|p| failing.contains(&p.name) || failing.contains(&p.id.to_string()))
            .unwrap_or(false)
    }
}

#[async_trait]
impl PokemonGateway for MockGateway {
    async fn list(&self, offset: u32, limit: u32) -> Result<PokemonListResponse> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.list_delays.lock().unwrap().get(&offset).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if *self.fail_list.lock().unwrap() {
            return Err(anyhow!("list unavailable"));
        }

        let results = self
            .records
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|p| resource("pokemon", &p.name, p.id))
            .collect();

        Ok(PokemonListResponse {
            count: self.remote_count.unwrap_or(self.records.len() as u32),
            next: None,
            previous: None,
            results,
        })
    }

    async fn pokemon(&self, key: &PokemonKey) -> Result<Pokemon> {
        self.pokemon_calls.fetch_add(1, Ordering::SeqCst);
        let delay = self
            .find(key)
            .and_then(|p| self.pokemon_delays.lock().unwrap().get(&p.name).copied());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.is_failing(key) {
            return Err(anyhow!("http 500 for pokemon {key}"));
        }
        self.find(key)
            .cloned()
            .ok_or_else(|| anyhow!("http 404 for pokemon {key}"))
    }

    async fn species(&self, key: &PokemonKey) -> Result<PokemonSpecies> {
        self.species_calls.fetch_add(1, Ordering::SeqCst);
        let name = self
            .find(key)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| key.normalized());
        self.species
            .get(&name)
            .cloned()
            .ok_or_else(|| anyhow!("http 404 for species {key}"))
    }

    async fn evolution_chain(&self, url: &str) -> Result<EvolutionChain> {
        self.chain_calls.fetch_add(1, Ordering::SeqCst);
        self.chains
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow!("http 404 for {url}"))
    }
}

pub async fn open_store(gateway: Arc<MockGateway>) -> CatalogStore {
    let prefs = Preferences::in_memory().unwrap();
    CatalogStore::open(gateway, prefs).await
}

/// Let every ready task run. The preferences worker lives on the blocking
/// pool, so a paused clock never auto-advances while a store is open.
pub async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

/// Move the paused clock forward, then let woken tasks finish.
pub async fn advance(by: Duration) {
    settle().await;
    tokio::time::advance(by).await;
    settle().await;
}
