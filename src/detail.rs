//! Single-record view assembly.
//!
//! A detail view needs three dependent fetches: the record, its species,
//! and (when the species links one) the evolution chain. They run in that
//! order and the first failure aborts the rest; callers get either the
//! whole bundle or one error.

use futures::future::try_join_all;

use crate::evolution::{self, EvolutionRow};
use crate::format;
use crate::gateway::PokemonGateway;
use crate::store::CatalogStore;
use crate::types::{EvolutionChain, Pokemon, PokemonKey, PokemonSpecies};

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum DetailError {
    #[error("Failed to load Pokemon details. Please try again.")]
    Details {
        key: PokemonKey,
        #[source]
        source: BoxError,
    },
    #[error("Failed to load your favorite Pokémon. Please try again.")]
    Favorites {
        #[source]
        source: BoxError,
    },
}

/// Everything a detail view renders.
#[derive(Debug, Clone, PartialEq)]
pub struct PokemonDetails {
    pub pokemon: Pokemon,
    pub species: PokemonSpecies,
    pub evolution_chain: Option<EvolutionChain>,
}

impl PokemonDetails {
    pub fn description(&self) -> String {
        format::english_flavor_text(&self.species.flavor_text_entries)
    }

    pub fn category(&self) -> String {
        format::category(Some(&self.species))
    }

    pub fn generation(&self) -> String {
        format::generation(Some(&self.species))
    }

    pub fn evolution_rows(&self) -> Vec<EvolutionRow> {
        self.evolution_chain
            .as_ref()
            .map(|c| evolution::flatten(&c.chain))
            .unwrap_or_default()
    }
}

/// Record, then species, then chain. All-or-nothing.
pub async fn load_details(
    gateway: &dyn PokemonGateway,
    key: impl Into<PokemonKey>,
) -> Result<PokemonDetails, DetailError> {
    let key = key.into();
    log::info!("[detail] Loading details for {key}");

    let fail = |key: &PokemonKey, e: anyhow::Error| {
        log::error!("[detail] Error fetching Pokemon details for {key}: {e:#}");
        DetailError::Details {
            key: key.clone(),
            source: e.into(),
        }
    };

    let pokemon = gateway.pokemon(&key).await.map_err(|e| fail(&key, e))?;
    let species = gateway.species(&key).await.map_err(|e| fail(&key, e))?;
    let evolution_chain = match &species.evolution_chain {
        Some(link) => Some(
            gateway
                .evolution_chain(&link.url)
                .await
                .map_err(|e| fail(&key, e))?,
        ),
        None => None,
    };

    Ok(PokemonDetails {
        pokemon,
        species,
        evolution_chain,
    })
}

/// Full records for every favorite, fetched concurrently through the store.
/// No favorites means no requests and an empty result.
pub async fn load_favorites(store: &CatalogStore) -> Result<Vec<Pokemon>, DetailError> {
    let ids: Vec<u32> = store.favorites().into_iter().collect();
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    try_join_all(ids.into_iter().map(|id| store.fetch_details(id)))
        .await
        .map_err(|e| {
            log::error!("[detail] Error loading favorites: {e:#}");
            DetailError::Favorites { source: e.into() }
        })
}
