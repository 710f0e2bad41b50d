use serde::{Deserialize, Serialize};
use std::fmt;

/// Name + URL pair used throughout the PokeAPI for linked resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedResource {
    pub name: String,
    pub url: String,
}

impl NamedResource {
    /// Trailing numeric path segment of the resource URL
    /// (`.../pokemon-species/25/` -> 25).
    pub fn id(&self) -> Option<u32> {
        self.url
            .split('/')
            .filter(|s| !s.is_empty())
            .last()
            .and_then(|s| s.parse().ok())
    }
}

/// URL-only reference (species -> evolution chain).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResource {
    pub url: String,
}

/// One page of `/pokemon?offset=&limit=`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PokemonListResponse {
    pub count: u32,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<NamedResource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PokemonTypeSlot {
    pub slot: u8,
    #[serde(rename = "type")]
    pub kind: NamedResource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PokemonStat {
    pub base_stat: u32,
    #[serde(default)]
    pub effort: u32,
    pub stat: NamedResource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PokemonAbility {
    pub ability: NamedResource,
    pub is_hidden: bool,
    #[serde(default)]
    pub slot: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Artwork {
    #[serde(default)]
    pub front_default: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OtherSprites {
    #[serde(rename = "official-artwork", default)]
    pub official_artwork: Option<Artwork>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sprites {
    #[serde(default)]
    pub front_default: Option<String>,
    #[serde(default)]
    pub other: Option<OtherSprites>,
}

impl Sprites {
    /// Official artwork if present, else the default sprite.
    pub fn preferred(&self) -> Option<&str> {
        self.other
            .as_ref()
            .and_then(|o| o.official_artwork.as_ref())
            .and_then(|a| a.front_default.as_deref())
            .or(self.front_default.as_deref())
    }
}

/// A full `/pokemon/{nameOrId}` record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pokemon {
    pub id: u32,
    pub name: String,
    /// Decimetres.
    pub height: u32,
    /// Hectograms.
    pub weight: u32,
    pub types: Vec<PokemonTypeSlot>,
    #[serde(default)]
    pub stats: Vec<PokemonStat>,
    #[serde(default)]
    pub abilities: Vec<PokemonAbility>,
    #[serde(default)]
    pub sprites: Sprites,
}

impl Pokemon {
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.iter().map(|t| t.kind.name.as_str())
    }

    pub fn has_type(&self, ty: PokemonType) -> bool {
        self.type_names().any(|name| name == ty.as_str())
    }

    /// Name of the first type slot, used for accent colors.
    pub fn primary_type(&self) -> Option<&str> {
        self.types.first().map(|t| t.kind.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlavorTextEntry {
    pub flavor_text: String,
    pub language: NamedResource,
    #[serde(default)]
    pub version: Option<NamedResource>,
}

/// `/pokemon-species/{nameOrId}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PokemonSpecies {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub flavor_text_entries: Vec<FlavorTextEntry>,
    #[serde(default)]
    pub is_legendary: bool,
    #[serde(default)]
    pub is_mythical: bool,
    #[serde(default)]
    pub habitat: Option<NamedResource>,
    pub generation: NamedResource,
    #[serde(default)]
    pub evolution_chain: Option<ApiResource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionDetail {
    #[serde(default)]
    pub min_level: Option<u32>,
    #[serde(default)]
    pub item: Option<NamedResource>,
    pub trigger: NamedResource,
}

/// One node of the evolution tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainLink {
    pub species: NamedResource,
    #[serde(default)]
    pub evolution_details: Vec<EvolutionDetail>,
    #[serde(default)]
    pub evolves_to: Vec<ChainLink>,
    #[serde(default)]
    pub is_baby: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionChain {
    pub id: u32,
    pub chain: ChainLink,
}

/// Lookup key for `/pokemon/{key}` and `/pokemon-species/{key}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PokemonKey {
    Id(u32),
    Name(String),
}

impl PokemonKey {
    /// Lowercased path segment.
    pub fn normalized(&self) -> String {
        match self {
            PokemonKey::Id(id) => id.to_string(),
            PokemonKey::Name(name) => name.trim().to_lowercase(),
        }
    }
}

impl From<u32> for PokemonKey {
    fn from(id: u32) -> Self {
        PokemonKey::Id(id)
    }
}

impl From<&str> for PokemonKey {
    fn from(s: &str) -> Self {
        match s.trim().parse::<u32>() {
            Ok(id) => PokemonKey::Id(id),
            Err(_) => PokemonKey::Name(s.to_string()),
        }
    }
}

impl From<String> for PokemonKey {
    fn from(s: String) -> Self {
        PokemonKey::from(s.as_str())
    }
}

impl fmt::Display for PokemonKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PokemonKey::Id(id) => write!(f, "{id}"),
            PokemonKey::Name(name) => write!(f, "{name}"),
        }
    }
}

/// The 18 elemental types a record can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PokemonType {
    Normal,
    Fire,
    Water,
    Electric,
    Grass,
    Ice,
    Fighting,
    Poison,
    Ground,
    Flying,
    Psychic,
    Bug,
    Rock,
    Ghost,
    Dragon,
    Dark,
    Steel,
    Fairy,
}

impl PokemonType {
    pub const ALL: [PokemonType; 18] = [
        PokemonType::Normal,
        PokemonType::Fire,
        PokemonType::Water,
        PokemonType::Electric,
        PokemonType::Grass,
        PokemonType::Ice,
        PokemonType::Fighting,
        PokemonType::Poison,
        PokemonType::Ground,
        PokemonType::Flying,
        PokemonType::Psychic,
        PokemonType::Bug,
        PokemonType::Rock,
        PokemonType::Ghost,
        PokemonType::Dragon,
        PokemonType::Dark,
        PokemonType::Steel,
        PokemonType::Fairy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PokemonType::Normal => "normal",
            PokemonType::Fire => "fire",
            PokemonType::Water => "water",
            PokemonType::Electric => "electric",
            PokemonType::Grass => "grass",
            PokemonType::Ice => "ice",
            PokemonType::Fighting => "fighting",
            PokemonType::Poison => "poison",
            PokemonType::Ground => "ground",
            PokemonType::Flying => "flying",
            PokemonType::Psychic => "psychic",
            PokemonType::Bug => "bug",
            PokemonType::Rock => "rock",
            PokemonType::Ghost => "ghost",
            PokemonType::Dragon => "dragon",
            PokemonType::Dark => "dark",
            PokemonType::Steel => "steel",
            PokemonType::Fairy => "fairy",
        }
    }
}

impl std::str::FromStr for PokemonType {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> anyhow::Result<Self> {
        let wanted = s.trim().to_lowercase();
        PokemonType::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| anyhow::anyhow!("Unknown type '{s}'"))
    }
}

impl fmt::Display for PokemonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
