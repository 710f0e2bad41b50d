//! Display helpers for records, species and stats.
//!
//! Everything here is pure and total: unknown keys fall back to a neutral
//! value instead of failing.

use crate::types::{FlavorTextEntry, PokemonSpecies};

pub const FALLBACK_COLOR: &str = "#777777";
pub const NO_DESCRIPTION: &str = "No description available.";
const FLAVOR_LANGUAGE: &str = "en";
const ARTWORK_BASE: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/other/official-artwork";

/// Hex color for a type name, gray for anything unrecognised.
pub fn type_color(type_name: &str) -> &'static str {
    match type_name {
        "normal" => "#A8A878",
        "fire" => "#F08030",
        "water" => "#6890F0",
        "electric" => "#F8D030",
        "grass" => "#78C850",
        "ice" => "#98D8D8",
        "fighting" => "#C03028",
        "poison" => "#A040A0",
        "ground" => "#E0C068",
        "flying" => "#A890F0",
        "psychic" => "#F85888",
        "bug" => "#A8B820",
        "rock" => "#B8A038",
        "ghost" => "#705898",
        "dragon" => "#7038F8",
        "dark" => "#705848",
        "steel" => "#B8B8D0",
        "fairy" => "#EE99AC",
        _ => FALLBACK_COLOR,
    }
}

/// Short label for a stat key; unknown keys pass through unchanged.
pub fn stat_name(stat: &str) -> &str {
    match stat {
        "hp" => "HP",
        "attack" => "Attack",
        "defense" => "Defense",
        "special-attack" => "Sp. Atk",
        "special-defense" => "Sp. Def",
        "speed" => "Speed",
        other => other,
    }
}

pub fn stat_color(stat: &str) -> &'static str {
    match stat {
        "hp" => "#FF5959",
        "attack" => "#F5AC78",
        "defense" => "#FAE078",
        "special-attack" => "#9DB7F5",
        "special-defense" => "#A7DB8D",
        "speed" => "#FA92B2",
        _ => FALLBACK_COLOR,
    }
}

/// Width of a stat bar as a percentage of the 255 ceiling, capped at 100.
pub fn stat_bar_percent(base_stat: u32) -> f64 {
    (base_stat as f64 / 255.0 * 100.0).min(100.0)
}

/// `#025`-style number, zero padded to three digits.
pub fn pokemon_id(id: u32) -> String {
    format!("{id:03}")
}

/// Decimetres -> `"1.0m (3'3\")"`.
pub fn height(decimetres: u32) -> String {
    let meters = decimetres as f64 / 10.0;
    let total_feet = meters * 3.281;
    let feet = total_feet.floor();
    let inches = ((total_feet - feet) * 12.0).round();
    format!("{meters:.1}m ({}'{}\")", feet as u32, inches as u32)
}

/// Hectograms -> `"10.0kg (22.1lbs)"`.
pub fn weight(hectograms: u32) -> String {
    let kg = hectograms as f64 / 10.0;
    let lbs = kg * 2.205;
    format!("{kg:.1}kg ({lbs:.1}lbs)")
}

/// First English flavor text with form feeds and line breaks turned into spaces.
pub fn english_flavor_text(entries: &[FlavorTextEntry]) -> String {
    entries
        .iter()
        .find(|e| e.language.name == FLAVOR_LANGUAGE)
        .map(|e| e.flavor_text.replace(['\u{000C}', '\n', '\r'], " "))
        .unwrap_or_else(|| NO_DESCRIPTION.to_string())
}

/// Legendary, then Mythical, then habitat, then "Unknown".
pub fn category(species: Option<&PokemonSpecies>) -> String {
    match species {
        Some(s) if s.is_legendary => "Legendary".to_string(),
        Some(s) if s.is_mythical => "Mythical".to_string(),
        Some(s) => s
            .habitat
            .as_ref()
            .map(|h| h.name.clone())
            .unwrap_or_else(|| "Unknown".to_string()),
        None => "Unknown".to_string(),
    }
}

/// `generation-iii` -> `Gen iii`.
pub fn generation(species: Option<&PokemonSpecies>) -> String {
    species
        .map(|s| s.generation.name.replacen("generation-", "Gen ", 1))
        .unwrap_or_else(|| "Unknown".to_string())
}

/// `solar-power` -> `solar power` (first hyphen only).
pub fn ability_name(raw: &str) -> String {
    raw.replacen('-', " ", 1)
}

/// Official artwork URL for a species id, used for evolution nodes.
pub fn artwork_url(species_id: u32) -> String {
    format!("{ARTWORK_BASE}/{species_id}.png")
}
