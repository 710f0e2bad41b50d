use crate::types::{Pokemon, PokemonType};

/// Subset of `list` carrying `ty`, in list order. `None` keeps everything.
pub fn by_type(list: &[Pokemon], ty: Option<PokemonType>) -> Vec<Pokemon> {
    match ty {
        None => list.to_vec(),
        Some(ty) => list.iter().filter(|p| p.has_type(ty)).cloned().collect(),
    }
}

/// Case-insensitive substring match on a record name.
pub fn name_matches(name: &str, query: &str) -> bool {
    name.to_lowercase().contains(&query.to_lowercase())
}

/// Blank queries (empty or whitespace only) never hit the network.
pub fn is_blank(query: &str) -> bool {
    query.trim().is_empty()
}
