//! Flattening of an evolution tree into renderable rows.
//!
//! Chains are acyclic and shallow by upstream contract, so the walk is a
//! plain recursive descent with no visited set.

use crate::format;
use crate::types::{ChainLink, EvolutionDetail};

/// One species in the flattened tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvolutionRow {
    pub species: String,
    pub species_id: Option<u32>,
    pub depth: usize,
    /// Label on the edge leading into this node; `None` for the root.
    pub edge_label: Option<String>,
}

impl EvolutionRow {
    pub fn artwork_url(&self) -> Option<String> {
        self.species_id.map(format::artwork_url)
    }
}

/// Pre-order walk; siblings keep their upstream order.
pub fn flatten(root: &ChainLink) -> Vec<EvolutionRow> {
    let mut rows = Vec::new();
    walk(root, 0, None, &mut rows);
    rows
}

fn walk(link: &ChainLink, depth: usize, edge_label: Option<String>, rows: &mut Vec<EvolutionRow>) {
    rows.push(EvolutionRow {
        species: link.species.name.clone(),
        species_id: link.species.id(),
        depth,
        edge_label,
    });

    for child in &link.evolves_to {
        walk(child, depth + 1, Some(edge_label_for(child)), rows);
    }
}

/// Level threshold, else item usage, else the generic trigger label.
pub fn edge_label_for(child: &ChainLink) -> String {
    describe(child.evolution_details.first())
}

fn describe(detail: Option<&EvolutionDetail>) -> String {
    match detail {
        Some(EvolutionDetail {
            min_level: Some(level),
            ..
        }) if *level > 0 => format!("Level {level}"),
        Some(EvolutionDetail {
            item: Some(item),
            trigger,
            ..
        }) if trigger.name == "use-item" => format!("Use {}", item.name.replacen('-', " ", 1)),
        _ => "Evolution trigger".to_string(),
    }
}

/// Deepest level reached by the tree (root = 0).
pub fn depth(root: &ChainLink) -> usize {
    root.evolves_to
        .iter()
        .map(|child| 1 + depth(child))
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NamedResource;

    fn res(name: &str, url: &str) -> NamedResource {
        NamedResource {
            name: name.into(),
            url: url.into(),
        }
    }

    fn node(name: &str, id: u32, details: Vec<EvolutionDetail>, children: Vec<ChainLink>) -> ChainLink {
        ChainLink {
            species: res(name, &format!("https://pokeapi.co/api/v2/pokemon-species/{id}/")),
            evolution_details: details,
            evolves_to: children,
            is_baby: false,
        }
    }

    fn level(n: u32) -> EvolutionDetail {
        EvolutionDetail {
            min_level: Some(n),
            item: None,
            trigger: res("level-up", ""),
        }
    }

    #[test]
    fn branches_are_labelled_independently() {
        let root = node(
            "root",
            1,
            vec![],
            vec![
                node("left", 2, vec![level(16)], vec![]),
                node("right", 3, vec![level(16)], vec![]),
            ],
        );

        let rows = flatten(&root);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].edge_label, None);
        assert_eq!(rows[1].edge_label.as_deref(), Some("Level 16"));
        assert_eq!(rows[2].edge_label.as_deref(), Some("Level 16"));
        assert_eq!(rows[1].depth, 1);
        assert_eq!(rows[2].species_id, Some(3));
    }

    #[test]
    fn linear_chain_is_preorder() {
        let root = node(
            "bulbasaur",
            1,
            vec![],
            vec![node(
                "ivysaur",
                2,
                vec![level(16)],
                vec![node("venusaur", 3, vec![level(32)], vec![])],
            )],
        );

        let names: Vec<_> = flatten(&root)
            .into_iter()
            .map(|r| (r.species, r.depth))
            .collect();
        assert_eq!(
            names,
            vec![
                ("bulbasaur".to_string(), 0),
                ("ivysaur".to_string(), 1),
                ("venusaur".to_string(), 2)
            ]
        );
        assert_eq!(depth(&root), 2);
    }

    #[test]
    fn item_and_fallback_labels() {
        let stone = node(
            "vaporeon",
            134,
            vec![EvolutionDetail {
                min_level: None,
                item: Some(res("water-stone", "")),
                trigger: res("use-item", ""),
            }],
            vec![],
        );
        assert_eq!(edge_label_for(&stone), "Use water stone");

        let trade = node(
            "gengar",
            94,
            vec![EvolutionDetail {
                min_level: None,
                item: None,
                trigger: res("trade", ""),
            }],
            vec![],
        );
        assert_eq!(edge_label_for(&trade), "Evolution trigger");

        let bare = node("x", 9, vec![], vec![]);
        assert_eq!(edge_label_for(&bare), "Evolution trigger");
    }

    #[test]
    fn artwork_for_rows() {
        let rows = flatten(&node("eevee", 133, vec![], vec![]));
        assert!(rows[0].artwork_url().unwrap().ends_with("/133.png"));
    }
}
