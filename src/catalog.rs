//! Item and objective catalog
//!
//! Tags are plain lowercase words without accents. Distractors always carry
//! the `junk` tag so that no objective can ever match them.

use std::collections::HashSet;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Catalog construction failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("item catalog is empty")]
    EmptyItems,
    #[error("objective catalog is empty")]
    EmptyObjectives,
    #[error("duplicate item name: {0}")]
    DuplicateItem(String),
    #[error("invalid catalog JSON: {0}")]
    Json(String),
}

/// A micronutrient or a distractor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub tags: Vec<String>,
    /// Category badge
    pub label: String,
}

impl Item {
    pub fn new(name: &str, tags: &[&str], label: &str) -> Self {
        Self {
            name: name.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            label: label.to_string(),
        }
    }

    /// True when the item shares at least one tag with the objective
    pub fn matches(&self, objective: &Objective) -> bool {
        self.tags.iter().any(|t| objective.tags.contains(t))
    }
}

/// A round's matching criterion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Names of the matching items, in catalog order
    pub targets: Vec<String>,
    pub tags: Vec<String>,
}

/// Objective definition before its targets are derived from the items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectiveConfig {
    pub id: String,
    pub title: String,
    pub description: String,
    pub main_tag: String,
}

impl ObjectiveConfig {
    pub fn new(id: &str, title: &str, description: &str, main_tag: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            main_tag: main_tag.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct CatalogDocument {
    items: Vec<Item>,
    objectives: Vec<ObjectiveConfig>,
}

/// Immutable items plus the objectives derived from them
#[derive(Debug, Clone)]
pub struct Catalog {
    items: Vec<Item>,
    objectives: Vec<Objective>,
}

impl Catalog {
    /// Build the catalog, deriving each objective's targets from `main_tag`
    pub fn new(items: Vec<Item>, configs: Vec<ObjectiveConfig>) -> Result<Self, CatalogError> {
        if items.is_empty() {
            return Err(CatalogError::EmptyItems);
        }
        if configs.is_empty() {
            return Err(CatalogError::EmptyObjectives);
        }

        let mut seen = HashSet::new();
        for item in &items {
            if !seen.insert(item.name.as_str()) {
                return Err(CatalogError::DuplicateItem(item.name.clone()));
            }
        }

        let objectives = configs
            .into_iter()
            .map(|cfg| {
                let targets = items
                    .iter()
                    .filter(|item| item.tags.contains(&cfg.main_tag))
                    .map(|item| item.name.clone())
                    .collect();
                Objective {
                    id: cfg.id,
                    title: cfg.title,
                    description: cfg.description,
                    targets,
                    tags: vec![cfg.main_tag],
                }
            })
            .collect();

        Ok(Self { items, objectives })
    }

    /// Parse `{ "items": [...], "objectives": [...] }`
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let doc: CatalogDocument =
            serde_json::from_str(json).map_err(|e| CatalogError::Json(e.to_string()))?;
        Self::new(doc.items, doc.objectives)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn objectives(&self) -> &[Objective] {
        &self.objectives
    }

    pub fn objective(&self, id: &str) -> Option<&Objective> {
        self.objectives.iter().find(|o| o.id == id)
    }

    /// Uniform pick among the objectives
    pub fn random_objective<R: Rng>(&self, rng: &mut R) -> &Objective {
        &self.objectives[rng.random_range(0..self.objectives.len())]
    }
}

impl Default for Catalog {
    fn default() -> Self {
        let items = vec![
            // Immunité
            Item::new("Vitamine C", &["immunite", "fatigue", "antioxydant"], "Vitamine"),
            Item::new("Vitamine D", &["immunite", "os"], "Vitamine"),
            Item::new("Zinc", &["immunite", "antioxydant"], "Minéral"),
            Item::new("Sélénium", &["immunite", "antioxydant"], "Minéral"),
            // Stress / sommeil
            Item::new("Magnésium", &["stress", "fatigue", "sommeil"], "Minéral"),
            Item::new("Vitamine B-Complex", &["stress", "fatigue"], "Vitamine"),
            Item::new(
                "Omega-3",
                &["stress", "cerveau", "anti_inflammatoire"],
                "Acides gras essentiels",
            ),
            // Fatigue
            Item::new("Fer", &["fatigue"], "Minéral"),
            // Digestion / microbiote
            Item::new("Probiotiques", &["digestion", "microbiote", "immunite"], "Microbiote"),
            Item::new("Prébiotiques", &["digestion", "microbiote"], "Fibres"),
            // Antioxydants
            Item::new("Vitamine E", &["antioxydant"], "Vitamine"),
            // Distractors
            Item::new("Fast-food", &["junk"], "🛑"),
            Item::new("Sucre raffiné", &["junk"], "🛑"),
            Item::new("Sédentarité", &["junk"], "🛑"),
            Item::new("Tabac", &["junk"], "🛑"),
        ];

        let configs = vec![
            ObjectiveConfig::new(
                "immunite",
                "Objectif : soutenir l'immunité",
                "Cliquez sur les micronutriments qui renforcent le système immunitaire. \
                 Évitez les faux amis (fast-food, sucre, tabac…).",
                "immunite",
            ),
            ObjectiveConfig::new(
                "stress",
                "Objectif : gérer le stress & le sommeil",
                "Cliquez sur les micronutriments utiles pour la relaxation et un sommeil de qualité.",
                "stress",
            ),
            ObjectiveConfig::new(
                "fatigue",
                "Objectif : lutter contre la fatigue",
                "Cliquez sur les micronutriments qui aident à réduire la fatigue physique et mentale.",
                "fatigue",
            ),
            ObjectiveConfig::new(
                "digestion",
                "Objectif : confort digestif",
                "Cliquez sur les micronutriments utiles au microbiote, au confort digestif \
                 et à un transit harmonieux.",
                "digestion",
            ),
            ObjectiveConfig::new(
                "antioxydant",
                "Objectif : protection cellulaire & antioxydants",
                "Cliquez sur les micronutriments qui protègent les cellules du stress oxydatif.",
                "antioxydant",
            ),
        ];

        // Built-in content is non-empty and has unique names
        match Self::new(items, configs) {
            Ok(catalog) => catalog,
            Err(e) => unreachable!("built-in catalog is invalid: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_default_catalog_targets() {
        let catalog = Catalog::default();
        assert_eq!(catalog.items().len(), 15);
        assert_eq!(catalog.objectives().len(), 5);

        let immunite = catalog.objective("immunite").unwrap();
        assert_eq!(
            immunite.targets,
            vec!["Vitamine C", "Vitamine D", "Zinc", "Sélénium", "Probiotiques"]
        );
        assert_eq!(immunite.tags, vec!["immunite"]);
    }

    #[test]
    fn test_item_matches_by_tag_intersection() {
        let catalog = Catalog::default();
        let immunite = catalog.objective("immunite").unwrap();

        let vitamin_c = Item::new("Vitamine C", &["immunite", "fatigue"], "Vitamine");
        let junk = Item::new("Tabac", &["junk"], "🛑");
        assert!(vitamin_c.matches(immunite));
        assert!(!junk.matches(immunite));
    }

    #[test]
    fn test_no_objective_matches_junk() {
        let catalog = Catalog::default();
        for item in catalog.items().iter().filter(|i| i.tags == ["junk"]) {
            assert!(catalog.objectives().iter().all(|o| !item.matches(o)));
        }
    }

    #[test]
    fn test_rejects_invalid_catalogs() {
        let cfg = ObjectiveConfig::new("a", "A", "", "a");
        assert_eq!(
            Catalog::new(vec![], vec![cfg.clone()]).unwrap_err(),
            CatalogError::EmptyItems
        );
        assert_eq!(
            Catalog::new(vec![Item::new("x", &["a"], "")], vec![]).unwrap_err(),
            CatalogError::EmptyObjectives
        );
        let dup = vec![Item::new("x", &["a"], ""), Item::new("x", &["b"], "")];
        assert_eq!(
            Catalog::new(dup, vec![cfg]).unwrap_err(),
            CatalogError::DuplicateItem("x".to_string())
        );
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "items": [
                { "name": "Zinc", "tags": ["immunite"], "label": "Minéral" },
                { "name": "Tabac", "tags": ["junk"], "label": "🛑" }
            ],
            "objectives": [
                { "id": "imm", "title": "T", "description": "D", "main_tag": "immunite" }
            ]
        }"#;
        let catalog = Catalog::from_json(json).unwrap();
        assert_eq!(catalog.objectives()[0].targets, vec!["Zinc"]);
        assert!(matches!(Catalog::from_json("{}"), Err(CatalogError::Json(_))));
    }

    #[test]
    fn test_random_objective_is_deterministic_per_seed() {
        let catalog = Catalog::default();
        let mut a = Pcg32::seed_from_u64(7);
        let mut b = Pcg32::seed_from_u64(7);
        for _ in 0..20 {
            assert_eq!(catalog.random_objective(&mut a).id, catalog.random_objective(&mut b).id);
        }
    }
}
