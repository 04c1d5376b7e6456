//! Item selection policy
//!
//! Draws are biased toward items matching the objective so a small catalog
//! still yields a mix of good and bad bubbles instead of long streaks.

use rand::Rng;

use crate::catalog::{Catalog, Item, Objective};

/// Which side of the catalog to draw from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pool {
    /// Items sharing a tag with the objective
    Good,
    /// Everything else
    Bad,
}

/// Good pool with probability `good_bias`, bad pool otherwise
pub fn choose_pool<R: Rng>(rng: &mut R, good_bias: f64) -> Pool {
    if rng.random_bool(good_bias.clamp(0.0, 1.0)) {
        Pool::Good
    } else {
        Pool::Bad
    }
}

/// Uniform draw from `pool`, falling back to the whole catalog when the pool
/// is empty
pub fn select_item<'a, R: Rng>(
    pool: Pool,
    catalog: &'a Catalog,
    objective: &Objective,
    rng: &mut R,
) -> &'a Item {
    let want_good = pool == Pool::Good;
    let candidates: Vec<&Item> = catalog
        .items()
        .iter()
        .filter(|item| item.matches(objective) == want_good)
        .collect();

    if candidates.is_empty() {
        let items = catalog.items();
        return &items[rng.random_range(0..items.len())];
    }
    candidates[rng.random_range(0..candidates.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ObjectiveConfig;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn immunite(catalog: &Catalog) -> &Objective {
        catalog.objective("immunite").unwrap()
    }

    #[test]
    fn test_pools_respect_classification() {
        let catalog = Catalog::default();
        let objective = immunite(&catalog);
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..200 {
            assert!(select_item(Pool::Good, &catalog, objective, &mut rng).matches(objective));
            assert!(!select_item(Pool::Bad, &catalog, objective, &mut rng).matches(objective));
        }
    }

    #[test]
    fn test_empty_pool_falls_back_to_catalog() {
        let items = vec![
            Item::new("Zinc", &["immunite"], "Minéral"),
            Item::new("Fer", &["immunite"], "Minéral"),
        ];
        let catalog =
            Catalog::new(items, vec![ObjectiveConfig::new("imm", "", "", "immunite")]).unwrap();
        let objective = &catalog.objectives()[0];
        let mut rng = Pcg32::seed_from_u64(3);
        // No bad items exist: the draw still yields a catalog item
        let item = select_item(Pool::Bad, &catalog, objective, &mut rng);
        assert!(catalog.items().contains(item));
    }

    #[test]
    fn test_choose_pool_bias() {
        let mut rng = Pcg32::seed_from_u64(42);
        let draws = 10_000;
        let good = (0..draws)
            .filter(|_| choose_pool(&mut rng, 0.6) == Pool::Good)
            .count();
        let ratio = good as f64 / draws as f64;
        assert!((0.55..0.65).contains(&ratio), "ratio {ratio}");

        assert_eq!(choose_pool(&mut rng, 1.0), Pool::Good);
        assert_eq!(choose_pool(&mut rng, 0.0), Pool::Bad);
    }
}
