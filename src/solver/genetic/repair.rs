use crate::config::constant::QTY_EPSILON;
use crate::solver::genetic::chromosome::Chromosome;
use crate::solver::genetic::GeneticSolver;

impl<'a> GeneticSolver<'a> {
    /// Project a chromosome back onto the hard constraints:
    ///
    /// 1. no gene may exceed its tank's capacity;
    /// 2. every regular cargo's total must sit inside the receiver-tolerance
    ///    band around its requested volume (topped up into same-cargo tanks
    ///    first, then empty tanks; trimmed from same-cargo tanks).
    ///
    /// Applying repair to an already-repaired chromosome changes nothing.
    pub fn repair(&self, chromosome: &mut Chromosome) {
        for index in 0..chromosome.len() {
            let (cargo_id, quantity) = &chromosome.genes[index];
            if cargo_id.is_some() && *quantity > 0.0 {
                let volume = self.tank_volumes[chromosome.tank_id(index)];
                if *quantity > volume {
                    chromosome.genes[index].1 = volume;
                }
            }
        }

        let tolerance = self.settings.ga_receiver_tolerance;
        for cargo in &self.regular {
            let total = chromosome.cargo_total(&cargo.id);
            let min_allowed = cargo.requested_volume * (1.0 - tolerance);
            let max_allowed = cargo.requested_volume * (1.0 + tolerance);

            if total < min_allowed {
                self.add_cargo_volume(chromosome, &cargo.id, min_allowed - total);
            } else if total > max_allowed {
                self.remove_cargo_volume(chromosome, &cargo.id, total - max_allowed);
            }
        }
    }

    fn add_cargo_volume(&self, chromosome: &mut Chromosome, cargo_id: &str, needed: f64) {
        let mut remaining = needed;

        // Stack onto tanks already holding this cargo.
        for index in 0..chromosome.len() {
            if remaining <= QTY_EPSILON {
                break;
            }
            let (gene_cargo, quantity) = chromosome.genes[index].clone();
            if gene_cargo.as_deref() != Some(cargo_id) {
                continue;
            }
            let volume = self.tank_volumes[chromosome.tank_id(index)];
            let add = remaining.min(volume - quantity);
            if add > QTY_EPSILON {
                chromosome.genes[index] = (Some(cargo_id.to_string()), quantity + add);
                remaining -= add;
            }
        }

        // Then claim empty tanks.
        for index in 0..chromosome.len() {
            if remaining <= QTY_EPSILON {
                break;
            }
            if chromosome.genes[index].0.is_some() {
                continue;
            }
            let volume = self.tank_volumes[chromosome.tank_id(index)];
            let add = remaining.min(volume);
            if add > QTY_EPSILON {
                chromosome.genes[index] = (Some(cargo_id.to_string()), add);
                remaining -= add;
            }
        }
    }

    fn remove_cargo_volume(&self, chromosome: &mut Chromosome, cargo_id: &str, excess: f64) {
        let mut remaining = excess;
        for index in 0..chromosome.len() {
            if remaining <= QTY_EPSILON {
                break;
            }
            let (gene_cargo, quantity) = chromosome.genes[index].clone();
            if gene_cargo.as_deref() != Some(cargo_id) {
                continue;
            }
            let take = remaining.min(quantity);
            if take <= QTY_EPSILON {
                continue;
            }
            let new_quantity = quantity - take;
            chromosome.genes[index] = if new_quantity < QTY_EPSILON {
                (None, 0.0)
            } else {
                (Some(cargo_id.to_string()), new_quantity)
            };
            remaining -= take;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{Cargo, Ship, Tank};
    use crate::settings::Settings;
    use crate::solver::genetic::GeneticSolver;
    use std::collections::{HashMap, HashSet};

    fn ship_with_tanks(volumes: &[f64]) -> Ship {
        Ship {
            id: "ship".to_string(),
            name: "MT TEST".to_string(),
            tanks: volumes
                .iter()
                .enumerate()
                .map(|(i, &volume)| Tank {
                    id: format!("t{}", i + 1),
                    name: format!("{}{}", i / 2 + 1, if i % 2 == 0 { "P" } else { "S" }),
                    volume,
                })
                .collect(),
        }
    }

    fn cargo(id: &str, volume: f64) -> Cargo {
        Cargo::new(
            id.to_string(),
            format!("CARGO {}", id),
            Some(volume),
            None,
            None,
            vec![],
            false,
        )
    }

    fn prepared_solver<'a>(
        ship: &'a Ship,
        cargoes: &'a [Cargo],
        settings: &'a Settings,
    ) -> GeneticSolver<'a> {
        let mut solver =
            GeneticSolver::new(ship, cargoes, &HashSet::new(), &HashMap::new(), settings);
        solver.tank_ids = ship.tanks.iter().map(|tank| tank.id.clone()).collect();
        solver.tank_volumes = ship
            .tanks
            .iter()
            .map(|tank| (tank.id.clone(), tank.volume))
            .collect();
        solver
    }

    fn tank_ids(ship: &Ship) -> Vec<String> {
        ship.tanks.iter().map(|tank| tank.id.clone()).collect()
    }

    #[test]
    fn caps_over_capacity_genes() {
        let ship = ship_with_tanks(&[500.0, 500.0]);
        let cargoes = vec![cargo("c1", 600.0)];
        let settings = Settings::default();
        let solver = prepared_solver(&ship, &cargoes, &settings);

        let mut chromosome = Chromosome::new(
            vec![(Some("c1".to_string()), 900.0), (None, 0.0)],
            tank_ids(&ship),
        );
        solver.repair(&mut chromosome);

        assert!(chromosome.genes[0].1 <= 500.0);
        // The under-load triggered by the cap is topped up into the empty tank.
        let total = chromosome.cargo_total("c1");
        assert!(total >= 600.0 * (1.0 - settings.ga_receiver_tolerance) - 1e-9);
        assert!(total <= 600.0 * (1.0 + settings.ga_receiver_tolerance) + 1e-9);
    }

    #[test]
    fn trims_over_loaded_cargo_to_the_tolerance_band() {
        let ship = ship_with_tanks(&[500.0, 500.0, 500.0]);
        let cargoes = vec![cargo("c1", 500.0)];
        let settings = Settings::default();
        let solver = prepared_solver(&ship, &cargoes, &settings);

        let mut chromosome = Chromosome::new(
            vec![
                (Some("c1".to_string()), 400.0),
                (Some("c1".to_string()), 400.0),
                (None, 0.0),
            ],
            tank_ids(&ship),
        );
        solver.repair(&mut chromosome);

        let total = chromosome.cargo_total("c1");
        let max_allowed = 500.0 * (1.0 + settings.ga_receiver_tolerance);
        assert!((total - max_allowed).abs() < 1e-9);
    }

    #[test]
    fn repair_is_idempotent() {
        let ship = ship_with_tanks(&[500.0, 400.0, 300.0, 600.0]);
        let cargoes = vec![cargo("c1", 800.0), cargo("c2", 450.0)];
        let settings = Settings::default();
        let solver = prepared_solver(&ship, &cargoes, &settings);

        let mut chromosome = Chromosome::new(
            vec![
                (Some("c1".to_string()), 700.0),
                (Some("c2".to_string()), 900.0),
                (None, 0.0),
                (Some("c1".to_string()), 50.0),
            ],
            tank_ids(&ship),
        );
        solver.repair(&mut chromosome);

        let once = chromosome.clone();
        solver.repair(&mut chromosome);
        assert_eq!(chromosome, once);
    }
}
