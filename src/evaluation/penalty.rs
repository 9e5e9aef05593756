use crate::config::constant::QTY_EPSILON;
use crate::domain::geometry::all_same_side;
use crate::domain::types::Ship;
use crate::solver::genetic::chromosome::Chromosome;

/// Penalty for transverse imbalance.
///
/// Two contributions, deliberately overlapping: a flat per-cargo charge when
/// a multi-tank cargo sits entirely on one side, and a per-row charge when a
/// port/starboard pair is loaded more than 10% apart. The double counting is
/// a hand-chosen tuning point.
pub fn symmetry_penalty(chromosome: &Chromosome, ship: &Ship, coef: f64) -> f64 {
    let mut penalty = 0.0;

    for (_, tanks) in chromosome.cargo_tank_groups() {
        if tanks.len() < 2 {
            continue;
        }
        let tank_ids: Vec<String> = tanks
            .iter()
            .map(|&(index, _)| chromosome.tank_id(index).to_string())
            .collect();
        if all_same_side(ship, &tank_ids) {
            penalty += coef * tanks.len() as f64;
        }
    }

    for (port, starboard) in ship.tank_pairs() {
        let port_index = chromosome.tank_ids().iter().position(|id| *id == port.id);
        let starboard_index = chromosome
            .tank_ids()
            .iter()
            .position(|id| *id == starboard.id);
        let (Some(port_index), Some(starboard_index)) = (port_index, starboard_index) else {
            continue;
        };

        let port_qty = chromosome.genes[port_index].1;
        let starboard_qty = chromosome.genes[starboard_index].1;
        let average = (port_qty + starboard_qty) / 2.0;
        if average > QTY_EPSILON {
            let imbalance = (port_qty - starboard_qty).abs() / average;
            if imbalance > 0.1 {
                penalty += coef * imbalance * 0.1;
            }
        }
    }

    penalty
}

/// Penalty for longitudinal imbalance: the volume-weighted mean row (LCG)
/// deviating from the ideal position, normalized by the row count.
pub fn trim_penalty(
    chromosome: &Chromosome,
    ship: &Ship,
    coef: f64,
    ideal_lcg: f64,
    total_rows: usize,
) -> f64 {
    if chromosome.is_empty() || total_rows == 0 {
        return 0.0;
    }

    let mut total_weight = 0.0;
    let mut weighted_position = 0.0;
    for (index, (cargo_id, quantity)) in chromosome.genes.iter().enumerate() {
        if cargo_id.is_none() || *quantity <= QTY_EPSILON {
            continue;
        }
        if let Some(position) = ship.position_of(chromosome.tank_id(index)) {
            total_weight += quantity;
            weighted_position += quantity * position.row as f64;
        }
    }

    if total_weight < QTY_EPSILON {
        return 0.0;
    }

    let actual_lcg = weighted_position / total_weight;
    let normalized_deviation = (actual_lcg - ideal_lcg).abs() / total_rows as f64;
    coef * normalized_deviation
}

/// Penalty for operational overhead: a cargo spread over `n > 1` tanks costs
/// quadratically in the extra tanks.
pub fn operational_penalty(chromosome: &Chromosome, coef: f64) -> f64 {
    let mut penalty = 0.0;
    for (_, tanks) in chromosome.cargo_tank_groups() {
        let tank_count = tanks.len();
        if tank_count > 1 {
            penalty += coef * ((tank_count - 1) as f64).powi(2);
        }
    }
    penalty
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Tank;

    fn ship_with_tanks(count: usize) -> Ship {
        let tanks = (0..count)
            .map(|i| Tank {
                id: format!("t{}", i + 1),
                name: format!("{}{}", i / 2 + 1, if i % 2 == 0 { "P" } else { "S" }),
                volume: 500.0,
            })
            .collect();
        Ship {
            id: "ship".to_string(),
            name: "MT TEST".to_string(),
            tanks,
        }
    }

    fn tank_ids(ship: &Ship) -> Vec<String> {
        ship.tanks.iter().map(|tank| tank.id.clone()).collect()
    }

    #[test]
    fn balanced_pair_has_zero_symmetry_penalty() {
        let ship = ship_with_tanks(6);
        let mut chromosome = Chromosome::empty(tank_ids(&ship));
        chromosome.genes[0] = (Some("a".to_string()), 500.0);
        chromosome.genes[1] = (Some("a".to_string()), 500.0);

        assert_eq!(symmetry_penalty(&chromosome, &ship, 3000.0), 0.0);
    }

    #[test]
    fn one_sided_cargo_pays_both_symmetry_charges() {
        let ship = ship_with_tanks(6);
        let mut chromosome = Chromosome::empty(tank_ids(&ship));
        // All port side: indices 0 and 2 are t1 and t3.
        chromosome.genes[0] = (Some("a".to_string()), 400.0);
        chromosome.genes[2] = (Some("a".to_string()), 400.0);

        let penalty = symmetry_penalty(&chromosome, &ship, 3000.0);
        // Flat per-cargo charge: 3000 * 2 tanks. Each of the two affected
        // rows is fully imbalanced (ratio 2.0): 2 * 3000 * 2.0 * 0.1.
        assert_eq!(penalty, 6000.0 + 1200.0);
    }

    #[test]
    fn trim_penalty_zero_at_ideal_center() {
        let ship = ship_with_tanks(8);
        let mut chromosome = Chromosome::empty(tank_ids(&ship));
        // Rows 2 and 3, balanced: LCG = 2.5.
        chromosome.genes[2] = (Some("a".to_string()), 300.0);
        chromosome.genes[4] = (Some("a".to_string()), 300.0);

        let penalty = trim_penalty(&chromosome, &ship, 1500.0, 2.5, 4);
        assert!(penalty.abs() < 1e-9);
    }

    #[test]
    fn trim_penalty_grows_with_deviation() {
        let ship = ship_with_tanks(8);
        let mut chromosome = Chromosome::empty(tank_ids(&ship));
        chromosome.genes[0] = (Some("a".to_string()), 500.0); // row 1 only

        let penalty = trim_penalty(&chromosome, &ship, 1500.0, 2.0, 4);
        // |1 - 2| / 4 rows = a quarter of the coefficient.
        assert!((penalty - 375.0).abs() < 1e-9);
    }

    #[test]
    fn operational_penalty_is_quadratic_in_extra_tanks() {
        let ship = ship_with_tanks(8);
        let mut chromosome = Chromosome::empty(tank_ids(&ship));
        for index in 0..3 {
            chromosome.genes[index] = (Some("a".to_string()), 100.0);
        }
        chromosome.genes[4] = (Some("b".to_string()), 100.0);

        // Cargo a spans 3 tanks -> (3-1)^2 = 4 units; cargo b spans 1 -> none.
        assert_eq!(operational_penalty(&chromosome, 100.0), 400.0);
    }
}
