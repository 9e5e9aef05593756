use crate::config::constant::QTY_EPSILON;
use crate::domain::types::{Plan, Ship};

/// Composite plan quality score in `[0, 100]`, higher is better.
///
/// Weighting: completion rate 40%, overall ship utilization 30%, average
/// fill of loaded tanks 20%, and up to 10 points eroded by the fraction of
/// tanks left empty.
pub fn score_plan(plan: &Plan, ship: &Ship) -> f64 {
    if ship.tanks.is_empty() {
        return 0.0;
    }

    let total_requested: f64 = plan
        .cargo_requests
        .iter()
        .map(|cargo| cargo.requested_volume)
        .sum();
    let total_loaded = plan.total_loaded();

    let completion_rate = if total_requested > 0.0 {
        total_loaded / total_requested * 100.0
    } else {
        0.0
    };
    let completion_score = completion_rate * 0.4;

    let total_capacity = ship.total_capacity();
    let utilization = if total_capacity > 0.0 {
        total_loaded / total_capacity * 100.0
    } else {
        0.0
    };
    let utilization_score = utilization * 0.3;

    let mut fill_rates = Vec::new();
    for tank in &ship.tanks {
        if let Some(assignment) = plan.assignment(&tank.id) {
            if tank.volume > 0.0 {
                fill_rates.push(assignment.quantity_loaded / tank.volume * 100.0);
            }
        }
    }
    let average_fill = if fill_rates.is_empty() {
        0.0
    } else {
        fill_rates.iter().sum::<f64>() / fill_rates.len() as f64
    };
    let fill_score = average_fill * 0.2;

    let empty_tanks = ship
        .tanks
        .iter()
        .filter(|tank| plan.assignment(&tank.id).is_none())
        .count();
    let empty_fraction = empty_tanks as f64 / ship.tanks.len() as f64;
    let empty_score = 10.0 - 10.0 * empty_fraction;

    (completion_score + utilization_score + fill_score + empty_score).min(100.0)
}

/// Cargoes the plan could not fully place, as `(cargo_id, remaining_volume)`.
/// An empty list means every request was satisfied.
pub fn unfulfilled(plan: &Plan) -> Vec<(String, f64)> {
    plan.cargo_requests
        .iter()
        .filter_map(|cargo| {
            let remaining = cargo.requested_volume - plan.cargo_total_loaded(&cargo.id);
            if remaining > QTY_EPSILON {
                Some((cargo.id.clone(), remaining))
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{Assignment, Cargo, Tank};

    fn ship_with_tanks(count: usize, volume: f64) -> Ship {
        let tanks = (0..count)
            .map(|i| Tank {
                id: format!("t{}", i + 1),
                name: format!("{}{}", i / 2 + 1, if i % 2 == 0 { "P" } else { "S" }),
                volume,
            })
            .collect();
        Ship {
            id: "ship".to_string(),
            name: "MT TEST".to_string(),
            tanks,
        }
    }

    fn cargo(id: &str, volume: f64) -> Cargo {
        Cargo::new(
            id.to_string(),
            "FUEL OIL".to_string(),
            Some(volume),
            None,
            None,
            vec![],
            false,
        )
    }

    #[test]
    fn fully_loaded_single_tank_scores_high() {
        let ship = ship_with_tanks(1, 1000.0);
        let mut plan = Plan::new(&ship, vec![cargo("c1", 800.0)]);
        plan.add_assignment(Assignment {
            tank_id: "t1".to_string(),
            cargo_id: "c1".to_string(),
            quantity_loaded: 800.0,
        });

        // 40 completion + 24 utilization + 16 fill + 10 no-empty = 90.
        let score = score_plan(&plan, &ship);
        assert!((score - 90.0).abs() < 1e-9);
        assert!(unfulfilled(&plan).is_empty());
    }

    #[test]
    fn loading_more_volume_never_scores_lower() {
        let ship = ship_with_tanks(4, 500.0);
        let requests = vec![cargo("c1", 1000.0)];

        let mut smaller = Plan::new(&ship, requests.clone());
        smaller.add_assignment(Assignment {
            tank_id: "t1".to_string(),
            cargo_id: "c1".to_string(),
            quantity_loaded: 400.0,
        });

        let mut larger = smaller.clone();
        larger.add_assignment(Assignment {
            tank_id: "t2".to_string(),
            cargo_id: "c1".to_string(),
            quantity_loaded: 400.0,
        });

        assert!(score_plan(&larger, &ship) >= score_plan(&smaller, &ship));
    }

    #[test]
    fn unfulfilled_reports_remaining_volume() {
        let ship = ship_with_tanks(2, 500.0);
        let mut plan = Plan::new(&ship, vec![cargo("c1", 900.0), cargo("c2", 400.0)]);
        plan.add_assignment(Assignment {
            tank_id: "t1".to_string(),
            cargo_id: "c1".to_string(),
            quantity_loaded: 500.0,
        });

        let report = unfulfilled(&plan);
        assert_eq!(report.len(), 2);
        assert_eq!(report[0], ("c1".to_string(), 400.0));
        assert_eq!(report[1], ("c2".to_string(), 400.0));
    }
}
