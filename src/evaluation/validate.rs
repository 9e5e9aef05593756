use std::collections::HashSet;

use crate::domain::types::{Cargo, Ship};
use crate::error::PlanningError;
use crate::settings::{Algorithm, Settings};

// The GA may legitimately over-place up to the receiver tolerance, so its
// feasibility check grants a 10% slack over ship capacity.
const GA_CAPACITY_SLACK: f64 = 1.10;

/// Check that the cargo requests stand a chance of fitting the ship.
///
/// `Err(InvalidInput)` flags malformed data, `Err(Infeasible)` an
/// over-capacity request. Hosts may still run the solver after an
/// `Infeasible` verdict to get a best-effort partial plan.
pub fn validate(ship: &Ship, cargoes: &[Cargo], settings: &Settings) -> Result<(), PlanningError> {
    if ship.tanks.is_empty() {
        return Err(PlanningError::InvalidInput(format!(
            "ship '{}' has no tanks",
            ship.name
        )));
    }

    let mut seen_names = HashSet::new();
    for tank in &ship.tanks {
        if tank.volume <= 0.0 {
            return Err(PlanningError::InvalidInput(format!(
                "tank '{}' has non-positive volume {}",
                tank.name, tank.volume
            )));
        }
        if !seen_names.insert(tank.name.as_str()) {
            return Err(PlanningError::InvalidInput(format!(
                "duplicate tank name '{}'",
                tank.name
            )));
        }
    }

    for cargo in cargoes {
        if cargo.requested_volume <= 0.0 {
            return Err(PlanningError::InvalidInput(format!(
                "cargo '{}' has non-positive requested volume {}",
                cargo.kind_label, cargo.requested_volume
            )));
        }
    }

    let total_requested: f64 = cargoes.iter().map(|cargo| cargo.requested_volume).sum();
    let capacity_limit = match settings.optimization_algorithm {
        Algorithm::Genetic => ship.total_capacity() * GA_CAPACITY_SLACK,
        Algorithm::Advanced => ship.total_capacity(),
    };
    if total_requested > capacity_limit {
        return Err(PlanningError::Infeasible(format!(
            "total requested volume {:.2} exceeds ship capacity {:.2} (limit {:.2})",
            total_requested,
            ship.total_capacity(),
            capacity_limit
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Tank;

    fn ship(volumes: &[f64]) -> Ship {
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

    fn cargo(volume: f64) -> Cargo {
        Cargo::new(
            String::new(),
            "FUEL OIL".to_string(),
            Some(volume),
            None,
            None,
            vec![],
            false,
        )
    }

    #[test]
    fn rejects_empty_ship_and_bad_volumes() {
        let settings = Settings::default();
        let empty = ship(&[]);
        assert!(matches!(
            validate(&empty, &[], &settings),
            Err(PlanningError::InvalidInput(_))
        ));

        let bad_tank = ship(&[1000.0, 0.0]);
        assert!(validate(&bad_tank, &[], &settings).is_err());

        let good = ship(&[1000.0, 1000.0]);
        assert!(matches!(
            validate(&good, &[cargo(-5.0)], &settings),
            Err(PlanningError::InvalidInput(_))
        ));
    }

    #[test]
    fn genetic_path_allows_ten_percent_slack() {
        let vessel = ship(&[1000.0, 1000.0]);
        let requests = vec![cargo(2100.0)];

        let mut settings = Settings::default();
        settings.optimization_algorithm = Algorithm::Genetic;
        assert!(validate(&vessel, &requests, &settings).is_ok());

        settings.optimization_algorithm = Algorithm::Advanced;
        assert!(matches!(
            validate(&vessel, &requests, &settings),
            Err(PlanningError::Infeasible(_))
        ));

        let over_slack = vec![cargo(2300.0)];
        settings.optimization_algorithm = Algorithm::Genetic;
        assert!(validate(&vessel, &over_slack, &settings).is_err());
    }
}
