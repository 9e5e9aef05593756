use std::collections::HashMap;

use tracing::debug;

use crate::config::constant::QTY_EPSILON;
use crate::domain::types::{Assignment, Cargo, Ship};

/// Pre-place mandatory cargoes by best-fit greedy, biggest remaining
/// capacity first. Runs before any regular-cargo placement; the consumed
/// capacity is subtracted from `available` so the main solve works on the
/// residual ship.
///
/// Mandatory quantities cannot be reduced, so a cargo that does not fit
/// leaves a shortfall the caller sees through `unfulfilled`.
pub fn place_mandatory(
    ship: &Ship,
    mandatory: &[&Cargo],
    available: &mut HashMap<String, f64>,
    min_utilization: f64,
) -> HashMap<String, Assignment> {
    let mut placed: HashMap<String, Assignment> = HashMap::new();

    for cargo in mandatory {
        let mut remaining = cargo.requested_volume;

        // Candidate tanks in hull order, then stable-sorted by remaining
        // capacity descending.
        let mut candidates: Vec<(&str, f64, f64)> = ship
            .tanks
            .iter()
            .filter_map(|tank| {
                let capacity = *available.get(&tank.id)?;
                if capacity > QTY_EPSILON {
                    Some((tank.id.as_str(), capacity, tank.volume))
                } else {
                    None
                }
            })
            .collect();
        candidates.sort_by(|a, b| b.1.total_cmp(&a.1));

        for (tank_id, capacity, volume) in candidates {
            if remaining < QTY_EPSILON {
                break;
            }

            let quantity = remaining.min(capacity).min(volume);
            if quantity / volume < min_utilization {
                continue;
            }

            placed.insert(
                tank_id.to_string(),
                Assignment {
                    tank_id: tank_id.to_string(),
                    cargo_id: cargo.id.clone(),
                    quantity_loaded: quantity,
                },
            );
            if let Some(entry) = available.get_mut(tank_id) {
                *entry -= quantity;
                if *entry < QTY_EPSILON {
                    *entry = 0.0;
                }
            }
            remaining -= quantity;
        }

        if remaining > QTY_EPSILON {
            debug!(
                cargo = %cargo.kind_label,
                remaining,
                "mandatory cargo not fully placed by greedy pass"
            );
        }
    }

    placed
}
