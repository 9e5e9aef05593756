//! JSON record encoding for ships, plans and settings. The engine itself
//! performs no I/O; hosts read and write these strings wherever they like.
//!
//! Loading is backward compatible: a plan without an `excluded_tanks` field
//! gets an empty set, a settings record fills missing keys from the
//! defaults, and a cargo's stored positive `requested_volume` is never
//! recomputed from ton and density.

use crate::domain::types::{Plan, Ship};
use crate::settings::Settings;

pub fn encode_ship(ship: &Ship) -> serde_json::Result<String> {
    serde_json::to_string_pretty(ship)
}

pub fn decode_ship(raw: &str) -> serde_json::Result<Ship> {
    serde_json::from_str(raw)
}

pub fn encode_plan(plan: &Plan) -> serde_json::Result<String> {
    serde_json::to_string_pretty(plan)
}

pub fn decode_plan(raw: &str) -> serde_json::Result<Plan> {
    serde_json::from_str(raw)
}

pub fn encode_settings(settings: &Settings) -> serde_json::Result<String> {
    serde_json::to_string_pretty(settings)
}

pub fn decode_settings(raw: &str) -> serde_json::Result<Settings> {
    serde_json::from_str(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{Assignment, Cargo, Tank};

    fn demo_ship() -> Ship {
        Ship {
            id: "ship-1".to_string(),
            name: "MT KARADENIZ".to_string(),
            tanks: vec![
                Tank {
                    id: "t1".to_string(),
                    name: "1P".to_string(),
                    volume: 750.0,
                },
                Tank {
                    id: "t2".to_string(),
                    name: "1S".to_string(),
                    volume: 750.0,
                },
            ],
        }
    }

    #[test]
    fn ship_round_trip() {
        let ship = demo_ship();
        let raw = encode_ship(&ship).unwrap();
        let back = decode_ship(&raw).unwrap();
        assert_eq!(back, ship);
    }

    #[test]
    fn plan_round_trip_preserves_assignments_and_quantities() {
        let ship = demo_ship();
        let cargo = Cargo::new(
            "c1".to_string(),
            "JET A1".to_string(),
            Some(1234.5678),
            Some(987.0),
            Some(0.8),
            vec![],
            false,
        );
        let mut plan = Plan::new(&ship, vec![cargo]);
        plan.add_assignment(Assignment {
            tank_id: "t1".to_string(),
            cargo_id: "c1".to_string(),
            quantity_loaded: 617.2839,
        });
        plan.excluded_tanks.insert("t2".to_string());
        plan.notes = "trial loading".to_string();

        let raw = encode_plan(&plan).unwrap();
        let back = decode_plan(&raw).unwrap();

        assert_eq!(back.assignments, plan.assignments);
        assert_eq!(back.excluded_tanks, plan.excluded_tanks);
        assert_eq!(back.notes, plan.notes);
        // The stored volume wins over the ton/density pair.
        assert_eq!(
            back.cargo_requests[0].requested_volume.to_bits(),
            plan.cargo_requests[0].requested_volume.to_bits()
        );
    }

    #[test]
    fn settings_round_trip() {
        let mut settings = Settings::default();
        settings.ga_population_size = 123;
        settings.ga_ideal_lcg_position = Some(4.5);

        let raw = encode_settings(&settings).unwrap();
        let back = decode_settings(&raw).unwrap();
        assert_eq!(back, settings);
    }
}
