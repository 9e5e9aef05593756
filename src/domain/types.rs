use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::constant::QTY_EPSILON;

/// A cargo receiver, identified by name only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receiver {
    pub name: String,
}

/// A cargo loading request.
///
/// `requested_volume` is the single source of truth for how much must be
/// loaded. It is derived from `ton / density` exactly once, at construction,
/// and only when no positive volume was supplied. A stored positive volume
/// always wins on reload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cargo {
    pub id: String,
    pub kind_label: String,
    pub requested_volume: f64,
    pub ton: Option<f64>,
    pub density: Option<f64>,
    pub receivers: Vec<Receiver>,
    pub is_mandatory: bool,
}

impl Cargo {
    pub fn new(
        id: String,
        kind_label: String,
        requested_volume: Option<f64>,
        ton: Option<f64>,
        density: Option<f64>,
        receivers: Vec<Receiver>,
        is_mandatory: bool,
    ) -> Self {
        let requested_volume = match requested_volume {
            Some(volume) if volume > 0.0 => volume,
            other => match (ton, density) {
                (Some(ton), Some(density)) if density > 0.0 => ton / density,
                _ => other.unwrap_or(0.0),
            },
        };

        Cargo {
            id: if id.is_empty() {
                Uuid::new_v4().to_string()
            } else {
                id
            },
            kind_label,
            requested_volume,
            ton,
            density,
            receivers,
            is_mandatory,
        }
    }

    pub fn receiver_count(&self) -> usize {
        self.receivers.len()
    }
}

// Deserialization funnels through `Cargo::new` so the ton/density derivation
// rule holds for loaded records too: a positive stored volume is preserved
// bit-exact, a missing or zero volume is derived.
#[derive(Deserialize)]
struct CargoRecord {
    #[serde(default)]
    id: String,
    kind_label: String,
    #[serde(default)]
    requested_volume: f64,
    #[serde(default)]
    ton: Option<f64>,
    #[serde(default)]
    density: Option<f64>,
    #[serde(default)]
    receivers: Vec<Receiver>,
    #[serde(default)]
    is_mandatory: bool,
}

impl<'de> Deserialize<'de> for Cargo {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let record = CargoRecord::deserialize(deserializer)?;
        Ok(Cargo::new(
            record.id,
            record.kind_label,
            Some(record.requested_volume),
            record.ton,
            record.density,
            record.receivers,
            record.is_mandatory,
        ))
    }
}

/// A single storage tank with a fixed volume. Position along the hull is
/// not stored here; it is derived from the tank's index in `Ship::tanks`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tank {
    pub id: String,
    pub name: String,
    pub volume: f64,
}

/// A ship as an ordered sequence of tanks. Order encodes geometry: the tank
/// at index `i` sits in row `i / 2 + 1`, port side when `i` is even.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ship {
    pub id: String,
    pub name: String,
    pub tanks: Vec<Tank>,
}

impl Ship {
    pub fn total_capacity(&self) -> f64 {
        self.tanks.iter().map(|tank| tank.volume).sum()
    }

    pub fn tank_by_id(&self, tank_id: &str) -> Option<&Tank> {
        self.tanks.iter().find(|tank| tank.id == tank_id)
    }

    pub fn total_rows(&self) -> usize {
        (self.tanks.len() + 1) / 2
    }
}

/// One cargo-to-tank assignment. Cargoes are referenced by id; the cargo
/// table lives in the plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub tank_id: String,
    pub cargo_id: String,
    pub quantity_loaded: f64,
}

/// A stowage plan: the cargo request table plus at most one assignment per
/// tank. Only `assignments` mutates while a solver is running.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    pub name: String,
    pub ship_ref: String,
    pub cargo_requests: Vec<Cargo>,
    pub assignments: HashMap<String, Assignment>,
    #[serde(default)]
    pub excluded_tanks: HashSet<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub notes: String,
}

impl Plan {
    pub fn new(ship: &Ship, cargo_requests: Vec<Cargo>) -> Self {
        let created_at = Utc::now();
        Plan {
            id: Uuid::new_v4().to_string(),
            name: created_at.format("Plan_%Y%m%d_%H%M%S").to_string(),
            ship_ref: ship.id.clone(),
            cargo_requests,
            assignments: HashMap::new(),
            excluded_tanks: HashSet::new(),
            created_at,
            notes: String::new(),
        }
    }

    /// Add or replace the assignment for a tank.
    pub fn add_assignment(&mut self, assignment: Assignment) {
        self.assignments
            .insert(assignment.tank_id.clone(), assignment);
    }

    pub fn assignment(&self, tank_id: &str) -> Option<&Assignment> {
        self.assignments.get(tank_id)
    }

    pub fn total_loaded(&self) -> f64 {
        self.assignments
            .values()
            .map(|assignment| assignment.quantity_loaded)
            .sum()
    }

    pub fn cargo_total_loaded(&self, cargo_id: &str) -> f64 {
        self.assignments
            .values()
            .filter(|assignment| assignment.cargo_id == cargo_id)
            .map(|assignment| assignment.quantity_loaded)
            .sum()
    }

    /// Cargoes that still have volume left to place, with `requested_volume`
    /// adjusted down to the outstanding remainder. Caller-held fixed
    /// assignments count towards the loaded totals.
    pub fn remaining_cargoes(&self, fixed: &HashMap<String, Assignment>) -> Vec<Cargo> {
        self.cargo_requests
            .iter()
            .filter_map(|cargo| {
                let mut loaded = self.cargo_total_loaded(&cargo.id);
                loaded += fixed
                    .values()
                    .filter(|assignment| assignment.cargo_id == cargo.id)
                    .map(|assignment| assignment.quantity_loaded)
                    .sum::<f64>();

                let remaining = cargo.requested_volume - loaded;
                if remaining > QTY_EPSILON {
                    Some(Cargo {
                        requested_volume: remaining,
                        ..cargo.clone()
                    })
                } else {
                    None
                }
            })
            .collect()
    }

    /// Tanks still open for planning. Only fixed and excluded tanks are
    /// removed; earlier engine output is not, so a host can re-plan remaining
    /// cargoes over the same tank set as many times as it likes.
    pub fn remaining_tanks<'a>(
        &self,
        ship: &'a Ship,
        fixed: &HashMap<String, Assignment>,
        excluded: &HashSet<String>,
    ) -> Vec<&'a Tank> {
        ship.tanks
            .iter()
            .filter(|tank| !fixed.contains_key(&tank.id) && !excluded.contains(&tank.id))
            .collect()
    }
}

/// Compose an engine-produced plan with the caller's fixed assignments.
/// The engine never re-emits fixed tanks, so this is a plain merge.
pub fn merge_fixed(mut plan: Plan, fixed: &HashMap<String, Assignment>) -> Plan {
    for assignment in fixed.values() {
        plan.add_assignment(assignment.clone());
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cargo_with_volume(id: &str, volume: f64) -> Cargo {
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
    fn volume_derived_from_ton_and_density_when_absent() {
        let cargo = Cargo::new(
            "c1".to_string(),
            "GASOIL".to_string(),
            None,
            Some(850.0),
            Some(0.85),
            vec![],
            false,
        );
        assert_eq!(cargo.requested_volume, 1000.0);

        let zero_volume = Cargo::new(
            "c2".to_string(),
            "GASOIL".to_string(),
            Some(0.0),
            Some(850.0),
            Some(0.85),
            vec![],
            false,
        );
        assert_eq!(zero_volume.requested_volume, 1000.0);
    }

    #[test]
    fn explicit_volume_wins_over_ton_and_density() {
        let cargo = Cargo::new(
            "c1".to_string(),
            "GASOIL".to_string(),
            Some(123.456),
            Some(850.0),
            Some(0.85),
            vec![],
            false,
        );
        assert_eq!(cargo.requested_volume, 123.456);
    }

    #[test]
    fn stored_volume_survives_serde_round_trip_bit_exact() {
        let mut cargo = cargo_with_volume("c1", 0.1 + 0.2); // deliberately non-round
        cargo.ton = Some(900.0);
        cargo.density = Some(0.9);

        let raw = serde_json::to_string(&cargo).unwrap();
        let back: Cargo = serde_json::from_str(&raw).unwrap();
        assert_eq!(back.requested_volume.to_bits(), cargo.requested_volume.to_bits());
    }

    #[test]
    fn deserialized_zero_volume_is_derived() {
        let raw = r#"{"kind_label": "NAPHTHA", "ton": 850.0, "density": 0.85}"#;
        let cargo: Cargo = serde_json::from_str(raw).unwrap();
        assert_eq!(cargo.requested_volume, 1000.0);
        assert!(!cargo.id.is_empty());
    }

    #[test]
    fn plan_without_excluded_tanks_field_loads_as_empty() {
        let ship = Ship {
            id: "s1".to_string(),
            name: "MT TEST".to_string(),
            tanks: vec![Tank {
                id: "t1".to_string(),
                name: "1P".to_string(),
                volume: 1000.0,
            }],
        };
        let plan = Plan::new(&ship, vec![cargo_with_volume("c1", 500.0)]);
        let mut value = serde_json::to_value(&plan).unwrap();
        value.as_object_mut().unwrap().remove("excluded_tanks");

        let back: Plan = serde_json::from_value(value).unwrap();
        assert!(back.excluded_tanks.is_empty());
        assert_eq!(back.cargo_requests, plan.cargo_requests);
    }

    #[test]
    fn merge_fixed_composes_assignments() {
        let ship = Ship {
            id: "s1".to_string(),
            name: "MT TEST".to_string(),
            tanks: vec![
                Tank {
                    id: "t1".to_string(),
                    name: "1P".to_string(),
                    volume: 1000.0,
                },
                Tank {
                    id: "t2".to_string(),
                    name: "1S".to_string(),
                    volume: 1000.0,
                },
            ],
        };
        let mut plan = Plan::new(&ship, vec![cargo_with_volume("c1", 1500.0)]);
        plan.add_assignment(Assignment {
            tank_id: "t2".to_string(),
            cargo_id: "c1".to_string(),
            quantity_loaded: 800.0,
        });

        let mut fixed = HashMap::new();
        fixed.insert(
            "t1".to_string(),
            Assignment {
                tank_id: "t1".to_string(),
                cargo_id: "c1".to_string(),
                quantity_loaded: 700.0,
            },
        );

        let merged = merge_fixed(plan, &fixed);
        assert_eq!(merged.assignments.len(), 2);
        assert_eq!(merged.total_loaded(), 1500.0);
    }

    #[test]
    fn remaining_cargoes_accounts_for_fixed_assignments() {
        let ship = Ship {
            id: "s1".to_string(),
            name: "MT TEST".to_string(),
            tanks: vec![Tank {
                id: "t1".to_string(),
                name: "1P".to_string(),
                volume: 1000.0,
            }],
        };
        let plan = Plan::new(&ship, vec![cargo_with_volume("c1", 1000.0)]);

        let mut fixed = HashMap::new();
        fixed.insert(
            "t1".to_string(),
            Assignment {
                tank_id: "t1".to_string(),
                cargo_id: "c1".to_string(),
                quantity_loaded: 400.0,
            },
        );

        let remaining = plan.remaining_cargoes(&fixed);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].requested_volume, 600.0);

        let open_tanks = plan.remaining_tanks(&ship, &fixed, &HashSet::new());
        assert!(open_tanks.is_empty());
    }
}
