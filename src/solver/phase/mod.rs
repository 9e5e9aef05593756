use std::collections::{HashMap, HashSet};

use tracing::{debug, span, Level};

use crate::config::constant::QTY_EPSILON;
use crate::domain::geometry::bow_or_stern_only;
use crate::domain::types::{Assignment, Cargo, Plan, Ship, Tank};
use crate::error::PlanningError;
use crate::evaluation::score::score_plan;
use crate::settings::Settings;

pub mod cascade;
pub mod distribute;

/// Deterministic 8-phase solver (FAZ 0-7).
///
/// Mandatory cargoes are placed first with retry relaxation, then the
/// regular cargoes walk the 1..7 phase cascade: exact single-tank fits,
/// symmetric pairs, triplets, paired quads, 3+2 quintets, triple pairs and
/// finally a greedy multi-tank sweep. The working capacity table and the
/// in-progress plan are owned by the solver frame; inputs are borrowed
/// read-only.
pub struct PhaseSolver<'a> {
    pub(crate) ship: &'a Ship,
    pub(crate) settings: &'a Settings,
    pub(crate) available: HashMap<String, f64>,
    pub(crate) plan: Plan,
}

impl<'a> PhaseSolver<'a> {
    pub fn new(
        ship: &'a Ship,
        cargoes: &[Cargo],
        excluded_tanks: &HashSet<String>,
        fixed_assignments: &HashMap<String, Assignment>,
        settings: &'a Settings,
    ) -> Self {
        // Fixed tanks are simply unavailable; the caller merges them back.
        let available = ship
            .tanks
            .iter()
            .filter(|tank| {
                !excluded_tanks.contains(&tank.id) && !fixed_assignments.contains_key(&tank.id)
            })
            .map(|tank| (tank.id.clone(), tank.volume))
            .collect();

        let mut plan = Plan::new(ship, cargoes.to_vec());
        plan.excluded_tanks = excluded_tanks.clone();

        PhaseSolver {
            ship,
            settings,
            available,
            plan,
        }
    }

    pub fn solve(mut self) -> Plan {
        let span = span!(Level::DEBUG, "phase_solver", cargoes = self.plan.cargo_requests.len());
        let _guard = span.enter();

        let cargoes = self.plan.cargo_requests.clone();
        let mandatory: Vec<&Cargo> = cargoes.iter().filter(|c| c.is_mandatory).collect();
        let regular: Vec<&Cargo> = cargoes.iter().filter(|c| !c.is_mandatory).collect();

        if !mandatory.is_empty() {
            self.place_mandatory_with_retry(&mandatory);
        }

        let mut pending = regular;
        for k in 1..=7 {
            pending.retain(|cargo| {
                self.plan.cargo_total_loaded(&cargo.id) < cargo.requested_volume - QTY_EPSILON
            });
            if pending.is_empty() {
                break;
            }

            for cargo in &pending {
                let remaining =
                    cargo.requested_volume - self.plan.cargo_total_loaded(&cargo.id);
                if remaining < QTY_EPSILON {
                    continue;
                }
                if let Some(placements) = self.try_phase(k, remaining, None) {
                    debug!(
                        phase = k,
                        cargo = %cargo.kind_label,
                        tanks = placements.len(),
                        "placed cargo"
                    );
                    self.commit(cargo, &placements);
                }
            }
        }

        self.plan
    }

    /// FAZ 0: mandatory cargoes must be placed in full. The phase matching
    /// the estimated tank count is retried at tolerances `0, inc, 2*inc, ..`
    /// up to the maximum relaxation, then every phase is tried once at the
    /// maximum. A 4-tank acceptance is re-checked against the bow/stern
    /// clustering prohibition at every step.
    fn place_mandatory_with_retry(&mut self, mandatory: &[&Cargo]) {
        let increment = self.settings.mandatory_retry_increment;
        let max_relaxation = self.settings.mandatory_max_relaxation;
        let attempts = (max_relaxation / increment) as usize + 1;

        for cargo in mandatory {
            let remaining = cargo.requested_volume;
            let mut placed = false;

            for attempt in 0..attempts {
                let tolerance = attempt as f64 * increment;

                let max_capacity = self
                    .available
                    .values()
                    .fold(0.0_f64, |acc, &capacity| acc.max(capacity));
                if max_capacity <= 0.0 {
                    break;
                }
                let k = ((remaining / max_capacity).ceil() as usize).max(1);

                if self.try_accept_mandatory(cargo, remaining, k, tolerance) {
                    placed = true;
                    break;
                }
                if tolerance >= max_relaxation {
                    break;
                }
            }

            if !placed {
                for k in 1..=7 {
                    if self.try_accept_mandatory(cargo, remaining, k, max_relaxation) {
                        placed = true;
                        break;
                    }
                }
            }

            if !placed {
                debug!(cargo = %cargo.kind_label, "mandatory cargo could not be fully placed");
            }
        }
    }

    fn try_accept_mandatory(
        &mut self,
        cargo: &Cargo,
        remaining: f64,
        k: usize,
        tolerance: f64,
    ) -> bool {
        let Some(placements) = self.try_phase(k, remaining, Some(tolerance)) else {
            return false;
        };

        let total: f64 = placements.iter().map(|(_, quantity)| quantity).sum();
        if total < remaining - QTY_EPSILON {
            return false;
        }

        if placements.len() == 4 {
            let tank_ids: Vec<String> = placements.iter().map(|(id, _)| id.clone()).collect();
            if bow_or_stern_only(self.ship, &tank_ids) {
                return false;
            }
        }

        self.commit(cargo, &placements);
        true
    }

    pub(crate) fn actual_available(&self, tank: &Tank) -> f64 {
        match self.plan.assignment(&tank.id) {
            Some(assignment) => (tank.volume - assignment.quantity_loaded).max(0.0),
            None => self
                .available
                .get(&tank.id)
                .copied()
                .unwrap_or(0.0)
                .min(tank.volume),
        }
    }

    fn commit(&mut self, cargo: &Cargo, placements: &[(String, f64)]) {
        for (tank_id, quantity) in placements {
            self.plan.add_assignment(Assignment {
                tank_id: tank_id.clone(),
                cargo_id: cargo.id.clone(),
                quantity_loaded: *quantity,
            });
            if let Some(capacity) = self.available.get_mut(tank_id) {
                *capacity -= quantity;
                if *capacity < QTY_EPSILON {
                    *capacity = 0.0;
                }
            }
        }
    }
}

/// Cargo orderings explored by the retry orchestrator, tried in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OrderingStrategy {
    QuantityDesc,
    ReceiverCountDesc,
    MandatoryFirst,
    QuantityAsc,
    Mixed,
}

const STRATEGIES: [OrderingStrategy; 5] = [
    OrderingStrategy::QuantityDesc,
    OrderingStrategy::ReceiverCountDesc,
    OrderingStrategy::MandatoryFirst,
    OrderingStrategy::QuantityAsc,
    OrderingStrategy::Mixed,
];

impl OrderingStrategy {
    fn apply(&self, cargoes: &[Cargo]) -> Vec<Cargo> {
        let mut ordered = cargoes.to_vec();
        match self {
            OrderingStrategy::QuantityDesc => {
                ordered.sort_by(|a, b| b.requested_volume.total_cmp(&a.requested_volume));
            }
            OrderingStrategy::ReceiverCountDesc => {
                ordered.sort_by(|a, b| b.receiver_count().cmp(&a.receiver_count()));
            }
            OrderingStrategy::MandatoryFirst => {
                ordered.sort_by(|a, b| {
                    b.is_mandatory
                        .cmp(&a.is_mandatory)
                        .then(b.requested_volume.total_cmp(&a.requested_volume))
                });
            }
            OrderingStrategy::QuantityAsc => {
                ordered.sort_by(|a, b| a.requested_volume.total_cmp(&b.requested_volume));
            }
            OrderingStrategy::Mixed => {
                ordered.sort_by(|a, b| {
                    b.is_mandatory
                        .cmp(&a.is_mandatory)
                        .then(a.receiver_count().cmp(&b.receiver_count()))
                        .then(b.requested_volume.total_cmp(&a.requested_volume))
                });
            }
        }
        ordered
    }
}

/// Run the phase solver under up to `num_retries` cargo orderings and keep
/// the plan with the highest composite score. Individual strategies never
/// poison the whole call; with no usable strategy result the plain
/// input-order solve is returned instead.
pub fn optimize_with_retries(
    ship: &Ship,
    cargoes: &[Cargo],
    excluded_tanks: &HashSet<String>,
    fixed_assignments: &HashMap<String, Assignment>,
    num_retries: usize,
    settings: &Settings,
) -> Result<Plan, PlanningError> {
    settings.validate()?;

    let mut best: Option<(Plan, f64)> = None;
    for strategy in STRATEGIES.iter().take(num_retries) {
        let ordered = strategy.apply(cargoes);
        let plan =
            PhaseSolver::new(ship, &ordered, excluded_tanks, fixed_assignments, settings).solve();
        let score = score_plan(&plan, ship);
        debug!(?strategy, score, "retry strategy finished");

        if best.as_ref().map_or(true, |(_, s)| score > *s) {
            best = Some((plan, score));
        }
    }

    Ok(match best {
        Some((plan, _)) => plan,
        None => PhaseSolver::new(ship, cargoes, excluded_tanks, fixed_assignments, settings).solve(),
    })
}
