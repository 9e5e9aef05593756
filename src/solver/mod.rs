use std::collections::{HashMap, HashSet};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::constant::SEED;
use crate::domain::types::{Assignment, Cargo, Plan, Ship};
use crate::error::PlanningError;
use crate::settings::{Algorithm, Settings};

pub mod genetic;
pub mod mandatory;
pub mod phase;

pub use phase::optimize_with_retries;

/// Compute a stowage plan with the solver selected in `settings`.
///
/// The returned plan contains engine-placed assignments only: tanks named in
/// `excluded_tanks` or `fixed_assignments` are never touched, and merging the
/// fixed set back in is the caller's job (`merge_fixed`). Over-capacity input
/// is not an error; the plan simply comes back partial and `unfulfilled`
/// reports the shortfall.
pub fn optimize(
    ship: &Ship,
    cargoes: &[Cargo],
    excluded_tanks: &HashSet<String>,
    fixed_assignments: &HashMap<String, Assignment>,
    settings: &Settings,
) -> Result<Plan, PlanningError> {
    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    optimize_with_rng(
        ship,
        cargoes,
        excluded_tanks,
        fixed_assignments,
        settings,
        &mut rng,
    )
}

/// Same as `optimize` but with a caller-supplied RNG. Identical seed and
/// inputs reproduce the same assignments.
pub fn optimize_with_rng(
    ship: &Ship,
    cargoes: &[Cargo],
    excluded_tanks: &HashSet<String>,
    fixed_assignments: &HashMap<String, Assignment>,
    settings: &Settings,
    rng: &mut ChaCha8Rng,
) -> Result<Plan, PlanningError> {
    settings.validate()?;

    match settings.optimization_algorithm {
        Algorithm::Genetic => {
            let mut solver =
                genetic::GeneticSolver::new(ship, cargoes, excluded_tanks, fixed_assignments, settings);
            Ok(solver.optimize(rng))
        }
        Algorithm::Advanced => {
            let solver =
                phase::PhaseSolver::new(ship, cargoes, excluded_tanks, fixed_assignments, settings);
            Ok(solver.solve())
        }
    }
}
