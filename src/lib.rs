// Module declarations
pub mod config;
pub mod domain;
pub mod error;
pub mod evaluation;
pub mod fixtures;
pub mod runner;
pub mod settings;
pub mod solver;
pub mod storage;

// Engine surface
pub use domain::types::{merge_fixed, Assignment, Cargo, Plan, Receiver, Ship, Tank};
pub use error::PlanningError;
pub use evaluation::score::{score_plan, unfulfilled};
pub use evaluation::validate::validate;
pub use settings::{Algorithm, Settings};
pub use solver::{optimize, optimize_with_retries, optimize_with_rng};
