use serde::{Deserialize, Serialize};

use crate::error::PlanningError;

/// Which solver `optimize` dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Genetic-algorithm search over the assignment space.
    Genetic,
    /// Deterministic 8-phase best-fit cascade.
    Advanced,
}

/// Optimization settings bag. Every field has a default, so partial
/// records load cleanly and old records keep working as options are added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub optimization_algorithm: Algorithm,
    /// Minimum per-tank fill fraction for any placement.
    pub min_utilization: f64,

    // Phase-solver tolerances
    pub faz1_single_tank_tolerance: f64,
    pub faz2_two_tank_tolerance: f64,
    pub faz2_asymmetric_tolerance_factor: f64,
    pub faz3_three_tank_tolerance: f64,
    pub faz4_four_tank_tolerance: f64,
    pub faz5_five_tank_tolerance: f64,
    pub mandatory_retry_increment: f64,
    pub mandatory_max_relaxation: f64,

    // Genetic-solver parameters
    pub ga_population_size: usize,
    pub ga_max_generations: usize,
    pub ga_crossover_rate: f64,
    pub ga_mutation_rate: f64,
    pub ga_tournament_size: usize,
    pub ga_use_elitism: bool,
    pub ga_elitism_count: usize,
    pub ga_symmetry_penalty_coef: f64,
    pub ga_trim_penalty_coef: f64,
    pub ga_operational_penalty_coef: f64,
    pub ga_receiver_tolerance: f64,
    /// Ideal longitudinal center of gravity in row units; `None` means the
    /// geometric center (`total_rows / 2`) of whatever ship is being solved.
    pub ga_ideal_lcg_position: Option<f64>,
    pub ga_convergence_threshold: f64,
    pub ga_convergence_generations: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            optimization_algorithm: Algorithm::Genetic,
            min_utilization: 0.65,
            faz1_single_tank_tolerance: 0.05,
            faz2_two_tank_tolerance: 0.05,
            faz2_asymmetric_tolerance_factor: 0.2,
            faz3_three_tank_tolerance: 0.04,
            faz4_four_tank_tolerance: 0.04,
            faz5_five_tank_tolerance: 0.04,
            mandatory_retry_increment: 0.01,
            mandatory_max_relaxation: 0.35,
            ga_population_size: 500,
            ga_max_generations: 2000,
            ga_crossover_rate: 0.90,
            ga_mutation_rate: 0.11,
            ga_tournament_size: 3,
            ga_use_elitism: true,
            ga_elitism_count: 5,
            ga_symmetry_penalty_coef: 3000.0,
            ga_trim_penalty_coef: 1500.0,
            ga_operational_penalty_coef: 100.0,
            ga_receiver_tolerance: 0.03,
            ga_ideal_lcg_position: None,
            ga_convergence_threshold: 0.0001,
            ga_convergence_generations: 60,
        }
    }
}

impl Settings {
    /// Structural validation. The solvers tolerate over-capacity inputs and
    /// return partial plans, but they refuse to start on a broken settings bag.
    pub fn validate(&self) -> Result<(), PlanningError> {
        fn fraction(name: &str, value: f64) -> Result<(), PlanningError> {
            if !(0.0..=1.0).contains(&value) {
                return Err(PlanningError::InvalidSettings(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
            Ok(())
        }

        if !(self.min_utilization > 0.0 && self.min_utilization <= 1.0) {
            return Err(PlanningError::InvalidSettings(format!(
                "min_utilization must be within (0, 1], got {}",
                self.min_utilization
            )));
        }

        for (name, value) in [
            ("faz1_single_tank_tolerance", self.faz1_single_tank_tolerance),
            ("faz2_two_tank_tolerance", self.faz2_two_tank_tolerance),
            (
                "faz2_asymmetric_tolerance_factor",
                self.faz2_asymmetric_tolerance_factor,
            ),
            ("faz3_three_tank_tolerance", self.faz3_three_tank_tolerance),
            ("faz4_four_tank_tolerance", self.faz4_four_tank_tolerance),
            ("faz5_five_tank_tolerance", self.faz5_five_tank_tolerance),
            ("mandatory_max_relaxation", self.mandatory_max_relaxation),
        ] {
            if value < 0.0 {
                return Err(PlanningError::InvalidSettings(format!(
                    "{} must be non-negative, got {}",
                    name, value
                )));
            }
        }

        if self.mandatory_retry_increment <= 0.0 {
            return Err(PlanningError::InvalidSettings(format!(
                "mandatory_retry_increment must be positive, got {}",
                self.mandatory_retry_increment
            )));
        }

        if self.ga_population_size == 0 {
            return Err(PlanningError::InvalidSettings(
                "ga_population_size must be at least 1".to_string(),
            ));
        }
        if self.ga_tournament_size == 0 {
            return Err(PlanningError::InvalidSettings(
                "ga_tournament_size must be at least 1".to_string(),
            ));
        }
        if self.ga_convergence_generations == 0 {
            return Err(PlanningError::InvalidSettings(
                "ga_convergence_generations must be at least 1".to_string(),
            ));
        }

        fraction("ga_crossover_rate", self.ga_crossover_rate)?;
        fraction("ga_mutation_rate", self.ga_mutation_rate)?;

        if !(0.0..1.0).contains(&self.ga_receiver_tolerance) {
            return Err(PlanningError::InvalidSettings(format!(
                "ga_receiver_tolerance must be within [0, 1), got {}",
                self.ga_receiver_tolerance
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut settings = Settings::default();
        settings.min_utilization = 0.0;
        assert!(matches!(
            settings.validate(),
            Err(PlanningError::InvalidSettings(_))
        ));

        let mut settings = Settings::default();
        settings.ga_crossover_rate = 1.5;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.ga_population_size = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.mandatory_retry_increment = 0.0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn partial_record_loads_with_defaults() {
        let raw = r#"{ "optimization_algorithm": "advanced", "min_utilization": 0.7 }"#;
        let settings: Settings = serde_json::from_str(raw).unwrap();
        assert_eq!(settings.optimization_algorithm, Algorithm::Advanced);
        assert_eq!(settings.min_utilization, 0.7);
        // Everything not present falls back to the defaults.
        assert_eq!(settings.ga_population_size, 500);
        assert_eq!(settings.ga_convergence_generations, 60);
    }
}
