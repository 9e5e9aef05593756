use crate::domain::types::Ship;
use crate::evaluation::penalty::{operational_penalty, symmetry_penalty, trim_penalty};
use crate::solver::genetic::chromosome::Chromosome;

/// Everything the fitness function needs besides the chromosome itself.
/// Shared read-only across the population, so evaluation can run in parallel.
#[derive(Debug, Clone, Copy)]
pub struct FitnessEnv<'a> {
    pub ship: &'a Ship,
    pub symmetry_coef: f64,
    pub trim_coef: f64,
    pub operational_coef: f64,
    pub ideal_lcg: f64,
    pub total_rows: usize,
}

/// Fitness of a chromosome, higher is better:
/// total loaded volume minus the symmetry, trim and operational penalties.
pub fn find_fitness(chromosome: &Chromosome, env: &FitnessEnv<'_>) -> f64 {
    chromosome.total_loaded()
        - symmetry_penalty(chromosome, env.ship, env.symmetry_coef)
        - trim_penalty(
            chromosome,
            env.ship,
            env.trim_coef,
            env.ideal_lcg,
            env.total_rows,
        )
        - operational_penalty(chromosome, env.operational_coef)
}
