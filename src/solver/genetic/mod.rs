use std::collections::{HashMap, HashSet};

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{debug, span, Level};

use crate::config::constant::QTY_EPSILON;
use crate::domain::types::{Assignment, Cargo, Plan, Ship};
use crate::evaluation::fitness::{find_fitness, FitnessEnv};
use crate::settings::Settings;
use crate::solver::mandatory::place_mandatory;

pub mod chromosome;
pub mod operators;
pub mod repair;

use chromosome::Chromosome;

/// Genetic-algorithm solver for the regular-cargo assignment space.
///
/// Mandatory cargoes are pre-placed by the shared best-fit greedy pass;
/// the tanks they occupy leave the gene vector entirely, so the search only
/// ever sees the residual ship. Every random decision flows through the
/// injected RNG, making runs reproducible from the seed.
pub struct GeneticSolver<'a> {
    pub(crate) ship: &'a Ship,
    pub(crate) settings: &'a Settings,
    cargo_requests: Vec<Cargo>,
    pub(crate) regular: Vec<Cargo>,
    mandatory: Vec<Cargo>,
    excluded_tanks: HashSet<String>,
    blocked_tanks: HashSet<String>,
    pub(crate) tank_ids: Vec<String>,
    pub(crate) tank_volumes: HashMap<String, f64>,
    mandatory_assignments: HashMap<String, Assignment>,
    total_rows: usize,
    ideal_lcg: f64,
}

impl<'a> GeneticSolver<'a> {
    pub fn new(
        ship: &'a Ship,
        cargoes: &[Cargo],
        excluded_tanks: &HashSet<String>,
        fixed_assignments: &HashMap<String, Assignment>,
        settings: &'a Settings,
    ) -> Self {
        let mut blocked_tanks = excluded_tanks.clone();
        blocked_tanks.extend(fixed_assignments.keys().cloned());

        let total_rows = ship.total_rows();
        let ideal_lcg = settings
            .ga_ideal_lcg_position
            .unwrap_or(total_rows as f64 / 2.0);

        GeneticSolver {
            ship,
            settings,
            cargo_requests: cargoes.to_vec(),
            regular: cargoes.iter().filter(|c| !c.is_mandatory).cloned().collect(),
            mandatory: cargoes.iter().filter(|c| c.is_mandatory).cloned().collect(),
            excluded_tanks: excluded_tanks.clone(),
            blocked_tanks,
            tank_ids: Vec::new(),
            tank_volumes: HashMap::new(),
            mandatory_assignments: HashMap::new(),
            total_rows,
            ideal_lcg,
        }
    }

    pub fn optimize(&mut self, rng: &mut ChaCha8Rng) -> Plan {
        let span = span!(
            Level::DEBUG,
            "genetic_solver",
            population = self.settings.ga_population_size,
            max_generations = self.settings.ga_max_generations
        );
        let _guard = span.enter();

        // Mandatory cargoes first, on the full non-blocked capacity.
        let mut available: HashMap<String, f64> = self
            .ship
            .tanks
            .iter()
            .filter(|tank| !self.blocked_tanks.contains(&tank.id))
            .map(|tank| (tank.id.clone(), tank.volume))
            .collect();
        if !self.mandatory.is_empty() {
            let mandatory: Vec<&Cargo> = self.mandatory.iter().collect();
            self.mandatory_assignments = place_mandatory(
                self.ship,
                &mandatory,
                &mut available,
                self.settings.min_utilization,
            );
        }

        // Gene vector: non-blocked tanks without a mandatory assignment,
        // in hull order, with whatever capacity the mandatory pass left.
        self.tank_ids = self
            .ship
            .tanks
            .iter()
            .filter(|tank| {
                available.contains_key(&tank.id)
                    && !self.mandatory_assignments.contains_key(&tank.id)
            })
            .map(|tank| tank.id.clone())
            .collect();
        self.tank_volumes = self
            .tank_ids
            .iter()
            .map(|id| (id.clone(), available[id]))
            .collect();

        if self.regular.is_empty() {
            let mut plan = self.base_plan();
            for assignment in self.mandatory_assignments.values() {
                plan.add_assignment(assignment.clone());
            }
            return plan;
        }

        let population_size = self.settings.ga_population_size;
        let env = self.fitness_env();

        let mut population: Vec<Chromosome> = (0..population_size)
            .map(|_| {
                let mut chromosome = self.random_chromosome(rng);
                self.repair(&mut chromosome);
                chromosome
            })
            .collect();
        let mut fitness: Vec<f64> = population
            .par_iter()
            .map(|chromosome| find_fitness(chromosome, &env))
            .collect();

        let (best_index, mut best_fitness) = argmax(&fitness);
        let mut best_chromosome = population[best_index].clone();
        let mut history = vec![best_fitness];

        for generation in 0..self.settings.ga_max_generations {
            let mut next = Vec::with_capacity(population_size);

            if self.settings.ga_use_elitism {
                let mut order: Vec<usize> = (0..population.len()).collect();
                order.sort_by(|&a, &b| fitness[b].total_cmp(&fitness[a]));
                for &index in order
                    .iter()
                    .take(self.settings.ga_elitism_count.min(population.len()))
                {
                    next.push(population[index].clone());
                }
            }

            while next.len() < population_size {
                let parent1 = self.tournament_selection(&population, &fitness, rng);
                let parent2 = self.tournament_selection(&population, &fitness, rng);

                let (mut offspring1, mut offspring2) =
                    if rng.gen::<f64>() < self.settings.ga_crossover_rate {
                        self.two_point_crossover(&parent1, &parent2, rng)
                    } else {
                        (parent1.clone(), parent2.clone())
                    };

                if rng.gen::<f64>() < self.settings.ga_mutation_rate {
                    offspring1 = self.mutate(offspring1, rng);
                }
                if rng.gen::<f64>() < self.settings.ga_mutation_rate {
                    offspring2 = self.mutate(offspring2, rng);
                }

                next.push(offspring1);
                if next.len() < population_size {
                    next.push(offspring2);
                }
            }
            next.truncate(population_size);

            fitness = next
                .par_iter()
                .map(|chromosome| find_fitness(chromosome, &env))
                .collect();

            let (generation_best, generation_fitness) = argmax(&fitness);
            if generation_fitness > best_fitness {
                best_fitness = generation_fitness;
                best_chromosome = next[generation_best].clone();
            }
            history.push(best_fitness);
            population = next;

            if history.len() >= self.settings.ga_convergence_generations {
                let window_start = history.len() - self.settings.ga_convergence_generations;
                let improvement = history[history.len() - 1] - history[window_start];
                if improvement < self.settings.ga_convergence_threshold {
                    debug!(generation, best_fitness, "search converged");
                    break;
                }
            }
        }

        let mut plan = self.chromosome_to_plan(&best_chromosome);
        self.post_fill(&mut plan);
        plan
    }

    pub(crate) fn fitness_env(&self) -> FitnessEnv<'a> {
        FitnessEnv {
            ship: self.ship,
            symmetry_coef: self.settings.ga_symmetry_penalty_coef,
            trim_coef: self.settings.ga_trim_penalty_coef,
            operational_coef: self.settings.ga_operational_penalty_coef,
            ideal_lcg: self.ideal_lcg,
            total_rows: self.total_rows,
        }
    }

    fn base_plan(&self) -> Plan {
        let mut plan = Plan::new(self.ship, self.cargo_requests.clone());
        plan.excluded_tanks = self.excluded_tanks.clone();
        plan
    }

    /// Sprinkle each cargo over random tanks, stacking onto same-cargo
    /// tanks where possible, until the volume is gone or attempts run out.
    pub(crate) fn random_chromosome(&self, rng: &mut ChaCha8Rng) -> Chromosome {
        let tank_count = self.tank_ids.len();
        let mut genes: Vec<(Option<String>, f64)> = vec![(None, 0.0); tank_count];

        for cargo in &self.regular {
            let mut remaining = cargo.requested_volume;
            let max_attempts = tank_count * 2;
            let mut attempts = 0;

            while remaining > QTY_EPSILON && attempts < max_attempts {
                attempts += 1;
                let index = rng.gen_range(0..tank_count);
                let volume = self.tank_volumes[&self.tank_ids[index]];
                let (current_cargo, current_qty) = genes[index].clone();

                let matches = match &current_cargo {
                    None => true,
                    Some(id) => id == &cargo.id,
                };
                if !matches {
                    continue;
                }

                let headroom = volume - current_qty;
                let add = remaining.min(headroom);
                if add > QTY_EPSILON {
                    genes[index] = (Some(cargo.id.clone()), current_qty + add);
                    remaining -= add;
                }
            }
        }

        Chromosome::new(genes, self.tank_ids.clone())
    }

    fn chromosome_to_plan(&self, chromosome: &Chromosome) -> Plan {
        let mut plan = self.base_plan();

        for assignment in self.mandatory_assignments.values() {
            plan.add_assignment(assignment.clone());
        }

        for (index, (cargo_id, quantity)) in chromosome.genes.iter().enumerate() {
            let Some(cargo_id) = cargo_id else { continue };
            if *quantity <= QTY_EPSILON {
                continue;
            }
            plan.add_assignment(Assignment {
                tank_id: chromosome.tank_id(index).to_string(),
                cargo_id: cargo_id.clone(),
                quantity_loaded: *quantity,
            });
        }

        plan
    }

    /// Post-GA pass: any tank still empty is offered to the regular cargo
    /// with the largest unmet volume, smallest usable tank first.
    fn post_fill(&self, plan: &mut Plan) {
        let min_utilization = self.settings.min_utilization;

        let mut remaining_cargoes: Vec<(&Cargo, f64)> = self
            .regular
            .iter()
            .filter_map(|cargo| {
                let remaining = cargo.requested_volume - plan.cargo_total_loaded(&cargo.id);
                if remaining > QTY_EPSILON {
                    Some((cargo, remaining))
                } else {
                    None
                }
            })
            .collect();
        if remaining_cargoes.is_empty() {
            return;
        }
        remaining_cargoes.sort_by(|a, b| b.1.total_cmp(&a.1));

        for (cargo, mut remaining) in remaining_cargoes {
            let mut empty_tanks: Vec<_> = self
                .ship
                .tanks
                .iter()
                .filter(|tank| {
                    self.tank_ids.contains(&tank.id) && plan.assignment(&tank.id).is_none()
                })
                .collect();
            if empty_tanks.is_empty() {
                break;
            }
            empty_tanks.sort_by(|a, b| a.volume.total_cmp(&b.volume));

            for tank in empty_tanks {
                if remaining < QTY_EPSILON {
                    break;
                }
                let quantity = remaining.min(tank.volume);
                if quantity / tank.volume < min_utilization {
                    continue;
                }
                plan.add_assignment(Assignment {
                    tank_id: tank.id.clone(),
                    cargo_id: cargo.id.clone(),
                    quantity_loaded: quantity,
                });
                remaining -= quantity;
            }
        }
    }
}

fn argmax(values: &[f64]) -> (usize, f64) {
    let mut best_index = 0;
    let mut best_value = f64::NEG_INFINITY;
    for (index, &value) in values.iter().enumerate() {
        if value > best_value {
            best_index = index;
            best_value = value;
        }
    }
    (best_index, best_value)
}
