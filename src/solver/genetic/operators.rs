use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::config::constant::QTY_EPSILON;
use crate::solver::genetic::chromosome::Chromosome;
use crate::solver::genetic::GeneticSolver;

impl<'a> GeneticSolver<'a> {
    /// Tournament selection: sample `ga_tournament_size` contenders, the
    /// fittest one wins.
    pub fn tournament_selection(
        &self,
        population: &[Chromosome],
        fitness: &[f64],
        rng: &mut ChaCha8Rng,
    ) -> Chromosome {
        let size = self.settings.ga_tournament_size.min(population.len());
        let contenders = rand::seq::index::sample(rng, population.len(), size);

        let mut best_index = contenders.index(0);
        for index in contenders.iter().skip(1) {
            if fitness[index] > fitness[best_index] {
                best_index = index;
            }
        }
        population[best_index].clone()
    }

    /// Roulette-wheel selection, an alternative to the tournament: fitness
    /// scores are shifted positive and drawn proportionally.
    pub fn roulette_wheel_selection(
        &self,
        population: &[Chromosome],
        fitness: &[f64],
        rng: &mut ChaCha8Rng,
    ) -> Chromosome {
        let min_fitness = fitness.iter().copied().fold(f64::INFINITY, f64::min);
        let shifted: Vec<f64> = if min_fitness < 0.0 {
            fitness.iter().map(|f| f - min_fitness + 1.0).collect()
        } else {
            fitness.iter().map(|f| f + 1.0).collect()
        };

        match WeightedIndex::new(&shifted) {
            Ok(distribution) => population[distribution.sample(rng)].clone(),
            Err(_) => population[rng.gen_range(0..population.len())].clone(),
        }
    }

    /// Two-point crossover on the gene vector; both offspring are repaired.
    pub fn two_point_crossover(
        &self,
        parent1: &Chromosome,
        parent2: &Chromosome,
        rng: &mut ChaCha8Rng,
    ) -> (Chromosome, Chromosome) {
        if parent1.len() < 2 {
            return (parent1.clone(), parent2.clone());
        }

        let mut point1 = rng.gen_range(0..parent1.len());
        let mut point2 = rng.gen_range(0..parent1.len());
        if point1 > point2 {
            std::mem::swap(&mut point1, &mut point2);
        }

        let mut genes1 = parent1.genes.clone();
        let mut genes2 = parent2.genes.clone();
        for index in point1..point2 {
            std::mem::swap(&mut genes1[index], &mut genes2[index]);
        }

        let mut offspring1 = Chromosome::new(genes1, parent1.tank_ids().to_vec());
        let mut offspring2 = Chromosome::new(genes2, parent2.tank_ids().to_vec());
        self.repair(&mut offspring1);
        self.repair(&mut offspring2);
        (offspring1, offspring2)
    }

    /// Apply one of the three mutation operators, picked uniformly, then
    /// repair the result.
    pub fn mutate(&self, mut chromosome: Chromosome, rng: &mut ChaCha8Rng) -> Chromosome {
        match rng.gen_range(0..3) {
            0 => self.mutate_swap(&mut chromosome, rng),
            1 => self.mutate_transfer(&mut chromosome, rng),
            _ => self.mutate_shift(&mut chromosome, rng),
        }
        self.repair(&mut chromosome);
        chromosome
    }

    // Swap the genes at two random positions.
    fn mutate_swap(&self, chromosome: &mut Chromosome, rng: &mut ChaCha8Rng) {
        if chromosome.len() < 2 {
            return;
        }
        let picks = rand::seq::index::sample(rng, chromosome.len(), 2);
        chromosome.genes.swap(picks.index(0), picks.index(1));
    }

    // Move up to 30% of a random non-empty tank into another tank, provided
    // the target is empty or already holds the same cargo.
    fn mutate_transfer(&self, chromosome: &mut Chromosome, rng: &mut ChaCha8Rng) {
        let filled: Vec<usize> = chromosome
            .genes
            .iter()
            .enumerate()
            .filter(|(_, (cargo_id, quantity))| cargo_id.is_some() && *quantity > QTY_EPSILON)
            .map(|(index, _)| index)
            .collect();
        if filled.is_empty() {
            return;
        }

        let source = filled[rng.gen_range(0..filled.len())];
        let target = rng.gen_range(0..chromosome.len());
        if target == source {
            return;
        }

        let (source_cargo, source_qty) = chromosome.genes[source].clone();
        let Some(source_cargo) = source_cargo else {
            return;
        };
        let (target_cargo, target_qty) = chromosome.genes[target].clone();
        if !(target_cargo.is_none() || target_cargo.as_deref() == Some(source_cargo.as_str())) {
            return;
        }

        let target_volume = self.tank_volumes[chromosome.tank_id(target)];
        let amount = (source_qty * 0.3).min(target_volume - target_qty);
        if amount <= QTY_EPSILON {
            return;
        }

        let new_source_qty = source_qty - amount;
        chromosome.genes[source] = if new_source_qty < QTY_EPSILON {
            (None, 0.0)
        } else {
            (Some(source_cargo.clone()), new_source_qty)
        };
        chromosome.genes[target] = (Some(source_cargo), target_qty + amount);
    }

    // For a cargo already spanning several tanks, move up to 50% of one of
    // its tanks into another tank that is empty or holds the same cargo.
    fn mutate_shift(&self, chromosome: &mut Chromosome, rng: &mut ChaCha8Rng) {
        let (cargo_id, source, source_qty) = {
            let groups = chromosome.cargo_tank_groups();
            let spread: Vec<&(String, Vec<(usize, f64)>)> =
                groups.iter().filter(|(_, tanks)| tanks.len() > 1).collect();
            if spread.is_empty() {
                return;
            }
            let (cargo_id, tanks) = spread[rng.gen_range(0..spread.len())];
            let (source, source_qty) = tanks[rng.gen_range(0..tanks.len())];
            (cargo_id.clone(), source, source_qty)
        };

        let target = rng.gen_range(0..chromosome.len());
        if target == source {
            return;
        }
        let (target_cargo, target_qty) = chromosome.genes[target].clone();
        if !(target_cargo.is_none() || target_cargo.as_deref() == Some(cargo_id.as_str())) {
            return;
        }

        let target_volume = self.tank_volumes[chromosome.tank_id(target)];
        let amount = (source_qty * 0.5).min(target_volume - target_qty);
        if amount <= QTY_EPSILON {
            return;
        }

        let new_source_qty = source_qty - amount;
        chromosome.genes[source] = if new_source_qty < QTY_EPSILON {
            (None, 0.0)
        } else {
            (Some(cargo_id.clone()), new_source_qty)
        };
        chromosome.genes[target] = (Some(cargo_id), target_qty + amount);
    }
}
