use itertools::Itertools;

use crate::config::constant::QTY_EPSILON;
use crate::domain::geometry::{bow_or_stern_only, mid_section_rows, TankPosition};
use crate::domain::types::Tank;
use crate::solver::phase::distribute::{split_evenly, TankShare};
use crate::solver::phase::PhaseSolver;

/// Relative deviation of a candidate set's total capacity from the quantity
/// being placed. 0.0 is a perfect fit.
pub(crate) fn tolerance_deviation(quantity: f64, total_capacity: f64) -> f64 {
    if total_capacity <= 0.0 {
        return f64::INFINITY;
    }
    (quantity - total_capacity).abs() / total_capacity
}

fn meets_min_utilization(quantity: f64, volume: f64, min_utilization: f64) -> bool {
    volume > 0.0 && quantity / volume >= min_utilization
}

impl<'a> PhaseSolver<'a> {
    /// Plannable tanks in hull order with their current map capacity.
    fn candidates(&self) -> Vec<(&Tank, TankPosition, f64)> {
        self.ship
            .tanks
            .iter()
            .enumerate()
            .filter_map(|(index, tank)| {
                let capacity = *self.available.get(&tank.id)?;
                Some((tank, self.ship.position_at(index), capacity))
            })
            .collect()
    }

    fn available_contains(&self, tank: &Tank) -> bool {
        self.available.contains_key(&tank.id)
    }

    /// Search for a placement of `remaining` into exactly `k` tanks under
    /// phase-`k` shape rules (`k >= 7` falls back to the greedy multi-tank
    /// pass). Returns the placements without committing them.
    pub(crate) fn try_phase(
        &self,
        k: usize,
        remaining: f64,
        tolerance_override: Option<f64>,
    ) -> Option<Vec<(String, f64)>> {
        let tolerance = tolerance_override.unwrap_or_else(|| self.phase_tolerance(k));
        match k {
            1 => self.try_single(remaining, tolerance),
            2 => self.try_two(remaining, tolerance),
            3 => self.try_three(remaining, tolerance),
            4 => self.try_four(remaining, tolerance),
            5 => self.try_five(remaining, tolerance),
            6 => self.try_six(remaining, tolerance),
            _ => {
                let placements = self.try_multi(remaining);
                if placements.is_empty() {
                    None
                } else {
                    Some(placements)
                }
            }
        }
    }

    pub(crate) fn phase_tolerance(&self, k: usize) -> f64 {
        match k {
            1 => self.settings.faz1_single_tank_tolerance,
            2 | 6 => self.settings.faz2_two_tank_tolerance,
            3 => self.settings.faz3_three_tank_tolerance,
            4 => self.settings.faz4_four_tank_tolerance,
            5 => self.settings.faz5_five_tank_tolerance,
            _ => 0.0,
        }
    }

    /// Score one candidate tank set against the current best: tolerance fit
    /// first, then the equal-split distribution with its utilization checks.
    /// Smallest deviation wins; ties keep the earlier set.
    fn consider_set(
        &self,
        remaining: f64,
        tanks: &[&Tank],
        tolerance: f64,
        best: &mut Option<(Vec<(String, f64)>, f64)>,
    ) {
        let total_capacity: f64 = tanks.iter().map(|tank| tank.volume).sum();
        let deviation = tolerance_deviation(remaining, total_capacity);
        if deviation > tolerance {
            return;
        }
        if best.as_ref().is_some_and(|(_, d)| deviation >= *d) {
            return;
        }

        let shares: Vec<TankShare<'_>> = tanks
            .iter()
            .map(|&tank| TankShare {
                tank,
                available: self.actual_available(tank),
            })
            .collect();
        let Some(quantities) = split_evenly(remaining, &shares, self.settings.min_utilization)
        else {
            return;
        };

        let placements = tanks
            .iter()
            .zip(quantities)
            .map(|(tank, quantity)| (tank.id.clone(), quantity))
            .collect();
        *best = Some((placements, deviation));
    }

    // FAZ 1: one tank, best fit by deviation.
    fn try_single(&self, remaining: f64, tolerance: f64) -> Option<Vec<(String, f64)>> {
        let min_utilization = self.settings.min_utilization;
        let mut best: Option<(&Tank, f64)> = None;

        for (tank, _, capacity) in self.candidates() {
            if capacity < remaining * (1.0 - tolerance) {
                continue;
            }
            let deviation = tolerance_deviation(remaining, tank.volume);
            if deviation > tolerance {
                continue;
            }
            if !meets_min_utilization(remaining, tank.volume, min_utilization) {
                continue;
            }
            if best.map_or(true, |(_, d)| deviation < d) {
                best = Some((tank, deviation));
            }
        }

        let (tank, _) = best?;
        let quantity = remaining.min(self.actual_available(tank));
        if quantity > QTY_EPSILON {
            Some(vec![(tank.id.clone(), quantity)])
        } else {
            None
        }
    }

    // FAZ 2: a pair of tanks. 2A same-row port/starboard, 2B cross-row
    // opposite sides, 2C same side at the sharply reduced tolerance.
    fn try_two(&self, remaining: f64, tolerance: f64) -> Option<Vec<(String, f64)>> {
        let asymmetric_tolerance = tolerance * self.settings.faz2_asymmetric_tolerance_factor;
        let pairs = self.ship.tank_pairs();
        let mut best: Option<(Vec<(String, f64)>, f64)> = None;

        // 2A: full symmetric.
        for (port, starboard) in &pairs {
            if !self.available_contains(port) || !self.available_contains(starboard) {
                continue;
            }
            self.consider_set(remaining, &[*port, *starboard], tolerance, &mut best);
        }

        // 2B: partial symmetric. Only cross-row opposite-side combinations
        // qualify; two tanks on one side never do.
        if best.is_none() {
            for (i, (port1, star1)) in pairs.iter().enumerate() {
                for (port2, star2) in pairs.iter().skip(i + 1) {
                    for (first, second) in [(*port1, *star2), (*star1, *port2)] {
                        if !self.available_contains(first) || !self.available_contains(second) {
                            continue;
                        }
                        self.consider_set(remaining, &[first, second], tolerance, &mut best);
                    }
                }
            }
        }

        // 2C: asymmetric, same side.
        if best.is_none() {
            let candidates = self.candidates();
            for ((tank1, pos1, _), (tank2, pos2, _)) in
                candidates.iter().cloned().tuple_combinations()
            {
                if pos1.side != pos2.side {
                    continue;
                }
                self.consider_set(remaining, &[tank1, tank2], asymmetric_tolerance, &mut best);
            }
        }

        best.map(|(placements, _)| placements)
    }

    // FAZ 3: three tanks, never all on the same side.
    fn try_three(&self, remaining: f64, tolerance: f64) -> Option<Vec<(String, f64)>> {
        let candidates = self.candidates();
        let mut best: Option<(Vec<(String, f64)>, f64)> = None;

        for ((tank1, pos1, _), (tank2, pos2, _), (tank3, pos3, _)) in
            candidates.iter().cloned().tuple_combinations()
        {
            if pos1.side == pos2.side && pos2.side == pos3.side {
                continue;
            }
            self.consider_set(remaining, &[tank1, tank2, tank3], tolerance, &mut best);
        }

        best.map(|(placements, _)| placements)
    }

    // FAZ 4: two port/starboard pairs. The four tanks may not cluster
    // entirely in the bow-3 or stern-3 rows, and a single shared row would
    // only be acceptable in the mid-section.
    fn try_four(&self, remaining: f64, tolerance: f64) -> Option<Vec<(String, f64)>> {
        let pairs = self.ship.tank_pairs();
        let mut best: Option<(Vec<(String, f64)>, f64)> = None;

        for (i, (port1, star1)) in pairs.iter().enumerate() {
            if !self.available_contains(port1) || !self.available_contains(star1) {
                continue;
            }
            for (port2, star2) in pairs.iter().skip(i + 1) {
                if !self.available_contains(port2) || !self.available_contains(star2) {
                    continue;
                }

                let quad = [*port1, *star1, *port2, *star2];
                let tank_ids: Vec<String> = quad.iter().map(|tank| tank.id.clone()).collect();
                if bow_or_stern_only(self.ship, &tank_ids) {
                    continue;
                }

                let rows: Vec<usize> = tank_ids
                    .iter()
                    .filter_map(|id| self.ship.position_of(id).map(|p| p.row))
                    .dedup()
                    .collect();
                if rows.len() == 1 {
                    let (mid_start, mid_end) = mid_section_rows(self.ship);
                    if !(mid_start..=mid_end).contains(&rows[0]) {
                        continue;
                    }
                }

                self.consider_set(remaining, &quad, tolerance, &mut best);
            }
        }

        best.map(|(placements, _)| placements)
    }

    // FAZ 5: strategy 3+2, a free triplet plus a full row pair. The pair
    // spans both sides, which balances an all-one-side triplet on its own.
    fn try_five(&self, remaining: f64, tolerance: f64) -> Option<Vec<(String, f64)>> {
        let candidates = self.candidates();
        let pairs = self.ship.tank_pairs();
        let mut best: Option<(Vec<(String, f64)>, f64)> = None;

        for ((tank1, _, _), (tank2, _, _), (tank3, _, _)) in
            candidates.iter().cloned().tuple_combinations()
        {
            for (port, starboard) in &pairs {
                if !self.available_contains(port) || !self.available_contains(starboard) {
                    continue;
                }
                let triplet_ids = [&tank1.id, &tank2.id, &tank3.id];
                if triplet_ids.contains(&&port.id) || triplet_ids.contains(&&starboard.id) {
                    continue;
                }
                self.consider_set(
                    remaining,
                    &[tank1, tank2, tank3, *port, *starboard],
                    tolerance,
                    &mut best,
                );
            }
        }

        best.map(|(placements, _)| placements)
    }

    // FAZ 6: three distinct port/starboard pairs.
    fn try_six(&self, remaining: f64, tolerance: f64) -> Option<Vec<(String, f64)>> {
        let pairs: Vec<(&Tank, &Tank)> = self
            .ship
            .tank_pairs()
            .into_iter()
            .filter(|(port, starboard)| {
                self.available_contains(port) && self.available_contains(starboard)
            })
            .collect();
        let mut best: Option<(Vec<(String, f64)>, f64)> = None;

        for (pair1, pair2, pair3) in pairs.iter().tuple_combinations() {
            self.consider_set(
                remaining,
                &[pair1.0, pair1.1, pair2.0, pair2.1, pair3.0, pair3.1],
                tolerance,
                &mut best,
            );
        }

        best.map(|(placements, _)| placements)
    }

    // FAZ 7: greedy best-fit over the largest remaining capacities. May
    // return a partial placement; the driver decides what that is worth.
    pub(crate) fn try_multi(&self, remaining: f64) -> Vec<(String, f64)> {
        let min_utilization = self.settings.min_utilization;

        let mut by_capacity: Vec<(&Tank, f64)> = self
            .candidates()
            .into_iter()
            .filter(|(_, _, capacity)| *capacity > QTY_EPSILON)
            .map(|(tank, _, capacity)| (tank, capacity))
            .collect();
        by_capacity.sort_by(|a, b| b.1.total_cmp(&a.1));

        let mut placements = Vec::new();
        let mut left = remaining;
        for (tank, capacity) in by_capacity {
            if left < QTY_EPSILON {
                break;
            }
            let quantity = left.min(capacity).min(tank.volume);
            if !meets_min_utilization(quantity, tank.volume, min_utilization) {
                continue;
            }
            placements.push((tank.id.clone(), quantity));
            left -= quantity;
        }
        placements
    }
}
