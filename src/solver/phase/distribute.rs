use crate::config::constant::QTY_EPSILON;
use crate::domain::types::Tank;

/// One tank of a candidate set together with its actual remaining capacity.
pub(crate) struct TankShare<'a> {
    pub tank: &'a Tank,
    pub available: f64,
}

/// Distribute `remaining` over a candidate tank set: equal split first, then
/// cap-aware repair. Each tank starts at `remaining / k`, capped by its
/// remaining capacity and volume; whatever the caps cut off is pushed onto
/// tanks that still have headroom. Returns `None` when any tank would end up
/// below the minimum utilization.
pub(crate) fn split_evenly(
    remaining: f64,
    shares: &[TankShare<'_>],
    min_utilization: f64,
) -> Option<Vec<f64>> {
    if shares.is_empty() {
        return None;
    }

    let even = remaining / shares.len() as f64;
    let mut quantities: Vec<f64> = shares
        .iter()
        .map(|share| even.min(share.available).min(share.tank.volume))
        .collect();

    let mut leftover = remaining - quantities.iter().sum::<f64>();
    for (index, share) in shares.iter().enumerate() {
        if leftover <= QTY_EPSILON {
            break;
        }
        let cap = share.available.min(share.tank.volume);
        let headroom = cap - quantities[index];
        if headroom > QTY_EPSILON {
            let add = leftover.min(headroom);
            quantities[index] += add;
            leftover -= add;
        }
    }

    // Final safety clamp.
    for (index, share) in shares.iter().enumerate() {
        quantities[index] = quantities[index]
            .min(share.available)
            .min(share.tank.volume);
    }

    for (index, share) in shares.iter().enumerate() {
        if share.tank.volume <= 0.0 || quantities[index] / share.tank.volume < min_utilization {
            return None;
        }
    }

    Some(quantities)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tank(id: &str, volume: f64) -> Tank {
        Tank {
            id: id.to_string(),
            name: id.to_uppercase(),
            volume,
        }
    }

    #[test]
    fn equal_split_across_identical_tanks() {
        let t1 = tank("t1", 500.0);
        let t2 = tank("t2", 500.0);
        let shares = [
            TankShare {
                tank: &t1,
                available: 500.0,
            },
            TankShare {
                tank: &t2,
                available: 500.0,
            },
        ];

        let quantities = split_evenly(1000.0, &shares, 0.65).unwrap();
        assert_eq!(quantities, vec![500.0, 500.0]);
    }

    #[test]
    fn overflow_is_redistributed_to_tanks_with_headroom() {
        let small = tank("t1", 500.0);
        let large = tank("t2", 1000.0);
        let shares = [
            TankShare {
                tank: &small,
                available: 500.0,
            },
            TankShare {
                tank: &large,
                available: 1000.0,
            },
        ];

        let quantities = split_evenly(1500.0, &shares, 0.65).unwrap();
        assert_eq!(quantities, vec![500.0, 1000.0]);
    }

    #[test]
    fn rejects_splits_below_min_utilization() {
        let t1 = tank("t1", 500.0);
        let t2 = tank("t2", 500.0);
        let shares = [
            TankShare {
                tank: &t1,
                available: 500.0,
            },
            TankShare {
                tank: &t2,
                available: 500.0,
            },
        ];

        assert!(split_evenly(400.0, &shares, 0.65).is_none());
    }

    #[test]
    fn respects_already_consumed_capacity() {
        let t1 = tank("t1", 500.0);
        let t2 = tank("t2", 500.0);
        let shares = [
            TankShare {
                tank: &t1,
                available: 0.0,
            },
            TankShare {
                tank: &t2,
                available: 500.0,
            },
        ];

        // t1 has nothing left, so its share is zero and fails utilization.
        assert!(split_evenly(500.0, &shares, 0.65).is_none());
    }
}
