use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::config::constant::SEED;
use crate::domain::types::{Cargo, Receiver, Ship, Tank};

const CARGO_KINDS: [&str; 6] = [
    "FUEL OIL",
    "GASOIL",
    "JET A1",
    "NAPHTHA",
    "CRUDE",
    "BENZENE",
];

const RECEIVER_NAMES: [&str; 4] = [
    "ACME TERMINAL",
    "NORTH HARBOUR",
    "DELTA PETROLEUM",
    "EASTBAY DEPOT",
];

/// Generate a demo ship with `tank_count` tanks laid out as port/starboard
/// rows. Both tanks of a row share a volume, the way real parcel tankers are
/// built. Deterministic for a fixed seed.
pub fn generate_demo_ship(tank_count: usize) -> Ship {
    let mut rng = ChaCha8Rng::seed_from_u64(SEED);

    let mut tanks = Vec::with_capacity(tank_count);
    let mut row_volume = 0.0;
    for index in 0..tank_count {
        if index % 2 == 0 {
            row_volume = (rng.gen_range(40..=120) * 10) as f64;
        }
        let row = index / 2 + 1;
        let side = if index % 2 == 0 { "P" } else { "S" };
        tanks.push(Tank {
            id: format!("t{:02}", index + 1),
            name: format!("{}{}", row, side),
            volume: row_volume,
        });
    }

    let ship = Ship {
        id: "demo-ship".to_string(),
        name: "MT DEMO".to_string(),
        tanks,
    };
    info!(
        "Generated demo ship with {} tanks, total capacity {:.0}",
        ship.tanks.len(),
        ship.total_capacity()
    );
    ship
}

/// Generate `count` cargo requests sized to roughly 85% of the ship's
/// capacity. The first cargo is mandatory, and one request is specified by
/// ton and density instead of volume to exercise the derivation rule.
pub fn generate_demo_cargoes(count: usize, ship: &Ship) -> Vec<Cargo> {
    let mut rng = ChaCha8Rng::seed_from_u64(SEED);

    let budget = ship.total_capacity() * 0.85;
    let base_quantity = budget / count.max(1) as f64;

    let mut cargoes = Vec::with_capacity(count);
    let mut total_requested = 0.0;
    for index in 0..count {
        let quantity = (base_quantity * rng.gen_range(0.6..1.0)).floor();
        let kind_label = CARGO_KINDS[index % CARGO_KINDS.len()].to_string();

        let receivers: Vec<Receiver> = (0..rng.gen_range(0..=2))
            .map(|i| Receiver {
                name: RECEIVER_NAMES[(index + i) % RECEIVER_NAMES.len()].to_string(),
            })
            .collect();

        // One request arrives as weight plus density, like a real nomination.
        let cargo = if index == 1 {
            let density = 0.85;
            Cargo::new(
                format!("cargo-{:02}", index + 1),
                kind_label,
                None,
                Some(quantity * density),
                Some(density),
                receivers,
                false,
            )
        } else {
            Cargo::new(
                format!("cargo-{:02}", index + 1),
                kind_label,
                Some(quantity),
                None,
                None,
                receivers,
                index == 0,
            )
        };

        total_requested += cargo.requested_volume;
        cargoes.push(cargo);
    }

    info!(
        "Generated {} cargo requests totalling {:.0} against capacity {:.0}",
        cargoes.len(),
        total_requested,
        ship.total_capacity()
    );
    cargoes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_data_is_deterministic_and_feasible() {
        let ship = generate_demo_ship(12);
        let again = generate_demo_ship(12);
        assert_eq!(ship, again);
        assert_eq!(ship.total_rows(), 6);

        let cargoes = generate_demo_cargoes(5, &ship);
        assert_eq!(cargoes.len(), 5);
        assert!(cargoes[0].is_mandatory);
        assert!(cargoes[1].requested_volume > 0.0);

        let total: f64 = cargoes.iter().map(|c| c.requested_volume).sum();
        assert!(total <= ship.total_capacity());

        // Row mates share a volume.
        for pair in ship.tanks.chunks(2) {
            if let [port, starboard] = pair {
                assert_eq!(port.volume, starboard.volume);
            }
        }
    }
}
