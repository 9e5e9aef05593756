use crate::domain::types::{Ship, Tank};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Port,
    Starboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Bow,
    Mid,
    Stern,
}

/// Position of a tank along the hull, derived from its index in the ship's
/// tank list. Rows are 1-based front to back; even indices are port side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TankPosition {
    pub index: usize,
    pub row: usize,
    pub side: Side,
    pub section: Section,
}

impl Ship {
    pub fn position_at(&self, index: usize) -> TankPosition {
        let row = index / 2 + 1;
        let side = if index % 2 == 0 {
            Side::Port
        } else {
            Side::Starboard
        };
        let section = if row == 1 {
            Section::Bow
        } else if row == self.total_rows() {
            Section::Stern
        } else {
            Section::Mid
        };
        TankPosition {
            index,
            row,
            side,
            section,
        }
    }

    pub fn position_of(&self, tank_id: &str) -> Option<TankPosition> {
        let index = self.tanks.iter().position(|tank| tank.id == tank_id)?;
        Some(self.position_at(index))
    }

    /// Complete port/starboard pairs, front to back. A trailing partial row
    /// (odd tank count) is not a pair.
    pub fn tank_pairs(&self) -> Vec<(&Tank, &Tank)> {
        self.tanks
            .chunks(2)
            .filter_map(|row| match row {
                [port, starboard] => Some((port, starboard)),
                _ => None,
            })
            .collect()
    }
}

/// True iff every listed tank sits on the same side of the hull.
pub fn all_same_side(ship: &Ship, tank_ids: &[String]) -> bool {
    let mut first_side = None;
    if tank_ids.is_empty() {
        return false;
    }
    for tank_id in tank_ids {
        let Some(position) = ship.position_of(tank_id) else {
            return false;
        };
        match first_side {
            None => first_side = Some(position.side),
            Some(side) if side != position.side => return false,
            Some(_) => {}
        }
    }
    true
}

/// True iff ALL listed tanks cluster in the bow-3 rows or ALL cluster in the
/// stern-3 rows. On short ships the two windows overlap; an overlapping row
/// classifies as bow. Used to forbid 4-tank cargoes from piling up at either
/// end of the hull.
pub fn bow_or_stern_only(ship: &Ship, tank_ids: &[String]) -> bool {
    if tank_ids.is_empty() {
        return false;
    }

    let total_rows = ship.total_rows();
    let bow_end = total_rows.min(3);
    let stern_start = total_rows.saturating_sub(2).max(1);

    let mut bow_count = 0;
    let mut stern_count = 0;
    for tank_id in tank_ids {
        if let Some(position) = ship.position_of(tank_id) {
            if position.row <= bow_end {
                bow_count += 1;
            } else if position.row >= stern_start {
                stern_count += 1;
            }
        }
    }

    bow_count == tank_ids.len() || stern_count == tank_ids.len()
}

/// Inclusive row range counted as mid-section, roughly the central third
/// clamped to `[2, total_rows - 1]`. Ships of one or two rows are all mid.
pub fn mid_section_rows(ship: &Ship) -> (usize, usize) {
    let total_rows = ship.total_rows();
    if total_rows <= 2 {
        return (1, total_rows);
    }
    let start = (total_rows / 3 + 1).max(2);
    let end = (total_rows * 2 / 3 + 1).min(total_rows - 1);
    (start, end)
}
