/// One GA solution: a gene per plannable tank, in hull order.
///
/// Gene `i` is `(Some(cargo_id), quantity)` when tank `i` carries part of a
/// cargo, `(None, 0.0)` when it is empty. `genes` and `tank_ids` stay in
/// lockstep; the tank-id vector is captured once at construction and is
/// never handed out mutably.
#[derive(Debug, Clone, PartialEq)]
pub struct Chromosome {
    pub genes: Vec<(Option<String>, f64)>,
    tank_ids: Vec<String>,
}

impl Chromosome {
    pub fn new(genes: Vec<(Option<String>, f64)>, tank_ids: Vec<String>) -> Self {
        assert_eq!(
            genes.len(),
            tank_ids.len(),
            "genes and tank_ids must have the same length"
        );
        Chromosome { genes, tank_ids }
    }

    pub fn empty(tank_ids: Vec<String>) -> Self {
        let genes = vec![(None, 0.0); tank_ids.len()];
        Chromosome { genes, tank_ids }
    }

    pub fn tank_ids(&self) -> &[String] {
        &self.tank_ids
    }

    pub fn tank_id(&self, index: usize) -> &str {
        &self.tank_ids[index]
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Total volume across all genes.
    pub fn total_loaded(&self) -> f64 {
        self.genes.iter().map(|(_, quantity)| quantity).sum()
    }

    /// Total volume assigned to one cargo.
    pub fn cargo_total(&self, cargo_id: &str) -> f64 {
        self.genes
            .iter()
            .filter(|(gene_cargo, _)| gene_cargo.as_deref() == Some(cargo_id))
            .map(|(_, quantity)| quantity)
            .sum()
    }

    /// Tank ids holding each distinct cargo, grouped in gene order so that
    /// iteration stays deterministic.
    pub fn cargo_tank_groups(&self) -> Vec<(String, Vec<(usize, f64)>)> {
        let mut groups: Vec<(String, Vec<(usize, f64)>)> = Vec::new();
        for (index, (cargo_id, quantity)) in self.genes.iter().enumerate() {
            let Some(cargo_id) = cargo_id else { continue };
            if *quantity <= crate::config::constant::QTY_EPSILON {
                continue;
            }
            match groups.iter_mut().find(|(id, _)| id == cargo_id) {
                Some((_, tanks)) => tanks.push((index, *quantity)),
                None => groups.push((cargo_id.clone(), vec![(index, *quantity)])),
            }
        }
        groups
    }
}
