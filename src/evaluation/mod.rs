pub mod fitness;
pub mod penalty;
pub mod score;
pub mod validate;
