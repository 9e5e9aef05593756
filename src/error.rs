use std::fmt;

/// Failures the planning engine can report. Shortfall is not an error:
/// a partial plan is returned and inspected through `unfulfilled`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanningError {
    /// Malformed input: empty ship, non-positive tank volume or cargo quantity.
    InvalidInput(String),
    /// Total requested volume exceeds what the ship can carry.
    Infeasible(String),
    /// A settings value is structurally invalid (out of range, zero where positive required).
    InvalidSettings(String),
}

impl fmt::Display for PlanningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanningError::InvalidInput(msg) => write!(f, "invalid input: {}", msg),
            PlanningError::Infeasible(msg) => write!(f, "infeasible request: {}", msg),
            PlanningError::InvalidSettings(msg) => write!(f, "invalid settings: {}", msg),
        }
    }
}

impl std::error::Error for PlanningError {}
