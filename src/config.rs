pub mod constant {
    pub(crate) const SEED: u64 = 64;
    pub(crate) const QTY_EPSILON: f64 = 0.001; // quantities below this are treated as zero
    pub(crate) const DEMO_TANK_COUNT: usize = 12;
    pub(crate) const DEMO_CARGO_COUNT: usize = 5;
    pub(crate) const NUM_RETRIES: usize = 5; // cargo ordering strategies tried by the demo run
    pub(crate) const PLAN_JSON_PATH: &str = "plan.json";
    pub(crate) const PLAN_CSV_PATH: &str = "plan_summary.csv";
}
