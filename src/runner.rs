use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fs;

use colored::*;
use csv::Writer;
use tracing::{info, span, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::constant::{
    DEMO_CARGO_COUNT, DEMO_TANK_COUNT, NUM_RETRIES, PLAN_CSV_PATH, PLAN_JSON_PATH,
};
use crate::domain::types::{Plan, Ship};
use crate::evaluation::score::{score_plan, unfulfilled};
use crate::evaluation::validate::validate;
use crate::fixtures::data_generator::{generate_demo_cargoes, generate_demo_ship};
use crate::settings::{Algorithm, Settings};
use crate::solver;
use crate::storage;

/// Demo entry point: build a seeded ship and cargo list, run both solvers,
/// print the plans and persist the better one.
pub fn run() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(
            fmt::layer()
                .with_span_events(fmt::format::FmtSpan::NEW | fmt::format::FmtSpan::CLOSE)
                .pretty(),
        )
        .init();

    let ship = generate_demo_ship(DEMO_TANK_COUNT);
    let cargoes = generate_demo_cargoes(DEMO_CARGO_COUNT, &ship);

    let settings = Settings::default();
    if let Err(err) = validate(&ship, &cargoes, &settings) {
        warn!("Validation flagged the request: {}", err);
    }

    let excluded = HashSet::new();
    let fixed = HashMap::new();

    let genetic_plan = {
        let span = span!(Level::INFO, "genetic_run");
        let _guard = span.enter();
        solver::optimize(&ship, &cargoes, &excluded, &fixed, &settings)?
    };

    let phase_plan = {
        let span = span!(Level::INFO, "phase_run");
        let _guard = span.enter();
        let mut phase_settings = settings.clone();
        phase_settings.optimization_algorithm = Algorithm::Advanced;
        solver::optimize_with_retries(
            &ship,
            &cargoes,
            &excluded,
            &fixed,
            NUM_RETRIES,
            &phase_settings,
        )?
    };

    let genetic_score = score_plan(&genetic_plan, &ship);
    let phase_score = score_plan(&phase_plan, &ship);

    println!("\n{}", "=== GENETIC PLAN ===".bold());
    print_plan(&genetic_plan, &ship);
    println!("\n{}", "=== PHASE PLAN ===".bold());
    print_plan(&phase_plan, &ship);

    let (best_plan, best_label) = if genetic_score >= phase_score {
        (&genetic_plan, "genetic")
    } else {
        (&phase_plan, "phase")
    };
    info!(
        "Best plan: {} (genetic {:.1} vs phase {:.1})",
        best_label, genetic_score, phase_score
    );

    fs::write(PLAN_JSON_PATH, storage::encode_plan(best_plan)?)?;
    save_plan_csv(best_plan, &ship, PLAN_CSV_PATH)?;
    info!("Saved plan to {} and {}", PLAN_JSON_PATH, PLAN_CSV_PATH);

    Ok(())
}

fn print_plan(plan: &Plan, ship: &Ship) {
    let score = score_plan(plan, ship);
    let shortfall = unfulfilled(plan);

    if shortfall.is_empty() {
        println!(
            "{} , total loaded {:.0}",
            format!("Score: {:.1}", score).green(),
            plan.total_loaded()
        );
    } else {
        println!(
            "Score: {:.1}, {}",
            score,
            format!("{} cargo(es) short", shortfall.len()).red()
        );
        for (cargo_id, remaining) in &shortfall {
            println!("  {} missing {:.0}", cargo_id, remaining);
        }
    }

    for tank in &ship.tanks {
        match plan.assignment(&tank.id) {
            Some(assignment) => {
                let utilization = assignment.quantity_loaded / tank.volume * 100.0;
                let kind = plan
                    .cargo_requests
                    .iter()
                    .find(|cargo| cargo.id == assignment.cargo_id)
                    .map(|cargo| cargo.kind_label.as_str())
                    .unwrap_or(assignment.cargo_id.as_str());
                println!(
                    "{:>4} {:>8.0} / {:>6.0} ({:>5.1}%) : {}",
                    tank.name, assignment.quantity_loaded, tank.volume, utilization, kind
                );
            }
            None => println!("{:>4} {:>8} / {:>6.0}          : empty", tank.name, "-", tank.volume),
        }
    }
}

fn save_plan_csv(plan: &Plan, ship: &Ship, filename: &str) -> Result<(), Box<dyn Error>> {
    let mut wtr = Writer::from_path(filename)?;

    wtr.write_record(["tank", "cargo_id", "quantity_loaded", "utilization"])?;

    for tank in &ship.tanks {
        if let Some(assignment) = plan.assignment(&tank.id) {
            wtr.write_record([
                tank.name.clone(),
                assignment.cargo_id.clone(),
                format!("{:.2}", assignment.quantity_loaded),
                format!("{:.3}", assignment.quantity_loaded / tank.volume),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
