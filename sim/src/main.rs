//! Headless battle runner
//!
//! Loads a scenario, fights it round by round and prints the battle log, or
//! the event stream as JSON lines with `--json`.

mod scenario;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use gridline_battle::{BattleOutcome, BattleSession, CombatEvent};
use serde::Serialize;

use crate::scenario::Scenario;

#[derive(Parser, Debug)]
#[command(name = "gridline-sim")]
#[command(about = "Run a Gridline battle scenario to completion")]
struct Args {
    /// Scenario file (JSON)
    scenario: PathBuf,

    /// Give up after this many rounds
    #[arg(long, default_value_t = 20)]
    max_rounds: usize,

    /// Seed for targeting tie-breaks; OS entropy when absent
    #[arg(long)]
    seed: Option<u64>,

    /// Print events as JSON lines instead of the battle log
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Summary {
    outcome: BattleOutcome,
    rounds: usize,
    survivors: Vec<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(summary) => {
            if args.json {
                match serde_json::to_string(&summary) {
                    Ok(line) => println!("{}", line),
                    Err(err) => log::error!("failed to encode summary: {}", err),
                }
            } else {
                println!(
                    "{} after {} round(s); survivors: {}",
                    summary.outcome.as_str(),
                    summary.rounds,
                    summary.survivors.join(", ")
                );
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<Summary, Box<dyn std::error::Error>> {
    let scenario = Scenario::load(&args.scenario)?;
    let (mut session, reinforcements) = scenario.into_session(args.seed)?;

    if args.json {
        session.subscribe(|event: &CombatEvent| match serde_json::to_string(event) {
            Ok(line) => println!("{}", line),
            Err(err) => log::error!("failed to encode event: {}", err),
        });
    }

    let mut reinforcements = Some(reinforcements).filter(|units| !units.is_empty());
    let mut printed = 0;
    let mut rounds = 0;
    while rounds < args.max_rounds {
        rounds += 1;
        session.start_battle()?;
        let report = session.run_pass()?;
        if !args.json {
            printed = print_log(&session, printed);
        }
        if report.outcome.is_decided() {
            break;
        }
        if let Some(units) = reinforcements.take() {
            log::info!("round {}: {} reinforcements arrive", rounds, units.len());
            session.spawn_enemies(units)?;
        }
    }

    if !session.outcome().is_decided() {
        log::warn!("no decision after {} rounds", rounds);
    }
    Ok(summarize(&session, rounds))
}

/// Print log lines added since the last call. Returns the new high-water mark.
fn print_log(session: &BattleSession, from: usize) -> usize {
    let log = session.log();
    for line in &log[from..] {
        println!("{}", line);
    }
    log.len()
}

fn summarize(session: &BattleSession, rounds: usize) -> Summary {
    Summary {
        outcome: session.outcome(),
        rounds,
        survivors: session
            .units()
            .living()
            .map(|u| format!("{} ({} hp)", u.name, u.hp()))
            .collect(),
    }
}
