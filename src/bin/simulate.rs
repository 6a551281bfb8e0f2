//! Crash point simulator
//!
//! Draws crash points without running rounds and reports the return to a
//! player who always cashes out at the same target.

use clap::Parser;
use crashline::game::{CrashPointGenerator, OsEntropy, SeededEntropy};
use crashline::simulation::{simulate, SimulationReport};
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "crashline-sim")]
#[command(about = "Crash point distribution and return-to-player simulator", long_about = None)]
struct Args {
    /// Number of crash points to draw
    #[arg(short, long, default_value = "1000000")]
    rounds: u64,

    /// Cash-out multiplier the simulated player always uses
    #[arg(short, long, default_value = "2.0")]
    target: f64,

    /// Use a seeded generator instead of the OS source (reproducible runs)
    #[arg(long)]
    seed: Option<u64>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    if !args.target.is_finite() || args.target < 1.0 {
        return Err(format!("target must be at least 1.0, got {}", args.target).into());
    }

    let started = Instant::now();
    let report = match args.seed {
        Some(seed) => simulate(
            &mut CrashPointGenerator::new(SeededEntropy::new(seed)),
            args.rounds,
            args.target,
        )?,
        None => simulate(
            &mut CrashPointGenerator::new(OsEntropy),
            args.rounds,
            args.target,
        )?,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, args.seed);
        println!("Elapsed:              {:.2?}", started.elapsed());
    }

    Ok(())
}

fn print_report(report: &SimulationReport, seed: Option<u64>) {
    println!("Crash Point Simulation");
    println!("======================");
    match seed {
        Some(seed) => println!("Source:               seeded ({})", seed),
        None => println!("Source:               operating system"),
    }
    println!("Rounds:               {}", report.rounds);
    println!("Cash-out target:      {:.2}x", report.target);
    println!("Win rate:             {:.4}%", report.win_rate * 100.0);
    println!("Return to player:     {:.4}%", report.return_to_player * 100.0);
    println!("Instant busts (1.00x): {:.4}%", report.instant_bust_rate * 100.0);
    println!("Mean crash point:     {:.3}x", report.mean_crash_point);
    println!("Max crash point:      {:.2}x", report.max_crash_point);
    println!();
    println!("Distribution:");
    for bucket in &report.buckets {
        println!(
            "   < {:>8.2}x  {:>10}  {:>7.3}%",
            bucket.below,
            bucket.count,
            bucket.share * 100.0
        );
    }
}
