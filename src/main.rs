//! Retirement and wealth projection engine CLI.

use std::fs::File;
use std::io::Write;
use std::time::Instant;

use clap::{Parser, Subcommand};
use wealth_projection_core::{run_deterministic, run_monte_carlo, Scenario};

#[derive(Parser)]
#[command(name = "wealth-projection", version, about = "Retirement and wealth projection engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the single deterministic (expected-value) projection and write a monthly CSV.
    Project {
        /// Path to a JSON-encoded Scenario.
        scenario: String,
        #[arg(long, default_value = "projection_output.csv")]
        out: String,
    },
    /// Run the Monte Carlo orchestrator over N correlated paths.
    MonteCarlo {
        /// Path to a JSON-encoded Scenario.
        scenario: String,
        #[arg(long, default_value_t = 10_000)]
        paths: u64,
    },
}

fn load_scenario(path: &str) -> anyhow::Result<Scenario> {
    let text = std::fs::read_to_string(path)?;
    let scenario: Scenario = serde_json::from_str(&text)?;
    Ok(scenario)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Project { scenario, out } => {
            let scenario = load_scenario(&scenario)?;
            println!("Running deterministic projection over {} months...", scenario.assumptions.horizon_months);

            let start = Instant::now();
            let result = run_deterministic(&scenario)?;
            println!("Projection complete in {:?} ({} rows)", start.elapsed(), result.rows.len());

            println!(
                "{:>5} {:>11} {:>3} {:>14} {:>14} {:>12} {:>12}",
                "Month", "Date", "Age", "Total Bal", "Net CF", "Total Tax", "Withdrawn"
            );
            println!("{}", "-".repeat(80));
            for row in result.rows.iter().take(24) {
                println!(
                    "{:>5} {:>11} {:>3} {:>14.2} {:>14.2} {:>12.2} {:>12.2}",
                    row.month_index,
                    row.month_date,
                    row.age1,
                    row.total_balance(),
                    row.net_cash_flow,
                    row.total_tax,
                    row.total_withdrawals,
                );
            }
            if result.rows.len() > 24 {
                println!("... ({} more months)", result.rows.len() - 24);
            }

            let mut file = File::create(&out)?;
            writeln!(
                file,
                "month,date,age1,age2,total_balance,net_cash_flow,total_withdrawals,federal_tax,state_tax,irmaa_surcharge,niit_tax,total_tax,notes"
            )?;
            for row in &result.rows {
                writeln!(
                    file,
                    "{},{},{},{},{},{},{},{},{},{},{},{},{}",
                    row.month_index,
                    row.month_date,
                    row.age1,
                    row.age2.map(|a| a.to_string()).unwrap_or_default(),
                    row.total_balance(),
                    row.net_cash_flow,
                    row.total_withdrawals,
                    row.federal_tax,
                    row.state_tax,
                    row.irmaa_surcharge,
                    row.niit_tax,
                    row.total_tax,
                    row.notes,
                )?;
            }
            println!("\nFull monthly results written to: {out}");
            println!("Depleted: {}  Months survived: {}", result.depleted, result.months_survived);
        }
        Command::MonteCarlo { scenario, paths } => {
            let scenario = load_scenario(&scenario)?;
            println!("Running {} Monte Carlo paths over {} months...", paths, scenario.assumptions.horizon_months);

            let progress: Box<dyn Fn(u64, u64) + Send + Sync> = Box::new(|done, total| {
                println!("  {done}/{total} paths complete");
            });
            let result = run_monte_carlo(&scenario, paths, Some(progress))?;
            println!("Simulation complete in {:?}", result.duration);

            println!("\nSummary:");
            println!("  Paths run:        {}", result.n_paths);
            println!("  Paths failed:     {}", result.paths_failed);
            println!("  Success rate:     {:.1}%", result.success_rate * 100.0);
            println!("  P(depleted):      {:.1}%", result.p_depleted * 100.0);
            println!("  P(doubled):       {:.1}%", result.p_doubled * 100.0);
            println!("  P(preserved):     {:.1}%", result.p_preserved * 100.0);
            println!("  Median ending:    ${:.2}", result.median_terminal);
            println!("  5th pct ending:   ${:.2}", result.p5_terminal);
            println!("  95th pct ending:  ${:.2}", result.p95_terminal);
            println!("  Average ending:   ${:.2}", result.average_ending);
            println!("  Avg months lasted: {:.1}", result.average_months_survived);
        }
    }

    Ok(())
}
