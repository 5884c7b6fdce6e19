use std::fmt::Display;
use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use color_eyre::eyre::WrapErr;
use insure::{Scenario, commands, init_logging};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "insure")]
#[command(about = "Simulate constant proportion portfolio insurance")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Print reports as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn", global = true)]
    log_level: String,

    /// Append logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
struct ScenarioArgs {
    /// Scenario file (YAML); defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the scenario seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override the number of simulated paths
    #[arg(long)]
    paths: Option<usize>,
}

impl ScenarioArgs {
    fn load(&self) -> color_eyre::Result<Scenario> {
        let mut scenario = match &self.config {
            Some(path) => Scenario::load(path)?,
            None => Scenario::default(),
        };
        if let Some(seed) = self.seed {
            scenario.seed = seed;
        }
        if let Some(paths) = self.paths {
            scenario.market.n_scenarios = paths;
            scenario.rates.n_scenarios = paths;
        }
        Ok(scenario)
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the strategy once over the `returns` series in the scenario
    Backtest(ScenarioArgs),
    /// Monte Carlo over simulated GBM paths
    Simulate(ScenarioArgs),
    /// Violation rate and terminal wealth for each multiplier, on common paths
    Sweep {
        #[command(flatten)]
        scenario: ScenarioArgs,

        /// Comma-separated multipliers, e.g. 1,2,3,5
        #[arg(long, value_delimiter = ',')]
        multipliers: Option<Vec<f64>>,
    },
    /// Summarise simulated CIR short rates and bond prices
    Rates(ScenarioArgs),
}

fn emit<T: Serialize + Display>(report: &T, json: bool) -> color_eyre::Result<()> {
    if json {
        let out = serde_json::to_string_pretty(report).wrap_err("failed to serialize report")?;
        println!("{out}");
    } else {
        print!("{report}");
    }
    Ok(())
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    init_logging(&args.log_level, args.log_file.as_deref())?;

    match &args.command {
        Command::Backtest(s) => emit(&commands::backtest(&s.load()?)?, args.json)?,
        Command::Simulate(s) => emit(&commands::simulate(&s.load()?)?, args.json)?,
        Command::Sweep {
            scenario,
            multipliers,
        } => {
            let mut scenario = scenario.load()?;
            if let Some(m) = multipliers {
                scenario.multipliers = m.clone();
            }
            emit(&commands::sweep(&scenario)?, args.json)?;
        }
        Command::Rates(s) => emit(&commands::rates(&s.load()?)?, args.json)?,
    }

    tracing::debug!("done");
    Ok(())
}
