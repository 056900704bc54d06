//! Command line surface of the `wealth-engine` binary.

use crate::dashboard::Dashboard;
use crate::demo::DemoConfig;
use crate::error::{Result, WealthError};
use crate::import::{read_ledger, read_plan, write_ledger, write_projection, write_wealth};
use crate::investment::{project, DEFAULT_START_YEAR};
use crate::money::{format_currency, format_percentage, Money};
use crate::store::{LocalCategoryRepository, LocalLedgerRepository, LocalPlanRepository};
use crate::store::{PlanRepository, Repositories};
use crate::wealth::{Alignment, WealthSummary};
use log::info;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

pub const USAGE: &str = "usage:
  wealth-engine ledger <ledger.csv> [initial_capital]
  wealth-engine project <plan.json> [start_year]
  wealth-engine wealth <ledger.csv> <plan.json> [initial_capital] [--by-date]
  wealth-engine demo";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Recalculate a ledger file and print its running balances.
    Ledger {
        ledger: PathBuf,
        initial_capital: Money,
    },

    /// Print the month-by-month projection of a plan file.
    Project { plan: PathBuf, start_year: i32 },

    /// Print the combined wealth timeline of a ledger and a plan.
    Wealth {
        ledger: PathBuf,
        plan: PathBuf,
        initial_capital: Money,
        alignment: Alignment,
    },

    /// Print the demo ledger shown to anonymous visitors.
    Demo,
}

fn usage(message: &str) -> WealthError {
    WealthError::Usage(format!("{}\n{}", message, USAGE))
}

fn parse_capital(arg: Option<&String>) -> Result<Money> {
    match arg {
        None => Ok(Money::ZERO),
        Some(raw) => Money::from_str(raw)
            .map_err(|_| usage(&format!("invalid initial capital: {}", raw))),
    }
}

/// Calendar years the binary accepts as a projection start.
const START_YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

fn parse_start_year(arg: Option<&String>) -> Result<i32> {
    match arg.map(|raw| (raw, raw.parse::<i32>())) {
        None => Ok(DEFAULT_START_YEAR),
        Some((_, Ok(year))) if START_YEARS.contains(&year) => Ok(year),
        Some((raw, _)) => Err(usage(&format!("invalid start year: {}", raw))),
    }
}

impl Command {
    /// Parses the arguments that follow the program name.
    pub fn parse(args: &[String]) -> Result<Command> {
        let (name, rest) = args
            .split_first()
            .ok_or_else(|| usage("missing command"))?;

        let by_date = rest.iter().any(|a| a == "--by-date");
        let positional: Vec<&String> = rest.iter().filter(|a| !a.starts_with("--")).collect();
        if let Some(flag) = rest.iter().find(|a| a.starts_with("--") && *a != "--by-date") {
            return Err(usage(&format!("unknown option: {}", flag)));
        }

        let path = |i: usize, what: &str| {
            positional
                .get(i)
                .map(|p| PathBuf::from(p.as_str()))
                .ok_or_else(|| usage(&format!("missing {}", what)))
        };

        let command = match name.as_str() {
            "ledger" => Command::Ledger {
                ledger: path(0, "ledger file")?,
                initial_capital: parse_capital(positional.get(1).copied())?,
            },
            "project" => Command::Project {
                plan: path(0, "plan file")?,
                start_year: parse_start_year(positional.get(1).copied())?,
            },
            "wealth" => Command::Wealth {
                ledger: path(0, "ledger file")?,
                plan: path(1, "plan file")?,
                initial_capital: parse_capital(positional.get(2).copied())?,
                alignment: if by_date {
                    Alignment::ByDate
                } else {
                    Alignment::Positional
                },
            },
            "demo" => Command::Demo,
            other => return Err(usage(&format!("unknown command: {}", other))),
        };

        Ok(command)
    }
}

fn open(path: &Path) -> Result<BufReader<File>> {
    Ok(BufReader::new(File::open(path)?))
}

/// A dashboard over local repositories filled from files.
fn file_dashboard(ledger: &Path, initial_capital: Money) -> Result<Dashboard> {
    let months = read_ledger(open(ledger)?)?;
    Ok(Dashboard::new(Repositories {
        categories: Arc::new(LocalCategoryRepository::new()),
        ledger: Arc::new(LocalLedgerRepository::with_months(initial_capital, months)),
        plans: Arc::new(LocalPlanRepository::new()),
    }))
}

fn log_summary(summary: &WealthSummary) {
    info!(
        "Total wealth {} (liquid {} {}, invested {} {})",
        format_currency(summary.total_wealth),
        format_currency(summary.liquid_capital),
        format_percentage(summary.liquid_share),
        format_currency(summary.invested_capital),
        format_percentage(summary.invested_share),
    );
}

/// Executes a command, writing its CSV output to `out`.
pub fn run<W: Write>(command: Command, out: W) -> Result<()> {
    match command {
        Command::Ledger {
            ledger,
            initial_capital,
        } => {
            let dashboard = file_dashboard(&ledger, initial_capital)?;
            write_ledger(&dashboard.ledger()?, out)
        }
        Command::Project { plan, start_year } => {
            let plan = read_plan(open(&plan)?)?;
            plan.validate()?;
            write_projection(&project(&plan, start_year), out)
        }
        Command::Wealth {
            ledger,
            plan,
            initial_capital,
            alignment,
        } => {
            let dashboard = file_dashboard(&ledger, initial_capital)?;
            dashboard.update_investment_plan(&read_plan(open(&plan)?)?)?;

            let timeline = dashboard.wealth(alignment)?;
            log_summary(&WealthSummary::from_timeline(&timeline));
            write_wealth(&timeline, out)
        }
        Command::Demo => {
            let config = DemoConfig::default();
            let repos = Repositories::demo(&config);
            info!(
                "Demo plan: {} per month",
                format_currency(repos.plans.load()?.monthly_investment)
            );
            let dashboard = Dashboard::new(repos);
            write_ledger(&dashboard.ledger()?, out)
        }
    }
}
