//! Wealth Engine CLI
//!
//! Recalculates ledger files, projects investment plans and prints the
//! combined wealth timeline as CSV.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- ledger ledger.csv 5000 > balances.csv
//! cargo run -- project plan.json 2025 > projection.csv
//! cargo run -- wealth ledger.csv plan.json 5000 --by-date > wealth.csv
//! cargo run -- demo
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug`, `info` or `warn` to control logging verbosity

use std::env;
use std::io;
use std::process;
use wealth_engine::cli::{self, Command};
use wealth_engine::Result;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let command = Command::parse(&args)?;

    let stdout = io::stdout();
    let handle = stdout.lock();
    cli::run(command, handle)
}
