use std::path::PathBuf;

use clap::Parser;
use clap_complete::Shell;

use driftplan::portfolio::DEFAULT_TOLERANCE;

#[derive(Parser, Debug)]
#[command(version, about = "Portfolio allocation statistics and rebalance planning")]
pub(crate) struct Cli {
    #[arg(
        required_unless_present = "completions",
        help = "Current holdings CSV (ticker,price,quantity)"
    )]
    pub holdings: Option<PathBuf>,
    #[arg(short, long, help = "Target allocation YAML")]
    pub target: Option<PathBuf>,
    #[arg(
        long,
        default_value_t = DEFAULT_TOLERANCE.0,
        help = "Value difference in dollars below which a holding is left alone"
    )]
    pub tolerance: f64,
    #[arg(long, value_enum, help = "Print shell completions and exit")]
    pub completions: Option<Shell>,
}
