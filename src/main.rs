use anyhow::anyhow;
use clap::{CommandFactory, Parser};
use directories::ProjectDirs;
use tabled::Table;

use driftplan::{
    Dollar,
    holding::Holding,
    portfolio::{Action, Portfolio},
    target::AllocationTarget,
};

mod cli;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let opts = cli::Cli::parse();

    if let Some(shell) = opts.completions {
        let mut command = cli::Cli::command();
        clap_complete::generate(shell, &mut command, "driftplan", &mut std::io::stdout());
        return Ok(());
    }

    let holdings_path = opts
        .holdings
        .ok_or_else(|| anyhow!("No holdings file given"))?;
    let Some(target_path) = opts.target.or(ProjectDirs::from("", "", "driftplan")
        .map(|pdirs| pdirs.config_dir().join("target.yml")))
    else {
        anyhow::bail!("Failed to get target path");
    };

    let allocation = AllocationTarget::load_from_file(&target_path)?;
    println!("Target Allocations");
    allocation
        .iter()
        .for_each(|(ticker, fraction)| println!(" - {}: {:.1}%", ticker, fraction * 100.0));
    println!();

    let holdings = Holding::load_from_csv(&holdings_path)?;
    let portfolio = Portfolio::new(holdings, allocation)?;

    println!("Total portfolio value: {}", portfolio.total_value());
    println!();
    println!("{}", Table::new(portfolio.current_stats()));
    println!();

    let plan = portfolio.rebalance_plan(Dollar(opts.tolerance))?;
    println!("In order to reach your target allocations, the following actions are necessary.");
    for step in plan {
        match step.action {
            Action::Buy => println!(
                " - Buy {} shares of {} (approx. {})",
                step.quantity, step.ticker, step.value
            ),
            Action::Sell => println!(
                " - Sell {} shares of {} (approx. {})",
                step.quantity.abs(),
                step.ticker,
                step.value.abs()
            ),
            Action::Hold => println!(" - {} is already balanced, nothing to do", step.ticker),
        }
    }
    Ok(())
}
