use tabled::Tabled;
use thiserror::Error;
use tracing::debug;

use crate::{Dollar, Fraction, holding::Holding, round_to, target::AllocationTarget};

/// Value difference below which a holding is left where it is.
pub const DEFAULT_TOLERANCE: Dollar = Dollar(1e-4);

/// How far the target fractions may stray from summing to exactly 1.
const ALLOCATION_SUM_TOLERANCE: Fraction = 1e-4;

/// A portfolio construction problem.
///
/// Raised before any derived state exists; a portfolio that failed
/// validation is never observable.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Target fractions do not sum to ~100%.
    #[error("target allocation must sum to 100%, got {:.2}%", .sum * 100.0)]
    AllocationSum { sum: Fraction },
    /// One or more holdings have no target fraction.
    #[error("no target allocation for: {}", .tickers.join(", "))]
    MissingAllocation { tickers: Vec<String> },
    /// One or more targets reference tickers the portfolio does not hold.
    #[error("target allocation for tickers not held: {}", .tickers.join(", "))]
    OrphanAllocation { tickers: Vec<String> },
}

/// A rebalance step would divide by a price that is not strictly positive.
///
/// Prices are positive by contract; this surfaces a violated invariant
/// instead of letting NaN or infinity leak into the plan.
#[derive(Debug, Error, PartialEq)]
#[error("cannot size an order for {ticker}: unit price {price} is not positive")]
pub struct DivisionError {
    pub ticker: String,
    pub price: Dollar,
}

/// Per-holding snapshot of where the portfolio stands against its targets.
#[derive(Clone, Debug, PartialEq, Tabled)]
pub struct StatRecord {
    #[tabled(rename = "Ticker")]
    pub ticker: String,
    #[tabled(rename = "Quantity")]
    pub quantity: f64,
    #[tabled(rename = "Value")]
    pub value: Dollar,
    #[tabled(rename = "Current")]
    pub current_allocation: String,
    #[tabled(rename = "Target")]
    pub target_allocation: String,
    /// Exact equality of the rounded current fraction with the target.
    /// Deliberately stricter than the rebalance tolerance: the flag is
    /// cosmetic, the plan is actionable.
    #[tabled(rename = "Balanced")]
    pub balanced: bool,
    /// Current fraction rounded to 4 decimals, for programmatic comparison.
    #[tabled(skip)]
    pub current_fraction: Fraction,
    #[tabled(skip)]
    pub target_fraction: Fraction,
}

/// What to do with a holding to move it toward target.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Action {
    Hold,
    Buy,
    Sell,
}

/// One step of a rebalance plan.
///
/// Quantity and value are signed: positive for buys, negative for sells.
/// Callers that display an unsigned count take the absolute value.
#[derive(Clone, Debug, PartialEq)]
pub struct RebalanceAction {
    pub ticker: String,
    pub action: Action,
    pub quantity: f64,
    pub value: Dollar,
}

/// A snapshot of holdings plus the target allocation they should converge
/// to.
///
/// Consistency between the two is validated once, here; the derivation
/// methods are pure functions of the validated snapshot and can no longer
/// fail on a missing target.
#[derive(Clone, Debug)]
pub struct Portfolio {
    holdings: Vec<Holding>,
    allocation: AllocationTarget,
}

impl Portfolio {
    pub fn new(
        holdings: Vec<Holding>,
        allocation: AllocationTarget,
    ) -> Result<Self, ValidationError> {
        // An empty allocation over an empty portfolio is trivially
        // consistent.
        if !(holdings.is_empty() && allocation.is_empty()) {
            let sum = allocation.sum();
            if (sum - 1.0).abs() >= ALLOCATION_SUM_TOLERANCE {
                return Err(ValidationError::AllocationSum { sum });
            }
        }
        let missing: Vec<String> = holdings
            .iter()
            .filter(|holding| !allocation.contains(&holding.ticker))
            .map(|holding| holding.ticker.clone())
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingAllocation { tickers: missing });
        }
        let orphaned: Vec<String> = allocation
            .tickers()
            .filter(|ticker| !holdings.iter().any(|holding| holding.ticker == *ticker))
            .map(str::to_owned)
            .collect();
        if !orphaned.is_empty() {
            return Err(ValidationError::OrphanAllocation { tickers: orphaned });
        }
        Ok(Self {
            holdings,
            allocation,
        })
    }

    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    pub fn allocation(&self) -> &AllocationTarget {
        &self.allocation
    }

    /// Total market value across every holding. `$0` when empty.
    pub fn total_value(&self) -> Dollar {
        self.holdings.iter().map(Holding::value).sum()
    }

    /// Current versus target allocation, one record per holding in input
    /// order. Empty when the portfolio has no value.
    pub fn current_stats(&self) -> Vec<StatRecord> {
        let total = self.total_value();
        if total == Dollar(0.0) {
            return Vec::new();
        }
        self.holdings
            .iter()
            .map(|holding| {
                let value = holding.value();
                let current_fraction = round_to(value.0 / total.0, 4);
                let target_fraction = self
                    .allocation
                    .get(&holding.ticker)
                    .expect("every holding has a target after validation");
                StatRecord {
                    ticker: holding.ticker.clone(),
                    quantity: holding.quantity,
                    value,
                    current_allocation: format_percent(current_fraction),
                    target_allocation: format_percent(target_fraction),
                    balanced: current_fraction == target_fraction,
                    current_fraction,
                    target_fraction,
                }
            })
            .collect()
    }

    /// Buy/sell/hold steps that move each holding to its target value,
    /// leaving alone any holding already within `tolerance` dollars.
    /// Empty when the portfolio has no value.
    pub fn rebalance_plan(
        &self,
        tolerance: Dollar,
    ) -> Result<Vec<RebalanceAction>, DivisionError> {
        let total = self.total_value();
        if total == Dollar(0.0) {
            return Ok(Vec::new());
        }
        let plan = self
            .holdings
            .iter()
            .map(|holding| {
                let target_fraction = self
                    .allocation
                    .get(&holding.ticker)
                    .expect("every holding has a target after validation");
                let diff = total * target_fraction - holding.value();
                if diff.abs() < tolerance {
                    return Ok(RebalanceAction {
                        ticker: holding.ticker.clone(),
                        action: Action::Hold,
                        quantity: 0.0,
                        value: Dollar(0.0),
                    });
                }
                if holding.price <= Dollar(0.0) {
                    return Err(DivisionError {
                        ticker: holding.ticker.clone(),
                        price: holding.price,
                    });
                }
                let action = if diff > Dollar(0.0) {
                    Action::Buy
                } else {
                    Action::Sell
                };
                Ok(RebalanceAction {
                    ticker: holding.ticker.clone(),
                    action,
                    quantity: round_to(diff.0 / holding.price.0, 6),
                    value: diff.round_cents(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        debug!(?plan, "computed rebalance plan");
        Ok(plan)
    }
}

fn format_percent(fraction: Fraction) -> String {
    format!("{:.2}%", fraction * 100.0)
}
