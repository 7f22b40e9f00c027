use std::{fs::File, io, path::Path};

use anyhow::{Context, bail};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::Dollar;

/// A single position: what is held, at what unit price, and how much.
///
/// Immutable once constructed; the owning portfolio never changes it.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Holding {
    pub ticker: String,
    pub price: Dollar,
    pub quantity: f64,
}

impl Holding {
    pub fn new(ticker: impl Into<String>, price: Dollar, quantity: f64) -> Self {
        Self {
            ticker: ticker.into(),
            price,
            quantity,
        }
    }

    /// Market value of the position.
    pub fn value(&self) -> Dollar {
        self.price * self.quantity
    }

    /// Loads holdings from a `ticker,price,quantity` CSV file.
    pub fn load_from_csv(path: impl AsRef<Path>) -> anyhow::Result<Vec<Holding>> {
        let path = path.as_ref();
        let file =
            File::open(path).with_context(|| format!("Failed to open file {path:?}"))?;
        Self::parse_csv(file)
    }

    fn parse_csv(input: impl io::Read) -> anyhow::Result<Vec<Holding>> {
        let mut csv_reader = csv::Reader::from_reader(input);
        let headers = csv_reader.headers()?;
        if headers.get(0) != Some("ticker")
            || headers.get(1) != Some("price")
            || headers.get(2) != Some("quantity")
        {
            warn!(?headers, "Unexpected headers");
            bail!("Unexpected csv file format");
        }
        let mut holdings = Vec::new();
        for row in csv_reader.deserialize() {
            let holding: Holding = row?;
            debug!(?holding, "parsed row");
            holdings.push(holding);
        }
        Ok(holdings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_is_price_times_quantity() {
        let holding = Holding::new("META", Dollar(2.5), 4.0);
        assert_eq!(holding.value(), Dollar(10.0));
    }

    #[test]
    fn an_empty_position_is_worthless() {
        let holding = Holding::new("META", Dollar(485.32), 0.0);
        assert_eq!(holding.value(), Dollar(0.0));
    }

    #[test]
    fn parses_well_formed_csv() {
        let input = "ticker,price,quantity\nMETA,485.32,10\nAAPL,189.15,15\n";
        let holdings = Holding::parse_csv(input.as_bytes()).expect("Failed to parse");
        assert_eq!(
            holdings,
            [
                Holding::new("META", Dollar(485.32), 10.0),
                Holding::new("AAPL", Dollar(189.15), 15.0),
            ]
        );
    }

    #[test]
    fn rejects_unexpected_headers() {
        let input = "symbol,cost,count\nMETA,485.32,10\n";
        assert!(Holding::parse_csv(input.as_bytes()).is_err());
    }

    #[test]
    fn rejects_rows_that_are_not_numbers() {
        let input = "ticker,price,quantity\nMETA,a lot,10\n";
        assert!(Holding::parse_csv(input.as_bytes()).is_err());
    }
}
