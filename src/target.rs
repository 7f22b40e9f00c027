use std::{fmt, fs::File, path::Path};

use anyhow::Context;
use serde::{
    Deserialize, Deserializer,
    de::{MapAccess, Visitor},
};
use tracing::debug;

use crate::Fraction;

/// Target allocation: ticker mapped to the desired fraction of total
/// portfolio value.
///
/// Entries keep their insertion order, which error reporting and display
/// rely on. Lookups are linear; a portfolio holds a handful of tickers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AllocationTarget {
    entries: Vec<(String, Fraction)>,
}

impl AllocationTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the target fraction for `ticker`. An earlier entry for the same
    /// ticker is overwritten in place, keeping its position.
    pub fn set(&mut self, ticker: impl Into<String>, fraction: Fraction) {
        let ticker = ticker.into();
        match self.entries.iter_mut().find(|(t, _)| *t == ticker) {
            Some((_, f)) => *f = fraction,
            None => self.entries.push((ticker, fraction)),
        }
    }

    pub fn get(&self, ticker: &str) -> Option<Fraction> {
        self.entries
            .iter()
            .find(|(t, _)| t.as_str() == ticker)
            .map(|(_, f)| *f)
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.get(ticker).is_some()
    }

    /// Sum of every target fraction.
    pub fn sum(&self) -> Fraction {
        self.entries.iter().map(|(_, f)| f).sum()
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(t, _)| t.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Fraction)> {
        self.entries.iter().map(|(t, f)| (t.as_str(), *f))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Loads a target allocation from a YAML mapping of ticker to fraction.
    pub fn load_from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file =
            File::open(path).with_context(|| format!("Failed to open file {path:?}"))?;
        let target: AllocationTarget = serde_yaml::from_reader(file)?;
        debug!(?target, "loaded target allocation");
        Ok(target)
    }
}

impl<S: Into<String>> FromIterator<(S, Fraction)> for AllocationTarget {
    fn from_iter<I: IntoIterator<Item = (S, Fraction)>>(iter: I) -> Self {
        let mut target = Self::new();
        for (ticker, fraction) in iter {
            target.set(ticker, fraction);
        }
        target
    }
}

impl<'de> Deserialize<'de> for AllocationTarget {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TargetVisitor;

        impl<'de> Visitor<'de> for TargetVisitor {
            type Value = AllocationTarget;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of ticker to target fraction")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut target = AllocationTarget::new();
                while let Some((ticker, fraction)) = map.next_entry::<String, Fraction>()? {
                    target.set(ticker, fraction);
                }
                Ok(target)
            }
        }

        deserializer.deserialize_map(TargetVisitor)
    }
}
