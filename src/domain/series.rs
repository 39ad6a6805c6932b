//! Historical house-price and population series.
//!
//! Both series are immutable lookup tables keyed by calendar year. They are
//! built once from raw records and shared read-only for a whole run.

use std::collections::BTreeMap;

/// One raw median house price observation. Source data is usually quarterly,
/// so several records may share a year.
#[derive(Debug, Clone, PartialEq)]
pub struct HousePriceRecord {
    pub year: i32,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PopulationRecord {
    pub year: i32,
    pub population: f64,
    /// Published year-over-year change, in percent.
    pub annual_pct_change: f64,
}

/// Median house price per year, averaged over all observations of the year.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HousePriceSeries {
    prices: BTreeMap<i32, f64>,
}

impl HousePriceSeries {
    pub fn from_records(records: &[HousePriceRecord]) -> Self {
        let mut sums: BTreeMap<i32, (f64, usize)> = BTreeMap::new();
        for record in records {
            let entry = sums.entry(record.year).or_insert((0.0, 0));
            entry.0 += record.price;
            entry.1 += 1;
        }
        let prices = sums
            .into_iter()
            .map(|(year, (sum, count))| (year, sum / count as f64))
            .collect();
        Self { prices }
    }

    pub fn price(&self, year: i32) -> Option<f64> {
        self.prices.get(&year).copied()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn year_range(&self) -> Option<(i32, i32)> {
        let first = self.prices.keys().next()?;
        let last = self.prices.keys().next_back()?;
        Some((*first, *last))
    }
}

/// Population per year with its published annual percent change.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PopulationSeries {
    records: BTreeMap<i32, PopulationRecord>,
}

impl PopulationSeries {
    /// Later records for the same year replace earlier ones.
    pub fn from_records(records: &[PopulationRecord]) -> Self {
        let records = records
            .iter()
            .map(|r| (r.year, r.clone()))
            .collect::<BTreeMap<_, _>>();
        Self { records }
    }

    pub fn population(&self, year: i32) -> Option<f64> {
        self.records.get(&year).map(|r| r.population)
    }

    pub fn annual_pct_change(&self, year: i32) -> Option<f64> {
        self.records.get(&year).map(|r| r.annual_pct_change)
    }

    /// The most recent entry, used when a query runs past the projections.
    pub fn last(&self) -> Option<&PopulationRecord> {
        self.records.values().next_back()
    }

    pub fn last_year(&self) -> Option<i32> {
        self.records.keys().next_back().copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// The two read-only tables the growth estimator is built from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EconomyData {
    pub house_prices: HousePriceSeries,
    pub population: PopulationSeries,
}

impl EconomyData {
    pub fn new(house_prices: HousePriceSeries, population: PopulationSeries) -> Self {
        Self {
            house_prices,
            population,
        }
    }

    pub fn from_records(prices: &[HousePriceRecord], population: &[PopulationRecord]) -> Self {
        Self::new(
            HousePriceSeries::from_records(prices),
            PopulationSeries::from_records(population),
        )
    }
}
