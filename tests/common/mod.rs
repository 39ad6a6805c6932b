#![allow(dead_code)]

use estatesim::domain::error::EstateSimError;
use estatesim::domain::growth::{GrowthConfig, GrowthEstimator};
use estatesim::domain::portfolio::{HousePurchase, PortfolioConfig};
pub use estatesim::domain::series::{EconomyData, HousePriceRecord, PopulationRecord};
use estatesim::ports::series_port::SeriesPort;
use std::io::Write;
use std::path::Path;

pub const FIRST_YEAR: i32 = 1900;
pub const LAST_YEAR: i32 = 2100;

/// Population grows 1% a year throughout. The published change is 1.0%
/// before 2000 and 0.5% afterwards.
pub fn sample_population() -> Vec<PopulationRecord> {
    (FIRST_YEAR..=LAST_YEAR)
        .map(|year| PopulationRecord {
            year,
            population: 1e8 * 1.01_f64.powi(year - FIRST_YEAR),
            annual_pct_change: if year < 2000 { 1.0 } else { 0.5 },
        })
        .collect()
}

/// Prices grow 5% a year from 1963, with two observations per year that
/// average to the trend value.
pub fn sample_house_prices() -> Vec<HousePriceRecord> {
    (1963..=2022)
        .flat_map(|year| {
            let trend = 20_000.0 * 1.05_f64.powi(year - 1963);
            [
                HousePriceRecord {
                    year,
                    price: trend * 0.99,
                },
                HousePriceRecord {
                    year,
                    price: trend * 1.01,
                },
            ]
        })
        .collect()
}

pub fn sample_economy() -> EconomyData {
    EconomyData::from_records(&sample_house_prices(), &sample_population())
}

pub fn sample_estimator() -> GrowthEstimator {
    GrowthEstimator::new(sample_economy(), GrowthConfig::default()).unwrap()
}

pub fn sample_house() -> HousePurchase {
    HousePurchase::new(150_000.0, 7_500.0, 7.0, 0.006, 600.0, 1_200.0)
}

pub fn sample_portfolio_config() -> PortfolioConfig {
    PortfolioConfig::new(50_000.0, 2022.0)
}

pub struct MockSeriesPort {
    pub house_prices: Vec<HousePriceRecord>,
    pub population: Vec<PopulationRecord>,
    pub error: Option<String>,
}

impl MockSeriesPort {
    pub fn new() -> Self {
        Self {
            house_prices: sample_house_prices(),
            population: sample_population(),
            error: None,
        }
    }

    pub fn with_house_prices(mut self, records: Vec<HousePriceRecord>) -> Self {
        self.house_prices = records;
        self
    }

    pub fn with_error(mut self, reason: &str) -> Self {
        self.error = Some(reason.to_string());
        self
    }
}

impl SeriesPort for MockSeriesPort {
    fn load_house_prices(&self) -> Result<Vec<HousePriceRecord>, EstateSimError> {
        if let Some(reason) = &self.error {
            return Err(EstateSimError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self.house_prices.clone())
    }

    fn load_population(&self) -> Result<Vec<PopulationRecord>, EstateSimError> {
        Ok(self.population.clone())
    }
}

/// Writes the sample series as CSV files in the layout the file adapter reads.
pub fn write_sample_series(dir: &Path, prices_name: &str, population_name: &str) {
    let mut prices = std::fs::File::create(dir.join(prices_name)).unwrap();
    writeln!(prices, "DATE,MSPUS").unwrap();
    for (i, record) in sample_house_prices().iter().enumerate() {
        let month = if i % 2 == 0 { 1 } else { 7 };
        writeln!(prices, "{}-{:02}-01,{}", record.year, month, record.price).unwrap();
    }

    let mut population = std::fs::File::create(dir.join(population_name)).unwrap();
    writeln!(population, "date, Population, Annual % Change").unwrap();
    for record in sample_population() {
        writeln!(
            population,
            "{}-12-31,{},{}",
            record.year, record.population, record.annual_pct_change
        )
        .unwrap();
    }
}
