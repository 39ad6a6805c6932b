//! House-price growth estimation.
//!
//! Long-run median house prices track inflation and housing demand. Demand is
//! proxied by the growth of the population that reaches first-purchase age,
//! which for a given year is the population growth `buyer_age` years earlier.
//! The historical price trend is shifted by the difference between that
//! demand growth and the demand growth over the historical window.

use super::error::GrowthError;
use super::series::EconomyData;

pub const DEFAULT_START_YEAR: i32 = 1983;
pub const DEFAULT_END_YEAR: i32 = 2022;
pub const DEFAULT_BUYER_AGE: i32 = 33;

/// Source of the monthly house-price growth rate for a calendar year.
pub trait GrowthModel {
    fn monthly_house_growth_rate(&self, year: i32) -> Result<f64, GrowthError>;
}

impl<G: GrowthModel + ?Sized> GrowthModel for &G {
    fn monthly_house_growth_rate(&self, year: i32) -> Result<f64, GrowthError> {
        (**self).monthly_house_growth_rate(year)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthConfig {
    pub start_year: i32,
    pub end_year: i32,
    /// Typical age of a first-time home buyer.
    pub buyer_age: i32,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            start_year: DEFAULT_START_YEAR,
            end_year: DEFAULT_END_YEAR,
            buyer_age: DEFAULT_BUYER_AGE,
        }
    }
}

/// Compound annual growth factor between two values `years` apart.
pub fn historical_growth_factor(starting_value: f64, ending_value: f64, years: f64) -> f64 {
    (ending_value / starting_value).powf(1.0 / years)
}

/// Converts an annual growth factor into the equivalent monthly rate.
pub fn monthly_rate_from_annual_factor(annual_factor: f64) -> f64 {
    annual_factor.powf(1.0 / 12.0) - 1.0
}

#[derive(Debug, Clone)]
pub struct GrowthEstimator {
    data: EconomyData,
    config: GrowthConfig,
    historical_population_growth_factor: f64,
    historical_house_price_growth_factor: f64,
}

impl GrowthEstimator {
    pub fn new(data: EconomyData, config: GrowthConfig) -> Result<Self, GrowthError> {
        let GrowthConfig {
            start_year,
            end_year,
            buyer_age,
        } = config;
        if end_year <= start_year {
            return Err(GrowthError::InvalidWindow {
                start_year,
                end_year,
            });
        }
        let n_years = f64::from(end_year - start_year);

        let positive = |series: &'static str, year: i32, value: Option<f64>| match value {
            None => Err(GrowthError::MissingHistoricalData { series, year }),
            Some(value) if value.is_finite() && value > 0.0 => Ok(value),
            Some(value) => Err(GrowthError::NonPositiveHistoricalData {
                series,
                year,
                value,
            }),
        };
        let population_at =
            |year: i32| positive("population", year, data.population.population(year));
        let price_at = |year: i32| positive("house price", year, data.house_prices.price(year));

        let starting_population = population_at(start_year - buyer_age)?;
        let ending_population = population_at(end_year - buyer_age)?;
        let starting_price = price_at(start_year)?;
        let ending_price = price_at(end_year)?;

        let historical_population_growth_factor =
            historical_growth_factor(starting_population, ending_population, n_years);
        let historical_house_price_growth_factor =
            historical_growth_factor(starting_price, ending_price, n_years);

        Ok(Self {
            data,
            config,
            historical_population_growth_factor,
            historical_house_price_growth_factor,
        })
    }

    pub fn with_defaults(data: EconomyData) -> Result<Self, GrowthError> {
        Self::new(data, GrowthConfig::default())
    }

    pub fn config(&self) -> &GrowthConfig {
        &self.config
    }

    pub fn historical_population_growth_factor(&self) -> f64 {
        self.historical_population_growth_factor
    }

    pub fn historical_house_price_growth_factor(&self) -> f64 {
        self.historical_house_price_growth_factor
    }

    /// Growth factor of the home-buying population in `year`.
    ///
    /// Years whose buyers were born past the end of the population series
    /// fall back to the most recent published change.
    pub fn population_growth_factor(&self, year: i32) -> Result<f64, GrowthError> {
        let buyer_age = self.config.buyer_age;
        let population = &self.data.population;
        let pct_change = match population.last() {
            Some(last) if year + buyer_age > last.year => last.annual_pct_change,
            _ => {
                let birth_year = year - buyer_age;
                population
                    .annual_pct_change(birth_year)
                    .ok_or(GrowthError::YearNotCovered {
                        year: birth_year,
                        requested: year,
                    })?
            }
        };
        Ok(pct_change / 100.0 + 1.0)
    }

    pub fn annual_house_growth_factor(&self, year: i32) -> Result<f64, GrowthError> {
        let current = self.population_growth_factor(year)?;
        Ok(self.historical_house_price_growth_factor + current
            - self.historical_population_growth_factor)
    }
}

impl GrowthModel for GrowthEstimator {
    fn monthly_house_growth_rate(&self, year: i32) -> Result<f64, GrowthError> {
        self.annual_house_growth_factor(year)
            .map(monthly_rate_from_annual_factor)
    }
}

/// A fixed monthly growth rate, independent of the year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantGrowth {
    pub monthly_rate: f64,
}

impl ConstantGrowth {
    pub fn new(monthly_rate: f64) -> Self {
        Self { monthly_rate }
    }

    pub fn from_annual_factor(annual_factor: f64) -> Self {
        Self::new(monthly_rate_from_annual_factor(annual_factor))
    }

    pub fn zero() -> Self {
        Self::new(0.0)
    }
}

impl GrowthModel for ConstantGrowth {
    fn monthly_house_growth_rate(&self, _year: i32) -> Result<f64, GrowthError> {
        Ok(self.monthly_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::{
        HousePriceRecord, HousePriceSeries, PopulationRecord, PopulationSeries,
    };
    use approx::assert_relative_eq;

    // Population grows 1%/yr from 1900 to 2100; prices grow 5%/yr.
    fn sample_data() -> EconomyData {
        let population: Vec<PopulationRecord> = (1900..=2100)
            .map(|year| PopulationRecord {
                year,
                population: 1.0e8 * 1.01f64.powi(year - 1900),
                annual_pct_change: if year < 2000 { 1.0 } else { 0.5 },
            })
            .collect();
        let prices: Vec<HousePriceRecord> = (1963..=2022)
            .flat_map(|year| {
                let base = 20_000.0 * 1.05f64.powi(year - 1963);
                [
                    HousePriceRecord {
                        year,
                        price: base * 0.99,
                    },
                    HousePriceRecord {
                        year,
                        price: base * 1.01,
                    },
                ]
            })
            .collect();
        EconomyData::from_records(&prices, &population)
    }

    #[test]
    fn historical_factor_is_geometric_mean() {
        assert_relative_eq!(historical_growth_factor(100.0, 121.0, 2.0), 1.1, epsilon = 1e-12);
    }

    #[test]
    fn monthly_rate_compounds_back_to_annual() {
        let monthly = monthly_rate_from_annual_factor(1.06);
        assert_relative_eq!((1.0 + monthly).powi(12), 1.06, epsilon = 1e-12);
    }

    #[test]
    fn construction_derives_historical_factors() {
        let estimator = GrowthEstimator::with_defaults(sample_data()).unwrap();
        assert_relative_eq!(
            estimator.historical_population_growth_factor(),
            1.01,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            estimator.historical_house_price_growth_factor(),
            1.05,
            epsilon = 1e-9
        );
    }

    #[test]
    fn rate_adjusts_by_population_delta() {
        let estimator = GrowthEstimator::with_defaults(sample_data()).unwrap();

        // 2025 buyers were born in 1992 (1% growth): historical trend holds.
        let annual = estimator.annual_house_growth_factor(2025).unwrap();
        assert_relative_eq!(annual, 1.05, epsilon = 1e-9);

        // 2040 buyers were born in 2007 (0.5% growth): half a point lower.
        let annual = estimator.annual_house_growth_factor(2040).unwrap();
        assert_relative_eq!(annual, 1.045, epsilon = 1e-9);

        let monthly = estimator.monthly_house_growth_rate(2040).unwrap();
        assert_relative_eq!((1.0 + monthly).powi(12), 1.045, epsilon = 1e-9);
    }

    #[test]
    fn falls_back_to_last_published_change() {
        let mut population: Vec<PopulationRecord> = (1900..=2100)
            .map(|year| PopulationRecord {
                year,
                population: 1.0e8 * 1.01f64.powi(year - 1900),
                annual_pct_change: 1.0,
            })
            .collect();
        population.last_mut().unwrap().annual_pct_change = 0.25;
        let prices = [
            HousePriceRecord {
                year: 1983,
                price: 100.0,
            },
            HousePriceRecord {
                year: 2022,
                price: 200.0,
            },
        ];
        let estimator =
            GrowthEstimator::with_defaults(EconomyData::from_records(&prices, &population))
                .unwrap();

        // 2067 + 33 == 2100: still a regular lookup of 2034.
        assert_relative_eq!(
            estimator.population_growth_factor(2067).unwrap(),
            1.01,
            epsilon = 1e-12
        );
        // 2068 + 33 > 2100: use the final record.
        assert_relative_eq!(
            estimator.population_growth_factor(2068).unwrap(),
            1.0025,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            estimator.population_growth_factor(2500).unwrap(),
            1.0025,
            epsilon = 1e-12
        );
    }

    #[test]
    fn year_before_series_is_lookup_error() {
        let estimator = GrowthEstimator::with_defaults(sample_data()).unwrap();
        let err = estimator.monthly_house_growth_rate(1920).unwrap_err();
        assert_eq!(
            err,
            GrowthError::YearNotCovered {
                year: 1887,
                requested: 1920
            }
        );
    }

    #[test]
    fn missing_boundary_population_is_configuration_error() {
        let data = sample_data();
        let config = GrowthConfig {
            start_year: 1983,
            end_year: 2022,
            buyer_age: 100,
        };
        let err = GrowthEstimator::new(data, config).unwrap_err();
        assert_eq!(
            err,
            GrowthError::MissingHistoricalData {
                series: "population",
                year: 1883
            }
        );
    }

    #[test]
    fn missing_boundary_price_is_configuration_error() {
        let config = GrowthConfig {
            start_year: 1983,
            end_year: 2023,
            buyer_age: 33,
        };
        let err = GrowthEstimator::new(sample_data(), config).unwrap_err();
        assert_eq!(
            err,
            GrowthError::MissingHistoricalData {
                series: "house price",
                year: 2023
            }
        );
    }

    #[test]
    fn non_positive_boundary_values_are_rejected() {
        let population = sample_data().population;
        let prices = [
            HousePriceRecord {
                year: 1983,
                price: 0.0,
            },
            HousePriceRecord {
                year: 2022,
                price: 250_000.0,
            },
        ];
        let data = EconomyData::new(HousePriceSeries::from_records(&prices), population);
        assert!(matches!(
            GrowthEstimator::with_defaults(data),
            Err(GrowthError::NonPositiveHistoricalData {
                series: "house price",
                year: 1983,
                ..
            })
        ));

        let records = [
            PopulationRecord {
                year: 1950,
                population: -1.0,
                annual_pct_change: 1.0,
            },
            PopulationRecord {
                year: 1989,
                population: 2.0e8,
                annual_pct_change: 1.0,
            },
        ];
        let data = EconomyData::new(
            sample_data().house_prices,
            PopulationSeries::from_records(&records),
        );
        assert!(matches!(
            GrowthEstimator::with_defaults(data),
            Err(GrowthError::NonPositiveHistoricalData {
                series: "population",
                year: 1950,
                ..
            })
        ));
    }

    #[test]
    fn inverted_window_is_rejected() {
        let config = GrowthConfig {
            start_year: 2022,
            end_year: 2022,
            buyer_age: 33,
        };
        assert!(matches!(
            GrowthEstimator::new(sample_data(), config),
            Err(GrowthError::InvalidWindow { .. })
        ));
    }

    #[test]
    fn constant_growth_ignores_year() {
        let model = ConstantGrowth::new(0.004);
        assert_eq!(model.monthly_house_growth_rate(1900), Ok(0.004));
        assert_eq!(model.monthly_house_growth_rate(3000), Ok(0.004));
        assert_eq!(ConstantGrowth::zero().monthly_house_growth_rate(2022), Ok(0.0));
    }

    #[test]
    fn models_are_usable_through_references() {
        let estimator = GrowthEstimator::with_defaults(sample_data()).unwrap();
        let by_ref: &dyn GrowthModel = &estimator;
        assert_eq!(
            by_ref.monthly_house_growth_rate(2030),
            estimator.monthly_house_growth_rate(2030)
        );
    }
}
