//! CSV file series adapter.
//!
//! House prices come from a FRED `MSPUS` export (`DATE,MSPUS`, quarterly);
//! population from a `date,Population,Annual % Change` table that extends
//! into projected years.

use crate::domain::error::EstateSimError;
use crate::domain::series::{HousePriceRecord, PopulationRecord};
use crate::ports::series_port::SeriesPort;
use chrono::{Datelike, NaiveDate};
use std::fs;
use std::path::{Path, PathBuf};

pub struct CsvSeriesAdapter {
    house_prices_path: PathBuf,
    population_path: PathBuf,
}

impl CsvSeriesAdapter {
    pub fn new(house_prices_path: PathBuf, population_path: PathBuf) -> Self {
        Self {
            house_prices_path,
            population_path,
        }
    }

    fn read_records(path: &Path) -> Result<(csv::StringRecord, Vec<csv::StringRecord>), EstateSimError> {
        let content = fs::read_to_string(path).map_err(|e| EstateSimError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| EstateSimError::Data {
                reason: format!("CSV header error in {}: {}", path.display(), e),
            })?
            .clone();

        let mut records = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| EstateSimError::Data {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;
            records.push(record);
        }
        Ok((headers, records))
    }
}

impl SeriesPort for CsvSeriesAdapter {
    fn load_house_prices(&self) -> Result<Vec<HousePriceRecord>, EstateSimError> {
        let (headers, records) = Self::read_records(&self.house_prices_path)?;
        let date_col = column(&headers, "date")?;
        let price_col = column(&headers, "mspus")?;

        records
            .iter()
            .map(|record| -> Result<HousePriceRecord, EstateSimError> {
                Ok(HousePriceRecord {
                    year: parse_year(field(record, date_col, "DATE")?)?,
                    price: parse_number(field(record, price_col, "MSPUS")?, "MSPUS")?,
                })
            })
            .collect()
    }

    fn load_population(&self) -> Result<Vec<PopulationRecord>, EstateSimError> {
        let (headers, records) = Self::read_records(&self.population_path)?;
        let date_col = column(&headers, "date")?;
        let population_col = column(&headers, "population")?;
        let change_col = column(&headers, "annual % change")?;

        records
            .iter()
            .map(|record| -> Result<PopulationRecord, EstateSimError> {
                Ok(PopulationRecord {
                    year: parse_year(field(record, date_col, "date")?)?,
                    population: parse_number(
                        field(record, population_col, "Population")?,
                        "Population",
                    )?,
                    annual_pct_change: parse_number(
                        field(record, change_col, "Annual % Change")?,
                        "Annual % Change",
                    )?,
                })
            })
            .collect()
    }
}

fn column(headers: &csv::StringRecord, name: &str) -> Result<usize, EstateSimError> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| EstateSimError::Data {
            reason: format!("missing {} column", name),
        })
}

fn field<'a>(record: &'a csv::StringRecord, index: usize, name: &str) -> Result<&'a str, EstateSimError> {
    record.get(index).ok_or_else(|| EstateSimError::Data {
        reason: format!("missing {} value", name),
    })
}

/// Accepts `YYYY-MM-DD` dates or bare years.
fn parse_year(value: &str) -> Result<i32, EstateSimError> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date.year());
    }
    value.parse::<i32>().map_err(|_| EstateSimError::Data {
        reason: format!("invalid date format: {}", value),
    })
}

fn parse_number(value: &str, name: &str) -> Result<f64, EstateSimError> {
    value
        .replace(',', "")
        .parse::<f64>()
        .map_err(|e| EstateSimError::Data {
            reason: format!("invalid {} value {:?}: {}", name, value, e),
        })
}
