//! Configuration validation.
//!
//! Validates all config fields before a simulation runs.

use crate::domain::error::EstateSimError;
use crate::domain::growth::{DEFAULT_BUYER_AGE, DEFAULT_END_YEAR, DEFAULT_START_YEAR};
use crate::domain::portfolio::{
    DEFAULT_CAPITAL_GAINS_TAX_RATE, DEFAULT_DOWN_PAYMENT_FRACTION, DEFAULT_INCOME_TAX_RATE,
    DEFAULT_INFLATION_RATE, DEFAULT_TERM_YEARS,
};
use crate::domain::scenario::{DEFAULT_YEARS, MAX_YEARS};
use crate::domain::stocks::DEFAULT_STOCK_GROWTH_FACTOR;
use crate::ports::config_port::ConfigPort;

pub const HOUSE_SECTION: &str = "house";

const REQUIRED_HOUSE_KEYS: [&str; 6] = [
    "price",
    "closing_costs",
    "apr",
    "property_tax_frac",
    "monthly_fees",
    "monthly_rent",
];

/// Whether `section` describes a house purchase (`[house]` or `[house.<name>]`).
pub fn is_house_section(section: &str) -> bool {
    section == HOUSE_SECTION
        || section
            .strip_prefix(HOUSE_SECTION)
            .is_some_and(|rest| rest.starts_with('.') && rest.len() > 1)
}

pub fn house_sections(config: &dyn ConfigPort) -> Vec<String> {
    config
        .sections()
        .into_iter()
        .filter(|s| is_house_section(s))
        .collect()
}

pub fn require_string(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<String, EstateSimError> {
    config
        .get_string(section, key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| EstateSimError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        })
}

pub fn require_double(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<f64, EstateSimError> {
    let raw = require_string(config, section, key)?;
    parse_double(section, key, &raw)
}

/// Parses `key` when present, otherwise returns `default`.
pub fn optional_double(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, EstateSimError> {
    match config.get_string(section, key) {
        Some(raw) if !raw.trim().is_empty() => parse_double(section, key, &raw),
        _ => Ok(default),
    }
}

pub fn optional_int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<i64, EstateSimError> {
    match config.get_string(section, key) {
        Some(raw) if !raw.trim().is_empty() => {
            raw.trim()
                .parse::<i64>()
                .map_err(|_| invalid(section, key, "must be an integer"))
        }
        _ => Ok(default),
    }
}

/// Accepts `true/yes/on/1` and `false/no/off/0`, case-insensitively.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

pub fn optional_bool(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: bool,
) -> Result<bool, EstateSimError> {
    match config.get_string(section, key) {
        Some(raw) if !raw.trim().is_empty() => {
            parse_bool(&raw).ok_or_else(|| invalid(section, key, "must be true or false"))
        }
        _ => Ok(default),
    }
}

/// Checks a simulation horizon, whether it came from the config file or the
/// command line.
pub fn check_years(years: i64) -> Result<u32, EstateSimError> {
    u32::try_from(years)
        .ok()
        .filter(|y| (1..=MAX_YEARS).contains(y))
        .ok_or_else(|| {
            invalid(
                "simulation",
                "years",
                &format!("years must be between 1 and {MAX_YEARS}"),
            )
        })
}

fn parse_double(section: &str, key: &str, raw: &str) -> Result<f64, EstateSimError> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(invalid(section, key, "must be a number")),
    }
}

fn invalid(section: &str, key: &str, reason: &str) -> EstateSimError {
    EstateSimError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

pub fn validate_simulation_config(config: &dyn ConfigPort) -> Result<(), EstateSimError> {
    validate_data(config)?;
    validate_economy(config)?;
    validate_portfolio(config)?;
    let years = validate_simulation(config)?;
    for section in house_sections(config) {
        validate_house(config, &section, years)?;
    }
    Ok(())
}

fn validate_data(config: &dyn ConfigPort) -> Result<(), EstateSimError> {
    require_string(config, "data", "house_prices")?;
    require_string(config, "data", "population")?;
    Ok(())
}

pub fn validate_economy(config: &dyn ConfigPort) -> Result<(), EstateSimError> {
    let start = optional_int(config, "economy", "start_year", DEFAULT_START_YEAR.into())?;
    let end = optional_int(config, "economy", "end_year", DEFAULT_END_YEAR.into())?;
    if end <= start {
        return Err(invalid(
            "economy",
            "end_year",
            "end_year must be after start_year",
        ));
    }
    let buyer_age = optional_int(config, "economy", "buyer_age", DEFAULT_BUYER_AGE.into())?;
    if buyer_age <= 0 {
        return Err(invalid("economy", "buyer_age", "buyer_age must be positive"));
    }
    let inflation = optional_double(config, "economy", "inflation_rate", DEFAULT_INFLATION_RATE)?;
    if inflation <= -1.0 {
        return Err(invalid(
            "economy",
            "inflation_rate",
            "inflation_rate must be greater than -1",
        ));
    }
    Ok(())
}

fn validate_portfolio(config: &dyn ConfigPort) -> Result<(), EstateSimError> {
    let capital = require_double(config, "portfolio", "capital")?;
    if capital < 0.0 {
        return Err(invalid("portfolio", "capital", "capital must be non-negative"));
    }
    require_double(config, "portfolio", "starting_year")?;
    optional_double(config, "portfolio", "monthly_contribution", 0.0)?;

    for (key, default) in [
        ("income_tax_rate", DEFAULT_INCOME_TAX_RATE),
        ("capital_gains_tax_rate", DEFAULT_CAPITAL_GAINS_TAX_RATE),
    ] {
        let rate = optional_double(config, "portfolio", key, default)?;
        if !(0.0..=1.0).contains(&rate) {
            return Err(invalid("portfolio", key, "rate must be between 0 and 1"));
        }
    }

    let growth = optional_double(
        config,
        "portfolio",
        "stock_growth_factor",
        DEFAULT_STOCK_GROWTH_FACTOR,
    )?;
    if growth <= 0.0 {
        return Err(invalid(
            "portfolio",
            "stock_growth_factor",
            "stock_growth_factor must be positive",
        ));
    }
    optional_bool(config, "portfolio", "property_tax", true)?;
    Ok(())
}

fn validate_simulation(config: &dyn ConfigPort) -> Result<u32, EstateSimError> {
    let years = check_years(optional_int(
        config,
        "simulation",
        "years",
        DEFAULT_YEARS.into(),
    )?)?;
    optional_bool(config, "simulation", "after_capital_gains_tax", false)?;
    optional_bool(config, "simulation", "adjust_for_inflation", false)?;
    Ok(years)
}

fn validate_house(config: &dyn ConfigPort, section: &str, years: u32) -> Result<(), EstateSimError> {
    for key in REQUIRED_HOUSE_KEYS {
        let value = require_double(config, section, key)?;
        if value < 0.0 {
            return Err(invalid(section, key, "must be non-negative"));
        }
    }
    if require_double(config, section, "price")? <= 0.0 {
        return Err(invalid(section, "price", "price must be positive"));
    }

    let fraction = optional_double(
        config,
        section,
        "down_payment_fraction",
        DEFAULT_DOWN_PAYMENT_FRACTION,
    )?;
    if !(0.0..=1.0).contains(&fraction) {
        return Err(invalid(
            section,
            "down_payment_fraction",
            "down_payment_fraction must be between 0 and 1",
        ));
    }

    let term = optional_int(config, section, "years_on_loan", DEFAULT_TERM_YEARS.into())?;
    if !(1..=100).contains(&term) {
        return Err(invalid(
            section,
            "years_on_loan",
            "years_on_loan must be between 1 and 100",
        ));
    }

    let month = optional_int(config, section, "purchase_month", 0)?;
    if month < 0 || month > i64::from(years) * 12 {
        return Err(invalid(
            section,
            "purchase_month",
            "purchase_month must fall within the simulation",
        ));
    }
    Ok(())
}
