//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvSeriesAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config_validation::{
    check_years, house_sections, optional_bool, optional_double, optional_int, require_double,
    require_string, validate_economy, validate_simulation_config,
};
use crate::domain::error::EstateSimError;
use crate::domain::growth::{GrowthConfig, GrowthEstimator, GrowthModel};
use crate::domain::portfolio::{
    HousePurchase, NetWorthOptions, PortfolioConfig, PortfolioEvent, DEFAULT_CAPITAL_GAINS_TAX_RATE,
    DEFAULT_DOWN_PAYMENT_FRACTION, DEFAULT_INCOME_TAX_RATE, DEFAULT_INFLATION_RATE,
    DEFAULT_TERM_YEARS,
};
use crate::domain::scenario::{Scenario, ScheduledPurchase, DEFAULT_YEARS};
use crate::domain::simulation::{simulate, Trajectory};
use crate::domain::stocks::DEFAULT_STOCK_GROWTH_FACTOR;
use crate::ports::config_port::ConfigPort;
use crate::ports::report_port::ReportPort;
use crate::ports::series_port::SeriesPort;

#[derive(Parser, Debug)]
#[command(name = "estatesim", about = "Stocks versus rental real estate net worth simulator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a simulation
    Simulate {
        #[arg(short, long)]
        config: PathBuf,
        /// Write the monthly trajectory as CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        years: Option<u32>,
    },
    /// Print estimated house growth rates
    Rates {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        from: i32,
        #[arg(long)]
        to: i32,
    },
    /// Validate a simulation configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn execute(cli: Cli) -> Result<(), EstateSimError> {
    match cli.command {
        Command::Simulate {
            config,
            output,
            years,
        } => run_simulate(&config, output.as_deref(), years),
        Command::Rates { config, from, to } => run_rates(&config, from, to),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, EstateSimError> {
    FileConfigAdapter::from_file(path).map_err(|e| EstateSimError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn run_simulate(
    config_path: &Path,
    output_path: Option<&Path>,
    years: Option<u32>,
) -> Result<(), EstateSimError> {
    // Stage 1: Load and validate config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = load_config(config_path)?;
    validate_simulation_config(&adapter)?;

    // Stage 2: Build scenario
    let mut scenario = build_scenario(&adapter)?;
    if let Some(years) = years {
        override_years(&mut scenario, years)?;
    }
    let growth_config = build_growth_config(&adapter)?;

    // Stage 3: Resolve series files
    let series = build_series_adapter(&adapter, config_path)?;

    // Stage 4: Simulate and report
    let csv_report = CsvReportAdapter;
    let report = output_path.map(|path| (&csv_report as &dyn ReportPort, path));
    let trajectory = run_simulation_pipeline(&series, growth_config, &scenario, report)?;
    print_summary(&trajectory);
    Ok(())
}

/// Replaces the configured horizon with `years`, dropping purchases that
/// would fall after it.
pub fn override_years(scenario: &mut Scenario, years: u32) -> Result<(), EstateSimError> {
    let years = check_years(years.into())?;
    let total_months = years * 12;
    if scenario.purchases.iter().any(|p| p.month > total_months) {
        eprintln!("warning: purchases scheduled after year {years} will be dropped");
        scenario.purchases.retain(|p| p.month <= total_months);
    }
    scenario.years = years;
    Ok(())
}

/// Loads the series, builds the estimator, simulates and optionally writes
/// the trajectory report.
pub fn run_simulation_pipeline(
    series: &dyn SeriesPort,
    growth_config: GrowthConfig,
    scenario: &Scenario,
    report: Option<(&dyn ReportPort, &Path)>,
) -> Result<Trajectory, EstateSimError> {
    let data = series.load_economy_data()?;
    eprintln!(
        "Loaded {} years of house prices, {} years of population",
        data.house_prices.len(),
        data.population.len()
    );
    let estimator = GrowthEstimator::new(data, growth_config)?;

    eprintln!(
        "Running simulation: {} houses, {} years from {}",
        scenario.purchases.len(),
        scenario.years,
        scenario.portfolio.starting_year
    );
    let trajectory = simulate(scenario, &estimator)?;

    if let Some((port, path)) = report {
        port.write(&trajectory, path)?;
        eprintln!("\nTrajectory written to: {}", path.display());
    }
    Ok(trajectory)
}

pub fn print_summary(trajectory: &Trajectory) {
    eprintln!("\n=== Results ===");
    if let Some(initial) = trajectory.initial_net_worth() {
        eprintln!("Starting Net Worth:    {:.2}", initial);
    }
    if let Some(last) = trajectory.final_net_worth() {
        eprintln!("Final Net Worth:       {:.2}", last);
    }
    match trajectory.average_yearly_return() {
        Some(factor) => eprintln!("Average Yearly Return: {:.2}%", (factor - 1.0) * 100.0),
        None => eprintln!("Average Yearly Return: n/a"),
    }
    if !trajectory.events.is_empty() {
        eprintln!("\n=== Events ===");
        for event in &trajectory.events {
            eprintln!("  {}", describe_event(event));
        }
    }
}

pub fn describe_event(event: &PortfolioEvent) -> String {
    match *event {
        PortfolioEvent::Purchased { asset, year } => {
            format!("{:.2}: bought house #{}", year, asset + 1)
        }
        PortfolioEvent::PurchaseRefused {
            required,
            available,
            year,
        } => format!(
            "{:.2}: not enough capital to buy a house (need {:.2}, have {:.2})",
            year, required, available
        ),
        PortfolioEvent::LoanPaidOff { asset, year } => {
            format!("{:.2}: loan on house #{} paid off", year, asset + 1)
        }
    }
}

/// Estimated house growth for each year in `from..=to`, as
/// `(year, monthly rate, annual factor)`.
pub fn growth_rates(
    model: &dyn GrowthModel,
    from: i32,
    to: i32,
) -> Result<Vec<(i32, f64, f64)>, EstateSimError> {
    (from..=to)
        .map(|year| {
            let rate = model.monthly_house_growth_rate(year)?;
            Ok((year, rate, (1.0 + rate).powi(12)))
        })
        .collect()
}

fn run_rates(config_path: &Path, from: i32, to: i32) -> Result<(), EstateSimError> {
    let adapter = load_config(config_path)?;
    validate_economy(&adapter)?;
    let growth_config = build_growth_config(&adapter)?;
    let series = build_series_adapter(&adapter, config_path)?;
    let estimator = GrowthEstimator::new(series.load_economy_data()?, growth_config)?;

    println!("year,monthly_rate,annual_factor");
    for (year, rate, factor) in growth_rates(&estimator, from, to)? {
        println!("{},{:.6},{:.6}", year, rate, factor);
    }
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), EstateSimError> {
    let adapter = load_config(config_path)?;
    validate_simulation_config(&adapter)?;
    let scenario = build_scenario(&adapter)?;
    eprintln!(
        "Config is valid: {} houses over {} years",
        scenario.purchases.len(),
        scenario.years
    );
    Ok(())
}

pub fn build_growth_config(adapter: &dyn ConfigPort) -> Result<GrowthConfig, EstateSimError> {
    let defaults = GrowthConfig::default();
    Ok(GrowthConfig {
        start_year: int_field(adapter, "economy", "start_year", defaults.start_year)?,
        end_year: int_field(adapter, "economy", "end_year", defaults.end_year)?,
        buyer_age: int_field(adapter, "economy", "buyer_age", defaults.buyer_age)?,
    })
}

pub fn build_portfolio_config(adapter: &dyn ConfigPort) -> Result<PortfolioConfig, EstateSimError> {
    Ok(PortfolioConfig {
        capital: require_double(adapter, "portfolio", "capital")?,
        starting_year: require_double(adapter, "portfolio", "starting_year")?,
        monthly_contribution: optional_double(adapter, "portfolio", "monthly_contribution", 0.0)?,
        income_tax_rate: optional_double(
            adapter,
            "portfolio",
            "income_tax_rate",
            DEFAULT_INCOME_TAX_RATE,
        )?,
        capital_gains_tax_rate: optional_double(
            adapter,
            "portfolio",
            "capital_gains_tax_rate",
            DEFAULT_CAPITAL_GAINS_TAX_RATE,
        )?,
        stock_growth_factor: optional_double(
            adapter,
            "portfolio",
            "stock_growth_factor",
            DEFAULT_STOCK_GROWTH_FACTOR,
        )?,
        inflation_rate: optional_double(
            adapter,
            "economy",
            "inflation_rate",
            DEFAULT_INFLATION_RATE,
        )?,
        property_tax: optional_bool(adapter, "portfolio", "property_tax", true)?,
    })
}

pub fn build_purchase(
    adapter: &dyn ConfigPort,
    section: &str,
) -> Result<ScheduledPurchase, EstateSimError> {
    let purchase = HousePurchase {
        price: require_double(adapter, section, "price")?,
        closing_costs: require_double(adapter, section, "closing_costs")?,
        loan_apr: require_double(adapter, section, "apr")?,
        property_tax_frac: require_double(adapter, section, "property_tax_frac")?,
        monthly_fees: require_double(adapter, section, "monthly_fees")?,
        monthly_rent: require_double(adapter, section, "monthly_rent")?,
        down_payment_fraction: optional_double(
            adapter,
            section,
            "down_payment_fraction",
            DEFAULT_DOWN_PAYMENT_FRACTION,
        )?,
        years_on_loan: int_field(adapter, section, "years_on_loan", DEFAULT_TERM_YEARS)?,
    };
    let name = section
        .strip_prefix("house.")
        .unwrap_or(section)
        .to_string();
    Ok(ScheduledPurchase {
        name,
        month: int_field(adapter, section, "purchase_month", 0u32)?,
        purchase,
    })
}

/// Builds the scenario; houses are bought in `purchase_month` order, ties
/// broken by section name.
pub fn build_scenario(adapter: &dyn ConfigPort) -> Result<Scenario, EstateSimError> {
    let mut purchases = house_sections(adapter)
        .iter()
        .map(|section| build_purchase(adapter, section))
        .collect::<Result<Vec<_>, _>>()?;
    purchases.sort_by_key(|p| p.month);

    Ok(Scenario {
        portfolio: build_portfolio_config(adapter)?,
        purchases,
        years: check_years(optional_int(
            adapter,
            "simulation",
            "years",
            DEFAULT_YEARS.into(),
        )?)?,
        valuation: NetWorthOptions {
            after_capital_gains_tax: optional_bool(
                adapter,
                "simulation",
                "after_capital_gains_tax",
                false,
            )?,
            adjust_for_inflation: optional_bool(
                adapter,
                "simulation",
                "adjust_for_inflation",
                false,
            )?,
        },
    })
}

/// Data paths are resolved relative to the config file's directory.
pub fn resolve_data_path(config_path: &Path, raw: &str) -> PathBuf {
    let path = PathBuf::from(raw.trim());
    if path.is_absolute() {
        return path;
    }
    match config_path.parent() {
        Some(dir) => dir.join(path),
        None => path,
    }
}

pub fn build_series_adapter(
    adapter: &dyn ConfigPort,
    config_path: &Path,
) -> Result<CsvSeriesAdapter, EstateSimError> {
    let prices = require_string(adapter, "data", "house_prices")?;
    let population = require_string(adapter, "data", "population")?;
    Ok(CsvSeriesAdapter::new(
        resolve_data_path(config_path, &prices),
        resolve_data_path(config_path, &population),
    ))
}

fn int_field<T: TryFrom<i64>>(
    adapter: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: T,
) -> Result<T, EstateSimError> {
    match adapter.get_string(section, key) {
        Some(raw) if !raw.trim().is_empty() => {
            let value = optional_int(adapter, section, key, 0)?;
            T::try_from(value).map_err(|_| EstateSimError::ConfigInvalid {
                section: section.to_string(),
                key: key.to_string(),
                reason: format!("{value} is out of range"),
            })
        }
        _ => Ok(default),
    }
}
