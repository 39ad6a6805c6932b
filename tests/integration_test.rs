//! Integration tests for the simulation core.
//!
//! Tests cover:
//! - 30-year single-house portfolio driven by the historical estimator
//! - Reproducibility of identical runs
//! - Estimator construction and lookups over loaded series
//! - Scenario simulation through a mock series port

mod common;

use approx::assert_relative_eq;
use common::*;
use estatesim::domain::error::{EstateSimError, GrowthError};
use estatesim::domain::growth::{GrowthConfig, GrowthEstimator, GrowthModel};
use estatesim::domain::portfolio::{Portfolio, PortfolioEvent, PurchaseOutcome};
use estatesim::domain::scenario::Scenario;
use estatesim::domain::simulation::simulate;
use estatesim::ports::series_port::SeriesPort;

fn run_months(months: u32) -> (Portfolio<GrowthEstimator>, Vec<PortfolioEvent>) {
    let mut portfolio = Portfolio::new(sample_portfolio_config(), sample_estimator()).unwrap();
    let outcome = portfolio.purchase_house(&sample_house()).unwrap();
    assert!(outcome.is_purchased());

    let mut events = Vec::new();
    for _ in 0..months {
        let report = portfolio.advance_one_month().unwrap();
        events.extend(report.events);
    }
    (portfolio, events)
}

fn run_thirty_years() -> (Portfolio<GrowthEstimator>, Vec<PortfolioEvent>) {
    run_months(360)
}

fn payoff_count(events: &[PortfolioEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, PortfolioEvent::LoanPaidOff { .. }))
        .count()
}

mod end_to_end {
    use super::*;

    #[test]
    fn loan_is_retired_after_thirty_years() {
        let (portfolio, events) = run_thirty_years();

        let house = &portfolio.houses()[0];
        assert_eq!(house.principal(), 0.0);
        assert!(house.is_paid_off());
        assert_eq!(house.months_elapsed(), 360);
        assert_relative_eq!(portfolio.current_year(), 2052.0);
        assert_eq!(
            events,
            vec![PortfolioEvent::LoanPaidOff {
                asset: 0,
                year: 2052.0
            }]
        );
    }

    #[test]
    fn payoff_is_reported_exactly_once() {
        let (portfolio, events) = run_months(372);

        let house = &portfolio.houses()[0];
        assert_eq!(house.principal(), 0.0);
        assert!(house.is_paid_off());
        assert_eq!(payoff_count(&events), 1);
    }

    #[test]
    fn identical_runs_are_bit_identical() {
        let (first, _) = run_thirty_years();
        let (second, _) = run_thirty_years();

        assert_eq!(
            first.net_worth(false).to_bits(),
            second.net_worth(false).to_bits()
        );
        assert_eq!(
            first.net_worth(true).to_bits(),
            second.net_worth(true).to_bits()
        );
        assert_eq!(
            first.stocks().balance().to_bits(),
            second.stocks().balance().to_bits()
        );
    }

    #[test]
    fn net_worth_decomposes_into_stocks_and_equity() {
        let (portfolio, _) = run_thirty_years();
        let house = &portfolio.houses()[0];

        assert_relative_eq!(
            portfolio.net_worth(false),
            portfolio.stocks().balance() + house.equity(),
            max_relative = 1e-12
        );
        let tax = portfolio.config().capital_gains_tax_rate;
        assert_relative_eq!(
            portfolio.net_worth(true),
            portfolio.net_worth(false)
                - (portfolio.stocks().cumulative_gains() + house.capital_gains()) * tax,
            max_relative = 1e-9
        );
    }

    #[test]
    fn house_appreciates_with_estimated_rate() {
        let (portfolio, _) = run_thirty_years();
        let house = &portfolio.houses()[0];

        // Roughly 4.5-5% a year on a 150k house over 30 years.
        assert!(house.value() > 500_000.0);
        assert!(house.value() < 700_000.0);
        assert_relative_eq!(house.value(), house.equity(), max_relative = 1e-12);
    }

    #[test]
    fn second_house_is_refused_without_capital() {
        let mut portfolio = Portfolio::new(sample_portfolio_config(), sample_estimator()).unwrap();
        portfolio.purchase_house(&sample_house()).unwrap();
        let outcome = portfolio.purchase_house(&sample_house()).unwrap();

        match outcome {
            PurchaseOutcome::InsufficientFunds {
                required,
                available,
            } => {
                assert_relative_eq!(required, 37_500.0);
                assert_relative_eq!(available, 12_500.0);
            }
            other => panic!("expected insufficient funds, got {other:?}"),
        }
        assert_eq!(portfolio.houses().len(), 1);
    }
}

mod growth_estimation {
    use super::*;

    #[test]
    fn estimator_from_mock_port() {
        let data = MockSeriesPort::new().load_economy_data().unwrap();
        let estimator = GrowthEstimator::with_defaults(data).unwrap();

        assert_relative_eq!(
            estimator.historical_house_price_growth_factor(),
            1.05,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            estimator.historical_population_growth_factor(),
            1.01,
            epsilon = 1e-9
        );
    }

    #[test]
    fn rate_tracks_population_change_of_birth_year() {
        let estimator = sample_estimator();

        // 2022 buyers were born in 1989 (1.0% change), 2040 buyers in 2007 (0.5%).
        let early = estimator.monthly_house_growth_rate(2022).unwrap();
        let late = estimator.monthly_house_growth_rate(2040).unwrap();
        assert_relative_eq!((1.0 + early).powi(12), 1.05, epsilon = 1e-9);
        assert_relative_eq!((1.0 + late).powi(12), 1.045, epsilon = 1e-9);
    }

    #[test]
    fn years_past_projection_use_last_change() {
        let estimator = sample_estimator();
        let rate = estimator.monthly_house_growth_rate(2200).unwrap();
        assert_relative_eq!((1.0 + rate).powi(12), 1.045, epsilon = 1e-9);
    }

    #[test]
    fn missing_window_price_is_fatal() {
        let prices: Vec<_> = sample_house_prices()
            .into_iter()
            .filter(|r| r.year != 1983)
            .collect();
        let data = MockSeriesPort::new()
            .with_house_prices(prices)
            .load_economy_data()
            .unwrap();

        let err = GrowthEstimator::new(data, GrowthConfig::default()).unwrap_err();
        assert_eq!(
            err,
            GrowthError::MissingHistoricalData {
                series: "house price",
                year: 1983,
            }
        );
    }

    #[test]
    fn custom_window() {
        let config = GrowthConfig {
            start_year: 1990,
            end_year: 2010,
            buyer_age: 30,
        };
        let estimator = GrowthEstimator::new(sample_economy(), config).unwrap();
        assert_eq!(estimator.config().buyer_age, 30);
        assert_relative_eq!(
            estimator.historical_house_price_growth_factor(),
            1.05,
            epsilon = 1e-9
        );
    }

    #[test]
    fn port_errors_propagate() {
        let port = MockSeriesPort::new().with_error("connection lost");
        match port.load_economy_data() {
            Err(EstateSimError::Data { reason }) => assert_eq!(reason, "connection lost"),
            other => panic!("expected data error, got {other:?}"),
        }
    }
}

mod scenario_simulation {
    use super::*;

    #[test]
    fn scenario_matches_manual_ticks() {
        let scenario =
            Scenario::new(sample_portfolio_config()).with_purchase("rental", 0, sample_house());
        let trajectory = simulate(&scenario, sample_estimator()).unwrap();
        let (portfolio, events) = run_thirty_years();

        assert_eq!(trajectory.points.len(), 361);
        assert_eq!(
            trajectory.final_net_worth().unwrap().to_bits(),
            portfolio.net_worth(false).to_bits()
        );
        assert_eq!(trajectory.loan_payoffs().count(), payoff_count(&events));
        assert_eq!(
            trajectory.events.len(),
            events.len() + 1,
            "purchase event plus tick events"
        );
        assert_eq!(trajectory.points[360].principal_outstanding, 0.0);
        assert_eq!(trajectory.loan_payoffs().count(), 1);
    }

    #[test]
    fn estimator_can_be_shared_by_reference() {
        let estimator = sample_estimator();
        let scenario =
            Scenario::new(sample_portfolio_config()).with_purchase("rental", 0, sample_house());

        let first = simulate(&scenario, &estimator).unwrap();
        let second = simulate(&scenario, &estimator).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn return_is_positive_over_thirty_years() {
        let scenario =
            Scenario::new(sample_portfolio_config()).with_purchase("rental", 0, sample_house());
        let trajectory = simulate(&scenario, sample_estimator()).unwrap();

        let factor = trajectory.average_yearly_return().unwrap();
        assert!(factor > 1.0);
        assert!(trajectory.final_net_worth().unwrap() > 50_000.0);
    }

    #[test]
    fn unknown_year_aborts_simulation() {
        let mut config = sample_portfolio_config();
        config.starting_year = 1920.0;
        let scenario = Scenario::new(config);

        let err = simulate(&scenario, sample_estimator()).unwrap_err();
        assert!(matches!(
            err,
            EstateSimError::Growth(GrowthError::YearNotCovered { .. })
        ));
    }
}
