//! Runs a scenario month by month and records the net worth trajectory.

use serde::Serialize;

use super::error::{DomainError, EstateSimError};
use super::growth::GrowthModel;
use super::portfolio::{NetWorthOptions, Portfolio, PortfolioEvent, PurchaseOutcome};
use super::scenario::{Scenario, ScheduledPurchase};

/// Portfolio valuation after a given number of simulated months.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NetWorthPoint {
    pub month: u32,
    pub year: f64,
    pub net_worth: f64,
    pub net_worth_after_tax: f64,
    pub stock_balance: f64,
    pub house_equity: f64,
    pub principal_outstanding: f64,
}

impl NetWorthPoint {
    fn capture<G: GrowthModel>(portfolio: &Portfolio<G>, adjust_for_inflation: bool) -> Self {
        NetWorthPoint {
            month: portfolio.months_elapsed(),
            year: portfolio.current_year(),
            net_worth: portfolio.net_worth_with(NetWorthOptions {
                after_capital_gains_tax: false,
                adjust_for_inflation,
            }),
            net_worth_after_tax: portfolio.net_worth_with(NetWorthOptions {
                after_capital_gains_tax: true,
                adjust_for_inflation,
            }),
            stock_balance: portfolio.stocks().balance(),
            house_equity: portfolio.total_house_equity(),
            principal_outstanding: portfolio.total_principal(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    pub years: u32,
    pub valuation: NetWorthOptions,
    /// Starting point first, then one point per simulated month.
    pub points: Vec<NetWorthPoint>,
    pub events: Vec<PortfolioEvent>,
}

impl Trajectory {
    fn headline(&self, point: &NetWorthPoint) -> f64 {
        if self.valuation.after_capital_gains_tax {
            point.net_worth_after_tax
        } else {
            point.net_worth
        }
    }

    /// Net worth per point, valued as configured.
    pub fn history(&self) -> Vec<f64> {
        self.points.iter().map(|p| self.headline(p)).collect()
    }

    pub fn initial_net_worth(&self) -> Option<f64> {
        self.points.first().map(|p| self.headline(p))
    }

    pub fn final_net_worth(&self) -> Option<f64> {
        self.points.last().map(|p| self.headline(p))
    }

    /// Yearly growth factor from the first to the last point.
    pub fn average_yearly_return(&self) -> Option<f64> {
        let first = self.initial_net_worth()?;
        let last = self.final_net_worth()?;
        if self.years == 0 || first <= 0.0 || last < 0.0 {
            return None;
        }
        Some((last / first).powf(1.0 / f64::from(self.years)))
    }

    pub fn loan_payoffs(&self) -> impl Iterator<Item = &PortfolioEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, PortfolioEvent::LoanPaidOff { .. }))
    }
}

/// Simulates `scenario` against `growth`.
///
/// The first point is the starting capital, before any purchase. Purchases
/// scheduled for month `m` happen right after month `m` is simulated; a
/// purchase that cannot be afforded is recorded as refused and skipped.
pub fn simulate<G: GrowthModel>(scenario: &Scenario, growth: G) -> Result<Trajectory, EstateSimError> {
    let total_months = scenario.total_months()?;
    if let Some(late) = scenario.purchases.iter().find(|p| p.month > total_months) {
        return Err(DomainError::invalid(
            "purchase month",
            format!(
                "{} is scheduled for month {} of a {}-month simulation",
                late.name, late.month, total_months
            ),
        )
        .into());
    }

    let mut schedule: Vec<&ScheduledPurchase> = scenario.purchases.iter().collect();
    schedule.sort_by_key(|p| p.month);
    let mut pending = schedule.into_iter().peekable();

    let adjust_for_inflation = scenario.valuation.adjust_for_inflation;
    let mut portfolio = Portfolio::new(scenario.portfolio.clone(), growth)?;
    let mut points = Vec::with_capacity(total_months as usize + 1);
    let mut events = Vec::new();
    points.push(NetWorthPoint::capture(&portfolio, adjust_for_inflation));

    for month in 0..=total_months {
        if month > 0 {
            let report = portfolio.advance_one_month()?;
            events.extend(report.events);
        }
        while let Some(scheduled) = pending.next_if(|p| p.month == month) {
            let year = portfolio.current_year();
            let event = match portfolio.purchase_house(&scheduled.purchase)? {
                PurchaseOutcome::Purchased { asset, .. } => PortfolioEvent::Purchased { asset, year },
                PurchaseOutcome::InsufficientFunds {
                    required,
                    available,
                } => PortfolioEvent::PurchaseRefused {
                    required,
                    available,
                    year,
                },
            };
            events.push(event);
        }
        if month > 0 {
            points.push(NetWorthPoint::capture(&portfolio, adjust_for_inflation));
        }
    }

    Ok(Trajectory {
        years: scenario.years,
        valuation: scenario.valuation,
        points,
        events,
    })
}
