//! Simulation scenario definition.

use super::error::DomainError;
use super::portfolio::{HousePurchase, NetWorthOptions, PortfolioConfig};

pub const DEFAULT_YEARS: u32 = 30;
/// Longest horizon accepted from configuration or the command line.
pub const MAX_YEARS: u32 = 200;

/// A house bought after `month` months of simulation (0 buys before the
/// first month is simulated).
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledPurchase {
    pub name: String,
    pub month: u32,
    pub purchase: HousePurchase,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub portfolio: PortfolioConfig,
    pub purchases: Vec<ScheduledPurchase>,
    pub years: u32,
    pub valuation: NetWorthOptions,
}

impl Scenario {
    pub fn new(portfolio: PortfolioConfig) -> Self {
        Self {
            portfolio,
            purchases: Vec::new(),
            years: DEFAULT_YEARS,
            valuation: NetWorthOptions::default(),
        }
    }

    pub fn with_purchase(mut self, name: &str, month: u32, purchase: HousePurchase) -> Self {
        self.purchases.push(ScheduledPurchase {
            name: name.to_string(),
            month,
            purchase,
        });
        self
    }

    pub fn total_months(&self) -> Result<u32, DomainError> {
        self.years.checked_mul(12).ok_or_else(|| {
            DomainError::invalid("years", format!("{} years is too many months", self.years))
        })
    }
}
