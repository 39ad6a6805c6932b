//! Liquid equity position.

use super::error::DomainError;

/// Average S&P 500 yearly return.
pub const DEFAULT_STOCK_GROWTH_FACTOR: f64 = 1.1;

/// A single stock balance compounding at a fixed yearly rate.
#[derive(Debug, Clone, PartialEq)]
pub struct EquityPosition {
    balance: f64,
    annual_growth_factor: f64,
    cumulative_gains: f64,
}

impl EquityPosition {
    pub fn new(initial_balance: f64, annual_growth_factor: f64) -> Result<Self, DomainError> {
        if initial_balance.is_nan() || initial_balance < 0.0 {
            return Err(DomainError::NegativeBalance {
                balance: initial_balance,
            });
        }
        if annual_growth_factor.is_nan() || annual_growth_factor <= 0.0 {
            return Err(DomainError::invalid(
                "stock growth factor",
                format!("must be positive, got {annual_growth_factor}"),
            ));
        }
        Ok(Self {
            balance: initial_balance,
            annual_growth_factor,
            cumulative_gains: 0.0,
        })
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn annual_growth_factor(&self) -> f64 {
        self.annual_growth_factor
    }

    pub fn cumulative_gains(&self) -> f64 {
        self.cumulative_gains
    }

    /// Adds `amount` (negative to withdraw). The balance is left untouched
    /// if it would go negative.
    pub fn deposit(&mut self, amount: f64) -> Result<(), DomainError> {
        if !amount.is_finite() {
            return Err(DomainError::invalid(
                "amount",
                format!("must be finite, got {amount}"),
            ));
        }
        let balance = self.balance + amount;
        if balance < 0.0 {
            return Err(DomainError::NegativeBalance { balance });
        }
        self.balance = balance;
        Ok(())
    }

    pub fn withdraw(&mut self, amount: f64) -> Result<(), DomainError> {
        self.deposit(-amount)
    }

    /// Grows the balance for a (possibly fractional) number of years.
    pub fn advance(&mut self, years: f64) {
        let growth = self.balance * (self.annual_growth_factor.powf(years) - 1.0);
        self.balance += growth;
        self.cumulative_gains += growth;
    }
}
