//! Mortgaged rental property.
//!
//! A house is advanced one month at a time by its owner: appreciation is
//! credited to equity, rent net of property tax accrues as cash and taxable
//! income, and a loan payment converts cash into principal reduction. Interest
//! and fees are deductible against rental income.

use super::error::DomainError;

/// Principal left over by rounding in the final scheduled payment; anything
/// at or below this counts as repaid.
pub const PAYOFF_TOLERANCE: f64 = 1e-4;

/// Monthly payment that retires `loan_amount` in exactly `term_years` years.
pub fn amortized_payment(loan_amount: f64, apr: f64, term_years: u32) -> Result<f64, DomainError> {
    if term_years == 0 {
        return Err(DomainError::invalid("loan term", "must be at least one year"));
    }
    if apr.is_nan() || apr < 0.0 {
        return Err(DomainError::invalid(
            "apr",
            format!("must be non-negative, got {apr}"),
        ));
    }
    let r = apr / 100.0 / 12.0;
    let n = f64::from(term_years * 12);
    if r == 0.0 {
        return Ok(loan_amount / n);
    }
    let compounded = (1.0 + r).powf(n);
    Ok(loan_amount * (r * compounded) / (compounded - 1.0))
}

/// Starting position and contract terms of a newly bought house.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetTerms {
    pub equity: f64,
    pub principal: f64,
    /// Loan APR, in percent.
    pub loan_apr: f64,
    /// Fraction of the house value paid as property tax each year.
    pub property_tax_frac: f64,
    /// Amortized loan payment, excluding fees.
    pub loan_payment: f64,
    /// HOA, insurance and maintenance, paid with every loan payment.
    pub monthly_fees: f64,
    pub monthly_rent: f64,
}

/// Outcome of a single loan payment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaymentReceipt {
    pub amount: f64,
    pub interest: f64,
    pub fees: f64,
    pub principal_paid: f64,
    /// The payment retired the remaining principal.
    pub paid_off: bool,
}

/// Cash and taxable income accrued since the last reset.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CashFlow {
    pub cash: f64,
    pub taxable_income: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MortgagedAsset {
    equity: f64,
    principal: f64,
    monthly_interest_rate: f64,
    monthly_property_tax_frac: f64,
    min_monthly_payment: f64,
    monthly_fees: f64,
    monthly_rent: f64,
    monthly_property_tax: f64,
    cash: f64,
    taxable_income: f64,
    capital_gains: f64,
    months_elapsed: u32,
    yearly_compounding_factor: f64,
}

impl MortgagedAsset {
    pub fn new(terms: AssetTerms) -> Result<Self, DomainError> {
        let non_negative = [
            ("equity", terms.equity),
            ("principal", terms.principal),
            ("apr", terms.loan_apr),
            ("property tax fraction", terms.property_tax_frac),
            ("loan payment", terms.loan_payment),
            ("monthly fees", terms.monthly_fees),
            ("monthly rent", terms.monthly_rent),
        ];
        for (name, value) in non_negative {
            if value.is_nan() || value < 0.0 {
                return Err(DomainError::invalid(
                    name,
                    format!("must be non-negative, got {value}"),
                ));
            }
        }

        let monthly_property_tax_frac = terms.property_tax_frac / 12.0;
        let value = terms.equity + terms.principal;
        Ok(Self {
            equity: terms.equity,
            principal: terms.principal,
            monthly_interest_rate: terms.loan_apr / 100.0 / 12.0,
            monthly_property_tax_frac,
            min_monthly_payment: terms.loan_payment + terms.monthly_fees,
            monthly_fees: terms.monthly_fees,
            monthly_rent: terms.monthly_rent,
            monthly_property_tax: value * monthly_property_tax_frac,
            cash: 0.0,
            taxable_income: 0.0,
            capital_gains: 0.0,
            months_elapsed: 0,
            yearly_compounding_factor: 1.0,
        })
    }

    pub fn value(&self) -> f64 {
        self.equity + self.principal
    }

    pub fn equity(&self) -> f64 {
        self.equity
    }

    pub fn principal(&self) -> f64 {
        self.principal
    }

    pub fn capital_gains(&self) -> f64 {
        self.capital_gains
    }

    pub fn monthly_interest_rate(&self) -> f64 {
        self.monthly_interest_rate
    }

    pub fn min_monthly_payment(&self) -> f64 {
        self.min_monthly_payment
    }

    pub fn monthly_fees(&self) -> f64 {
        self.monthly_fees
    }

    pub fn monthly_rent(&self) -> f64 {
        self.monthly_rent
    }

    pub fn monthly_property_tax(&self) -> f64 {
        self.monthly_property_tax
    }

    pub fn months_elapsed(&self) -> u32 {
        self.months_elapsed
    }

    pub fn is_paid_off(&self) -> bool {
        self.principal <= 0.0
    }

    pub fn cash_flow(&self) -> CashFlow {
        CashFlow {
            cash: self.cash,
            taxable_income: self.taxable_income,
        }
    }

    pub fn reset_cash_flow(&mut self) {
        self.cash = 0.0;
        self.taxable_income = 0.0;
    }

    /// Appreciates the house and collects one month of rent.
    ///
    /// Rent and property tax are only reassessed every twelfth month, the
    /// rent by the appreciation accumulated over that year.
    pub fn advance_one_month(&mut self, monthly_growth_rate: f64) {
        self.months_elapsed += 1;
        self.yearly_compounding_factor *= 1.0 + monthly_growth_rate;

        let increase_in_value = self.value() * monthly_growth_rate;
        self.capital_gains += increase_in_value;
        self.equity += increase_in_value;

        let net_earnings = self.monthly_rent - self.monthly_property_tax;
        self.cash += net_earnings;
        self.taxable_income += net_earnings;

        if self.months_elapsed % 12 == 0 {
            self.monthly_rent *= self.yearly_compounding_factor;
            self.yearly_compounding_factor = 1.0;
            self.monthly_property_tax = self.value() * self.monthly_property_tax_frac;
        }
    }

    /// Pays `amount` (the minimum payment when `None`) towards the loan.
    ///
    /// A payment that covers what is owed, give or take
    /// [`PAYOFF_TOLERANCE`], is set to exactly the amount that retires the
    /// loan, so the last scheduled payment reports the payoff.
    pub fn make_payment(&mut self, amount: Option<f64>) -> Result<PaymentReceipt, DomainError> {
        let amount = amount.unwrap_or(self.min_monthly_payment);
        if amount.is_nan() || amount < self.min_monthly_payment {
            return Err(DomainError::PaymentBelowMinimum {
                amount,
                minimum: self.min_monthly_payment,
            });
        }

        let interest = self.principal * self.monthly_interest_rate;
        let payoff_amount = self.principal + interest + self.monthly_fees;
        let settles_loan = payoff_amount <= amount + PAYOFF_TOLERANCE;
        let paid_off = settles_loan && self.principal > 0.0;

        let (amount, principal_paid) = if settles_loan {
            (payoff_amount, self.principal)
        } else {
            (amount, amount - interest - self.monthly_fees)
        };
        self.equity += principal_paid;
        self.principal = if settles_loan {
            0.0
        } else {
            self.principal - principal_paid
        };
        self.cash -= amount;
        self.taxable_income -= interest + self.monthly_fees;

        Ok(PaymentReceipt {
            amount,
            interest,
            fees: self.monthly_fees,
            principal_paid,
            paid_off,
        })
    }
}
