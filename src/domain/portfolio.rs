//! Stocks-plus-real-estate portfolio and its monthly cycle.
//!
//! Money not tied up in a house is invested in stocks. Buying a house takes
//! the down payment and closing costs out of stocks; every month each house's
//! rent, loan payment and income tax settle into stocks as well, so a
//! loss-making house draws on the stock balance.

use super::error::{DomainError, EstateSimError};
use super::growth::GrowthModel;
use super::house::{amortized_payment, AssetTerms, MortgagedAsset};
use super::stocks::{EquityPosition, DEFAULT_STOCK_GROWTH_FACTOR};

pub const DEFAULT_INCOME_TAX_RATE: f64 = 0.30;
pub const DEFAULT_CAPITAL_GAINS_TAX_RATE: f64 = 0.15;
/// Average yearly inflation.
pub const DEFAULT_INFLATION_RATE: f64 = 0.038;
pub const DEFAULT_DOWN_PAYMENT_FRACTION: f64 = 0.20;
pub const DEFAULT_TERM_YEARS: u32 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioConfig {
    pub capital: f64,
    /// Calendar year of the first investment, e.g. 2025.0.
    pub starting_year: f64,
    /// Outside money added to stocks every month.
    pub monthly_contribution: f64,
    pub income_tax_rate: f64,
    pub capital_gains_tax_rate: f64,
    pub stock_growth_factor: f64,
    pub inflation_rate: f64,
    /// When off, houses are bought without property tax.
    pub property_tax: bool,
}

impl PortfolioConfig {
    pub fn new(capital: f64, starting_year: f64) -> Self {
        Self {
            capital,
            starting_year,
            monthly_contribution: 0.0,
            income_tax_rate: DEFAULT_INCOME_TAX_RATE,
            capital_gains_tax_rate: DEFAULT_CAPITAL_GAINS_TAX_RATE,
            stock_growth_factor: DEFAULT_STOCK_GROWTH_FACTOR,
            inflation_rate: DEFAULT_INFLATION_RATE,
            property_tax: true,
        }
    }

    fn validate(&self) -> Result<(), DomainError> {
        for (name, rate) in [
            ("income tax rate", self.income_tax_rate),
            ("capital gains tax rate", self.capital_gains_tax_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(DomainError::invalid(
                    name,
                    format!("must be between 0 and 1, got {rate}"),
                ));
            }
        }
        if !self.starting_year.is_finite() {
            return Err(DomainError::invalid("starting year", "must be finite"));
        }
        if !self.monthly_contribution.is_finite() {
            return Err(DomainError::invalid("monthly contribution", "must be finite"));
        }
        if self.inflation_rate.is_nan() || self.inflation_rate <= -1.0 {
            return Err(DomainError::invalid(
                "inflation rate",
                format!("must be greater than -1, got {}", self.inflation_rate),
            ));
        }
        Ok(())
    }
}

/// Terms of a house purchase.
#[derive(Debug, Clone, PartialEq)]
pub struct HousePurchase {
    /// Price paid, excluding closing costs.
    pub price: f64,
    pub closing_costs: f64,
    /// Loan APR, in percent.
    pub loan_apr: f64,
    /// Fraction of the house value paid as property tax each year.
    pub property_tax_frac: f64,
    pub monthly_fees: f64,
    pub monthly_rent: f64,
    pub down_payment_fraction: f64,
    pub years_on_loan: u32,
}

impl HousePurchase {
    pub fn new(
        price: f64,
        closing_costs: f64,
        loan_apr: f64,
        property_tax_frac: f64,
        monthly_fees: f64,
        monthly_rent: f64,
    ) -> Self {
        Self {
            price,
            closing_costs,
            loan_apr,
            property_tax_frac,
            monthly_fees,
            monthly_rent,
            down_payment_fraction: DEFAULT_DOWN_PAYMENT_FRACTION,
            years_on_loan: DEFAULT_TERM_YEARS,
        }
    }

    pub fn with_down_payment_fraction(mut self, fraction: f64) -> Self {
        self.down_payment_fraction = fraction;
        self
    }

    pub fn with_years_on_loan(mut self, years: u32) -> Self {
        self.years_on_loan = years;
        self
    }

    pub fn down_payment(&self) -> f64 {
        self.price * self.down_payment_fraction
    }

    pub fn upfront_cost(&self) -> f64 {
        self.down_payment() + self.closing_costs
    }

    pub fn loan_amount(&self) -> f64 {
        self.price - self.down_payment()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PurchaseOutcome {
    Purchased {
        asset: usize,
        upfront_cost: f64,
        min_monthly_payment: f64,
    },
    /// Not enough in stocks to cover the upfront cost; nothing changed.
    InsufficientFunds { required: f64, available: f64 },
}

impl PurchaseOutcome {
    pub fn is_purchased(&self) -> bool {
        matches!(self, PurchaseOutcome::Purchased { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PortfolioEvent {
    Purchased { asset: usize, year: f64 },
    PurchaseRefused {
        required: f64,
        available: f64,
        year: f64,
    },
    LoanPaidOff { asset: usize, year: f64 },
}

/// Settlement of one house for one month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssetTransfer {
    pub asset: usize,
    pub cash: f64,
    pub taxable_income: f64,
    pub income_tax: f64,
    /// Amount moved into stocks; negative when the house costs money.
    pub net_transfer: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthReport {
    pub year: f64,
    pub monthly_growth_rate: f64,
    pub transfers: Vec<AssetTransfer>,
    pub events: Vec<PortfolioEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NetWorthOptions {
    pub after_capital_gains_tax: bool,
    /// Express the result in starting-year money.
    pub adjust_for_inflation: bool,
}

#[derive(Debug, Clone)]
pub struct Portfolio<G> {
    config: PortfolioConfig,
    stocks: EquityPosition,
    houses: Vec<MortgagedAsset>,
    months_elapsed: u32,
    growth: G,
}

impl<G: GrowthModel> Portfolio<G> {
    pub fn new(config: PortfolioConfig, growth: G) -> Result<Self, DomainError> {
        config.validate()?;
        let stocks = EquityPosition::new(config.capital, config.stock_growth_factor)?;
        Ok(Self {
            config,
            stocks,
            houses: Vec::new(),
            months_elapsed: 0,
            growth,
        })
    }

    pub fn config(&self) -> &PortfolioConfig {
        &self.config
    }

    pub fn stocks(&self) -> &EquityPosition {
        &self.stocks
    }

    /// Houses in purchase order.
    pub fn houses(&self) -> &[MortgagedAsset] {
        &self.houses
    }

    pub fn growth_model(&self) -> &G {
        &self.growth
    }

    pub fn months_elapsed(&self) -> u32 {
        self.months_elapsed
    }

    pub fn starting_year(&self) -> f64 {
        self.config.starting_year
    }

    pub fn current_year(&self) -> f64 {
        year_after(self.config.starting_year, self.months_elapsed)
    }

    /// Adds outside money to stocks; a negative amount takes money out.
    pub fn add_to_portfolio(&mut self, amount: f64) -> Result<(), DomainError> {
        self.stocks.deposit(amount)
    }

    pub fn purchase_house(&mut self, purchase: &HousePurchase) -> Result<PurchaseOutcome, DomainError> {
        validate_purchase(purchase)?;

        let loan_amount = purchase.loan_amount();
        let loan_payment = amortized_payment(loan_amount, purchase.loan_apr, purchase.years_on_loan)?;
        let property_tax_frac = if self.config.property_tax {
            purchase.property_tax_frac
        } else {
            0.0
        };
        let house = MortgagedAsset::new(AssetTerms {
            equity: purchase.down_payment(),
            principal: loan_amount,
            loan_apr: purchase.loan_apr,
            property_tax_frac,
            loan_payment,
            monthly_fees: purchase.monthly_fees,
            monthly_rent: purchase.monthly_rent,
        })?;

        let upfront_cost = purchase.upfront_cost();
        let available = self.stocks.balance();
        if available < upfront_cost {
            return Ok(PurchaseOutcome::InsufficientFunds {
                required: upfront_cost,
                available,
            });
        }

        self.stocks.withdraw(upfront_cost)?;
        let min_monthly_payment = house.min_monthly_payment();
        self.houses.push(house);
        Ok(PurchaseOutcome::Purchased {
            asset: self.houses.len() - 1,
            upfront_cost,
            min_monthly_payment,
        })
    }

    /// Advances the portfolio by one month.
    ///
    /// The month is worked out on copies of the stocks and houses and only
    /// committed once every transfer has settled, so an error leaves the
    /// portfolio as it was.
    pub fn advance_one_month(&mut self) -> Result<MonthReport, EstateSimError> {
        let months_elapsed = self.months_elapsed + 1;
        let year = year_after(self.config.starting_year, months_elapsed);
        let monthly_growth_rate = self.growth.monthly_house_growth_rate(year.floor() as i32)?;

        let mut stocks = self.stocks.clone();
        let mut houses = self.houses.clone();
        stocks.advance(1.0 / 12.0);

        let mut transfers = Vec::with_capacity(houses.len());
        let mut events = Vec::new();
        for (asset, house) in houses.iter_mut().enumerate() {
            house.advance_one_month(monthly_growth_rate);
            let receipt = house.make_payment(None)?;
            if receipt.paid_off {
                events.push(PortfolioEvent::LoanPaidOff { asset, year });
            }

            let flow = house.cash_flow();
            let income_tax = flow.taxable_income * self.config.income_tax_rate;
            let net_transfer = flow.cash - income_tax;
            stocks.deposit(net_transfer)?;
            house.reset_cash_flow();

            transfers.push(AssetTransfer {
                asset,
                cash: flow.cash,
                taxable_income: flow.taxable_income,
                income_tax,
                net_transfer,
            });
        }
        stocks.deposit(self.config.monthly_contribution)?;

        self.stocks = stocks;
        self.houses = houses;
        self.months_elapsed = months_elapsed;
        Ok(MonthReport {
            year,
            monthly_growth_rate,
            transfers,
            events,
        })
    }

    pub fn net_worth(&self, after_capital_gains_tax: bool) -> f64 {
        self.net_worth_with(NetWorthOptions {
            after_capital_gains_tax,
            adjust_for_inflation: false,
        })
    }

    pub fn net_worth_with(&self, options: NetWorthOptions) -> f64 {
        let tax_weight = if options.after_capital_gains_tax {
            self.config.capital_gains_tax_rate
        } else {
            0.0
        };
        let stocks = self.stocks.balance() - self.stocks.cumulative_gains() * tax_weight;
        let houses: f64 = self
            .houses
            .iter()
            .map(|h| h.equity() - h.capital_gains() * tax_weight)
            .sum();
        let net_worth = stocks + houses;

        if options.adjust_for_inflation {
            let years = self.current_year() - self.config.starting_year;
            net_worth / (1.0 + self.config.inflation_rate).powf(years)
        } else {
            net_worth
        }
    }

    pub fn total_house_equity(&self) -> f64 {
        self.houses.iter().map(MortgagedAsset::equity).sum()
    }

    pub fn total_principal(&self) -> f64 {
        self.houses.iter().map(MortgagedAsset::principal).sum()
    }
}

fn year_after(starting_year: f64, months: u32) -> f64 {
    starting_year + f64::from(months) / 12.0
}

fn validate_purchase(purchase: &HousePurchase) -> Result<(), DomainError> {
    if purchase.price.is_nan() || purchase.price <= 0.0 {
        return Err(DomainError::invalid(
            "price",
            format!("must be positive, got {}", purchase.price),
        ));
    }
    if purchase.closing_costs.is_nan() || purchase.closing_costs < 0.0 {
        return Err(DomainError::invalid(
            "closing costs",
            format!("must be non-negative, got {}", purchase.closing_costs),
        ));
    }
    if !(0.0..=1.0).contains(&purchase.down_payment_fraction) {
        return Err(DomainError::invalid(
            "down payment fraction",
            format!("must be between 0 and 1, got {}", purchase.down_payment_fraction),
        ));
    }
    Ok(())
}
