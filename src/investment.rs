//! Recurring investment plan and its month-by-month compounding projection.

use crate::error::{Result, WealthError};
use crate::ledger::month_label;
use crate::money::Money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Year the projection starts from when the ledger offers no better anchor.
pub const DEFAULT_START_YEAR: i32 = 2025;

/// A recurring-contribution plan. One per user, replaced wholesale on edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentPlan {
    pub initial_balance: Money,
    pub monthly_investment: Money,

    /// Yearly return as a percentage: `7` means 7%/year. May be negative.
    #[serde(rename = "annualROI")]
    pub annual_roi: Decimal,

    pub years_to_simulate: i32,
}

impl Default for InvestmentPlan {
    fn default() -> Self {
        InvestmentPlan {
            initial_balance: Money::ZERO,
            monthly_investment: Money::from_units(200),
            annual_roi: Decimal::from(7),
            years_to_simulate: 30,
        }
    }
}

impl InvestmentPlan {
    /// Checks the plan before it is accepted from a user.
    ///
    /// The projector itself accepts any plan; this is the caller-side gate.
    pub fn validate(&self) -> Result<()> {
        if self.initial_balance.is_negative() {
            return Err(WealthError::Validation(format!(
                "initial balance cannot be negative: {}",
                self.initial_balance
            )));
        }
        if self.monthly_investment.is_negative() {
            return Err(WealthError::Validation(format!(
                "monthly investment cannot be negative: {}",
                self.monthly_investment
            )));
        }
        if self.years_to_simulate <= 0 {
            return Err(WealthError::Validation(format!(
                "years to simulate must be positive: {}",
                self.years_to_simulate
            )));
        }
        Ok(())
    }

    /// Monthly growth rate as a fraction: `annual_roi / 12 / 100`.
    pub fn monthly_rate(&self) -> Decimal {
        self.annual_roi / Decimal::from(12) / Decimal::ONE_HUNDRED
    }

    pub fn total_months(&self) -> usize {
        self.years_to_simulate.max(0) as usize * 12
    }
}

/// One simulated month of the projection. Recomputed on every read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectedMonth {
    /// Display label of the calendar month.
    pub month: String,

    /// Calendar month index, 0 = January.
    pub month_index: u8,

    pub year: i32,

    /// Contributions so far, initial balance included.
    pub total_invested: Money,

    /// Compounded value, rounded to cents.
    pub portfolio_value: Money,

    /// `portfolio_value - total_invested`, rounded to cents.
    pub returns: Money,
}

impl ProjectedMonth {
    pub fn period(&self) -> (i32, u8) {
        (self.year, self.month_index)
    }
}

/// When the projection's running accumulators are rounded to cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccumulatorRounding {
    /// Accumulators carry full precision; only the reported fields are rounded.
    #[default]
    OutputOnly,

    /// The portfolio value is rounded to cents at the end of every month and
    /// the rounded value compounds from there.
    EveryMonth,
}

/// Projects `plan` month by month starting in January of `start_year`.
///
/// Each month adds the contribution first and then applies one month of
/// growth, so the new contribution earns that month's return too. Output
/// length is `years_to_simulate * 12`; zero or negative years give an empty
/// schedule. A zero rate is plain linear accumulation and a negative rate
/// decays the portfolio.
///
/// # Example
///
/// ```
/// use rust_decimal::Decimal;
/// use wealth_engine::{project, InvestmentPlan, Money};
///
/// let plan = InvestmentPlan {
///     initial_balance: Money::ZERO,
///     monthly_investment: Money::from_units(100),
///     annual_roi: Decimal::from(12),
///     years_to_simulate: 1,
/// };
///
/// let schedule = project(&plan, 2025);
/// assert_eq!(schedule.len(), 12);
/// assert_eq!(schedule[0].portfolio_value, Money::from_units(101));
/// ```
pub fn project(plan: &InvestmentPlan, start_year: i32) -> Vec<ProjectedMonth> {
    project_with(plan, start_year, AccumulatorRounding::OutputOnly)
}

/// Same as [`project`] with an explicit accumulator rounding policy.
pub fn project_with(
    plan: &InvestmentPlan,
    start_year: i32,
    rounding: AccumulatorRounding,
) -> Vec<ProjectedMonth> {
    let growth = Decimal::ONE + plan.monthly_rate();
    let total_months = plan.total_months();

    let mut total_invested = plan.initial_balance;
    let mut portfolio_value = plan.initial_balance;
    let mut schedule = Vec::new();

    for i in 0..total_months {
        total_invested += plan.monthly_investment;
        portfolio_value += plan.monthly_investment;
        portfolio_value = portfolio_value * growth;

        if rounding == AccumulatorRounding::EveryMonth {
            portfolio_value = portfolio_value.round2();
        }

        let month_index = i % 12;
        schedule.push(ProjectedMonth {
            month: month_label(month_index).to_string(),
            month_index: month_index as u8,
            year: i32::try_from(i / 12)
                .map_or(i32::MAX, |offset| start_year.saturating_add(offset)),
            total_invested,
            portfolio_value: portfolio_value.round2(),
            returns: (portfolio_value - total_invested).round2(),
        });
    }

    schedule
}
