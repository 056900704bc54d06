//! Combined liquid + invested wealth timeline.

use crate::investment::{ProjectedMonth, DEFAULT_START_YEAR};
use crate::ledger::{month_label, MonthEntry};
use crate::money::Money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One row of the combined timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalMonth {
    pub month: String,
    pub year: i32,

    /// Running ledger balance, or zero when the ledger has no row here.
    pub liquid_capital: Money,

    /// Projected portfolio value, or zero when the projection has no row here.
    pub invested_capital: Money,

    /// Always `liquid_capital + invested_capital`.
    pub total_wealth: Money,
}

impl GlobalMonth {
    fn new(month: &str, year: i32, liquid_capital: Money, invested_capital: Money) -> Self {
        GlobalMonth {
            month: month.to_string(),
            year,
            liquid_capital,
            invested_capital,
            total_wealth: liquid_capital + invested_capital,
        }
    }
}

/// How ledger rows are paired with projection rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    /// Row `i` of the ledger pairs with row `i` of the projection, whatever
    /// calendar months they carry.
    #[default]
    Positional,

    /// Rows pair by `(year, month)`; the timeline covers every month present
    /// on either side, in chronological order.
    ByDate,
}

/// Merges a recalculated ledger with a projection by position.
///
/// The output has `max(ledger.len(), projection.len())` rows. Where one side
/// runs out its capital counts as zero. If the two inputs start in different
/// calendar months, rows are still paired by index; use
/// [`combine_with`] with [`Alignment::ByDate`] to pair by calendar month.
pub fn combine(ledger: &[MonthEntry], projection: &[ProjectedMonth]) -> Vec<GlobalMonth> {
    let rows = ledger.len().max(projection.len());

    (0..rows)
        .map(|i| {
            let entry = ledger.get(i);
            let projected = projection.get(i);

            let (month, year) = match (entry, projected) {
                (Some(e), _) => (e.label(), e.year),
                (None, Some(p)) => (p.month.as_str(), p.year),
                (None, None) => ("", DEFAULT_START_YEAR),
            };

            GlobalMonth::new(
                month,
                year,
                entry.map_or(Money::ZERO, |e| e.cumulative_capital),
                projected.map_or(Money::ZERO, |p| p.portfolio_value),
            )
        })
        .collect()
}

/// Merges a ledger and a projection under the chosen alignment.
pub fn combine_with(
    ledger: &[MonthEntry],
    projection: &[ProjectedMonth],
    alignment: Alignment,
) -> Vec<GlobalMonth> {
    match alignment {
        Alignment::Positional => combine(ledger, projection),
        Alignment::ByDate => combine_by_date(ledger, projection),
    }
}

fn combine_by_date(ledger: &[MonthEntry], projection: &[ProjectedMonth]) -> Vec<GlobalMonth> {
    let mut periods: BTreeMap<(i32, u8), (Money, Money)> = BTreeMap::new();

    for entry in ledger {
        periods.entry(entry.period()).or_default().0 = entry.cumulative_capital;
    }
    for projected in projection {
        periods.entry(projected.period()).or_default().1 = projected.portfolio_value;
    }

    periods
        .into_iter()
        .map(|((year, month), (liquid, invested))| {
            GlobalMonth::new(month_label(month as usize), year, liquid, invested)
        })
        .collect()
}

/// Headline figures taken from the last row of a combined timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WealthSummary {
    pub liquid_capital: Money,
    pub invested_capital: Money,
    pub total_wealth: Money,

    /// Share of the total held as liquid capital, in percent.
    pub liquid_share: Decimal,

    /// Share of the total held as investments, in percent.
    pub invested_share: Decimal,
}

impl WealthSummary {
    /// Summarizes the final row. Shares are zero when the total is not positive
    /// and saturate when one side dwarfs a tiny total.
    pub fn from_timeline(timeline: &[GlobalMonth]) -> Self {
        let (liquid, invested, total) = timeline.last().map_or(
            (Money::ZERO, Money::ZERO, Money::ZERO),
            |row| (row.liquid_capital, row.invested_capital, row.total_wealth),
        );

        let share = |part: Money| {
            if total.is_positive() {
                let ratio = part.amount().checked_div(total.amount()).unwrap_or(
                    if part.is_negative() { Decimal::MIN } else { Decimal::MAX },
                );
                ratio.saturating_mul(Decimal::ONE_HUNDRED)
            } else {
                Decimal::ZERO
            }
        };

        WealthSummary {
            liquid_capital: liquid,
            invested_capital: invested,
            total_wealth: total,
            liquid_share: share(liquid),
            invested_share: share(invested),
        }
    }
}
