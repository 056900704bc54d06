//! Monthly cash flow ledger and running balance recalculation.
//!
//! A ledger is a set of [`MonthEntry`] records, one per calendar month, each
//! holding salaries and categorized expenses. The running balance stored in
//! `cumulative_capital` is derived: [`recalculate`] rebuilds it from scratch
//! every time any entry changes.

use crate::money::Money;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Short month labels shown next to every ledger and projection row.
pub const MONTH_LABELS: [&str; 12] = [
    "Gen", "Feb", "Mar", "Apr", "Mag", "Giu", "Lug", "Ago", "Set", "Ott", "Nov", "Dic",
];

/// Returns the display label for a month index, wrapping every 12 months.
pub fn month_label(index: usize) -> &'static str {
    MONTH_LABELS[index % 12]
}

/// Generates a fresh opaque identifier.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// A single categorized expense within a month.
///
/// `category` and `color` are snapshots copied from the category when the
/// expense was created. Renaming or recoloring the category later does not
/// touch existing expenses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub category: String,
    pub amount: Money,
    pub color: String,
}

impl Expense {
    pub fn new(category: impl Into<String>, amount: Money, color: impl Into<String>) -> Self {
        Expense {
            id: new_id(),
            category: category.into(),
            amount,
            color: color.into(),
        }
    }
}

/// One calendar month of the ledger.
///
/// # Invariants
///
/// - `month` is in `0..=11` (0 = January)
/// - At most one entry exists per `(month, year)` in a user's ledger; the
///   caller checks this before insertion
/// - `cumulative_capital` is overwritten by [`recalculate`] and never edited
///   directly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthEntry {
    pub id: String,
    pub month: u8,
    pub year: i32,

    /// Salary that enters the running balance.
    pub net_salary: Money,

    /// Informational only; never used in balance math.
    pub gross_salary: Money,

    #[serde(default)]
    pub expenses: Vec<Expense>,

    /// Running balance after this month. Derived.
    #[serde(default)]
    pub cumulative_capital: Money,
}

impl MonthEntry {
    /// Creates an entry with no expenses and a zero running balance.
    pub fn new(month: u8, year: i32, net_salary: Money, gross_salary: Money) -> Self {
        MonthEntry {
            id: new_id(),
            month,
            year,
            net_salary,
            gross_salary,
            expenses: Vec::new(),
            cumulative_capital: Money::ZERO,
        }
    }

    pub fn with_expenses(mut self, expenses: Vec<Expense>) -> Self {
        self.expenses = expenses;
        self
    }

    pub fn label(&self) -> &'static str {
        month_label(self.month as usize)
    }

    /// Chronological sort key.
    pub fn period(&self) -> (i32, u8) {
        (self.year, self.month)
    }

    pub fn total_expenses(&self) -> Money {
        self.expenses.iter().map(|e| e.amount).sum()
    }

    /// Net salary minus this month's expenses.
    pub fn balance(&self) -> Money {
        self.net_salary - self.total_expenses()
    }

    pub fn expense_mut(&mut self, expense_id: &str) -> Option<&mut Expense> {
        self.expenses.iter_mut().find(|e| e.id == expense_id)
    }

    /// Builds the entry for the next calendar month.
    ///
    /// Salaries carry over and every expense is copied under a fresh id. The
    /// running balance starts at zero until the ledger is recalculated.
    pub fn following(&self) -> MonthEntry {
        let (month, year) = if self.month >= 11 {
            (0, self.year + 1)
        } else {
            (self.month + 1, self.year)
        };

        let expenses = self
            .expenses
            .iter()
            .map(|e| Expense {
                id: new_id(),
                ..e.clone()
            })
            .collect();

        MonthEntry::new(month, year, self.net_salary, self.gross_salary).with_expenses(expenses)
    }
}

/// Sorts entries chronologically and annotates each with its running balance.
///
/// Starting from `initial_capital`, every month adds its net salary and
/// subtracts its expenses. The result has exactly as many entries as the
/// input. Entries sharing a `(year, month)` keep their input order.
///
/// Negative balances are kept as-is, and no rounding is applied between
/// months. Any previous `cumulative_capital` values are ignored, so running
/// this twice yields the same balances.
///
/// # Example
///
/// ```
/// use wealth_engine::{recalculate, Expense, Money, MonthEntry};
///
/// let january = MonthEntry::new(0, 2025, Money::from_units(2000), Money::from_units(2800))
///     .with_expenses(vec![Expense::new("Affitto", Money::from_units(500), "#ef4444")]);
///
/// let ledger = recalculate(vec![january], Money::from_units(1000));
/// assert_eq!(ledger[0].cumulative_capital, Money::from_units(2500));
/// ```
pub fn recalculate(entries: Vec<MonthEntry>, initial_capital: Money) -> Vec<MonthEntry> {
    let mut entries = entries;
    entries.sort_by_key(|entry| entry.period());

    let mut running = initial_capital;
    for entry in &mut entries {
        running += entry.balance();
        entry.cumulative_capital = running;
    }

    entries
}
