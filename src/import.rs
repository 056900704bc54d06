//! CSV and JSON file formats used by the command line.
//!
//! Ledger files carry one row per salary or expense line:
//!
//! ```text
//! year,month,net_salary,gross_salary,category,amount
//! 2025,1,2200,3100,Affitto,850
//! 2025,1,,,Cibo,420.50
//! ```
//!
//! Months are 1-based in files. Rows of the same month merge into one entry;
//! salaries come from the first row of that month that carries them.

use crate::category::CategoryList;
use crate::error::{Result, WealthError};
use crate::investment::{InvestmentPlan, ProjectedMonth};
use crate::ledger::{Expense, MonthEntry};
use crate::money::Money;
use crate::wealth::GlobalMonth;
use csv::{ReaderBuilder, Trim};
use log::{debug, warn};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::str::FromStr;

/// Raw CSV row before validation.
#[derive(Debug, Deserialize)]
struct LedgerRecord {
    year: i32,
    month: i64,
    #[serde(default)]
    net_salary: Option<String>,
    #[serde(default)]
    gross_salary: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    amount: Option<String>,
}

/// A validated row.
struct ParsedRecord {
    year: i32,
    month: u8,
    net_salary: Option<Money>,
    gross_salary: Option<Money>,
    expense: Option<(String, Money)>,
}

fn parse_money(field: &str, value: &Option<String>) -> Result<Option<Money>> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => Money::from_str(raw)
            .map(Some)
            .map_err(|_| WealthError::Validation(format!("{} is not a number: {}", field, raw))),
    }
}

impl LedgerRecord {
    fn parse(self, row: usize) -> Result<ParsedRecord> {
        let invalid = |message: String| WealthError::InvalidRecord { row, message };

        if !(1..=12).contains(&self.month) {
            return Err(invalid(format!("month must be 1..12, got {}", self.month)));
        }

        let net_salary = parse_money("net_salary", &self.net_salary)
            .map_err(|e| invalid(e.to_string()))?;
        let gross_salary = parse_money("gross_salary", &self.gross_salary)
            .map_err(|e| invalid(e.to_string()))?;
        let amount = parse_money("amount", &self.amount).map_err(|e| invalid(e.to_string()))?;

        if net_salary.map_or(false, |m| m.is_negative())
            || gross_salary.map_or(false, |m| m.is_negative())
        {
            return Err(invalid("salaries cannot be negative".to_string()));
        }

        let category = self
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        let expense = match (category, amount) {
            (Some(category), Some(amount)) if amount.is_positive() => Some((category, amount)),
            (Some(_), Some(amount)) => {
                return Err(invalid(format!("expense amount must be positive, got {}", amount)))
            }
            (Some(category), None) => {
                return Err(invalid(format!("expense {} has no amount", category)))
            }
            (None, Some(_)) => return Err(invalid("amount without category".to_string())),
            (None, None) => None,
        };

        Ok(ParsedRecord {
            year: self.year,
            month: (self.month - 1) as u8,
            net_salary,
            gross_salary,
            expense,
        })
    }
}

#[derive(Default)]
struct MonthDraft {
    net_salary: Option<Money>,
    gross_salary: Option<Money>,
    expenses: Vec<Expense>,
}

/// Reads a ledger CSV into month entries, in calendar order.
///
/// Malformed rows are logged at warn level and skipped. Expense colors come
/// from the default category of the same name; unknown categories get the
/// next palette color. Running balances are left at zero.
pub fn read_ledger<R: Read>(reader: R) -> Result<Vec<MonthEntry>> {
    let mut csv_reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut categories = CategoryList::with_defaults();
    let mut drafts: BTreeMap<(i32, u8), MonthDraft> = BTreeMap::new();

    for (row_idx, result) in csv_reader.deserialize::<LedgerRecord>().enumerate() {
        let row_num = row_idx + 2; // 1-indexed, accounting for header row

        let record = match result.map_err(WealthError::from).and_then(|r| r.parse(row_num)) {
            Ok(record) => record,
            Err(e) => {
                warn!("Row {}: {}", row_num, e);
                continue;
            }
        };

        let draft = drafts.entry((record.year, record.month)).or_default();
        draft.net_salary = draft.net_salary.or(record.net_salary);
        draft.gross_salary = draft.gross_salary.or(record.gross_salary);

        if let Some((name, amount)) = record.expense {
            let category = match categories.find_by_name(&name) {
                Some(category) => category.clone(),
                None => categories.add(&name)?,
            };
            draft
                .expenses
                .push(Expense::new(category.name, amount, category.color));
        }
    }

    debug!("Imported {} ledger months", drafts.len());

    Ok(drafts
        .into_iter()
        .map(|((year, month), draft)| {
            MonthEntry::new(
                month,
                year,
                draft.net_salary.unwrap_or_default(),
                draft.gross_salary.unwrap_or_default(),
            )
            .with_expenses(draft.expenses)
        })
        .collect())
}

/// Reads an investment plan from its JSON document form.
pub fn read_plan<R: Read>(reader: R) -> Result<InvestmentPlan> {
    Ok(serde_json::from_reader(reader)?)
}

/// Writes a recalculated ledger as CSV, one row per month.
pub fn write_ledger<W: Write>(ledger: &[MonthEntry], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record([
        "year",
        "month",
        "label",
        "net_salary",
        "gross_salary",
        "expenses",
        "balance",
        "cumulative_capital",
    ])?;

    for entry in ledger {
        csv_writer.write_record([
            entry.year.to_string(),
            (entry.month + 1).to_string(),
            entry.label().to_string(),
            entry.net_salary.to_string(),
            entry.gross_salary.to_string(),
            entry.total_expenses().to_string(),
            entry.balance().to_string(),
            entry.cumulative_capital.to_string(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

pub fn write_projection<W: Write>(schedule: &[ProjectedMonth], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record([
        "year",
        "month",
        "total_invested",
        "portfolio_value",
        "returns",
    ])?;

    for month in schedule {
        csv_writer.write_record([
            month.year.to_string(),
            month.month.clone(),
            month.total_invested.to_string(),
            month.portfolio_value.to_string(),
            month.returns.to_string(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

pub fn write_wealth<W: Write>(timeline: &[GlobalMonth], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record([
        "year",
        "month",
        "liquid_capital",
        "invested_capital",
        "total_wealth",
    ])?;

    for row in timeline {
        csv_writer.write_record([
            row.year.to_string(),
            row.month.clone(),
            row.liquid_capital.to_string(),
            row.invested_capital.to_string(),
            row.total_wealth.to_string(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}
