//! Demo ledger shown to anonymous visitors.
//!
//! Amounts vary from month to month inside fixed ranges, but the variation is
//! a pure function of the month position, so the same config always yields
//! the same figures.

use crate::category::CategoryList;
use crate::ledger::{recalculate, Expense, MonthEntry};
use crate::money::Money;

#[derive(Debug, Clone, PartialEq)]
pub struct DemoConfig {
    pub initial_capital: Money,
    pub base_net_salary: Money,
    pub base_gross_salary: Money,
    pub months_to_generate: usize,

    /// Calendar month of the first generated entry, 0 = January.
    pub start_month: u8,
    pub start_year: i32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        DemoConfig {
            initial_capital: Money::from_units(5000),
            base_net_salary: Money::from_units(2200),
            base_gross_salary: Money::from_units(3100),
            months_to_generate: 12,
            start_month: 0,
            start_year: 2025,
        }
    }
}

/// Deterministic amount in `low..=low + span` for a given month slot.
fn vary(slot: usize, salt: usize, low: i64, span: i64) -> Money {
    let offset = ((slot * 37 + salt * 61) % (span as usize + 1)) as i64;
    Money::from_units(low + offset)
}

/// Generates `months_to_generate` consecutive months with running balances.
///
/// Seasonal rules follow the calendar month: a thirteenth salary and gifts in
/// December, a summer bonus in June, holidays in July and August, higher
/// utility bills in winter, and periodic health and clothing costs.
pub fn demo_ledger(config: &DemoConfig) -> Vec<MonthEntry> {
    let categories = CategoryList::with_defaults();
    let expense = |name: &str, amount: Money| {
        let color = categories
            .find_by_name(name)
            .map(|c| c.color.clone())
            .unwrap_or_default();
        Expense::new(name, amount, color)
    };

    let months = (0..config.months_to_generate)
        .map(|i| {
            let absolute = config.start_month as usize + i;
            let month = (absolute % 12) as u8;
            let year = config.start_year + (absolute / 12) as i32;

            let (mut net, mut gross) = (config.base_net_salary, config.base_gross_salary);
            match month {
                11 => {
                    net += Money::from_units(2000);
                    gross += Money::from_units(2800);
                }
                5 => {
                    net += Money::from_units(800);
                    gross += Money::from_units(1100);
                }
                _ => {}
            }

            let bills = if matches!(month, 0 | 1 | 11) {
                vary(i, 2, 180, 70)
            } else {
                vary(i, 2, 120, 50)
            };

            let mut expenses = vec![
                expense("Affitto", Money::from_units(850)),
                expense("Cibo", vary(i, 1, 380, 140)),
                expense("Bollette", bills),
                expense("Trasporti", vary(i, 3, 90, 60)),
                expense("Svago", vary(i, 4, 150, 150)),
            ];

            if matches!(month, 6 | 7) {
                expenses.push(expense("Vacanze", vary(i, 5, 600, 400)));
            }
            if month == 11 {
                expenses.push(expense("Regali", vary(i, 6, 300, 300)));
            }
            if matches!(month, 1 | 4 | 9) {
                expenses.push(expense("Salute", vary(i, 7, 80, 120)));
            }
            if matches!(month, 2 | 3 | 8 | 9) {
                expenses.push(expense("Abbigliamento", vary(i, 8, 100, 200)));
            }
            if (i * 7 + 3) % 5 < 3 {
                expenses.push(expense("Ristoranti", vary(i, 9, 80, 120)));
            }

            MonthEntry::new(month, year, net, gross).with_expenses(expenses)
        })
        .collect();

    recalculate(months, config.initial_capital)
}
