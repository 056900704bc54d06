//! Dashboard operations over the injected repositories.
//!
//! Every edit goes through here: input is validated, the affected month is
//! rewritten in the ledger repository, and readers always get a freshly
//! recalculated ledger. Storage failures are logged and handed back to the
//! caller; nothing is retried.

use crate::category::Category;
use crate::error::{Result, WealthError};
use crate::identity::Identity;
use crate::investment::{project, InvestmentPlan, ProjectedMonth, DEFAULT_START_YEAR};
use crate::ledger::{recalculate, Expense, MonthEntry};
use crate::money::Money;
use crate::store::{Callback, DocumentStore, Repositories, Subscription};
use crate::wealth::{combine_with, Alignment, GlobalMonth, WealthSummary};
use log::{debug, error, warn};
use std::sync::Arc;

/// Which salary figure of a month to edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SalaryKind {
    Net,
    Gross,
}

/// Logs a failed operation at a level matching its cause.
fn logged<T>(operation: &str, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        match e {
            WealthError::Store(_) | WealthError::Json(_) | WealthError::Io(_) => {
                error!("{} failed: {}", operation, e)
            }
            _ => warn!("{} rejected: {}", operation, e),
        }
    }
    result
}

fn ensure_positive(amount: Money) -> Result<()> {
    if amount.is_positive() {
        Ok(())
    } else {
        Err(WealthError::InvalidAmount(amount.to_string()))
    }
}

pub struct Dashboard {
    repos: Repositories,
}

impl Dashboard {
    pub fn new(repos: Repositories) -> Self {
        Dashboard { repos }
    }

    /// Opens a dashboard on remote data for a user, or demo data when anonymous.
    pub fn for_identity<D: DocumentStore + 'static>(
        identity: &Identity,
        store: Arc<D>,
    ) -> Result<Self> {
        let repos = logged("open", Repositories::for_identity(identity, store))?;
        Ok(Dashboard::new(repos))
    }

    /// The ledger in chronological order with fresh running balances.
    pub fn ledger(&self) -> Result<Vec<MonthEntry>> {
        logged("ledger", self.load_ledger())
    }

    fn load_ledger(&self) -> Result<Vec<MonthEntry>> {
        let initial_capital = self.repos.ledger.initial_capital()?;
        let months = self.repos.ledger.months()?;
        Ok(recalculate(months, initial_capital))
    }

    pub fn initial_capital(&self) -> Result<Money> {
        logged("initial_capital", self.repos.ledger.initial_capital())
    }

    pub fn set_initial_capital(&self, amount: Money) -> Result<()> {
        logged(
            "set_initial_capital",
            self.repos.ledger.set_initial_capital(amount),
        )?;
        debug!("Initial capital set to {}", amount);
        Ok(())
    }

    /// Adds an empty month. Only one entry per calendar month is allowed.
    pub fn add_month(
        &self,
        month: u8,
        year: i32,
        net_salary: Money,
        gross_salary: Money,
    ) -> Result<MonthEntry> {
        logged(
            "add_month",
            self.insert_new(MonthEntry::new(month, year, net_salary, gross_salary)),
        )
    }

    /// Adds the calendar month after the latest one, copying its salaries and
    /// expenses. An empty ledger starts at January of the default year.
    pub fn append_next_month(&self) -> Result<MonthEntry> {
        let result = self.repos.ledger.months().and_then(|months| {
            let entry = match months.iter().max_by_key(|m| m.period()) {
                Some(latest) => latest.following(),
                None => MonthEntry::new(0, DEFAULT_START_YEAR, Money::ZERO, Money::ZERO),
            };
            self.insert_new(entry)
        });
        logged("append_next_month", result)
    }

    fn insert_new(&self, entry: MonthEntry) -> Result<MonthEntry> {
        if entry.month > 11 {
            return Err(WealthError::InvalidMonth(entry.month as i64));
        }
        if self
            .repos
            .ledger
            .months()?
            .iter()
            .any(|m| m.period() == entry.period())
        {
            return Err(WealthError::DuplicateMonth {
                month: entry.month,
                year: entry.year,
            });
        }

        self.repos.ledger.insert_month(&entry)?;
        debug!("Added month {} {}", entry.label(), entry.year);
        Ok(entry)
    }

    pub fn remove_month(&self, month_id: &str) -> Result<()> {
        logged("remove_month", self.repos.ledger.delete_month(month_id))?;
        debug!("Removed month {}", month_id);
        Ok(())
    }

    /// Sets the net or gross salary of a month. Negative salaries are refused.
    pub fn update_salary(&self, month_id: &str, kind: SalaryKind, amount: Money) -> Result<()> {
        let result = if amount.is_negative() {
            Err(WealthError::Validation(format!(
                "salary cannot be negative: {}",
                amount
            )))
        } else {
            self.edit_month(month_id, |entry| {
                match kind {
                    SalaryKind::Net => entry.net_salary = amount,
                    SalaryKind::Gross => entry.gross_salary = amount,
                }
                Ok(())
            })
        };
        logged("update_salary", result)
    }

    /// Records an expense under an existing category.
    ///
    /// The category's current name and color are copied onto the expense.
    pub fn add_expense(&self, month_id: &str, category: &str, amount: Money) -> Result<Expense> {
        let result = ensure_positive(amount).and_then(|_| {
            let category = self
                .repos
                .categories
                .find_by_name(category)?
                .ok_or_else(|| WealthError::CategoryNotFound(category.to_string()))?;

            let expense = Expense::new(category.name, amount, category.color);
            self.edit_month(month_id, |entry| {
                entry.expenses.push(expense.clone());
                Ok(())
            })?;
            Ok(expense)
        });
        logged("add_expense", result)
    }

    pub fn update_expense_amount(
        &self,
        month_id: &str,
        expense_id: &str,
        amount: Money,
    ) -> Result<()> {
        let result = ensure_positive(amount).and_then(|_| {
            self.edit_month(month_id, |entry| {
                let expense = entry
                    .expense_mut(expense_id)
                    .ok_or_else(|| WealthError::ExpenseNotFound(expense_id.to_string()))?;
                expense.amount = amount;
                Ok(())
            })
        });
        logged("update_expense_amount", result)
    }

    pub fn remove_expense(&self, month_id: &str, expense_id: &str) -> Result<()> {
        let result = self.edit_month(month_id, |entry| {
            let before = entry.expenses.len();
            entry.expenses.retain(|e| e.id != expense_id);
            if entry.expenses.len() == before {
                return Err(WealthError::ExpenseNotFound(expense_id.to_string()));
            }
            Ok(())
        });
        logged("remove_expense", result)
    }

    fn edit_month(
        &self,
        month_id: &str,
        edit: impl FnOnce(&mut MonthEntry) -> Result<()>,
    ) -> Result<()> {
        let mut entry = self
            .repos
            .ledger
            .month(month_id)?
            .ok_or_else(|| WealthError::MonthNotFound(month_id.to_string()))?;
        edit(&mut entry)?;
        self.repos.ledger.update_month(&entry)?;
        debug!("Updated month {} {}", entry.label(), entry.year);
        Ok(())
    }

    pub fn investment_plan(&self) -> Result<InvestmentPlan> {
        logged("investment_plan", self.repos.plans.load())
    }

    /// Validates and stores a new plan, replacing the old one.
    pub fn update_investment_plan(&self, plan: &InvestmentPlan) -> Result<()> {
        let result = plan.validate().and_then(|_| self.repos.plans.save(plan));
        logged("update_investment_plan", result)?;
        debug!(
            "Investment plan saved: {} monthly at {}% for {} years",
            plan.monthly_investment, plan.annual_roi, plan.years_to_simulate
        );
        Ok(())
    }

    /// Projects the stored plan from the year of the earliest ledger month.
    pub fn projection(&self) -> Result<Vec<ProjectedMonth>> {
        let ledger = self.ledger()?;
        self.project_from(&ledger)
    }

    fn project_from(&self, ledger: &[MonthEntry]) -> Result<Vec<ProjectedMonth>> {
        let plan = self.investment_plan()?;
        let start_year = ledger.first().map_or(DEFAULT_START_YEAR, |m| m.year);
        Ok(project(&plan, start_year))
    }

    /// The combined liquid and invested timeline.
    pub fn wealth(&self, alignment: Alignment) -> Result<Vec<GlobalMonth>> {
        let ledger = self.ledger()?;
        let projection = self.project_from(&ledger)?;
        Ok(combine_with(&ledger, &projection, alignment))
    }

    /// Headline figures of the positional timeline.
    pub fn summary(&self) -> Result<WealthSummary> {
        Ok(WealthSummary::from_timeline(
            &self.wealth(Alignment::Positional)?,
        ))
    }

    /// Calls `callback` with the recalculated ledger now and after every change.
    pub fn watch_ledger(&self, callback: Callback<Vec<MonthEntry>>) -> Result<Subscription> {
        let ledger = Arc::clone(&self.repos.ledger);
        let recalculated: Callback<Vec<MonthEntry>> =
            Arc::new(move |months: &Vec<MonthEntry>| match ledger.initial_capital() {
                Ok(initial_capital) => callback(&recalculate(months.clone(), initial_capital)),
                Err(e) => error!("Ledger update dropped: {}", e),
            });
        logged("watch_ledger", self.repos.ledger.subscribe(recalculated))
    }

    pub fn categories(&self) -> Result<Vec<Category>> {
        logged("categories", self.repos.categories.list())
    }

    pub fn add_category(&self, name: &str) -> Result<Category> {
        let category = logged("add_category", self.repos.categories.add(name))?;
        debug!("Added category {} ({})", category.name, category.color);
        Ok(category)
    }

    pub fn rename_category(&self, id: &str, name: &str) -> Result<()> {
        logged("rename_category", self.repos.categories.rename(id, name))
    }

    pub fn recolor_category(&self, id: &str, color: &str) -> Result<()> {
        logged("recolor_category", self.repos.categories.recolor(id, color))
    }

    pub fn remove_category(&self, id: &str) -> Result<()> {
        logged("remove_category", self.repos.categories.remove(id))
    }

    pub fn watch_categories(&self, callback: Callback<Vec<Category>>) -> Result<Subscription> {
        logged("watch_categories", self.repos.categories.subscribe(callback))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{lock, MemoryDocumentStore};
    use rust_decimal::Decimal;
    use std::sync::Mutex;

    fn empty() -> Dashboard {
        Dashboard::new(Repositories::local())
    }

    fn units(n: i64) -> Money {
        Money::from_units(n)
    }

    #[test]
    fn test_add_month_rejects_duplicates_and_bad_index() {
        let dashboard = empty();
        dashboard.add_month(0, 2025, units(2000), units(2800)).unwrap();

        assert!(matches!(
            dashboard.add_month(0, 2025, units(1), units(1)),
            Err(WealthError::DuplicateMonth { month: 0, year: 2025 })
        ));
        assert!(matches!(
            dashboard.add_month(12, 2025, units(1), units(1)),
            Err(WealthError::InvalidMonth(12))
        ));
        assert_eq!(dashboard.ledger().unwrap().len(), 1);
    }

    #[test]
    fn test_ledger_is_recalculated_on_read() {
        let dashboard = empty();
        dashboard.set_initial_capital(units(1000)).unwrap();
        let january = dashboard.add_month(0, 2025, units(2000), units(2800)).unwrap();
        dashboard.add_expense(&january.id, "Affitto", units(500)).unwrap();

        let ledger = dashboard.ledger().unwrap();
        assert_eq!(ledger[0].cumulative_capital, units(2500));
    }

    #[test]
    fn test_append_next_month_copies_latest() {
        let dashboard = empty();
        let first = dashboard.append_next_month().unwrap();
        assert_eq!(first.period(), (DEFAULT_START_YEAR, 0));

        let december = dashboard.add_month(11, 2025, units(3000), units(4000)).unwrap();
        dashboard.add_expense(&december.id, "Regali", units(300)).unwrap();

        let next = dashboard.append_next_month().unwrap();
        assert_eq!(next.period(), (2026, 0));
        assert_eq!(next.net_salary, units(3000));
        assert_eq!(next.expenses.len(), 1);
        assert_eq!(next.expenses[0].category, "Regali");
    }

    #[test]
    fn test_add_expense_validation() {
        let dashboard = empty();
        let month = dashboard.add_month(3, 2025, units(2000), units(2800)).unwrap();

        assert!(matches!(
            dashboard.add_expense(&month.id, "Cibo", Money::ZERO),
            Err(WealthError::InvalidAmount(_))
        ));
        assert!(matches!(
            dashboard.add_expense(&month.id, "Astronave", units(10)),
            Err(WealthError::CategoryNotFound(_))
        ));
        assert!(matches!(
            dashboard.add_expense("missing", "Cibo", units(10)),
            Err(WealthError::MonthNotFound(_))
        ));

        let expense = dashboard.add_expense(&month.id, "cibo", units(10)).unwrap();
        assert_eq!(expense.category, "Cibo");
        assert_eq!(expense.color, "#f59e0b");
    }

    #[test]
    fn test_expense_keeps_category_snapshot() {
        let dashboard = empty();
        let month = dashboard.add_month(0, 2025, units(2000), units(2800)).unwrap();
        dashboard.add_expense(&month.id, "Svago", units(100)).unwrap();

        let svago = dashboard
            .categories()
            .unwrap()
            .into_iter()
            .find(|c| c.name == "Svago")
            .unwrap();
        dashboard.rename_category(&svago.id, "Tempo libero").unwrap();

        assert_eq!(dashboard.ledger().unwrap()[0].expenses[0].category, "Svago");
    }

    #[test]
    fn test_update_and_remove_expense() {
        let dashboard = empty();
        let month = dashboard.add_month(0, 2025, units(2000), units(2800)).unwrap();
        let expense = dashboard.add_expense(&month.id, "Cibo", units(400)).unwrap();

        assert!(dashboard
            .update_expense_amount(&month.id, &expense.id, units(-1))
            .is_err());
        dashboard
            .update_expense_amount(&month.id, &expense.id, units(450))
            .unwrap();
        assert_eq!(dashboard.ledger().unwrap()[0].total_expenses(), units(450));

        dashboard.remove_expense(&month.id, &expense.id).unwrap();
        assert!(matches!(
            dashboard.remove_expense(&month.id, &expense.id),
            Err(WealthError::ExpenseNotFound(_))
        ));
    }

    #[test]
    fn test_update_salary() {
        let dashboard = empty();
        let month = dashboard.add_month(0, 2025, units(2000), units(2800)).unwrap();

        dashboard
            .update_salary(&month.id, SalaryKind::Gross, units(3000))
            .unwrap();
        dashboard
            .update_salary(&month.id, SalaryKind::Net, units(2100))
            .unwrap();
        assert!(dashboard
            .update_salary(&month.id, SalaryKind::Net, units(-5))
            .is_err());

        let ledger = dashboard.ledger().unwrap();
        assert_eq!(ledger[0].gross_salary, units(3000));
        assert_eq!(ledger[0].cumulative_capital, units(2100));
    }

    #[test]
    fn test_projection_starts_at_first_ledger_year() {
        let dashboard = empty();
        assert_eq!(dashboard.projection().unwrap()[0].year, DEFAULT_START_YEAR);

        dashboard.add_month(5, 2031, units(1), units(1)).unwrap();
        dashboard.add_month(2, 2030, units(1), units(1)).unwrap();
        let projection = dashboard.projection().unwrap();

        assert_eq!(projection[0].year, 2030);
        assert_eq!(projection.len(), 360);
    }

    #[test]
    fn test_invalid_plan_is_not_saved() {
        let dashboard = empty();
        let bad = InvestmentPlan {
            years_to_simulate: 0,
            ..InvestmentPlan::default()
        };

        assert!(matches!(
            dashboard.update_investment_plan(&bad),
            Err(WealthError::Validation(_))
        ));
        assert_eq!(dashboard.investment_plan().unwrap(), InvestmentPlan::default());
    }

    #[test]
    fn test_wealth_and_summary() {
        let dashboard = empty();
        dashboard.set_initial_capital(units(1000)).unwrap();
        dashboard.add_month(0, 2025, units(500), units(700)).unwrap();
        dashboard
            .update_investment_plan(&InvestmentPlan {
                initial_balance: Money::ZERO,
                monthly_investment: units(100),
                annual_roi: Decimal::ZERO,
                years_to_simulate: 1,
            })
            .unwrap();

        let timeline = dashboard.wealth(Alignment::Positional).unwrap();
        assert_eq!(timeline.len(), 12);
        assert_eq!(timeline[0].total_wealth, units(1600));
        assert_eq!(timeline[11].liquid_capital, Money::ZERO);

        let summary = dashboard.summary().unwrap();
        assert_eq!(summary.total_wealth, units(1200));
        assert_eq!(summary.invested_share, Decimal::ONE_HUNDRED);
    }

    #[test]
    fn test_watch_ledger_receives_recalculated_entries() {
        let dashboard = empty();
        dashboard.set_initial_capital(units(100)).unwrap();
        let balances: Arc<Mutex<Vec<Vec<Money>>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&balances);

        let subscription = dashboard
            .watch_ledger(Arc::new(move |months: &Vec<MonthEntry>| {
                lock(&sink).push(months.iter().map(|m| m.cumulative_capital).collect())
            }))
            .unwrap();
        dashboard.add_month(1, 2025, units(10), units(10)).unwrap();
        dashboard.add_month(0, 2025, units(20), units(20)).unwrap();
        subscription.unsubscribe();
        dashboard.add_month(2, 2025, units(30), units(30)).unwrap();

        assert_eq!(
            *lock(&balances),
            vec![vec![], vec![units(110)], vec![units(120), units(130)]]
        );
    }

    #[test]
    fn test_store_failures_are_returned() {
        let store = Arc::new(MemoryDocumentStore::new());
        let dashboard = Dashboard::for_identity(&Identity::user("u1"), Arc::clone(&store)).unwrap();
        let month = dashboard.add_month(0, 2025, units(1), units(1)).unwrap();

        store.set_offline(true);
        assert!(matches!(dashboard.ledger(), Err(WealthError::Store(_))));
        assert!(matches!(
            dashboard.add_expense(&month.id, "Cibo", units(5)),
            Err(WealthError::Store(_))
        ));

        store.set_offline(false);
        assert_eq!(dashboard.ledger().unwrap().len(), 1);
    }

    #[test]
    fn test_anonymous_dashboard_shows_demo() {
        let store = Arc::new(MemoryDocumentStore::new());
        let dashboard = Dashboard::for_identity(&Identity::Anonymous, store).unwrap();

        assert_eq!(dashboard.ledger().unwrap().len(), 12);
        assert_eq!(dashboard.initial_capital().unwrap(), units(5000));
    }
}
