//! In-memory repositories for anonymous sessions. Nothing is persisted.

use super::{
    lock, Callback, CategoryRepository, LedgerRepository, Listeners, PlanRepository, Subscription,
};
use crate::category::{Category, CategoryList};
use crate::demo::{demo_ledger, DemoConfig};
use crate::error::{Result, WealthError};
use crate::investment::InvestmentPlan;
use crate::ledger::MonthEntry;
use crate::money::Money;
use std::sync::Mutex;

pub struct LocalCategoryRepository {
    categories: Mutex<CategoryList>,
    listeners: Listeners<Vec<Category>>,
}

impl LocalCategoryRepository {
    /// Starts from the default categories.
    pub fn new() -> Self {
        LocalCategoryRepository {
            categories: Mutex::new(CategoryList::with_defaults()),
            listeners: Listeners::new(),
        }
    }

    fn edit<R>(&self, f: impl FnOnce(&mut CategoryList) -> Result<R>) -> Result<R> {
        let (result, snapshot) = {
            let mut categories = lock(&self.categories);
            let result = f(&mut *categories)?;
            (result, categories.as_slice().to_vec())
        };
        self.listeners.notify(&snapshot);
        Ok(result)
    }
}

impl Default for LocalCategoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl CategoryRepository for LocalCategoryRepository {
    fn list(&self) -> Result<Vec<Category>> {
        Ok(lock(&self.categories).as_slice().to_vec())
    }

    fn add(&self, name: &str) -> Result<Category> {
        self.edit(|categories| categories.add(name))
    }

    fn rename(&self, id: &str, name: &str) -> Result<()> {
        self.edit(|categories| categories.rename(id, name).map(|_| ()))
    }

    fn recolor(&self, id: &str, color: &str) -> Result<()> {
        self.edit(|categories| categories.recolor(id, color).map(|_| ()))
    }

    fn remove(&self, id: &str) -> Result<()> {
        self.edit(|categories| categories.remove(id).map(|_| ()))
    }

    fn subscribe(&self, callback: Callback<Vec<Category>>) -> Result<Subscription> {
        let subscription = self.listeners.register(callback.clone());
        callback(&self.list()?);
        Ok(subscription)
    }
}

struct LedgerState {
    initial_capital: Money,
    months: Vec<MonthEntry>,
}

pub struct LocalLedgerRepository {
    state: Mutex<LedgerState>,
    listeners: Listeners<Vec<MonthEntry>>,
}

impl LocalLedgerRepository {
    /// An empty ledger with zero starting capital.
    pub fn new() -> Self {
        Self::with_months(Money::ZERO, Vec::new())
    }

    pub fn with_months(initial_capital: Money, months: Vec<MonthEntry>) -> Self {
        LocalLedgerRepository {
            state: Mutex::new(LedgerState {
                initial_capital,
                months,
            }),
            listeners: Listeners::new(),
        }
    }

    /// A ledger pre-filled with [`demo_ledger`].
    pub fn demo(config: &DemoConfig) -> Self {
        Self::with_months(config.initial_capital, demo_ledger(config))
    }

    fn edit_months(&self, f: impl FnOnce(&mut Vec<MonthEntry>) -> Result<()>) -> Result<()> {
        let snapshot = {
            let mut state = lock(&self.state);
            f(&mut state.months)?;
            state.months.clone()
        };
        self.listeners.notify(&snapshot);
        Ok(())
    }
}

impl Default for LocalLedgerRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerRepository for LocalLedgerRepository {
    fn initial_capital(&self) -> Result<Money> {
        Ok(lock(&self.state).initial_capital)
    }

    fn set_initial_capital(&self, amount: Money) -> Result<()> {
        let snapshot = {
            let mut state = lock(&self.state);
            state.initial_capital = amount;
            state.months.clone()
        };
        self.listeners.notify(&snapshot);
        Ok(())
    }

    fn months(&self) -> Result<Vec<MonthEntry>> {
        Ok(lock(&self.state).months.clone())
    }

    fn insert_month(&self, entry: &MonthEntry) -> Result<()> {
        self.edit_months(|months| {
            months.push(entry.clone());
            Ok(())
        })
    }

    fn update_month(&self, entry: &MonthEntry) -> Result<()> {
        self.edit_months(|months| {
            let slot = months
                .iter_mut()
                .find(|m| m.id == entry.id)
                .ok_or_else(|| WealthError::MonthNotFound(entry.id.clone()))?;
            *slot = entry.clone();
            Ok(())
        })
    }

    fn delete_month(&self, id: &str) -> Result<()> {
        self.edit_months(|months| {
            let before = months.len();
            months.retain(|m| m.id != id);
            if months.len() == before {
                return Err(WealthError::MonthNotFound(id.to_string()));
            }
            Ok(())
        })
    }

    fn subscribe(&self, callback: Callback<Vec<MonthEntry>>) -> Result<Subscription> {
        let subscription = self.listeners.register(callback.clone());
        callback(&self.months()?);
        Ok(subscription)
    }
}

#[derive(Default)]
pub struct LocalPlanRepository {
    plan: Mutex<Option<InvestmentPlan>>,
}

impl LocalPlanRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PlanRepository for LocalPlanRepository {
    fn load(&self) -> Result<InvestmentPlan> {
        Ok(lock(&self.plan).clone().unwrap_or_default())
    }

    fn save(&self, plan: &InvestmentPlan) -> Result<()> {
        *lock(&self.plan) = Some(plan.clone());
        Ok(())
    }
}
