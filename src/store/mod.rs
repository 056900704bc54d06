//! Repository seams between the dashboard and its storage.
//!
//! Each repository has two implementations: one backed by a user's documents
//! in a [`DocumentStore`] and one kept in local memory for anonymous
//! visitors. Callers pick one through [`Repositories`] and inject it; nothing
//! here is global.

pub mod document;
pub mod local;
pub mod remote;

pub use document::{DocumentStore, MemoryDocumentStore, StoredDocument};
pub use local::{LocalCategoryRepository, LocalLedgerRepository, LocalPlanRepository};
pub use remote::{RemoteCategoryRepository, RemoteLedgerRepository, RemotePlanRepository};

use crate::category::{Category, CategoryList};
use crate::demo::DemoConfig;
use crate::error::Result;
use crate::identity::{Identity, UserId};
use crate::investment::InvestmentPlan;
use crate::ledger::MonthEntry;
use crate::money::Money;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Change notification callback.
pub type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Locks a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle for a registered callback.
///
/// The callback stays registered until [`Subscription::unsubscribe`] is
/// called; dropping the handle does not detach it.
#[must_use = "keep the subscription and call unsubscribe() when done"]
pub struct Subscription {
    detach: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(detach: impl FnOnce() + Send + 'static) -> Self {
        Subscription {
            detach: Some(Box::new(detach)),
        }
    }

    /// Stops further notifications.
    pub fn unsubscribe(mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.detach.is_some())
            .finish()
    }
}

struct ListenerTable<T> {
    next_id: u64,
    callbacks: BTreeMap<u64, Callback<T>>,
}

/// Registry of change callbacks for one kind of value.
///
/// Callbacks run on the notifying thread, outside the registry lock, so a
/// callback may register or unsubscribe others.
pub struct Listeners<T> {
    table: Arc<Mutex<ListenerTable<T>>>,
}

impl<T: 'static> Listeners<T> {
    pub fn new() -> Self {
        Listeners {
            table: Arc::new(Mutex::new(ListenerTable {
                next_id: 0,
                callbacks: BTreeMap::new(),
            })),
        }
    }

    pub fn register(&self, callback: Callback<T>) -> Subscription {
        let id = {
            let mut table = lock(&self.table);
            let id = table.next_id;
            table.next_id += 1;
            table.callbacks.insert(id, callback);
            id
        };

        let table = Arc::downgrade(&self.table);
        Subscription::new(move || {
            if let Some(table) = table.upgrade() {
                lock(&table).callbacks.remove(&id);
            }
        })
    }

    pub fn notify(&self, value: &T) {
        let callbacks: Vec<Callback<T>> = lock(&self.table).callbacks.values().cloned().collect();
        for callback in callbacks {
            callback(value);
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.table).callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: 'static> Default for Listeners<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Listeners<T> {
    fn clone(&self) -> Self {
        Listeners {
            table: Arc::clone(&self.table),
        }
    }
}

/// Creates, edits and watches a user's expense categories.
pub trait CategoryRepository: Send + Sync {
    fn list(&self) -> Result<Vec<Category>>;

    /// Adds a custom category; see [`CategoryList::add`] for the rules.
    fn add(&self, name: &str) -> Result<Category>;

    fn rename(&self, id: &str, name: &str) -> Result<()>;

    fn recolor(&self, id: &str, color: &str) -> Result<()>;

    /// Removes a custom category. Default categories are refused.
    fn remove(&self, id: &str) -> Result<()>;

    /// Case-insensitive lookup by name.
    fn find_by_name(&self, name: &str) -> Result<Option<Category>> {
        Ok(CategoryList::new(self.list()?).find_by_name(name).cloned())
    }

    /// Registers `callback` for the current list and every later change.
    fn subscribe(&self, callback: Callback<Vec<Category>>) -> Result<Subscription>;
}

/// Stores a user's ledger months and starting capital.
///
/// Months come back in storage order with whatever running balance was last
/// written; callers recalculate before use.
pub trait LedgerRepository: Send + Sync {
    fn initial_capital(&self) -> Result<Money>;

    fn set_initial_capital(&self, amount: Money) -> Result<()>;

    fn months(&self) -> Result<Vec<MonthEntry>>;

    fn month(&self, id: &str) -> Result<Option<MonthEntry>> {
        Ok(self.months()?.into_iter().find(|m| m.id == id))
    }

    fn insert_month(&self, entry: &MonthEntry) -> Result<()>;

    /// Replaces the stored month with the same id.
    fn update_month(&self, entry: &MonthEntry) -> Result<()>;

    fn delete_month(&self, id: &str) -> Result<()>;

    /// Registers `callback` for the current months and every later change.
    fn subscribe(&self, callback: Callback<Vec<MonthEntry>>) -> Result<Subscription>;
}

/// Holds the single investment plan of a user.
pub trait PlanRepository: Send + Sync {
    /// The stored plan, or the default plan when none was saved yet.
    fn load(&self) -> Result<InvestmentPlan>;

    fn save(&self, plan: &InvestmentPlan) -> Result<()>;
}

/// The three repositories a dashboard session works with.
#[derive(Clone)]
pub struct Repositories {
    pub categories: Arc<dyn CategoryRepository>,
    pub ledger: Arc<dyn LedgerRepository>,
    pub plans: Arc<dyn PlanRepository>,
}

impl Repositories {
    /// Local repositories with default categories and an empty ledger.
    pub fn local() -> Self {
        Repositories {
            categories: Arc::new(LocalCategoryRepository::new()),
            ledger: Arc::new(LocalLedgerRepository::new()),
            plans: Arc::new(LocalPlanRepository::new()),
        }
    }

    /// Local repositories seeded with the demo ledger.
    pub fn demo(config: &DemoConfig) -> Self {
        Repositories {
            ledger: Arc::new(LocalLedgerRepository::demo(config)),
            ..Repositories::local()
        }
    }

    /// Repositories over a user's documents.
    pub fn remote<D: DocumentStore + 'static>(store: Arc<D>, user: UserId) -> Result<Self> {
        Ok(Repositories {
            categories: Arc::new(RemoteCategoryRepository::open(
                Arc::clone(&store),
                user.clone(),
            )?),
            ledger: Arc::new(RemoteLedgerRepository::new(Arc::clone(&store), user.clone())),
            plans: Arc::new(RemotePlanRepository::new(store, user)),
        })
    }

    /// Remote repositories for a signed-in user, demo data otherwise.
    pub fn for_identity<D: DocumentStore + 'static>(
        identity: &Identity,
        store: Arc<D>,
    ) -> Result<Self> {
        match identity.user_id() {
            None => Ok(Repositories::demo(&DemoConfig::default())),
            Some(user) => Repositories::remote(store, user.clone()),
        }
    }
}
