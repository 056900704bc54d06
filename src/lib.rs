//! # Wealth Engine
//!
//! Back end of a personal finance dashboard: a monthly cash flow ledger with
//! running balances, a compounding projection of a recurring investment
//! plan, and a combined wealth timeline merging the two.
//!
//! ## Design Principles
//!
//! - **Exact arithmetic**: Money is a full-precision `rust_decimal` value,
//!   rounded to cents only for reported figures
//! - **Derived state is recomputed**: Running balances and projections are
//!   rebuilt from scratch on every read, never patched
//! - **Injected storage**: Remote and local repositories sit behind traits
//!   and are chosen per session, with no global state
//! - **Explicit subscriptions**: Change listeners stay registered until
//!   their handle is unsubscribed
//!
//! ## Example
//!
//! ```
//! use wealth_engine::{combine, project, recalculate, InvestmentPlan, Money, MonthEntry};
//!
//! let january = MonthEntry::new(0, 2025, Money::from_units(2000), Money::from_units(2800));
//! let ledger = recalculate(vec![january], Money::from_units(1000));
//! let projection = project(&InvestmentPlan::default(), 2025);
//!
//! let timeline = combine(&ledger, &projection);
//! assert_eq!(timeline.len(), 360);
//! assert_eq!(timeline[0].liquid_capital, Money::from_units(3000));
//! ```

pub mod category;
pub mod cli;
pub mod dashboard;
pub mod demo;
pub mod error;
pub mod identity;
pub mod import;
pub mod investment;
pub mod ledger;
pub mod money;
pub mod store;
pub mod wealth;

pub use category::{Category, CategoryList, CATEGORY_COLORS};
pub use dashboard::{Dashboard, SalaryKind};
pub use demo::{demo_ledger, DemoConfig};
pub use error::{Result, WealthError};
pub use identity::{Identity, UserId};
pub use investment::{
    project, project_with, AccumulatorRounding, InvestmentPlan, ProjectedMonth,
    DEFAULT_START_YEAR,
};
pub use ledger::{month_label, recalculate, Expense, MonthEntry};
pub use money::{format_currency, format_percentage, Money};
pub use store::{
    Callback, CategoryRepository, DocumentStore, LedgerRepository, Listeners,
    MemoryDocumentStore, PlanRepository, Repositories, Subscription,
};
pub use wealth::{combine, combine_with, Alignment, GlobalMonth, WealthSummary};
