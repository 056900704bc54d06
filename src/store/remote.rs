//! Repositories over a signed-in user's documents.
//!
//! Layout under `users/{uid}`:
//!
//! | collection  | document        | content                      |
//! |-------------|-----------------|------------------------------|
//! | `months`    | month id        | [`MonthEntry`] without `id`  |
//! | `categories`| category id     | [`Category`] without `id`    |
//! | `config`    | `investment`    | [`InvestmentPlan`]           |
//! | `profile`   | `data`          | `{ "initialCapital": ... }`  |

use super::document::{DocumentStore, StoredDocument};
use super::{Callback, CategoryRepository, LedgerRepository, PlanRepository, Subscription};
use crate::category::{default_categories, Category, CategoryList};
use crate::error::{Result, WealthError};
use crate::identity::UserId;
use crate::investment::InvestmentPlan;
use crate::ledger::MonthEntry;
use crate::money::Money;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

const PLAN_DOCUMENT: &str = "investment";
const PROFILE_DOCUMENT: &str = "data";

fn collection(user: &UserId, name: &str) -> String {
    format!("users/{}/{}", user, name)
}

/// Serializes a record, leaving its id to the document key.
fn encode<T: Serialize>(value: &T) -> Result<Value> {
    let mut document = serde_json::to_value(value)?;
    if let Value::Object(fields) = &mut document {
        fields.remove("id");
    }
    Ok(document)
}

/// Rebuilds a record from a document, taking its id from the document key.
fn decode<T: DeserializeOwned>(document: StoredDocument) -> Result<T> {
    let mut data = document.data;
    if let Value::Object(fields) = &mut data {
        fields.insert("id".to_string(), Value::String(document.id));
    }
    Ok(serde_json::from_value(data)?)
}

/// Decodes every document, skipping the ones that no longer parse.
fn decode_all<T: DeserializeOwned>(collection: &str, documents: Vec<StoredDocument>) -> Vec<T> {
    documents
        .into_iter()
        .filter_map(|document| {
            let id = document.id.clone();
            match decode(document) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Skipping document {}/{}: {}", collection, id, e);
                    None
                }
            }
        })
        .collect()
}

pub struct RemoteCategoryRepository<D> {
    store: Arc<D>,
    collection: String,
}

impl<D: DocumentStore> RemoteCategoryRepository<D> {
    /// Opens a user's categories, writing the defaults when there are none.
    pub fn open(store: Arc<D>, user: UserId) -> Result<Self> {
        let repo = RemoteCategoryRepository {
            collection: collection(&user, "categories"),
            store,
        };

        if repo.store.list(&repo.collection)?.is_empty() {
            info!("Seeding default categories for user {}", user);
            for category in default_categories() {
                repo.store
                    .set(&repo.collection, &category.id, encode(&category)?)?;
            }
        }

        Ok(repo)
    }

    fn current(&self) -> Result<CategoryList> {
        Ok(CategoryList::new(self.list()?))
    }
}

impl<D: DocumentStore> CategoryRepository for RemoteCategoryRepository<D> {
    fn list(&self) -> Result<Vec<Category>> {
        let documents = self.store.list(&self.collection)?;
        Ok(decode_all(&self.collection, documents))
    }

    fn add(&self, name: &str) -> Result<Category> {
        let category = self.current()?.add(name)?;
        self.store
            .set(&self.collection, &category.id, encode(&category)?)?;
        Ok(category)
    }

    fn rename(&self, id: &str, name: &str) -> Result<()> {
        let mut categories = self.current()?;
        let renamed = categories.rename(id, name)?;
        self.store.update(
            &self.collection,
            id,
            serde_json::json!({ "name": renamed.name }),
        )
    }

    fn recolor(&self, id: &str, color: &str) -> Result<()> {
        let mut categories = self.current()?;
        let recolored = categories.recolor(id, color)?;
        self.store.update(
            &self.collection,
            id,
            serde_json::json!({ "color": recolored.color }),
        )
    }

    fn remove(&self, id: &str) -> Result<()> {
        self.current()?.remove(id)?;
        self.store.delete(&self.collection, id)
    }

    fn subscribe(&self, callback: Callback<Vec<Category>>) -> Result<Subscription> {
        let name = self.collection.clone();
        self.store.subscribe(
            &self.collection,
            Arc::new(move |documents: &Vec<StoredDocument>| {
                callback(&decode_all(&name, documents.clone()))
            }),
        )
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Profile {
    #[serde(default)]
    initial_capital: Money,
}

pub struct RemoteLedgerRepository<D> {
    store: Arc<D>,
    months: String,
    profile: String,
}

impl<D: DocumentStore> RemoteLedgerRepository<D> {
    pub fn new(store: Arc<D>, user: UserId) -> Self {
        RemoteLedgerRepository {
            store,
            months: collection(&user, "months"),
            profile: collection(&user, "profile"),
        }
    }

    fn ensure_exists(&self, id: &str) -> Result<()> {
        match self.store.get(&self.months, id)? {
            Some(_) => Ok(()),
            None => Err(WealthError::MonthNotFound(id.to_string())),
        }
    }
}

impl<D: DocumentStore> LedgerRepository for RemoteLedgerRepository<D> {
    fn initial_capital(&self) -> Result<Money> {
        let profile: Profile = match self.store.get(&self.profile, PROFILE_DOCUMENT)? {
            Some(data) => serde_json::from_value(data)?,
            None => Profile::default(),
        };
        Ok(profile.initial_capital)
    }

    fn set_initial_capital(&self, amount: Money) -> Result<()> {
        let profile = Profile {
            initial_capital: amount,
        };
        self.store
            .set(&self.profile, PROFILE_DOCUMENT, serde_json::to_value(&profile)?)
    }

    fn months(&self) -> Result<Vec<MonthEntry>> {
        let documents = self.store.list(&self.months)?;
        Ok(decode_all(&self.months, documents))
    }

    fn month(&self, id: &str) -> Result<Option<MonthEntry>> {
        match self.store.get(&self.months, id)? {
            Some(data) => Ok(Some(decode(StoredDocument {
                id: id.to_string(),
                data,
            })?)),
            None => Ok(None),
        }
    }

    fn insert_month(&self, entry: &MonthEntry) -> Result<()> {
        debug!("Writing month {} ({}/{})", entry.id, entry.month, entry.year);
        self.store.set(&self.months, &entry.id, encode(entry)?)
    }

    fn update_month(&self, entry: &MonthEntry) -> Result<()> {
        self.ensure_exists(&entry.id)?;
        self.store.set(&self.months, &entry.id, encode(entry)?)
    }

    fn delete_month(&self, id: &str) -> Result<()> {
        self.ensure_exists(id)?;
        self.store.delete(&self.months, id)
    }

    fn subscribe(&self, callback: Callback<Vec<MonthEntry>>) -> Result<Subscription> {
        let name = self.months.clone();
        self.store.subscribe(
            &self.months,
            Arc::new(move |documents: &Vec<StoredDocument>| {
                callback(&decode_all(&name, documents.clone()))
            }),
        )
    }
}

pub struct RemotePlanRepository<D> {
    store: Arc<D>,
    collection: String,
}

impl<D: DocumentStore> RemotePlanRepository<D> {
    pub fn new(store: Arc<D>, user: UserId) -> Self {
        RemotePlanRepository {
            store,
            collection: collection(&user, "config"),
        }
    }
}

impl<D: DocumentStore> PlanRepository for RemotePlanRepository<D> {
    /// Returns the saved plan, storing the default one on first access.
    fn load(&self) -> Result<InvestmentPlan> {
        match self.store.get(&self.collection, PLAN_DOCUMENT)? {
            Some(data) => Ok(serde_json::from_value(data)?),
            None => {
                let plan = InvestmentPlan::default();
                self.save(&plan)?;
                Ok(plan)
            }
        }
    }

    fn save(&self, plan: &InvestmentPlan) -> Result<()> {
        self.store
            .set(&self.collection, PLAN_DOCUMENT, serde_json::to_value(plan)?)
    }
}
