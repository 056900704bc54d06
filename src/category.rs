//! Expense categories and the rules for editing them.

use crate::error::{Result, WealthError};
use crate::ledger::new_id;
use serde::{Deserialize, Serialize};

/// Colors handed out to categories in order of creation.
pub const CATEGORY_COLORS: [&str; 8] = [
    "#ef4444", // red
    "#f59e0b", // amber
    "#10b981", // emerald
    "#3b82f6", // blue
    "#8b5cf6", // violet
    "#ec4899", // pink
    "#06b6d4", // cyan
    "#f97316", // orange
];

const DEFAULT_CATEGORIES: [(&str, usize); 10] = [
    ("Affitto", 0),
    ("Cibo", 1),
    ("Bollette", 2),
    ("Trasporti", 3),
    ("Svago", 4),
    ("Vacanze", 5),
    ("Regali", 6),
    ("Salute", 7),
    ("Abbigliamento", 5),
    ("Ristoranti", 6),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub color: String,

    /// Built-in categories cannot be removed.
    #[serde(default)]
    pub is_default: bool,
}

impl Category {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Category {
            id: new_id(),
            name: name.into(),
            color: color.into(),
            is_default: false,
        }
    }

    fn matches_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

/// The built-in category set, with fresh ids.
pub fn default_categories() -> Vec<Category> {
    DEFAULT_CATEGORIES
        .iter()
        .map(|&(name, color)| Category {
            is_default: true,
            ..Category::new(name, CATEGORY_COLORS[color])
        })
        .collect()
}

/// An ordered set of categories with unique, case-insensitive names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryList {
    categories: Vec<Category>,
}

impl CategoryList {
    pub fn new(categories: Vec<Category>) -> Self {
        CategoryList { categories }
    }

    pub fn with_defaults() -> Self {
        CategoryList::new(default_categories())
    }

    pub fn as_slice(&self) -> &[Category] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Case-insensitive lookup by name.
    pub fn find_by_name(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.matches_name(name))
    }

    /// Adds a custom category and returns it.
    ///
    /// The name is trimmed and must be non-empty and unused. The color is the
    /// next one in [`CATEGORY_COLORS`], cycling by list length.
    pub fn add(&mut self, name: &str) -> Result<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(WealthError::EmptyName);
        }
        if self.find_by_name(name).is_some() {
            return Err(WealthError::DuplicateCategory(name.to_string()));
        }

        let color = CATEGORY_COLORS[self.categories.len() % CATEGORY_COLORS.len()];
        let category = Category::new(name, color);
        self.categories.push(category.clone());
        Ok(category)
    }

    /// Renames a category. Existing expenses keep their copied name.
    pub fn rename(&mut self, id: &str, name: &str) -> Result<&Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(WealthError::EmptyName);
        }
        if self
            .categories
            .iter()
            .any(|c| c.id != id && c.matches_name(name))
        {
            return Err(WealthError::DuplicateCategory(name.to_string()));
        }

        let category = self.get_mut(id)?;
        category.name = name.to_string();
        Ok(&*category)
    }

    pub fn recolor(&mut self, id: &str, color: &str) -> Result<&Category> {
        let category = self.get_mut(id)?;
        category.color = color.to_string();
        Ok(&*category)
    }

    /// Removes a custom category. Default categories are refused.
    pub fn remove(&mut self, id: &str) -> Result<Category> {
        let idx = self
            .categories
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| WealthError::CategoryNotFound(id.to_string()))?;

        if self.categories[idx].is_default {
            return Err(WealthError::DefaultCategory(
                self.categories[idx].name.clone(),
            ));
        }

        Ok(self.categories.remove(idx))
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Category> {
        self.categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| WealthError::CategoryNotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let list = CategoryList::with_defaults();
        assert_eq!(list.len(), 10);
        assert!(list.as_slice().iter().all(|c| c.is_default));
        assert_eq!(list.find_by_name("affitto").unwrap().color, "#ef4444");
        assert_eq!(list.find_by_name("RISTORANTI").unwrap().color, "#06b6d4");
    }

    #[test]
    fn test_add_trims_and_cycles_colors() {
        let mut list = CategoryList::with_defaults();
        let added = list.add("  Palestra  ").unwrap();

        assert_eq!(added.name, "Palestra");
        assert_eq!(added.color, CATEGORY_COLORS[10 % 8]);
        assert!(!added.is_default);
        assert_eq!(list.len(), 11);
    }

    #[test]
    fn test_add_rejects_empty_and_duplicate_names() {
        let mut list = CategoryList::with_defaults();

        assert!(matches!(list.add("   "), Err(WealthError::EmptyName)));
        assert!(matches!(
            list.add("cibo"),
            Err(WealthError::DuplicateCategory(_))
        ));
        assert_eq!(list.len(), 10);
    }

    #[test]
    fn test_rename_checks_other_names_only() {
        let mut list = CategoryList::with_defaults();
        let id = list.find_by_name("Cibo").unwrap().id.clone();

        assert_eq!(list.rename(&id, "CIBO").unwrap().name, "CIBO");
        assert!(matches!(
            list.rename(&id, "Affitto"),
            Err(WealthError::DuplicateCategory(_))
        ));
        assert!(matches!(list.rename(&id, ""), Err(WealthError::EmptyName)));
        assert!(matches!(
            list.rename("missing", "Nuova"),
            Err(WealthError::CategoryNotFound(_))
        ));
    }

    #[test]
    fn test_recolor() {
        let mut list = CategoryList::with_defaults();
        let id = list.find_by_name("Svago").unwrap().id.clone();

        list.recolor(&id, "#000000").unwrap();
        assert_eq!(list.get(&id).unwrap().color, "#000000");
        assert!(list.recolor("missing", "#fff").is_err());
    }

    #[test]
    fn test_remove_refuses_defaults() {
        let mut list = CategoryList::with_defaults();
        let default_id = list.find_by_name("Salute").unwrap().id.clone();
        let custom_id = list.add("Animali").unwrap().id;

        assert!(matches!(
            list.remove(&default_id),
            Err(WealthError::DefaultCategory(_))
        ));
        assert_eq!(list.remove(&custom_id).unwrap().name, "Animali");
        assert!(matches!(
            list.remove(&custom_id),
            Err(WealthError::CategoryNotFound(_))
        ));
        assert_eq!(list.len(), 10);
    }

    #[test]
    fn test_category_json_uses_is_default() {
        let json = serde_json::to_value(&default_categories()[0]).unwrap();
        assert_eq!(json["isDefault"], serde_json::Value::Bool(true));
        assert_eq!(json["name"], "Affitto");
    }
}
