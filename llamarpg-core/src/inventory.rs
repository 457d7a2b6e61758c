//! Item counts held by an NPC.
//!
//! A present key always maps to a count of at least one; removing the last
//! unit deletes the key.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Mapping from item name to a positive count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    items: BTreeMap<String, u32>,
}

impl Inventory {
    /// Create an empty inventory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` units of `item`. Returns the new count.
    pub fn add(&mut self, item: &str, quantity: u32) -> u32 {
        if quantity == 0 {
            return self.count(item);
        }
        let count = self.items.entry(item.to_string()).or_insert(0);
        *count = count.saturating_add(quantity);
        *count
    }

    /// Remove `quantity` units of `item`.
    ///
    /// Returns `false` and leaves the inventory untouched when fewer than
    /// `quantity` units are held.
    pub fn remove(&mut self, item: &str, quantity: u32) -> bool {
        let Some(count) = self.items.get_mut(item) else {
            return false;
        };
        if *count < quantity {
            return false;
        }
        *count -= quantity;
        if *count == 0 {
            self.items.remove(item);
        }
        true
    }

    /// Units of `item` held (zero when absent).
    #[must_use]
    pub fn count(&self, item: &str) -> u32 {
        self.items.get(item).copied().unwrap_or(0)
    }

    /// Number of distinct items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate `(item, count)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.items.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Items held in quantity greater than one, i.e. tradeable without running out.
    #[must_use]
    pub fn surplus(&self) -> Vec<&str> {
        self.iter().filter(|(_, n)| *n > 1).map(|(k, _)| k).collect()
    }

    /// Whether any item count exceeds `threshold`.
    #[must_use]
    pub fn has_more_than(&self, threshold: u32) -> bool {
        self.items.values().any(|n| *n > threshold)
    }

    /// Compact JSON rendering, e.g. `{"copper_ore":3}`.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.items).unwrap_or_else(|_| "{}".to_string())
    }
}
