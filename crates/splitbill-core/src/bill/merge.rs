//! Deduplicating accumulator for line items.

use std::collections::HashSet;

use tracing::debug;

use crate::models::bill::LineItem;

/// Line items keyed by phone number, in first-insertion order.
///
/// The first item recorded for a number wins; later ones are ignored.
#[derive(Debug, Clone, Default)]
pub struct LineItemSet {
    items: Vec<LineItem>,
    seen: HashSet<String>,
}

impl LineItemSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an item. Returns `false` when the number was already present.
    pub fn insert(&mut self, item: LineItem) -> bool {
        if self.seen.contains(&item.line_number) {
            debug!("Skipping duplicate line {}", item.line_number);
            return false;
        }
        self.seen.insert(item.line_number.clone());
        self.items.push(item);
        true
    }

    /// Record several items, returning how many were new.
    pub fn extend<I>(&mut self, items: I) -> usize
    where
        I: IntoIterator<Item = LineItem>,
    {
        let mut added = 0;
        for item in items {
            if self.insert(item) {
                added += 1;
            }
        }
        added
    }

    pub fn contains(&self, line_number: &str) -> bool {
        self.seen.contains(line_number)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_items(self) -> Vec<LineItem> {
        self.items
    }
}
