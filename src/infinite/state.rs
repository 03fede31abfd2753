//! Option items, the per-instance cache and the load state machine.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// One selectable option.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OptionItem {
    /// Value committed on selection; unique within a list.
    pub value: String,
    /// Text shown to the user.
    pub label: String,
}

impl OptionItem {
    /// Creates an option.
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Where an [`InfiniteList`](super::InfiniteList) is in its page sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A fetch for `page` is in flight.
    Loading {
        /// 1-based page number being fetched.
        page: u32,
    },
    /// At least one page is cached and more may exist.
    Loaded,
    /// A page came back empty; nothing more will be requested.
    Exhausted,
}

impl LoadState {
    /// True while a fetch is in flight.
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading { .. })
    }
}

/// Accumulated options of one list instance.
#[derive(Debug, Clone)]
pub struct OptionCache {
    items: Vec<OptionItem>,
    seen: HashSet<String>,
    has_more: bool,
}

impl Default for OptionCache {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            seen: HashSet::new(),
            has_more: true,
        }
    }
}

impl OptionCache {
    /// Appends a fetched page, skipping values already cached, and returns
    /// how many items were added. An empty page marks the end of the list.
    pub fn append(&mut self, page: Vec<OptionItem>) -> usize {
        if page.is_empty() {
            self.has_more = false;
            return 0;
        }
        let before = self.items.len();
        for item in page {
            if self.seen.insert(item.value.clone()) {
                self.items.push(item);
            }
        }
        self.items.len() - before
    }

    /// Cached options in arrival order.
    pub fn items(&self) -> &[OptionItem] {
        &self.items
    }

    /// Looks an option up by value.
    pub fn get(&self, value: &str) -> Option<&OptionItem> {
        if !self.seen.contains(value) {
            return None;
        }
        self.items.iter().find(|item| item.value == value)
    }

    /// Number of cached options.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True before the first non-empty page.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// False once an empty page has been received.
    pub fn has_more(&self) -> bool {
        self.has_more
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_skips_duplicate_values() {
        let mut cache = OptionCache::default();
        assert_eq!(
            cache.append(vec![OptionItem::new("a", "A"), OptionItem::new("b", "B")]),
            2
        );
        assert_eq!(
            cache.append(vec![OptionItem::new("b", "B again"), OptionItem::new("c", "C")]),
            1
        );
        let labels: Vec<_> = cache.items().iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["A", "B", "C"]);
        assert_eq!(cache.get("b").map(|i| i.label.as_str()), Some("B"));
        assert!(cache.get("z").is_none());
    }

    #[test]
    fn test_empty_page_ends_list() {
        let mut cache = OptionCache::default();
        assert!(cache.has_more());
        cache.append(vec![OptionItem::new("a", "A")]);
        assert!(cache.has_more());
        assert_eq!(cache.append(Vec::new()), 0);
        assert!(!cache.has_more());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_option_items_deserialize() {
        let items: Vec<OptionItem> =
            serde_json::from_str(r#"[{"value":"7","label":"Acme"}]"#).unwrap();
        assert_eq!(items, vec![OptionItem::new("7", "Acme")]);
    }
}
