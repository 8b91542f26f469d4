use super::filter::StatusFilter;
use super::item::ShoppingItem;

/// Items that pass the search term and status filter, in list order.
pub fn filtered_view(
    items: &[ShoppingItem],
    search_term: &str,
    filter: StatusFilter,
) -> Vec<ShoppingItem> {
    let needle = search_term.to_lowercase();
    items
        .iter()
        .filter(|item| item.matches_search(&needle))
        .filter(|item| filter.keeps(item))
        .cloned()
        .collect()
}

/// What the list screen shows: the visible items plus header counters.
pub struct ListView {
    pub items: Vec<ShoppingItem>,
    pub total: usize,
    pub completed: usize,
}

impl ListView {
    pub fn build(items: &[ShoppingItem], search_term: &str, filter: StatusFilter) -> Self {
        Self {
            items: filtered_view(items, search_term, filter),
            total: items.len(),
            completed: items.iter().filter(|i| i.completed).count(),
        }
    }

    pub fn visible(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
