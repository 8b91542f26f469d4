use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::action::{Action, ActionOutcome};
use crate::config::ShopConfig;
use crate::core::analytics::Analytics;
use crate::core::category::{Category, CategorySeed, default_categories};
use crate::core::filter::StatusFilter;
use crate::core::item::{ItemUpdate, ShoppingItem, clamp_quantity};
use crate::core::view::{ListView, filtered_view};
use crate::error::StoreError;

/// A consistent, read-only view of the store at one point in time.
///
/// Collections are shared with the store until the next mutation, which
/// swaps in a fresh copy instead of writing through.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub items: Arc<Vec<ShoppingItem>>,
    pub categories: Arc<Vec<Category>>,
    pub filter: StatusFilter,
    pub search_term: String,
}

impl Snapshot {
    pub fn visible_items(&self) -> Vec<ShoppingItem> {
        filtered_view(&self.items, &self.search_term, self.filter)
    }

    pub fn list_view(&self) -> ListView {
        ListView::build(&self.items, &self.search_term, self.filter)
    }

    pub fn analytics(&self, today: NaiveDate) -> Analytics {
        Analytics::build(&self.items, &self.categories, today)
    }

    pub fn item(&self, id: Uuid) -> Option<&ShoppingItem> {
        self.items.iter().find(|i| i.id == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&Snapshot)>;

/// Owner of the shopping list. All changes go through its methods, and
/// subscribers are called synchronously after each one that changed state.
pub struct ShoppingStore {
    items: Arc<Vec<ShoppingItem>>,
    categories: Arc<Vec<Category>>,
    filter: StatusFilter,
    search_term: String,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl Default for ShoppingStore {
    fn default() -> Self {
        Self::new(default_categories())
    }
}

impl ShoppingStore {
    /// Start an empty list with the given categories. Seeds with an empty
    /// name, or a name already seeded, are skipped.
    pub fn new(seeds: Vec<CategorySeed>) -> Self {
        let mut categories: Vec<Category> = Vec::with_capacity(seeds.len());
        for seed in seeds {
            let name = seed.name.trim();
            if name.is_empty() {
                log::warn!("Skipping seeded category with empty name");
                continue;
            }
            if categories.iter().any(|c| c.name == name) {
                log::warn!("Skipping duplicate seeded category {}", name);
                continue;
            }
            categories.push(Category::new(name, seed.color));
        }
        Self {
            items: Arc::new(Vec::new()),
            categories: Arc::new(categories),
            filter: StatusFilter::All,
            search_term: String::new(),
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn from_config(config: &ShopConfig) -> Self {
        let mut store = Self::new(config.categories.clone());
        store.filter = config.default_filter;
        store
    }

    pub fn items(&self) -> &[ShoppingItem] {
        &self.items
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn filter(&self) -> StatusFilter {
        self.filter
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            items: Arc::clone(&self.items),
            categories: Arc::clone(&self.categories),
            filter: self.filter,
            search_term: self.search_term.clone(),
        }
    }

    pub fn subscribe(&mut self, subscriber: impl FnMut(&Snapshot) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Returns false if the subscription was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    fn notify(&mut self) {
        if self.subscribers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for (_, subscriber) in &mut self.subscribers {
            subscriber(&snapshot);
        }
    }

    fn position(&self, id: Uuid) -> Result<usize, StoreError> {
        self.items.iter().position(|i| i.id == id).ok_or_else(|| {
            log::warn!("No shopping item with id {}", id);
            StoreError::ItemNotFound(id)
        })
    }

    /// Run `f` on the item at `idx`, copying the list first if a snapshot still shares it.
    fn modify_item<R>(&mut self, idx: usize, f: impl FnOnce(&mut ShoppingItem) -> R) -> R {
        let items = Arc::make_mut(&mut self.items);
        let result = f(&mut items[idx]);
        self.notify();
        result
    }

    pub fn add_item(
        &mut self,
        name: &str,
        quantity: Option<u32>,
        category: &str,
    ) -> Result<Uuid, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            log::warn!("Rejected shopping item with empty name");
            return Err(StoreError::EmptyName);
        }
        let item = ShoppingItem::new(name, quantity.unwrap_or(1), category);
        let id = item.id;
        log::debug!("Adding {} x{} to {}", item.name, item.quantity, item.category);
        Arc::make_mut(&mut self.items).push(item);
        self.notify();
        Ok(id)
    }

    /// Flip the completed flag. Returns the new value.
    pub fn toggle_item(&mut self, id: Uuid) -> Result<bool, StoreError> {
        let idx = self.position(id)?;
        let completed = self.modify_item(idx, |item| {
            item.completed = !item.completed;
            item.completed
        });
        log::debug!("Toggled {} -> completed={}", id, completed);
        Ok(completed)
    }

    pub fn delete_item(&mut self, id: Uuid) -> Result<ShoppingItem, StoreError> {
        let idx = self.position(id)?;
        let removed = Arc::make_mut(&mut self.items).remove(idx);
        log::debug!("Deleted {} ({})", removed.name, id);
        self.notify();
        Ok(removed)
    }

    pub fn update_item(&mut self, id: Uuid, mut update: ItemUpdate) -> Result<(), StoreError> {
        let idx = self.position(id)?;
        if let Some(name) = update.name.as_mut() {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                log::warn!("Rejected rename of {} to an empty name", id);
                return Err(StoreError::EmptyName);
            }
            *name = trimmed.to_string();
        }
        if update.is_empty() {
            return Ok(());
        }
        self.modify_item(idx, |item| item.apply(update));
        log::debug!("Updated {}", id);
        Ok(())
    }

    pub fn increment_quantity(&mut self, id: Uuid) -> Result<u32, StoreError> {
        self.step_quantity(id, 1)
    }

    /// Lower the quantity by one, stopping at 1.
    pub fn decrement_quantity(&mut self, id: Uuid) -> Result<u32, StoreError> {
        self.step_quantity(id, -1)
    }

    fn step_quantity(&mut self, id: Uuid, delta: i64) -> Result<u32, StoreError> {
        let idx = self.position(id)?;
        let current = self.items[idx].quantity;
        let stepped = (i64::from(current) + delta).clamp(0, i64::from(u32::MAX));
        let next = clamp_quantity(stepped as u32);
        if next == current {
            return Ok(current);
        }
        self.modify_item(idx, |item| item.quantity = next);
        log::debug!("Quantity of {} {} -> {}", id, current, next);
        Ok(next)
    }

    /// Remove every completed item. Returns how many were removed.
    pub fn clear_completed(&mut self) -> usize {
        let removed = self.items.iter().filter(|i| i.completed).count();
        if removed == 0 {
            return 0;
        }
        Arc::make_mut(&mut self.items).retain(|i| !i.completed);
        log::debug!("Cleared {} completed items", removed);
        self.notify();
        removed
    }

    pub fn add_category(&mut self, name: &str, color: &str) -> Result<Uuid, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyName);
        }
        if self.categories.iter().any(|c| c.name == name) {
            log::warn!("Category {} already exists", name);
            return Err(StoreError::DuplicateCategory(name.to_string()));
        }
        let category = Category::new(name, color);
        let id = category.id;
        log::debug!("Adding category {}", name);
        Arc::make_mut(&mut self.categories).push(category);
        self.notify();
        Ok(id)
    }

    pub fn set_filter(&mut self, filter: StatusFilter) {
        if self.filter != filter {
            self.filter = filter;
            self.notify();
        }
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        let term = term.into();
        if self.search_term != term {
            self.search_term = term;
            self.notify();
        }
    }

    pub fn apply(&mut self, action: Action) -> Result<ActionOutcome, StoreError> {
        match action {
            Action::AddItem {
                name,
                quantity,
                category,
            } => self
                .add_item(&name, quantity, &category)
                .map(ActionOutcome::ItemAdded),
            Action::ToggleItem(id) => self
                .toggle_item(id)
                .map(|completed| ActionOutcome::ItemToggled { id, completed }),
            Action::DeleteItem(id) => self
                .delete_item(id)
                .map(|item| ActionOutcome::ItemDeleted(item.id)),
            Action::UpdateItem(id, update) => self
                .update_item(id, update)
                .map(|()| ActionOutcome::ItemUpdated(id)),
            Action::IncrementQuantity(id) => self
                .increment_quantity(id)
                .map(|quantity| ActionOutcome::QuantityChanged { id, quantity }),
            Action::DecrementQuantity(id) => self
                .decrement_quantity(id)
                .map(|quantity| ActionOutcome::QuantityChanged { id, quantity }),
            Action::ClearCompleted => Ok(ActionOutcome::Cleared(self.clear_completed())),
            Action::AddCategory { name, color } => self
                .add_category(&name, &color)
                .map(ActionOutcome::CategoryAdded),
            Action::SetFilter(filter) => {
                self.set_filter(filter);
                Ok(ActionOutcome::ViewChanged)
            }
            Action::SetSearchTerm(term) => {
                self.set_search_term(term);
                Ok(ActionOutcome::ViewChanged)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::rc::Rc;

    use super::*;

    fn today() -> NaiveDate {
        chrono::Local::now().date_naive()
    }

    fn names(items: &[ShoppingItem]) -> Vec<&str> {
        items.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn ids_are_distinct() {
        let mut store = ShoppingStore::default();
        let ids: HashSet<Uuid> = (0..500)
            .map(|n| store.add_item(&format!("item {n}"), None, "Outros").unwrap())
            .collect();
        assert_eq!(ids.len(), 500);
    }

    #[test]
    fn add_trims_and_defaults() {
        let mut store = ShoppingStore::default();
        let id = store.add_item("  Milk  ", None, "Laticínios").unwrap();
        let item = &store.items()[0];
        assert_eq!(item.id, id);
        assert_eq!(item.name, "Milk");
        assert_eq!(item.quantity, 1);
        assert!(!item.completed);

        store.add_item("Water", Some(0), "Bebidas").unwrap();
        assert_eq!(store.items()[1].quantity, 1);
    }

    #[test]
    fn add_rejects_blank_name() {
        let mut store = ShoppingStore::default();
        assert_eq!(store.add_item("   ", Some(2), "Outros"), Err(StoreError::EmptyName));
        assert!(store.items().is_empty());
    }

    #[test]
    fn toggle_twice_restores() {
        let mut store = ShoppingStore::default();
        let id = store.add_item("Milk", None, "Dairy").unwrap();
        assert_eq!(store.toggle_item(id), Ok(true));
        assert_eq!(store.toggle_item(id), Ok(false));
        assert!(!store.items()[0].completed);
    }

    #[test]
    fn missing_id_is_reported_and_changes_nothing() {
        let mut store = ShoppingStore::default();
        store.add_item("Milk", None, "Dairy").unwrap();
        let before = store.items().to_vec();
        let ghost = Uuid::new_v4();
        assert_eq!(store.toggle_item(ghost), Err(StoreError::ItemNotFound(ghost)));
        assert_eq!(store.delete_item(ghost), Err(StoreError::ItemNotFound(ghost)));
        assert_eq!(
            store.update_item(ghost, ItemUpdate::quantity(3)),
            Err(StoreError::ItemNotFound(ghost))
        );
        assert_eq!(store.items(), before.as_slice());
    }

    #[test]
    fn delete_removes_only_target() {
        let mut store = ShoppingStore::default();
        store.add_item("Milk", None, "Dairy").unwrap();
        let bread = store.add_item("Bread", None, "Bakery").unwrap();
        store.add_item("Eggs", None, "Dairy").unwrap();
        let removed = store.delete_item(bread).unwrap();
        assert_eq!(removed.name, "Bread");
        assert_eq!(names(store.items()), vec!["Milk", "Eggs"]);
    }

    #[test]
    fn update_clamps_quantity() {
        let mut store = ShoppingStore::default();
        let id = store.add_item("Eggs", Some(12), "Dairy").unwrap();
        store.update_item(id, ItemUpdate::quantity(0)).unwrap();
        assert_eq!(store.items()[0].quantity, 1);
        store.update_item(id, ItemUpdate::quantity(6)).unwrap();
        assert_eq!(store.items()[0].quantity, 6);
    }

    #[test]
    fn update_rejects_blank_rename() {
        let mut store = ShoppingStore::default();
        let id = store.add_item("Eggs", Some(2), "Dairy").unwrap();
        let update = ItemUpdate {
            name: Some("  ".into()),
            quantity: Some(5),
            ..ItemUpdate::default()
        };
        assert_eq!(store.update_item(id, update), Err(StoreError::EmptyName));
        assert_eq!(store.items()[0].quantity, 2);
        assert_eq!(store.items()[0].name, "Eggs");
    }

    #[test]
    fn decrement_stops_at_one() {
        let mut store = ShoppingStore::default();
        let id = store.add_item("Lemons", Some(2), "Frutas").unwrap();
        assert_eq!(store.decrement_quantity(id), Ok(1));
        assert_eq!(store.decrement_quantity(id), Ok(1));
        assert_eq!(store.increment_quantity(id), Ok(2));
    }

    #[test]
    fn clear_completed_is_idempotent() {
        let mut store = ShoppingStore::default();
        let a = store.add_item("A", None, "Outros").unwrap();
        store.add_item("B", None, "Outros").unwrap();
        let c = store.add_item("C", None, "Outros").unwrap();
        store.add_item("D", None, "Outros").unwrap();
        store.toggle_item(a).unwrap();
        store.toggle_item(c).unwrap();

        assert_eq!(store.clear_completed(), 2);
        let once = store.items().to_vec();
        assert_eq!(store.clear_completed(), 0);
        assert_eq!(store.items(), once.as_slice());
        assert_eq!(names(store.items()), vec!["B", "D"]);
    }

    #[test]
    fn milk_and_bread_scenario() {
        let mut store = ShoppingStore::default();
        let milk = store.add_item("Milk", Some(1), "Dairy").unwrap();
        store.add_item("Bread", Some(2), "Bakery").unwrap();
        store.toggle_item(milk).unwrap();

        let items = store.items();
        assert_eq!(names(&filtered_view(items, "", StatusFilter::Completed)), vec!["Milk"]);
        assert_eq!(names(&filtered_view(items, "", StatusFilter::Pending)), vec!["Bread"]);

        let stats = store.snapshot().analytics(today());
        assert_eq!(stats.total_items, 2);
        assert_eq!(stats.completed_items, 1);
        assert_eq!(stats.completion_rate, 50);
    }

    #[test]
    fn new_category_shows_in_analytics() {
        let mut store = ShoppingStore::default();
        store.add_category("Snacks", "bg-orange-500").unwrap();
        store.add_item("Chips", None, "Snacks").unwrap();
        let stats = store.snapshot().analytics(today());
        let snacks = stats
            .category_stats
            .iter()
            .find(|c| c.name == "Snacks")
            .unwrap();
        assert_eq!(snacks.total, 1);
    }

    #[test]
    fn duplicate_category_rejected() {
        let mut store = ShoppingStore::default();
        let before = store.categories().len();
        assert_eq!(
            store.add_category(" Frutas ", "bg-lime-500"),
            Err(StoreError::DuplicateCategory("Frutas".into()))
        );
        assert_eq!(store.add_category("", "bg-lime-500"), Err(StoreError::EmptyName));
        assert_eq!(store.categories().len(), before);
    }

    #[test]
    fn seeded_categories_are_deduplicated() {
        let mut store = ShoppingStore::new(vec![
            CategorySeed::new("Frutas", "bg-green-500"),
            CategorySeed::new("  ", "bg-gray-500"),
            CategorySeed::new(" Frutas ", "bg-lime-500"),
            CategorySeed::new("Padaria", "bg-yellow-500"),
        ]);
        let names: Vec<&str> = store.categories().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Frutas", "Padaria"]);
        assert_eq!(store.categories()[0].color, "bg-green-500");

        store.add_item("Apple", None, "Frutas").unwrap();
        let stats = store.snapshot().analytics(today());
        assert_eq!(stats.category_stats.len(), 1);
        assert_eq!(stats.category_stats[0].total, 1);
    }

    #[test]
    fn snapshot_unaffected_by_later_mutation() {
        let mut store = ShoppingStore::default();
        let id = store.add_item("Milk", None, "Dairy").unwrap();
        let snap = store.snapshot();
        store.toggle_item(id).unwrap();
        store.add_item("Bread", None, "Bakery").unwrap();
        assert_eq!(snap.items.len(), 1);
        assert!(!snap.items[0].completed);
        assert_eq!(store.items().len(), 2);
        assert!(store.items()[0].completed);
    }

    #[test]
    fn subscribers_see_each_successful_change() {
        let mut store = ShoppingStore::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let sub = store.subscribe(move |snap| sink.borrow_mut().push(snap.items.len()));

        let id = store.add_item("Milk", None, "Dairy").unwrap();
        store.add_item("", None, "Dairy").unwrap_err();
        store.toggle_item(Uuid::new_v4()).unwrap_err();
        store.toggle_item(id).unwrap();
        store.clear_completed();
        store.clear_completed();
        assert_eq!(*seen.borrow(), vec![1, 1, 0]);

        assert!(store.unsubscribe(sub));
        assert!(!store.unsubscribe(sub));
        store.add_item("Bread", None, "Bakery").unwrap();
        assert_eq!(seen.borrow().len(), 3);
    }

    #[test]
    fn subscribers_called_in_order() {
        let mut store = ShoppingStore::default();
        let calls = Rc::new(RefCell::new(Vec::new()));
        for tag in ["first", "second", "third"] {
            let sink = Rc::clone(&calls);
            store.subscribe(move |_| sink.borrow_mut().push(tag));
        }
        store.add_item("Milk", None, "Dairy").unwrap();
        store.set_filter(StatusFilter::Pending);
        assert_eq!(
            *calls.borrow(),
            vec!["first", "second", "third", "first", "second", "third"]
        );
    }

    #[test]
    fn unchanged_state_does_not_notify() {
        let mut store = ShoppingStore::default();
        let id = store.add_item("Milk", Some(1), "Dairy").unwrap();
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        store.subscribe(move |_| *sink.borrow_mut() += 1);

        store.set_filter(StatusFilter::All);
        store.set_search_term("");
        store.update_item(id, ItemUpdate::default()).unwrap();
        store.decrement_quantity(id).unwrap();
        assert_eq!(*count.borrow(), 0);

        store.set_search_term("mi");
        store.set_search_term("mi");
        store.set_filter(StatusFilter::Pending);
        store.set_filter(StatusFilter::Pending);
        store.apply(Action::SetFilter(StatusFilter::Pending)).unwrap();
        assert_eq!(*count.borrow(), 2);
    }

    #[test]
    fn view_selection_drives_visible_items() {
        let mut store = ShoppingStore::default();
        store.add_item("Apple", None, "Frutas").unwrap();
        let banana = store.add_item("Banana", None, "Frutas").unwrap();
        store.apply(Action::SetSearchTerm("le".into())).unwrap();
        assert_eq!(names(&store.snapshot().visible_items()), vec!["Apple"]);

        store.apply(Action::SetSearchTerm(String::new())).unwrap();
        store.apply(Action::ToggleItem(banana)).unwrap();
        store.apply(Action::SetFilter(StatusFilter::Completed)).unwrap();
        let view = store.snapshot().list_view();
        assert_eq!(names(&view.items), vec!["Banana"]);
        assert_eq!((view.total, view.completed), (2, 1));
    }

    #[test]
    fn apply_reports_outcomes() {
        let mut store = ShoppingStore::default();
        let ActionOutcome::ItemAdded(id) = store
            .apply(Action::AddItem {
                name: "Rice".into(),
                quantity: Some(3),
                category: "Outros".into(),
            })
            .unwrap()
        else {
            panic!("expected ItemAdded");
        };
        assert_eq!(
            store.apply(Action::DecrementQuantity(id)),
            Ok(ActionOutcome::QuantityChanged { id, quantity: 2 })
        );
        assert_eq!(
            store.apply(Action::ToggleItem(id)),
            Ok(ActionOutcome::ItemToggled { id, completed: true })
        );
        assert_eq!(store.apply(Action::ClearCompleted), Ok(ActionOutcome::Cleared(1)));
        assert_eq!(
            store.apply(Action::DeleteItem(id)),
            Err(StoreError::ItemNotFound(id))
        );
    }

    #[test]
    fn from_config_uses_seed_and_filter() {
        let config = ShopConfig {
            categories: vec![CategorySeed::new("Snacks", "bg-orange-500")],
            default_filter: StatusFilter::Pending,
            ..ShopConfig::default()
        };
        let store = ShoppingStore::from_config(&config);
        assert_eq!(store.categories().len(), 1);
        assert_eq!(store.categories()[0].name, "Snacks");
        assert_eq!(store.filter(), StatusFilter::Pending);
    }
}
