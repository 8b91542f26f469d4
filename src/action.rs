use uuid::Uuid;

use crate::core::filter::StatusFilter;
use crate::core::item::ItemUpdate;

/// Every change the front-end can ask the store to make.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // Items
    AddItem {
        name: String,
        quantity: Option<u32>,
        category: String,
    },
    ToggleItem(Uuid),
    DeleteItem(Uuid),
    UpdateItem(Uuid, ItemUpdate),
    IncrementQuantity(Uuid),
    DecrementQuantity(Uuid),
    ClearCompleted,

    // Categories
    AddCategory { name: String, color: String },

    // View selection
    SetFilter(StatusFilter),
    SetSearchTerm(String),
}

/// What an applied action produced, for front-ends that want to echo it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    ItemAdded(Uuid),
    ItemToggled { id: Uuid, completed: bool },
    ItemDeleted(Uuid),
    ItemUpdated(Uuid),
    QuantityChanged { id: Uuid, quantity: u32 },
    Cleared(usize),
    CategoryAdded(Uuid),
    ViewChanged,
}
