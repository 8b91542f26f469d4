use chrono::NaiveDateTime;
use uuid::Uuid;

/// Smallest quantity an item can hold.
pub const MIN_QUANTITY: u32 = 1;

pub fn clamp_quantity(quantity: u32) -> u32 {
    quantity.max(MIN_QUANTITY)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingItem {
    pub id: Uuid,
    pub name: String,
    pub quantity: u32,
    /// Name of the category this item is filed under. Not checked against
    /// the category list.
    pub category: String,
    pub completed: bool,
    pub created: NaiveDateTime,
    pub emoji: Option<String>,
    pub favorited: bool,
}

impl ShoppingItem {
    pub fn new(name: impl Into<String>, quantity: u32, category: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            quantity: clamp_quantity(quantity),
            category: category.into(),
            completed: false,
            created: chrono::Local::now().naive_local(),
            emoji: None,
            favorited: false,
        }
    }

    pub fn matches_search(&self, needle_lower: &str) -> bool {
        needle_lower.is_empty() || self.name.to_lowercase().contains(needle_lower)
    }

    /// Merge a partial update into this item. `id` and `created` are never touched.
    pub fn apply(&mut self, update: ItemUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(quantity) = update.quantity {
            self.quantity = clamp_quantity(quantity);
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(completed) = update.completed {
            self.completed = completed;
        }
        if let Some(emoji) = update.emoji {
            self.emoji = emoji;
        }
        if let Some(favorited) = update.favorited {
            self.favorited = favorited;
        }
    }
}

/// Fields to change on an existing item. `None` leaves the field as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemUpdate {
    pub name: Option<String>,
    pub quantity: Option<u32>,
    pub category: Option<String>,
    pub completed: Option<bool>,
    /// `Some(None)` clears the emoji.
    pub emoji: Option<Option<String>>,
    pub favorited: Option<bool>,
}

impl ItemUpdate {
    pub fn quantity(quantity: u32) -> Self {
        Self {
            quantity: Some(quantity),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
