use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    /// Display hint for the front-end, e.g. `bg-green-500`.
    pub color: String,
}

impl Category {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            color: color.into(),
        }
    }
}

/// A category as written in the config file, before it gets an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySeed {
    pub name: String,
    pub color: String,
}

impl CategorySeed {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
        }
    }

    pub fn into_category(self) -> Category {
        Category::new(self.name, self.color)
    }
}

pub fn default_categories() -> Vec<CategorySeed> {
    vec![
        CategorySeed::new("Frutas", "bg-green-500"),
        CategorySeed::new("Vegetais", "bg-emerald-500"),
        CategorySeed::new("Laticínios", "bg-blue-500"),
        CategorySeed::new("Carnes", "bg-red-500"),
        CategorySeed::new("Padaria", "bg-yellow-500"),
        CategorySeed::new("Bebidas", "bg-cyan-500"),
        CategorySeed::new("Limpeza", "bg-purple-500"),
        CategorySeed::new("Outros", "bg-gray-500"),
    ]
}
