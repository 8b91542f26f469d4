use serde::{Deserialize, Serialize};

use super::item::ShoppingItem;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Completed,
}

impl StatusFilter {
    pub fn as_keyword(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }

    /// Unrecognized keywords mean no status filtering.
    pub fn from_keyword(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Self::Pending,
            "completed" => Self::Completed,
            _ => Self::All,
        }
    }

    pub fn keeps(&self, item: &ShoppingItem) -> bool {
        match self {
            Self::All => true,
            Self::Pending => !item.completed,
            Self::Completed => item.completed,
        }
    }
}
