pub mod analytics;
pub mod category;
pub mod filter;
pub mod item;
pub mod view;
