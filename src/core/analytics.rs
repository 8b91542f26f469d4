use chrono::{Datelike, Duration, NaiveDate, Weekday};

use super::category::Category;
use super::item::ShoppingItem;

/// Days covered by the activity histogram, including today.
pub const ACTIVITY_DAYS: i64 = 7;
/// How many names the frequency ranking keeps.
pub const TOP_ITEMS: usize = 5;

/// Percentage of `part` in `whole`, rounded half up. Zero when `whole` is zero.
pub fn rate(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((part * 200 + whole) / (whole * 2)) as u32
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryStats {
    pub name: String,
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub rate: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayStats {
    pub date: NaiveDate,
    pub items: usize,
    pub completed: usize,
}

impl DayStats {
    /// Short pt-BR weekday name for chart axes ("seg.", "ter.", ...).
    pub fn label(&self) -> &'static str {
        match self.date.weekday() {
            Weekday::Mon => "seg.",
            Weekday::Tue => "ter.",
            Weekday::Wed => "qua.",
            Weekday::Thu => "qui.",
            Weekday::Fri => "sex.",
            Weekday::Sat => "sáb.",
            Weekday::Sun => "dom.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFrequency {
    pub name: String,
    pub count: usize,
}

/// Summary numbers for the analytics dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analytics {
    pub total_items: usize,
    pub completed_items: usize,
    pub completion_rate: u32,
    pub category_stats: Vec<CategoryStats>,
    /// Oldest day first, ending with today.
    pub temporal_stats: Vec<DayStats>,
    pub top_items: Vec<ItemFrequency>,
}

impl Analytics {
    pub fn build(items: &[ShoppingItem], categories: &[Category], today: NaiveDate) -> Self {
        let total_items = items.len();
        let completed_items = items.iter().filter(|i| i.completed).count();

        Self {
            total_items,
            completed_items,
            completion_rate: rate(completed_items, total_items),
            category_stats: category_stats(items, categories),
            temporal_stats: temporal_stats(items, today),
            top_items: top_items(items),
        }
    }

    pub fn active_categories(&self) -> usize {
        self.category_stats.len()
    }
}

fn category_stats(items: &[ShoppingItem], categories: &[Category]) -> Vec<CategoryStats> {
    categories
        .iter()
        .filter_map(|category| {
            let (total, completed) = items
                .iter()
                .filter(|i| i.category == category.name)
                .fold((0, 0), |(t, c), i| (t + 1, c + usize::from(i.completed)));
            if total == 0 {
                return None;
            }
            Some(CategoryStats {
                name: category.name.clone(),
                total,
                completed,
                pending: total - completed,
                rate: rate(completed, total),
            })
        })
        .collect()
}

fn temporal_stats(items: &[ShoppingItem], today: NaiveDate) -> Vec<DayStats> {
    (0..ACTIVITY_DAYS)
        .rev()
        .map(|days_ago| {
            let date = today - Duration::days(days_ago);
            let (count, completed) = items
                .iter()
                .filter(|i| i.created.date() == date)
                .fold((0, 0), |(t, c), i| (t + 1, c + usize::from(i.completed)));
            DayStats {
                date,
                items: count,
                completed,
            }
        })
        .collect()
}

fn top_items(items: &[ShoppingItem]) -> Vec<ItemFrequency> {
    // Vec instead of a map keeps first-seen order for the tiebreak.
    let mut counts: Vec<ItemFrequency> = Vec::new();
    for item in items {
        match counts.iter_mut().find(|f| f.name == item.name) {
            Some(freq) => freq.count += 1,
            None => counts.push(ItemFrequency {
                name: item.name.clone(),
                count: 1,
            }),
        }
    }
    // Stable sort, so equal counts stay in first-seen order.
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(TOP_ITEMS);
    counts
}
