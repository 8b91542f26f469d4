use std::cell::Cell;
use std::fmt::Write as _;
use std::rc::Rc;

use cesta::action::{Action, ActionOutcome};
use cesta::config::ShopConfig;
use cesta::core::analytics::Analytics;
use cesta::core::filter::StatusFilter;
use cesta::core::item::ItemUpdate;
use cesta::error::StoreError;
use cesta::store::ShoppingStore;
use thiserror::Error;
use uuid::Uuid;

pub const HELP: &str = "\
commands:
  add <name> [xN] [@category]   add an item
  toggle <n>                    mark row n done / not done
  delete <n>                    remove row n
  qty <n> <q>                   set quantity of row n
  inc <n> | dec <n>             change quantity of row n by one
  fav <n>                       star / unstar row n
  clear                         remove completed items
  filter <all|pending|completed>
  search [term]                 empty term clears the search
  category <name> [#color]      add a category
  list | stats | debug | help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add {
        name: String,
        quantity: Option<u32>,
        category: Option<String>,
    },
    Toggle(usize),
    Delete(usize),
    Quantity(usize, u32),
    Increment(usize),
    Decrement(usize),
    Favorite(usize),
    Clear,
    Filter(StatusFilter),
    Search(String),
    Category { name: String, color: Option<String> },
    List,
    Stats,
    Debug,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command {0:?} (try `help`)")]
    Unknown(String),
    #[error("missing {0}")]
    MissingArgument(&'static str),
    #[error("not a number: {0:?}")]
    BadNumber(String),
    #[error("no row {0} in the current list")]
    NoSuchRow(usize),
    #[error(transparent)]
    Store(#[from] StoreError),
}

fn parse_number<T: std::str::FromStr>(
    raw: Option<&str>,
    what: &'static str,
) -> Result<T, CommandError> {
    let raw = raw.ok_or(CommandError::MissingArgument(what))?;
    raw.parse().map_err(|_| CommandError::BadNumber(raw.to_string()))
}

/// Parse one input line. Blank lines give `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };
    let mut args = rest.split_whitespace();

    let command = match verb.to_ascii_lowercase().as_str() {
        "" => return Ok(None),
        "add" => parse_add(rest)?,
        "toggle" | "t" => Command::Toggle(parse_number(args.next(), "row")?),
        "delete" | "rm" => Command::Delete(parse_number(args.next(), "row")?),
        "qty" => {
            let row = parse_number(args.next(), "row")?;
            Command::Quantity(row, parse_number(args.next(), "quantity")?)
        }
        "inc" | "+" => Command::Increment(parse_number(args.next(), "row")?),
        "dec" | "-" => Command::Decrement(parse_number(args.next(), "row")?),
        "fav" => Command::Favorite(parse_number(args.next(), "row")?),
        "clear" => Command::Clear,
        "filter" => Command::Filter(StatusFilter::from_keyword(rest)),
        "search" => Command::Search(rest.to_string()),
        "category" => parse_category(rest)?,
        "list" | "ls" => Command::List,
        "stats" => Command::Stats,
        "debug" => Command::Debug,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

/// `add` takes free-form words; `xN` sets the quantity and `@name` the category.
fn parse_add(rest: &str) -> Result<Command, CommandError> {
    let mut words = Vec::new();
    let mut quantity = None;
    let mut category = None;

    for word in rest.split_whitespace() {
        if let Some(cat) = word.strip_prefix('@').filter(|c| !c.is_empty()) {
            category = Some(cat.to_string());
        } else if let Some(n) = word
            .strip_prefix('x')
            .filter(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
        {
            quantity = Some(parse_number(Some(n), "quantity")?);
        } else {
            words.push(word);
        }
    }

    if words.is_empty() {
        return Err(CommandError::MissingArgument("item name"));
    }
    Ok(Command::Add {
        name: words.join(" "),
        quantity,
        category,
    })
}

/// `category` joins its words into the name; a `#color` word sets the color.
fn parse_category(rest: &str) -> Result<Command, CommandError> {
    let mut words = Vec::new();
    let mut color = None;

    for word in rest.split_whitespace() {
        match word.strip_prefix('#').filter(|c| !c.is_empty()) {
            Some(c) => color = Some(c.to_string()),
            None => words.push(word),
        }
    }

    if words.is_empty() {
        return Err(CommandError::MissingArgument("category name"));
    }
    Ok(Command::Category {
        name: words.join(" "),
        color,
    })
}

pub enum Reply {
    Continue(String),
    Quit,
}

/// A terminal session over one store. The list is redrawn whenever the
/// store reports a change.
pub struct Session {
    store: ShoppingStore,
    default_category: String,
    dirty: Rc<Cell<bool>>,
}

impl Session {
    pub fn new(config: &ShopConfig) -> Self {
        let mut store = ShoppingStore::from_config(config);
        let dirty = Rc::new(Cell::new(false));
        let flag = Rc::clone(&dirty);
        store.subscribe(move |_| flag.set(true));
        Self {
            store,
            default_category: config.default_category.clone(),
            dirty,
        }
    }

    pub fn store(&self) -> &ShoppingStore {
        &self.store
    }

    fn row_id(&self, row: usize) -> Result<Uuid, CommandError> {
        let visible = self.store.snapshot().visible_items();
        row.checked_sub(1)
            .and_then(|idx| visible.get(idx))
            .map(|item| item.id)
            .ok_or(CommandError::NoSuchRow(row))
    }

    fn apply(&mut self, action: Action) -> Result<ActionOutcome, CommandError> {
        Ok(self.store.apply(action)?)
    }

    pub fn execute(&mut self, command: Command) -> Result<Reply, CommandError> {
        let mut notes = String::new();
        match command {
            Command::Add {
                name,
                quantity,
                category,
            } => {
                let category = category.unwrap_or_else(|| self.default_category.clone());
                if !self.store.categories().iter().any(|c| c.name == category) {
                    let _ = writeln!(notes, "note: {} is not a known category", category);
                }
                self.apply(Action::AddItem {
                    name,
                    quantity,
                    category,
                })?;
            }
            Command::Toggle(row) => {
                let id = self.row_id(row)?;
                self.apply(Action::ToggleItem(id))?;
            }
            Command::Delete(row) => {
                let id = self.row_id(row)?;
                self.apply(Action::DeleteItem(id))?;
            }
            Command::Quantity(row, quantity) => {
                let id = self.row_id(row)?;
                self.apply(Action::UpdateItem(id, ItemUpdate::quantity(quantity)))?;
            }
            Command::Increment(row) => {
                let id = self.row_id(row)?;
                self.apply(Action::IncrementQuantity(id))?;
            }
            Command::Decrement(row) => {
                let id = self.row_id(row)?;
                self.apply(Action::DecrementQuantity(id))?;
            }
            Command::Favorite(row) => {
                let id = self.row_id(row)?;
                let favorited = self
                    .store
                    .snapshot()
                    .item(id)
                    .is_some_and(|item| item.favorited);
                let update = ItemUpdate {
                    favorited: Some(!favorited),
                    ..ItemUpdate::default()
                };
                self.apply(Action::UpdateItem(id, update))?;
            }
            Command::Clear => {
                if let ActionOutcome::Cleared(n) = self.apply(Action::ClearCompleted)? {
                    let _ = writeln!(notes, "removed {} completed item(s)", n);
                }
            }
            Command::Filter(filter) => {
                self.apply(Action::SetFilter(filter))?;
            }
            Command::Search(term) => {
                self.apply(Action::SetSearchTerm(term))?;
            }
            Command::Category { name, color } => {
                let color = color.unwrap_or_else(|| "bg-gray-500".to_string());
                self.apply(Action::AddCategory { name, color })?;
                let _ = writeln!(notes, "{} categories", self.store.categories().len());
            }
            Command::List => return Ok(Reply::Continue(self.render_list())),
            Command::Stats => {
                let today = chrono::Local::now().date_naive();
                let stats = self.store.snapshot().analytics(today);
                return Ok(Reply::Continue(render_stats(&stats)));
            }
            Command::Debug => {
                let enabled = !cesta::debug_logging();
                cesta::set_debug_logging(enabled);
                let state = if enabled { "on" } else { "off" };
                log::info!("Debug logging {}", state);
                return Ok(Reply::Continue(format!("debug logging {}", state)));
            }
            Command::Help => return Ok(Reply::Continue(HELP.to_string())),
            Command::Quit => return Ok(Reply::Quit),
        }

        if self.dirty.replace(false) {
            notes.push_str(&self.render_list());
        }
        Ok(Reply::Continue(notes.trim_end().to_string()))
    }

    pub fn render_list(&self) -> String {
        let snapshot = self.store.snapshot();
        let view = snapshot.list_view();
        let mut out = String::new();

        let _ = write!(
            out,
            "{} of {} shown, {} completed [{}",
            view.visible(),
            view.total,
            view.completed,
            snapshot.filter.as_keyword()
        );
        if !snapshot.search_term.is_empty() {
            let _ = write!(out, ", search {:?}", snapshot.search_term);
        }
        out.push(']');

        if view.is_empty() {
            out.push_str("\n  (nothing here)");
        }
        for (idx, item) in view.items.iter().enumerate() {
            let check = if item.completed { "x" } else { " " };
            let _ = write!(out, "\n  {:>2}. [{}] ", idx + 1, check);
            if let Some(emoji) = &item.emoji {
                let _ = write!(out, "{} ", emoji);
            }
            let _ = write!(out, "{} x{} ({})", item.name, item.quantity, item.category);
            if item.favorited {
                out.push_str(" *");
            }
        }
        out
    }
}

pub fn render_stats(stats: &Analytics) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "items: {}  completed: {}  rate: {}%  active categories: {}",
        stats.total_items,
        stats.completed_items,
        stats.completion_rate,
        stats.active_categories()
    );

    if !stats.category_stats.is_empty() {
        out.push_str("by category:\n");
        for cat in &stats.category_stats {
            let _ = writeln!(
                out,
                "  {:<12} {:>3} total {:>3} done {:>3} pending {:>3}%",
                cat.name, cat.total, cat.completed, cat.pending, cat.rate
            );
        }
    }

    out.push_str("last 7 days:\n");
    for day in &stats.temporal_stats {
        let _ = writeln!(
            out,
            "  {} {} {:>3} added {:>3} done",
            day.label(),
            day.date.format("%m-%d"),
            day.items,
            day.completed
        );
    }

    if !stats.top_items.is_empty() {
        out.push_str("most added:\n");
        for (rank, freq) in stats.top_items.iter().enumerate() {
            let _ = writeln!(out, "  {}. {} ({})", rank + 1, freq.name, freq.count);
        }
    }
    out.trim_end().to_string()
}
