use std::io::{BufRead, Write};

mod session;

use cesta::config::ShopConfig;

use session::{Reply, Session, parse_command};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set up logging to the systemd user journal (`journalctl --user -t cesta -f`).
    // Wrapper filters: cesta crate at info/debug (per config), everything else at warn.
    {
        struct FilteredJournal {
            inner: systemd_journal_logger::JournalLog,
        }

        impl log::Log for FilteredJournal {
            fn enabled(&self, metadata: &log::Metadata) -> bool {
                if metadata.target().starts_with("cesta") {
                    let max = if cesta::debug_logging() {
                        log::LevelFilter::Debug
                    } else {
                        log::LevelFilter::Info
                    };
                    metadata.level() <= max
                } else {
                    metadata.level() <= log::LevelFilter::Warn
                }
            }
            fn log(&self, record: &log::Record) {
                if self.enabled(record.metadata()) {
                    self.inner.log(record);
                }
            }
            fn flush(&self) {
                self.inner.flush();
            }
        }

        match systemd_journal_logger::JournalLog::new() {
            Ok(journal) => {
                let journal = journal.with_syslog_identifier("cesta".to_string());
                log::set_boxed_logger(Box::new(FilteredJournal { inner: journal }))?;
                // Global max must be Debug so cesta debug logs can pass through when toggled
                log::set_max_level(log::LevelFilter::Debug);
            }
            Err(e) => eprintln!("journal logging unavailable: {}", e),
        }
    }

    // After the logger is installed, so a bad config file is reported.
    let config = ShopConfig::load();
    let debug_flag = std::env::args().any(|a| a == "--debug");
    cesta::set_debug_logging(config.debug_logging || debug_flag);

    log::info!("Starting with {} categories", config.categories.len());

    let mut session = Session::new(&config);
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    println!("{}", session.render_list());
    for line in stdin.lock().lines() {
        let line = line?;
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("{}", e);
                continue;
            }
        };
        match session.execute(command) {
            Ok(Reply::Continue(out)) => {
                if !out.is_empty() {
                    writeln!(stdout, "{}", out)?;
                }
            }
            Ok(Reply::Quit) => break,
            Err(e) => {
                log::warn!("Command failed: {}", e);
                eprintln!("{}", e);
            }
        }
    }

    log::info!("Session ended with {} items", session.store().items().len());
    Ok(())
}
