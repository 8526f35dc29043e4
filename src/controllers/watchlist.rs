// src/controllers/watchlist.rs
use super::Shared;
use crate::error::{ActionError, ValidationError};
use crate::lock;
use crate::screen::{Tone, WatchlistRow};
use crate::store::StorageKey;
use log::{error, info};
use std::sync::Mutex;

/// Ordered, duplicate-free symbols mirrored to the `watchlist` key.
pub struct WatchlistController {
    shared: Shared,
    symbols: Mutex<Vec<String>>,
}

impl WatchlistController {
    pub fn new(shared: Shared) -> Self {
        Self {
            shared,
            symbols: Mutex::new(Vec::new()),
        }
    }

    /// Restores the persisted list. An unreadable entry starts an empty list.
    pub fn load(&self) {
        let stored: Vec<String> = match self.shared.store().load(StorageKey::Watchlist) {
            Ok(list) => list.unwrap_or_default(),
            Err(e) => {
                error!("Ignoring unreadable watchlist: {}", e);
                Vec::new()
            }
        };
        let mut symbols = lock(&self.symbols);
        *symbols = Vec::new();
        for symbol in stored {
            if !symbols.contains(&symbol) {
                symbols.push(symbol);
            }
        }
        info!("Watchlist loaded with {} symbols", symbols.len());
        self.render(&symbols);
    }

    pub fn list(&self) -> Vec<String> {
        lock(&self.symbols).clone()
    }

    /// Appends `symbol` unless present. Returns whether it was added; a
    /// duplicate only raises an informational toast.
    pub fn add(&self, symbol: &str) -> Result<bool, ActionError> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            self.shared
                .screen()
                .notify(Tone::Warning, "Please enter a stock symbol");
            return Err(ValidationError::EmptySymbol.into());
        }
        let mut symbols = lock(&self.symbols);
        if symbols.contains(&symbol) {
            self.shared
                .screen()
                .notify(Tone::Info, format!("{symbol} is already in your watchlist!"));
            return Ok(false);
        }
        symbols.push(symbol.clone());
        if let Err(e) = self.shared.store().save(StorageKey::Watchlist, symbols.as_slice()) {
            symbols.pop();
            return Err(self.failed(e.into()));
        }
        self.render(&symbols);
        self.shared
            .screen()
            .notify(Tone::Success, format!("{symbol} added to watchlist!"));
        Ok(true)
    }

    /// Removes `symbol`; absent symbols are a silent no-op.
    pub fn remove(&self, symbol: &str) -> Result<(), ActionError> {
        let symbol = symbol.trim().to_uppercase();
        let mut symbols = lock(&self.symbols);
        let Some(pos) = symbols.iter().position(|s| *s == symbol) else {
            return Ok(());
        };
        let removed = symbols.remove(pos);
        if let Err(e) = self.shared.store().save(StorageKey::Watchlist, symbols.as_slice()) {
            symbols.insert(pos, removed);
            return Err(self.failed(e.into()));
        }
        self.render(&symbols);
        self.shared
            .screen()
            .notify(Tone::Success, format!("{symbol} removed from watchlist!"));
        Ok(())
    }

    fn failed(&self, e: ActionError) -> ActionError {
        error!("Watchlist not saved: {}", e);
        self.shared
            .screen()
            .notify(Tone::Danger, "Could not save your watchlist. Please try again.");
        e
    }

    fn render(&self, symbols: &[String]) {
        self.shared.screen().watchlist_rows = symbols
            .iter()
            .map(|s| WatchlistRow {
                symbol: s.clone(),
                name: format!("{s} Stock"),
            })
            .collect();
    }
}
