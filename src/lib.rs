// src/lib.rs
//! Market dashboard: stock, crypto, forex, news, portfolio, watchlist and
//! alert sections fed by public market data APIs, plus a small quote proxy.

pub mod bootstrap;
pub mod chart;
pub mod clients;
pub mod config;
pub mod controllers;
pub mod dashboard;
pub mod error;
pub mod models;
pub mod proxy;
pub mod screen;
pub mod store;
pub mod view;

#[cfg(test)]
mod testing;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use dashboard::Dashboard;

/// Locks `m`, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
