// src/controllers/mod.rs
//! One controller per dashboard section. Every controller finishes each
//! request with a render, falling back to cached or sample data on failure.

pub mod alerts;
pub mod crypto;
pub mod forex;
pub mod news;
pub mod portfolio;
pub mod settings;
pub mod stocks;
pub mod watchlist;

use crate::chart::ChartRenderer;
use crate::lock;
use crate::screen::Screen;
use crate::store::Persistence;
use std::sync::{Arc, Mutex, MutexGuard};

pub use alerts::AlertsController;
pub use crypto::CryptoController;
pub use forex::ForexController;
pub use news::NewsController;
pub use portfolio::PortfolioController;
pub use settings::SettingsController;
pub use stocks::StocksController;
pub use watchlist::WatchlistController;

/// Screen, chart slots and storage shared by all controllers.
///
/// Charts are locked before the screen when both are needed. No guard is
/// held across an `.await`.
#[derive(Clone)]
pub struct Shared {
    screen: Arc<Mutex<Screen>>,
    charts: Arc<Mutex<ChartRenderer>>,
    store: Persistence,
}

impl Shared {
    pub fn new(store: Persistence) -> Self {
        Self::with_charts(store, ChartRenderer::default())
    }

    pub fn with_charts(store: Persistence, charts: ChartRenderer) -> Self {
        Self {
            screen: Arc::new(Mutex::new(Screen::new())),
            charts: Arc::new(Mutex::new(charts)),
            store,
        }
    }

    pub fn screen(&self) -> MutexGuard<'_, Screen> {
        lock(&self.screen)
    }

    pub fn charts(&self) -> MutexGuard<'_, ChartRenderer> {
        lock(&self.charts)
    }

    pub fn store(&self) -> &Persistence {
        &self.store
    }
}

/// Sample values `base + rand * spread`, labelled `T-n` .. `T-1`.
pub(crate) fn synthetic_series(points: usize, base: f64, spread: f64) -> crate::chart::ChartSeries {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    crate::chart::ChartSeries::from_points(
        (0..points).map(|i| (format!("T-{}", points - i), base + rng.gen::<f64>() * spread)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_series_shape() {
        let s = synthetic_series(20, 150.0, 10.0);
        assert_eq!(s.len(), 20);
        assert_eq!(s.labels().first().map(String::as_str), Some("T-20"));
        assert_eq!(s.labels().last().map(String::as_str), Some("T-1"));
        assert!(s.values().iter().all(|v| (150.0..160.0).contains(v)));
    }
}
