// src/controllers/portfolio.rs
use super::Shared;
use crate::lock;
use crate::models::{PortfolioHolding, PortfolioSummary};
use crate::screen::{PortfolioRow, Tone};
use log::info;
use std::sync::Mutex;

/// Holdings shown until real positions can be entered.
pub fn sample_holdings() -> Vec<PortfolioHolding> {
    vec![
        PortfolioHolding::new("AAPL", "Apple Inc.", 10, 150.00, 175.50),
        PortfolioHolding::new("GOOGL", "Alphabet Inc.", 5, 2800.00, 2950.00),
        PortfolioHolding::new("TSLA", "Tesla Inc.", 8, 200.00, 250.00),
        PortfolioHolding::new("MSFT", "Microsoft Corp.", 12, 300.00, 320.00),
    ]
}

/// In-memory only; holdings have no storage key.
pub struct PortfolioController {
    shared: Shared,
    holdings: Mutex<Vec<PortfolioHolding>>,
}

impl PortfolioController {
    pub fn new(shared: Shared) -> Self {
        Self::with_holdings(shared, sample_holdings())
    }

    pub fn with_holdings(shared: Shared, holdings: Vec<PortfolioHolding>) -> Self {
        Self {
            shared,
            holdings: Mutex::new(holdings),
        }
    }

    pub fn load(&self) {
        let holdings = lock(&self.holdings);
        self.render(&holdings);
    }

    pub fn list(&self) -> Vec<PortfolioHolding> {
        lock(&self.holdings).clone()
    }

    pub fn summary(&self) -> PortfolioSummary {
        PortfolioSummary::from_holdings(&lock(&self.holdings))
    }

    /// Placeholder until quantity and price entry exists: only notifies.
    pub fn add(&self, symbol: &str) {
        let symbol = symbol.trim().to_uppercase();
        info!("Portfolio add requested for {}", symbol);
        self.shared
            .screen()
            .notify(Tone::Success, format!("{symbol} added to portfolio!"));
    }

    /// Drops the holding for `symbol`; absent symbols are ignored.
    pub fn remove(&self, symbol: &str) {
        let symbol = symbol.trim().to_uppercase();
        let mut holdings = lock(&self.holdings);
        let before = holdings.len();
        holdings.retain(|h| h.symbol != symbol);
        if holdings.len() == before {
            return;
        }
        self.render(&holdings);
        self.shared
            .screen()
            .notify(Tone::Success, format!("{symbol} removed from portfolio!"));
    }

    fn render(&self, holdings: &[PortfolioHolding]) {
        let mut screen = self.shared.screen();
        screen.portfolio_rows = holdings.iter().map(PortfolioRow::from).collect();
        screen.portfolio_summary = PortfolioSummary::from_holdings(holdings);
    }
}
