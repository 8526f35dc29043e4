// src/controllers/forex.rs
use super::{synthetic_series, Shared};
use crate::chart::{ChartSeries, ChartSlot, StyleHints};
use crate::clients::ForexFeed;
use crate::error::{FetchError, ValidationError};
use crate::lock;
use crate::models::ForexPair;
use crate::screen::{Notice, Panel, Tone};
use log::{debug, error, info, warn};
use std::sync::{Arc, Mutex};

pub const DEFAULT_PAIR: (&str, &str) = ("EUR", "USD");

const PAIRS: [(&str, &str); 6] = [
    ("EUR/USD", "Euro / US Dollar"),
    ("GBP/USD", "British Pound / US Dollar"),
    ("USD/JPY", "US Dollar / Japanese Yen"),
    ("USD/CHF", "US Dollar / Swiss Franc"),
    ("AUD/USD", "Australian Dollar / US Dollar"),
    ("USD/CAD", "US Dollar / Canadian Dollar"),
];

// Indicative rates for the converter; there is no live conversion feed.
const MOCK_RATES: [(&str, &[(&str, f64)]); 3] = [
    (
        "USD",
        &[("EUR", 0.92), ("GBP", 0.79), ("JPY", 150.25), ("AUD", 1.52), ("CAD", 1.35), ("CHF", 0.88)],
    ),
    (
        "EUR",
        &[("USD", 1.09), ("GBP", 0.86), ("JPY", 163.32), ("AUD", 1.65), ("CAD", 1.47), ("CHF", 0.96)],
    ),
    (
        "GBP",
        &[("USD", 1.27), ("EUR", 1.16), ("JPY", 190.32), ("AUD", 1.92), ("CAD", 1.71), ("CHF", 1.11)],
    ),
];

const FALLBACK_POINTS: usize = 20;

pub struct ForexController {
    feed: Arc<dyn ForexFeed>,
    shared: Shared,
    last_good: Mutex<Option<ChartSeries>>,
}

impl ForexController {
    pub fn new(feed: Arc<dyn ForexFeed>, shared: Shared) -> Self {
        Self {
            feed,
            shared,
            last_good: Mutex::new(None),
        }
    }

    pub fn load_pairs(&self) {
        let pairs = PAIRS
            .iter()
            .map(|&(symbol, name)| ForexPair {
                symbol,
                name,
                rate: 1.0876,
                change: 0.0012,
                change_percent: 0.11,
            })
            .collect();
        self.shared.screen().forex_pairs = pairs;
    }

    /// EUR/USD at 5 minutes. Falls back to the last good series, then to
    /// sample data around 1.08.
    pub async fn load_default(&self) {
        let (from, to) = DEFAULT_PAIR;
        let pair = format!("{from}/{to}");
        let token = self.shared.charts().issue(ChartSlot::Forex);
        let result = self.feed.fetch_pair_history(from, to).await;

        let mut charts = self.shared.charts();
        if !charts.is_current(ChartSlot::Forex, token) {
            debug!("Forex chart for {} superseded", pair);
            return;
        }
        let mut screen = self.shared.screen();
        let err = match result {
            Ok(series) if !series.is_empty() => {
                info!("Loaded {} points for {}", series.len(), pair);
                charts.render(ChartSlot::Forex, &series, StyleHints::forex(&pair));
                screen.forex_info = Panel::Notice(Notice::titled(
                    Tone::Success,
                    pair.clone(),
                    format!("Showing the last {} five-minute closes", series.len()),
                ));
                *lock(&self.last_good) = Some(series);
                return;
            }
            Ok(_) => FetchError::Transport(format!("empty series for {pair}")),
            Err(e) => e,
        };

        match err {
            FetchError::NotFound(msg) => {
                warn!("No forex data for {}: {}", pair, msg);
                screen.forex_info = Panel::Notice(Notice::new(
                    Tone::Danger,
                    format!("No exchange rate data for {pair}."),
                ));
            }
            other => {
                match &other {
                    FetchError::RateLimited(msg) => warn!("Rate limited loading {}: {}", pair, msg),
                    _ => error!("Error loading forex chart {}: {}", pair, other),
                }
                let cached = lock(&self.last_good).clone();
                let (series, notice) = match cached {
                    Some(series) => (
                        series,
                        Notice::titled(
                            Tone::Warning,
                            "Showing Cached Data",
                            format!("Live {pair} rates are unavailable; the chart shows the last loaded closes."),
                        ),
                    ),
                    None => (
                        synthetic_series(FALLBACK_POINTS, 1.08, 0.01),
                        Notice::titled(
                            Tone::Info,
                            "Demo Forex Chart",
                            format!("Live {pair} rates are unavailable; showing sample data."),
                        ),
                    ),
                };
                charts.render(ChartSlot::Forex, &series, StyleHints::forex(&pair));
                screen.forex_info = Panel::Notice(notice);
            }
        }
    }

    /// Converts with the mock rate table and shows the result. Returns the
    /// converted amount.
    pub fn convert(&self, from: &str, to: &str, amount: &str) -> Result<f64, ValidationError> {
        let value: f64 = match amount.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => v,
            _ => {
                let err = ValidationError::InvalidAmount(amount.to_string());
                self.shared.screen().notify(Tone::Warning, "Please enter a valid amount");
                return Err(err);
            }
        };
        let from = from.trim().to_uppercase();
        let to = to.trim().to_uppercase();
        let result = convert_amount(&from, &to, value);
        self.shared.screen().forex_result = Some(Notice::new(
            Tone::Info,
            format!("{value} {from} = {result:.2} {to}"),
        ));
        Ok(result)
    }
}

fn mock_rate(from: &str, to: &str) -> Option<f64> {
    MOCK_RATES
        .iter()
        .find(|(base, _)| *base == from)
        .and_then(|(_, quotes)| quotes.iter().find(|(q, _)| *q == to))
        .map(|&(_, rate)| rate)
}

/// Direct rate, else the inverse of the reverse rate, else unchanged.
pub fn convert_amount(from: &str, to: &str, amount: f64) -> f64 {
    if from == to {
        return amount;
    }
    if let Some(rate) = mock_rate(from, to) {
        return amount * rate;
    }
    match mock_rate(to, from) {
        Some(rate) => amount / rate,
        None => amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{series, shared, FakeForex};

    fn controller(feed: Arc<FakeForex>) -> (ForexController, Shared) {
        let shared = shared();
        (ForexController::new(feed, shared.clone()), shared)
    }

    #[test]
    fn converter_uses_direct_inverse_and_identity() {
        assert!((convert_amount("USD", "EUR", 100.0) - 92.0).abs() < 1e-9);
        assert!((convert_amount("JPY", "USD", 150.25) - 1.0).abs() < 1e-9);
        assert_eq!(convert_amount("AUD", "CAD", 10.0), 10.0);
        assert_eq!(convert_amount("EUR", "EUR", 7.5), 7.5);
    }

    #[test]
    fn convert_renders_result_and_rejects_garbage() {
        let (forex, shared) = controller(Arc::new(FakeForex::default()));

        assert!((forex.convert("gbp", "usd", "2").unwrap() - 2.54).abs() < 1e-9);
        assert_eq!(
            shared.screen().forex_result.as_ref().unwrap().message,
            "2 GBP = 2.54 USD"
        );
        assert_eq!(
            forex.convert("USD", "EUR", "lots"),
            Err(ValidationError::InvalidAmount("lots".to_string()))
        );
    }

    #[test]
    fn six_pair_cards() {
        let (forex, shared) = controller(Arc::new(FakeForex::default()));
        forex.load_pairs();
        let screen = shared.screen();
        assert_eq!(screen.forex_pairs.len(), 6);
        assert_eq!(screen.forex_pairs[0].symbol, "EUR/USD");
    }

    #[tokio::test]
    async fn failure_draws_sample_chart_then_cache() {
        let feed = Arc::new(FakeForex::default());
        feed.history
            .reply("EUR/USD", Err(FetchError::Transport("offline".to_string())));
        let (forex, shared) = controller(feed.clone());

        forex.load_default().await;
        {
            let charts = shared.charts();
            let handle = charts.handle(ChartSlot::Forex).unwrap();
            assert_eq!(handle.series.len(), FALLBACK_POINTS);
            assert!(handle.series.values().iter().all(|v| (1.08..1.09).contains(v)));
        }
        assert_eq!(
            shared.screen().forex_info.notice().unwrap().title.as_deref(),
            Some("Demo Forex Chart")
        );

        feed.history.reply("EUR/USD", Ok(series(&[1.0871, 1.0876])));
        forex.load_default().await;
        feed.history
            .reply("EUR/USD", Err(FetchError::RateLimited("Note".to_string())));
        forex.load_default().await;

        assert_eq!(
            shared.charts().handle(ChartSlot::Forex).unwrap().series.values(),
            [1.0871, 1.0876]
        );
        assert_eq!(
            shared.screen().forex_info.notice().unwrap().title.as_deref(),
            Some("Showing Cached Data")
        );
    }

    #[tokio::test]
    async fn not_found_leaves_chart_alone() {
        let feed = Arc::new(FakeForex::default());
        feed.history
            .reply("EUR/USD", Err(FetchError::NotFound("Invalid API call".to_string())));
        let (forex, shared) = controller(feed);

        forex.load_default().await;

        assert!(!shared.charts().has_chart(ChartSlot::Forex));
        assert_eq!(shared.screen().forex_info.notice().unwrap().tone, Tone::Danger);
    }
}
