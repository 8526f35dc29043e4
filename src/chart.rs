// src/chart.rs
use log::{debug, info};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ChartSlot {
    Stock,
    Crypto,
    Forex,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("series has {labels} labels but {values} values")]
    LengthMismatch { labels: usize, values: usize },
}

/// Labels and values of one line, oldest first. Both sides always have the
/// same length.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ChartSeries {
    labels: Vec<String>,
    values: Vec<f64>,
}

impl ChartSeries {
    pub fn new(labels: Vec<String>, values: Vec<f64>) -> Result<Self, SeriesError> {
        if labels.len() != values.len() {
            return Err(SeriesError::LengthMismatch {
                labels: labels.len(),
                values: values.len(),
            });
        }
        Ok(Self { labels, values })
    }

    pub fn from_points(points: impl IntoIterator<Item = (String, f64)>) -> Self {
        let (labels, values) = points.into_iter().unzip();
        Self { labels, values }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }

    /// Value before the last one, or the last one for single-point series.
    pub fn previous(&self) -> Option<f64> {
        match self.values.len() {
            0 => None,
            1 => self.last(),
            n => Some(self.values[n - 2]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyleHints {
    pub label: String,
    pub border_color: &'static str,
    pub fill_color: &'static str,
    pub tension: f64,
}

impl StyleHints {
    pub fn stock(symbol: &str) -> Self {
        Self {
            label: format!("{symbol} Price"),
            border_color: "#007bff",
            fill_color: "rgba(0, 123, 255, 0.1)",
            tension: 0.4,
        }
    }

    pub fn crypto(coin: &str) -> Self {
        Self {
            label: format!("{} Price (USD)", coin.to_uppercase()),
            border_color: "#f7931a",
            fill_color: "rgba(247, 147, 26, 0.1)",
            tension: 0.4,
        }
    }

    pub fn forex(pair: &str) -> Self {
        Self {
            label: pair.to_string(),
            border_color: "#36a2eb",
            fill_color: "rgba(54,162,235,0.1)",
            tension: 0.4,
        }
    }
}

pub type ChartId = u64;

/// The drawing library. Only creation and disposal are visible to us.
pub trait ChartSurface: Send {
    fn create(&mut self, slot: ChartSlot, series: &ChartSeries, style: &StyleHints) -> ChartId;
    fn dispose(&mut self, id: ChartId);
    fn live_count(&self) -> usize;
}

/// Surface used when no drawing library is attached: tracks live charts and
/// logs what would be drawn.
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    next_id: ChartId,
    live: HashSet<ChartId>,
}

impl ChartSurface for HeadlessSurface {
    fn create(&mut self, slot: ChartSlot, series: &ChartSeries, style: &StyleHints) -> ChartId {
        self.next_id += 1;
        self.live.insert(self.next_id);
        info!(
            "Chart {:?} drawn: {} ({} points, last {:?})",
            slot,
            style.label,
            series.len(),
            series.last()
        );
        self.next_id
    }

    fn dispose(&mut self, id: ChartId) {
        self.live.remove(&id);
    }

    fn live_count(&self) -> usize {
        self.live.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartHandle {
    pub id: ChartId,
    pub series: ChartSeries,
    pub style: StyleHints,
}

/// Monotonic per-slot request counter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SeqToken(u64);

pub struct ChartRenderer {
    surface: Box<dyn ChartSurface>,
    handles: HashMap<ChartSlot, ChartHandle>,
    tokens: HashMap<ChartSlot, u64>,
}

impl Default for ChartRenderer {
    fn default() -> Self {
        Self::new(Box::<HeadlessSurface>::default())
    }
}

impl ChartRenderer {
    pub fn new(surface: Box<dyn ChartSurface>) -> Self {
        Self {
            surface,
            handles: HashMap::new(),
            tokens: HashMap::new(),
        }
    }

    /// Starts a request for `slot`, superseding every earlier token.
    pub fn issue(&mut self, slot: ChartSlot) -> SeqToken {
        let counter = self.tokens.entry(slot).or_insert(0);
        *counter += 1;
        SeqToken(*counter)
    }

    pub fn is_current(&self, slot: ChartSlot, token: SeqToken) -> bool {
        self.tokens.get(&slot).copied() == Some(token.0)
    }

    /// Replaces the chart in `slot`. Empty series leave the slot untouched.
    pub fn render(&mut self, slot: ChartSlot, series: &ChartSeries, style: StyleHints) -> bool {
        if series.is_empty() {
            debug!("Ignoring empty series for {:?}", slot);
            return false;
        }
        if let Some(old) = self.handles.remove(&slot) {
            self.surface.dispose(old.id);
        }
        let id = self.surface.create(slot, series, &style);
        self.handles.insert(
            slot,
            ChartHandle {
                id,
                series: series.clone(),
                style,
            },
        );
        true
    }

    pub fn handle(&self, slot: ChartSlot) -> Option<&ChartHandle> {
        self.handles.get(&slot)
    }

    pub fn has_chart(&self, slot: ChartSlot) -> bool {
        self.handles.contains_key(&slot)
    }

    pub fn live_charts(&self) -> usize {
        self.surface.live_count()
    }
}
