// src/view.rs
use crate::chart::ChartSlot;
use log::debug;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    #[default]
    Dashboard,
    Stocks,
    Crypto,
    Forex,
    Portfolio,
    Watchlist,
    Alerts,
    News,
}

impl Section {
    pub const ALL: [Section; 8] = [
        Section::Dashboard,
        Section::Stocks,
        Section::Crypto,
        Section::Forex,
        Section::Portfolio,
        Section::Watchlist,
        Section::Alerts,
        Section::News,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Section::Dashboard => "dashboard",
            Section::Stocks => "stocks",
            Section::Crypto => "crypto",
            Section::Forex => "forex",
            Section::Portfolio => "portfolio",
            Section::Watchlist => "watchlist",
            Section::Alerts => "alerts",
            Section::News => "news",
        }
    }

    /// Chart slot loaded the first time this section is shown.
    pub fn default_chart(&self) -> Option<ChartSlot> {
        match self {
            Section::Stocks => Some(ChartSlot::Stock),
            Section::Crypto => Some(ChartSlot::Crypto),
            Section::Forex => Some(ChartSlot::Forex),
            _ => None,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Section {
    type Err = String;

    /// Accepts both `stocks` and the nav link form `#stocks`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim().trim_start_matches('#');
        Section::ALL
            .into_iter()
            .find(|section| section.id() == id)
            .ok_or_else(|| format!("unknown section {s:?}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: Section,
    pub to: Section,
    /// Set only on the first visit of a section that owns a chart.
    pub load_default: Option<ChartSlot>,
}

#[derive(Debug, Default)]
pub struct ViewController {
    current: Section,
    loaded: HashSet<Section>,
}

impl ViewController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Section {
        self.current
    }

    pub fn is_loaded(&self, section: Section) -> bool {
        self.loaded.contains(&section)
    }

    pub fn show(&mut self, section: Section) -> Transition {
        let from = self.current;
        self.current = section;
        let load_default = section
            .default_chart()
            .filter(|_| self.loaded.insert(section));
        debug!("Showing {} (from {}), default load: {:?}", section, from, load_default);
        Transition {
            from,
            to: section,
            load_default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_dashboard() {
        assert_eq!(ViewController::new().current(), Section::Dashboard);
    }

    #[test]
    fn default_chart_only_on_first_visit() {
        let mut view = ViewController::new();
        assert_eq!(view.show(Section::Crypto).load_default, Some(ChartSlot::Crypto));
        assert_eq!(view.show(Section::News).load_default, None);
        assert_eq!(view.show(Section::Crypto).load_default, None);
        assert_eq!(view.show(Section::Crypto).load_default, None);
        assert!(view.is_loaded(Section::Crypto));
        assert_eq!(view.current(), Section::Crypto);
    }

    #[test]
    fn sections_without_chart_are_never_marked() {
        let mut view = ViewController::new();
        let t = view.show(Section::Portfolio);
        assert_eq!(t.from, Section::Dashboard);
        assert_eq!(t.load_default, None);
        assert!(!view.is_loaded(Section::Portfolio));
    }

    #[test]
    fn parses_nav_hrefs() {
        assert_eq!("#forex".parse::<Section>(), Ok(Section::Forex));
        assert_eq!("alerts".parse::<Section>(), Ok(Section::Alerts));
        assert!("#settings".parse::<Section>().is_err());
    }
}
