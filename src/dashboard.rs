// src/dashboard.rs
use crate::chart::ChartSlot;
use crate::clients::{CryptoFeed, EquityFeed, ForexFeed, NewsFeed};
use crate::controllers::{
    AlertsController, CryptoController, ForexController, NewsController, PortfolioController,
    SettingsController, Shared, StocksController, WatchlistController,
};
use crate::lock;
use crate::view::{Section, Transition, ViewController};
use chrono::Local;
use log::{debug, warn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

/// Something on the page that emits events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    NavLink,
    StockSearchButton,
    StockSymbolInput,
    StockInterval,
    CryptoSearchButton,
    CryptoSymbolInput,
    AlertForm,
    AlertDeleteButton,
    WatchlistAddButton,
    WatchlistRemoveButton,
    PortfolioAddButton,
    PortfolioRemoveButton,
    ForexConvertButton,
    ThemeToggle,
    LoginForm,
    SignupForm,
    TraderButton,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    Click,
    Enter,
    Change,
    Submit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ShowSection,
    SearchStock,
    ChangeInterval,
    SearchCrypto,
    CreateAlert,
    DeleteAlert,
    AddToWatchlist,
    RemoveFromWatchlist,
    AddToPortfolio,
    RemoveFromPortfolio,
    ConvertForex,
    ToggleTheme,
    Login,
    Signup,
    ConnectTrader,
}

/// A page event. `value` carries what the element holds: a nav href, a
/// symbol on a row button, an alert id, a new interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiEvent {
    pub target: Target,
    pub trigger: Trigger,
    pub value: Option<String>,
}

impl UiEvent {
    pub fn new(target: Target, trigger: Trigger) -> Self {
        Self {
            target,
            trigger,
            value: None,
        }
    }

    pub fn click(target: Target) -> Self {
        Self::new(target, Trigger::Click)
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// Built once; every listener on the page is one row.
pub fn event_table() -> HashMap<(Target, Trigger), Action> {
    use Action::*;
    use Target::*;
    use Trigger::*;
    HashMap::from([
        ((NavLink, Click), ShowSection),
        ((StockSearchButton, Click), SearchStock),
        ((StockSymbolInput, Enter), SearchStock),
        ((StockInterval, Change), ChangeInterval),
        ((CryptoSearchButton, Click), SearchCrypto),
        ((CryptoSymbolInput, Enter), SearchCrypto),
        ((AlertForm, Submit), CreateAlert),
        ((AlertDeleteButton, Click), DeleteAlert),
        ((WatchlistAddButton, Click), AddToWatchlist),
        ((WatchlistRemoveButton, Click), RemoveFromWatchlist),
        ((PortfolioAddButton, Click), AddToPortfolio),
        ((PortfolioRemoveButton, Click), RemoveFromPortfolio),
        ((ForexConvertButton, Click), ConvertForex),
        ((ThemeToggle, Click), ToggleTheme),
        ((LoginForm, Submit), Login),
        ((SignupForm, Submit), Signup),
        ((TraderButton, Click), ConnectTrader),
    ])
}

/// Market data sources used by the dashboard.
#[derive(Clone)]
pub struct Feeds {
    pub equity: Arc<dyn EquityFeed>,
    pub forex: Arc<dyn ForexFeed>,
    pub crypto: Arc<dyn CryptoFeed>,
    pub news: Arc<dyn NewsFeed>,
}

pub struct Dashboard {
    pub stocks: StocksController,
    pub crypto: CryptoController,
    pub forex: ForexController,
    pub news: NewsController,
    pub portfolio: PortfolioController,
    pub watchlist: WatchlistController,
    pub alerts: AlertsController,
    pub settings: SettingsController,
    shared: Shared,
    view: Mutex<ViewController>,
    events: HashMap<(Target, Trigger), Action>,
}

impl Dashboard {
    pub fn new(feeds: Feeds, shared: Shared, trader_contact_url: &str) -> Self {
        Self {
            stocks: StocksController::new(feeds.equity, shared.clone()),
            crypto: CryptoController::new(feeds.crypto, shared.clone()),
            forex: ForexController::new(feeds.forex, shared.clone()),
            news: NewsController::new(feeds.news, shared.clone()),
            portfolio: PortfolioController::new(shared.clone()),
            watchlist: WatchlistController::new(shared.clone()),
            alerts: AlertsController::new(shared.clone()),
            settings: SettingsController::new(shared.clone(), trader_contact_url),
            view: Mutex::new(ViewController::new()),
            events: event_table(),
            shared,
        }
    }

    pub fn shared(&self) -> &Shared {
        &self.shared
    }

    pub fn current_section(&self) -> Section {
        lock(&self.view).current()
    }

    /// Shows `section`; the first visit of a chart section loads its default
    /// chart unless one is already drawn.
    pub async fn show(&self, section: Section) -> Transition {
        let transition = lock(&self.view).show(section);
        self.shared.screen().show(section);
        if let Some(slot) = transition.load_default {
            if !self.shared.charts().has_chart(slot) {
                self.load_default(slot).await;
            }
        }
        transition
    }

    pub async fn load_default(&self, slot: ChartSlot) {
        match slot {
            ChartSlot::Stock => self.stocks.load_default().await,
            ChartSlot::Crypto => self.crypto.load_default().await,
            ChartSlot::Forex => self.forex.load_default().await,
        }
    }

    /// Routes `event` through the event table. Returns false when nothing
    /// listens for it.
    pub async fn dispatch(&self, event: UiEvent) -> bool {
        let Some(action) = self.events.get(&(event.target, event.trigger)).copied() else {
            debug!("No listener for {:?} {:?}", event.target, event.trigger);
            return false;
        };
        debug!("{:?} {:?} -> {:?}", event.target, event.trigger, action);
        let value = event.value.unwrap_or_default();
        match action {
            Action::ShowSection => match value.parse::<Section>() {
                Ok(section) => {
                    self.show(section).await;
                }
                Err(e) => warn!("{}", e),
            },
            Action::SearchStock => self.search_stock().await,
            Action::ChangeInterval => {
                let symbol_entered = {
                    let mut screen = self.shared.screen();
                    if !value.is_empty() {
                        screen.inputs.stock_interval = value;
                    }
                    !screen.inputs.stock_symbol.trim().is_empty()
                };
                if symbol_entered {
                    self.search_stock().await;
                }
            }
            Action::SearchCrypto => {
                let query = self.shared.screen().inputs.crypto_symbol.clone();
                // The controller already surfaced the validation message.
                let _ = self.crypto.search(&query).await;
            }
            Action::CreateAlert => {
                let (symbol, price, condition) = {
                    let screen = self.shared.screen();
                    (
                        screen.inputs.alert_symbol.clone(),
                        screen.inputs.alert_price.clone(),
                        screen.inputs.alert_condition.clone(),
                    )
                };
                if self.alerts.create(&symbol, &price, &condition).is_ok() {
                    let mut screen = self.shared.screen();
                    screen.inputs.alert_symbol.clear();
                    screen.inputs.alert_price.clear();
                }
            }
            Action::DeleteAlert => match value.trim().parse::<u64>() {
                Ok(id) => log_failure("delete alert", self.alerts.delete(id)),
                Err(_) => warn!("Bad alert id {:?}", value),
            },
            Action::AddToWatchlist => log_failure("add to watchlist", self.watchlist.add(&value).map(|_| ())),
            Action::RemoveFromWatchlist => log_failure("remove from watchlist", self.watchlist.remove(&value)),
            Action::AddToPortfolio => self.portfolio.add(&value),
            Action::RemoveFromPortfolio => self.portfolio.remove(&value),
            Action::ConvertForex => {
                let (from, to, amount) = {
                    let screen = self.shared.screen();
                    (
                        screen.inputs.forex_from.clone(),
                        screen.inputs.forex_to.clone(),
                        screen.inputs.forex_amount.clone(),
                    )
                };
                log_failure("convert forex", self.forex.convert(&from, &to, &amount).map(|_| ()));
            }
            Action::ToggleTheme => log_failure("toggle theme", self.settings.toggle_theme().map(|_| ())),
            Action::Login => {
                let email = self.shared.screen().inputs.login_email.clone();
                self.settings.login(&email);
            }
            Action::Signup => {
                let (name, email) = {
                    let screen = self.shared.screen();
                    (screen.inputs.signup_name.clone(), screen.inputs.signup_email.clone())
                };
                log_failure("sign up", self.settings.signup(&name, &email).map(|_| ()));
            }
            Action::ConnectTrader => {
                self.settings.connect_trader();
            }
        }
        true
    }

    /// Clock refresh and toast expiry, run once per second.
    pub fn tick(&self) {
        let mut screen = self.shared.screen();
        screen.clock = Local::now().format("%-m/%-d/%Y %-I:%M:%S %p").to_string();
        screen.expire_toasts(Instant::now());
    }

    async fn search_stock(&self) {
        let (symbol, interval) = {
            let screen = self.shared.screen();
            (
                screen.inputs.stock_symbol.clone(),
                screen.inputs.stock_interval.clone(),
            )
        };
        let _ = self.stocks.search(&symbol, &interval).await;
    }
}

fn log_failure<E: std::fmt::Display>(what: &str, result: Result<(), E>) {
    if let Err(e) = result {
        warn!("Could not {}: {}", what, e);
    }
}
