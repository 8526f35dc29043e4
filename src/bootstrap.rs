// src/bootstrap.rs
//! Startup sequence: immediate section loads, then the two default charts
//! on fixed delays so they do not contend for the chart surface.

use crate::chart::ChartSlot;
use crate::config::{CLOCK_TICK, CRYPTO_DEFAULT_DELAY, STOCK_DEFAULT_DELAY};
use crate::dashboard::Dashboard;
use futures::future::join_all;
use log::{debug, info};
use std::time::Duration;
use tokio::time::{interval, sleep, MissedTickBehavior};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupTask {
    Theme,
    PopularStocks,
    ForexPairs,
    TopCryptos,
    News,
    Portfolio,
    Watchlist,
    Alerts,
    /// Skipped when the slot already shows a chart.
    DefaultChart(ChartSlot),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartupStep {
    pub delay: Duration,
    pub task: StartupTask,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupPlan {
    pub steps: Vec<StartupStep>,
}

impl Default for StartupPlan {
    fn default() -> Self {
        let now = |task| StartupStep {
            delay: Duration::ZERO,
            task,
        };
        Self {
            steps: vec![
                now(StartupTask::Theme),
                now(StartupTask::PopularStocks),
                now(StartupTask::ForexPairs),
                now(StartupTask::TopCryptos),
                now(StartupTask::News),
                now(StartupTask::Portfolio),
                now(StartupTask::Watchlist),
                now(StartupTask::Alerts),
                StartupStep {
                    delay: CRYPTO_DEFAULT_DELAY,
                    task: StartupTask::DefaultChart(ChartSlot::Crypto),
                },
                StartupStep {
                    delay: STOCK_DEFAULT_DELAY,
                    task: StartupTask::DefaultChart(ChartSlot::Stock),
                },
            ],
        }
    }
}

impl StartupPlan {
    /// Starts every step at once; each waits out its own delay.
    pub async fn run(&self, dashboard: &Dashboard) {
        info!("Starting dashboard ({} startup steps)", self.steps.len());
        join_all(self.steps.iter().map(|step| async move {
            if !step.delay.is_zero() {
                sleep(step.delay).await;
            }
            run_task(dashboard, step.task).await;
        }))
        .await;
        info!("Startup sequence finished");
    }
}

async fn run_task(dashboard: &Dashboard, task: StartupTask) {
    debug!("Startup task {:?}", task);
    match task {
        StartupTask::Theme => {
            dashboard.settings.load_theme();
        }
        StartupTask::PopularStocks => dashboard.stocks.load_popular().await,
        StartupTask::ForexPairs => dashboard.forex.load_pairs(),
        StartupTask::TopCryptos => dashboard.crypto.load_top().await,
        StartupTask::News => dashboard.news.load().await,
        StartupTask::Portfolio => dashboard.portfolio.load(),
        StartupTask::Watchlist => dashboard.watchlist.load(),
        StartupTask::Alerts => dashboard.alerts.load(),
        StartupTask::DefaultChart(slot) => {
            let drawn = dashboard.shared().charts().has_chart(slot);
            if drawn {
                debug!("{:?} chart already drawn, skipping default", slot);
            } else {
                dashboard.load_default(slot).await;
            }
        }
    }
}

/// Ticks the clock once per second until the task is dropped.
pub async fn run_clock(dashboard: &Dashboard) {
    let mut ticker = interval(CLOCK_TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;
        dashboard.tick();
    }
}
