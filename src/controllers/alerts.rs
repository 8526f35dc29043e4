// src/controllers/alerts.rs
use super::Shared;
use crate::error::{ActionError, ValidationError};
use crate::lock;
use crate::models::{Alert, AlertCondition};
use crate::screen::{Notice, Tone};
use crate::store::StorageKey;
use chrono::Utc;
use log::{error, info};
use std::sync::Mutex;

/// Price alerts mirrored to the `alerts` key. Nothing evaluates them against
/// live prices; they are a saved list.
pub struct AlertsController {
    shared: Shared,
    alerts: Mutex<Vec<Alert>>,
}

impl AlertsController {
    pub fn new(shared: Shared) -> Self {
        Self {
            shared,
            alerts: Mutex::new(Vec::new()),
        }
    }

    pub fn load(&self) {
        let stored: Vec<Alert> = match self.shared.store().load(StorageKey::Alerts) {
            Ok(list) => list.unwrap_or_default(),
            Err(e) => {
                error!("Ignoring unreadable alerts: {}", e);
                Vec::new()
            }
        };
        let mut alerts = lock(&self.alerts);
        *alerts = stored;
        info!("Loaded {} alerts", alerts.len());
        self.render(&alerts);
    }

    pub fn list(&self) -> Vec<Alert> {
        lock(&self.alerts).clone()
    }

    /// Validates the form values and appends a new active alert.
    pub fn create(&self, symbol: &str, price: &str, condition: &str) -> Result<Alert, ActionError> {
        let (symbol, target_price, condition) = match parse_form(symbol, price, condition) {
            Ok(fields) => fields,
            Err(e) => {
                self.shared
                    .screen()
                    .notify(Tone::Warning, "Please fill in all fields");
                return Err(e.into());
            }
        };

        let mut alerts = lock(&self.alerts);
        let now_ms = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
        let id = alerts
            .iter()
            .map(|a| a.id)
            .max()
            .map_or(now_ms, |last| now_ms.max(last + 1));
        let alert = Alert {
            id,
            symbol,
            target_price,
            condition,
            active: true,
        };
        alerts.push(alert.clone());
        if let Err(e) = self.shared.store().save(StorageKey::Alerts, alerts.as_slice()) {
            alerts.pop();
            return Err(self.failed(e.into()));
        }
        self.render(&alerts);
        self.shared.screen().notify(
            Tone::Success,
            format!(
                "Alert created for {} {} ${}",
                alert.symbol,
                alert.condition.as_str(),
                alert.target_price
            ),
        );
        Ok(alert)
    }

    /// Deletes by id; an unknown id changes nothing.
    pub fn delete(&self, id: u64) -> Result<(), ActionError> {
        let mut alerts = lock(&self.alerts);
        let Some(pos) = alerts.iter().position(|a| a.id == id) else {
            return Ok(());
        };
        let removed = alerts.remove(pos);
        if let Err(e) = self.shared.store().save(StorageKey::Alerts, alerts.as_slice()) {
            alerts.insert(pos, removed);
            return Err(self.failed(e.into()));
        }
        self.render(&alerts);
        self.shared.screen().notify(Tone::Success, "Alert deleted!");
        Ok(())
    }

    fn failed(&self, e: ActionError) -> ActionError {
        error!("Alerts not saved: {}", e);
        self.shared
            .screen()
            .notify(Tone::Danger, "Could not save your alerts. Please try again.");
        e
    }

    fn render(&self, alerts: &[Alert]) {
        let mut screen = self.shared.screen();
        screen.alerts.items = alerts.to_vec();
        screen.alerts.notice = if alerts.is_empty() {
            Some(Notice::new(Tone::Info, "No active alerts"))
        } else {
            None
        };
    }
}

fn parse_form(
    symbol: &str,
    price: &str,
    condition: &str,
) -> Result<(String, f64, AlertCondition), ValidationError> {
    let symbol = symbol.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(ValidationError::EmptySymbol);
    }
    let target_price = match price.trim().parse::<f64>() {
        Ok(p) if p.is_finite() && p > 0.0 => p,
        _ => return Err(ValidationError::InvalidPrice(price.to_string())),
    };
    Ok((symbol, target_price, condition.parse()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::shared;

    fn persisted(shared: &Shared) -> Option<Vec<Alert>> {
        shared.store().load(StorageKey::Alerts).unwrap()
    }

    #[test]
    fn create_appends_with_fresh_ids() {
        let shared = shared();
        let alerts = AlertsController::new(shared.clone());

        let first = alerts.create("aapl", "180", "above").unwrap();
        let second = alerts.create("AAPL", "180", "above").unwrap();

        assert!(second.id > first.id);
        assert_eq!(first.symbol, "AAPL");
        assert_eq!(alerts.list().len(), 2);
        assert_eq!(persisted(&shared).unwrap(), alerts.list());
        assert_eq!(
            shared.screen().last_toast().unwrap().message,
            "Alert created for AAPL above $180"
        );
    }

    #[test]
    fn invalid_price_mutates_nothing() {
        let shared = shared();
        let alerts = AlertsController::new(shared.clone());

        for price in ["abc", "0", "-5", "", "NaN", "inf"] {
            let err = alerts.create("TSLA", price, "below").unwrap_err();
            assert!(matches!(
                err,
                ActionError::Validation(ValidationError::InvalidPrice(_))
            ));
        }
        assert!(matches!(
            alerts.create(" ", "10", "below"),
            Err(ActionError::Validation(ValidationError::EmptySymbol))
        ));
        assert!(matches!(
            alerts.create("TSLA", "10", "sideways"),
            Err(ActionError::Validation(ValidationError::InvalidCondition(_)))
        ));

        assert!(alerts.list().is_empty());
        assert_eq!(persisted(&shared), None);
        assert_eq!(shared.screen().last_toast().unwrap().tone, Tone::Warning);
    }

    #[test]
    fn deleting_unknown_id_is_a_no_op() {
        let shared = shared();
        let alerts = AlertsController::new(shared.clone());
        let alert = alerts.create("MSFT", "300.5", "below").unwrap();
        let toasts = shared.screen().toasts.len();

        alerts.delete(alert.id + 1000).unwrap();

        assert_eq!(alerts.list(), vec![alert.clone()]);
        assert_eq!(persisted(&shared).unwrap(), vec![alert]);
        assert_eq!(shared.screen().toasts.len(), toasts);
    }

    #[test]
    fn delete_and_empty_state() {
        let shared = shared();
        let alerts = AlertsController::new(shared.clone());
        let alert = alerts.create("NVDA", "950", "above").unwrap();

        alerts.delete(alert.id).unwrap();

        assert_eq!(persisted(&shared).unwrap(), Vec::<Alert>::new());
        let screen = shared.screen();
        assert!(screen.alerts.items.is_empty());
        assert_eq!(screen.alerts.notice.as_ref().unwrap().message, "No active alerts");
    }

    #[test]
    fn load_accepts_stored_price_field() {
        let shared = shared();
        let raw = serde_json::json!([
            {"id": 1700000000000u64, "symbol": "AMZN", "price": 150.0, "condition": "below", "active": true}
        ]);
        shared.store().save(StorageKey::Alerts, &raw).unwrap();
        let alerts = AlertsController::new(shared.clone());

        alerts.load();

        let list = alerts.list();
        assert_eq!(list[0].target_price, 150.0);
        assert_eq!(list[0].condition, AlertCondition::Below);
    }
}
