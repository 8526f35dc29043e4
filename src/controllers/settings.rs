// src/controllers/settings.rs
//! Theme, the account stubs and the personal trader link.

use super::Shared;
use crate::error::ActionError;
use crate::models::{Theme, UserData};
use crate::screen::Tone;
use crate::store::StorageKey;
use log::{error, info, warn};
use reqwest::Url;

pub struct SettingsController {
    shared: Shared,
    trader_contact_url: String,
}

impl SettingsController {
    pub fn new(shared: Shared, trader_contact_url: impl Into<String>) -> Self {
        Self {
            shared,
            trader_contact_url: trader_contact_url.into(),
        }
    }

    pub fn load_theme(&self) -> Theme {
        let theme = match self.shared.store().load::<Theme>(StorageKey::Theme) {
            Ok(stored) => stored.unwrap_or_default(),
            Err(e) => {
                warn!("Ignoring stored theme: {}", e);
                Theme::default()
            }
        };
        self.shared.screen().theme = theme;
        theme
    }

    pub fn toggle_theme(&self) -> Result<Theme, ActionError> {
        let theme = self.shared.screen().theme.toggled();
        self.shared.store().save(StorageKey::Theme, &theme)?;
        self.shared.screen().theme = theme;
        info!("Theme set to {:?}", theme);
        Ok(theme)
    }

    /// There is no account backend; any submission succeeds.
    pub fn login(&self, email: &str) {
        info!("Login submitted for {}", email.trim());
        self.shared.screen().notify(Tone::Success, "Login successful!");
    }

    pub fn signup(&self, name: &str, email: &str) -> Result<UserData, ActionError> {
        let non_empty = |s: &str| Some(s.trim().to_string()).filter(|s| !s.is_empty());
        let user = UserData {
            name: non_empty(name),
            email: non_empty(email),
        };
        self.shared.store().save(StorageKey::UserData, &user)?;
        self.shared
            .screen()
            .notify(Tone::Success, "Account created successfully!");
        Ok(user)
    }

    pub fn user(&self) -> Option<UserData> {
        self.shared
            .store()
            .load(StorageKey::UserData)
            .unwrap_or_else(|e| {
                warn!("Ignoring stored user data: {}", e);
                None
            })
    }

    /// Opens the messaging link with a greeting that names the stored user.
    pub fn connect_trader(&self) -> Option<String> {
        let name = self
            .user()
            .and_then(|u| u.name)
            .unwrap_or_else(|| "User".to_string());
        let message = format!(
            "Hello! I'm {name} and I'd like to connect with a personal trader. I'm interested in getting professional trading advice and guidance."
        );
        let url = match Url::parse_with_params(&self.trader_contact_url, &[("text", message)]) {
            Ok(url) => url.to_string(),
            Err(e) => {
                error!("Bad trader contact url {:?}: {}", self.trader_contact_url, e);
                self.shared
                    .screen()
                    .notify(Tone::Danger, "Personal trader contact is unavailable right now.");
                return None;
            }
        };
        let mut screen = self.shared.screen();
        screen.open_link(url.clone());
        screen.notify(
            Tone::Success,
            "Connecting you with a personal trader via WhatsApp!",
        );
        Some(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_TRADER_CONTACT_URL;
    use crate::testing::shared;

    #[test]
    fn theme_toggle_persists() {
        let shared = shared();
        let settings = SettingsController::new(shared.clone(), DEFAULT_TRADER_CONTACT_URL);
        assert_eq!(settings.load_theme(), Theme::Light);

        assert_eq!(settings.toggle_theme().unwrap(), Theme::Dark);

        let again = SettingsController::new(shared.clone(), DEFAULT_TRADER_CONTACT_URL);
        shared.screen().theme = Theme::Light;
        assert_eq!(again.load_theme(), Theme::Dark);
        assert_eq!(shared.screen().theme, Theme::Dark);
    }

    #[test]
    fn trader_link_uses_stored_name() {
        let shared = shared();
        let settings = SettingsController::new(shared.clone(), DEFAULT_TRADER_CONTACT_URL);
        settings.signup("Ada Lovelace", "ada@example.com").unwrap();

        let url = settings.connect_trader().unwrap();

        let parsed = Url::parse(&url).unwrap();
        assert_eq!(parsed.host_str(), Some("wa.me"));
        let text = parsed
            .query_pairs()
            .find(|(k, _)| k == "text")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        assert!(text.starts_with("Hello! I'm Ada Lovelace and"));
        assert_eq!(shared.screen().opened_links, vec![url]);
    }

    #[test]
    fn trader_link_defaults_to_user() {
        let shared = shared();
        let settings = SettingsController::new(shared.clone(), DEFAULT_TRADER_CONTACT_URL);

        let url = settings.connect_trader().unwrap();

        assert!(url.contains("I%27m+User+and") || url.contains("I'm+User+and"));
        assert_eq!(shared.screen().last_toast().unwrap().tone, Tone::Success);
    }

    #[test]
    fn signup_stores_user_data() {
        let shared = shared();
        let settings = SettingsController::new(shared.clone(), DEFAULT_TRADER_CONTACT_URL);

        settings.signup(" Grace ", "").unwrap();

        assert_eq!(
            settings.user(),
            Some(UserData {
                name: Some("Grace".to_string()),
                email: None
            })
        );
    }
}
