use super::{
    current_settings, CapitalCallSettings, SettingsRepositoryTrait, SharedCapitalCallSettings,
};
use crate::errors::Result;
use async_trait::async_trait;
use log::{debug, info};
use std::sync::Arc;

#[async_trait]
pub trait SettingsServiceTrait: Send + Sync {
    /// Current in-memory settings used by the services.
    fn get_capital_call_settings(&self) -> CapitalCallSettings;

    /// Environment defaults overlaid with stored values; refreshes the shared cell.
    async fn load_capital_call_settings(&self) -> Result<CapitalCallSettings>;

    /// Get a single stored setting value by key. Returns None if not found.
    async fn get_setting_value(&self, key: &str) -> Result<Option<String>>;

    /// Validates, persists, and applies one capital-call setting.
    async fn update_setting(&self, key: &str, value: &str) -> Result<CapitalCallSettings>;
}

pub struct SettingsService {
    settings_repository: Arc<dyn SettingsRepositoryTrait>,
    settings: SharedCapitalCallSettings,
}

impl SettingsService {
    pub fn new(
        settings_repository: Arc<dyn SettingsRepositoryTrait>,
        settings: SharedCapitalCallSettings,
    ) -> Self {
        SettingsService {
            settings_repository,
            settings,
        }
    }

    fn store(&self, settings: CapitalCallSettings) {
        match self.settings.write() {
            Ok(mut guard) => *guard = settings,
            Err(poisoned) => *poisoned.into_inner() = settings,
        }
    }
}

#[async_trait]
impl SettingsServiceTrait for SettingsService {
    fn get_capital_call_settings(&self) -> CapitalCallSettings {
        current_settings(&self.settings)
    }

    async fn load_capital_call_settings(&self) -> Result<CapitalCallSettings> {
        let stored = self.settings_repository.get_all_settings().await?;
        let mut settings = CapitalCallSettings::from_env();
        settings.overlay(&stored);
        debug!("Loaded capital call settings: {:?}", settings);
        self.store(settings.clone());
        Ok(settings)
    }

    async fn get_setting_value(&self, key: &str) -> Result<Option<String>> {
        self.settings_repository.get_setting(key).await
    }

    async fn update_setting(&self, key: &str, value: &str) -> Result<CapitalCallSettings> {
        let mut updated = current_settings(&self.settings);
        updated.apply(key, value)?;

        self.settings_repository
            .update_setting(key, value.trim())
            .await?;
        info!("Capital call setting {} updated to '{}'", key, value.trim());
        self.store(updated.clone());
        Ok(updated)
    }
}
