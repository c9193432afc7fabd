//! Repository trait for stored settings.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::errors::Result;

/// Key/value settings storage.
#[async_trait]
pub trait SettingsRepositoryTrait: Send + Sync {
    async fn get_setting(&self, setting_key: &str) -> Result<Option<String>>;

    async fn get_all_settings(&self) -> Result<HashMap<String, String>>;

    /// Inserts or replaces a single setting.
    async fn update_setting(&self, setting_key: &str, setting_value: &str) -> Result<()>;
}
