//! Capital-call business rule settings.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_CAPITAL_CALL_DUE_DAYS;
use crate::errors::{Error, Result};
use crate::payments::PaymentType;

pub const DUE_DAYS_ENV: &str = "CAPITAL_CALL_DUE_DAYS";
pub const ALLOW_OVERPAYMENTS_ENV: &str = "CAPITAL_CALL_ALLOW_OVERPAYMENTS";
pub const REQUIRE_PAYMENT_NOTES_ENV: &str = "CAPITAL_CALL_REQUIRE_PAYMENT_NOTES";
pub const DEFAULT_PAYMENT_TYPE_ENV: &str = "CAPITAL_CALL_DEFAULT_PAYMENT_TYPE";
pub const AUTO_STATUS_UPDATE_ENV: &str = "CAPITAL_CALL_AUTO_STATUS_UPDATE";

pub const DUE_DAYS_KEY: &str = "capital_call_due_days";
pub const ALLOW_OVERPAYMENTS_KEY: &str = "allow_overpayments";
pub const REQUIRE_PAYMENT_NOTES_KEY: &str = "require_payment_notes";
pub const DEFAULT_PAYMENT_TYPE_KEY: &str = "default_payment_type";
pub const AUTO_STATUS_UPDATE_KEY: &str = "auto_status_update";

pub const CAPITAL_CALL_SETTING_KEYS: [&str; 5] = [
    DUE_DAYS_KEY,
    ALLOW_OVERPAYMENTS_KEY,
    REQUIRE_PAYMENT_NOTES_KEY,
    DEFAULT_PAYMENT_TYPE_KEY,
    AUTO_STATUS_UPDATE_KEY,
];

/// Settings shared by the services; hosts may swap values at runtime.
pub type SharedCapitalCallSettings = Arc<RwLock<CapitalCallSettings>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalCallSettings {
    /// Grace period added to a call date to get its due date.
    pub due_days: i64,
    pub allow_overpayments: bool,
    pub require_payment_notes: bool,
    pub default_payment_type: PaymentType,
    /// Whether call status changes re-derive the allocation status.
    pub auto_status_update: bool,
}

impl Default for CapitalCallSettings {
    fn default() -> Self {
        Self {
            due_days: DEFAULT_CAPITAL_CALL_DUE_DAYS,
            allow_overpayments: false,
            require_payment_notes: false,
            default_payment_type: PaymentType::Wire,
            auto_status_update: true,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_due_days(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok().filter(|days| *days >= 0)
}

impl CapitalCallSettings {
    /// Defaults overlaid with the `CAPITAL_CALL_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();
        let pairs = [
            (DUE_DAYS_ENV, DUE_DAYS_KEY),
            (ALLOW_OVERPAYMENTS_ENV, ALLOW_OVERPAYMENTS_KEY),
            (REQUIRE_PAYMENT_NOTES_ENV, REQUIRE_PAYMENT_NOTES_KEY),
            (DEFAULT_PAYMENT_TYPE_ENV, DEFAULT_PAYMENT_TYPE_KEY),
            (AUTO_STATUS_UPDATE_ENV, AUTO_STATUS_UPDATE_KEY),
        ];
        for (env_name, key) in pairs {
            if let Some(value) = lookup(env_name) {
                if let Err(e) = settings.apply(key, &value) {
                    warn!("Ignoring {}: {}", env_name, e);
                }
            }
        }
        settings
    }

    /// Applies stored key/value overrides. Unknown keys are left alone since
    /// the settings table is shared with other features.
    pub fn overlay(&mut self, stored: &HashMap<String, String>) {
        for key in CAPITAL_CALL_SETTING_KEYS {
            if let Some(value) = stored.get(key) {
                if let Err(e) = self.apply(key, value) {
                    warn!("Ignoring stored setting {}: {}", key, e);
                }
            }
        }
    }

    /// Parses and applies one setting by its storage key.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        let invalid = || Error::InvalidConfigValue(format!("{} = '{}'", key, value));
        match key {
            DUE_DAYS_KEY => self.due_days = parse_due_days(value).ok_or_else(invalid)?,
            ALLOW_OVERPAYMENTS_KEY => {
                self.allow_overpayments = parse_bool(value).ok_or_else(invalid)?
            }
            REQUIRE_PAYMENT_NOTES_KEY => {
                self.require_payment_notes = parse_bool(value).ok_or_else(invalid)?
            }
            DEFAULT_PAYMENT_TYPE_KEY => {
                self.default_payment_type =
                    PaymentType::from_db_str(value.trim()).ok_or_else(invalid)?
            }
            AUTO_STATUS_UPDATE_KEY => {
                self.auto_status_update = parse_bool(value).ok_or_else(invalid)?
            }
            _ => {
                return Err(Error::InvalidConfigValue(format!(
                    "unknown setting '{}'",
                    key
                )))
            }
        }
        Ok(())
    }

    pub fn shared(self) -> SharedCapitalCallSettings {
        Arc::new(RwLock::new(self))
    }
}

/// Copies the current settings out of the shared cell.
///
/// A poisoned lock still holds a fully written value, so it is read through.
pub fn current_settings(shared: &SharedCapitalCallSettings) -> CapitalCallSettings {
    match shared.read() {
        Ok(settings) => settings.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}
