//! SQLite storage implementation for settings.

mod model;
mod repository;

pub use model::AppSettingDB;
pub use repository::SettingsRepository;

pub use fundflow_core::settings::SettingsRepositoryTrait;
