//! SQLite storage for the capital-call core.
//!
//! Implements the repository traits of `fundflow-core` with Diesel over
//! SQLite: an r2d2 connection pool for reads, embedded migrations, and a
//! single writer actor through which every mutation is serialized.
//!
//! ```text
//!      fundflow-core (domain, services, traits)
//!                  │
//!                  ▼
//!      fundflow-storage-sqlite (this crate)
//!                  │
//!                  ▼
//!              SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;
mod utils;

pub mod allocations;
pub mod capital_calls;
pub mod funds;
pub mod payments;
pub mod settings;

use std::sync::Arc;

pub use db::{
    create_pool, get_connection, get_db_path, init, run_migrations, spawn_writer, DbConnection,
    DbPool, WriteHandle,
};
pub use errors::{IntoCore, StorageError};

pub use allocations::AllocationRepository;
pub use capital_calls::CapitalCallRepository;
pub use funds::FundRepository;
pub use payments::PaymentRepository;
pub use settings::SettingsRepository;

pub use fundflow_core::errors::{DatabaseError, Error, Result};

/// Every repository, sharing one pool and one writer.
pub struct SqliteRepositories {
    pub pool: Arc<DbPool>,
    pub writer: WriteHandle,
    pub funds: Arc<FundRepository>,
    pub allocations: Arc<AllocationRepository>,
    pub capital_calls: Arc<CapitalCallRepository>,
    pub payments: Arc<PaymentRepository>,
    pub settings: Arc<SettingsRepository>,
}

impl SqliteRepositories {
    /// Initializes the database under `data_dir`, applies pending migrations,
    /// and starts the writer. Must be called from within a Tokio runtime.
    pub fn open(data_dir: &str) -> Result<Self> {
        let db_path = init(data_dir)?;
        let pool = create_pool(&db_path)?;
        run_migrations(&pool)?;
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: Arc<DbPool>) -> Self {
        let writer = spawn_writer((*pool).clone());
        Self {
            funds: Arc::new(FundRepository::new(pool.clone(), writer.clone())),
            allocations: Arc::new(AllocationRepository::new(pool.clone(), writer.clone())),
            capital_calls: Arc::new(CapitalCallRepository::new(pool.clone(), writer.clone())),
            payments: Arc::new(PaymentRepository::new(pool.clone(), writer.clone())),
            settings: Arc::new(SettingsRepository::new(pool.clone(), writer.clone())),
            pool,
            writer,
        }
    }
}
