pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod service;

pub use config::AppConfig;
pub use db::{create_pool, LedgerStore, MemoryLedgerStore, PgLedgerStore};
pub use error::{LedgerError, LedgerResult};
pub use service::{AccountService, BusinessClock, LedgerService, SummaryOutcome, SummaryService};
