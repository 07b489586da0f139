//! Core domain logic for marksheet.
//! This crate owns the record store gateway, the identity generator
//! reconciler and the insert-with-retry use-case.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{AppConfig, ConfigError, StoreConfig};
pub use logging::{default_log_level, init_logging};
pub use model::notice::{Notice, NoticeLevel};
pub use model::record::{NewRecord, Record, RecordForm, RecordId, ValidationError};
pub use repo::record_repo::{GatewayError, GatewayResult, RecordGateway, SqliteRecordGateway};
pub use repo::sequence_repo::{
    RealignOutcome, ReconcileError, SequenceReconciler, SqliteSequenceReconciler,
};
pub use service::record_service::{RecentRecords, RecordService, SaveError, RECENT_RECORDS_LIMIT};

/// SQLite-backed service wired to one store config.
pub type SqliteRecordService<'cfg> =
    RecordService<SqliteRecordGateway<'cfg>, SqliteSequenceReconciler<'cfg>>;

/// Builds the production service for `config`.
pub fn sqlite_service(config: &StoreConfig) -> SqliteRecordService<'_> {
    RecordService::new(
        SqliteRecordGateway::new(config),
        SqliteSequenceReconciler::new(config),
    )
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
