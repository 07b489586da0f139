//! Customer marks use-case service.
//!
//! # Responsibility
//! - Orchestrate insert-with-retry over a gateway and a sequence reconciler.
//! - Turn store outcomes into caller-facing values (`RecentRecords`, `Notice`).
//!
//! # Invariants
//! - A uniqueness conflict triggers exactly one realignment and exactly one
//!   retry; any other first-attempt failure is reported without retry.
//! - Listing never triggers realignment.
//! - Validation failures never reach the gateway.

use crate::model::notice::Notice;
use crate::model::record::{NewRecord, Record, RecordForm, RecordId};
use crate::repo::record_repo::{GatewayError, RecordGateway};
use crate::repo::sequence_repo::{RealignOutcome, SequenceReconciler};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Number of rows shown on the read endpoint.
pub const RECENT_RECORDS_LIMIT: u32 = 25;

/// Write failure after orchestration.
#[derive(Debug)]
pub enum SaveError {
    /// First attempt failed for a reason other than a uniqueness conflict.
    Insert(GatewayError),
    /// First attempt hit a conflict; the retry after realignment failed too.
    RetryAfterRealign(GatewayError),
}

impl Display for SaveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Insert(err) => write!(f, "Insert error: {err}"),
            Self::RetryAfterRealign(err) => {
                write!(f, "Insert failed after sequence sync: {err}")
            }
        }
    }
}

impl Error for SaveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Insert(err) => Some(err),
            Self::RetryAfterRealign(err) => Some(err),
        }
    }
}

/// Read result: rows plus the failure that emptied them, if any.
#[derive(Debug)]
pub struct RecentRecords {
    pub records: Vec<Record>,
    pub read_error: Option<GatewayError>,
}

impl RecentRecords {
    /// Returns the user-facing notice for a failed read.
    pub fn error_notice(&self) -> Option<Notice> {
        self.read_error
            .as_ref()
            .map(|err| Notice::error(format!("DB read error: {err}")))
    }
}

/// Use-case service over a record gateway and the generator reconciler.
pub struct RecordService<G: RecordGateway, S: SequenceReconciler> {
    gateway: G,
    reconciler: S,
}

impl<G: RecordGateway, S: SequenceReconciler> RecordService<G, S> {
    pub fn new(gateway: G, reconciler: S) -> Self {
        Self {
            gateway,
            reconciler,
        }
    }

    /// Lists recent records, converting a store failure into an empty list.
    pub fn list_recent(&self, limit: u32) -> RecentRecords {
        match self.gateway.list_recent(limit) {
            Ok(records) => RecentRecords {
                records,
                read_error: None,
            },
            Err(err) => RecentRecords {
                records: Vec::new(),
                read_error: Some(err),
            },
        }
    }

    /// Inserts one record, realigning the generator and retrying once on a
    /// uniqueness conflict.
    ///
    /// # Errors
    /// - `SaveError::Insert` when the first attempt fails without a conflict.
    /// - `SaveError::RetryAfterRealign` when the single retry fails.
    pub fn save(&self, record: &NewRecord) -> Result<RecordId, SaveError> {
        match self.gateway.insert(record) {
            Ok(id) => Ok(id),
            Err(GatewayError::UniqueConstraint(err)) => {
                warn!(
                    "event=record_save module=service status=conflict action=realign_and_retry error={}",
                    err
                );
                self.reconciler.realign();
                match self.gateway.insert(record) {
                    Ok(id) => {
                        info!(
                            "event=record_save module=service status=ok attempt=2 id={}",
                            id
                        );
                        Ok(id)
                    }
                    Err(retry_err) => {
                        error!(
                            "event=record_save module=service status=error attempt=2 error={}",
                            retry_err
                        );
                        Err(SaveError::RetryAfterRealign(retry_err))
                    }
                }
            }
            Err(err) => {
                error!(
                    "event=record_save module=service status=error attempt=1 error={}",
                    err
                );
                Err(SaveError::Insert(err))
            }
        }
    }

    /// Validates a submitted form, saves it and reports the outcome.
    pub fn submit(&self, form: &RecordForm) -> Notice {
        let record = match NewRecord::from_form(form) {
            Ok(record) => record,
            Err(err) => {
                info!(
                    "event=record_submit module=service status=rejected reason={}",
                    err.code()
                );
                return Notice::error(err.to_string());
            }
        };

        match self.save(&record) {
            Ok(_) => Notice::info(format!(
                "Saved {} with marks {}.",
                record.name(),
                record.marks()
            )),
            Err(err) => Notice::error(err.to_string()),
        }
    }

    /// Runs the generator realignment; used by the startup hook.
    pub fn realign(&self) -> RealignOutcome {
        self.reconciler.realign()
    }
}
