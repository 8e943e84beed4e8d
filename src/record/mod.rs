//! Call recording.
//!
//! Every call lands in two places under one journal lock: the scope-wide
//! [`Journal`] (cross-double order, used by in-order verification and
//! diagnostics) and the member's typed [`VerifyLedger`] (arguments plus
//! claim bits, used by per-double verification).

pub mod journal;
pub mod ledger;
pub mod log;

pub use journal::{Journal, JournalEntry};
pub use ledger::{LedgerStats, Verdict, VerifyLedger};
pub use log::{CallLog, CallRecord};
