//! Resource bookkeeping: per-player ledgers and the resource type allow-list.

pub mod ledger;
pub mod validator;

pub use ledger::{Balance, LedgerError, ResourceLedger};
pub use validator::{ResourceTypeList, ResourceTypeValidator};
