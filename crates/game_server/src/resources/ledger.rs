//! Per-player resource ledger.
//!
//! A ledger maps a resource type name to a signed balance. Keys are
//! normalized to lowercase, so `"Coins"` and `"coins"` address the same
//! entry, and a type that was never touched reads as zero.
//!
//! Every operation takes the ledger's own lock, which keeps one player's
//! ledger independent from every other player's. Callers that need to check
//! a balance and then change it must use [`ResourceLedger::try_apply`]: the
//! separate [`ResourceLedger::can_apply`] / [`ResourceLedger::apply`] pair is
//! two critical sections and two concurrent debits could both pass the check.

use std::collections::HashMap;
use tokio::sync::Mutex;

/// Balance of a single resource type.
pub type Balance = i64;

/// Reasons a conditional ledger update is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// Applying the delta would drive the balance below zero.
    #[error("insufficient {resource_type}: balance {balance}, delta {delta}")]
    Insufficient {
        resource_type: String,
        balance: Balance,
        delta: Balance,
    },

    /// Applying the delta would exceed the representable balance.
    #[error("balance of {0} would overflow")]
    Overflow(String),
}

/// An isolated, serialized map of resource type to balance.
#[derive(Debug, Default)]
pub struct ResourceLedger {
    balances: Mutex<HashMap<String, Balance>>,
}

fn normalize(resource_type: &str) -> String {
    resource_type.to_lowercase()
}

impl ResourceLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored balance, or 0 when the type has never been set.
    pub async fn balance(&self, resource_type: &str) -> Balance {
        let balances = self.balances.lock().await;
        balances.get(&normalize(resource_type)).copied().unwrap_or(0)
    }

    /// Returns true when `balance + delta >= 0`.
    ///
    /// This is a read-only inspection. It does not reserve anything, so a
    /// decision based on it can be stale by the time it is acted upon.
    pub async fn can_apply(&self, resource_type: &str, delta: Balance) -> bool {
        let balance = self.balance(resource_type).await;
        i128::from(balance) + i128::from(delta) >= 0
    }

    /// Unconditionally adds `delta` and returns the new balance.
    ///
    /// Creates the entry at 0 first when absent. This never fails: the sum
    /// saturates at the numeric bounds instead of wrapping.
    pub async fn apply(&self, resource_type: &str, delta: Balance) -> Balance {
        let mut balances = self.balances.lock().await;
        let balance = balances.entry(normalize(resource_type)).or_insert(0);
        *balance = balance.saturating_add(delta);
        *balance
    }

    /// Atomically applies `delta` if the result stays non-negative.
    ///
    /// The check and the update happen under a single lock acquisition.
    /// Returns the new balance, or the reason the update was refused; a
    /// refused update leaves the ledger untouched.
    pub async fn try_apply(&self, resource_type: &str, delta: Balance) -> Result<Balance, LedgerError> {
        let key = normalize(resource_type);
        let mut balances = self.balances.lock().await;
        let current = balances.get(&key).copied().unwrap_or(0);

        let next = i128::from(current) + i128::from(delta);
        if next < 0 {
            return Err(LedgerError::Insufficient {
                resource_type: key,
                balance: current,
                delta,
            });
        }
        let next = Balance::try_from(next).map_err(|_| LedgerError::Overflow(key.clone()))?;

        balances.insert(key, next);
        Ok(next)
    }

    /// Copies every stored balance.
    pub async fn snapshot(&self) -> HashMap<String, Balance> {
        self.balances.lock().await.clone()
    }
}
