//! In-process collaborators
//!
//! `DashMap`-backed record store and credit ledger, used by tests and by
//! embedders without a database.

use crate::backend::{CreditLedger, DebitOutcome, RecordStore};
use crate::error::{LedgerError, StoreError};
use crate::types::{AccountId, TargetId};
use dashmap::DashMap;
use forge_artifact::CanonicalArtifact;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Record store held in memory
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: DashMap<TargetId, CanonicalArtifact>,
    saves: AtomicUsize,
}

impl InMemoryRecordStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record without counting it as a save
    #[must_use]
    pub fn with_record(self, target: TargetId, artifact: CanonicalArtifact) -> Self {
        self.records.insert(target, artifact);
        self
    }

    /// Current record for `target`
    #[must_use]
    pub fn get(&self, target: &TargetId) -> Option<CanonicalArtifact> {
        self.records.get(target).map(|entry| entry.value().clone())
    }

    /// Number of successful saves
    #[inline]
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::Acquire)
    }
}

#[async_trait::async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn save_artifact(
        &self,
        target: &TargetId,
        artifact: &CanonicalArtifact,
    ) -> Result<(), StoreError> {
        self.records.insert(target.clone(), artifact.clone());
        self.saves.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    async fn load_artifact(
        &self,
        target: &TargetId,
    ) -> Result<Option<CanonicalArtifact>, StoreError> {
        Ok(self.get(target))
    }
}

/// Credit ledger held in memory
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    balances: DashMap<AccountId, u64>,
}

impl InMemoryLedger {
    /// Create empty ledger
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With an opening balance
    #[must_use]
    pub fn with_account(self, account: AccountId, balance: u64) -> Self {
        self.balances.insert(account, balance);
        self
    }

    /// Add credits, opening the account if needed
    pub fn credit(&self, account: &AccountId, amount: u64) {
        let mut balance = self.balances.entry(account.clone()).or_insert(0);
        *balance = balance.saturating_add(amount);
    }
}

#[async_trait::async_trait]
impl CreditLedger for InMemoryLedger {
    async fn balance(&self, account: &AccountId) -> Result<u64, LedgerError> {
        self.balances
            .get(account)
            .map(|entry| *entry.value())
            .ok_or_else(|| LedgerError::UnknownAccount(account.to_string()))
    }

    async fn try_debit(
        &self,
        account: &AccountId,
        amount: u64,
    ) -> Result<DebitOutcome, LedgerError> {
        // Shard write lock held across check and decrement
        let mut balance = self
            .balances
            .get_mut(account)
            .ok_or_else(|| LedgerError::UnknownAccount(account.to_string()))?;
        if *balance < amount {
            return Ok(DebitOutcome::Insufficient { balance: *balance });
        }
        *balance -= amount;
        Ok(DebitOutcome::Debited {
            remaining: *balance,
        })
    }
}
