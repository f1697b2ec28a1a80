//! Audit storage trait and the in-memory reference backend.
//!
//! The durable engine behind the chain is an external collaborator; this
//! module defines the contract it must honor. The contract's key clause:
//! inserted entries are never mutated or deleted by the collaborator. If
//! one is anyway, [`crate::AuditChain::verify_chain`] reports the
//! tampering instead of masking it.

use sentinel_core::{AuditEntryId, Timestamp, UserId};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

use crate::entry::{AuditAction, AuditEntry};
use crate::error::{AuditError, AuditResult};

/// Field filters for reading entries.
///
/// `limit`/`offset`/`ascending` apply to the paginated query surface on
/// [`crate::AuditChain`]; storage backends only evaluate the predicate
/// part via [`EntryFilter::matches`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryFilter {
    /// Only entries attributed to this user.
    pub user_id: Option<UserId>,
    /// Only entries with this action.
    pub action: Option<AuditAction>,
    /// Only entries touching this resource kind.
    pub resource: Option<String>,
    /// Only entries created at or after this time.
    pub start: Option<Timestamp>,
    /// Only entries created at or before this time.
    pub end: Option<Timestamp>,
    /// Page size.
    pub limit: usize,
    /// Entries to skip before the page starts.
    pub offset: usize,
    /// Return oldest-first instead of the default recent-first order.
    pub ascending: bool,
}

impl Default for EntryFilter {
    fn default() -> Self {
        Self {
            user_id: None,
            action: None,
            resource: None,
            start: None,
            end: None,
            limit: 50,
            offset: 0,
            ascending: false,
        }
    }
}

impl EntryFilter {
    /// Filter by user.
    #[must_use]
    pub fn user(mut self, user_id: impl Into<UserId>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Filter by action.
    #[must_use]
    pub fn action(mut self, action: AuditAction) -> Self {
        self.action = Some(action);
        self
    }

    /// Filter by resource kind.
    #[must_use]
    pub fn resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Keep entries created at or after `start`.
    #[must_use]
    pub fn since(mut self, start: Timestamp) -> Self {
        self.start = Some(start);
        self
    }

    /// Keep entries created at or before `end`.
    #[must_use]
    pub fn until(mut self, end: Timestamp) -> Self {
        self.end = Some(end);
        self
    }

    /// Set the page size.
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Skip `offset` entries before the page starts.
    #[must_use]
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Return oldest-first.
    #[must_use]
    pub fn oldest_first(mut self) -> Self {
        self.ascending = true;
        self
    }

    /// Whether an entry passes the predicate part of the filter.
    #[must_use]
    pub fn matches(&self, entry: &AuditEntry) -> bool {
        if let Some(user_id) = &self.user_id
            && entry.user_id.as_ref() != Some(user_id)
        {
            return false;
        }
        if let Some(action) = self.action
            && entry.action != action
        {
            return false;
        }
        if let Some(resource) = &self.resource
            && entry.resource.as_deref() != Some(resource.as_str())
        {
            return false;
        }
        if let Some(start) = self.start
            && entry.created_at < start
        {
            return false;
        }
        if let Some(end) = self.end
            && entry.created_at > end
        {
            return false;
        }
        true
    }
}

/// Storage backend for the audit chain.
///
/// Implementations must be thread-safe. Entries arrive in sequence
/// order from a single writer; reads may happen concurrently.
pub trait AuditStore: Send + Sync {
    /// Persist an entry, returning its storage id.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Persistence`] if the entry cannot be
    /// committed. A failed insert must leave no partial write behind.
    fn insert(&self, entry: &AuditEntry) -> AuditResult<AuditEntryId>;

    /// Read entries with `from_seq <= sequence <= to_seq`, ascending.
    ///
    /// # Errors
    ///
    /// Returns an error if retrieval fails.
    fn read_range(&self, from_seq: u64, to_seq: u64) -> AuditResult<Vec<AuditEntry>>;

    /// Read all entries passing `filter`, ascending by sequence.
    ///
    /// # Errors
    ///
    /// Returns an error if retrieval fails.
    fn read_by_filter(&self, filter: &EntryFilter) -> AuditResult<Vec<AuditEntry>>;

    /// Number of committed entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn len(&self) -> AuditResult<u64>;

    /// Whether the log is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn is_empty(&self) -> AuditResult<bool> {
        Ok(self.len()? == 0)
    }

    /// The most recently committed entry, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if retrieval fails.
    fn last(&self) -> AuditResult<Option<AuditEntry>>;
}

/// In-memory storage backend.
///
/// Reference implementation of the storage contract, also used by tests
/// and short-lived deployments. Entries live in an arena ordered by
/// sequence; nothing in this type ever rewrites a committed record.
#[derive(Debug, Default)]
pub struct MemoryAuditStore {
    entries: RwLock<Vec<AuditEntry>>,
}

impl MemoryAuditStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read_guard(&self) -> AuditResult<std::sync::RwLockReadGuard<'_, Vec<AuditEntry>>> {
        self.entries
            .read()
            .map_err(|_| AuditError::Persistence("audit store lock poisoned".to_owned()))
    }
}

impl AuditStore for MemoryAuditStore {
    fn insert(&self, entry: &AuditEntry) -> AuditResult<AuditEntryId> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| AuditError::Persistence("audit store lock poisoned".to_owned()))?;

        // The single appender assigns contiguous sequence numbers; a gap
        // here means the caller and store disagree about history.
        let expected = (entries.len() as u64).saturating_add(1);
        if entry.sequence != expected {
            return Err(AuditError::Persistence(format!(
                "sequence gap: expected {expected}, got {}",
                entry.sequence
            )));
        }

        entries.push(entry.clone());
        Ok(entry.id.clone())
    }

    fn read_range(&self, from_seq: u64, to_seq: u64) -> AuditResult<Vec<AuditEntry>> {
        let entries = self.read_guard()?;
        Ok(entries
            .iter()
            .filter(|e| e.sequence >= from_seq && e.sequence <= to_seq)
            .cloned()
            .collect())
    }

    fn read_by_filter(&self, filter: &EntryFilter) -> AuditResult<Vec<AuditEntry>> {
        let entries = self.read_guard()?;
        Ok(entries.iter().filter(|e| filter.matches(e)).cloned().collect())
    }

    fn len(&self) -> AuditResult<u64> {
        Ok(self.read_guard()?.len() as u64)
    }

    fn last(&self) -> AuditResult<Option<AuditEntry>> {
        Ok(self.read_guard()?.last().cloned())
    }
}
