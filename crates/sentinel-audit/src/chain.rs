//! The audit chain: append, verify, query.
//!
//! Appends are a single-writer critical section. Each entry's digest
//! depends on the previous entry's digest, so the head (last sequence
//! number plus last digest) is guarded by a mutex and only advances
//! after the storage collaborator has committed the entry. Reads run
//! against already-committed entries, which are immutable, and take no
//! lock.

use sentinel_core::{AuditEntryId, Timestamp, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use crate::digest::EntryDigest;
use crate::entry::{AuditAction, AuditEntry, EntryDraft};
use crate::error::{AuditError, AuditResult};
use crate::storage::{AuditStore, EntryFilter, MemoryAuditStore};

/// How many entries a verification walk reads per storage round trip.
const VERIFY_CHUNK: u64 = 512;

/// Chain head state guarded by the append mutex.
#[derive(Debug, Clone, Copy)]
struct ChainHead {
    last_sequence: u64,
    last_hash: EntryDigest,
}

/// Append-only, hash-linked log of security-relevant actions.
pub struct AuditChain {
    store: Arc<dyn AuditStore>,
    head: Mutex<ChainHead>,
}

impl AuditChain {
    /// Open a chain over the given storage collaborator.
    ///
    /// Recovers the head from the last committed entry, so a restarted
    /// process continues the chain instead of forking it.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn open(store: Arc<dyn AuditStore>) -> AuditResult<Self> {
        let head = match store.last()? {
            Some(entry) => ChainHead {
                last_sequence: entry.sequence,
                last_hash: entry.hash,
            },
            None => ChainHead {
                last_sequence: 0,
                last_hash: EntryDigest::GENESIS,
            },
        };
        Ok(Self {
            store,
            head: Mutex::new(head),
        })
    }

    /// Create a chain over a fresh in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(MemoryAuditStore::new()),
            head: Mutex::new(ChainHead {
                last_sequence: 0,
                last_hash: EntryDigest::GENESIS,
            }),
        }
    }

    /// Append an entry to the chain.
    ///
    /// Assigns the next sequence number, links to the previous entry's
    /// digest (genesis for the first entry), computes this entry's
    /// digest, and persists through the storage collaborator.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Persistence`] if the store write fails. On
    /// failure the sequence counter does not advance: the failed attempt
    /// does not consume a sequence number, and a retry produces the same
    /// chain linkage.
    pub fn append(&self, draft: EntryDraft) -> AuditResult<AuditEntryId> {
        let mut head = self
            .head
            .lock()
            .map_err(|_| AuditError::Persistence("audit chain head poisoned".to_owned()))?;

        let sequence = head.last_sequence.saturating_add(1);
        let mut entry = AuditEntry {
            id: AuditEntryId::new(),
            sequence,
            user_id: draft.user_id,
            session_id: draft.session_id,
            action: draft.action,
            resource: draft.resource,
            resource_id: draft.resource_id,
            details: draft.details,
            success: draft.success,
            created_at: draft.created_at.unwrap_or_else(Timestamp::now),
            prev_hash: head.last_hash,
            hash: EntryDigest::GENESIS,
        };
        entry.hash = entry.compute_hash();

        match self.store.insert(&entry) {
            Ok(id) => {
                head.last_sequence = sequence;
                head.last_hash = entry.hash;
                debug!(sequence, action = %entry.action, success = entry.success, "audit entry appended");
                Ok(id)
            },
            Err(e) => {
                // Head untouched: the sequence number was not consumed.
                warn!(sequence, error = %e, "audit append failed");
                Err(e)
            },
        }
    }

    /// Walk the chain and verify every digest and link.
    ///
    /// Starts at `from_sequence` (default 1). Recomputes each entry's
    /// digest from content and checks the link to its predecessor. A
    /// broken chain is a reportable result, not an error: mismatches
    /// come back as data and only storage-read failures return `Err`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn verify_chain(&self, from_sequence: Option<u64>) -> AuditResult<ChainVerification> {
        let total_entries = self.store.len()?;
        let last_sequence = self.last_sequence();
        let start = from_sequence.unwrap_or(1).max(1);

        let mut report = ChainVerification {
            valid: true,
            broken_at: None,
            total_entries,
            last_sequence,
            issue: None,
        };

        // Seed the expected link. Mid-chain starts read the predecessor;
        // a walk from the beginning expects the genesis digest.
        let mut prev_hash = if start > 1 {
            self.store
                .read_range(start.saturating_sub(1), start.saturating_sub(1))?
                .pop()
                .map(|prev| prev.hash)
        } else {
            Some(EntryDigest::GENESIS)
        };

        let mut next = start;
        while next <= last_sequence {
            let to = next.saturating_add(VERIFY_CHUNK.saturating_sub(1)).min(last_sequence);
            let entries = self.store.read_range(next, to)?;
            for entry in &entries {
                if !entry.hash_is_valid() {
                    report.fail(entry.sequence, ChainIssue::HashMismatch { sequence: entry.sequence });
                    return Ok(report);
                }
                if let Some(expected) = prev_hash
                    && entry.prev_hash != expected
                {
                    report.fail(entry.sequence, ChainIssue::BrokenLink { sequence: entry.sequence });
                    return Ok(report);
                }
                prev_hash = Some(entry.hash);
            }
            next = to.saturating_add(1);
        }

        Ok(report)
    }

    /// Query entries with field filters and pagination.
    ///
    /// Entries are ordered by sequence number, recent-first unless the
    /// filter asks for oldest-first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn query(&self, filter: EntryFilter) -> AuditResult<EntryPage> {
        let mut matched = self.store.read_by_filter(&filter)?;
        if !filter.ascending {
            matched.reverse();
        }

        let total_matched = matched.len() as u64;
        let entries: Vec<AuditEntry> = matched
            .into_iter()
            .skip(filter.offset)
            .take(filter.limit)
            .collect();

        Ok(EntryPage {
            entries,
            total_matched,
            limit: filter.limit,
            offset: filter.offset,
        })
    }

    /// All entries for a user at or after `since`, oldest-first.
    ///
    /// Convenience filter for anomaly evaluation and reporting.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn recent_user_activity(
        &self,
        user_id: &UserId,
        since: Timestamp,
    ) -> AuditResult<Vec<AuditEntry>> {
        self.store.read_by_filter(
            &EntryFilter::default()
                .user(user_id.clone())
                .since(since)
                .oldest_first(),
        )
    }

    /// Count entries per action over the full log.
    ///
    /// This aggregates every committed entry; callers needing a bounded
    /// window should query with a time filter and count the page.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn count_actions_by_type(&self) -> AuditResult<HashMap<AuditAction, u64>> {
        let last = self.last_sequence();
        let mut counts: HashMap<AuditAction, u64> = HashMap::new();

        let mut next = 1u64;
        while next <= last {
            let to = next.saturating_add(VERIFY_CHUNK.saturating_sub(1)).min(last);
            for entry in self.store.read_range(next, to)? {
                let count = counts.entry(entry.action).or_insert(0);
                *count = count.saturating_add(1);
            }
            next = to.saturating_add(1);
        }

        Ok(counts)
    }

    /// Sequence number of the most recent committed entry (0 if none).
    #[must_use]
    pub fn last_sequence(&self) -> u64 {
        self.head.lock().map_or(0, |head| head.last_sequence)
    }

    /// Number of committed entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn len(&self) -> AuditResult<u64> {
        self.store.len()
    }

    /// Whether the chain has no entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn is_empty(&self) -> AuditResult<bool> {
        self.store.is_empty()
    }
}

impl std::fmt::Debug for AuditChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditChain")
            .field("last_sequence", &self.last_sequence())
            .finish_non_exhaustive()
    }
}

/// One page of query results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryPage {
    /// The entries on this page.
    pub entries: Vec<AuditEntry>,
    /// Total entries matching the filter, across all pages.
    pub total_matched: u64,
    /// Page size the query ran with.
    pub limit: usize,
    /// Offset the page started at.
    pub offset: usize,
}

/// Why a chain failed verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChainIssue {
    /// An entry's stored digest does not match a recomputation over its
    /// content: the entry itself was edited.
    HashMismatch {
        /// Sequence number of the edited entry.
        sequence: u64,
    },
    /// An entry's `prev_hash` does not match its predecessor's digest:
    /// an entry was replaced, reordered, or removed before this one.
    BrokenLink {
        /// Sequence number where the link breaks.
        sequence: u64,
    },
}

/// Result of a chain verification walk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainVerification {
    /// Whether every digest and link checked out.
    pub valid: bool,
    /// Sequence number of the first entry that failed, if any.
    pub broken_at: Option<u64>,
    /// Total committed entries at verification time.
    pub total_entries: u64,
    /// Sequence number of the most recent entry (0 if none).
    pub last_sequence: u64,
    /// The specific failure, if any.
    pub issue: Option<ChainIssue>,
}

impl ChainVerification {
    fn fail(&mut self, sequence: u64, issue: ChainIssue) {
        self.valid = false;
        self.broken_at = Some(sequence);
        self.issue = Some(issue);
    }
}
