//! Shared fixtures for integration tests.

use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{Duration, TimeZone, Utc};
use sentinel_audit::{AuditEntry, AuditError, AuditResult, AuditStore, EntryFilter};
use sentinel_core::{AuditEntryId, Timestamp};
use sentinel_monitor::LoginAttempt;

/// Deterministic timestamps offset from a fixed base.
#[allow(dead_code)]
pub fn at(offset_secs: i64) -> Timestamp {
    let base = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    Timestamp(base + Duration::seconds(offset_secs))
}

/// A login attempt with the boilerplate filled in.
#[allow(dead_code)]
pub fn login(user: &str, success: bool, ip: &str, device: &str, ts: Timestamp) -> LoginAttempt {
    LoginAttempt::new(user, success, ip, device, ts).platform("web")
}

/// An audit store the tests can misbehave with: it can fail inserts on
/// demand (a flaky durable engine) and mutate committed entries (a
/// collaborator violating the never-mutate contract).
#[derive(Default)]
#[allow(dead_code)]
pub struct InspectableStore {
    entries: RwLock<Vec<AuditEntry>>,
    fail_inserts: AtomicBool,
}

#[allow(dead_code)]
impl InspectableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent insert fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.fail_inserts.store(failing, Ordering::SeqCst);
    }

    /// Corrupt a committed entry in place.
    pub fn tamper(&self, sequence: u64, f: impl FnOnce(&mut AuditEntry)) {
        let mut entries = self.entries.write().unwrap();
        let entry = entries
            .iter_mut()
            .find(|e| e.sequence == sequence)
            .expect("no entry at sequence");
        f(entry);
    }
}

impl AuditStore for InspectableStore {
    fn insert(&self, entry: &AuditEntry) -> AuditResult<AuditEntryId> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(AuditError::Persistence("simulated write failure".to_owned()));
        }
        self.entries.write().unwrap().push(entry.clone());
        Ok(entry.id.clone())
    }

    fn read_range(&self, from_seq: u64, to_seq: u64) -> AuditResult<Vec<AuditEntry>> {
        Ok(self
            .entries
            .read()
            .unwrap()
            .iter()
            .filter(|e| e.sequence >= from_seq && e.sequence <= to_seq)
            .cloned()
            .collect())
    }

    fn read_by_filter(&self, filter: &EntryFilter) -> AuditResult<Vec<AuditEntry>> {
        Ok(self
            .entries
            .read()
            .unwrap()
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect())
    }

    fn len(&self) -> AuditResult<u64> {
        Ok(self.entries.read().unwrap().len() as u64)
    }

    fn last(&self) -> AuditResult<Option<AuditEntry>> {
        Ok(self.entries.read().unwrap().last().cloned())
    }
}
