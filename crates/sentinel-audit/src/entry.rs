//! Audit entry types and actions.
//!
//! Every security-relevant operation is recorded as an audit entry.
//! Entries are chain-linked: each stores the digest of the previous
//! entry and its own digest over content plus that link. Committed
//! entries are never mutated or deleted; retention is the storage
//! collaborator's concern.

use sentinel_core::{AuditEntryId, SessionId, Timestamp, UserId};
use serde::{Deserialize, Serialize};

use crate::digest::EntryDigest;

/// Version tag mixed into the canonical digest input.
/// Increment when the canonical encoding changes.
const DIGEST_FORMAT_VERSION: u8 = 0x01;

/// The closed set of auditable actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// A login attempt (successful or not).
    Login,
    /// An explicit logout.
    Logout,
    /// A session was created.
    SessionCreate,
    /// A session was invalidated.
    SessionInvalidate,
    /// An API key was created.
    ApiKeyCreate,
    /// An API key was revoked.
    ApiKeyRevoke,
    /// A tool was invoked.
    ToolUse,
    /// A chat message was processed.
    ChatMessage,
    /// A memory record was created.
    MemoryCreate,
    /// A memory record was deleted.
    MemoryDelete,
    /// A memory record was archived.
    MemoryArchive,
    /// Settings were changed.
    SettingsChange,
    /// The operating mode was changed.
    ModeChange,
    /// A sub-agent was spawned.
    AgentSpawn,
    /// A sub-agent completed.
    AgentComplete,
    /// A file was read.
    FileRead,
    /// A file was written.
    FileWrite,
    /// A shell command was executed.
    ShellExecute,
    /// A web page was browsed.
    WebBrowse,
    /// An error occurred.
    Error,
}

impl AuditAction {
    /// Stable snake_case name, identical to the serde encoding.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Logout => "logout",
            Self::SessionCreate => "session_create",
            Self::SessionInvalidate => "session_invalidate",
            Self::ApiKeyCreate => "api_key_create",
            Self::ApiKeyRevoke => "api_key_revoke",
            Self::ToolUse => "tool_use",
            Self::ChatMessage => "chat_message",
            Self::MemoryCreate => "memory_create",
            Self::MemoryDelete => "memory_delete",
            Self::MemoryArchive => "memory_archive",
            Self::SettingsChange => "settings_change",
            Self::ModeChange => "mode_change",
            Self::AgentSpawn => "agent_spawn",
            Self::AgentComplete => "agent_complete",
            Self::FileRead => "file_read",
            Self::FileWrite => "file_write",
            Self::ShellExecute => "shell_execute",
            Self::WebBrowse => "web_browse",
            Self::Error => "error",
        }
    }

    /// Human-readable phrase for log lines and admin surfaces.
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Login => "login attempt",
            Self::Logout => "logout",
            Self::SessionCreate => "session created",
            Self::SessionInvalidate => "session invalidated",
            Self::ApiKeyCreate => "API key created",
            Self::ApiKeyRevoke => "API key revoked",
            Self::ToolUse => "tool invoked",
            Self::ChatMessage => "chat message",
            Self::MemoryCreate => "memory created",
            Self::MemoryDelete => "memory deleted",
            Self::MemoryArchive => "memory archived",
            Self::SettingsChange => "settings changed",
            Self::ModeChange => "mode changed",
            Self::AgentSpawn => "agent spawned",
            Self::AgentComplete => "agent completed",
            Self::FileRead => "file read",
            Self::FileWrite => "file written",
            Self::ShellExecute => "shell command executed",
            Self::WebBrowse => "web page browsed",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single committed audit log entry.
///
/// Immutable once appended. The `hash` field is a pure function of every
/// other field except `id`, so two entries with identical content and
/// chain position always carry the same digest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Unique entry identifier (storage handle; not part of the digest).
    pub id: AuditEntryId,
    /// Strictly increasing sequence number, assigned at append time.
    pub sequence: u64,
    /// User the action is attributed to, if any.
    pub user_id: Option<UserId>,
    /// Session the action happened in, if any.
    pub session_id: Option<SessionId>,
    /// The action being audited.
    pub action: AuditAction,
    /// Resource kind the action touched (e.g. `"memory"`, `"file"`).
    pub resource: Option<String>,
    /// Identifier of the touched resource.
    pub resource_id: Option<String>,
    /// Opaque structured payload supplied by the producer.
    pub details: Option<serde_json::Value>,
    /// Whether the action succeeded.
    pub success: bool,
    /// When the entry was created.
    pub created_at: Timestamp,
    /// Digest of the previous entry ([`EntryDigest::GENESIS`] for entry 1).
    pub prev_hash: EntryDigest,
    /// Digest over this entry's content plus `prev_hash`.
    pub hash: EntryDigest,
}

/// Write a length-prefixed byte slice to the canonical buffer.
///
/// Format: 4-byte little-endian length followed by the data.
#[allow(clippy::cast_possible_truncation)]
fn write_length_prefixed(buf: &mut Vec<u8>, bytes: &[u8]) {
    // Entry fields are small; lengths always fit in u32.
    buf.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
    buf.extend_from_slice(bytes);
}

/// Write an optional string with a presence tag.
///
/// `None` and `Some("")` must encode differently, so a tag byte precedes
/// the length-prefixed payload.
fn write_opt_str(buf: &mut Vec<u8>, value: Option<&str>) {
    match value {
        Some(s) => {
            buf.push(1);
            write_length_prefixed(buf, s.as_bytes());
        },
        None => buf.push(0),
    }
}

impl AuditEntry {
    /// Canonical byte encoding of the digested fields.
    ///
    /// Covers `{sequence, user_id, session_id, action, resource,
    /// resource_id, details, success, created_at, prev_hash}` in fixed
    /// order with length prefixes, so no two distinct field combinations
    /// share an encoding. The `id` is deliberately excluded: it is a
    /// storage handle, not content.
    #[must_use]
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.push(DIGEST_FORMAT_VERSION);
        buf.extend_from_slice(&self.sequence.to_le_bytes());
        write_opt_str(&mut buf, self.user_id.as_ref().map(UserId::as_str));
        write_opt_str(&mut buf, self.session_id.as_ref().map(SessionId::as_str));
        write_length_prefixed(&mut buf, self.action.as_str().as_bytes());
        write_opt_str(&mut buf, self.resource.as_deref());
        write_opt_str(&mut buf, self.resource_id.as_deref());
        match &self.details {
            // serde_json orders map keys, so this encoding is stable.
            Some(details) => {
                buf.push(1);
                if let Ok(json) = serde_json::to_vec(details) {
                    write_length_prefixed(&mut buf, &json);
                }
            },
            None => buf.push(0),
        }
        buf.push(u8::from(self.success));
        buf.extend_from_slice(&self.created_at.0.timestamp_micros().to_le_bytes());
        buf.extend_from_slice(self.prev_hash.as_bytes());
        buf
    }

    /// Compute the digest this entry should carry.
    #[must_use]
    pub fn compute_hash(&self) -> EntryDigest {
        EntryDigest::compute(&self.canonical_bytes())
    }

    /// Whether the stored `hash` matches a recomputation over content.
    #[must_use]
    pub fn hash_is_valid(&self) -> bool {
        self.hash == self.compute_hash()
    }

    /// Whether this entry chain-links to `previous`.
    #[must_use]
    pub fn follows(&self, previous: &AuditEntry) -> bool {
        self.prev_hash == previous.hash
    }
}

/// A partial entry handed to [`crate::AuditChain::append`].
///
/// Sequence number, chain link, digest, and id are assigned at append
/// time; everything else is supplied by the producer through this
/// builder.
///
/// # Example
///
/// ```
/// use sentinel_audit::{AuditAction, EntryDraft};
///
/// let draft = EntryDraft::new(AuditAction::FileWrite)
///     .user("alice")
///     .session("sess-1")
///     .resource("file", "/tmp/report.pdf")
///     .success(true);
/// ```
#[derive(Debug, Clone)]
pub struct EntryDraft {
    pub(crate) action: AuditAction,
    pub(crate) user_id: Option<UserId>,
    pub(crate) session_id: Option<SessionId>,
    pub(crate) resource: Option<String>,
    pub(crate) resource_id: Option<String>,
    pub(crate) details: Option<serde_json::Value>,
    pub(crate) success: bool,
    pub(crate) created_at: Option<Timestamp>,
}

impl EntryDraft {
    /// Start a draft for the given action. Defaults to `success = true`.
    #[must_use]
    pub fn new(action: AuditAction) -> Self {
        Self {
            action,
            user_id: None,
            session_id: None,
            resource: None,
            resource_id: None,
            details: None,
            success: true,
            created_at: None,
        }
    }

    /// Attribute the entry to a user.
    #[must_use]
    pub fn user(mut self, user_id: impl Into<UserId>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Attach the session the action happened in.
    #[must_use]
    pub fn session(mut self, session_id: impl Into<SessionId>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Name the resource kind and identifier the action touched.
    #[must_use]
    pub fn resource(mut self, resource: impl Into<String>, resource_id: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self.resource_id = Some(resource_id.into());
        self
    }

    /// Name the resource kind without a specific identifier.
    #[must_use]
    pub fn resource_kind(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Attach an opaque structured payload.
    #[must_use]
    pub fn details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Set the success flag.
    #[must_use]
    pub fn success(mut self, success: bool) -> Self {
        self.success = success;
        self
    }

    /// Override the creation timestamp.
    ///
    /// Producers that carry their own event time (like the login
    /// monitor) set this; otherwise the append time is used.
    #[must_use]
    pub fn created_at(mut self, at: Timestamp) -> Self {
        self.created_at = Some(at);
        self
    }
}
