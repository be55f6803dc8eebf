//! # Persistence Gateway
//!
//! Debounced, sans-IO save scheduling. The gateway decides *when* a save
//! must go out and tracks the status indicator; the host performs the
//! request and reports the outcome back.
//!
//! ```text
//! edit → schedule_save(now) ──600ms quiet──▶ poll(now) = true ──▶ host POST
//!                                                            │
//!                       on_save_result(ok / err) ◀───────────┘
//! ```
//!
//! Time is a millisecond clock supplied by the host on every call.

use crate::protocol::SaveResponse;

/// Quiet period before a save goes out
pub const SAVE_DEBOUNCE_MS: u64 = 600;

/// How long the "saved" indicator stays visible
pub const SAVED_VISIBLE_MS: u64 = 2_500;

/// Identifies one armed task so a stale wake-up can be told apart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

/// Cancellable single-slot timer: arming again replaces the pending task
#[derive(Debug, Default)]
pub struct Debounce {
    pending: Option<(TaskHandle, u64)>,
    generation: u64,
}

impl Debounce {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel any pending task and arm a new one due at `due_ms`
    pub fn arm(&mut self, due_ms: u64) -> TaskHandle {
        self.generation += 1;
        let handle = TaskHandle(self.generation);
        self.pending = Some((handle, due_ms));
        handle
    }

    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        matches!(self.pending, Some((h, _)) if h == handle)
    }

    pub fn deadline(&self) -> Option<u64> {
        self.pending.map(|(_, due)| due)
    }

    /// Consume the pending task if it is due
    pub fn take_due(&mut self, now_ms: u64) -> Option<TaskHandle> {
        match self.pending {
            Some((handle, due)) if now_ms >= due => {
                self.pending = None;
                Some(handle)
            }
            _ => None,
        }
    }
}

/// What the save indicator shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Hidden,
    Saving,
    Saved { hide_at: u64 },
    Failed,
}

impl SaveStatus {
    pub fn label(&self) -> Option<&'static str> {
        match self {
            SaveStatus::Hidden => None,
            SaveStatus::Saving => Some("Saving\u{2026}"),
            SaveStatus::Saved { .. } => Some("Saved \u{2713}"),
            SaveStatus::Failed => Some("Save failed"),
        }
    }

    /// CSS class used by the overlay
    pub fn class_name(&self) -> &'static str {
        match self {
            SaveStatus::Hidden => "",
            SaveStatus::Saving => "saving",
            SaveStatus::Saved { .. } => "saved",
            SaveStatus::Failed => "error",
        }
    }
}

/// Why a save did not succeed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveFailure {
    /// Request never produced a response (network error, bad body)
    Transport(String),
    /// Server answered `{ ok: false }`
    Rejected,
}

/// Debounce + indicator state machine
#[derive(Debug)]
pub struct PersistenceGateway {
    debounce: Debounce,
    status: SaveStatus,
    debounce_ms: u64,
    saved_visible_ms: u64,
}

impl PersistenceGateway {
    pub fn new() -> Self {
        Self::with_timings(SAVE_DEBOUNCE_MS, SAVED_VISIBLE_MS)
    }

    pub fn with_timings(debounce_ms: u64, saved_visible_ms: u64) -> Self {
        Self {
            debounce: Debounce::new(),
            status: SaveStatus::Hidden,
            debounce_ms,
            saved_visible_ms,
        }
    }

    /// Show "saving" and restart the debounce window
    pub fn schedule_save(&mut self, now_ms: u64) -> TaskHandle {
        self.status = SaveStatus::Saving;
        self.debounce.arm(now_ms + self.debounce_ms)
    }

    /// Skip the debounce window (explicit save): the next
    /// [`poll`](Self::poll) fires immediately
    pub fn save_now(&mut self, now_ms: u64) -> TaskHandle {
        self.status = SaveStatus::Saving;
        self.debounce.arm(now_ms)
    }

    /// Advance timers. Returns true when a save request must be sent now.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if let SaveStatus::Saved { hide_at } = self.status {
            if now_ms >= hide_at {
                self.status = SaveStatus::Hidden;
            }
        }
        self.debounce.take_due(now_ms).is_some()
    }

    pub fn on_save_result(&mut self, result: Result<SaveResponse, SaveFailure>, now_ms: u64) {
        let failure = match result {
            Ok(SaveResponse { ok: true }) => None,
            Ok(SaveResponse { ok: false }) => Some(SaveFailure::Rejected),
            Err(failure) => Some(failure),
        };
        match failure {
            None => {
                tracing::info!("edits saved");
                // still "saving" while a newer save is pending
                if self.debounce.deadline().is_none() {
                    self.status = SaveStatus::Saved {
                        hide_at: now_ms + self.saved_visible_ms,
                    };
                }
            }
            Some(failure) => {
                tracing::warn!(?failure, "saving edits failed");
                self.status = SaveStatus::Failed;
            }
        }
    }

    pub fn status(&self) -> SaveStatus {
        self.status
    }

    /// Earliest moment the host must call [`poll`](Self::poll) again
    pub fn next_deadline(&self) -> Option<u64> {
        let hide = match self.status {
            SaveStatus::Saved { hide_at } => Some(hide_at),
            _ => None,
        };
        match (self.debounce.deadline(), hide) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

impl Default for PersistenceGateway {
    fn default() -> Self {
        Self::new()
    }
}
