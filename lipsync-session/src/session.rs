//! Session aggregate
//!
//! One [`Session`] describes one generation attempt. It is owned by the
//! controller and only mutated there; consumers see [`SessionView`] copies.

use lipsync_core::domain::generation::{GenerationRequest, Mode, SubmissionResult};
use lipsync_core::domain::status::StatusSnapshot;
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

use crate::scheduler::TimerHandle;

/// Identity of one session
///
/// A fresh id is minted on every submission and reset. Results of network
/// calls are tagged with the id that was current when the call started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Ready,
    Failed,
}

/// Where a session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", content = "outcome", rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Submitting,
    Polling,
    Terminal(Outcome),
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Terminal(_))
    }

    /// Whether a network call for this session may still be outstanding
    pub fn is_active(self) -> bool {
        matches!(self, Self::Submitting | Self::Polling)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Submitting => f.write_str("submitting"),
            Self::Polling => f.write_str("polling"),
            Self::Terminal(Outcome::Ready) => f.write_str("ready"),
            Self::Terminal(Outcome::Failed) => f.write_str("failed"),
        }
    }
}

/// State of the current generation attempt
///
/// `poll_handle` is `Some` exactly while `phase` is [`Phase::Polling`].
#[derive(Debug)]
pub(crate) struct Session {
    pub(crate) id: SessionId,
    pub(crate) mode: Mode,
    pub(crate) request: Option<GenerationRequest>,
    pub(crate) submission: Option<SubmissionResult>,
    pub(crate) latest_status: Option<StatusSnapshot>,
    pub(crate) poll_handle: Option<TimerHandle>,
    pub(crate) phase: Phase,
    pub(crate) last_error: Option<String>,
    pub(crate) poll_failures: u32,
}

impl Session {
    pub(crate) fn new(mode: Mode) -> Self {
        Self {
            id: SessionId::new(),
            mode,
            request: None,
            submission: None,
            latest_status: None,
            poll_handle: None,
            phase: Phase::Idle,
            last_error: None,
            poll_failures: 0,
        }
    }

    pub(crate) fn is_current(&self, id: SessionId) -> bool {
        self.id == id
    }

    /// Forgets everything about the current attempt and mints a new id
    ///
    /// The caller must have cancelled `poll_handle` already.
    pub(crate) fn clear(&mut self) {
        debug_assert!(self.poll_handle.is_none());
        *self = Self::new(self.mode);
    }

    /// Starts a new attempt for `request`
    pub(crate) fn begin(&mut self, request: GenerationRequest) -> SessionId {
        self.clear();
        self.request = Some(request);
        self.phase = Phase::Submitting;
        self.id
    }

    pub(crate) fn start_polling(&mut self, handle: TimerHandle) {
        self.poll_handle = Some(handle);
        self.phase = Phase::Polling;
    }

    pub(crate) fn view(&self) -> SessionView {
        SessionView {
            mode: self.mode,
            phase: self.phase,
            request: self.request.clone(),
            submission: self.submission.clone(),
            latest_status: self.latest_status.clone(),
            last_error: self.last_error.clone(),
            poll_failures: self.poll_failures,
        }
    }
}

/// Read-only snapshot handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub mode: Mode,
    pub phase: Phase,
    pub request: Option<GenerationRequest>,
    pub submission: Option<SubmissionResult>,
    pub latest_status: Option<StatusSnapshot>,
    pub last_error: Option<String>,
    pub poll_failures: u32,
}

impl SessionView {
    pub fn is_settled(&self) -> bool {
        !self.phase.is_active()
    }
}
