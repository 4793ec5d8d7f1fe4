//! Session controller
//!
//! Drives one generation attempt at a time:
//!
//! ```text
//! Idle -> Submitting -> Polling -> Terminal(Ready | Failed)
//!              |            |
//!              +-> Idle     +-> Idle (reset / mode switch / new submission)
//! ```
//!
//! Realtime submissions skip `Polling` and go straight to `Terminal(Ready)`.
//!
//! The controller is a cheap, clonable handle. Session state lives behind a
//! mutex that is never held across an `.await`; results of network calls are
//! tagged with the [`SessionId`] they were issued for and dropped when that
//! session is no longer current.

use lipsync_client::StudioApi;
use lipsync_core::domain::generation::{GenerationRequest, Mode, SubmissionResult};
use lipsync_core::domain::presenter::PresenterCatalog;
use lipsync_core::domain::status::{StatusKind, StatusSnapshot};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{Result, SessionError, ValidationError};
use crate::scheduler::{PollScheduler, SchedulerError, TimerHandle};
use crate::session::{Outcome, Phase, Session, SessionId, SessionView};

/// Shown when a submission fails without an explanation from the backend
pub const CONNECTIVITY_MESSAGE: &str =
    "Backend connection failed. Check that the studio backend is running and reachable.";

/// Shown when the provider reports that rendering failed
pub const REMOTE_FAILURE_MESSAGE: &str =
    "Video generation failed. The provider could not render this script.";

/// Client-side state machine for generation sessions
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<Inner>,
}

struct Inner {
    api: Arc<dyn StudioApi>,
    scheduler: PollScheduler,
    presenters: PresenterCatalog,
    poll_interval: Duration,
    session: Mutex<Session>,
    updates: watch::Sender<SessionView>,
}

impl SessionController {
    /// Creates a controller in async mode
    ///
    /// # Arguments
    /// * `api` - Backend collaborator
    /// * `config` - Polling interval and presenter catalog are taken from here
    pub fn new(api: Arc<dyn StudioApi>, config: &Config) -> Self {
        Self::with_mode(api, config, Mode::default())
    }

    pub fn with_mode(api: Arc<dyn StudioApi>, config: &Config, mode: Mode) -> Self {
        let session = Session::new(mode);
        let (updates, _) = watch::channel(session.view());

        Self {
            inner: Arc::new(Inner {
                api,
                scheduler: PollScheduler::new(),
                presenters: config.presenters.clone(),
                poll_interval: config.poll_interval,
                session: Mutex::new(session),
                updates,
            }),
        }
    }

    pub fn mode(&self) -> Mode {
        self.inner.lock_session().mode
    }

    pub fn presenters(&self) -> &PresenterCatalog {
        &self.inner.presenters
    }

    /// Current state of the session
    pub fn snapshot(&self) -> SessionView {
        self.inner.lock_session().view()
    }

    /// Receives a fresh [`SessionView`] after every state change
    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.inner.updates.subscribe()
    }

    /// Number of live poll timers; never more than one
    pub fn active_timers(&self) -> usize {
        self.inner.scheduler.active_count()
    }

    /// Submits a request in the current mode
    ///
    /// Any polling for a previous session is cancelled first. In async mode
    /// this returns as soon as the backend has accepted the submission; status
    /// updates arrive through [`SessionController::subscribe`].
    ///
    /// # Errors
    /// * [`SessionError::AlreadyInFlight`] while another submission is pending
    /// * [`SessionError::Validation`] for a blank script or unknown presenter
    /// * [`SessionError::Submission`] when the backend call fails
    /// * [`SessionError::Superseded`] when the session was reset meanwhile
    pub async fn submit(&self, request: GenerationRequest) -> Result<SubmissionResult> {
        let inner = &self.inner;
        let request = request.normalized();

        let (session_id, mode) = {
            let mut session = inner.lock_session();

            if session.phase == Phase::Submitting {
                return Err(SessionError::AlreadyInFlight);
            }

            // A rejected request leaves a polling session untouched
            if let Err(e) = inner.validate(&request, session.mode) {
                if session.phase != Phase::Polling {
                    session.last_error = Some(e.to_string());
                    inner.publish(&session);
                }
                return Err(e.into());
            }

            inner.cancel_polling(&mut session);
            let session_id = session.begin(request.clone());
            inner.publish(&session);

            (session_id, session.mode)
        };

        info!(
            "Submitting {} session {} (presenter: {})",
            mode, session_id, request.presenter
        );
        let result = inner.api.submit_generation(&request, mode).await;

        let mut session = inner.lock_session();
        if !session.is_current(session_id) {
            debug!("Discarding submission result for superseded session {}", session_id);
            return Err(SessionError::Superseded);
        }

        let submission = match result {
            Ok(submission) => submission,
            Err(e) => {
                error!("Submission for session {} failed: {}", session_id, e);
                let message = e
                    .detail()
                    .map(str::to_string)
                    .unwrap_or_else(|| CONNECTIVITY_MESSAGE.to_string());

                session.phase = Phase::Idle;
                session.last_error = Some(message.clone());
                inner.publish(&session);

                return Err(SessionError::Submission { message, source: e });
            }
        };

        match mode {
            Mode::Async => {
                let handle = match inner.start_polling(session_id, &submission.video_id) {
                    Ok(handle) => handle,
                    Err(e) => {
                        error!("Could not start polling for {}: {}", submission.video_id, e);
                        session.phase = Phase::Idle;
                        session.last_error = Some(e.to_string());
                        inner.publish(&session);
                        return Err(e.into());
                    }
                };

                info!(
                    "Video {} accepted (status: {}), polling every {:?}",
                    submission.video_id, submission.initial_status, inner.poll_interval
                );
                session.submission = Some(submission.clone());
                session.start_polling(handle);
            }
            Mode::Realtime => {
                info!("Live session {} is ready", submission.video_id);
                session.submission = Some(submission.clone());
                session.phase = Phase::Terminal(Outcome::Ready);
            }
        }

        inner.publish(&session);
        Ok(submission)
    }

    /// Abandons the current session and returns to `Idle`
    ///
    /// Safe to call from any phase, any number of times.
    pub fn reset(&self) {
        let mut session = self.inner.lock_session();
        self.inner.cancel_polling(&mut session);
        session.clear();
        self.inner.publish(&session);
    }

    /// Resets the session and switches to `mode`
    pub fn switch_mode(&self, mode: Mode) {
        let mut session = self.inner.lock_session();
        self.inner.cancel_polling(&mut session);
        session.mode = mode;
        session.clear();
        self.inner.publish(&session);
    }

    /// Stops all polling for good; call when the consumer goes away
    ///
    /// An in-flight submission or poll is left to finish but its result is
    /// discarded. Never panics.
    pub fn teardown(&self) {
        let mut session = self.inner.lock_session();
        self.inner.cancel_polling(&mut session);

        let stray = self.inner.scheduler.cancel_all();
        if stray > 0 {
            warn!("Cancelled {} stray poll timer(s) during teardown", stray);
        }

        if session.phase.is_active() {
            session.id = SessionId::new();
            session.phase = Phase::Idle;
        }

        self.inner.publish(&session);
    }
}

impl Inner {
    fn lock_session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, session: &Session) {
        self.updates.send_replace(session.view());
    }

    fn validate(
        &self,
        request: &GenerationRequest,
        mode: Mode,
    ) -> std::result::Result<(), ValidationError> {
        if mode == Mode::Async && request.is_blank() {
            return Err(ValidationError::EmptyScript);
        }

        if !self.presenters.contains(&request.presenter) {
            return Err(ValidationError::UnknownPresenter(request.presenter.clone()));
        }

        Ok(())
    }

    /// Cancels the session's poll timer, if any, and leaves `Polling`
    fn cancel_polling(&self, session: &mut Session) {
        if let Some(handle) = session.poll_handle.take() {
            self.scheduler.cancel(&handle);
            if session.phase == Phase::Polling {
                session.phase = Phase::Idle;
            }
        }
    }

    fn start_polling(
        self: &Arc<Self>,
        session_id: SessionId,
        video_id: &str,
    ) -> std::result::Result<TimerHandle, SchedulerError> {
        let weak: Weak<Inner> = Arc::downgrade(self);
        let video_id = video_id.to_string();

        self.scheduler.start(self.poll_interval, move || {
            let weak = weak.clone();
            let video_id = video_id.clone();
            async move {
                if let Some(inner) = weak.upgrade() {
                    inner.poll_once(session_id, &video_id).await;
                }
            }
        })
    }

    /// One scheduler tick: fetch, classify, and maybe finish the session
    async fn poll_once(&self, session_id: SessionId, video_id: &str) {
        debug!("Polling status of video {}", video_id);
        let result = self.api.fetch_status(video_id).await;

        let mut session = self.lock_session();
        if !session.is_current(session_id) || session.phase != Phase::Polling {
            debug!(
                "Discarding status of video {} for stale session {}",
                video_id, session_id
            );
            return;
        }

        let snapshot = match result {
            Ok(response) => StatusSnapshot::from(response),
            Err(e) => {
                session.poll_failures += 1;
                warn!(
                    "Status poll for video {} failed ({} so far), retrying next tick: {}",
                    video_id, session.poll_failures, e
                );
                self.publish(&session);
                return;
            }
        };

        let kind = snapshot.classified;
        debug!("Video {} reported '{}' ({})", video_id, snapshot.raw_status, kind);
        session.latest_status = Some(snapshot);

        match kind {
            StatusKind::Ready => {
                self.cancel_polling(&mut session);
                session.phase = Phase::Terminal(Outcome::Ready);
                session.last_error = None;
                info!("Video {} is ready", video_id);
            }
            StatusKind::Failed => {
                self.cancel_polling(&mut session);
                session.phase = Phase::Terminal(Outcome::Failed);
                session.last_error = Some(REMOTE_FAILURE_MESSAGE.to_string());
                warn!("Provider reported that video {} failed", video_id);
            }
            StatusKind::Unknown => {
                debug!("Unrecognized status for video {}, still polling", video_id);
            }
            StatusKind::Queued | StatusKind::Processing => {}
        }

        self.publish(&session);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lipsync_client::{ClientError, StatusResponse};
    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::sleep;

    type Scripted<T> = (Duration, std::result::Result<T, ClientError>);

    /// In-memory backend replaying scripted responses
    #[derive(Default)]
    struct FakeStudio {
        submissions: Mutex<VecDeque<Scripted<SubmissionResult>>>,
        statuses: Mutex<HashMap<String, VecDeque<Scripted<StatusResponse>>>>,
        submit_calls: AtomicUsize,
        received: Mutex<Vec<GenerationRequest>>,
        status_calls: Mutex<HashMap<String, usize>>,
    }

    impl FakeStudio {
        fn submission(
            self,
            delay: Duration,
            result: std::result::Result<SubmissionResult, ClientError>,
        ) -> Self {
            self.submissions.lock().unwrap().push_back((delay, result));
            self
        }

        fn accepts(self, video_id: &str) -> Self {
            self.submission(Duration::ZERO, Ok(accepted(video_id)))
        }

        fn status(
            self,
            video_id: &str,
            delay: Duration,
            result: std::result::Result<StatusResponse, ClientError>,
        ) -> Self {
            self.statuses
                .lock()
                .unwrap()
                .entry(video_id.to_string())
                .or_default()
                .push_back((delay, result));
            self
        }

        fn reports(self, video_id: &str, status: &str) -> Self {
            self.status(video_id, Duration::ZERO, Ok(raw(status)))
        }

        fn submit_calls(&self) -> usize {
            self.submit_calls.load(Ordering::SeqCst)
        }

        fn received_presenters(&self) -> Vec<String> {
            self.received
                .lock()
                .unwrap()
                .iter()
                .map(|request| request.presenter.clone())
                .collect()
        }

        fn status_calls(&self, video_id: &str) -> usize {
            self.status_calls
                .lock()
                .unwrap()
                .get(video_id)
                .copied()
                .unwrap_or(0)
        }
    }

    #[async_trait]
    impl StudioApi for FakeStudio {
        async fn submit_generation(
            &self,
            request: &GenerationRequest,
            _mode: Mode,
        ) -> lipsync_client::Result<SubmissionResult> {
            self.submit_calls.fetch_add(1, Ordering::SeqCst);
            self.received.lock().unwrap().push(request.clone());
            let scripted = self.submissions.lock().unwrap().pop_front();
            let (delay, result) = scripted.expect("unexpected submission");
            sleep(delay).await;
            result
        }

        async fn fetch_status(&self, video_id: &str) -> lipsync_client::Result<StatusResponse> {
            *self
                .status_calls
                .lock()
                .unwrap()
                .entry(video_id.to_string())
                .or_default() += 1;

            let scripted = self
                .statuses
                .lock()
                .unwrap()
                .get_mut(video_id)
                .and_then(|queue| queue.pop_front());

            match scripted {
                Some((delay, result)) => {
                    sleep(delay).await;
                    result
                }
                None => Ok(raw("processing")),
            }
        }
    }

    fn accepted(video_id: &str) -> SubmissionResult {
        SubmissionResult {
            video_id: video_id.to_string(),
            initial_status: "queued".to_string(),
            thumbnail_url: None,
            hosted_url: None,
            session_token: None,
        }
    }

    fn raw(status: &str) -> StatusResponse {
        StatusResponse {
            status: status.to_string(),
            result_url: None,
            stream_url: None,
            download_url: None,
        }
    }

    fn unreachable() -> ClientError {
        ClientError::api_error(502, "Bad Gateway", None)
    }

    fn controller(studio: &Arc<FakeStudio>) -> SessionController {
        let api: Arc<dyn StudioApi> = studio.clone();
        SessionController::new(api, &Config::default())
    }

    fn current_handle(controller: &SessionController) -> Option<TimerHandle> {
        controller.inner.lock_session().poll_handle
    }

    fn hello() -> GenerationRequest {
        GenerationRequest::new("Hello world", "emma")
    }

    const TICK: Duration = Duration::from_millis(5000);
    const SETTLE: Duration = Duration::from_millis(10);

    #[tokio::test(start_paused = true)]
    async fn test_async_session_polls_until_ready() {
        let studio = Arc::new(
            FakeStudio::default()
                .accepts("v1")
                .reports("v1", "processing")
                .status(
                    "v1",
                    Duration::ZERO,
                    Ok(StatusResponse {
                        result_url: Some("https://x/v1.mp4".to_string()),
                        ..raw("done")
                    }),
                ),
        );
        let controller = controller(&studio);

        let submission = controller.submit(hello()).await.unwrap();
        assert_eq!(submission.video_id, "v1");

        let view = controller.snapshot();
        assert_eq!(view.phase, Phase::Polling);
        assert!(view.latest_status.is_none());
        assert_eq!(controller.active_timers(), 1);

        sleep(SETTLE).await;
        let view = controller.snapshot();
        assert_eq!(view.phase, Phase::Polling);
        assert_eq!(
            view.latest_status.as_ref().map(|s| s.classified),
            Some(StatusKind::Processing)
        );

        sleep(TICK).await;
        let view = controller.snapshot();
        assert_eq!(view.phase, Phase::Terminal(Outcome::Ready));
        let status = view.latest_status.unwrap();
        assert_eq!(status.result_url.as_deref(), Some("https://x/v1.mp4"));
        assert_eq!(controller.active_timers(), 0);
        assert!(view.last_error.is_none());

        sleep(TICK * 4).await;
        assert_eq!(studio.status_calls("v1"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_script_is_rejected_without_network_call() {
        let studio = Arc::new(FakeStudio::default());
        let controller = controller(&studio);

        let err = controller
            .submit(GenerationRequest::new("   ", "emma"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SessionError::Validation(ValidationError::EmptyScript)
        ));
        assert_eq!(studio.submit_calls(), 0);

        let view = controller.snapshot();
        assert_eq!(view.phase, Phase::Idle);
        assert_eq!(view.last_error, Some(ValidationError::EmptyScript.to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_presenter_is_rejected() {
        let studio = Arc::new(FakeStudio::default());
        let controller = controller(&studio);

        let err = controller
            .submit(GenerationRequest::new("Hello world", "nobody"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SessionError::Validation(ValidationError::UnknownPresenter(ref id)) if id == "nobody"
        ));
        assert_eq!(studio.submit_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_presenter_is_trimmed_before_sending() {
        let studio = Arc::new(FakeStudio::default().accepts("v1"));
        let controller = controller(&studio);

        controller
            .submit(GenerationRequest::new("Hello world", " emma "))
            .await
            .unwrap();

        assert_eq!(studio.received_presenters(), vec!["emma".to_string()]);
        let view = controller.snapshot();
        assert_eq!(view.request.map(|r| r.presenter).as_deref(), Some("emma"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_submit_while_polling_leaves_session_untouched() {
        let studio = Arc::new(
            FakeStudio::default()
                .accepts("v1")
                .reports("v1", "processing")
                .reports("v1", "done"),
        );
        let controller = controller(&studio);

        controller.submit(hello()).await.unwrap();
        sleep(SETTLE).await;
        let before = controller.snapshot();

        let err = controller
            .submit(GenerationRequest::new("  ", "emma"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Validation(ValidationError::EmptyScript)
        ));
        assert_eq!(controller.snapshot(), before);
        assert_eq!(studio.submit_calls(), 1);

        sleep(TICK).await;
        let view = controller.snapshot();
        assert_eq!(view.phase, Phase::Terminal(Outcome::Ready));
        assert!(view.last_error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_start_failure_keeps_no_submission() {
        let studio = Arc::new(FakeStudio::default().accepts("v1"));
        let config = Config {
            poll_interval: Duration::ZERO,
            ..Config::default()
        };
        let api: Arc<dyn StudioApi> = studio.clone();
        let controller = SessionController::new(api, &config);

        let err = controller.submit(hello()).await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::Scheduler(SchedulerError::InvalidInterval)
        ));

        let view = controller.snapshot();
        assert_eq!(view.phase, Phase::Idle);
        assert!(view.submission.is_none());
        assert_eq!(
            view.last_error,
            Some(SchedulerError::InvalidInterval.to_string())
        );
        assert_eq!(controller.active_timers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_poll_failure_keeps_polling() {
        let studio = Arc::new(
            FakeStudio::default()
                .accepts("v1")
                .status("v1", Duration::ZERO, Err(unreachable()))
                .reports("v1", "processing"),
        );
        let controller = controller(&studio);

        controller.submit(hello()).await.unwrap();

        sleep(SETTLE).await;
        let view = controller.snapshot();
        assert_eq!(view.phase, Phase::Polling);
        assert_eq!(view.poll_failures, 1);
        assert!(view.latest_status.is_none());
        assert!(view.last_error.is_none());
        assert_eq!(controller.active_timers(), 1);

        sleep(TICK).await;
        let view = controller.snapshot();
        assert_eq!(view.phase, Phase::Polling);
        assert_eq!(
            view.latest_status.map(|s| s.classified),
            Some(StatusKind::Processing)
        );
        assert_eq!(studio.status_calls("v1"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resubmit_while_polling_discards_stale_poll() {
        let studio = Arc::new(
            FakeStudio::default()
                .accepts("v1")
                .accepts("v2")
                .status("v1", Duration::from_secs(3), Ok(raw("done")))
                .reports("v2", "processing"),
        );
        let controller = controller(&studio);

        controller.submit(hello()).await.unwrap();
        assert_eq!(controller.active_timers(), 1);
        let first = current_handle(&controller).unwrap();

        // v1's first poll is now in flight for 3s
        sleep(Duration::from_secs(1)).await;
        assert_eq!(studio.status_calls("v1"), 1);

        controller
            .submit(GenerationRequest::new("Second take", "leo"))
            .await
            .unwrap();
        assert_eq!(controller.active_timers(), 1);

        // The first timer was cancelled by the resubmit and only by it
        let second = current_handle(&controller).unwrap();
        assert_ne!(first, second);
        assert!(!controller.inner.scheduler.is_active(&first));
        assert!(!controller.inner.scheduler.cancel(&first));
        assert!(controller.inner.scheduler.is_active(&second));

        sleep(Duration::from_secs(3)).await;
        let view = controller.snapshot();
        assert_eq!(view.phase, Phase::Polling);
        assert_eq!(view.submission.map(|s| s.video_id).as_deref(), Some("v2"));
        assert_eq!(view.latest_status.map(|s| s.raw_status).as_deref(), Some("processing"));
        assert_eq!(controller.active_timers(), 1);

        sleep(TICK * 3).await;
        assert_eq!(studio.status_calls("v1"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remote_failure_is_terminal() {
        let studio = Arc::new(FakeStudio::default().accepts("v1").reports("v1", "Error"));
        let controller = controller(&studio);

        controller.submit(hello()).await.unwrap();
        sleep(SETTLE).await;

        let view = controller.snapshot();
        assert_eq!(view.phase, Phase::Terminal(Outcome::Failed));
        assert_eq!(view.last_error.as_deref(), Some(REMOTE_FAILURE_MESSAGE));
        assert_eq!(controller.active_timers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_status_keeps_polling() {
        let studio = Arc::new(
            FakeStudio::default()
                .accepts("v1")
                .reports("v1", "uploading")
                .reports("v1", "completed"),
        );
        let controller = controller(&studio);

        controller.submit(hello()).await.unwrap();
        sleep(SETTLE).await;
        let view = controller.snapshot();
        assert_eq!(view.phase, Phase::Polling);
        assert_eq!(
            view.latest_status.map(|s| s.classified),
            Some(StatusKind::Unknown)
        );

        sleep(TICK).await;
        assert_eq!(controller.snapshot().phase, Phase::Terminal(Outcome::Ready));
    }

    #[tokio::test(start_paused = true)]
    async fn test_submission_failure_surfaces_backend_detail() {
        let studio = Arc::new(FakeStudio::default().submission(
            Duration::ZERO,
            Err(ClientError::api_error(
                422,
                "Script too long",
                Some("Script too long".to_string()),
            )),
        ));
        let controller = controller(&studio);

        let err = controller.submit(hello()).await.unwrap_err();
        assert!(matches!(err, SessionError::Submission { ref message, .. } if message == "Script too long"));

        let view = controller.snapshot();
        assert_eq!(view.phase, Phase::Idle);
        assert_eq!(view.last_error.as_deref(), Some("Script too long"));
        assert_eq!(controller.active_timers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submission_failure_without_detail_uses_generic_message() {
        let studio = Arc::new(FakeStudio::default().submission(
            Duration::ZERO,
            Err(ClientError::ParseError("not json".to_string())),
        ));
        let controller = controller(&studio);

        controller.submit(hello()).await.unwrap_err();
        assert_eq!(
            controller.snapshot().last_error.as_deref(),
            Some(CONNECTIVITY_MESSAGE)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_submit_clears_previous_error() {
        let studio = Arc::new(
            FakeStudio::default()
                .submission(Duration::ZERO, Err(unreachable()))
                .accepts("v1"),
        );
        let controller = controller(&studio);

        controller.submit(hello()).await.unwrap_err();
        assert!(controller.snapshot().last_error.is_some());

        controller.submit(hello()).await.unwrap();
        assert!(controller.snapshot().last_error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reentrant_submit_is_rejected() {
        let studio = Arc::new(
            FakeStudio::default().submission(Duration::from_secs(2), Ok(accepted("v1"))),
        );
        let controller = controller(&studio);

        let pending = tokio::spawn({
            let controller = controller.clone();
            async move { controller.submit(hello()).await }
        });

        sleep(SETTLE).await;
        assert_eq!(controller.snapshot().phase, Phase::Submitting);

        let err = controller.submit(hello()).await.unwrap_err();
        assert!(matches!(err, SessionError::AlreadyInFlight));

        let submission = pending.await.unwrap().unwrap();
        assert_eq!(submission.video_id, "v1");
        assert_eq!(studio.submit_calls(), 1);
        assert_eq!(controller.snapshot().phase, Phase::Polling);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_during_submission_discards_result() {
        let studio = Arc::new(
            FakeStudio::default().submission(Duration::from_secs(2), Ok(accepted("v1"))),
        );
        let controller = controller(&studio);

        let pending = tokio::spawn({
            let controller = controller.clone();
            async move { controller.submit(hello()).await }
        });

        sleep(SETTLE).await;
        controller.reset();

        let err = pending.await.unwrap().unwrap_err();
        assert!(matches!(err, SessionError::Superseded));

        let view = controller.snapshot();
        assert_eq!(view.phase, Phase::Idle);
        assert!(view.submission.is_none());
        assert_eq!(controller.active_timers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_realtime_session_skips_polling() {
        let studio = Arc::new(FakeStudio::default().accepts("conv_1"));
        let controller = controller(&studio);
        controller.switch_mode(Mode::Realtime);

        let submission = controller
            .submit(GenerationRequest::new("", "emma"))
            .await
            .unwrap();
        assert_eq!(submission.video_id, "conv_1");

        let view = controller.snapshot();
        assert_eq!(view.mode, Mode::Realtime);
        assert_eq!(view.phase, Phase::Terminal(Outcome::Ready));
        assert_eq!(controller.active_timers(), 0);

        sleep(TICK * 2).await;
        assert_eq!(studio.status_calls("conv_1"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_switch_mode_cancels_polling() {
        let studio = Arc::new(FakeStudio::default().accepts("v1"));
        let controller = controller(&studio);

        controller.submit(hello()).await.unwrap();
        sleep(SETTLE).await;
        assert_eq!(controller.active_timers(), 1);

        controller.switch_mode(Mode::Realtime);
        let view = controller.snapshot();
        assert_eq!(view.mode, Mode::Realtime);
        assert_eq!(view.phase, Phase::Idle);
        assert!(view.submission.is_none());
        assert!(view.latest_status.is_none());
        assert!(view.request.is_none());
        assert_eq!(controller.active_timers(), 0);

        sleep(TICK * 3).await;
        assert_eq!(studio.status_calls("v1"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_and_teardown_are_idempotent() {
        let studio = Arc::new(FakeStudio::default().accepts("v1"));
        let controller = controller(&studio);

        controller.reset();
        controller.reset();
        controller.teardown();
        controller.teardown();
        assert_eq!(controller.snapshot().phase, Phase::Idle);

        controller.submit(hello()).await.unwrap();
        sleep(SETTLE).await;

        controller.reset();
        let once = controller.snapshot();
        controller.reset();
        assert_eq!(controller.snapshot(), once);
        assert_eq!(once.phase, Phase::Idle);
        assert_eq!(controller.active_timers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_stops_polling() {
        let studio = Arc::new(FakeStudio::default().accepts("v1"));
        let controller = controller(&studio);

        controller.submit(hello()).await.unwrap();
        sleep(SETTLE).await;

        controller.teardown();
        let once = controller.snapshot();
        controller.teardown();
        assert_eq!(controller.snapshot(), once);
        assert_eq!(once.phase, Phase::Idle);
        assert_eq!(controller.active_timers(), 0);

        sleep(TICK * 3).await;
        assert_eq!(studio.status_calls("v1"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_during_submission_never_starts_polling() {
        let studio = Arc::new(
            FakeStudio::default().submission(Duration::from_secs(2), Ok(accepted("v1"))),
        );
        let controller = controller(&studio);

        let pending = tokio::spawn({
            let controller = controller.clone();
            async move { controller.submit(hello()).await }
        });

        sleep(SETTLE).await;
        controller.teardown();

        assert!(matches!(
            pending.await.unwrap(),
            Err(SessionError::Superseded)
        ));
        assert_eq!(controller.active_timers(), 0);
        assert_eq!(studio.status_calls("v1"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_controller_stops_polling() {
        let studio = Arc::new(FakeStudio::default().accepts("v1"));
        let controller = controller(&studio);

        controller.submit(hello()).await.unwrap();
        sleep(SETTLE).await;
        drop(controller);

        sleep(TICK * 3).await;
        assert_eq!(studio.status_calls("v1"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_more_than_one_timer() {
        let studio = Arc::new(
            FakeStudio::default()
                .accepts("v1")
                .accepts("v2")
                .accepts("v3"),
        );
        let controller = controller(&studio);

        for _ in 0..3 {
            controller.submit(hello()).await.unwrap();
            assert_eq!(controller.active_timers(), 1);
            sleep(Duration::from_millis(1200)).await;
            assert_eq!(controller.active_timers(), 1);
        }

        assert_eq!(studio.status_calls("v1"), 1);
        assert_eq!(studio.status_calls("v2"), 1);
        assert_eq!(studio.status_calls("v3"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_each_transition() {
        let studio = Arc::new(FakeStudio::default().accepts("v1").reports("v1", "ready"));
        let controller = controller(&studio);
        let mut updates = controller.subscribe();

        controller.submit(hello()).await.unwrap();
        assert_eq!(updates.borrow_and_update().phase, Phase::Polling);

        updates.changed().await.unwrap();
        assert_eq!(
            updates.borrow_and_update().phase,
            Phase::Terminal(Outcome::Ready)
        );
    }
}
