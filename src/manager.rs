// File: src/manager.rs
use crate::client::{ApiError, EventApi};
use crate::model::{Event, EventDraft, EventId};
use crate::store::EventStore;
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;

/// How long a success notice stays on screen.
pub const NOTICE_DURATION: Duration = Duration::from_millis(3000);

/// Whether the form creates a new record or edits an existing one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Creating,
    Editing(EventId),
}

impl Mode {
    pub fn editing_id(&self) -> Option<&EventId> {
        match self {
            Mode::Creating => None,
            Mode::Editing(id) => Some(id),
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match self {
            Mode::Creating => "Create Event",
            Mode::Editing(_) => "Update Event",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub level: NoticeLevel,
    pub duration: Duration,
}

impl Notice {
    pub fn success(title: &str) -> Self {
        Self {
            title: title.to_string(),
            level: NoticeLevel::Success,
            duration: NOTICE_DURATION,
        }
    }
}

/// What pressing the form's submit button should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Create(EventDraft),
    Update(EventId, EventDraft),
}

/// One round trip against the collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    List,
    Create(EventDraft),
    Update(EventId, EventDraft),
    Delete(EventId),
}

impl Request {
    /// The record this request is about, if it targets an existing one.
    pub fn target(&self) -> Option<&EventId> {
        match self {
            Request::List | Request::Create(_) => None,
            Request::Update(id, _) | Request::Delete(id) => Some(id),
        }
    }
}

impl From<Submission> for Request {
    fn from(submission: Submission) -> Self {
        match submission {
            Submission::Create(draft) => Request::Create(draft),
            Submission::Update(id, draft) => Request::Update(id, draft),
        }
    }
}

/// What came back for a [`Request`]. Fed to [`EditorState::apply`].
#[derive(Debug)]
pub enum Outcome {
    Listed(Vec<Event>),
    Created(Event),
    Updated { id: EventId, event: Event },
    Deleted(EventId),
    Failed { id: Option<EventId>, error: ApiError },
}

/// Runs one request. Failures are logged here and handed back as
/// [`Outcome::Failed`]; the caller decides what the user sees.
pub async fn execute<A: EventApi + ?Sized>(api: &A, request: Request) -> Outcome {
    let id = request.target().cloned();
    let what = match &request {
        Request::List => "fetching events",
        Request::Create(_) => "creating event",
        Request::Update(..) => "updating event",
        Request::Delete(_) => "deleting event",
    };

    let result = match request {
        Request::List => api.list_events().await.map(|events| {
            log::info!("Loaded {} events", events.len());
            Outcome::Listed(events)
        }),
        Request::Create(draft) => api.create_event(&draft).await.map(Outcome::Created),
        Request::Update(id, draft) => api
            .update_event(&id, &draft)
            .await
            .map(|event| Outcome::Updated { id, event }),
        Request::Delete(id) => api.delete_event(&id).await.map(|()| Outcome::Deleted(id)),
    };

    result.unwrap_or_else(|error| {
        log::error!("Error {}: {}", what, error);
        Outcome::Failed { id, error }
    })
}

#[derive(Debug, Error)]
pub enum ManagerError {
    #[error(transparent)]
    Request(#[from] ApiError),
    #[error("event {0} is not the one being edited")]
    NotEditing(EventId),
}

/// All client-side state: the mirrored list, the form and its mode,
/// per-record in-flight markers, and notices waiting to be shown.
///
/// The `apply_*` methods are the reconciliation rules run after a request
/// succeeds. They never talk to the network.
#[derive(Debug, Clone, Default)]
pub struct EditorState {
    pub store: EventStore,
    pub mode: Mode,
    pub draft: EventDraft,
    pending: HashSet<EventId>,
    notices: Vec<Notice>,
}

impl EditorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[Event] {
        self.store.events()
    }

    pub fn start_editing(&mut self, event: &Event) {
        self.mode = Mode::Editing(event.id.clone());
        self.draft = EventDraft::from_event(event);
    }

    pub fn cancel_editing(&mut self) {
        self.mode = Mode::Creating;
        self.draft.clear();
    }

    pub fn submission(&self) -> Submission {
        match &self.mode {
            Mode::Creating => Submission::Create(self.draft.clone()),
            Mode::Editing(id) => Submission::Update(id.clone(), self.draft.clone()),
        }
    }

    /// Marks `id` as having a request in flight. Returns `false` if one already is.
    pub fn begin_request(&mut self, id: &EventId) -> bool {
        self.pending.insert(id.clone())
    }

    pub fn finish_request(&mut self, id: &EventId) {
        self.pending.remove(id);
    }

    pub fn is_pending(&self, id: &EventId) -> bool {
        self.pending.contains(id)
    }

    pub fn apply_listed(&mut self, events: Vec<Event>) {
        self.store.replace_all(events);
    }

    pub fn apply_created(&mut self, event: Event) {
        self.store.append(event);
        self.draft.clear();
        self.notices.push(Notice::success("Event created"));
    }

    pub fn apply_updated(&mut self, event: Event) {
        if self.store.replace(event).is_none() {
            log::warn!("Updated event is not in the local list");
        }
        self.draft.clear();
        self.mode = Mode::Creating;
        self.notices.push(Notice::success("Event updated"));
    }

    pub fn apply_deleted(&mut self, id: &EventId) {
        self.store.remove(id);
        if self.mode.editing_id() == Some(id) {
            self.cancel_editing();
        }
        self.notices.push(Notice::success("Event deleted"));
    }

    /// Applies a request's outcome: clears its in-flight marker, then runs
    /// the matching rule. A failure changes nothing else and is returned.
    pub fn apply(&mut self, outcome: Outcome) -> Result<(), ApiError> {
        match outcome {
            Outcome::Listed(events) => self.apply_listed(events),
            Outcome::Created(event) => self.apply_created(event),
            Outcome::Updated { id, event } => {
                self.finish_request(&id);
                self.apply_updated(event);
            }
            Outcome::Deleted(id) => {
                self.finish_request(&id);
                self.apply_deleted(&id);
            }
            Outcome::Failed { id, error } => {
                if let Some(id) = id {
                    self.finish_request(&id);
                }
                return Err(error);
            }
        }
        Ok(())
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}

/// Drives an [`EditorState`] against a remote collection.
///
/// Every operation goes through [`execute`] and [`EditorState::apply`], the
/// same path the TUI's network task uses. Failures are logged and leave the
/// state untouched. Operations take `&mut self`, so they never overlap.
pub struct EventManager<A> {
    api: A,
    state: EditorState,
}

impl<A: EventApi> EventManager<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            state: EditorState::new(),
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn events(&self) -> &[Event] {
        self.state.events()
    }

    pub fn mode(&self) -> &Mode {
        &self.state.mode
    }

    pub fn draft(&self) -> &EventDraft {
        &self.state.draft
    }

    pub fn set_draft(&mut self, name: &str, description: &str) {
        self.state.draft = EventDraft::new(name, description);
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.state.take_notices()
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    async fn run(&mut self, request: Request) -> Result<(), ManagerError> {
        let outcome = execute(&self.api, request).await;
        self.state.apply(outcome)?;
        Ok(())
    }

    pub async fn list(&mut self) -> Result<(), ManagerError> {
        self.run(Request::List).await
    }

    /// Sends `draft` as a new record. The form's draft is cleared only once
    /// the server has accepted it.
    pub async fn create(&mut self, draft: EventDraft) -> Result<(), ManagerError> {
        self.run(Request::Create(draft)).await
    }

    /// Sends `draft` as the new content of `id`, which must be the record
    /// loaded by [`EventManager::start_editing`].
    pub async fn update(&mut self, id: &EventId, draft: EventDraft) -> Result<(), ManagerError> {
        if self.state.mode.editing_id() != Some(id) {
            log::error!("Refusing to update event {}: not being edited", id);
            return Err(ManagerError::NotEditing(id.clone()));
        }
        self.run(Request::Update(id.clone(), draft)).await
    }

    pub async fn delete(&mut self, id: &EventId) -> Result<(), ManagerError> {
        self.run(Request::Delete(id.clone())).await
    }

    pub fn start_editing(&mut self, event: &Event) {
        self.state.start_editing(event);
    }

    pub fn cancel_editing(&mut self) {
        self.state.cancel_editing();
    }

    /// Creates or updates depending on the current mode.
    pub async fn submit(&mut self) -> Result<(), ManagerError> {
        match self.state.submission() {
            Submission::Create(draft) => self.create(draft).await,
            Submission::Update(id, draft) => self.update(&id, draft).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use http::StatusCode;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

    /// In-memory collection standing in for the server.
    #[derive(Default)]
    struct FakeApi {
        events: Mutex<Vec<Event>>,
        next_id: AtomicI64,
        fail: AtomicBool,
        calls: Mutex<Vec<String>>,
    }

    impl FakeApi {
        fn with(events: Vec<Event>) -> Self {
            Self {
                events: Mutex::new(events),
                next_id: AtomicI64::new(5),
                ..Default::default()
            }
        }

        fn set_failing(&self, fail: bool) {
            self.fail.store(fail, Ordering::SeqCst);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: String) -> Result<(), ApiError> {
            self.calls.lock().unwrap().push(call);
            if self.fail.load(Ordering::SeqCst) {
                return Err(ApiError::Status {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: "boom".to_string(),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl EventApi for FakeApi {
        async fn list_events(&self) -> Result<Vec<Event>, ApiError> {
            self.record("GET".to_string())?;
            Ok(self.events.lock().unwrap().clone())
        }

        async fn create_event(&self, draft: &EventDraft) -> Result<Event, ApiError> {
            self.record(format!("POST {}", draft.name))?;
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            let event = Event::new(id, &draft.name, &draft.description);
            self.events.lock().unwrap().push(event.clone());
            Ok(event)
        }

        async fn update_event(&self, id: &EventId, draft: &EventDraft) -> Result<Event, ApiError> {
            self.record(format!("PUT {}", id))?;
            let mut events = self.events.lock().unwrap();
            let found = events
                .iter_mut()
                .find(|e| e.id == *id)
                .ok_or(ApiError::Status {
                    status: StatusCode::NOT_FOUND,
                    body: String::new(),
                })?;
            found.attributes.name = draft.name.clone();
            found.attributes.description = draft.description.clone();
            Ok(found.clone())
        }

        async fn delete_event(&self, id: &EventId) -> Result<(), ApiError> {
            self.record(format!("DELETE {}", id))?;
            self.events.lock().unwrap().retain(|e| e.id != *id);
            Ok(())
        }
    }

    fn three() -> Vec<Event> {
        vec![
            Event::new(1, "A", "a"),
            Event::new(2, "B", "b"),
            Event::new(3, "C", "c"),
        ]
    }

    async fn loaded(events: Vec<Event>) -> EventManager<FakeApi> {
        let mut manager = EventManager::new(FakeApi::with(events));
        manager.list().await.unwrap();
        manager
    }

    #[tokio::test]
    async fn test_list_replaces_everything() {
        let mut manager = EventManager::new(FakeApi::with(vec![Event::new(1, "A", "d")]));
        manager.state.apply_listed(vec![Event::new(99, "stale", "")]);

        manager.list().await.unwrap();

        assert_eq!(manager.events(), &[Event::new(1, "A", "d")]);
    }

    #[tokio::test]
    async fn test_failed_list_keeps_state() {
        let mut manager = loaded(three()).await;
        manager.api().set_failing(true);

        assert!(manager.list().await.is_err());
        assert_eq!(manager.events(), three().as_slice());
    }

    #[tokio::test]
    async fn test_create_appends_and_clears_draft() {
        let mut manager = loaded(three()).await;
        manager.set_draft("X", "Y");

        manager.create(manager.draft().clone()).await.unwrap();

        assert_eq!(manager.events().len(), 4);
        assert_eq!(manager.events()[3], Event::new(5, "X", "Y"));
        assert!(manager.draft().is_empty());
        assert_eq!(
            manager.take_notices(),
            vec![Notice::success("Event created")]
        );
    }

    #[tokio::test]
    async fn test_create_accepts_empty_draft() {
        let mut manager = loaded(vec![]).await;
        manager.create(EventDraft::default()).await.unwrap();
        assert_eq!(manager.events()[0].name(), "");
    }

    #[tokio::test]
    async fn test_create_sends_given_draft() {
        let mut manager = loaded(vec![]).await;
        manager.set_draft("typed", "in form");

        manager.create(EventDraft::new("Other", "")).await.unwrap();

        assert_eq!(manager.api().calls(), vec!["GET", "POST Other"]);
        assert_eq!(manager.events()[0], Event::new(5, "Other", ""));
        assert!(manager.draft().is_empty());
    }

    #[tokio::test]
    async fn test_failed_create_keeps_list_and_draft() {
        let mut manager = loaded(three()).await;
        manager.set_draft("X", "Y");
        manager.api().set_failing(true);

        let err = manager.create(EventDraft::new("X", "Y")).await.unwrap_err();

        assert!(matches!(err, ManagerError::Request(_)));
        assert_eq!(manager.events(), three().as_slice());
        assert_eq!(manager.draft(), &EventDraft::new("X", "Y"));
        assert!(manager.take_notices().is_empty());
    }

    #[tokio::test]
    async fn test_two_creates_issue_two_requests() {
        let mut manager = loaded(vec![]).await;
        manager.create(EventDraft::new("X", "Y")).await.unwrap();
        manager.create(EventDraft::new("X", "Y")).await.unwrap();

        assert_eq!(manager.api().calls(), vec!["GET", "POST X", "POST X"]);
        assert_eq!(manager.events().len(), 2);
        assert_ne!(manager.events()[0].id, manager.events()[1].id);
    }

    #[tokio::test]
    async fn test_update_replaces_in_place() {
        let mut manager = loaded(three()).await;
        let target = manager.events()[1].clone();

        manager.start_editing(&target);
        assert_eq!(manager.mode(), &Mode::Editing(EventId::from(2)));
        assert_eq!(manager.draft(), &EventDraft::new("B", "b"));

        manager.set_draft("B2", "new");
        manager.submit().await.unwrap();

        assert_eq!(manager.events()[1], Event::new(2, "B2", "new"));
        assert_eq!(manager.events()[0].name(), "A");
        assert_eq!(manager.events()[2].name(), "C");
        assert_eq!(manager.mode(), &Mode::Creating);
        assert!(manager.draft().is_empty());
    }

    #[tokio::test]
    async fn test_failed_update_keeps_edit_state() {
        let mut manager = loaded(three()).await;
        let target = manager.events()[0].clone();
        manager.start_editing(&target);
        manager.set_draft("A2", "");
        manager.api().set_failing(true);

        assert!(manager.submit().await.is_err());

        assert_eq!(manager.mode(), &Mode::Editing(EventId::from(1)));
        assert_eq!(manager.draft(), &EventDraft::new("A2", ""));
        assert_eq!(manager.events()[0].name(), "A");
        assert!(!manager.state().is_pending(&EventId::from(1)));
    }

    #[tokio::test]
    async fn test_update_requires_edit_state() {
        let mut manager = loaded(three()).await;

        let err = manager
            .update(&EventId::from(2), EventDraft::new("B2", ""))
            .await
            .unwrap_err();

        assert!(matches!(err, ManagerError::NotEditing(_)));
        assert_eq!(manager.api().calls(), vec!["GET"]);
    }

    #[tokio::test]
    async fn test_delete_removes_one_keeps_order() {
        let mut manager = loaded(three()).await;

        manager.delete(&EventId::from(2)).await.unwrap();

        let names: Vec<&str> = manager.events().iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["A", "C"]);
        assert_eq!(
            manager.take_notices(),
            vec![Notice::success("Event deleted")]
        );
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_list() {
        let mut manager = loaded(three()).await;
        manager.api().set_failing(true);

        assert!(manager.delete(&EventId::from(2)).await.is_err());
        assert_eq!(manager.events().len(), 3);
    }

    #[tokio::test]
    async fn test_deleting_edited_event_clears_edit_state() {
        let mut manager = loaded(three()).await;
        let target = manager.events()[2].clone();
        manager.start_editing(&target);

        manager.delete(&EventId::from(3)).await.unwrap();

        assert_eq!(manager.mode(), &Mode::Creating);
        assert!(manager.draft().is_empty());
    }

    #[tokio::test]
    async fn test_deleting_other_event_keeps_edit_state() {
        let mut manager = loaded(three()).await;
        let target = manager.events()[2].clone();
        manager.start_editing(&target);

        manager.delete(&EventId::from(1)).await.unwrap();

        assert_eq!(manager.mode(), &Mode::Editing(EventId::from(3)));
        assert_eq!(manager.draft().name, "C");
    }

    #[tokio::test]
    async fn test_unreachable_server_leaves_state() {
        use crate::client::RestClient;

        // Nothing listens on port 1
        let client = RestClient::new("http://127.0.0.1:1", None, false).unwrap();
        let mut manager = EventManager::new(client);
        manager.set_draft("X", "Y");

        let err = manager.create(manager.draft().clone()).await.unwrap_err();

        assert!(matches!(
            err,
            ManagerError::Request(ApiError::Transport(_))
        ));
        assert!(manager.events().is_empty());
        assert_eq!(manager.draft(), &EventDraft::new("X", "Y"));
        assert!(manager.take_notices().is_empty());

        assert!(manager.list().await.is_err());
        assert!(manager.events().is_empty());
    }

    #[tokio::test]
    async fn test_execute_reports_target_of_failure() {
        let api = FakeApi::with(three());
        api.set_failing(true);

        match execute(&api, Request::Delete(EventId::from(2))).await {
            Outcome::Failed { id, error } => {
                assert_eq!(id, Some(EventId::from(2)));
                assert!(matches!(error, ApiError::Status { .. }));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        match execute(&api, Request::List).await {
            Outcome::Failed { id, .. } => assert_eq!(id, None),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_apply_clears_in_flight_marker() {
        let mut state = EditorState::new();
        state.apply_listed(three());
        let id = EventId::from(1);

        assert!(state.begin_request(&id));
        assert!(!state.begin_request(&id));

        let failed = Outcome::Failed {
            id: Some(id.clone()),
            error: ApiError::Body("reset".to_string()),
        };
        assert!(state.apply(failed).is_err());
        assert!(!state.is_pending(&id));
        assert_eq!(state.events().len(), 3);

        assert!(state.begin_request(&id));
        state.apply(Outcome::Deleted(id.clone())).unwrap();
        assert!(!state.is_pending(&id));
        assert_eq!(state.events().len(), 2);
    }

    #[test]
    fn test_submission_becomes_request() {
        let create = Request::from(Submission::Create(EventDraft::new("n", "")));
        assert_eq!(create.target(), None);

        let update = Request::from(Submission::Update(EventId::from(4), EventDraft::new("n", "")));
        assert_eq!(update.target(), Some(&EventId::from(4)));
    }

    #[test]
    fn test_submission_follows_mode() {
        let mut state = EditorState::new();
        state.draft = EventDraft::new("n", "d");
        assert_eq!(
            state.submission(),
            Submission::Create(EventDraft::new("n", "d"))
        );
        assert_eq!(state.mode.submit_label(), "Create Event");

        state.start_editing(&Event::new(4, "x", "y"));
        assert_eq!(
            state.submission(),
            Submission::Update(EventId::from(4), EventDraft::new("x", "y"))
        );
        assert_eq!(state.mode.submit_label(), "Update Event");

        state.cancel_editing();
        assert_eq!(state.mode, Mode::Creating);
        assert!(state.draft.is_empty());
    }
}
