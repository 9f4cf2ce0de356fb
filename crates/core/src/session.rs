//! Drill-down session lifecycle.
//!
//! A session is `Closed` until a person is selected. While `Open` it owns the
//! selected person, year, code filter and paging state. Every change to the
//! `(person, year)` pair is published as a [`SessionKey`] on a watch channel;
//! the secondary query side subscribes to it instead of re-running on every
//! state change.

use crate::constants::{DEFAULT_PAGE_SIZE, MIN_YEAR, PAGE_SIZE_OPTIONS, YEAR_WINDOW};
use crate::model::Person;
use crate::{SessionError, SessionResult};
use chrono::Datelike;
use tokio::sync::watch;
use uuid::Uuid;

/// The inputs of one attention query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionKey {
    pub session_id: Uuid,
    pub person: Person,
    pub year: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenSession {
    id: Uuid,
    person: Person,
    year: i32,
    code_filter: String,
    page_size: usize,
    page: usize,
}

impl OpenSession {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn person(&self) -> &Person {
        &self.person
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn code_filter(&self) -> &str {
        &self.code_filter
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page(&self) -> usize {
        self.page
    }

    fn key(&self) -> SessionKey {
        SessionKey {
            session_id: self.id,
            person: self.person.clone(),
            year: self.year,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Closed,
    Open(OpenSession),
}

/// Selectable years, newest first.
pub fn year_options(current_year: i32) -> Vec<i32> {
    (0..YEAR_WINDOW).map(|offset| current_year - offset).collect()
}

fn system_year() -> i32 {
    chrono::Local::now().year()
}

pub struct DetailSessionController {
    state: SessionState,
    current_year: fn() -> i32,
    key_tx: watch::Sender<Option<SessionKey>>,
}

impl DetailSessionController {
    pub fn new() -> Self {
        Self::with_year_source(system_year)
    }

    /// Uses `current_year` instead of the system clock to pick the default year.
    pub fn with_year_source(current_year: fn() -> i32) -> Self {
        let (key_tx, _) = watch::channel(None);
        Self {
            state: SessionState::Closed,
            current_year,
            key_tx,
        }
    }

    /// Subscribes to `(person, year)` changes. `None` means the session closed.
    pub fn subscribe(&self) -> watch::Receiver<Option<SessionKey>> {
        self.key_tx.subscribe()
    }

    /// Opens a session for `person`, resetting year, filter and paging.
    ///
    /// Re-opening while already open starts a fresh session even for the same
    /// person, so a new query key is always published.
    pub fn open(&mut self, person: Person) {
        let session = OpenSession {
            id: Uuid::new_v4(),
            person,
            year: (self.current_year)(),
            code_filter: String::new(),
            page_size: DEFAULT_PAGE_SIZE,
            page: 0,
        };
        tracing::info!(
            session = %session.id,
            person = %session.person.document_number,
            year = session.year,
            "detail session opened"
        );
        let key = session.key();
        self.state = SessionState::Open(session);
        self.key_tx.send_replace(Some(key));
    }

    /// Closes the session, discarding its state. Closing twice is harmless.
    pub fn close(&mut self) {
        if let SessionState::Open(session) = std::mem::take(&mut self.state) {
            tracing::info!(session = %session.id, "detail session closed");
            self.key_tx.send_replace(None);
        }
    }

    /// Changes the selected year.
    ///
    /// Returns `Ok(true)` when the year actually changed, which publishes a new
    /// query key. Years before 1900 or after the current year are rejected.
    pub fn set_year(&mut self, year: i32) -> SessionResult<bool> {
        let max = (self.current_year)();
        let session = self.open_mut()?;
        if !(MIN_YEAR..=max).contains(&year) {
            return Err(SessionError::InvalidYear {
                year,
                min: MIN_YEAR,
                max,
            });
        }
        if session.year == year {
            return Ok(false);
        }

        session.year = year;
        session.page = 0;
        tracing::debug!(session = %session.id, year, "session year changed");
        let key = session.key();
        self.key_tx.send_replace(Some(key));
        Ok(true)
    }

    /// Replaces the code filter. Does not publish a query key.
    pub fn set_filter(&mut self, text: &str) -> SessionResult<()> {
        let session = self.open_mut()?;
        if session.code_filter != text {
            session.code_filter = text.to_string();
            session.page = 0;
        }
        Ok(())
    }

    pub fn set_page_size(&mut self, page_size: usize) -> SessionResult<()> {
        if !PAGE_SIZE_OPTIONS.contains(&page_size) {
            return Err(SessionError::InvalidPageSize(page_size));
        }
        let session = self.open_mut()?;
        session.page_size = page_size;
        session.page = 0;
        Ok(())
    }

    /// Moves to a zero-based page. Out-of-range pages clamp when rendered.
    pub fn set_page(&mut self, page: usize) -> SessionResult<()> {
        self.open_mut()?.page = page;
        Ok(())
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, SessionState::Open(_))
    }

    pub fn open_session(&self) -> Option<&OpenSession> {
        match &self.state {
            SessionState::Open(session) => Some(session),
            SessionState::Closed => None,
        }
    }

    /// The current query inputs, read from the open session only.
    pub fn query_key(&self) -> SessionResult<SessionKey> {
        self.open_session()
            .map(OpenSession::key)
            .ok_or(SessionError::Closed)
    }

    /// True when an open session has a non-empty code filter.
    pub fn filter_active(&self) -> bool {
        self.open_session()
            .is_some_and(|s| !s.code_filter.is_empty())
    }

    pub fn current_year(&self) -> i32 {
        (self.current_year)()
    }

    pub fn year_options(&self) -> Vec<i32> {
        year_options(self.current_year())
    }

    fn open_mut(&mut self) -> SessionResult<&mut OpenSession> {
        match &mut self.state {
            SessionState::Open(session) => Ok(session),
            SessionState::Closed => Err(SessionError::Closed),
        }
    }
}

impl Default for DetailSessionController {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DetailSessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetailSessionController")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
