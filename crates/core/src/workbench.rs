//! Wiring of the controllers into one explicit state store.
//!
//! [`Workbench`] owns the person search, the detail session, the attention
//! query and the filter memo. Mutation goes through its entry points and
//! everything a renderer needs is exposed through read-only accessors.
//!
//! The attention query is driven by the session's key channel: after a
//! session change, [`Workbench::sync`] turns a new `(person, year)` key into an
//! [`AttentionTicket`] and a closed session into an invalidation.
//! [`SharedWorkbench`] wraps the store for single-threaded cooperative use, so
//! several queries can be in flight while the operator keeps typing.

use crate::client::LookupClient;
use crate::filter::{paginate, FilterEngine};
use crate::model::{AttentionEvent, Person};
use crate::notification::{NotificationEvent, NotificationScope};
use crate::primary::{PrimarySearchController, SearchTicket};
use crate::secondary::{AttentionTicket, SecondaryQueryController};
use crate::session::{DetailSessionController, OpenSession, SessionKey};
use crate::{LookupResult, SessionError, SessionResult};
use lookup_types::DocumentNumber;
use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;
use std::sync::Arc;
use tokio::sync::watch;

/// One rendered page of visible attentions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttentionPage {
    pub items: Vec<AttentionEvent>,
    pub index: usize,
    pub count: usize,
    /// Visible events across all pages.
    pub total_visible: usize,
    /// Events in the raw result before filtering.
    pub total_raw: usize,
}

pub struct Workbench<C> {
    client: Arc<C>,
    primary: PrimarySearchController,
    session: DetailSessionController,
    secondary: SecondaryQueryController,
    filter: FilterEngine,
    key_rx: watch::Receiver<Option<SessionKey>>,
}

impl<C: LookupClient> Workbench<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self::with_session(client, DetailSessionController::new())
    }

    pub fn with_session(client: Arc<C>, session: DetailSessionController) -> Self {
        let key_rx = session.subscribe();
        Self {
            client,
            primary: PrimarySearchController::new(),
            session,
            secondary: SecondaryQueryController::new(),
            filter: FilterEngine::new(),
            key_rx,
        }
    }

    pub fn client(&self) -> Arc<C> {
        Arc::clone(&self.client)
    }

    // ---- primary search -------------------------------------------------

    pub fn begin_search(&mut self, input: &str) -> Option<SearchTicket> {
        self.primary.begin(input)
    }

    pub fn settle_search(
        &mut self,
        ticket: SearchTicket,
        outcome: LookupResult<Vec<Person>>,
    ) -> bool {
        self.primary.settle(ticket, outcome)
    }

    /// Runs a person search to completion.
    pub async fn search(&mut self, input: &str) -> Vec<Person> {
        let client = self.client();
        self.primary.search(client.as_ref(), input).await
    }

    // ---- session --------------------------------------------------------

    /// Opens a session for the listed person with this document number.
    pub fn select(&mut self, document_number: &DocumentNumber) -> SessionResult<()> {
        let person = self
            .primary
            .find(document_number)
            .cloned()
            .ok_or_else(|| SessionError::UnknownPerson(document_number.to_string()))?;
        self.open(person);
        Ok(())
    }

    /// Opens a session for `person`. Rows of any previous session are dropped
    /// right away; the new query is issued by the next [`sync`](Self::sync).
    pub fn open(&mut self, person: Person) {
        self.session.open(person);
        self.secondary.invalidate();
        self.filter.invalidate();
    }

    /// Closes the session and invalidates any outstanding attention query.
    pub fn close(&mut self) {
        self.session.close();
        self.sync();
    }

    /// Changes the year. When it actually changes, the previous year's rows
    /// are dropped right away and the next [`sync`](Self::sync) issues a query.
    pub fn set_year(&mut self, year: i32) -> SessionResult<bool> {
        let changed = self.session.set_year(year)?;
        if changed {
            self.secondary.supersede();
        }
        Ok(changed)
    }

    pub fn set_filter(&mut self, text: &str) -> SessionResult<()> {
        self.session.set_filter(text)
    }

    pub fn set_page_size(&mut self, page_size: usize) -> SessionResult<()> {
        self.session.set_page_size(page_size)
    }

    pub fn set_page(&mut self, page: usize) -> SessionResult<()> {
        self.session.set_page(page)
    }

    // ---- attention query ------------------------------------------------

    /// Reacts to session key changes published since the last call.
    ///
    /// A new key issues a ticket for the caller to resolve. A closed session
    /// invalidates outstanding requests. Several changes between two calls
    /// collapse into one query for the latest key.
    pub fn sync(&mut self) -> Option<AttentionTicket> {
        if !self.key_rx.has_changed().unwrap_or(false) {
            return None;
        }
        let key = self.key_rx.borrow_and_update().clone();

        match key {
            Some(_) => match self.secondary.issue(&self.session) {
                Ok(ticket) => Some(ticket),
                Err(e) => {
                    tracing::warn!("session key published but no session is open: {}", e);
                    None
                }
            },
            None => {
                self.secondary.invalidate();
                self.filter.invalidate();
                None
            }
        }
    }

    pub fn settle_attentions(
        &mut self,
        ticket: AttentionTicket,
        outcome: LookupResult<Vec<AttentionEvent>>,
    ) -> bool {
        self.secondary.settle(ticket, outcome, &self.session)
    }

    /// Syncs and, if a query was issued, runs it to completion.
    pub async fn refresh_attentions(&mut self) -> bool {
        let Some(ticket) = self.sync() else {
            return false;
        };
        let client = self.client();
        let outcome = client
            .find_attentions(ticket.document_number(), ticket.year())
            .await;
        self.settle_attentions(ticket, outcome)
    }

    // ---- views ----------------------------------------------------------

    pub fn persons(&self) -> &[Person] {
        self.primary.persons()
    }

    pub fn persons_loading(&self) -> bool {
        self.primary.is_loading()
    }

    pub fn session(&self) -> Option<&OpenSession> {
        self.session.open_session()
    }

    pub fn year_options(&self) -> Vec<i32> {
        self.session.year_options()
    }

    pub fn attentions_loading(&self) -> bool {
        self.secondary.is_loading()
    }

    pub fn raw_attentions(&self) -> &[AttentionEvent] {
        self.secondary.attentions()
    }

    /// Attentions that pass the session's code filter. Empty while closed.
    pub fn visible_attentions(&mut self) -> Vec<&AttentionEvent> {
        let Some(session) = self.session.open_session() else {
            return Vec::new();
        };
        self.filter.view(
            self.secondary.generation(),
            self.secondary.attentions(),
            session.code_filter(),
        )
    }

    /// The page of visible attentions selected in the session.
    pub fn current_page(&mut self) -> Option<AttentionPage> {
        let (page_size, page_index) = {
            let session = self.session.open_session()?;
            (session.page_size(), session.page())
        };
        let total_raw = self.secondary.attentions().len();
        let visible = self.visible_attentions();
        let page = paginate(&visible, page_size, page_index);

        Some(AttentionPage {
            items: page.items.iter().map(|&a| a.clone()).collect(),
            index: page.index,
            count: page.count,
            total_visible: page.total,
            total_raw,
        })
    }

    pub fn notification(&self, scope: NotificationScope) -> Option<&NotificationEvent> {
        match scope {
            NotificationScope::PrimarySearch => self.primary.notification(),
            NotificationScope::DetailSession => self.secondary.notification(),
        }
    }
}

/// A [`Workbench`] shared between cooperative tasks on one thread.
///
/// Borrows are taken only between suspension points; no borrow is held while
/// a lookup is awaited.
pub struct SharedWorkbench<C>(Rc<RefCell<Workbench<C>>>);

impl<C> Clone for SharedWorkbench<C> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<C: LookupClient> SharedWorkbench<C> {
    pub fn new(workbench: Workbench<C>) -> Self {
        Self(Rc::new(RefCell::new(workbench)))
    }

    pub fn borrow(&self) -> Ref<'_, Workbench<C>> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, Workbench<C>> {
        self.0.borrow_mut()
    }

    pub async fn search(&self, input: &str) -> Vec<Person> {
        let ticket = self.0.borrow_mut().begin_search(input);
        let Some(ticket) = ticket else {
            return self.0.borrow().persons().to_vec();
        };
        let client = self.0.borrow().client();
        let outcome = client.find_persons(ticket.document_number()).await;

        let mut wb = self.0.borrow_mut();
        wb.settle_search(ticket, outcome);
        wb.persons().to_vec()
    }

    pub async fn run_attention_query(&self, ticket: AttentionTicket) -> bool {
        let client = self.0.borrow().client();
        let outcome = client
            .find_attentions(ticket.document_number(), ticket.year())
            .await;
        self.0.borrow_mut().settle_attentions(ticket, outcome)
    }

    /// Syncs and runs the resulting query, if any.
    pub async fn refresh(&self) -> bool {
        let ticket = self.0.borrow_mut().sync();
        match ticket {
            Some(ticket) => self.run_attention_query(ticket).await,
            None => false,
        }
    }
}
