//! Attention lookup for the open session.
//!
//! Every issued query gets a strictly increasing sequence number. An outcome
//! is applied only if its number is still the latest issued, so the most
//! recently *issued* request wins regardless of settlement order. Closing the
//! session bumps the counter too, which turns any outstanding request stale.

use crate::client::LookupClient;
use crate::constants::{no_attentions_message, MSG_SECONDARY_CONNECTIVITY, MSG_SECONDARY_SERVER};
use crate::model::{dedupe_by_key, AttentionEvent};
use crate::notification::{NotificationCenter, NotificationEvent};
use crate::session::DetailSessionController;
use crate::{LookupResult, SessionResult};
use lookup_types::DocumentNumber;
use uuid::Uuid;

/// An issued attention lookup awaiting its outcome.
#[derive(Debug)]
pub struct AttentionTicket {
    seq: u64,
    session_id: Uuid,
    document_number: DocumentNumber,
    year: i32,
}

impl AttentionTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn document_number(&self) -> &DocumentNumber {
        &self.document_number
    }

    pub fn year(&self) -> i32 {
        self.year
    }
}

#[derive(Debug, Default)]
pub struct SecondaryQueryController {
    attentions: Vec<AttentionEvent>,
    generation: u64,
    loading: bool,
    issued: u64,
    session_id: Option<Uuid>,
    notifications: NotificationCenter,
}

impl SecondaryQueryController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a query for the session's current `(person, year)`.
    ///
    /// Fails with [`SessionError::Closed`](crate::SessionError::Closed) when no
    /// session is open. A query for a different session than the previous one
    /// starts from a clean notification slot.
    pub fn issue(&mut self, session: &DetailSessionController) -> SessionResult<AttentionTicket> {
        let key = session.query_key()?;

        if self.session_id != Some(key.session_id) {
            self.notifications = NotificationCenter::new();
            self.session_id = Some(key.session_id);
        }

        self.issued += 1;
        self.replace_attentions(Vec::new());
        self.notifications.clear();
        self.loading = true;
        tracing::info!(
            seq = self.issued,
            session = %key.session_id,
            ndoc = %key.person.document_number,
            year = key.year,
            "attention query issued"
        );

        Ok(AttentionTicket {
            seq: self.issued,
            session_id: key.session_id,
            document_number: key.person.document_number,
            year: key.year,
        })
    }

    /// Applies the outcome of `ticket` if it is still the latest issued query
    /// and the session still has the ticket's inputs.
    ///
    /// The empty-result notification is suppressed while the session has an
    /// active code filter. Returns whether the outcome was applied.
    pub fn settle(
        &mut self,
        ticket: AttentionTicket,
        outcome: LookupResult<Vec<AttentionEvent>>,
        session: &DetailSessionController,
    ) -> bool {
        let still_current = session
            .query_key()
            .is_ok_and(|key| key.session_id == ticket.session_id && key.year == ticket.year);
        if ticket.seq != self.issued || !still_current {
            tracing::debug!(
                seq = ticket.seq,
                latest = self.issued,
                year = ticket.year,
                "discarding stale attention result"
            );
            return false;
        }

        self.loading = false;
        match outcome {
            Ok(events) => {
                let (events, dropped) = dedupe_by_key(events, AttentionEvent::key);
                for key in dropped {
                    tracing::warn!("duplicate attention key {} dropped from result", key);
                }
                tracing::info!(
                    seq = ticket.seq,
                    year = ticket.year,
                    count = events.len(),
                    "attention query settled"
                );
                if events.is_empty() && !session.filter_active() {
                    self.notifications.info(no_attentions_message(ticket.year));
                }
                self.replace_attentions(events);
            }
            Err(e) => {
                tracing::error!("Attention query error: {:?}", e);
                self.replace_attentions(Vec::new());
                let message = if e.is_connectivity() {
                    MSG_SECONDARY_CONNECTIVITY
                } else {
                    MSG_SECONDARY_SERVER
                };
                self.notifications.error(message);
            }
        }
        true
    }

    /// Drops all session-scoped state and turns outstanding requests stale.
    pub fn invalidate(&mut self) {
        self.supersede();
        self.session_id = None;
        tracing::debug!(latest = self.issued, "attention queries invalidated");
    }

    /// Clears the visible result after the session's `(person, year)` changed.
    ///
    /// Outstanding requests turn stale and the list, loading flag and
    /// notification reset until the next query is issued.
    pub fn supersede(&mut self) {
        self.issued += 1;
        self.loading = false;
        self.replace_attentions(Vec::new());
        self.notifications.clear();
    }

    /// Issues and resolves a query in one go.
    pub async fn fetch_attentions<C: LookupClient + ?Sized>(
        &mut self,
        client: &C,
        session: &DetailSessionController,
    ) -> SessionResult<Vec<AttentionEvent>> {
        let ticket = self.issue(session)?;
        let outcome = client
            .find_attentions(ticket.document_number(), ticket.year())
            .await;
        self.settle(ticket, outcome, session);
        Ok(self.attentions.clone())
    }

    pub fn attentions(&self) -> &[AttentionEvent] {
        &self.attentions
    }

    /// Bumped every time the attention list is replaced.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn notification(&self) -> Option<&NotificationEvent> {
        self.notifications.current()
    }

    fn replace_attentions(&mut self, events: Vec<AttentionEvent>) {
        self.attentions = events;
        self.generation += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{attention, person};
    use crate::notification::Severity;
    use crate::testing::ScriptedClient;
    use crate::{LookupError, SessionError};

    fn open_session() -> DetailSessionController {
        let mut session = DetailSessionController::with_year_source(|| 2024);
        session.open(person("12345678"));
        session
    }

    fn visit_ids(controller: &SecondaryQueryController) -> Vec<&str> {
        controller
            .attentions()
            .iter()
            .map(|a| a.visit_id.as_str())
            .collect()
    }

    #[test]
    fn refuses_to_issue_while_closed() {
        let session = DetailSessionController::with_year_source(|| 2024);
        let mut controller = SecondaryQueryController::new();
        assert_eq!(
            controller.issue(&session).map(|t| t.seq()).unwrap_err(),
            SessionError::Closed
        );
        assert!(!controller.is_loading());
    }

    #[test]
    fn later_issued_request_wins_over_later_settlement() {
        let mut session = open_session();
        let mut controller = SecondaryQueryController::new();

        session.set_year(2023).expect("open");
        let t2023 = controller.issue(&session).expect("ticket");
        session.set_year(2024).expect("open");
        let t2024 = controller.issue(&session).expect("ticket");
        assert!(controller.is_loading());

        assert!(controller.settle(t2024, Ok(vec![attention("24", "A")]), &session));
        assert!(!controller.is_loading());
        assert_eq!(visit_ids(&controller), vec!["24"]);

        assert!(!controller.settle(t2023, Ok(vec![attention("23", "A")]), &session));
        assert_eq!(visit_ids(&controller), vec!["24"]);
        assert!(!controller.is_loading());
        assert!(controller.notification().is_none());
    }

    #[test]
    fn superseded_settlement_does_not_clear_loading() {
        let session = open_session();
        let mut controller = SecondaryQueryController::new();

        let older = controller.issue(&session).expect("ticket");
        let newer = controller.issue(&session).expect("ticket");

        assert!(!controller.settle(older, Err(LookupError::Timeout { secs: 30 }), &session));
        assert!(controller.is_loading(), "winning request is still in flight");
        assert!(controller.notification().is_none());

        controller.settle(newer, Ok(vec![]), &session);
        assert!(!controller.is_loading());
    }

    #[test]
    fn empty_result_names_the_year_when_no_filter() {
        let session = open_session();
        let mut controller = SecondaryQueryController::new();

        let ticket = controller.issue(&session).expect("ticket");
        controller.settle(ticket, Ok(vec![]), &session);

        let note = controller.notification().expect("info");
        assert_eq!(note.severity, Severity::Info);
        assert!(note.message.contains("2024"));
    }

    #[test]
    fn empty_result_is_silent_under_active_filter() {
        let mut session = open_session();
        let mut controller = SecondaryQueryController::new();
        session.set_filter("X1").expect("open");

        let ticket = controller.issue(&session).expect("ticket");
        controller.settle(ticket, Ok(vec![]), &session);

        assert!(controller.notification().is_none());
        assert!(controller.attentions().is_empty());
    }

    #[test]
    fn failure_reports_error_and_empties_list() {
        let session = open_session();
        let mut controller = SecondaryQueryController::new();
        let ticket = controller.issue(&session).expect("ticket");
        controller.settle(ticket, Ok(vec![attention("1", "A")]), &session);

        let ticket = controller.issue(&session).expect("ticket");
        controller.settle(
            ticket,
            Err(LookupError::Connection {
                url: "http://localhost:8000".into(),
                reason: "refused".into(),
            }),
            &session,
        );
        assert!(controller.attentions().is_empty());
        assert!(!controller.is_loading());
        let note = controller.notification().expect("error");
        assert_eq!(note.severity, Severity::Error);
        assert_eq!(note.message, MSG_SECONDARY_CONNECTIVITY);

        let ticket = controller.issue(&session).expect("ticket");
        controller.settle(
            ticket,
            Err(LookupError::Status {
                status: 502,
                body: String::new(),
            }),
            &session,
        );
        assert_eq!(
            controller.notification().map(|n| n.message.as_str()),
            Some(MSG_SECONDARY_SERVER)
        );
    }

    #[test]
    fn invalidate_turns_outstanding_request_stale() {
        let mut session = open_session();
        let mut controller = SecondaryQueryController::new();
        let ticket = controller.issue(&session).expect("ticket");

        session.close();
        controller.invalidate();
        assert!(!controller.is_loading());

        assert!(!controller.settle(ticket, Ok(vec![attention("1", "A")]), &session));
        assert!(controller.attentions().is_empty());
        assert!(controller.notification().is_none());
    }

    #[test]
    fn response_for_closed_session_is_ignored_even_before_invalidate() {
        let mut session = open_session();
        let mut controller = SecondaryQueryController::new();
        let ticket = controller.issue(&session).expect("ticket");

        session.close();
        assert!(!controller.settle(ticket, Ok(vec![attention("1", "A")]), &session));
        assert!(controller.attentions().is_empty());
    }

    #[test]
    fn supersede_clears_rows_and_turns_ticket_stale() {
        let mut session = open_session();
        let mut controller = SecondaryQueryController::new();
        let ticket = controller.issue(&session).expect("ticket");
        controller.settle(ticket, Ok(vec![]), &session);
        assert!(controller.notification().is_some());

        let pending = controller.issue(&session).expect("ticket");
        session.set_year(2023).expect("open");
        controller.supersede();

        assert!(!controller.is_loading());
        assert!(controller.attentions().is_empty());
        assert!(controller.notification().is_none());
        assert!(!controller.settle(pending, Ok(vec![attention("1", "A")]), &session));
    }

    #[test]
    fn new_session_starts_with_clean_notification_slot() {
        let mut session = open_session();
        let mut controller = SecondaryQueryController::new();
        let ticket = controller.issue(&session).expect("ticket");
        controller.settle(ticket, Ok(vec![]), &session);
        let first = controller.notification().expect("info").clone();

        session.open(person("87654321"));
        let ticket = controller.issue(&session).expect("ticket");
        assert!(controller.notification().is_none());
        controller.settle(ticket, Ok(vec![]), &session);

        let second = controller.notification().expect("info");
        assert_eq!(second.id, 1, "ids restart per session");
        assert_eq!(first.id, 1);
    }

    #[tokio::test]
    async fn fetch_attentions_queries_with_session_inputs() {
        let session = open_session();
        let client = ScriptedClient::new();
        client.push_attentions(Ok(vec![attention("5", "Z1"), attention("6", "Z2")]));
        let mut controller = SecondaryQueryController::new();

        let events = controller
            .fetch_attentions(&client, &session)
            .await
            .expect("session open");

        assert_eq!(events.len(), 2);
        assert_eq!(
            client.attention_queries(),
            vec![("12345678".to_string(), 2024)]
        );
    }
}
