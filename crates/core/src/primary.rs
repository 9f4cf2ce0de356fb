//! Person search by document number.
//!
//! [`PrimarySearchController`] is the only writer of the visible person list.
//! A search is split into [`begin`](PrimarySearchController::begin), which
//! resets state and hands out a [`SearchTicket`], and
//! [`settle`](PrimarySearchController::settle), which applies the outcome only
//! when the ticket is the most recently issued one.

use crate::client::LookupClient;
use crate::constants::{MSG_NO_PATIENTS, MSG_PRIMARY_CONNECTIVITY, MSG_PRIMARY_SERVER};
use crate::model::{dedupe_by_key, Person};
use crate::notification::{NotificationCenter, NotificationEvent};
use crate::LookupResult;
use lookup_types::DocumentNumber;

/// An issued person lookup awaiting its outcome.
#[derive(Debug)]
pub struct SearchTicket {
    seq: u64,
    document_number: DocumentNumber,
}

impl SearchTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn document_number(&self) -> &DocumentNumber {
        &self.document_number
    }
}

#[derive(Debug, Default)]
pub struct PrimarySearchController {
    persons: Vec<Person>,
    loading: bool,
    issued: u64,
    notifications: NotificationCenter,
}

impl PrimarySearchController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a search for `input`.
    ///
    /// Blank input is a no-op and returns `None`. Any other input, trimmed, is
    /// sent as is. The list and notification are cleared, loading is set and a
    /// ticket is returned for the caller to resolve.
    pub fn begin(&mut self, input: &str) -> Option<SearchTicket> {
        let document_number = DocumentNumber::parse_optional(input)?;

        self.issued += 1;
        self.persons.clear();
        self.notifications.clear();
        self.loading = true;
        tracing::info!(seq = self.issued, ndoc = %document_number, "person search issued");

        Some(SearchTicket {
            seq: self.issued,
            document_number,
        })
    }

    /// Applies the outcome of `ticket`.
    ///
    /// Returns `false`, leaving state untouched, when a later search has been
    /// issued since.
    pub fn settle(&mut self, ticket: SearchTicket, outcome: LookupResult<Vec<Person>>) -> bool {
        if ticket.seq != self.issued {
            tracing::debug!(
                seq = ticket.seq,
                latest = self.issued,
                "discarding stale person search result"
            );
            return false;
        }

        self.loading = false;
        match outcome {
            Ok(persons) => {
                let (persons, dropped) = dedupe_by_key(persons, |p| p.key().clone());
                for key in dropped {
                    tracing::warn!("duplicate person key {} dropped from result", key);
                }
                tracing::info!(
                    seq = ticket.seq,
                    count = persons.len(),
                    "person search settled"
                );
                if persons.is_empty() {
                    self.notifications.info(MSG_NO_PATIENTS);
                }
                self.persons = persons;
            }
            Err(e) => {
                tracing::error!("Person search error: {:?}", e);
                self.persons.clear();
                let message = if e.is_connectivity() {
                    MSG_PRIMARY_CONNECTIVITY
                } else {
                    MSG_PRIMARY_SERVER
                };
                self.notifications.error(message);
            }
        }
        true
    }

    /// Runs a whole search against `client` and returns the resulting list.
    ///
    /// Failures never escape; they end up in the notification slot.
    pub async fn search<C: LookupClient + ?Sized>(
        &mut self,
        client: &C,
        input: &str,
    ) -> Vec<Person> {
        if let Some(ticket) = self.begin(input) {
            let outcome = client.find_persons(ticket.document_number()).await;
            self.settle(ticket, outcome);
        }
        self.persons.clone()
    }

    pub fn persons(&self) -> &[Person] {
        &self.persons
    }

    pub fn find(&self, document_number: &DocumentNumber) -> Option<&Person> {
        self.persons.iter().find(|p| p.key() == document_number)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn notification(&self) -> Option<&NotificationEvent> {
        self.notifications.current()
    }
}
