//! Scripted lookup client for tests.
//!
//! Responses are consumed in call order. A gated response stays pending until
//! the test sends through the returned `oneshot::Sender`, which lets tests
//! settle requests out of order.

use crate::client::LookupClient;
use crate::model::{AttentionEvent, Person};
use crate::{LookupError, LookupResult};
use async_trait::async_trait;
use lookup_types::DocumentNumber;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::oneshot;

enum Scripted<T> {
    Ready(LookupResult<T>),
    Gated(oneshot::Receiver<LookupResult<T>>),
}

impl<T> Scripted<T> {
    async fn resolve(self) -> LookupResult<T> {
        match self {
            Self::Ready(outcome) => outcome,
            Self::Gated(rx) => rx
                .await
                .unwrap_or_else(|_| Err(LookupError::Http("gate dropped".into()))),
        }
    }
}

#[derive(Default)]
pub(crate) struct ScriptedClient {
    persons: Mutex<VecDeque<Scripted<Vec<Person>>>>,
    attentions: Mutex<VecDeque<Scripted<Vec<AttentionEvent>>>>,
    person_queries: Mutex<Vec<String>>,
    attention_queries: Mutex<Vec<(String, i32)>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_persons(&self, outcome: LookupResult<Vec<Person>>) {
        self.persons
            .lock()
            .unwrap()
            .push_back(Scripted::Ready(outcome));
    }

    pub fn push_attentions(&self, outcome: LookupResult<Vec<AttentionEvent>>) {
        self.attentions
            .lock()
            .unwrap()
            .push_back(Scripted::Ready(outcome));
    }

    pub fn gate_attentions(&self) -> oneshot::Sender<LookupResult<Vec<AttentionEvent>>> {
        let (tx, rx) = oneshot::channel();
        self.attentions
            .lock()
            .unwrap()
            .push_back(Scripted::Gated(rx));
        tx
    }

    pub fn person_queries(&self) -> Vec<String> {
        self.person_queries.lock().unwrap().clone()
    }

    pub fn attention_queries(&self) -> Vec<(String, i32)> {
        self.attention_queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl LookupClient for ScriptedClient {
    async fn find_persons(&self, document_number: &DocumentNumber) -> LookupResult<Vec<Person>> {
        self.person_queries
            .lock()
            .unwrap()
            .push(document_number.to_string());
        let next = self.persons.lock().unwrap().pop_front();
        match next {
            Some(scripted) => scripted.resolve().await,
            None => Err(LookupError::Http("no scripted person response".into())),
        }
    }

    async fn find_attentions(
        &self,
        document_number: &DocumentNumber,
        year: i32,
    ) -> LookupResult<Vec<AttentionEvent>> {
        self.attention_queries
            .lock()
            .unwrap()
            .push((document_number.to_string(), year));
        let next = self.attentions.lock().unwrap().pop_front();
        match next {
            Some(scripted) => scripted.resolve().await,
            None => Err(LookupError::Http("no scripted attention response".into())),
        }
    }
}
