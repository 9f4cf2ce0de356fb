//! Remote lookup seam and its HTTP implementation.
//!
//! Controllers only see [`LookupClient`]. [`HttpLookupClient`] talks to the
//! lookup service; tests substitute scripted clients.

use crate::config::LookupConfig;
use crate::constants::{
    ATTENTION_LOOKUP_PATH, DOCUMENT_NUMBER_PARAM, PERSON_LOOKUP_PATH, RESULT_FIELD, YEAR_PARAM,
};
use crate::model::{AttentionEvent, Person};
use crate::{LookupError, LookupResult};
use async_trait::async_trait;
use lookup_types::DocumentNumber;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Read-only lookups against the remote service.
#[async_trait]
pub trait LookupClient: Send + Sync {
    async fn find_persons(&self, document_number: &DocumentNumber) -> LookupResult<Vec<Person>>;

    async fn find_attentions(
        &self,
        document_number: &DocumentNumber,
        year: i32,
    ) -> LookupResult<Vec<AttentionEvent>>;
}

/// Lookup client over HTTP `GET` with JSON `{ "result": [...] }` envelopes.
#[derive(Clone, Debug)]
pub struct HttpLookupClient {
    cfg: LookupConfig,
    client: reqwest::Client,
}

impl HttpLookupClient {
    pub fn new(cfg: LookupConfig) -> LookupResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(cfg.connect_timeout())
            .timeout(cfg.request_timeout())
            .build()
            .map_err(|e| LookupError::ClientBuild(e.to_string()))?;

        Ok(Self { cfg, client })
    }

    pub fn config(&self) -> &LookupConfig {
        &self.cfg
    }

    async fn get_envelope<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> LookupResult<Vec<T>> {
        let url = self.cfg.endpoint(path);
        tracing::debug!("GET {} {:?}", url, query);

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LookupError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        decode_envelope(&bytes)
    }

    fn map_transport_error(&self, e: reqwest::Error) -> LookupError {
        if e.is_connect() {
            LookupError::Connection {
                url: self.cfg.base_url().to_string(),
                reason: e.to_string(),
            }
        } else if e.is_timeout() {
            LookupError::Timeout {
                secs: self.cfg.request_timeout().as_secs(),
            }
        } else {
            LookupError::Http(e.to_string())
        }
    }
}

#[async_trait]
impl LookupClient for HttpLookupClient {
    async fn find_persons(&self, document_number: &DocumentNumber) -> LookupResult<Vec<Person>> {
        self.get_envelope(
            PERSON_LOOKUP_PATH,
            &[(DOCUMENT_NUMBER_PARAM, document_number.to_string())],
        )
        .await
    }

    async fn find_attentions(
        &self,
        document_number: &DocumentNumber,
        year: i32,
    ) -> LookupResult<Vec<AttentionEvent>> {
        self.get_envelope(
            ATTENTION_LOOKUP_PATH,
            &[
                (YEAR_PARAM, year.to_string()),
                (DOCUMENT_NUMBER_PARAM, document_number.to_string()),
            ],
        )
        .await
    }
}

/// Decodes a `{ "result": [...] }` envelope.
///
/// A missing `result`, or one that is not an array, decodes as an empty list.
/// A body that is not JSON, or an item that does not match `T`, is a
/// [`LookupError::MalformedResponse`].
pub fn decode_envelope<T: DeserializeOwned>(body: &[u8]) -> LookupResult<Vec<T>> {
    let mut value: Value = serde_json::from_slice(body)
        .map_err(|e| LookupError::MalformedResponse(e.to_string()))?;

    match value.get_mut(RESULT_FIELD).map(Value::take) {
        Some(Value::Array(items)) => items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<T>, _>>()
            .map_err(|e| LookupError::MalformedResponse(e.to_string())),
        _ => Ok(Vec::new()),
    }
}
