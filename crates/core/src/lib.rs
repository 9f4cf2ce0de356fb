//! # Lookup Core
//!
//! Query orchestration and presentation state for the person / attention
//! lookup.
//!
//! This crate contains:
//! - The record types returned by the lookup service (`model`)
//! - Single-slot notifications scoped per UI region (`notification`)
//! - Code filtering and paging of attention results (`filter`)
//! - The person search, detail session and attention query controllers
//! - The `LookupClient` seam and its HTTP implementation (`client`)
//! - `Workbench`, which wires the controllers into one explicit state store
//!
//! **No rendering concerns**: layout, column labels and input handling belong
//! to the binaries that drive a `Workbench`.

pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod filter;
pub mod model;
pub mod notification;
pub mod primary;
pub mod secondary;
pub mod session;
pub mod workbench;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{HttpLookupClient, LookupClient};
pub use config::LookupConfig;
pub use error::{LookupError, LookupResult, SessionError, SessionResult};
pub use filter::{paginate, visible, FilterEngine, Page};
pub use model::{AttentionEvent, AttentionKey, Person};
pub use notification::{NotificationCenter, NotificationEvent, NotificationScope, Severity};
pub use primary::{PrimarySearchController, SearchTicket};
pub use secondary::{AttentionTicket, SecondaryQueryController};
pub use session::{DetailSessionController, OpenSession, SessionKey, SessionState};
pub use workbench::{AttentionPage, SharedWorkbench, Workbench};

pub use lookup_types::{DocumentNumber, TextError};
