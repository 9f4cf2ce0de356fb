//! Constants used throughout the lookup core crate.
//!
//! Endpoint paths, query parameter names, pagination sizes and the
//! operator-facing notification texts live here so the controllers and the
//! rendering layer agree on them.

/// Default base URL of the lookup service when nothing is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Path of the person lookup endpoint.
pub const PERSON_LOOKUP_PATH: &str = "/paciente";

/// Path of the attention lookup endpoint.
pub const ATTENTION_LOOKUP_PATH: &str = "/atenciones";

/// Query parameter carrying the document number.
pub const DOCUMENT_NUMBER_PARAM: &str = "ndoc";

/// Query parameter carrying the year.
pub const YEAR_PARAM: &str = "anio";

/// Name of the array field in the response envelope.
pub const RESULT_FIELD: &str = "result";

/// Default connect timeout, in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Default whole-request timeout, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Page size used when a session opens.
pub const DEFAULT_PAGE_SIZE: usize = 13;

/// Page sizes an operator can choose from.
pub const PAGE_SIZE_OPTIONS: [usize; 3] = [13, 25, 50];

/// Number of selectable years, counting back from the current one.
pub const YEAR_WINDOW: i32 = 3;

/// Earliest year accepted by `set_year`.
pub const MIN_YEAR: i32 = 1900;

pub const MSG_NO_PATIENTS: &str = "No patients found.";
pub const MSG_PRIMARY_CONNECTIVITY: &str =
    "Could not connect to the server. Check the API address and CORS configuration.";
pub const MSG_PRIMARY_SERVER: &str = "The server could not complete the patient search.";
pub const MSG_SECONDARY_CONNECTIVITY: &str = "Could not load the attentions. Check the connection.";
pub const MSG_SECONDARY_SERVER: &str = "The server could not load the attentions.";

/// Info text shown when a year has no attentions.
pub fn no_attentions_message(year: i32) -> String {
    format!("No attentions registered for year {year}.")
}
