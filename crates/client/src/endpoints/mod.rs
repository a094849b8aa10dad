//! Endpoint functions: one function per OneTap API operation.
//!
//! Every function takes a `&OneTapClient` and returns a `Result<T, ApiError>`.
//! No parameter normalization, no item handling; the payloads arrive ready
//! to send.

pub mod integrations;
pub mod lists;
pub mod participants;
pub mod passports;
pub mod profiles;
pub mod public;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;

use crate::client::{ApiRequest, OneTapClient};
use crate::paginate::{fetch_all, fetch_page, Pagination};
use crate::ApiError;

/// RFC 3986 unreserved characters stay as-is.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encode an ID for use as a single path segment.
pub(crate) fn segment(id: &str) -> String {
    utf8_percent_encode(id, SEGMENT).to_string()
}

/// Run a listing request: one page as-is, or every page when `return_all`.
pub(crate) async fn listing(
    client: &OneTapClient,
    request: ApiRequest,
    pagination: &Pagination,
    return_all: bool,
) -> Result<Vec<Value>, ApiError> {
    if return_all {
        fetch_all(client, request, pagination).await
    } else {
        fetch_page(client, &request, pagination.records).await
    }
}

#[cfg(test)]
mod tests {
    use super::segment;

    #[test]
    fn segment_keeps_plain_ids_and_escapes_separators() {
        assert_eq!(segment("64f1-ab_c.d~"), "64f1-ab_c.d~");
        assert_eq!(segment("a/b c"), "a%2Fb%20c");
    }
}
