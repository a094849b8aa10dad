//! Generic "return all" paginator.
//!
//! Every listing endpoint pages the same way: ask for a fixed page size, keep
//! going until a page comes back short.  Endpoints only differ in the query
//! keys they page with and where the records sit in the response, so both
//! are parameters here.
//!
//! Termination never reads a total-count field.  A page exactly as long as the
//! page size always costs one more (possibly empty) fetch.

use serde_json::Value;
use tracing::debug;

use crate::client::{ApiRequest, OneTapClient, Payload};
use crate::envelope::{Page, RecordPath};
use crate::ApiError;

/// How the next page is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAdvance {
    /// Page number starting at 0, `+1` per fetch.
    Index {
        page: &'static str,
        size: &'static str,
    },
    /// Record offset starting at 0, `+page_size` per fetch.
    Offset {
        skip: &'static str,
        limit: &'static str,
    },
}

impl PageAdvance {
    /// `page` / `pageSize`
    pub const PAGE: Self = Self::Index {
        page: "page",
        size: "pageSize",
    };

    /// `skip` / `limit`
    pub const SKIP: Self = Self::Offset {
        skip: "skip",
        limit: "limit",
    };

    fn apply(self, query: &mut Payload, iteration: u64, page_size: u32) {
        match self {
            Self::Index { page, size } => {
                query.insert(page.to_owned(), iteration.into());
                query.insert(size.to_owned(), page_size.into());
            }
            Self::Offset { skip, limit } => {
                query.insert(limit.to_owned(), page_size.into());
                query.insert(skip.to_owned(), (iteration * u64::from(page_size)).into());
            }
        }
    }
}

/// Pagination strategy for one endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub advance: PageAdvance,
    pub page_size: u32,
    pub records: RecordPath,
}

impl Pagination {
    pub const fn by_page(page_size: u32, records: RecordPath) -> Self {
        Self {
            advance: PageAdvance::PAGE,
            page_size,
            records,
        }
    }

    pub const fn by_offset(page_size: u32, records: RecordPath) -> Self {
        Self {
            advance: PageAdvance::SKIP,
            page_size,
            records,
        }
    }
}

/// Fetch a single page using whatever paging values the caller already put in
/// the query.
///
/// A response without the expected array is returned as one record, except
/// an empty (`null`) response which yields nothing.
pub async fn fetch_page(
    client: &OneTapClient,
    request: &ApiRequest,
    records: RecordPath,
) -> Result<Vec<Value>, ApiError> {
    let response = client.send(request).await?;
    Ok(match records.records(response) {
        Page::Records(page) => page,
        Page::Raw(Value::Null) => Vec::new(),
        Page::Raw(raw) => vec![raw],
    })
}

/// Fetch every page, sequentially, and return the concatenated records.
///
/// Stops after the first page shorter than `pagination.page_size`, or at the
/// first response with no array at the expected location.  A raw *first* page
/// of a bare-array endpoint is kept as a single record; any other raw page
/// adds nothing.
pub async fn fetch_all(
    client: &OneTapClient,
    mut request: ApiRequest,
    pagination: &Pagination,
) -> Result<Vec<Value>, ApiError> {
    let page_size = pagination.page_size.max(1);
    let mut all = Vec::new();
    let mut iteration: u64 = 0;

    loop {
        pagination
            .advance
            .apply(&mut request.query, iteration, page_size);

        let response = client.send(&request).await?;

        match pagination.records.records(response) {
            Page::Records(page) => {
                let fetched = page.len();
                all.extend(page);
                debug!(
                    path = %request.path,
                    iteration,
                    fetched,
                    total = all.len(),
                    "fetched page"
                );
                if fetched < page_size as usize {
                    break;
                }
            }
            Page::Raw(raw) => {
                if iteration == 0 && !raw.is_null() && pagination.records.keeps_raw_first_page() {
                    all.push(raw);
                }
                debug!(path = %request.path, iteration, "response had no record array, stopping");
                break;
            }
        }

        iteration += 1;
    }

    Ok(all)
}
