//! Query boundary for index searches.
//!
//! Search failures never reach the caller: they are logged and turned into an
//! empty page.

use crate::domain::{Car, PagedResponse, Paging};
use crate::search::index::{CarIndex, CarSearchTerms, IndexError};

/// Ranked term search. A blank term lists everything instead of matching nothing.
pub async fn search_by_term(
    index: &dyn CarIndex,
    term: &str,
    paging: Paging,
) -> PagedResponse<Car> {
    let term = term.trim();
    let result = if term.is_empty() {
        index.match_all(paging).await
    } else {
        index.search_cars_by_term(term, paging).await
    };
    or_empty(result, "term search")
}

pub async fn search_by_fields(
    index: &dyn CarIndex,
    terms: &CarSearchTerms,
    paging: Paging,
) -> PagedResponse<Car> {
    or_empty(index.search_cars(terms, paging).await, "field search")
}

fn or_empty(result: Result<PagedResponse<Car>, IndexError>, what: &str) -> PagedResponse<Car> {
    match result {
        Ok(page) => page,
        Err(IndexError::Disabled) => {
            tracing::debug!(%what, "search index disabled, returning empty page");
            PagedResponse::empty()
        }
        Err(e) => {
            tracing::error!(%what, error = %e, "search index query failed");
            PagedResponse::empty()
        }
    }
}
