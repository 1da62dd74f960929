use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: i64 = 100;

/// Offset/limit window for list and search queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub offset: i64,
    pub limit: i64,
}

impl Paging {
    pub fn new(offset: i64, limit: i64) -> Self {
        Self { offset, limit }
    }

    /// Missing or zero values fall back to the defaults (offset 0, limit 100).
    pub fn from_optional(offset: Option<i64>, limit: Option<i64>) -> Self {
        let offset = offset.filter(|o| *o > 0).unwrap_or(0);
        let limit = limit.filter(|l| *l > 0).unwrap_or(DEFAULT_LIMIT);
        Self { offset, limit }
    }
}

impl Default for Paging {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Result of a paged query: the total match count plus one page of rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagedResponse<T> {
    pub total: i64,
    pub results: Vec<T>,
}

impl<T> PagedResponse<T> {
    pub fn empty() -> Self {
        Self {
            total: 0,
            results: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_zero_values_use_defaults() {
        assert_eq!(Paging::from_optional(None, None), Paging::new(0, 100));
        assert_eq!(Paging::from_optional(Some(0), Some(0)), Paging::new(0, 100));
        assert_eq!(Paging::from_optional(Some(20), Some(10)), Paging::new(20, 10));
        assert_eq!(Paging::from_optional(Some(-5), Some(-1)), Paging::new(0, 100));
    }
}
