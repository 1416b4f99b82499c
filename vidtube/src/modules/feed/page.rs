use std::str::FromStr;

use sea_orm::Order;
use serde::Serialize;

use crate::modules::error::ServiceError;

/// Sort direction over creation time (or watch time for history).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn order(self) -> Order {
        match self {
            SortDirection::Asc => Order::Asc,
            SortDirection::Desc => Order::Desc,
        }
    }
}

impl FromStr for SortDirection {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(ServiceError::invalid(format!(
                "sortType must be 'asc' or 'desc', got '{other}'"
            ))),
        }
    }
}

/// Page-size bounds applied to every feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedLimits {
    pub default_limit: u64,
    pub max_limit: u64,
}

impl Default for FeedLimits {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
        }
    }
}

/// Validated pagination input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
    pub sort: SortDirection,
}

impl PageRequest {
    /// Build a request from raw query-string values.
    ///
    /// Missing values take their defaults, a limit above the maximum is
    /// clamped, and anything non-numeric or below 1 is rejected.
    pub fn parse(
        page: Option<&str>,
        limit: Option<&str>,
        sort: Option<&str>,
        limits: FeedLimits,
    ) -> Result<Self, ServiceError> {
        let page = parse_positive("page", page)?.unwrap_or(1);
        let limit = parse_positive("limit", limit)?
            .unwrap_or(limits.default_limit)
            .min(limits.max_limit);
        let sort = match sort.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => raw.parse()?,
            None => SortDirection::default(),
        };

        Ok(Self { page, limit, sort })
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

fn parse_positive(name: &str, raw: Option<&str>) -> Result<Option<u64>, ServiceError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    match raw.parse::<u64>() {
        Ok(value) if value >= 1 => Ok(Some(value)),
        _ => Err(ServiceError::invalid(format!(
            "{name} must be a positive integer, got '{raw}'"
        ))),
    }
}

/// One page of a feed together with its position in the full result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
    pub has_next_page: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        let total_pages = total.div_ceil(request.limit);
        Self {
            items,
            page: request.page,
            limit: request.limit,
            total,
            total_pages,
            has_next_page: request.page < total_pages,
        }
    }
}
