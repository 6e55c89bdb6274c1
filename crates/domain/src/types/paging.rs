//! Paging envelopes and history queries

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_PAGE_SIZE;

/// Spring-style page envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResponse<T> {
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default, alias = "number")]
    pub current_page: u32,
    #[serde(default)]
    pub size: u32,
    #[serde(default)]
    pub has_next: bool,
    #[serde(default)]
    pub has_previous: bool,
}

/// Date and free-text filters shared by the history listing and export.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HistoryFilter {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub search: Option<String>,
}

impl HistoryFilter {
    /// Query pairs for the filter. Empty values are omitted and the search
    /// term is trimmed.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(from) = self.date_from.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("dateFrom", from.to_string()));
        }
        if let Some(to) = self.date_to.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("dateTo", to.to_string()));
        }
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            pairs.push(("search", search.to_string()));
        }
        pairs
    }
}

/// Paged query over the whole issue history.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HistoryQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub filter: HistoryFilter,
}

impl HistoryQuery {
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.unwrap_or(0).to_string()),
            ("size", self.size.unwrap_or(DEFAULT_PAGE_SIZE).to_string()),
        ];
        pairs.extend(self.filter.to_query_pairs());
        pairs
    }
}

/// Paged query over one employee's cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardHistoryQuery {
    pub employee_id: String,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl CardHistoryQuery {
    #[must_use]
    pub fn new(employee_id: impl Into<String>) -> Self {
        Self { employee_id: employee_id.into(), page: None, size: None }
    }

    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("page", self.page.unwrap_or(0).to_string()),
            ("size", self.size.unwrap_or(DEFAULT_PAGE_SIZE).to_string()),
            ("employeeId", self.employee_id.clone()),
        ]
    }
}
