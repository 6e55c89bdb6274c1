//! Backend data transfer types
//!
//! Field names follow the backend's JSON. Older endpoints return upper-case
//! column names (`M_NO`, `CARD_SNO`), newer ones camelCase; both are accepted
//! on input.

pub mod card;
pub mod employee;
pub mod paging;
pub mod user;

pub use card::{
    CardImage, CardImageRequest, CardIssue, CardIssueHistory, CardIssueRequest, CardStatus,
    CardType, DashboardStats, IssueReceipt,
};
pub use employee::EmployeeRecord;
pub use paging::{CardHistoryQuery, HistoryFilter, HistoryQuery, PagedResponse};
pub use user::{BulkIssueRequest, BulkIssueUser, UserInfo, UserUpdate};
